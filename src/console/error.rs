// Copyright 2025 RustFS Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use snafu::Snafu;

use crate::bootstrap::{self, StepError, key};
use crate::{cluster, iam};

/// Console API errors
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("{}", source))]
    Bootstrap { source: bootstrap::Error },
}

/// API error response body
#[derive(Serialize, Debug)]
pub(crate) struct ErrorResponse {
    pub error: String,
    pub message: String,
    /// Index of the bootstrap step that failed.
    pub step: usize,
}

fn cluster_status(err: &cluster::Error) -> (StatusCode, &'static str) {
    match err {
        cluster::Error::AlreadyExists { .. } => (StatusCode::CONFLICT, "AlreadyExists"),
        cluster::Error::NotFound { .. } => (StatusCode::NOT_FOUND, "NotFound"),
        cluster::Error::ClusterNotReady { .. } => {
            (StatusCode::SERVICE_UNAVAILABLE, "ClusterNotReady")
        }
        _ => (StatusCode::BAD_GATEWAY, "ClusterApiError"),
    }
}

fn iam_status(err: &iam::Error) -> (StatusCode, &'static str) {
    match err {
        iam::Error::Unauthorized { status: 401, .. } => (StatusCode::UNAUTHORIZED, "Unauthorized"),
        iam::Error::Unauthorized { .. } => (StatusCode::FORBIDDEN, "Forbidden"),
        iam::Error::QuotaExceeded { .. } => (StatusCode::TOO_MANY_REQUESTS, "QuotaExceeded"),
        _ => (StatusCode::BAD_GATEWAY, "IamApiError"),
    }
}

fn bootstrap_status(err: &bootstrap::Error) -> (StatusCode, &'static str) {
    match err.cause() {
        StepError::DecodeCredential { .. } => (StatusCode::BAD_REQUEST, "BadRequest"),
        StepError::Cluster { source }
        | StepError::Key {
            source: key::Error::Secret { source },
        } => cluster_status(source),
        StepError::Key {
            source: key::Error::Iam { source },
        } => iam_status(source),
        StepError::Cancelled
        | StepError::Key {
            source: key::Error::Lock { .. } | key::Error::Cancelled { .. },
        } => (StatusCode::SERVICE_UNAVAILABLE, "Cancelled"),
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_type, step) = match &self {
            Error::Bootstrap { source } => {
                let (status, error_type) = bootstrap_status(source);
                (status, error_type, source.step().index())
            }
        };

        let body = Json(ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
            step,
        });

        (status, body).into_response()
    }
}

/// Result type for Console API
pub type Result<T> = std::result::Result<T, Error>;
