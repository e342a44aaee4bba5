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

//! Access to the target cluster's API server.

use crate::utils::tls;
use async_trait::async_trait;
use k8s_openapi::api::core::v1 as corev1;
use snafu::Snafu;
use std::sync::Arc;

pub mod client;
pub mod gke;

pub use client::KubeCluster;
pub use gke::GkeConnector;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("{} '{}' already exists", kind, name))]
    AlreadyExists { kind: &'static str, name: String },

    #[snafu(display("{} '{}' not found", kind, name))]
    NotFound { kind: &'static str, name: String },

    #[snafu(display("Kubernetes API error: {}", source))]
    Kube { source: kube::Error },

    #[snafu(display("GKE API error: {}", source))]
    Gke { source: reqwest::Error },

    #[snafu(display("GKE API returned {} for cluster '{}': {}", status, cluster, message))]
    GkeStatus {
        cluster: String,
        status: u16,
        message: String,
    },

    #[snafu(display("cluster '{}' has no endpoint or CA certificate yet", cluster))]
    ClusterNotReady { cluster: String },

    #[snafu(display("invalid API server endpoint '{}': {}", endpoint, source))]
    InvalidEndpoint {
        endpoint: String,
        source: http::uri::InvalidUri,
    },

    #[snafu(display("invalid cluster CA certificate: {}", source))]
    InvalidCaCertificate { source: tls::Error },
}

impl Error {
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Error::AlreadyExists { .. })
    }
}

/// Writes into one cluster. Neither operation overwrites an existing object.
#[async_trait]
pub trait ClusterApi: Send + Sync {
    /// Fails with [`Error::AlreadyExists`] if the namespace is present.
    async fn create_namespace(&self, namespace: &corev1::Namespace) -> Result<(), Error>;

    /// Fails with [`Error::AlreadyExists`] if a secret of that name is present
    /// in the namespace.
    async fn create_secret(&self, namespace: &str, secret: &corev1::Secret) -> Result<(), Error>;
}

/// Builds a [`ClusterApi`] for a cluster identified by project, zone and name.
#[async_trait]
pub trait ClusterConnector: Send + Sync {
    async fn connect(
        &self,
        token: &str,
        project: &str,
        zone: &str,
        cluster: &str,
    ) -> Result<Arc<dyn ClusterApi>, Error>;
}
