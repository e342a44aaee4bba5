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

use axum::{Json, extract::State};
use snafu::ResultExt;
use tracing::info;

use crate::bootstrap;
use crate::console::{
    error::{self, Result},
    models::bootstrap::BootstrapResponse,
    state::AppState,
};
use crate::types::request::{BootstrapRequest, ServiceAccountRole};
use crate::types::secret::OAUTH_SECRET_NAME;

/// Bootstrap the namespace, OAuth secret and service-account key secrets
pub async fn configure_cluster(
    State(state): State<AppState>,
    Json(request): Json<BootstrapRequest>,
) -> Result<Json<BootstrapResponse>> {
    info!(
        project = %request.project,
        cluster = %request.cluster,
        namespace = %request.namespace,
        "received bootstrap request"
    );

    let cancel = state.shutdown.child_token();
    bootstrap::configure_cluster(&state.ctx, &request, &cancel)
        .await
        .context(error::BootstrapSnafu)?;

    Ok(Json(BootstrapResponse {
        namespace: request.namespace,
        secrets: vec![
            OAUTH_SECRET_NAME.to_owned(),
            ServiceAccountRole::Admin.secret_name(),
            ServiceAccountRole::User.secret_name(),
        ],
    }))
}
