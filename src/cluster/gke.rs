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

use super::{
    ClusterApi, ClusterConnector, ClusterNotReadySnafu, Error, GkeSnafu, GkeStatusSnafu,
    InvalidCaCertificateSnafu, InvalidEndpointSnafu, KubeCluster, KubeSnafu,
};
use crate::config::api_url;
use crate::utils::tls;
use async_trait::async_trait;
use serde::Deserialize;
use snafu::ResultExt;
use snafu::futures::TryFutureExt;
use std::sync::Arc;
use tracing::{debug, info};

/// Subset of the Kubernetes Engine `Cluster` resource needed to reach the
/// API server.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct GkeCluster {
    #[serde(default)]
    endpoint: String,

    #[serde(default)]
    master_auth: Option<MasterAuth>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct MasterAuth {
    #[serde(default)]
    cluster_ca_certificate: String,
}

/// [`ClusterConnector`] for GKE clusters, authenticated with the caller's
/// access token.
#[derive(Clone)]
pub struct GkeConnector {
    http: reqwest::Client,
    endpoint: String,
}

impl GkeConnector {
    pub fn new(http: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }

    async fn describe(
        &self,
        token: &str,
        project: &str,
        zone: &str,
        cluster: &str,
    ) -> Result<GkeCluster, Error> {
        let url = api_url(
            &self.endpoint,
            &format!(
                "v1/projects/{}/locations/{}/clusters/{}",
                project, zone, cluster
            ),
        );

        debug!(%url, "describe GKE cluster");
        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .send()
            .context(GkeSnafu)
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return GkeStatusSnafu {
                cluster,
                status: status.as_u16(),
                message,
            }
            .fail();
        }

        response.json::<GkeCluster>().context(GkeSnafu).await
    }
}

/// Client configuration for the API server described by `described`.
fn cluster_config(
    described: GkeCluster,
    token: &str,
    cluster: &str,
) -> Result<kube::Config, Error> {
    let ca = described
        .master_auth
        .map(|auth| auth.cluster_ca_certificate)
        .unwrap_or_default();

    if described.endpoint.is_empty() || ca.is_empty() {
        return ClusterNotReadySnafu { cluster }.fail();
    }

    let endpoint = format!("https://{}", described.endpoint);
    let uri = endpoint
        .parse::<http::Uri>()
        .context(InvalidEndpointSnafu { endpoint: &endpoint })?;

    let mut config = kube::Config::new(uri);
    config.root_cert = Some(tls::load_base64_certs(&ca).context(InvalidCaCertificateSnafu)?);
    config.auth_info.token = Some(token.to_owned().into());

    Ok(config)
}

#[async_trait]
impl ClusterConnector for GkeConnector {
    async fn connect(
        &self,
        token: &str,
        project: &str,
        zone: &str,
        cluster: &str,
    ) -> Result<Arc<dyn ClusterApi>, Error> {
        let described = self.describe(token, project, zone, cluster).await?;
        let config = cluster_config(described, token, cluster)?;

        info!(project, zone, cluster, url = %config.cluster_url, "connecting to GKE cluster");
        let client = kube::Client::try_from(config).context(KubeSnafu)?;

        Ok(Arc::new(KubeCluster::new(client)))
    }
}
