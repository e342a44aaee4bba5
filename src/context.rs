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

use crate::cluster::{ClusterConnector, GkeConnector};
use crate::config::Endpoints;
use crate::iam::{IamClient, KeyManager};
use crate::locks::ProjectLocks;
use snafu::{ResultExt, Snafu};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("failed to build HTTP client: {}", source))]
    HttpClient { source: reqwest::Error },
}

/// State shared by every bootstrap request served by this process.
pub struct Context {
    pub(crate) locks: ProjectLocks,
    pub(crate) connector: Arc<dyn ClusterConnector>,
    pub(crate) keys: Arc<dyn KeyManager>,
}

impl Context {
    pub fn new(connector: Arc<dyn ClusterConnector>, keys: Arc<dyn KeyManager>) -> Self {
        Self {
            locks: ProjectLocks::new(),
            connector,
            keys,
        }
    }

    /// Context talking to the real GKE and IAM APIs.
    pub fn from_endpoints(endpoints: &Endpoints) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context(HttpClientSnafu)?;

        info!(
            iam = %endpoints.iam,
            container = %endpoints.container,
            "using Google Cloud endpoints"
        );

        Ok(Self::new(
            Arc::new(GkeConnector::new(http.clone(), endpoints.container.clone())),
            Arc::new(IamClient::new(http, endpoints.iam.clone())),
        ))
    }
}
