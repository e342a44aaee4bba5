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

use super::{ClusterApi, Error, KubeSnafu};
use async_trait::async_trait;
use k8s_openapi::Resource as _;
use k8s_openapi::api::core::v1 as corev1;
use kube::api::{Api, PostParams};
use kube::ResourceExt;
use snafu::ResultExt;
use tracing::debug;

const NOT_FOUND: u16 = 404;
const CONFLICT: u16 = 409;

/// [`ClusterApi`] backed by a kube client.
#[derive(Clone)]
pub struct KubeCluster {
    client: kube::Client,
}

impl KubeCluster {
    pub fn new(client: kube::Client) -> Self {
        Self { client }
    }
}

/// Maps 409 and 404 from the API server to [`Error::AlreadyExists`] and
/// [`Error::NotFound`].
fn create_result<T>(
    result: Result<T, kube::Error>,
    kind: &'static str,
    name: String,
) -> Result<(), Error> {
    match result {
        Ok(_) => Ok(()),
        Err(kube::Error::Api(status)) if status.code == CONFLICT => {
            Err(Error::AlreadyExists { kind, name })
        }
        Err(kube::Error::Api(status)) if status.code == NOT_FOUND => {
            Err(Error::NotFound { kind, name })
        }
        Err(err) => Err(err).context(KubeSnafu),
    }
}

#[async_trait]
impl ClusterApi for KubeCluster {
    async fn create_namespace(&self, namespace: &corev1::Namespace) -> Result<(), Error> {
        let api: Api<corev1::Namespace> = Api::all(self.client.clone());
        let name = namespace.name_any();

        debug!(namespace = %name, "create namespace");
        let result = api.create(&PostParams::default(), namespace).await;
        create_result(result, corev1::Namespace::KIND, name)
    }

    async fn create_secret(&self, namespace: &str, secret: &corev1::Secret) -> Result<(), Error> {
        let api: Api<corev1::Secret> = Api::namespaced(self.client.clone(), namespace);
        let name = secret.name_any();

        debug!(namespace, secret = %name, "create secret");
        let result = api.create(&PostParams::default(), secret).await;
        create_result(result, corev1::Secret::KIND, format!("{}/{}", namespace, name))
    }
}
