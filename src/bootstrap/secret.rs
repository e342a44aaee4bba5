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

use crate::cluster::{self, ClusterApi};
use crate::types::secret::{Payload, new_secret};
use tracing::debug;

/// Creates secret `name` in `namespace`. Never overwrites: an existing secret
/// of the same name yields [`cluster::Error::AlreadyExists`] and is left as is.
///
/// The namespace must already exist.
pub async fn install_secret(
    cluster: &dyn ClusterApi,
    namespace: &str,
    name: &str,
    payload: Payload,
) -> Result<(), cluster::Error> {
    let keys: Vec<&str> = payload.keys().map(String::as_str).collect();
    debug!(namespace, name, ?keys, "installing secret");

    let secret = new_secret(namespace, name, payload);
    cluster
        .create_secret(namespace, &secret)
        .await
        .inspect_err(|err| debug!(namespace, name, error = %err, "failed creating secret"))
}
