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

//! Objects written into the tenant namespace.

use k8s_openapi::ByteString;
use k8s_openapi::api::core::v1 as corev1;
use k8s_openapi::apimachinery::pkg::apis::meta::v1 as metav1;
use std::collections::BTreeMap;

pub const OAUTH_SECRET_NAME: &str = "kubeflow-oauth";
pub const OAUTH_CLIENT_ID_KEY: &str = "client_id";
pub const OAUTH_CLIENT_SECRET_KEY: &str = "client_secret";

/// Secret payload: key name to raw bytes.
pub type Payload = BTreeMap<String, Vec<u8>>;

pub fn new_namespace(name: &str) -> corev1::Namespace {
    corev1::Namespace {
        metadata: metav1::ObjectMeta {
            name: Some(name.to_owned()),
            ..Default::default()
        },
        ..Default::default()
    }
}

pub fn new_secret(namespace: &str, name: &str, payload: Payload) -> corev1::Secret {
    corev1::Secret {
        metadata: metav1::ObjectMeta {
            name: Some(name.to_owned()),
            namespace: Some(namespace.to_owned()),
            ..Default::default()
        },
        data: Some(
            payload
                .into_iter()
                .map(|(key, value)| (key, ByteString(value)))
                .collect(),
        ),
        ..Default::default()
    }
}

pub fn oauth_payload(client_id: Vec<u8>, client_secret: Vec<u8>) -> Payload {
    BTreeMap::from([
        (OAUTH_CLIENT_ID_KEY.to_owned(), client_id),
        (OAUTH_CLIENT_SECRET_KEY.to_owned(), client_secret),
    ])
}

pub fn key_payload(key_file_name: &str, private_key: Vec<u8>) -> Payload {
    BTreeMap::from([(key_file_name.to_owned(), private_key)])
}
