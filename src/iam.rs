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

//! Service-account key creation through the IAM API.

use crate::config::api_url;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use snafu::futures::TryFutureExt;
use snafu::{ResultExt, Snafu};
use tracing::debug;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("IAM request failed: {}", source))]
    Http { source: reqwest::Error },

    #[snafu(display("IAM rejected the credentials ({}): {}", status, message))]
    Unauthorized { status: u16, message: String },

    #[snafu(display("IAM quota exceeded: {}", message))]
    QuotaExceeded { message: String },

    #[snafu(display("IAM API error ({}): {}", status, message))]
    Api { status: u16, message: String },

    #[snafu(display("IAM returned undecodable key data: {}", source))]
    InvalidKeyData { source: base64::DecodeError },
}

/// A freshly issued key. Only `private_key_data` is ever persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct ServiceAccountKey {
    /// `projects/{project}/serviceAccounts/{email}/keys/{id}`
    pub name: String,
    pub private_key_data: Vec<u8>,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[async_trait]
pub trait KeyManager: Send + Sync {
    /// Creates a new key for `service_account`, a fully qualified
    /// `projects/{project}/serviceAccounts/{email}` resource name.
    async fn create_service_account_key(
        &self,
        service_account: &str,
        token: &str,
    ) -> Result<ServiceAccountKey, Error>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateKeyRequest {
    private_key_type: &'static str,
    key_algorithm: &'static str,
}

impl Default for CreateKeyRequest {
    fn default() -> Self {
        Self {
            private_key_type: "TYPE_GOOGLE_CREDENTIALS_FILE",
            key_algorithm: "KEY_ALG_RSA_2048",
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyResponse {
    #[serde(default)]
    name: String,
    #[serde(default)]
    private_key_data: String,
}

#[derive(Deserialize, Default)]
struct ErrorBody {
    #[serde(default)]
    error: ErrorStatus,
}

#[derive(Deserialize, Default)]
struct ErrorStatus {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

fn decode_key(response: KeyResponse) -> Result<ServiceAccountKey, Error> {
    let private_key_data = STANDARD
        .decode(response.private_key_data)
        .context(InvalidKeyDataSnafu)?;

    Ok(ServiceAccountKey {
        name: response.name,
        private_key_data,
    })
}

/// Maps a non-success IAM response onto [`Error`].
fn classify(status: u16, body: &str) -> Error {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = if parsed.error.message.is_empty() {
        body.to_owned()
    } else {
        parsed.error.message
    };

    match (status, parsed.error.status.as_str()) {
        (401 | 403, _) | (_, "UNAUTHENTICATED" | "PERMISSION_DENIED") => {
            Error::Unauthorized { status, message }
        }
        // A service account at its live key cap is reported as a failed precondition.
        (429, _) | (_, "RESOURCE_EXHAUSTED") | (400, "FAILED_PRECONDITION") => {
            Error::QuotaExceeded { message }
        }
        _ => Error::Api { status, message },
    }
}

/// [`KeyManager`] over the IAM REST API.
#[derive(Clone)]
pub struct IamClient {
    http: reqwest::Client,
    endpoint: String,
}

impl IamClient {
    pub fn new(http: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl KeyManager for IamClient {
    async fn create_service_account_key(
        &self,
        service_account: &str,
        token: &str,
    ) -> Result<ServiceAccountKey, Error> {
        let url = api_url(&self.endpoint, &format!("v1/{}/keys", service_account));

        debug!(service_account, "create service account key");
        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(&CreateKeyRequest::default())
            .send()
            .context(HttpSnafu)
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify(status.as_u16(), &body));
        }

        let key = response.json::<KeyResponse>().context(HttpSnafu).await?;
        decode_key(key)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::tests::spawn_fake_api;
    use axum::http::StatusCode;

    const SERVICE_ACCOUNT: &str =
        "projects/proj-1/serviceAccounts/c1-admin@proj-1.iam.gserviceaccount.com";

    #[test]
    fn test_decode_key() {
        let response: KeyResponse = serde_json::from_str(
            r#"{
                "name": "projects/proj-1/serviceAccounts/c1-admin@proj-1.iam.gserviceaccount.com/keys/abc",
                "privateKeyType": "TYPE_GOOGLE_CREDENTIALS_FILE",
                "privateKeyData": "eyJ0eXBlIjoic2VydmljZV9hY2NvdW50In0="
            }"#,
        )
        .expect("response");

        let key = decode_key(response).expect("key");
        assert!(key.name.ends_with("/keys/abc"));
        assert_eq!(key.private_key_data, br#"{"type":"service_account"}"#);
    }

    #[test]
    fn test_decode_key_rejects_garbage() {
        let response = KeyResponse {
            name: String::new(),
            private_key_data: "***".to_owned(),
        };

        assert!(matches!(
            decode_key(response),
            Err(Error::InvalidKeyData { .. })
        ));
    }

    #[test]
    fn test_classify_quota() {
        let body = r#"{"error":{"code":429,"message":"Quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#;

        match classify(429, body) {
            Error::QuotaExceeded { message } => assert_eq!(message, "Quota exceeded"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_classify_key_cap() {
        let body = r#"{"error":{"code":400,"message":"Precondition check failed.","status":"FAILED_PRECONDITION"}}"#;

        match classify(400, body) {
            Error::QuotaExceeded { message } => assert_eq!(message, "Precondition check failed."),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_create_key_request() {
        let (endpoint, seen) = spawn_fake_api(
            StatusCode::OK,
            r#"{"name":"projects/proj-1/serviceAccounts/c1-admin@proj-1.iam.gserviceaccount.com/keys/k1","privateKeyData":"a2V5"}"#,
        )
        .await;
        let client = IamClient::new(reqwest::Client::new(), endpoint);

        let key = client
            .create_service_account_key(SERVICE_ACCOUNT, "tok")
            .await
            .expect("key");

        assert_eq!(key.private_key_data, b"key");
        let seen = seen.lock().expect("lock").clone().expect("request");
        assert_eq!(seen.method, "POST");
        assert_eq!(seen.path, format!("/v1/{}/keys", SERVICE_ACCOUNT));
        assert_eq!(seen.authorization.as_deref(), Some("Bearer tok"));
        let body: serde_json::Value = serde_json::from_str(&seen.body).expect("json body");
        assert_eq!(body["privateKeyType"], "TYPE_GOOGLE_CREDENTIALS_FILE");
        assert_eq!(body["keyAlgorithm"], "KEY_ALG_RSA_2048");
    }

    #[tokio::test]
    async fn test_create_key_at_key_cap() {
        let (endpoint, _) = spawn_fake_api(
            StatusCode::BAD_REQUEST,
            r#"{"error":{"code":400,"message":"Precondition check failed.","status":"FAILED_PRECONDITION"}}"#,
        )
        .await;
        let client = IamClient::new(reqwest::Client::new(), endpoint);

        let err = client
            .create_service_account_key(SERVICE_ACCOUNT, "tok")
            .await
            .expect_err("key cap");

        assert!(matches!(err, Error::QuotaExceeded { .. }), "{err}");
    }

    #[test]
    fn test_classify_auth() {
        let body = r#"{"error":{"code":403,"message":"denied","status":"PERMISSION_DENIED"}}"#;
        assert!(matches!(
            classify(403, body),
            Error::Unauthorized { status: 403, .. }
        ));
        assert!(matches!(
            classify(401, "unauthorized"),
            Error::Unauthorized { status: 401, .. }
        ));
    }

    #[test]
    fn test_classify_other() {
        match classify(400, "bad things") {
            Error::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "bad things");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_debug_hides_key_material() {
        let key = ServiceAccountKey {
            name: "keys/abc".to_owned(),
            private_key_data: b"very-secret".to_vec(),
        };

        let printed = format!("{:?}", key);
        assert!(printed.contains("keys/abc"));
        assert!(!printed.contains("very-secret"));
    }
}
