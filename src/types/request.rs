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

use serde::{Deserialize, Serialize};
use std::fmt;
use strum::Display;

const SERVICE_ACCOUNT_DOMAIN: &str = "iam.gserviceaccount.com";

/// One bootstrap operation against a GKE cluster.
///
/// Keys are PascalCase on the wire (`Project`, `Cluster`, `ClientId`, ...).
#[derive(Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct BootstrapRequest {
    pub project: String,
    pub cluster: String,
    pub namespace: String,
    pub zone: String,

    /// OAuth access token used for both the Container and IAM APIs.
    pub token: String,

    /// Base64 (standard alphabet, padded) OAuth client id.
    pub client_id: String,

    /// Base64 (standard alphabet, padded) OAuth client secret.
    pub client_secret: String,
}

impl fmt::Debug for BootstrapRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BootstrapRequest")
            .field("project", &self.project)
            .field("cluster", &self.cluster)
            .field("namespace", &self.namespace)
            .field("zone", &self.zone)
            .field("token", &"<redacted>")
            .field("client_id", &"<redacted>")
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

impl BootstrapRequest {
    /// `{cluster}-{role}@{project}.iam.gserviceaccount.com`
    pub fn service_account_email(&self, role: ServiceAccountRole) -> String {
        format!(
            "{}-{}@{}.{}",
            self.cluster, role, self.project, SERVICE_ACCOUNT_DOMAIN
        )
    }

    /// Fully qualified IAM resource name of a service account in this project.
    pub fn service_account_resource(&self, email: &str) -> String {
        format!("projects/{}/serviceAccounts/{}", self.project, email)
    }
}

/// The two service accounts every bootstrapped cluster receives a key for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum ServiceAccountRole {
    #[strum(to_string = "admin")]
    Admin,

    #[strum(to_string = "user")]
    User,
}

impl ServiceAccountRole {
    pub fn secret_name(&self) -> String {
        format!("{}-gcp-sa", self)
    }

    pub fn key_file_name(&self) -> String {
        format!("{}.json", self.secret_name())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_service_account_naming() {
        let request = crate::tests::create_test_request();

        let admin = request.service_account_email(ServiceAccountRole::Admin);
        assert_eq!(admin, "c1-admin@proj-1.iam.gserviceaccount.com");
        assert_eq!(
            request.service_account_resource(&admin),
            "projects/proj-1/serviceAccounts/c1-admin@proj-1.iam.gserviceaccount.com"
        );
        assert_eq!(
            request.service_account_email(ServiceAccountRole::User),
            "c1-user@proj-1.iam.gserviceaccount.com"
        );
    }

    #[test]
    fn test_role_secret_names() {
        assert_eq!(ServiceAccountRole::Admin.secret_name(), "admin-gcp-sa");
        assert_eq!(ServiceAccountRole::Admin.key_file_name(), "admin-gcp-sa.json");
        assert_eq!(ServiceAccountRole::User.secret_name(), "user-gcp-sa");
        assert_eq!(ServiceAccountRole::User.key_file_name(), "user-gcp-sa.json");
    }

    #[test]
    fn test_request_wire_format() {
        let request: BootstrapRequest = serde_json::from_str(
            r#"{
                "Project": "proj-1",
                "Cluster": "c1",
                "Namespace": "tenant-a",
                "Zone": "us-east1-d",
                "Token": "ya29.token",
                "ClientId": "aWQ=",
                "ClientSecret": "c2VjcmV0"
            }"#,
        )
        .expect("valid request");

        assert_eq!(request.project, "proj-1");
        assert_eq!(request.namespace, "tenant-a");
        assert_eq!(request.client_secret, "c2VjcmV0");
    }

    #[test]
    fn test_debug_redacts_credentials() {
        let request = crate::tests::create_test_request();
        let printed = format!("{:?}", request);

        assert!(printed.contains("proj-1"));
        assert!(!printed.contains(&request.token));
        assert!(!printed.contains(&request.client_id));
    }
}
