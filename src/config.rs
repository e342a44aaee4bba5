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

use clap::Args;

pub const DEFAULT_IAM_ENDPOINT: &str = "https://iam.googleapis.com";
pub const DEFAULT_CONTAINER_ENDPOINT: &str = "https://container.googleapis.com";

/// Base URLs of the Google Cloud APIs the bootstrap talks to.
#[derive(Args, Clone, Debug, PartialEq, Eq)]
pub struct Endpoints {
    /// IAM API base URL
    #[arg(
        long = "iam-endpoint",
        env = "BOOTSTRAP_IAM_ENDPOINT",
        default_value = DEFAULT_IAM_ENDPOINT,
        global = true
    )]
    pub iam: String,

    /// Kubernetes Engine API base URL
    #[arg(
        long = "container-endpoint",
        env = "BOOTSTRAP_CONTAINER_ENDPOINT",
        default_value = DEFAULT_CONTAINER_ENDPOINT,
        global = true
    )]
    pub container: String,
}

/// Joins a base URL and an absolute API path.
pub(crate) fn api_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url() {
        assert_eq!(
            api_url("https://iam.googleapis.com/", "/v1/projects/p"),
            "https://iam.googleapis.com/v1/projects/p"
        );
        assert_eq!(api_url("http://127.0.0.1:9000", "v1/x"), "http://127.0.0.1:9000/v1/x");
    }
}
