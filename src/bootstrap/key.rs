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

use super::secret::install_secret;
use crate::cluster::{self, ClusterApi};
use crate::context::Context;
use crate::types::request::BootstrapRequest;
use crate::types::secret::key_payload;
use crate::{iam, locks};
use snafu::Snafu;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Key provisioning failures. IAM and cluster errors pass through unchanged.
#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(transparent)]
    Lock { source: locks::Error },

    #[snafu(transparent)]
    Iam { source: iam::Error },

    #[snafu(transparent)]
    Secret { source: cluster::Error },

    #[snafu(display("cancelled while creating a key for '{}'", service_account))]
    Cancelled { service_account: String },
}

/// Creates a key for `service_account_email` and stores it in the request's
/// namespace as secret `secret_name` under `key_file_name`.
///
/// Key creation is serialized per project: IAM caps the number of live keys
/// per service account, and concurrent bootstraps of one project would race
/// for that cap. The project lock is held until the secret is written.
pub async fn provision_key(
    ctx: &Context,
    cluster: &dyn ClusterApi,
    request: &BootstrapRequest,
    key_file_name: &str,
    secret_name: &str,
    service_account_email: &str,
    cancel: &CancellationToken,
) -> Result<(), Error> {
    let service_account = request.service_account_resource(service_account_email);

    let _guard = ctx.locks.acquire(&request.project, cancel).await?;

    let key = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            return CancelledSnafu { service_account: service_account.as_str() }.fail();
        }
        key = ctx.keys.create_service_account_key(&service_account, &request.token) => key,
    };

    let key = key.inspect_err(
        |err| debug!(%service_account, error = %err, "failed creating service account key"),
    )?;

    // From here on the key exists in IAM, the secret write is not abandoned.
    let payload = key_payload(key_file_name, key.private_key_data);
    if let Err(err) = install_secret(cluster, &request.namespace, secret_name, payload).await {
        // TODO: delete the orphaned key once rollback of issued keys is decided on.
        warn!(
            key = %key.name,
            %service_account,
            "service account key was created but could not be stored, it still counts against the key quota"
        );
        return Err(err.into());
    }

    info!(
        %service_account,
        namespace = %request.namespace,
        secret = secret_name,
        "stored service account key"
    );
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::tests::{FakeCluster, FakeKeyManager, create_test_context, create_test_request};
    use crate::types::request::ServiceAccountRole;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    const ADMIN_EMAIL: &str = "c1-admin@proj-1.iam.gserviceaccount.com";

    #[tokio::test]
    async fn test_provision_key_writes_secret() {
        let cluster = Arc::new(FakeCluster::with_namespace("tenant-a"));
        let keys = Arc::new(FakeKeyManager::default());
        let ctx = create_test_context(cluster.clone(), keys.clone());
        let request = create_test_request();

        provision_key(
            &ctx,
            cluster.as_ref(),
            &request,
            "admin-gcp-sa.json",
            "admin-gcp-sa",
            ADMIN_EMAIL,
            &CancellationToken::new(),
        )
        .await
        .expect("provisioned");

        let resource = format!("projects/proj-1/serviceAccounts/{}", ADMIN_EMAIL);
        assert_eq!(keys.requests(), vec![resource.clone()]);
        assert_eq!(keys.tokens(), vec![request.token.clone()]);
        assert_eq!(
            cluster.secret_value("tenant-a", "admin-gcp-sa", "admin-gcp-sa.json"),
            Some(FakeKeyManager::key_material(&resource))
        );
        assert_eq!(ctx.locks.len(), 1);
    }

    #[tokio::test]
    async fn test_iam_error_is_surfaced_unchanged() {
        let cluster = Arc::new(FakeCluster::with_namespace("tenant-a"));
        let keys = Arc::new(FakeKeyManager::quota_exceeded_for("c1-admin"));
        let ctx = create_test_context(cluster.clone(), keys.clone());

        let err = provision_key(
            &ctx,
            cluster.as_ref(),
            &create_test_request(),
            "admin-gcp-sa.json",
            "admin-gcp-sa",
            ADMIN_EMAIL,
            &CancellationToken::new(),
        )
        .await
        .expect_err("quota exceeded");

        assert!(matches!(
            err,
            Error::Iam {
                source: iam::Error::QuotaExceeded { .. }
            }
        ));
        assert_eq!(cluster.secret_count(), 0);
    }

    #[tokio::test]
    async fn test_secret_collision_is_surfaced_after_key_creation() {
        let cluster = Arc::new(FakeCluster::with_namespace("tenant-a"));
        let keys = Arc::new(FakeKeyManager::default());
        let ctx = create_test_context(cluster.clone(), keys.clone());
        let request = create_test_request();
        let cancel = CancellationToken::new();

        for _ in 0..2 {
            let _ = provision_key(
                &ctx,
                cluster.as_ref(),
                &request,
                "admin-gcp-sa.json",
                "admin-gcp-sa",
                ADMIN_EMAIL,
                &cancel,
            )
            .await;
        }

        let err = provision_key(
            &ctx,
            cluster.as_ref(),
            &request,
            "admin-gcp-sa.json",
            "admin-gcp-sa",
            ADMIN_EMAIL,
            &cancel,
        )
        .await
        .expect_err("secret exists");

        assert!(matches!(err, Error::Secret { ref source } if source.is_already_exists()));
        // No rollback: every attempt created a key in IAM.
        assert_eq!(keys.requests().len(), 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_same_project_key_creation_is_serialized() {
        let cluster = Arc::new(FakeCluster::with_namespace("tenant-a"));
        let keys = Arc::new(FakeKeyManager::default().with_delay(Duration::from_millis(20)));
        let ctx = Arc::new(create_test_context(cluster.clone(), keys.clone()));

        let tasks: Vec<_> = (0..4)
            .map(|i| {
                let ctx = ctx.clone();
                let cluster = cluster.clone();
                tokio::spawn(async move {
                    let request = create_test_request();
                    provision_key(
                        &ctx,
                        cluster.as_ref(),
                        &request,
                        "key.json",
                        &format!("key-{}", i),
                        ADMIN_EMAIL,
                        &CancellationToken::new(),
                    )
                    .await
                })
            })
            .collect();

        for task in tasks {
            task.await.expect("task panicked").expect("provisioned");
        }

        assert_eq!(keys.max_in_flight(), 1);
        assert_eq!(cluster.secret_count(), 4);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_different_projects_create_keys_concurrently() {
        let cluster = Arc::new(FakeCluster::with_namespace("tenant-a"));
        let keys = Arc::new(FakeKeyManager::default().with_delay(Duration::from_millis(100)));
        let ctx = Arc::new(create_test_context(cluster.clone(), keys.clone()));

        let tasks: Vec<_> = ["proj-1", "proj-2"]
            .into_iter()
            .map(|project| {
                let ctx = ctx.clone();
                let cluster = cluster.clone();
                tokio::spawn(async move {
                    let mut request = create_test_request();
                    request.project = project.to_owned();
                    let email = request.service_account_email(ServiceAccountRole::Admin);
                    provision_key(
                        &ctx,
                        cluster.as_ref(),
                        &request,
                        "key.json",
                        &format!("key-{}", project),
                        &email,
                        &CancellationToken::new(),
                    )
                    .await
                })
            })
            .collect();

        for task in tasks {
            task.await.expect("task panicked").expect("provisioned");
        }

        assert_eq!(keys.max_in_flight(), 2);
        assert_eq!(ctx.locks.len(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_lock_released_after_failure() {
        let delay = Duration::from_millis(200);
        let cluster = Arc::new(FakeCluster::with_namespace("tenant-a"));
        let keys = Arc::new(FakeKeyManager::quota_exceeded_for("c1-admin").with_delay(delay));
        let ctx = Arc::new(create_test_context(cluster.clone(), keys.clone()));

        let spawn_provision = |role: ServiceAccountRole| {
            let ctx = ctx.clone();
            let cluster = cluster.clone();
            tokio::spawn(async move {
                let request = create_test_request();
                provision_key(
                    &ctx,
                    cluster.as_ref(),
                    &request,
                    &role.key_file_name(),
                    &role.secret_name(),
                    &request.service_account_email(role),
                    &CancellationToken::new(),
                )
                .await
            })
        };

        let started = Instant::now();
        let first = spawn_provision(ServiceAccountRole::Admin);
        while keys.requests().is_empty() {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }

        // The first call now holds the project lock inside its failing key request.
        let second = spawn_provision(ServiceAccountRole::User);

        let failed = first.await.expect("task panicked");
        let first_took = started.elapsed();
        assert!(matches!(
            failed,
            Err(Error::Iam {
                source: iam::Error::QuotaExceeded { .. }
            })
        ));

        let next = tokio::time::timeout(first_took + delay + Duration::from_secs(1), second)
            .await
            .expect("second call stayed blocked after the first failed")
            .expect("task panicked");

        assert!(next.is_ok());
        assert_eq!(keys.requests().len(), 2);
        assert_eq!(keys.max_in_flight(), 1);
        assert_eq!(cluster.secret_keys("tenant-a", "user-gcp-sa"), vec!["user-gcp-sa.json"]);
    }

    #[tokio::test]
    async fn test_cancelled_while_waiting_for_lock() {
        let cluster = Arc::new(FakeCluster::with_namespace("tenant-a"));
        let keys = Arc::new(FakeKeyManager::default());
        let ctx = create_test_context(cluster.clone(), keys.clone());
        let cancel = CancellationToken::new();

        let _held = ctx
            .locks
            .acquire("proj-1", &CancellationToken::new())
            .await
            .expect("acquire");
        cancel.cancel();

        let err = provision_key(
            &ctx,
            cluster.as_ref(),
            &create_test_request(),
            "admin-gcp-sa.json",
            "admin-gcp-sa",
            ADMIN_EMAIL,
            &cancel,
        )
        .await
        .expect_err("cancelled");

        assert!(matches!(err, Error::Lock { .. }));
        assert!(keys.requests().is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_during_key_creation() {
        let cluster = Arc::new(FakeCluster::with_namespace("tenant-a"));
        let keys = Arc::new(FakeKeyManager::default().with_delay(Duration::from_secs(10)));
        let ctx = create_test_context(cluster.clone(), keys.clone());
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let err = provision_key(
            &ctx,
            cluster.as_ref(),
            &create_test_request(),
            "admin-gcp-sa.json",
            "admin-gcp-sa",
            ADMIN_EMAIL,
            &cancel,
        )
        .await
        .expect_err("cancelled");

        assert!(matches!(err, Error::Cancelled { .. }));
        assert_eq!(cluster.secret_count(), 0);

        // The project lock is free again.
        let reacquired = tokio::time::timeout(
            Duration::from_millis(100),
            ctx.locks.acquire("proj-1", &CancellationToken::new()),
        )
        .await;
        assert!(matches!(reacquired, Ok(Ok(_))));
    }
}
