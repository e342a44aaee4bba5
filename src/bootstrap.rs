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
use crate::context::Context;
use crate::types::request::{BootstrapRequest, ServiceAccountRole};
use crate::types::secret::{
    OAUTH_CLIENT_ID_KEY, OAUTH_CLIENT_SECRET_KEY, OAUTH_SECRET_NAME, new_namespace,
    oauth_payload,
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use snafu::{ResultExt, Snafu};
use std::future::Future;
use strum::{Display, EnumIter};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

pub mod key;
pub mod secret;

pub use key::provision_key;
pub use secret::install_secret;

/// Bootstrap steps in execution order. Each runs only if all earlier ones
/// succeeded; completed steps are never undone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, EnumIter)]
pub enum Step {
    #[strum(to_string = "connect to cluster")]
    ConnectCluster,

    #[strum(to_string = "create namespace")]
    CreateNamespace,

    #[strum(to_string = "install oauth credentials")]
    InstallOauthCredentials,

    #[strum(to_string = "provision admin service account key")]
    ProvisionAdminKey,

    #[strum(to_string = "provision user service account key")]
    ProvisionUserKey,
}

impl Step {
    pub fn index(self) -> usize {
        self as usize
    }

    /// Progress message logged when the step starts.
    pub fn progress(self) -> &'static str {
        match self {
            Step::ConnectCluster => "connecting to cluster",
            Step::CreateNamespace => "creating namespace",
            Step::InstallOauthCredentials => "inserting oauth credentials",
            Step::ProvisionAdminKey | Step::ProvisionUserKey => "inserting service account keys",
        }
    }
}

#[derive(Snafu, Debug)]
#[snafu(visibility(pub(crate)))]
pub enum StepError {
    #[snafu(transparent)]
    Cluster { source: cluster::Error },

    #[snafu(display("failed decoding oauth {}: {}", field, source))]
    DecodeCredential {
        field: &'static str,
        source: base64::DecodeError,
    },

    #[snafu(transparent)]
    Key { source: key::Error },

    #[snafu(display("cancelled"))]
    Cancelled,
}

/// The first failing step and its cause. Steps before it stay applied.
#[derive(Snafu, Debug)]
pub enum Error {
    #[snafu(display("step {} ({}) failed: {}", step.index(), step, source))]
    Aborted { step: Step, source: StepError },
}

impl Error {
    pub fn step(&self) -> Step {
        match self {
            Error::Aborted { step, .. } => *step,
        }
    }

    pub fn cause(&self) -> &StepError {
        match self {
            Error::Aborted { source, .. } => source,
        }
    }
}

async fn run_step<T, F>(step: Step, cancel: &CancellationToken, fut: F) -> Result<T, Error>
where
    F: Future<Output = Result<T, StepError>>,
{
    if cancel.is_cancelled() {
        return Err(StepError::Cancelled).context(AbortedSnafu { step });
    }

    info!(step = step.index(), "{}", step.progress());
    fut.await
        .inspect_err(|err| error!(step = step.index(), error = %err, "failed to {}", step))
        .context(AbortedSnafu { step })
}

fn decode_credential(field: &'static str, encoded: &str) -> Result<Vec<u8>, StepError> {
    STANDARD
        .decode(encoded)
        .context(DecodeCredentialSnafu { field })
}

async fn install_oauth_credentials(
    cluster: &dyn ClusterApi,
    request: &BootstrapRequest,
) -> Result<(), StepError> {
    // Both values are decoded before anything is written.
    let client_id = decode_credential(OAUTH_CLIENT_ID_KEY, &request.client_id)?;
    let client_secret = decode_credential(OAUTH_CLIENT_SECRET_KEY, &request.client_secret)?;

    install_secret(
        cluster,
        &request.namespace,
        OAUTH_SECRET_NAME,
        oauth_payload(client_id, client_secret),
    )
    .await?;
    Ok(())
}

async fn provision_role_key(
    ctx: &Context,
    cluster: &dyn ClusterApi,
    request: &BootstrapRequest,
    role: ServiceAccountRole,
    cancel: &CancellationToken,
) -> Result<(), StepError> {
    provision_key(
        ctx,
        cluster,
        request,
        &role.key_file_name(),
        &role.secret_name(),
        &request.service_account_email(role),
        cancel,
    )
    .await?;
    Ok(())
}

/// Bootstraps the tenant namespace of the cluster named by `request`:
/// namespace, OAuth client secret, then the admin and user service-account
/// key secrets.
///
/// Stops at the first failure and reports that step. Nothing is rolled back,
/// so re-running a partially applied request fails on the objects that
/// already exist.
pub async fn configure_cluster(
    ctx: &Context,
    request: &BootstrapRequest,
    cancel: &CancellationToken,
) -> Result<(), Error> {
    let cluster = run_step(Step::ConnectCluster, cancel, async {
        ctx.connector
            .connect(
                &request.token,
                &request.project,
                &request.zone,
                &request.cluster,
            )
            .await
            .map_err(StepError::from)
    })
    .await?;

    run_step(Step::CreateNamespace, cancel, async {
        cluster
            .create_namespace(&new_namespace(&request.namespace))
            .await
            .map_err(StepError::from)
    })
    .await?;

    run_step(
        Step::InstallOauthCredentials,
        cancel,
        install_oauth_credentials(cluster.as_ref(), request),
    )
    .await?;

    for (step, role) in [
        (Step::ProvisionAdminKey, ServiceAccountRole::Admin),
        (Step::ProvisionUserKey, ServiceAccountRole::User),
    ] {
        run_step(
            step,
            cancel,
            provision_role_key(ctx, cluster.as_ref(), request, role, cancel),
        )
        .await?;
    }

    info!(
        project = %request.project,
        cluster = %request.cluster,
        namespace = %request.namespace,
        "cluster bootstrap complete"
    );
    Ok(())
}
