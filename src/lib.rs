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

use crate::config::Endpoints;
use crate::context::Context;
use crate::types::request::BootstrapRequest;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

pub mod bootstrap;
pub mod cluster;
pub mod config;
pub mod console;
pub mod context;
pub mod iam;
pub mod locks;
pub mod types;
pub mod utils;


pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_level(true)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();
}

/// Serve bootstrap requests over HTTP until Ctrl-C.
pub async fn run_server(port: u16, endpoints: Endpoints) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = Context::from_endpoints(&endpoints)?;
    console::server::run(port, Arc::new(ctx)).await
}

/// Bootstrap a single cluster from a request file (YAML or JSON).
pub async fn apply(file: String, endpoints: Endpoints) -> Result<(), Box<dyn std::error::Error>> {
    let raw = tokio::fs::read_to_string(&file).await?;
    let request: BootstrapRequest = serde_yaml_ng::from_str(&raw)?;
    let ctx = Context::from_endpoints(&endpoints)?;

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling bootstrap");
            on_signal.cancel();
        }
    });

    bootstrap::configure_cluster(&ctx, &request, &cancel).await?;
    info!(
        project = %request.project,
        cluster = %request.cluster,
        namespace = %request.namespace,
        "cluster bootstrapped"
    );

    Ok(())
}
