// Copyright 2024 RustFS Team
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

use clap::{Parser, Subcommand};
use cluster_bootstrap::config::Endpoints;
use shadow_rs::shadow;

shadow!(build);

#[derive(Parser)]
#[command(name = "cluster-bootstrap")]
#[command(about = "Security bootstrap for GKE clusters", long_about = None)]
#[command(version = build::CLAP_LONG_VERSION)]
struct Cli {
    #[command(flatten)]
    endpoints: Endpoints,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bootstrap a single cluster from a request file
    Apply {
        /// Path to a YAML or JSON bootstrap request
        #[arg(short, long)]
        file: String,
    },

    /// Serve bootstrap requests over HTTP
    Server {
        #[arg(short, long, env = "BOOTSTRAP_PORT", default_value_t = 8080)]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    cluster_bootstrap::init_tracing();

    match cli.command {
        Commands::Apply { file } => cluster_bootstrap::apply(file, cli.endpoints).await?,
        Commands::Server { port } => cluster_bootstrap::run_server(port, cli.endpoints).await?,
    }

    Ok(())
}
