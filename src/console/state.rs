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

use crate::context::Context;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Console application state
#[derive(Clone)]
pub struct AppState {
    pub ctx: Arc<Context>,

    /// Cancelled on server shutdown; every request works under a child token.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(ctx: Arc<Context>, shutdown: CancellationToken) -> Self {
        Self { ctx, shutdown }
    }
}
