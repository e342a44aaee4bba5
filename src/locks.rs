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

//! Per-project mutual exclusion for service-account key creation.

use snafu::Snafu;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("cancelled while waiting for the lock of project '{}'", project))]
    Cancelled { project: String },
}

/// Table of project identifier to its dedicated lock.
///
/// Entries are created on first reference and live as long as the registry.
/// The registry mutex only guards the lookup/insert; it is released before
/// anyone waits on a project lock, so unrelated projects never contend.
#[derive(Default)]
pub struct ProjectLocks {
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl ProjectLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the lock dedicated to `project`, creating it on first use.
    pub fn handle(&self, project: &str) -> Arc<AsyncMutex<()>> {
        // The map is never left half-updated, a poisoned guard is still usable.
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(lock) = locks.get(project) {
            return lock.clone();
        }

        debug!(project, "registering lock for project");
        let lock = Arc::new(AsyncMutex::new(()));
        locks.insert(project.to_owned(), lock.clone());
        lock
    }

    /// Waits for the lock of `project`. The returned guard releases it on drop.
    pub async fn acquire(
        &self,
        project: &str,
        cancel: &CancellationToken,
    ) -> Result<ProjectLockGuard, Error> {
        let lock = self.handle(project);

        let guard = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return CancelledSnafu { project }.fail();
            }
            guard = lock.lock_owned() => guard,
        };

        debug!(project, "acquired project lock");
        Ok(ProjectLockGuard {
            project: project.to_owned(),
            _guard: guard,
        })
    }

    /// Number of projects seen so far.
    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

pub struct ProjectLockGuard {
    project: String,
    _guard: OwnedMutexGuard<()>,
}

impl ProjectLockGuard {
    #[cfg(test)]
    pub(crate) fn project(&self) -> &str {
        &self.project
    }
}

impl Drop for ProjectLockGuard {
    fn drop(&mut self) {
        debug!(project = %self.project, "released project lock");
    }
}
