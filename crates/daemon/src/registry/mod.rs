// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cross-process registry of running receivers.
//!
//! One JSON array of [`PidEntry`] shared by every receiver and CLI process
//! on the host. Mutations hold an exclusive lock on a sidecar `.lock` file
//! and replace the data file atomically, so readers never need the lock and
//! never see a partial write. The data file is removed once it is empty.

mod store;

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use otelbox_core::{Clock, SystemClock};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::process::{is_expected_name, ProcessTable, SystemProcessTable};
use store::RegistryFile;

/// Registry file name inside the registry directory.
pub const REGISTRY_FILE: &str = "otelbox-instances.json";

const LOCK_ATTEMPTS: u32 = 5;
const LOCK_BACKOFF: Duration = Duration::from_millis(50);

/// One receiver listening on one port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PidEntry {
    pub pid: u32,
    pub port: u16,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("registry at {} is locked by another process", .0.display())]
    LockContended(PathBuf),

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode registry: {0}")]
    Json(#[from] serde_json::Error),

    #[error("registry task failed: {0}")]
    Task(String),
}

/// Registry access for one process.
///
/// Registration is keyed by the table's current pid. A process that
/// registers twice gets two entries; unregistering removes all of them.
///
/// Every method is blocking: mutations sleep between lock attempts. Async
/// code runs them through [`PidFileService::blocking`].
#[derive(Debug, Clone)]
pub struct PidFileService<P: ProcessTable = SystemProcessTable, C: Clock = SystemClock> {
    file: RegistryFile,
    processes: P,
    clock: C,
}

impl PidFileService<SystemProcessTable, SystemClock> {
    /// Registry in [`crate::env::registry_dir`], backed by the real OS.
    pub fn system() -> Self {
        Self::new(crate::env::registry_dir(), SystemProcessTable, SystemClock)
    }
}

impl<P: ProcessTable, C: Clock> PidFileService<P, C> {
    pub fn new(dir: impl AsRef<Path>, processes: P, clock: C) -> Self {
        Self {
            file: RegistryFile::new(dir.as_ref().join(REGISTRY_FILE), LOCK_ATTEMPTS, LOCK_BACKOFF),
            processes,
            clock,
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn processes(&self) -> &P {
        &self.processes
    }

    /// Append an entry for the current process on `port`.
    pub fn register(&self, port: u16) -> Result<PidEntry, RegistryError> {
        let entry =
            PidEntry { pid: self.processes.current_pid(), port, timestamp: self.clock.utc_now() };
        let added = entry.clone();
        self.file
            .update(|entries| {
                entries.push(added);
            })
            .inspect_err(|e| warn!(port, error = %e, "failed to register instance"))?;
        info!(pid = entry.pid, port, "registered instance");
        Ok(entry)
    }

    /// Remove every entry for the current process. Returns how many were
    /// removed; zero when nothing was registered or the file is absent.
    pub fn unregister(&self) -> Result<usize, RegistryError> {
        let pid = self.processes.current_pid();
        let removed = self
            .file
            .update(|entries| {
                let before = entries.len();
                entries.retain(|e| e.pid != pid);
                before - entries.len()
            })
            .inspect_err(|e| warn!(pid, error = %e, "failed to unregister instance"))?;
        if removed > 0 {
            info!(pid, removed, "unregistered instance");
        }
        Ok(removed)
    }

    /// Every entry, stale or not. Empty when the file is absent or invalid.
    pub fn get_registered_entries(&self) -> Vec<PidEntry> {
        self.file.read()
    }

    pub fn get_entry_by_pid(&self, pid: u32) -> Option<PidEntry> {
        self.get_registered_entries().into_iter().find(|e| e.pid == pid)
    }

    pub fn get_entry_by_port(&self, port: u16) -> Option<PidEntry> {
        self.get_registered_entries().into_iter().find(|e| e.port == port)
    }

    pub fn get_registered_entries_for_port(&self, port: u16) -> Vec<PidEntry> {
        self.get_registered_entries().into_iter().filter(|e| e.port == port).collect()
    }

    /// Drop entries whose process is gone or is not an otelbox receiver.
    /// Returns the number removed.
    pub fn clean_stale_entries(&self) -> Result<usize, RegistryError> {
        let removed = self
            .file
            .update(|entries| {
                let before = entries.len();
                entries.retain(|e| {
                    let live = self.is_running(e);
                    if !live {
                        debug!(pid = e.pid, port = e.port, "dropping stale registry entry");
                    }
                    live
                });
                before - entries.len()
            })
            .inspect_err(|e| warn!(error = %e, "failed to clean registry"))?;
        if removed > 0 {
            info!(removed, "cleaned stale registry entries");
        }
        Ok(removed)
    }

    /// Run `f` against a clone of this registry on tokio's blocking pool.
    pub async fn blocking<T, F>(&self, f: F) -> Result<T, RegistryError>
    where
        T: Send + 'static,
        F: FnOnce(&Self) -> Result<T, RegistryError> + Send + 'static,
    {
        let registry = self.clone();
        tokio::task::spawn_blocking(move || f(&registry))
            .await
            .map_err(|e| RegistryError::Task(e.to_string()))?
    }

    /// A live process at the entry's pid whose name is an otelbox binary.
    pub fn is_running(&self, entry: &PidEntry) -> bool {
        self.processes.is_alive(entry.pid)
            && self.processes.process_name(entry.pid).is_some_and(|name| is_expected_name(&name))
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
