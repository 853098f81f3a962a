// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Locked read-modify-write of the registry file.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use fs2::FileExt;
use tracing::warn;

use super::{PidEntry, RegistryError};

#[derive(Debug, Clone)]
pub(super) struct RegistryFile {
    path: PathBuf,
    lock_path: PathBuf,
    attempts: u32,
    backoff: Duration,
}

impl RegistryFile {
    pub(super) fn new(path: PathBuf, attempts: u32, backoff: Duration) -> Self {
        let mut lock_path = path.clone().into_os_string();
        lock_path.push(".lock");
        Self { path, lock_path: PathBuf::from(lock_path), attempts, backoff }
    }

    pub(super) fn path(&self) -> &Path {
        &self.path
    }

    /// Parse the whole file. Absent or unparseable reads as empty.
    pub(super) fn read(&self) -> Vec<PidEntry> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to read registry");
                return Vec::new();
            }
        };
        if contents.trim().is_empty() {
            return Vec::new();
        }
        serde_json::from_str(&contents).unwrap_or_else(|e| {
            warn!(path = %self.path.display(), error = %e, "ignoring invalid registry");
            Vec::new()
        })
    }

    /// Apply `f` to the entries under the exclusive lock and persist the
    /// result. The file is deleted when no entries remain.
    pub(super) fn update<T>(
        &self,
        f: impl FnOnce(&mut Vec<PidEntry>) -> T,
    ) -> Result<T, RegistryError> {
        let _lock = self.lock()?;
        let mut entries = self.read();
        let before = entries.clone();
        let out = f(&mut entries);
        if entries != before || (entries.is_empty() && self.path.exists()) {
            self.persist(&entries)?;
        }
        Ok(out)
    }

    fn lock(&self) -> Result<File, RegistryError> {
        if let Some(dir) = self.lock_path.parent() {
            std::fs::create_dir_all(dir).map_err(|source| self.io_error(dir, source))?;
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.lock_path)
            .map_err(|source| self.io_error(&self.lock_path, source))?;

        for attempt in 1..=self.attempts {
            match file.try_lock_exclusive() {
                Ok(()) => return Ok(file),
                Err(_) if attempt < self.attempts => std::thread::sleep(self.backoff),
                Err(_) => break,
            }
        }
        warn!(
            path = %self.lock_path.display(),
            attempts = self.attempts,
            "gave up waiting for registry lock"
        );
        Err(RegistryError::LockContended(self.path.clone()))
    }

    fn persist(&self, entries: &[PidEntry]) -> Result<(), RegistryError> {
        if entries.is_empty() {
            return match std::fs::remove_file(&self.path) {
                Err(e) if e.kind() != std::io::ErrorKind::NotFound => {
                    Err(self.io_error(&self.path, e))
                }
                _ => Ok(()),
            };
        }

        let mut json = serde_json::to_string_pretty(entries)?;
        json.push('\n');

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(format!(".{}.tmp", std::process::id()));
        let tmp = PathBuf::from(tmp);

        let write = || -> std::io::Result<()> {
            let mut file = File::create(&tmp)?;
            file.write_all(json.as_bytes())?;
            file.sync_all()?;
            std::fs::rename(&tmp, &self.path)
        };
        write().map_err(|source| {
            let _ = std::fs::remove_file(&tmp);
            self.io_error(&self.path, source)
        })
    }

    fn io_error(&self, path: &Path, source: std::io::Error) -> RegistryError {
        RegistryError::Io { path: path.to_path_buf(), source }
    }
}
