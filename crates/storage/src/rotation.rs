// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Active file selection and size-based rotation.

use chrono::{DateTime, Duration, Utc};
use otelbox_core::{Clock, Signal, SystemClock};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};

/// UTC timestamp embedded in every file name, millisecond precision.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S_%3f";

const BYTES_PER_MB: u64 = 1024 * 1024;

/// `{signal}.{timestamp}.ndjson`
pub fn file_name(signal: Signal, at: DateTime<Utc>) -> String {
    format!("{}.{}.ndjson", signal, at.format(TIMESTAMP_FORMAT))
}

/// The error mirror for a data file: `.errors` inserted before the extension.
pub fn error_file_path(path: &Path) -> PathBuf {
    let stem = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    path.with_file_name(format!("{stem}.errors.ndjson"))
}

#[derive(Debug, Default)]
struct RotationState {
    current: Option<PathBuf>,
    last_stamp: Option<DateTime<Utc>>,
}

/// Owns the active file path for each signal.
///
/// Path generation for one signal is serialized by that signal's lock, so two
/// callers can never both mint a "current" file. Signals never share a lock.
///
/// Timestamps are strictly increasing per signal: when the clock returns a
/// millisecond that is not after the last one issued (two rotations inside
/// the same millisecond, or the wall clock stepping back), the next stamp is
/// the previous one plus a millisecond.
pub struct FileRotationService<C: Clock = SystemClock> {
    clock: C,
    states: [Mutex<RotationState>; 3],
}

impl<C: Clock> FileRotationService<C> {
    pub fn new(clock: C) -> Self {
        Self { clock, states: Default::default() }
    }

    /// The cached path for `signal`, minting one on first use.
    ///
    /// Creates `output_dir` when a path is minted.
    pub fn get_or_create_file_path(
        &self,
        output_dir: &Path,
        signal: Signal,
    ) -> std::io::Result<PathBuf> {
        let mut state = self.states[signal.index()].lock();
        if let Some(path) = &state.current {
            return Ok(path.clone());
        }
        let path = self.mint(&mut state, output_dir, signal)?;
        tracing::debug!(%signal, path = %path.display(), "opened telemetry file");
        Ok(path)
    }

    /// Whether the file at `path` has reached `max_size_mb`.
    ///
    /// A missing file never needs rotation.
    pub fn should_rotate(path: &Path, max_size_mb: u64) -> bool {
        match std::fs::metadata(path) {
            Ok(meta) => meta.len() >= max_size_mb.saturating_mul(BYTES_PER_MB),
            Err(_) => false,
        }
    }

    /// Replace the cached path for `signal` with a freshly minted one.
    pub fn rotate_file(&self, output_dir: &Path, signal: Signal) -> std::io::Result<PathBuf> {
        let mut state = self.states[signal.index()].lock();
        let previous = state.current.clone();
        let path = self.mint(&mut state, output_dir, signal)?;
        tracing::info!(%signal, from = ?previous, to = ?path, "rotated telemetry file");
        Ok(path)
    }

    /// The cached path for `signal`, if one has been minted.
    pub fn current_path(&self, signal: Signal) -> Option<PathBuf> {
        self.states[signal.index()].lock().current.clone()
    }

    fn mint(
        &self,
        state: &mut RotationState,
        output_dir: &Path,
        signal: Signal,
    ) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(output_dir)?;
        let stamp = next_stamp(self.clock.utc_now(), state.last_stamp);
        let path = output_dir.join(file_name(signal, stamp));
        state.last_stamp = Some(stamp);
        state.current = Some(path.clone());
        Ok(path)
    }
}

fn next_stamp(now: DateTime<Utc>, last: Option<DateTime<Utc>>) -> DateTime<Utc> {
    let now = DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now);
    match last {
        Some(last) if now <= last => last + Duration::milliseconds(1),
        _ => now,
    }
}

#[cfg(test)]
#[path = "rotation_tests.rs"]
mod tests;
