// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only NDJSON writer with error mirroring.

use crate::error::WriterError;
use crate::rotation::{error_file_path, FileRotationService};
use otelbox_core::{
    contains_errors, Clock, HealthMonitor, Signal, SystemClock, TelemetryBatch,
    TelemetryStatistics,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Scalars the writer needs from the receiver configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterConfig {
    pub output_dir: PathBuf,
    pub max_file_size_mb: u64,
    /// Indented output. Each batch then spans several lines.
    pub pretty_json: bool,
}

impl WriterConfig {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self { output_dir: output_dir.into(), max_file_size_mb: 100, pretty_json: false }
    }

    otelbox_core::setters! {
        set {
            max_file_size_mb: u64,
            pretty_json: bool,
        }
    }
}

/// Where a successful write landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteReceipt {
    pub path: PathBuf,
    /// Set when the batch carried errors and was mirrored.
    pub error_path: Option<PathBuf>,
}

/// Persists telemetry batches, one JSON document per batch.
///
/// Each signal has a write lock held from the rotation check through the
/// error mirror, so a batch never straddles a rotation and the two files of a
/// pair always receive lines in the same order. Different signals write in
/// parallel.
///
/// Every attempt reports to the [`HealthMonitor`]; successful writes bump the
/// signal's counter. Failed writes are not retried.
pub struct TelemetryFileWriter<C: Clock = SystemClock> {
    config: WriterConfig,
    rotation: FileRotationService<C>,
    health: Arc<HealthMonitor>,
    stats: Arc<TelemetryStatistics>,
    locks: [Mutex<()>; 3],
    closed: AtomicBool,
}

impl<C: Clock> TelemetryFileWriter<C> {
    pub fn new(
        config: WriterConfig,
        clock: C,
        health: Arc<HealthMonitor>,
        stats: Arc<TelemetryStatistics>,
    ) -> Self {
        Self {
            config,
            rotation: FileRotationService::new(clock),
            health,
            stats,
            locks: Default::default(),
            closed: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &WriterConfig {
        &self.config
    }

    pub fn health(&self) -> &Arc<HealthMonitor> {
        &self.health
    }

    pub fn stats(&self) -> &Arc<TelemetryStatistics> {
        &self.stats
    }

    /// Append `batch` to the current file for `signal`.
    ///
    /// `signal` must match the batch contents.
    pub async fn write(
        &self,
        batch: &TelemetryBatch,
        signal: Signal,
    ) -> Result<WriteReceipt, WriterError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(WriterError::Closed);
        }
        if batch.signal() != signal {
            return Err(WriterError::SignalMismatch { expected: signal, actual: batch.signal() });
        }

        let _guard = self.locks[signal.index()].lock().await;
        // close() may have run while we waited
        if self.closed.load(Ordering::Acquire) {
            return Err(WriterError::Closed);
        }

        match self.write_locked(batch, signal).await {
            Ok(receipt) => {
                self.health.record_success();
                self.stats.increment(signal);
                Ok(receipt)
            }
            Err(e) => {
                tracing::warn!(%signal, error = %e, "telemetry write failed");
                self.health.record_error(e.to_string());
                Err(e)
            }
        }
    }

    async fn write_locked(
        &self,
        batch: &TelemetryBatch,
        signal: Signal,
    ) -> Result<WriteReceipt, WriterError> {
        let dir = &self.config.output_dir;
        let mut path = self
            .rotation
            .get_or_create_file_path(dir, signal)
            .map_err(|e| WriterError::io(dir, e))?;
        if FileRotationService::<C>::should_rotate(&path, self.config.max_file_size_mb) {
            path = self.rotation.rotate_file(dir, signal).map_err(|e| WriterError::io(dir, e))?;
        }

        let mut line = batch
            .to_json(self.config.pretty_json)
            .map_err(|source| WriterError::Serialize { signal, source })?;
        line.push('\n');

        // open both before writing either
        let mut normal = Appender::open(path).await?;
        let mut mirror = if contains_errors(batch) {
            Some(Appender::open(error_file_path(&normal.path)).await?)
        } else {
            None
        };

        let written = async {
            normal.append(line.as_bytes()).await?;
            if let Some(mirror) = mirror.as_mut() {
                mirror.append(line.as_bytes()).await?;
            }
            Ok::<_, WriterError>(())
        }
        .await;
        if let Err(e) = written {
            normal.rollback().await;
            if let Some(mirror) = mirror.as_mut() {
                mirror.rollback().await;
            }
            return Err(e);
        }

        Ok(WriteReceipt { path: normal.path, error_path: mirror.map(|m| m.path) })
    }

    /// The file currently receiving `signal`, if anything has been written.
    pub fn current_file_path(&self, signal: Signal) -> Option<PathBuf> {
        self.rotation.current_path(signal)
    }

    /// Current path for every signal that has one.
    pub fn current_files(&self) -> Vec<(Signal, PathBuf)> {
        Signal::ALL
            .iter()
            .filter_map(|&s| self.current_file_path(s).map(|p| (s, p)))
            .collect()
    }

    /// Reject further writes and wait for in-flight ones to finish.
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        for lock in &self.locks {
            drop(lock.lock().await);
        }
        tracing::debug!("telemetry writer closed");
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

/// An open append handle that remembers the length it started from.
struct Appender {
    path: PathBuf,
    file: tokio::fs::File,
    committed: u64,
}

impl Appender {
    async fn open(path: PathBuf) -> Result<Self, WriterError> {
        let file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| WriterError::io(&path, e))?;
        let committed = file.metadata().await.map_err(|e| WriterError::io(&path, e))?.len();
        Ok(Self { path, file, committed })
    }

    async fn append(&mut self, bytes: &[u8]) -> Result<(), WriterError> {
        self.file.write_all(bytes).await.map_err(|e| WriterError::io(&self.path, e))?;
        self.file.flush().await.map_err(|e| WriterError::io(&self.path, e))
    }

    /// Cut the file back to its length at open.
    async fn rollback(&mut self) {
        if let Err(e) = self.file.set_len(self.committed).await {
            tracing::error!(
                path = %self.path.display(),
                error = %e,
                "failed to roll back partial write"
            );
        }
    }
}

#[cfg(test)]
#[path = "writer_tests.rs"]
mod tests;
