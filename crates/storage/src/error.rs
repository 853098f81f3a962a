// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use otelbox_core::Signal;
use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by [`crate::TelemetryFileWriter`].
#[derive(Debug, Error)]
pub enum WriterError {
    #[error("writer is closed")]
    Closed,

    #[error("batch contains {actual} but was submitted as {expected}")]
    SignalMismatch { expected: Signal, actual: Signal },

    #[error("failed to serialize {signal} batch: {source}")]
    Serialize {
        signal: Signal,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl WriterError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        WriterError::Io { path: path.into(), source }
    }
}
