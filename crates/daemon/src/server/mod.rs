// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP surface of the receiver: OTLP/JSON ingest and the control API.

mod control;
mod ingest;

use std::sync::Arc;
use std::time::Instant;

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use otelbox_core::{Signal, TelemetryBatch};
use otelbox_storage::{TelemetryFileWriter, WriteReceipt, WriterError};
use otelbox_wire::{routes, ErrorBody, FileEntry, HealthSnapshot, StatusResponse};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

/// State shared by every handler.
pub struct ReceiverState {
    writer: TelemetryFileWriter,
    port: u16,
    pid: u32,
    started: Instant,
    shutdown: CancellationToken,
}

impl ReceiverState {
    pub fn new(
        writer: TelemetryFileWriter,
        port: u16,
        pid: u32,
        shutdown: CancellationToken,
    ) -> Self {
        Self { writer, port, pid, started: Instant::now(), shutdown }
    }

    pub fn writer(&self) -> &TelemetryFileWriter {
        &self.writer
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Hand a decoded batch to the write path.
    pub async fn ingest(
        &self,
        signal: Signal,
        batch: &TelemetryBatch,
    ) -> Result<WriteReceipt, WriterError> {
        self.writer.write(batch, signal).await
    }

    pub fn health(&self) -> HealthSnapshot {
        let health = self.writer.health();
        HealthSnapshot {
            status: health.status(),
            consecutive_errors: health.consecutive_error_count(),
            recent_errors: health.recent_errors(),
        }
    }

    pub fn status(&self) -> StatusResponse {
        StatusResponse {
            service: otelbox_wire::SERVICE_NAME.to_string(),
            version: otelbox_wire::VERSION.to_string(),
            pid: self.pid,
            port: self.port,
            output_dir: self.writer.config().output_dir.clone(),
            uptime_secs: self.started.elapsed().as_secs(),
            health: self.health(),
            stats: self.writer.stats().snapshot(),
            files: self
                .writer
                .current_files()
                .into_iter()
                .map(|(signal, path)| FileEntry { signal, path })
                .collect(),
        }
    }

    pub fn request_shutdown(&self) {
        self.shutdown.cancel();
    }
}

/// Handler failures, rendered as `{"error": ...}` bodies.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("unsupported content type {0:?}: only application/json is accepted")]
    UnsupportedMediaType(String),

    #[error("invalid {signal} payload: {source}")]
    InvalidPayload {
        signal: Signal,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Write(#[from] WriterError),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServerError::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ServerError::InvalidPayload { .. } => StatusCode::BAD_REQUEST,
            ServerError::Write(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        (status, Json(ErrorBody::new(self.to_string()))).into_response()
    }
}

pub fn router(state: Arc<ReceiverState>) -> Router {
    Router::new()
        .route(routes::TRACES, post(ingest::traces))
        .route(routes::LOGS, post(ingest::logs))
        .route(routes::METRICS, post(ingest::metrics))
        .route(routes::STATUS, get(control::status))
        .route(routes::HEALTH, get(control::health))
        .route(routes::SHUTDOWN, post(control::shutdown))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
