// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `POST /v1/{traces,logs,metrics}`

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::Json;
use otelbox_core::{Signal, TelemetryBatch};
use otelbox_wire::ExportResponse;

use super::{ReceiverState, ServerError};

type ExportResult = Result<Json<ExportResponse>, ServerError>;

pub(super) async fn traces(
    State(state): State<Arc<ReceiverState>>,
    headers: HeaderMap,
    body: Bytes,
) -> ExportResult {
    export(&state, Signal::Traces, &headers, &body).await
}

pub(super) async fn logs(
    State(state): State<Arc<ReceiverState>>,
    headers: HeaderMap,
    body: Bytes,
) -> ExportResult {
    export(&state, Signal::Logs, &headers, &body).await
}

pub(super) async fn metrics(
    State(state): State<Arc<ReceiverState>>,
    headers: HeaderMap,
    body: Bytes,
) -> ExportResult {
    export(&state, Signal::Metrics, &headers, &body).await
}

async fn export(
    state: &ReceiverState,
    signal: Signal,
    headers: &HeaderMap,
    body: &[u8],
) -> ExportResult {
    check_content_type(headers)?;
    let batch = TelemetryBatch::from_json(signal, body)
        .map_err(|source| ServerError::InvalidPayload { signal, source })?;
    let receipt = state.ingest(signal, &batch).await?;
    tracing::debug!(
        %signal,
        path = %receipt.path.display(),
        mirrored = receipt.error_path.is_some(),
        "batch written"
    );
    Ok(Json(ExportResponse::default()))
}

/// JSON, or no content type at all.
fn check_content_type(headers: &HeaderMap) -> Result<(), ServerError> {
    let Some(value) = headers.get(header::CONTENT_TYPE) else {
        return Ok(());
    };
    let raw = value.to_str().unwrap_or_default();
    let mime = raw.split(';').next().unwrap_or_default().trim();
    if mime.eq_ignore_ascii_case("application/json") {
        Ok(())
    } else {
        Err(ServerError::UnsupportedMediaType(raw.to_string()))
    }
}
