// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `/api/*` control endpoints used by the CLI.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use otelbox_core::HealthStatus;
use otelbox_wire::{HealthSnapshot, ShutdownResponse, StatusResponse};

use super::ReceiverState;

pub(super) async fn status(State(state): State<Arc<ReceiverState>>) -> Json<StatusResponse> {
    Json(state.status())
}

/// 200 while healthy, 503 once degraded.
pub(super) async fn health(
    State(state): State<Arc<ReceiverState>>,
) -> (StatusCode, Json<HealthSnapshot>) {
    let snapshot = state.health();
    let code = match snapshot.status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Degraded => StatusCode::SERVICE_UNAVAILABLE,
    };
    (code, Json(snapshot))
}

pub(super) async fn shutdown(State(state): State<Arc<ReceiverState>>) -> Json<ShutdownResponse> {
    tracing::info!("shutdown requested over control API");
    state.request_shutdown();
    Json(ShutdownResponse { accepted: true, pid: state.pid() })
}
