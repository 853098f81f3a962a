// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Control-API payloads shared by the receiver and the CLI.
//!
//! Bodies are JSON over HTTP/1.1 on the receiver's loopback port.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod response;
mod status;
mod version;
mod wire;

pub use otelbox_core::{HealthStatus, StatsSnapshot};
pub use response::{ErrorBody, ExportResponse, PartialSuccess, ShutdownResponse};
pub use status::{FileEntry, HealthSnapshot, StatusResponse};
pub use version::{is_compatible, SERVICE_NAME, VERSION};
pub use wire::{decode, encode, ProtocolError};

/// Control-API routes.
pub mod routes {
    pub const STATUS: &str = "/api/status";
    pub const HEALTH: &str = "/api/health";
    pub const SHUTDOWN: &str = "/api/shutdown";
    pub const TRACES: &str = "/v1/traces";
    pub const LOGS: &str = "/v1/logs";
    pub const METRICS: &str = "/v1/metrics";
}
