// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! otelbox-core: telemetry model and in-process accounting for the otelbox receiver

pub mod macros;

pub mod clock;
pub mod error_detection;
pub mod health;
pub mod otlp;
pub mod signal;
pub mod stats;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use clock::{Clock, FakeClock, SystemClock};
pub use error_detection::{contains_errors, logs_contain_errors, traces_contain_errors};
pub use health::{HealthMonitor, HealthStatus};
pub use otlp::{LogsData, MetricsData, TelemetryBatch, TracesData};
pub use signal::{ParseSignalError, Signal};
pub use stats::{StatsSnapshot, TelemetryStatistics};
