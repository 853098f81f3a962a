// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! otelbox-storage: NDJSON persistence for received telemetry.
//!
//! Each signal writes to its own file family in the output directory:
//! `{signal}.{yyyyMMdd_HHmmss_fff}.ndjson`, plus an `.errors.ndjson` mirror
//! sharing the same timestamp for batches that carry errors.

mod error;
mod rotation;
mod writer;

pub use error::WriterError;
pub use rotation::{error_file_path, file_name, FileRotationService, TIMESTAMP_FORMAT};
pub use writer::{TelemetryFileWriter, WriteReceipt, WriterConfig};
