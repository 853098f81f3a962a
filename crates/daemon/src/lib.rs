// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! otelbox receiver library.
//!
//! Everything the `otelbox` binary needs to run a receiver in-process, plus
//! the pieces the CLI shares with it: configuration, the instance registry,
//! and the process table.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod config;
pub mod env;
pub mod lifecycle;
pub mod logging;
pub mod process;
pub mod registry;
pub mod server;

pub use config::{ConfigError, ReceiverConfig};
pub use lifecycle::{LifecycleError, Receiver, ReceiverHandle};
pub use process::{ProcessTable, SystemProcessTable, PROCESS_NAMES};
pub use registry::{PidEntry, PidFileService, RegistryError};

#[cfg(any(test, feature = "test-support"))]
pub use process::FakeProcessTable;
