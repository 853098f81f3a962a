// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Start and stop orchestration.
//!
//! Both directions talk to a receiver through the control API and fall back
//! on the instance registry and process table when it does not answer.

mod start;
mod stop;

#[cfg(test)]
mod test_helpers;

pub use start::{LaunchMode, SystemLauncher};

use std::time::Duration;

use otelbox_core::{Clock, SystemClock};
use otelbox_daemon::{env, PidFileService, ProcessTable, SystemProcessTable};

use crate::client::{ControlClient, HttpControlClient};

/// Polling cadence and the bounds on every wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub poll_interval: Duration,
    pub startup_timeout: Duration,
    pub shutdown_timeout: Duration,
    pub kill_timeout: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(200),
            startup_timeout: env::startup_timeout(),
            shutdown_timeout: env::shutdown_timeout(),
            kill_timeout: env::kill_timeout(),
        }
    }
}

/// The seams start/stop need: registry, process table, control client.
pub struct Lifecycle<K, P = SystemProcessTable, C = SystemClock>
where
    K: ControlClient,
    P: ProcessTable,
    C: Clock,
{
    registry: PidFileService<P, C>,
    client: K,
    timing: Timing,
}

impl Lifecycle<HttpControlClient> {
    pub fn system() -> Self {
        Self::new(PidFileService::system(), HttpControlClient::default(), Timing::default())
    }
}

impl<K: ControlClient, P: ProcessTable, C: Clock> Lifecycle<K, P, C> {
    pub fn new(registry: PidFileService<P, C>, client: K, timing: Timing) -> Self {
        Self { registry, client, timing }
    }

    pub fn registry(&self) -> &PidFileService<P, C> {
        &self.registry
    }

    pub fn client(&self) -> &K {
        &self.client
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
