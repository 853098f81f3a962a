// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `otelbox stop`: ask politely, wait, then force.

use otelbox_core::Clock;
use otelbox_daemon::process::is_expected_name;
use otelbox_daemon::ProcessTable;
use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use super::Lifecycle;
use crate::client::ControlClient;
use crate::exit_error;

/// Result of force-terminating a receiver process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TerminateOutcome {
    Terminated,
    /// No process with that pid.
    NotFound,
    /// The pid belongs to something that is not otelbox.
    ValidationFailed { name: String },
    /// Killed, but still alive after the kill timeout.
    TimedOut,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StopOutcome {
    NotRunning { port: u16 },
    /// Exited after the shutdown request.
    Stopped { port: u16, pid: Option<u32> },
    /// Ignored the shutdown request and was killed.
    ForceStopped { port: u16, pid: u32 },
    /// Gone by the time we went to kill it.
    AlreadyExited { port: u16, pid: u32 },
    /// Did not stop, and no pid is known to escalate against.
    NoPid { port: u16 },
    /// Refused to kill: the pid now names a different program.
    ValidationFailed { port: u16, pid: u32, name: String },
    TimedOut { port: u16, pid: u32 },
}

impl StopOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            StopOutcome::Stopped { .. }
            | StopOutcome::ForceStopped { .. }
            | StopOutcome::AlreadyExited { .. } => exit_error::SUCCESS,
            StopOutcome::NotRunning { .. } => exit_error::USER,
            StopOutcome::NoPid { .. }
            | StopOutcome::ValidationFailed { .. }
            | StopOutcome::TimedOut { .. } => exit_error::SYSTEM,
        }
    }

    pub fn message(&self) -> String {
        match self {
            StopOutcome::NotRunning { port } => format!("no otelbox instance on port {port}"),
            StopOutcome::Stopped { port, pid: Some(pid) } => {
                format!("otelbox on port {port} (pid {pid}) stopped")
            }
            StopOutcome::Stopped { port, pid: None } => format!("otelbox on port {port} stopped"),
            StopOutcome::ForceStopped { port, pid } => {
                format!("otelbox on port {port} (pid {pid}) did not stop gracefully; killed")
            }
            StopOutcome::AlreadyExited { port, pid } => {
                format!("otelbox on port {port} (pid {pid}) already exited")
            }
            StopOutcome::NoPid { port } => {
                format!("otelbox on port {port} did not stop and its pid is unknown")
            }
            StopOutcome::ValidationFailed { port, pid, name } => format!(
                "refusing to kill pid {pid} on port {port}: it is '{name}', not otelbox"
            ),
            StopOutcome::TimedOut { port, pid } => {
                format!("otelbox on port {port} (pid {pid}) is still running after kill")
            }
        }
    }
}

impl<K: ControlClient, P: ProcessTable, C: Clock> Lifecycle<K, P, C> {
    /// Check, request shutdown, wait, and escalate if needed.
    pub async fn stop(&self, port: u16) -> StopOutcome {
        // CheckRunning: the pid captured here is the only one we will kill
        let pid = match self.client.status(port).await {
            Ok(status) => Some(status.pid),
            Err(e) if e.is_not_running() => return StopOutcome::NotRunning { port },
            Err(e) => {
                warn!(port, error = %e, "status query failed; pid unknown");
                None
            }
        };

        // SendShutdown
        match self.client.shutdown(port).await {
            Ok(ack) => debug!(port, pid = ack.pid, accepted = ack.accepted, "shutdown requested"),
            Err(e) => warn!(port, error = %e, "shutdown request failed"),
        }

        // WaitGraceful
        if self.wait_graceful(port, pid).await {
            info!(port, ?pid, "receiver stopped");
            return StopOutcome::Stopped { port, pid };
        }

        // Escalate
        let Some(pid) = pid else {
            error!(port, "receiver did not stop and no pid is known");
            return StopOutcome::NoPid { port };
        };
        let outcome = match self.escalate(pid).await {
            TerminateOutcome::Terminated => StopOutcome::ForceStopped { port, pid },
            TerminateOutcome::NotFound => StopOutcome::AlreadyExited { port, pid },
            TerminateOutcome::ValidationFailed { name } => {
                return StopOutcome::ValidationFailed { port, pid, name };
            }
            TerminateOutcome::TimedOut => return StopOutcome::TimedOut { port, pid },
        };

        // A killed receiver never unregistered itself
        match self.registry.blocking(|r| r.clean_stale_entries()).await {
            Ok(removed) => debug!(removed, "cleaned registry after escalation"),
            Err(e) => warn!(error = %e, "could not clean registry"),
        }
        outcome
    }

    fn is_receiver(&self, pid: u32) -> bool {
        let processes = self.registry.processes();
        processes.is_alive(pid) && processes.process_name(pid).is_some_and(|n| is_expected_name(&n))
    }

    /// Kill `pid` and its children, but only if it is an otelbox process.
    pub async fn escalate(&self, pid: u32) -> TerminateOutcome {
        let processes = self.registry.processes();
        let Some(name) = processes.process_name(pid) else {
            return TerminateOutcome::NotFound;
        };
        if !is_expected_name(&name) {
            error!(pid, name = %name, "pid no longer belongs to otelbox; not killing");
            return TerminateOutcome::ValidationFailed { name };
        }

        warn!(pid, "force-terminating receiver process tree");
        if !processes.kill_tree(pid) {
            return TerminateOutcome::NotFound;
        }

        let deadline = Instant::now() + self.timing.kill_timeout;
        loop {
            if !processes.is_alive(pid) {
                return TerminateOutcome::Terminated;
            }
            if Instant::now() >= deadline {
                error!(pid, "process still alive after kill timeout");
                return TerminateOutcome::TimedOut;
            }
            tokio::time::sleep(self.timing.poll_interval).await;
        }
    }

    /// True once the port stops answering and the process, if known, is gone.
    ///
    /// A pid that now names a non-otelbox program counts as gone.
    async fn wait_graceful(&self, port: u16, pid: Option<u32>) -> bool {
        let deadline = Instant::now() + self.timing.shutdown_timeout;
        loop {
            let port_closed =
                matches!(self.client.status(port).await, Err(e) if e.is_not_running());
            let exited = pid.map_or(true, |pid| !self.is_receiver(pid));
            if port_closed && exited {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(self.timing.poll_interval).await;
        }
    }
}

#[cfg(test)]
#[path = "stop_tests.rs"]
mod tests;
