// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `otelbox start`: preflight, validate, launch.

use std::ffi::OsString;
use std::path::PathBuf;

use async_trait::async_trait;
use otelbox_core::Clock;
use otelbox_daemon::{ProcessTable, ReceiverConfig};
use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::Lifecycle;
use crate::client::ControlClient;
use crate::exit_error;
use crate::spawn::{self, SpawnedChild};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchMode {
    /// Serve in this process until it is stopped.
    Foreground,
    /// Spawn a detached child and wait for it to answer.
    Daemon,
}

/// How a launched receiver comes to exist.
#[async_trait]
pub trait Launcher: Send + Sync {
    /// Serve in-process; returns when the receiver stops.
    async fn run_foreground(&self, config: ReceiverConfig) -> anyhow::Result<()>;

    fn spawn_daemon(&self) -> std::io::Result<Box<dyn SpawnedChild>>;
}

/// Runs the receiver in-process, or re-invokes this executable detached.
#[derive(Debug, Clone)]
pub struct SystemLauncher {
    exe: PathBuf,
    args: Vec<OsString>,
    log: PathBuf,
}

impl SystemLauncher {
    /// `args` are the original command-line arguments, without argv\[0\].
    pub fn new(exe: PathBuf, args: impl IntoIterator<Item = OsString>, log: PathBuf) -> Self {
        Self { exe, args: spawn::foreground_args(args), log }
    }
}

#[async_trait]
impl Launcher for SystemLauncher {
    async fn run_foreground(&self, config: ReceiverConfig) -> anyhow::Result<()> {
        otelbox_daemon::lifecycle::run(config).await?;
        Ok(())
    }

    fn spawn_daemon(&self) -> std::io::Result<Box<dyn SpawnedChild>> {
        Ok(Box::new(spawn::spawn_detached(&self.exe, &self.args, &self.log)?))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StartOutcome {
    /// Foreground receiver ran and stopped cleanly.
    Stopped { port: u16 },
    /// Foreground receiver failed to start or serve.
    Failed { port: u16, error: String },
    Daemonized { port: u16, pid: u32 },
    DaemonFailedToStart { port: u16, exit_code: Option<i32>, log: Option<PathBuf> },
    AlreadyRunning { port: u16, pid: u32 },
    /// A compatible receiver holds the port but writes somewhere else.
    DirectoryMismatch { port: u16, pid: u32, running: PathBuf, requested: PathBuf },
    /// Something answers on the port that this build cannot manage.
    IncompatibleInstance { port: u16, detail: String },
    /// The registry lists a live process for the port, but it does not answer.
    RegisteredNotResponding { port: u16, pid: u32 },
    InvalidConfig { reason: String },
}

impl StartOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            StartOutcome::Stopped { .. } | StartOutcome::Daemonized { .. } => exit_error::SUCCESS,
            StartOutcome::Failed { .. } | StartOutcome::DaemonFailedToStart { .. } => {
                exit_error::SYSTEM
            }
            StartOutcome::AlreadyRunning { .. }
            | StartOutcome::DirectoryMismatch { .. }
            | StartOutcome::IncompatibleInstance { .. }
            | StartOutcome::RegisteredNotResponding { .. }
            | StartOutcome::InvalidConfig { .. } => exit_error::USER,
        }
    }

    pub fn message(&self) -> String {
        match self {
            StartOutcome::Stopped { port } => format!("otelbox on port {port} stopped"),
            StartOutcome::Failed { port, error } => {
                format!("otelbox on port {port} failed: {error}")
            }
            StartOutcome::Daemonized { port, pid } => {
                format!("otelbox started on port {port} (pid {pid})")
            }
            StartOutcome::DaemonFailedToStart { port, exit_code, log } => {
                let mut msg = format!("otelbox daemon failed to start on port {port}");
                if let Some(code) = exit_code {
                    msg.push_str(&format!(" (exit code {code})"));
                }
                if let Some(log) = log {
                    msg.push_str(&format!("; see {}", log.display()));
                }
                msg
            }
            StartOutcome::AlreadyRunning { port, pid } => {
                format!("otelbox is already running on port {port} (pid {pid})")
            }
            StartOutcome::DirectoryMismatch { port, pid, running, requested } => format!(
                "otelbox on port {port} (pid {pid}) writes to {}, not {}",
                running.display(),
                requested.display()
            ),
            StartOutcome::IncompatibleInstance { port, detail } => {
                format!("port {port} is held by an incompatible receiver: {detail}")
            }
            StartOutcome::RegisteredNotResponding { port, pid } => format!(
                "otelbox pid {pid} is registered on port {port} but not responding; \
                 try `otelbox stop --port {port}`"
            ),
            StartOutcome::InvalidConfig { reason } => format!("invalid configuration: {reason}"),
        }
    }
}

impl<K: ControlClient, P: ProcessTable, C: Clock> Lifecycle<K, P, C> {
    /// Preflight, validate, then launch.
    pub async fn start(
        &self,
        config: ReceiverConfig,
        mode: LaunchMode,
        launcher: &dyn Launcher,
    ) -> StartOutcome {
        if let Some(conflict) = self.preflight(&config).await {
            return conflict;
        }
        if let Err(e) = config.validate() {
            return StartOutcome::InvalidConfig { reason: e.to_string() };
        }

        let port = config.port;
        match mode {
            LaunchMode::Foreground => match launcher.run_foreground(config).await {
                Ok(()) => StartOutcome::Stopped { port },
                Err(e) => StartOutcome::Failed { port, error: format!("{e:#}") },
            },
            LaunchMode::Daemon => match launcher.spawn_daemon() {
                Ok(child) => self.await_daemon(port, child).await,
                Err(e) => {
                    warn!(error = %e, "failed to spawn daemon");
                    StartOutcome::DaemonFailedToStart { port, exit_code: None, log: None }
                }
            },
        }
    }

    /// Anything already holding or claiming the port.
    pub async fn preflight(&self, config: &ReceiverConfig) -> Option<StartOutcome> {
        let port = config.port;
        if port == 0 {
            return None;
        }
        match self.client.status(port).await {
            Ok(status) if !status.is_compatible() => {
                return Some(StartOutcome::IncompatibleInstance {
                    port,
                    detail: format!("{} {}", status.service, status.version),
                });
            }
            Ok(status) => {
                let requested = config.absolute_output_dir();
                if status.output_dir != requested {
                    return Some(StartOutcome::DirectoryMismatch {
                        port,
                        pid: status.pid,
                        running: status.output_dir,
                        requested,
                    });
                }
                return Some(StartOutcome::AlreadyRunning { port, pid: status.pid });
            }
            Err(e) if e.is_not_running() => {}
            Err(e) => {
                return Some(StartOutcome::IncompatibleInstance { port, detail: e.to_string() });
            }
        }

        self.registry
            .get_registered_entries_for_port(port)
            .into_iter()
            .find(|entry| self.registry.is_running(entry))
            .map(|entry| StartOutcome::RegisteredNotResponding { port, pid: entry.pid })
    }

    /// Poll the control API until the child answers, exits, or time runs out.
    async fn await_daemon(&self, port: u16, mut child: Box<dyn SpawnedChild>) -> StartOutcome {
        let deadline = Instant::now() + self.timing.startup_timeout;
        let log = Some(otelbox_daemon::env::startup_log_path());
        loop {
            match self.client.status(port).await {
                Ok(status) if status.is_compatible() => {
                    info!(port, pid = status.pid, "daemon is accepting traffic");
                    return StartOutcome::Daemonized { port, pid: status.pid };
                }
                Ok(status) => debug!(port, version = %status.version, "unexpected responder"),
                Err(e) => debug!(port, error = %e, "daemon not answering yet"),
            }
            if let Some(code) = child.try_exit_code() {
                warn!(port, pid = child.pid(), code, "daemon exited during startup");
                return StartOutcome::DaemonFailedToStart { port, exit_code: Some(code), log };
            }
            if Instant::now() >= deadline {
                break;
            }
            tokio::time::sleep(self.timing.poll_interval).await;
        }

        warn!(port, pid = child.pid(), "daemon did not answer before the startup timeout");
        StartOutcome::DaemonFailedToStart { port, exit_code: child.try_exit_code(), log }
    }
}

#[cfg(test)]
#[path = "start_tests.rs"]
mod tests;
