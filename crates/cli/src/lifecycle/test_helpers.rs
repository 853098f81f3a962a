// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fakes for the control API, launcher, and spawned children.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use otelbox_core::{FakeClock, HealthStatus, StatsSnapshot};
use otelbox_daemon::{FakeProcessTable, PidFileService, ReceiverConfig};
use otelbox_wire::{HealthSnapshot, ShutdownResponse, StatusResponse, SERVICE_NAME, VERSION};
use parking_lot::Mutex;
use tempfile::TempDir;

use super::start::Launcher;
use super::{Lifecycle, Timing};
use crate::client::{ControlClient, ControlError};
use crate::spawn::SpawnedChild;

pub const CLI_PID: u32 = 100;

pub fn fast_timing() -> Timing {
    Timing {
        poll_interval: Duration::from_millis(5),
        startup_timeout: Duration::from_millis(200),
        shutdown_timeout: Duration::from_millis(200),
        kill_timeout: Duration::from_millis(100),
    }
}

pub fn status(port: u16, pid: u32, output_dir: &Path) -> StatusResponse {
    StatusResponse {
        service: SERVICE_NAME.to_string(),
        version: VERSION.to_string(),
        pid,
        port,
        output_dir: output_dir.to_path_buf(),
        uptime_secs: 1,
        health: HealthSnapshot {
            status: HealthStatus::Healthy,
            consecutive_errors: 0,
            recent_errors: Vec::new(),
        },
        stats: StatsSnapshot::default(),
        files: Vec::new(),
    }
}

#[derive(Default)]
struct ControlState {
    instances: HashMap<u16, StatusResponse>,
    hung: HashSet<u16>,
    ignore_shutdown: HashSet<u16>,
    reused_pids: HashMap<u16, String>,
    shutdowns: Vec<u16>,
}

/// In-memory control API. A graceful shutdown also removes the instance's
/// process from the linked process table.
#[derive(Clone)]
pub struct FakeControl {
    state: Arc<Mutex<ControlState>>,
    processes: FakeProcessTable,
}

impl FakeControl {
    pub fn new(processes: FakeProcessTable) -> Self {
        Self { state: Arc::default(), processes }
    }

    /// Serve `status` on its port, backed by a live `otelbox` process.
    pub fn serve(&self, status: StatusResponse) {
        self.processes.spawn(status.pid, "otelbox");
        self.state.lock().instances.insert(status.port, status);
    }

    /// Accept connections on `port` but never answer.
    pub fn hang(&self, port: u16) {
        self.state.lock().hung.insert(port);
    }

    pub fn ignore_shutdown(&self, port: u16) {
        self.state.lock().ignore_shutdown.insert(port);
    }

    /// After a graceful shutdown on `port`, the OS hands its pid to `name`.
    pub fn reuse_pid_after_shutdown(&self, port: u16, name: &str) {
        self.state.lock().reused_pids.insert(port, name.to_string());
    }

    pub fn shutdowns(&self) -> Vec<u16> {
        self.state.lock().shutdowns.clone()
    }
}

#[async_trait]
impl ControlClient for FakeControl {
    async fn status(&self, port: u16) -> Result<StatusResponse, ControlError> {
        let state = self.state.lock();
        if state.hung.contains(&port) {
            return Err(ControlError::Timeout { port, timeout: Duration::from_millis(1) });
        }
        state.instances.get(&port).cloned().ok_or(ControlError::NotRunning { port })
    }

    async fn shutdown(&self, port: u16) -> Result<ShutdownResponse, ControlError> {
        let mut state = self.state.lock();
        state.shutdowns.push(port);
        if state.hung.contains(&port) {
            return Err(ControlError::Timeout { port, timeout: Duration::from_millis(1) });
        }
        let Some(instance) = state.instances.get(&port).cloned() else {
            return Err(ControlError::NotRunning { port });
        };
        if !state.ignore_shutdown.contains(&port) {
            state.instances.remove(&port);
            self.processes.exit(instance.pid);
            if let Some(name) = state.reused_pids.get(&port) {
                self.processes.spawn(instance.pid, name);
            }
        }
        Ok(ShutdownResponse { accepted: true, pid: instance.pid })
    }
}

/// A child that exits with `exit_code` (if any) as soon as it is polled.
pub struct FakeChild {
    pub pid: u32,
    pub exit_code: Option<i32>,
}

impl SpawnedChild for FakeChild {
    fn pid(&self) -> u32 {
        self.pid
    }

    fn try_exit_code(&mut self) -> Option<i32> {
        self.exit_code
    }
}

#[derive(Clone, Copy)]
pub enum DaemonBehavior {
    /// Starts answering on the configured port right away.
    Answers,
    /// Exits immediately with this code.
    Exits(i32),
    /// Runs but never answers.
    Silent,
    /// Spawning itself fails.
    SpawnFails,
}

pub struct FakeLauncher {
    control: FakeControl,
    config: ReceiverConfig,
    daemon: DaemonBehavior,
    foreground: Mutex<Option<Result<(), String>>>,
    ran_foreground: Mutex<bool>,
}

impl FakeLauncher {
    pub fn new(control: &FakeControl, config: &ReceiverConfig, daemon: DaemonBehavior) -> Self {
        Self {
            control: control.clone(),
            config: config.clone(),
            daemon,
            foreground: Mutex::new(Some(Ok(()))),
            ran_foreground: Mutex::new(false),
        }
    }

    pub fn failing_foreground(self, error: &str) -> Self {
        *self.foreground.lock() = Some(Err(error.to_string()));
        self
    }

    pub fn ran_foreground(&self) -> bool {
        *self.ran_foreground.lock()
    }
}

#[async_trait]
impl Launcher for FakeLauncher {
    async fn run_foreground(&self, _config: ReceiverConfig) -> anyhow::Result<()> {
        *self.ran_foreground.lock() = true;
        match self.foreground.lock().take() {
            Some(Err(e)) => Err(anyhow::anyhow!(e)),
            _ => Ok(()),
        }
    }

    fn spawn_daemon(&self) -> std::io::Result<Box<dyn SpawnedChild>> {
        const CHILD_PID: u32 = 5150;
        match self.daemon {
            DaemonBehavior::Answers => {
                self.control.serve(status(
                    self.config.port,
                    CHILD_PID,
                    &self.config.absolute_output_dir(),
                ));
                Ok(Box::new(FakeChild { pid: CHILD_PID, exit_code: None }))
            }
            DaemonBehavior::Exits(code) => {
                Ok(Box::new(FakeChild { pid: CHILD_PID, exit_code: Some(code) }))
            }
            DaemonBehavior::Silent => Ok(Box::new(FakeChild { pid: CHILD_PID, exit_code: None })),
            DaemonBehavior::SpawnFails => {
                Err(std::io::Error::new(std::io::ErrorKind::NotFound, "no such executable"))
            }
        }
    }
}

pub struct Fixture {
    pub dir: TempDir,
    pub processes: FakeProcessTable,
    pub control: FakeControl,
    pub lifecycle: Lifecycle<FakeControl, FakeProcessTable, FakeClock>,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
        let processes = FakeProcessTable::new(CLI_PID);
        let control = FakeControl::new(processes.clone());
        let registry =
            PidFileService::new(dir.path().join("run"), processes.clone(), FakeClock::new());
        let lifecycle = Lifecycle::new(registry, control.clone(), fast_timing());
        Self { dir, processes, control, lifecycle }
    }

    pub fn output_dir(&self) -> PathBuf {
        self.dir.path().join("telemetry")
    }

    pub fn config(&self, port: u16) -> ReceiverConfig {
        ReceiverConfig::default().port(port).output_dir(self.output_dir())
    }

    /// Register `pid` on `port` as if that process had done it itself.
    pub fn register_as(&self, pid: u32, port: u16) {
        self.processes.spawn(pid, "otelbox");
        self.processes.set_current_pid(pid);
        let result = self.lifecycle.registry().register(port);
        self.processes.set_current_pid(CLI_PID);
        if let Err(e) = result {
            panic!("register {pid}/{port}: {e}");
        }
    }
}
