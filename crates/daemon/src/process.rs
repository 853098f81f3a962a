// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! OS process lookup and termination.

use sysinfo::{Pid, ProcessStatus, ProcessesToUpdate, System};

/// Executable names an otelbox receiver runs under.
pub const PROCESS_NAMES: &[&str] = &["otelbox", "otelbox.exe"];

/// Whether `name` is one of [`PROCESS_NAMES`], ignoring case.
pub fn is_expected_name(name: &str) -> bool {
    PROCESS_NAMES.iter().any(|expected| expected.eq_ignore_ascii_case(name))
}

/// The slice of the OS process table the registry and CLI need.
pub trait ProcessTable: Clone + Send + Sync + 'static {
    fn current_pid(&self) -> u32;

    /// Executable name, `None` when no live process has this pid.
    fn process_name(&self, pid: u32) -> Option<String>;

    /// Zombies count as dead.
    fn is_alive(&self, pid: u32) -> bool;

    /// Kill `pid` and all of its descendants. Returns false when `pid` was
    /// not found.
    fn kill_tree(&self, pid: u32) -> bool;
}

/// [`ProcessTable`] backed by `sysinfo`.
#[derive(Debug, Clone, Default)]
pub struct SystemProcessTable;

impl SystemProcessTable {
    fn snapshot(pid: Option<u32>) -> System {
        let mut sys = System::new();
        match pid {
            Some(pid) => sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]), true),
            None => sys.refresh_processes(ProcessesToUpdate::All, true),
        };
        sys
    }
}

impl ProcessTable for SystemProcessTable {
    fn current_pid(&self) -> u32 {
        std::process::id()
    }

    fn process_name(&self, pid: u32) -> Option<String> {
        let sys = Self::snapshot(Some(pid));
        sys.process(Pid::from_u32(pid))
            .filter(|p| !matches!(p.status(), ProcessStatus::Zombie | ProcessStatus::Dead))
            .map(|p| p.name().to_string_lossy().into_owned())
    }

    fn is_alive(&self, pid: u32) -> bool {
        pid != 0 && self.process_name(pid).is_some()
    }

    fn kill_tree(&self, pid: u32) -> bool {
        let sys = Self::snapshot(None);
        let root = Pid::from_u32(pid);
        if sys.process(root).is_none() {
            return false;
        }

        // Breadth-first so children are collected before we start killing
        let mut tree = vec![root];
        let mut i = 0;
        while i < tree.len() {
            let parent = tree[i];
            tree.extend(
                sys.processes()
                    .iter()
                    .filter(|(_, p)| p.parent() == Some(parent))
                    .map(|(child, _)| *child),
            );
            i += 1;
        }

        for pid in tree.iter().rev() {
            if let Some(process) = sys.process(*pid) {
                if !process.kill() {
                    tracing::debug!(pid = pid.as_u32(), "kill signal not delivered");
                }
            }
        }
        true
    }
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::ProcessTable;
    use parking_lot::Mutex;
    use std::collections::{HashMap, HashSet};
    use std::sync::Arc;

    #[derive(Debug, Default)]
    struct FakeState {
        current: u32,
        processes: HashMap<u32, String>,
        unkillable: HashSet<u32>,
        killed: Vec<u32>,
    }

    /// In-memory process table for tests.
    #[derive(Debug, Clone, Default)]
    pub struct FakeProcessTable {
        state: Arc<Mutex<FakeState>>,
    }

    impl FakeProcessTable {
        /// A table containing only the current process, named `otelbox`.
        pub fn new(current: u32) -> Self {
            let table = Self::default();
            table.state.lock().current = current;
            table.spawn(current, "otelbox");
            table
        }

        pub fn set_current_pid(&self, pid: u32) {
            self.state.lock().current = pid;
        }

        pub fn spawn(&self, pid: u32, name: &str) {
            self.state.lock().processes.insert(pid, name.to_string());
        }

        pub fn exit(&self, pid: u32) {
            self.state.lock().processes.remove(&pid);
        }

        /// `kill_tree` on this pid will report success but leave it running.
        pub fn ignore_kill(&self, pid: u32) {
            self.state.lock().unkillable.insert(pid);
        }

        /// Pids passed to `kill_tree`, in order.
        pub fn killed(&self) -> Vec<u32> {
            self.state.lock().killed.clone()
        }
    }

    impl ProcessTable for FakeProcessTable {
        fn current_pid(&self) -> u32 {
            self.state.lock().current
        }

        fn process_name(&self, pid: u32) -> Option<String> {
            self.state.lock().processes.get(&pid).cloned()
        }

        fn is_alive(&self, pid: u32) -> bool {
            self.state.lock().processes.contains_key(&pid)
        }

        fn kill_tree(&self, pid: u32) -> bool {
            let mut state = self.state.lock();
            if !state.processes.contains_key(&pid) {
                return false;
            }
            state.killed.push(pid);
            if !state.unkillable.contains(&pid) {
                state.processes.remove(&pid);
            }
            true
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeProcessTable;

#[cfg(test)]
#[path = "process_tests.rs"]
mod tests;
