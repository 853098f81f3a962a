// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Detached receiver processes.
//!
//! The child gets its own process group (Unix) or a new process group with
//! no console window (Windows) so signals aimed at the launching terminal do
//! not reach it. Its stdout/stderr go to the startup log.

use std::ffi::OsString;
use std::fs::OpenOptions;
use std::path::Path;
use std::process::{Child, Command, Stdio};

/// Flags that request daemon mode. Removed before re-invoking ourselves.
const DAEMON_FLAGS: &[&str] = &["--daemon", "-d"];

/// A spawned child whose exit can be observed without blocking.
pub trait SpawnedChild: Send {
    fn pid(&self) -> u32;

    /// Exit code once the child has exited, `None` while it runs.
    fn try_exit_code(&mut self) -> Option<i32>;
}

/// [`SpawnedChild`] for a real OS process.
#[derive(Debug)]
pub struct DetachedChild {
    child: Child,
}

impl SpawnedChild for DetachedChild {
    fn pid(&self) -> u32 {
        self.child.id()
    }

    fn try_exit_code(&mut self) -> Option<i32> {
        match self.child.try_wait() {
            // Killed by a signal has no code
            Ok(Some(status)) => Some(status.code().unwrap_or(-1)),
            Ok(None) => None,
            Err(e) => {
                tracing::debug!(error = %e, "could not poll detached child");
                None
            }
        }
    }
}

/// `args` without the daemon flag, so the child runs in the foreground.
pub fn foreground_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator,
    I::Item: Into<OsString>,
{
    args.into_iter()
        .map(Into::into)
        .filter(|arg| !DAEMON_FLAGS.iter().any(|flag| arg == *flag))
        .collect()
}

/// Start `exe args...` detached, with the `OTELBOX_DETACHED` marker set.
pub fn spawn_detached(exe: &Path, args: &[OsString], log: &Path) -> std::io::Result<DetachedChild> {
    if let Some(parent) = log.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let stdout = OpenOptions::new().create(true).append(true).open(log)?;
    let stderr = stdout.try_clone()?;

    let mut cmd = Command::new(exe);
    cmd.args(args)
        .env(otelbox_daemon::env::DETACHED, "1")
        .stdin(Stdio::null())
        .stdout(Stdio::from(stdout))
        .stderr(Stdio::from(stderr));
    detach(&mut cmd);

    let child = cmd.spawn()?;
    tracing::info!(pid = child.id(), exe = %exe.display(), "spawned detached receiver");
    Ok(DetachedChild { child })
}

#[cfg(unix)]
fn detach(cmd: &mut Command) {
    use std::os::unix::process::CommandExt;
    cmd.process_group(0);
}

#[cfg(windows)]
fn detach(cmd: &mut Command) {
    use std::os::windows::process::CommandExt;
    const CREATE_NEW_PROCESS_GROUP: u32 = 0x0000_0200;
    const CREATE_NO_WINDOW: u32 = 0x0800_0000;
    cmd.creation_flags(CREATE_NEW_PROCESS_GROUP | CREATE_NO_WINDOW);
}

#[cfg(not(any(unix, windows)))]
fn detach(_cmd: &mut Command) {}

#[cfg(test)]
#[path = "spawn_tests.rs"]
mod tests;
