// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tracing subscriber setup.
//!
//! `RUST_LOG` wins over the configured default level unless `verbose` is set.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub verbose: bool,
    /// Used when `RUST_LOG` is unset
    pub default_level: String,
    /// Also write to a daily-rolled file at this path
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { verbose: false, default_level: "info".to_string(), file: None }
    }
}

impl LogConfig {
    /// Receiver in the foreground: `info` to stderr.
    pub fn receiver(verbose: bool) -> Self {
        Self { verbose, ..Self::default() }
    }

    /// Detached receiver: stderr plus the rolling log file.
    pub fn daemon(verbose: bool, log_path: impl Into<PathBuf>) -> Self {
        Self { verbose, file: Some(log_path.into()), ..Self::default() }
    }

    /// CLI commands: `warn` so stdout stays clean.
    pub fn cli(verbose: bool) -> Self {
        Self { verbose, default_level: "warn".to_string(), file: None }
    }

    fn filter(&self) -> EnvFilter {
        if self.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.default_level))
        }
    }
}

/// Install the global subscriber.
///
/// Returns the file writer's guard when file logging is on; hold it until
/// exit so buffered lines are flushed. A second call is a no-op.
pub fn init(config: &LogConfig) -> std::io::Result<Option<WorkerGuard>> {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal());

    let Some(path) = &config.file else {
        let _ = tracing_subscriber::registry().with(config.filter()).with(stderr_layer).try_init();
        return Ok(None);
    };

    let (dir, name) = split_log_path(path);
    std::fs::create_dir_all(&dir)?;
    let appender = tracing_appender::rolling::daily(&dir, name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let file_layer = fmt::layer().with_writer(writer).with_ansi(false);

    let _ = tracing_subscriber::registry()
        .with(config.filter())
        .with(stderr_layer)
        .with(file_layer)
        .try_init();
    Ok(Some(guard))
}

fn split_log_path(path: &Path) -> (PathBuf, String) {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "otelbox.log".to_string());
    (dir, name)
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
