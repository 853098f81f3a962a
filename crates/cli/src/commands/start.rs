// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `otelbox start`

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use otelbox_daemon::{env, ReceiverConfig};

use crate::exit_error::ExitError;
use crate::lifecycle::{LaunchMode, Lifecycle, SystemLauncher};
use crate::output::OutputFormat;

#[derive(Args, Debug, Clone, Default)]
pub struct StartArgs {
    /// Run in the background; returns once the receiver answers
    #[arg(short, long)]
    pub daemon: bool,

    /// Port to listen on [default: 4318]
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Directory for NDJSON output [default: ./telemetry]
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Rotate a signal's file once it reaches this size [default: 100]
    #[arg(long, value_name = "MB")]
    pub max_file_size_mb: Option<u64>,

    /// Write indented JSON instead of one object per line
    #[arg(long)]
    pub pretty: bool,
}

impl StartArgs {
    pub fn mode(&self) -> LaunchMode {
        if self.daemon {
            LaunchMode::Daemon
        } else {
            LaunchMode::Foreground
        }
    }

    /// Flags override whatever `config` already holds.
    pub fn apply(&self, mut config: ReceiverConfig) -> ReceiverConfig {
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(mb) = self.max_file_size_mb {
            config.max_file_size_mb = mb;
        }
        if self.pretty {
            config.pretty_json = true;
        }
        config
    }
}

pub async fn start(args: StartArgs, format: OutputFormat) -> Result<()> {
    let config = ReceiverConfig::from_env()
        .map_err(|e| ExitError::user(format!("invalid configuration: {e}")))?;
    let config = args.apply(config);

    let launcher = SystemLauncher::new(
        std::env::current_exe()?,
        std::env::args_os().skip(1),
        env::startup_log_path(),
    );
    let outcome = Lifecycle::system().start(config, args.mode(), &launcher).await;
    super::report(format, &outcome, &outcome.message(), outcome.exit_code())
}
