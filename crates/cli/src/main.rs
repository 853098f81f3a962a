// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `otelbox`: a local OTLP receiver that writes telemetry to NDJSON files.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod client;
mod commands;
mod exit_error;
mod lifecycle;
mod output;
mod port;
mod spawn;

use clap::{Args, Parser, Subcommand};
use otelbox_daemon::env;
use otelbox_daemon::logging::{self, LogConfig};

use crate::commands::start::StartArgs;
use crate::output::OutputFormat;

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BUILD_GIT_HASH"), ")");

#[derive(Parser, Debug)]
#[command(name = "otelbox", version = VERSION, about = "Local OTLP receiver writing NDJSON files")]
struct Cli {
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    /// Debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start a receiver
    Start(StartArgs),
    /// Stop a receiver, killing it if it does not exit in time
    Stop(PortArg),
    /// Show a receiver's health, counters, and files (exit 1 when unhealthy)
    Status(PortArg),
    /// List registered receivers
    Instances,
    /// Remove registry entries whose process is gone
    Clean,
}

#[derive(Args, Debug, Clone, Copy)]
struct PortArg {
    /// Receiver port; optional when exactly one instance is registered
    #[arg(short, long)]
    port: Option<u16>,
}

impl Cli {
    fn log_config(&self) -> LogConfig {
        match &self.command {
            Command::Start(args) if !args.daemon && env::is_detached() => {
                LogConfig::daemon(self.verbose, env::log_path())
            }
            Command::Start(args) if !args.daemon => LogConfig::receiver(self.verbose),
            _ => LogConfig::cli(self.verbose),
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Start(args) => commands::start::start(args, cli.format).await,
        Command::Stop(PortArg { port }) => commands::stop::stop(port, cli.format).await,
        Command::Status(PortArg { port }) => commands::status::status(port, cli.format).await,
        Command::Instances => commands::instances::instances(cli.format),
        Command::Clean => commands::clean::clean(cli.format),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let guard = match logging::init(&cli.log_config()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("warning: file logging unavailable: {}", e);
            None
        }
    };

    let result = run(cli).await;
    if let Err(e) = &result {
        match e.downcast_ref::<exit_error::ExitError>() {
            Some(exit) if exit.message.is_empty() => {}
            Some(exit) => eprintln!("Error: {}", exit.message),
            None => eprintln!("Error: {:#}", e),
        }
    }
    let code = exit_error::exit_code(&result);
    drop(guard);
    std::process::exit(code);
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
