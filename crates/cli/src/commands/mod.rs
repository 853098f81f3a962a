// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

pub mod clean;
pub mod instances;
pub mod start;
pub mod status;
pub mod stop;

use serde::Serialize;

use crate::exit_error::{self, ExitError};
use crate::output::{format_or_json, OutputFormat};
use crate::port::ResolveError;

/// Print a lifecycle outcome and turn its exit code into the command result.
fn report<T: Serialize>(
    format: OutputFormat,
    outcome: &T,
    message: &str,
    code: i32,
) -> anyhow::Result<()> {
    format_or_json(format, outcome, || {
        if code == exit_error::SUCCESS {
            println!("{}", message);
        } else {
            eprintln!("{}", message);
        }
    })?;
    if code != exit_error::SUCCESS {
        return Err(ExitError::silent(code).into());
    }
    Ok(())
}

impl From<ResolveError> for ExitError {
    fn from(e: ResolveError) -> Self {
        ExitError::user(e.to_string())
    }
}
