// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error type that carries a process exit code.
//!
//! Commands return `ExitError` instead of calling `std::process::exit()`
//! directly; `main()` is the only place the process exits.

use std::fmt;

/// Healthy, stopped, started.
pub const SUCCESS: i32 = 0;
/// Something the user can fix: unhealthy, already running, ambiguous port.
pub const USER: i32 = 1;
/// Unexpected or system failure.
pub const SYSTEM: i32 = 2;

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }

    pub fn user(message: impl Into<String>) -> Self {
        Self::new(USER, message)
    }

    pub fn system(message: impl Into<String>) -> Self {
        Self::new(SYSTEM, message)
    }

    /// Exit with `code` without printing anything more.
    pub fn silent(code: i32) -> Self {
        Self::new(code, String::new())
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ExitError {}

/// Exit code for a command's final result.
///
/// An [`ExitError`] anywhere in the chain decides the code; anything else is
/// a system failure.
pub fn exit_code(result: &anyhow::Result<()>) -> i32 {
    match result {
        Ok(()) => SUCCESS,
        Err(e) => e.downcast_ref::<ExitError>().map_or(SYSTEM, |exit| exit.code),
    }
}

#[cfg(test)]
#[path = "exit_error_tests.rs"]
mod tests;
