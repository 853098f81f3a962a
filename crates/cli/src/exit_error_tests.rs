// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn ok_maps_to_success() {
    assert_eq!(exit_code(&Ok(())), SUCCESS);
}

#[test]
fn exit_error_keeps_its_code() {
    let result: anyhow::Result<()> = Err(ExitError::user("already running").into());
    assert_eq!(exit_code(&result), USER);
}

#[test]
fn exit_error_code_survives_context() {
    let result: anyhow::Result<()> =
        Err(anyhow::Error::from(ExitError::silent(USER)).context("status"));
    assert_eq!(exit_code(&result), USER);
}

#[test]
fn other_errors_are_system_failures() {
    let result: anyhow::Result<()> = Err(anyhow::anyhow!("disk on fire"));
    assert_eq!(exit_code(&result), SYSTEM);
}

#[test]
fn display_is_the_message() {
    assert_eq!(ExitError::system("bind failed").to_string(), "bind failed");
}
