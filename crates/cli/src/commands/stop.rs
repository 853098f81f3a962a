// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `otelbox stop`

use anyhow::Result;

use crate::exit_error::ExitError;
use crate::lifecycle::Lifecycle;
use crate::output::OutputFormat;
use crate::port::resolve_port;

pub async fn stop(port: Option<u16>, format: OutputFormat) -> Result<()> {
    let lifecycle = Lifecycle::system();
    let port = resolve_port(port, &lifecycle.registry().get_registered_entries())
        .map_err(ExitError::from)?;

    let outcome = lifecycle.stop(port).await;
    super::report(format, &outcome, &outcome.message(), outcome.exit_code())
}
