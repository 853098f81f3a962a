// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Picks the receiver port a command talks to.

use otelbox_daemon::PidEntry;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("no running otelbox instance found")]
    NoInstance,

    #[error("multiple otelbox instances running on ports {}; specify one with --port", join(.ports))]
    Ambiguous { ports: Vec<u16> },
}

/// An explicit port wins untouched. Otherwise the registry must hold exactly
/// one entry.
pub fn resolve_port(explicit: Option<u16>, entries: &[PidEntry]) -> Result<u16, ResolveError> {
    if let Some(port) = explicit {
        return Ok(port);
    }
    match entries {
        [] => Err(ResolveError::NoInstance),
        [only] => Ok(only.port),
        many => Err(ResolveError::Ambiguous { ports: many.iter().map(|e| e.port).collect() }),
    }
}

fn join(ports: &[u16]) -> String {
    ports.iter().map(u16::to_string).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
#[path = "port_tests.rs"]
mod tests;
