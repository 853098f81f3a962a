// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

/// Service name reported in every status payload.
pub const SERVICE_NAME: &str = "otelbox";

/// Version of this build (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Whether a receiver reporting `service`/`version` can be driven by this
/// build: same service and matching `major.minor`.
pub fn is_compatible(service: &str, version: &str) -> bool {
    service == SERVICE_NAME && major_minor(version).is_some_and(|v| Some(v) == major_minor(VERSION))
}

fn major_minor(version: &str) -> Option<(u64, u64)> {
    let core = version.split(['+', '-']).next()?;
    let mut parts = core.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next()?.parse().ok()?;
    Some((major, minor))
}

#[cfg(test)]
#[path = "version_tests.rs"]
mod tests;
