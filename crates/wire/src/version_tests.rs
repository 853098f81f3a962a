// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn bump(part: usize) -> String {
    let mut parts: Vec<u64> = VERSION.split('.').map(|p| p.parse().unwrap()).collect();
    parts[part] += 1;
    parts.iter().map(u64::to_string).collect::<Vec<_>>().join(".")
}

#[test]
fn own_version_is_compatible() {
    assert!(is_compatible(SERVICE_NAME, VERSION));
}

#[test]
fn patch_and_build_metadata_are_ignored() {
    assert!(is_compatible(SERVICE_NAME, &bump(2)));
    assert!(is_compatible(SERVICE_NAME, &format!("{VERSION}+abc123")));
    assert!(is_compatible(SERVICE_NAME, &format!("{VERSION}-rc.1")));
}

#[test]
fn minor_or_major_change_is_incompatible() {
    assert!(!is_compatible(SERVICE_NAME, &bump(1)));
    assert!(!is_compatible(SERVICE_NAME, &bump(0)));
}

#[yare::parameterized(
    other_service = { "jaeger", VERSION },
    empty_version = { SERVICE_NAME, "" },
    garbage = { SERVICE_NAME, "latest" },
    major_only = { SERVICE_NAME, "0" },
)]
fn rejects(service: &str, version: &str) {
    assert!(!is_compatible(service, version));
}
