// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::process::FakeProcessTable;
use otelbox_core::FakeClock;
use tempfile::{tempdir, TempDir};

const PID_A: u32 = 1001;
const PID_B: u32 = 1002;

fn service(current: u32) -> (TempDir, PidFileService<FakeProcessTable, FakeClock>, FakeProcessTable) {
    let dir = tempdir().unwrap();
    let table = FakeProcessTable::new(current);
    let service = PidFileService::new(dir.path(), table.clone(), FakeClock::new());
    (dir, service, table)
}

#[test]
fn register_then_unregister_leaves_no_file() {
    let (_dir, registry, _) = service(PID_A);

    let entry = registry.register(4318).unwrap();
    assert!(registry.path().exists());
    assert_eq!(entry.pid, PID_A);
    assert_eq!(entry.port, 4318);
    assert_eq!(entry.timestamp.to_rfc3339(), "2026-01-01T00:00:00+00:00");

    assert_eq!(registry.unregister().unwrap(), 1);
    assert!(!registry.path().exists());
    assert!(registry.get_registered_entries().is_empty());
}

#[test]
fn unregister_is_idempotent() {
    let (_dir, registry, _) = service(PID_A);
    assert_eq!(registry.unregister().unwrap(), 0);

    registry.register(4318).unwrap();
    assert_eq!(registry.unregister().unwrap(), 1);
    assert_eq!(registry.unregister().unwrap(), 0);
}

#[test]
fn repeated_registration_appends_and_unregister_removes_all() {
    let (_dir, registry, _) = service(PID_A);
    registry.register(4318).unwrap();
    registry.register(4319).unwrap();
    registry.register(4318).unwrap();

    assert_eq!(registry.get_registered_entries().len(), 3);
    assert_eq!(registry.get_registered_entries_for_port(4318).len(), 2);
    assert_eq!(registry.unregister().unwrap(), 3);
}

#[test]
fn unregister_keeps_other_processes() {
    let (_dir, registry, table) = service(PID_A);
    registry.register(4318).unwrap();
    table.set_current_pid(PID_B);
    registry.register(4319).unwrap();

    assert_eq!(registry.unregister().unwrap(), 1);

    let entries = registry.get_registered_entries();
    assert_eq!(entries.len(), 1);
    assert_eq!((entries[0].pid, entries[0].port), (PID_A, 4318));
}

#[test]
fn filtered_views() {
    let (_dir, registry, table) = service(PID_A);
    registry.register(4318).unwrap();
    table.set_current_pid(PID_B);
    registry.register(4319).unwrap();

    assert_eq!(registry.get_entry_by_pid(PID_B).map(|e| e.port), Some(4319));
    assert_eq!(registry.get_entry_by_port(4318).map(|e| e.pid), Some(PID_A));
    assert!(registry.get_entry_by_pid(9999).is_none());
    assert!(registry.get_entry_by_port(5000).is_none());
    assert!(registry.get_registered_entries_for_port(5000).is_empty());
}

#[test]
fn clean_removes_only_dead_processes() {
    let (_dir, registry, table) = service(PID_A);
    registry.register(4318).unwrap();
    table.set_current_pid(PID_B);
    table.spawn(PID_B, "otelbox");
    registry.register(4319).unwrap();

    table.exit(PID_B);
    assert_eq!(registry.clean_stale_entries().unwrap(), 1);

    let entries = registry.get_registered_entries();
    assert_eq!(entries.len(), 1);
    assert_eq!((entries[0].pid, entries[0].port), (PID_A, 4318));
}

#[test]
fn clean_treats_reused_pid_as_stale() {
    let (_dir, registry, table) = service(PID_A);
    registry.register(4318).unwrap();
    table.exit(PID_A);
    table.spawn(PID_A, "postgres");

    assert!(!registry.is_running(&registry.get_registered_entries()[0]));
    assert_eq!(registry.clean_stale_entries().unwrap(), 1);
    assert!(!registry.path().exists());
}

#[test]
fn clean_with_nothing_stale_is_zero() {
    let (_dir, registry, _) = service(PID_A);
    assert_eq!(registry.clean_stale_entries().unwrap(), 0);
    registry.register(4318).unwrap();
    assert_eq!(registry.clean_stale_entries().unwrap(), 0);
    assert_eq!(registry.get_registered_entries().len(), 1);
}

#[test]
fn windows_binary_name_counts_as_running() {
    let (_dir, registry, table) = service(PID_A);
    table.spawn(PID_B, "OtelBox.exe");
    let entry = PidEntry { pid: PID_B, port: 1, timestamp: Utc::now() };
    assert!(registry.is_running(&entry));
}

#[test]
fn invalid_file_reads_as_empty_and_is_replaced() {
    let (_dir, registry, _) = service(PID_A);
    std::fs::write(registry.path(), "{not json").unwrap();

    assert!(registry.get_registered_entries().is_empty());

    registry.register(4318).unwrap();
    assert_eq!(registry.get_registered_entries().len(), 1);
}

#[test]
fn file_is_a_json_array() {
    let (_dir, registry, _) = service(PID_A);
    registry.register(4318).unwrap();

    let raw = std::fs::read_to_string(registry.path()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let first = &value.as_array().unwrap()[0];
    assert_eq!(first["pid"], PID_A);
    assert_eq!(first["port"], 4318);
    assert_eq!(first["timestamp"], "2026-01-01T00:00:00Z");
}

#[test]
fn contended_lock_fails_without_touching_file() {
    let (_dir, registry, _) = service(PID_A);
    registry.register(4318).unwrap();
    let before = std::fs::read_to_string(registry.path()).unwrap();

    let mut lock_path = registry.path().as_os_str().to_owned();
    lock_path.push(".lock");
    let holder = std::fs::File::open(PathBuf::from(lock_path)).unwrap();
    fs2::FileExt::lock_exclusive(&holder).unwrap();

    let err = registry.register(4319).unwrap_err();
    assert!(matches!(err, RegistryError::LockContended(_)));
    assert_eq!(std::fs::read_to_string(registry.path()).unwrap(), before);

    drop(holder);
    registry.register(4319).unwrap();
    assert_eq!(registry.get_registered_entries().len(), 2);
}

#[tokio::test]
async fn contended_lock_does_not_stall_the_runtime() {
    let (_dir, registry, _) = service(PID_A);
    registry.register(4318).unwrap();
    let mut lock_path = registry.path().as_os_str().to_owned();
    lock_path.push(".lock");
    let holder = std::fs::File::open(PathBuf::from(lock_path)).unwrap();
    fs2::FileExt::lock_exclusive(&holder).unwrap();

    let ticks = std::sync::Arc::new(std::sync::atomic::AtomicU32::new(0));
    let ticker = {
        let ticks = std::sync::Arc::clone(&ticks);
        tokio::spawn(async move {
            loop {
                ticks.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
                tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            }
        })
    };

    let err = registry.blocking(|r| r.register(4319)).await.unwrap_err();
    ticker.abort();

    assert!(matches!(err, RegistryError::LockContended(_)));
    // the lock wait spans 200ms; a blocked worker would have ticked once
    assert!(ticks.load(std::sync::atomic::Ordering::Relaxed) > 5);

    drop(holder);
    let entry = registry.blocking(|r| r.register(4319)).await.unwrap();
    assert_eq!(entry.port, 4319);
}

#[test]
fn concurrent_registrations_are_not_lost() {
    let (_dir, registry, table) = service(PID_A);
    let handles: Vec<_> = (0..8u16)
        .map(|i| {
            let registry = registry.clone();
            std::thread::spawn(move || {
                // Retry on contention; the registry itself only retries a few times
                for _ in 0..50 {
                    if registry.register(5000 + i).is_ok() {
                        return;
                    }
                }
                panic!("could not register port {}", 5000 + i);
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let mut ports: Vec<u16> = registry.get_registered_entries().iter().map(|e| e.port).collect();
    ports.sort_unstable();
    assert_eq!(ports, (5000..5008).collect::<Vec<_>>());
    assert_eq!(table.current_pid(), PID_A);
}
