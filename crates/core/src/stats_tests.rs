// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::sync::Arc;

#[test]
fn counters_are_independent() {
    let stats = TelemetryStatistics::new();
    stats.increment(Signal::Traces);
    stats.increment(Signal::Traces);
    stats.increment(Signal::Metrics);

    assert_eq!(
        stats.snapshot(),
        StatsSnapshot { traces_received: 2, logs_received: 0, metrics_received: 1 }
    );
    assert_eq!(stats.snapshot().total(), 3);
}

#[test]
fn concurrent_increments_are_not_lost() {
    let stats = Arc::new(TelemetryStatistics::new());
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let stats = Arc::clone(&stats);
            std::thread::spawn(move || {
                for _ in 0..1000 {
                    stats.increment(Signal::Logs);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(stats.get(Signal::Logs), 8000);
}

#[test]
fn snapshot_serializes_snake_case() {
    let json = serde_json::to_string(&StatsSnapshot::default()).unwrap();
    assert_eq!(json, r#"{"traces_received":0,"logs_received":0,"metrics_received":0}"#);
}
