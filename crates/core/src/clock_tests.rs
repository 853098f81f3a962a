// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn system_clock_returns_increasing_time() {
    let clock = SystemClock;
    let t1 = clock.now();
    std::thread::sleep(Duration::from_millis(1));
    let t2 = clock.now();
    assert!(t2 > t1);
}

#[test]
fn system_clock_epoch_ms_tracks_utc() {
    let clock = SystemClock;
    let before = Utc::now().timestamp_millis() as u64;
    let ms = clock.epoch_ms();
    assert!(ms >= before);
}

#[test]
fn fake_clock_can_be_advanced() {
    let clock = FakeClock::new();
    let t1 = clock.now();
    let u1 = clock.utc_now();
    clock.advance(Duration::from_secs(60));
    assert!(clock.now().duration_since(t1) >= Duration::from_secs(60));
    assert_eq!((clock.utc_now() - u1).num_seconds(), 60);
}

#[test]
fn fake_clock_is_cloneable_and_shared() {
    let clock1 = FakeClock::new();
    let clock2 = clock1.clone();
    let u1 = clock1.utc_now();
    clock2.advance(Duration::from_millis(1500));
    assert_eq!((clock1.utc_now() - u1).num_milliseconds(), 1500);
}

#[test]
fn fake_clock_starts_at_fixed_utc() {
    let clock = FakeClock::default();
    assert_eq!(clock.utc_now().to_rfc3339(), "2026-01-01T00:00:00+00:00");
    assert_eq!(clock.epoch_ms(), 1_767_225_600_000);
}

#[test]
fn fake_clock_set_utc() {
    let clock = FakeClock::new();
    let at = Utc.with_ymd_and_hms(2030, 6, 1, 12, 0, 0).unwrap();
    clock.set_utc(at);
    assert_eq!(clock.utc_now(), at);
}

#[test]
fn fake_clock_set() {
    let clock = FakeClock::new();
    let future = Instant::now() + Duration::from_secs(3600);
    clock.set(future);
    assert!(clock.now() >= future);
}
