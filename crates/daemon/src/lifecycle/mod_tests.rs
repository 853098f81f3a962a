// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::process::FakeProcessTable;
use otelbox_core::FakeClock;
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

struct Fixture {
    dir: TempDir,
    registry: PidFileService<FakeProcessTable, FakeClock>,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let registry =
        PidFileService::new(dir.path().join("run"), FakeProcessTable::new(4242), FakeClock::new());
    Fixture { dir, registry }
}

fn free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port()
}

fn config(f: &Fixture, port: u16) -> ReceiverConfig {
    ReceiverConfig::default().port(port).output_dir(f.dir.path().join("telemetry"))
}

async fn request(port: u16, method: &str, path: &str, body: &str) -> String {
    let mut stream = TcpStream::connect(("127.0.0.1", port)).await.unwrap();
    let req = format!(
        "{method} {path} HTTP/1.1\r\nHost: 127.0.0.1\r\nContent-Type: application/json\r\n\
         Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(req.as_bytes()).await.unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    response
}

#[tokio::test]
async fn start_registers_and_stop_unregisters() {
    let f = fixture();
    let port = free_port();

    let handle = Receiver::new(config(&f, port), f.registry.clone()).start().await.unwrap();

    assert_eq!(handle.port(), port);
    let entries = f.registry.get_registered_entries();
    assert_eq!(entries.len(), 1);
    assert_eq!((entries[0].pid, entries[0].port), (4242, port));

    handle.stop().await.unwrap();
    assert!(!f.registry.path().exists());
}

#[tokio::test]
async fn serves_ingest_and_status_over_tcp() {
    let f = fixture();
    let port = free_port();
    let handle = Receiver::new(config(&f, port), f.registry.clone()).start().await.unwrap();

    let export = request(port, "POST", "/v1/logs", r#"{"resourceLogs":[]}"#).await;
    assert!(export.starts_with("HTTP/1.1 200"), "{export}");
    assert!(export.ends_with(r#"{"partialSuccess":{}}"#));

    let status = request(port, "GET", "/api/status", "").await;
    assert!(status.contains(r#""service":"otelbox""#));
    assert!(status.contains(r#""logs_received":1"#));

    handle.stop().await.unwrap();
    assert!(f.dir.path().join("telemetry").is_dir());
}

#[tokio::test]
async fn shutdown_endpoint_stops_the_receiver() {
    let f = fixture();
    let port = free_port();
    let handle = Receiver::new(config(&f, port), f.registry.clone()).start().await.unwrap();
    let state = Arc::clone(handle.state());

    let reply = request(port, "POST", "/api/shutdown", "").await;
    assert!(reply.contains(r#""accepted":true"#));

    tokio::time::timeout(Duration::from_secs(5), handle.wait()).await.unwrap().unwrap();
    assert!(state.writer().is_closed());
    assert!(f.registry.get_registered_entries().is_empty());
}

#[tokio::test]
async fn invalid_config_fails_before_binding() {
    let f = fixture();
    let config = config(&f, free_port()).max_file_size_mb(0);

    let err = Receiver::new(config, f.registry.clone()).start().await.err().unwrap();

    assert!(matches!(err, LifecycleError::Config(ConfigError::Zero("max_file_size_mb"))));
    assert!(f.registry.get_registered_entries().is_empty());
}

#[tokio::test]
async fn port_in_use_fails_without_registering() {
    let f = fixture();
    let occupied = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = occupied.local_addr().unwrap().port();

    let err = Receiver::new(config(&f, port), f.registry.clone()).start().await.err().unwrap();

    assert!(matches!(err, LifecycleError::BindFailed { .. }));
    assert!(err.to_string().contains(&port.to_string()));
    assert!(f.registry.get_registered_entries().is_empty());
}
