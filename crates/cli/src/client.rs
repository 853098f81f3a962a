// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Control-API client.
//!
//! Sends HTTP/1.1 requests to a receiver's loopback port and reads the
//! response using Content-Length framing.

use std::time::Duration;

use async_trait::async_trait;
use otelbox_wire::{routes, ProtocolError, ShutdownResponse, StatusResponse};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

#[derive(Debug, Error)]
pub enum ControlError {
    #[error("no receiver answering on port {port}")]
    NotRunning { port: u16 },

    #[error("receiver on port {port} did not answer within {timeout:?}")]
    Timeout { port: u16, timeout: Duration },

    #[error("IO error talking to port {port}: {source}")]
    Io {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

impl ControlError {
    /// Nothing is listening, as opposed to a listener misbehaving.
    pub fn is_not_running(&self) -> bool {
        matches!(self, ControlError::NotRunning { .. })
    }
}

/// The two control calls the CLI makes.
#[async_trait]
pub trait ControlClient: Send + Sync {
    async fn status(&self, port: u16) -> Result<StatusResponse, ControlError>;

    async fn shutdown(&self, port: u16) -> Result<ShutdownResponse, ControlError>;
}

/// [`ControlClient`] over plain TCP to `127.0.0.1`.
#[derive(Debug, Clone)]
pub struct HttpControlClient {
    timeout: Duration,
}

impl Default for HttpControlClient {
    fn default() -> Self {
        Self::new(otelbox_daemon::env::control_timeout())
    }
}

impl HttpControlClient {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Connect, send, and read with one timeout covering the whole exchange,
    /// so a receiver that accepts but never answers cannot hang the CLI.
    async fn request(&self, port: u16, request: String) -> Result<Vec<u8>, ControlError> {
        let (status, body) =
            tokio::time::timeout(self.timeout, send_request(port, request.as_bytes()))
                .await
                .map_err(|_| ControlError::Timeout { port, timeout: self.timeout })??;
        if !(200..300).contains(&status) {
            return Err(ProtocolError::UnexpectedStatus {
                status,
                body: String::from_utf8_lossy(&body).trim().to_string(),
            }
            .into());
        }
        Ok(body)
    }
}

#[async_trait]
impl ControlClient for HttpControlClient {
    async fn status(&self, port: u16) -> Result<StatusResponse, ControlError> {
        let body = self.request(port, get(routes::STATUS)).await?;
        Ok(otelbox_wire::decode(&body)?)
    }

    async fn shutdown(&self, port: u16) -> Result<ShutdownResponse, ControlError> {
        let body = self.request(port, post(routes::SHUTDOWN, "{}")).await?;
        Ok(otelbox_wire::decode(&body)?)
    }
}

fn get(path: &str) -> String {
    format!("GET {path} HTTP/1.1\r\nHost: 127.0.0.1\r\nConnection: close\r\n\r\n")
}

fn post(path: &str, body: &str) -> String {
    format!(
        "POST {path} HTTP/1.1\r\nHost: 127.0.0.1\r\nContent-Type: application/json\r\n\
         Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    )
}

async fn send_request(port: u16, request: &[u8]) -> Result<(u16, Vec<u8>), ControlError> {
    let io = |source: std::io::Error| ControlError::Io { port, source };
    let mut stream = TcpStream::connect(("127.0.0.1", port)).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::ConnectionRefused => ControlError::NotRunning { port },
        _ => io(e),
    })?;
    stream.write_all(request).await.map_err(io)?;

    let mut reader = BufReader::new(&mut stream);
    read_http_response(&mut reader).await.map_err(io)
}

/// Status code and body of an HTTP/1.1 response.
async fn read_http_response<R: AsyncRead + Unpin>(
    reader: &mut BufReader<R>,
) -> std::io::Result<(u16, Vec<u8>)> {
    let mut status_line = String::new();
    reader.read_line(&mut status_line).await?;
    let status =
        status_line.split_whitespace().nth(1).and_then(|s| s.parse::<u16>().ok()).unwrap_or(0);

    // Header names are case-insensitive
    let mut content_length: Option<usize> = None;
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).await?;
        if line == "\r\n" || line.is_empty() {
            break;
        }
        let lower = line.to_ascii_lowercase();
        if let Some(value) = lower.strip_prefix("content-length:") {
            content_length = value.trim().parse().ok();
        }
    }

    let body = match content_length {
        Some(len) => {
            let mut buf = vec![0u8; len];
            reader.read_exact(&mut buf).await?;
            buf
        }
        None => {
            let mut buf = Vec::new();
            reader.read_to_end(&mut buf).await?;
            buf
        }
    };
    Ok((status, body))
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
