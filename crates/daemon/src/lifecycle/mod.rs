// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Receiver lifecycle: validate, bind, register, serve, drain, unregister.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use otelbox_core::{Clock, HealthMonitor, SystemClock, TelemetryStatistics};
use otelbox_storage::TelemetryFileWriter;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::{ConfigError, ReceiverConfig};
use crate::process::{ProcessTable, SystemProcessTable};
use crate::registry::PidFileService;
use crate::server::{self, ReceiverState};

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to bind {addr}: {source}")]
    BindFailed {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("server error: {0}")]
    Serve(String),
}

/// A receiver ready to start.
pub struct Receiver<P: ProcessTable = SystemProcessTable, C: Clock = SystemClock> {
    config: ReceiverConfig,
    registry: PidFileService<P, C>,
}

impl Receiver {
    /// Receiver using the host registry.
    pub fn system(config: ReceiverConfig) -> Self {
        Self::new(config, PidFileService::system())
    }
}

impl<P: ProcessTable, C: Clock> Receiver<P, C> {
    pub fn new(config: ReceiverConfig, registry: PidFileService<P, C>) -> Self {
        Self { config, registry }
    }

    /// Bind the port, register, and start serving in the background.
    ///
    /// Registration happens only after a successful bind. A registry failure
    /// is logged and does not stop the receiver.
    pub async fn start(self) -> Result<ReceiverHandle<P, C>, LifecycleError> {
        self.config.validate()?;

        let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, self.config.port));
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| LifecycleError::BindFailed { addr, source })?;
        let port = listener.local_addr()?.port();

        let writer = TelemetryFileWriter::new(
            self.config.writer_config(),
            SystemClock,
            Arc::new(HealthMonitor::new(
                self.config.max_consecutive_file_errors,
                self.config.max_error_history_size,
            )),
            Arc::new(TelemetryStatistics::new()),
        );
        let output_dir = writer.config().output_dir.clone();

        let shutdown = CancellationToken::new();
        let pid = self.registry.processes().current_pid();
        let state = Arc::new(ReceiverState::new(writer, port, pid, shutdown.clone()));

        let registered = self.registry.blocking(move |r| r.register(port)).await.is_ok();

        let app = server::router(Arc::clone(&state));
        let token = shutdown.clone();
        let task = tokio::spawn(async move {
            axum::serve(listener, app).with_graceful_shutdown(token.cancelled_owned()).await
        });

        info!(port, pid, output_dir = %output_dir.display(), "receiver listening");
        Ok(ReceiverHandle { state, shutdown, task, registry: self.registry, registered })
    }
}

/// A running receiver.
pub struct ReceiverHandle<P: ProcessTable = SystemProcessTable, C: Clock = SystemClock> {
    state: Arc<ReceiverState>,
    shutdown: CancellationToken,
    task: JoinHandle<std::io::Result<()>>,
    registry: PidFileService<P, C>,
    registered: bool,
}

impl<P: ProcessTable, C: Clock> ReceiverHandle<P, C> {
    pub fn port(&self) -> u16 {
        self.state.port()
    }

    pub fn state(&self) -> &Arc<ReceiverState> {
        &self.state
    }

    /// Cancelling this token starts a graceful shutdown.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Wait for the server to stop, then close the writer and unregister.
    pub async fn wait(self) -> Result<(), LifecycleError> {
        let served = match self.task.await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(LifecycleError::Serve(e.to_string())),
            Err(e) => Err(LifecycleError::Serve(e.to_string())),
        };

        self.state.writer().close().await;
        if self.registered {
            // Errors are already logged by the registry
            let _ = self.registry.blocking(|r| r.unregister()).await;
        }

        match &served {
            Ok(()) => info!(port = self.state.port(), "receiver stopped"),
            Err(e) => warn!(port = self.state.port(), error = %e, "receiver stopped with error"),
        }
        served
    }

    /// Trigger a graceful shutdown and wait for it.
    pub async fn stop(self) -> Result<(), LifecycleError> {
        self.shutdown.cancel();
        self.wait().await
    }
}

/// Run a receiver in the foreground until Ctrl-C, SIGTERM, or
/// `POST /api/shutdown`.
pub async fn run(config: ReceiverConfig) -> Result<(), LifecycleError> {
    let handle = Receiver::system(config).start().await?;
    let token = handle.shutdown_token();
    tokio::spawn(async move {
        tokio::select! {
            _ = shutdown_signal() => {
                info!("shutdown signal received");
                token.cancel();
            }
            _ = token.cancelled() => {}
        }
    });
    handle.wait().await
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
            }
            Err(e) => {
                warn!(error = %e, "SIGTERM handler unavailable; waiting for Ctrl-C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
