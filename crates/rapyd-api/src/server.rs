//! Server lifecycle: binding, serving and graceful shutdown.
//!
//! A [`ServerLifecycle`] owns at most one running server. The launcher calls
//! [`ServerLifecycle::start`] with a fresh configuration and
//! [`ServerLifecycle::stop`] to shut it down; nothing about the running
//! instance lives in globals.

use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use rapyd_core::config::AppConfig;
use rapyd_core::error::{AppError, ErrorKind};
use rapyd_core::result::AppResult;

use crate::router::build_router;
use crate::state::AppState;

/// A running server instance.
#[derive(Debug)]
pub struct ServerHandle {
    /// Address the listener is bound to.
    pub addr: SocketAddr,
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<std::io::Result<()>>,
    grace: Duration,
}

impl ServerHandle {
    /// Whether the serve task is still alive.
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

/// Starts and stops the single HTTP server instance.
#[derive(Debug, Default)]
pub struct ServerLifecycle {
    handle: Mutex<Option<ServerHandle>>,
}

impl ServerLifecycle {
    /// Create a lifecycle with no running server.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `config`, bind the listener and start serving.
    ///
    /// Returns the bound address once the listener is accepting. Fails with
    /// `Conflict` if a server is already running and with `Bind` if the
    /// port cannot be bound.
    pub async fn start(&self, mut config: AppConfig) -> AppResult<SocketAddr> {
        let mut slot = self.handle.lock().await;
        if slot.as_ref().is_some_and(ServerHandle::is_running) {
            return Err(AppError::conflict("Server is already running"));
        }

        config.validate()?;

        for dir in [config.thumbnail.cache_dir.clone(), config.thumbnail.archive_dir()] {
            tokio::fs::create_dir_all(&dir).await.map_err(|e| {
                AppError::with_source(ErrorKind::Storage, "Failed to create cache directory", e)
            })?;
        }

        let host = config.server.host.clone();
        let port = config.server.port;
        let grace = Duration::from_secs(config.server.shutdown_grace_seconds);

        let state = AppState::new(config)?;
        let app = build_router(state);

        let listener = TcpListener::bind((host.as_str(), port))
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Bind, format!("Failed to bind port {port}"), e)
            })?;
        let addr = listener.local_addr().map_err(|e| {
            AppError::with_source(ErrorKind::Bind, "Failed to read bound address", e)
        })?;

        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.wait_for(|stop| *stop).await;
                })
                .await
        });

        info!(%addr, "RapydShare server listening");

        *slot = Some(ServerHandle {
            addr,
            shutdown_tx,
            task,
            grace,
        });
        Ok(addr)
    }

    /// Signal graceful shutdown and wait for the server to finish.
    ///
    /// In-flight requests get the configured grace period, after which the
    /// serve task is aborted. A no-op when nothing is running.
    pub async fn stop(&self) -> AppResult<()> {
        let Some(mut handle) = self.handle.lock().await.take() else {
            return Ok(());
        };

        info!(addr = %handle.addr, "Stopping RapydShare server");
        let _ = handle.shutdown_tx.send(true);

        match tokio::time::timeout(handle.grace, &mut handle.task).await {
            Ok(Ok(Ok(()))) => info!("Server stopped"),
            Ok(Ok(Err(e))) => warn!(error = %e, "Server exited with an error"),
            Ok(Err(e)) => warn!(error = %e, "Server task failed"),
            Err(_) => {
                warn!(
                    grace_secs = handle.grace.as_secs(),
                    "Grace period elapsed, aborting in-flight requests"
                );
                handle.task.abort();
            }
        }
        Ok(())
    }

    /// Whether a server is currently running.
    pub async fn is_running(&self) -> bool {
        self.handle
            .lock()
            .await
            .as_ref()
            .is_some_and(ServerHandle::is_running)
    }

    /// Bound address of the running server.
    pub async fn local_addr(&self) -> Option<SocketAddr> {
        self.handle
            .lock()
            .await
            .as_ref()
            .filter(|h| h.is_running())
            .map(|h| h.addr)
    }

    /// `http://{ip}:{port}` for other devices on the network.
    pub async fn share_url(&self) -> Option<String> {
        self.local_addr().await.map(share_url_for)
    }
}

/// Shareable URL for a bound address. Wildcard binds advertise the
/// machine's LAN address.
pub fn share_url_for(addr: SocketAddr) -> String {
    let ip = if addr.ip().is_unspecified() {
        local_ip()
    } else {
        addr.ip()
    };
    format!("http://{}", SocketAddr::new(ip, addr.port()))
}

/// The address this machine uses for outbound traffic, or loopback.
///
/// Connecting a UDP socket sends nothing; it only selects a route.
pub fn local_ip() -> IpAddr {
    let probe = || -> std::io::Result<IpAddr> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        socket.connect("8.8.8.8:80")?;
        Ok(socket.local_addr()?.ip())
    };
    probe().unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}
