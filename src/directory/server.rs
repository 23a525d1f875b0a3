//! Server setup and lifecycle: bind, start the reaper, serve, shut down.

use super::router::create_router;
use super::service::Directory;
use super::state::AppState;
use crate::card::{CardResolver, HttpCardResolver};
use crate::config::RegistryConfig;
use crate::error::{RegistryError, RegistryResult};
use crate::registry::{Reaper, RegistryStore};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

pub struct DirectoryServer {
    listener: TcpListener,
    directory: Arc<Directory>,
    reaper: Reaper,
}

impl DirectoryServer {
    /// Bind the listener and wire store, resolver and reaper from `config`.
    pub async fn bind(config: &RegistryConfig) -> RegistryResult<Self> {
        config.validate()?;
        let resolver = HttpCardResolver::new(config.resolve_timeout())?;
        Self::bind_with_resolver(config, Arc::new(resolver)).await
    }

    pub async fn bind_with_resolver(
        config: &RegistryConfig,
        resolver: Arc<dyn CardResolver>,
    ) -> RegistryResult<Self> {
        let store = Arc::new(RegistryStore::new(config.ttl()));
        let directory = Arc::new(Directory::new(store.clone(), resolver));
        let reaper = Reaper::new(store, config.sweep_interval());

        let addr = config.listen_addr();
        let listener = TcpListener::bind(&addr).await.map_err(|e| {
            RegistryError::ConfigError(format!("Failed to bind {}: {}", addr, e))
        })?;

        Ok(Self {
            listener,
            directory,
            reaper,
        })
    }

    pub fn local_addr(&self) -> RegistryResult<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn directory(&self) -> &Arc<Directory> {
        &self.directory
    }

    /// Serve until `shutdown` resolves, then stop the reaper.
    pub async fn run_until<F>(self, shutdown: F) -> RegistryResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.local_addr()?;
        let app = create_router(AppState::new(self.directory.clone()));

        self.reaper.start();
        info!(
            %addr,
            ttl_secs = self.directory.store().ttl().as_secs(),
            sweep_secs = self.reaper.period().as_secs(),
            "Agent registry listening"
        );

        let served = axum::serve(self.listener, app)
            .with_graceful_shutdown(shutdown)
            .await;

        self.reaper.stop().await;
        info!("Agent registry shut down");

        served.map_err(RegistryError::Io)
    }
}

/// Resolves on Ctrl+C or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received terminate signal, initiating graceful shutdown");
        }
    }
}
