//! HTTP boundary for the mock provider.
//!
//! Owns the one [`AuthorizationCoordinator`] for the process; it is built at
//! startup and dropped when the server shuts down.

pub mod handlers;
pub mod login;
pub mod transport;

use std::net::SocketAddr;

use crate::config::Config;
use crate::oauth::AuthorizationCoordinator;

/// Mock OAuth server.
pub struct MockOAuthServer {
    coordinator: AuthorizationCoordinator,
    port: u16,
    base_url: String,
}

impl MockOAuthServer {
    /// Create a server with an in-memory code store.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let coordinator = AuthorizationCoordinator::from_config(&config);
        Self::with_coordinator(coordinator, &config)
    }

    /// Create a server around an existing coordinator (e.g. a custom store).
    #[must_use]
    pub fn with_coordinator(coordinator: AuthorizationCoordinator, config: &Config) -> Self {
        Self { coordinator, port: config.port, base_url: config.base_url.clone() }
    }

    /// Build the router without binding a socket.
    #[must_use]
    pub fn router(&self) -> axum::Router {
        transport::create_router(self.coordinator.clone(), self.base_url.clone())
    }

    /// Run the server in HTTP mode.
    ///
    /// # Errors
    ///
    /// Returns error on server failure.
    pub async fn run_http(self) -> anyhow::Result<()> {
        let router = self.router();
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));

        tracing::info!(base_url = %self.base_url, "HTTP server listening on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;

        tracing::info!("HTTP server shut down");
        Ok(())
    }
}

impl std::fmt::Debug for MockOAuthServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockOAuthServer")
            .field("port", &self.port)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c().await.expect("Failed to install CTRL+C handler");
    tracing::info!("Received shutdown signal");
}
