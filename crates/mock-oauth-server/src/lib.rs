//! Mock OAuth 2.0 / OpenID Connect provider.
//!
//! Stands in for a real identity provider during integration testing. Supports
//! the authorization-code flow with PKCE, scoped per tenant and client.
//!
//! # Features
//!
//! - **Single-use codes**: redemption removes the code atomically
//! - **PKCE S256**: any other method fails closed
//! - **Signed tokens**: HS256 access and ID tokens with a 15-minute lifetime
//! - **Quick resubmit**: recently used identities listed on the login form
//!
//! # Example
//!
//! ```no_run
//! use mock_oauth_server::{config::Config, server::MockOAuthServer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     MockOAuthServer::new(config).run_http().await
//! }
//! ```

pub mod config;
pub mod error;
pub mod oauth;
pub mod server;

pub use config::Config;
pub use error::{ConfigError, OAuthError, StoreError};
pub use oauth::AuthorizationCoordinator;
