//! Configuration for the mock OAuth server.

use std::time::Duration;

use crate::error::ConfigError;
use crate::oauth::store::DEFAULT_CODE_TTL;
use crate::oauth::tokens::TOKEN_LIFETIME;

/// Server defaults.
pub mod defaults {
    use std::time::Duration;

    /// HTTP listen port.
    pub const PORT: u16 = 3000;

    /// Maximum tenant/client pairs kept in the identity cache.
    pub const USER_CACHE_CAPACITY: u64 = 1000;

    /// Identity cache TTL (24 hours).
    pub const USER_CACHE_TTL: Duration = Duration::from_secs(24 * 3600);
}

/// Runtime configuration.
#[derive(Clone)]
pub struct Config {
    /// Shared HMAC secret for signing tokens.
    pub jwt_secret: String,
    /// HTTP listen port.
    pub port: u16,
    /// Public base URL, used in the discovery document.
    pub base_url: String,
    /// Lifetime of an unredeemed authorization code.
    pub code_ttl: Duration,
    /// Lifetime embedded in issued tokens.
    pub token_lifetime: Duration,
    pub user_cache_capacity: u64,
    pub user_cache_ttl: Duration,
}

impl Config {
    /// Create a configuration with defaults for everything but the secret.
    ///
    /// # Errors
    ///
    /// Returns error if the secret is empty.
    pub fn new(
        jwt_secret: impl Into<String>,
        port: u16,
        base_url: Option<String>,
    ) -> Result<Self, ConfigError> {
        let jwt_secret = jwt_secret.into();
        if jwt_secret.trim().is_empty() {
            return Err(ConfigError::MissingSecret);
        }

        let base_url = base_url
            .map(|url| url.trim_end_matches('/').to_owned())
            .unwrap_or_else(|| format!("http://localhost:{port}"));

        Ok(Self {
            jwt_secret,
            port,
            base_url,
            code_ttl: DEFAULT_CODE_TTL,
            token_lifetime: TOKEN_LIFETIME,
            user_cache_capacity: defaults::USER_CACHE_CAPACITY,
            user_cache_ttl: defaults::USER_CACHE_TTL,
        })
    }

    /// Create configuration for tests.
    #[must_use]
    pub fn for_testing(jwt_secret: &str) -> Self {
        Self {
            jwt_secret: jwt_secret.to_owned(),
            port: 0,
            base_url: "http://localhost".to_owned(),
            code_ttl: DEFAULT_CODE_TTL,
            token_lifetime: TOKEN_LIFETIME,
            user_cache_capacity: 100,
            user_cache_ttl: Duration::from_secs(60),
        }
    }

    /// Create configuration from environment variables, after loading `.env`.
    ///
    /// Reads `JWT_SECRET` (required), `PORT`, `BASE_URL` and `CODE_TTL_SECS`.
    ///
    /// # Errors
    ///
    /// Returns error if the secret is missing or a value does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let jwt_secret = std::env::var("JWT_SECRET").map_err(|_| ConfigError::MissingSecret)?;
        let port = parse_env("PORT")?.unwrap_or(defaults::PORT);
        let base_url = std::env::var("BASE_URL").ok();

        let mut config = Self::new(jwt_secret, port, base_url)?;
        if let Some(secs) = parse_env::<u64>("CODE_TTL_SECS")? {
            config.code_ttl = Duration::from_secs(secs);
        }
        Ok(config)
    }

    /// Override the code lifetime.
    #[must_use]
    pub fn with_code_ttl(mut self, code_ttl: Duration) -> Self {
        self.code_ttl = code_ttl;
        self
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("jwt_secret", &"<redacted>")
            .field("port", &self.port)
            .field("base_url", &self.base_url)
            .field("code_ttl", &self.code_ttl)
            .field("token_lifetime", &self.token_lifetime)
            .finish_non_exhaustive()
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Result<Option<T>, ConfigError> {
    match std::env::var(name) {
        Ok(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { name: name.to_owned(), value }),
        Err(_) => Ok(None),
    }
}
