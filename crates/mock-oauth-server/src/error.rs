//! Error types for the mock OAuth server.
//!
//! Uses `thiserror` for structured error handling with automatic `From` implementations.

use axum::http::StatusCode;

/// Errors from a code store backend.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    /// Backend could not be reached or rejected the operation
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Create an unavailable error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }
}

/// Outcome of a rejected authorization-code protocol step.
#[derive(thiserror::Error, Debug)]
pub enum OAuthError {
    /// Missing or malformed request field
    #[error("Invalid request parameter '{field}': {message}")]
    Validation {
        /// Field that failed validation
        field: String,
        /// Validation error message
        message: String,
    },

    /// Code absent, expired, or already redeemed
    #[error("Invalid Code")]
    UnknownCode,

    /// Tenant, client, or PKCE check failed. Deliberately does not say which.
    #[error("challenge and verifier does not match")]
    ChallengeMismatch,

    /// code_challenge_method other than S256
    #[error("Unsupported code_challenge_method: {0}")]
    UnsupportedMethod(String),

    /// Code store backend failure
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Token signing failure
    #[error("Signing error: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

impl OAuthError {
    /// Create a validation error.
    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation { field: field.into(), message: message.into() }
    }

    /// Create a "missing parameter" validation error.
    #[must_use]
    pub fn missing(field: impl Into<String>) -> Self {
        Self::validation(field, "missing parameter")
    }

    /// HTTP status the boundary layer responds with.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation { .. } | Self::UnknownCode | Self::UnsupportedMethod(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::ChallengeMismatch => StatusCode::UNAUTHORIZED,
            Self::Store(_) | Self::Signing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short machine-checkable error code.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "invalid_request",
            Self::UnknownCode => "invalid_grant",
            Self::ChallengeMismatch => "invalid_client",
            Self::UnsupportedMethod(_) => "unsupported_challenge_method",
            Self::Store(_) | Self::Signing(_) => "server_error",
        }
    }

    /// Returns true for infrastructure faults rather than client mistakes.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Store(_) | Self::Signing(_))
    }

    /// Message safe to return to the client. Internal detail is withheld.
    #[must_use]
    pub fn to_user_message(&self) -> String {
        if self.is_internal() { "internal server error".to_owned() } else { self.to_string() }
    }
}

/// Errors while loading configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// Signing secret not provided
    #[error("JWT_SECRET must be set to a non-empty value")]
    MissingSecret,

    /// Environment value could not be parsed
    #[error("Invalid value for {name}: {value}")]
    Invalid {
        /// Variable name
        name: String,
        /// Offending value
        value: String,
    },
}

/// Result type alias for protocol operations.
pub type OAuthResult<T> = Result<T, OAuthError>;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
