//! OAuth 2.0 / OpenID Connect types for the mock provider.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::OAuthError;

/// Scope reported in the token envelope and embedded in access tokens.
pub const TOKEN_SCOPE: &str = "email openid profile";

/// `expires_in` / `ext_expires_in` reported by the token endpoint.
///
/// Reporting metadata only; the signed tokens carry their own 15-minute `exp`.
pub const REPORTED_EXPIRES_IN: u64 = 599;

/// Simulated identity collected by the login form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserClaims {
    pub email: String,
    pub family_name: String,
    pub given_name: String,
    pub account_type: String,
}

impl UserClaims {
    /// Display name, always `"{given_name} {family_name}"`.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.given_name, self.family_name)
    }
}

/// Supported PKCE transformations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeChallengeMethod {
    S256,
}

impl CodeChallengeMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::S256 => "S256",
        }
    }
}

impl FromStr for CodeChallengeMethod {
    type Err = OAuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("S256") {
            Ok(Self::S256)
        } else {
            Err(OAuthError::UnsupportedMethod(s.to_owned()))
        }
    }
}

impl fmt::Display for CodeChallengeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State written at login and redeemed once at the token endpoint.
///
/// Serializable so that durable backends can persist one row per code with
/// `code` as the primary key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeRecord {
    pub code: String,
    pub tenant_id: String,
    pub client_id: String,
    pub code_challenge: String,
    /// Kept as presented; the verifier re-parses it and fails closed.
    pub code_challenge_method: String,
    pub user_claims: UserClaims,
}

/// Claims embedded in the access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    pub email: String,
    pub family_name: String,
    pub given_name: String,
    pub name: String,
    pub scope: String,
    pub iat: i64,
    pub exp: i64,
}

/// Claims embedded in the ID token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdTokenClaims {
    pub email: String,
    pub family_name: String,
    pub given_name: String,
    pub name: String,
    pub preferred_username: String,
    pub account_type: String,
    pub iat: i64,
    pub exp: i64,
}

/// Fixed envelope returned by a successful code exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token_type: String,
    pub scope: String,
    pub expires_in: u64,
    pub ext_expires_in: u64,
    pub access_token: String,
    pub id_token: String,
}

impl TokenResponse {
    #[must_use]
    pub fn bearer(access_token: String, id_token: String) -> Self {
        Self {
            token_type: "Bearer".to_owned(),
            scope: TOKEN_SCOPE.to_owned(),
            expires_in: REPORTED_EXPIRES_IN,
            ext_expires_in: REPORTED_EXPIRES_IN,
            access_token,
            id_token,
        }
    }
}
