//! Signed access and ID tokens.
//!
//! Tokens are compact JWTs signed HS256 with the process-wide shared secret.

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::types::{AccessTokenClaims, IdTokenClaims, TOKEN_SCOPE, UserClaims};

/// Lifetime embedded in every issued token: 15 minutes.
pub const TOKEN_LIFETIME: Duration = Duration::from_secs(15 * 60);

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Builds and signs token claim sets.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    lifetime: Duration,
}

impl TokenIssuer {
    #[must_use]
    pub fn new(secret: &str) -> Self {
        Self::with_lifetime(secret, TOKEN_LIFETIME)
    }

    #[must_use]
    pub fn with_lifetime(secret: &str, lifetime: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            lifetime,
        }
    }

    /// Issued-at and expiry timestamps for a token minted now.
    fn validity(&self) -> (i64, i64) {
        let iat = Utc::now().timestamp();
        let lifetime = i64::try_from(self.lifetime.as_secs()).unwrap_or(i64::MAX);
        (iat, iat.saturating_add(lifetime))
    }

    fn sign<T: Serialize>(&self, claims: &T) -> Result<String, jsonwebtoken::errors::Error> {
        jsonwebtoken::encode(&Header::new(ALGORITHM), claims, &self.encoding_key)
    }

    fn verify<T: DeserializeOwned>(&self, token: &str) -> Result<TokenData<T>, jsonwebtoken::errors::Error> {
        let mut validation = Validation::new(ALGORITHM);
        validation.validate_exp = true;
        validation.validate_aud = false;
        jsonwebtoken::decode(token, &self.decoding_key, &validation)
    }

    /// Sign an access token for `user`.
    pub fn create_access_token(&self, user: &UserClaims) -> Result<String, jsonwebtoken::errors::Error> {
        let (iat, exp) = self.validity();
        self.sign(&AccessTokenClaims {
            email: user.email.clone(),
            family_name: user.family_name.clone(),
            given_name: user.given_name.clone(),
            name: user.full_name(),
            scope: TOKEN_SCOPE.to_owned(),
            iat,
            exp,
        })
    }

    /// Sign an ID token for `user`.
    pub fn create_id_token(&self, user: &UserClaims) -> Result<String, jsonwebtoken::errors::Error> {
        let (iat, exp) = self.validity();
        self.sign(&IdTokenClaims {
            email: user.email.clone(),
            family_name: user.family_name.clone(),
            given_name: user.given_name.clone(),
            name: user.full_name(),
            preferred_username: user.email.clone(),
            account_type: user.account_type.clone(),
            iat,
            exp,
        })
    }

    /// Verify signature and expiry of an access token and return its claims.
    pub fn verify_access_token(&self, token: &str) -> Result<AccessTokenClaims, jsonwebtoken::errors::Error> {
        self.verify(token).map(|data| data.claims)
    }

    /// Verify signature and expiry of an ID token and return its claims.
    pub fn verify_id_token(&self, token: &str) -> Result<IdTokenClaims, jsonwebtoken::errors::Error> {
        self.verify(token).map(|data| data.claims)
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer").field("lifetime", &self.lifetime).finish_non_exhaustive()
    }
}
