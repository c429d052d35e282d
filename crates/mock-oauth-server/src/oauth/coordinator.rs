//! The authorize → login → token state machine.
//!
//! Each transition is an independent call; the only shared state is the
//! injected [`CodeStore`]. Transitions return typed outcomes and never commit
//! partial state when they fail.

use std::sync::Arc;

use super::pkce;
use super::store::{CodeStore, MemoryCodeStore};
use super::tokens::TokenIssuer;
use super::types::{ChallengeRecord, CodeChallengeMethod, TokenResponse, UserClaims};
use super::user_cache::UserCache;
use crate::config::Config;
use crate::error::{OAuthError, OAuthResult};

/// Rendering context for the login form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizeContext {
    pub tenant_id: String,
    pub client_id: Option<String>,
    /// Incoming query re-encoded, to be forwarded to the login endpoint.
    pub query_string: String,
    /// Identities previously used for this tenant/client.
    pub identities: Vec<UserClaims>,
}

/// Raw login input as received from the boundary layer.
#[derive(Debug, Clone, Default)]
pub struct LoginRequest {
    pub tenant_id: String,
    /// Every `redirect_uri` value presented; exactly one is accepted.
    pub redirect_uri: Vec<String>,
    pub state: Option<String>,
    pub code_challenge: Option<String>,
    pub code_challenge_method: Option<String>,
    pub client_id: Option<String>,
    pub email: Option<String>,
    pub family_name: Option<String>,
    pub given_name: Option<String>,
    pub account_type: Option<String>,
}

/// Successful login: where to send the browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRedirect {
    pub location: String,
    pub code: String,
}

/// Raw token-exchange input.
#[derive(Debug, Clone, Default)]
pub struct TokenRequest {
    pub tenant_id: String,
    pub code: Option<String>,
    pub client_id: Option<String>,
    pub code_verifier: Option<String>,
}

/// Composition root of the protocol core.
#[derive(Clone)]
pub struct AuthorizationCoordinator {
    store: Arc<dyn CodeStore>,
    issuer: TokenIssuer,
    users: UserCache,
}

/// Treat absent and empty values alike.
fn required(field: &str, value: Option<String>) -> OAuthResult<String> {
    value.filter(|v| !v.is_empty()).ok_or_else(|| OAuthError::missing(field))
}

impl AuthorizationCoordinator {
    #[must_use]
    pub fn new(store: Arc<dyn CodeStore>, issuer: TokenIssuer, users: UserCache) -> Self {
        Self { store, issuer, users }
    }

    /// Build a coordinator backed by an in-memory store.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arc::new(MemoryCodeStore::new(config.code_ttl)),
            TokenIssuer::with_lifetime(&config.jwt_secret, config.token_lifetime),
            UserCache::new(config.user_cache_capacity, config.user_cache_ttl),
        )
    }

    #[must_use]
    pub const fn issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    /// Read-only: gather what the login form needs.
    pub async fn authorize(
        &self,
        tenant_id: &str,
        client_id: Option<&str>,
        query: &[(String, String)],
    ) -> AuthorizeContext {
        let query_string = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(query.iter())
            .finish();

        let identities = match client_id {
            Some(client_id) => self.users.identities(tenant_id, client_id).await,
            None => Vec::new(),
        };

        AuthorizeContext {
            tenant_id: tenant_id.to_owned(),
            client_id: client_id.map(str::to_owned),
            query_string,
            identities,
        }
    }

    /// Validate the login input, store a challenge record under a fresh code,
    /// and return the redirect to the client.
    pub async fn login(&self, req: LoginRequest) -> OAuthResult<LoginRedirect> {
        let redirect_uri = match req.redirect_uri.as_slice() {
            [single] if !single.is_empty() => single.clone(),
            [] | [_] => return Err(OAuthError::missing("redirect_uri")),
            _ => {
                return Err(OAuthError::validation(
                    "redirect_uri",
                    "must be a single value, not a list",
                ));
            }
        };

        let user_claims = UserClaims {
            email: required("email", req.email)?,
            family_name: required("family_name", req.family_name)?,
            given_name: required("given_name", req.given_name)?,
            account_type: required("account_type", req.account_type)?,
        };
        let code_challenge = required("code_challenge", req.code_challenge)?;
        let code_challenge_method = required("code_challenge_method", req.code_challenge_method)?;
        let client_id = required("client_id", req.client_id)?;

        let method = code_challenge_method.parse::<CodeChallengeMethod>()?;

        let code = uuid::Uuid::new_v4().to_string();
        let record = ChallengeRecord {
            code: code.clone(),
            tenant_id: req.tenant_id.clone(),
            client_id: client_id.clone(),
            code_challenge,
            code_challenge_method: method.as_str().to_owned(),
            user_claims,
        };
        self.store.set(&code, record.clone()).await?;

        self.users.remember(&req.tenant_id, &client_id, &record.user_claims).await;

        tracing::info!(tenant_id = %req.tenant_id, client_id = %client_id, "Issued authorization code");

        let location = append_query(&redirect_uri, &code, req.state.as_deref());
        Ok(LoginRedirect { location, code })
    }

    /// Redeem a code: consume the record, check tenant, client and PKCE, then
    /// issue tokens.
    pub async fn token(&self, req: TokenRequest) -> OAuthResult<TokenResponse> {
        let code = required("code", req.code)?;
        let client_id = required("client_id", req.client_id)?;
        let code_verifier = required("code_verifier", req.code_verifier)?;

        let Some(record) = self.store.take(&code).await? else {
            tracing::warn!(tenant_id = %req.tenant_id, client_id = %client_id, "Unknown or redeemed code");
            return Err(OAuthError::UnknownCode);
        };

        let bound = record.tenant_id == req.tenant_id && record.client_id == client_id;
        if !bound || !pkce::validate(&record, &code_verifier) {
            tracing::warn!(tenant_id = %req.tenant_id, client_id = %client_id, "Code exchange rejected");
            return Err(OAuthError::ChallengeMismatch);
        }

        let access_token = self.issuer.create_access_token(&record.user_claims)?;
        let id_token = self.issuer.create_id_token(&record.user_claims)?;

        tracing::info!(tenant_id = %record.tenant_id, client_id = %record.client_id, "Issued tokens");

        Ok(TokenResponse::bearer(access_token, id_token))
    }
}

impl std::fmt::Debug for AuthorizationCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationCoordinator").field("issuer", &self.issuer).finish_non_exhaustive()
    }
}

/// Append `code` and optional `state` to a redirect URI.
fn append_query(redirect_uri: &str, code: &str, state: Option<&str>) -> String {
    let mut params = url::form_urlencoded::Serializer::new(String::new());
    params.append_pair("code", code);
    if let Some(state) = state.filter(|s| !s.is_empty()) {
        params.append_pair("state", state);
    }

    let mut location = redirect_uri.to_owned();
    location.push(if redirect_uri.contains('?') { '&' } else { '?' });
    location.push_str(&params.finish());
    location
}
