//! OAuth 2.0 endpoint handlers.
//!
//! Translates HTTP requests into coordinator calls and coordinator outcomes
//! into wire responses:
//! - `GET  /{tenant}/oauth2/v2.0/authorize`: login form
//! - `POST /{tenant}/oauth2/v2.0/login`: issue code, redirect
//! - `POST /{tenant}/oauth2/v2.0/token`: exchange code + verifier for tokens
//! - `GET  /{tenant}/v2.0/.well-known/openid-configuration`: discovery

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Path, RawQuery, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::login;
use super::transport::HttpState;
use crate::error::{OAuthError, OAuthResult};
use crate::oauth::coordinator::{LoginRequest, TokenRequest};
use crate::oauth::types::{TOKEN_SCOPE, TokenResponse};

impl IntoResponse for OAuthError {
    fn into_response(self) -> Response {
        if self.is_internal() {
            tracing::error!(error = %self, "Internal failure while handling OAuth request");
        }

        (
            self.status_code(),
            Json(serde_json::json!({
                "error": self.kind(),
                "message": self.to_user_message()
            })),
        )
            .into_response()
    }
}

// ─── Query & Body Parsing ────────────────────────────────────────────────────

fn query_pairs(raw: Option<&str>) -> Vec<(String, String)> {
    raw.map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}

/// First value of `key`, if any.
fn first(pairs: &[(String, String)], key: &str) -> Option<String> {
    pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
}

/// Decode a JSON or form-urlencoded body. An empty body yields the default.
fn parse_body<T: DeserializeOwned + Default>(headers: &HeaderMap, body: &Bytes) -> OAuthResult<T> {
    if body.is_empty() {
        return Ok(T::default());
    }

    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"));

    if is_json {
        serde_json::from_slice(body).map_err(|e| OAuthError::validation("body", e.to_string()))
    } else {
        serde_urlencoded::from_bytes(body).map_err(|e| OAuthError::validation("body", e.to_string()))
    }
}

// ─── Pages ───────────────────────────────────────────────────────────────────

/// `GET /`
pub async fn handle_home() -> Html<String> {
    Html(login::render_home_page())
}

/// `GET /health`
pub async fn handle_health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "mock-oauth-server",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

// ─── Authorization Endpoint ──────────────────────────────────────────────────

/// `GET /{tenant_id}/oauth2/v2.0/authorize`
///
/// Renders the login form. The query string is forwarded to the login
/// endpoint untouched.
pub async fn handle_authorize(
    State(state): State<Arc<HttpState>>,
    Path(tenant_id): Path<String>,
    RawQuery(raw): RawQuery,
) -> Html<String> {
    let pairs = query_pairs(raw.as_deref());
    let client_id = first(&pairs, "client_id");

    let ctx = state.coordinator.authorize(&tenant_id, client_id.as_deref(), &pairs).await;
    Html(login::render_login_page(&ctx))
}

// ─── Login Endpoint ──────────────────────────────────────────────────────────

/// Identity fields posted by the login form.
#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    pub email: Option<String>,
    pub family_name: Option<String>,
    pub given_name: Option<String>,
    #[serde(alias = "tp_acct_typ")]
    pub account_type: Option<String>,
}

/// `POST /{tenant_id}/oauth2/v2.0/login`
///
/// PKCE, client and redirect parameters arrive in the query string; the
/// identity arrives in the body.
pub async fn handle_login(
    State(state): State<Arc<HttpState>>,
    Path(tenant_id): Path<String>,
    RawQuery(raw): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let pairs = query_pairs(raw.as_deref());

    if pairs.iter().any(|(k, _)| k.starts_with("redirect_uri[")) {
        return OAuthError::validation("redirect_uri", "must be a single value, not a list")
            .into_response();
    }

    let form: LoginForm = match parse_body(&headers, &body) {
        Ok(form) => form,
        Err(e) => return e.into_response(),
    };

    let req = LoginRequest {
        tenant_id,
        redirect_uri: pairs
            .iter()
            .filter(|(k, _)| k == "redirect_uri")
            .map(|(_, v)| v.clone())
            .collect(),
        state: first(&pairs, "state"),
        code_challenge: first(&pairs, "code_challenge"),
        code_challenge_method: first(&pairs, "code_challenge_method"),
        client_id: first(&pairs, "client_id"),
        email: form.email,
        family_name: form.family_name,
        given_name: form.given_name,
        account_type: form.account_type,
    };

    match state.coordinator.login(req).await {
        Ok(redirect) => (StatusCode::FOUND, [(header::LOCATION, redirect.location)]).into_response(),
        Err(e) => {
            tracing::debug!(error = %e, "Login rejected");
            e.into_response()
        }
    }
}

// ─── Token Endpoint ──────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct TokenForm {
    pub grant_type: Option<String>,
    pub code: Option<String>,
    pub client_id: Option<String>,
    pub code_verifier: Option<String>,
}

/// `POST /{tenant_id}/oauth2/v2.0/token`
///
/// Exchange an authorization code and PKCE verifier for tokens.
pub async fn handle_token(
    State(state): State<Arc<HttpState>>,
    Path(tenant_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let form: TokenForm = match parse_body(&headers, &body) {
        Ok(form) => form,
        Err(e) => return e.into_response(),
    };

    if form.grant_type.as_deref().is_some_and(|g| g != "authorization_code") {
        return OAuthError::validation("grant_type", "unsupported grant_type").into_response();
    }

    let req = TokenRequest {
        tenant_id,
        code: form.code,
        client_id: form.client_id,
        code_verifier: form.code_verifier,
    };

    match state.coordinator.token(req).await {
        Ok(tokens) => token_success(&tokens),
        Err(e) => e.into_response(),
    }
}

/// Build a token response with required OAuth 2.0 cache headers (RFC 6749 §5.1).
fn token_success(tokens: &TokenResponse) -> Response {
    let mut response = Json(tokens).into_response();

    let headers = response.headers_mut();
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    response
}

// ─── Discovery ───────────────────────────────────────────────────────────────

/// `GET /{tenant_id}/v2.0/.well-known/openid-configuration`
pub async fn handle_openid_configuration(
    State(state): State<Arc<HttpState>>,
    Path(tenant_id): Path<String>,
) -> impl IntoResponse {
    let base = format!("{}/{}", state.base_url, tenant_id);
    Json(serde_json::json!({
        "issuer": format!("{base}/v2.0"),
        "authorization_endpoint": format!("{base}/oauth2/v2.0/authorize"),
        "token_endpoint": format!("{base}/oauth2/v2.0/token"),
        "response_types_supported": ["code"],
        "grant_types_supported": ["authorization_code"],
        "code_challenge_methods_supported": ["S256"],
        "id_token_signing_alg_values_supported": ["HS256"],
        "token_endpoint_auth_methods_supported": ["none"],
        "scopes_supported": TOKEN_SCOPE.split(' ').collect::<Vec<_>>()
    }))
}
