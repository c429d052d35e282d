//! OAuth 2.0 authorization-code flow with PKCE.
//!
//! Emulates an OpenID Connect identity provider for integration testing:
//! a login form collects a simulated identity, a one-time code is bound to
//! the client's PKCE challenge, and the code plus verifier are exchanged for
//! signed access and ID tokens.
//!
//! ## Supported Standards
//! - RFC 6749: Authorization Code Grant
//! - RFC 7636: PKCE (S256 only)
//! - RFC 7519: JWT (HS256)

pub mod coordinator;
pub mod pkce;
pub mod store;
pub mod tokens;
pub mod types;
pub mod user_cache;

pub use coordinator::AuthorizationCoordinator;
pub use store::{CodeStore, MemoryCodeStore};
pub use tokens::TokenIssuer;
pub use user_cache::UserCache;
