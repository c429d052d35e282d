//! Recently used identities, offered on the login page for quick resubmission.
//!
//! Cosmetic only: nothing here takes part in code redemption.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

use super::types::UserClaims;

/// Identities remembered per tenant/client pair.
const MAX_IDENTITIES_PER_KEY: usize = 20;

#[derive(Clone)]
pub struct UserCache {
    cache: Cache<(String, String), Arc<Vec<UserClaims>>>,
}

impl UserCache {
    #[must_use]
    pub fn new(max_keys: u64, ttl: Duration) -> Self {
        let cache = Cache::builder().max_capacity(max_keys).time_to_live(ttl).build();
        Self { cache }
    }

    fn key(tenant_id: &str, client_id: &str) -> (String, String) {
        (tenant_id.to_owned(), client_id.to_owned())
    }

    /// Identities seen for this tenant/client, oldest first.
    pub async fn identities(&self, tenant_id: &str, client_id: &str) -> Vec<UserClaims> {
        self.cache
            .get(&Self::key(tenant_id, client_id))
            .await
            .map(|list| list.as_ref().clone())
            .unwrap_or_default()
    }

    /// Remember `user`, unless an identity with the same email is already listed.
    ///
    /// The read-modify-write runs under the entry's lock, so concurrent logins
    /// for one tenant/client never drop each other's identities.
    pub async fn remember(&self, tenant_id: &str, client_id: &str, user: &UserClaims) {
        let user = user.clone();
        self.cache
            .entry(Self::key(tenant_id, client_id))
            .and_upsert_with(|current| {
                let mut list = current.map(|e| e.into_value().as_ref().clone()).unwrap_or_default();
                if !list.iter().any(|existing| existing.email == user.email) {
                    if list.len() >= MAX_IDENTITIES_PER_KEY {
                        list.remove(0);
                    }
                    list.push(user);
                }
                std::future::ready(Arc::new(list))
            })
            .await;
    }
}

impl std::fmt::Debug for UserCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserCache").field("entries", &self.cache.entry_count()).finish()
    }
}
