//! Code store: maps a single-use authorization code to its challenge record.
//!
//! The [`CodeStore`] trait is the only view the coordinator has of persistence.
//! [`MemoryCodeStore`] is the in-process backend used by the binary and tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use super::types::ChallengeRecord;
use crate::error::StoreResult;

/// Default code lifetime: 10 minutes.
pub const DEFAULT_CODE_TTL: Duration = Duration::from_secs(600);

/// Key-value persistence for challenge records.
///
/// No locking is implied across calls. Redemption must go through
/// [`CodeStore::take`], which implementations make atomic.
#[async_trait::async_trait]
pub trait CodeStore: Send + Sync {
    /// Store `record` under `code`, silently replacing any previous value.
    async fn set(&self, code: &str, record: ChallengeRecord) -> StoreResult<()>;

    /// Read a record without consuming it.
    async fn get(&self, code: &str) -> StoreResult<Option<ChallengeRecord>>;

    /// Remove and return a record in one step.
    async fn take(&self, code: &str) -> StoreResult<Option<ChallengeRecord>>;

    /// Whether a live record exists for `code`.
    async fn has(&self, code: &str) -> StoreResult<bool> {
        Ok(self.get(code).await?.is_some())
    }
}

struct StoredRecord {
    record: ChallengeRecord,
    created_at: Instant,
}

impl StoredRecord {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() >= ttl
    }
}

/// In-memory code store with lazy expiry.
///
/// Expired entries are invisible to readers and are purged on the next write.
#[derive(Clone)]
pub struct MemoryCodeStore {
    records: Arc<RwLock<HashMap<String, StoredRecord>>>,
    ttl: Duration,
}

impl MemoryCodeStore {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self { records: Arc::new(RwLock::new(HashMap::new())), ttl }
    }

    /// Number of entries currently held, expired or not.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

impl Default for MemoryCodeStore {
    fn default() -> Self {
        Self::new(DEFAULT_CODE_TTL)
    }
}

impl std::fmt::Debug for MemoryCodeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCodeStore").field("ttl", &self.ttl).finish()
    }
}

#[async_trait::async_trait]
impl CodeStore for MemoryCodeStore {
    async fn set(&self, code: &str, record: ChallengeRecord) -> StoreResult<()> {
        let ttl = self.ttl;
        let mut records = self.records.write().await;

        let before = records.len();
        records.retain(|_, stored| !stored.is_expired(ttl));
        let removed = before - records.len();
        if removed > 0 {
            tracing::debug!(count = removed, "Purged expired authorization codes");
        }

        records.insert(code.to_owned(), StoredRecord { record, created_at: Instant::now() });
        Ok(())
    }

    async fn get(&self, code: &str) -> StoreResult<Option<ChallengeRecord>> {
        let records = self.records.read().await;
        Ok(records
            .get(code)
            .filter(|stored| !stored.is_expired(self.ttl))
            .map(|stored| stored.record.clone()))
    }

    async fn take(&self, code: &str) -> StoreResult<Option<ChallengeRecord>> {
        let stored = self.records.write().await.remove(code);
        Ok(stored.filter(|s| !s.is_expired(self.ttl)).map(|s| s.record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oauth::types::UserClaims;

    fn record(code: &str) -> ChallengeRecord {
        ChallengeRecord {
            code: code.into(),
            tenant_id: "tenant".into(),
            client_id: "client1".into(),
            code_challenge: "challenge".into(),
            code_challenge_method: "S256".into(),
            user_claims: UserClaims {
                email: "a@b.com".into(),
                family_name: "Doe".into(),
                given_name: "Jane".into(),
                account_type: "VENDOR".into(),
            },
        }
    }

    #[tokio::test]
    async fn test_set_get_has() {
        let store = MemoryCodeStore::default();
        store.set("c1", record("c1")).await.unwrap();

        assert!(store.has("c1").await.unwrap());
        assert!(!store.has("c2").await.unwrap());
        assert_eq!(store.get("c1").await.unwrap().unwrap().client_id, "client1");

        // get does not consume
        assert!(store.get("c1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_set_overwrites() {
        let store = MemoryCodeStore::default();
        store.set("c1", record("c1")).await.unwrap();

        let mut replacement = record("c1");
        replacement.client_id = "client2".into();
        store.set("c1", replacement).await.unwrap();

        assert_eq!(store.get("c1").await.unwrap().unwrap().client_id, "client2");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_take_is_one_time() {
        let store = MemoryCodeStore::default();
        store.set("c1", record("c1")).await.unwrap();

        let first = store.take("c1").await.unwrap();
        assert_eq!(first.unwrap().code, "c1");

        assert!(store.take("c1").await.unwrap().is_none());
        assert!(!store.has("c1").await.unwrap());
    }

    #[tokio::test]
    async fn test_concurrent_take_yields_single_winner() {
        let store = MemoryCodeStore::default();
        store.set("c1", record("c1")).await.unwrap();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.take("c1").await.unwrap().is_some() })
            })
            .collect();

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn test_expired_records_are_absent_and_purged() {
        let store = MemoryCodeStore::new(Duration::ZERO);
        store.set("old", record("old")).await.unwrap();

        assert!(store.get("old").await.unwrap().is_none());
        assert!(store.take("old").await.unwrap().is_none());

        store.set("a", record("a")).await.unwrap();
        store.set("b", record("b")).await.unwrap();
        // Writing "b" purged the already-expired "a".
        assert_eq!(store.len().await, 1);
    }
}
