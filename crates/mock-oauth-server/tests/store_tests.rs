//! Coordinator behavior against injected code store backends.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use mock_oauth_server::error::{OAuthError, StoreError, StoreResult};
use mock_oauth_server::oauth::coordinator::{LoginRequest, TokenRequest};
use mock_oauth_server::oauth::types::ChallengeRecord;
use mock_oauth_server::oauth::{
    AuthorizationCoordinator, CodeStore, MemoryCodeStore, TokenIssuer, UserCache,
};
use mock_oauth_server::server::transport::create_router;

const CHALLENGE: &str = "XkjGR8UpEbhuwOI3U7uHd_GWLss6XU9rCDFL73pQMyo";
const VERIFIER: &str = "NCf1tth97RkR64fofrITK_W2F_43NuDEtqdVBl_pt6Y";

/// Backend that is always unreachable.
struct DownStore;

#[async_trait::async_trait]
impl CodeStore for DownStore {
    async fn set(&self, _code: &str, _record: ChallengeRecord) -> StoreResult<()> {
        Err(StoreError::unavailable("connection refused to 10.1.2.3:8000"))
    }

    async fn get(&self, _code: &str) -> StoreResult<Option<ChallengeRecord>> {
        Err(StoreError::unavailable("connection refused to 10.1.2.3:8000"))
    }

    async fn take(&self, _code: &str) -> StoreResult<Option<ChallengeRecord>> {
        Err(StoreError::unavailable("connection refused to 10.1.2.3:8000"))
    }
}

/// Memory store that counts writes.
#[derive(Default)]
struct CountingStore {
    inner: MemoryCodeStore,
    writes: AtomicUsize,
}

#[async_trait::async_trait]
impl CodeStore for CountingStore {
    async fn set(&self, code: &str, record: ChallengeRecord) -> StoreResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.set(code, record).await
    }

    async fn get(&self, code: &str) -> StoreResult<Option<ChallengeRecord>> {
        self.inner.get(code).await
    }

    async fn take(&self, code: &str) -> StoreResult<Option<ChallengeRecord>> {
        self.inner.take(code).await
    }
}

fn coordinator_with(store: Arc<dyn CodeStore>) -> AuthorizationCoordinator {
    AuthorizationCoordinator::new(
        store,
        TokenIssuer::new("secret"),
        UserCache::new(10, std::time::Duration::from_secs(60)),
    )
}

fn login_request() -> LoginRequest {
    LoginRequest {
        tenant_id: "tenant".into(),
        redirect_uri: vec!["https://cb".into()],
        state: None,
        code_challenge: Some(CHALLENGE.into()),
        code_challenge_method: Some("S256".into()),
        client_id: Some("C1".into()),
        email: Some("a@b.com".into()),
        family_name: Some("Doe".into()),
        given_name: Some("Jane".into()),
        account_type: Some("VENDOR".into()),
    }
}

#[tokio::test]
async fn test_rejected_login_writes_nothing() {
    let store = Arc::new(CountingStore::default());
    let coord = coordinator_with(store.clone());

    let mut req = login_request();
    req.email = None;
    assert!(coord.login(req).await.is_err());

    let mut req = login_request();
    req.code_challenge_method = Some("plain".into());
    assert!(coord.login(req).await.is_err());

    assert_eq!(store.writes.load(Ordering::SeqCst), 0);

    coord.login(login_request()).await.unwrap();
    assert_eq!(store.writes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_record_shape_written_at_login() {
    let store = Arc::new(CountingStore::default());
    let coord = coordinator_with(store.clone());

    let redirect = coord.login(login_request()).await.unwrap();
    let record = store.get(&redirect.code).await.unwrap().unwrap();

    assert_eq!(record.code, redirect.code);
    assert_eq!(record.tenant_id, "tenant");
    assert_eq!(record.client_id, "C1");
    assert_eq!(record.code_challenge, CHALLENGE);
    assert_eq!(record.code_challenge_method, "S256");
    assert_eq!(record.user_claims.account_type, "VENDOR");
}

#[tokio::test]
async fn test_store_failure_is_internal() {
    let coord = coordinator_with(Arc::new(DownStore));

    let err = coord.login(login_request()).await.unwrap_err();
    assert!(matches!(err, OAuthError::Store(_)));

    let err = coord
        .token(TokenRequest {
            tenant_id: "tenant".into(),
            code: Some("code".into()),
            client_id: Some("C1".into()),
            code_verifier: Some(VERIFIER.into()),
        })
        .await
        .unwrap_err();
    assert!(err.is_internal());
}

#[tokio::test]
async fn test_store_failure_maps_to_500_without_detail() {
    let app = create_router(coordinator_with(Arc::new(DownStore)), "http://localhost");

    let response = app
        .oneshot(
            Request::post("/tenant/oauth2/v2.0/token")
                .header("Content-Type", "application/x-www-form-urlencoded")
                .body(Body::from(format!("code=abc&client_id=C1&code_verifier={VERIFIER}")))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8_lossy(&body);
    assert!(!text.contains("10.1.2.3"));
    assert!(text.contains("server_error"));
}

#[tokio::test]
async fn test_concurrent_redemption_has_one_winner() {
    let coord = coordinator_with(Arc::new(MemoryCodeStore::default()));
    let redirect = coord.login(login_request()).await.unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let coord = coord.clone();
            let code = redirect.code.clone();
            tokio::spawn(async move {
                coord
                    .token(TokenRequest {
                        tenant_id: "tenant".into(),
                        code: Some(code),
                        client_id: Some("C1".into()),
                        code_verifier: Some(VERIFIER.into()),
                    })
                    .await
            })
        })
        .collect();

    let mut ok = 0;
    let mut unknown = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => ok += 1,
            Err(OAuthError::UnknownCode) => unknown += 1,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
    assert_eq!(ok, 1);
    assert_eq!(unknown, 7);
}
