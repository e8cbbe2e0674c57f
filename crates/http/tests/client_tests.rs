//! Integration tests for the Ovoz HTTP client

use ovoz_core::storage::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use ovoz_core::testing::{RecordingNavigator, Redirect};
use ovoz_core::{KeyValueStore, LoginCredentials, MemoryStore, RegisterData, TokenPair};
use ovoz_http::{ApiClient, ClientError, RequestAttempt};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn user_body(balance: i64) -> Value {
    json!({
        "id": 1,
        "email": "aziza@example.uz",
        "full_name": "Aziza Karimova",
        "is_active": true,
        "is_verified": true,
        "balance": balance,
        "oauth_provider": null,
        "created_at": "2024-05-01T08:00:00Z"
    })
}

fn tokens_body(access: &str, refresh: &str) -> Value {
    json!({ "access_token": access, "refresh_token": refresh, "token_type": "bearer" })
}

struct Harness {
    client: ApiClient,
    store: Arc<MemoryStore>,
    navigator: Arc<RecordingNavigator>,
}

fn harness(server: &MockServer, entries: &[(&str, &str)]) -> Harness {
    let store = Arc::new(MemoryStore::with_entries(entries.iter().copied()));
    let navigator = Arc::new(RecordingNavigator::new(store.clone()));
    let client = ApiClient::builder()
        .base_url(server.uri())
        .storage(store.clone())
        .navigator(navigator.clone())
        .build()
        .unwrap();
    Harness {
        client,
        store,
        navigator,
    }
}

fn signed_in() -> [(&'static str, &'static str); 2] {
    [(ACCESS_TOKEN_KEY, "access-old"), (REFRESH_TOKEN_KEY, "refresh-old")]
}

#[tokio::test]
async fn test_client_builder() {
    let client = ApiClient::builder()
        .base_url("http://localhost:8000/")
        .storage(Arc::new(MemoryStore::new()))
        .build()
        .unwrap();
    assert_eq!(client.base_url(), "http://localhost:8000/api/v1");

    let client = ApiClient::builder()
        .base_url("http://localhost:8000/api/v1")
        .storage(Arc::new(MemoryStore::new()))
        .build()
        .unwrap();
    assert_eq!(client.base_url(), "http://localhost:8000/api/v1");
}

#[tokio::test]
async fn test_client_builder_requires_base_url_and_storage() {
    let result = ApiClient::builder()
        .storage(Arc::new(MemoryStore::new()))
        .build();
    assert!(matches!(result, Err(ClientError::Configuration(_))));

    let result = ApiClient::builder().base_url("http://localhost:8000").build();
    assert!(matches!(result, Err(ClientError::Configuration(_))));
}

#[tokio::test]
async fn test_bearer_token_is_attached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/auth/me"))
        .and(header("authorization", "Bearer access-old"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_body(5000)))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server, &signed_in());
    let user = h.client.current_user().await.unwrap();
    assert_eq!(user.email, "aziza@example.uz");
    assert_eq!(user.balance, Decimal::new(5000, 0));
}

#[tokio::test]
async fn test_no_bearer_without_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/auth/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_body(0)))
        .mount(&server)
        .await;

    let h = harness(&server, &[]);
    h.client.current_user().await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].headers.contains_key("authorization"));
}

#[tokio::test]
async fn test_401_refreshes_and_replays_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/auth/me"))
        .and(header("authorization", "Bearer access-old"))
        .respond_with(ResponseTemplate::new(401).set_body_string("token expired"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .and(body_json(json!({ "refresh_token": "refresh-old" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(tokens_body("access-new", "refresh-new")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/auth/me"))
        .and(header("authorization", "Bearer access-new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_body(100)))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server, &signed_in());
    let seen: Arc<Mutex<Vec<Option<TokenPair>>>> = Arc::default();
    {
        let seen = seen.clone();
        h.client.on_tokens_changed(Arc::new(move |tokens: Option<&TokenPair>| {
            seen.lock().unwrap().push(tokens.cloned());
        }));
    }

    let user = h.client.current_user().await.unwrap();
    assert_eq!(user.balance, Decimal::new(100, 0));

    assert_eq!(h.store.get(ACCESS_TOKEN_KEY).as_deref(), Some("access-new"));
    assert_eq!(h.store.get(REFRESH_TOKEN_KEY).as_deref(), Some("refresh-new"));
    assert_eq!(
        *seen.lock().unwrap(),
        vec![Some(TokenPair::new("access-new", "refresh-new"))]
    );
    assert!(h.navigator.redirects().is_empty());
}

#[tokio::test]
async fn test_replayed_request_is_not_retried_again() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/auth/me"))
        .respond_with(ResponseTemplate::new(401).set_body_string("nope"))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tokens_body("access-new", "refresh-new")))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server, &signed_in());
    let result = h.client.current_user().await;
    assert!(matches!(result, Err(ClientError::AuthenticationFailed(_))));

    // The refresh itself succeeded, so the session is kept.
    assert_eq!(h.store.get(ACCESS_TOKEN_KEY).as_deref(), Some("access-new"));
    assert!(h.navigator.redirects().is_empty());
}

#[tokio::test]
async fn test_failed_refresh_clears_tokens_before_redirect() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/auth/me"))
        .respond_with(ResponseTemplate::new(401).set_body_string("token expired"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(ResponseTemplate::new(401).set_body_string("refresh revoked"))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server, &signed_in());
    let cleared = Arc::new(Mutex::new(false));
    {
        let cleared = cleared.clone();
        h.client.on_tokens_changed(Arc::new(move |tokens: Option<&TokenPair>| {
            *cleared.lock().unwrap() = tokens.is_none();
        }));
    }

    let result = h.client.current_user().await;

    // The caller sees the original failure, not the refresh failure.
    match result {
        Err(ClientError::AuthenticationFailed(message)) => assert_eq!(message, "token expired"),
        other => panic!("expected original 401, got {other:?}"),
    }
    assert!(!h.store.contains(ACCESS_TOKEN_KEY));
    assert!(!h.store.contains(REFRESH_TOKEN_KEY));
    assert!(*cleared.lock().unwrap());
    assert_eq!(
        h.navigator.redirects(),
        vec![Redirect {
            path: "/login".to_string(),
            tokens_present: false,
        }]
    );
}

#[tokio::test]
async fn test_401_without_refresh_token_passes_through() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/auth/me"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tokens_body("a", "r")))
        .expect(0)
        .mount(&server)
        .await;

    let h = harness(&server, &[(ACCESS_TOKEN_KEY, "access-old")]);
    let result = h.client.current_user().await;
    assert!(matches!(result, Err(ClientError::AuthenticationFailed(_))));
    assert_eq!(h.store.get(ACCESS_TOKEN_KEY).as_deref(), Some("access-old"));
    assert!(h.navigator.redirects().is_empty());

    // A stored token is not attached to the credentials exchange
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].headers.contains_key("authorization"));
}

#[tokio::test]
async fn test_other_errors_pass_through() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/usage/stats"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tokens_body("a", "r")))
        .expect(0)
        .mount(&server)
        .await;

    let h = harness(&server, &signed_in());
    let result: Result<Value, _> = h.client.send(RequestAttempt::get("/usage/stats")).await;
    match result {
        Err(ClientError::ServerError { status, message }) => {
            assert_eq!(status, 503);
            assert_eq!(message, "maintenance");
        }
        other => panic!("expected server error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_login_failure_never_refreshes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Incorrect email or password"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tokens_body("a", "r")))
        .expect(0)
        .mount(&server)
        .await;

    let h = harness(&server, &signed_in());
    let credentials = LoginCredentials {
        email: "aziza@example.uz".into(),
        password: "wrong".into(),
    };
    let result = h.client.login(&credentials).await;
    assert!(matches!(result, Err(ClientError::AuthenticationFailed(_))));
    assert_eq!(h.store.get(ACCESS_TOKEN_KEY).as_deref(), Some("access-old"));
    assert!(h.navigator.redirects().is_empty());

    // A stored token is not attached to the credentials exchange
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].headers.contains_key("authorization"));
}

#[tokio::test]
async fn test_register_sends_body_without_missing_name() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/register"))
        .and(body_json(json!({ "email": "new@example.uz", "password": "pw123456" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(tokens_body("a1", "r1")))
        .expect(1)
        .mount(&server)
        .await;

    let h = harness(&server, &signed_in());
    let tokens = h
        .client
        .register(&RegisterData {
            email: "new@example.uz".into(),
            password: "pw123456".into(),
            full_name: None,
        })
        .await
        .unwrap();
    assert_eq!(tokens, TokenPair::new("a1", "r1"));

    let requests = server.received_requests().await.unwrap();
    assert!(!requests[0].headers.contains_key("authorization"));
}

#[tokio::test]
async fn test_concurrent_401s_refresh_independently() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/auth/me"))
        .and(header("authorization", "Bearer access-old"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tokens_body("access-new", "refresh-new")))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/auth/me"))
        .and(header("authorization", "Bearer access-new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_body(1)))
        .expect(2)
        .mount(&server)
        .await;

    let h = harness(&server, &signed_in());
    let (a, b) = futures::join!(h.client.current_user(), h.client.current_user());
    assert!(a.is_ok());
    assert!(b.is_ok());
}
