use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::Response,
    Router,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use sleep_diary::{
    create_router,
    diary::{EntryRepository, MemoryEntryRepository, PgEntryRepository},
    AppState, Config,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower::ServiceExt;

pub const ENTRIES_URI: &str = "/sleep_diary/entries";

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
}

fn test_config() -> Config {
    Config {
        database_url: "postgres://unused".to_string(),
        server_address: "127.0.0.1:0".to_string(),
        database_max_connections: 5,
        database_connect_retries: 1,
        server_timeout_secs: 30,
        log_dir: "./logs".to_string(),
    }
}

fn build(repository: Arc<dyn EntryRepository>, config: Config) -> TestApp {
    let state = Arc::new(AppState::new(config, repository));
    let router = create_router(state.clone());
    TestApp { router, state }
}

/// App backed by PostgreSQL. Pools come from `#[sqlx::test]`, which applies
/// `migrations/` to a fresh database per test.
#[allow(dead_code)]
pub fn spawn_app(pool: PgPool) -> TestApp {
    build(Arc::new(PgEntryRepository::new(pool)), test_config())
}

/// App backed by the in-memory repository.
#[allow(dead_code)]
pub fn spawn_memory_app() -> TestApp {
    build(Arc::new(MemoryEntryRepository::new()), test_config())
}

/// App over a caller-supplied repository with its own request deadline.
#[allow(dead_code)]
pub fn spawn_app_with(repository: Arc<dyn EntryRepository>, server_timeout_secs: u64) -> TestApp {
    let config = Config {
        server_timeout_secs,
        ..test_config()
    };
    build(repository, config)
}

#[allow(dead_code)]
pub async fn send(router: &Router, request: Request<Body>) -> Response {
    router.clone().oneshot(request).await.unwrap()
}

#[allow(dead_code)]
pub async fn get(router: &Router, uri: &str) -> Response {
    send(
        router,
        Request::builder().uri(uri).body(Body::empty()).unwrap(),
    )
    .await
}

#[allow(dead_code)]
pub async fn send_json(router: &Router, method: &str, uri: &str, payload: &Value) -> Response {
    send(
        router,
        Request::builder()
            .method(method)
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(serde_json::to_vec(payload).unwrap()))
            .unwrap(),
    )
    .await
}

#[allow(dead_code)]
pub async fn read_json<T: DeserializeOwned>(response: Response) -> T {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Creates an entry and returns the response body, asserting `201 Created`.
#[allow(dead_code)]
pub async fn create(router: &Router, payload: &Value) -> Value {
    let response = send_json(router, "POST", ENTRIES_URI, payload).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    read_json(response).await
}
