pub mod config;
pub mod database;
pub mod diary;
pub mod error;
pub mod logging;
pub mod trace;

pub use config::Config;
pub use database::{create_pool, run_migrations};
pub use error::{AppError, AppResult};

use axum::{http::StatusCode, middleware, routing::get, Router};
use std::{sync::Arc, time::Duration};
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::diary::{DiaryService, EntryRepository};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub diary: DiaryService,
}

impl AppState {
    pub fn new(config: Config, repository: Arc<dyn EntryRepository>) -> Self {
        Self {
            config,
            diary: DiaryService::new(repository),
        }
    }
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let timeout = Duration::from_secs(state.config.server_timeout_secs);

    let diary_routes = Router::new()
        .route(
            "/sleep_diary/entries",
            get(diary::handlers::search_entries).post(diary::handlers::create_entry),
        )
        .route(
            "/sleep_diary/entries/{id}",
            get(diary::handlers::get_entry).put(diary::handlers::update_entry),
        );

    Router::new()
        .merge(diary_routes)
        .fallback(diary::handlers::not_found)
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout))
        .layer(middleware::from_fn(trace::trace_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
