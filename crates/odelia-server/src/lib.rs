//! odelia-server: records the valentine decision, serves response stats and
//! forwards notifications for decisions and date plans.

pub mod config;
pub mod error;
pub mod notify;
pub mod records;
pub mod routes;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use odelia_engine::Clock;

pub use config::Config;
pub use error::{ConfigError, ServerError};
pub use notify::{DisabledNotifier, Notifier, WebhookNotifier};
pub use records::{ResponseStore, SqliteResponseStore, StoreError};

/// State shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// `None` when recording is disabled or the database could not be opened.
    pub store: Option<Arc<dyn ResponseStore>>,
    pub notifier: Arc<dyn Notifier>,
    pub clock: Arc<dyn Clock>,
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/response",
            post(routes::submit_response).fallback(routes::response_method_not_allowed),
        )
        .route(
            "/api/date-selection",
            post(routes::submit_date_selection)
                .fallback(routes::date_selection_method_not_allowed),
        )
        .route("/api/stats", get(routes::stats))
        .with_state(state)
}
