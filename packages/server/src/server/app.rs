//! Application setup and server configuration.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::Extension,
    http::StatusCode,
    routing::{get, post},
    Router,
};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::domains::annotation::Stage;
use crate::kernel::ServerDeps;
use crate::server::routes::{
    actions_webhook, flashcards_webhook, health_handler, summary_webhook,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub server_deps: Arc<ServerDeps>,
}

/// Build the Axum application router
///
/// `request_timeout` bounds the summary run, including article fetch
/// retries, best-of-N and the handoff acknowledgment. Handoff stages answer
/// `202` at once and run outside it.
pub fn build_app(server_deps: ServerDeps, request_timeout: Duration) -> Router {
    let app_state = AppState {
        server_deps: Arc::new(server_deps),
    };

    Router::new()
        .route(Stage::Summary.path(), post(summary_webhook))
        .route(Stage::Actions.path(), post(actions_webhook))
        .route(Stage::Flashcards.path(), post(flashcards_webhook))
        .route("/health", get(health_handler))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(Extension(app_state))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(TraceLayer::new_for_http())
}
