use std::sync::Arc;

use axum::{
    routing::{get, patch, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::playground::Playground;

pub mod handlers;
pub mod types;

#[derive(Clone)]
pub struct AppState {
    pub playground: Arc<Playground>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/state", get(handlers::get_state))
        .route("/api/submit", post(handlers::submit))
        .route("/api/cancel", post(handlers::cancel))
        .route("/api/settings", patch(handlers::update_settings))
}

/// Full application: routes, CORS for a separately served frontend, state.
pub fn app(state: AppState) -> Router {
    router()
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_headers(Any)
                .allow_methods(Any),
        )
        .with_state(state)
}
