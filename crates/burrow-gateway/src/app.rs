use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers::{follow_handler, health_handler, redirect_handler, shorten_handler};
use crate::state::AppState;

pub struct App {}

impl App {
    /// Builds the gateway router.
    ///
    /// `/api/v1/*` serves the JSON API; any other single-segment path is
    /// treated as a short code and answered with a temporary redirect.
    pub fn router(state: AppState) -> Router {
        Router::new()
            .nest(
                "/api/v1",
                Router::new()
                    .route("/health", get(health_handler))
                    .route("/shorten", post(shorten_handler))
                    .route("/redirect", get(redirect_handler)),
            )
            .route("/{short_code}", get(follow_handler))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}
