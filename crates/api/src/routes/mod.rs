pub mod distance_feed;
pub mod health;
pub mod resend;

use axum::Router;

use crate::state::AppState;

/// Build the complete API router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(resend::router())
        .merge(distance_feed::router())
        .with_state(state)
}
