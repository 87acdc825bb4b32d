//! Shared application state for the Axum API server.

use std::sync::Arc;

use booking_common::config::AppConfig;
use booking_notifier::{NotificationDispatcher, ResendGuard};
use sqlx::PgPool;

/// Application state shared across all route handlers via Axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub dispatcher: NotificationDispatcher,
    /// Present only when Redis is configured
    pub resend_lock: Option<Arc<dyn ResendGuard>>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(
        pool: PgPool,
        dispatcher: NotificationDispatcher,
        resend_lock: Option<Arc<dyn ResendGuard>>,
        config: AppConfig,
    ) -> Self {
        Self {
            pool,
            dispatcher,
            resend_lock,
            config,
        }
    }
}
