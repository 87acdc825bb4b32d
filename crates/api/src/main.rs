//! Booking API server binary entrypoint.

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use booking_common::config::AppConfig;
use booking_common::db::create_pool;
use booking_common::redis_pool::create_redis_pool;
use booking_engine::jobs::PgJobRepository;
use booking_engine::resend_lock::ResendLock;
use booking_notifier::{NotificationDispatcher, ResendGuard};
use booking_notifier::relay::{HttpRelayTransport, RelayConfig};

use booking_api::routes::create_router;
use booking_api::state::AppState;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(
            "booking_api=debug,booking_engine=debug,booking_notifier=debug,tower_http=debug",
        )
    });

    if std::env::var("LOG_FORMAT").is_ok_and(|format| format == "json") {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    tracing::info!("Starting booking API server...");

    // Load configuration
    let config = AppConfig::from_env()?;

    // Create database connection pool
    let pool = create_pool(&config.database_url, config.db_max_connections).await?;

    // Resend collaborators
    let lookup = Arc::new(PgJobRepository::new(pool.clone()));
    let transport = Arc::new(HttpRelayTransport::new(RelayConfig::from_app_config(
        &config,
    ))?);
    let dispatcher = NotificationDispatcher::new(lookup, transport);
    tracing::info!(relay = %config.notify_relay_url, "Notification relay configured");

    let resend_lock = match &config.redis_url {
        Some(url) => {
            let redis = create_redis_pool(url).await?;
            tracing::info!(ttl_seconds = config.resend_lock_seconds, "Resend lock enabled");
            let lock: Arc<dyn ResendGuard> =
                Arc::new(ResendLock::new(redis, config.resend_lock_seconds));
            Some(lock)
        }
        None => {
            tracing::info!("REDIS_URL not set, resend lock disabled");
            None
        }
    };

    let addr: SocketAddr = config
        .api_bind_addr
        .parse()
        .map_err(|_| anyhow::anyhow!("API_BIND_ADDR must be a socket address"))?;

    // Build application state
    let state = AppState::new(pool, dispatcher, resend_lock, config);

    // Build router
    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    tracing::info!("API server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("Received shutdown signal, stopping gracefully...");
        })
        .await?;

    tracing::info!("Booking API server stopped.");
    Ok(())
}
