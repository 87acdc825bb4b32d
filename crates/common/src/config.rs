use serde::Deserialize;

/// Global application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// PostgreSQL connection string
    pub database_url: String,

    /// Maximum number of PostgreSQL connections in the pool (default: 20)
    pub db_max_connections: u32,

    /// Redis connection string. The resend in-flight lock is only enabled when set.
    pub redis_url: Option<String>,

    /// TTL of a resend in-flight lock in seconds (default: 30)
    pub resend_lock_seconds: u64,

    /// JWT secret for API authentication
    pub jwt_secret: String,

    /// JWT token expiry in hours
    pub jwt_expiry_hours: u64,

    /// Base URL of the notification relay that fronts the push provider and SMS gateway
    pub notify_relay_url: String,

    /// Bearer token sent to the notification relay
    pub notify_relay_token: Option<String>,

    /// Relay request timeout in milliseconds (default: 10000)
    pub notify_timeout_ms: u64,

    /// Socket address the API server binds to
    pub api_bind_addr: String,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: std::env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?,
            db_max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("DB_MAX_CONNECTIONS must be a valid u32"))?,
            redis_url: std::env::var("REDIS_URL").ok().filter(|url| !url.is_empty()),
            resend_lock_seconds: std::env::var("RESEND_LOCK_SECONDS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("RESEND_LOCK_SECONDS must be a valid u64"))?,
            jwt_secret: std::env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable is required"))?,
            jwt_expiry_hours: std::env::var("JWT_EXPIRY_HOURS")
                .unwrap_or_else(|_| "24".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("JWT_EXPIRY_HOURS must be a valid u64"))?,
            notify_relay_url: std::env::var("NOTIFY_RELAY_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            notify_relay_token: std::env::var("NOTIFY_RELAY_TOKEN").ok(),
            notify_timeout_ms: std::env::var("NOTIFY_TIMEOUT_MS")
                .unwrap_or_else(|_| "10000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("NOTIFY_TIMEOUT_MS must be a valid u64"))?,
            api_bind_addr: std::env::var("API_BIND_ADDR")
                .unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
        })
    }
}
