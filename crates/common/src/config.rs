use std::path::PathBuf;

/// Global application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SQLite connection string for the durable job queue
    pub database_url: String,

    /// Path to the routing-settings JSON file (bot token + channel mapping),
    /// re-read per delivery attempt
    pub settings_path: PathBuf,

    /// Optional path to the host-provided line metadata JSON file
    pub lines_path: Option<PathBuf>,

    /// TCP port for the host-bridge ingress
    pub gateway_port: u16,

    /// Dispatch worker idle poll interval in milliseconds (default: 1000)
    pub dispatch_poll_interval_ms: u64,

    /// Maximum concurrent delivery attempts (default: 4)
    pub dispatch_concurrency: u32,

    /// Attempt ceiling before a retryable job is abandoned (default: 10)
    pub max_delivery_attempts: u32,

    /// Bot API base URL; overridable for tests
    pub telegram_api_base: String,

    /// Maximum number of SQLite connections in the pool (default: 5)
    pub db_max_connections: u32,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://linerelay.db".to_string()),
            settings_path: std::env::var("SETTINGS_PATH")
                .unwrap_or_else(|_| "settings.json".to_string())
                .into(),
            lines_path: std::env::var("LINES_PATH").ok().map(PathBuf::from),
            gateway_port: std::env::var("GATEWAY_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("GATEWAY_PORT must be a valid u16"))?,
            dispatch_poll_interval_ms: std::env::var("DISPATCH_POLL_INTERVAL_MS")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("DISPATCH_POLL_INTERVAL_MS must be a valid u64"))?,
            dispatch_concurrency: std::env::var("DISPATCH_CONCURRENCY")
                .unwrap_or_else(|_| "4".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("DISPATCH_CONCURRENCY must be a valid u32"))?,
            max_delivery_attempts: std::env::var("MAX_DELIVERY_ATTEMPTS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("MAX_DELIVERY_ATTEMPTS must be a valid u32"))?,
            telegram_api_base: std::env::var("TELEGRAM_API_BASE")
                .unwrap_or_else(|_| "https://api.telegram.org".to_string()),
            db_max_connections: std::env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("DB_MAX_CONNECTIONS must be a valid u32"))?,
        })
    }
}
