use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub host: String,
    pub port: u16,
    /// Seconds after creation during which a customer may cancel their own order.
    pub cancel_window_secs: i64,
    pub low_stock_threshold: i32,
    pub rate_limit_max: u32,
    pub rate_limit_window_secs: u64,
    pub auth_rate_limit_max: u32,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET is not set"))?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        Ok(Self {
            database_url,
            jwt_secret,
            host,
            port: parse_or("APP_PORT", 3000),
            cancel_window_secs: parse_or("ORDER_CANCEL_WINDOW_SECS", 300),
            low_stock_threshold: parse_or("LOW_STOCK_THRESHOLD", 5),
            rate_limit_max: parse_or("RATE_LIMIT_MAX", 100),
            rate_limit_window_secs: parse_or("RATE_LIMIT_WINDOW_SECS", 900),
            auth_rate_limit_max: parse_or("AUTH_RATE_LIMIT_MAX", 10),
        })
    }

    /// Configuration used by tests and tools that only need a database.
    pub fn for_database(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            jwt_secret: "test-secret".to_string(),
            host: "127.0.0.1".to_string(),
            port: 3000,
            cancel_window_secs: 300,
            low_stock_threshold: 5,
            rate_limit_max: 100,
            rate_limit_window_secs: 900,
            auth_rate_limit_max: 10,
        }
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.parse::<T>().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "invalid value, using default");
            default
        }),
        Err(_) => default,
    }
}
