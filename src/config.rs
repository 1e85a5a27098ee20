use anyhow::Result;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration_days: i64,
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub client_base_url: String,
    /// Hours a parent-initiated withdrawal stays cancellable before the
    /// reconciler may complete it.
    pub withdrawal_cooloff_hours: i64,
    pub reconciler_interval_secs: u64,
    pub transfer_expiry_days: i64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();
        Self::from_env_only()
    }

    /// Read configuration from the process environment without touching
    /// .env files; used by tests that control the environment directly.
    pub fn from_env_only() -> Result<Self> {
        Ok(Config {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://@localhost:5432/rosterhub".to_string()),
            jwt_secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| "rosterhub-dev-secret-change-in-production".to_string()),
            jwt_expiration_days: parse_env("JWT_EXPIRATION_DAYS", 30),
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_env("PORT", 8080),
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            client_base_url: env::var("BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            withdrawal_cooloff_hours: parse_env("WITHDRAWAL_COOLOFF_HOURS", 24),
            reconciler_interval_secs: parse_env("RECONCILER_INTERVAL_SECS", 3600),
            transfer_expiry_days: parse_env("TRANSFER_EXPIRY_DAYS", 7),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_env<T: std::str::FromStr + Copy>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
