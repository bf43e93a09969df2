//! API configuration

use serde::Deserialize;
use std::time::Duration;

use infra_db::DatabaseConfig;

/// API configuration
///
/// Every field has a default, so any subset can be supplied through
/// `API_`-prefixed environment variables (`API_PORT`, `API_JWT_SECRET`, ...).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// HS256 secret used to sign access tokens
    pub jwt_secret: String,
    /// Access token lifetime in seconds
    pub jwt_expiration_secs: u64,
    /// Database URL
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    /// Seconds to wait for a pooled connection
    pub db_acquire_timeout_secs: u64,
    /// Log level used when `RUST_LOG` is not set
    pub log_level: String,
    /// Emit logs as JSON lines
    pub log_json: bool,
    /// Base URL of the payment gateway payers are sent to
    pub payment_gateway_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            jwt_secret: "change-me-in-production".to_string(),
            jwt_expiration_secs: 3600,
            database_url: "postgres://localhost/invoicing".to_string(),
            db_max_connections: 10,
            db_min_connections: 2,
            db_acquire_timeout_secs: 30,
            log_level: "info".to_string(),
            log_json: false,
            payment_gateway_url: "https://payment-gateway.example.com".to_string(),
        }
    }
}

impl ApiConfig {
    /// Loads configuration from environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("API").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Pool settings derived from this configuration
    pub fn database(&self) -> DatabaseConfig {
        DatabaseConfig::new(&self.database_url)
            .max_connections(self.db_max_connections)
            .min_connections(self.db_min_connections)
            .connect_timeout(Duration::from_secs(self.db_acquire_timeout_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.server_addr(), "0.0.0.0:8080");
        assert!(!config.log_json);
    }

    #[test]
    fn test_database_config_follows_pool_settings() {
        let config = ApiConfig {
            db_max_connections: 4,
            db_min_connections: 1,
            db_acquire_timeout_secs: 5,
            ..ApiConfig::default()
        };

        let db = config.database();
        assert_eq!(db.url, "postgres://localhost/invoicing");
        assert_eq!(db.max_connections, 4);
        assert_eq!(db.min_connections, 1);
        assert_eq!(db.connect_timeout, Duration::from_secs(5));
    }
}
