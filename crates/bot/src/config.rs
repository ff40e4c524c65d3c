//! Application configuration loaded from environment variables.

/// Bot configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `DATABASE_URL` — PostgreSQL connection string; when unset the bot runs
///   against a seeded in-memory store
/// - `STOREBOT_PAGE_SIZE` — catalog items per page (default: `5`)
/// - `STOREBOT_CURRENCY` — ISO-4217 currency code (default: `"USD"`)
/// - `STOREBOT_MANUAL_SETTLEMENT` — enables the manual settlement control
///   (default: off)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub page_size: u64,
    pub currency: String,
    pub manual_settlement: bool,
    pub log_level: String,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").ok(),
            page_size: std::env::var("STOREBOT_PAGE_SIZE")
                .ok()
                .and_then(|p| p.parse().ok())
                .filter(|&p| p > 0)
                .unwrap_or(5),
            currency: std::env::var("STOREBOT_CURRENCY").unwrap_or_else(|_| "USD".to_string()),
            manual_settlement: std::env::var("STOREBOT_MANUAL_SETTLEMENT")
                .map(|v| matches!(v.as_str(), "1" | "true" | "yes" | "on"))
                .unwrap_or(false),
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            page_size: 5,
            currency: "USD".to_string(),
            manual_settlement: false,
            log_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.page_size, 5);
        assert_eq!(config.currency, "USD");
        assert!(!config.manual_settlement);
        assert!(config.database_url.is_none());
    }
}
