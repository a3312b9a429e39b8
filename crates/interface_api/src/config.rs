//! API configuration

use serde::Deserialize;

use core_kernel::{CoreError, Currency, Timezone};

/// API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Log level
    pub log_level: String,
    /// Currency assumed when a payment request omits one
    pub default_currency: String,
    /// IANA timezone used to turn the current instant into a calendar date
    pub timezone: String,
    /// Open one demo ledger at startup
    pub seed_demo_pledge: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            default_currency: "GHS".to_string(),
            timezone: "Africa/Accra".to_string(),
            seed_demo_pledge: false,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from `API_*` environment variables over the defaults
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let defaults = Self::default();

        config::Config::builder()
            .set_default("host", defaults.host)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("log_level", defaults.log_level)?
            .set_default("default_currency", defaults.default_currency)?
            .set_default("timezone", defaults.timezone)?
            .set_default("seed_demo_pledge", defaults.seed_demo_pledge)?
            .add_source(config::Environment::with_prefix("API"))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Parsed default currency
    pub fn currency(&self) -> Result<Currency, CoreError> {
        self.default_currency
            .parse()
            .map_err(|e| CoreError::configuration(format!("API_DEFAULT_CURRENCY: {}", e)))
    }

    /// Parsed timezone
    pub fn timezone(&self) -> Result<Timezone, CoreError> {
        self.timezone
            .parse()
            .map_err(|e| CoreError::configuration(format!("API_TIMEZONE: {}", e)))
    }
}
