//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment
//! variables using the `config` and `dotenvy` crates. Configuration is
//! loaded with the `PAYGATE` prefix and nested values use double
//! underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use paygate::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod catalog;
mod error;
mod forwarder;
mod providers;
mod server;

pub use catalog::CatalogConfig;
pub use error::{ConfigError, ValidationError};
pub use forwarder::{ForwarderConfig, ForwarderMode};
pub use providers::{
    AppleConfig, CoinbaseConfig, CoinsubConfig, GoogleConfig, PaypalConfig, ProvidersConfig,
    WoocommerceConfig,
};
pub use server::ServerConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Per-provider webhook configuration
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Downstream forwarder configuration
    #[serde(default)]
    pub forwarder: ForwarderConfig,

    /// Catalog collaborator configuration
    pub catalog: CatalogConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `PAYGATE` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `PAYGATE__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `PAYGATE__CATALOG__BASE_URL=...` -> `catalog.base_url = ...`
    /// - `PAYGATE__PROVIDERS__COINBASE__SHARED_SECRET=...` -> `providers.coinbase.shared_secret = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or values
    /// cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("PAYGATE")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.providers.validate()?;
        self.forwarder.validate()?;
        self.catalog.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Helper to set environment variables for testing
    /// Uses double underscores to separate nested config values
    fn set_minimal_env() {
        env::set_var("PAYGATE__CATALOG__BASE_URL", "http://localhost:9000");
        env::set_var("PAYGATE__PROVIDERS__COINBASE__SHARED_SECRET", "whsec-test");
    }

    /// Helper to clear environment variables after testing
    fn clear_env() {
        env::remove_var("PAYGATE__CATALOG__BASE_URL");
        env::remove_var("PAYGATE__PROVIDERS__COINBASE__SHARED_SECRET");
        env::remove_var("PAYGATE__SERVER__PORT");
        env::remove_var("PAYGATE__FORWARDER__MODE");
        env::remove_var("PAYGATE__FORWARDER__REST_BASE_URL");
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.catalog.base_url, "http://localhost:9000");
        assert!(config.providers.coinbase.is_some());
        assert!(config.providers.apple.is_none());
    }

    #[test]
    fn test_validate_full_config() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_ok());
        let config = result.unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_server_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.forwarder.mode, ForwarderMode::None);
    }

    #[test]
    fn test_forwarder_mode_from_env() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("PAYGATE__FORWARDER__MODE", "rest");
        env::set_var("PAYGATE__FORWARDER__REST_BASE_URL", "http://processor.local");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.forwarder.mode, ForwarderMode::Rest);
        assert!(config.validate().is_ok());
    }
}
