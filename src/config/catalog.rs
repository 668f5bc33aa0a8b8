//! Catalog collaborator configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Catalog service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// Base URL of the catalog service
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl CatalogConfig {
    /// Validate catalog configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.base_url.trim().is_empty() {
            return Err(ValidationError::MissingRequired("CATALOG__BASE_URL"));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidCatalogUrl);
        }
        if self.timeout_secs == 0 || self.timeout_secs > 120 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

fn default_timeout_secs() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config() {
        let config = CatalogConfig {
            base_url: "http://localhost:9000".to_string(),
            timeout_secs: 10,
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_missing_base_url() {
        let config = CatalogConfig {
            base_url: "".to_string(),
            timeout_secs: 10,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        let config = CatalogConfig {
            base_url: "ftp://store.local".to_string(),
            timeout_secs: 10,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let config = CatalogConfig {
            base_url: "http://localhost:9000".to_string(),
            timeout_secs: 0,
        };
        assert!(config.validate().is_err());
    }
}
