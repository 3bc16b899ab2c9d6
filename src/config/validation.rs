// Configuration validation utilities

use url::Url;

use crate::config::{ ConfigError, RawGatewayConfig };

/// Configuration validator run before the gateway accepts any traffic
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate all configuration settings
    pub fn validate_all(config: &RawGatewayConfig) -> Result<(), ConfigError> {
        Self::validate_service_url(&config.service_url)?;
        Self::validate_server_config(config)?;
        Self::validate_limits(config)?;
        Ok(())
    }

    /// The Attendance Service must be reachable over plain HTTP(S) at an absolute URL
    pub fn validate_service_url(service_url: &str) -> Result<(), ConfigError> {
        let service_url = service_url.trim();
        if service_url.is_empty() {
            return Err(ConfigError::Config("ATTENDANCE_SERVICE_URL cannot be empty".into()));
        }

        let url = Url::parse(service_url).map_err(|_| {
            ConfigError::Config("ATTENDANCE_SERVICE_URL is not a valid URL".to_string())
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(
                ConfigError::Config("ATTENDANCE_SERVICE_URL must use http or https".to_string())
            );
        }

        if url.host_str().is_none() {
            return Err(ConfigError::Config("ATTENDANCE_SERVICE_URL must include a host".into()));
        }

        if url.query().is_some() || url.fragment().is_some() {
            return Err(
                ConfigError::Config(
                    "ATTENDANCE_SERVICE_URL must not carry a query string or fragment".to_string()
                )
            );
        }

        Ok(())
    }

    pub fn validate_server_config(config: &RawGatewayConfig) -> Result<(), ConfigError> {
        if config.port == 0 {
            return Err(ConfigError::Config("GATEWAY_PORT must be greater than zero".into()));
        }

        if config.allowed_origin.trim().is_empty() {
            return Err(ConfigError::Config("ALLOWED_ORIGIN cannot be empty".into()));
        }

        if !matches!(config.environment.as_str(), "development" | "production" | "test") {
            return Err(
                ConfigError::Config(
                    "ENVIRONMENT must be one of development, production, test".to_string()
                )
            );
        }

        Ok(())
    }

    pub fn validate_limits(config: &RawGatewayConfig) -> Result<(), ConfigError> {
        if config.upstream_timeout_secs == 0 {
            return Err(ConfigError::Config("UPSTREAM_TIMEOUT_SECS must be greater than zero".into()));
        }

        if config.max_upload_bytes == 0 {
            return Err(ConfigError::Config("MAX_UPLOAD_BYTES must be greater than zero".into()));
        }

        if !(0.0..=100.0).contains(&config.defaulter_threshold) {
            return Err(ConfigError::Config("DEFAULTER_THRESHOLD must be between 0 and 100".into()));
        }

        Ok(())
    }
}
