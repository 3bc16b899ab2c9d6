use std::{ env, net::{ IpAddr, SocketAddr }, time::Duration };

use thiserror::Error;
use tracing::info;
use url::Url;

use crate::config::validation::ConfigValidator;

pub const DEFAULT_SERVICE_URL: &str = "http://127.0.0.1:5000";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 9002;
const DEFAULT_ENVIRONMENT: &str = "development";
const DEFAULT_ALLOWED_ORIGIN: &str = "http://127.0.0.1:9002";
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
pub const DEFAULT_DEFAULTER_THRESHOLD: f64 = 75.0;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable not found: {0}")] MissingEnv(#[from] env::VarError),

    #[error("Configuration error: {0}")] Config(String),

    #[error("Invalid value for {key}: {value}")] InvalidValue {
        key: &'static str,
        value: String,
    },
}

/*
Raw values straight from the environment. Kept separate from GatewayConfig so
validation can report on the strings the operator actually typed before any of
them are turned into URLs and socket addresses.
*/
#[derive(Debug, Clone)]
pub struct RawGatewayConfig {
    pub service_url: String,
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub allowed_origin: String,
    pub upstream_timeout_secs: u64,
    pub max_upload_bytes: usize,
    pub defaulter_threshold: f64,
}

impl Default for RawGatewayConfig {
    fn default() -> Self {
        Self {
            service_url: DEFAULT_SERVICE_URL.to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            environment: DEFAULT_ENVIRONMENT.to_string(),
            allowed_origin: DEFAULT_ALLOWED_ORIGIN.to_string(),
            upstream_timeout_secs: DEFAULT_UPSTREAM_TIMEOUT_SECS,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            defaulter_threshold: DEFAULT_DEFAULTER_THRESHOLD,
        }
    }
}

impl RawGatewayConfig {
    /// Read every setting from the environment, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        // FLASK_BACKEND_URL is the name older deployments used.
        let service_url = env::var("ATTENDANCE_SERVICE_URL")
            .or_else(|_| env::var("FLASK_BACKEND_URL"))
            .unwrap_or_else(|_| {
                info!("ATTENDANCE_SERVICE_URL not set, using default: {}", DEFAULT_SERVICE_URL);
                defaults.service_url.clone()
            });

        Ok(Self {
            service_url,
            host: env::var("GATEWAY_HOST").unwrap_or(defaults.host),
            port: parse_var("GATEWAY_PORT", defaults.port)?,
            environment: env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            allowed_origin: env::var("ALLOWED_ORIGIN").unwrap_or(defaults.allowed_origin),
            upstream_timeout_secs: parse_var("UPSTREAM_TIMEOUT_SECS", defaults.upstream_timeout_secs)?,
            max_upload_bytes: parse_var("MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
            defaulter_threshold: parse_var("DEFAULTER_THRESHOLD", defaults.defaulter_threshold)?,
        })
    }
}

fn parse_var<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) =>
            value.trim().parse().map_err(|_| ConfigError::InvalidValue { key, value }),
        Err(_) => Ok(default),
    }
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub service_url: Url,
    pub bind_addr: SocketAddr,
    pub environment: String,
    pub allowed_origin: String,
    pub upstream_timeout: Duration,
    pub max_upload_bytes: usize,
    pub defaulter_threshold: f64,
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_raw(RawGatewayConfig::from_env()?)
    }

    /// Build from a RawGatewayConfig after running every validation rule.
    pub fn from_raw(raw: RawGatewayConfig) -> Result<Self, ConfigError> {
        ConfigValidator::validate_all(&raw)?;

        let service_url = Url::parse(raw.service_url.trim()).map_err(|_| {
            ConfigError::Config("ATTENDANCE_SERVICE_URL is not a valid URL".to_string())
        })?;
        let host: IpAddr = raw.host.parse().map_err(|_| ConfigError::InvalidValue {
            key: "GATEWAY_HOST",
            value: raw.host.clone(),
        })?;

        Ok(Self {
            service_url,
            bind_addr: SocketAddr::new(host, raw.port),
            environment: raw.environment,
            allowed_origin: raw.allowed_origin,
            upstream_timeout: Duration::from_secs(raw.upstream_timeout_secs),
            max_upload_bytes: raw.max_upload_bytes,
            defaulter_threshold: raw.defaulter_threshold,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Configuration pointing at an arbitrary service, used by tests and tools.
    pub fn for_service(service_url: Url) -> Self {
        let raw = RawGatewayConfig::default();
        Self {
            service_url,
            bind_addr: SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 0),
            environment: raw.environment,
            allowed_origin: raw.allowed_origin,
            upstream_timeout: Duration::from_secs(5),
            max_upload_bytes: raw.max_upload_bytes,
            defaulter_threshold: raw.defaulter_threshold,
        }
    }
}
