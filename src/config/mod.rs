pub mod gateway;
pub mod logging;
pub mod validation;

pub use gateway::{ GatewayConfig, RawGatewayConfig, ConfigError };

#[derive(Debug, Clone)]
pub struct Config {
    pub gateway: GatewayConfig,
}

impl Config {
    pub fn new() -> Result<Self, ConfigError> {
        Ok(Self {
            gateway: GatewayConfig::from_env()?,
        })
    }
}
