use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    ReadError(String),

    #[error("Failed to write configuration: {0}")]
    WriteError(String),

    #[error("Invalid configuration format: {0}")]
    InvalidFormat(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppConfig {
    pub bind_address: String,
    pub port: u16,
    pub cache_ttl_seconds: u64,
    pub cache_capacity: u64,
    /// Share of the billed amount kept by the platform, 0.10 = 10%.
    pub platform_fee_rate: f64,
    pub currency: String,
    pub default_project_type: String,
    /// When set, only the owner may close or permanently delete a project.
    pub enforce_close_ownership: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 5000,
            cache_ttl_seconds: 300, // 5 minutes
            cache_capacity: 10_000,
            platform_fee_rate: 0.10,
            currency: "PKR".to_string(),
            default_project_type: "Full Stack Project".to_string(),
            enforce_close_ownership: false,
        }
    }
}

impl AppConfig {
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

#[async_trait]
pub trait ConfigStore: Send + Sync {
    async fn load_config(&self) -> ConfigResult<AppConfig>;
    async fn save_config(&self, config: &AppConfig) -> ConfigResult<()>;
}
