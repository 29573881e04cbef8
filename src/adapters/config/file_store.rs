use crate::ports::{AppConfig, ConfigError, ConfigResult, ConfigStore};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use tokio::fs;

const PORT_VAR: &str = "BIDBOARD_PORT";
const BIND_VAR: &str = "BIDBOARD_BIND";

/// On-disk shape. Every key is optional; absent keys keep their defaults.
#[derive(Debug, Default, Serialize, Deserialize)]
struct ConfigFile {
    bind_address: Option<String>,
    port: Option<u16>,
    cache_ttl_seconds: Option<u64>,
    cache_capacity: Option<u64>,
    platform_fee_rate: Option<f64>,
    currency: Option<String>,
    default_project_type: Option<String>,
    enforce_close_ownership: Option<bool>,
}

impl ConfigFile {
    fn into_config(self) -> AppConfig {
        let defaults = AppConfig::default();
        AppConfig {
            bind_address: self.bind_address.unwrap_or(defaults.bind_address),
            port: self.port.unwrap_or(defaults.port),
            cache_ttl_seconds: self.cache_ttl_seconds.unwrap_or(defaults.cache_ttl_seconds),
            cache_capacity: self.cache_capacity.unwrap_or(defaults.cache_capacity),
            platform_fee_rate: self.platform_fee_rate.unwrap_or(defaults.platform_fee_rate),
            currency: self.currency.unwrap_or(defaults.currency),
            default_project_type: self
                .default_project_type
                .unwrap_or(defaults.default_project_type),
            enforce_close_ownership: self
                .enforce_close_ownership
                .unwrap_or(defaults.enforce_close_ownership),
        }
    }

    fn from_config(config: &AppConfig) -> Self {
        Self {
            bind_address: Some(config.bind_address.clone()),
            port: Some(config.port),
            cache_ttl_seconds: Some(config.cache_ttl_seconds),
            cache_capacity: Some(config.cache_capacity),
            platform_fee_rate: Some(config.platform_fee_rate),
            currency: Some(config.currency.clone()),
            default_project_type: Some(config.default_project_type.clone()),
            enforce_close_ownership: Some(config.enforce_close_ownership),
        }
    }
}

pub struct FileConfigStore {
    config_path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> ConfigResult<Self> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            ConfigError::ReadError("Cannot determine config directory".to_string())
        })?;

        Ok(Self::with_path(config_dir.join("bidboard").join("config.json")))
    }

    pub fn with_path(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.config_path
    }

    async fn ensure_config_dir(&self) -> ConfigResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ConfigError::WriteError(e.to_string()))?;
        }
        Ok(())
    }
}

/// Overlays environment variables onto `config`. Unparsable values are
/// logged and ignored.
pub fn apply_env<F>(config: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(bind) = lookup(BIND_VAR) {
        config.bind_address = bind;
    }
    if let Some(port) = lookup(PORT_VAR) {
        match u16::from_str(port.trim()) {
            Ok(port) => config.port = port,
            Err(e) => tracing::warn!("Invalid {PORT_VAR} value {port:?}: {e}"),
        }
    }
}

#[async_trait]
impl ConfigStore for FileConfigStore {
    async fn load_config(&self) -> ConfigResult<AppConfig> {
        let mut config = match fs::read_to_string(&self.config_path).await {
            Ok(content) => serde_json::from_str::<ConfigFile>(&content)
                .map_err(|e| ConfigError::InvalidFormat(e.to_string()))?
                .into_config(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(
                    "No config file at {}, using defaults",
                    self.config_path.display()
                );
                AppConfig::default()
            }
            Err(e) => return Err(ConfigError::ReadError(e.to_string())),
        };

        apply_env(&mut config, |key| std::env::var(key).ok());
        Ok(config)
    }

    async fn save_config(&self, config: &AppConfig) -> ConfigResult<()> {
        self.ensure_config_dir().await?;

        let content = serde_json::to_string_pretty(&ConfigFile::from_config(config))
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;

        fs::write(&self.config_path, content)
            .await
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;

        Ok(())
    }
}
