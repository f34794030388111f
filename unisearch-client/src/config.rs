use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::Context;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Root of the remote directory service, without a trailing slash
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Rows requested per page in the full listing
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Directory exported CSV files are written to
    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_page_size() -> u32 {
    50
}

fn default_export_dir() -> PathBuf {
    PathBuf::from("exports")
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            page_size: default_page_size(),
            export_dir: default_export_dir(),
            request_timeout_secs: default_request_timeout_secs(),
            log_level: default_log_level(),
            log_dir: default_log_dir(),
        }
    }
}

impl ClientConfig {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file '{}'", path.display()))
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let mut config: ClientConfig = toml::from_str(content)?;
        config.base_url = config.base_url.trim_end_matches('/').to_string();
        if config.page_size == 0 {
            anyhow::bail!("page_size must be at least 1");
        }
        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }
}

pub static CONFIG: OnceLock<ClientConfig> = OnceLock::new();

/// Install the process-wide configuration. Only the first call takes effect.
pub fn init_config(config: ClientConfig) -> &'static ClientConfig {
    CONFIG.get_or_init(|| config)
}
