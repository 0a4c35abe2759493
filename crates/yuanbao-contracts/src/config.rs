//! Plugin configuration.
//!
//! Loaded once from `plugins/yuanbao/config.toml` and never mutated
//! afterwards. A broken or missing file degrades to [`PluginConfig::default`]
//! so the plugin always starts.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};

pub const DEFAULT_CONFIG_PATH: &str = "plugins/yuanbao/config.toml";
pub const DEFAULT_API_URL: &str = "https://api.317ak.com/API/AI/hunyuan/hunyuanhh.php";
pub const DEFAULT_ACCOUNT_ID: &str = "67628042";
pub const DEFAULT_TRIGGERS: &[&str] = &["元宝", "元宝画"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed reading config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("missing [yuanbao] table")]
    MissingSection,

    #[error("api_url must not be empty")]
    EmptyApiUrl,

    #[error("triggers must contain at least one non-blank entry")]
    NoTriggers,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginConfig {
    pub enabled: bool,
    pub api_base_url: String,
    pub account_id: String,
    pub triggers: Vec<String>,
    pub default_style: String,
    /// When false, certificate validation is skipped for both the drawing
    /// API and the image hosts.
    pub verify_tls: bool,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_base_url: DEFAULT_API_URL.to_string(),
            account_id: DEFAULT_ACCOUNT_ID.to_string(),
            triggers: DEFAULT_TRIGGERS.iter().map(|value| value.to_string()).collect(),
            default_style: String::new(),
            verify_tls: true,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    yuanbao: Option<RawSection>,
}

#[derive(Debug, Deserialize)]
struct RawSection {
    enable: bool,
    api_url: String,
    qq: AccountId,
    triggers: Vec<String>,
    #[serde(default)]
    default_style: String,
    #[serde(default = "default_verify_tls")]
    verify_tls: bool,
}

/// `qq` is commonly written as a bare number in hand-edited files.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AccountId {
    Text(String),
    Number(i64),
}

impl AccountId {
    fn into_string(self) -> String {
        match self {
            AccountId::Text(value) => value.trim().to_string(),
            AccountId::Number(value) => value.to_string(),
        }
    }
}

fn default_verify_tls() -> bool {
    true
}

impl PluginConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(raw)?;
        let section = file.yuanbao.ok_or(ConfigError::MissingSection)?;

        let api_base_url = section.api_url.trim().to_string();
        if api_base_url.is_empty() {
            return Err(ConfigError::EmptyApiUrl);
        }
        // Blank triggers would prefix-match every message.
        let triggers: Vec<String> = section
            .triggers
            .into_iter()
            .filter(|trigger| !trigger.trim().is_empty())
            .collect();
        if triggers.is_empty() {
            return Err(ConfigError::NoTriggers);
        }

        Ok(Self {
            enabled: section.enable,
            api_base_url,
            account_id: section.qq.into_string(),
            triggers,
            default_style: section.default_style.trim().to_string(),
            verify_tls: section.verify_tls,
        })
    }

    pub fn try_load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Loads the config, falling back to defaults on any failure.
    pub fn load(path: &Path) -> Self {
        match Self::try_load(path) {
            Ok(config) => {
                info!(
                    path = %path.display(),
                    enabled = config.enabled,
                    triggers = ?config.triggers,
                    "plugin config loaded"
                );
                config
            }
            Err(err) => {
                error!(path = %path.display(), error = %err, "config load failed, using defaults");
                Self::default()
            }
        }
    }
}
