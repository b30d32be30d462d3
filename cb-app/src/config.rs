//! Companion bridge configuration loader.
//!
//! Only explicit settings live here. Environment fallbacks are applied by the
//! tools on every call, not at load time.

use cb_tools::BridgeToolOptions;
use cb_transport::{BridgeSettings, DEFAULT_REQUEST_TIMEOUT};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompanionConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub bridges: BridgesConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT.as_secs()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BridgesConfig {
    #[serde(default)]
    pub local: BridgeEntry,
    #[serde(default)]
    pub drive: BridgeEntry,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BridgeEntry {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(flatten)]
    pub settings: BridgeSettings,
}

impl Default for BridgeEntry {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            settings: BridgeSettings::default(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

impl BridgeEntry {
    fn enabled_settings(&self) -> Option<BridgeSettings> {
        self.enabled.then(|| self.settings.clone())
    }
}

impl CompanionConfig {
    /// Loads `path`, or the default path when `None`. A missing default file
    /// yields the default config; a missing explicit file is an error.
    pub async fn load(path: Option<PathBuf>) -> anyhow::Result<Self> {
        let explicit = path.is_some();
        let path = path.unwrap_or_else(default_config_path);
        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(e) if !explicit && e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file; using environment only");
                return Ok(Self::default());
            }
            Err(e) => return Err(anyhow::anyhow!("read config {}: {e}", path.display())),
        };

        let cfg: CompanionConfig = toml::from_str(&contents)
            .map_err(|e| anyhow::anyhow!("parse config {}: {e}", path.display()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.general.request_timeout_secs == 0 {
            return Err(anyhow::anyhow!("general.request_timeout_secs must be > 0"));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.general.request_timeout_secs)
    }

    pub fn tool_options(&self) -> BridgeToolOptions {
        BridgeToolOptions {
            local: self.bridges.local.enabled_settings(),
            drive: self.bridges.drive.enabled_settings(),
        }
    }
}

pub fn default_config_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    Path::new(&home).join(".companion-bridge").join("config.toml")
}
