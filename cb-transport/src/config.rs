use crate::error::ConfigError;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;

/// Source of environment variables consulted when explicit settings are absent.
pub trait Environment: Send + Sync {
    fn var(&self, key: &str) -> Option<String>;
}

/// Reads the live process environment on every lookup.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// A fixed set of variables, independent of the process environment.
#[derive(Debug, Clone, Default)]
pub struct EnvSnapshot {
    vars: HashMap<String, String>,
}

impl EnvSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }
}

impl Environment for EnvSnapshot {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

/// Explicit per-bridge settings, typically a `[bridges.<name>]` table.
#[derive(Clone, Default, Deserialize)]
pub struct BridgeSettings {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
}

impl fmt::Debug for BridgeSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeSettings")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Where a bridge's settings may come from, used for lookups and error text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeSources {
    /// Dotted config path of the bridge table, e.g. `bridges.local`.
    pub config_prefix: &'static str,
    pub base_url_env: &'static str,
    pub api_key_env: &'static str,
}

#[derive(Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    base_url: String,
    api_key: String,
}

impl BridgeConfig {
    /// Explicit settings win over the environment; values are trimmed and
    /// trailing slashes are stripped from the base url.
    pub fn resolve(
        settings: &BridgeSettings,
        sources: &BridgeSources,
        env: &dyn Environment,
    ) -> Result<Self, ConfigError> {
        let base_url = pick(settings.base_url.as_deref(), env, sources.base_url_env)
            .map(|value| value.trim_end_matches('/').to_string())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| ConfigError::Missing {
                field: "base_url",
                config_key: format!("{}.base_url", sources.config_prefix),
                env_var: sources.base_url_env,
            })?;
        let api_key =
            pick(settings.api_key.as_deref(), env, sources.api_key_env).ok_or_else(|| {
                ConfigError::Missing {
                    field: "api_key",
                    config_key: format!("{}.api_key", sources.config_prefix),
                    env_var: sources.api_key_env,
                }
            })?;
        Ok(Self { base_url, api_key })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

impl fmt::Debug for BridgeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

fn pick(explicit: Option<&str>, env: &dyn Environment, env_key: &str) -> Option<String> {
    explicit
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned)
        .or_else(|| {
            env.var(env_key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        })
}
