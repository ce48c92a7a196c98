//! Configuration: store location, admin checks, reveal tuning.
//!
//! Read from `~/.config/jaunt/config.toml` unless `--config` points
//! elsewhere. Every field has a default and a missing file means
//! defaults, so a fresh install works with no config at all.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::auth::AdminSource;
use crate::models::constants::{
    DEFAULT_BANNER_SECS, DEFAULT_SETTLE_MS, DEFAULT_SPIN_TICKS, DEFAULT_TICK_MS,
    DEFAULT_WATCH_POLL_MS,
};
use crate::reveal::{RevealParams, RevealRule};

/// Environment variable naming the store root, between `--store` and
/// the config file in precedence.
pub const STORE_ENV_VAR: &str = "JAUNT_STORE";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub store: StoreConfig,
    pub auth: AuthConfig,
    pub reveal: RevealConfig,
    pub watch: WatchConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Store root used when neither `--store` nor JAUNT_STORE is set.
    pub root: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub source: AdminSource,
    /// Allow-list consulted when `source = "config"`.
    pub admins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    pub rule: RevealRule,
    pub spin_ticks: u32,
    pub tick_ms: u64,
    pub settle_ms: u64,
    pub banner_secs: u64,
}

impl Default for RevealConfig {
    fn default() -> Self {
        RevealConfig {
            rule: RevealRule::default(),
            spin_ticks: DEFAULT_SPIN_TICKS,
            tick_ms: DEFAULT_TICK_MS,
            settle_ms: DEFAULT_SETTLE_MS,
            banner_secs: DEFAULT_BANNER_SECS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub poll_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        WatchConfig {
            poll_ms: DEFAULT_WATCH_POLL_MS,
        }
    }
}

impl Config {
    /// Loads config from `explicit` or the default location. A missing
    /// default file is fine; a missing explicit one is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => {
                if !path.exists() {
                    bail!("config file not found: {}", path.display());
                }
                path.to_path_buf()
            }
            None => match default_config_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(Config::default()),
            },
        };

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Store root resolution: the `--store` flag wins, then
    /// `JAUNT_STORE`, then the config file, then the platform data
    /// directory.
    pub fn resolve_store_root(&self, flag: Option<PathBuf>) -> PathBuf {
        if let Some(root) = flag {
            return root;
        }
        if let Ok(env_root) = std::env::var(STORE_ENV_VAR) {
            if !env_root.is_empty() {
                return PathBuf::from(env_root);
            }
        }
        if let Some(root) = &self.store.root {
            return root.clone();
        }
        default_store_root()
    }

    /// Machine parameters derived from the raw millisecond knobs.
    pub fn reveal_params(&self) -> RevealParams {
        let tick = self.reveal.tick_ms.max(1);
        RevealParams {
            rule: self.reveal.rule,
            spin_ticks: self.reveal.spin_ticks.max(1),
            settle_ticks: self.reveal.settle_ms.div_ceil(tick).max(1) as u32,
            banner: Duration::from_secs(self.reveal.banner_secs.max(1)),
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.reveal.tick_ms.max(1))
    }

    pub fn watch_poll(&self) -> Duration {
        Duration::from_millis(self.watch.poll_ms.max(1))
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("jaunt").join("config.toml"))
}

pub fn default_store_root() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("jaunt").join("store"))
        .unwrap_or_else(|| PathBuf::from(".jaunt-store"))
}
