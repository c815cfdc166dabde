use anyhow::{bail, Context};
use devicemon_shared::DeviceId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_CONFIG_PATH: &str = "config/server.json";

pub const CONFIG_PATH_ENV: &str = "DEVICEMON_CONFIG";
pub const BIND_ENV: &str = "DEVICEMON_BIND";
pub const TICK_ENV: &str = "DEVICEMON_TICK_MS";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Period between reading bursts, per connected client.
    pub tick_ms: u64,
    /// Devices emitted on every tick, in this order.
    pub devices: Vec<DeviceId>,
    /// Fixed seed for every session's generator; random when absent.
    pub seed: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            tick_ms: 1500,
            devices: DeviceId::defaults(),
            seed: None,
        }
    }
}

impl ServerConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.tick_ms == 0 {
            bail!("tick_ms must be greater than zero");
        }
        if self.devices.is_empty() {
            bail!("at least one device must be configured");
        }
        let mut seen = HashSet::new();
        for id in &self.devices {
            if !seen.insert(id) {
                bail!("device {id} is configured more than once");
            }
        }
        Ok(())
    }

    /// `lookup` resolves an environment variable name, `None` when unset.
    fn apply_env_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<()> {
        if let Some(bind) = lookup(BIND_ENV) {
            self.bind_addr = bind;
        }
        if let Some(raw) = lookup(TICK_ENV) {
            self.tick_ms = raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("{TICK_ENV}={raw:?} is not a number of milliseconds"))?;
        }
        Ok(())
    }
}

fn config_path(lookup: impl Fn(&str) -> Option<String>) -> PathBuf {
    match lookup(CONFIG_PATH_ENV) {
        Some(path) => PathBuf::from(path),
        None => PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(DEFAULT_CONFIG_PATH),
    }
}

/// Parse a config file. A missing file is not an error: defaults apply.
pub fn load_config_from(path: &Path) -> anyhow::Result<ServerConfig> {
    if !path.exists() {
        return Ok(ServerConfig::default());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {path:?}"))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid config JSON in {path:?}"))
}

fn load_config_with(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<ServerConfig> {
    let path = config_path(&lookup);
    let mut config = load_config_from(&path)?;
    config.apply_env_overrides(&lookup)?;
    config.validate()?;
    Ok(config)
}

pub fn load_config() -> anyhow::Result<ServerConfig> {
    load_config_with(|name| std::env::var(name).ok())
}
