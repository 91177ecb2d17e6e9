use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tool configuration, loadable from a TOML file. Everything has a
/// default so a config file is never required.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VelocityConfig {
    pub targets: TargetsConfig,
}

/// Expected event counts per month, used for the projection-vs-target
/// percentage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetsConfig {
    pub releases: f64,
    pub pull_requests: f64,
}

impl Default for TargetsConfig {
    fn default() -> Self {
        TargetsConfig {
            releases: 2.0,
            pull_requests: 3.0,
        }
    }
}

impl VelocityConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config = toml::from_str(&raw)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        Ok(config)
    }
}
