//! Configuration management for the ringroute CLI.

use anyhow::{Context, Result};
use ringroute::RingConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the config file searched for in the current and parent directories.
pub const CONFIG_FILE: &str = "ringroute.toml";

/// ringroute project configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ring: RingConfig,
    #[serde(default)]
    pub cluster: ClusterConfig,
    #[serde(default)]
    pub demo: DemoConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    #[serde(default = "default_nodes")]
    pub nodes: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoConfig {
    #[serde(default = "default_keys")]
    pub keys: Vec<String>,
    #[serde(default = "default_join")]
    pub join: String,
    #[serde(default = "default_leave")]
    pub leave: String,
}

fn default_nodes() -> Vec<String> {
    vec!["node1".to_string(), "node2".to_string()]
}
fn default_keys() -> Vec<String> {
    (1..=4).map(|i| format!("key{}", i)).collect()
}
fn default_join() -> String { "node3".to_string() }
fn default_leave() -> String { "node2".to_string() }

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            nodes: default_nodes(),
        }
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            keys: default_keys(),
            join: default_join(),
            leave: default_leave(),
        }
    }
}

impl Config {
    /// Load config from `path`, or from ringroute.toml in the current or
    /// parent directories. Falls back to defaults when no file is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match find_config_file() {
                Some(path) => Self::from_file(&path),
                None => Ok(Config::default()),
            },
        }
    }

    /// Read and parse a config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        config
            .ring
            .validate()
            .with_context(|| format!("Invalid [ring] section in {}", path.display()))?;
        Ok(config)
    }

    /// Save config to the specified path.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }
}

/// Find ringroute.toml in current or parent directories.
fn find_config_file() -> Option<PathBuf> {
    let mut dir = std::env::current_dir().ok()?;
    loop {
        let config_path = dir.join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }
        if !dir.pop() {
            break;
        }
    }
    None
}
