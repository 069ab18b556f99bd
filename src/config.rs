use crate::paths;
use anyhow::{Context, Result};
use providers::DegradationPolicy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

fn default_port_timeout() -> u64 {
    5
}

/// Contents of `config.toml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Saidata repository root
    #[serde(default)]
    pub saidata_dir: Option<String>,

    /// Directory of provider documents
    #[serde(default)]
    pub provider_dir: Option<String>,

    /// Seconds to wait for a port check
    #[serde(default = "default_port_timeout")]
    pub port_timeout_secs: u64,

    /// Provider tried first when it supports the action
    #[serde(default)]
    pub default_provider: Option<String>,

    /// Degradation policies keyed by action
    #[serde(default)]
    pub policies: BTreeMap<String, DegradationPolicy>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            saidata_dir: None,
            provider_dir: None,
            port_timeout_secs: default_port_timeout(),
            default_provider: None,
            policies: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Load config.toml from the config directory, or defaults when absent
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_file()?)
    }

    /// Load a config file, or defaults when absent
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Invalid config in {}", path.display()))
    }

    /// Effective saidata root: flag, then config, then data dir default
    pub fn saidata_root(&self, flag: Option<&Path>) -> Result<PathBuf> {
        match (flag, &self.saidata_dir) {
            (Some(dir), _) => Ok(dir.to_path_buf()),
            (None, Some(dir)) => Ok(paths::expand(dir)),
            (None, None) => paths::default_saidata_dir(),
        }
    }

    /// Effective provider directory: flag, then config, then data dir default
    pub fn provider_root(&self, flag: Option<&Path>) -> Result<PathBuf> {
        match (flag, &self.provider_dir) {
            (Some(dir), _) => Ok(dir.to_path_buf()),
            (None, Some(dir)) => Ok(paths::expand(dir)),
            (None, None) => paths::default_provider_dir(),
        }
    }

    /// Port check timeout
    pub fn port_timeout(&self) -> Duration {
        Duration::from_secs(self.port_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let config = Config::load_from(&temp.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.port_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_load_with_policies() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            r#"
saidata_dir = "/srv/saidata"
port_timeout_secs = 2
default_provider = "apt"

[policies.install]
fallback_providers = ["brew", "snap"]
use_defaults = false

[policies.start]
max_failures = 1
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.saidata_dir.as_deref(), Some("/srv/saidata"));
        assert_eq!(config.port_timeout(), Duration::from_secs(2));
        assert_eq!(config.default_provider.as_deref(), Some("apt"));

        let install = &config.policies["install"];
        assert_eq!(install.fallback_providers, vec!["brew", "snap"]);
        assert!(!install.use_defaults);
        assert!(install.allow_partial);
        assert_eq!(install.max_failures, 3);
        assert_eq!(config.policies["start"].max_failures, 1);
    }

    #[test]
    fn test_invalid_toml_names_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "port_timeout_secs = \"soon\"").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains("config.toml"));
    }

    #[test]
    fn test_flag_beats_config() {
        let config = Config {
            saidata_dir: Some("/from/config".to_string()),
            ..Config::default()
        };
        assert_eq!(
            config.saidata_root(Some(Path::new("/from/flag"))).unwrap(),
            PathBuf::from("/from/flag")
        );
        assert_eq!(
            config.saidata_root(None).unwrap(),
            PathBuf::from("/from/config")
        );
    }
}
