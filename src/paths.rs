//! Centralized path resolution for sai
//!
//! # Environment Variables
//!
//! - `SAI_CONFIG_DIR` - Override config directory
//! - `SAI_DATA_DIR` - Override data directory (default home of saidata and providers)
//!
//! # Path Resolution Priority
//!
//! For config_dir():
//! 1. `SAI_CONFIG_DIR` environment variable
//! 2. `XDG_CONFIG_HOME/sai` (if set)
//! 3. Platform default:
//!    - Windows: `%APPDATA%\sai`
//!    - macOS/Linux: `~/.config/sai`
//!
//! For data_dir():
//! 1. `SAI_DATA_DIR` environment variable
//! 2. `XDG_DATA_HOME/sai` (if set)
//! 3. Platform default:
//!    - Windows: `%LOCALAPPDATA%\sai`
//!    - macOS/Linux: `~/.local/share/sai`

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Environment variable for config directory override
pub const ENV_CONFIG_DIR: &str = "SAI_CONFIG_DIR";

/// Environment variable for data directory override
pub const ENV_DATA_DIR: &str = "SAI_DATA_DIR";

/// Name of the config file inside the config directory
pub const CONFIG_FILE: &str = "config.toml";

/// Get the sai config directory path
pub fn config_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = expand(&dir);
        log::debug!(
            "Using config dir from {}: {}",
            ENV_CONFIG_DIR,
            path.display()
        );
        return Ok(path);
    }

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        let path = PathBuf::from(xdg_config).join("sai");
        log::debug!("Using XDG_CONFIG_HOME: {}", path.display());
        return Ok(path);
    }

    #[cfg(windows)]
    {
        if let Some(app_data) = dirs::config_dir() {
            let path = app_data.join("sai");
            log::debug!("Using Windows config dir: {}", path.display());
            return Ok(path);
        }
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    let path = home.join(".config").join("sai");
    log::debug!("Using default config dir: {}", path.display());
    Ok(path)
}

/// Path of the config file
pub fn config_file() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE))
}

/// Get the sai data directory path
pub fn data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_DATA_DIR) {
        let path = expand(&dir);
        log::debug!("Using data dir from {}: {}", ENV_DATA_DIR, path.display());
        return Ok(path);
    }

    if let Ok(xdg_data) = std::env::var("XDG_DATA_HOME") {
        let path = PathBuf::from(xdg_data).join("sai");
        log::debug!("Using XDG_DATA_HOME: {}", path.display());
        return Ok(path);
    }

    #[cfg(windows)]
    {
        if let Some(local_app_data) = dirs::data_local_dir() {
            let path = local_app_data.join("sai");
            log::debug!("Using Windows data dir: {}", path.display());
            return Ok(path);
        }
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    let path = home.join(".local").join("share").join("sai");
    log::debug!("Using default data dir: {}", path.display());
    Ok(path)
}

/// Default saidata repository location
pub fn default_saidata_dir() -> Result<PathBuf> {
    Ok(data_dir()?.join("saidata"))
}

/// Default provider directory location
pub fn default_provider_dir() -> Result<PathBuf> {
    Ok(data_dir()?.join("providers"))
}

/// Expand ~ and environment variables in a path string.
///
/// Unknown variables are left as-is.
pub fn expand(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path).unwrap_or(std::borrow::Cow::Borrowed(path));
    PathBuf::from(expanded.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    /// Run `f` with `key` temporarily set.
    ///
    /// # Safety
    /// Uses unsafe env::set_var/remove_var; only call from tests that do not
    /// read the same variable concurrently.
    fn with_env_var<F, R>(key: &str, value: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let original = env::var(key).ok();
        // SAFETY: each test uses its own variable or restores it before returning
        unsafe { env::set_var(key, value) };
        let result = f();
        match original {
            // SAFETY: see above
            Some(v) => unsafe { env::set_var(key, v) },
            None => unsafe { env::remove_var(key) },
        }
        result
    }

    /// Run `f` with `key` temporarily removed.
    fn without_env_var<F, R>(key: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let original = env::var(key).ok();
        // SAFETY: see with_env_var
        unsafe { env::remove_var(key) };
        let result = f();
        if let Some(v) = original {
            // SAFETY: see with_env_var
            unsafe { env::set_var(key, v) };
        }
        result
    }

    // Env overrides are process-wide; each variable is exercised by a single test
    #[test]
    fn test_config_dir_env_override() {
        with_env_var(ENV_CONFIG_DIR, "/custom/sai/config", || {
            assert_eq!(config_dir().unwrap(), PathBuf::from("/custom/sai/config"));
            assert_eq!(
                config_file().unwrap(),
                PathBuf::from("/custom/sai/config/config.toml")
            );
        });

        let home = dirs::home_dir().unwrap();
        with_env_var(ENV_CONFIG_DIR, "~/dotfiles/sai-tilde-test", || {
            assert_eq!(
                config_dir().unwrap(),
                home.join("dotfiles").join("sai-tilde-test")
            );
        });
    }

    #[test]
    fn test_data_dir_resolution() {
        with_env_var(ENV_DATA_DIR, "/srv/sai", || {
            assert_eq!(
                default_saidata_dir().unwrap(),
                PathBuf::from("/srv/sai/saidata")
            );
            assert_eq!(
                default_provider_dir().unwrap(),
                PathBuf::from("/srv/sai/providers")
            );
        });

        without_env_var(ENV_DATA_DIR, || {
            with_env_var("XDG_DATA_HOME", "/tmp/xdg-data-test", || {
                assert_eq!(data_dir().unwrap(), PathBuf::from("/tmp/xdg-data-test/sai"));
            });
        });
    }

    #[test]
    fn test_expand_with_tilde() {
        let home = dirs::home_dir().unwrap();
        assert_eq!(expand("~/test/path"), home.join("test").join("path"));
    }

    #[test]
    fn test_expand_unknown_env_var_unchanged() {
        assert_eq!(
            expand("/path/$NONEXISTENT_SAI_VAR_12345/file"),
            PathBuf::from("/path/$NONEXISTENT_SAI_VAR_12345/file")
        );
    }
}
