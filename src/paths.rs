//! Centralized path resolution for stanza
//!
//! # Environment Variables
//!
//! - `STANZA_CONFIG_DIR` - Override config directory
//! - `STANZA_MANIFEST` - Override manifest file
//!
//! # Path Resolution Priority
//!
//! For config_dir():
//! 1. `STANZA_CONFIG_DIR` environment variable
//! 2. `XDG_CONFIG_HOME/stanza` (if set)
//! 3. Platform default:
//!    - Windows: `%APPDATA%\stanza`
//!    - Unix: `~/.config/stanza`
//!
//! For manifest_path():
//! 1. `--manifest` flag
//! 2. `STANZA_MANIFEST` environment variable
//! 3. `<config_dir>/manifest.toml`

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Environment variable for config directory override
pub const ENV_CONFIG_DIR: &str = "STANZA_CONFIG_DIR";

/// Environment variable for manifest file override
pub const ENV_MANIFEST: &str = "STANZA_MANIFEST";

/// Default manifest file name inside the config directory
pub const MANIFEST_FILE: &str = "manifest.toml";

/// Get the stanza config directory path
pub fn config_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(ENV_CONFIG_DIR) {
        let path = expand(&dir);
        log::debug!("Using config dir from {ENV_CONFIG_DIR}: {}", path.display());
        return Ok(path);
    }

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        let path = PathBuf::from(xdg_config).join("stanza");
        log::debug!("Using XDG_CONFIG_HOME: {}", path.display());
        return Ok(path);
    }

    #[cfg(windows)]
    {
        if let Some(app_data) = dirs::config_dir() {
            let path = app_data.join("stanza");
            log::debug!("Using Windows config dir: {}", path.display());
            return Ok(path);
        }
    }

    let home = dirs::home_dir().context("Could not determine home directory")?;
    let path = home.join(".config").join("stanza");
    log::debug!("Using default config dir: {}", path.display());
    Ok(path)
}

/// Get the manifest path
pub fn manifest_path(flag: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = flag {
        return Ok(expand(&path.to_string_lossy()));
    }

    if let Ok(path) = std::env::var(ENV_MANIFEST) {
        let path = expand(&path);
        log::debug!("Using manifest from {ENV_MANIFEST}: {}", path.display());
        return Ok(path);
    }

    Ok(config_dir()?.join(MANIFEST_FILE))
}

/// Resolve a settings path against the configuration directory
///
/// `~` and environment variables are expanded; relative paths are taken
/// relative to `conf_dir`.
pub fn resolve(path: &str, conf_dir: &Path) -> PathBuf {
    let expanded = expand(path);
    if expanded.is_absolute() {
        expanded
    } else {
        conf_dir.join(expanded)
    }
}

/// Expand ~ and environment variables in a path string.
pub fn expand(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path).unwrap_or(std::borrow::Cow::Borrowed(path));
    PathBuf::from(expanded.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    /// Helper to run a test with temporary env var
    ///
    /// # Safety
    /// This function uses unsafe env::set_var/remove_var which can cause issues
    /// if other threads read environment variables concurrently.
    fn with_env_var<F, R>(key: &str, value: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let original = env::var(key).ok();
        // SAFETY: Each test uses its own variable or value
        unsafe { env::set_var(key, value) };
        let result = f();
        match original {
            // SAFETY: Tests run in isolation
            Some(v) => unsafe { env::set_var(key, v) },
            None => unsafe { env::remove_var(key) },
        }
        result
    }

    #[test]
    fn test_config_dir_env_override() {
        with_env_var(ENV_CONFIG_DIR, "/custom/stanza", || {
            assert_eq!(config_dir().unwrap(), PathBuf::from("/custom/stanza"));
        });
    }

    #[test]
    fn test_manifest_flag_wins() {
        let path = manifest_path(Some(Path::new("/etc/stanza/site.toml"))).unwrap();
        assert_eq!(path, PathBuf::from("/etc/stanza/site.toml"));
    }

    #[test]
    fn test_manifest_env_override() {
        with_env_var(ENV_MANIFEST, "/srv/stanza.toml", || {
            assert_eq!(manifest_path(None).unwrap(), PathBuf::from("/srv/stanza.toml"));
        });
    }

    #[test]
    fn test_resolve_relative_against_conf_dir() {
        let conf = Path::new("/opt/splunk/etc/system/local");
        assert_eq!(
            resolve("outputs.conf", conf),
            PathBuf::from("/opt/splunk/etc/system/local/outputs.conf")
        );
        assert_eq!(
            resolve("/opt/splunk/etc/apps/x/local/inputs.conf", conf),
            PathBuf::from("/opt/splunk/etc/apps/x/local/inputs.conf")
        );
    }

    #[test]
    fn test_expand_with_tilde() {
        let home = dirs::home_dir().unwrap();
        assert_eq!(expand("~/conf"), home.join("conf"));
    }

    #[test]
    fn test_expand_unknown_env_var_unchanged() {
        let result = expand("/path/$NONEXISTENT_STANZA_VAR/file");
        assert_eq!(result, PathBuf::from("/path/$NONEXISTENT_STANZA_VAR/file"));
    }
}
