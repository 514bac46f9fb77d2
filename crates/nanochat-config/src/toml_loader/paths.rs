//! Config path resolution and default file creation.

use nanochat_common::ConfigError;
use std::path::{Path, PathBuf};
use tracing::info;

use super::template::default_config_toml;

/// Environment variable that points at a config file, overriding the
/// platform default location.
pub const CONFIG_PATH_ENV: &str = "NANOCHAT_CONFIG";

/// Resolve the config file path: `$NANOCHAT_CONFIG` when set and non-empty,
/// else `<platform config dir>/nanochat/config.toml`.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    resolve_config_path(std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from))
}

fn resolve_config_path(env_override: Option<PathBuf>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = env_override.filter(|p| !p.as_os_str().is_empty()) {
        return Ok(path);
    }
    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::ParseError("could not determine config directory".into()))?;
    Ok(config_dir.join("nanochat").join("config.toml"))
}

/// Create a default TOML config file with documentation comments.
pub fn create_default_config(path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            ConfigError::ParseError(format!(
                "failed to create config directory {}: {e}",
                parent.display()
            ))
        })?;
    }

    std::fs::write(path, default_config_toml()).map_err(|e| {
        ConfigError::ParseError(format!(
            "failed to write default config to {}: {e}",
            path.display()
        ))
    })?;

    info!("created default config at {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_override_wins() {
        let path = resolve_config_path(Some(PathBuf::from("/tmp/custom.toml"))).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/custom.toml"));
    }

    #[test]
    fn empty_override_is_ignored() {
        // The config dir may be unavailable in some CI sandboxes.
        if let Ok(path) = resolve_config_path(Some(PathBuf::new())) {
            assert!(path.ends_with("nanochat/config.toml"));
        }
    }
}
