//! Configuration discovery

use std::path::{Path, PathBuf};

use eyre::{Result, WrapErr};
use hostinv_core::AgentConfig;

/// Environment variable naming the config file
pub const ENV_CONFIG: &str = "HOSTINV_CONFIG";

/// Config files tried in order when none is named explicitly
pub fn default_paths() -> Vec<PathBuf> {
    let mut paths = vec![
        PathBuf::from("hostinv.toml"),
        PathBuf::from("/etc/hostinv/hostinv.toml"),
    ];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("hostinv/hostinv.toml"));
    }
    paths
}

/// First candidate that exists
pub fn first_existing(candidates: &[PathBuf]) -> Option<PathBuf> {
    candidates.iter().find(|path| path.is_file()).cloned()
}

/// Load configuration and apply environment overrides
///
/// An explicit path or `$HOSTINV_CONFIG` must exist. Otherwise the default
/// locations are searched and built-in defaults are used when none exists.
/// Returns the file actually loaded, if any.
///
/// # Errors
/// Returns an error if the chosen file cannot be read or parsed.
pub fn load(explicit: Option<&Path>) -> Result<(AgentConfig, Option<PathBuf>)> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => match std::env::var_os(ENV_CONFIG) {
            Some(path) => Some(PathBuf::from(path)),
            None => first_existing(&default_paths()),
        },
    };

    let mut config = match &path {
        Some(path) => AgentConfig::load(path)
            .wrap_err_with(|| format!("failed to load config from {}", path.display()))?,
        None => AgentConfig::default(),
    };
    config.apply_env_overrides(|key| std::env::var(key).ok());

    Ok((config, path))
}
