use crate::config::Config;
use crate::utils::get_scrollcheck_home;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_scrollcheck_home()?.join("config.json"))
}

/// Load the config file (or defaults when it does not exist) and apply env overrides.
///
/// The result is not validated: callers apply command-line overrides first and then
/// call [`Config::validate`].
pub fn load_config(config_path: Option<&Path>) -> Result<Config> {
    let default_path = get_config_path().unwrap_or_else(|_| PathBuf::from("config.json"));
    let path = config_path.unwrap_or(default_path.as_path());

    let mut config = if path.exists() {
        let config = read_config_file(path)?;
        check_file_permissions(path);
        config
    } else {
        debug!("no config at {}, using defaults", path.display());
        Config::default()
    };

    crate::config::credentials::apply_env_overrides(&mut config)
        .with_context(|| "Invalid environment override")?;

    Ok(config)
}

fn read_config_file(path: &Path) -> Result<Config> {
    // Shared lock: concurrent readers are fine, an editor holding an exclusive lock blocks us
    let file = fs::File::open(path)
        .with_context(|| format!("Failed to open config at {}", path.display()))?;
    fs2::FileExt::lock_shared(&file)
        .with_context(|| "Failed to acquire shared lock on config file")?;

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;

    parse_config(&content)
        .with_context(|| format!("Failed to parse config JSON from {}", path.display()))
}

pub fn parse_config(content: &str) -> Result<Config> {
    serde_json::from_str(content).with_context(|| "Failed to deserialize config")
}

/// Warn if the config file, which holds the bot token, is readable by others.
#[cfg(unix)]
fn check_file_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    if let Ok(meta) = fs::metadata(path) {
        let mode = meta.permissions().mode();
        if mode & 0o077 != 0 {
            warn!(
                "config file {} has permissions {:o}; recommend 0600",
                path.display(),
                mode & 0o777
            );
        }
    }
}

#[cfg(not(unix))]
fn check_file_permissions(_path: &Path) {}
