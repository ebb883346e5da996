pub mod retry;

use anyhow::{Context, Result};
use std::path::PathBuf;

pub fn get_scrollcheck_home() -> Result<PathBuf> {
    if let Some(home) = std::env::var_os("SCROLLCHECK_HOME") {
        return Ok(PathBuf::from(home));
    }
    Ok(dirs::home_dir()
        .context("Could not determine home directory")?
        .join(".scrollcheck"))
}

/// Parse a comma-separated list of numeric ids, skipping blank entries.
///
/// Returns the first entry that is not an integer as the error value.
pub fn split_id_list(raw: &str) -> std::result::Result<Vec<u64>, String> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| p.parse::<u64>().map_err(|_| p.to_string()))
        .collect()
}
