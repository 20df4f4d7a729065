//! Config file discovery and loading.

use crate::schema::KokoroConfig;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Default config file name.
const CONFIG_FILE_NAME: &str = "config.yaml";

/// Resolve the kokoro config directory.
/// Priority: `KOKORO_CONFIG_DIR` env > `~/.kokoro/`
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("KOKORO_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .map(|home| home.join(".kokoro"))
        .unwrap_or_else(|| PathBuf::from(".kokoro"))
}

/// Resolve which config file to read.
///
/// Priority: explicit path > `KOKORO_CONFIG` env > `./config.yaml` if it
/// exists > `<config_dir>/config.yaml`.
pub fn config_file_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Ok(path) = std::env::var("KOKORO_CONFIG") {
        return PathBuf::from(path);
    }
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    config_dir().join(CONFIG_FILE_NAME)
}

/// Load and parse the config from disk.
///
/// Returns `Ok(Default::default())` if the file doesn't exist.
pub async fn load_config(path: &Path) -> Result<KokoroConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "Config file does not exist; using defaults");
        return Ok(KokoroConfig::default());
    }

    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    if raw.trim().is_empty() {
        return Ok(KokoroConfig::default());
    }

    let config: KokoroConfig = serde_yaml::from_str(&raw)
        .with_context(|| format!("Failed to parse config YAML at: {}", path.display()))?;

    info!(path = %path.display(), "Loaded config");
    Ok(config)
}
