//! Configuration file persistence for notedown
//!
//! This module handles loading and saving the settings file in the
//! platform-specific config directory, falling back to defaults when the
//! file is missing or unreadable.

use crate::config::Settings;
use crate::error::{Error, Result, ResultExt};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Application name used for the config directory
const APP_NAME: &str = "notedown";

/// Configuration file name
const CONFIG_FILE_NAME: &str = "config.json";

/// Extension of the temporary file written before the rename
const TEMP_EXTENSION: &str = "json.bak";

// ─────────────────────────────────────────────────────────────────────────────
// Platform-Specific Directory Resolution
// ─────────────────────────────────────────────────────────────────────────────

/// Get the platform-specific configuration directory for notedown.
///
/// - **Windows**: `%APPDATA%\notedown\`
/// - **macOS**: `~/Library/Application Support/notedown/`
/// - **Linux**: `~/.config/notedown/`
///
/// # Errors
///
/// Returns `Error::ConfigDirNotFound` if the config directory cannot be determined.
pub fn get_config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|base| base.join(APP_NAME))
        .ok_or(Error::ConfigDirNotFound)
}

/// Get the full path to the configuration file.
pub fn get_config_file_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join(CONFIG_FILE_NAME))
}

// ─────────────────────────────────────────────────────────────────────────────
// Load Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Load configuration from the default location, or defaults on any failure.
pub fn load_config() -> Settings {
    get_config_file_path()
        .and_then(|path| load_config_from(&path))
        .unwrap_or_warn_default(Settings::default(), "Failed to load configuration")
}

/// Load and sanitize configuration from `path`.
///
/// A missing or empty file yields default settings; invalid JSON is an error.
pub fn load_config_from(path: &Path) -> Result<Settings> {
    if !path.exists() {
        debug!("Config file not found at {}, using defaults", path.display());
        return Ok(Settings::default());
    }

    debug!("Loading config from: {}", path.display());
    let contents = fs::read_to_string(path).map_err(|e| Error::ConfigLoad {
        path: path.to_path_buf(),
        source: Box::new(e),
    })?;

    if contents.trim().is_empty() {
        debug!("Config file is empty, using defaults");
        return Ok(Settings::default());
    }

    let settings = Settings::from_json_sanitized(&contents).map_err(|e| {
        warn!("Config file at {} contains invalid JSON: {}", path.display(), e);
        Error::ConfigParse {
            message: format!("Failed to parse config file: {}", e),
            source: Some(Box::new(e)),
        }
    })?;

    info!("Configuration loaded from {}", path.display());
    Ok(settings)
}

// ─────────────────────────────────────────────────────────────────────────────
// Save Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Save configuration to the default location.
pub fn save_config(settings: &Settings) -> Result<()> {
    save_config_to(settings, &get_config_file_path()?)
}

/// Save configuration to `path`, creating its directory if needed.
///
/// The JSON is written to a sibling temporary file first and then renamed
/// over the target, so a crash never leaves a half-written config.
pub fn save_config_to(settings: &Settings, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        if !dir.exists() {
            debug!("Creating config directory: {}", dir.display());
            fs::create_dir_all(dir).map_err(|e| Error::ConfigSave {
                path: dir.to_path_buf(),
                source: Box::new(e),
            })?;
        }
    }

    let json = serde_json::to_string_pretty(settings).map_err(|e| Error::ConfigSave {
        path: path.to_path_buf(),
        source: Box::new(e),
    })?;

    let temp_path = path.with_extension(TEMP_EXTENSION);
    fs::write(&temp_path, &json).map_err(|e| Error::ConfigSave {
        path: temp_path.clone(),
        source: Box::new(e),
    })?;
    fs::rename(&temp_path, path).map_err(|e| Error::ConfigSave {
        path: path.to_path_buf(),
        source: Box::new(e),
    })?;

    info!("Configuration saved to {}", path.display());
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
