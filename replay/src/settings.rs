//! Read-only settings lookup. Nothing is ever written back.

use std::path::{Path, PathBuf};

use shopwatch_types::EngineSettings;

use crate::error::ReplayError;

/// `<config_dir>/shopwatch/settings.toml`
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("shopwatch").join("settings.toml"))
}

/// Settings from an explicit file, else the default location if it exists,
/// else built-in defaults.
pub fn load_settings(explicit: Option<&Path>) -> Result<EngineSettings, ReplayError> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match default_settings_path() {
            Some(path) if path.exists() => path,
            _ => {
                tracing::info!("[CONFIG] No settings file, using defaults");
                return Ok(EngineSettings::default());
            }
        },
    };

    let text = std::fs::read_to_string(&path).map_err(|source| ReplayError::Io {
        path: path.clone(),
        source,
    })?;
    let settings = parse_settings(&path, &text)?;
    tracing::info!("[CONFIG] Loaded settings from {}", path.display());
    Ok(settings)
}

pub fn parse_settings(path: &Path, text: &str) -> Result<EngineSettings, ReplayError> {
    let settings: EngineSettings = toml::from_str(text).map_err(|source| ReplayError::Toml {
        path: path.to_path_buf(),
        source,
    })?;
    settings.validate()?;
    Ok(settings)
}
