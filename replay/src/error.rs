use std::path::PathBuf;

use shopwatch_types::SettingsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings file {}: {source}", .path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid settings: {0}")]
    Settings(#[from] SettingsError),

    #[error("failed to encode snapshot: {0}")]
    Json(#[from] serde_json::Error),
}
