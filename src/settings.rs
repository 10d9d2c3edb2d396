//! Persisted console settings.
//!
//! The operator's range and palette survive restarts in
//! `raziel_settings.json` under the platform application-data directory.
//! Range values are stored in slider units (hundredths of NDVI, so an
//! integer in [-100, 100]). Each key is optional and applied
//! independently on restore; a document carrying only `palette` leaves
//! the range at its defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// On-disk settings document.
///
/// Unknown keys are ignored on load so newer files stay readable by
/// older builds.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PersistedSettings {
    /// Lower display bound in slider units
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<i32>,
    /// Upper display bound in slider units
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<i32>,
    /// Palette name, one of the four the console offers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub palette: Option<String>,
}

/// Errors that can occur when persisting settings.
#[derive(Debug)]
pub enum SettingsError {
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::IoError { path, source } => {
                write!(
                    f,
                    "Failed to access settings file '{}': {}",
                    path.display(),
                    source
                )
            }
            SettingsError::ParseError { path, source } => {
                write!(
                    f,
                    "Failed to parse settings file '{}': {}",
                    path.display(),
                    source
                )
            }
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsError::IoError { source, .. } => Some(source),
            SettingsError::ParseError { source, .. } => Some(source),
        }
    }
}

/// Load persisted settings from a file path.
///
/// A missing file is the normal first-run case and returns `Ok(None)`
/// without logging. Returns an error only when the file exists but
/// cannot be read or parsed; the caller reports that in the log pane
/// and continues with defaults.
pub fn load(path: Option<&Path>) -> Result<Option<PersistedSettings>, SettingsError> {
    let path = path.map(PathBuf::from).unwrap_or_else(default_path);

    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(&path).map_err(|e| SettingsError::IoError {
        path: path.clone(),
        source: e,
    })?;
    let settings: PersistedSettings =
        serde_json::from_str(&content).map_err(|e| SettingsError::ParseError {
            path: path.clone(),
            source: e,
        })?;
    Ok(Some(settings))
}

/// Save settings to a file path, creating parent directories as needed.
pub fn save(path: Option<&Path>, settings: &PersistedSettings) -> Result<(), SettingsError> {
    let path = path.map(PathBuf::from).unwrap_or_else(default_path);

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| SettingsError::IoError {
            path: path.clone(),
            source: e,
        })?;
    }

    let content =
        serde_json::to_string_pretty(settings).map_err(|e| SettingsError::ParseError {
            path: path.clone(),
            source: e,
        })?;
    std::fs::write(&path, content).map_err(|e| SettingsError::IoError { path, source: e })
}

/// Get the default settings file path.
pub fn default_path() -> PathBuf {
    directories::ProjectDirs::from("com", "raziel", "raziel")
        .map(|d| d.data_dir().join("raziel_settings.json"))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".local/share/raziel/raziel_settings.json")
        })
}
