use crate::error::{RainyError, Result};
use crate::store::fs::write_atomic;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::fs;

pub const SETTINGS_FILENAME: &str = "settings.json";
pub const DATA_DIR_ENV: &str = "RAINY_DATA_DIR";
const DATA_DIR_NAME: &str = "rainy-data";

/// Process-wide settings, stored as `settings.json` in the data root.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Connection string for the remote mirror. Empty means "not configured".
    #[serde(default)]
    pub mongo_db_uri: String,
    /// Keys written by other clients, carried through untouched on save.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Settings {
    /// Load settings from `dir`, or defaults if the file does not exist.
    pub async fn load<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let path = dir.as_ref().join(SETTINGS_FILENAME);
        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&path).await.map_err(RainyError::Io)?;
        let settings: Settings =
            serde_json::from_str(&content).map_err(RainyError::Serialization)?;
        Ok(settings)
    }

    pub async fn save<P: AsRef<Path>>(&self, dir: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self).map_err(RainyError::Serialization)?;
        write_atomic(&dir.as_ref().join(SETTINGS_FILENAME), content).await
    }

    /// The configured URI, if any.
    pub fn remote_uri(&self) -> Option<&str> {
        let uri = self.mongo_db_uri.trim();
        (!uri.is_empty()).then_some(uri)
    }
}

/// Where the local store lives: an explicit override, then `RAINY_DATA_DIR`,
/// then the platform data directory.
pub fn resolve_data_dir(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir);
    }
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let proj_dirs = ProjectDirs::from("com", "rainy", "rainy")
        .ok_or_else(|| RainyError::Store("Could not determine data directory".to_string()))?;
    Ok(proj_dirs.data_dir().join(DATA_DIR_NAME))
}
