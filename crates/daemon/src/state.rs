//! On-disk application state: the app directory, `config.toml`, and the
//! data directory that holds the JSON documents.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const DATA_DIR_NAME: &str = "data";
const DEFAULT_APP_DIR: &str = ".kioskhub";
const DEFAULT_API_PORT: u16 = 5000;

/// Persisted configuration (`config.toml`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Port the API server listens on.
    pub api_port: u16,
    /// Data directory override; defaults to `<app_dir>/data` when unset.
    pub data_dir: Option<PathBuf>,
    /// Static device-id -> shared-secret table.
    #[serde(default)]
    pub device_keys: BTreeMap<String, String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_port: DEFAULT_API_PORT,
            data_dir: None,
            device_keys: BTreeMap::new(),
        }
    }
}

/// Loaded application state with resolved paths.
#[derive(Debug, Clone)]
pub struct AppState {
    pub app_dir: PathBuf,
    pub config_path: PathBuf,
    pub data_dir: PathBuf,
    pub config: AppConfig,
}

impl AppState {
    /// Resolve the app directory: an explicit path, or `~/.kioskhub`.
    pub fn app_dir(config_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        match config_path {
            Some(path) => Ok(path),
            None => dirs::home_dir()
                .map(|home| home.join(DEFAULT_APP_DIR))
                .ok_or(StateError::NoHomeDir),
        }
    }

    /// Create the app directory and write `config.toml`. Refuses to
    /// overwrite an existing config.
    pub fn init(config_path: Option<PathBuf>, config: Option<AppConfig>) -> Result<Self, StateError> {
        let app_dir = Self::app_dir(config_path)?;
        let config_file = app_dir.join(CONFIG_FILE_NAME);
        if config_file.exists() {
            return Err(StateError::AlreadyInitialized(config_file));
        }

        let config = config.unwrap_or_default();
        std::fs::create_dir_all(&app_dir)?;
        let toml = toml::to_string_pretty(&config)?;
        std::fs::write(&config_file, toml)?;

        Self::load_from(app_dir)
    }

    /// Load state from the app directory's `config.toml`.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, StateError> {
        let app_dir = Self::app_dir(config_path)?;
        Self::load_from(app_dir)
    }

    fn load_from(app_dir: PathBuf) -> Result<Self, StateError> {
        let config_path = app_dir.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            return Err(StateError::NotInitialized(config_path));
        }

        let raw = std::fs::read_to_string(&config_path)?;
        let config: AppConfig = toml::from_str(&raw)?;

        let data_dir = config
            .data_dir
            .clone()
            .unwrap_or_else(|| app_dir.join(DATA_DIR_NAME));

        Ok(Self {
            app_dir,
            config_path,
            data_dir,
            config,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("could not determine home directory")]
    NoHomeDir,
    #[error("not initialized: {0} does not exist (run `kioskd init`)")]
    NotInitialized(PathBuf),
    #[error("already initialized: {0} exists")]
    AlreadyInitialized(PathBuf),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config.toml: {0}")]
    InvalidConfig(#[from] toml::de::Error),
    #[error("failed to encode config.toml: {0}")]
    EncodeConfig(#[from] toml::ser::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    #[test]
    fn init_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let app_dir = dir.path().join("hub");

        let mut keys = BTreeMap::new();
        keys.insert("pi-01".to_string(), "A7K9-22FQ-ZYX1".to_string());
        let config = AppConfig {
            api_port: 5050,
            data_dir: None,
            device_keys: keys,
        };

        let state = AppState::init(Some(app_dir.clone()), Some(config)).unwrap();
        assert_eq!(state.config.api_port, 5050);
        assert_eq!(state.data_dir, app_dir.join(DATA_DIR_NAME));

        let loaded = AppState::load(Some(app_dir)).unwrap();
        assert_eq!(loaded.config.api_port, 5050);
        assert_eq!(loaded.config.device_keys["pi-01"], "A7K9-22FQ-ZYX1");
    }

    #[test]
    fn load_uninitialized_fails() {
        let dir = TempDir::new().unwrap();
        let err = AppState::load(Some(dir.path().join("missing"))).unwrap_err();
        assert!(matches!(err, StateError::NotInitialized(_)));
    }

    #[test]
    fn init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let app_dir = dir.path().join("hub");

        AppState::init(Some(app_dir.clone()), None).unwrap();
        let err = AppState::init(Some(app_dir), None).unwrap_err();
        assert!(matches!(err, StateError::AlreadyInitialized(_)));
    }
}
