//! Run configuration.
//!
//! Loaded from a JSON file; every field has a default so a file only needs
//! the settings it changes.

use crate::input::DemoConfig;
use crate::movie::MovieConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        /// Config path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// The file is not valid configuration JSON.
    #[error("invalid config {}: {source}", .path.display())]
    Json {
        /// Config path.
        path: PathBuf,
        /// Underlying error.
        source: serde_json::Error,
    },
}

/// Everything a battle run needs to find on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// bgb executable.
    pub emulator: PathBuf,
    /// Game ROM, copied into each working directory.
    pub rom: PathBuf,
    /// State the battle is composed into.
    pub base_state: PathBuf,
    /// State every AI query starts from.
    pub ai_state: PathBuf,
    /// Directory holding the JSON lookup tables.
    pub data_dir: PathBuf,
    /// Parent of the per-run working directories.
    pub working_dir: PathBuf,
    /// Where finished movies go.
    pub output_dir: PathBuf,
    /// Record each run and assemble a movie.
    pub save_movie: bool,
    /// Capture with a lossless codec.
    pub lossless: bool,
    /// Input timing.
    pub demo: DemoConfig,
    /// Movie assembly settings.
    pub movie: MovieConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            emulator: PathBuf::from("bgb/bgb.exe"),
            rom: PathBuf::from("Pokemon - Red Version (UE) [S][!].gb"),
            base_state: PathBuf::from("basestate.sn1"),
            ai_state: PathBuf::from("ai_choose_state.sn1"),
            data_dir: PathBuf::from("data"),
            working_dir: PathBuf::from("scratch"),
            output_dir: PathBuf::from("output"),
            save_movie: true,
            lossless: true,
            demo: DemoConfig::default(),
            movie: MovieConfig::default(),
        }
    }
}

impl Config {
    /// Parse configuration JSON. `origin` only labels errors.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] on malformed JSON or unknown keys.
    pub fn from_json(json: &str, origin: &Path) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|source| ConfigError::Json {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Load a configuration file.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&json, path)?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Buttons;

    #[test]
    fn test_empty_object_is_default() {
        let config = Config::from_json("{}", Path::new("test.json")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.demo.buffer_presses, 1000);
    }

    #[test]
    fn test_partial_override() {
        let json = r#"{
            "emulator": "/opt/bgb/bgb",
            "save_movie": false,
            "demo": { "settle": 20, "buffer_button": 1 }
        }"#;
        let config = Config::from_json(json, Path::new("test.json")).unwrap();
        assert_eq!(config.emulator, PathBuf::from("/opt/bgb/bgb"));
        assert!(!config.save_movie);
        assert_eq!(config.demo.settle, 20);
        assert_eq!(config.demo.hold, 2);
        assert_eq!(config.demo.buffer_button, Buttons::A);
        assert_eq!(config.movie, MovieConfig::default());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = Config::from_json(r#"{"emulater": "x"}"#, Path::new("bad.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Json { .. }));
        assert!(err.to_string().contains("bad.json"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eloworld.json");
        fs::write(&path, r#"{"lossless": false}"#).unwrap();
        assert!(!Config::load(&path).unwrap().lossless);

        let missing = Config::load(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(missing, ConfigError::Io { .. }));
    }
}
