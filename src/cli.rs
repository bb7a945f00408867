//! CLI command implementations for eloworld.

pub(crate) mod battle;
pub(crate) mod roster;

mod output;

use clap::ValueEnum;
use eloworld::config::{Config, ConfigError};
use eloworld::data::{DataError, GameData};
use std::error::Error;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Output format for `battle` and `roster`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// A trainer given on the command line as `CLASS_ID:INSTANCE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TrainerRef {
    /// Trainer class id (200 and up).
    pub(crate) id: u8,
    /// 1-based instance number.
    pub(crate) index: u8,
}

impl FromStr for TrainerRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, index) = s
            .split_once(':')
            .ok_or_else(|| format!("expected CLASS_ID:INSTANCE, got {s:?}"))?;
        let id = id
            .trim()
            .parse()
            .map_err(|e| format!("bad class id {id:?}: {e}"))?;
        let index = index
            .trim()
            .parse()
            .map_err(|e| format!("bad instance {index:?}: {e}"))?;
        Ok(Self { id, index })
    }
}

/// CLI error type.
#[derive(Debug)]
pub(crate) struct CliError {
    message: String,
}

impl CliError {
    /// Create a new CLI error.
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for CliError {}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<DataError> for CliError {
    fn from(e: DataError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<eloworld::BattleError> for CliError {
    fn from(e: eloworld::BattleError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::new(format!("JSON serialization failed: {e}"))
    }
}

/// Load the config file if one was given, defaults otherwise.
pub(crate) fn load_config(path: Option<&Path>) -> Result<Config, CliError> {
    match path {
        Some(path) => Ok(Config::load(path)?),
        None => Ok(Config::default()),
    }
}

/// Load the lookup tables the config points at.
pub(crate) fn load_data(config: &Config) -> Result<GameData, CliError> {
    Ok(GameData::load(&config.data_dir)?)
}
