//! Roster and describe command implementations.

use super::output::format_roster;
use super::{CliError, OutputFormat, TrainerRef, load_config, load_data};
use std::path::Path;

/// List every trainer class and instance.
///
/// # Errors
///
/// Returns an error if the config or data files cannot be loaded.
pub(crate) fn execute(config: Option<&Path>, format: OutputFormat) -> Result<(), CliError> {
    let data = load_data(&load_config(config)?)?;
    match format {
        OutputFormat::Text => print!("{}", format_roster(data.roster.trainers())),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(data.roster.trainers())?),
    }
    Ok(())
}

/// Print the description of one trainer.
///
/// # Errors
///
/// Returns an error if loading fails or the trainer does not exist.
pub(crate) fn describe(config: Option<&Path>, trainer: TrainerRef) -> Result<(), CliError> {
    let data = load_data(&load_config(config)?)?;
    let (class, instance) = data.roster.find(trainer.id, trainer.index)?;
    println!("{}", class.describe(instance));
    Ok(())
}
