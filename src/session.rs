//! One complete battle run against the real emulator.
//!
//! Sets up a working directory, drives the battle through bgb, assembles the
//! recorded clips into a movie and removes the working directory. A failure
//! at any step aborts the run and leaves the working directory in place for
//! inspection.

use crate::config::Config;
use crate::data::GameData;
use crate::driver::{BattleDriver, BattleError, BattleOutcome, Combatant};
use crate::emulator::Bgb;
use crate::memory::Snapshot;
use crate::movie;
use crate::workspace::Workspace;
use rand::Rng;
use std::path::{Path, PathBuf};

/// Result of a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BattleReport {
    /// Run id the working directory and movie are named after.
    pub run_id: String,
    /// How the battle ended.
    pub outcome: BattleOutcome,
    /// The assembled movie, when recording.
    pub movie: Option<PathBuf>,
}

fn load_state(path: &Path) -> Result<Snapshot, BattleError> {
    Snapshot::load(path).map_err(|source| BattleError::State {
        path: path.to_path_buf(),
        source,
    })
}

/// Fight `player` against `enemy` as run `run_id`.
///
/// # Errors
///
/// Returns a [`BattleError`] on the first failing step.
pub fn run_battle<R: Rng>(
    config: &Config,
    data: &GameData,
    player: Combatant<'_>,
    enemy: Combatant<'_>,
    run_id: &str,
    rng: R,
) -> Result<BattleReport, BattleError> {
    let base = load_state(&config.base_state)?;
    let ai_base = load_state(&config.ai_state)?;
    let workspace = Workspace::create(&config.working_dir, run_id, &config.rom, config.save_movie)?;

    let mut bgb = Bgb::new(&config.emulator, workspace.bgb_paths());
    if let Some(recording) = workspace.recording(config.lossless) {
        bgb = bgb.with_recording(recording);
    }

    let mut driver = BattleDriver::new(bgb, rng, data, ai_base)?
        .with_demo_config(config.demo)
        .recording(config.save_movie);
    let outcome = driver.run(&base, player, enemy)?;

    let movie = match workspace.movie_dir() {
        Some(clips) => {
            let output = movie::output_path(&config.output_dir, run_id);
            movie::assemble(clips, &output, &config.movie)?;
            Some(output)
        }
        None => None,
    };
    workspace.remove()?;

    Ok(BattleReport {
        run_id: run_id.to_string(),
        outcome,
        movie,
    })
}
