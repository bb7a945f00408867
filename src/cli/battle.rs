//! Battle command implementation.

use super::output::{JsonBattleReport, format_text};
use super::{CliError, OutputFormat, TrainerRef, load_config, load_data};
use eloworld::Combatant;
use eloworld::data::{GameData, Trainer, TrainerInstance};
use eloworld::session;
use eloworld::workspace;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::path::PathBuf;

/// Command-line options of `battle`.
#[derive(Debug)]
pub(crate) struct BattleArgs {
    pub(crate) config: Option<PathBuf>,
    pub(crate) player: Option<TrainerRef>,
    pub(crate) enemy: Option<TrainerRef>,
    pub(crate) seed: Option<u64>,
    pub(crate) run_id: Option<String>,
    pub(crate) no_movie: bool,
    pub(crate) format: OutputFormat,
}

fn pick<'a>(
    data: &'a GameData,
    choice: Option<TrainerRef>,
    rng: &mut SmallRng,
) -> Result<(&'a Trainer, &'a TrainerInstance), CliError> {
    Ok(match choice {
        Some(TrainerRef { id, index }) => data.roster.find(id, index)?,
        None => data.roster.random(rng)?,
    })
}

/// Execute the battle command.
///
/// # Errors
///
/// Returns an error if loading, the battle, or movie assembly fails.
pub(crate) fn execute(args: BattleArgs) -> Result<(), CliError> {
    let mut config = load_config(args.config.as_deref())?;
    if args.no_movie {
        config.save_movie = false;
    }
    let data = load_data(&config)?;

    let seed = args.seed.unwrap_or_else(rand::random);
    let mut rng = SmallRng::seed_from_u64(seed);
    let (player_class, player_instance) = pick(&data, args.player, &mut rng)?;
    let (enemy_class, enemy_instance) = pick(&data, args.enemy, &mut rng)?;
    let player = Combatant::new(player_class, player_instance);
    let enemy = Combatant::new(enemy_class, enemy_instance);

    let run_id = args.run_id.unwrap_or_else(workspace::new_run_id);
    let report = session::run_battle(&config, &data, player, enemy, &run_id, rng)?;

    match args.format {
        OutputFormat::Text => {
            print!("{}", format_text(&report, seed));
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&JsonBattleReport::new(
                &report,
                seed,
                player.describe(),
                enemy.describe(),
            ))?;
            println!("{json}");
        }
    }
    Ok(())
}
