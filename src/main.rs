//! Eloworld CLI - run trainer-vs-trainer battles through bgb.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

/// Eloworld - Pokémon Red trainer battles played by the game's own AI
#[derive(Parser, Debug)]
#[command(name = "eloworld")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON config file (default: built-in settings)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Fight one battle
    Battle {
        /// Player-side trainer as ID:INSTANCE, e.g. 229:1 (default: random)
        #[arg(short, long)]
        player: Option<cli::TrainerRef>,

        /// Enemy trainer as ID:INSTANCE (default: random)
        #[arg(short, long)]
        enemy: Option<cli::TrainerRef>,

        /// Random seed (default: random)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Run id naming the working directory and movie (default: random UUID)
        #[arg(long)]
        run_id: Option<String>,

        /// Do not record or assemble a movie
        #[arg(long)]
        no_movie: bool,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,
    },

    /// List all trainer classes and instances
    Roster {
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,
    },

    /// Describe one trainer
    Describe {
        /// Trainer class id
        id: u8,

        /// Instance number (1-based)
        index: u8,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let args = Args::parse();

    let result = match args.command {
        Commands::Battle {
            player,
            enemy,
            seed,
            run_id,
            no_movie,
            format,
        } => cli::battle::execute(cli::battle::BattleArgs {
            config: args.config,
            player,
            enemy,
            seed,
            run_id,
            no_movie,
            format,
        }),

        Commands::Roster { format } => cli::roster::execute(args.config.as_deref(), format),

        Commands::Describe { id, index } => {
            cli::roster::describe(args.config.as_deref(), cli::TrainerRef { id, index })
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
