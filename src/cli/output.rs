//! Output formatting utilities for CLI.

use eloworld::data::Trainer;
use eloworld::driver::{Choice, Side, TurnRecord};
use eloworld::session::BattleReport;
use serde::Serialize;

/// JSON-serializable battle result.
#[derive(Debug, Serialize)]
pub(super) struct JsonBattleReport {
    /// Run id.
    pub(super) run_id: String,
    /// Seed for the AI random state and trainer picks.
    pub(super) seed: u64,
    /// Player-side description.
    pub(super) player: String,
    /// Enemy-side description.
    pub(super) enemy: String,
    /// "player" or "enemy".
    pub(super) winner: &'static str,
    /// Winning class name.
    pub(super) winner_class: String,
    /// Main-loop emulator runs.
    pub(super) runs: u32,
    /// Per-turn choices.
    pub(super) turns: Vec<String>,
    /// Movie path, if one was made.
    pub(super) movie: Option<String>,
}

impl JsonBattleReport {
    /// Create from a finished run.
    pub(super) fn new(report: &BattleReport, seed: u64, player: String, enemy: String) -> Self {
        Self {
            run_id: report.run_id.clone(),
            seed,
            player,
            enemy,
            winner: side_name(report.outcome.winner),
            winner_class: report.outcome.winner_class.clone(),
            runs: report.outcome.runs,
            turns: report.outcome.turns.iter().map(describe_turn).collect(),
            movie: report.movie.as_ref().map(|p| p.display().to_string()),
        }
    }
}

fn side_name(side: Side) -> &'static str {
    match side {
        Side::Player => "player",
        Side::Enemy => "enemy",
    }
}

/// Short description of one handled pause.
pub(super) fn describe_turn(turn: &TurnRecord) -> String {
    match turn {
        TurnRecord::Decision { choice, .. } => match choice {
            Choice::Switch => "switch".to_string(),
            Choice::Item(item) => format!("item {item:#04x}"),
            Choice::Move(id) => format!("move {id:#04x}"),
        },
        TurnRecord::PartySlot(slot) => format!("party slot {slot}"),
    }
}

/// Format a finished run as human-readable text.
pub(super) fn format_text(report: &BattleReport, seed: u64) -> String {
    let mut output = format!("Battle {} (seed: {seed})\n", report.run_id);
    output.push_str(&format!(
        "  Winner: {} ({} side)\n",
        report.outcome.winner_class,
        side_name(report.outcome.winner)
    ));
    output.push_str(&format!("  Emulator runs: {}\n", report.outcome.runs));
    if let Some(movie) = &report.movie {
        output.push_str(&format!("  Movie: {}\n", movie.display()));
    }
    output
}

/// One line per trainer instance.
pub(super) fn format_roster(trainers: &[Trainer]) -> String {
    let mut output = String::new();
    for trainer in trainers {
        for instance in &trainer.instances {
            output.push_str(&trainer.describe(instance));
            output.push('\n');
        }
    }
    output
}
