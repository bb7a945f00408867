//! The battle loop.
//!
//! [`BattleDriver`] owns the battle state and advances it one breakpoint at a
//! time. Each pause is classified into a [`BattleState`]; opponent decisions
//! are answered by mirroring the state and asking the game's AI what the
//! player-side trainer would do, then replaying the menu inputs for that
//! choice.

use crate::data::{DataError, GameData, Trainer, TrainerInstance};
use crate::emulator::{Breakpoint, EmulationError, Emulator, RunRequest};
use crate::error::{LayoutError, LayoutResult};
use crate::input::{self, Demo, DemoConfig};
use crate::memory::Snapshot;
use crate::memory::layout::{
    BAG_ITEM_COUNT, BAG_ITEMS, BATTLE_MON_MOVES, BATTLE_MON_PARTY_POS, BATTLE_MON_PP,
    MOVE_LIST_INDEX, MOVE_SLOTS, PARTY_LENGTH, pc, watch,
};
use crate::movie::MovieError;
use crate::oracle::{self, AiAction};
use crate::transcode::{self, TranscodeError};
use crate::workspace::WorkspaceError;
use rand::Rng;
use std::path::PathBuf;
use std::time::Instant;
use thiserror::Error;

/// Move the player side pretends to have picked during AI queries.
pub const NEUTRAL_MOVE: &str = "COUNTER";

/// PP written into every battle mon slot before each run.
const FULL_PP: [u8; MOVE_SLOTS] = [0xFF; MOVE_SLOTS];

/// Anything that ends a battle early.
#[derive(Debug, Error)]
pub enum BattleError {
    /// A field access failed.
    #[error(transparent)]
    Layout(#[from] LayoutError),
    /// An emulator run failed.
    #[error(transparent)]
    Emulation(#[from] EmulationError),
    /// Reference data is missing or inconsistent.
    #[error(transparent)]
    Data(#[from] DataError),
    /// The opening state could not be built.
    #[error(transparent)]
    Transcode(#[from] TranscodeError),
    /// The working directory could not be managed.
    #[error(transparent)]
    Workspace(#[from] WorkspaceError),
    /// The recorded clips could not be assembled.
    #[error(transparent)]
    Movie(#[from] MovieError),
    /// A configured state file could not be read.
    #[error("failed to load state {}: {source}", .path.display())]
    State {
        /// State file path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
}

/// Where a paused battle stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BattleState {
    /// Waiting for the next breakpoint.
    AwaitBreakpoint,
    /// The party menu is open.
    PartyMenu,
    /// The player-side trainer has to act.
    Decision,
    /// The player-side trainer won.
    PlayerWin,
    /// The enemy trainer won.
    EnemyWin,
}

impl BattleState {
    /// Classify the pause at `program_counter`.
    ///
    /// Anything that is not the party menu or a win address is treated as
    /// the battle menu.
    #[must_use]
    pub const fn from_program_counter(program_counter: u16) -> Self {
        match program_counter {
            pc::PARTY_MENU_INIT => Self::PartyMenu,
            pc::TRAINER_WIN => Self::PlayerWin,
            pc::ENEMY_WIN => Self::EnemyWin,
            _ => Self::Decision,
        }
    }

    /// Whether the battle is over.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::PlayerWin | Self::EnemyWin)
    }
}

/// What the player-side trainer will do this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Choice {
    /// Open the party menu.
    Switch,
    /// Use this item on the active Pokémon.
    Item(u8),
    /// Use this move.
    Move(u8),
}

impl Choice {
    /// Resolve an AI answer: switching beats items, items beat moves.
    #[must_use]
    pub const fn from_action(action: AiAction) -> Self {
        if action.switch {
            Self::Switch
        } else if action.item_id != 0 {
            Self::Item(action.item_id)
        } else {
            Self::Move(action.move_id)
        }
    }
}

/// A battle side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// The trainer the AI plays for.
    Player,
    /// The trainer the game plays against.
    Enemy,
}

/// A trainer taking part in a battle.
#[derive(Debug, Clone, Copy)]
pub struct Combatant<'a> {
    /// Trainer class.
    pub trainer: &'a Trainer,
    /// Which of the class's teams.
    pub instance: &'a TrainerInstance,
}

impl<'a> Combatant<'a> {
    /// Pair a class with one of its instances.
    #[must_use]
    pub const fn new(trainer: &'a Trainer, instance: &'a TrainerInstance) -> Self {
        Self { trainer, instance }
    }

    /// Human-readable description.
    #[must_use]
    pub fn describe(&self) -> String {
        self.trainer.describe(self.instance)
    }
}

/// One handled pause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnRecord {
    /// The AI was asked and answered.
    Decision {
        /// Raw AI answer.
        action: AiAction,
        /// What was done with it.
        choice: Choice,
    },
    /// A party slot was picked in the party menu.
    PartySlot(u8),
}

/// How a battle ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BattleOutcome {
    /// Winning side.
    pub winner: Side,
    /// Class name of the winner.
    pub winner_class: String,
    /// Every handled pause, in order.
    pub turns: Vec<TurnRecord>,
    /// Number of main-loop runs, which is also the number of clips when
    /// recording.
    pub runs: u32,
}

/// Slot to switch to: the first party member other than the active one
/// with HP left, or slot 0 if there is none.
///
/// # Errors
///
/// Returns a [`LayoutError`] if the state is too small.
pub fn switch_target(state: &Snapshot) -> LayoutResult<u8> {
    let active = state.read_u8(BATTLE_MON_PARTY_POS)?;
    for slot in (0u8..).take(PARTY_LENGTH).filter(|&slot| slot != active) {
        if state.party_member_hp(usize::from(slot))? != 0 {
            return Ok(slot);
        }
    }
    Ok(0)
}

/// Slot of `move_id` in the active Pokémon's move list.
///
/// # Errors
///
/// Returns a [`LayoutError`] if the state is too small.
pub fn move_slot(state: &Snapshot, move_id: u8) -> LayoutResult<Option<u8>> {
    let moves = state.read(BATTLE_MON_MOVES)?;
    Ok(moves
        .iter()
        .zip(0u8..)
        .find(|&(&m, _)| m == move_id)
        .map(|(_, slot)| slot))
}

/// Breakpoints for one main-loop run, gated on the clock so the pause that
/// ended the previous run does not fire again.
#[must_use]
pub fn battle_breakpoints(after_clocks: u64) -> [Breakpoint; 4] {
    [
        Breakpoint::exec_after(pc::DISPLAY_BATTLE_MENU, after_clocks),
        Breakpoint::exec_after(pc::PARTY_MENU_INIT, after_clocks),
        Breakpoint::exec_after(pc::TRAINER_WIN, after_clocks),
        Breakpoint::exec_after(pc::ENEMY_WIN, after_clocks),
    ]
}

/// Mutable state carried between pauses.
struct Progress {
    battle: Snapshot,
    clocks: u64,
    demo: Demo,
    using_item: bool,
    runs: u32,
    turns: Vec<TurnRecord>,
}

impl Progress {
    /// Refill PP and go back to waiting.
    fn end_turn(&mut self) -> LayoutResult<BattleState> {
        self.battle.write(BATTLE_MON_PP, &FULL_PP)?;
        Ok(BattleState::AwaitBreakpoint)
    }
}

/// Drives a battle through an [`Emulator`].
#[derive(Debug)]
pub struct BattleDriver<'a, E, R> {
    emulator: E,
    rng: R,
    data: &'a GameData,
    ai_base: Snapshot,
    neutral_move: u8,
    demo_config: DemoConfig,
    record: bool,
}

impl<'a, E: Emulator, R: Rng> BattleDriver<'a, E, R> {
    /// Create a driver.
    ///
    /// `ai_base` is the state every AI query starts from. `rng` seeds the
    /// AI's random state on each query.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::UnknownMove`] if the move table has no
    /// [`NEUTRAL_MOVE`].
    pub fn new(emulator: E, rng: R, data: &'a GameData, ai_base: Snapshot) -> Result<Self, BattleError> {
        let neutral_move = data.require_move(NEUTRAL_MOVE)?;
        Ok(Self {
            emulator,
            rng,
            data,
            ai_base,
            neutral_move,
            demo_config: DemoConfig::default(),
            record: false,
        })
    }

    /// Use different input timing.
    #[must_use]
    pub fn with_demo_config(mut self, config: DemoConfig) -> Self {
        self.demo_config = config;
        self
    }

    /// Number main-loop runs as clips.
    #[must_use]
    pub fn recording(mut self, record: bool) -> Self {
        self.record = record;
        self
    }

    /// Give back the emulator.
    #[must_use]
    pub fn into_emulator(self) -> E {
        self.emulator
    }

    /// Build the opening state from `base` and fight it out.
    ///
    /// # Errors
    ///
    /// Returns a [`BattleError`] on the first failure; nothing is retried.
    pub fn run(
        &mut self,
        base: &Snapshot,
        player: Combatant<'_>,
        enemy: Combatant<'_>,
    ) -> Result<BattleOutcome, BattleError> {
        let battle = self.prepare(base, player, enemy)?;
        self.fight(battle, player, enemy)
    }

    /// Load the player-side trainer's team and set up the battle against
    /// `enemy`.
    ///
    /// # Errors
    ///
    /// Returns a [`BattleError`] if the query run fails or the opening
    /// state cannot be composed.
    pub fn prepare(
        &mut self,
        base: &Snapshot,
        player: Combatant<'_>,
        enemy: Combatant<'_>,
    ) -> Result<Snapshot, BattleError> {
        log::info!("You are {}", player.describe());
        log::info!("Your opponent is {}", enemy.describe());

        log::info!("getting trainer info");
        let started = Instant::now();
        let query = transcode::trainer_query(base, player.trainer, player.instance)?;
        let breakpoints = [Breakpoint::write(watch::TRAINER_LOADED)];
        let loaded = self.emulator.run(RunRequest::new(&query, &breakpoints))?;
        log::info!("got trainer info in {:.2?}", started.elapsed());

        let mut battle = base.clone();
        transcode::compose_battle(&loaded, &mut battle, self.data, enemy.trainer, enemy.instance)?;
        Ok(battle)
    }

    /// Run the battle loop from `battle` until one side wins.
    ///
    /// # Errors
    ///
    /// Returns a [`BattleError`] on the first failure; nothing is retried.
    pub fn fight(
        &mut self,
        battle: Snapshot,
        player: Combatant<'_>,
        enemy: Combatant<'_>,
    ) -> Result<BattleOutcome, BattleError> {
        let mut progress = Progress {
            clocks: battle.total_clocks()?,
            battle,
            demo: Demo::idle(&self.demo_config),
            using_item: false,
            runs: 0,
            turns: Vec::new(),
        };

        let mut state = BattleState::AwaitBreakpoint;
        loop {
            state = match state {
                BattleState::AwaitBreakpoint => self.advance(&mut progress)?,
                BattleState::PartyMenu => {
                    self.party_menu(&mut progress)?;
                    progress.end_turn()?
                }
                BattleState::Decision => {
                    self.decide(&mut progress, player)?;
                    progress.end_turn()?
                }
                BattleState::PlayerWin | BattleState::EnemyWin => {
                    let (winner, class) = if state == BattleState::PlayerWin {
                        (Side::Player, &player.trainer.class)
                    } else {
                        (Side::Enemy, &enemy.trainer.class)
                    };
                    log::info!("{class} wins!");
                    return Ok(BattleOutcome {
                        winner,
                        winner_class: class.clone(),
                        turns: progress.turns,
                        runs: progress.runs,
                    });
                }
            };
        }
    }

    /// Run until the next pause and classify it.
    fn advance(&mut self, progress: &mut Progress) -> Result<BattleState, BattleError> {
        let breakpoints = battle_breakpoints(progress.clocks);
        let mut request = RunRequest::new(&progress.battle, &breakpoints).with_demo(&progress.demo);
        if self.record {
            request = request.with_clip(progress.runs);
        }
        progress.battle = self.emulator.run(request)?;
        progress.runs += 1;
        progress.clocks = progress.battle.total_clocks()?;

        let program_counter = progress.battle.program_counter()?;
        let state = BattleState::from_program_counter(program_counter);
        log::debug!("paused at {program_counter:#06x}: {state:?}");
        Ok(state)
    }

    fn party_menu(&self, progress: &mut Progress) -> Result<(), BattleError> {
        let slot = if progress.using_item {
            progress.using_item = false;
            progress.battle.read_u8(BATTLE_MON_PARTY_POS)?
        } else {
            switch_target(&progress.battle)?
        };
        log::debug!("choosing party slot {slot}");
        progress.demo = input::choose_party_slot(slot, &self.demo_config);
        progress.turns.push(TurnRecord::PartySlot(slot));
        Ok(())
    }

    fn decide(&mut self, progress: &mut Progress, player: Combatant<'_>) -> Result<(), BattleError> {
        progress.using_item = false;
        let mirrored = transcode::mirror_for_ai(
            &progress.battle,
            &self.ai_base,
            player.trainer.id,
            self.neutral_move,
            &mut self.rng,
        )?;
        let action = oracle::query(&mut self.emulator, &mirrored)?;
        log::info!(
            "Move: {} Item: {} Switch?: {}",
            self.data.moves.render(action.move_id),
            self.data.items.render(action.item_id),
            if action.switch { "YES" } else { "NO" }
        );

        let choice = Choice::from_action(action);
        progress.demo = match choice {
            Choice::Switch => input::select_switch(&self.demo_config),
            Choice::Item(item) => {
                progress.battle.write_u8(BAG_ITEM_COUNT, 1)?;
                progress.battle.write(BAG_ITEMS, &[item, 1, 0xFF])?;
                progress.using_item = true;
                input::use_item(&self.demo_config)
            }
            Choice::Move(move_id) => {
                let target = move_slot(&progress.battle, move_id)?.unwrap_or_else(|| {
                    log::warn!(
                        "{} is not in the active move list, using slot 0",
                        self.data.moves.render(move_id)
                    );
                    0
                });
                let cursor = progress.battle.read_u8(MOVE_LIST_INDEX)?;
                input::select_move(cursor, target, &self.demo_config)
            }
        };
        progress.turns.push(TurnRecord::Decision { action, choice });
        Ok(())
    }
}
