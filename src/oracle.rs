//! Asking the game's own trainer AI what to do.
//!
//! The mirrored state (see [`crate::transcode::mirror_for_ai`]) is run until
//! the AI either commits to a move or item, takes the switch branch, or reads
//! its item slot. The paused state then holds the answer.

use crate::emulator::{Breakpoint, EmulationError, Emulator, RunRequest};
use crate::error::LayoutResult;
use crate::memory::Snapshot;
use crate::memory::layout::{ENEMY_ITEM_USED, ENEMY_SELECTED_MOVE, pc, watch};

/// Stop conditions for an AI query.
pub const QUERY_BREAKPOINTS: [Breakpoint; 3] = [
    Breakpoint::exec(pc::AI_DECISION),
    Breakpoint::exec(pc::SWITCH_CALL),
    Breakpoint::read(watch::ENEMY_ITEM_USED),
];

/// What the AI chose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AiAction {
    /// Selected move id.
    pub move_id: u8,
    /// Item id, 0 for none.
    pub item_id: u8,
    /// Whether the AI wants to switch Pokémon.
    pub switch: bool,
}

impl AiAction {
    /// Read the decision out of a paused query state.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::error::LayoutError`] if the state is too small.
    pub fn from_snapshot(state: &Snapshot) -> LayoutResult<Self> {
        Ok(Self {
            move_id: state.read_u8(ENEMY_SELECTED_MOVE)?,
            item_id: state.read_u8(ENEMY_ITEM_USED)?,
            switch: state.program_counter()? == pc::SWITCH_CALL,
        })
    }
}

/// Run one AI query on `mirrored`.
///
/// # Errors
///
/// Returns [`EmulationError`] if the run fails or its output is unusable.
pub fn query<E: Emulator>(emulator: &mut E, mirrored: &Snapshot) -> Result<AiAction, EmulationError> {
    let paused = emulator.run(RunRequest::new(mirrored, &QUERY_BREAKPOINTS))?;
    Ok(AiAction::from_snapshot(&paused)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emulator::ScriptedEmulator;
    use crate::memory::layout::PROGRAM_COUNTER;

    fn paused_at(pc: u16, move_id: u8, item_id: u8) -> Snapshot {
        let mut snap = Snapshot::blank();
        snap.write(PROGRAM_COUNTER, &pc.to_le_bytes()).unwrap();
        snap.write_u8(ENEMY_SELECTED_MOVE, move_id).unwrap();
        snap.write_u8(ENEMY_ITEM_USED, item_id).unwrap();
        snap
    }

    #[test]
    fn test_query_reads_move() {
        let mut emulator = ScriptedEmulator::new();
        emulator.push(paused_at(pc::AI_DECISION, 0x55, 0));

        let action = query(&mut emulator, &Snapshot::blank()).unwrap();
        assert_eq!(
            action,
            AiAction {
                move_id: 0x55,
                item_id: 0,
                switch: false
            }
        );
        assert_eq!(emulator.runs()[0].breakpoints, QUERY_BREAKPOINTS.to_vec());
        assert!(emulator.runs()[0].demo.is_none());
    }

    #[test]
    fn test_switch_branch_detected() {
        let mut emulator = ScriptedEmulator::new();
        emulator.push(paused_at(pc::SWITCH_CALL, 0x10, 0x12));

        let action = query(&mut emulator, &Snapshot::blank()).unwrap();
        assert!(action.switch);
        assert_eq!(action.item_id, 0x12);
    }

    #[test]
    fn test_emulator_failure_propagates() {
        let mut emulator = ScriptedEmulator::new();
        let err = query(&mut emulator, &Snapshot::blank()).unwrap_err();
        assert!(matches!(err, EmulationError::ScriptExhausted(1)));
    }
}
