//! Field table for Pokémon Red (UE) battle state.
//!
//! Addresses are for the English Red/Blue ROM. Any other ROM revision moves
//! these and invalidates every saved state.

use super::Field;

/// Width of a Pokémon name or nickname field.
pub const NAME_LENGTH: usize = 11;
/// Pads names out to their fixed width.
pub const NAME_TERMINATOR: u8 = 0x50;

/// Maximum members in a party.
pub const PARTY_LENGTH: usize = 6;
/// Size of one party member record.
pub const PARTY_STRUCT_SIZE: usize = 0x2C;
/// Size of the species list (six entries plus `0xFF` terminator).
pub const PARTY_LIST_LENGTH: usize = PARTY_LENGTH + 1;
/// Size of the in-battle Pokémon record.
pub const BATTLE_MON_SIZE: usize = 0x1C;
/// Moves known by one Pokémon.
pub const MOVE_SLOTS: usize = 4;

/// Trainer class ids start above this value; the "without offset" copy
/// of the class subtracts it.
pub const TRAINER_CLASS_ID_BASE: u8 = 200;

// Names

/// Name of the player character.
pub const PLAYER_NAME: Field = Field::wram("player name", 0xD158, NAME_LENGTH);
/// Name of the enemy trainer, filled in once the trainer has loaded.
pub const ENEMY_TRAINER_NAME: Field = Field::wram("enemy trainer name", 0xD04A, NAME_LENGTH);
/// Nicknames of the player party.
pub const PARTY_NICKNAMES: Field =
    Field::wram("party nicknames", 0xD2B5, NAME_LENGTH * PARTY_LENGTH);
/// Original-trainer names of the player party.
pub const PARTY_MON_OT: Field =
    Field::wram("party OT names", 0xD273, NAME_LENGTH * PARTY_LENGTH);
/// Original-trainer names of the enemy party.
pub const ENEMY_MON_OT: Field =
    Field::wram("enemy OT names", 0xD9AC, NAME_LENGTH * PARTY_LENGTH);

// Trainer selection

/// Class of the trainer being fought.
pub const TRAINER_CLASS: Field = Field::wram("trainer class", 0xD059, 1);
/// Trainer class minus [`TRAINER_CLASS_ID_BASE`], used by the AI routines.
pub const TRAINER_CLASS_WITHOUT_OFFSET: Field =
    Field::wram("trainer class without offset", 0xD031, 1);
/// Which instance of the trainer class is fought.
pub const TRAINER_INSTANCE: Field = Field::wram("trainer instance", 0xD05D, 1);
/// Number of special moves for trainers with a lone signature move.
pub const LONE_ATTACK_NO: Field = Field::wram("lone attack number", 0xD05C, 1);

// Parties

/// Player party member count.
pub const PARTY_COUNT: Field = Field::wram("party count", 0xD163, 1);
/// Enemy party member count.
pub const ENEMY_PARTY_COUNT: Field = Field::wram("enemy party count", 0xD89C, 1);
/// Player party species list.
pub const PARTY_MON_LIST: Field = Field::wram("party species list", 0xD164, PARTY_LIST_LENGTH);
/// Enemy party species list.
pub const ENEMY_PARTY_MON_LIST: Field =
    Field::wram("enemy party species list", 0xD89D, PARTY_LIST_LENGTH);
/// Player party member records.
pub const PARTY_MONS: Field =
    Field::wram("party members", 0xD16B, PARTY_STRUCT_SIZE * PARTY_LENGTH);
/// Enemy party member records.
pub const ENEMY_PARTY_MONS: Field =
    Field::wram("enemy party members", 0xD8A4, PARTY_STRUCT_SIZE * PARTY_LENGTH);
/// HP of the first player party member; step by [`PARTY_STRUCT_SIZE`].
pub const PARTY_MON_HP: Field = Field::wram("party member HP", 0xD16C, 2);

// Active battlers

/// Player's active battler.
pub const BATTLE_MON: Field = Field::wram("battle mon", 0xD014, BATTLE_MON_SIZE);
/// Enemy's active battler.
pub const ENEMY_BATTLE_MON: Field = Field::wram("enemy battle mon", 0xCFE5, BATTLE_MON_SIZE);
/// Player battler current HP.
pub const BATTLE_MON_HP: Field = Field::wram("battle mon HP", 0xD015, 2);
/// Party slot the player battler came from.
pub const BATTLE_MON_PARTY_POS: Field = Field::wram("battle mon party position", 0xD017, 1);
/// Player battler move ids.
pub const BATTLE_MON_MOVES: Field = Field::wram("battle mon moves", 0xD01C, MOVE_SLOTS);
/// Player battler speed stat.
pub const BATTLE_MON_SPEED: Field = Field::wram("battle mon speed", 0xD029, 2);
/// Player battler remaining PP per move.
pub const BATTLE_MON_PP: Field = Field::wram("battle mon PP", 0xD02D, MOVE_SLOTS);

/// Move chosen by the player this turn.
pub const PLAYER_SELECTED_MOVE: Field = Field::wram("player selected move", 0xCCDC, 1);
/// Move chosen by the enemy AI this turn.
pub const ENEMY_SELECTED_MOVE: Field = Field::wram("enemy selected move", 0xCCDD, 1);
/// Disabled move of the player battler.
pub const DISABLED_MOVE: Field = Field::wram("disabled move", 0xD06D, 1);
/// Disabled move of the enemy battler.
pub const ENEMY_DISABLED_MOVE: Field = Field::wram("enemy disabled move", 0xD072, 1);
/// Item the enemy AI decided to use, zero for none.
pub const ENEMY_ITEM_USED: Field = Field::wram("enemy item used", 0xCF05, 1);
/// Remaining item uses allowed to the AI.
pub const AI_ACTION_COUNT: Field = Field::wram("AI action count", 0xCCDF, 1);
/// Cursor position in the move menu.
pub const MOVE_LIST_INDEX: Field = Field::wram("move list index", 0xCC2E, 1);

// Bag

/// Number of distinct items in the bag.
pub const BAG_ITEM_COUNT: Field = Field::wram("bag item count", 0xD31D, 1);
/// First bag entry: item id, quantity, list terminator.
pub const BAG_ITEMS: Field = Field::wram("bag items", 0xD31E, 3);

// Emulator registers

/// CPU program counter, little-endian.
pub const PROGRAM_COUNTER: Field = Field::header("program counter", 0xDA, 2);
/// Divider register state feeding the game's RNG.
pub const RNG_DIVISOR: Field = Field::header("RNG divisor", 0x220, 3);
/// Clock cycles since power-on, little-endian.
pub const TOTAL_CLOCKS: Field = Field::header("total clocks", 0x232, 8);

/// Smallest state file that holds every field above.
pub const SNAPSHOT_MIN_LEN: usize = match ENEMY_MON_OT.end() {
    Some(end) => end,
    None => panic!("enemy OT names lie below work RAM"),
};

/// Program addresses the driver stops on.
pub mod pc {
    /// The battle menu (FIGHT/PKMN/ITEM/RUN) is about to be drawn.
    pub const DISPLAY_BATTLE_MENU: u16 = 0x4EB6;
    /// The party menu was opened, voluntarily or after a faint.
    pub const PARTY_MENU_INIT: u16 = 0x1420;
    /// The player-side trainer won.
    pub const TRAINER_WIN: u16 = 0x4696;
    /// The enemy trainer won.
    pub const ENEMY_WIN: u16 = 0x4837;
    /// The AI has written its move or item choice.
    pub const AI_DECISION: u16 = 0x4349;
    /// The AI took the switch-Pokémon branch.
    pub const SWITCH_CALL: u16 = 0x6765;
}

/// Data addresses watched with access breakpoints.
pub mod watch {
    /// Written once the enemy trainer's data has loaded.
    pub const TRAINER_LOADED: u16 = 0xDA44;
    /// Read when the AI checks its item slot.
    pub const ENEMY_ITEM_USED: u16 = 0xCF05;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::Snapshot;

    #[test]
    fn test_min_len_covers_every_field() {
        let fields = [
            PLAYER_NAME,
            ENEMY_TRAINER_NAME,
            PARTY_NICKNAMES,
            PARTY_MON_OT,
            ENEMY_MON_OT,
            PARTY_MONS,
            ENEMY_PARTY_MONS,
            BAG_ITEMS,
            TOTAL_CLOCKS,
            RNG_DIVISOR,
        ];
        let snap = Snapshot::blank();
        for field in fields {
            assert!(field.end().unwrap() <= SNAPSHOT_MIN_LEN, "{} overflows", field.name);
            assert!(snap.read(field).is_ok());
        }
    }

    #[test]
    fn test_battle_mon_subfields_inside_struct() {
        for field in [
            BATTLE_MON_HP,
            BATTLE_MON_PARTY_POS,
            BATTLE_MON_MOVES,
            BATTLE_MON_SPEED,
        ] {
            assert!(field.index() >= BATTLE_MON.index());
            assert!(field.end() <= BATTLE_MON.end(), "{} escapes", field.name);
        }
        // PP runs one byte past the mirrored part of the struct
        assert!(BATTLE_MON_PP.index() < BATTLE_MON.end());
    }

    #[test]
    fn test_party_hp_inside_first_record() {
        assert_eq!(PARTY_MON_HP.index(), PARTY_MONS.index().map(|i| i + 1));
    }

    #[test]
    fn test_party_records_end_at_ot_names() {
        assert_eq!(PARTY_MONS.end(), PARTY_MON_OT.index());
        assert_eq!(ENEMY_PARTY_MONS.end(), ENEMY_MON_OT.index());
        assert_eq!(PARTY_MONS.element(5, PARTY_STRUCT_SIZE).end(), PARTY_MON_OT.index());
    }
}
