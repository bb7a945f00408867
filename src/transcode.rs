//! Snapshot transcoding between the player and enemy perspectives.
//!
//! The game only ever runs its trainer AI for the enemy side. To learn what
//! the player-side trainer would do, the battle is copied into a scratch
//! state with the two sides exchanged, and the AI is run there.

use crate::data::{GameData, Trainer, TrainerInstance};
use crate::error::LayoutError;
use crate::memory::layout::{
    AI_ACTION_COUNT, BATTLE_MON, BATTLE_MON_SIZE, BATTLE_MON_SPEED, DISABLED_MOVE,
    ENEMY_BATTLE_MON, ENEMY_DISABLED_MOVE, ENEMY_ITEM_USED, ENEMY_PARTY_COUNT,
    ENEMY_PARTY_MON_LIST, ENEMY_PARTY_MONS, ENEMY_TRAINER_NAME, LONE_ATTACK_NO, NAME_LENGTH,
    NAME_TERMINATOR, PARTY_COUNT, PARTY_MON_LIST, PARTY_MON_OT, PARTY_MONS, PARTY_NICKNAMES,
    PARTY_STRUCT_SIZE, PLAYER_NAME, PLAYER_SELECTED_MOVE, RNG_DIVISOR, TRAINER_CLASS,
    TRAINER_CLASS_ID_BASE, TRAINER_CLASS_WITHOUT_OFFSET, TRAINER_INSTANCE,
};
use crate::memory::{Field, Snapshot};
use crate::text::TextError;
use rand::Rng;
use thiserror::Error;

/// Item uses granted to the AI on every query.
pub const AI_ACTIONS: u8 = 3;

/// Player-slot / enemy-slot field pairs exchanged by [`swap_sides`].
///
/// The battle mon copy leaves out the struct's last byte.
pub const SWAPPED_FIELDS: [(Field, Field); 5] = [
    (
        BATTLE_MON.prefix(BATTLE_MON_SIZE - 1),
        ENEMY_BATTLE_MON.prefix(BATTLE_MON_SIZE - 1),
    ),
    (PARTY_COUNT, ENEMY_PARTY_COUNT),
    (DISABLED_MOVE, ENEMY_DISABLED_MOVE),
    (PARTY_MON_LIST, ENEMY_PARTY_MON_LIST),
    (PARTY_MONS, ENEMY_PARTY_MONS),
];

/// Errors building a battle state.
#[derive(Debug, Error)]
pub enum TranscodeError {
    /// A field access failed.
    #[error(transparent)]
    Layout(#[from] LayoutError),
    /// A name could not be encoded.
    #[error(transparent)]
    Text(#[from] TextError),
    /// A party member's species has no name to use as nickname.
    #[error("no name for species {0:#04x}")]
    UnknownSpecies(u8),
}

/// Copy `source`'s player slots into `dest`'s enemy slots and vice versa.
///
/// Applying this twice through a third snapshot restores the starting
/// values of every field in [`SWAPPED_FIELDS`]. `source` is never modified.
///
/// # Errors
///
/// Returns a [`LayoutError`] if either snapshot is too small.
pub fn swap_sides(source: &Snapshot, dest: &mut Snapshot) -> Result<(), LayoutError> {
    for (player, enemy) in SWAPPED_FIELDS {
        dest.copy_from(enemy, source, player)?;
        dest.copy_from(player, source, enemy)?;
    }
    Ok(())
}

/// Build the AI query state for the player-side trainer.
///
/// Starts from a fresh copy of `ai_base`, swaps the sides of `battle` into
/// it, and removes everything that would make the AI answer for the wrong
/// situation: the (now player-side) opponent never outspeeds, has picked
/// `neutral_move`, and no item is pending. The RNG divisor is re-rolled from
/// `rng` so repeated queries do not share random state.
///
/// # Errors
///
/// Returns a [`LayoutError`] if either snapshot is too small.
pub fn mirror_for_ai<R: Rng>(
    battle: &Snapshot,
    ai_base: &Snapshot,
    actor_class: u8,
    neutral_move: u8,
    rng: &mut R,
) -> Result<Snapshot, LayoutError> {
    let mut ai = ai_base.clone();
    swap_sides(battle, &mut ai)?;

    ai.write_u8(TRAINER_CLASS, actor_class)?;
    ai.write_u8(
        TRAINER_CLASS_WITHOUT_OFFSET,
        actor_class.wrapping_sub(TRAINER_CLASS_ID_BASE),
    )?;

    ai.write(BATTLE_MON_SPEED, &[0, 0])?;
    ai.write_u8(PLAYER_SELECTED_MOVE, neutral_move)?;
    ai.write_u8(ENEMY_ITEM_USED, 0)?;
    ai.write_u8(AI_ACTION_COUNT, AI_ACTIONS)?;

    let mut divisor = [0u8; RNG_DIVISOR.len];
    rng.fill(&mut divisor[..]);
    ai.write(RNG_DIVISOR, &divisor)?;

    Ok(ai)
}

/// State used to make the game load `trainer`'s party into the enemy slots.
///
/// # Errors
///
/// Returns a [`LayoutError`] if `base` is too small.
pub fn trainer_query(
    base: &Snapshot,
    trainer: &Trainer,
    instance: &TrainerInstance,
) -> Result<Snapshot, LayoutError> {
    let mut query = base.clone();
    query.write_u8(TRAINER_CLASS, trainer.id)?;
    query.write_u8(TRAINER_INSTANCE, instance.index)?;
    query.write_u8(LONE_ATTACK_NO, instance.lone_moves.unwrap_or(0))?;
    Ok(query)
}

/// Turn `base` into the opening state of the battle.
///
/// `loaded` is the result of running [`trainer_query`] for the player-side
/// trainer: its enemy slots hold that trainer's name and party, which are
/// moved into the player slots here. The fight itself is set up against
/// `enemy`.
///
/// # Errors
///
/// Returns an error if a field is out of range, the loaded party is larger
/// than six, or a nickname cannot be encoded.
pub fn compose_battle(
    loaded: &Snapshot,
    base: &mut Snapshot,
    data: &GameData,
    enemy: &Trainer,
    enemy_instance: &TrainerInstance,
) -> Result<(), TranscodeError> {
    let name_chars = NAME_LENGTH - 1;
    base.copy_from(
        PLAYER_NAME.prefix(name_chars),
        loaded,
        ENEMY_TRAINER_NAME.prefix(name_chars),
    )?;
    base.write_u8(PLAYER_NAME.slice(name_chars, 1), NAME_TERMINATOR)?;

    base.copy_from(PARTY_COUNT, loaded, ENEMY_PARTY_COUNT)?;
    base.copy_from(PARTY_MON_LIST, loaded, ENEMY_PARTY_MON_LIST)?;
    base.copy_from(PARTY_MONS, loaded, ENEMY_PARTY_MONS)?;

    let party_size = loaded.party_count(ENEMY_PARTY_COUNT)?;
    for slot in 0..party_size {
        let species = loaded.read_u8(ENEMY_PARTY_MONS.element(slot, PARTY_STRUCT_SIZE))?;
        let name = data
            .species
            .name_of(species)
            .ok_or(TranscodeError::UnknownSpecies(species))?;
        let nickname = data.charmap.encode_name(name, NAME_LENGTH)?;
        base.write(PARTY_NICKNAMES.element(slot, NAME_LENGTH), &nickname)?;
        base.copy_from(
            PARTY_MON_OT.element(slot, NAME_LENGTH),
            loaded,
            ENEMY_TRAINER_NAME,
        )?;
    }

    base.write_u8(TRAINER_CLASS, enemy.id)?;
    base.write_u8(TRAINER_INSTANCE, enemy_instance.index)?;
    if let Some(lone_moves) = enemy_instance.lone_moves {
        base.write_u8(LONE_ATTACK_NO, lone_moves)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Dictionary, PartyEntry, Roster, SpeciesNames};
    use crate::text::Charmap;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use std::collections::HashMap;

    fn patterned() -> Snapshot {
        let mut snap = Snapshot::blank();
        for (i, (player, enemy)) in SWAPPED_FIELDS.iter().enumerate() {
            let p: Vec<u8> = (0..player.len).map(|j| (i * 16 + j) as u8).collect();
            let e: Vec<u8> = (0..enemy.len).map(|j| (0x80 + i * 16 + j) as u8).collect();
            snap.write(*player, &p).unwrap();
            snap.write(*enemy, &e).unwrap();
        }
        snap
    }

    #[test]
    fn test_swap_exchanges_sides() {
        let source = patterned();
        let mut dest = Snapshot::blank();
        swap_sides(&source, &mut dest).unwrap();
        for (player, enemy) in SWAPPED_FIELDS {
            assert_eq!(dest.read(enemy).unwrap(), source.read(player).unwrap());
            assert_eq!(dest.read(player).unwrap(), source.read(enemy).unwrap());
        }
    }

    #[test]
    fn test_swap_twice_restores() {
        let source = patterned();
        let mut once = Snapshot::blank();
        swap_sides(&source, &mut once).unwrap();
        let mut twice = Snapshot::blank();
        swap_sides(&once, &mut twice).unwrap();
        for (player, enemy) in SWAPPED_FIELDS {
            assert_eq!(twice.read(player).unwrap(), source.read(player).unwrap());
            assert_eq!(twice.read(enemy).unwrap(), source.read(enemy).unwrap());
        }
    }

    #[test]
    fn test_mirror_neutralizes() {
        let battle = patterned();
        let before = battle.clone();
        let ai_base = Snapshot::blank();
        let mut rng = SmallRng::seed_from_u64(3);

        let ai = mirror_for_ai(&battle, &ai_base, 229, 0x44, &mut rng).unwrap();

        assert_eq!(battle, before, "battle state must not change");
        assert_eq!(ai.read_u8(TRAINER_CLASS).unwrap(), 229);
        assert_eq!(ai.read_u8(TRAINER_CLASS_WITHOUT_OFFSET).unwrap(), 29);
        assert_eq!(ai.read(BATTLE_MON_SPEED).unwrap(), &[0, 0]);
        assert_eq!(ai.read_u8(PLAYER_SELECTED_MOVE).unwrap(), 0x44);
        assert_eq!(ai.read_u8(ENEMY_ITEM_USED).unwrap(), 0);
        assert_eq!(ai.read_u8(AI_ACTION_COUNT).unwrap(), AI_ACTIONS);
        // Player battler became the enemy battler
        assert_eq!(
            ai.read(ENEMY_BATTLE_MON.prefix(4)).unwrap(),
            battle.read(BATTLE_MON.prefix(4)).unwrap()
        );
    }

    #[test]
    fn test_mirror_divisor_follows_rng() {
        let battle = patterned();
        let ai_base = Snapshot::blank();

        let a = mirror_for_ai(&battle, &ai_base, 201, 0x44, &mut SmallRng::seed_from_u64(9)).unwrap();
        let b = mirror_for_ai(&battle, &ai_base, 201, 0x44, &mut SmallRng::seed_from_u64(9)).unwrap();
        assert_eq!(a.read(RNG_DIVISOR).unwrap(), b.read(RNG_DIVISOR).unwrap());

        let mut rng = SmallRng::seed_from_u64(9);
        let first = mirror_for_ai(&battle, &ai_base, 201, 0x44, &mut rng).unwrap();
        let second = mirror_for_ai(&battle, &ai_base, 201, 0x44, &mut rng).unwrap();
        assert_ne!(
            first.read(RNG_DIVISOR).unwrap(),
            second.read(RNG_DIVISOR).unwrap()
        );
    }

    fn game_data() -> GameData {
        let mut glyphs = HashMap::new();
        for (i, ch) in ('A'..='Z').enumerate() {
            glyphs.insert(0x80 + i as u8, ch.to_string());
        }
        let mut species = HashMap::new();
        species.insert(0, "RHYDON".to_string());
        species.insert(0x23, "PIDGEY".to_string());
        GameData {
            charmap: Charmap::new(glyphs),
            moves: Dictionary::default(),
            items: Dictionary::default(),
            species: SpeciesNames::new(species),
            roster: Roster::default(),
        }
    }

    fn lorelei() -> (Trainer, TrainerInstance) {
        let instance = TrainerInstance {
            index: 1,
            location: "Indigo Plateau".to_string(),
            party: vec![PartyEntry {
                level: 54,
                species: "DEWGONG".to_string(),
            }],
            lone_moves: Some(2),
        };
        let trainer = Trainer {
            id: 244,
            class: "LORELEI".to_string(),
            instances: vec![instance.clone()],
        };
        (trainer, instance)
    }

    #[test]
    fn test_trainer_query_sets_selection() {
        let (trainer, instance) = lorelei();
        let query = trainer_query(&Snapshot::blank(), &trainer, &instance).unwrap();
        assert_eq!(query.read_u8(TRAINER_CLASS).unwrap(), 244);
        assert_eq!(query.read_u8(TRAINER_INSTANCE).unwrap(), 1);
        assert_eq!(query.read_u8(LONE_ATTACK_NO).unwrap(), 2);
    }

    #[test]
    fn test_compose_battle() {
        let data = game_data();
        let (enemy, enemy_instance) = lorelei();

        let mut loaded = Snapshot::blank();
        let name = data.charmap.encode_name("BROCK", NAME_LENGTH).unwrap();
        loaded.write(ENEMY_TRAINER_NAME, &name).unwrap();
        loaded.write_u8(ENEMY_PARTY_COUNT, 2).unwrap();
        loaded
            .write(ENEMY_PARTY_MON_LIST, &[0x01, 0x24, 0xFF, 0, 0, 0, 0])
            .unwrap();
        loaded
            .write_u8(ENEMY_PARTY_MONS.element(0, PARTY_STRUCT_SIZE), 0x01)
            .unwrap();
        loaded
            .write_u8(ENEMY_PARTY_MONS.element(1, PARTY_STRUCT_SIZE), 0x24)
            .unwrap();

        let mut base = Snapshot::blank();
        compose_battle(&loaded, &mut base, &data, &enemy, &enemy_instance).unwrap();

        assert_eq!(data.charmap.decode_name(base.read(PLAYER_NAME).unwrap()), "BROCK");
        assert_eq!(base.read_u8(PARTY_COUNT).unwrap(), 2);
        assert_eq!(
            base.read(PARTY_MON_LIST).unwrap(),
            loaded.read(ENEMY_PARTY_MON_LIST).unwrap()
        );
        let nick = base.read(PARTY_NICKNAMES.element(1, NAME_LENGTH)).unwrap();
        assert_eq!(data.charmap.decode_name(nick), "PIDGEY");
        let ot = base.read(PARTY_MON_OT.element(0, NAME_LENGTH)).unwrap();
        assert_eq!(data.charmap.decode_name(ot), "BROCK");
        assert_eq!(base.read_u8(TRAINER_CLASS).unwrap(), 244);
        assert_eq!(base.read_u8(LONE_ATTACK_NO).unwrap(), 2);
    }

    #[test]
    fn test_compose_names_every_member() {
        let data = game_data();
        let (enemy, enemy_instance) = lorelei();

        let mut loaded = Snapshot::blank();
        loaded.write_u8(ENEMY_PARTY_COUNT, 2).unwrap();
        // Records are 0x2C bytes apart
        loaded.write_u8(ENEMY_PARTY_MONS.slice(0, 1), 0x01).unwrap();
        loaded.write_u8(ENEMY_PARTY_MONS.slice(0x2C, 1), 0x24).unwrap();

        let mut base = Snapshot::blank();
        compose_battle(&loaded, &mut base, &data, &enemy, &enemy_instance).unwrap();

        let nick = base.read(PARTY_NICKNAMES.element(1, NAME_LENGTH)).unwrap();
        assert_eq!(data.charmap.decode_name(nick), "PIDGEY");
        assert_eq!(base.read_u8(PARTY_MONS.slice(0x2C, 1)).unwrap(), 0x24);
    }

    #[test]
    fn test_compose_rejects_unknown_species() {
        let data = game_data();
        let (enemy, enemy_instance) = lorelei();
        let mut loaded = Snapshot::blank();
        loaded.write_u8(ENEMY_PARTY_COUNT, 1).unwrap();
        loaded.write_u8(ENEMY_PARTY_MONS.prefix(1), 0x99).unwrap();

        let mut base = Snapshot::blank();
        let err = compose_battle(&loaded, &mut base, &data, &enemy, &enemy_instance).unwrap_err();
        assert!(matches!(err, TranscodeError::UnknownSpecies(0x99)));
    }
}
