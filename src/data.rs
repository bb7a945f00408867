//! Reference data: character map, name dictionaries and the trainer roster.
//!
//! Everything here is loaded once at startup into a [`GameData`] and shared
//! by reference. Nothing mutates it afterwards.

mod roster;

pub use roster::{PartyEntry, Roster, Trainer, TrainerInstance};

use crate::memory::layout::TRAINER_CLASS_ID_BASE;
use crate::text::Charmap;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Character map file name inside the data directory.
pub const CHARMAP_FILE: &str = "charmap.json";
/// Move dictionary file name.
pub const MOVES_FILE: &str = "moves.json";
/// Item dictionary file name.
pub const ITEMS_FILE: &str = "items.json";
/// Species name table file name.
pub const SPECIES_FILE: &str = "pokemon_names.json";
/// Trainer roster file name.
pub const TRAINERS_FILE: &str = "trainers.json";

/// Errors loading or querying reference data.
#[derive(Debug, Error)]
pub enum DataError {
    /// A data file could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// A data file is not valid JSON of the expected shape.
    #[error("failed to parse {name}: {source}")]
    Json {
        /// Which table was being parsed.
        name: String,
        /// Underlying error.
        source: serde_json::Error,
    },
    /// A dictionary key is not a valid byte value.
    #[error("invalid key {key:?} in {name}")]
    BadKey {
        /// Which table was being parsed.
        name: String,
        /// The offending key.
        key: String,
    },
    /// No trainer class with this id.
    #[error("trainer class {0} not found")]
    UnknownTrainer(u8),
    /// The trainer class has no instance at this position.
    #[error("trainer class {id} has no instance {index}")]
    UnknownInstance {
        /// Trainer class id.
        id: u8,
        /// Requested 1-based instance number.
        index: u8,
    },
    /// A trainer class id below the class-id base.
    #[error("trainer class id {0} is below {base}", base = TRAINER_CLASS_ID_BASE)]
    InvalidClassId(u8),
    /// A move name the driver relies on is missing from the dictionary.
    #[error("move {0:?} missing from the move table")]
    UnknownMove(String),
    /// The roster has no trainers to pick from.
    #[error("trainer roster is empty")]
    EmptyRoster,
}

/// An immutable id ⇄ name table keyed by a single byte.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    names: HashMap<u8, String>,
    ids: HashMap<String, u8>,
}

impl Dictionary {
    /// Build from id → name pairs.
    #[must_use]
    pub fn new(names: HashMap<u8, String>) -> Self {
        let ids = names.iter().map(|(&id, n)| (n.clone(), id)).collect();
        Self { names, ids }
    }

    /// Parse a JSON object whose keys are hexadecimal byte values.
    ///
    /// # Errors
    ///
    /// Returns an error on malformed JSON or non-byte keys.
    pub fn from_hex_json(name: &str, json: &str) -> Result<Self, DataError> {
        Ok(Self::new(parse_hex_table(name, json)?))
    }

    /// Name for an id, if known.
    #[must_use]
    pub fn get(&self, id: u8) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    /// Name for display; unknown ids render as `[0x..]`.
    #[must_use]
    pub fn render(&self, id: u8) -> String {
        self.get(id)
            .map_or_else(|| format!("[0x{id:x}]"), str::to_string)
    }

    /// Id for a name, if known.
    #[must_use]
    pub fn id_of(&self, name: &str) -> Option<u8> {
        self.ids.get(name).copied()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Species names, indexed by internal species id minus one.
#[derive(Debug, Clone, Default)]
pub struct SpeciesNames {
    names: HashMap<u16, String>,
}

impl SpeciesNames {
    /// Build from a zero-based index → name table.
    #[must_use]
    pub fn new(names: HashMap<u16, String>) -> Self {
        Self { names }
    }

    /// Parse a JSON object with decimal keys.
    ///
    /// # Errors
    ///
    /// Returns an error on malformed JSON or non-numeric keys.
    pub fn from_json(json: &str) -> Result<Self, DataError> {
        let raw: HashMap<String, String> =
            serde_json::from_str(json).map_err(|source| DataError::Json {
                name: SPECIES_FILE.to_string(),
                source,
            })?;
        let mut names = HashMap::with_capacity(raw.len());
        for (key, value) in raw {
            let index = key.trim().parse::<u16>().map_err(|_| DataError::BadKey {
                name: SPECIES_FILE.to_string(),
                key: key.clone(),
            })?;
            names.insert(index, value);
        }
        Ok(Self { names })
    }

    /// Name of the species stored as `species` in a party record.
    #[must_use]
    pub fn name_of(&self, species: u8) -> Option<&str> {
        let index = u16::from(species).checked_sub(1)?;
        self.names.get(&index).map(String::as_str)
    }
}

/// All lookup tables for one run.
#[derive(Debug, Clone, Default)]
pub struct GameData {
    /// In-game character set.
    pub charmap: Charmap,
    /// Move id ⇄ name.
    pub moves: Dictionary,
    /// Item id ⇄ name.
    pub items: Dictionary,
    /// Species names.
    pub species: SpeciesNames,
    /// Trainer classes and their instances.
    pub roster: Roster,
}

impl GameData {
    /// Load every table from `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if a file is missing or malformed, or if the roster
    /// fails validation.
    pub fn load(dir: &Path) -> Result<Self, DataError> {
        let charmap = Charmap::new(parse_hex_table(CHARMAP_FILE, &read(dir, CHARMAP_FILE)?)?);
        let moves = Dictionary::from_hex_json(MOVES_FILE, &read(dir, MOVES_FILE)?)?;
        let items = Dictionary::from_hex_json(ITEMS_FILE, &read(dir, ITEMS_FILE)?)?;
        let species = SpeciesNames::from_json(&read(dir, SPECIES_FILE)?)?;
        let roster = Roster::from_json(&read(dir, TRAINERS_FILE)?)?;

        log::debug!(
            "loaded {} moves, {} items, {} trainer classes from {}",
            moves.len(),
            items.len(),
            roster.trainers().len(),
            dir.display()
        );

        Ok(Self {
            charmap,
            moves,
            items,
            species,
            roster,
        })
    }

    /// Id of a move the driver needs by name.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::UnknownMove`] if the move table lacks it.
    pub fn require_move(&self, name: &str) -> Result<u8, DataError> {
        self.moves
            .id_of(name)
            .ok_or_else(|| DataError::UnknownMove(name.to_string()))
    }
}

fn read(dir: &Path, file: &str) -> Result<String, DataError> {
    let path = dir.join(file);
    fs::read_to_string(&path).map_err(|source| DataError::Io { path, source })
}

/// Parse `{"hex": "name"}` into a byte-keyed map. Accepts an optional `0x`.
fn parse_hex_table(name: &str, json: &str) -> Result<HashMap<u8, String>, DataError> {
    let raw: HashMap<String, String> =
        serde_json::from_str(json).map_err(|source| DataError::Json {
            name: name.to_string(),
            source,
        })?;
    let mut table = HashMap::with_capacity(raw.len());
    for (key, value) in raw {
        let digits = key
            .trim()
            .trim_start_matches("0x")
            .trim_start_matches("0X");
        let byte = u8::from_str_radix(digits, 16).map_err(|_| DataError::BadKey {
            name: name.to_string(),
            key: key.clone(),
        })?;
        table.insert(byte, value);
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_keys_with_and_without_prefix() {
        let dict = Dictionary::from_hex_json("moves", r#"{"0x44": "COUNTER", "a5": "STRUGGLE"}"#)
            .unwrap();
        assert_eq!(dict.get(0x44), Some("COUNTER"));
        assert_eq!(dict.get(0xA5), Some("STRUGGLE"));
        assert_eq!(dict.id_of("COUNTER"), Some(0x44));
    }

    #[test]
    fn test_bad_key_rejected() {
        let err = Dictionary::from_hex_json("items", r#"{"zz": "POTION"}"#).unwrap_err();
        assert!(matches!(err, DataError::BadKey { .. }));

        let err = Dictionary::from_hex_json("items", r#"{"100": "POTION"}"#).unwrap_err();
        assert!(matches!(err, DataError::BadKey { .. }));
    }

    #[test]
    fn test_render_placeholder() {
        let dict = Dictionary::from_hex_json("items", r#"{"0": "NOTHING"}"#).unwrap();
        assert_eq!(dict.render(0), "NOTHING");
        assert_eq!(dict.render(0x1f), "[0x1f]");
    }

    #[test]
    fn test_species_is_one_based() {
        let species = SpeciesNames::from_json(r#"{"0": "RHYDON", "1": "KANGASKHAN"}"#).unwrap();
        assert_eq!(species.name_of(1), Some("RHYDON"));
        assert_eq!(species.name_of(2), Some("KANGASKHAN"));
        assert_eq!(species.name_of(0), None);
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CHARMAP_FILE), r#"{"80": "A", "50": "@"}"#).unwrap();
        fs::write(dir.path().join(MOVES_FILE), r#"{"44": "COUNTER"}"#).unwrap();
        fs::write(dir.path().join(ITEMS_FILE), r#"{"00": "NOTHING"}"#).unwrap();
        fs::write(dir.path().join(SPECIES_FILE), r#"{"0": "RHYDON"}"#).unwrap();
        fs::write(
            dir.path().join(TRAINERS_FILE),
            r#"[{"id": 201, "class": "YOUNGSTER", "instances": [
                {"index": 1, "location": "Route 3", "party": [{"level": 11, "species": "RATTATA"}]}
            ]}]"#,
        )
        .unwrap();

        let data = GameData::load(dir.path()).unwrap();
        assert_eq!(data.require_move("COUNTER").unwrap(), 0x44);
        assert!(matches!(
            data.require_move("SPLASH"),
            Err(DataError::UnknownMove(_))
        ));
        assert_eq!(data.roster.trainers().len(), 1);
    }

    #[test]
    fn test_missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = GameData::load(dir.path()).unwrap_err();
        assert!(err.to_string().contains(CHARMAP_FILE));
    }
}
