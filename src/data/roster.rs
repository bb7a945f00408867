//! Trainer roster.

use super::DataError;
use crate::memory::layout::TRAINER_CLASS_ID_BASE;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// One Pokémon in a trainer's party.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyEntry {
    /// Level.
    pub level: u8,
    /// Species name.
    pub species: String,
}

/// A concrete trainer of some class, with a fixed party.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainerInstance {
    /// Instance number as the game counts it (1-based).
    pub index: u8,
    /// Where the trainer is met; empty if nowhere in particular.
    #[serde(default)]
    pub location: String,
    /// Party in order.
    pub party: Vec<PartyEntry>,
    /// Special-move count for trainers whose party has a signature move.
    #[serde(rename = "loneMoves", default, skip_serializing_if = "Option::is_none")]
    pub lone_moves: Option<u8>,
}

/// A trainer class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trainer {
    /// Class id as stored in the trainer class byte.
    pub id: u8,
    /// Display name of the class.
    pub class: String,
    /// Known instances of the class.
    pub instances: Vec<TrainerInstance>,
}

impl Trainer {
    /// Human-readable summary, e.g. "a YOUNGSTER from Route 3 who has a
    /// level 11 RATTATA (class id: 201, instance number: 1)".
    #[must_use]
    pub fn describe(&self, instance: &TrainerInstance) -> String {
        let location = if instance.location.is_empty() {
            "somewhere"
        } else {
            instance.location.as_str()
        };
        let party = instance
            .party
            .iter()
            .map(|p| format!("level {} {}", p.level, p.species))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "a {} from {location} who has a {party} (class id: {}, instance number: {})",
            self.class, self.id, instance.index
        )
    }
}

/// Every trainer class the game defines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    trainers: Vec<Trainer>,
}

impl Roster {
    /// Build from a list of classes.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::InvalidClassId`] if a class id sits below the
    /// class-id base.
    pub fn new(trainers: Vec<Trainer>) -> Result<Self, DataError> {
        if let Some(bad) = trainers.iter().find(|t| t.id < TRAINER_CLASS_ID_BASE) {
            return Err(DataError::InvalidClassId(bad.id));
        }
        Ok(Self { trainers })
    }

    /// Parse `trainers.json`.
    ///
    /// # Errors
    ///
    /// Returns an error on malformed JSON or invalid class ids.
    pub fn from_json(json: &str) -> Result<Self, DataError> {
        let trainers: Vec<Trainer> =
            serde_json::from_str(json).map_err(|source| DataError::Json {
                name: super::TRAINERS_FILE.to_string(),
                source,
            })?;
        Self::new(trainers)
    }

    /// All classes in file order.
    #[must_use]
    pub fn trainers(&self) -> &[Trainer] {
        &self.trainers
    }

    /// Look up class `id` and its `index`-th instance (1-based position).
    ///
    /// # Errors
    ///
    /// Returns [`DataError::UnknownTrainer`] or [`DataError::UnknownInstance`].
    pub fn find(&self, id: u8, index: u8) -> Result<(&Trainer, &TrainerInstance), DataError> {
        let trainer = self
            .trainers
            .iter()
            .find(|t| t.id == id)
            .ok_or(DataError::UnknownTrainer(id))?;
        let instance = usize::from(index)
            .checked_sub(1)
            .and_then(|i| trainer.instances.get(i))
            .ok_or(DataError::UnknownInstance { id, index })?;
        Ok((trainer, instance))
    }

    /// Pick a class uniformly, then one of its instances uniformly.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::EmptyRoster`] if there is nothing to pick.
    pub fn random<R: Rng>(&self, rng: &mut R) -> Result<(&Trainer, &TrainerInstance), DataError> {
        let trainer = self.trainers.choose(rng).ok_or(DataError::EmptyRoster)?;
        let instance = trainer
            .instances
            .choose(rng)
            .ok_or(DataError::UnknownInstance {
                id: trainer.id,
                index: 1,
            })?;
        Ok((trainer, instance))
    }
}
