//! The player registry — a single JSON array of known players.
//!
//! Append-only through this API; scores recorded here are whatever the
//! registry was seeded with. Keeping them in sync with tournament play is a
//! policy decision left to the caller.

use std::fs;
use std::path::PathBuf;

use tracing::debug;

use crate::models::PlayerId;

use super::{PlayerRecord, StorageConfig, StorageError};

/// Sort criteria for registry listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerSort {
    #[default]
    Identifier,
    Surname,
    Score,
}

/// Store for the durable player collection.
pub struct PlayerRegistry {
    path: PathBuf,
}

impl PlayerRegistry {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            path: config.players_path(),
        }
    }

    /// Open a registry at an explicit path.
    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    fn read(&self) -> Result<Vec<PlayerRecord>, StorageError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let json = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&json)?)
    }

    fn write(&self, records: &[PlayerRecord]) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(records)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        debug!("Wrote {} players to {:?}", records.len(), self.path);
        Ok(())
    }

    /// Look up a player by national identifier.
    pub fn find(&self, id: &PlayerId) -> Result<Option<PlayerRecord>, StorageError> {
        let records = self.read()?;
        Ok(records.into_iter().find(|r| r.identifier == *id))
    }

    /// Look up a player, treating absence as an error.
    pub fn require(&self, id: &PlayerId) -> Result<PlayerRecord, StorageError> {
        self.find(id)?
            .ok_or_else(|| StorageError::PlayerNotFound(id.clone()))
    }

    /// Append a new player. Duplicate identifiers are rejected.
    pub fn add(&self, record: PlayerRecord) -> Result<(), StorageError> {
        let mut records = self.read()?;
        if records.iter().any(|r| r.identifier == record.identifier) {
            return Err(StorageError::DuplicatePlayer(record.identifier));
        }
        records.push(record);
        self.write(&records)
    }

    /// List all registered players sorted by the given criterion. Score
    /// sorts descending by default elsewhere, so `descending` applies to any
    /// criterion uniformly here.
    pub fn list(
        &self,
        sort: PlayerSort,
        descending: bool,
    ) -> Result<Vec<PlayerRecord>, StorageError> {
        let mut records = self.read()?;
        match sort {
            PlayerSort::Identifier => records.sort_by(|a, b| a.identifier.cmp(&b.identifier)),
            PlayerSort::Surname => records.sort_by(|a, b| a.surname.cmp(&b.surname)),
            PlayerSort::Score => records.sort_by(|a, b| a.score.total_cmp(&b.score)),
        }
        if descending {
            records.reverse();
        }
        Ok(records)
    }
}
