//! JSON persistence.
//!
//! Two durable collections under the data directory:
//! - one JSON file per tournament under `tournaments/`, keyed by name
//! - a single `players.json` registry file

use std::path::PathBuf;

use thiserror::Error;

use crate::models::PlayerId;

mod record;
mod registry;
mod tournaments;

pub use record::*;
pub use registry::*;
pub use tournaments::*;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Record(#[from] RecordError),

    #[error("no saved tournament named {0:?}")]
    TournamentNotFound(String),

    #[error("invalid tournament name {0:?}")]
    InvalidName(String),

    #[error("no registered player with identifier {0}")]
    PlayerNotFound(PlayerId),

    #[error("player {0} is already in the registry")]
    DuplicatePlayer(PlayerId),
}

/// Configuration for storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn tournaments_dir(&self) -> PathBuf {
        self.data_dir.join("tournaments")
    }

    pub fn players_path(&self) -> PathBuf {
        self.data_dir.join("players.json")
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./data"))
    }
}
