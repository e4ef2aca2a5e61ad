//! Tournament files — one JSON document per tournament, keyed by name.

use std::fs;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::models::Tournament;

use super::{StorageConfig, StorageError, TournamentRecord};

/// Which saved tournaments to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TournamentFilter {
    #[default]
    All,
    /// End date not set yet
    Active,
    /// End date set
    Ended,
}

impl TournamentFilter {
    fn matches(&self, record: &TournamentRecord) -> bool {
        match self {
            TournamentFilter::All => true,
            TournamentFilter::Active => record.end_date.is_none(),
            TournamentFilter::Ended => record.end_date.is_some(),
        }
    }
}

/// Store for tournament aggregates.
pub struct TournamentStore {
    config: StorageConfig,
}

impl TournamentStore {
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, StorageError> {
        if name.is_empty() || name.contains(['/', '\\']) {
            return Err(StorageError::InvalidName(name.to_string()));
        }
        Ok(self.config.tournaments_dir().join(format!("{}.json", name)))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path_for(name).map(|p| p.exists()).unwrap_or(false)
    }

    /// Persist the whole aggregate, replacing any previous record atomically
    /// (write to a temp file, then rename over the target).
    pub fn save(&self, tournament: &Tournament) -> Result<(), StorageError> {
        let path = self.path_for(tournament.name())?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let record = TournamentRecord::from(tournament);
        let json = serde_json::to_string_pretty(&record)?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &path)?;

        debug!("Saved tournament to {:?}", path);
        Ok(())
    }

    /// Load a tournament by name. Malformed or inconsistent records surface
    /// as errors; nothing is silently dropped.
    pub fn load(&self, name: &str) -> Result<Tournament, StorageError> {
        let path = self.path_for(name)?;
        if !path.exists() {
            return Err(StorageError::TournamentNotFound(name.to_string()));
        }

        let json = fs::read_to_string(&path)?;
        let record: TournamentRecord = serde_json::from_str(&json)?;
        let tournament = Tournament::try_from(record)?;

        debug!("Loaded tournament from {:?}", path);
        Ok(tournament)
    }

    /// Delete a saved tournament file.
    pub fn delete(&self, name: &str) -> Result<(), StorageError> {
        let path = self.path_for(name)?;
        if !path.exists() {
            return Err(StorageError::TournamentNotFound(name.to_string()));
        }
        fs::remove_file(&path)?;
        Ok(())
    }

    /// List saved tournament records, sorted by name. Unparseable files are
    /// skipped with a warning so one corrupt record does not hide the rest.
    pub fn list(&self, filter: TournamentFilter) -> Result<Vec<TournamentRecord>, StorageError> {
        let dir = self.config.tournaments_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let json = fs::read_to_string(&path)?;
            match serde_json::from_str::<TournamentRecord>(&json) {
                Ok(record) => {
                    if filter.matches(&record) {
                        records.push(record);
                    }
                }
                Err(e) => {
                    warn!("Skipping unparseable tournament file {:?}: {}", path, e);
                }
            }
        }

        records.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MatchOutcome, Player, PlayerId};
    use chrono::NaiveDate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tempfile::TempDir;

    fn store(temp_dir: &TempDir) -> TournamentStore {
        TournamentStore::new(StorageConfig::new(temp_dir.path().to_path_buf()))
    }

    fn tournament(name: &str) -> Tournament {
        let mut t = Tournament::new(name, "Lyon", "", 2).unwrap();
        for (n, surname) in [(1, "Adams"), (2, "Brown")] {
            t.register(Player::new(
                PlayerId::new(format!("aa{:05}", n)).unwrap(),
                surname,
                "Test",
                NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            ))
            .unwrap();
        }
        t
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);

        let mut t = tournament("City Open");
        t.start_round(&mut StdRng::seed_from_u64(1)).unwrap();
        t.assign_result(1, MatchOutcome::Draw).unwrap();

        store.save(&t).unwrap();
        let loaded = store.load("City Open").unwrap();
        assert_eq!(t, loaded);
    }

    #[test]
    fn test_save_replaces_previous_record() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);

        let mut t = tournament("City Open");
        store.save(&t).unwrap();
        t.start_round(&mut StdRng::seed_from_u64(1)).unwrap();
        store.save(&t).unwrap();

        let loaded = store.load("City Open").unwrap();
        assert_eq!(loaded.round_number(), 1);
    }

    #[test]
    fn test_load_missing_tournament() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        assert!(matches!(
            store.load("ghost"),
            Err(StorageError::TournamentNotFound(_))
        ));
    }

    #[test]
    fn test_load_malformed_json_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        let dir = temp_dir.path().join("tournaments");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("bad.json"), "{not json").unwrap();

        assert!(matches!(store.load("bad"), Err(StorageError::Json(_))));
    }

    #[test]
    fn test_invalid_name_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        assert!(matches!(
            store.load("../escape"),
            Err(StorageError::InvalidName(_))
        ));
        assert!(matches!(store.load(""), Err(StorageError::InvalidName(_))));
    }

    #[test]
    fn test_exists() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        assert!(!store.exists("City Open"));
        store.save(&tournament("City Open")).unwrap();
        assert!(store.exists("City Open"));
    }

    #[test]
    fn test_delete() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        store.save(&tournament("City Open")).unwrap();
        store.delete("City Open").unwrap();
        assert!(!store.exists("City Open"));
    }

    #[test]
    fn test_list_filters_active_and_ended() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);

        let active = tournament("Active Cup");
        store.save(&active).unwrap();

        let mut ended = tournament("Ended Cup");
        ended.set_max_round(1).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        ended.start_round(&mut rng).unwrap();
        ended.assign_result(1, MatchOutcome::Player1Win).unwrap();
        ended.close_round().unwrap();
        ended.end_tournament().unwrap();
        store.save(&ended).unwrap();

        let all = store.list(TournamentFilter::All).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "Active Cup");

        let active_only = store.list(TournamentFilter::Active).unwrap();
        assert_eq!(active_only.len(), 1);
        assert_eq!(active_only[0].name, "Active Cup");

        let ended_only = store.list(TournamentFilter::Ended).unwrap();
        assert_eq!(ended_only.len(), 1);
        assert_eq!(ended_only[0].name, "Ended Cup");
    }

    #[test]
    fn test_list_empty_dir() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        assert!(store.list(TournamentFilter::All).unwrap().is_empty());
    }

    #[test]
    fn test_list_skips_unparseable_files() {
        let temp_dir = TempDir::new().unwrap();
        let store = store(&temp_dir);
        store.save(&tournament("Good")).unwrap();

        let dir = temp_dir.path().join("tournaments");
        fs::write(dir.join("corrupt.json"), "oops").unwrap();

        let listed = store.list(TournamentFilter::All).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "Good");
    }
}
