//! JSON file backed club storage
//!
//! The whole club is kept in memory and written back to a single JSON
//! document after every change. Writes go to a sibling temporary file first
//! and are renamed into place.

use crate::error::LadderError;
use crate::store::{ClubData, ClubStore, PlayerEntry};
use crate::types::{MatchRecord, PlayerId};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{debug, info};

/// Club storage persisted to a JSON file
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    data: RwLock<ClubData>,
}

impl JsonFileStore {
    /// Open a store, starting empty when the file does not exist yet
    pub fn open(path: impl Into<PathBuf>) -> crate::error::Result<Self> {
        let path = path.into();
        let data = if path.exists() {
            let raw = fs::read_to_string(&path).map_err(|e| storage_error(&path, e))?;
            if raw.trim().is_empty() {
                ClubData::default()
            } else {
                serde_json::from_str(&raw).map_err(|e| storage_error(&path, e))?
            }
        } else {
            info!("No data file at {}, starting empty", path.display());
            ClubData::default()
        };

        debug!(
            "Loaded {} player(s) and {} match(es) from {}",
            data.players.len(),
            data.matches.len(),
            path.display()
        );

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, data: &ClubData) -> crate::error::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| storage_error(&self.path, e))?;
            }
        }

        let json = serde_json::to_string_pretty(data).map_err(|e| storage_error(&self.path, e))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| storage_error(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| storage_error(&self.path, e))?;
        Ok(())
    }

    fn read<T>(&self, f: impl FnOnce(&ClubData) -> T) -> crate::error::Result<T> {
        let data = self.data.read().map_err(|_| LadderError::InternalError {
            message: "Failed to acquire club data read lock".to_string(),
        })?;
        Ok(f(&data))
    }

    /// Apply a change and write the document back; the in-memory copy is only
    /// replaced once the write succeeded
    fn modify<T>(&self, f: impl FnOnce(&mut ClubData) -> T) -> crate::error::Result<T> {
        let mut data = self.data.write().map_err(|_| LadderError::InternalError {
            message: "Failed to acquire club data write lock".to_string(),
        })?;

        let mut next = data.clone();
        let result = f(&mut next);
        self.persist(&next)?;
        *data = next;
        Ok(result)
    }
}

fn storage_error(path: &Path, err: impl std::fmt::Display) -> LadderError {
    LadderError::StorageError {
        message: format!("{}: {}", path.display(), err),
    }
}

impl ClubStore for JsonFileStore {
    fn get_player(&self, player_id: &str) -> crate::error::Result<Option<PlayerEntry>> {
        self.read(|data| data.players.get(player_id).cloned())
    }

    fn get_players(
        &self,
        player_ids: &[PlayerId],
    ) -> crate::error::Result<HashMap<PlayerId, PlayerEntry>> {
        self.read(|data| data.select(player_ids))
    }

    fn list_players(&self) -> crate::error::Result<Vec<PlayerEntry>> {
        self.read(|data| data.sorted_players())
    }

    fn upsert_player(&self, entry: PlayerEntry) -> crate::error::Result<()> {
        self.modify(|data| {
            data.players.insert(entry.player.id.clone(), entry);
        })
    }

    fn remove_player(&self, player_id: &str) -> crate::error::Result<bool> {
        self.modify(|data| data.players.remove(player_id).is_some())
    }

    fn store_players(&self, entries: Vec<PlayerEntry>) -> crate::error::Result<()> {
        self.modify(|data| {
            for entry in entries {
                data.players.insert(entry.player.id.clone(), entry);
            }
        })
    }

    fn record_match(&self, record: MatchRecord) -> crate::error::Result<()> {
        self.modify(|data| data.matches.push(record))
    }

    fn commit_set(
        &self,
        entries: Vec<PlayerEntry>,
        record: MatchRecord,
    ) -> crate::error::Result<()> {
        self.modify(|data| {
            for entry in entries {
                data.players.insert(entry.player.id.clone(), entry);
            }
            data.matches.push(record);
        })
    }

    fn list_matches(&self) -> crate::error::Result<Vec<MatchRecord>> {
        self.read(|data| data.matches.clone())
    }

    fn player_count(&self) -> crate::error::Result<usize> {
        self.read(|data| data.players.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Player;
    use uuid::Uuid;

    fn temp_path() -> PathBuf {
        std::env::temp_dir().join(format!("padel-ladder-{}.json", Uuid::new_v4()))
    }

    #[test]
    fn test_missing_file_starts_empty() {
        let path = temp_path();
        let store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.player_count().unwrap(), 0);
        assert!(!path.exists());
    }

    #[test]
    fn test_changes_survive_reopen() {
        let path = temp_path();
        {
            let store = JsonFileStore::open(&path).unwrap();
            store
                .upsert_player(PlayerEntry::new(Player::new("p1", "Emma", 1000.0)))
                .unwrap();
            store
                .upsert_player(PlayerEntry::new(Player::new("p2", "Lars", 1020.0)))
                .unwrap();
            assert!(store.remove_player("p2").unwrap());
        }

        let reopened = JsonFileStore::open(&path).unwrap();
        let players = reopened.list_players().unwrap();
        assert_eq!(players.len(), 1);
        assert_eq!(players[0].player.name, "Emma");

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_commit_set_is_all_or_nothing() {
        let blocker = temp_path();
        fs::write(&blocker, "").unwrap();
        // The parent of the data file is a regular file, so every write fails
        let store = JsonFileStore::open(blocker.join("club.json")).unwrap();

        let record = MatchRecord {
            id: Uuid::new_v4(),
            played_at: chrono::Utc::now(),
            team_a: ["p1".to_string(), "p2".to_string()],
            team_b: ["p3".to_string(), "p4".to_string()],
            team_a_names: Default::default(),
            team_b_names: Default::default(),
            score_a: 6,
            score_b: 4,
            court: None,
            points: Vec::new(),
        };
        let entry = PlayerEntry::new(Player::new("p1", "Emma", 1010.0));

        let err = store.commit_set(vec![entry], record).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LadderError>(),
            Some(LadderError::StorageError { .. })
        ));
        assert_eq!(store.player_count().unwrap(), 0);
        assert!(store.list_matches().unwrap().is_empty());

        fs::remove_file(&blocker).unwrap();
    }

    #[test]
    fn test_corrupt_file_is_storage_error() {
        let path = temp_path();
        fs::write(&path, "{ not json").unwrap();

        let err = JsonFileStore::open(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LadderError>(),
            Some(LadderError::StorageError { .. })
        ));

        fs::remove_file(&path).unwrap();
    }
}
