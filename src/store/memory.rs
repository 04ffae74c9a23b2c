//! In-memory club storage

use crate::error::LadderError;
use crate::store::{ClubData, ClubStore, PlayerEntry};
use crate::types::{MatchRecord, PlayerId};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// In-memory club storage implementation
#[derive(Debug, Default)]
pub struct InMemoryClubStore {
    data: RwLock<ClubData>,
}

impl InMemoryClubStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from existing data
    pub fn with_data(data: ClubData) -> Self {
        Self {
            data: RwLock::new(data),
        }
    }

    fn read(&self) -> crate::error::Result<RwLockReadGuard<'_, ClubData>> {
        self.data.read().map_err(|_| {
            LadderError::InternalError {
                message: "Failed to acquire club data read lock".to_string(),
            }
            .into()
        })
    }

    fn write(&self) -> crate::error::Result<RwLockWriteGuard<'_, ClubData>> {
        self.data.write().map_err(|_| {
            LadderError::InternalError {
                message: "Failed to acquire club data write lock".to_string(),
            }
            .into()
        })
    }
}

impl ClubStore for InMemoryClubStore {
    fn get_player(&self, player_id: &str) -> crate::error::Result<Option<PlayerEntry>> {
        Ok(self.read()?.players.get(player_id).cloned())
    }

    fn get_players(
        &self,
        player_ids: &[PlayerId],
    ) -> crate::error::Result<HashMap<PlayerId, PlayerEntry>> {
        Ok(self.read()?.select(player_ids))
    }

    fn list_players(&self) -> crate::error::Result<Vec<PlayerEntry>> {
        Ok(self.read()?.sorted_players())
    }

    fn upsert_player(&self, entry: PlayerEntry) -> crate::error::Result<()> {
        self.write()?
            .players
            .insert(entry.player.id.clone(), entry);
        Ok(())
    }

    fn remove_player(&self, player_id: &str) -> crate::error::Result<bool> {
        Ok(self.write()?.players.remove(player_id).is_some())
    }

    fn store_players(&self, entries: Vec<PlayerEntry>) -> crate::error::Result<()> {
        let mut data = self.write()?;
        for entry in entries {
            data.players.insert(entry.player.id.clone(), entry);
        }
        Ok(())
    }

    fn record_match(&self, record: MatchRecord) -> crate::error::Result<()> {
        self.write()?.matches.push(record);
        Ok(())
    }

    fn commit_set(
        &self,
        entries: Vec<PlayerEntry>,
        record: MatchRecord,
    ) -> crate::error::Result<()> {
        let mut data = self.write()?;
        for entry in entries {
            data.players.insert(entry.player.id.clone(), entry);
        }
        data.matches.push(record);
        Ok(())
    }

    fn list_matches(&self) -> crate::error::Result<Vec<MatchRecord>> {
        Ok(self.read()?.matches.clone())
    }

    fn player_count(&self) -> crate::error::Result<usize> {
        Ok(self.read()?.players.len())
    }
}
