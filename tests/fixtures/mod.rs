//! Test fixtures and store wrappers for integration testing

#![allow(dead_code)]

use padel_ladder::config::AppConfig;
use padel_ladder::error::Result;
use padel_ladder::service::LadderService;
use padel_ladder::store::{ClubStore, InMemoryClubStore, PlayerEntry};
use padel_ladder::types::{MatchRecord, Player, PlayerId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Store wrapper that counts writes and can be told to fail them
#[derive(Debug, Default)]
pub struct RecordingClubStore {
    inner: InMemoryClubStore,
    player_writes: Mutex<usize>,
    match_writes: Mutex<usize>,
    fail_writes: Mutex<bool>,
    fail_match_writes: Mutex<bool>,
}

impl RecordingClubStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `store_players` / `upsert_player` / `commit_set` calls (for testing)
    pub fn player_writes(&self) -> usize {
        self.player_writes.lock().map(|n| *n).unwrap_or_default()
    }

    /// Number of `record_match` / `commit_set` calls (for testing)
    pub fn match_writes(&self) -> usize {
        self.match_writes.lock().map(|n| *n).unwrap_or_default()
    }

    /// Make every following write fail with a storage error
    pub fn fail_writes(&self, fail: bool) {
        if let Ok(mut flag) = self.fail_writes.lock() {
            *flag = fail;
        }
    }

    /// Fail only writes that append to the match history
    pub fn fail_match_writes(&self, fail: bool) {
        if let Ok(mut flag) = self.fail_match_writes.lock() {
            *flag = fail;
        }
    }

    fn check_match_write(&self) -> Result<()> {
        if self.fail_match_writes.lock().map(|f| *f).unwrap_or(false) {
            return Err(padel_ladder::LadderError::StorageError {
                message: "history unavailable".to_string(),
            }
            .into());
        }
        self.check_write()
    }

    fn check_write(&self) -> Result<()> {
        if self.fail_writes.lock().map(|f| *f).unwrap_or(false) {
            return Err(padel_ladder::LadderError::StorageError {
                message: "disk full".to_string(),
            }
            .into());
        }
        Ok(())
    }

    fn bump(counter: &Mutex<usize>) {
        if let Ok(mut n) = counter.lock() {
            *n += 1;
        }
    }
}

impl ClubStore for RecordingClubStore {
    fn get_player(&self, player_id: &str) -> Result<Option<PlayerEntry>> {
        self.inner.get_player(player_id)
    }

    fn get_players(&self, player_ids: &[PlayerId]) -> Result<HashMap<PlayerId, PlayerEntry>> {
        self.inner.get_players(player_ids)
    }

    fn list_players(&self) -> Result<Vec<PlayerEntry>> {
        self.inner.list_players()
    }

    fn upsert_player(&self, entry: PlayerEntry) -> Result<()> {
        self.check_write()?;
        Self::bump(&self.player_writes);
        self.inner.upsert_player(entry)
    }

    fn remove_player(&self, player_id: &str) -> Result<bool> {
        self.check_write()?;
        self.inner.remove_player(player_id)
    }

    fn store_players(&self, entries: Vec<PlayerEntry>) -> Result<()> {
        self.check_write()?;
        Self::bump(&self.player_writes);
        self.inner.store_players(entries)
    }

    fn record_match(&self, record: MatchRecord) -> Result<()> {
        self.check_match_write()?;
        Self::bump(&self.match_writes);
        self.inner.record_match(record)
    }

    fn commit_set(&self, entries: Vec<PlayerEntry>, record: MatchRecord) -> Result<()> {
        self.check_write()?;
        self.check_match_write()?;
        Self::bump(&self.player_writes);
        Self::bump(&self.match_writes);
        self.inner.commit_set(entries, record)
    }

    fn list_matches(&self) -> Result<Vec<MatchRecord>> {
        self.inner.list_matches()
    }

    fn player_count(&self) -> Result<usize> {
        self.inner.player_count()
    }
}

/// Ladder on an in-memory store with default configuration
pub fn create_ladder() -> LadderService {
    create_ladder_with_store(Arc::new(InMemoryClubStore::new()))
}

pub fn create_ladder_with_store(store: Arc<dyn ClubStore>) -> LadderService {
    LadderService::from_config(&AppConfig::default(), store)
        .expect("default configuration builds a ladder")
}

/// Add one player per rating, named `Player 1`, `Player 2`, ...
pub fn add_players(ladder: &LadderService, ratings: &[f64]) -> Vec<Player> {
    ratings
        .iter()
        .enumerate()
        .map(|(i, rating)| {
            ladder
                .add_player(&format!("Player {}", i + 1), Some(*rating))
                .expect("player added")
        })
        .collect()
}

/// Players with fixed ids `p1..pn` for engine-level tests
pub fn create_players(ratings: &[f64]) -> Vec<Player> {
    ratings
        .iter()
        .enumerate()
        .map(|(i, rating)| Player::new(format!("p{}", i + 1), format!("Player {}", i + 1), *rating))
        .collect()
}

pub fn rating_of(ladder: &LadderService, player_id: &str) -> f64 {
    ladder
        .players()
        .expect("players listed")
        .into_iter()
        .find(|p| p.id == player_id)
        .map(|p| p.rating)
        .expect("player on roster")
}
