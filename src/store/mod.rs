//! Club storage interface and implementations
//!
//! The engines never touch storage. The ladder service reads players and
//! writes ratings and match history through the [`ClubStore`] trait, with an
//! in-memory implementation for tests and embedding and a JSON file
//! implementation for the CLI.

pub mod file;
pub mod memory;

pub use file::JsonFileStore;
pub use memory::InMemoryClubStore;

use crate::types::{MatchRecord, Player, PlayerId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Storage entry for a player with metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerEntry {
    pub player: Player,
    pub initial_rating: f64,
    pub games_played: u64,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl PlayerEntry {
    /// Create a new entry for a player joining the club
    pub fn new(player: Player) -> Self {
        let now = Utc::now();
        Self {
            initial_rating: player.rating,
            player,
            games_played: 0,
            created_at: now,
            last_updated: now,
        }
    }

    /// Update the rating and increment games played
    pub fn update_rating(&mut self, new_rating: f64) {
        self.player.rating = new_rating;
        self.games_played += 1;
        self.last_updated = Utc::now();
    }

    pub fn id(&self) -> &str {
        &self.player.id
    }
}

/// Everything a store persists
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClubData {
    #[serde(default)]
    pub players: HashMap<PlayerId, PlayerEntry>,
    #[serde(default)]
    pub matches: Vec<MatchRecord>,
}

impl ClubData {
    /// Players sorted by name, then id
    pub fn sorted_players(&self) -> Vec<PlayerEntry> {
        let mut players: Vec<PlayerEntry> = self.players.values().cloned().collect();
        players.sort_by(|a, b| {
            a.player
                .name
                .to_lowercase()
                .cmp(&b.player.name.to_lowercase())
                .then_with(|| a.player.id.cmp(&b.player.id))
        });
        players
    }

    pub fn select(&self, player_ids: &[PlayerId]) -> HashMap<PlayerId, PlayerEntry> {
        player_ids
            .iter()
            .filter_map(|id| self.players.get(id).map(|entry| (id.clone(), entry.clone())))
            .collect()
    }
}

/// Trait for club storage operations
pub trait ClubStore: Send + Sync {
    /// Get a player's entry
    fn get_player(&self, player_id: &str) -> crate::error::Result<Option<PlayerEntry>>;

    /// Get entries for multiple players; missing ids are left out
    fn get_players(
        &self,
        player_ids: &[PlayerId],
    ) -> crate::error::Result<HashMap<PlayerId, PlayerEntry>>;

    /// All players sorted by name
    fn list_players(&self) -> crate::error::Result<Vec<PlayerEntry>>;

    /// Store or replace a player entry
    fn upsert_player(&self, entry: PlayerEntry) -> crate::error::Result<()>;

    /// Remove a player; returns whether they existed
    fn remove_player(&self, player_id: &str) -> crate::error::Result<bool>;

    /// Store several updated entries atomically
    fn store_players(&self, entries: Vec<PlayerEntry>) -> crate::error::Result<()>;

    /// Append a finished set to the history
    fn record_match(&self, record: MatchRecord) -> crate::error::Result<()>;

    /// Store the rated players and append their set in one step; on error
    /// neither change is visible
    fn commit_set(
        &self,
        entries: Vec<PlayerEntry>,
        record: MatchRecord,
    ) -> crate::error::Result<()>;

    /// Match history, oldest first
    fn list_matches(&self) -> crate::error::Result<Vec<MatchRecord>>;

    /// Get total number of players
    fn player_count(&self) -> crate::error::Result<usize>;
}
