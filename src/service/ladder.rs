//! Ladder service
//!
//! The ladder owns the club's players and match history through an injected
//! [`ClubStore`] and drives the pairing and rating engines. Recording a set is
//! a read-modify-write of four ratings, so it runs under a single lock to keep
//! concurrent recordings from losing updates.

use crate::config::AppConfig;
use crate::error::{LadderError, Result};
use crate::pairing::{BalancedDoublesScheduler, MatchScheduler, Schedule};
use crate::rating::{EloDoublesCalculator, RatingCalculator};
use crate::store::{ClubStore, PlayerEntry};
use crate::types::{MatchRecord, Player, PlayerId, RatingMap, SetResult};
use crate::utils::{current_timestamp, format_delta, generate_player_id, generate_record_id};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// Demo roster used by [`LadderService::ensure_seed_players`]
pub const SEED_PLAYER_NAMES: [&str; 10] = [
    "Emma Christensen",
    "Michael Sørensen",
    "Julie Rasmussen",
    "Lars Petersen",
    "Mette Hansen",
    "Anders Beck Jensen",
    "Bettina Linnemann",
    "Anne Louise von Ripperda",
    "Alex Hansen",
    "Demo Bruger",
];

/// How many sets a player has taken part in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRow {
    pub player_id: PlayerId,
    pub name: String,
    pub sets_played: usize,
}

/// Current run of consecutive Friday club nights for one player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreakRow {
    pub player_id: PlayerId,
    pub name: String,
    pub streak: usize,
}

/// Caller-side coordinator for the club ladder
pub struct LadderService {
    store: Arc<dyn ClubStore>,
    scheduler: Arc<dyn MatchScheduler>,
    calculator: Arc<dyn RatingCalculator>,
    seed_rating: f64,
    record_lock: Mutex<()>,
}

impl LadderService {
    pub fn new(
        store: Arc<dyn ClubStore>,
        scheduler: Arc<dyn MatchScheduler>,
        calculator: Arc<dyn RatingCalculator>,
    ) -> Self {
        let seed_rating = calculator.baseline_rating();
        Self {
            store,
            scheduler,
            calculator,
            seed_rating,
            record_lock: Mutex::new(()),
        }
    }

    /// Build the default engines from configuration
    pub fn from_config(config: &AppConfig, store: Arc<dyn ClubStore>) -> Result<Self> {
        let calculator = EloDoublesCalculator::new(config.rating.to_policy()?)?;
        let scheduler = BalancedDoublesScheduler::new(config.pairing.clone());

        let mut service = Self::new(store, Arc::new(scheduler), Arc::new(calculator));
        service.seed_rating = config.rating.seed_rating;
        Ok(service)
    }

    /// Add a new player; without a rating they start at the baseline
    pub fn add_player(&self, name: &str, rating: Option<f64>) -> Result<Player> {
        let name = name.trim();
        if name.is_empty() {
            return Err(anyhow::anyhow!("Player name cannot be empty"));
        }

        let rating = rating.unwrap_or_else(|| self.calculator.baseline_rating());
        if !rating.is_finite() {
            return Err(anyhow::anyhow!("Rating must be a finite number"));
        }

        let player = Player::new(generate_player_id(), name, rating);
        self.store.upsert_player(PlayerEntry::new(player.clone()))?;

        info!("Added player '{}' ({}) at {:.0}", player.name, player.id, rating);
        Ok(player)
    }

    /// Remove a player from the roster; their match history is kept
    pub fn remove_player(&self, player_id: &str) -> Result<bool> {
        let removed = self.store.remove_player(player_id)?;
        if removed {
            info!("Removed player {}", player_id);
        } else {
            warn!("Tried to remove unknown player {}", player_id);
        }
        Ok(removed)
    }

    /// Fill an empty club with a demo roster; returns how many were added
    pub fn ensure_seed_players(&self) -> Result<usize> {
        if self.store.player_count()? > 0 {
            debug!("Roster not empty, skipping seed");
            return Ok(0);
        }

        let entries: Vec<PlayerEntry> = SEED_PLAYER_NAMES
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let rating = self.seed_rating + (i % 5) as f64 * 20.0;
                let mut entry = PlayerEntry::new(Player::new(generate_player_id(), *name, rating));
                entry.initial_rating = self.seed_rating;
                entry
            })
            .collect();

        let count = entries.len();
        self.store.store_players(entries)?;
        info!("Seeded {} demo players", count);
        Ok(count)
    }

    /// Roster sorted by name
    pub fn players(&self) -> Result<Vec<Player>> {
        Ok(self
            .store
            .list_players()?
            .into_iter()
            .map(|entry| entry.player)
            .collect())
    }

    /// Roster sorted by rating, strongest first
    pub fn leaderboard(&self) -> Result<Vec<Player>> {
        let mut players = self.players()?;
        players.sort_by(|a, b| b.rating.total_cmp(&a.rating).then_with(|| a.name.cmp(&b.name)));
        Ok(players)
    }

    /// Schedule the given players, or the whole roster when `player_ids` is
    /// `None`. Selected players keep the order they were given in.
    pub fn schedule(&self, player_ids: Option<&[PlayerId]>) -> Result<Schedule> {
        let players = match player_ids {
            None => self.players()?,
            Some(ids) => {
                let found = self.store.get_players(ids)?;
                ids.iter()
                    .map(|id| {
                        found
                            .get(id)
                            .map(|entry| entry.player.clone())
                            .ok_or_else(|| LadderError::UnknownPlayer {
                                player_id: id.clone(),
                            })
                    })
                    .collect::<std::result::Result<Vec<_>, _>>()?
            }
        };

        let schedule = self.scheduler.schedule_with_bench(&players)?;
        info!(
            "Scheduled {} match(es) for {} player(s), {} sitting out",
            schedule.matches.len(),
            players.len(),
            schedule.sitting_out.len()
        );
        Ok(schedule)
    }

    /// Rate a finished set, persist the new ratings and store the set in the
    /// history. Every participant must be on the roster.
    pub fn record_set(&self, set: &SetResult) -> Result<MatchRecord> {
        self.record_set_at(set, None, current_timestamp())
    }

    /// Like [`record_set`](Self::record_set) with an explicit court and time
    /// of play. Ratings and history are written in a single store commit, so
    /// a failed recording leaves both untouched and can be retried.
    pub fn record_set_at(
        &self,
        set: &SetResult,
        court: Option<String>,
        played_at: DateTime<Utc>,
    ) -> Result<MatchRecord> {
        let _guard = self.record_lock.lock().map_err(|_| LadderError::InternalError {
            message: "Failed to acquire record lock".to_string(),
        })?;

        let ids: Vec<PlayerId> = set.participants().iter().map(|id| id.to_string()).collect();
        let mut entries = self.store.get_players(&ids)?;
        for id in &ids {
            if !entries.contains_key(id) {
                return Err(LadderError::UnknownPlayer {
                    player_id: id.clone(),
                }
                .into());
            }
        }

        let ratings: RatingMap = entries
            .iter()
            .map(|(id, entry)| (id.clone(), entry.player.rating))
            .collect();

        let update = self.calculator.apply_result(&ratings, set)?;

        for delta in &update.outcome.per_player {
            if let Some(entry) = entries.get_mut(&delta.id) {
                entry.update_rating(delta.after);
            }
        }

        let name_of = |id: &str| {
            entries
                .get(id)
                .map(|entry| entry.player.name.clone())
                .unwrap_or_default()
        };
        let [a1, a2] = set.team_a.ids();
        let [b1, b2] = set.team_b.ids();

        let record = MatchRecord {
            id: generate_record_id(),
            played_at,
            team_a: [a1.to_string(), a2.to_string()],
            team_b: [b1.to_string(), b2.to_string()],
            team_a_names: [name_of(a1), name_of(a2)],
            team_b_names: [name_of(b1), name_of(b2)],
            score_a: set.score_a,
            score_b: set.score_b,
            court,
            points: update.outcome.per_player.clone(),
        };

        self.store
            .commit_set(entries.into_values().collect(), record.clone())?;

        info!(
            "Recorded {} & {} vs {} & {} {}-{} ({} / {})",
            record.team_a_names[0],
            record.team_a_names[1],
            record.team_b_names[0],
            record.team_b_names[1],
            set.score_a,
            set.score_b,
            format_delta(update.outcome.team_delta_a),
            format_delta(update.outcome.team_delta_b)
        );

        Ok(record)
    }

    /// Match history, newest first
    pub fn history(&self) -> Result<Vec<MatchRecord>> {
        let mut matches = self.store.list_matches()?;
        matches.sort_by(|a, b| b.played_at.cmp(&a.played_at));
        Ok(matches)
    }

    /// The `top_n` players with the most recorded sets
    pub fn activity(&self, top_n: usize) -> Result<Vec<ActivityRow>> {
        let mut counts: HashMap<PlayerId, ActivityRow> = HashMap::new();

        for record in self.store.list_matches()? {
            let ids = record.team_a.iter().chain(record.team_b.iter());
            let names = record.team_a_names.iter().chain(record.team_b_names.iter());
            for (id, name) in ids.zip(names) {
                let row = counts.entry(id.clone()).or_insert_with(|| ActivityRow {
                    player_id: id.clone(),
                    name: name.clone(),
                    sets_played: 0,
                });
                row.sets_played += 1;
                row.name = name.clone();
            }
        }

        let mut rows: Vec<ActivityRow> = counts.into_values().collect();
        rows.sort_by(|a, b| {
            b.sets_played
                .cmp(&a.sets_played)
                .then_with(|| a.name.cmp(&b.name))
        });
        rows.truncate(top_n);
        Ok(rows)
    }

    /// The `top_n` longest current Friday streaks.
    ///
    /// A player's streak counts Fridays played in a row, one calendar week
    /// apart, ending at the last Friday they played. Ties are ordered by name.
    pub fn friday_streaks(&self, top_n: usize) -> Result<Vec<StreakRow>> {
        let mut matches = self.store.list_matches()?;
        matches.sort_by(|a, b| a.played_at.cmp(&b.played_at));

        let mut fridays: HashMap<PlayerId, (String, BTreeSet<NaiveDate>)> = HashMap::new();
        for record in matches.iter().filter(|record| record.is_friday()) {
            let day = record.played_at.date_naive();
            let ids = record.team_a.iter().chain(record.team_b.iter());
            let names = record.team_a_names.iter().chain(record.team_b_names.iter());
            for (id, name) in ids.zip(names) {
                let (latest_name, days) = fridays
                    .entry(id.clone())
                    .or_insert_with(|| (name.clone(), BTreeSet::new()));
                *latest_name = name.clone();
                days.insert(day);
            }
        }

        let mut rows: Vec<StreakRow> = fridays
            .into_iter()
            .map(|(player_id, (name, days))| StreakRow {
                player_id,
                name,
                streak: current_streak(&days),
            })
            .collect();

        rows.sort_by(|a, b| b.streak.cmp(&a.streak).then_with(|| a.name.cmp(&b.name)));
        rows.truncate(top_n);
        Ok(rows)
    }
}

/// Consecutive weekly dates ending at the most recent one
fn current_streak(days: &BTreeSet<NaiveDate>) -> usize {
    let mut newest_first = days.iter().rev();
    let Some(mut last) = newest_first.next().copied() else {
        return 0;
    };

    let mut streak = 1;
    for day in newest_first {
        if *day != last - Duration::days(7) {
            break;
        }
        streak += 1;
        last = *day;
    }
    streak
}
