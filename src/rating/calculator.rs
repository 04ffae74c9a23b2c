//! Rating calculator trait
//!
//! This module defines the interface for applying set results to a rating map.

use crate::error::EngineResult;
use crate::types::{PlayerId, RatingMap, RatingUpdate, SetOutcome, SetResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Result of applying several sets in order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOutcome {
    /// Ratings after the last set
    pub ratings: RatingMap,
    /// One outcome per set, in input order
    pub outcomes: Vec<SetOutcome>,
    /// Summed delta per player across all sets
    pub total_delta: HashMap<PlayerId, f64>,
}

/// Trait for calculating rating changes after doubles sets
pub trait RatingCalculator: Send + Sync {
    /// Apply one completed set to the current ratings
    ///
    /// # Arguments
    /// * `ratings` - Current rating per player id
    /// * `set` - The two teams and the set score
    ///
    /// # Returns
    /// The updated rating map, per-player deltas and the derived outcome
    fn apply_result(&self, ratings: &RatingMap, set: &SetResult) -> EngineResult<RatingUpdate>;

    /// Apply sets one after another, each seeing the ratings the previous
    /// one produced. Fails on the first invalid set without returning
    /// partial results.
    fn apply_sets(&self, start: &RatingMap, sets: &[SetResult]) -> EngineResult<BatchOutcome> {
        let mut ratings = start.clone();
        let mut outcomes = Vec::with_capacity(sets.len());
        let mut total_delta: HashMap<PlayerId, f64> = HashMap::new();

        for set in sets {
            let update = self.apply_result(&ratings, set)?;
            for player in &update.outcome.per_player {
                *total_delta.entry(player.id.clone()).or_insert(0.0) += player.delta;
            }
            ratings = update.updated;
            outcomes.push(update.outcome);
        }

        Ok(BatchOutcome {
            ratings,
            outcomes,
            total_delta,
        })
    }

    /// Rating assumed for players who have never been rated
    fn baseline_rating(&self) -> f64;

    /// Get current configuration as JSON
    fn config(&self) -> serde_json::Value;

    /// Update configuration from JSON
    fn update_config(&mut self, config: serde_json::Value) -> crate::error::Result<()>;
}
