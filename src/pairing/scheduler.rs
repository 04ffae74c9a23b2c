//! Balanced doubles scheduling
//!
//! The scheduler repeatedly anchors the strongest remaining player, gives them
//! a partner from the middle of the pool, finds the opposing pair whose combined
//! rating best matches, and then splits the four into the fairest two teams.

use crate::error::{EngineResult, LadderError};
use crate::pairing::balance::best_split;
use crate::pairing::PLAYERS_PER_MATCH;
use crate::types::{Player, ScheduledMatch, Team};
use crate::utils::mean_rating;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Configuration for the doubles scheduler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Prefix for generated match ids (`g` gives `g1`, `g2`, ...)
    pub match_id_prefix: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            match_id_prefix: "g".to_string(),
        }
    }
}

/// Matches produced for a pool plus the players left over
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub matches: Vec<ScheduledMatch>,
    /// Fewer than four players that could not be placed
    pub sitting_out: Vec<Player>,
}

/// Trait for doubles pairing algorithms
pub trait MatchScheduler: Send + Sync {
    /// Build as many matches as the pool allows
    fn schedule(&self, players: &[Player]) -> EngineResult<Vec<ScheduledMatch>> {
        Ok(self.schedule_with_bench(players)?.matches)
    }

    /// Build matches and report who sits out
    fn schedule_with_bench(&self, players: &[Player]) -> EngineResult<Schedule>;
}

/// Greedy balance-seeking scheduler
#[derive(Debug, Clone, Default)]
pub struct BalancedDoublesScheduler {
    config: SchedulerConfig,
}

impl BalancedDoublesScheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    fn validate_pool(players: &[Player]) -> EngineResult<()> {
        if players.len() < PLAYERS_PER_MATCH {
            return Err(LadderError::InsufficientPlayers {
                available: players.len(),
                required: PLAYERS_PER_MATCH,
            });
        }

        let mut seen = HashSet::with_capacity(players.len());
        for player in players {
            if !seen.insert(player.id.as_str()) {
                return Err(LadderError::DuplicatePlayer {
                    player_id: player.id.clone(),
                });
            }
        }

        Ok(())
    }

    /// Index of the player closest to the pool's average rating
    fn partner_index(pool: &[Player]) -> usize {
        let avg = mean_rating(pool.iter().map(|p| p.rating)).unwrap_or(0.0);

        let mut best_idx = 0;
        for (i, player) in pool.iter().enumerate().skip(1) {
            if (player.rating - avg).abs() < (pool[best_idx].rating - avg).abs() {
                best_idx = i;
            }
        }
        best_idx
    }

    /// Indices `(i, j)`, `i < j`, of the pair whose sum is closest to `target`
    fn opponent_indices(pool: &[Player], target: f64) -> (usize, usize) {
        let mut best = (0, 1);
        let mut best_diff = f64::INFINITY;
        for i in 0..pool.len() {
            for j in (i + 1)..pool.len() {
                let diff = (target - (pool[i].rating + pool[j].rating)).abs();
                if diff < best_diff {
                    best_diff = diff;
                    best = (i, j);
                }
            }
        }
        best
    }
}

impl MatchScheduler for BalancedDoublesScheduler {
    fn schedule_with_bench(&self, players: &[Player]) -> EngineResult<Schedule> {
        Self::validate_pool(players)?;

        let mut pool = players.to_vec();
        let mut matches = Vec::with_capacity(players.len() / PLAYERS_PER_MATCH);

        while pool.len() >= PLAYERS_PER_MATCH {
            // Stable sort, so equal ratings keep their input order
            pool.sort_by(|a, b| b.rating.total_cmp(&a.rating));

            let anchor = pool.remove(0);
            let partner = pool.remove(Self::partner_index(&pool));

            let (i, j) = Self::opponent_indices(&pool, anchor.rating + partner.rating);
            // j > i, so removing j first keeps i valid
            let opp2 = pool.remove(j);
            let opp1 = pool.remove(i);

            let four = [anchor, partner, opp1, opp2];
            let split = best_split(&four);

            let pick = |idx: [usize; 2]| -> EngineResult<Team<Player>> {
                Team::new(four[idx[0]].clone(), four[idx[1]].clone())
            };
            let teams = [pick(split.team_one)?, pick(split.team_two)?];

            let scheduled = ScheduledMatch {
                id: format!("{}{}", self.config.match_id_prefix, matches.len() + 1),
                teams,
            };

            debug!(
                "Scheduled {} - [{}, {}] vs [{}, {}], gap {:.1}",
                scheduled.id,
                scheduled.teams[0].first().name,
                scheduled.teams[0].second().name,
                scheduled.teams[1].first().name,
                scheduled.teams[1].second().name,
                scheduled.rating_gap()
            );

            matches.push(scheduled);
        }

        if !pool.is_empty() {
            debug!("{} player(s) sitting out this round", pool.len());
        }

        Ok(Schedule {
            matches,
            sitting_out: pool,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pairing::balance::minimum_gap;

    fn roster(ratings: &[f64]) -> Vec<Player> {
        ratings
            .iter()
            .enumerate()
            .map(|(i, &rating)| Player::new(format!("p{}", i + 1), format!("Player {}", i + 1), rating))
            .collect()
    }

    #[test]
    fn test_insufficient_players() {
        let scheduler = BalancedDoublesScheduler::default();
        let result = scheduler.schedule(&roster(&[1500.0, 1400.0, 1300.0]));

        assert_eq!(
            result.unwrap_err(),
            LadderError::InsufficientPlayers {
                available: 3,
                required: 4
            }
        );

        assert!(scheduler.schedule(&[]).is_err());
    }

    #[test]
    fn test_duplicate_player_rejected() {
        let scheduler = BalancedDoublesScheduler::default();
        let mut players = roster(&[1500.0, 1400.0, 1300.0]);
        players.push(players[0].clone());

        assert!(matches!(
            scheduler.schedule(&players),
            Err(LadderError::DuplicatePlayer { .. })
        ));
    }

    #[test]
    fn test_four_players_best_partition() {
        let scheduler = BalancedDoublesScheduler::default();
        let matches = scheduler
            .schedule(&roster(&[1600.0, 1500.0, 1400.0, 1300.0]))
            .unwrap();

        assert_eq!(matches.len(), 1);
        let m = &matches[0];
        assert_eq!(m.id, "g1");
        assert_eq!(m.rating_gap(), 0.0);

        // 1600 + 1300 vs 1400 + 1500
        assert_eq!(m.teams[0].ids(), ["p1", "p4"]);
        assert_eq!(m.teams[1].ids(), ["p3", "p2"]);
    }

    #[test]
    fn test_partner_comes_from_pool_center() {
        // Anchor 2000; remaining average is 1500 so p3 is the partner, and
        // the opposing pair closest to 3500 is 1800 + 1700.
        let scheduler = BalancedDoublesScheduler::default();
        let players = roster(&[2000.0, 1800.0, 1500.0, 1700.0, 1000.0]);
        let schedule = scheduler.schedule_with_bench(&players).unwrap();

        assert_eq!(schedule.matches.len(), 1);
        let m = &schedule.matches[0];
        let ids: HashSet<&str> = m.players().map(|p| p.id.as_str()).collect();
        assert!(ids.contains("p1"));
        assert!(!ids.contains("p5"));

        assert_eq!(schedule.sitting_out.len(), 1);
        assert_eq!(schedule.sitting_out[0].id, "p5");
    }

    #[test]
    fn test_uncrossed_split_used_when_fairest() {
        let scheduler = BalancedDoublesScheduler::default();
        // After anchoring 2000 the remaining average is 1625, which picks 1600
        // as partner; the pair closest to 3600 is 1900 + 1700.
        let players = roster(&[2000.0, 1900.0, 1700.0, 1600.0, 1300.0]);
        let matches = scheduler.schedule(&players).unwrap();

        let m = &matches[0];
        assert_eq!(m.teams[0].ids(), ["p1", "p4"]);
        assert_eq!(m.teams[1].ids(), ["p2", "p3"]);
        assert_eq!(m.rating_gap(), 0.0);
    }

    #[test]
    fn test_exhaustion_and_balance() {
        let scheduler = BalancedDoublesScheduler::default();
        let players = roster(&[
            1510.0, 1320.0, 1480.0, 1005.0, 1720.0, 1260.0, 1390.0, 1600.0, 1111.0, 1450.0,
        ]);
        let schedule = scheduler.schedule_with_bench(&players).unwrap();

        assert_eq!(schedule.matches.len(), 2);
        assert_eq!(schedule.sitting_out.len(), 2);

        let mut seen = HashSet::new();
        for m in &schedule.matches {
            for p in m.players() {
                assert!(seen.insert(p.id.clone()), "player scheduled twice");
            }

            let four = [
                m.teams[0].first().clone(),
                m.teams[0].second().clone(),
                m.teams[1].first().clone(),
                m.teams[1].second().clone(),
            ];
            assert_eq!(m.rating_gap(), minimum_gap(&four));
        }
        assert_eq!(seen.len(), 8);
    }

    #[test]
    fn test_deterministic_with_ties() {
        let scheduler = BalancedDoublesScheduler::default();
        let players = roster(&[1500.0; 9]);

        let first = scheduler.schedule(&players).unwrap();
        let second = scheduler.schedule(&players).unwrap();
        assert_eq!(first, second);
        assert_eq!(first[0].teams[0].ids(), ["p1", "p3"]);
    }

    #[test]
    fn test_custom_match_prefix() {
        let scheduler = BalancedDoublesScheduler::new(SchedulerConfig {
            match_id_prefix: "court-".to_string(),
        });
        let matches = scheduler.schedule(&roster(&[1500.0; 8])).unwrap();

        let ids: Vec<&str> = matches.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["court-1", "court-2"]);
    }
}
