//! Doubles Elo rating implementation
//!
//! Team strength is the mean of both partners' ratings, the expectation is the
//! classic Elo logistic curve (via the skillratings crate), and the resulting
//! team delta is scaled by margin of victory and an upset bonus before being
//! split between partners according to the active [`RatingPolicy`].

use crate::error::{EngineResult, LadderError};
use crate::rating::calculator::RatingCalculator;
use crate::rating::policy::{DeltaDistribution, RatingPolicy, UnknownPlayerPolicy};
use crate::types::{PlayerDelta, PlayerId, RatingMap, RatingUpdate, SetOutcome, SetResult, Team};
use skillratings::elo::EloRating;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Expected score of a team with strength `team_a` against `team_b`
pub fn expected_score(team_a: f64, team_b: f64) -> f64 {
    let (expected_a, _) = skillratings::elo::expected_score(
        &EloRating { rating: team_a },
        &EloRating { rating: team_b },
    );
    expected_a
}

/// Share of a team delta that goes to the first partner.
///
/// On a gain the lower-rated partner takes the larger part, on a loss the
/// smaller part. Falls back to an even split when the ratings cannot be used
/// as weights.
pub fn partner_share(first: f64, second: f64, gaining: bool) -> f64 {
    let total = first + second;
    if first <= 0.0 || second <= 0.0 || !total.is_finite() {
        return 0.5;
    }

    if gaining {
        second / total
    } else {
        first / total
    }
}

/// Doubles Elo calculator driven by a [`RatingPolicy`]
#[derive(Debug, Clone)]
pub struct EloDoublesCalculator {
    policy: RatingPolicy,
}

impl Default for EloDoublesCalculator {
    fn default() -> Self {
        Self {
            policy: RatingPolicy::default(),
        }
    }
}

impl EloDoublesCalculator {
    /// Create a new calculator; the policy is validated first
    pub fn new(policy: RatingPolicy) -> EngineResult<Self> {
        policy.validate()?;
        Ok(Self { policy })
    }

    pub fn policy(&self) -> &RatingPolicy {
        &self.policy
    }

    fn validate_set(set: &SetResult) -> EngineResult<()> {
        let mut seen = HashSet::with_capacity(4);
        for id in set.participants() {
            if !seen.insert(id) {
                return Err(LadderError::DuplicatePlayer {
                    player_id: id.to_string(),
                });
            }
        }

        if set.score_a == set.score_b {
            return Err(LadderError::InvalidMatchResult {
                reason: format!(
                    "draws are not allowed ({}-{})",
                    set.score_a, set.score_b
                ),
            });
        }

        Ok(())
    }

    /// Look up a participant's rating, honouring the unknown-player policy
    fn rating_of(&self, ratings: &RatingMap, player_id: &str) -> EngineResult<f64> {
        let rating = match ratings.get(player_id) {
            Some(rating) => *rating,
            None => match self.policy.unknown_player {
                UnknownPlayerPolicy::Baseline => {
                    debug!(
                        "No rating for player {}, using baseline {}",
                        player_id, self.policy.baseline_rating
                    );
                    self.policy.baseline_rating
                }
                UnknownPlayerPolicy::Reject => {
                    return Err(LadderError::UnknownPlayer {
                        player_id: player_id.to_string(),
                    })
                }
            },
        };

        if !rating.is_finite() {
            return Err(LadderError::InvalidMatchResult {
                reason: format!("rating of player {} is not a finite number", player_id),
            });
        }

        Ok(rating)
    }

    fn team_ratings(&self, ratings: &RatingMap, team: &Team<PlayerId>) -> EngineResult<[f64; 2]> {
        Ok([
            self.rating_of(ratings, team.first())?,
            self.rating_of(ratings, team.second())?,
        ])
    }

    /// Per-partner deltas for one team
    ///
    /// `team_delta` is the team-level change and `base` the unscaled
    /// `margin * upset * (S - E)` term, used when partners move by their own K.
    fn split_team_delta(&self, team: [f64; 2], team_delta: f64, base: f64) -> [f64; 2] {
        let gaining = team_delta >= 0.0;
        let share = partner_share(team[0], team[1], gaining);

        match self.policy.distribution {
            DeltaDistribution::Shared | DeltaDistribution::Even => {
                let first_share = match self.policy.distribution {
                    DeltaDistribution::Even => 0.5,
                    _ => share,
                };
                let mut first = team_delta * first_share;
                if self.policy.round_deltas {
                    first = first.round();
                }
                [first, team_delta - first]
            }
            DeltaDistribution::Individual => {
                let mut first = base * self.policy.k_curve.k_for(team[0]) * share;
                let mut second = base * self.policy.k_curve.k_for(team[1]) * (1.0 - share);
                if self.policy.round_deltas {
                    first = first.round();
                    second = second.round();
                }
                [first, second]
            }
        }
    }
}

impl RatingCalculator for EloDoublesCalculator {
    fn apply_result(&self, ratings: &RatingMap, set: &SetResult) -> EngineResult<RatingUpdate> {
        Self::validate_set(set)?;

        let team_a = self.team_ratings(ratings, &set.team_a)?;
        let team_b = self.team_ratings(ratings, &set.team_b)?;

        let strength_a = (team_a[0] + team_a[1]) / 2.0;
        let strength_b = (team_b[0] + team_b[1]) / 2.0;

        let expected_a = expected_score(strength_a, strength_b);
        let a_won = set.team_a_won();
        let actual_a = if a_won { 1.0 } else { 0.0 };

        let margin_factor = self.policy.margin.factor(set.score_difference());
        let upset = if a_won {
            strength_a < strength_b
        } else {
            strength_b < strength_a
        };
        let upset_factor = if upset {
            self.policy.underdog_multiplier
        } else {
            1.0
        };

        let exchange_k = team_a
            .iter()
            .chain(team_b.iter())
            .map(|r| self.policy.k_curve.k_for(*r))
            .sum::<f64>()
            / 4.0;

        let base_a = margin_factor * upset_factor * (actual_a - expected_a);
        let mut team_delta_a = base_a * exchange_k;
        if self.policy.round_deltas {
            team_delta_a = team_delta_a.round();
        }
        let team_delta_b = -team_delta_a;

        let deltas_a = self.split_team_delta(team_a, team_delta_a, base_a);
        let deltas_b = self.split_team_delta(team_b, team_delta_b, -base_a);

        let mut updated = ratings.clone();
        let mut deltas = HashMap::with_capacity(4);
        let mut per_player = Vec::with_capacity(4);

        let participants = set.participants();
        let befores = [team_a[0], team_a[1], team_b[0], team_b[1]];
        let changes = [deltas_a[0], deltas_a[1], deltas_b[0], deltas_b[1]];

        for ((id, before), delta) in participants.into_iter().zip(befores).zip(changes) {
            let after = before + delta;
            if !after.is_finite() {
                warn!("Rating update for {} produced a non-finite value", id);
                return Err(LadderError::InvalidMatchResult {
                    reason: format!("rating update for player {} overflowed", id),
                });
            }

            updated.insert(id.to_string(), after);
            deltas.insert(id.to_string(), delta);
            per_player.push(PlayerDelta {
                id: id.to_string(),
                before,
                after,
                delta,
            });
        }

        debug!(
            "Set {}-{}: expected_a {:.3}, margin {:.2}, upset {}, team delta {:+.2}",
            set.score_a, set.score_b, expected_a, margin_factor, upset, team_delta_a
        );

        Ok(RatingUpdate {
            updated,
            deltas,
            outcome: SetOutcome {
                score_a: set.score_a,
                score_b: set.score_b,
                expected_a,
                team_delta_a,
                team_delta_b,
                margin_factor,
                upset,
                per_player,
            },
        })
    }

    fn baseline_rating(&self) -> f64 {
        self.policy.baseline_rating
    }

    fn config(&self) -> serde_json::Value {
        serde_json::to_value(&self.policy).unwrap_or(serde_json::Value::Null)
    }

    fn update_config(&mut self, config: serde_json::Value) -> crate::error::Result<()> {
        let new_policy: RatingPolicy = serde_json::from_value(config).map_err(|e| {
            LadderError::ConfigurationError {
                message: format!("Invalid rating policy: {}", e),
            }
        })?;

        new_policy.validate()?;
        self.policy = new_policy;
        Ok(())
    }
}
