//! Common types used throughout the ladder engine

use crate::error::{EngineResult, LadderError};
use crate::utils::rating_difference;
use chrono::{DateTime, Datelike, Utc, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use uuid::Uuid;

/// Unique identifier for players
pub type PlayerId = String;

/// Current rating per player, as owned by the caller
pub type RatingMap = HashMap<PlayerId, f64>;

/// Anything that can sit on a team must expose a stable player id
pub trait Identified {
    fn player_id(&self) -> &str;
}

impl Identified for PlayerId {
    fn player_id(&self) -> &str {
        self.as_str()
    }
}

/// A club member as seen by the engines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub rating: f64,
}

impl Player {
    pub fn new(id: impl Into<PlayerId>, name: impl Into<String>, rating: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            rating,
        }
    }
}

impl Identified for Player {
    fn player_id(&self) -> &str {
        &self.id
    }
}

/// Exactly two distinct players
///
/// The pair can only be built through [`Team::new`], which rejects a player
/// partnering themselves.
#[derive(Debug, Clone, PartialEq)]
pub struct Team<P> {
    members: [P; 2],
}

impl<P: Identified> Team<P> {
    pub fn new(first: P, second: P) -> EngineResult<Self> {
        if first.player_id() == second.player_id() {
            return Err(LadderError::DuplicatePlayer {
                player_id: first.player_id().to_string(),
            });
        }
        Ok(Self {
            members: [first, second],
        })
    }

    pub fn first(&self) -> &P {
        &self.members[0]
    }

    pub fn second(&self) -> &P {
        &self.members[1]
    }

    pub fn members(&self) -> &[P; 2] {
        &self.members
    }

    pub fn contains(&self, player_id: &str) -> bool {
        self.members.iter().any(|m| m.player_id() == player_id)
    }

    pub fn ids(&self) -> [&str; 2] {
        [self.members[0].player_id(), self.members[1].player_id()]
    }
}

impl Team<Player> {
    /// Sum of both members' ratings
    pub fn rating_sum(&self) -> f64 {
        self.members[0].rating + self.members[1].rating
    }

    /// Mean of both members' ratings
    pub fn strength(&self) -> f64 {
        self.rating_sum() / 2.0
    }
}

impl<P: Serialize> Serialize for Team<P> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.members.serialize(serializer)
    }
}

impl<'de, P: Identified + Deserialize<'de>> Deserialize<'de> for Team<P> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let [first, second] = <[P; 2]>::deserialize(deserializer)?;
        Team::new(first, second).map_err(serde::de::Error::custom)
    }
}

/// One scheduled doubles match produced by the pairing engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledMatch {
    pub id: String,
    pub teams: [Team<Player>; 2],
}

impl ScheduledMatch {
    /// Absolute difference between the two teams' rating sums
    pub fn rating_gap(&self) -> f64 {
        rating_difference(self.teams[0].rating_sum(), self.teams[1].rating_sum())
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.teams.iter().flat_map(|team| team.members().iter())
    }
}

/// Completed set submitted for rating
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetResult {
    pub team_a: Team<PlayerId>,
    pub team_b: Team<PlayerId>,
    pub score_a: u32,
    pub score_b: u32,
}

impl SetResult {
    /// Build a set result from four ids, validating each team pair
    pub fn new(
        team_a: [&str; 2],
        team_b: [&str; 2],
        score_a: u32,
        score_b: u32,
    ) -> EngineResult<Self> {
        Ok(Self {
            team_a: Team::new(team_a[0].to_string(), team_a[1].to_string())?,
            team_b: Team::new(team_b[0].to_string(), team_b[1].to_string())?,
            score_a,
            score_b,
        })
    }

    pub fn participants(&self) -> [&str; 4] {
        let [a1, a2] = self.team_a.ids();
        let [b1, b2] = self.team_b.ids();
        [a1, a2, b1, b2]
    }

    pub fn team_a_won(&self) -> bool {
        self.score_a > self.score_b
    }

    pub fn score_difference(&self) -> u32 {
        self.score_a.abs_diff(self.score_b)
    }
}

/// Rating movement of a single player for one set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerDelta {
    pub id: PlayerId,
    pub before: f64,
    pub after: f64,
    pub delta: f64,
}

/// Everything the rating engine derived while scoring one set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetOutcome {
    pub score_a: u32,
    pub score_b: u32,
    /// Expected score of team A (0..1)
    pub expected_a: f64,
    pub team_delta_a: f64,
    pub team_delta_b: f64,
    pub margin_factor: f64,
    pub upset: bool,
    pub per_player: Vec<PlayerDelta>,
}

/// Result of applying one set to a rating map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingUpdate {
    /// Copy of the input map with the four participants replaced
    pub updated: RatingMap,
    pub deltas: HashMap<PlayerId, f64>,
    pub outcome: SetOutcome,
}

/// A set as stored in the club history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: Uuid,
    pub played_at: DateTime<Utc>,
    pub team_a: [PlayerId; 2],
    pub team_b: [PlayerId; 2],
    pub team_a_names: [String; 2],
    pub team_b_names: [String; 2],
    pub score_a: u32,
    pub score_b: u32,
    /// Court the set was played on, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub court: Option<String>,
    pub points: Vec<PlayerDelta>,
}

impl MatchRecord {
    pub fn involves(&self, player_id: &str) -> bool {
        self.team_a.iter().chain(self.team_b.iter()).any(|id| id == player_id)
    }

    /// Club night sets are the ones played on a Friday (UTC calendar day)
    pub fn is_friday(&self) -> bool {
        self.played_at.weekday() == Weekday::Fri
    }
}
