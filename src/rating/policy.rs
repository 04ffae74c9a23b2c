//! Rating policy configuration
//!
//! Every tunable of the doubles rating update lives here: the K-factor curve,
//! the margin-of-victory multipliers, the upset bonus and how a team's delta
//! is distributed between partners. Named presets cover the rating variants
//! the club has used over time.

use crate::error::{EngineResult, LadderError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Rating assumed for a player with no prior rating
pub const DEFAULT_BASELINE_RATING: f64 = 1500.0;

/// Upset bonus applied when the weaker team wins
pub const DEFAULT_UNDERDOG_MULTIPLIER: f64 = 1.10;

/// K used by the flat preset
pub const FLAT_K: f64 = 32.0;

/// One step of a K-factor curve: ratings at or above `min_rating` use `k`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KBand {
    pub min_rating: f64,
    pub k: f64,
}

/// How much a single player's rating may move per set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum KFactorCurve {
    /// Same K for everyone
    Flat { k: f64 },
    /// Step function; bands sorted by `min_rating` descending, `floor_k` below
    /// the lowest band
    Bands { bands: Vec<KBand>, floor_k: f64 },
}

impl KFactorCurve {
    /// Higher-rated players move less
    pub fn standard() -> Self {
        KFactorCurve::Bands {
            bands: vec![
                KBand {
                    min_rating: 2100.0,
                    k: 12.0,
                },
                KBand {
                    min_rating: 1900.0,
                    k: 16.0,
                },
                KBand {
                    min_rating: 1700.0,
                    k: 20.0,
                },
                KBand {
                    min_rating: 1500.0,
                    k: 24.0,
                },
            ],
            floor_k: 28.0,
        }
    }

    pub fn k_for(&self, rating: f64) -> f64 {
        match self {
            KFactorCurve::Flat { k } => *k,
            KFactorCurve::Bands { bands, floor_k } => bands
                .iter()
                .find(|band| rating >= band.min_rating)
                .map(|band| band.k)
                .unwrap_or(*floor_k),
        }
    }

    /// K must be positive and must never grow with rating
    pub fn validate(&self) -> EngineResult<()> {
        let valid_k = |k: f64| k.is_finite() && k > 0.0;

        match self {
            KFactorCurve::Flat { k } => {
                if !valid_k(*k) {
                    return Err(config_error(format!("Flat K must be positive, got {}", k)));
                }
            }
            KFactorCurve::Bands { bands, floor_k } => {
                if !valid_k(*floor_k) {
                    return Err(config_error(format!(
                        "Floor K must be positive, got {}",
                        floor_k
                    )));
                }

                for band in bands {
                    if !valid_k(band.k) || !band.min_rating.is_finite() {
                        return Err(config_error(format!(
                            "Invalid K band at {}: k = {}",
                            band.min_rating, band.k
                        )));
                    }
                }

                for pair in bands.windows(2) {
                    if pair[0].min_rating <= pair[1].min_rating {
                        return Err(config_error(
                            "K bands must be sorted by rating, highest first".to_string(),
                        ));
                    }
                    if pair[0].k > pair[1].k {
                        return Err(config_error(format!(
                            "K must not increase with rating ({} at {} > {} at {})",
                            pair[0].k, pair[0].min_rating, pair[1].k, pair[1].min_rating
                        )));
                    }
                }

                if let Some(lowest) = bands.last() {
                    if lowest.k > *floor_k {
                        return Err(config_error(format!(
                            "K must not increase with rating (floor {} < {})",
                            floor_k, lowest.k
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}

/// Multiplier applied once the set's score difference reaches `min_difference`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarginStep {
    pub min_difference: u32,
    pub multiplier: f64,
}

/// Margin-of-victory scaling; differences below the first step use 1.0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarginCurve {
    pub steps: Vec<MarginStep>,
}

impl Default for MarginCurve {
    fn default() -> Self {
        Self {
            steps: vec![
                MarginStep {
                    min_difference: 2,
                    multiplier: 1.05,
                },
                MarginStep {
                    min_difference: 3,
                    multiplier: 1.10,
                },
                MarginStep {
                    min_difference: 4,
                    multiplier: 1.15,
                },
            ],
        }
    }
}

impl MarginCurve {
    /// No margin scaling at all
    pub fn none() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn factor(&self, score_difference: u32) -> f64 {
        self.steps
            .iter()
            .rev()
            .find(|step| score_difference >= step.min_difference)
            .map(|step| step.multiplier)
            .unwrap_or(1.0)
    }

    pub fn validate(&self) -> EngineResult<()> {
        for step in &self.steps {
            if !step.multiplier.is_finite() || step.multiplier < 1.0 {
                return Err(config_error(format!(
                    "Margin multiplier must be at least 1.0, got {}",
                    step.multiplier
                )));
            }
        }

        for pair in self.steps.windows(2) {
            if pair[0].min_difference >= pair[1].min_difference {
                return Err(config_error(
                    "Margin steps must be sorted by score difference".to_string(),
                ));
            }
            if pair[0].multiplier > pair[1].multiplier {
                return Err(config_error(
                    "Margin multipliers must not shrink for larger wins".to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// How a team's rating change is divided between the two partners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeltaDistribution {
    /// The team delta is split by rating share; the four deltas sum to zero
    Shared,
    /// Each partner moves by their own K times their rating share
    Individual,
    /// The team delta is halved
    Even,
}

/// What to do when a set references a player without a rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownPlayerPolicy {
    /// Rate them from the policy's baseline rating
    Baseline,
    /// Fail with `UnknownPlayer`
    Reject,
}

impl FromStr for UnknownPlayerPolicy {
    type Err = LadderError;

    fn from_str(s: &str) -> EngineResult<Self> {
        match s.to_lowercase().as_str() {
            "baseline" => Ok(UnknownPlayerPolicy::Baseline),
            "reject" => Ok(UnknownPlayerPolicy::Reject),
            other => Err(config_error(format!(
                "Unknown player policy must be 'baseline' or 'reject', got '{}'",
                other
            ))),
        }
    }
}

/// Named rating variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyPreset {
    Shared,
    Individual,
    Flat,
    Rounded,
}

impl fmt::Display for PolicyPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyPreset::Shared => write!(f, "shared"),
            PolicyPreset::Individual => write!(f, "individual"),
            PolicyPreset::Flat => write!(f, "flat"),
            PolicyPreset::Rounded => write!(f, "rounded"),
        }
    }
}

impl FromStr for PolicyPreset {
    type Err = LadderError;

    fn from_str(s: &str) -> EngineResult<Self> {
        match s.to_lowercase().as_str() {
            "shared" => Ok(PolicyPreset::Shared),
            "individual" => Ok(PolicyPreset::Individual),
            "flat" => Ok(PolicyPreset::Flat),
            "rounded" => Ok(PolicyPreset::Rounded),
            other => Err(config_error(format!(
                "Unknown rating policy '{}' (expected shared, individual, flat or rounded)",
                other
            ))),
        }
    }
}

/// Complete parameter set for the doubles rating update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingPolicy {
    pub k_curve: KFactorCurve,
    pub margin: MarginCurve,
    /// Applied to the whole exchange when the weaker team wins
    pub underdog_multiplier: f64,
    pub distribution: DeltaDistribution,
    /// Round deltas to whole rating points
    pub round_deltas: bool,
    pub baseline_rating: f64,
    pub unknown_player: UnknownPlayerPolicy,
}

impl Default for RatingPolicy {
    fn default() -> Self {
        Self::shared()
    }
}

impl RatingPolicy {
    /// Rating-banded K, margin and upset bonus, zero-sum partner split
    pub fn shared() -> Self {
        Self {
            k_curve: KFactorCurve::standard(),
            margin: MarginCurve::default(),
            underdog_multiplier: DEFAULT_UNDERDOG_MULTIPLIER,
            distribution: DeltaDistribution::Shared,
            round_deltas: false,
            baseline_rating: DEFAULT_BASELINE_RATING,
            unknown_player: UnknownPlayerPolicy::Baseline,
        }
    }

    /// Every partner moves by their own banded K
    pub fn individual() -> Self {
        Self {
            distribution: DeltaDistribution::Individual,
            ..Self::shared()
        }
    }

    /// One K for everybody, team delta halved between partners
    pub fn flat() -> Self {
        Self {
            k_curve: KFactorCurve::Flat { k: FLAT_K },
            distribution: DeltaDistribution::Even,
            ..Self::shared()
        }
    }

    /// Shared split with whole-point deltas
    pub fn rounded() -> Self {
        Self {
            round_deltas: true,
            ..Self::shared()
        }
    }

    pub fn preset(preset: PolicyPreset) -> Self {
        match preset {
            PolicyPreset::Shared => Self::shared(),
            PolicyPreset::Individual => Self::individual(),
            PolicyPreset::Flat => Self::flat(),
            PolicyPreset::Rounded => Self::rounded(),
        }
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> EngineResult<()> {
        self.k_curve.validate()?;
        self.margin.validate()?;

        if !self.underdog_multiplier.is_finite() || self.underdog_multiplier < 1.0 {
            return Err(config_error(format!(
                "Underdog multiplier must be at least 1.0, got {}",
                self.underdog_multiplier
            )));
        }

        if !self.baseline_rating.is_finite() {
            return Err(config_error("Baseline rating must be finite".to_string()));
        }

        Ok(())
    }
}

fn config_error(message: String) -> LadderError {
    LadderError::ConfigurationError { message }
}
