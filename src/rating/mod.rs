//! Doubles rating updates
//!
//! This module provides the rating calculator interface, the Elo-based
//! doubles implementation and the policy that parameterizes it.

pub mod calculator;
pub mod elo;
pub mod policy;

// Re-export commonly used types
pub use calculator::{BatchOutcome, RatingCalculator};
pub use elo::{expected_score, EloDoublesCalculator};
pub use policy::{
    DeltaDistribution, KBand, KFactorCurve, MarginCurve, MarginStep, PolicyPreset, RatingPolicy,
    UnknownPlayerPolicy,
};
