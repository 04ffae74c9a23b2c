//! Padel Ladder - doubles pairing and rating engine
//!
//! This crate schedules balanced 2v2 matches from a pool of club players and
//! updates individual ratings after each set, with a small service layer and
//! pluggable storage for the surrounding club application.

pub mod config;
pub mod error;
pub mod pairing;
pub mod rating;
pub mod service;
pub mod store;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{EngineResult, LadderError, Result};
pub use types::*;

// Re-export key components
pub use pairing::{BalancedDoublesScheduler, MatchScheduler};
pub use rating::{EloDoublesCalculator, RatingCalculator, RatingPolicy};
pub use service::LadderService;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
