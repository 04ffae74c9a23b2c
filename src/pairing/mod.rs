//! Doubles pairing
//!
//! This module turns a pool of available players into balanced 2v2 matches.

pub mod balance;
pub mod scheduler;

// Re-export commonly used types
pub use balance::{best_split, Split};
pub use scheduler::{BalancedDoublesScheduler, MatchScheduler, Schedule, SchedulerConfig};

/// Players needed for one doubles match
pub const PLAYERS_PER_MATCH: usize = 4;
