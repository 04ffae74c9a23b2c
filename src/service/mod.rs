//! Ladder service coordination
//!
//! This module contains the caller-side service that connects storage with
//! the pairing and rating engines.

pub mod ladder;

pub use ladder::{ActivityRow, LadderService, StreakRow, SEED_PLAYER_NAMES};
