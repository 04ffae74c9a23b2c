//! Utility functions for the ladder engine

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Generate a new unique player ID
pub fn generate_player_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generate a new unique match record ID
pub fn generate_record_id() -> Uuid {
    Uuid::new_v4()
}

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Calculate the absolute difference between two ratings
pub fn rating_difference(rating1: f64, rating2: f64) -> f64 {
    (rating1 - rating2).abs()
}

/// Arithmetic mean of a set of ratings, `None` when empty
pub fn mean_rating(ratings: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, count) = ratings
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), r| (sum + r, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Format a rating delta for display, e.g. `+9` or `-9`
pub fn format_delta(delta: f64) -> String {
    let rounded = delta.round();
    if rounded > 0.0 {
        format!("+{}", rounded)
    } else if rounded < 0.0 {
        format!("{}", rounded)
    } else {
        "0".to_string()
    }
}
