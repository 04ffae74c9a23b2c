//! Error types for the ladder engine
//!
//! The pairing and rating engines return [`EngineResult`] so callers can match
//! on the failure kind. Everything above the engines (configuration, stores,
//! the ladder service and the CLI) uses the anyhow-based [`Result`] alias.

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Result type returned by the pure pairing and rating engines
pub type EngineResult<T> = std::result::Result<T, LadderError>;

/// Custom error types for specific ladder scenarios
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LadderError {
    #[error("Insufficient players: {available} available, at least {required} required")]
    InsufficientPlayers { available: usize, required: usize },

    #[error("Invalid match result: {reason}")]
    InvalidMatchResult { reason: String },

    #[error("Duplicate player: {player_id}")]
    DuplicatePlayer { player_id: String },

    #[error("Unknown player: {player_id}")]
    UnknownPlayer { player_id: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Storage error: {message}")]
    StorageError { message: String },

    #[error("Internal service error: {message}")]
    InternalError { message: String },
}

impl LadderError {
    /// Whether the caller can fix this by changing its input and retrying
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            LadderError::InsufficientPlayers { .. }
                | LadderError::InvalidMatchResult { .. }
                | LadderError::DuplicatePlayer { .. }
                | LadderError::UnknownPlayer { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = LadderError::InsufficientPlayers {
            available: 3,
            required: 4,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient players: 3 available, at least 4 required"
        );

        let err = LadderError::DuplicatePlayer {
            player_id: "p1".to_string(),
        };
        assert_eq!(err.to_string(), "Duplicate player: p1");
    }

    #[test]
    fn test_input_error_classification() {
        assert!(LadderError::InvalidMatchResult {
            reason: "draw".to_string()
        }
        .is_input_error());
        assert!(!LadderError::StorageError {
            message: "disk full".to_string()
        }
        .is_input_error());
    }

    #[test]
    fn test_downcast_through_anyhow() {
        let result: Result<()> = Err(LadderError::UnknownPlayer {
            player_id: "ghost".to_string(),
        }
        .into());

        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LadderError>(),
            Some(LadderError::UnknownPlayer { .. })
        ));
    }
}
