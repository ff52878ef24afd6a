use thiserror::Error;

use crate::types::StackId;

/// Errors surfaced by the core rules
///
/// Invariant violations (two stacks on one cell, free-set drift, duplicate ids) are not
/// represented here; they are assertions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GameError {
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration { reason: &'static str },
    #[error("not enough free cells: requested {requested}, available {available}")]
    InsufficientCells { requested: usize, available: usize },
    #[error("no free cell near ({x}, {y})")]
    NoNearbyCell { x: f32, y: f32 },
    #[error("unknown stack {0}")]
    UnknownStack(StackId),
    #[error("stack {0} is not movable")]
    StackNotMovable(StackId),
    #[error("no round is running")]
    NotRunning,
}

impl GameError {
    pub fn code(&self) -> &'static str {
        match self {
            GameError::InvalidConfiguration { .. } => "invalid_configuration",
            GameError::InsufficientCells { .. } => "insufficient_cells",
            GameError::NoNearbyCell { .. } => "no_nearby_cell",
            GameError::UnknownStack(_) | GameError::StackNotMovable(_) => "invalid_stack",
            GameError::NotRunning => "not_running",
        }
    }

    /// Whether the caller can carry on with the current round
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, GameError::InvalidConfiguration { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(
            GameError::InvalidConfiguration { reason: "rows" }.code(),
            "invalid_configuration"
        );
        assert_eq!(GameError::NoNearbyCell { x: 0.0, y: 0.0 }.code(), "no_nearby_cell");
        assert_eq!(GameError::UnknownStack(StackId(3)).code(), "invalid_stack");
    }

    #[test]
    fn only_configuration_errors_are_fatal() {
        assert!(!GameError::InvalidConfiguration { reason: "rows" }.is_recoverable());
        assert!(GameError::InsufficientCells {
            requested: 3,
            available: 1
        }
        .is_recoverable());
        assert!(GameError::NotRunning.is_recoverable());
    }

    #[test]
    fn display_mentions_the_point() {
        let msg = GameError::NoNearbyCell { x: 12.5, y: 40.0 }.to_string();
        assert!(msg.contains("12.5"));
        assert!(msg.contains("40"));
    }
}
