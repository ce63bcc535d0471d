//! Error types for the `monopoly-board` crate.

/// Errors raised while constructing a [`Board`](crate::Board).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    /// The requested topology violates a board invariant.
    #[error("invalid board: {reason}")]
    InvalidBoard {
        /// Explanation of which invariant was violated.
        reason: String,
    },
}
