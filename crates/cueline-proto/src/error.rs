//! Error types shared across Cueline crates.

use crate::SessionStatus;

/// Result alias using the shared [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Recoverable conditions raised by session transitions.
///
/// None of these are fatal; callers usually ignore the request and keep
/// the previous session state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The transition is not allowed from the current status.
    #[error("Invalid transition: cannot {action} a {status} session")]
    InvalidTransition {
        action: &'static str,
        status: SessionStatus,
    },

    /// The requested cursor lies outside the element sequence.
    #[error("Cursor {index} is out of range for {len} elements")]
    CursorOutOfRange { index: usize, len: usize },

    /// The script has no elements to move through.
    #[error("Script has no elements")]
    EmptyScript,

    /// The user character was also listed as AI-voiced.
    #[error("Character '{character}' cannot be both the user and an AI character")]
    CastConflict { character: String },
}

impl Error {
    /// Returns true if this error came from a rejected status transition.
    pub fn is_invalid_transition(&self) -> bool {
        matches!(self, Error::InvalidTransition { .. })
    }
}
