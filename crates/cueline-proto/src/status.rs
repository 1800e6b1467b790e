//! Rehearsal session status.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a rehearsal session.
///
/// `Active` and `Paused` toggle freely; `Completed` is terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Active,
    Paused,
    Completed,
}

impl SessionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::Active => "active",
            SessionStatus::Paused => "paused",
            SessionStatus::Completed => "completed",
        }
    }

    /// Returns true if no further transitions are accepted.
    pub fn is_terminal(self) -> bool {
        self == SessionStatus::Completed
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
