//! Next-speaker classification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Who is expected to voice the next line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeakerKind {
    /// The rehearsing actor.
    User,
    /// A character voiced by the AI scene partner.
    Ai,
    /// A character in neither cast, or no remaining dialogue.
    Unknown,
}

impl SpeakerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SpeakerKind::User => "user",
            SpeakerKind::Ai => "ai",
            SpeakerKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SpeakerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The character who speaks next and how they are voiced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextSpeaker {
    pub character: String,
    #[serde(rename = "type")]
    pub kind: SpeakerKind,
}

impl NextSpeaker {
    /// Placeholder returned when no dialogue remains.
    pub fn unknown() -> Self {
        Self {
            character: "unknown".to_string(),
            kind: SpeakerKind::Unknown,
        }
    }

    pub fn is_ai(&self) -> bool {
        self.kind == SpeakerKind::Ai
    }

    pub fn is_user(&self) -> bool {
        self.kind == SpeakerKind::User
    }
}
