//! The parse result handed to persistence collaborators.

use crate::{Element, ElementType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Heuristic quality grade of a parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    pub fn as_str(self) -> &'static str {
        match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive running-time band in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationEstimate {
    pub min_minutes: u32,
    pub max_minutes: u32,
}

impl fmt::Display for DurationEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{} min", self.min_minutes, self.max_minutes)
    }
}

/// Structured screenplay produced by the parser.
///
/// Character lists keep first-seen order so that parsing the same input
/// twice yields identical values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedScript {
    pub title: String,
    pub characters: Vec<String>,
    pub speaking_characters: Vec<String>,
    pub non_speaking_characters: Vec<String>,
    pub scene_count: u32,
    pub total_dialogue_lines: usize,
    pub estimated_duration: DurationEstimate,
    pub confidence: Confidence,
    pub elements: Vec<Element>,
}

impl ParsedScript {
    /// Returns true if the character has at least one line of dialogue.
    pub fn is_speaking(&self, character: &str) -> bool {
        self.speaking_characters.iter().any(|c| c == character)
    }

    /// Returns the dialogue elements spoken by a character.
    pub fn lines_for<'a>(&'a self, character: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.elements.iter().filter(move |el| {
            el.element_type == ElementType::Dialogue && el.speaker() == Some(character)
        })
    }

    /// Returns true if nothing structural was recognised.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
