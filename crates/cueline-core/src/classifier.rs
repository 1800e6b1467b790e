//! Line classification for screenplay text.
//!
//! Classifies one normalized line at a time, peeking at its neighbours
//! when the decision needs lookahead:
//! ```text
//! INT. KITCHEN - DAY      -> scene heading
//! JOHN                    -> character cue (a spoken line follows)
//! (smiling)               -> parenthetical
//! Hello there.            -> action, unless consumed as dialogue
//! CUT TO:                 -> transition
//! ```
//!
//! This is a heuristic, not a grammar. An all-caps action line followed by
//! more text reads exactly like a cue and is classified as one.

use regex::Regex;
use std::sync::LazyLock;

/// Scene heading prefixes, case-insensitive.
static SCENE_HEADING_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(INT|EXT|INT\.?/EXT|EXT\.?/INT|I/E|E/I)[.\s]").expect("valid scene heading regex")
});

/// Strict Title Case: every word capitalised, letters only.
static TITLE_CASE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][a-z]+(\s+[A-Z][a-z]+)*$").expect("valid title case regex"));

/// Transition keywords, matched as uppercase substrings.
pub const TRANSITION_KEYWORDS: &[&str] = &[
    "CUT TO:",
    "FADE TO:",
    "FADE IN:",
    "FADE OUT:",
    "DISSOLVE TO:",
    "SMASH CUT TO:",
    "MATCH CUT TO:",
    "JUMP CUT TO:",
];

/// Longest line accepted as a character cue.
pub const MAX_CUE_CHARS: usize = 40;

/// Most words accepted in a character cue.
pub const MAX_CUE_WORDS: usize = 4;

/// Structural tag of a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineTag {
    SceneHeading,
    Transition,
    CharacterCue,
    Parenthetical,
    /// Fallback. Only emitted once a scene has started.
    Action,
}

/// Strategy for tagging screenplay lines.
///
/// The assembler only talks to this trait, so stricter casing rules or
/// format-specific dialects can be swapped in without touching it.
pub trait LineClassifier {
    /// Returns true if the line opens a new scene.
    fn is_scene_heading(&self, line: &str) -> bool;

    /// Returns true if the line is a transition such as `CUT TO:`.
    fn is_transition(&self, line: &str) -> bool;

    /// Returns true if the line is a parenthetical stage direction.
    fn is_parenthetical(&self, line: &str) -> bool;

    /// Returns true if `lines[index]` introduces a block of dialogue.
    fn is_character_cue(&self, lines: &[String], index: usize) -> bool;

    /// Tags `lines[index]`; the first matching rule wins.
    fn classify(&self, lines: &[String], index: usize) -> LineTag {
        let line = lines[index].as_str();

        if self.is_scene_heading(line) {
            LineTag::SceneHeading
        } else if self.is_transition(line) {
            LineTag::Transition
        } else if self.is_character_cue(lines, index) {
            LineTag::CharacterCue
        } else if self.is_parenthetical(line) {
            LineTag::Parenthetical
        } else {
            LineTag::Action
        }
    }
}

/// The stock classifier for US-style screenplays.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicClassifier;

impl HeuristicClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Returns true if the text is all caps or strict Title Case.
    fn has_cue_casing(text: &str) -> bool {
        text == text.to_uppercase() || TITLE_CASE_PATTERN.is_match(text)
    }
}

impl LineClassifier for HeuristicClassifier {
    fn is_scene_heading(&self, line: &str) -> bool {
        SCENE_HEADING_PATTERN.is_match(line.trim())
    }

    fn is_transition(&self, line: &str) -> bool {
        let upper = line.to_uppercase();
        TRANSITION_KEYWORDS.iter().any(|keyword| upper.contains(keyword))
    }

    fn is_parenthetical(&self, line: &str) -> bool {
        let trimmed = line.trim();
        trimmed.starts_with('(') && trimmed.ends_with(')')
    }

    fn is_character_cue(&self, lines: &[String], index: usize) -> bool {
        let Some(line) = lines.get(index) else {
            return false;
        };
        let trimmed = line.trim();

        if trimmed.is_empty() || trimmed.chars().count() > MAX_CUE_CHARS {
            return false;
        }

        if trimmed.split_whitespace().count() > MAX_CUE_WORDS {
            return false;
        }

        if !Self::has_cue_casing(trimmed) {
            return false;
        }

        // A cue must be followed by a parenthetical or spoken text
        let Some(next) = lines.get(index + 1) else {
            return false;
        };
        let next = next.trim();

        self.is_parenthetical(next)
            || (!next.is_empty() && !self.is_scene_heading(next) && !self.is_transition(next))
    }
}
