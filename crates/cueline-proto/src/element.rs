//! Structural elements of a parsed screenplay.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Structural type of a screenplay element.
///
/// Parentheticals are never emitted on their own; they ride on the
/// character cue that owns them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementType {
    SceneHeading,
    Transition,
    CharacterCue,
    Dialogue,
    Action,
}

impl ElementType {
    /// Returns the wire name of this element type.
    pub fn as_str(self) -> &'static str {
        match self {
            ElementType::SceneHeading => "scene_heading",
            ElementType::Transition => "transition",
            ElementType::CharacterCue => "character_cue",
            ElementType::Dialogue => "dialogue",
            ElementType::Action => "action",
        }
    }

    /// Short tag used when building line identifiers.
    fn id_tag(self) -> &'static str {
        match self {
            ElementType::SceneHeading => "heading",
            ElementType::Transition => "trans",
            ElementType::CharacterCue => "char",
            ElementType::Dialogue => "dialog",
            ElementType::Action => "action",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One structural unit of a screenplay, in reading order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    /// Identifier unique within a script.
    pub line_id: String,

    /// Scene this element belongs to (0 for front matter).
    pub scene_number: u32,

    /// Position in the total order of the script.
    pub element_index: usize,

    pub element_type: ElementType,

    /// Speaking character, only on cues and dialogue.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character_name: Option<String>,

    /// Raw heading, action, cue or transition text.
    pub content: String,

    /// Spoken text, only on cues and dialogue.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dialogue: Option<String>,

    /// Stage direction attached to a character cue.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parenthetical: Option<String>,
}

impl Element {
    /// Creates an element with no character data attached.
    pub fn new(
        element_type: ElementType,
        scene_number: u32,
        element_index: usize,
        content: impl Into<String>,
    ) -> Self {
        let line_id = match element_type {
            ElementType::SceneHeading => format!("scene_{scene_number}_heading"),
            other => format!("scene_{scene_number}_{}_{element_index}", other.id_tag()),
        };

        Self {
            line_id,
            scene_number,
            element_index,
            element_type,
            character_name: None,
            content: content.into(),
            dialogue: None,
            parenthetical: None,
        }
    }

    /// Attaches the speaking character and their line.
    pub fn with_speech(mut self, character: impl Into<String>, dialogue: impl Into<String>) -> Self {
        self.character_name = Some(character.into());
        self.dialogue = Some(dialogue.into());
        self
    }

    /// Attaches a stage direction.
    pub fn with_parenthetical(mut self, parenthetical: Option<String>) -> Self {
        self.parenthetical = parenthetical;
        self
    }

    /// Returns true if this is a dialogue element with a speaker.
    pub fn is_spoken_line(&self) -> bool {
        self.element_type == ElementType::Dialogue
            && self.character_name.as_deref().is_some_and(|name| !name.is_empty())
    }

    /// Returns the speaking character, if any.
    pub fn speaker(&self) -> Option<&str> {
        self.character_name.as_deref()
    }
}
