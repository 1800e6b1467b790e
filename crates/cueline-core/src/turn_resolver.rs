//! Next-speaker resolution.

use cueline_proto::{Element, NextSpeaker, SpeakerKind};

/// Finds who speaks the first dialogue line at or after `cursor`.
///
/// Stateless: repeated calls with the same inputs return the same answer.
pub fn resolve_next_speaker(
    elements: &[Element],
    cursor: usize,
    user_character: &str,
    ai_characters: &[String],
) -> NextSpeaker {
    let Some(name) = elements
        .iter()
        .skip(cursor)
        .find(|el| el.is_spoken_line())
        .and_then(|el| el.speaker())
    else {
        return NextSpeaker::unknown();
    };

    let kind = if name == user_character {
        SpeakerKind::User
    } else if ai_characters.iter().any(|c| c == name) {
        SpeakerKind::Ai
    } else {
        SpeakerKind::Unknown
    };

    NextSpeaker {
        character: name.to_string(),
        kind,
    }
}
