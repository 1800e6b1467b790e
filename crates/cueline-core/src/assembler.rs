//! Screenplay assembly.
//!
//! A single left-to-right pass over normalized lines that turns classified
//! lines into the ordered element sequence. The scan counters and character
//! sets live in an explicit [`AssemblyState`] that each step consumes and
//! returns, so assembly is a plain fold over the line list.

use crate::classifier::{HeuristicClassifier, LineClassifier, LineTag};
use cueline_proto::{Element, ElementType};
use tracing::{debug, trace};

/// Accumulator threaded through the assembly fold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssemblyState {
    /// Current scene (0 until the first heading).
    pub scene_number: u32,
    /// Index the next emitted element will receive.
    pub next_index: usize,
    /// Every name seen as a cue, first-seen order.
    pub characters: Vec<String>,
    /// Names with at least one line of dialogue, first-seen order.
    pub speaking_characters: Vec<String>,
    /// Elements emitted so far.
    pub elements: Vec<Element>,
}

impl AssemblyState {
    /// Appends an element stamped with the current scene and next index.
    fn emit(&mut self, element_type: ElementType, content: impl Into<String>) -> &mut Element {
        let element = Element::new(element_type, self.scene_number, self.next_index, content);
        self.next_index += 1;
        self.elements.push(element);
        let last = self.elements.len() - 1;
        &mut self.elements[last]
    }

    fn record_character(&mut self, name: &str) {
        if !self.characters.iter().any(|c| c == name) {
            self.characters.push(name.to_string());
        }
    }

    fn record_speaker(&mut self, name: &str) {
        if !self.speaking_characters.iter().any(|c| c == name) {
            self.speaking_characters.push(name.to_string());
        }
    }

    /// Characters with a cue but no dialogue.
    pub fn non_speaking_characters(&self) -> Vec<String> {
        self.characters
            .iter()
            .filter(|c| !self.speaking_characters.contains(c))
            .cloned()
            .collect()
    }

    /// Number of emitted dialogue elements.
    pub fn total_dialogue_lines(&self) -> usize {
        self.elements
            .iter()
            .filter(|el| el.element_type == ElementType::Dialogue)
            .count()
    }
}

/// Dialogue gathered after a cue.
struct DialogueBlock {
    parenthetical: Option<String>,
    text: String,
    /// First line index after the block.
    end: usize,
}

/// Builds the element sequence from normalized lines.
#[derive(Debug, Clone, Default)]
pub struct ScreenplayAssembler<C = HeuristicClassifier> {
    classifier: C,
}

impl ScreenplayAssembler<HeuristicClassifier> {
    /// Creates an assembler using the stock heuristic classifier.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: LineClassifier> ScreenplayAssembler<C> {
    /// Creates an assembler with a custom classification strategy.
    pub fn with_classifier(classifier: C) -> Self {
        Self { classifier }
    }

    /// Returns the classifier in use.
    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    /// Folds the whole line list into an assembly state.
    pub fn assemble(&self, lines: &[String]) -> AssemblyState {
        let mut state = AssemblyState::default();
        let mut i = 0;

        while i < lines.len() {
            let (next_state, next_i) = self.step(state, lines, i);
            state = next_state;
            i = next_i;
        }

        debug!(
            scenes = state.scene_number,
            elements = state.elements.len(),
            characters = state.characters.len(),
            speaking = state.speaking_characters.len(),
            "Screenplay assembled"
        );

        state
    }

    /// Consumes the line at `i` (and any dialogue it owns).
    ///
    /// Returns the updated state and the index of the next unconsumed line.
    pub fn step(&self, mut state: AssemblyState, lines: &[String], i: usize) -> (AssemblyState, usize) {
        let line = lines[i].as_str();

        match self.classifier.classify(lines, i) {
            LineTag::SceneHeading => {
                state.scene_number += 1;
                state.emit(ElementType::SceneHeading, line);
                trace!(scene = state.scene_number, line = i, "Scene heading");
                return (state, i + 1);
            }
            LineTag::Transition => {
                state.emit(ElementType::Transition, line);
                trace!(scene = state.scene_number, line = i, "Transition");
                return (state, i + 1);
            }
            LineTag::CharacterCue => {
                let name = line.trim();
                state.record_character(name);

                let block = self.collect_dialogue(lines, i);
                if !block.text.is_empty() {
                    state.record_speaker(name);

                    let cue = state.emit(ElementType::CharacterCue, line);
                    cue.character_name = Some(name.to_string());
                    cue.dialogue = Some(block.text.clone());
                    cue.parenthetical = block.parenthetical;

                    // Plain copy of the spoken text for presentation
                    let spoken = state.emit(ElementType::Dialogue, block.text.as_str());
                    spoken.character_name = Some(name.to_string());
                    spoken.dialogue = Some(block.text);

                    trace!(character = name, line = i, consumed = block.end - i, "Dialogue block");
                    return (state, block.end);
                }

                // No dialogue followed: re-evaluate as a plain line
                trace!(character = name, line = i, "Cue without dialogue");
            }
            LineTag::Parenthetical | LineTag::Action => {}
        }

        if self.classifier.is_parenthetical(line) {
            // Stray parenthetical not owned by a cue
            return (state, i + 1);
        }

        if state.scene_number > 0 && !line.trim().is_empty() {
            state.emit(ElementType::Action, line);
        }

        (state, i + 1)
    }

    /// Gathers the parenthetical and spoken lines following the cue at `cue`.
    fn collect_dialogue(&self, lines: &[String], cue: usize) -> DialogueBlock {
        let mut cursor = cue + 1;
        let mut parenthetical = None;

        if let Some(next) = lines.get(cursor) {
            if self.classifier.is_parenthetical(next) {
                parenthetical = Some(strip_parentheses(next));
                cursor += 1;
            }
        }

        let mut spoken: Vec<&str> = Vec::new();
        while cursor < lines.len() && !self.is_block_boundary(lines, cursor) {
            let text = lines[cursor].trim();
            if !text.is_empty() && !self.classifier.is_parenthetical(text) {
                spoken.push(text);
            }
            cursor += 1;
        }

        DialogueBlock {
            parenthetical,
            text: spoken.join(" "),
            end: cursor,
        }
    }

    fn is_block_boundary(&self, lines: &[String], index: usize) -> bool {
        let line = lines[index].as_str();
        self.classifier.is_scene_heading(line)
            || self.classifier.is_character_cue(lines, index)
            || self.classifier.is_transition(line)
    }
}

/// Removes every parenthesis and trims the result.
fn strip_parentheses(text: &str) -> String {
    text.chars()
        .filter(|c| *c != '(' && *c != ')')
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn test_front_matter_discarded() {
        let state = ScreenplayAssembler::new().assemble(&lines(&[
            "Written by Someone",
            "Draft 3",
            "INT. KITCHEN - DAY",
            "Steam rises.",
        ]));

        assert_eq!(state.elements.len(), 2);
        assert_eq!(state.elements[0].element_type, ElementType::SceneHeading);
        assert_eq!(state.elements[1].element_type, ElementType::Action);
        assert_eq!(state.elements[1].content, "Steam rises.");
    }

    #[test]
    fn test_cue_emits_cue_and_dialogue_pair() {
        let state = ScreenplayAssembler::new().assemble(&lines(&[
            "INT. KITCHEN - DAY",
            "JOHN",
            "(smiling)",
            "Hello there.",
            "How are you?",
        ]));

        assert_eq!(state.elements.len(), 3);
        let cue = &state.elements[1];
        assert_eq!(cue.element_type, ElementType::CharacterCue);
        assert_eq!(cue.content, "JOHN");
        assert_eq!(cue.parenthetical.as_deref(), Some("smiling"));
        assert_eq!(cue.dialogue.as_deref(), Some("Hello there. How are you?"));
        assert_eq!(cue.line_id, "scene_1_char_1");

        let spoken = &state.elements[2];
        assert_eq!(spoken.element_type, ElementType::Dialogue);
        assert_eq!(spoken.content, "Hello there. How are you?");
        assert_eq!(spoken.character_name.as_deref(), Some("JOHN"));
        assert_eq!(spoken.parenthetical, None);
        assert_eq!(spoken.line_id, "scene_1_dialog_2");
    }

    #[test]
    fn test_mid_dialogue_parenthetical_dropped_from_text() {
        let state = ScreenplayAssembler::new().assemble(&lines(&[
            "INT. HALL",
            "MARY",
            "Wait.",
            "(beat)",
            "Never mind.",
        ]));

        assert_eq!(state.elements[1].dialogue.as_deref(), Some("Wait. Never mind."));
        assert_eq!(state.elements[1].parenthetical, None);
    }

    #[test]
    fn test_cue_without_dialogue_falls_back_to_action() {
        // Parenthetical-only follow up: cue, but nothing spoken
        let state = ScreenplayAssembler::new().assemble(&lines(&[
            "INT. HALL",
            "GHOST",
            "(silently)",
        ]));

        assert_eq!(state.characters, vec!["GHOST".to_string()]);
        assert!(state.speaking_characters.is_empty());
        assert_eq!(state.non_speaking_characters(), vec!["GHOST".to_string()]);
        assert_eq!(state.elements.len(), 2);
        assert_eq!(state.elements[1].element_type, ElementType::Action);
        assert_eq!(state.elements[1].content, "GHOST");
    }

    #[test]
    fn test_transition_carries_scene_number() {
        let state = ScreenplayAssembler::new().assemble(&lines(&[
            "FADE IN:",
            "INT. OFFICE - DAY",
            "Phones ring.",
            "CUT TO:",
            "EXT. STREET - NIGHT",
        ]));

        let kinds: Vec<_> = state.elements.iter().map(|e| (e.element_type, e.scene_number)).collect();
        assert_eq!(
            kinds,
            vec![
                (ElementType::Transition, 0),
                (ElementType::SceneHeading, 1),
                (ElementType::Action, 1),
                (ElementType::Transition, 1),
                (ElementType::SceneHeading, 2),
            ]
        );
        assert_eq!(state.scene_number, 2);
    }

    #[test]
    fn test_dialogue_stops_at_next_cue() {
        let state = ScreenplayAssembler::new().assemble(&lines(&[
            "INT. BAR",
            "JOHN",
            "Another round.",
            "MARY",
            "Make it two.",
        ]));

        assert_eq!(state.total_dialogue_lines(), 2);
        assert_eq!(state.elements[2].dialogue.as_deref(), Some("Another round."));
        assert_eq!(state.elements[4].dialogue.as_deref(), Some("Make it two."));
        assert_eq!(state.speaking_characters, vec!["JOHN".to_string(), "MARY".to_string()]);
    }

    #[test]
    fn test_stray_parenthetical_skipped() {
        let state = ScreenplayAssembler::new().assemble(&lines(&[
            "INT. BAR",
            "(aside)",
            "Glasses clink.",
        ]));

        assert_eq!(state.elements.len(), 2);
        assert_eq!(state.elements[1].content, "Glasses clink.");
    }

    #[test]
    fn test_cue_before_first_scene_is_kept() {
        let state = ScreenplayAssembler::new().assemble(&lines(&["NARRATOR", "Once upon a time."]));

        assert_eq!(state.elements.len(), 2);
        assert_eq!(state.elements[0].scene_number, 0);
        assert_eq!(state.elements[0].element_type, ElementType::CharacterCue);
    }

    #[test]
    fn test_step_threads_state() {
        let assembler = ScreenplayAssembler::new();
        let ls = lines(&["INT. ROOM", "Dust."]);

        let (state, next) = assembler.step(AssemblyState::default(), &ls, 0);
        assert_eq!(next, 1);
        assert_eq!(state.scene_number, 1);
        assert_eq!(state.next_index, 1);

        let (state, next) = assembler.step(state, &ls, 1);
        assert_eq!(next, 2);
        assert_eq!(state.next_index, 2);
    }

    #[test]
    fn test_strip_parentheses() {
        assert_eq!(strip_parentheses("(smiling)"), "smiling");
        assert_eq!(strip_parentheses("( to Mary (quietly) )"), "to Mary quietly");
    }

    struct NoCues;

    impl LineClassifier for NoCues {
        fn is_scene_heading(&self, line: &str) -> bool {
            line.starts_with("INT.")
        }
        fn is_transition(&self, _line: &str) -> bool {
            false
        }
        fn is_parenthetical(&self, _line: &str) -> bool {
            false
        }
        fn is_character_cue(&self, _lines: &[String], _index: usize) -> bool {
            false
        }
    }

    #[test]
    fn test_custom_classifier_substitution() {
        let assembler = ScreenplayAssembler::with_classifier(NoCues);
        let state = assembler.assemble(&lines(&["INT. ROOM", "JOHN", "Hello."]));

        assert!(state.characters.is_empty());
        assert_eq!(state.elements.len(), 3);
        assert!(state.elements[1..].iter().all(|e| e.element_type == ElementType::Action));
    }
}
