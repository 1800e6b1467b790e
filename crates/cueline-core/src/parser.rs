//! Screenplay parsing from extracted document text.
//!
//! Document decoding is somebody else's job; this module starts from the
//! extracted text (pages separated by form feeds), normalizes it into
//! trimmed non-empty lines, and produces a [`ParsedScript`]. Parsing never
//! fails: unrecognisable input yields an empty, low-confidence script.

use crate::assembler::ScreenplayAssembler;
use crate::classifier::{HeuristicClassifier, LineClassifier};
use crate::config::ParserConfig;
use crate::scorer::{estimate_duration, extract_title, grade_confidence};
use cueline_proto::ParsedScript;
use tracing::info;

/// Page separator emitted by PDF text extraction.
const FORM_FEED: char = '\u{000C}';

/// Splits text into trimmed, non-empty lines.
pub fn normalize_lines(text: &str) -> Vec<String> {
    text.split(['\n', FORM_FEED])
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Counts form-feed separated pages that contain any text.
///
/// Returns at least 1 for non-blank text and 0 for blank text.
pub fn count_pages(text: &str) -> u32 {
    if text.trim().is_empty() {
        return 0;
    }
    let pages = text.split(FORM_FEED).filter(|page| !page.trim().is_empty()).count();
    (pages as u32).max(1)
}

/// Parses normalized screenplay lines into a [`ParsedScript`].
#[derive(Debug, Clone, Default)]
pub struct ScriptParser<C = HeuristicClassifier> {
    assembler: ScreenplayAssembler<C>,
    config: ParserConfig,
}

impl ScriptParser<HeuristicClassifier> {
    /// Creates a parser with the stock classifier and default tunables.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: LineClassifier> ScriptParser<C> {
    /// Creates a parser with a custom classification strategy.
    pub fn with_classifier(classifier: C) -> Self {
        Self {
            assembler: ScreenplayAssembler::with_classifier(classifier),
            config: ParserConfig::default(),
        }
    }

    /// Overrides the parser tunables.
    pub fn with_config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    /// Parses already-normalized lines.
    pub fn parse_lines(&self, lines: &[String], page_count: u32) -> ParsedScript {
        let title = extract_title(lines, self.config.title_scan_lines);
        let state = self.assembler.assemble(lines);

        let non_speaking_characters = state.non_speaking_characters();
        let total_dialogue_lines = state.total_dialogue_lines();
        let confidence = grade_confidence(state.scene_number, state.speaking_characters.len());

        info!(
            title = %title,
            scenes = state.scene_number,
            characters = state.characters.len(),
            dialogue_lines = total_dialogue_lines,
            confidence = %confidence,
            "Screenplay parsed"
        );

        ParsedScript {
            title,
            characters: state.characters,
            speaking_characters: state.speaking_characters,
            non_speaking_characters,
            scene_count: state.scene_number,
            total_dialogue_lines,
            estimated_duration: estimate_duration(page_count),
            confidence,
            elements: state.elements,
        }
    }

    /// Normalizes raw extracted text, then parses it.
    ///
    /// When `page_count` is `None` it is derived from form feeds.
    pub fn parse_text(&self, text: &str, page_count: Option<u32>) -> ParsedScript {
        let pages = page_count.unwrap_or_else(|| count_pages(text));
        self.parse_lines(&normalize_lines(text), pages)
    }
}
