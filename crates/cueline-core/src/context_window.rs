//! Sliding context window around the rehearsal cursor.
//!
//! The window is recomputed on demand and never cached: it is fully
//! determined by the element sequence and the cursor.

use crate::config::WindowConfig;
use cueline_proto::{Element, ElementType};
use serde::Serialize;

/// Bounded view of the element sequence around a cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ContextWindow<'a> {
    /// First element index in the window (inclusive).
    pub start: usize,
    /// One past the last element index in the window.
    pub end: usize,
    /// Length of the whole sequence.
    pub total: usize,
    /// Cursor the window was built for.
    pub cursor: usize,
    /// Elements in `[start, end)`.
    pub elements: &'a [Element],
}

impl<'a> ContextWindow<'a> {
    /// Builds the window `[cursor - lookback, cursor + lookahead)`, clamped
    /// to the sequence.
    pub fn build(elements: &'a [Element], cursor: usize, config: &WindowConfig) -> Self {
        let total = elements.len();
        let end = cursor.saturating_add(config.lookahead).min(total);
        let start = cursor.saturating_sub(config.lookback).min(end);

        Self {
            start,
            end,
            total,
            cursor,
            elements: &elements[start..end],
        }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Returns the element under the cursor, if it lies in the window.
    pub fn current(&self) -> Option<&'a Element> {
        self.cursor
            .checked_sub(self.start)
            .and_then(|offset| self.elements.get(offset))
    }

    /// Dialogue elements in the window, in order.
    pub fn spoken_lines(&self) -> impl Iterator<Item = &'a Element> + 'a {
        self.elements.iter().filter(|el| el.is_spoken_line())
    }

    /// Scene headings and action lines in the window, in order.
    pub fn scene_context(&self) -> impl Iterator<Item = &'a Element> + 'a {
        self.elements.iter().filter(|el| {
            matches!(el.element_type, ElementType::SceneHeading | ElementType::Action)
        })
    }

    /// Returns true if the first dialogue in the window is AI-voiced.
    pub fn first_speaker_is_ai(&self, ai_characters: &[String]) -> bool {
        self.elements
            .iter()
            .find(|el| el.element_type == ElementType::Dialogue)
            .and_then(|el| el.speaker())
            .is_some_and(|name| ai_characters.iter().any(|c| c == name))
    }

    /// Detaches the window from the borrowed sequence.
    pub fn to_owned_window(&self) -> OwnedContextWindow {
        OwnedContextWindow {
            start: self.start,
            end: self.end,
            total: self.total,
            cursor: self.cursor,
            elements: self.elements.to_vec(),
        }
    }
}

/// A [`ContextWindow`] that owns its elements, for sending across tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnedContextWindow {
    pub start: usize,
    pub end: usize,
    pub total: usize,
    pub cursor: usize,
    pub elements: Vec<Element>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequence(len: usize) -> Vec<Element> {
        (0..len)
            .map(|i| Element::new(ElementType::Action, 1, i, format!("line {i}")))
            .collect()
    }

    #[test]
    fn test_window_in_the_middle() {
        let els = sequence(100);
        let window = ContextWindow::build(&els, 50, &WindowConfig::default());
        assert_eq!((window.start, window.end), (42, 70));
        assert_eq!(window.len(), 28);
        assert_eq!(window.current().unwrap().element_index, 50);
    }

    #[test]
    fn test_window_clamped_at_start() {
        let els = sequence(100);
        let window = ContextWindow::build(&els, 3, &WindowConfig::default());
        assert_eq!((window.start, window.end), (0, 23));
    }

    #[test]
    fn test_window_clamped_at_end() {
        let els = sequence(30);
        let window = ContextWindow::build(&els, 29, &WindowConfig::default());
        assert_eq!((window.start, window.end), (21, 30));
        assert_eq!(window.total, 30);
    }

    #[test]
    fn test_window_bounds_for_every_cursor() {
        let config = WindowConfig {
            lookback: 3,
            lookahead: 5,
        };
        for len in 0..12 {
            let els = sequence(len);
            for cursor in 0..=len + 2 {
                let window = ContextWindow::build(&els, cursor, &config);
                assert!(window.start <= window.end, "len={len} cursor={cursor}");
                assert!(window.end <= len, "len={len} cursor={cursor}");
            }
        }
    }

    #[test]
    fn test_empty_sequence() {
        let window = ContextWindow::build(&[], 0, &WindowConfig::default());
        assert!(window.is_empty());
        assert!(window.current().is_none());
    }

    #[test]
    fn test_first_speaker_is_ai() {
        let els = vec![
            Element::new(ElementType::SceneHeading, 1, 0, "INT. A"),
            Element::new(ElementType::CharacterCue, 1, 1, "MARY").with_speech("MARY", "Hi."),
            Element::new(ElementType::Dialogue, 1, 2, "Hi.").with_speech("MARY", "Hi."),
        ];
        let window = ContextWindow::build(&els, 0, &WindowConfig::default());

        assert!(window.first_speaker_is_ai(&["MARY".to_string()]));
        assert!(!window.first_speaker_is_ai(&["JOHN".to_string()]));
        assert_eq!(window.spoken_lines().count(), 1);
        assert_eq!(window.scene_context().count(), 1);
    }

    #[test]
    fn test_owned_window_matches() {
        let els = sequence(10);
        let window = ContextWindow::build(&els, 4, &WindowConfig::default());
        let owned = window.to_owned_window();
        assert_eq!(owned.elements.as_slice(), window.elements);
        assert_eq!(owned.cursor, 4);
    }
}
