//! Title, running time and confidence scoring for parsed scripts.

use cueline_proto::{Confidence, DurationEstimate};
use regex::Regex;
use std::sync::LazyLock;

/// Title page boilerplate that is never the title itself.
static TITLE_BOILERPLATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(written by|created by|episode|draft|revision|date|page)")
        .expect("valid title boilerplate regex")
});

/// Fallback title when no candidate line is found.
pub const UNTITLED: &str = "Untitled Script";

/// Picks the title from the first `scan_lines` lines.
///
/// The first line that is not boilerplate, is longer than 2 and shorter
/// than 100 characters, and has no double-space run wins.
pub fn extract_title(lines: &[String], scan_lines: usize) -> String {
    lines
        .iter()
        .take(scan_lines)
        .map(|line| line.trim())
        .filter(|line| !TITLE_BOILERPLATE_PATTERN.is_match(line))
        .find(|line| {
            let len = line.chars().count();
            len > 2 && len < 100 && !line.contains("  ")
        })
        .map_or_else(|| UNTITLED.to_string(), str::to_string)
}

/// Estimates running time from page count: 0.8 to 1.2 minutes per page.
pub fn estimate_duration(page_count: u32) -> DurationEstimate {
    let pages = f64::from(page_count);
    DurationEstimate {
        min_minutes: ((pages * 0.8).round() as u32).max(1),
        max_minutes: (pages * 1.2).round() as u32,
    }
}

/// Grades a parse by how much screenplay structure it found.
pub fn grade_confidence(scene_count: u32, speaking_characters: usize) -> Confidence {
    match (scene_count > 0, speaking_characters >= 2) {
        (true, true) => Confidence::High,
        (true, false) => Confidence::Medium,
        (false, _) => Confidence::Low,
    }
}
