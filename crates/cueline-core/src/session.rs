//! Rehearsal session progression.
//!
//! A [`RehearsalSession`] is a cursor into the element sequence plus a
//! status. Every transition borrows the current session and returns a new
//! one, so a rejected transition leaves the caller's state untouched:
//!
//! ```text
//! active ──pause──▶ paused ──resume──▶ active
//!   │                 │
//!   └──complete──▶ completed ◀──complete──┘
//! ```
//!
//! `completed` is terminal. Cursor moves keep `0 <= cursor < len`.

use crate::config::{TimingConfig, WindowConfig};
use crate::context_window::{ContextWindow, OwnedContextWindow};
use crate::turn_resolver::resolve_next_speaker;
use chrono::{DateTime, Utc};
use cueline_proto::{Element, Error, NextSpeaker, ParsedScript, Result, SessionStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

/// What a silence report led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SilenceOutcome {
    /// The silence threshold passed and the cursor advanced.
    Advanced,
    /// Long silence without advancing: offer to hold position.
    OfferHold,
    /// Nothing to do yet.
    Waiting,
}

/// Result of [`RehearsalSession::silence_timeout`].
#[derive(Debug, Clone, PartialEq)]
pub struct SilenceCheck {
    pub session: RehearsalSession,
    pub outcome: SilenceOutcome,
}

/// Context window and next speaker for one cursor position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnSnapshot<'a> {
    pub window: ContextWindow<'a>,
    pub next_speaker: NextSpeaker,
}

impl TurnSnapshot<'_> {
    pub fn to_owned_snapshot(&self) -> OwnedTurnSnapshot {
        OwnedTurnSnapshot {
            window: self.window.to_owned_window(),
            next_speaker: self.next_speaker.clone(),
        }
    }
}

/// A [`TurnSnapshot`] detached from the element sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnedTurnSnapshot {
    pub window: OwnedContextWindow,
    pub next_speaker: NextSpeaker,
}

/// One rehearsal attempt of one script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RehearsalSession {
    user_character: String,
    ai_characters: Vec<String>,
    current_line_index: usize,
    status: SessionStatus,
    voice_mappings: BTreeMap<String, String>,
    auto_advance: bool,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl RehearsalSession {
    /// Starts an active session at the first element.
    ///
    /// Fails if the user character is also listed as AI-voiced.
    pub fn create(
        user_character: impl Into<String>,
        ai_characters: impl IntoIterator<Item = impl Into<String>>,
        voice_mappings: BTreeMap<String, String>,
    ) -> Result<Self> {
        let user_character = user_character.into();
        let mut cast: Vec<String> = Vec::new();

        for name in ai_characters {
            let name = name.into();
            if name == user_character {
                return Err(Error::CastConflict { character: name });
            }
            if !cast.contains(&name) {
                cast.push(name);
            }
        }

        debug!(user = %user_character, ai = ?cast, "Rehearsal session created");

        Ok(Self {
            user_character,
            ai_characters: cast,
            current_line_index: 0,
            status: SessionStatus::Active,
            voice_mappings,
            auto_advance: true,
            started_at: Utc::now(),
            completed_at: None,
        })
    }

    /// Starts a session where the AI voices every other speaking character.
    pub fn for_script(
        script: &ParsedScript,
        user_character: impl Into<String>,
        voice_mappings: BTreeMap<String, String>,
    ) -> Result<Self> {
        let user_character = user_character.into();
        let ai: Vec<String> = script
            .speaking_characters
            .iter()
            .filter(|c| **c != user_character)
            .cloned()
            .collect();
        Self::create(user_character, ai, voice_mappings)
    }

    /// Sets the initial auto-advance preference.
    pub fn with_auto_advance(mut self, enabled: bool) -> Self {
        self.auto_advance = enabled;
        self
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    pub fn user_character(&self) -> &str {
        &self.user_character
    }

    pub fn ai_characters(&self) -> &[String] {
        &self.ai_characters
    }

    pub fn cursor(&self) -> usize {
        self.current_line_index
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn voice_mappings(&self) -> &BTreeMap<String, String> {
        &self.voice_mappings
    }

    /// Voice assigned to a character, if any.
    pub fn voice_for(&self, character: &str) -> Option<&str> {
        self.voice_mappings.get(character).map(String::as_str)
    }

    pub fn auto_advance(&self) -> bool {
        self.auto_advance
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    /// Element under the cursor.
    pub fn current_element<'a>(&self, elements: &'a [Element]) -> Option<&'a Element> {
        elements.get(self.current_line_index)
    }

    /// Scene under the cursor; front matter and empty scripts report scene 1.
    pub fn current_scene(&self, elements: &[Element]) -> u32 {
        self.current_element(elements)
            .map(|el| el.scene_number)
            .filter(|scene| *scene > 0)
            .unwrap_or(1)
    }

    /// Returns true if the element under the cursor is the user's.
    pub fn is_user_line(&self, elements: &[Element]) -> bool {
        self.current_element(elements)
            .and_then(|el| el.speaker())
            .is_some_and(|name| name == self.user_character)
    }

    /// Context window around the cursor.
    pub fn window<'a>(&self, elements: &'a [Element], config: &WindowConfig) -> ContextWindow<'a> {
        ContextWindow::build(elements, self.current_line_index, config)
    }

    /// Who speaks next from the cursor.
    pub fn next_speaker(&self, elements: &[Element]) -> NextSpeaker {
        resolve_next_speaker(
            elements,
            self.current_line_index,
            &self.user_character,
            &self.ai_characters,
        )
    }

    /// Window plus next speaker, recomputed for the current cursor.
    pub fn snapshot<'a>(&self, elements: &'a [Element], config: &WindowConfig) -> TurnSnapshot<'a> {
        TurnSnapshot {
            window: self.window(elements, config),
            next_speaker: self.next_speaker(elements),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Transitions
    // ─────────────────────────────────────────────────────────────────────────

    fn ensure_open(&self, action: &'static str) -> Result<()> {
        if self.status.is_terminal() {
            return Err(Error::InvalidTransition {
                action,
                status: self.status,
            });
        }
        Ok(())
    }

    fn with_cursor(&self, index: usize) -> Self {
        Self {
            current_line_index: index,
            ..self.clone()
        }
    }

    fn with_status(&self, status: SessionStatus) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }

    /// Moves to the next element; stays put on the last one.
    pub fn advance(&self, len: usize) -> Result<Self> {
        self.ensure_open("advance")?;
        if len == 0 {
            return Err(Error::EmptyScript);
        }

        let next = self.current_line_index.saturating_add(1).min(len - 1);
        debug!(from = self.current_line_index, to = next, "Advance");
        Ok(self.with_cursor(next))
    }

    /// Moves to the previous element; stays put on the first one.
    pub fn rewind(&self, len: usize) -> Result<Self> {
        self.ensure_open("rewind")?;
        if len == 0 {
            return Err(Error::EmptyScript);
        }

        let prev = self.current_line_index.saturating_sub(1).min(len - 1);
        debug!(from = self.current_line_index, to = prev, "Rewind");
        Ok(self.with_cursor(prev))
    }

    /// Moves the cursor to an explicit element.
    pub fn jump_to(&self, index: usize, len: usize) -> Result<Self> {
        self.ensure_open("jump")?;
        if index >= len {
            return Err(Error::CursorOutOfRange { index, len });
        }

        debug!(from = self.current_line_index, to = index, "Jump");
        Ok(self.with_cursor(index))
    }

    /// Pauses the session; pausing a paused session changes nothing.
    pub fn pause(&self) -> Result<Self> {
        self.ensure_open("pause")?;
        Ok(self.with_status(SessionStatus::Paused))
    }

    /// Resumes the session; resuming an active session changes nothing.
    pub fn resume(&self) -> Result<Self> {
        self.ensure_open("resume")?;
        Ok(self.with_status(SessionStatus::Active))
    }

    /// Flips between active and paused.
    pub fn toggle_pause(&self) -> Result<Self> {
        match self.status {
            SessionStatus::Active => self.pause(),
            SessionStatus::Paused => self.resume(),
            SessionStatus::Completed => self.pause(),
        }
    }

    /// Ends the session and stamps the completion time.
    pub fn complete(&self) -> Result<Self> {
        self.ensure_open("complete")?;
        debug!(cursor = self.current_line_index, "Session completed");
        Ok(Self {
            status: SessionStatus::Completed,
            completed_at: Some(Utc::now()),
            ..self.clone()
        })
    }

    /// Enables or disables silence-driven auto-advance.
    pub fn set_auto_advance(&self, enabled: bool) -> Result<Self> {
        self.ensure_open("change auto-advance of")?;
        Ok(Self {
            auto_advance: enabled,
            ..self.clone()
        })
    }

    /// Reacts to `elapsed` silence since the user stopped speaking.
    ///
    /// Advances once the silence threshold is reached while active with
    /// auto-advance on. The hold threshold only ever produces a signal.
    pub fn silence_timeout(&self, elapsed: Duration, timing: &TimingConfig, len: usize) -> SilenceCheck {
        if self.is_active() && self.auto_advance && elapsed >= timing.silence_threshold() {
            if let Ok(session) = self.advance(len) {
                return SilenceCheck {
                    session,
                    outcome: SilenceOutcome::Advanced,
                };
            }
        }

        let outcome = if !self.status.is_terminal() && elapsed >= timing.hold_threshold() {
            SilenceOutcome::OfferHold
        } else {
            SilenceOutcome::Waiting
        };

        SilenceCheck {
            session: self.clone(),
            outcome,
        }
    }

    /// Advances after the AI partner finished its line, unless paused.
    pub fn ai_turn_finished(&self, len: usize) -> Result<Self> {
        self.ensure_open("advance")?;
        if self.status == SessionStatus::Paused {
            debug!("AI turn finished while paused, holding position");
            return Ok(self.clone());
        }
        self.advance(len)
    }
}
