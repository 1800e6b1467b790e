//! Timer-driven rehearsal driver.
//!
//! [`RehearsalDriver`] owns a [`RehearsalSession`] and the element sequence,
//! turns voice transport events into session transitions, and publishes
//! every visible change on an unbounded channel. Session transitions stay
//! pure; this module only decides *when* to apply them.

use crate::config::{CuelineConfig, TimingConfig, WindowConfig};
use crate::scheduler::{TimerKind, TimerSlots};
use crate::session::{OwnedTurnSnapshot, RehearsalSession, SilenceOutcome};
use cueline_proto::{Element, Result, SessionStatus};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Events reported by the realtime voice transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceEvent {
    /// The user started talking.
    SpeechStarted,
    /// The user stopped talking.
    SpeechStopped,
    /// A chunk of AI audio arrived.
    AiSpeechDelta,
    /// The AI partner finished its line.
    AiTurnFinished,
}

/// Changes published by the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverUpdate {
    /// The cursor moved; carries the recomputed window and next speaker.
    Moved(OwnedTurnSnapshot),
    /// Paused or resumed.
    StatusChanged(SessionStatus),
    /// Silence lasted long enough to offer a dramatic-pause hold.
    OfferHold,
    /// The session reached its terminal state.
    Completed,
}

#[derive(Debug)]
struct DriverState {
    session: RehearsalSession,
    ai_speaking: bool,
    hold_offered: bool,
}

#[derive(Debug)]
struct Shared {
    state: Mutex<DriverState>,
    timers: Mutex<TimerSlots>,
    elements: Arc<[Element]>,
    window: WindowConfig,
    timing: TimingConfig,
    updates: mpsc::UnboundedSender<DriverUpdate>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Shared {
    fn publish(&self, update: DriverUpdate) {
        // Receiver may have been dropped
        let _ = self.updates.send(update);
    }

    fn publish_changes(&self, before: &RehearsalSession, after: &RehearsalSession) {
        if after.cursor() != before.cursor() {
            let snapshot = after.snapshot(&self.elements, &self.window).to_owned_snapshot();
            self.publish(DriverUpdate::Moved(snapshot));
        }
        if after.status() != before.status() {
            if after.status() == SessionStatus::Completed {
                self.publish(DriverUpdate::Completed);
            } else {
                self.publish(DriverUpdate::StatusChanged(after.status()));
            }
        }
    }

    /// Applies a transition under the state lock and publishes the diff.
    fn apply<F>(&self, transition: F) -> Result<RehearsalSession>
    where
        F: FnOnce(&RehearsalSession, usize) -> Result<RehearsalSession>,
    {
        let mut state = lock(&self.state);
        let next = transition(&state.session, self.elements.len())?;
        if next.cursor() != state.session.cursor() {
            state.hold_offered = false;
        }
        self.publish_changes(&state.session, &next);
        state.session = next.clone();
        drop(state);

        if next.status().is_terminal() {
            lock(&self.timers).cancel_all();
        }
        Ok(next)
    }

    fn check_silence(&self, elapsed: Duration) -> SilenceOutcome {
        let mut state = lock(&self.state);
        let check = state
            .session
            .silence_timeout(elapsed, &self.timing, self.elements.len());

        let outcome = match check.outcome {
            SilenceOutcome::OfferHold if state.ai_speaking => SilenceOutcome::Waiting,
            other => other,
        };

        match outcome {
            SilenceOutcome::Advanced => {
                debug!(elapsed_ms = elapsed.as_millis(), "Silence threshold reached, advancing");
                state.hold_offered = false;
                self.publish_changes(&state.session, &check.session);
                state.session = check.session;
            }
            SilenceOutcome::OfferHold if !state.hold_offered => {
                debug!(elapsed_ms = elapsed.as_millis(), "Long silence, offering hold");
                state.hold_offered = true;
                self.publish(DriverUpdate::OfferHold);
            }
            SilenceOutcome::OfferHold | SilenceOutcome::Waiting => {}
        }
        outcome
    }
}

/// Drives one rehearsal from voice events and manual commands.
///
/// Cloning yields another handle to the same rehearsal. Methods that arm
/// timers must be called from within a tokio runtime.
#[derive(Debug, Clone)]
pub struct RehearsalDriver {
    shared: Arc<Shared>,
}

impl RehearsalDriver {
    /// Creates a driver and the receiving end of its update channel.
    pub fn new(
        session: RehearsalSession,
        elements: impl Into<Arc<[Element]>>,
        config: &CuelineConfig,
    ) -> (Self, mpsc::UnboundedReceiver<DriverUpdate>) {
        let (updates, rx) = mpsc::unbounded_channel();
        let shared = Shared {
            state: Mutex::new(DriverState {
                session,
                ai_speaking: false,
                hold_offered: false,
            }),
            timers: Mutex::new(TimerSlots::new()),
            elements: elements.into(),
            window: config.window,
            timing: config.timing,
            updates,
        };
        (
            Self {
                shared: Arc::new(shared),
            },
            rx,
        )
    }

    /// Current session state.
    pub fn session(&self) -> RehearsalSession {
        lock(&self.shared.state).session.clone()
    }

    pub fn elements(&self) -> &[Element] {
        &self.shared.elements
    }

    /// Window and next speaker for the current cursor.
    pub fn snapshot(&self) -> OwnedTurnSnapshot {
        self.session()
            .snapshot(&self.shared.elements, &self.shared.window)
            .to_owned_snapshot()
    }

    pub fn is_ai_speaking(&self) -> bool {
        lock(&self.shared.state).ai_speaking
    }

    pub fn hold_offered(&self) -> bool {
        lock(&self.shared.state).hold_offered
    }

    /// Returns true if a timer of this kind is pending.
    pub fn timer_armed(&self, kind: TimerKind) -> bool {
        lock(&self.shared.timers).is_armed(kind)
    }

    /// Feeds one transport event into the rehearsal.
    pub fn handle(&self, event: VoiceEvent) {
        debug!(?event, "Voice event");
        match event {
            VoiceEvent::SpeechStarted => {
                lock(&self.shared.timers).cancel(TimerKind::Silence);
                lock(&self.shared.state).hold_offered = false;
            }
            VoiceEvent::SpeechStopped => self.arm_silence_timer(),
            VoiceEvent::AiSpeechDelta => {
                let mut state = lock(&self.shared.state);
                state.ai_speaking = true;
                state.hold_offered = false;
            }
            VoiceEvent::AiTurnFinished => {
                lock(&self.shared.state).ai_speaking = false;
                self.arm_post_speech_timer();
            }
        }
    }

    fn arm_silence_timer(&self) {
        if lock(&self.shared.state).session.status().is_terminal() {
            return;
        }

        let shared = Arc::clone(&self.shared);
        let silence = self.shared.timing.silence_threshold();
        let hold = self.shared.timing.hold_threshold();

        lock(&self.shared.timers).arm(TimerKind::Silence, async move {
            tokio::time::sleep(silence).await;
            if shared.check_silence(silence) != SilenceOutcome::Waiting {
                return;
            }
            if hold > silence {
                tokio::time::sleep(hold - silence).await;
                shared.check_silence(hold);
            }
        });
    }

    fn arm_post_speech_timer(&self) {
        if lock(&self.shared.state).session.status().is_terminal() {
            return;
        }

        let shared = Arc::clone(&self.shared);
        let delay = self.shared.timing.post_speech_delay();
        let armed_at = lock(&self.shared.state).session.cursor();

        lock(&self.shared.timers).arm(TimerKind::PostSpeech, async move {
            tokio::time::sleep(delay).await;
            let result = shared.apply(|session, len| {
                if session.cursor() != armed_at {
                    debug!(
                        armed_at,
                        cursor = session.cursor(),
                        "Cursor moved since AI turn, not advancing"
                    );
                    return Ok(session.clone());
                }
                session.ai_turn_finished(len)
            });
            if let Err(e) = result {
                debug!(error = %e, "Post-speech advance skipped");
            }
        });
    }

    /// Reports silence of `elapsed` directly, without a timer.
    pub fn report_silence(&self, elapsed: Duration) -> SilenceOutcome {
        self.shared.check_silence(elapsed)
    }

    /// Keeps the cursor where it is by dropping the pending silence timer.
    pub fn hold_position(&self) {
        info!("Holding position");
        lock(&self.shared.timers).cancel(TimerKind::Silence);
        lock(&self.shared.state).hold_offered = false;
    }

    /// Manual advance; drops every pending timer first.
    pub fn advance(&self) -> Result<RehearsalSession> {
        lock(&self.shared.timers).cancel_all();
        self.shared.apply(RehearsalSession::advance)
    }

    pub fn rewind(&self) -> Result<RehearsalSession> {
        lock(&self.shared.timers).cancel_all();
        self.shared.apply(RehearsalSession::rewind)
    }

    pub fn jump_to(&self, index: usize) -> Result<RehearsalSession> {
        lock(&self.shared.timers).cancel_all();
        self.shared.apply(|session, len| session.jump_to(index, len))
    }

    pub fn pause(&self) -> Result<RehearsalSession> {
        self.shared.apply(|session, _| session.pause())
    }

    pub fn resume(&self) -> Result<RehearsalSession> {
        self.shared.apply(|session, _| session.resume())
    }

    pub fn toggle_pause(&self) -> Result<RehearsalSession> {
        self.shared.apply(|session, _| session.toggle_pause())
    }

    pub fn set_auto_advance(&self, enabled: bool) -> Result<RehearsalSession> {
        self.shared.apply(|session, _| session.set_auto_advance(enabled))
    }

    /// Completes the session and cancels all timers.
    pub fn complete(&self) -> Result<RehearsalSession> {
        let done = self.shared.apply(|session, _| session.complete())?;
        info!(cursor = done.cursor(), "Rehearsal completed");
        Ok(done)
    }

    /// Cancels pending timers without changing the session.
    pub fn shutdown(&self) {
        lock(&self.shared.timers).cancel_all();
    }
}
