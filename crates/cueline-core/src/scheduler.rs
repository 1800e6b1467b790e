//! Cancellable one-shot timers for the rehearsal driver.
//!
//! Each [`TimerKind`] owns a single slot. Arming a slot aborts whatever
//! task was in it, so at most one timer of each kind is ever pending.

use std::future::Future;
use tokio::task::JoinHandle;
use tracing::trace;

/// The timers a rehearsal needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Silence after the user stopped speaking.
    Silence,
    /// Delay between the AI finishing a line and advancing.
    PostSpeech,
}

/// One pending task per [`TimerKind`].
#[derive(Debug, Default)]
pub struct TimerSlots {
    silence: Option<JoinHandle<()>>,
    post_speech: Option<JoinHandle<()>>,
}

impl TimerSlots {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot_mut(&mut self, kind: TimerKind) -> &mut Option<JoinHandle<()>> {
        match kind {
            TimerKind::Silence => &mut self.silence,
            TimerKind::PostSpeech => &mut self.post_speech,
        }
    }

    fn slot(&self, kind: TimerKind) -> Option<&JoinHandle<()>> {
        match kind {
            TimerKind::Silence => self.silence.as_ref(),
            TimerKind::PostSpeech => self.post_speech.as_ref(),
        }
    }

    /// Spawns `task` into the slot, aborting the previous occupant.
    ///
    /// Must be called from within a tokio runtime.
    pub fn arm<F>(&mut self, kind: TimerKind, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = tokio::spawn(task);
        if let Some(previous) = self.slot_mut(kind).replace(handle) {
            trace!(?kind, "Re-arming timer, aborting previous");
            previous.abort();
        }
    }

    /// Aborts the timer in `kind`'s slot. Returns true if one was pending.
    pub fn cancel(&mut self, kind: TimerKind) -> bool {
        match self.slot_mut(kind).take() {
            Some(handle) => {
                let pending = !handle.is_finished();
                handle.abort();
                pending
            }
            None => false,
        }
    }

    /// Aborts every pending timer.
    pub fn cancel_all(&mut self) {
        self.cancel(TimerKind::Silence);
        self.cancel(TimerKind::PostSpeech);
    }

    /// Returns true if a timer of this kind has not fired yet.
    pub fn is_armed(&self, kind: TimerKind) -> bool {
        self.slot(kind).is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for TimerSlots {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
