//! # cueline-core
//!
//! Screenplay parsing and rehearsal progression for Cueline.
//!
//! This crate provides:
//! - Line classification and element assembly for extracted screenplay text
//! - Title, running time and confidence scoring
//! - Context windows and next-speaker resolution around a cursor
//! - The rehearsal session state machine
//! - A tokio driver that applies silence and post-speech timers
//! - YAML configuration loading

mod assembler;
mod classifier;
mod config;
mod context_window;
mod driver;
mod parser;
mod scheduler;
mod scorer;
mod session;
mod turn_resolver;

pub use assembler::{AssemblyState, ScreenplayAssembler};
pub use classifier::{HeuristicClassifier, LineClassifier, LineTag};
pub use config::{
    ConfigError, ConfigWarning, CuelineConfig, ParserConfig, TimingConfig, WindowConfig,
};
pub use context_window::{ContextWindow, OwnedContextWindow};
pub use driver::{DriverUpdate, RehearsalDriver, VoiceEvent};
pub use parser::{ScriptParser, count_pages, normalize_lines};
pub use scheduler::{TimerKind, TimerSlots};
pub use scorer::{UNTITLED, estimate_duration, extract_title, grade_confidence};
pub use session::{
    OwnedTurnSnapshot, RehearsalSession, SilenceCheck, SilenceOutcome, TurnSnapshot,
};
pub use turn_resolver::resolve_next_speaker;
