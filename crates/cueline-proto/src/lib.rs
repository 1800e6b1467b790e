//! # cueline-proto
//!
//! Shared types and error definitions for the Cueline rehearsal engine.
//!
//! This crate provides the foundational data model used across all Cueline
//! crates, including:
//! - Screenplay elements and their structural types
//! - The parse result handed to persistence collaborators
//! - Session status and next-speaker classifications
//! - Common error types

mod element;
mod error;
mod script;
mod speaker;
mod status;

pub use element::{Element, ElementType};
pub use error::{Error, Result};
pub use script::{Confidence, DurationEstimate, ParsedScript};
pub use speaker::{NextSpeaker, SpeakerKind};
pub use status::SessionStatus;
