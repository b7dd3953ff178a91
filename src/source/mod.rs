//! Sources
//!
//! A source describes which incoming MIDI events a mapping reacts to, how
//! they decode to normalized values and how feedback goes back out.

mod character;
mod config;
mod feedback;
mod kind;
mod processor;
mod tempo;

pub use character::guess_source_character;
pub use config::SourceConfig;
pub use feedback::{FeedbackEvent, FeedbackSink, RecordingSink};
pub use kind::{ClockTransportKind, SourceCharacter, SourceKind};
pub use processor::{SourceProcessor, MAX_SOURCE_STEP_COUNT};
pub use tempo::Tempo;
