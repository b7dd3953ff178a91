//! ctlmap - Value mapping and feedback for MIDI controllers
//!
//! Decodes incoming controller events into normalized values, runs them
//! through a mode (absolute, relative or toggle) onto a target, and maps the
//! target's value back into feedback for the controller.

pub mod config;
pub mod error;
pub mod learn;
pub mod mapping;
pub mod midi;
pub mod source;
pub mod target;

pub use config::{load_config, MappingFile};
pub use error::{CtlmapError, Result};
pub use mapping::{Mapping, ModeConfig, ModeKind};
pub use source::{SourceConfig, SourceKind};
pub use target::{SimulatedTarget, Target, TargetCharacter};
