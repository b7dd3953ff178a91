//! Error types for ctlmap
use thiserror::Error;

/// Errors raised at the edges of the value-mapping core
///
/// The numeric paths themselves never fail, they clamp. Errors come from
/// persisted configuration, transform compilation and MIDI plumbing.
#[derive(Error, Debug)]
pub enum CtlmapError {
    /// A persisted field holds a value that doesn't decode
    #[error("invalid value `{value}` for field `{field}`")]
    InvalidField {
        /// Name of the offending field as persisted
        field: &'static str,
        /// The value that was found
        value: String,
    },

    /// A transform hook couldn't be compiled
    #[error("transform error: {0}")]
    Transform(String),

    /// Configuration is structurally fine but semantically wrong
    #[error("validation error: {0}")]
    Validation(String),

    /// Generic MIDI error
    #[error("MIDI error: {0}")]
    Midi(String),

    /// MIDI initialization error
    #[error("MIDI init error: {0}")]
    MidiInit(#[from] midir::InitError),

    /// MIDI input connection error
    #[error("MIDI input connection error: {0}")]
    MidiInputConnection(#[from] midir::ConnectError<midir::MidiInput>),

    /// MIDI output connection error
    #[error("MIDI output connection error: {0}")]
    MidiOutputConnection(#[from] midir::ConnectError<midir::MidiOutput>),

    /// MIDI transmission error
    #[error("MIDI send error: {0}")]
    MidiSend(#[from] midir::SendError),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl CtlmapError {
    /// Shorthand for [`CtlmapError::InvalidField`]
    pub fn invalid_field(field: &'static str, value: impl ToString) -> Self {
        Self::InvalidField {
            field,
            value: value.to_string(),
        }
    }
}

/// Result type for ctlmap operations
pub type Result<T> = std::result::Result<T, CtlmapError>;
