//! Source kinds and characters

use strum::{EnumIter, EnumString, FromRepr, IntoStaticStr};

use crate::midi::{ShortMessage, ShortMessageType};

/// What part of which message a source listens to
///
/// The discriminants are the persisted indices.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    EnumString,
    IntoStaticStr,
    EnumIter,
    FromRepr,
)]
#[repr(u8)]
pub enum SourceKind {
    #[default]
    ControlChangeValue = 0,
    NoteVelocity = 1,
    NoteKeyNumber = 2,
    PitchBendChangeValue = 3,
    ChannelPressureAmount = 4,
    ProgramChangeNumber = 5,
    ParameterNumberMessageValue = 6,
    PolyphonicKeyPressureAmount = 7,
    ClockTempo = 8,
    ClockTransport = 9,
}

impl SourceKind {
    /// Label for selection lists
    pub fn label(&self) -> &'static str {
        match self {
            SourceKind::ControlChangeValue => "CC value",
            SourceKind::NoteVelocity => "Note velocity",
            SourceKind::NoteKeyNumber => "Note number",
            SourceKind::PitchBendChangeValue => "Pitch wheel",
            SourceKind::ChannelPressureAmount => "Channel after touch",
            SourceKind::ProgramChangeNumber => "Program change",
            SourceKind::ParameterNumberMessageValue => "(N)RPN value (no feedback)",
            SourceKind::PolyphonicKeyPressureAmount => "Polyphonic after touch",
            SourceKind::ClockTempo => "MIDI clock tempo (experimental)",
            SourceKind::ClockTransport => "MIDI clock transport",
        }
    }

    /// Label of the number field, empty if the kind has none
    pub fn number_label(&self) -> &'static str {
        match self {
            SourceKind::ControlChangeValue => "CC number",
            SourceKind::ParameterNumberMessageValue => "Number",
            SourceKind::NoteVelocity | SourceKind::PolyphonicKeyPressureAmount => "Note number",
            _ => "",
        }
    }

    /// The kind a learned message of this type turns into
    pub fn from_message_type(message_type: ShortMessageType) -> Self {
        use ShortMessageType as T;
        match message_type {
            T::NoteOff | T::NoteOn => SourceKind::NoteVelocity,
            T::PolyphonicKeyPressure => SourceKind::PolyphonicKeyPressureAmount,
            T::ControlChange => SourceKind::ControlChangeValue,
            T::ProgramChange => SourceKind::ProgramChangeNumber,
            T::ChannelPressure => SourceKind::ChannelPressureAmount,
            T::PitchBendChange => SourceKind::PitchBendChangeValue,
            T::TimingClock => SourceKind::ClockTempo,
            T::Start | T::Continue | T::Stop => SourceKind::ClockTransport,
        }
    }

    pub fn name(&self) -> &'static str {
        self.into()
    }
}

/// Behavioral character of a physical control
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    EnumString,
    IntoStaticStr,
    EnumIter,
    FromRepr,
)]
#[repr(u8)]
pub enum SourceCharacter {
    /// Fader or knob
    #[default]
    Range = 0,
    /// Button
    Switch = 1,
    /// Relative encoder, 127 = decrement, 0 = none, 1 = increment
    Encoder1 = 2,
    /// Relative encoder, 63 = decrement, 64 = none, 65 = increment
    Encoder2 = 3,
    /// Relative encoder, 65 = decrement, 0 = none, 1 = increment
    Encoder3 = 4,
}

impl SourceCharacter {
    pub fn label(&self) -> &'static str {
        match self {
            SourceCharacter::Range => "Range element (knob, fader, etc.)",
            SourceCharacter::Switch => "Button (momentary)",
            SourceCharacter::Encoder1 => "Encoder (relative type 1)",
            SourceCharacter::Encoder2 => "Encoder (relative type 2)",
            SourceCharacter::Encoder3 => "Encoder (relative type 3)",
        }
    }

    pub fn is_encoder(&self) -> bool {
        matches!(
            self,
            SourceCharacter::Encoder1 | SourceCharacter::Encoder2 | SourceCharacter::Encoder3
        )
    }

    pub fn name(&self) -> &'static str {
        self.into()
    }
}

/// Which transport message a clock transport source reacts to
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    EnumString,
    IntoStaticStr,
    EnumIter,
    FromRepr,
)]
#[repr(u8)]
pub enum ClockTransportKind {
    #[default]
    Start = 0,
    Continue = 1,
    Stop = 2,
}

impl ClockTransportKind {
    pub fn label(&self) -> &'static str {
        self.name()
    }

    pub fn name(&self) -> &'static str {
        self.into()
    }

    pub fn message_type(&self) -> ShortMessageType {
        match self {
            ClockTransportKind::Start => ShortMessageType::Start,
            ClockTransportKind::Continue => ShortMessageType::Continue,
            ClockTransportKind::Stop => ShortMessageType::Stop,
        }
    }

    /// The transport kind of a real-time message, if it is one
    pub fn from_message(msg: &ShortMessage) -> Option<Self> {
        match msg {
            ShortMessage::Start => Some(ClockTransportKind::Start),
            ShortMessage::Continue => Some(ClockTransportKind::Continue),
            ShortMessage::Stop => Some(ClockTransportKind::Stop),
            _ => None,
        }
    }
}
