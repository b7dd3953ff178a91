//! Source configuration

use std::fmt;

use super::{ClockTransportKind, SourceCharacter, SourceKind, SourceProcessor, Tempo};
use crate::mapping::denormalize;
use crate::midi::{ControlChange14BitMessage, ParameterNumberMessage, ShortMessage};

const MAX_CHANNEL: u8 = 15;
const MAX_MIDI_MESSAGE_NUMBER: u8 = 127;
const MAX_PARAMETER_NUMBER: u16 = 16383;

/// Which events a mapping listens to and how they decode
///
/// `None` in a channel or number selector means "any". Every setter marks
/// the config dirty if the value actually changed, the owner then derives a
/// fresh [`SourceProcessor`].
#[derive(Debug, Clone)]
pub struct SourceConfig {
    kind: SourceKind,
    channel: Option<u8>,
    midi_message_number: Option<u8>,
    parameter_number: Option<u16>,
    is_14_bit: bool,
    is_registered: bool,
    custom_character: SourceCharacter,
    clock_transport_kind: ClockTransportKind,
    dirty: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::ControlChangeValue,
            channel: Some(0),
            midi_message_number: Some(0),
            parameter_number: Some(0),
            is_14_bit: false,
            is_registered: false,
            custom_character: SourceCharacter::Range,
            clock_transport_kind: ClockTransportKind::Start,
            dirty: false,
        }
    }
}

/// Assign `value` to `field`, returning whether it changed
fn update<T: PartialEq>(field: &mut T, value: T) -> bool {
    if *field == value {
        false
    } else {
        *field = value;
        true
    }
}

impl SourceConfig {
    pub fn new(kind: SourceKind) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    // Getters

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn channel(&self) -> Option<u8> {
        self.channel
    }

    /// Controller or key number
    pub fn midi_message_number(&self) -> Option<u8> {
        self.midi_message_number
    }

    /// (N)RPN number
    pub fn parameter_number(&self) -> Option<u16> {
        self.parameter_number
    }

    /// The number selector that applies to the current kind
    pub fn number(&self) -> Option<u16> {
        if self.supports_parameter_number() {
            self.parameter_number
        } else {
            self.midi_message_number.map(u16::from)
        }
    }

    pub fn is_14_bit(&self) -> bool {
        self.is_14_bit
    }

    pub fn is_registered(&self) -> bool {
        self.is_registered
    }

    pub fn custom_character(&self) -> SourceCharacter {
        self.custom_character
    }

    pub fn clock_transport_kind(&self) -> ClockTransportKind {
        self.clock_transport_kind
    }

    // Setters

    pub fn set_kind(&mut self, kind: SourceKind) {
        self.dirty |= update(&mut self.kind, kind);
    }

    /// Set the channel, clamped to 0-15
    pub fn set_channel(&mut self, channel: Option<u8>) {
        let channel = channel.map(|c| c.min(MAX_CHANNEL));
        self.dirty |= update(&mut self.channel, channel);
    }

    /// Set the controller or key number, clamped to 0-127
    pub fn set_midi_message_number(&mut self, number: Option<u8>) {
        let number = number.map(|n| n.min(MAX_MIDI_MESSAGE_NUMBER));
        self.dirty |= update(&mut self.midi_message_number, number);
    }

    /// Set the (N)RPN number, clamped to 0-16383
    pub fn set_parameter_number(&mut self, number: Option<u16>) {
        let number = number.map(|n| n.min(MAX_PARAMETER_NUMBER));
        self.dirty |= update(&mut self.parameter_number, number);
    }

    /// Set whichever number selector applies to the current kind
    pub fn set_number(&mut self, number: Option<u16>) {
        if self.supports_parameter_number() {
            self.set_parameter_number(number);
        } else {
            let number = number.map(|n| n.min(MAX_MIDI_MESSAGE_NUMBER as u16) as u8);
            self.set_midi_message_number(number);
        }
    }

    pub fn set_is_14_bit(&mut self, is_14_bit: bool) {
        self.dirty |= update(&mut self.is_14_bit, is_14_bit);
    }

    pub fn set_is_registered(&mut self, is_registered: bool) {
        self.dirty |= update(&mut self.is_registered, is_registered);
    }

    pub fn set_custom_character(&mut self, character: SourceCharacter) {
        self.dirty |= update(&mut self.custom_character, character);
    }

    pub fn set_clock_transport_kind(&mut self, kind: ClockTransportKind) {
        self.dirty |= update(&mut self.clock_transport_kind, kind);
    }

    /// Whether anything changed since the last [`mark_clean`](Self::mark_clean)
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Derive a processor snapshot from the current state
    pub fn processor(&self) -> SourceProcessor {
        SourceProcessor::derive(self)
    }

    // Support queries

    pub fn supports_channel(&self) -> bool {
        matches!(
            self.kind,
            SourceKind::ChannelPressureAmount
                | SourceKind::ControlChangeValue
                | SourceKind::NoteVelocity
                | SourceKind::PolyphonicKeyPressureAmount
                | SourceKind::NoteKeyNumber
                | SourceKind::ParameterNumberMessageValue
                | SourceKind::PitchBendChangeValue
                | SourceKind::ProgramChangeNumber
        )
    }

    pub fn supports_14_bit(&self) -> bool {
        matches!(
            self.kind,
            SourceKind::ControlChangeValue | SourceKind::ParameterNumberMessageValue
        )
    }

    pub fn supports_is_registered(&self) -> bool {
        self.kind == SourceKind::ParameterNumberMessageValue
    }

    /// Whether the kind has a controller or key number
    pub fn supports_midi_message_number(&self) -> bool {
        matches!(
            self.kind,
            SourceKind::ControlChangeValue
                | SourceKind::NoteVelocity
                | SourceKind::PolyphonicKeyPressureAmount
        )
    }

    pub fn supports_parameter_number(&self) -> bool {
        self.kind == SourceKind::ParameterNumberMessageValue
    }

    /// Whether the kind has any number selector
    pub fn supports_number(&self) -> bool {
        self.supports_midi_message_number() || self.supports_parameter_number()
    }

    pub fn supports_custom_character(&self) -> bool {
        self.kind == SourceKind::ControlChangeValue && !self.is_14_bit
    }

    pub fn supports_clock_transport_kind(&self) -> bool {
        self.kind == SourceKind::ClockTransport
    }

    /// Character of the physical control behind this source
    pub fn character(&self) -> SourceCharacter {
        match self.kind {
            SourceKind::ControlChangeValue => {
                if self.is_14_bit {
                    SourceCharacter::Range
                } else {
                    self.custom_character
                }
            }
            SourceKind::NoteVelocity | SourceKind::ClockTransport => SourceCharacter::Switch,
            _ => SourceCharacter::Range,
        }
    }

    // Presentation

    /// Map a normalized value to the source's discrete domain.
    ///
    /// Uses `ceil` so that even-sized domains center on the upper middle
    /// value, e.g. 8192 for pitch bend.
    pub fn make_discrete(&self, value: f64) -> i32 {
        let (min, max) = self.processor().discrete_domain();
        denormalize(value, min, max).ceil() as i32
    }

    /// Human-readable form of a normalized value of this source
    pub fn format_normalized_value(&self, value: f64) -> String {
        match self.kind {
            SourceKind::ClockTempo => format!("{:.2}", Tempo::from_normalized_value(value).bpm()),
            SourceKind::ClockTransport => "1".to_string(),
            _ => self.make_discrete(value).to_string(),
        }
    }

    /// Normalize a value given in the source's discrete domain
    pub fn normalize_discrete_value(&self, value: f64) -> f64 {
        self.processor().normalize_discrete(value)
    }

    pub fn main_label(&self) -> String {
        match self.kind {
            SourceKind::ControlChangeValue => "CC value".to_string(),
            SourceKind::NoteVelocity => "Note velocity".to_string(),
            SourceKind::NoteKeyNumber => "Note number".to_string(),
            SourceKind::PitchBendChangeValue => "Pitch wheel".to_string(),
            SourceKind::ChannelPressureAmount => "Channel after touch".to_string(),
            SourceKind::ProgramChangeNumber => "Program change".to_string(),
            SourceKind::ParameterNumberMessageValue => {
                if self.is_registered {
                    "RPN".to_string()
                } else {
                    "NRPN".to_string()
                }
            }
            SourceKind::PolyphonicKeyPressureAmount => "Poly after touch".to_string(),
            SourceKind::ClockTempo => "MIDI clock\nTempo".to_string(),
            SourceKind::ClockTransport => {
                format!("MIDI clock\n{}", self.clock_transport_kind.label())
            }
        }
    }

    // Comparison

    /// Compare only the fields that matter for the current kind.
    ///
    /// `ignore_character` skips the custom character of 7-bit CC sources,
    /// `ignore_channel` skips the channel.
    pub fn equals(&self, other: &Self, ignore_character: bool, ignore_channel: bool) -> bool {
        if self.kind != other.kind {
            return false;
        }
        let channel_ok = ignore_channel || self.channel == other.channel;
        match self.kind {
            SourceKind::ControlChangeValue => {
                channel_ok
                    && self.midi_message_number == other.midi_message_number
                    && self.is_14_bit == other.is_14_bit
                    && (self.is_14_bit
                        || ignore_character
                        || self.custom_character == other.custom_character)
            }
            SourceKind::NoteVelocity | SourceKind::PolyphonicKeyPressureAmount => {
                channel_ok && self.midi_message_number == other.midi_message_number
            }
            SourceKind::NoteKeyNumber
            | SourceKind::PitchBendChangeValue
            | SourceKind::ChannelPressureAmount
            | SourceKind::ProgramChangeNumber => channel_ok,
            SourceKind::ParameterNumberMessageValue => {
                channel_ok
                    && self.parameter_number == other.parameter_number
                    && self.is_14_bit == other.is_14_bit
                    && self.is_registered == other.is_registered
            }
            SourceKind::ClockTempo => true,
            SourceKind::ClockTransport => self.clock_transport_kind == other.clock_transport_kind,
        }
    }

    // Learning

    /// A source that listens to messages like `msg`
    pub fn from_short_message(msg: &ShortMessage) -> Self {
        let mut config = Self::default();
        config.update_from_short_message(msg);
        config
    }

    /// A 14-bit CC source for the controller of `msg`
    pub fn from_14_bit_message(msg: &ControlChange14BitMessage) -> Self {
        let mut config = Self::default();
        config.set_kind(SourceKind::ControlChangeValue);
        config.set_channel(Some(msg.channel));
        config.set_midi_message_number(Some(msg.msb_controller_number));
        config.set_is_14_bit(true);
        config
    }

    /// An (N)RPN source for the parameter of `msg`
    pub fn from_parameter_number_message(msg: &ParameterNumberMessage) -> Self {
        let mut config = Self::default();
        config.set_kind(SourceKind::ParameterNumberMessageValue);
        config.set_channel(Some(msg.channel));
        config.set_parameter_number(Some(msg.number));
        config.set_is_registered(msg.is_registered);
        config.set_is_14_bit(msg.is_14_bit);
        config
    }

    /// Retarget this source to messages like `msg`
    pub fn update_from_short_message(&mut self, msg: &ShortMessage) {
        self.set_kind(SourceKind::from_message_type(msg.r#type()));
        if let Some(transport) = ClockTransportKind::from_message(msg) {
            self.set_clock_transport_kind(transport);
        }
        if let Some(channel) = msg.channel() {
            self.set_channel(Some(channel));
            if self.supports_midi_message_number() {
                self.set_midi_message_number(Some(msg.data_byte_1()));
            }
            self.set_is_14_bit(false);
        }
    }
}

impl PartialEq for SourceConfig {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other, false, false)
    }
}

impl fmt::Display for SourceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.main_label())?;
        if self.supports_channel() {
            match self.channel {
                None => write!(f, "\nAny channel")?,
                Some(ch) => write!(f, "\nChannel {}", ch + 1)?,
            }
        }
        match self.kind {
            SourceKind::NoteVelocity | SourceKind::PolyphonicKeyPressureAmount => {
                match self.midi_message_number {
                    None => write!(f, "\nAny note")?,
                    Some(n) => write!(f, "\nNote number {}", n)?,
                }
            }
            SourceKind::ControlChangeValue => match self.midi_message_number {
                None => write!(f, "\nAny CC")?,
                Some(n) => write!(f, "\nCC number {}", n)?,
            },
            SourceKind::ParameterNumberMessageValue => match self.parameter_number {
                None => write!(f, "\nAny number")?,
                Some(n) => write!(f, "\nNumber {}", n)?,
            },
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SourceConfig::default();
        assert_eq!(config.kind(), SourceKind::ControlChangeValue);
        assert_eq!(config.channel(), Some(0));
        assert_eq!(config.number(), Some(0));
        assert!(!config.is_dirty());
    }

    #[test]
    fn test_setters_only_dirty_on_change() {
        let mut config = SourceConfig::default();
        config.set_channel(Some(0));
        config.set_kind(SourceKind::ControlChangeValue);
        assert!(!config.is_dirty());

        config.set_channel(Some(20));
        assert_eq!(config.channel(), Some(15));
        assert!(config.is_dirty());

        config.mark_clean();
        config.set_channel(None);
        assert!(config.is_dirty());
    }

    #[test]
    fn test_support_queries() {
        let mut config = SourceConfig::default();
        assert!(config.supports_custom_character());
        config.set_is_14_bit(true);
        assert!(!config.supports_custom_character());
        assert!(config.supports_14_bit());

        config.set_kind(SourceKind::ClockTempo);
        assert!(!config.supports_channel());
        assert!(!config.supports_number());
        assert!(!config.supports_14_bit());

        config.set_kind(SourceKind::ParameterNumberMessageValue);
        assert!(config.supports_is_registered());
        assert!(config.supports_parameter_number());
        assert!(!config.supports_midi_message_number());

        config.set_kind(SourceKind::ClockTransport);
        assert!(config.supports_clock_transport_kind());
    }

    #[test]
    fn test_character() {
        let mut config = SourceConfig::default();
        config.set_custom_character(SourceCharacter::Encoder1);
        assert_eq!(config.character(), SourceCharacter::Encoder1);
        config.set_is_14_bit(true);
        assert_eq!(config.character(), SourceCharacter::Range);
        config.set_kind(SourceKind::NoteVelocity);
        assert_eq!(config.character(), SourceCharacter::Switch);
        config.set_kind(SourceKind::PitchBendChangeValue);
        assert_eq!(config.character(), SourceCharacter::Range);
    }

    #[test]
    fn test_display() {
        let mut config = SourceConfig::default();
        config.set_channel(Some(2));
        config.set_midi_message_number(Some(64));
        assert_eq!(config.to_string(), "CC value\nChannel 3\nCC number 64");

        config.set_channel(None);
        config.set_midi_message_number(None);
        assert_eq!(config.to_string(), "CC value\nAny channel\nAny CC");

        let config = SourceConfig::new(SourceKind::ClockTempo);
        assert_eq!(config.to_string(), "MIDI clock\nTempo");

        let mut config = SourceConfig::new(SourceKind::ParameterNumberMessageValue);
        config.set_is_registered(true);
        config.set_parameter_number(Some(1000));
        assert_eq!(config.to_string(), "RPN\nChannel 1\nNumber 1000");
    }

    #[test]
    fn test_format_normalized_value() {
        let pitch = SourceConfig::new(SourceKind::PitchBendChangeValue);
        assert_eq!(pitch.format_normalized_value(0.5), "0");
        assert_eq!(pitch.format_normalized_value(1.0), "8191");
        assert_eq!(pitch.format_normalized_value(0.0), "-8192");

        let cc = SourceConfig::default();
        assert_eq!(cc.format_normalized_value(1.0), "127");

        let tempo = SourceConfig::new(SourceKind::ClockTempo);
        assert_eq!(tempo.format_normalized_value(1.0), "960.00");

        let transport = SourceConfig::new(SourceKind::ClockTransport);
        assert_eq!(transport.format_normalized_value(0.3), "1");
    }

    #[test]
    fn test_normalize_discrete_value() {
        let cc = SourceConfig::default();
        assert_eq!(cc.normalize_discrete_value(127.0), 1.0);
        assert_eq!(cc.normalize_discrete_value(0.0), 0.0);
    }

    #[test]
    fn test_equals_with_ignore_flags() {
        let mut a = SourceConfig::default();
        a.set_custom_character(SourceCharacter::Encoder1);
        let mut b = a.clone();
        b.set_custom_character(SourceCharacter::Encoder2);
        b.set_channel(Some(4));

        assert_ne!(a, b);
        assert!(!a.equals(&b, true, false));
        assert!(a.equals(&b, true, true));

        // Irrelevant fields don't count
        let mut c = SourceConfig::new(SourceKind::ClockTempo);
        let d = SourceConfig::new(SourceKind::ClockTempo);
        c.set_channel(Some(9));
        assert_eq!(c, d);
    }

    #[test]
    fn test_from_short_message() {
        let config = SourceConfig::from_short_message(&ShortMessage::NoteOff(3, 60, 0));
        assert_eq!(config.kind(), SourceKind::NoteVelocity);
        assert_eq!(config.channel(), Some(3));
        assert_eq!(config.midi_message_number(), Some(60));

        let config = SourceConfig::from_short_message(&ShortMessage::Continue);
        assert_eq!(config.kind(), SourceKind::ClockTransport);
        assert_eq!(config.clock_transport_kind(), ClockTransportKind::Continue);

        let config = SourceConfig::from_short_message(&ShortMessage::TimingClock);
        assert_eq!(config.kind(), SourceKind::ClockTempo);
    }

    #[test]
    fn test_from_composite_messages() {
        let config = SourceConfig::from_14_bit_message(&ControlChange14BitMessage::new(1, 7, 100));
        assert!(config.is_14_bit());
        assert_eq!(config.number(), Some(7));

        let config = SourceConfig::from_parameter_number_message(&ParameterNumberMessage {
            channel: 0,
            number: 420,
            value: 5,
            is_registered: true,
            is_14_bit: false,
        });
        assert_eq!(config.kind(), SourceKind::ParameterNumberMessageValue);
        assert_eq!(config.number(), Some(420));
        assert!(config.is_registered());
    }
}
