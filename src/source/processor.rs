//! Source processor
//!
//! An immutable snapshot derived from a [`SourceConfig`]. It decides which
//! raw events belong to a source and turns them into normalized values.

use super::{ClockTransportKind, SourceCharacter, SourceConfig, SourceKind};
use crate::mapping::normalize;
use crate::midi::{could_be_part_of_parameter_number_message, RawSourceEvent, ShortMessage};

/// Richest relative encoder resolution
pub const MAX_SOURCE_STEP_COUNT: i32 = 63;

/// Decoder and matcher for one source configuration
#[derive(Debug, Clone, PartialEq)]
pub struct SourceProcessor {
    kind: SourceKind,
    channel: Option<u8>,
    number: Option<u16>,
    is_14_bit: bool,
    is_registered: bool,
    custom_character: SourceCharacter,
    clock_transport_kind: ClockTransportKind,
}

impl Default for SourceProcessor {
    fn default() -> Self {
        Self::derive(&SourceConfig::default())
    }
}

impl SourceProcessor {
    /// Take a snapshot of `config`
    pub fn derive(config: &SourceConfig) -> Self {
        Self {
            kind: config.kind(),
            channel: config.channel(),
            number: config.number(),
            is_14_bit: config.is_14_bit(),
            is_registered: config.is_registered(),
            custom_character: config.custom_character(),
            clock_transport_kind: config.clock_transport_kind(),
        }
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    /// Decode `event` into a normalized value.
    ///
    /// Only meaningful for events that [`matches`](Self::matches) accepted.
    /// Encoder characters decode to a signed step count instead of a
    /// position. Events of the wrong shape decode to 0.
    pub fn decode(&self, event: &RawSourceEvent) -> f64 {
        use RawSourceEvent as E;
        match (self.kind, event) {
            (SourceKind::ControlChangeValue, E::ControlChange14Bit(msg)) if self.is_14_bit => {
                msg.value as f64 / 16383.0
            }
            (SourceKind::ControlChangeValue, E::Short(ShortMessage::ControlChange(_, _, value))) => {
                self.decode_7_bit_control_value(*value)
            }
            (SourceKind::NoteVelocity, E::Short(msg)) => {
                if msg.is_note_off() {
                    0.0
                } else {
                    msg.data_byte_2() as f64 / 127.0
                }
            }
            (SourceKind::NoteKeyNumber, E::Short(msg)) => msg.data_byte_1() as f64 / 127.0,
            (SourceKind::PitchBendChangeValue, E::Short(ShortMessage::PitchBendChange(_, value))) => {
                normalize(*value as f64, 0.0, 16383.0)
            }
            (SourceKind::ChannelPressureAmount, E::Short(ShortMessage::ChannelPressure(_, amount)))
            | (
                SourceKind::PolyphonicKeyPressureAmount,
                E::Short(ShortMessage::PolyphonicKeyPressure(_, _, amount)),
            )
            | (SourceKind::ProgramChangeNumber, E::Short(ShortMessage::ProgramChange(_, amount))) => {
                self.normalize_discrete(*amount as f64)
            }
            (SourceKind::ClockTransport, _) => 1.0,
            (SourceKind::ParameterNumberMessageValue, E::ParameterNumber(msg)) => {
                self.normalize_discrete(msg.value as f64)
            }
            (SourceKind::ClockTempo, E::Tempo(tempo)) => tempo.normalized_value(),
            _ => 0.0,
        }
    }

    /// Whether `event` belongs to this source
    pub fn matches(&self, event: &RawSourceEvent) -> bool {
        use RawSourceEvent as E;
        match (self.kind, event) {
            (SourceKind::ControlChangeValue, E::ControlChange14Bit(msg)) => {
                self.is_14_bit
                    && self.channel_matches(msg.channel)
                    && self.number_matches(msg.msb_controller_number as u16)
            }
            (SourceKind::ControlChangeValue, E::Short(msg @ ShortMessage::ControlChange(..))) => {
                !self.is_14_bit && self.short_message_matches(msg)
            }
            (SourceKind::NoteVelocity, E::Short(msg)) if msg.is_note() => {
                self.short_message_matches(msg)
            }
            (SourceKind::NoteKeyNumber, E::Short(msg @ ShortMessage::NoteOn(..))) => {
                !msg.is_note_off() && self.short_channel_matches(msg)
            }
            (SourceKind::PitchBendChangeValue, E::Short(msg @ ShortMessage::PitchBendChange(..)))
            | (SourceKind::ChannelPressureAmount, E::Short(msg @ ShortMessage::ChannelPressure(..)))
            | (SourceKind::ProgramChangeNumber, E::Short(msg @ ShortMessage::ProgramChange(..))) => {
                self.short_channel_matches(msg)
            }
            (
                SourceKind::PolyphonicKeyPressureAmount,
                E::Short(msg @ ShortMessage::PolyphonicKeyPressure(..)),
            ) => self.short_message_matches(msg),
            (SourceKind::ClockTransport, E::Short(msg)) => {
                msg.r#type() == self.clock_transport_kind.message_type()
            }
            (SourceKind::ParameterNumberMessageValue, E::ParameterNumber(msg)) => {
                self.channel_matches(msg.channel)
                    && self.number_matches(msg.number)
                    && msg.is_registered == self.is_registered
                    && msg.is_14_bit == self.is_14_bit
            }
            (SourceKind::ClockTempo, E::Tempo(_)) => true,
            _ => false,
        }
    }

    /// Match and decode in one go
    pub fn control_value(&self, event: &RawSourceEvent) -> Option<f64> {
        if self.matches(event) {
            Some(self.decode(event))
        } else {
            None
        }
    }

    /// Whether `msg` is one piece of a composite value this source waits for.
    ///
    /// The codec layer uses this to buffer the LSB half of 14-bit CC values
    /// and (N)RPN sequences before assembling them.
    pub fn partially_consumes(&self, msg: &ShortMessage) -> bool {
        match self.kind {
            SourceKind::ControlChangeValue if self.is_14_bit => match *msg {
                ShortMessage::ControlChange(channel, controller, _) => {
                    let controller = controller as u16;
                    self.channel_matches(channel)
                        && match self.number {
                            None => true,
                            Some(n) => controller == n || controller == n + 32,
                        }
                }
                _ => false,
            },
            SourceKind::ParameterNumberMessageValue => {
                msg.channel().is_some_and(|ch| self.channel_matches(ch))
                    && could_be_part_of_parameter_number_message(msg)
            }
            _ => false,
        }
    }

    /// Whether decoded values are step counts rather than positions
    pub fn emits_step_counts(&self) -> bool {
        self.kind == SourceKind::ControlChangeValue
            && !self.is_14_bit
            && self.custom_character.is_encoder()
    }

    pub fn max_step_count(&self) -> i32 {
        MAX_SOURCE_STEP_COUNT
    }

    /// Smallest and largest discrete value the source can take.
    ///
    /// A centered domain of even size N spans `-N/2..=N/2-1`, so its center
    /// is exactly 0.
    pub fn discrete_domain(&self) -> (f64, f64) {
        if self.kind == SourceKind::ClockTempo {
            return (super::tempo::MIN_BPM, super::tempo::MAX_BPM);
        }
        let count = self.possible_value_count() as f64;
        if self.is_centered() {
            (-count / 2.0, count / 2.0 - 1.0)
        } else {
            (0.0, count - 1.0)
        }
    }

    /// Normalize a value within the discrete domain
    pub fn normalize_discrete(&self, value: f64) -> f64 {
        let (min, max) = self.discrete_domain();
        normalize(value, min, max)
    }

    fn possible_value_count(&self) -> u32 {
        match self.kind {
            SourceKind::ChannelPressureAmount
            | SourceKind::NoteVelocity
            | SourceKind::PolyphonicKeyPressureAmount
            | SourceKind::NoteKeyNumber
            | SourceKind::ProgramChangeNumber => 128,
            SourceKind::ControlChangeValue => {
                if self.is_14_bit {
                    16384
                } else if self.custom_character.is_encoder() {
                    64
                } else {
                    128
                }
            }
            SourceKind::ParameterNumberMessageValue => {
                if self.is_14_bit {
                    16384
                } else {
                    128
                }
            }
            SourceKind::PitchBendChangeValue => 16384,
            SourceKind::ClockTempo => 960,
            SourceKind::ClockTransport => 1,
        }
    }

    fn is_centered(&self) -> bool {
        self.kind == SourceKind::PitchBendChangeValue
    }

    fn decode_7_bit_control_value(&self, value: u8) -> f64 {
        let value = value as i32;
        let step_count = match self.custom_character {
            // 127 = decrement, 0 = none, 1 = increment
            SourceCharacter::Encoder1 => {
                if value <= 63 {
                    value
                } else {
                    -(128 - value)
                }
            }
            // 63 = decrement, 64 = none, 65 = increment
            SourceCharacter::Encoder2 => {
                if value >= 64 {
                    value - 64
                } else {
                    -(64 - value)
                }
            }
            // 65 = decrement, 0 = none, 1 = increment
            SourceCharacter::Encoder3 => {
                if value <= 64 {
                    value
                } else {
                    -(value - 64)
                }
            }
            SourceCharacter::Range | SourceCharacter::Switch => return value as f64 / 127.0,
        };
        step_count as f64
    }

    fn channel_matches(&self, channel: u8) -> bool {
        matches(channel, self.channel)
    }

    fn number_matches(&self, number: u16) -> bool {
        matches(number, self.number)
    }

    fn short_channel_matches(&self, msg: &ShortMessage) -> bool {
        msg.channel().is_some_and(|ch| self.channel_matches(ch))
    }

    fn short_message_matches(&self, msg: &ShortMessage) -> bool {
        self.short_channel_matches(msg) && self.number_matches(msg.data_byte_1() as u16)
    }
}

fn matches<T: PartialEq>(actual_value: T, configured_value: Option<T>) -> bool {
    match configured_value {
        None => true,
        Some(v) => actual_value == v,
    }
}
