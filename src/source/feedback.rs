//! Source-side feedback
//!
//! Turns a normalized feedback value into the MIDI messages that make the
//! control surface show it.

use super::{SourceConfig, SourceKind};
use crate::mapping::denormalize;
use crate::midi::{ControlChange14BitMessage, ShortMessage};

/// Offset between the centered pitch bend domain and the wire value
const PITCH_BEND_CENTER: i32 = 8192;

/// Feedback produced by one source for one value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackEvent {
    Single(ShortMessage),
    /// MSB/LSB pair of a 14-bit CC value
    Pair([ShortMessage; 2]),
}

impl FeedbackEvent {
    pub fn messages(&self) -> &[ShortMessage] {
        match self {
            FeedbackEvent::Single(msg) => std::slice::from_ref(msg),
            FeedbackEvent::Pair(msgs) => msgs,
        }
    }
}

/// Receiver of outgoing feedback messages
pub trait FeedbackSink {
    fn emit(&mut self, source: &SourceConfig, message: ShortMessage);

    fn emit_pair(&mut self, source: &SourceConfig, messages: [ShortMessage; 2]);
}

/// A sink that keeps everything it receives
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Vec<FeedbackEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[FeedbackEvent] {
        &self.events
    }

    /// All messages in send order
    pub fn messages(&self) -> Vec<ShortMessage> {
        self.events
            .iter()
            .flat_map(|e| e.messages().iter().copied())
            .collect()
    }
}

impl FeedbackSink for RecordingSink {
    fn emit(&mut self, _source: &SourceConfig, message: ShortMessage) {
        self.events.push(FeedbackEvent::Single(message));
    }

    fn emit_pair(&mut self, _source: &SourceConfig, messages: [ShortMessage; 2]) {
        self.events.push(FeedbackEvent::Pair(messages));
    }
}

fn to_7_bit(value: i32) -> u8 {
    value.clamp(0, 127) as u8
}

impl SourceConfig {
    /// Messages that display `value` on the control.
    ///
    /// `None` if the source can't send feedback: no channel, a wildcard
    /// channel or number, or a kind without feedback.
    pub fn feedback(&self, value: f64) -> Option<FeedbackEvent> {
        if !self.supports_channel() {
            return None;
        }
        let channel = self.channel()?;
        let number = if self.supports_midi_message_number() {
            Some(self.midi_message_number()?)
        } else {
            None
        };
        let value = value.clamp(0.0, 1.0);
        let discrete = self.make_discrete(value);
        let msg = match self.kind() {
            SourceKind::NoteVelocity => {
                ShortMessage::NoteOn(channel, number.unwrap_or_default(), to_7_bit(discrete))
            }
            SourceKind::NoteKeyNumber => ShortMessage::NoteOn(channel, to_7_bit(discrete), 127),
            SourceKind::ProgramChangeNumber => {
                ShortMessage::ProgramChange(channel, to_7_bit(discrete))
            }
            SourceKind::PitchBendChangeValue => {
                let wire = (discrete + PITCH_BEND_CENTER).clamp(0, 16383);
                ShortMessage::PitchBendChange(channel, wire as u16)
            }
            SourceKind::ChannelPressureAmount => {
                ShortMessage::ChannelPressure(channel, to_7_bit(discrete))
            }
            SourceKind::PolyphonicKeyPressureAmount => ShortMessage::PolyphonicKeyPressure(
                channel,
                number.unwrap_or_default(),
                to_7_bit(discrete),
            ),
            SourceKind::ControlChangeValue => {
                let controller = number.unwrap_or_default();
                if self.is_14_bit() {
                    let msg = ControlChange14BitMessage::new(
                        channel,
                        controller,
                        discrete.clamp(0, 16383) as u16,
                    );
                    // No feedback for controllers without an LSB partner
                    return msg.to_short_messages().map(FeedbackEvent::Pair);
                }
                let cc_value = if self.custom_character().is_encoder() {
                    // Absolute position on an LED ring
                    denormalize(value, 0.0, 127.0).ceil() as i32
                } else {
                    discrete
                };
                ShortMessage::ControlChange(channel, controller, to_7_bit(cc_value))
            }
            SourceKind::ParameterNumberMessageValue
            | SourceKind::ClockTempo
            | SourceKind::ClockTransport => return None,
        };
        Some(FeedbackEvent::Single(msg))
    }

    /// Send feedback for `value` to `sink`, if there is any
    pub fn send_feedback(&self, value: f64, sink: &mut dyn FeedbackSink) -> bool {
        match self.feedback(value) {
            Some(FeedbackEvent::Single(msg)) => {
                tracing::trace!(?msg, "feedback");
                sink.emit(self, msg);
                true
            }
            Some(FeedbackEvent::Pair(msgs)) => {
                tracing::trace!(?msgs, "feedback pair");
                sink.emit_pair(self, msgs);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceCharacter;

    fn source(kind: SourceKind) -> SourceConfig {
        SourceConfig::new(kind)
    }

    #[test]
    fn test_pitch_bend_feedback_is_one_message() {
        let config = source(SourceKind::PitchBendChangeValue);
        let mut sink = RecordingSink::new();
        assert!(config.send_feedback(0.5, &mut sink));
        assert_eq!(
            sink.events(),
            &[FeedbackEvent::Single(ShortMessage::PitchBendChange(0, 8192))]
        );

        assert_eq!(
            config.feedback(0.0),
            Some(FeedbackEvent::Single(ShortMessage::PitchBendChange(0, 0)))
        );
        assert_eq!(
            config.feedback(1.0),
            Some(FeedbackEvent::Single(ShortMessage::PitchBendChange(0, 16383)))
        );
    }

    #[test]
    fn test_14_bit_feedback_is_a_pair() {
        let mut config = source(SourceKind::ControlChangeValue);
        config.set_is_14_bit(true);
        config.set_midi_message_number(Some(7));
        let mut sink = RecordingSink::new();
        assert!(config.send_feedback(1.0, &mut sink));
        assert_eq!(
            sink.events(),
            &[FeedbackEvent::Pair([
                ShortMessage::ControlChange(0, 7, 127),
                ShortMessage::ControlChange(0, 39, 127),
            ])]
        );
        assert_eq!(sink.messages().len(), 2);
    }

    #[test]
    fn test_14_bit_feedback_skips_controllers_without_lsb() {
        let mut config = source(SourceKind::ControlChangeValue);
        config.set_is_14_bit(true);
        config.set_midi_message_number(Some(96));
        assert_eq!(config.feedback(1.0), None);
        let mut sink = RecordingSink::new();
        assert!(!config.send_feedback(1.0, &mut sink));
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_7_bit_cc_feedback() {
        let mut config = source(SourceKind::ControlChangeValue);
        config.set_midi_message_number(Some(10));
        assert_eq!(
            config.feedback(1.0),
            Some(FeedbackEvent::Single(ShortMessage::ControlChange(0, 10, 127)))
        );
        assert_eq!(
            config.feedback(0.5),
            Some(FeedbackEvent::Single(ShortMessage::ControlChange(0, 10, 64)))
        );
    }

    #[test]
    fn test_encoder_feedback_uses_full_7_bit_range() {
        let mut config = source(SourceKind::ControlChangeValue);
        config.set_custom_character(SourceCharacter::Encoder2);
        // 64 discrete values for decoding, but feedback addresses 0-127
        assert_eq!(
            config.feedback(1.0),
            Some(FeedbackEvent::Single(ShortMessage::ControlChange(0, 0, 127)))
        );
        assert_eq!(
            config.feedback(0.5),
            Some(FeedbackEvent::Single(ShortMessage::ControlChange(0, 0, 64)))
        );
    }

    #[test]
    fn test_note_feedback() {
        let mut config = source(SourceKind::NoteVelocity);
        config.set_midi_message_number(Some(60));
        assert_eq!(
            config.feedback(1.0),
            Some(FeedbackEvent::Single(ShortMessage::NoteOn(0, 60, 127)))
        );

        let config = source(SourceKind::NoteKeyNumber);
        assert_eq!(
            config.feedback(0.0),
            Some(FeedbackEvent::Single(ShortMessage::NoteOn(0, 0, 127)))
        );
    }

    #[test]
    fn test_no_feedback_without_address() {
        let mut config = source(SourceKind::ControlChangeValue);
        config.set_channel(None);
        assert_eq!(config.feedback(1.0), None);

        let mut config = source(SourceKind::ControlChangeValue);
        config.set_midi_message_number(None);
        assert_eq!(config.feedback(1.0), None);

        assert_eq!(source(SourceKind::ClockTempo).feedback(1.0), None);
        assert_eq!(source(SourceKind::ParameterNumberMessageValue).feedback(1.0), None);

        let mut sink = RecordingSink::new();
        assert!(!source(SourceKind::ClockTransport).send_feedback(1.0, &mut sink));
        assert!(sink.events().is_empty());
    }
}
