//! Composite MIDI values and the raw event sum type

use super::ShortMessage;
use crate::source::Tempo;

/// Controller numbers that take part in (N)RPN sequences
const PARAMETER_NUMBER_CONTROLLERS: [u8; 6] = [6, 38, 98, 99, 100, 101];

/// A 14-bit control change value assembled from an MSB/LSB pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlChange14BitMessage {
    pub channel: u8,
    /// Controller number of the MSB (0-31)
    pub msb_controller_number: u8,
    /// 0-16383
    pub value: u16,
}

impl ControlChange14BitMessage {
    pub fn new(channel: u8, msb_controller_number: u8, value: u16) -> Self {
        Self {
            channel,
            msb_controller_number,
            value: value.min(16383),
        }
    }

    /// Controller number of the LSB, `None` if the MSB isn't one of 0-31
    pub fn lsb_controller_number(&self) -> Option<u8> {
        (self.msb_controller_number < 32).then(|| self.msb_controller_number + 32)
    }

    /// MSB message first, then LSB. `None` if there's no valid LSB controller.
    pub fn to_short_messages(&self) -> Option<[ShortMessage; 2]> {
        let lsb = self.lsb_controller_number()?;
        Some([
            ShortMessage::ControlChange(
                self.channel,
                self.msb_controller_number,
                ((self.value >> 7) & 0x7F) as u8,
            ),
            ShortMessage::ControlChange(self.channel, lsb, (self.value & 0x7F) as u8),
        ])
    }
}

/// A registered or non-registered parameter number message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterNumberMessage {
    pub channel: u8,
    /// 0-16383
    pub number: u16,
    /// 0-127, or 0-16383 if `is_14_bit`
    pub value: u16,
    pub is_registered: bool,
    pub is_14_bit: bool,
}

/// Whether `msg` could begin or continue an (N)RPN sequence
pub fn could_be_part_of_parameter_number_message(msg: &ShortMessage) -> bool {
    match *msg {
        ShortMessage::ControlChange(_, controller, _) => {
            PARAMETER_NUMBER_CONTROLLERS.contains(&controller)
        }
        _ => false,
    }
}

/// Everything a source can be fed with
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawSourceEvent {
    Short(ShortMessage),
    ControlChange14Bit(ControlChange14BitMessage),
    ParameterNumber(ParameterNumberMessage),
    /// Tempo derived from MIDI clock
    Tempo(Tempo),
}

impl From<ShortMessage> for RawSourceEvent {
    fn from(msg: ShortMessage) -> Self {
        RawSourceEvent::Short(msg)
    }
}

impl From<ControlChange14BitMessage> for RawSourceEvent {
    fn from(msg: ControlChange14BitMessage) -> Self {
        RawSourceEvent::ControlChange14Bit(msg)
    }
}

impl From<ParameterNumberMessage> for RawSourceEvent {
    fn from(msg: ParameterNumberMessage) -> Self {
        RawSourceEvent::ParameterNumber(msg)
    }
}

impl From<Tempo> for RawSourceEvent {
    fn from(tempo: Tempo) -> Self {
        RawSourceEvent::Tempo(tempo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_14_bit_message_splits_into_msb_and_lsb() {
        let msg = ControlChange14BitMessage::new(2, 7, 16383);
        assert_eq!(
            msg.to_short_messages(),
            Some([
                ShortMessage::ControlChange(2, 7, 127),
                ShortMessage::ControlChange(2, 39, 127),
            ])
        );

        let msg = ControlChange14BitMessage::new(0, 1, 8192 + 5);
        assert_eq!(
            msg.to_short_messages(),
            Some([
                ShortMessage::ControlChange(0, 1, 64),
                ShortMessage::ControlChange(0, 33, 5),
            ])
        );
    }

    #[test]
    fn test_14_bit_message_needs_msb_below_32() {
        let msg = ControlChange14BitMessage::new(0, 31, 100);
        assert_eq!(msg.lsb_controller_number(), Some(63));
        let msg = ControlChange14BitMessage::new(0, 96, 100);
        assert_eq!(msg.lsb_controller_number(), None);
        assert_eq!(msg.to_short_messages(), None);
    }

    #[test]
    fn test_parameter_number_controllers() {
        for controller in [6, 38, 98, 99, 100, 101] {
            assert!(could_be_part_of_parameter_number_message(
                &ShortMessage::ControlChange(0, controller, 0)
            ));
        }
        assert!(!could_be_part_of_parameter_number_message(
            &ShortMessage::ControlChange(0, 7, 0)
        ));
        assert!(!could_be_part_of_parameter_number_message(
            &ShortMessage::NoteOn(0, 98, 1)
        ));
    }
}
