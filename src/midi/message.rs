//! Short MIDI messages
//!
//! Only what the mapping core needs: channel voice messages plus the clock
//! and transport real-time messages.

/// Whether a message addresses a channel or the whole system
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuperType {
    Channel,
    SystemRealTime,
}

/// Message type without payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShortMessageType {
    NoteOff,
    NoteOn,
    PolyphonicKeyPressure,
    ControlChange,
    ProgramChange,
    ChannelPressure,
    PitchBendChange,
    TimingClock,
    Start,
    Continue,
    Stop,
}

/// A MIDI message of at most 3 bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShortMessage {
    /// Note off: channel (0-15), key (0-127), velocity (0-127)
    NoteOff(u8, u8, u8),
    /// Note on: channel (0-15), key (0-127), velocity (0-127)
    NoteOn(u8, u8, u8),
    /// Polyphonic key pressure: channel (0-15), key (0-127), amount (0-127)
    PolyphonicKeyPressure(u8, u8, u8),
    /// Control change: channel (0-15), controller (0-127), value (0-127)
    ControlChange(u8, u8, u8),
    /// Program change: channel (0-15), program (0-127)
    ProgramChange(u8, u8),
    /// Channel pressure: channel (0-15), amount (0-127)
    ChannelPressure(u8, u8),
    /// Pitch bend: channel (0-15), value (0-16383, center at 8192)
    PitchBendChange(u8, u16),
    TimingClock,
    Start,
    Continue,
    Stop,
}

impl ShortMessage {
    /// Parse a message from raw bytes.
    ///
    /// Returns `None` for anything this crate doesn't deal with (sysex,
    /// song position, truncated messages).
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let status = *bytes.first()?;
        match status {
            0xF8 => return Some(ShortMessage::TimingClock),
            0xFA => return Some(ShortMessage::Start),
            0xFB => return Some(ShortMessage::Continue),
            0xFC => return Some(ShortMessage::Stop),
            _ => {}
        }

        let channel = status & 0x0F;
        let data_1 = *bytes.get(1)? & 0x7F;
        match status & 0xF0 {
            0xC0 => return Some(ShortMessage::ProgramChange(channel, data_1)),
            0xD0 => return Some(ShortMessage::ChannelPressure(channel, data_1)),
            _ => {}
        }

        let data_2 = *bytes.get(2)? & 0x7F;
        match status & 0xF0 {
            0x80 => Some(ShortMessage::NoteOff(channel, data_1, data_2)),
            0x90 => Some(ShortMessage::NoteOn(channel, data_1, data_2)),
            0xA0 => Some(ShortMessage::PolyphonicKeyPressure(channel, data_1, data_2)),
            0xB0 => Some(ShortMessage::ControlChange(channel, data_1, data_2)),
            0xE0 => {
                let value = ((data_2 as u16) << 7) | data_1 as u16;
                Some(ShortMessage::PitchBendChange(channel, value))
            }
            _ => None,
        }
    }

    /// Convert to raw MIDI bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        match *self {
            ShortMessage::NoteOff(ch, key, vel) => vec![0x80 | (ch & 0x0F), key & 0x7F, vel & 0x7F],
            ShortMessage::NoteOn(ch, key, vel) => vec![0x90 | (ch & 0x0F), key & 0x7F, vel & 0x7F],
            ShortMessage::PolyphonicKeyPressure(ch, key, amount) => {
                vec![0xA0 | (ch & 0x0F), key & 0x7F, amount & 0x7F]
            }
            ShortMessage::ControlChange(ch, ctrl, val) => {
                vec![0xB0 | (ch & 0x0F), ctrl & 0x7F, val & 0x7F]
            }
            ShortMessage::ProgramChange(ch, prog) => vec![0xC0 | (ch & 0x0F), prog & 0x7F],
            ShortMessage::ChannelPressure(ch, amount) => vec![0xD0 | (ch & 0x0F), amount & 0x7F],
            ShortMessage::PitchBendChange(ch, val) => {
                let lsb = (val & 0x7F) as u8;
                let msb = ((val >> 7) & 0x7F) as u8;
                vec![0xE0 | (ch & 0x0F), lsb, msb]
            }
            ShortMessage::TimingClock => vec![0xF8],
            ShortMessage::Start => vec![0xFA],
            ShortMessage::Continue => vec![0xFB],
            ShortMessage::Stop => vec![0xFC],
        }
    }

    pub fn r#type(&self) -> ShortMessageType {
        use ShortMessageType as T;
        match self {
            ShortMessage::NoteOff(..) => T::NoteOff,
            ShortMessage::NoteOn(..) => T::NoteOn,
            ShortMessage::PolyphonicKeyPressure(..) => T::PolyphonicKeyPressure,
            ShortMessage::ControlChange(..) => T::ControlChange,
            ShortMessage::ProgramChange(..) => T::ProgramChange,
            ShortMessage::ChannelPressure(..) => T::ChannelPressure,
            ShortMessage::PitchBendChange(..) => T::PitchBendChange,
            ShortMessage::TimingClock => T::TimingClock,
            ShortMessage::Start => T::Start,
            ShortMessage::Continue => T::Continue,
            ShortMessage::Stop => T::Stop,
        }
    }

    pub fn super_type(&self) -> SuperType {
        match self.channel() {
            Some(_) => SuperType::Channel,
            None => SuperType::SystemRealTime,
        }
    }

    /// Channel of a channel voice message
    pub fn channel(&self) -> Option<u8> {
        match *self {
            ShortMessage::NoteOff(ch, ..)
            | ShortMessage::NoteOn(ch, ..)
            | ShortMessage::PolyphonicKeyPressure(ch, ..)
            | ShortMessage::ControlChange(ch, ..)
            | ShortMessage::ProgramChange(ch, _)
            | ShortMessage::ChannelPressure(ch, _)
            | ShortMessage::PitchBendChange(ch, _) => Some(ch),
            _ => None,
        }
    }

    /// First data byte: key, controller, program or amount
    pub fn data_byte_1(&self) -> u8 {
        match *self {
            ShortMessage::NoteOff(_, b, _)
            | ShortMessage::NoteOn(_, b, _)
            | ShortMessage::PolyphonicKeyPressure(_, b, _)
            | ShortMessage::ControlChange(_, b, _)
            | ShortMessage::ProgramChange(_, b)
            | ShortMessage::ChannelPressure(_, b) => b,
            ShortMessage::PitchBendChange(_, v) => (v & 0x7F) as u8,
            _ => 0,
        }
    }

    /// Second data byte: velocity, amount or controller value
    pub fn data_byte_2(&self) -> u8 {
        match *self {
            ShortMessage::NoteOff(_, _, b)
            | ShortMessage::NoteOn(_, _, b)
            | ShortMessage::PolyphonicKeyPressure(_, _, b)
            | ShortMessage::ControlChange(_, _, b) => b,
            ShortMessage::PitchBendChange(_, v) => ((v >> 7) & 0x7F) as u8,
            _ => 0,
        }
    }

    /// Note off or note on with velocity 0
    pub fn is_note_off(&self) -> bool {
        matches!(
            self,
            ShortMessage::NoteOff(..) | ShortMessage::NoteOn(_, _, 0)
        )
    }

    pub fn is_note(&self) -> bool {
        matches!(self, ShortMessage::NoteOff(..) | ShortMessage::NoteOn(..))
    }
}
