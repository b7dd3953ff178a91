//! MIDI plumbing
//!
//! Short message codec, the composite events sources react to, and port I/O.

mod composite;
mod io;
mod message;

pub use composite::{
    could_be_part_of_parameter_number_message, ControlChange14BitMessage, ParameterNumberMessage,
    RawSourceEvent,
};
pub use io::{list_input_ports, list_output_ports, MidiFeedbackOutput, MidiListener};
pub use message::{ShortMessage, ShortMessageType, SuperType};
