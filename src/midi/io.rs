//! MIDI port I/O
//!
//! Incoming bytes are decoded on midir's callback thread and forwarded to a
//! tokio channel. Outgoing feedback goes through a dedicated thread so the
//! control path never blocks on the port.

use std::sync::mpsc::{self, Sender};
use std::thread;

use midir::{Ignore, MidiIO, MidiInput, MidiInputConnection, MidiOutput};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

use super::{RawSourceEvent, ShortMessage};
use crate::error::{CtlmapError, Result};
use crate::source::{FeedbackSink, SourceConfig};

const CLIENT_NAME: &str = "ctlmap";

/// Names of all ports `io` knows about
fn port_names<T: MidiIO>(io: &T) -> Vec<String> {
    io.ports()
        .iter()
        .filter_map(|p| io.port_name(p).ok())
        .collect()
}

/// Find the first port whose name contains `name`, or the first port at all
fn find_port<T: MidiIO>(io: &T, name: Option<&str>) -> Result<(T::Port, String)> {
    let ports = io.ports();
    let port = match name {
        Some(name) => ports
            .iter()
            .find(|p| io.port_name(p).map(|n| n.contains(name)).unwrap_or(false))
            .ok_or_else(|| CtlmapError::Midi(format!("MIDI port '{}' not found", name)))?,
        None => ports
            .first()
            .ok_or_else(|| CtlmapError::Midi("no MIDI ports available".to_string()))?,
    };
    let port_name = io
        .port_name(port)
        .map_err(|e| CtlmapError::Midi(e.to_string()))?;
    Ok((port.clone(), port_name))
}

/// List available MIDI input ports
pub fn list_input_ports() -> Result<Vec<String>> {
    let input = MidiInput::new("ctlmap list")?;
    Ok(port_names(&input))
}

/// List available MIDI output ports
pub fn list_output_ports() -> Result<Vec<String>> {
    let output = MidiOutput::new("ctlmap list")?;
    Ok(port_names(&output))
}

/// An open input port forwarding decoded events
///
/// The connection closes when the listener is dropped.
pub struct MidiListener {
    connection: Option<MidiInputConnection<()>>,
    port_name: String,
}

impl MidiListener {
    /// Connect to the input port matching `port_name` (or the first one).
    ///
    /// Returns the listener and the receiving end of its event channel.
    pub fn open(port_name: Option<&str>) -> Result<(Self, UnboundedReceiver<RawSourceEvent>)> {
        let mut input = MidiInput::new(CLIENT_NAME)?;
        // Clock and transport are sources too
        input.ignore(Ignore::None);
        let (port, name) = find_port(&input, port_name)?;
        let (sender, receiver) = unbounded_channel();
        let connection = input.connect(
            &port,
            "ctlmap-input",
            move |_stamp, bytes, _| {
                if let Some(msg) = ShortMessage::from_bytes(bytes) {
                    // Receiver gone means we're shutting down
                    let _ = sender.send(RawSourceEvent::Short(msg));
                }
            },
            (),
        )?;
        tracing::info!(port = %name, "MIDI input connected");
        Ok((
            Self {
                connection: Some(connection),
                port_name: name,
            },
            receiver,
        ))
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    pub fn close(&mut self) {
        if let Some(connection) = self.connection.take() {
            let _ = connection.close();
            tracing::info!(port = %self.port_name, "MIDI input closed");
        }
    }
}

impl Drop for MidiListener {
    fn drop(&mut self) {
        self.close();
    }
}

enum OutputCommand {
    Send(Vec<u8>),
    Stop,
}

/// Feedback sink writing to a MIDI output port
pub struct MidiFeedbackOutput {
    sender: Sender<OutputCommand>,
    port_name: String,
}

impl MidiFeedbackOutput {
    /// Connect to the output port matching `port_name` (or the first one)
    pub fn open(port_name: Option<&str>) -> Result<Self> {
        let output = MidiOutput::new(CLIENT_NAME)?;
        let (port, name) = find_port(&output, port_name)?;
        let mut connection = output.connect(&port, "ctlmap-feedback")?;

        let (sender, receiver) = mpsc::channel::<OutputCommand>();
        thread::spawn(move || {
            while let Ok(command) = receiver.recv() {
                match command {
                    OutputCommand::Send(bytes) => {
                        if let Err(e) = connection.send(&bytes) {
                            tracing::warn!(error = %e, "failed to send feedback");
                        }
                    }
                    OutputCommand::Stop => break,
                }
            }
            let _ = connection.close();
        });

        tracing::info!(port = %name, "MIDI output connected");
        Ok(Self {
            sender,
            port_name: name,
        })
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    /// Queue a raw message
    pub fn send(&self, msg: ShortMessage) -> Result<()> {
        self.sender
            .send(OutputCommand::Send(msg.to_bytes()))
            .map_err(|_| CtlmapError::Midi("feedback output stopped".to_string()))
    }

    pub fn stop(&self) {
        let _ = self.sender.send(OutputCommand::Stop);
    }
}

impl FeedbackSink for MidiFeedbackOutput {
    fn emit(&mut self, _source: &SourceConfig, message: ShortMessage) {
        if let Err(e) = self.send(message) {
            tracing::warn!(error = %e, "feedback dropped");
        }
    }

    fn emit_pair(&mut self, source: &SourceConfig, messages: [ShortMessage; 2]) {
        for msg in messages {
            self.emit(source, msg);
        }
    }
}

impl Drop for MidiFeedbackOutput {
    fn drop(&mut self) {
        self.stop();
    }
}
