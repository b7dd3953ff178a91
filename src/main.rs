//! ctlmap - Value mapping and feedback for MIDI controllers

use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::Parser;
use ctlmap::config::{self, EnumStyle};
use ctlmap::learn::{learn_sources, LearnSettings};
use ctlmap::midi::{
    list_input_ports, list_output_ports, ControlChange14BitMessage, MidiListener,
    ParameterNumberMessage, RawSourceEvent, ShortMessage,
};
use ctlmap::source::{
    guess_source_character, ClockTransportKind, RecordingSink, SourceConfig, SourceKind, Tempo,
};
use ctlmap::target::SimulatedTarget;
use tokio::sync::mpsc::unbounded_channel;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

mod cli;

use cli::{Cli, Commands};

fn init_logging(verbose: bool) {
    let default_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    // RUST_LOG takes precedence
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// The event a controller would send for `raw` on `source`
fn simulated_event(source: &SourceConfig, raw: f64) -> RawSourceEvent {
    let channel = source.channel().unwrap_or(0);
    let number = source.midi_message_number().unwrap_or(0);
    let byte = raw.round().clamp(0.0, 127.0) as u8;
    let wide = raw.round().clamp(0.0, 16383.0) as u16;
    match source.kind() {
        SourceKind::ControlChangeValue if source.is_14_bit() => {
            ControlChange14BitMessage::new(channel, number, wide).into()
        }
        SourceKind::ControlChangeValue => ShortMessage::ControlChange(channel, number, byte).into(),
        SourceKind::NoteVelocity => ShortMessage::NoteOn(channel, number, byte).into(),
        SourceKind::NoteKeyNumber => ShortMessage::NoteOn(channel, byte, 127).into(),
        SourceKind::PolyphonicKeyPressureAmount => {
            ShortMessage::PolyphonicKeyPressure(channel, number, byte).into()
        }
        SourceKind::ChannelPressureAmount => ShortMessage::ChannelPressure(channel, byte).into(),
        SourceKind::ProgramChangeNumber => ShortMessage::ProgramChange(channel, byte).into(),
        SourceKind::PitchBendChangeValue => ShortMessage::PitchBendChange(channel, wide).into(),
        SourceKind::ParameterNumberMessageValue => ParameterNumberMessage {
            channel,
            number: source.parameter_number().unwrap_or(0),
            value: if source.is_14_bit() { wide } else { byte as u16 },
            is_registered: source.is_registered(),
            is_14_bit: source.is_14_bit(),
        }
        .into(),
        SourceKind::ClockTempo => Tempo::new(raw).into(),
        SourceKind::ClockTransport => match source.clock_transport_kind() {
            ClockTransportKind::Start => ShortMessage::Start.into(),
            ClockTransportKind::Continue => ShortMessage::Continue.into(),
            ClockTransportKind::Stop => ShortMessage::Stop.into(),
        },
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Classify { values } => match guess_source_character(&values) {
            Some(character) => println!("{}", character.label()),
            None => println!("No values given"),
        },

        Commands::Check { config: config_path } => {
            println!("Checking configuration at {:?}...", config_path);

            match config::load_config(&config_path) {
                Ok(cfg) => {
                    println!("Configuration is valid!");
                    println!("  Mappings: {}", cfg.mappings.len());
                    for mapping in cfg.build_mappings()? {
                        println!(
                            "    - {}: {} -> {}",
                            mapping.name(),
                            mapping.source().main_label(),
                            mapping.mode().kind().label()
                        );
                    }
                    println!(
                        "  Learn: bursts of {} within {} ms",
                        cfg.learn.burst_size, cfg.learn.max_wait_ms
                    );
                }
                Err(e) => {
                    println!("Configuration is invalid: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Control {
            config: config_path,
            mapping: name,
            value,
            current,
        } => {
            let cfg = config::load_config(&config_path)?;
            let entry = cfg
                .find(&name)
                .ok_or_else(|| anyhow!("no mapping named '{}'", name))?;
            let mut mapping = entry.to_mapping()?;

            let event = simulated_event(mapping.source(), value);
            let mut target = SimulatedTarget::continuous(current.clamp(0.0, 1.0));
            println!("Event: {:?}", event);
            if !mapping.control(&event, &mut target) {
                println!("Event doesn't match the source of '{}'", name);
                return Ok(());
            }

            if target.hits().is_empty() {
                println!("No target hit");
            }
            for (value, is_step_count) in target.hits() {
                if *is_step_count {
                    println!("Hit: {:+} steps", value);
                } else {
                    println!("Hit: {:.4}", value);
                }
            }

            let mut sink = RecordingSink::new();
            match mapping.feedback_value(&target) {
                Some(feedback) => {
                    println!(
                        "Feedback: {:.4} ({})",
                        feedback,
                        mapping.source().format_normalized_value(feedback)
                    );
                    mapping.feedback(&target, &mut sink);
                    for msg in sink.messages() {
                        println!("  {:?} {:02X?}", msg, msg.to_bytes());
                    }
                }
                None => println!("No feedback"),
            }
        }

        Commands::Learn {
            port,
            config: config_path,
            seconds,
            names,
        } => {
            let settings = match config_path {
                Some(path) => config::load_config(&path)?.learn,
                None => LearnSettings::default(),
            };
            let style = if names {
                EnumStyle::Name
            } else {
                EnumStyle::Index
            };

            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(async {
                let (listener, events) = MidiListener::open(port.as_deref())?;
                eprintln!(
                    "Listening on {}, move a control (Ctrl+C to stop)...",
                    listener.port_name()
                );

                let (stop_tx, mut stop_rx) = unbounded_channel::<()>();
                ctrlc::set_handler(move || {
                    let _ = stop_tx.send(());
                })?;

                let (learned_tx, mut learned_rx) = unbounded_channel();
                let learning = tokio::spawn(learn_sources(events, settings, learned_tx));

                let timeout = async {
                    match seconds {
                        Some(s) => tokio::time::sleep(Duration::from_secs(s)).await,
                        None => std::future::pending().await,
                    }
                };
                tokio::pin!(timeout);

                let print = |source: SourceConfig| -> Result<()> {
                    println!("{}", serde_json::to_string(&source.to_record(style))?);
                    Ok(())
                };

                loop {
                    tokio::select! {
                        Some(source) = learned_rx.recv() => print(source)?,
                        _ = stop_rx.recv() => break,
                        _ = &mut timeout => break,
                    }
                }

                // Closing the port ends the event stream, which flushes
                // whatever the learner still buffers
                drop(listener);
                learning.await?;
                while let Some(source) = learned_rx.recv().await {
                    print(source)?;
                }
                Ok::<_, anyhow::Error>(())
            })?;
        }

        Commands::Ports => {
            println!("MIDI inputs:");
            match list_input_ports() {
                Ok(ports) if ports.is_empty() => println!("  (none)"),
                Ok(ports) => ports.iter().for_each(|p| println!("  - {}", p)),
                Err(e) => println!("  Error listing ports: {}", e),
            }
            println!("MIDI outputs:");
            match list_output_ports() {
                Ok(ports) if ports.is_empty() => println!("  (none)"),
                Ok(ports) => ports.iter().for_each(|p| println!("  - {}", p)),
                Err(e) => println!("  Error listing ports: {}", e),
            }
        }

        Commands::Init { stdout } => {
            if stdout {
                print!("{}", config::EXAMPLE_CONFIG);
                return Ok(());
            }
            let path = "ctlmap.yaml";
            if std::path::Path::new(path).exists() {
                println!("ctlmap.yaml already exists. Not overwriting.");
            } else {
                std::fs::write(path, config::EXAMPLE_CONFIG)?;
                println!("Created ctlmap.yaml with example configuration.");
            }
        }
    }

    Ok(())
}
