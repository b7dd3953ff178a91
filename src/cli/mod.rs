//! CLI interface for ctlmap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Value mapping and feedback for MIDI controllers
#[derive(Parser)]
#[command(name = "ctlmap")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Guess a control's character from a run of CC values
    Classify {
        /// Consecutive 7-bit CC values
        #[arg(required = true, value_parser = clap::value_parser!(u8).range(0..=127))]
        values: Vec<u8>,
    },

    /// Validate a mapping file
    Check {
        /// Mapping file path (.yaml or .json)
        #[arg(short, long, default_value = "ctlmap.yaml")]
        config: PathBuf,
    },

    /// Simulate one control cycle against a continuous target
    Control {
        /// Mapping file path (.yaml or .json)
        #[arg(short, long, default_value = "ctlmap.yaml")]
        config: PathBuf,

        /// Name of the mapping to use
        #[arg(short, long)]
        mapping: String,

        /// Raw value as the controller sends it: the data byte for 7-bit
        /// sources, 0-16383 for 14-bit ones, bpm for tempo
        #[arg(long)]
        value: f64,

        /// Current normalized value of the target
        #[arg(long, default_value = "0.0")]
        current: f64,
    },

    /// Listen on a MIDI input and print learned sources
    Learn {
        /// Input port name (substring match, default: first port)
        #[arg(short, long)]
        port: Option<String>,

        /// Mapping file to take learn settings from
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Stop after this many seconds (default: run until Ctrl+C)
        #[arg(short, long)]
        seconds: Option<u64>,

        /// Write enums as names instead of indices
        #[arg(long)]
        names: bool,
    },

    /// List available MIDI ports
    Ports,

    /// Generate an example mapping file
    Init {
        /// Print to stdout instead of writing ctlmap.yaml
        #[arg(long)]
        stdout: bool,
    },
}
