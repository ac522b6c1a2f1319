use std::path::PathBuf;

use clap::{Args, Subcommand};
use rttprims_ring::ChannelMode;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod layout;
pub mod simulate;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the target memory layout of a control block.
    Layout(LayoutArgs),
    /// Stream messages through an in-process control block and report delivery.
    Simulate(SimulateArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Layout(args) => layout::run(args, format),
        Command::Simulate(args) => simulate::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct LayoutArgs {
    /// JSON channel configuration. Default: one "Terminal" channel each way.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Up channel capacity in bytes (one byte is always kept free).
    #[arg(long, default_value = "64", value_parser = clap::value_parser!(u32).range(2..))]
    pub capacity: u32,
    /// Up channel overflow mode: skip, trim or block.
    #[arg(long, default_value = "trim")]
    pub mode: ChannelMode,
    /// Number of messages the target writes.
    #[arg(long, default_value = "100")]
    pub messages: u32,
    /// Size of each message in bytes.
    #[arg(long, default_value = "16", value_parser = clap::value_parser!(u32).range(1..))]
    pub message_size: u32,
    /// Largest read the probe side issues at once.
    #[arg(long, default_value = "8", value_parser = clap::value_parser!(u32).range(1..))]
    pub chunk: u32,
    /// Command the probe sends back through the down channel.
    #[arg(long, default_value = "ping")]
    pub command: String,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
