use anyhow::Result;
use clap::{Parser, Subcommand};
use ookpulse_cli::commands::{self, listen::ListenArgs, send::SendArgs};
use ookpulse_cli::DecodeFlags;
use ookpulse_core::constants::DEFAULT_REPEAT;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "ookpulse")]
#[command(about = "ookpulse - Encode and decode OOK remote power socket packets", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the sample stream for a command to a file
    Encode {
        /// Socket address, e.g. 00101, or ALL
        #[arg(short, long)]
        address: String,

        /// Socket identifier: A, B, C, D, E or ALL
        #[arg(short, long)]
        identifier: String,

        /// Switch the power on or off
        #[arg(short, long)]
        state: String,

        /// Repeat every packet this many extra times
        #[arg(short, long, default_value_t = DEFAULT_REPEAT)]
        repeat: usize,

        /// Samples per chip; 13 to 29 gives a capture `decode` can read
        #[arg(long, default_value = "1")]
        stretch: usize,

        /// Output file for the samples
        #[arg(short, long)]
        output: String,
    },

    /// Decode packets from a recorded sample capture
    Decode {
        /// Capture file, or - for stdin
        #[arg(short, long)]
        input: String,

        /// Output JSON file for decoded packets
        #[arg(short, long)]
        output: Option<String>,

        #[command(flatten)]
        flags: DecodeFlags,

        /// Print one JSON object per packet
        #[arg(long)]
        json: bool,

        /// Show decode statistics
        #[arg(long)]
        stats: bool,

        /// Decoder thresholds (JSON)
        #[arg(long)]
        config: Option<String>,
    },

    /// Transmit commands through the SDR flowgraph
    Send(SendArgs),

    /// Receive and decode packets from the SDR flowgraph
    Listen(ListenArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Encode {
            address,
            identifier,
            state,
            repeat,
            stretch,
            output,
        } => commands::encode::execute(&address, &identifier, &state, repeat, stretch, &output),

        Commands::Decode {
            input,
            output,
            flags,
            json,
            stats,
            config,
        } => commands::decode::execute(
            &input,
            output.as_deref(),
            flags,
            json,
            stats,
            config.as_deref(),
        ),

        Commands::Send(args) => commands::send::execute(&args),

        Commands::Listen(args) => commands::listen::execute(&args),
    }
}
