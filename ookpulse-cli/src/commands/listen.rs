use super::write_report;
use crate::flowgraph::Flowgraph;
use crate::interrupt::Interrupt;
use crate::{load_decoder, DecodeFlags};
use anyhow::{Context, Result};
use ookpulse_core::{inspect_packet, DecodeOptions, SymbolDecoder};
use std::io::{self, ErrorKind, Write};
use std::net::UdpSocket;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

const DATAGRAM_SIZE: usize = 1024;
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Arguments of the `listen` subcommand
#[derive(Debug, Clone, clap::Args)]
pub struct ListenArgs {
    /// UDP address the receive flowgraph streams samples to
    #[arg(short, long, default_value = "127.0.0.1:8000")]
    pub bind: String,

    #[command(flatten)]
    pub flags: DecodeFlags,

    /// Print one JSON object per packet
    #[arg(long)]
    pub json: bool,

    /// Decoder thresholds (JSON)
    #[arg(long)]
    pub config: Option<String>,

    /// Receive flowgraph script to launch
    #[arg(long)]
    pub flowgraph: Option<PathBuf>,

    /// Show the output of the flowgraph and grcc
    #[arg(short = 'g', long)]
    pub show_flowgraph_output: bool,

    /// Time given to the flowgraph to boot, in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub boot_delay_ms: u64,
}

/// Decoding state carried across datagrams
pub struct Listener {
    decoder: SymbolDecoder,
    options: DecodeOptions,
    json: bool,
}

impl Listener {
    /// Listener printing reports as text, or as JSON lines with `json`
    pub fn new(decoder: SymbolDecoder, options: DecodeOptions, json: bool) -> Self {
        Self {
            decoder,
            options,
            json,
        }
    }

    /// Feed one datagram of samples, printing every packet it completes
    ///
    /// Returns the number of packets printed.
    pub fn handle<W: Write>(&mut self, out: &mut W, datagram: &[u8]) -> Result<usize> {
        let mut printed = 0;
        for packet in self.decoder.feed(datagram) {
            match inspect_packet(&packet, self.options) {
                Ok(report) => {
                    write_report(out, &report, None, self.json)?;
                    out.flush()?;
                    printed += 1;
                }
                Err(e) => debug!("Dropped packet {}: {}", packet, e),
            }
        }
        Ok(printed)
    }

    /// The decoder, for its counters
    pub fn decoder(&self) -> &SymbolDecoder {
        &self.decoder
    }
}

/// Receive samples over UDP and print packets until Ctrl-C
pub fn execute(args: &ListenArgs) -> Result<()> {
    let decoder = load_decoder(args.config.as_deref())?;
    let mut listener = Listener::new(decoder, args.flags.into(), args.json);

    let interrupt = Interrupt::install()?;

    let socket = UdpSocket::bind(&args.bind)
        .with_context(|| format!("Failed to bind UDP socket: {}", args.bind))?;
    socket
        .set_read_timeout(Some(POLL_INTERVAL))
        .context("Failed to set socket timeout")?;

    let flowgraph = match &args.flowgraph {
        Some(script) => Some(Flowgraph::launch_and_settle(
            script,
            args.show_flowgraph_output,
            Duration::from_millis(args.boot_delay_ms),
        )?),
        None => None,
    };

    info!("Listening for samples on {}", args.bind);
    let result = receive_loop(&socket, &mut listener, &interrupt);

    let stats = listener.decoder().stats();
    info!(
        "Processed {} samples, {} packets ({} unknown symbols)",
        stats.samples, stats.packets, stats.unknown_symbols
    );

    if let Some(flowgraph) = flowgraph {
        flowgraph.terminate()?;
    }

    result
}

fn receive_loop(socket: &UdpSocket, listener: &mut Listener, interrupt: &Interrupt) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut buf = [0u8; DATAGRAM_SIZE];

    while !interrupt.is_raised() {
        match socket.recv_from(&mut buf) {
            Ok((n, _peer)) => {
                listener.handle(&mut out, &buf[..n])?;
            }
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {}
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => {
                warn!("UDP receive failed: {}", e);
                return Err(e).context("Failed to receive samples");
            }
        }
    }

    info!("Got keyboard interrupt");
    Ok(())
}
