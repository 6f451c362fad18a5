use super::{build_commands, encode_commands};
use crate::flowgraph::Flowgraph;
use crate::interrupt::Interrupt;
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use nix::errno::Errno;
use nix::fcntl::OFlag;
use nix::sys::stat::Mode;
use ookpulse_core::constants::{DEFAULT_CHIP_PERIOD_US, DEFAULT_REPEAT};
use ookpulse_core::encoder::transmission_duration;
use ookpulse_core::Command;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};
use tracing::info;

const FIFO_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Arguments of the `send` subcommand
#[derive(Debug, Clone, clap::Args)]
pub struct SendArgs {
    /// Socket address, e.g. 00101, or ALL
    #[arg(short, long)]
    pub address: String,

    /// Socket identifier: A, B, C, D, E or ALL
    #[arg(short, long)]
    pub identifier: String,

    /// Switch the power on or off
    #[arg(short, long)]
    pub state: String,

    /// Repeat every packet this many extra times
    #[arg(short, long, default_value_t = DEFAULT_REPEAT)]
    pub repeat: usize,

    /// FIFO read by the transmit flowgraph
    #[arg(long, default_value = "./packets-fifo.bin")]
    pub fifo: PathBuf,

    /// Duration of one chip at the flowgraph sample rate, in microseconds
    #[arg(long, default_value_t = DEFAULT_CHIP_PERIOD_US)]
    pub chip_period_us: u64,

    /// Transmit flowgraph script to launch
    #[arg(long)]
    pub flowgraph: Option<PathBuf>,

    /// Show the output of the flowgraph and grcc
    #[arg(short = 'g', long)]
    pub show_flowgraph_output: bool,

    /// Time given to the flowgraph to boot, in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub boot_delay_ms: u64,

    /// Return as soon as the samples are written
    #[arg(long)]
    pub no_wait: bool,
}

/// Encode the requested commands and stream them into the FIFO
pub fn execute(args: &SendArgs) -> Result<()> {
    let interrupt = Interrupt::install()?;
    execute_with(args, &interrupt)
}

/// Same as [`execute`], polling an already installed interrupt flag
///
/// A FIFO created by this call is removed on every exit path.
pub fn execute_with(args: &SendArgs, interrupt: &Interrupt) -> Result<()> {
    let commands = build_commands(&args.address, &args.identifier, &args.state)?;
    for cmd in &commands {
        info!("Added packet to send queue: {}", cmd);
    }
    info!("Every packet will be repeated {} times", args.repeat);

    info!("Creating FIFO {} to communicate with the flowgraph", args.fifo.display());
    let created_fifo = make_fifo(&args.fifo)?;

    let result = run_flowgraph(args, &commands, interrupt);

    if created_fifo {
        info!("Removing FIFO {}", args.fifo.display());
        let removed = fs::remove_file(&args.fifo)
            .with_context(|| format!("Failed to remove FIFO: {}", args.fifo.display()));
        if let Err(e) = removed {
            return result.and(Err(e));
        }
    }

    result
}

fn run_flowgraph(args: &SendArgs, commands: &[Command], interrupt: &Interrupt) -> Result<()> {
    let flowgraph = match &args.flowgraph {
        Some(script) => Some(Flowgraph::launch_and_settle(
            script,
            args.show_flowgraph_output,
            Duration::from_millis(args.boot_delay_ms),
        )?),
        None => None,
    };

    let result = transmit(args, commands, interrupt);

    if let Some(flowgraph) = flowgraph {
        if !interrupt.is_raised() {
            info!("Waiting 1 second before terminating the flowgraph");
            thread::sleep(Duration::from_secs(1));
        }
        flowgraph.terminate()?;
    }

    result
}

fn transmit(args: &SendArgs, commands: &[Command], interrupt: &Interrupt) -> Result<()> {
    let data = encode_commands(commands, args.repeat, 1);
    let send_time = transmission_duration(
        args.repeat,
        commands.len(),
        Duration::from_micros(args.chip_period_us),
    );
    info!(
        "Sending {} packets... This will take about {:.3} seconds",
        commands.len(),
        send_time.as_secs_f64()
    );

    let Some(mut fifo) = open_fifo(&args.fifo, interrupt)? else {
        info!("Got keyboard interrupt");
        return Ok(());
    };
    fifo.write_all(&data)
        .with_context(|| format!("Failed to write to FIFO: {}", args.fifo.display()))?;
    drop(fifo);

    if !args.no_wait {
        wait_for_transmission(send_time, interrupt);
    }

    Ok(())
}

/// Open the write end of the FIFO once a reader is attached
///
/// Returns `None` if the interrupt is raised before a reader shows up.
pub fn open_fifo(path: &Path, interrupt: &Interrupt) -> Result<Option<File>> {
    let mut waiting = false;
    loop {
        if interrupt.is_raised() {
            return Ok(None);
        }

        // A non-blocking open fails with ENXIO while nobody reads the FIFO
        let attempt = OpenOptions::new()
            .write(true)
            .custom_flags(OFlag::O_NONBLOCK.bits())
            .open(path);

        match attempt {
            Ok(reader_attached) => {
                // The reader is there, so a blocking open returns at once
                let fifo = OpenOptions::new()
                    .write(true)
                    .open(path)
                    .with_context(|| format!("Failed to open FIFO: {}", path.display()))?;
                drop(reader_attached);
                return Ok(Some(fifo));
            }
            Err(e) if e.raw_os_error() == Some(Errno::ENXIO as i32) => {
                if !waiting {
                    info!("Waiting for the flowgraph to open {}", path.display());
                    waiting = true;
                }
                thread::sleep(FIFO_POLL_INTERVAL);
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to open FIFO: {}", path.display()))
            }
        }
    }
}

/// Create the FIFO; returns false if it already existed
pub fn make_fifo(path: &Path) -> Result<bool> {
    match nix::unistd::mkfifo(path, Mode::S_IRUSR | Mode::S_IWUSR) {
        Ok(()) => Ok(true),
        Err(Errno::EEXIST) => Ok(false),
        Err(e) => {
            Err(e).with_context(|| format!("Failed to create FIFO: {}", path.display()))
        }
    }
}

fn wait_for_transmission(send_time: Duration, interrupt: &Interrupt) {
    let pb = ProgressBar::new(u64::try_from(send_time.as_millis()).unwrap_or(u64::MAX));
    pb.set_style(
        ProgressStyle::with_template("{spinner} transmitting [{bar:40}] {elapsed_precise}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let start = Instant::now();
    while start.elapsed() < send_time {
        if interrupt.is_raised() {
            pb.abandon_with_message("interrupted");
            info!("Got keyboard interrupt");
            return;
        }
        pb.set_position(u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX));
        thread::sleep(Duration::from_millis(20));
    }
    pb.finish_and_clear();
}
