use super::{build_commands, encode_commands};
use anyhow::{bail, Context, Result};
use ookpulse_core::constants::{MAX_LOOPBACK_STRETCH, MIN_LOOPBACK_STRETCH};
use std::fs;
use tracing::{info, warn};

/// Write the sample stream for one or more commands to a regular file
///
/// With `stretch > 1` every chip is repeated, producing a capture that
/// `decode` reads back.
pub fn execute(
    address: &str,
    identifier: &str,
    state: &str,
    repeat: usize,
    stretch: usize,
    output: &str,
) -> Result<()> {
    if stretch == 0 {
        bail!("Stretch factor must be at least 1");
    }
    if stretch > 1 && !(MIN_LOOPBACK_STRETCH..=MAX_LOOPBACK_STRETCH).contains(&stretch) {
        warn!(
            "Stretch factor {} is outside {}..={}; the default decoder will not read it back",
            stretch, MIN_LOOPBACK_STRETCH, MAX_LOOPBACK_STRETCH
        );
    }

    let commands = build_commands(address, identifier, state)?;
    info!(
        "Encoding {} commands, each repeated {} extra times",
        commands.len(),
        repeat
    );

    let data = encode_commands(&commands, repeat, stretch);

    fs::write(output, &data)
        .with_context(|| format!("Failed to write output file: {}", output))?;

    info!("Wrote {} samples to {}", data.len(), output);

    Ok(())
}
