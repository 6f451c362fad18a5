//! Library entry for ookpulse-cli used by integration tests and embedding.

pub mod commands;
pub mod flowgraph;
pub mod interrupt;

// Re-export commands for convenience
pub use commands::*;

use anyhow::{Context, Result};
use ookpulse_core::{DecodeOptions, DecoderConfig, SymbolDecoder};
use std::fs;
use tracing::info;

/// Decode relaxations shared by `decode` and `listen`
#[derive(Copy, Clone, Debug, Default, clap::Args)]
pub struct DecodeFlags {
    /// Show packets even if the length is not 25 symbols
    #[arg(short = 'l', long)]
    pub ignore_length: bool,

    /// Decode packets even if some fields make no sense
    #[arg(short = 'e', long)]
    pub ignore_errors: bool,
}

impl From<DecodeFlags> for DecodeOptions {
    fn from(flags: DecodeFlags) -> Self {
        DecodeOptions {
            ignore_length: flags.ignore_length,
            ignore_errors: flags.ignore_errors,
        }
    }
}

/// Build a decoder, reading thresholds from a JSON file if one is given
///
/// Fields missing from the file keep their protocol defaults.
pub fn load_decoder(config: Option<&str>) -> Result<SymbolDecoder> {
    let config = match config {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read decoder config: {}", path))?;
            let config: DecoderConfig = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse decoder config: {}", path))?;
            info!("Loaded decoder config from {}: {:?}", path, config);
            config
        }
        None => DecoderConfig::default(),
    };

    SymbolDecoder::with_config(config).context("Invalid decoder config")
}
