//! Subcommand implementations and the helpers they share

pub mod decode;
pub mod encode;
pub mod listen;
pub mod send;

use anyhow::{Context, Result};
use bytes::{Bytes, BytesMut};
use colored::*;
use ookpulse_core::{
    encoder::TransmissionBuilder,
    types::{expand_commands, Address, Identifier, Selector},
    Command, PacketReport, State,
};
use serde::Serialize;
use std::io::Write;

/// Parse the address, identifier and state arguments, expanding `ALL`
pub fn build_commands(address: &str, identifier: &str, state: &str) -> Result<Vec<Command>> {
    let address: Selector<Address> = address
        .parse()
        .with_context(|| format!("Invalid address: {}", address))?;
    let identifier: Selector<Identifier> = identifier
        .parse()
        .with_context(|| format!("Invalid identifier: {}", identifier))?;
    let state: State = state
        .parse()
        .with_context(|| format!("Invalid state: {}", state))?;

    Ok(expand_commands(&address, &identifier, state))
}

/// Encode every command back to back, each block repeated `repeat` extra times
pub fn encode_commands(commands: &[Command], repeat: usize, stretch: usize) -> Bytes {
    let mut out = BytesMut::new();
    for cmd in commands {
        out.extend_from_slice(
            &TransmissionBuilder::new(*cmd)
                .repeat(repeat)
                .stretch(stretch)
                .build(),
        );
    }
    out.freeze()
}

/// JSON form of one packet report
#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ReportRecord {
    /// Clean decode
    Command {
        sample_offset: Option<usize>,
        command: Command,
    },
    /// Field errors rendered as markers
    Partial {
        sample_offset: Option<usize>,
        address: String,
        identifier: Option<Identifier>,
        state: Option<State>,
    },
    /// Wrong-length packet
    Raw {
        sample_offset: Option<usize>,
        length: usize,
        data: String,
    },
}

impl ReportRecord {
    /// Flatten a report, tagging it with where it was found if known
    pub fn new(report: &PacketReport, sample_offset: Option<usize>) -> Self {
        match report {
            PacketReport::Decoded(command) => ReportRecord::Command {
                sample_offset,
                command: *command,
            },
            PacketReport::Partial(partial) => ReportRecord::Partial {
                sample_offset,
                address: partial
                    .address
                    .iter()
                    .map(|bit| match bit {
                        Some(true) => '1',
                        Some(false) => '0',
                        None => 'e',
                    })
                    .collect(),
                identifier: partial.identifier,
                state: partial.state,
            },
            PacketReport::Raw(packet) => ReportRecord::Raw {
                sample_offset,
                length: packet.len(),
                data: packet.to_string(),
            },
        }
    }
}

/// Print one report, either as text or as a JSON line
pub fn write_report<W: Write>(
    out: &mut W,
    report: &PacketReport,
    sample_offset: Option<usize>,
    json: bool,
) -> Result<()> {
    if json {
        let record = ReportRecord::new(report, sample_offset);
        serde_json::to_writer(&mut *out, &record).context("Failed to serialize report")?;
        writeln!(out)?;
    } else {
        let marker = match report {
            PacketReport::Decoded(_) => "[+]".green(),
            _ => "[!]".yellow(),
        };
        writeln!(out, "{} New Packet:", marker)?;
        writeln!(out, "{}", report)?;
    }
    Ok(())
}
