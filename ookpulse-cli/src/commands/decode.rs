use super::{write_report, ReportRecord};
use crate::{load_decoder, DecodeFlags};
use anyhow::{Context, Result};
use ookpulse_core::scanner::{scan_capture, LocatedReport, ScanStats};
use std::fs;
use std::io::{self, Read, Write};
use tracing::info;

/// Decode a raw sample capture (`-` reads stdin)
pub fn execute(
    input: &str,
    output: Option<&str>,
    flags: DecodeFlags,
    json: bool,
    show_stats: bool,
    config: Option<&str>,
) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    execute_to(&mut out, input, output, flags, json, show_stats, config)?;
    Ok(())
}

/// Same as [`execute`], writing human-readable output to `out`
pub fn execute_to<W: Write>(
    out: &mut W,
    input: &str,
    output: Option<&str>,
    flags: DecodeFlags,
    json: bool,
    show_stats: bool,
    config: Option<&str>,
) -> Result<ScanStats> {
    info!("Decoding capture: {}", input);

    let data = if input == "-" {
        let mut buf = Vec::new();
        io::stdin().read_to_end(&mut buf)?;
        buf
    } else {
        fs::read(input).with_context(|| format!("Failed to read input file: {}", input))?
    };

    info!("Capture size: {} bytes", data.len());

    let decoder = load_decoder(config)?;
    let (reports, stats) = scan_capture(&data, decoder, flags.into());

    if let Some(output_path) = output {
        write_json(output_path, &reports)?;
    } else {
        for located in &reports {
            write_report(out, &located.report, Some(located.sample_offset), json)?;
        }
    }

    if show_stats {
        writeln!(out, "\n=== Decode Results ===")?;
        writeln!(out, "Bytes scanned:     {}", stats.bytes_scanned)?;
        writeln!(out, "Ignored bytes:     {}", stats.decoder.ignored)?;
        writeln!(out, "Symbols:           {}", stats.decoder.symbols)?;
        writeln!(out, "Unknown symbols:   {}", stats.decoder.unknown_symbols)?;
        writeln!(out, "Packets:           {}", stats.decoder.packets)?;
        writeln!(out, "Commands:          {}", stats.commands)?;
        writeln!(out, "Partial:           {}", stats.partial)?;
        writeln!(out, "Raw:               {}", stats.raw)?;
        writeln!(out, "Rejected:          {}", stats.rejected)?;
        writeln!(out, "Trailing symbols:  {}", stats.trailing_symbols)?;
        writeln!(out, "Decode rate:       {:.2}%", stats.decode_rate())?;
    }

    Ok(stats)
}

fn write_json(path: &str, reports: &[LocatedReport]) -> Result<()> {
    let records: Vec<ReportRecord> = reports
        .iter()
        .map(|r| ReportRecord::new(&r.report, Some(r.sample_offset)))
        .collect();

    let json = serde_json::to_string_pretty(&records)
        .with_context(|| "Failed to serialize decoded packets")?;

    fs::write(path, json).with_context(|| format!("Failed to write output file: {}", path))?;

    info!("Decoded packets written to: {}", path);
    Ok(())
}
