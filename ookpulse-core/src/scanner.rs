//! Packet recovery from sample streams and captures

use crate::decoder::{DecodeStats, SymbolDecoder};
use crate::packet::{inspect_packet, DecodeOptions, PacketReport};
use crate::types::{Packet, Sample};
use alloc::vec::Vec;

#[cfg(feature = "logging")]
use tracing::{debug, warn};

/// Iterator adapter yielding packets decoded from any sample source
///
/// Created by [`decode_samples`].
pub struct Packets<I> {
    samples: I,
    decoder: SymbolDecoder,
}

impl<I> Packets<I> {
    /// The underlying decoder (for stats or pending symbols)
    pub fn decoder(&self) -> &SymbolDecoder {
        &self.decoder
    }
}

impl<I: Iterator<Item = Sample>> Iterator for Packets<I> {
    type Item = Packet;

    fn next(&mut self) -> Option<Packet> {
        for sample in self.samples.by_ref() {
            if let Some(packet) = self.decoder.push(sample) {
                return Some(packet);
            }
        }
        None
    }
}

/// Decode packets lazily from a sample source with the default thresholds
///
/// ```
/// use ookpulse_core::scanner::decode_samples;
/// use ookpulse_core::types::Sample;
///
/// let silence = std::iter::repeat(Sample::Low).take(400);
/// let edge = std::iter::repeat(Sample::High).take(5);
/// assert_eq!(decode_samples(silence.chain(edge)).count(), 1);
/// ```
pub fn decode_samples<I>(samples: I) -> Packets<I::IntoIter>
where
    I: IntoIterator<Item = Sample>,
{
    decode_samples_with(samples, SymbolDecoder::new())
}

/// Decode packets lazily using a preconfigured decoder
pub fn decode_samples_with<I>(samples: I, decoder: SymbolDecoder) -> Packets<I::IntoIter>
where
    I: IntoIterator<Item = Sample>,
{
    Packets {
        samples: samples.into_iter(),
        decoder,
    }
}

/// A packet report found in a capture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedReport {
    /// Sample index at which the packet was closed
    pub sample_offset: usize,

    /// The decoded (or best-effort) packet
    pub report: PacketReport,
}

/// Capture scan statistics
#[derive(Debug, Clone, Default)]
pub struct ScanStats {
    /// Total bytes scanned
    pub bytes_scanned: usize,

    /// Decoder counters at the end of the capture
    pub decoder: DecodeStats,

    /// Packets that decoded into a command
    pub commands: usize,

    /// Packets reported with field errors
    pub partial: usize,

    /// Packets reported raw because of their length
    pub raw: usize,

    /// Packets dropped as undecodable
    pub rejected: usize,

    /// Symbols left pending when the capture ended
    pub trailing_symbols: usize,
}

impl ScanStats {
    /// Share of emitted packets that decoded cleanly, as a percentage
    pub fn decode_rate(&self) -> f64 {
        if self.decoder.packets == 0 {
            0.0
        } else {
            (self.commands as f64 / self.decoder.packets as f64) * 100.0
        }
    }
}

/// Scan a raw byte capture and report every packet
///
/// Bytes other than 0 and 1 are skipped. Packets are reported according to
/// `options`; packets the options do not admit are counted as rejected.
/// The packet still being received when the capture ends is not reported.
pub fn scan_capture(
    data: &[u8],
    decoder: SymbolDecoder,
    options: DecodeOptions,
) -> (Vec<LocatedReport>, ScanStats) {
    let mut decoder = decoder;
    let mut stats = ScanStats {
        bytes_scanned: data.len(),
        ..Default::default()
    };
    let mut results = Vec::new();

    #[cfg(feature = "logging")]
    debug!("Starting capture scan of {} bytes", data.len());

    for byte in data {
        let Some(packet) = decoder.push_byte(*byte) else {
            continue;
        };

        match inspect_packet(&packet, options) {
            Ok(report) => {
                match &report {
                    PacketReport::Decoded(_) => stats.commands += 1,
                    PacketReport::Partial(_) => stats.partial += 1,
                    PacketReport::Raw(_) => stats.raw += 1,
                }
                results.push(LocatedReport {
                    sample_offset: decoder.stats().samples,
                    report,
                });
            }
            Err(_e) => {
                #[cfg(feature = "logging")]
                warn!(
                    "Dropping packet closed at sample {}: {:?}",
                    decoder.stats().samples,
                    _e
                );

                stats.rejected += 1;
            }
        }
    }

    stats.decoder = *decoder.stats();
    stats.trailing_symbols = decoder.pending().len();

    #[cfg(feature = "logging")]
    debug!(
        "Scan complete: {} packets, {} commands, {} rejected",
        stats.decoder.packets, stats.commands, stats.rejected
    );

    (results, stats)
}
