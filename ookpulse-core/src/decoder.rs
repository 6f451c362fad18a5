//! Streaming pulse-width decoder
//!
//! Turns an unbounded stream of envelope samples into packets of symbols in a
//! single pass. A HIGH run is classified by its length once the following LOW
//! run outlasts the debounce; a packet is closed when a LOW run of at least
//! the packet gap is followed by a debounced HIGH run.

use crate::constants::{
    HIGH_DEBOUNCE, LOW_DEBOUNCE, ONE_RUN_MIN, PACKET_GAP_MIN, ZERO_RUN_MIN,
};
use crate::error::CodecError;
use crate::types::{Packet, Sample, Symbol};
use alloc::format;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

#[cfg(feature = "logging")]
use tracing::{debug, trace, warn};

/// Decoder thresholds, in samples at the receiver rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Minimum HIGH run classified as a one
    pub one_run_min: usize,

    /// Minimum HIGH run classified as a zero
    pub zero_run_min: usize,

    /// LOW samples that must be exceeded before a HIGH run is closed
    pub low_debounce: usize,

    /// HIGH samples that must be exceeded before a LOW run is closed
    pub high_debounce: usize,

    /// Minimum LOW run separating two packets
    pub packet_gap_min: usize,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            one_run_min: ONE_RUN_MIN,
            zero_run_min: ZERO_RUN_MIN,
            low_debounce: LOW_DEBOUNCE,
            high_debounce: HIGH_DEBOUNCE,
            packet_gap_min: PACKET_GAP_MIN,
        }
    }
}

impl DecoderConfig {
    /// Check that the thresholds can tell a zero from a one
    pub fn validate(&self) -> Result<(), CodecError> {
        if self.zero_run_min == 0 {
            return Err(CodecError::InvalidConfig(
                "zero_run_min must be at least 1".into(),
            ));
        }
        if self.zero_run_min >= self.one_run_min {
            return Err(CodecError::InvalidConfig(format!(
                "zero_run_min ({}) must be below one_run_min ({})",
                self.zero_run_min, self.one_run_min
            )));
        }
        Ok(())
    }

    /// Classify a finished HIGH run
    pub fn classify(&self, high_run: usize) -> Symbol {
        if high_run >= self.one_run_min {
            Symbol::One
        } else if high_run >= self.zero_run_min {
            Symbol::Zero
        } else {
            Symbol::Unknown
        }
    }
}

/// Decoder counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeStats {
    /// Samples consumed (HIGH or LOW)
    pub samples: usize,

    /// Bytes that were neither 0 nor 1
    pub ignored: usize,

    /// Symbols appended to packets
    pub symbols: usize,

    /// Symbols classified as unknown
    pub unknown_symbols: usize,

    /// Packets emitted
    pub packets: usize,
}

/// Level of the run currently being measured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Run {
    High,
    Low,
}

/// Single-pass decoder for one sample stream
///
/// Each run counter is only cleared by its own transition, so short glitches
/// of the opposite level accumulate until the next debounced edge.
#[derive(Debug, Clone)]
pub struct SymbolDecoder {
    config: DecoderConfig,
    run: Run,
    high_run: usize,
    low_run: usize,
    packet: Vec<Symbol>,
    stats: DecodeStats,
}

impl Default for SymbolDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolDecoder {
    /// Create a decoder with the protocol thresholds
    pub fn new() -> Self {
        Self::from_valid_config(DecoderConfig::default())
    }

    /// Create a decoder with custom thresholds
    pub fn with_config(config: DecoderConfig) -> Result<Self, CodecError> {
        if let Err(e) = config.validate() {
            #[cfg(feature = "logging")]
            warn!("Rejected decoder config {:?}: {:?}", config, e);
            return Err(e);
        }
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: DecoderConfig) -> Self {
        Self {
            config,
            run: Run::Low,
            high_run: 0,
            low_run: 0,
            packet: Vec::new(),
            stats: DecodeStats::default(),
        }
    }

    /// Thresholds in use
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Counters since creation or the last [`reset`](Self::reset)
    pub fn stats(&self) -> &DecodeStats {
        &self.stats
    }

    /// Symbols of the packet in progress
    pub fn pending(&self) -> &[Symbol] {
        &self.packet
    }

    /// Return to the initial state, dropping the packet in progress
    pub fn reset(&mut self) {
        *self = Self::from_valid_config(self.config);
    }

    /// Consume one sample, returning a packet if this sample closed one
    pub fn push(&mut self, sample: Sample) -> Option<Packet> {
        self.stats.samples = self.stats.samples.saturating_add(1);
        match sample {
            Sample::Low => {
                self.low_run = self.low_run.saturating_add(1);
                if self.run == Run::High && self.low_run > self.config.low_debounce {
                    self.close_high_run();
                }
                None
            }
            Sample::High => {
                self.high_run = self.high_run.saturating_add(1);
                if self.run == Run::Low && self.high_run > self.config.high_debounce {
                    self.close_low_run()
                } else {
                    None
                }
            }
        }
    }

    /// Consume one raw byte; anything but 0 or 1 is ignored
    pub fn push_byte(&mut self, byte: u8) -> Option<Packet> {
        match Sample::from_byte(byte) {
            Some(sample) => self.push(sample),
            None => {
                self.stats.ignored = self.stats.ignored.saturating_add(1);
                None
            }
        }
    }

    /// Consume a buffer of raw bytes, returning every packet it closed
    pub fn feed(&mut self, data: &[u8]) -> Vec<Packet> {
        data.iter().filter_map(|b| self.push_byte(*b)).collect()
    }

    fn close_high_run(&mut self) {
        let symbol = self.config.classify(self.high_run);

        #[cfg(feature = "logging")]
        trace!("HIGH run of {} samples -> {:?}", self.high_run, symbol);

        self.stats.symbols = self.stats.symbols.saturating_add(1);
        if symbol == Symbol::Unknown {
            self.stats.unknown_symbols = self.stats.unknown_symbols.saturating_add(1);
        }
        self.packet.push(symbol);
        self.high_run = 0;
        self.run = Run::Low;
    }

    fn close_low_run(&mut self) -> Option<Packet> {
        let emitted = if self.low_run >= self.config.packet_gap_min {
            let packet = Packet::new(core::mem::take(&mut self.packet));
            self.stats.packets = self.stats.packets.saturating_add(1);

            #[cfg(feature = "logging")]
            debug!(
                "Packet closed after {} LOW samples: {} symbols",
                self.low_run,
                packet.len()
            );

            Some(packet)
        } else {
            None
        };
        self.low_run = 0;
        self.run = Run::High;
        emitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn run(level: Sample, n: usize) -> Vec<Sample> {
        vec![level; n]
    }

    fn push_all(decoder: &mut SymbolDecoder, samples: &[Sample]) -> Vec<Packet> {
        samples.iter().filter_map(|s| decoder.push(*s)).collect()
    }

    /// One HIGH pulse of `width` followed by enough LOW to close it
    fn pulse(width: usize) -> Vec<Sample> {
        let mut v = run(Sample::High, width);
        v.extend(run(Sample::Low, 20));
        v
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(DecoderConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let cfg = DecoderConfig {
            zero_run_min: 30,
            one_run_min: 30,
            ..Default::default()
        };
        assert!(matches!(
            SymbolDecoder::with_config(cfg),
            Err(CodecError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_classification_thresholds() {
        let mut decoder = SymbolDecoder::new();
        for width in [30, 29, 8, 7, 5] {
            push_all(&mut decoder, &pulse(width));
        }
        assert_eq!(
            decoder.pending(),
            &[
                Symbol::One,
                Symbol::Zero,
                Symbol::Zero,
                Symbol::Unknown,
                Symbol::Unknown
            ]
        );
        assert_eq!(decoder.stats().unknown_symbols, 2);
    }

    #[test]
    fn test_high_run_closes_on_fifth_low_sample() {
        let mut decoder = SymbolDecoder::new();
        push_all(&mut decoder, &run(Sample::High, 40));
        push_all(&mut decoder, &run(Sample::Low, 4));
        assert!(decoder.pending().is_empty());

        decoder.push(Sample::Low);
        assert_eq!(decoder.pending(), &[Symbol::One]);
    }

    #[test]
    fn test_packet_gap_boundary() {
        let mut decoder = SymbolDecoder::new();
        push_all(&mut decoder, &pulse(40));

        // 20 LOW from the pulse plus 330 more reaches the gap exactly
        let mut tail = run(Sample::Low, 330);
        tail.extend(run(Sample::High, 5));
        let packets = push_all(&mut decoder, &tail);
        assert_eq!(packets, vec![Packet::new(vec![Symbol::One])]);
        assert!(decoder.pending().is_empty());

        let mut short = SymbolDecoder::new();
        push_all(&mut short, &pulse(40));
        let mut tail = run(Sample::Low, 329);
        tail.extend(run(Sample::High, 5));
        assert!(push_all(&mut short, &tail).is_empty());
        assert_eq!(short.pending(), &[Symbol::One]);
    }

    #[test]
    fn test_packet_closes_on_fifth_high_sample() {
        let mut decoder = SymbolDecoder::new();
        push_all(&mut decoder, &pulse(10));
        push_all(&mut decoder, &run(Sample::Low, 400));
        assert!(push_all(&mut decoder, &run(Sample::High, 4)).is_empty());
        assert!(decoder.push(Sample::High).is_some());
    }

    #[test]
    fn test_short_low_glitch_does_not_split_pulse() {
        let mut decoder = SymbolDecoder::new();
        let mut samples = run(Sample::High, 20);
        samples.extend(run(Sample::Low, 3));
        samples.extend(run(Sample::High, 20));
        samples.extend(run(Sample::Low, 20));
        push_all(&mut decoder, &samples);

        assert_eq!(decoder.pending(), &[Symbol::One]);
    }

    #[test]
    fn test_ignored_bytes() {
        let mut decoder = SymbolDecoder::new();
        let mut data = vec![1u8; 40];
        data.extend([7u8, 0xFF, 2]);
        data.extend(vec![0u8; 10]);

        assert!(decoder.feed(&data).is_empty());
        assert_eq!(decoder.pending(), &[Symbol::One]);
        assert_eq!(decoder.stats().ignored, 3);
        assert_eq!(decoder.stats().samples, 50);
    }

    #[test]
    fn test_stream_end_drops_partial_packet() {
        let mut decoder = SymbolDecoder::new();
        let mut samples = pulse(40);
        samples.extend(run(Sample::Low, 1000));
        assert!(push_all(&mut decoder, &samples).is_empty());
        assert_eq!(decoder.stats().packets, 0);
    }

    #[test]
    fn test_counters_saturate_on_endless_silence() {
        let mut decoder = SymbolDecoder::new();
        decoder.low_run = usize::MAX - 1;
        decoder.stats.samples = usize::MAX;

        push_all(&mut decoder, &run(Sample::Low, 3));
        assert_eq!(decoder.low_run, usize::MAX);
        assert_eq!(decoder.stats().samples, usize::MAX);

        // The gap is still long enough to close a packet
        let packets = push_all(&mut decoder, &run(Sample::High, 5));
        assert_eq!(packets.len(), 1);
        assert_eq!(decoder.low_run, 0);
    }

    #[test]
    fn test_reset_clears_state() {
        let mut decoder = SymbolDecoder::new();
        push_all(&mut decoder, &pulse(40));
        decoder.reset();
        assert!(decoder.pending().is_empty());
        assert_eq!(decoder.stats(), &DecodeStats::default());
    }
}
