//! Symbol-to-sample encoding for transmission

use crate::constants::{
    BLOCK_CHIPS, CHIPS_PER_SYMBOL, DEFAULT_REPEAT, TRAILING_SILENCE_CHIPS,
};
use crate::packet::encode_command;
use crate::types::{Command, Packet, Sample, Symbol};
use alloc::vec::Vec;
use bytes::{BufMut, Bytes, BytesMut};
use core::time::Duration;

use crate::types::Sample::{High, Low};

const ONE_CHIPS: [Sample; CHIPS_PER_SYMBOL] = [High, High, High, Low];
const ZERO_CHIPS: [Sample; CHIPS_PER_SYMBOL] = [High, Low, Low, Low];

/// Chips for one symbol
///
/// [`Symbol::Unknown`] is written like a zero, as the reference transmitter
/// writes any non-`1` character.
pub const fn symbol_chips(symbol: Symbol) -> [Sample; CHIPS_PER_SYMBOL] {
    match symbol {
        Symbol::One => ONE_CHIPS,
        Symbol::Zero | Symbol::Unknown => ZERO_CHIPS,
    }
}

/// Expand symbols into chips, four per symbol
pub fn encode_symbols(symbols: &[Symbol]) -> Vec<Sample> {
    symbols.iter().flat_map(|s| symbol_chips(*s)).collect()
}

/// Encode one packet block: symbol chips followed by the trailing silence
pub fn encode_block(packet: &Packet) -> Vec<Sample> {
    let mut block = Vec::with_capacity(packet.len() * CHIPS_PER_SYMBOL + TRAILING_SILENCE_CHIPS);
    block.extend(encode_symbols(packet.symbols()));
    block.extend(core::iter::repeat(Low).take(TRAILING_SILENCE_CHIPS));
    block
}

/// Encode a packet block and repeat it `repeat` extra times
pub fn encode_transmission(packet: &Packet, repeat: usize) -> Vec<Sample> {
    let block = encode_block(packet);
    let mut out = Vec::with_capacity(block.len() * (repeat + 1));
    for _ in 0..=repeat {
        out.extend_from_slice(&block);
    }
    out
}

/// Raw bytes (`0`/`1`) as written to the flowgraph
pub fn samples_to_bytes(samples: &[Sample]) -> Bytes {
    let mut buf = BytesMut::with_capacity(samples.len());
    for sample in samples {
        buf.put_u8(sample.as_byte());
    }
    buf.freeze()
}

/// Repeat every sample `factor` times
///
/// Turns chip-rate output into a receiver-rate capture. With the default
/// decoder thresholds, factors in
/// [`MIN_LOOPBACK_STRETCH`](crate::constants::MIN_LOOPBACK_STRETCH)..=[`MAX_LOOPBACK_STRETCH`](crate::constants::MAX_LOOPBACK_STRETCH)
/// decode back to the original packets.
pub fn stretch(samples: &[Sample], factor: usize) -> Vec<Sample> {
    samples
        .iter()
        .flat_map(|s| core::iter::repeat(*s).take(factor))
        .collect()
}

/// Expected air time of a transmission
///
/// `(BLOCK_CHIPS * chip_period) * (repeat + 1) * packets`, saturating at
/// [`Duration::MAX`].
pub fn transmission_duration(repeat: usize, packets: usize, chip_period: Duration) -> Duration {
    const NANOS_PER_SEC: u128 = 1_000_000_000;

    let chips = (BLOCK_CHIPS as u128)
        .saturating_mul(repeat as u128 + 1)
        .saturating_mul(packets as u128);
    let nanos = chip_period.as_nanos().saturating_mul(chips);

    match u64::try_from(nanos / NANOS_PER_SEC) {
        Ok(secs) => Duration::new(secs, (nanos % NANOS_PER_SEC) as u32),
        Err(_) => Duration::MAX,
    }
}

/// Builder for the sample stream of one command
///
/// ```
/// use ookpulse_core::encoder::TransmissionBuilder;
/// use ookpulse_core::types::Command;
///
/// let cmd = Command::parse("00101", "B", "on").unwrap();
/// let bytes = TransmissionBuilder::new(cmd).repeat(0).build();
/// assert_eq!(bytes.len(), 124);
/// ```
pub struct TransmissionBuilder {
    command: Command,
    repeat: usize,
    stretch: usize,
}

impl TransmissionBuilder {
    /// Create a builder with the default repeat count and no stretching
    pub fn new(command: Command) -> Self {
        Self {
            command,
            repeat: DEFAULT_REPEAT,
            stretch: 1,
        }
    }

    /// Set how many extra times the block is sent
    pub fn repeat(mut self, repeat: usize) -> Self {
        self.repeat = repeat;
        self
    }

    /// Repeat every chip `factor` times (loopback captures)
    pub fn stretch(mut self, factor: usize) -> Self {
        self.stretch = factor.max(1);
        self
    }

    /// Build the sample sequence
    pub fn build_samples(&self) -> Vec<Sample> {
        let packet = encode_command(&self.command);
        let samples = encode_transmission(&packet, self.repeat);
        if self.stretch > 1 {
            stretch(&samples, self.stretch)
        } else {
            samples
        }
    }

    /// Build the raw byte stream
    pub fn build(&self) -> Bytes {
        samples_to_bytes(&self.build_samples())
    }
}
