//! Protocol constants for the 433 MHz socket pulse code
//!
//! Receive thresholds are counted in receiver samples; transmit layout is
//! counted in chips, one chip per sample written to the flowgraph.

/// Number of symbols in one well-formed packet
pub const PACKET_SYMBOLS: usize = 25;

/// Number of address bits carried by a packet
pub const ADDRESS_BITS: usize = 5;

/// Symbol range holding the address (5 pairs)
pub const ADDRESS_RANGE: core::ops::Range<usize> = 0..10;

/// Symbol range holding the identifier code
pub const IDENTIFIER_RANGE: core::ops::Range<usize> = 10..20;

/// Symbol range read when decoding the state
///
/// Symbol 24 is written by the transmitter but never read.
pub const STATE_RANGE: core::ops::Range<usize> = 20..24;

/// Number of state symbols written by the transmitter
pub const STATE_SYMBOLS: usize = 5;

/// Minimum HIGH run (samples) classified as a logical one
pub const ONE_RUN_MIN: usize = 30;

/// Minimum HIGH run (samples) classified as a logical zero
pub const ZERO_RUN_MIN: usize = 8;

/// A LOW run must exceed this many samples before a HIGH run is closed
pub const LOW_DEBOUNCE: usize = 4;

/// A HIGH run must exceed this many samples before a LOW run is closed
pub const HIGH_DEBOUNCE: usize = 4;

/// Minimum LOW run (samples) treated as silence between packets
pub const PACKET_GAP_MIN: usize = 350;

/// Chips emitted per symbol
pub const CHIPS_PER_SYMBOL: usize = 4;

/// LOW chips appended after every packet block
pub const TRAILING_SILENCE_CHIPS: usize = 24;

/// Chips in one packet block, including the trailing silence
pub const BLOCK_CHIPS: usize = PACKET_SYMBOLS * CHIPS_PER_SYMBOL + TRAILING_SILENCE_CHIPS;

/// Default number of extra repetitions per transmission
pub const DEFAULT_REPEAT: usize = 3;

/// Duration of one transmitted chip in the reference deployment (microseconds)
pub const DEFAULT_CHIP_PERIOD_US: u64 = 300;

/// Smallest chip-to-sample stretch that still separates repeated blocks
///
/// The last symbol of every packet is a zero, so a block ends with
/// 3 + 24 LOW chips; 27 * 13 = 351 reaches [`PACKET_GAP_MIN`].
pub const MIN_LOOPBACK_STRETCH: usize = 13;

/// Largest stretch that keeps a zero pulse below [`ONE_RUN_MIN`]
pub const MAX_LOOPBACK_STRETCH: usize = 29;

/// Identifier code table, symbols 10..20 of a packet (`1` = one, `0` = zero)
pub const IDENTIFIER_CODES: [(char, &str); 5] = [
    ('A', "0001010101"),
    ('B', "0100010101"),
    ('C', "0101000101"),
    ('D', "0101010001"),
    ('E', "0101010100"),
];

/// State code written for ON (5 symbols)
pub const STATE_ON_CODE: &str = "00010";

/// State code written for OFF (5 symbols)
pub const STATE_OFF_CODE: &str = "01000";
