//! Error types for codec operations

use alloc::string::String;

/// Errors that can occur while packing, unpacking or validating socket commands
#[cfg_attr(feature = "std", derive(thiserror::Error))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Packet does not hold the expected number of symbols
    #[cfg_attr(feature = "std", error("Packet length mismatch: expected {expected} symbols, got {actual}"))]
    Length {
        /// The number of symbols expected.
        expected: usize,
        /// The number of symbols actually found.
        actual: usize,
    },

    /// An address symbol pair matched neither bit code
    #[cfg_attr(feature = "std", error("Invalid address pair at bit {position}"))]
    Address {
        /// Index of the offending address bit (0..5).
        position: usize,
    },

    /// Identifier symbols matched no entry of the code table
    #[cfg_attr(feature = "std", error("Unknown identifier code: {0}"))]
    Identifier(String),

    /// State symbols matched neither the ON nor the OFF code
    #[cfg_attr(feature = "std", error("Unknown state code: {0}"))]
    State(String),

    /// A symbol run matched neither timing profile
    #[cfg_attr(feature = "std", error("Unknown symbol at index {index}"))]
    UnknownSymbol {
        /// Index of the symbol inside its packet.
        index: usize,
    },

    /// A command field literal was rejected
    #[cfg_attr(feature = "std", error("Validation error: {0}"))]
    Validation(String),

    /// Decoder thresholds are inconsistent
    #[cfg_attr(feature = "std", error("Invalid decoder configuration: {0}"))]
    InvalidConfig(String),
}
