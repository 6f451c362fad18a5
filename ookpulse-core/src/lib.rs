//! # ookpulse Core
//!
//! Pulse-timing codec for 433 MHz OOK remote power sockets.
//!
//! ## Modules
//!
//! - `constants`: Protocol thresholds, layout and code tables
//! - `types`: Core types (Sample, Symbol, Packet, Command)
//! - `packet`: Command <-> 25-symbol packet mapping
//! - `encoder`: Symbol-to-sample expansion for transmission
//! - `decoder`: Streaming sample-to-symbol decoder
//! - `scanner`: Sample-source adapters and capture scanning

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

pub mod constants;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod packet;
pub mod scanner;
pub mod types;

// Re-export commonly used types
pub use decoder::{DecoderConfig, SymbolDecoder};
pub use error::CodecError;
pub use packet::{decode_packet, encode_command, inspect_packet, DecodeOptions, PacketReport};
pub use types::{Address, Command, Identifier, Packet, Sample, State, Symbol};

/// Result type alias for codec operations
pub type Result<T> = core::result::Result<T, CodecError>;
