//! Fuzz entry points for ookpulse-core
//!
//! Each function must return without panicking for any input. They are
//! meant to be driven from cargo-fuzz targets or an AFL harness.

use ookpulse_core::{
    inspect_packet, scanner::scan_capture, DecodeOptions, Packet, Symbol, SymbolDecoder,
};

/// Run a raw capture through the scanner in permissive mode
pub fn fuzz_decode(data: &[u8]) {
    let _ = scan_capture(data, SymbolDecoder::new(), DecodeOptions::PERMISSIVE);
}

/// Interpret every byte as a symbol and inspect the resulting packet
pub fn fuzz_inspect(data: &[u8]) {
    let symbols: Vec<Symbol> = data
        .iter()
        .map(|b| match b % 3 {
            0 => Symbol::Zero,
            1 => Symbol::One,
            _ => Symbol::Unknown,
        })
        .collect();
    let packet = Packet::new(symbols);

    let _ = inspect_packet(&packet, DecodeOptions::STRICT);
    let _ = inspect_packet(&packet, DecodeOptions::PERMISSIVE);
    let _ = packet.bits();
}

/// Parse arbitrary text as a packet string
pub fn fuzz_parse(data: &[u8]) {
    if let Ok(text) = core::str::from_utf8(data) {
        if let Ok(packet) = text.parse::<Packet>() {
            let _ = inspect_packet(&packet, DecodeOptions::PERMISSIVE);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fuzz_decode_empty() {
        fuzz_decode(&[]);
    }

    #[test]
    fn test_fuzz_decode_saturated() {
        fuzz_decode(&[0xFF; 1024]);
    }

    #[test]
    fn test_fuzz_decode_square_wave() {
        let data: Vec<u8> = (0..4096).map(|i| ((i / 7) % 2) as u8).collect();
        fuzz_decode(&data);
    }

    #[test]
    fn test_fuzz_inspect_lengths() {
        for len in [0, 1, 24, 25, 26, 100] {
            fuzz_inspect(&vec![2u8; len]);
        }
    }

    #[test]
    fn test_fuzz_parse() {
        fuzz_parse(b"0101000100010001010100010");
        fuzz_parse(b"01u0x");
        fuzz_parse(&[0xC3, 0x28]);
    }
}
