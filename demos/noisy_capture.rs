//! Example decoding a capture with dropouts, stray pulses and garbage bytes

use ookpulse_core::{
    encoder::TransmissionBuilder,
    scanner::scan_capture,
    types::{expand_commands, Selector},
    Address, DecodeOptions, State, SymbolDecoder,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("ookpulse Noisy Capture Example\n");

    // Step 1: Every identifier of one socket group, switched off
    let address: Address = "01101".parse()?;
    let commands = expand_commands(&Selector::One(address), &Selector::All, State::Off);
    println!("Step 1: Encoding {} commands...", commands.len());

    let mut capture = Vec::new();
    for cmd in &commands {
        capture.extend(TransmissionBuilder::new(*cmd).repeat(1).stretch(15).build());
    }
    println!("Clean capture: {} bytes\n", capture.len());

    // Step 2: Damage it
    println!("Step 2: Simulating interference...");
    for i in (0..capture.len()).step_by(211) {
        capture[i] = 0x7F;
    }
    println!("Replaced every 211th byte with garbage");

    let stray_at = capture.len() / 3;
    capture.splice(stray_at..stray_at, vec![1u8; 3]);
    println!("Inserted a 3-sample stray pulse at {}", stray_at);

    let dropout_at = capture.len() / 2;
    capture[dropout_at..dropout_at + 2].fill(0);
    println!("Zeroed two samples at {}\n", dropout_at);

    capture.extend([1u8; 5]);

    // Step 3: Scan
    println!("Step 3: Scanning...");
    let (reports, stats) = scan_capture(&capture, SymbolDecoder::new(), DecodeOptions::PERMISSIVE);

    println!("Scan Results:");
    println!("  Bytes scanned:     {}", stats.bytes_scanned);
    println!("  Ignored bytes:     {}", stats.decoder.ignored);
    println!("  Packets:           {}", stats.decoder.packets);
    println!("  Commands:          {}", stats.commands);
    println!("  With errors:       {}", stats.partial + stats.raw);
    println!("  Decode rate:       {:.1}%\n", stats.decode_rate());

    for located in &reports {
        println!("[+] Packet closed at sample {}:", located.sample_offset);
        println!("{}", located.report);
    }

    Ok(())
}
