//! Loopback example: encode a command, stretch it to receiver rate, decode it

use ookpulse_core::{
    constants::MIN_LOOPBACK_STRETCH,
    decode_packet,
    encoder::TransmissionBuilder,
    scanner::decode_samples,
    Command, Sample,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("ookpulse Loopback Example\n");

    let cmd = Command::parse("00101", "B", "on")?;
    println!("Command: {}", cmd);
    println!("Packet:  {}\n", ookpulse_core::encode_command(&cmd));

    // Two blocks: the first is closed by the second one's leading edge
    let mut samples = TransmissionBuilder::new(cmd)
        .repeat(1)
        .stretch(MIN_LOOPBACK_STRETCH)
        .build_samples();
    println!("Samples at receiver rate: {}", samples.len());

    // Closing edge for the last block
    samples.extend([Sample::High; 5]);

    for (i, packet) in decode_samples(samples).enumerate() {
        let decoded = decode_packet(&packet)?;
        println!("Packet {}: {} -> {}", i + 1, packet, decoded);
    }

    Ok(())
}
