//! Integration tests for the complete encode → stretch → decode → unpack flow

use ookpulse_core::{
    constants::{MAX_LOOPBACK_STRETCH, MIN_LOOPBACK_STRETCH, PACKET_GAP_MIN},
    decode_packet,
    encoder::{encode_transmission, stretch, TransmissionBuilder},
    encode_command, inspect_packet,
    scanner::{decode_samples, scan_capture},
    Command, DecodeOptions, Packet, PacketReport, Sample, Symbol, SymbolDecoder,
};

fn closing_edge() -> Vec<Sample> {
    vec![Sample::High; 5]
}

#[test]
fn test_scenario_single_block_round_trip() {
    let cmd = Command::parse("00101", "B", "ON").unwrap();
    let block = TransmissionBuilder::new(cmd).repeat(0).build_samples();
    assert_eq!(block.len(), 124);

    let mut samples = stretch(&block, MIN_LOOPBACK_STRETCH);
    samples.extend(closing_edge());

    let packets: Vec<Packet> = decode_samples(samples).collect();
    assert_eq!(packets.len(), 1);

    let decoded = decode_packet(&packets[0]).unwrap();
    assert_eq!(decoded.address.to_string(), "00101");
    assert_eq!(decoded.identifier.to_string(), "B");
    assert_eq!(decoded.state.to_string(), "ON");
}

#[test]
fn test_scenario_lone_pulse_yields_no_packet() {
    let mut samples = vec![Sample::Low; 300];
    samples.extend(vec![Sample::High; 50]);
    samples.extend(vec![Sample::Low; 300]);

    let mut decoder = SymbolDecoder::new();
    let packets: Vec<_> = samples.iter().filter_map(|s| decoder.push(*s)).collect();

    assert!(packets.is_empty());
    assert_eq!(decoder.pending(), &[Symbol::One]);
}

#[test]
fn test_scenario_unknown_packet() {
    let packet = Packet::new(vec![Symbol::Unknown; 25]);

    assert!(decode_packet(&packet).is_err());

    let report = inspect_packet(&packet, DecodeOptions::PERMISSIVE).unwrap();
    assert!(matches!(report, PacketReport::Partial(_)));
    assert_eq!(
        report.to_string(),
        "  Address: eeeee\n  Identifier: Error\n  State: Error"
    );
}

#[test]
fn test_every_repetition_is_recovered() {
    let cmd = Command::parse("11000", "D", "off").unwrap();
    let mut data = TransmissionBuilder::new(cmd).repeat(3).stretch(17).build().to_vec();
    data.extend([1u8; 5]);

    let (reports, stats) = scan_capture(&data, SymbolDecoder::new(), DecodeOptions::STRICT);

    assert_eq!(reports.len(), 4);
    assert_eq!(stats.commands, 4);
    assert!(reports.iter().all(|r| r.report.command() == Some(&cmd)));
}

#[test]
fn test_stretch_range_limits() {
    let cmd = Command::parse("01110", "A", "on").unwrap();
    let packet = encode_command(&cmd);
    let chips = encode_transmission(&packet, 1);

    for factor in MIN_LOOPBACK_STRETCH..=MAX_LOOPBACK_STRETCH {
        let packets: Vec<_> = decode_samples(stretch(&chips, factor)).collect();
        assert_eq!(packets.len(), 1, "factor {factor}");
        assert_eq!(decode_packet(&packets[0]).unwrap(), cmd, "factor {factor}");
    }

    // One factor too small: repeated blocks run together
    let merged: Vec<_> = decode_samples(stretch(&chips, MIN_LOOPBACK_STRETCH - 1)).collect();
    assert!(merged.is_empty());

    // One factor too large: zero pulses read as ones
    let wide: Vec<_> = decode_samples(stretch(&chips, MAX_LOOPBACK_STRETCH + 1)).collect();
    assert_eq!(wide.len(), 1);
    assert!(decode_packet(&wide[0]).is_err());
}

#[test]
fn test_noise_between_transmissions_is_tolerated() {
    let first = Command::parse("00001", "A", "on").unwrap();
    let second = Command::parse("00001", "A", "off").unwrap();

    let mut samples = TransmissionBuilder::new(first)
        .repeat(0)
        .stretch(13)
        .build_samples();
    // Short HIGH glitches inside the inter-packet silence; together they stay
    // within the debounce, so they never open a run of their own
    for _ in 0..2 {
        samples.extend(vec![Sample::High; 2]);
        samples.extend(vec![Sample::Low; PACKET_GAP_MIN]);
    }
    samples.extend(
        TransmissionBuilder::new(second)
            .repeat(0)
            .stretch(13)
            .build_samples(),
    );
    samples.extend(closing_edge());

    let commands: Vec<Command> = decode_samples(samples)
        .filter_map(|p| decode_packet(&p).ok())
        .collect();
    assert_eq!(commands, vec![first, second]);
}

#[test]
fn test_malformed_packet_does_not_stop_stream() {
    let cmd = Command::parse("10101", "C", "on").unwrap();

    // A stray pulse closed off by silence, followed by a clean transmission
    let mut data = vec![1u8; 40];
    data.extend(vec![0u8; 400]);
    data.extend(TransmissionBuilder::new(cmd).repeat(0).stretch(13).build());
    data.extend([1u8; 5]);

    let (reports, stats) = scan_capture(&data, SymbolDecoder::new(), DecodeOptions::STRICT);
    assert_eq!(stats.rejected, 1);
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].report.command(), Some(&cmd));
}
