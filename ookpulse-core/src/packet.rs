//! Packing and unpacking of socket commands into 25-symbol packets
//!
//! Packet layout (symbol indices):
//! - 0..10: address, one symbol pair per bit (`00` = 1, `01` = 0)
//! - 10..20: identifier code, exact match against the code table
//! - 20..25: state code; only 20..24 is read back

use crate::constants::{
    ADDRESS_BITS, ADDRESS_RANGE, IDENTIFIER_RANGE, PACKET_SYMBOLS, STATE_OFF_CODE, STATE_ON_CODE,
    STATE_RANGE, STATE_SYMBOLS,
};
use crate::error::CodecError;
use crate::types::{Address, Command, Identifier, Packet, State, Symbol};
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

/// Relaxations applied when turning a packet into a report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Surface packets of the wrong length as raw symbols instead of failing
    pub ignore_length: bool,

    /// Render undecodable fields with error markers instead of failing
    pub ignore_errors: bool,
}

impl DecodeOptions {
    /// No relaxation: only clean commands are reported
    pub const STRICT: Self = Self {
        ignore_length: false,
        ignore_errors: false,
    };

    /// Every relaxation enabled
    pub const PERMISSIVE: Self = Self {
        ignore_length: true,
        ignore_errors: true,
    };
}

/// Best-effort field-by-field decode of a 25-symbol packet
///
/// `None` marks a field (or address bit) that matched no code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartialCommand {
    /// Address bits, most significant first
    pub address: [Option<bool>; ADDRESS_BITS],

    /// Identifier, if the code matched the table
    pub identifier: Option<Identifier>,

    /// State, if the code matched ON or OFF
    pub state: Option<State>,
}

impl PartialCommand {
    /// Promote to a command if every field decoded
    ///
    /// Returns the first field error otherwise, in packet order. `packet`
    /// supplies the raw symbols for the error message and must be 25 long.
    pub fn to_command(&self, packet: &Packet) -> Result<Command, CodecError> {
        check_length(packet)?;

        let mut bits = [false; ADDRESS_BITS];
        for (position, (bit, decoded)) in bits.iter_mut().zip(self.address).enumerate() {
            *bit = decoded.ok_or(CodecError::Address { position })?;
        }

        let symbols = packet.symbols();
        let identifier = self
            .identifier
            .ok_or_else(|| CodecError::Identifier(render(&symbols[IDENTIFIER_RANGE])))?;
        let state = self
            .state
            .ok_or_else(|| CodecError::State(render(&symbols[STATE_RANGE])))?;

        Ok(Command::new(Address::from_bits(bits), identifier, state))
    }

    /// True when every field decoded
    pub fn is_complete(&self) -> bool {
        self.address.iter().all(Option::is_some) && self.identifier.is_some() && self.state.is_some()
    }
}

impl fmt::Display for PartialCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("  Address: ")?;
        for bit in self.address {
            f.write_str(match bit {
                Some(true) => "1",
                Some(false) => "0",
                None => "e",
            })?;
        }
        f.write_str("\n  Identifier: ")?;
        match self.identifier {
            Some(id) => write!(f, "{id}")?,
            None => f.write_str("Error")?,
        }
        f.write_str("\n  State: ")?;
        match self.state {
            Some(state) => write!(f, "{state}"),
            None => f.write_str("Error"),
        }
    }
}

/// Outcome of inspecting one decoded packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PacketReport {
    /// Every field decoded cleanly
    Decoded(Command),

    /// Correct length, but at least one field is unreadable
    Partial(PartialCommand),

    /// Wrong length; the raw symbols are all there is
    Raw(Packet),
}

impl PacketReport {
    /// The command, if the packet decoded cleanly
    pub fn command(&self) -> Option<&Command> {
        match self {
            PacketReport::Decoded(cmd) => Some(cmd),
            _ => None,
        }
    }
}

impl fmt::Display for PacketReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PacketReport::Decoded(cmd) => write!(
                f,
                "  Address: {}\n  Identifier: {}\n  State: {}",
                cmd.address, cmd.identifier, cmd.state
            ),
            PacketReport::Partial(partial) => write!(f, "{partial}"),
            PacketReport::Raw(packet) => {
                write!(f, "  Length: {}\n  Data: {}", packet.len(), packet)
            }
        }
    }
}

/// Pack a command into its 25-symbol packet
pub fn encode_command(cmd: &Command) -> Packet {
    let mut symbols = Vec::with_capacity(PACKET_SYMBOLS);

    for bit in cmd.address.bits() {
        symbols.push(Symbol::Zero);
        symbols.push(if bit { Symbol::Zero } else { Symbol::One });
    }

    symbols.extend(code_symbols(cmd.identifier.code()));

    let state_code = match cmd.state {
        State::On => STATE_ON_CODE,
        State::Off => STATE_OFF_CODE,
    };
    debug_assert_eq!(state_code.len(), STATE_SYMBOLS);
    symbols.extend(code_symbols(state_code));

    Packet::new(symbols)
}

/// Decode a packet, failing on the first problem
pub fn decode_packet(packet: &Packet) -> Result<Command, CodecError> {
    decode_fields(packet)?.to_command(packet)
}

/// Decode a packet, relaxing length and field checks as requested
///
/// In strict mode this behaves like [`decode_packet`] wrapped in
/// [`PacketReport::Decoded`].
pub fn inspect_packet(packet: &Packet, options: DecodeOptions) -> Result<PacketReport, CodecError> {
    if let Err(e) = check_length(packet) {
        return if options.ignore_length {
            Ok(PacketReport::Raw(packet.clone()))
        } else {
            Err(e)
        };
    }

    let partial = decode_fields(packet)?;
    match partial.to_command(packet) {
        Ok(cmd) => Ok(PacketReport::Decoded(cmd)),
        Err(_) if options.ignore_errors => Ok(PacketReport::Partial(partial)),
        Err(e) => Err(e),
    }
}

/// Decode each field independently
///
/// Fails only on a packet that is not 25 symbols long.
pub fn decode_fields(packet: &Packet) -> Result<PartialCommand, CodecError> {
    check_length(packet)?;
    let symbols = packet.symbols();

    let mut address = [None; ADDRESS_BITS];
    for (slot, pair) in address.iter_mut().zip(symbols[ADDRESS_RANGE].chunks_exact(2)) {
        *slot = match pair {
            [Symbol::Zero, Symbol::Zero] => Some(true),
            [Symbol::Zero, Symbol::One] => Some(false),
            _ => None,
        };
    }

    let identifier_symbols = &symbols[IDENTIFIER_RANGE];
    let identifier = Identifier::ALL
        .into_iter()
        .find(|id| matches_code(identifier_symbols, id.code()));

    let state_symbols = &symbols[STATE_RANGE];
    let state = if matches_code(state_symbols, &STATE_OFF_CODE[..STATE_RANGE.len()]) {
        Some(State::Off)
    } else if matches_code(state_symbols, &STATE_ON_CODE[..STATE_RANGE.len()]) {
        Some(State::On)
    } else {
        None
    };

    Ok(PartialCommand {
        address,
        identifier,
        state,
    })
}

fn check_length(packet: &Packet) -> Result<(), CodecError> {
    if packet.len() != PACKET_SYMBOLS {
        return Err(CodecError::Length {
            expected: PACKET_SYMBOLS,
            actual: packet.len(),
        });
    }
    Ok(())
}

fn code_symbols(code: &'static str) -> impl Iterator<Item = Symbol> {
    code.chars()
        .map(|c| if c == '1' { Symbol::One } else { Symbol::Zero })
}

fn matches_code(symbols: &[Symbol], code: &str) -> bool {
    symbols.len() == code.len() && symbols.iter().zip(code.chars()).all(|(s, c)| s.as_char() == c)
}

fn render(symbols: &[Symbol]) -> String {
    symbols.iter().map(|s| s.as_char()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    fn packet(bits: &str) -> Packet {
        bits.parse().unwrap()
    }

    #[test]
    fn test_encode_known_command() {
        let cmd = Command::parse("00101", "B", "ON").unwrap();
        let encoded = encode_command(&cmd);

        assert_eq!(encoded.len(), PACKET_SYMBOLS);
        assert_eq!(encoded.to_string(), "0101000100010001010100010");
    }

    #[test]
    fn test_encode_off_state() {
        let cmd = Command::parse("11111", "A", "off").unwrap();
        assert_eq!(encode_command(&cmd).to_string(), "0000000000000101010101000");
    }

    #[test]
    fn test_decode_known_packet() {
        let cmd = decode_packet(&packet("0101000100010001010100010")).unwrap();
        assert_eq!(cmd, Command::parse("00101", "B", "ON").unwrap());
    }

    #[test]
    fn test_decode_round_trip_every_identifier() {
        for id in Identifier::ALL {
            for state in [State::On, State::Off] {
                let cmd = Command::new(Address::from_index(19), id, state);
                assert_eq!(decode_packet(&encode_command(&cmd)).unwrap(), cmd);
            }
        }
    }

    #[test]
    fn test_length_error() {
        let short = packet("010100010001000101010001");
        assert_eq!(
            decode_packet(&short),
            Err(CodecError::Length {
                expected: 25,
                actual: 24
            })
        );

        let report = inspect_packet(
            &short,
            DecodeOptions {
                ignore_length: true,
                ignore_errors: false,
            },
        )
        .unwrap();
        assert_eq!(report, PacketReport::Raw(short.clone()));
        assert_eq!(
            report.to_string(),
            "  Length: 24\n  Data: 010100010001000101010001"
        );
    }

    #[test]
    fn test_address_error_position() {
        // Pair 2 is "10", which is not an address code
        let bad = packet("0101100100010001010100010");
        assert_eq!(decode_packet(&bad), Err(CodecError::Address { position: 2 }));

        let report = inspect_packet(&bad, DecodeOptions::PERMISSIVE).unwrap();
        assert_eq!(
            report.to_string(),
            "  Address: 00e01\n  Identifier: B\n  State: ON"
        );
    }

    #[test]
    fn test_identifier_error() {
        let bad = packet("0101000101010101010100010");
        assert_eq!(
            decode_packet(&bad),
            Err(CodecError::Identifier("0101010101".into()))
        );
    }

    #[test]
    fn test_state_error() {
        let bad = packet("0101000100010001010111110");
        assert_eq!(decode_packet(&bad), Err(CodecError::State("1111".into())));

        match inspect_packet(&bad, DecodeOptions::PERMISSIVE).unwrap() {
            PacketReport::Partial(partial) => {
                assert!(!partial.is_complete());
                assert_eq!(partial.identifier, Some(Identifier::B));
                assert_eq!(partial.state, None);
            }
            other => panic!("expected partial report, got {other:?}"),
        }
    }

    #[test]
    fn test_last_state_symbol_is_ignored() {
        let mut symbols = encode_command(&Command::parse("01100", "D", "OFF").unwrap()).into_symbols();
        symbols[24] = Symbol::One;
        let cmd = decode_packet(&Packet::new(symbols.clone())).unwrap();
        assert_eq!(cmd.state, State::Off);

        symbols[24] = Symbol::Unknown;
        assert_eq!(decode_packet(&Packet::new(symbols)).unwrap().state, State::Off);
    }

    #[test]
    fn test_all_unknown_packet() {
        let unknown = Packet::new(alloc::vec![Symbol::Unknown; PACKET_SYMBOLS]);

        assert_eq!(
            decode_packet(&unknown),
            Err(CodecError::Address { position: 0 })
        );
        assert!(inspect_packet(&unknown, DecodeOptions::STRICT).is_err());

        let report = inspect_packet(&unknown, DecodeOptions::PERMISSIVE).unwrap();
        assert_eq!(
            report.to_string(),
            "  Address: eeeee\n  Identifier: Error\n  State: Error"
        );
    }

    #[test]
    fn test_field_decode_rejects_short_packet() {
        let short = Packet::new(alloc::vec![Symbol::Zero; 3]);
        assert_eq!(
            decode_fields(&short),
            Err(CodecError::Length {
                expected: 25,
                actual: 3
            })
        );

        let partial = decode_fields(&encode_command(&Command::parse("00101", "B", "on").unwrap())).unwrap();
        assert!(partial.is_complete());
        assert!(matches!(
            partial.to_command(&short),
            Err(CodecError::Length { actual: 3, .. })
        ));
        assert!(decode_fields(&Packet::new(alloc::vec::Vec::new())).is_err());
    }

    #[test]
    fn test_ignore_errors_alone_keeps_length_strict() {
        let short = packet("0101");
        let options = DecodeOptions {
            ignore_length: false,
            ignore_errors: true,
        };
        assert!(matches!(
            inspect_packet(&short, options),
            Err(CodecError::Length { .. })
        ));
    }
}
