//! Core types for socket commands, symbols and samples

use crate::constants::{ADDRESS_BITS, IDENTIFIER_CODES};
use crate::error::CodecError;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// One binary observation of the channel envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Sample {
    /// No carrier
    Low = 0,
    /// Carrier present
    High = 1,
}

impl Sample {
    /// Interpret a raw flowgraph byte; anything but 0 or 1 is not a sample
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Sample::Low),
            1 => Some(Sample::High),
            _ => None,
        }
    }

    /// Raw byte written to the flowgraph
    pub const fn as_byte(self) -> u8 {
        self as u8
    }
}

/// One logical unit recovered from (or expanded into) a pulse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symbol {
    /// Logical zero (short pulse)
    Zero,
    /// Logical one (long pulse)
    One,
    /// Pulse too short for either profile
    Unknown,
}

impl Symbol {
    /// Character used in bit strings: `0`, `1` or `u`
    pub const fn as_char(self) -> char {
        match self {
            Symbol::Zero => '0',
            Symbol::One => '1',
            Symbol::Unknown => 'u',
        }
    }

    /// Parse a bit-string character
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            '0' => Some(Symbol::Zero),
            '1' => Some(Symbol::One),
            'u' | 'U' => Some(Symbol::Unknown),
            _ => None,
        }
    }
}

/// Ordered symbols making up one transmission
///
/// Packets coming out of the decoder can have any length; only packets of
/// exactly [`PACKET_SYMBOLS`](crate::constants::PACKET_SYMBOLS) symbols decode
/// into a [`Command`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Packet {
    symbols: Vec<Symbol>,
}

impl Packet {
    /// Create a packet from decoded symbols
    pub fn new(symbols: Vec<Symbol>) -> Self {
        Self { symbols }
    }

    /// Symbols in transmission order
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Number of symbols
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// True when no symbol was decoded
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Number of symbols that matched neither timing profile
    pub fn unknown_count(&self) -> usize {
        self.symbols.iter().filter(|s| **s == Symbol::Unknown).count()
    }

    /// Strict bit view of the packet
    ///
    /// Fails on the first [`Symbol::Unknown`].
    pub fn bits(&self) -> Result<Vec<bool>, CodecError> {
        self.symbols
            .iter()
            .enumerate()
            .map(|(index, symbol)| match symbol {
                Symbol::One => Ok(true),
                Symbol::Zero => Ok(false),
                Symbol::Unknown => Err(CodecError::UnknownSymbol { index }),
            })
            .collect()
    }

    /// Consume the packet, returning its symbols
    pub fn into_symbols(self) -> Vec<Symbol> {
        self.symbols
    }
}

impl From<Vec<Symbol>> for Packet {
    fn from(symbols: Vec<Symbol>) -> Self {
        Self::new(symbols)
    }
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for symbol in &self.symbols {
            write!(f, "{}", symbol.as_char())?;
        }
        Ok(())
    }
}

impl FromStr for Packet {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.chars()
            .map(|c| {
                Symbol::from_char(c)
                    .ok_or_else(|| CodecError::Validation(format!("invalid symbol character {c:?}")))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Packet::new)
    }
}

/// Five-bit socket group address (DIP switches on the socket)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address([bool; ADDRESS_BITS]);

impl Address {
    /// Create an address from its bits, most significant first
    pub const fn from_bits(bits: [bool; ADDRESS_BITS]) -> Self {
        Self(bits)
    }

    /// Address whose bit string is the binary form of `index` (0..32)
    pub fn from_index(index: u8) -> Self {
        let mut bits = [false; ADDRESS_BITS];
        for (i, bit) in bits.iter_mut().enumerate() {
            *bit = (index >> (ADDRESS_BITS - 1 - i)) & 1 == 1;
        }
        Self(bits)
    }

    /// Bits, most significant first
    pub const fn bits(&self) -> [bool; ADDRESS_BITS] {
        self.0
    }

    /// All 32 addresses in ascending order
    pub fn all() -> impl Iterator<Item = Address> {
        (0..1u8 << ADDRESS_BITS).map(Address::from_index)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.0 {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl FromStr for Address {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chars: Vec<char> = s.trim().chars().collect();
        if chars.len() != ADDRESS_BITS {
            return Err(CodecError::Validation(format!(
                "address must be {ADDRESS_BITS} bits, got {s:?}"
            )));
        }

        let mut bits = [false; ADDRESS_BITS];
        for (bit, c) in bits.iter_mut().zip(chars) {
            *bit = match c {
                '1' => true,
                '0' => false,
                _ => {
                    return Err(CodecError::Validation(format!(
                        "address may only contain 0 and 1, got {s:?}"
                    )))
                }
            };
        }
        Ok(Self(bits))
    }
}

impl TryFrom<String> for Address {
    type Error = CodecError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.to_string()
    }
}

/// Socket channel letter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Identifier {
    /// Channel A
    A,
    /// Channel B
    B,
    /// Channel C
    C,
    /// Channel D
    D,
    /// Channel E
    E,
}

impl Identifier {
    /// Every channel, in table order
    pub const ALL: [Identifier; 5] = [
        Identifier::A,
        Identifier::B,
        Identifier::C,
        Identifier::D,
        Identifier::E,
    ];

    /// Upper-case channel letter
    pub const fn letter(self) -> char {
        IDENTIFIER_CODES[self as usize].0
    }

    /// Ten-symbol code as a bit string
    pub const fn code(self) -> &'static str {
        IDENTIFIER_CODES[self as usize].1
    }

    /// Look up a channel by letter, ignoring case
    pub fn from_letter(c: char) -> Option<Self> {
        let upper = c.to_ascii_uppercase();
        Self::ALL.into_iter().find(|id| id.letter() == upper)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

impl FromStr for Identifier {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_letter(c),
            _ => None,
        }
        .ok_or_else(|| CodecError::Validation(format!("identifier must be one of A-E, got {s:?}")))
    }
}

/// Requested power state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum State {
    /// Power on
    On,
    /// Power off
    Off,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            State::On => "ON",
            State::Off => "OFF",
        })
    }
}

impl FromStr for State {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("on") {
            Ok(State::On)
        } else if s.eq_ignore_ascii_case("off") {
            Ok(State::Off)
        } else {
            Err(CodecError::Validation(format!("state must be ON or OFF, got {s:?}")))
        }
    }
}

/// One logical socket command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Command {
    /// Socket group address
    pub address: Address,

    /// Channel within the group
    pub identifier: Identifier,

    /// Requested power state
    pub state: State,
}

impl Command {
    /// Create a command from typed fields
    pub const fn new(address: Address, identifier: Identifier, state: State) -> Self {
        Self {
            address,
            identifier,
            state,
        }
    }

    /// Validate and build a command from user-supplied literals
    ///
    /// ```
    /// use ookpulse_core::types::{Command, Identifier, State};
    ///
    /// let cmd = Command::parse("00101", "b", "on").unwrap();
    /// assert_eq!(cmd.identifier, Identifier::B);
    /// assert_eq!(cmd.state, State::On);
    /// assert!(Command::parse("00101", "F", "on").is_err());
    /// ```
    pub fn parse(address: &str, identifier: &str, state: &str) -> Result<Self, CodecError> {
        Ok(Self {
            address: address.parse()?,
            identifier: identifier.parse()?,
            state: state.parse()?,
        })
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "addr={}, id={}, state={}",
            self.address, self.identifier, self.state
        )
    }
}

/// Field types that can be swept with the `ALL` wildcard
pub trait Wildcard: Sized + Copy {
    /// Every value, in transmission order
    fn every() -> Vec<Self>;
}

impl Wildcard for Address {
    fn every() -> Vec<Self> {
        Address::all().collect()
    }
}

impl Wildcard for Identifier {
    fn every() -> Vec<Self> {
        Identifier::ALL.to_vec()
    }
}

/// A single field value or the `ALL` wildcard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector<T> {
    /// Exactly this value
    One(T),
    /// Every possible value
    All,
}

impl<T: Wildcard> Selector<T> {
    /// Values selected, in transmission order
    pub fn values(&self) -> Vec<T> {
        match self {
            Selector::One(value) => alloc::vec![*value],
            Selector::All => T::every(),
        }
    }
}

impl<T> FromStr for Selector<T>
where
    T: FromStr<Err = CodecError>,
{
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(Selector::All)
        } else {
            s.parse().map(Selector::One)
        }
    }
}

/// Expand address and identifier selectors into commands
///
/// Addresses form the outer loop, identifiers the inner one.
pub fn expand_commands(
    address: &Selector<Address>,
    identifier: &Selector<Identifier>,
    state: State,
) -> Vec<Command> {
    let identifiers = identifier.values();
    address
        .values()
        .into_iter()
        .flat_map(|addr| {
            identifiers
                .iter()
                .map(move |id| Command::new(addr, *id, state))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_bytes() {
        assert_eq!(Sample::from_byte(0), Some(Sample::Low));
        assert_eq!(Sample::from_byte(1), Some(Sample::High));
        assert_eq!(Sample::from_byte(2), None);
        assert_eq!(Sample::from_byte(0xFF), None);
        assert_eq!(Sample::High.as_byte(), 1);
    }

    #[test]
    fn test_address_parse_and_display() {
        let addr: Address = "00101".parse().unwrap();
        assert_eq!(addr.bits(), [false, false, true, false, true]);
        assert_eq!(addr.to_string(), "00101");
        assert_eq!(addr, Address::from_index(5));

        assert!("0010".parse::<Address>().is_err());
        assert!("001010".parse::<Address>().is_err());
        assert!("00201".parse::<Address>().is_err());
    }

    #[test]
    fn test_address_all_is_ascending() {
        let all: Vec<_> = Address::all().collect();
        assert_eq!(all.len(), 32);
        assert_eq!(all[0].to_string(), "00000");
        assert_eq!(all[1].to_string(), "00001");
        assert_eq!(all[31].to_string(), "11111");
    }

    #[test]
    fn test_identifier_case_insensitive() {
        assert_eq!("c".parse::<Identifier>().unwrap(), Identifier::C);
        assert_eq!("E".parse::<Identifier>().unwrap(), Identifier::E);
        assert!("F".parse::<Identifier>().is_err());
        assert!("AB".parse::<Identifier>().is_err());
        assert!("".parse::<Identifier>().is_err());
    }

    #[test]
    fn test_state_parse() {
        assert_eq!("On".parse::<State>().unwrap(), State::On);
        assert_eq!("OFF".parse::<State>().unwrap(), State::Off);
        assert!(matches!(
            "toggle".parse::<State>(),
            Err(CodecError::Validation(_))
        ));
    }

    #[test]
    fn test_packet_bits_rejects_unknown() {
        let packet: Packet = "01u1".parse().unwrap();
        assert_eq!(packet.unknown_count(), 1);
        assert_eq!(
            packet.bits(),
            Err(CodecError::UnknownSymbol { index: 2 })
        );

        let clean: Packet = "0110".parse().unwrap();
        assert_eq!(clean.bits().unwrap(), vec![false, true, true, false]);
        assert_eq!(clean.to_string(), "0110");
    }

    #[test]
    fn test_expand_commands_order() {
        let cmds = expand_commands(&Selector::All, &Selector::All, State::On);
        assert_eq!(cmds.len(), 32 * 5);
        assert_eq!(cmds[0].address.to_string(), "00000");
        assert_eq!(cmds[0].identifier, Identifier::A);
        assert_eq!(cmds[4].identifier, Identifier::E);
        assert_eq!(cmds[5].address.to_string(), "00001");

        let single = expand_commands(
            &"10101".parse().unwrap(),
            &"all".parse().unwrap(),
            State::Off,
        );
        assert_eq!(single.len(), 5);
        assert!(single.iter().all(|c| c.address.to_string() == "10101"));
    }

    #[test]
    fn test_command_display() {
        let cmd = Command::parse("00101", "b", "ON").unwrap();
        assert_eq!(cmd.to_string(), "addr=00101, id=B, state=ON");
    }
}
