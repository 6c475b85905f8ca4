//! # Command Registry
//!
//! The static table of every command the link understands: its name, its wire opcode and
//! the ordered kinds of the arguments it carries. The table is the single source of truth
//! for both directions of the codec and is never mutated.

use crate::error::{Error, Result};

/// The datatype of one argument slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum ArgKind {
    None = 0,
    Int8 = 1,
    UInt8 = 2,
    UInt16 = 3,
    Float32 = 4,
}

impl ArgKind {
    pub const fn bit_width(self) -> u32 {
        return match self {
            ArgKind::None => 0,
            ArgKind::Int8 | ArgKind::UInt8 => 8,
            ArgKind::UInt16 => 16,
            ArgKind::Float32 => 32,
        };
    }

    pub const fn byte_width(self) -> usize {
        return (self.bit_width() / 8) as usize;
    }
}

/// A typed argument value.
///
/// Values travel as their raw big-endian bit pattern: `Int8` as its two's complement byte,
/// `Float32` as its IEEE-754 bits, so a round trip reproduces the exact value (NaN payloads included).
///
/// # Example
/// ```
/// use radiocmd::command::{Arg, ArgKind};
///
/// let arg = Arg::Int8(-1);
/// assert_eq!(arg.kind(), ArgKind::Int8);
/// assert_eq!(arg.to_bits(), 0xFF);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Arg {
    Int8(i8),
    UInt8(u8),
    UInt16(u16),
    Float32(f32),
}

impl Arg {
    pub const fn kind(&self) -> ArgKind {
        return match self {
            Arg::Int8(_) => ArgKind::Int8,
            Arg::UInt8(_) => ArgKind::UInt8,
            Arg::UInt16(_) => ArgKind::UInt16,
            Arg::Float32(_) => ArgKind::Float32,
        };
    }

    /// The raw bits of the value, right-aligned in a `u64`.
    pub fn to_bits(&self) -> u64 {
        return match *self {
            Arg::Int8(value) => value as u8 as u64,
            Arg::UInt8(value) => value as u64,
            Arg::UInt16(value) => value as u64,
            Arg::Float32(value) => value.to_bits() as u64,
        };
    }

    /// Rebuilds a value of `kind` from its right-aligned raw bits. Returns `None` for `ArgKind::None`.
    pub fn from_bits(kind: ArgKind, bits: u64) -> Option<Arg> {
        return match kind {
            ArgKind::None => None,
            ArgKind::Int8 => Some(Arg::Int8(bits as u8 as i8)),
            ArgKind::UInt8 => Some(Arg::UInt8(bits as u8)),
            ArgKind::UInt16 => Some(Arg::UInt16(bits as u16)),
            ArgKind::Float32 => Some(Arg::Float32(f32::from_bits(bits as u32))),
        };
    }

    /// Bitwise equality, so two `Float32` NaNs with the same payload compare equal.
    pub fn same_bits(&self, other: &Arg) -> bool {
        return self.kind() == other.kind() && self.to_bits() == other.to_bits();
    }
}

/// One registry entry.
///
/// # Fields
/// - `name`: The symbolic command name, matched exactly and case-sensitively
/// - `opcode`: The 8-bit identifier carried in the header
/// - `signature`: The kinds of the argument slots, in wire order. Empty for commands without arguments
#[derive(Debug, PartialEq, Eq)]
pub struct CommandSpec {
    pub name: &'static str,
    pub opcode: u8,
    pub signature: &'static [ArgKind],
}

impl CommandSpec {
    pub const fn new(name: &'static str, opcode: u8, signature: &'static [ArgKind]) -> Self {
        return CommandSpec {
            name,
            opcode,
            signature,
        };
    }

    pub const fn max_args(&self) -> usize {
        return self.signature.len();
    }

    /// The kind of argument slot `index`, `ArgKind::None` past the end of the signature.
    pub fn argument_kind(&self, index: usize) -> ArgKind {
        return self.signature.get(index).copied().unwrap_or(ArgKind::None);
    }

    /// Bit width of the first argument slot; for every command but `TAP` this is the width of all of them.
    pub fn bit_width(&self) -> u32 {
        return self.argument_kind(0).bit_width();
    }

    /// Payload bytes used by the first `count` arguments.
    pub fn payload_len(&self, count: usize) -> usize {
        return self
            .signature
            .iter()
            .take(count)
            .map(|kind| kind.byte_width())
            .sum();
    }

    /// Header nibble count of a fully populated argument list.
    pub fn nibble_count(&self) -> u8 {
        return (self.payload_len(self.max_args()) * 2) as u8;
    }

    pub fn is_unknown(&self) -> bool {
        return self.opcode == UNKNOWN.opcode;
    }
}

/// Returned by [`Registry::by_opcode`] when the opcode is not registered.
pub static UNKNOWN: CommandSpec = CommandSpec::new("UNKNOWN", 0x00, &[]);

use ArgKind::{Float32, Int8, UInt16, UInt8};

const NO_ARGS: &[ArgKind] = &[];

/// The protocol's command table, ordered by opcode.
pub static COMMANDS: [CommandSpec; 23] = [
    CommandSpec::new("ACK", 0x01, NO_ARGS),
    CommandSpec::new("NACK", 0x02, NO_ARGS),
    CommandSpec::new("STATUS", 0x03, &[UInt8]),
    CommandSpec::new("START", 0x04, NO_ARGS),
    CommandSpec::new("STOP", 0x05, NO_ARGS),
    CommandSpec::new("APITCH", 0x06, &[Int8]),
    CommandSpec::new("AYAW", 0x07, &[Int8]),
    CommandSpec::new("AROLL", 0x08, &[Int8]),
    CommandSpec::new("ATHROTTLE", 0x09, &[Int8]),
    CommandSpec::new("TSPEED", 0x0A, &[Float32, Float32]),
    CommandSpec::new("TAP", 0x0B, &[UInt16, Float32]),
    CommandSpec::new("TRPM", 0x0C, &[UInt16, UInt16, UInt16, UInt16]),
    CommandSpec::new("TCOM", 0x0D, &[UInt16, UInt16, UInt16, UInt16]),
    CommandSpec::new("TERROR", 0x0E, &[UInt16]),
    CommandSpec::new("TPOWER", 0x0F, &[UInt16, UInt16]),
    CommandSpec::new("TPITCH", 0x10, &[Float32]),
    CommandSpec::new("TROLL", 0x11, &[Float32]),
    CommandSpec::new("TYAW", 0x12, &[Float32]),
    // One float, so 8 nibbles. Some firmware revisions advertised 4.
    CommandSpec::new("TSOC", 0x13, &[Float32]),
    CommandSpec::new("TEMF12", 0x14, &[Float32, Float32]),
    CommandSpec::new("TEMF34", 0x15, &[Float32, Float32]),
    CommandSpec::new("TIMOTOR12", 0x16, &[Float32, Float32]),
    CommandSpec::new("TIMOTOR34", 0x17, &[Float32, Float32]),
];

/// The registry every node on the link shares.
pub static STANDARD: Registry = Registry::new(&COMMANDS);

/// An immutable lookup table over a set of commands.
///
/// # Example
/// ```
/// use radiocmd::command::{ArgKind, Registry};
///
/// let registry = Registry::standard();
/// let status = registry.by_name("STATUS").unwrap();
/// assert_eq!(status.opcode, 0x03);
/// assert_eq!(status.argument_kind(0), ArgKind::UInt8);
/// assert!(registry.by_opcode(0xEE).is_unknown());
/// ```
#[derive(Debug)]
pub struct Registry {
    commands: &'static [CommandSpec],
}

impl Registry {
    pub const fn new(commands: &'static [CommandSpec]) -> Self {
        return Registry { commands };
    }

    pub fn standard() -> &'static Registry {
        return &STANDARD;
    }

    pub fn by_name(&self, name: &str) -> Result<&'static CommandSpec> {
        return self
            .commands
            .iter()
            .find(|command| command.name == name)
            .ok_or_else(|| Error::UnknownCommand(name.to_string()));
    }

    /// Never fails: unregistered opcodes resolve to [`UNKNOWN`].
    pub fn by_opcode(&self, opcode: u8) -> &'static CommandSpec {
        return self
            .commands
            .iter()
            .find(|command| command.opcode == opcode)
            .unwrap_or(&UNKNOWN);
    }

    /// True when `command` is exactly the entry this registry holds for its opcode.
    pub fn contains(&self, command: &CommandSpec) -> bool {
        let entry = self.by_opcode(command.opcode);
        return !entry.is_unknown() && entry == command;
    }

    pub fn commands(&self) -> &'static [CommandSpec] {
        return self.commands;
    }
}
