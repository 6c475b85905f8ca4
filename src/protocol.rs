//! # Header/Payload Codec
//!
//! Turns `(address, command, arguments)` into a 32-bit header and a short big-endian
//! payload, and back.
//!
//! ```text
//! ┌──────────────┬──────────┬──────────────┬──────────────────────────┐
//! │ Address (2B) │ Opcode   │ Nibble count │ Payload                  │
//! │ big-endian   │ (1B)     │ (1B)         │ (nibble count / 2 bytes) │
//! └──────────────┴──────────┴──────────────┴──────────────────────────┘
//! ```

use log::trace;

use crate::command::{Arg, CommandSpec, Registry};
use crate::error::{Error, Result};
use crate::utils::Bytes;

/// Length of the serialized header.
pub const HEADER_LEN: usize = 4;

/// Most arguments a single command can carry.
pub const MAX_ARGS: usize = 4;

/// Width of the payload accumulator.
pub const ACCUMULATOR_BITS: u32 = u64::BITS;

/// Largest payload the accumulator can produce.
pub const MAX_PAYLOAD_LEN: usize = (ACCUMULATOR_BITS / 8) as usize;

pub type Payload = Bytes<MAX_PAYLOAD_LEN>;

/// The decoded form of the 32-bit header `address:16 | opcode:8 | nibble_count:8`.
///
/// # Example
/// ```
/// use radiocmd::protocol::Header;
///
/// let header = Header::from_u32(0x1234_0302);
/// assert_eq!(header.address, 0x1234);
/// assert_eq!(header.opcode, 0x03);
/// assert_eq!(header.payload_len(), 1);
/// assert_eq!(header.to_bytes(), [0x12, 0x34, 0x03, 0x02]);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Header {
    pub address: u16,
    pub opcode: u8,
    pub nibble_count: u8,
}

impl Header {
    pub const fn new(address: u16, opcode: u8, nibble_count: u8) -> Self {
        return Header {
            address,
            opcode,
            nibble_count,
        };
    }

    pub const fn from_u32(header: u32) -> Self {
        return Header {
            address: (header >> 16) as u16,
            opcode: ((header >> 8) & 0xFF) as u8,
            nibble_count: (header & 0xFF) as u8,
        };
    }

    pub const fn to_u32(&self) -> u32 {
        return ((self.address as u32) << 16) | ((self.opcode as u32) << 8) | self.nibble_count as u32;
    }

    pub const fn from_bytes(bytes: [u8; HEADER_LEN]) -> Self {
        return Self::from_u32(u32::from_be_bytes(bytes));
    }

    pub const fn to_bytes(&self) -> [u8; HEADER_LEN] {
        return self.to_u32().to_be_bytes();
    }

    /// Payload length in bytes announced by the header.
    pub const fn payload_len(&self) -> usize {
        return self.nibble_count as usize / 2;
    }
}

/// A 64-bit accumulator that packs fixed-width fields MSB-first.
///
/// Fields are written from the top of the word down, so the first field ends up in the
/// most significant bits and serializes first.
///
/// # Example
/// ```
/// use radiocmd::protocol::BitAccumulator;
///
/// let mut acc = BitAccumulator::new();
/// acc.push(0xAB, 8).unwrap();
/// acc.push(0x1234, 16).unwrap();
/// assert_eq!(acc.to_bytes(3).unwrap().as_ref(), &[0xAB, 0x12, 0x34]);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BitAccumulator {
    bits: u64,
    used: u32,
}

impl BitAccumulator {
    pub const fn new() -> Self {
        return BitAccumulator { bits: 0, used: 0 };
    }

    /// Loads up to 8 bytes, first byte most significant, ready to be read back with [`pop`](Self::pop).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() > MAX_PAYLOAD_LEN {
            return Err(Error::CapacityExceeded {
                bits: bytes.len() as u32 * 8,
                capacity: ACCUMULATOR_BITS,
            });
        }

        let mut buffer = [0u8; MAX_PAYLOAD_LEN];
        buffer[..bytes.len()].copy_from_slice(bytes);

        return Ok(BitAccumulator {
            bits: u64::from_be_bytes(buffer),
            used: 0,
        });
    }

    pub const fn used(&self) -> u32 {
        return self.used;
    }

    const fn mask(width: u32) -> u64 {
        return if width >= u64::BITS { u64::MAX } else { (1u64 << width) - 1 };
    }

    /// Writes the low `width` bits of `value` into the next free slot.
    pub fn push(&mut self, value: u64, width: u32) -> Result<()> {
        if width == 0 {
            return Ok(());
        }
        if self.used + width > ACCUMULATOR_BITS {
            return Err(Error::CapacityExceeded {
                bits: self.used + width,
                capacity: ACCUMULATOR_BITS,
            });
        }

        let shift = ACCUMULATOR_BITS - self.used - width;
        self.bits |= (value & Self::mask(width)) << shift;
        self.used += width;

        return Ok(());
    }

    /// Reads the next `width` bits, right-aligned.
    pub fn pop(&mut self, width: u32) -> Result<u64> {
        if width == 0 {
            return Ok(0);
        }
        if self.used + width > ACCUMULATOR_BITS {
            return Err(Error::CapacityExceeded {
                bits: self.used + width,
                capacity: ACCUMULATOR_BITS,
            });
        }

        let shift = ACCUMULATOR_BITS - self.used - width;
        self.used += width;

        return Ok((self.bits >> shift) & Self::mask(width));
    }

    /// The `len` most significant bytes, most significant first.
    pub fn to_bytes(&self, len: usize) -> Result<Payload> {
        if len > MAX_PAYLOAD_LEN {
            return Err(Error::BufferFull {
                capacity: MAX_PAYLOAD_LEN,
            });
        }

        let mut payload = Payload::new();
        payload.extend(&self.bits.to_be_bytes()[..len])?;

        return Ok(payload);
    }
}

/// Up to [`MAX_ARGS`] arguments without touching the heap.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ArgList {
    items: [Option<Arg>; MAX_ARGS],
    len: usize,
}

impl ArgList {
    pub const fn new() -> Self {
        return ArgList {
            items: [None; MAX_ARGS],
            len: 0,
        };
    }

    pub fn push(&mut self, arg: Arg) -> Result<()> {
        if self.len >= MAX_ARGS {
            return Err(Error::CapacityExceeded {
                bits: (self.len as u32 + 1) * arg.kind().bit_width(),
                capacity: ACCUMULATOR_BITS,
            });
        }

        self.items[self.len] = Some(arg);
        self.len += 1;

        return Ok(());
    }

    pub fn len(&self) -> usize {
        return self.len;
    }

    pub fn is_empty(&self) -> bool {
        return self.len == 0;
    }

    pub fn get(&self, index: usize) -> Option<Arg> {
        return self.items.get(index).copied().flatten();
    }

    pub fn iter(&self) -> impl Iterator<Item = Arg> + '_ {
        return self.items[..self.len].iter().flatten().copied();
    }

    /// Bitwise comparison against a slice, so float arguments compare by their exact bit patterns.
    pub fn same_bits(&self, other: &[Arg]) -> bool {
        return self.len == other.len() && self.iter().zip(other).all(|(a, b)| a.same_bits(b));
    }
}

/// A decoded command.
///
/// # Fields
/// - `address`: The 16-bit node address from the header
/// - `command`: The registry entry the opcode resolved to
/// - `args`: The arguments recovered from the payload, in order
#[derive(Clone, Copy, Debug)]
pub struct Message<'r> {
    pub address: u16,
    pub command: &'r CommandSpec,
    pub args: ArgList,
}

/// Header/payload encoder and decoder bound to one registry.
///
/// # Example
/// ```
/// use radiocmd::command::{Arg, Registry};
/// use radiocmd::protocol::ProtocolCodec;
///
/// let codec = ProtocolCodec::new(Registry::standard());
/// let status = codec.registry().by_name("STATUS").unwrap();
///
/// let (header, payload) = codec.encode(0x1234, status, &[Arg::UInt8(0x7F)]).unwrap();
/// assert_eq!(header.to_u32(), 0x1234_0302);
/// assert_eq!(payload.as_ref(), &[0x7F]);
///
/// let message = codec.decode(header, &payload).unwrap();
/// assert_eq!(message.command.name, "STATUS");
/// assert_eq!(message.args.get(0), Some(Arg::UInt8(0x7F)));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct ProtocolCodec<'r> {
    registry: &'r Registry,
}

impl<'r> ProtocolCodec<'r> {
    pub const fn new(registry: &'r Registry) -> Self {
        return ProtocolCodec { registry };
    }

    pub fn registry(&self) -> &'r Registry {
        return self.registry;
    }

    /// Packs `args` for `command` and builds the matching header.
    ///
    /// Arguments are checked in this order: total width against the 64-bit accumulator
    /// (`CapacityExceeded`), count against the command's signature (`TooManyArguments`),
    /// then each variant against its slot (`TypeMismatch`).
    pub fn encode(&self, address: u16, command: &CommandSpec, args: &[Arg]) -> Result<(Header, Payload)> {
        if !self.registry.contains(command) {
            return Err(Error::UnsupportedCommand {
                name: command.name,
                opcode: command.opcode,
            });
        }

        let bits: u32 = args.iter().map(|arg| arg.kind().bit_width()).sum();
        if bits > ACCUMULATOR_BITS || args.len() > MAX_ARGS {
            return Err(Error::CapacityExceeded {
                bits,
                capacity: ACCUMULATOR_BITS,
            });
        }

        if args.len() > command.max_args() {
            return Err(Error::TooManyArguments {
                command: command.name,
                given: args.len(),
                max: command.max_args(),
            });
        }

        let mut accumulator = BitAccumulator::new();
        for (index, arg) in args.iter().enumerate() {
            let expected = command.argument_kind(index);
            if arg.kind() != expected {
                return Err(Error::TypeMismatch {
                    command: command.name,
                    index,
                    expected,
                    found: arg.kind(),
                });
            }
            accumulator.push(arg.to_bits(), expected.bit_width())?;
        }

        let payload_len = (accumulator.used() / 8) as usize;
        let header = Header::new(address, command.opcode, (payload_len * 2) as u8);
        let payload = accumulator.to_bytes(payload_len)?;

        trace!("header: {:08X}", header.to_u32());
        trace!("payload: {:02X?}", payload.as_slice());

        return Ok((header, payload));
    }

    /// Resolves a command by name, then encodes it.
    pub fn encode_named(&self, address: u16, name: &str, args: &[Arg]) -> Result<(Header, Payload)> {
        let command = self.registry.by_name(name)?;
        return self.encode(address, command, args);
    }

    /// Recovers the command and its arguments from a header and the payload bytes that followed it.
    ///
    /// `payload` may be longer than the header announces; the excess is ignored.
    pub fn decode(&self, header: Header, payload: &[u8]) -> Result<Message<'r>> {
        let command = self.registry.by_opcode(header.opcode);
        if command.is_unknown() {
            return Err(Error::UnknownOpcode(header.opcode));
        }

        let malformed = |reason: &'static str| Error::MalformedPayload {
            opcode: header.opcode,
            reason,
        };

        if header.nibble_count % 2 != 0 {
            return Err(malformed("odd nibble count"));
        }

        let payload_len = header.payload_len();
        if payload_len > MAX_PAYLOAD_LEN {
            return Err(malformed("payload exceeds accumulator"));
        }
        if payload.len() < payload_len {
            return Err(malformed("payload shorter than header length"));
        }

        let mut accumulator = BitAccumulator::from_bytes(&payload[..payload_len])?;
        let mut remaining = payload_len;
        let mut args = ArgList::new();

        for &kind in command.signature {
            if remaining == 0 {
                break;
            }
            if kind.byte_width() > remaining {
                return Err(malformed("length not a whole number of arguments"));
            }

            let bits = accumulator.pop(kind.bit_width())?;
            if let Some(arg) = Arg::from_bits(kind, bits) {
                args.push(arg)?;
            }
            remaining -= kind.byte_width();
        }

        if remaining != 0 {
            return Err(malformed("length exceeds command signature"));
        }

        trace!(
            "address: {:04X}, command: {}, {} argument(s)",
            header.address,
            command.name,
            args.len()
        );

        return Ok(Message {
            address: header.address,
            command,
            args,
        });
    }
}
