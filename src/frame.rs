//! # Frame Codec
//!
//! Protects a header+payload message for the radio link. Every byte is split into two
//! nibbles, high nibble first, and every nibble becomes one Hamming(8,4) codeword on the
//! wire, so a frame is exactly twice as long as the message it carries.
//!
//! ```text
//! message:  [addr_hi] [addr_lo] [opcode] [nibbles] [payload ...]
//! wire:     [h0][h1]  [h2][h3]  [h4][h5] [h6][h7]  [p0][p1] ...
//! ```
//!
//! Decoding runs in two phases so a transport can read the fixed 8-byte header first and
//! learn from it how many payload bytes follow.

use log::{debug, warn};

use crate::command::{Arg, CommandSpec, Registry};
use crate::error::{Error, Result};
use crate::hamming::{self, HammingConfig, HammingType};
use crate::protocol::{Header, Message, ProtocolCodec, HEADER_LEN, MAX_PAYLOAD_LEN};
use crate::utils::Bytes;

/// Wire bytes carrying the header.
pub const HEADER_WIRE_LEN: usize = HEADER_LEN * 2;

/// Longest frame the codec can produce.
pub const MAX_FRAME_LEN: usize = (HEADER_LEN + MAX_PAYLOAD_LEN) * 2;

pub type Frame = Bytes<MAX_FRAME_LEN>;

/// Configuration for the frame codec.
///
/// # Fields
/// - `code`: The Hamming code applied to each nibble. It must carry 4 data bits in at most 8 bits,
///   which leaves `H84` (default, SECDED) and `H74`. Under `H74` a set top bit counts as one
///   corrected error, or as an uncorrectable one when the codeword also needed fixing
/// - `max_payload_len`: Largest payload accepted from a received header. Default: 8 bytes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameConfig {
    pub code: HammingType,
    pub max_payload_len: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        return FrameConfig {
            code: HammingType::H84,
            max_payload_len: MAX_PAYLOAD_LEN,
        };
    }
}

impl FrameConfig {
    pub fn validate(&self) -> Result<()> {
        let config = self.code.config();
        config.validate()?;

        if config.data_bits != 4 || config.total_bits > 8 || self.max_payload_len > MAX_PAYLOAD_LEN {
            return Err(Error::InvalidConfig {
                data_bits: config.data_bits,
                total_bits: config.total_bits,
            });
        }

        return Ok(());
    }
}

/// A decoded frame header, enough to size the rest of the read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeaderRead {
    pub header: Header,
    /// Single-bit errors corrected while decoding the header.
    pub corrected: usize,
}

impl HeaderRead {
    /// Wire bytes that follow the header.
    pub const fn payload_wire_len(&self) -> usize {
        return self.header.nibble_count as usize;
    }

    /// Total wire length of the frame.
    pub const fn frame_len(&self) -> usize {
        return HEADER_WIRE_LEN + self.payload_wire_len();
    }
}

/// A fully decoded frame.
///
/// # Fields
/// - `message`: The command and arguments carried by the frame
/// - `corrected`: Single-bit errors corrected anywhere in the frame
/// - `len`: Wire bytes consumed
#[derive(Clone, Copy, Debug)]
pub struct DecodedFrame<'r> {
    pub message: Message<'r>,
    pub corrected: usize,
    pub len: usize,
}

/// Splits each byte into its high and low nibble, in that order.
///
/// `out` must hold two nibbles per input byte.
pub fn split_nibbles(bytes: &[u8], out: &mut [u8]) -> Result<()> {
    if out.len() < bytes.len() * 2 {
        return Err(Error::BufferFull { capacity: out.len() });
    }

    for (i, byte) in bytes.iter().enumerate() {
        out[i * 2] = byte >> 4;
        out[i * 2 + 1] = byte & 0x0F;
    }

    return Ok(());
}

/// Joins nibble pairs back into bytes. A trailing unpaired nibble is ignored.
pub fn merge_nibbles(nibbles: &[u8], out: &mut [u8]) -> Result<()> {
    if out.len() < nibbles.len() / 2 {
        return Err(Error::BufferFull { capacity: out.len() });
    }

    for (i, pair) in nibbles.chunks_exact(2).enumerate() {
        out[i] = (pair[0] << 4) | (pair[1] & 0x0F);
    }

    return Ok(());
}

/// Link-layer encoder and decoder.
///
/// # Example
/// ```
/// use radiocmd::command::{Arg, Registry};
/// use radiocmd::frame::FrameCodec;
///
/// let codec = FrameCodec::new(Registry::standard());
/// let status = Registry::standard().by_name("STATUS").unwrap();
///
/// let mut wire = codec.encode(0x1234, status, &[Arg::UInt8(0x7F)]).unwrap();
/// assert_eq!(wire.len(), 10);
///
/// wire.bytes[3] ^= 0x04; // one bit lost in the air
/// let decoded = codec.decode(&wire).unwrap();
/// assert_eq!(decoded.message.address, 0x1234);
/// assert_eq!(decoded.message.args.get(0), Some(Arg::UInt8(0x7F)));
/// assert_eq!(decoded.corrected, 1);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct FrameCodec<'r> {
    protocol: ProtocolCodec<'r>,
    config: FrameConfig,
}

impl<'r> FrameCodec<'r> {
    /// Create a frame codec using the default configuration.
    pub fn new(registry: &'r Registry) -> Self {
        return FrameCodec {
            protocol: ProtocolCodec::new(registry),
            config: FrameConfig::default(),
        };
    }

    pub fn with_config(registry: &'r Registry, config: FrameConfig) -> Result<Self> {
        config.validate()?;

        return Ok(FrameCodec {
            protocol: ProtocolCodec::new(registry),
            config,
        });
    }

    pub fn config(&self) -> &FrameConfig {
        return &self.config;
    }

    pub fn protocol(&self) -> &ProtocolCodec<'r> {
        return &self.protocol;
    }

    fn hamming(&self) -> &'static HammingConfig {
        return self.config.code.config();
    }

    /// Encodes a command into its protected wire form.
    pub fn encode(&self, address: u16, command: &CommandSpec, args: &[Arg]) -> Result<Frame> {
        let (header, payload) = self.protocol.encode(address, command, args)?;

        let mut message = Bytes::<{ HEADER_LEN + MAX_PAYLOAD_LEN }>::new();
        message.extend(&header.to_bytes())?;
        message.extend(&payload)?;

        let mut nibbles = [0u8; MAX_FRAME_LEN];
        split_nibbles(&message, &mut nibbles)?;

        let mut frame = Frame::new();
        for &nibble in &nibbles[..message.len() * 2] {
            frame.push(hamming::encode(nibble as u32, self.hamming())? as u8)?;
        }

        return Ok(frame);
    }

    /// Resolves a command by name, then encodes it.
    pub fn encode_named(&self, address: u16, name: &str, args: &[Arg]) -> Result<Frame> {
        let command = self.protocol.registry().by_name(name)?;
        return self.encode(address, command, args);
    }

    /// Decodes `wire` into nibbles, `out[i]` coming from `wire[i]`.
    ///
    /// `first_index` is the frame offset of `wire[0]`, used to report which nibble failed.
    fn decode_nibbles(&self, wire: &[u8], out: &mut [u8], first_index: usize) -> Result<usize> {
        let mut corrected = 0;
        let total_bits = self.hamming().total_bits as u32;

        for (i, &byte) in wire.iter().enumerate() {
            let decoded = hamming::decode(byte as u32, self.hamming())?;
            // Codes shorter than a byte leave the top bits unused; they must stay clear.
            let stray = (byte as u32) >> total_bits;
            if decoded.uncorrectable || stray.count_ones() > 1 || (stray != 0 && decoded.corrected) {
                warn!("uncorrectable error in nibble {}, dropping frame", first_index + i);
                return Err(Error::FrameUncorrectable {
                    nibble: first_index + i,
                });
            }
            if stray != 0 {
                debug!("cleared unused bits 0x{:02X} of nibble {}", byte, first_index + i);
                corrected += 1;
            } else if decoded.corrected {
                debug!(
                    "corrected bit {} of nibble {}",
                    decoded.error_position,
                    first_index + i
                );
                corrected += 1;
            }
            out[i] = decoded.data as u8;
        }

        return Ok(corrected);
    }

    /// Decodes the first [`HEADER_WIRE_LEN`] bytes of a frame.
    pub fn decode_header(&self, wire: &[u8]) -> Result<HeaderRead> {
        if wire.len() < HEADER_WIRE_LEN {
            return Err(Error::Truncated {
                expected: HEADER_WIRE_LEN,
                actual: wire.len(),
            });
        }

        let mut nibbles = [0u8; HEADER_WIRE_LEN];
        let corrected = self.decode_nibbles(&wire[..HEADER_WIRE_LEN], &mut nibbles, 0)?;

        let mut bytes = [0u8; HEADER_LEN];
        merge_nibbles(&nibbles, &mut bytes)?;

        return Ok(HeaderRead {
            header: Header::from_bytes(bytes),
            corrected,
        });
    }

    /// Decodes a whole frame. Bytes past the end of the frame are left untouched.
    pub fn decode(&self, wire: &[u8]) -> Result<DecodedFrame<'r>> {
        let head = self.decode_header(wire)?;
        let header = head.header;

        if header.nibble_count % 2 != 0 || header.payload_len() > self.config.max_payload_len {
            warn!(
                "rejecting frame for opcode 0x{:02X} announcing {} nibbles",
                header.opcode, header.nibble_count
            );
            return Err(Error::MalformedPayload {
                opcode: header.opcode,
                reason: "payload length out of range",
            });
        }

        let frame_len = head.frame_len();
        if wire.len() < frame_len {
            return Err(Error::Truncated {
                expected: frame_len,
                actual: wire.len(),
            });
        }

        let payload_wire = &wire[HEADER_WIRE_LEN..frame_len];
        let mut nibbles = [0u8; MAX_PAYLOAD_LEN * 2];
        let corrected = head.corrected
            + self.decode_nibbles(payload_wire, &mut nibbles, HEADER_WIRE_LEN)?;

        let mut payload = [0u8; MAX_PAYLOAD_LEN];
        merge_nibbles(&nibbles[..payload_wire.len()], &mut payload)?;

        let message = self.protocol.decode(header, &payload[..header.payload_len()])?;

        return Ok(DecodedFrame {
            message,
            corrected,
            len: frame_len,
        });
    }
}
