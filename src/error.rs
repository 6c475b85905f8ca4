use crate::command::ArgKind;

/// Errors produced while building, protecting or parsing a command frame.
///
/// Every variant is local to the encode/decode call that returned it. A corrected
/// single-bit error is not an error at all: it is counted in
/// [`DecodedFrame::corrected`](crate::frame::DecodedFrame) instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No command with this name exists in the registry (exact, case-sensitive match).
    #[error("unknown command \"{0}\"")]
    UnknownCommand(String),

    /// A decoded header carried an opcode the registry does not know.
    #[error("unknown opcode 0x{0:02X}")]
    UnknownOpcode(u8),

    /// The command handed to the encoder is not part of the codec's registry.
    #[error("command {name} (opcode 0x{opcode:02X}) is not registered")]
    UnsupportedCommand { name: &'static str, opcode: u8 },

    /// An argument variant does not match the kind declared for its slot.
    #[error("{command}: argument {index} must be {expected:?}, got {found:?}")]
    TypeMismatch {
        command: &'static str,
        index: usize,
        expected: ArgKind,
        found: ArgKind,
    },

    /// More arguments were supplied than the command's signature declares.
    #[error("{command} takes at most {max} argument(s), got {given}")]
    TooManyArguments {
        command: &'static str,
        given: usize,
        max: usize,
    },

    /// The arguments do not fit in the payload accumulator.
    #[error("arguments need {bits} bits, accumulator holds {capacity}")]
    CapacityExceeded { bits: u32, capacity: u32 },

    /// Header and payload disagree, or the payload is too short.
    #[error("malformed payload for opcode 0x{opcode:02X}: {reason}")]
    MalformedPayload { opcode: u8, reason: &'static str },

    /// A Hamming configuration exceeds the 26 data bit / 32 total bit ceiling or is inconsistent.
    #[error("invalid hamming configuration ({total_bits},{data_bits})")]
    InvalidConfig { data_bits: u8, total_bits: u8 },

    /// The data word has set bits above the configuration's data width.
    #[error("data word 0x{data:X} does not fit in {data_bits} bits")]
    DataOverflow { data: u32, data_bits: u8 },

    /// Two or more bit errors were detected in one nibble; the whole frame is discarded.
    #[error("uncorrectable error in nibble {nibble}")]
    FrameUncorrectable { nibble: usize },

    /// The wire buffer ends before the frame described by its header does.
    #[error("frame truncated: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    /// A fixed-capacity buffer ran out of room.
    #[error("buffer full (capacity {capacity})")]
    BufferFull { capacity: usize },

    /// An argument string could not be parsed as the kind its slot requires.
    #[error("argument {index} (\"{value}\") is not a valid {kind:?}")]
    InvalidArgument {
        index: usize,
        value: String,
        kind: ArgKind,
    },

    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = core::result::Result<T, Error>;
