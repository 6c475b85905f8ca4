//! Helpers for the operator side of the link, where commands arrive as text.

use crate::command::{Arg, ArgKind};
use crate::error::{Error, Result};
use crate::frame::{Frame, FrameCodec};

impl Arg {
    /// Parses `value` as an argument of `kind`.
    ///
    /// Integers accept decimal or `0x`-prefixed hexadecimal; floats accept anything `f32` parses.
    /// `index` only labels the error.
    ///
    /// # Example
    /// ```
    /// use radiocmd::command::{Arg, ArgKind};
    ///
    /// assert_eq!(Arg::parse(ArgKind::UInt8, "0x7F", 0).unwrap(), Arg::UInt8(0x7F));
    /// assert_eq!(Arg::parse(ArgKind::Int8, "-12", 0).unwrap(), Arg::Int8(-12));
    /// assert!(Arg::parse(ArgKind::UInt8, "256", 0).is_err());
    /// ```
    pub fn parse(kind: ArgKind, value: &str, index: usize) -> Result<Arg> {
        let invalid = || Error::InvalidArgument {
            index,
            value: value.to_string(),
            kind,
        };
        let text = value.trim();

        let integer = |text: &str| -> Option<i64> {
            let (negative, digits) = match text.strip_prefix('-') {
                Some(rest) => (true, rest),
                None => (false, text),
            };
            let (radix, digits) = match digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
                Some(hex) => (16, hex),
                None => (10, digits),
            };
            // The sign was already taken; `from_str_radix` would accept a second one.
            if !digits.starts_with(|c: char| c.is_ascii_hexdigit()) {
                return None;
            }
            let magnitude = i64::from_str_radix(digits, radix).ok()?;
            return Some(if negative { -magnitude } else { magnitude });
        };

        let arg = match kind {
            ArgKind::None => None,
            ArgKind::Int8 => integer(text).and_then(|v| i8::try_from(v).ok()).map(Arg::Int8),
            ArgKind::UInt8 => integer(text).and_then(|v| u8::try_from(v).ok()).map(Arg::UInt8),
            ArgKind::UInt16 => integer(text).and_then(|v| u16::try_from(v).ok()).map(Arg::UInt16),
            ArgKind::Float32 => text.parse::<f32>().ok().map(Arg::Float32),
        };

        return arg.ok_or_else(invalid);
    }
}

/// Builds a wire frame from an address, a command name and its arguments as text,
/// each argument parsed against the kind of its slot.
pub fn encode_from_strings(codec: &FrameCodec<'_>, address: u16, name: &str, args: &[&str]) -> Result<Frame> {
    let command = codec.protocol().registry().by_name(name)?;

    if args.len() > command.max_args() {
        return Err(Error::TooManyArguments {
            command: command.name,
            given: args.len(),
            max: command.max_args(),
        });
    }

    let mut parsed = [Arg::UInt8(0); crate::protocol::MAX_ARGS];
    for (index, value) in args.iter().enumerate() {
        parsed[index] = Arg::parse(command.argument_kind(index), value, index)?;
    }

    return codec.encode(address, command, &parsed[..args.len()]);
}

/// Space-separated uppercase hex, e.g. `87 99 1E`.
pub fn to_hex(bytes: &[u8]) -> String {
    return bytes
        .iter()
        .map(|byte| format!("{:02X}", byte))
        .collect::<Vec<_>>()
        .join(" ");
}
