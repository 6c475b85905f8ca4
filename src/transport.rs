//! Blocking helpers that move whole frames over any `Read`/`Write` byte stream,
//! such as a serial bridge to the LoRa modem.

use std::io::{Read, Write};

use log::trace;

use crate::command::{Arg, CommandSpec};
use crate::error::{Error, Result};
use crate::frame::{DecodedFrame, FrameCodec, HEADER_WIRE_LEN, MAX_FRAME_LEN};

/// Reads one frame at a time: the fixed 8-byte header first, then as many payload
/// bytes as the header announces.
pub struct FrameReader<'r, T> {
    inner: T,
    codec: FrameCodec<'r>,
    buf: [u8; MAX_FRAME_LEN],
}

impl<'r, T: Read> FrameReader<'r, T> {
    pub fn new(inner: T, codec: FrameCodec<'r>) -> Self {
        return FrameReader {
            inner,
            codec,
            buf: [0; MAX_FRAME_LEN],
        };
    }

    /// Read and decode the next frame (blocking).
    ///
    /// End of stream surfaces as `Error::Io` with `ErrorKind::UnexpectedEof`.
    pub fn read_frame(&mut self) -> Result<DecodedFrame<'r>> {
        self.inner.read_exact(&mut self.buf[..HEADER_WIRE_LEN])?;

        let head = self.codec.decode_header(&self.buf[..HEADER_WIRE_LEN])?;
        let frame_len = head.frame_len();
        if frame_len > MAX_FRAME_LEN || head.header.payload_len() > self.codec.config().max_payload_len {
            return Err(Error::MalformedPayload {
                opcode: head.header.opcode,
                reason: "payload length out of range",
            });
        }

        self.inner.read_exact(&mut self.buf[HEADER_WIRE_LEN..frame_len])?;
        trace!("received {:02X?}", &self.buf[..frame_len]);

        return self.codec.decode(&self.buf[..frame_len]);
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        return &self.inner;
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        return self.inner;
    }
}

/// Encodes commands and writes the complete frame in one go.
pub struct FrameWriter<'r, T> {
    inner: T,
    codec: FrameCodec<'r>,
}

impl<'r, T: Write> FrameWriter<'r, T> {
    pub fn new(inner: T, codec: FrameCodec<'r>) -> Self {
        return FrameWriter { inner, codec };
    }

    /// Encode and send a command (blocking). Returns the number of wire bytes written.
    pub fn send(&mut self, address: u16, command: &CommandSpec, args: &[Arg]) -> Result<usize> {
        let frame = self.codec.encode(address, command, args)?;
        trace!("sending {:02X?}", frame.as_slice());

        self.inner.write_all(&frame)?;
        self.inner.flush()?;

        return Ok(frame.len());
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        return &self.inner;
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        return self.inner;
    }
}
