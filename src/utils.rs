use core::ops::Deref;

use crate::error::{Error, Result};

/// A fixed-capacity byte buffer living on the stack.
///
/// # Fields
/// - `bytes`: The backing array, zero-filled past `pointer`
/// - `pointer`: The number of bytes written so far
///
/// # Example
/// ```
/// use radiocmd::utils::Bytes;
///
/// let mut buffer = Bytes::<4>::new();
/// buffer.push(0x7E).unwrap();
/// buffer.extend(&[0x01, 0x02]).unwrap();
/// assert_eq!(&buffer[..], &[0x7E, 0x01, 0x02]);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bytes<const N: usize> {
    pub bytes: [u8; N],
    pub pointer: usize,
}

impl<const N: usize> Bytes<N> {
    pub const fn new() -> Bytes<N> {
        return Bytes {
            bytes: [0; N],
            pointer: 0,
        };
    }

    pub fn push(&mut self, value: u8) -> Result<()> {
        if self.pointer >= N {
            return Err(Error::BufferFull { capacity: N });
        }

        self.bytes[self.pointer] = value;
        self.pointer += 1;

        return Ok(());
    }

    /// Appends every byte of `values`, or nothing at all if they do not fit.
    pub fn extend(&mut self, values: &[u8]) -> Result<()> {
        if values.len() > N - self.pointer {
            return Err(Error::BufferFull { capacity: N });
        }

        self.bytes[self.pointer..self.pointer + values.len()].copy_from_slice(values);
        self.pointer += values.len();

        return Ok(());
    }

    pub fn as_slice(&self) -> &[u8] {
        return &self.bytes[..self.pointer];
    }

    pub const fn capacity(&self) -> usize {
        return N;
    }
}

impl<const N: usize> Default for Bytes<N> {
    fn default() -> Self {
        return Self::new();
    }
}

impl<const N: usize> Deref for Bytes<N> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        return self.as_slice();
    }
}

impl<const N: usize> AsRef<[u8]> for Bytes<N> {
    fn as_ref(&self) -> &[u8] {
        return self.as_slice();
    }
}
