//! Byte-level reader with bounded operations.

use crate::error::{ByteError, ByteResult};

/// A reader for decoding packed little-endian data.
///
/// All read operations are bounds-checked and return errors on failure.
/// The reader never panics on malformed input, and a failed read leaves the
/// position unchanged.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    /// Creates a new `ByteReader` from a byte slice.
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Returns the number of bytes remaining to read.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Returns `true` if there are no more bytes to read.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Returns the current byte position.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Reads a `u8`.
    pub fn read_u8(&mut self) -> ByteResult<u8> {
        let [value] = self.read_array::<1>()?;
        Ok(value)
    }

    /// Reads a little-endian `u16`.
    pub fn read_u16(&mut self) -> ByteResult<u16> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    /// Reads a little-endian `u32`.
    pub fn read_u32(&mut self) -> ByteResult<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    /// Reads a little-endian `u64`.
    pub fn read_u64(&mut self) -> ByteResult<u64> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    /// Reads a little-endian `i32`.
    pub fn read_i32(&mut self) -> ByteResult<i32> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    /// Reads a little-endian IEEE-754 `f32`.
    pub fn read_f32(&mut self) -> ByteResult<f32> {
        Ok(f32::from_le_bytes(self.read_array()?))
    }

    /// Reads a boolean stored as a single `0` or `1` byte.
    pub fn read_bool(&mut self) -> ByteResult<bool> {
        self.ensure_bytes(1)?;
        match self.data[self.pos] {
            0 => {
                self.pos += 1;
                Ok(false)
            }
            1 => {
                self.pos += 1;
                Ok(true)
            }
            value => Err(ByteError::InvalidBool { value }),
        }
    }

    /// Reads `len` raw bytes, borrowing them from the underlying buffer.
    pub fn read_bytes(&mut self, len: usize) -> ByteResult<&'a [u8]> {
        self.ensure_bytes(len)?;
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    /// Reads a block whose length was recorded as a `u64`.
    pub fn read_bytes_u64(&mut self, len: u64) -> ByteResult<&'a [u8]> {
        let len = usize::try_from(len).map_err(|_| ByteError::LengthOverflow { length: len })?;
        self.read_bytes(len)
    }

    /// Reads a fixed-size array of raw bytes.
    pub fn read_array<const N: usize>(&mut self) -> ByteResult<[u8; N]> {
        self.ensure_bytes(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.data[self.pos..self.pos + N]);
        self.pos += N;
        Ok(out)
    }

    fn ensure_bytes(&self, bytes: usize) -> ByteResult<()> {
        let available = self.remaining();
        if bytes > available {
            return Err(ByteError::UnexpectedEof {
                requested: bytes,
                available,
            });
        }
        Ok(())
    }
}
