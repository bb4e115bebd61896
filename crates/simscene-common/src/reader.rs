//! Binary reader for zero-copy parsing of byte slices.
//!
//! This module provides [`BinaryReader`], a cursor-like type that reads
//! little-endian binary data from a byte slice without copying.

use crate::{Error, Result};

/// A binary reader that provides positioned reading from a byte slice.
///
/// Every multi-byte read is explicitly little-endian; the formats this crate
/// serves fix their byte order on disk regardless of host endianness.
///
/// # Example
///
/// ```
/// use simscene_common::BinaryReader;
///
/// let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
/// let mut reader = BinaryReader::new(&data);
///
/// assert_eq!(reader.read_u32().unwrap(), 0x04030201);
/// assert_eq!(reader.read_u32().unwrap(), 0x08070605);
/// assert!(reader.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct BinaryReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> BinaryReader<'a> {
    /// Create a new reader from a byte slice.
    #[inline]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Get the current position in the buffer.
    #[inline]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Get the total length of the underlying buffer.
    #[inline]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Get the number of bytes remaining to read.
    #[inline]
    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Check if there are no more bytes to read.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.position >= self.data.len()
    }

    /// Seek to an absolute position.
    ///
    /// Fails with [`Error::InvalidOffset`] if the target lies outside
    /// `[0, len]`. Seeking to `len` is allowed (end of buffer).
    pub fn seek(&mut self, position: usize) -> Result<()> {
        if position > self.data.len() {
            return Err(Error::InvalidOffset {
                offset: position,
                len: self.data.len(),
            });
        }
        self.position = position;
        Ok(())
    }

    /// Peek at bytes without advancing the position.
    #[inline]
    pub fn peek_bytes(&self, count: usize) -> Result<&'a [u8]> {
        if self.remaining() < count {
            return Err(Error::TruncatedInput {
                needed: count,
                available: self.remaining(),
            });
        }
        Ok(&self.data[self.position..self.position + count])
    }

    /// Read bytes and advance the position.
    #[inline]
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        let bytes = self.peek_bytes(count)?;
        self.position += count;
        Ok(bytes)
    }

    /// Read a single byte.
    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        self.read_bytes(1).map(|b| b[0])
    }

    /// Read a little-endian u16.
    #[inline]
    pub fn read_u16(&mut self) -> Result<u16> {
        let bytes = self.read_bytes(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    /// Read a little-endian u32.
    #[inline]
    pub fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read a little-endian i32.
    #[inline]
    pub fn read_i32(&mut self) -> Result<i32> {
        let bytes = self.read_bytes(4)?;
        Ok(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read a little-endian f32.
    #[inline]
    pub fn read_f32(&mut self) -> Result<f32> {
        let bytes = self.read_bytes(4)?;
        Ok(f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read three little-endian f32 values.
    #[inline]
    pub fn read_f32x3(&mut self) -> Result<[f32; 3]> {
        Ok([self.read_f32()?, self.read_f32()?, self.read_f32()?])
    }

    /// Read two little-endian f32 values.
    #[inline]
    pub fn read_f32x2(&mut self) -> Result<[f32; 2]> {
        Ok([self.read_f32()?, self.read_f32()?])
    }

    /// Read four little-endian f32 values.
    #[inline]
    pub fn read_f32x4(&mut self) -> Result<[f32; 4]> {
        Ok([
            self.read_f32()?,
            self.read_f32()?,
            self.read_f32()?,
            self.read_f32()?,
        ])
    }

    /// Read a length-prefixed string (u8 length, UTF-8 bytes).
    pub fn read_str(&mut self) -> Result<&'a str> {
        let len = self.read_u8()? as usize;
        let bytes = self.read_bytes(len)?;
        std::str::from_utf8(bytes).map_err(Error::Utf8)
    }

    /// Peek at a u32 without advancing.
    #[inline]
    pub fn peek_u32(&self) -> Result<u32> {
        let bytes = self.peek_bytes(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Expect specific magic bytes.
    pub fn expect_magic(&mut self, expected: &[u8]) -> Result<()> {
        let actual = self.read_bytes(expected.len())?;
        if actual != expected {
            return Err(Error::InvalidMagic {
                expected: expected.to_vec(),
                actual: actual.to_vec(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitives() {
        let data = [0x2A, 0x01, 0x00, 0x00, 0x00, 0x80, 0x3F];
        let mut r = BinaryReader::new(&data);
        assert_eq!(r.read_u8().unwrap(), 0x2A);
        assert_eq!(r.read_u16().unwrap(), 1);
        assert_eq!(r.read_f32().unwrap(), 1.0);
        assert!(r.is_empty());
    }

    #[test]
    fn test_truncated() {
        let data = [0x01, 0x02];
        let mut r = BinaryReader::new(&data);
        match r.read_u32() {
            Err(Error::TruncatedInput {
                needed: 4,
                available: 2,
            }) => {}
            other => panic!("unexpected result: {other:?}"),
        }
        // The failed read must not advance the position.
        assert_eq!(r.position(), 0);
    }

    #[test]
    fn test_seek_bounds() {
        let data = [0u8; 8];
        let mut r = BinaryReader::new(&data);
        r.seek(8).unwrap();
        assert!(r.is_empty());
        assert!(matches!(
            r.seek(9),
            Err(Error::InvalidOffset { offset: 9, len: 8 })
        ));
    }

    #[test]
    fn test_read_str() {
        let data = [0x03, b'a', b'b', b'c', 0xFF];
        let mut r = BinaryReader::new(&data);
        assert_eq!(r.read_str().unwrap(), "abc");
        assert_eq!(r.position(), 4);
    }

    #[test]
    fn test_expect_magic() {
        let mut r = BinaryReader::new(b"\x01\x00\xff\xff");
        assert!(r.expect_magic(b"\x01\x00\xff\xff").is_ok());
        let mut r = BinaryReader::new(b"\x02\x00\xff\xff");
        assert!(matches!(
            r.expect_magic(b"\x01\x00\xff\xff"),
            Err(Error::InvalidMagic { .. })
        ));
    }
}
