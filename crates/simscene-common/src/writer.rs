//! Binary writer mirroring [`BinaryReader`](crate::BinaryReader).
//!
//! Accumulates little-endian output into an owned byte buffer. Each `write_*`
//! is the exact inverse of the corresponding read, so codecs can be written
//! field-for-field symmetric.

use byteorder::{LittleEndian, WriteBytesExt};

use crate::{Error, Result};

/// A binary writer over an owned, growable byte buffer.
#[derive(Debug, Default)]
pub struct BinaryWriter {
    buf: Vec<u8>,
}

impl BinaryWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer with a pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Check whether nothing has been written yet.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Consume the writer and return the buffer.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Append raw bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.buf.write_u8(value)?;
        Ok(())
    }

    pub fn write_u16(&mut self, value: u16) -> Result<()> {
        self.buf.write_u16::<LittleEndian>(value)?;
        Ok(())
    }

    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.buf.write_u32::<LittleEndian>(value)?;
        Ok(())
    }

    pub fn write_i32(&mut self, value: i32) -> Result<()> {
        self.buf.write_i32::<LittleEndian>(value)?;
        Ok(())
    }

    pub fn write_f32(&mut self, value: f32) -> Result<()> {
        self.buf.write_f32::<LittleEndian>(value)?;
        Ok(())
    }

    pub fn write_f32x3(&mut self, value: [f32; 3]) -> Result<()> {
        for v in value {
            self.write_f32(v)?;
        }
        Ok(())
    }

    pub fn write_f32x2(&mut self, value: [f32; 2]) -> Result<()> {
        for v in value {
            self.write_f32(v)?;
        }
        Ok(())
    }

    pub fn write_f32x4(&mut self, value: [f32; 4]) -> Result<()> {
        for v in value {
            self.write_f32(v)?;
        }
        Ok(())
    }

    /// Write a length-prefixed string (u8 length, UTF-8 bytes).
    ///
    /// Fails with [`Error::StringTooLong`] for strings over 255 bytes; the
    /// on-disk format carries a single length byte.
    pub fn write_str(&mut self, value: &str) -> Result<()> {
        let len = value.len();
        if len > u8::MAX as usize {
            return Err(Error::StringTooLong { len });
        }
        self.write_u8(len as u8)?;
        self.write_bytes(value.as_bytes())
    }
}
