//! Error types for simscene-common.

use thiserror::Error;

/// Common error type for simscene operations.
#[derive(Debug, Error)]
pub enum Error {
    /// End of buffer reached while reading.
    #[error("truncated input: needed {needed} bytes but only {available} available")]
    TruncatedInput { needed: usize, available: usize },

    /// A seek target outside the buffer bounds.
    #[error("invalid offset {offset} (buffer length {len})")]
    InvalidOffset { offset: usize, len: usize },

    /// Invalid magic bytes encountered.
    #[error("invalid magic: expected {expected:?}, got {actual:?}")]
    InvalidMagic { expected: Vec<u8>, actual: Vec<u8> },

    /// A chunk's declared length does not match the bytes its decoder consumed.
    #[error("malformed chunk {tag:#010x}: declared {declared} bytes, consumed {consumed}")]
    MalformedChunk {
        tag: u32,
        declared: usize,
        consumed: usize,
    },

    /// A chunk version above the highest this codec understands for its tag.
    #[error("unsupported version {version} for chunk {tag:#010x} (max {max})")]
    UnsupportedVersion { tag: u32, version: u32, max: u32 },

    /// A string too long for its length prefix.
    #[error("string of {len} bytes exceeds the 255-byte length prefix")]
    StringTooLong { len: usize },

    /// UTF-8 decoding error.
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
