//! Error types for byte stream operations.

use std::fmt;

/// Result type for byte stream operations.
pub type ByteResult<T> = Result<T, ByteError>;

/// Errors that can occur while reading packed little-endian data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ByteError {
    /// Attempted to read past the end of the buffer.
    UnexpectedEof {
        /// Number of bytes requested.
        requested: usize,
        /// Number of bytes available.
        available: usize,
    },

    /// A boolean byte held something other than `0` or `1`.
    InvalidBool {
        /// The raw byte that was read.
        value: u8,
    },

    /// A recorded length does not fit in the address space of this platform.
    LengthOverflow {
        /// The recorded length.
        length: u64,
    },
}

impl ByteError {
    /// Returns `true` if the error was caused by running out of input.
    ///
    /// Callers that treat a short read as the end of a stream use this to
    /// tell truncation apart from malformed data.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self, Self::UnexpectedEof { .. })
    }
}

impl fmt::Display for ByteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEof {
                requested,
                available,
            } => {
                write!(
                    f,
                    "attempted to read {requested} bytes but only {available} bytes available"
                )
            }
            Self::InvalidBool { value } => {
                write!(f, "invalid boolean byte 0x{value:02X}")
            }
            Self::LengthOverflow { length } => {
                write!(f, "length {length} does not fit in memory")
            }
        }
    }
}

impl std::error::Error for ByteError {}
