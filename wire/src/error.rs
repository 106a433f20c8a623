//! Error types for trace format operations.

use std::fmt;

use bytestream::ByteError;

/// Result type for trace decoding.
pub type WireResult<T> = Result<T, DecodeError>;

/// Errors raised while decoding a trace header or event.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DecodeError {
    /// Trace is too small to contain the header.
    TraceTooSmall { actual: usize, required: usize },

    /// Invalid magic constant at the start of the trace.
    InvalidMagic { found: u64 },

    /// Backend identifier is not a known graphics API family.
    UnknownDeviceApi { value: u32 },

    /// Opcode word is not part of the closed opcode table.
    UnknownOpcode { value: u32 },

    /// An enumerated field holds a value outside its range.
    InvalidEnum { kind: &'static str, value: u32 },

    /// A field holds a value that is structurally impossible.
    InvalidValue { field: &'static str, value: u64 },

    /// A string field is not valid UTF-8.
    InvalidUtf8 { field: &'static str },

    /// A texture payload size disagrees with the size calculator.
    SizeMismatch {
        subresource: u32,
        expected: u64,
        actual: u64,
    },

    /// Limits exceeded.
    LimitsExceeded {
        kind: LimitKind,
        limit: usize,
        actual: usize,
    },

    /// The underlying byte stream failed.
    Bytes(ByteError),
}

impl DecodeError {
    /// Returns `true` if decoding stopped because the input ran out.
    ///
    /// The trace reader reports these as end-of-stream instead of errors.
    #[must_use]
    pub const fn is_truncation(&self) -> bool {
        matches!(self, Self::Bytes(err) if err.is_eof())
    }
}

impl From<ByteError> for DecodeError {
    fn from(err: ByteError) -> Self {
        Self::Bytes(err)
    }
}

/// Specific decode limits that can be exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    ArrayLength,
    BlobBytes,
    StringLength,
}

/// Errors that can occur during encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// A variable-length field does not fit its count word.
    LengthOverflow { length: usize },

    /// Initial data does not match the size the decoder will expect.
    SizeMismatch {
        subresource: u32,
        expected: u64,
        actual: u64,
    },

    /// A field combination cannot be represented on the wire.
    InvalidValue { field: &'static str, value: u64 },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TraceTooSmall { actual, required } => {
                write!(
                    f,
                    "trace too small: {actual} bytes, need at least {required}"
                )
            }
            Self::InvalidMagic { found } => {
                write!(f, "invalid magic constant: 0x{found:016X}")
            }
            Self::UnknownDeviceApi { value } => {
                write!(f, "unknown device api: 0x{value:X}")
            }
            Self::UnknownOpcode { value } => write!(f, "unknown opcode: {value}"),
            Self::InvalidEnum { kind, value } => write!(f, "invalid {kind}: {value}"),
            Self::InvalidValue { field, value } => {
                write!(f, "invalid value for {field}: {value}")
            }
            Self::InvalidUtf8 { field } => write!(f, "{field} is not valid UTF-8"),
            Self::SizeMismatch {
                subresource,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "subresource {subresource} size mismatch: recorded {actual} bytes, expected {expected}"
                )
            }
            Self::LimitsExceeded {
                kind,
                limit,
                actual,
            } => {
                write!(f, "{kind} limit exceeded: {actual} > {limit}")
            }
            Self::Bytes(err) => write!(f, "byte stream error: {err}"),
        }
    }
}

impl fmt::Display for LimitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ArrayLength => "array length",
            Self::BlobBytes => "blob bytes",
            Self::StringLength => "string length",
        };
        write!(f, "{name}")
    }
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LengthOverflow { length } => {
                write!(f, "length overflow: {length}")
            }
            Self::SizeMismatch {
                subresource,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "subresource {subresource} holds {actual} bytes, expected {expected}"
                )
            }
            Self::InvalidValue { field, value } => {
                write!(f, "cannot encode {field} = {value}")
            }
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Bytes(err) => Some(err),
            _ => None,
        }
    }
}

impl std::error::Error for EncodeError {}
