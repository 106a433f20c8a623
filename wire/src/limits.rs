//! Configurable limits for bounded decoding.

/// Limits applied to every length field read from a trace.
///
/// A corrupt count word must not turn into a multi-gigabyte allocation, so
/// each count or size is checked before anything is reserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum number of elements in any counted array.
    pub max_array_len: usize,

    /// Maximum size of a single binary payload in bytes.
    pub max_blob_bytes: usize,

    /// Maximum length of a single string in bytes.
    pub max_string_len: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_array_len: 64 * 1024,

            // Large enough for a 4096x4096 RGBA32F mip level
            max_blob_bytes: 256 * 1024 * 1024,
            max_string_len: 4096,
        }
    }
}

impl Limits {
    /// Creates limits suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            max_array_len: 64,
            max_blob_bytes: 4096,
            max_string_len: 64,
        }
    }

    /// Creates limits with no restrictions (use with caution).
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_array_len: usize::MAX,
            max_blob_bytes: usize::MAX,
            max_string_len: usize::MAX,
        }
    }
}
