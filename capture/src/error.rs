use wire::{EncodeError, Handle, Opcode};

/// Result type for capture operations.
pub type CaptureResult<T> = Result<T, CaptureError>;

/// Errors raised while recording a trace.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("trace sink write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("event could not be encoded: {0}")]
    Encode(#[from] EncodeError),

    /// Mapping events and calculator-sized uploads must use their dedicated hooks.
    #[error("{opcode} must be recorded through its host hook")]
    HookRequired { opcode: Opcode },

    /// An unmap arrived with no open mapping for the resource.
    #[error("unmap of resource {resource:#x} (subresource {subresource:?}) has no open mapping")]
    UnmatchedUnmap {
        resource: u64,
        subresource: Option<u32>,
    },

    #[error("resource {resource:#x} is not a {expected}")]
    WrongResourceKind {
        resource: u64,
        expected: &'static str,
    },

    /// Host data is shorter than the size the payload calculator requires.
    #[error("resource {resource:#x} provided {actual} bytes, {expected} required")]
    ShortData {
        resource: u64,
        expected: u64,
        actual: usize,
    },
}

impl CaptureError {
    pub(crate) const fn unmatched(resource: Handle, subresource: Option<u32>) -> Self {
        Self::UnmatchedUnmap {
            resource: resource.raw(),
            subresource,
        }
    }

    pub(crate) const fn short(resource: Handle, expected: u64, actual: usize) -> Self {
        Self::ShortData {
            resource: resource.raw(),
            expected,
            actual,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_mentions_resource() {
        let err = CaptureError::unmatched(Handle::new(0x2a), Some(3));
        assert_eq!(
            err.to_string(),
            "unmap of resource 0x2a (subresource Some(3)) has no open mapping"
        );
    }

    #[test]
    fn hook_required_names_opcode() {
        let err = CaptureError::HookRequired {
            opcode: Opcode::UnmapBufferRegion,
        };
        assert_eq!(
            err.to_string(),
            "unmap_buffer_region must be recorded through its host hook"
        );
    }

    #[test]
    fn encode_errors_convert() {
        let err: CaptureError = EncodeError::LengthOverflow { length: 1 }.into();
        assert!(matches!(err, CaptureError::Encode(_)));
    }
}
