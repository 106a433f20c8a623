use wire::{DecodeError, DeviceApi};

use crate::device::DeviceError;

/// Result type for replay operations.
pub type ReplayResult<T> = Result<T, ReplayError>;

/// Errors that abort a replay.
///
/// Malformed events are not among them: the player ends the trace early
/// instead.
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    /// The trace header could not be read.
    #[error("invalid trace header: {0}")]
    Header(#[from] DecodeError),

    #[error("trace targets {trace:?} but the device is {device:?}")]
    ApiMismatch { trace: DeviceApi, device: DeviceApi },

    /// The device refused to create an object the trace needs.
    #[error("failed to create {kind} for recorded handle {handle:#x}: {source}")]
    Creation {
        kind: &'static str,
        handle: u64,
        #[source]
        source: DeviceError,
    },
}

impl ReplayError {
    pub(crate) fn creation(kind: &'static str, handle: wire::Handle, source: DeviceError) -> Self {
        Self::Creation {
            kind,
            handle: handle.raw(),
            source,
        }
    }
}
