//! Capture side of the trace format.
//!
//! A host interception layer creates one [`TraceRecorder`] per device and
//! forwards every observed call to it. Most calls become a single event via
//! [`TraceRecorder::record`]; calls that carry host memory (resource creation,
//! uploads, map and unmap) go through dedicated hooks that size the payload
//! and pair maps with unmaps.
//!
//! # Design Principles
//!
//! - **One total order per device** - All hooks serialize on a single lock, so
//!   concurrent recording threads produce one byte stream.
//! - **Sizes are computed, not trusted** - Texture payloads are cut to the size
//!   the calculator derives from the resource description.
//! - **Nothing partial** - An event is encoded completely before any byte of it
//!   reaches the sink.

mod config;
mod error;
mod mapping;
mod recorder;

pub use config::{CaptureConfig, CaptureSession, FILE_STEM_VAR, OUTPUT_DIR_VAR};
pub use error::{CaptureError, CaptureResult};
pub use mapping::{mapped_memory, MapTarget, MappedMemory, MappingRecord, MappingTracker, Unmapped};
pub use recorder::{HostSubresource, RecorderStats, TraceRecorder};
