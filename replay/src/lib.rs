//! Replay side of the trace format.
//!
//! A [`Player`] reads a trace frame by frame and hands each event to a
//! [`ReplayContext`], which resolves recorded handles through its
//! [`HandleTables`] and calls into a [`Device`] backend. [`HeadlessDevice`]
//! is an in-memory backend for tools and tests.
//!
//! # Design Principles
//!
//! - **Recorded handles never reach the device** - Every handle is looked up
//!   first; unknown ones become the null object of their kind.
//! - **Best effort** - Only failing to create an object stops a replay. A
//!   truncated or malformed trace simply ends.
//! - **Backend agnostic** - The dispatcher knows the quirks of each recorded
//!   API but only talks to the [`Device`] and [`CommandList`] traits.

mod context;
mod device;
mod error;
mod handles;
mod headless;
mod pipeline;
mod player;

pub use context::{ReplayContext, ReplayStats, Step};
pub use device::{
    BufferLocation, CommandList, Device, DeviceError, DeviceResult, LiveBarrier, LiveBufferRange,
    LiveDepthStencil, LiveDescriptors, LiveRenderTarget, LiveStreamOutput, LiveTableCopy,
    LiveTableUpdate, LiveVertexBuffer, TextureLocation,
};
pub use error::{ReplayError, ReplayResult};
pub use handles::{
    DescriptorTable, HandleTable, HandleTables, LiveHandle, Pipeline, PipelineLayout, Resource,
    ResourceView, Sampler,
};
pub use headless::{HeadlessCounters, HeadlessDevice, DEFAULT_MAX_ALLOCATION};
pub use pipeline::PipelineDesc;
pub use player::{FrameOutcome, Player};
