//! Trace format for captured graphics API frames.
//!
//! This crate owns the binary layout of a trace: the header, the closed opcode
//! table, every event payload, and the payload size calculator both sides use
//! to frame texture data. It knows nothing about live devices.
//!
//! # Design Principles
//!
//! - **Schema-driven framing** - Events carry no length prefix; the opcode alone
//!   determines the payload layout.
//! - **One size rule** - Texture payloads are sized by [`subresource_size`] when
//!   writing and checked against it when reading.
//! - **Bounded decoding** - Counts and blob sizes are validated against [`Limits`]
//!   before anything is allocated.
//! - **Truncation is not corruption** - Running out of bytes ends the stream;
//!   only malformed data is an error.
//!
//! See `TRACE_FORMAT.md` for the complete layout.

mod codec;
mod descriptors;
mod error;
mod event;
mod format;
mod header;
mod limits;
mod opcode;
mod pipeline;
mod size;
mod trace;
mod types;

pub use descriptors::{
    BufferRange, DescriptorTableCopy, DescriptorTableUpdate, DescriptorType, Descriptors,
    SamplerWithView,
};
pub use error::{DecodeError, EncodeError, LimitKind, WireResult};
pub use event::{decode_event, encode_event, Event};
pub use format::{Format, FormatLayout};
pub use header::{decode_header, encode_header, DeviceApi, TraceHeader, HEADER_SIZE, MAGIC};
pub use limits::Limits;
pub use opcode::Opcode;
pub use pipeline::{
    BlendDesc, DepthStencilDesc, DescriptorRange, InputElement, PipelineLayoutParam,
    PipelineStateTag, PipelineSubobject, PushConstantRange, RasterizerDesc, RenderTargetBlend,
    ShaderDesc, ShaderStage, StaticSamplerRange, StencilFace,
};
pub use size::{mip_level, packed_pitches, subresource_size};
pub use trace::{encode_trace, EventRecord, TraceReader};
pub use types::{
    DepthStencilAttachment, DynamicStateValue, Handle, MapAccess, Rect, RenderTargetDesc,
    ResourceBarrier, ResourceDesc, ResourceShape, ResourceUsage, ResourceViewDesc, SamplerDesc,
    StreamOutputBinding, SubresourceBox, SubresourceData, TextureDesc, TextureDimension,
    VertexBufferBinding, Viewport,
};
