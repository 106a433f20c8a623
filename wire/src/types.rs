//! Object descriptions and command arguments carried by events.

use bytestream::{ByteReader, ByteWriter};

use crate::codec::{read_f32x4, write_f32x4, Codec};
use crate::error::{DecodeError, EncodeError, WireResult};
use crate::format::Format;
use crate::limits::Limits;

/// Opaque 64-bit object identifier recorded at capture time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Handle(u64);

impl Handle {
    /// The zero handle.
    pub const NULL: Self = Self(0);

    /// Creates a handle from its raw value.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Returns `true` for the zero handle.
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl From<u64> for Handle {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl Codec for Handle {
    fn encode(&self, out: &mut ByteWriter) -> Result<(), EncodeError> {
        out.write_u64(self.0);
        Ok(())
    }

    fn decode(input: &mut ByteReader<'_>, _limits: &Limits) -> WireResult<Self> {
        Ok(Self(input.read_u64()?))
    }
}

/// Resource usage and state flags, passed through verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ResourceUsage(u32);

impl ResourceUsage {
    pub const UNDEFINED: u32 = 0;
    pub const VERTEX_BUFFER: u32 = 1 << 0;
    pub const INDEX_BUFFER: u32 = 1 << 1;
    pub const RENDER_TARGET: u32 = 1 << 2;
    pub const UNORDERED_ACCESS: u32 = 1 << 3;
    pub const DEPTH_STENCIL: u32 = 0x30;
    pub const SHADER_RESOURCE: u32 = 0xC0;
    pub const COPY_DEST: u32 = 1 << 10;
    pub const COPY_SOURCE: u32 = 1 << 11;
    pub const CONSTANT_BUFFER: u32 = 1 << 15;
    /// Presentable back buffer state.
    pub const PRESENT: u32 = 0x8000_0000 | Self::RENDER_TARGET | Self::COPY_SOURCE;

    /// Creates usage flags from a raw value.
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw flag bits.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Returns `true` if every bit of `flags` is set.
    #[must_use]
    pub const fn contains(self, flags: u32) -> bool {
        self.0 & flags == flags
    }
}

/// Dimensionality of a texture resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum TextureDimension {
    D1,
    D2,
    D3,
    /// Legacy offscreen surface, laid out as a 2-D texture.
    Surface,
    /// Window-system framebuffer, laid out as a 2-D texture.
    Framebuffer,
}

/// Texture extent, mip chain and format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TextureDesc {
    pub dimension: TextureDimension,
    pub width: u32,
    pub height: u32,
    /// Depth for 3-D textures, array layers otherwise.
    pub depth_or_layers: u16,
    /// Mip level count; zero asks the backend for a full chain.
    pub levels: u16,
    pub format: Format,
    pub samples: u16,
}

impl TextureDesc {
    /// Number of array layers (always one for 3-D textures).
    #[must_use]
    pub const fn layers(&self) -> u32 {
        match self.dimension {
            TextureDimension::D3 => 1,
            _ => self.depth_or_layers as u32,
        }
    }

    /// Number of subresources that carry initial data.
    #[must_use]
    pub const fn subresource_count(&self) -> u32 {
        let levels = if self.levels == 0 { 1 } else { self.levels as u32 };
        levels * self.layers()
    }
}

/// Shape of a resource: a linear buffer or a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ResourceShape {
    Buffer { size: u64, stride: u32 },
    Texture(TextureDesc),
}

/// Full description of a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ResourceDesc {
    pub shape: ResourceShape,
    pub heap: u32,
    pub usage: ResourceUsage,
    pub flags: u32,
}

impl ResourceDesc {
    const TYPE_BUFFER: u32 = 1;
    const TYPE_TEXTURE_1D: u32 = 2;
    const TYPE_TEXTURE_2D: u32 = 3;
    const TYPE_TEXTURE_3D: u32 = 4;
    const TYPE_SURFACE: u32 = 5;
    const TYPE_FRAMEBUFFER: u32 = 6;

    /// Describes a buffer of `size` bytes.
    #[must_use]
    pub const fn buffer(size: u64, usage: u32) -> Self {
        Self {
            shape: ResourceShape::Buffer { size, stride: 0 },
            heap: 0,
            usage: ResourceUsage::from_raw(usage),
            flags: 0,
        }
    }

    /// Describes a single-sampled texture.
    #[must_use]
    pub const fn texture(
        dimension: TextureDimension,
        width: u32,
        height: u32,
        depth_or_layers: u16,
        levels: u16,
        format: Format,
        usage: u32,
    ) -> Self {
        Self {
            shape: ResourceShape::Texture(TextureDesc {
                dimension,
                width,
                height,
                depth_or_layers,
                levels,
                format,
                samples: 1,
            }),
            heap: 0,
            usage: ResourceUsage::from_raw(usage),
            flags: 0,
        }
    }

    /// Returns the texture part of the description, if any.
    #[must_use]
    pub const fn as_texture(&self) -> Option<&TextureDesc> {
        match &self.shape {
            ResourceShape::Texture(texture) => Some(texture),
            ResourceShape::Buffer { .. } => None,
        }
    }

    /// Returns the buffer size, if this is a buffer.
    #[must_use]
    pub const fn buffer_size(&self) -> Option<u64> {
        match self.shape {
            ResourceShape::Buffer { size, .. } => Some(size),
            ResourceShape::Texture(_) => None,
        }
    }
}

impl Codec for ResourceDesc {
    fn encode(&self, out: &mut ByteWriter) -> Result<(), EncodeError> {
        match &self.shape {
            ResourceShape::Buffer { size, stride } => {
                out.write_u32(Self::TYPE_BUFFER);
                out.write_u64(*size);
                out.write_u32(*stride);
            }
            ResourceShape::Texture(texture) => {
                out.write_u32(match texture.dimension {
                    TextureDimension::D1 => Self::TYPE_TEXTURE_1D,
                    TextureDimension::D2 => Self::TYPE_TEXTURE_2D,
                    TextureDimension::D3 => Self::TYPE_TEXTURE_3D,
                    TextureDimension::Surface => Self::TYPE_SURFACE,
                    TextureDimension::Framebuffer => Self::TYPE_FRAMEBUFFER,
                });
                out.write_u32(texture.width);
                out.write_u32(texture.height);
                out.write_u16(texture.depth_or_layers);
                out.write_u16(texture.levels);
                out.write_u32(texture.format.raw());
                out.write_u16(texture.samples);
            }
        }
        out.write_u32(self.heap);
        out.write_u32(self.usage.raw());
        out.write_u32(self.flags);
        Ok(())
    }

    fn decode(input: &mut ByteReader<'_>, _limits: &Limits) -> WireResult<Self> {
        let kind = input.read_u32()?;
        let dimension = match kind {
            Self::TYPE_BUFFER => None,
            Self::TYPE_TEXTURE_1D => Some(TextureDimension::D1),
            Self::TYPE_TEXTURE_2D => Some(TextureDimension::D2),
            Self::TYPE_TEXTURE_3D => Some(TextureDimension::D3),
            Self::TYPE_SURFACE => Some(TextureDimension::Surface),
            Self::TYPE_FRAMEBUFFER => Some(TextureDimension::Framebuffer),
            value => {
                return Err(DecodeError::InvalidEnum {
                    kind: "resource type",
                    value,
                })
            }
        };
        let shape = match dimension {
            None => ResourceShape::Buffer {
                size: input.read_u64()?,
                stride: input.read_u32()?,
            },
            Some(dimension) => ResourceShape::Texture(TextureDesc {
                dimension,
                width: input.read_u32()?,
                height: input.read_u32()?,
                depth_or_layers: input.read_u16()?,
                levels: input.read_u16()?,
                format: Format::new(input.read_u32()?),
                samples: input.read_u16()?,
            }),
        };
        Ok(Self {
            shape,
            heap: input.read_u32()?,
            usage: ResourceUsage::from_raw(input.read_u32()?),
            flags: input.read_u32()?,
        })
    }
}

/// Sampler state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SamplerDesc {
    pub filter: u32,
    pub address_u: u32,
    pub address_v: u32,
    pub address_w: u32,
    pub mip_lod_bias: f32,
    pub max_anisotropy: f32,
    pub compare_op: u32,
    pub border_color: [f32; 4],
    pub min_lod: f32,
    pub max_lod: f32,
}

impl Codec for SamplerDesc {
    fn encode(&self, out: &mut ByteWriter) -> Result<(), EncodeError> {
        out.write_u32(self.filter);
        out.write_u32(self.address_u);
        out.write_u32(self.address_v);
        out.write_u32(self.address_w);
        out.write_f32(self.mip_lod_bias);
        out.write_f32(self.max_anisotropy);
        out.write_u32(self.compare_op);
        write_f32x4(self.border_color, out);
        out.write_f32(self.min_lod);
        out.write_f32(self.max_lod);
        Ok(())
    }

    fn decode(input: &mut ByteReader<'_>, _limits: &Limits) -> WireResult<Self> {
        Ok(Self {
            filter: input.read_u32()?,
            address_u: input.read_u32()?,
            address_v: input.read_u32()?,
            address_w: input.read_u32()?,
            mip_lod_bias: input.read_f32()?,
            max_anisotropy: input.read_f32()?,
            compare_op: input.read_u32()?,
            border_color: read_f32x4(input)?,
            min_lod: input.read_f32()?,
            max_lod: input.read_f32()?,
        })
    }
}

/// Resource view description.
///
/// Buffer views address a byte range; texture views address a mip and layer range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ResourceViewDesc {
    Buffer {
        format: Format,
        offset: u64,
        size: u64,
    },
    Texture {
        /// Raw view type (1-D, 2-D array, cube, ...); never the buffer type.
        view_type: u32,
        format: Format,
        first_level: u32,
        level_count: u32,
        first_layer: u32,
        layer_count: u32,
    },
}

impl ResourceViewDesc {
    /// Raw view type word reserved for buffer views.
    pub const BUFFER_VIEW_TYPE: u32 = 1;

    /// Returns the view format.
    #[must_use]
    pub const fn format(&self) -> Format {
        match self {
            Self::Buffer { format, .. } | Self::Texture { format, .. } => *format,
        }
    }
}

impl Codec for ResourceViewDesc {
    fn encode(&self, out: &mut ByteWriter) -> Result<(), EncodeError> {
        match *self {
            Self::Buffer {
                format,
                offset,
                size,
            } => {
                out.write_u32(Self::BUFFER_VIEW_TYPE);
                out.write_u32(format.raw());
                out.write_u64(offset);
                out.write_u64(size);
            }
            Self::Texture {
                view_type,
                format,
                first_level,
                level_count,
                first_layer,
                layer_count,
            } => {
                if view_type == Self::BUFFER_VIEW_TYPE {
                    return Err(EncodeError::InvalidValue {
                        field: "texture view type",
                        value: u64::from(view_type),
                    });
                }
                out.write_u32(view_type);
                out.write_u32(format.raw());
                out.write_u32(first_level);
                out.write_u32(level_count);
                out.write_u32(first_layer);
                out.write_u32(layer_count);
            }
        }
        Ok(())
    }

    fn decode(input: &mut ByteReader<'_>, _limits: &Limits) -> WireResult<Self> {
        let view_type = input.read_u32()?;
        let format = Format::new(input.read_u32()?);
        if view_type == Self::BUFFER_VIEW_TYPE {
            return Ok(Self::Buffer {
                format,
                offset: input.read_u64()?,
                size: input.read_u64()?,
            });
        }
        Ok(Self::Texture {
            view_type,
            format,
            first_level: input.read_u32()?,
            level_count: input.read_u32()?,
            first_layer: input.read_u32()?,
            layer_count: input.read_u32()?,
        })
    }
}

/// Region inside a subresource, in texels. `right`, `bottom` and `back` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SubresourceBox {
    pub left: i32,
    pub top: i32,
    pub front: i32,
    pub right: i32,
    pub bottom: i32,
    pub back: i32,
}

impl SubresourceBox {
    /// Creates a box from its origin and extent.
    #[must_use]
    pub const fn new(origin: [i32; 3], extent: [i32; 3]) -> Self {
        Self {
            left: origin[0],
            top: origin[1],
            front: origin[2],
            right: origin[0] + extent[0],
            bottom: origin[1] + extent[1],
            back: origin[2] + extent[2],
        }
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        span(self.left, self.right)
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        span(self.top, self.bottom)
    }

    #[must_use]
    pub fn depth(&self) -> u32 {
        span(self.front, self.back)
    }
}

fn span(start: i32, end: i32) -> u32 {
    u32::try_from(i64::from(end) - i64::from(start)).unwrap_or(0)
}

impl Codec for SubresourceBox {
    fn encode(&self, out: &mut ByteWriter) -> Result<(), EncodeError> {
        out.write_i32(self.left);
        out.write_i32(self.top);
        out.write_i32(self.front);
        out.write_i32(self.right);
        out.write_i32(self.bottom);
        out.write_i32(self.back);
        Ok(())
    }

    fn decode(input: &mut ByteReader<'_>, _limits: &Limits) -> WireResult<Self> {
        Ok(Self {
            left: input.read_i32()?,
            top: input.read_i32()?,
            front: input.read_i32()?,
            right: input.read_i32()?,
            bottom: input.read_i32()?,
            back: input.read_i32()?,
        })
    }
}

/// Scissor rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Codec for Rect {
    fn encode(&self, out: &mut ByteWriter) -> Result<(), EncodeError> {
        out.write_i32(self.left);
        out.write_i32(self.top);
        out.write_i32(self.right);
        out.write_i32(self.bottom);
        Ok(())
    }

    fn decode(input: &mut ByteReader<'_>, _limits: &Limits) -> WireResult<Self> {
        Ok(Self {
            left: input.read_i32()?,
            top: input.read_i32()?,
            right: input.read_i32()?,
            bottom: input.read_i32()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Codec for Viewport {
    fn encode(&self, out: &mut ByteWriter) -> Result<(), EncodeError> {
        out.write_f32(self.x);
        out.write_f32(self.y);
        out.write_f32(self.width);
        out.write_f32(self.height);
        out.write_f32(self.min_depth);
        out.write_f32(self.max_depth);
        Ok(())
    }

    fn decode(input: &mut ByteReader<'_>, _limits: &Limits) -> WireResult<Self> {
        Ok(Self {
            x: input.read_f32()?,
            y: input.read_f32()?,
            width: input.read_f32()?,
            height: input.read_f32()?,
            min_depth: input.read_f32()?,
            max_depth: input.read_f32()?,
        })
    }
}

/// Initial or updated contents of one subresource.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SubresourceData {
    pub row_pitch: u32,
    pub slice_pitch: u32,
    pub data: Vec<u8>,
}

impl SubresourceData {
    /// Wraps buffer contents, which carry no pitches.
    #[must_use]
    pub const fn buffer(data: Vec<u8>) -> Self {
        Self {
            row_pitch: 0,
            slice_pitch: 0,
            data,
        }
    }
}

/// CPU access requested by a map call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[repr(u32)]
pub enum MapAccess {
    ReadOnly = 0,
    WriteOnly = 1,
    ReadWrite = 2,
    WriteDiscard = 3,
}

impl MapAccess {
    /// Parses an access mode from its raw word.
    pub fn parse(value: u32) -> WireResult<Self> {
        match value {
            0 => Ok(Self::ReadOnly),
            1 => Ok(Self::WriteOnly),
            2 => Ok(Self::ReadWrite),
            3 => Ok(Self::WriteDiscard),
            _ => Err(DecodeError::InvalidEnum {
                kind: "map access",
                value,
            }),
        }
    }

    /// Returns `true` if the host may have written through the mapping.
    #[must_use]
    pub const fn is_writable(self) -> bool {
        !matches!(self, Self::ReadOnly)
    }
}

impl Codec for MapAccess {
    fn encode(&self, out: &mut ByteWriter) -> Result<(), EncodeError> {
        out.write_u32(*self as u32);
        Ok(())
    }

    fn decode(input: &mut ByteReader<'_>, _limits: &Limits) -> WireResult<Self> {
        Self::parse(input.read_u32()?)
    }
}

/// Render target attachment of a render pass.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RenderTargetDesc {
    pub view: Handle,
    pub load_op: u32,
    pub store_op: u32,
    pub clear_color: [f32; 4],
}

impl Codec for RenderTargetDesc {
    fn encode(&self, out: &mut ByteWriter) -> Result<(), EncodeError> {
        out.write_u64(self.view.raw());
        out.write_u32(self.load_op);
        out.write_u32(self.store_op);
        write_f32x4(self.clear_color, out);
        Ok(())
    }

    fn decode(input: &mut ByteReader<'_>, _limits: &Limits) -> WireResult<Self> {
        Ok(Self {
            view: Handle::new(input.read_u64()?),
            load_op: input.read_u32()?,
            store_op: input.read_u32()?,
            clear_color: read_f32x4(input)?,
        })
    }
}

/// Depth-stencil attachment of a render pass.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DepthStencilAttachment {
    pub view: Handle,
    pub depth_load_op: u32,
    pub depth_store_op: u32,
    pub stencil_load_op: u32,
    pub stencil_store_op: u32,
    pub clear_depth: f32,
    pub clear_stencil: u8,
}

impl Codec for DepthStencilAttachment {
    fn encode(&self, out: &mut ByteWriter) -> Result<(), EncodeError> {
        out.write_u64(self.view.raw());
        out.write_u32(self.depth_load_op);
        out.write_u32(self.depth_store_op);
        out.write_u32(self.stencil_load_op);
        out.write_u32(self.stencil_store_op);
        out.write_f32(self.clear_depth);
        out.write_u8(self.clear_stencil);
        Ok(())
    }

    fn decode(input: &mut ByteReader<'_>, _limits: &Limits) -> WireResult<Self> {
        Ok(Self {
            view: Handle::new(input.read_u64()?),
            depth_load_op: input.read_u32()?,
            depth_store_op: input.read_u32()?,
            stencil_load_op: input.read_u32()?,
            stencil_store_op: input.read_u32()?,
            clear_depth: input.read_f32()?,
            clear_stencil: input.read_u8()?,
        })
    }
}

/// One resource state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ResourceBarrier {
    pub resource: Handle,
    pub old_state: ResourceUsage,
    pub new_state: ResourceUsage,
}

impl Codec for ResourceBarrier {
    fn encode(&self, out: &mut ByteWriter) -> Result<(), EncodeError> {
        out.write_u64(self.resource.raw());
        out.write_u32(self.old_state.raw());
        out.write_u32(self.new_state.raw());
        Ok(())
    }

    fn decode(input: &mut ByteReader<'_>, _limits: &Limits) -> WireResult<Self> {
        Ok(Self {
            resource: Handle::new(input.read_u64()?),
            old_state: ResourceUsage::from_raw(input.read_u32()?),
            new_state: ResourceUsage::from_raw(input.read_u32()?),
        })
    }
}

/// A dynamic pipeline state and its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DynamicStateValue {
    pub state: u32,
    pub value: u32,
}

impl Codec for DynamicStateValue {
    fn encode(&self, out: &mut ByteWriter) -> Result<(), EncodeError> {
        out.write_u32(self.state);
        out.write_u32(self.value);
        Ok(())
    }

    fn decode(input: &mut ByteReader<'_>, _limits: &Limits) -> WireResult<Self> {
        Ok(Self {
            state: input.read_u32()?,
            value: input.read_u32()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct VertexBufferBinding {
    pub buffer: Handle,
    pub offset: u64,
    pub stride: u32,
}

impl Codec for VertexBufferBinding {
    fn encode(&self, out: &mut ByteWriter) -> Result<(), EncodeError> {
        out.write_u64(self.buffer.raw());
        out.write_u64(self.offset);
        out.write_u32(self.stride);
        Ok(())
    }

    fn decode(input: &mut ByteReader<'_>, _limits: &Limits) -> WireResult<Self> {
        Ok(Self {
            buffer: Handle::new(input.read_u64()?),
            offset: input.read_u64()?,
            stride: input.read_u32()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StreamOutputBinding {
    pub buffer: Handle,
    pub offset: u64,
    pub max_size: u64,
    pub counter_buffer: Handle,
    pub counter_offset: u64,
}

impl Codec for StreamOutputBinding {
    fn encode(&self, out: &mut ByteWriter) -> Result<(), EncodeError> {
        out.write_u64(self.buffer.raw());
        out.write_u64(self.offset);
        out.write_u64(self.max_size);
        out.write_u64(self.counter_buffer.raw());
        out.write_u64(self.counter_offset);
        Ok(())
    }

    fn decode(input: &mut ByteReader<'_>, _limits: &Limits) -> WireResult<Self> {
        Ok(Self {
            buffer: Handle::new(input.read_u64()?),
            offset: input.read_u64()?,
            max_size: input.read_u64()?,
            counter_buffer: Handle::new(input.read_u64()?),
            counter_offset: input.read_u64()?,
        })
    }
}
