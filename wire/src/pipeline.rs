//! Pipeline sub-objects and pipeline layout parameters.

use bytestream::{ByteReader, ByteWriter};

use crate::codec::{
    read_blob, read_f32x4, read_list, read_string, write_blob, write_f32x4, write_list,
    write_string, Codec,
};
use crate::error::{DecodeError, EncodeError, WireResult};
use crate::format::Format;
use crate::limits::Limits;
use crate::types::SamplerDesc;

/// Programmable stage a shader sub-object feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum ShaderStage {
    Vertex,
    Hull,
    Domain,
    Geometry,
    Pixel,
    Compute,
}

impl ShaderStage {
    /// All stages in slot order.
    pub const ALL: [Self; 6] = [
        Self::Vertex,
        Self::Hull,
        Self::Domain,
        Self::Geometry,
        Self::Pixel,
        Self::Compute,
    ];

    /// Slot index of this stage inside a pipeline description.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Shader bytecode and entry point. An empty entry point means the default.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ShaderDesc {
    pub code: Vec<u8>,
    pub entry_point: String,
}

impl Codec for ShaderDesc {
    fn encode(&self, out: &mut ByteWriter) -> Result<(), EncodeError> {
        write_blob(&self.code, out);
        write_string(&self.entry_point, out)
    }

    fn decode(input: &mut ByteReader<'_>, limits: &Limits) -> WireResult<Self> {
        Ok(Self {
            code: read_blob(input, limits)?,
            entry_point: read_string(input, limits, "entry point")?,
        })
    }
}

/// One vertex input element.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct InputElement {
    pub location: u32,
    pub semantic: String,
    pub semantic_index: u32,
    pub format: Format,
    pub buffer_binding: u32,
    pub offset: u32,
    pub stride: u32,
    pub instance_step_rate: u32,
}

impl Codec for InputElement {
    fn encode(&self, out: &mut ByteWriter) -> Result<(), EncodeError> {
        out.write_u32(self.location);
        write_string(&self.semantic, out)?;
        out.write_u32(self.semantic_index);
        out.write_u32(self.format.raw());
        out.write_u32(self.buffer_binding);
        out.write_u32(self.offset);
        out.write_u32(self.stride);
        out.write_u32(self.instance_step_rate);
        Ok(())
    }

    fn decode(input: &mut ByteReader<'_>, limits: &Limits) -> WireResult<Self> {
        Ok(Self {
            location: input.read_u32()?,
            semantic: read_string(input, limits, "semantic")?,
            semantic_index: input.read_u32()?,
            format: Format::new(input.read_u32()?),
            buffer_binding: input.read_u32()?,
            offset: input.read_u32()?,
            stride: input.read_u32()?,
            instance_step_rate: input.read_u32()?,
        })
    }
}

/// Blend configuration of one render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RenderTargetBlend {
    pub blend_enable: bool,
    pub logic_op_enable: bool,
    pub source_color_factor: u32,
    pub dest_color_factor: u32,
    pub color_op: u32,
    pub source_alpha_factor: u32,
    pub dest_alpha_factor: u32,
    pub alpha_op: u32,
    pub logic_op: u32,
    pub write_mask: u8,
}

/// Output merger blend state for all eight render targets.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BlendDesc {
    pub alpha_to_coverage_enable: bool,
    pub blend_constant: [f32; 4],
    pub targets: [RenderTargetBlend; 8],
}

impl Codec for BlendDesc {
    fn encode(&self, out: &mut ByteWriter) -> Result<(), EncodeError> {
        out.write_bool(self.alpha_to_coverage_enable);
        write_f32x4(self.blend_constant, out);
        for target in &self.targets {
            out.write_bool(target.blend_enable);
            out.write_bool(target.logic_op_enable);
            out.write_u32(target.source_color_factor);
            out.write_u32(target.dest_color_factor);
            out.write_u32(target.color_op);
            out.write_u32(target.source_alpha_factor);
            out.write_u32(target.dest_alpha_factor);
            out.write_u32(target.alpha_op);
            out.write_u32(target.logic_op);
            out.write_u8(target.write_mask);
        }
        Ok(())
    }

    fn decode(input: &mut ByteReader<'_>, _limits: &Limits) -> WireResult<Self> {
        let alpha_to_coverage_enable = input.read_bool()?;
        let blend_constant = read_f32x4(input)?;
        let mut targets = [RenderTargetBlend::default(); 8];
        for target in &mut targets {
            *target = RenderTargetBlend {
                blend_enable: input.read_bool()?,
                logic_op_enable: input.read_bool()?,
                source_color_factor: input.read_u32()?,
                dest_color_factor: input.read_u32()?,
                color_op: input.read_u32()?,
                source_alpha_factor: input.read_u32()?,
                dest_alpha_factor: input.read_u32()?,
                alpha_op: input.read_u32()?,
                logic_op: input.read_u32()?,
                write_mask: input.read_u8()?,
            };
        }
        Ok(Self {
            alpha_to_coverage_enable,
            blend_constant,
            targets,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RasterizerDesc {
    pub fill_mode: u32,
    pub cull_mode: u32,
    pub front_counter_clockwise: bool,
    pub depth_bias: f32,
    pub depth_bias_clamp: f32,
    pub slope_scaled_depth_bias: f32,
    pub depth_clip_enable: bool,
    pub scissor_enable: bool,
    pub multisample_enable: bool,
    pub antialiased_line_enable: bool,
    pub conservative_rasterization: u32,
}

impl Codec for RasterizerDesc {
    fn encode(&self, out: &mut ByteWriter) -> Result<(), EncodeError> {
        out.write_u32(self.fill_mode);
        out.write_u32(self.cull_mode);
        out.write_bool(self.front_counter_clockwise);
        out.write_f32(self.depth_bias);
        out.write_f32(self.depth_bias_clamp);
        out.write_f32(self.slope_scaled_depth_bias);
        out.write_bool(self.depth_clip_enable);
        out.write_bool(self.scissor_enable);
        out.write_bool(self.multisample_enable);
        out.write_bool(self.antialiased_line_enable);
        out.write_u32(self.conservative_rasterization);
        Ok(())
    }

    fn decode(input: &mut ByteReader<'_>, _limits: &Limits) -> WireResult<Self> {
        Ok(Self {
            fill_mode: input.read_u32()?,
            cull_mode: input.read_u32()?,
            front_counter_clockwise: input.read_bool()?,
            depth_bias: input.read_f32()?,
            depth_bias_clamp: input.read_f32()?,
            slope_scaled_depth_bias: input.read_f32()?,
            depth_clip_enable: input.read_bool()?,
            scissor_enable: input.read_bool()?,
            multisample_enable: input.read_bool()?,
            antialiased_line_enable: input.read_bool()?,
            conservative_rasterization: input.read_u32()?,
        })
    }
}

/// Stencil operations for one face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StencilFace {
    pub fail_op: u32,
    pub depth_fail_op: u32,
    pub pass_op: u32,
    pub func: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DepthStencilDesc {
    pub depth_enable: bool,
    pub depth_write_enable: bool,
    pub depth_func: u32,
    pub stencil_enable: bool,
    pub stencil_read_mask: u8,
    pub stencil_write_mask: u8,
    pub stencil_reference: u8,
    pub front_face: StencilFace,
    pub back_face: StencilFace,
}

impl Codec for DepthStencilDesc {
    fn encode(&self, out: &mut ByteWriter) -> Result<(), EncodeError> {
        out.write_bool(self.depth_enable);
        out.write_bool(self.depth_write_enable);
        out.write_u32(self.depth_func);
        out.write_bool(self.stencil_enable);
        out.write_u8(self.stencil_read_mask);
        out.write_u8(self.stencil_write_mask);
        out.write_u8(self.stencil_reference);
        for face in [&self.front_face, &self.back_face] {
            out.write_u32(face.fail_op);
            out.write_u32(face.depth_fail_op);
            out.write_u32(face.pass_op);
            out.write_u32(face.func);
        }
        Ok(())
    }

    fn decode(input: &mut ByteReader<'_>, _limits: &Limits) -> WireResult<Self> {
        let depth_enable = input.read_bool()?;
        let depth_write_enable = input.read_bool()?;
        let depth_func = input.read_u32()?;
        let stencil_enable = input.read_bool()?;
        let stencil_read_mask = input.read_u8()?;
        let stencil_write_mask = input.read_u8()?;
        let stencil_reference = input.read_u8()?;
        let mut faces = [StencilFace::default(); 2];
        for face in &mut faces {
            *face = StencilFace {
                fail_op: input.read_u32()?,
                depth_fail_op: input.read_u32()?,
                pass_op: input.read_u32()?,
                func: input.read_u32()?,
            };
        }
        Ok(Self {
            depth_enable,
            depth_write_enable,
            depth_func,
            stencil_enable,
            stencil_read_mask,
            stencil_write_mask,
            stencil_reference,
            front_face: faces[0],
            back_face: faces[1],
        })
    }
}

/// Sub-objects that are recorded by kind only; their values are not captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum PipelineStateTag {
    StreamOutput,
    PrimitiveTopology,
    DepthStencilFormat,
    RenderTargetFormats,
    SampleMask,
    SampleCount,
    ViewportCount,
    DynamicPipelineStates,
    MaxVertexCount,
}

/// One element of a pipeline creation call.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum PipelineSubobject {
    Shader(ShaderStage, ShaderDesc),
    InputLayout(Vec<InputElement>),
    BlendState(BlendDesc),
    RasterizerState(RasterizerDesc),
    DepthStencilState(DepthStencilDesc),
    State(PipelineStateTag),
}

impl PipelineSubobject {
    const SHADER_BASE: u32 = 1;
    const STREAM_OUTPUT: u32 = 7;
    const BLEND: u32 = 8;
    const RASTERIZER: u32 = 9;
    const DEPTH_STENCIL: u32 = 10;
    const INPUT_LAYOUT: u32 = 11;
    const DEPTH_STENCIL_FORMAT: u32 = 12;
    const RENDER_TARGET_FORMATS: u32 = 13;
    const SAMPLE_MASK: u32 = 14;
    const SAMPLE_COUNT: u32 = 15;
    const VIEWPORT_COUNT: u32 = 16;
    const PRIMITIVE_TOPOLOGY: u32 = 17;
    const DYNAMIC_STATES: u32 = 18;
    const MAX_VERTEX_COUNT: u32 = 19;

    /// Raw sub-object type word.
    #[must_use]
    pub const fn type_code(&self) -> u32 {
        match self {
            Self::Shader(stage, _) => Self::SHADER_BASE + *stage as u32,
            Self::InputLayout(_) => Self::INPUT_LAYOUT,
            Self::BlendState(_) => Self::BLEND,
            Self::RasterizerState(_) => Self::RASTERIZER,
            Self::DepthStencilState(_) => Self::DEPTH_STENCIL,
            Self::State(tag) => match tag {
                PipelineStateTag::StreamOutput => Self::STREAM_OUTPUT,
                PipelineStateTag::PrimitiveTopology => Self::PRIMITIVE_TOPOLOGY,
                PipelineStateTag::DepthStencilFormat => Self::DEPTH_STENCIL_FORMAT,
                PipelineStateTag::RenderTargetFormats => Self::RENDER_TARGET_FORMATS,
                PipelineStateTag::SampleMask => Self::SAMPLE_MASK,
                PipelineStateTag::SampleCount => Self::SAMPLE_COUNT,
                PipelineStateTag::ViewportCount => Self::VIEWPORT_COUNT,
                PipelineStateTag::DynamicPipelineStates => Self::DYNAMIC_STATES,
                PipelineStateTag::MaxVertexCount => Self::MAX_VERTEX_COUNT,
            },
        }
    }
}

impl Codec for PipelineSubobject {
    fn encode(&self, out: &mut ByteWriter) -> Result<(), EncodeError> {
        out.write_u32(self.type_code());
        match self {
            Self::Shader(_, desc) => desc.encode(out),
            Self::InputLayout(elements) => write_list(elements, out),
            Self::BlendState(desc) => desc.encode(out),
            Self::RasterizerState(desc) => desc.encode(out),
            Self::DepthStencilState(desc) => desc.encode(out),
            Self::State(_) => Ok(()),
        }
    }

    fn decode(input: &mut ByteReader<'_>, limits: &Limits) -> WireResult<Self> {
        let code = input.read_u32()?;
        let tag = |tag| -> WireResult<Self> { Ok(Self::State(tag)) };
        match code {
            1..=6 => {
                let stage = ShaderStage::ALL[(code - Self::SHADER_BASE) as usize];
                Ok(Self::Shader(stage, ShaderDesc::decode(input, limits)?))
            }
            Self::INPUT_LAYOUT => Ok(Self::InputLayout(read_list(input, limits)?)),
            Self::BLEND => Ok(Self::BlendState(BlendDesc::decode(input, limits)?)),
            Self::RASTERIZER => Ok(Self::RasterizerState(RasterizerDesc::decode(
                input, limits,
            )?)),
            Self::DEPTH_STENCIL => Ok(Self::DepthStencilState(DepthStencilDesc::decode(
                input, limits,
            )?)),
            Self::STREAM_OUTPUT => tag(PipelineStateTag::StreamOutput),
            Self::PRIMITIVE_TOPOLOGY => tag(PipelineStateTag::PrimitiveTopology),
            Self::DEPTH_STENCIL_FORMAT => tag(PipelineStateTag::DepthStencilFormat),
            Self::RENDER_TARGET_FORMATS => tag(PipelineStateTag::RenderTargetFormats),
            Self::SAMPLE_MASK => tag(PipelineStateTag::SampleMask),
            Self::SAMPLE_COUNT => tag(PipelineStateTag::SampleCount),
            Self::VIEWPORT_COUNT => tag(PipelineStateTag::ViewportCount),
            Self::DYNAMIC_STATES => tag(PipelineStateTag::DynamicPipelineStates),
            Self::MAX_VERTEX_COUNT => tag(PipelineStateTag::MaxVertexCount),
            value => Err(DecodeError::InvalidEnum {
                kind: "pipeline subobject type",
                value,
            }),
        }
    }
}

/// Push constant range of a pipeline layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PushConstantRange {
    pub offset: u32,
    pub binding: u32,
    pub dx_register_index: u32,
    pub dx_register_space: u32,
    pub count: u32,
    pub visibility: u32,
}

impl Codec for PushConstantRange {
    fn encode(&self, out: &mut ByteWriter) -> Result<(), EncodeError> {
        out.write_u32(self.offset);
        out.write_u32(self.binding);
        out.write_u32(self.dx_register_index);
        out.write_u32(self.dx_register_space);
        out.write_u32(self.count);
        out.write_u32(self.visibility);
        Ok(())
    }

    fn decode(input: &mut ByteReader<'_>, _limits: &Limits) -> WireResult<Self> {
        Ok(Self {
            offset: input.read_u32()?,
            binding: input.read_u32()?,
            dx_register_index: input.read_u32()?,
            dx_register_space: input.read_u32()?,
            count: input.read_u32()?,
            visibility: input.read_u32()?,
        })
    }
}

/// Range of descriptors in a table or push-descriptor parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DescriptorRange {
    pub binding: u32,
    pub dx_register_index: u32,
    pub dx_register_space: u32,
    pub count: u32,
    pub array_size: u32,
    /// Raw descriptor type, including kinds never seen in updates.
    pub descriptor_type: u32,
    pub visibility: u32,
}

impl Codec for DescriptorRange {
    fn encode(&self, out: &mut ByteWriter) -> Result<(), EncodeError> {
        out.write_u32(self.binding);
        out.write_u32(self.dx_register_index);
        out.write_u32(self.dx_register_space);
        out.write_u32(self.count);
        out.write_u32(self.array_size);
        out.write_u32(self.descriptor_type);
        out.write_u32(self.visibility);
        Ok(())
    }

    fn decode(input: &mut ByteReader<'_>, _limits: &Limits) -> WireResult<Self> {
        Ok(Self {
            binding: input.read_u32()?,
            dx_register_index: input.read_u32()?,
            dx_register_space: input.read_u32()?,
            count: input.read_u32()?,
            array_size: input.read_u32()?,
            descriptor_type: input.read_u32()?,
            visibility: input.read_u32()?,
        })
    }
}

/// Descriptor range with immutable samplers baked into the layout.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StaticSamplerRange {
    pub range: DescriptorRange,
    pub static_samplers: Vec<SamplerDesc>,
}

impl Codec for StaticSamplerRange {
    fn encode(&self, out: &mut ByteWriter) -> Result<(), EncodeError> {
        self.range.encode(out)?;
        write_list(&self.static_samplers, out)
    }

    fn decode(input: &mut ByteReader<'_>, limits: &Limits) -> WireResult<Self> {
        Ok(Self {
            range: DescriptorRange::decode(input, limits)?,
            static_samplers: read_list(input, limits)?,
        })
    }
}

/// One parameter of a pipeline layout.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum PipelineLayoutParam {
    DescriptorTable(Vec<DescriptorRange>),
    PushConstants(PushConstantRange),
    PushDescriptors(DescriptorRange),
    PushDescriptorsWithRanges(Vec<DescriptorRange>),
    DescriptorTableWithStaticSamplers(Vec<StaticSamplerRange>),
    PushDescriptorsWithStaticSamplers(Vec<StaticSamplerRange>),
}

impl PipelineLayoutParam {
    /// Raw parameter type word.
    #[must_use]
    pub const fn type_code(&self) -> u32 {
        match self {
            Self::DescriptorTable(_) => 0,
            Self::PushConstants(_) => 1,
            Self::PushDescriptors(_) => 2,
            Self::PushDescriptorsWithRanges(_) => 3,
            Self::DescriptorTableWithStaticSamplers(_) => 4,
            Self::PushDescriptorsWithStaticSamplers(_) => 5,
        }
    }
}

impl Codec for PipelineLayoutParam {
    fn encode(&self, out: &mut ByteWriter) -> Result<(), EncodeError> {
        out.write_u32(self.type_code());
        match self {
            Self::PushConstants(range) => range.encode(out),
            Self::PushDescriptors(range) => range.encode(out),
            Self::DescriptorTable(ranges) | Self::PushDescriptorsWithRanges(ranges) => {
                write_list(ranges, out)
            }
            Self::DescriptorTableWithStaticSamplers(ranges)
            | Self::PushDescriptorsWithStaticSamplers(ranges) => write_list(ranges, out),
        }
    }

    fn decode(input: &mut ByteReader<'_>, limits: &Limits) -> WireResult<Self> {
        match input.read_u32()? {
            0 => Ok(Self::DescriptorTable(read_list(input, limits)?)),
            1 => Ok(Self::PushConstants(PushConstantRange::decode(input, limits)?)),
            2 => Ok(Self::PushDescriptors(DescriptorRange::decode(input, limits)?)),
            3 => Ok(Self::PushDescriptorsWithRanges(read_list(input, limits)?)),
            4 => Ok(Self::DescriptorTableWithStaticSamplers(read_list(
                input, limits,
            )?)),
            5 => Ok(Self::PushDescriptorsWithStaticSamplers(read_list(
                input, limits,
            )?)),
            value => Err(DecodeError::InvalidEnum {
                kind: "pipeline layout param type",
                value,
            }),
        }
    }
}
