//! Pipeline descriptions assembled from recorded sub-objects.

use wire::{
    BlendDesc, DepthStencilDesc, InputElement, PipelineStateTag, PipelineSubobject, RasterizerDesc,
    ShaderDesc, ShaderStage,
};

/// Everything a pipeline creation call needs, one slot per sub-object kind.
///
/// State-only sub-objects carry no recorded values; they are kept as tags so
/// a backend can tell they were present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineDesc {
    pub shaders: [Option<ShaderDesc>; 6],
    pub input_layout: Vec<InputElement>,
    pub blend_state: Option<BlendDesc>,
    pub rasterizer_state: Option<RasterizerDesc>,
    pub depth_stencil_state: Option<DepthStencilDesc>,
    pub state_tags: Vec<PipelineStateTag>,
}

impl PipelineDesc {
    /// Collects sub-objects in order; a later sub-object of the same kind wins.
    #[must_use]
    pub fn from_subobjects(subobjects: &[PipelineSubobject]) -> Self {
        let mut desc = Self::default();
        for subobject in subobjects {
            match subobject {
                PipelineSubobject::Shader(stage, shader) => {
                    desc.shaders[stage.index()] = Some(shader.clone());
                }
                PipelineSubobject::InputLayout(elements) => desc.input_layout.clone_from(elements),
                PipelineSubobject::BlendState(blend) => desc.blend_state = Some(*blend),
                PipelineSubobject::RasterizerState(raster) => desc.rasterizer_state = Some(*raster),
                PipelineSubobject::DepthStencilState(depth) => {
                    desc.depth_stencil_state = Some(*depth);
                }
                PipelineSubobject::State(tag) => desc.state_tags.push(*tag),
            }
        }
        desc
    }

    #[must_use]
    pub fn shader(&self, stage: ShaderStage) -> Option<&ShaderDesc> {
        self.shaders[stage.index()].as_ref()
    }

    /// Number of populated shader slots.
    #[must_use]
    pub fn shader_count(&self) -> usize {
        self.shaders.iter().flatten().count()
    }

    /// Returns `true` for a compute-only pipeline.
    #[must_use]
    pub fn is_compute(&self) -> bool {
        self.shader(ShaderStage::Compute).is_some() && self.shader_count() == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shader(code: &[u8], entry: &str) -> ShaderDesc {
        ShaderDesc {
            code: code.to_vec(),
            entry_point: entry.to_owned(),
        }
    }

    #[test]
    fn vertex_and_pixel_fill_two_slots() {
        let desc = PipelineDesc::from_subobjects(&[
            PipelineSubobject::Shader(ShaderStage::Vertex, shader(b"ABC", "main")),
            PipelineSubobject::Shader(ShaderStage::Pixel, shader(b"PS", "")),
        ]);

        assert_eq!(desc.shader_count(), 2);
        assert_eq!(desc.shader(ShaderStage::Vertex), Some(&shader(b"ABC", "main")));
        assert_eq!(desc.shader(ShaderStage::Pixel).map(|s| s.code.as_slice()), Some(&b"PS"[..]));
        for stage in [ShaderStage::Hull, ShaderStage::Domain, ShaderStage::Geometry, ShaderStage::Compute] {
            assert!(desc.shader(stage).is_none());
        }
        assert!(desc.input_layout.is_empty());
        assert!(desc.blend_state.is_none());
    }

    #[test]
    fn state_tags_are_kept_without_values() {
        let desc = PipelineDesc::from_subobjects(&[
            PipelineSubobject::State(PipelineStateTag::PrimitiveTopology),
            PipelineSubobject::State(PipelineStateTag::SampleMask),
            PipelineSubobject::BlendState(BlendDesc::default()),
        ]);
        assert_eq!(
            desc.state_tags,
            vec![PipelineStateTag::PrimitiveTopology, PipelineStateTag::SampleMask]
        );
        assert_eq!(desc.blend_state, Some(BlendDesc::default()));
        assert_eq!(desc.shader_count(), 0);
    }

    #[test]
    fn compute_only() {
        let desc = PipelineDesc::from_subobjects(&[PipelineSubobject::Shader(
            ShaderStage::Compute,
            shader(b"CS", "main"),
        )]);
        assert!(desc.is_compute());
    }
}
