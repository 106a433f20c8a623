//! The live graphics backend seam.
//!
//! The dispatcher resolves every recorded handle before calling into these
//! traits, so implementations only ever see live objects (or null).

use wire::{
    DeviceApi, DynamicStateValue, Format, MapAccess, PipelineLayoutParam, Rect, ResourceDesc,
    ResourceUsage, ResourceViewDesc, SamplerDesc, SubresourceBox, SubresourceData, Viewport,
};

use crate::handles::{DescriptorTable, Pipeline, PipelineLayout, Resource, ResourceView, Sampler};
use crate::pipeline::PipelineDesc;

/// Result type for device object creation.
pub type DeviceResult<T> = Result<T, DeviceError>;

/// Failures reported by a backend when creating objects.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    #[error("invalid {kind} description: {reason}")]
    InvalidDescription { kind: &'static str, reason: String },

    #[error("out of memory creating {kind}")]
    OutOfMemory { kind: &'static str },

    #[error("{operation} is not supported by this backend")]
    Unsupported { operation: &'static str },
}

/// A buffer and a byte offset into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferLocation {
    pub resource: Resource,
    pub offset: u64,
}

/// A texture subresource and an optional region inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureLocation {
    pub resource: Resource,
    pub subresource: u32,
    pub region: Option<SubresourceBox>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveBarrier {
    pub resource: Resource,
    pub old_state: ResourceUsage,
    pub new_state: ResourceUsage,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiveRenderTarget {
    pub view: ResourceView,
    pub load_op: u32,
    pub store_op: u32,
    pub clear_color: [f32; 4],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiveDepthStencil {
    pub view: ResourceView,
    pub depth_load_op: u32,
    pub depth_store_op: u32,
    pub stencil_load_op: u32,
    pub stencil_store_op: u32,
    pub clear_depth: f32,
    pub clear_stencil: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveVertexBuffer {
    pub buffer: Resource,
    pub offset: u64,
    pub stride: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveStreamOutput {
    pub buffer: Resource,
    pub offset: u64,
    pub max_size: u64,
    pub counter_buffer: Resource,
    pub counter_offset: u64,
}

/// A constant buffer range; offset and size are passed through unresolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveBufferRange {
    pub buffer: Resource,
    pub offset: u64,
    pub size: u64,
}

/// Resolved descriptors of one kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveDescriptors {
    Samplers(Vec<Sampler>),
    SamplersWithViews(Vec<(Sampler, ResourceView)>),
    ShaderResourceViews(Vec<ResourceView>),
    UnorderedAccessViews(Vec<ResourceView>),
    ConstantBuffers(Vec<LiveBufferRange>),
    ShaderStorageBuffers(Vec<ResourceView>),
}

impl LiveDescriptors {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Samplers(items) => items.len(),
            Self::SamplersWithViews(items) => items.len(),
            Self::ShaderResourceViews(items)
            | Self::UnorderedAccessViews(items)
            | Self::ShaderStorageBuffers(items) => items.len(),
            Self::ConstantBuffers(items) => items.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveTableUpdate {
    pub table: DescriptorTable,
    pub binding: u32,
    pub array_offset: u32,
    pub descriptors: LiveDescriptors,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveTableCopy {
    pub source_table: DescriptorTable,
    pub source_binding: u32,
    pub source_array_offset: u32,
    pub dest_table: DescriptorTable,
    pub dest_binding: u32,
    pub dest_array_offset: u32,
    pub count: u32,
}

/// Object lifecycle and resource uploads on a live device.
pub trait Device {
    /// Command list that recording operations are issued on.
    type Commands: CommandList;

    fn api(&self) -> DeviceApi;

    /// The immediate command list.
    fn commands(&mut self) -> &mut Self::Commands;

    /// Number of back buffers of the replay swapchain.
    fn back_buffer_count(&self) -> u32;

    fn back_buffer(&self, index: u32) -> Resource;

    /// Back buffer the next present shows.
    fn current_back_buffer(&self) -> Resource;

    /// Shows the current back buffer; called once per replayed frame.
    fn present(&mut self) {}

    fn create_sampler(&mut self, desc: &SamplerDesc) -> DeviceResult<Sampler>;
    fn destroy_sampler(&mut self, sampler: Sampler);

    fn create_resource(
        &mut self,
        desc: &ResourceDesc,
        initial_data: &[SubresourceData],
        initial_state: ResourceUsage,
    ) -> DeviceResult<Resource>;
    fn destroy_resource(&mut self, resource: Resource);

    fn create_resource_view(
        &mut self,
        resource: Resource,
        usage: ResourceUsage,
        desc: &ResourceViewDesc,
    ) -> DeviceResult<ResourceView>;
    fn destroy_resource_view(&mut self, view: ResourceView);

    fn create_pipeline(&mut self, layout: PipelineLayout, desc: &PipelineDesc) -> DeviceResult<Pipeline>;
    fn destroy_pipeline(&mut self, pipeline: Pipeline);

    fn create_pipeline_layout(&mut self, params: &[PipelineLayoutParam]) -> DeviceResult<PipelineLayout>;
    fn destroy_pipeline_layout(&mut self, layout: PipelineLayout);

    fn copy_descriptor_tables(&mut self, copies: &[LiveTableCopy]);
    fn update_descriptor_tables(&mut self, updates: &[LiveTableUpdate]);

    /// Maps a buffer range for CPU access. `None` if the map failed.
    fn map_buffer_region(
        &mut self,
        resource: Resource,
        offset: u64,
        size: u64,
        access: MapAccess,
    ) -> Option<&mut [u8]>;
    fn unmap_buffer_region(&mut self, resource: Resource);

    /// Maps a texture subresource for CPU access. `None` if the map failed.
    fn map_texture_region(
        &mut self,
        resource: Resource,
        subresource: u32,
        region: Option<&SubresourceBox>,
        access: MapAccess,
    ) -> Option<&mut [u8]>;
    fn unmap_texture_region(&mut self, resource: Resource, subresource: u32);

    fn update_buffer_region(&mut self, data: &[u8], resource: Resource, offset: u64);
    fn update_texture_region(
        &mut self,
        data: &SubresourceData,
        resource: Resource,
        subresource: u32,
        region: Option<&SubresourceBox>,
    );
}

/// Command recording on a live command list.
pub trait CommandList {
    fn barrier(&mut self, barriers: &[LiveBarrier]);

    fn begin_render_pass(
        &mut self,
        render_targets: &[LiveRenderTarget],
        depth_stencil: Option<&LiveDepthStencil>,
    );
    fn end_render_pass(&mut self);
    fn bind_render_targets_and_depth_stencil(
        &mut self,
        render_targets: &[ResourceView],
        depth_stencil: ResourceView,
    );

    fn bind_pipeline(&mut self, stages: u32, pipeline: Pipeline);
    fn bind_pipeline_states(&mut self, states: &[DynamicStateValue]);
    fn bind_viewports(&mut self, first: u32, viewports: &[Viewport]);
    fn bind_scissor_rects(&mut self, first: u32, rects: &[Rect]);

    fn push_constants(
        &mut self,
        stages: u32,
        layout: PipelineLayout,
        param_index: u32,
        first: u32,
        values: &[u32],
    );
    fn push_descriptors(
        &mut self,
        stages: u32,
        layout: PipelineLayout,
        param_index: u32,
        update: &LiveTableUpdate,
    );
    fn bind_descriptor_tables(
        &mut self,
        stages: u32,
        layout: PipelineLayout,
        first: u32,
        tables: &[DescriptorTable],
    );

    fn bind_index_buffer(&mut self, buffer: Resource, offset: u64, index_size: u32);
    fn bind_vertex_buffers(&mut self, first: u32, buffers: &[LiveVertexBuffer]);
    fn bind_stream_output_buffers(&mut self, first: u32, buffers: &[LiveStreamOutput]);

    fn draw(&mut self, vertex_count: u32, instance_count: u32, first_vertex: u32, first_instance: u32);
    fn draw_indexed(
        &mut self,
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        vertex_offset: i32,
        first_instance: u32,
    );
    fn dispatch(&mut self, group_count_x: u32, group_count_y: u32, group_count_z: u32);
    fn draw_or_dispatch_indirect(
        &mut self,
        command_type: u32,
        buffer: BufferLocation,
        draw_count: u32,
        stride: u32,
    );

    fn copy_resource(&mut self, source: Resource, dest: Resource);
    fn copy_buffer_region(&mut self, source: BufferLocation, dest: BufferLocation, size: u64);
    fn copy_buffer_to_texture(
        &mut self,
        source: BufferLocation,
        row_length: u32,
        slice_height: u32,
        dest: TextureLocation,
    );
    fn copy_texture_region(&mut self, source: TextureLocation, dest: TextureLocation, filter: u32);
    fn copy_texture_to_buffer(
        &mut self,
        source: TextureLocation,
        dest: BufferLocation,
        row_length: u32,
        slice_height: u32,
    );
    fn resolve_texture_region(
        &mut self,
        source: TextureLocation,
        dest: Resource,
        dest_subresource: u32,
        dest_origin: [i32; 3],
        format: Format,
    );

    fn clear_depth_stencil_view(&mut self, view: ResourceView, depth: Option<f32>, stencil: Option<u8>);
    fn clear_render_target_view(&mut self, view: ResourceView, color: [f32; 4]);
    fn clear_unordered_access_view_uint(&mut self, view: ResourceView, values: [u32; 4]);
    fn clear_unordered_access_view_float(&mut self, view: ResourceView, values: [f32; 4]);
    fn generate_mipmaps(&mut self, view: ResourceView);
}
