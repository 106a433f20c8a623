//! In-memory replay backend.
//!
//! Stores buffer and texture contents so replays can be checked without a
//! GPU. Buffers honour map, update and copy; textures keep the last bytes
//! written to each subresource. Command recording only counts operations.

use std::collections::HashMap;

use tracing::debug;
use wire::{
    packed_pitches, subresource_size, DeviceApi, DynamicStateValue, Format, MapAccess,
    PipelineLayoutParam, Rect, ResourceDesc, ResourceShape, ResourceUsage, ResourceViewDesc,
    SamplerDesc, SubresourceBox, SubresourceData, TextureDesc, TextureDimension, Viewport,
};

use crate::device::{
    BufferLocation, CommandList, Device, DeviceError, DeviceResult, LiveBarrier, LiveDepthStencil,
    LiveRenderTarget, LiveStreamOutput, LiveTableCopy, LiveTableUpdate, LiveVertexBuffer,
    TextureLocation,
};
use crate::handles::{
    DescriptorTable, LiveHandle, Pipeline, PipelineLayout, Resource, ResourceView, Sampler,
};
use crate::pipeline::PipelineDesc;

/// Largest single allocation the headless device accepts by default.
pub const DEFAULT_MAX_ALLOCATION: u64 = 1 << 30;

/// Operation counters of a [`HeadlessDevice`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeadlessCounters {
    pub draws: u64,
    pub dispatches: u64,
    pub indirect: u64,
    pub clears: u64,
    pub copies: u64,
    pub barriers: u64,
    pub render_passes: u64,
    pub binds: u64,
    pub descriptor_writes: u64,
    pub uploads: u64,
    pub maps: u64,
    pub presents: u64,
    /// Operations that received a null or unknown object.
    pub null_objects: u64,
}

#[derive(Debug, Clone)]
enum Storage {
    Buffer(Vec<u8>),
    Texture {
        texture: TextureDesc,
        subresources: Vec<Vec<u8>>,
    },
}

#[derive(Debug, Clone)]
struct HeadlessResource {
    desc: ResourceDesc,
    storage: Storage,
}

/// Replay backend that keeps everything in memory.
#[derive(Debug, Clone)]
pub struct HeadlessDevice {
    api: DeviceApi,
    next_id: u64,
    max_allocation: u64,
    back_buffers: Vec<Resource>,
    current_back_buffer: usize,
    samplers: HashMap<Sampler, SamplerDesc>,
    resources: HashMap<Resource, HeadlessResource>,
    views: HashMap<ResourceView, Resource>,
    pipelines: HashMap<Pipeline, PipelineDesc>,
    layouts: HashMap<PipelineLayout, Vec<PipelineLayoutParam>>,
    bound_pipeline: Pipeline,
    counters: HeadlessCounters,
}

impl HeadlessDevice {
    /// Creates a device with a swapchain of `back_buffers` RGBA8 images.
    #[must_use]
    pub fn new(api: DeviceApi, back_buffers: u32, width: u32, height: u32) -> Self {
        let mut device = Self {
            api,
            next_id: 1,
            max_allocation: DEFAULT_MAX_ALLOCATION,
            back_buffers: Vec::new(),
            current_back_buffer: 0,
            samplers: HashMap::new(),
            resources: HashMap::new(),
            views: HashMap::new(),
            pipelines: HashMap::new(),
            layouts: HashMap::new(),
            bound_pipeline: Pipeline::NULL,
            counters: HeadlessCounters::default(),
        };
        let desc = ResourceDesc::texture(
            TextureDimension::D2,
            width.max(1),
            height.max(1),
            1,
            1,
            Format::R8G8B8A8_UNORM,
            ResourceUsage::RENDER_TARGET,
        );
        for _ in 0..back_buffers.max(1) {
            let resource = Resource::new(device.allocate_id());
            device.resources.insert(resource, texture_resource(desc, &[]));
            device.back_buffers.push(resource);
        }
        device
    }

    /// Caps the size of a single buffer or texture.
    #[must_use]
    pub const fn with_max_allocation(mut self, bytes: u64) -> Self {
        self.max_allocation = bytes;
        self
    }

    #[must_use]
    pub const fn counters(&self) -> &HeadlessCounters {
        &self.counters
    }

    #[must_use]
    pub fn back_buffers(&self) -> &[Resource] {
        &self.back_buffers
    }

    /// Number of live objects, back buffers excluded.
    #[must_use]
    pub fn live_objects(&self) -> usize {
        self.samplers.len()
            + self.resources.len().saturating_sub(self.back_buffers.len())
            + self.views.len()
            + self.pipelines.len()
            + self.layouts.len()
    }

    #[must_use]
    pub fn is_live(&self, resource: Resource) -> bool {
        self.resources.contains_key(&resource)
    }

    #[must_use]
    pub fn resource_desc(&self, resource: Resource) -> Option<&ResourceDesc> {
        self.resources.get(&resource).map(|entry| &entry.desc)
    }

    /// Contents of a live buffer.
    #[must_use]
    pub fn buffer_data(&self, resource: Resource) -> Option<&[u8]> {
        match &self.resources.get(&resource)?.storage {
            Storage::Buffer(data) => Some(data),
            Storage::Texture { .. } => None,
        }
    }

    /// Last bytes written to a texture subresource.
    #[must_use]
    pub fn texture_data(&self, resource: Resource, subresource: u32) -> Option<&[u8]> {
        match &self.resources.get(&resource)?.storage {
            Storage::Texture { subresources, .. } => {
                subresources.get(subresource as usize).map(Vec::as_slice)
            }
            Storage::Buffer(_) => None,
        }
    }

    #[must_use]
    pub fn pipeline_desc(&self, pipeline: Pipeline) -> Option<&PipelineDesc> {
        self.pipelines.get(&pipeline)
    }

    /// Resource a live view refers to.
    #[must_use]
    pub fn view_resource(&self, view: ResourceView) -> Option<Resource> {
        self.views.get(&view).copied()
    }

    #[must_use]
    pub const fn bound_pipeline(&self) -> Pipeline {
        self.bound_pipeline
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn check_allocation(&self, bytes: u64) -> DeviceResult<()> {
        if bytes > self.max_allocation {
            return Err(DeviceError::OutOfMemory { kind: Resource::KIND });
        }
        Ok(())
    }

    fn buffer_mut(&mut self, resource: Resource) -> Option<&mut Vec<u8>> {
        match &mut self.resources.get_mut(&resource)?.storage {
            Storage::Buffer(data) => Some(data),
            Storage::Texture { .. } => None,
        }
    }

    fn note_null<K: LiveHandle>(&mut self, handle: K) {
        if handle.is_null() {
            self.counters.null_objects += 1;
        }
    }

    fn note_missing(&mut self, kind: &'static str, raw: u64) {
        self.counters.null_objects += 1;
        debug!(kind, handle = raw, "operation on unknown object");
    }
}

fn texture_resource(desc: ResourceDesc, initial_data: &[SubresourceData]) -> HeadlessResource {
    let storage = match desc.shape {
        ResourceShape::Texture(texture) => {
            let count = texture.subresource_count() as usize;
            let mut subresources: Vec<Vec<u8>> = initial_data
                .iter()
                .take(count)
                .map(|sub| sub.data.clone())
                .collect();
            subresources.resize_with(count, Vec::new);
            Storage::Texture {
                texture,
                subresources,
            }
        }
        ResourceShape::Buffer { size, .. } => Storage::Buffer(vec![0; usize::try_from(size).unwrap_or(0)]),
    };
    HeadlessResource { desc, storage }
}

/// Byte range `offset..offset + size` clamped to `len`; `None` if it starts past the end.
fn byte_range(len: usize, offset: u64, size: u64) -> Option<std::ops::Range<usize>> {
    let start = usize::try_from(offset).ok().filter(|start| *start <= len)?;
    let size = usize::try_from(size).unwrap_or(usize::MAX);
    Some(start..start.saturating_add(size).min(len))
}

impl Device for HeadlessDevice {
    type Commands = Self;

    fn api(&self) -> DeviceApi {
        self.api
    }

    fn commands(&mut self) -> &mut Self::Commands {
        self
    }

    fn back_buffer_count(&self) -> u32 {
        u32::try_from(self.back_buffers.len()).unwrap_or(u32::MAX)
    }

    fn back_buffer(&self, index: u32) -> Resource {
        self.back_buffers
            .get(index as usize)
            .copied()
            .unwrap_or(Resource::NULL)
    }

    fn current_back_buffer(&self) -> Resource {
        self.back_buffer(u32::try_from(self.current_back_buffer).unwrap_or(0))
    }

    fn present(&mut self) {
        self.counters.presents += 1;
        self.current_back_buffer = (self.current_back_buffer + 1) % self.back_buffers.len().max(1);
    }

    fn create_sampler(&mut self, desc: &SamplerDesc) -> DeviceResult<Sampler> {
        let sampler = Sampler::new(self.allocate_id());
        self.samplers.insert(sampler, *desc);
        Ok(sampler)
    }

    fn destroy_sampler(&mut self, sampler: Sampler) {
        if self.samplers.remove(&sampler).is_none() {
            self.note_missing(Sampler::KIND, sampler.raw());
        }
    }

    fn create_resource(
        &mut self,
        desc: &ResourceDesc,
        initial_data: &[SubresourceData],
        _initial_state: ResourceUsage,
    ) -> DeviceResult<Resource> {
        let entry = match desc.shape {
            ResourceShape::Buffer { size, .. } => {
                if size == 0 {
                    return Err(DeviceError::InvalidDescription {
                        kind: Resource::KIND,
                        reason: "zero-sized buffer".into(),
                    });
                }
                self.check_allocation(size)?;
                let mut entry = texture_resource(*desc, &[]);
                if let (Storage::Buffer(data), Some(initial)) = (&mut entry.storage, initial_data.first()) {
                    let len = data.len().min(initial.data.len());
                    data[..len].copy_from_slice(&initial.data[..len]);
                }
                entry
            }
            ResourceShape::Texture(texture) => {
                if texture.width == 0 || texture.height == 0 || texture.depth_or_layers == 0 {
                    return Err(DeviceError::InvalidDescription {
                        kind: Resource::KIND,
                        reason: format!(
                            "zero-sized texture {}x{}x{}",
                            texture.width, texture.height, texture.depth_or_layers
                        ),
                    });
                }
                let (_, slice) = packed_pitches(&texture, 0, None);
                self.check_allocation(u64::from(slice) * u64::from(texture.depth_or_layers))?;
                texture_resource(*desc, initial_data)
            }
        };
        let resource = Resource::new(self.allocate_id());
        self.resources.insert(resource, entry);
        Ok(resource)
    }

    fn destroy_resource(&mut self, resource: Resource) {
        if self.back_buffers.contains(&resource) {
            return;
        }
        if self.resources.remove(&resource).is_none() {
            self.note_missing(Resource::KIND, resource.raw());
        }
    }

    fn create_resource_view(
        &mut self,
        resource: Resource,
        _usage: ResourceUsage,
        _desc: &ResourceViewDesc,
    ) -> DeviceResult<ResourceView> {
        self.note_null(resource);
        let view = ResourceView::new(self.allocate_id());
        self.views.insert(view, resource);
        Ok(view)
    }

    fn destroy_resource_view(&mut self, view: ResourceView) {
        if self.views.remove(&view).is_none() {
            self.note_missing(ResourceView::KIND, view.raw());
        }
    }

    fn create_pipeline(&mut self, layout: PipelineLayout, desc: &PipelineDesc) -> DeviceResult<Pipeline> {
        if !layout.is_null() && !self.layouts.contains_key(&layout) {
            return Err(DeviceError::InvalidDescription {
                kind: Pipeline::KIND,
                reason: format!("unknown pipeline layout {:#x}", layout.raw()),
            });
        }
        let pipeline = Pipeline::new(self.allocate_id());
        self.pipelines.insert(pipeline, desc.clone());
        Ok(pipeline)
    }

    fn destroy_pipeline(&mut self, pipeline: Pipeline) {
        if self.pipelines.remove(&pipeline).is_none() {
            self.note_missing(Pipeline::KIND, pipeline.raw());
        }
    }

    fn create_pipeline_layout(&mut self, params: &[PipelineLayoutParam]) -> DeviceResult<PipelineLayout> {
        let layout = PipelineLayout::new(self.allocate_id());
        self.layouts.insert(layout, params.to_vec());
        Ok(layout)
    }

    fn destroy_pipeline_layout(&mut self, layout: PipelineLayout) {
        if self.layouts.remove(&layout).is_none() {
            self.note_missing(PipelineLayout::KIND, layout.raw());
        }
    }

    fn copy_descriptor_tables(&mut self, copies: &[LiveTableCopy]) {
        self.counters.descriptor_writes += copies.len() as u64;
    }

    fn update_descriptor_tables(&mut self, updates: &[LiveTableUpdate]) {
        self.counters.descriptor_writes += updates.len() as u64;
    }

    fn map_buffer_region(
        &mut self,
        resource: Resource,
        offset: u64,
        size: u64,
        _access: MapAccess,
    ) -> Option<&mut [u8]> {
        self.counters.maps += 1;
        let data = self.buffer_mut(resource)?;
        let range = byte_range(data.len(), offset, size)?;
        Some(&mut data[range])
    }

    fn unmap_buffer_region(&mut self, _resource: Resource) {}

    fn map_texture_region(
        &mut self,
        resource: Resource,
        subresource: u32,
        region: Option<&SubresourceBox>,
        _access: MapAccess,
    ) -> Option<&mut [u8]> {
        self.counters.maps += 1;
        let Storage::Texture {
            texture,
            subresources,
        } = &mut self.resources.get_mut(&resource)?.storage
        else {
            return None;
        };
        let (row, slice) = packed_pitches(texture, subresource, region);
        let size = subresource_size(texture, subresource, row, slice, region);
        let data = subresources.get_mut(subresource as usize)?;
        let size = usize::try_from(size).ok()?;
        if data.len() < size {
            data.resize(size, 0);
        }
        Some(data.as_mut_slice())
    }

    fn unmap_texture_region(&mut self, _resource: Resource, _subresource: u32) {}

    fn update_buffer_region(&mut self, data: &[u8], resource: Resource, offset: u64) {
        self.counters.uploads += 1;
        let Some(buffer) = self.buffer_mut(resource) else {
            self.note_missing(Resource::KIND, resource.raw());
            return;
        };
        if let Some(range) = byte_range(buffer.len(), offset, data.len() as u64) {
            let len = range.len();
            buffer[range].copy_from_slice(&data[..len]);
        }
    }

    fn update_texture_region(
        &mut self,
        data: &SubresourceData,
        resource: Resource,
        subresource: u32,
        _region: Option<&SubresourceBox>,
    ) {
        self.counters.uploads += 1;
        let slot = match self.resources.get_mut(&resource).map(|entry| &mut entry.storage) {
            Some(Storage::Texture { subresources, .. }) => subresources.get_mut(subresource as usize),
            _ => None,
        };
        match slot {
            Some(slot) => slot.clone_from(&data.data),
            None => self.note_missing(Resource::KIND, resource.raw()),
        }
    }
}

impl CommandList for HeadlessDevice {
    fn barrier(&mut self, barriers: &[LiveBarrier]) {
        self.counters.barriers += barriers.len() as u64;
    }

    fn begin_render_pass(
        &mut self,
        render_targets: &[LiveRenderTarget],
        depth_stencil: Option<&LiveDepthStencil>,
    ) {
        self.counters.render_passes += 1;
        for target in render_targets {
            self.note_null(target.view);
        }
        if let Some(depth_stencil) = depth_stencil {
            self.note_null(depth_stencil.view);
        }
    }

    fn end_render_pass(&mut self) {}

    fn bind_render_targets_and_depth_stencil(
        &mut self,
        _render_targets: &[ResourceView],
        _depth_stencil: ResourceView,
    ) {
        self.counters.binds += 1;
    }

    fn bind_pipeline(&mut self, _stages: u32, pipeline: Pipeline) {
        self.counters.binds += 1;
        self.note_null(pipeline);
        self.bound_pipeline = pipeline;
    }

    fn bind_pipeline_states(&mut self, _states: &[DynamicStateValue]) {
        self.counters.binds += 1;
    }

    fn bind_viewports(&mut self, _first: u32, _viewports: &[Viewport]) {
        self.counters.binds += 1;
    }

    fn bind_scissor_rects(&mut self, _first: u32, _rects: &[Rect]) {
        self.counters.binds += 1;
    }

    fn push_constants(
        &mut self,
        _stages: u32,
        _layout: PipelineLayout,
        _param_index: u32,
        _first: u32,
        _values: &[u32],
    ) {
        self.counters.binds += 1;
    }

    fn push_descriptors(
        &mut self,
        _stages: u32,
        _layout: PipelineLayout,
        _param_index: u32,
        _update: &LiveTableUpdate,
    ) {
        self.counters.descriptor_writes += 1;
    }

    fn bind_descriptor_tables(
        &mut self,
        _stages: u32,
        _layout: PipelineLayout,
        _first: u32,
        _tables: &[DescriptorTable],
    ) {
        self.counters.binds += 1;
    }

    fn bind_index_buffer(&mut self, buffer: Resource, _offset: u64, _index_size: u32) {
        self.counters.binds += 1;
        self.note_null(buffer);
    }

    fn bind_vertex_buffers(&mut self, _first: u32, buffers: &[LiveVertexBuffer]) {
        self.counters.binds += 1;
        for binding in buffers {
            self.note_null(binding.buffer);
        }
    }

    fn bind_stream_output_buffers(&mut self, _first: u32, _buffers: &[LiveStreamOutput]) {
        self.counters.binds += 1;
    }

    fn draw(&mut self, _vertex_count: u32, _instance_count: u32, _first_vertex: u32, _first_instance: u32) {
        self.counters.draws += 1;
    }

    fn draw_indexed(
        &mut self,
        _index_count: u32,
        _instance_count: u32,
        _first_index: u32,
        _vertex_offset: i32,
        _first_instance: u32,
    ) {
        self.counters.draws += 1;
    }

    fn dispatch(&mut self, _group_count_x: u32, _group_count_y: u32, _group_count_z: u32) {
        self.counters.dispatches += 1;
    }

    fn draw_or_dispatch_indirect(
        &mut self,
        _command_type: u32,
        buffer: BufferLocation,
        _draw_count: u32,
        _stride: u32,
    ) {
        self.counters.indirect += 1;
        self.note_null(buffer.resource);
    }

    fn copy_resource(&mut self, source: Resource, dest: Resource) {
        self.counters.copies += 1;
        let Some(entry) = self.resources.get(&source) else {
            self.note_missing(Resource::KIND, source.raw());
            return;
        };
        let storage = entry.storage.clone();
        let copied = match (self.resources.get_mut(&dest).map(|entry| &mut entry.storage), storage) {
            (Some(Storage::Buffer(dest)), Storage::Buffer(source)) => {
                let len = dest.len().min(source.len());
                dest[..len].copy_from_slice(&source[..len]);
                true
            }
            (
                Some(Storage::Texture { subresources, .. }),
                Storage::Texture {
                    subresources: source,
                    ..
                },
            ) => {
                for (dest, source) in subresources.iter_mut().zip(source) {
                    *dest = source;
                }
                true
            }
            _ => false,
        };
        if !copied {
            self.note_missing(Resource::KIND, dest.raw());
        }
    }

    fn copy_buffer_region(&mut self, source: BufferLocation, dest: BufferLocation, size: u64) {
        self.counters.copies += 1;
        let bytes = self.resources.get(&source.resource).and_then(|entry| match &entry.storage {
            Storage::Buffer(data) => {
                byte_range(data.len(), source.offset, size).map(|range| data[range].to_vec())
            }
            Storage::Texture { .. } => None,
        });
        let Some(bytes) = bytes else {
            self.note_missing(Resource::KIND, source.resource.raw());
            return;
        };
        let Some(buffer) = self.buffer_mut(dest.resource) else {
            self.note_missing(Resource::KIND, dest.resource.raw());
            return;
        };
        if let Some(range) = byte_range(buffer.len(), dest.offset, bytes.len() as u64) {
            let len = range.len();
            buffer[range].copy_from_slice(&bytes[..len]);
        }
    }

    fn copy_buffer_to_texture(
        &mut self,
        source: BufferLocation,
        _row_length: u32,
        _slice_height: u32,
        dest: TextureLocation,
    ) {
        self.counters.copies += 1;
        self.note_null(source.resource);
        self.note_null(dest.resource);
    }

    fn copy_texture_region(&mut self, source: TextureLocation, dest: TextureLocation, _filter: u32) {
        self.counters.copies += 1;
        self.note_null(source.resource);
        self.note_null(dest.resource);
    }

    fn copy_texture_to_buffer(
        &mut self,
        source: TextureLocation,
        dest: BufferLocation,
        _row_length: u32,
        _slice_height: u32,
    ) {
        self.counters.copies += 1;
        self.note_null(source.resource);
        self.note_null(dest.resource);
    }

    fn resolve_texture_region(
        &mut self,
        source: TextureLocation,
        dest: Resource,
        _dest_subresource: u32,
        _dest_origin: [i32; 3],
        _format: Format,
    ) {
        self.counters.copies += 1;
        self.note_null(source.resource);
        self.note_null(dest);
    }

    fn clear_depth_stencil_view(&mut self, view: ResourceView, _depth: Option<f32>, _stencil: Option<u8>) {
        self.counters.clears += 1;
        self.note_null(view);
    }

    fn clear_render_target_view(&mut self, view: ResourceView, _color: [f32; 4]) {
        self.counters.clears += 1;
        self.note_null(view);
    }

    fn clear_unordered_access_view_uint(&mut self, view: ResourceView, _values: [u32; 4]) {
        self.counters.clears += 1;
        self.note_null(view);
    }

    fn clear_unordered_access_view_float(&mut self, view: ResourceView, _values: [f32; 4]) {
        self.counters.clears += 1;
        self.note_null(view);
    }

    fn generate_mipmaps(&mut self, view: ResourceView) {
        self.note_null(view);
    }
}
