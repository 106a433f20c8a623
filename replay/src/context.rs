//! Replay dispatcher.
//!
//! [`ReplayContext`] owns the handle tables of one replay session and turns
//! each decoded event into device and command list calls.

use tracing::{debug, trace, warn};
use wire::{
    DescriptorTableUpdate, Descriptors, DeviceApi, Event, Handle, ResourceShape, SubresourceBox,
};

use crate::device::{
    BufferLocation, CommandList, Device, LiveBarrier, LiveBufferRange, LiveDepthStencil,
    LiveDescriptors, LiveRenderTarget, LiveStreamOutput, LiveTableCopy, LiveTableUpdate,
    LiveVertexBuffer, TextureLocation,
};
use crate::error::{ReplayError, ReplayResult};
use crate::handles::{
    DescriptorTable, HandleTable, HandleTables, LiveHandle, Pipeline, PipelineLayout, Resource,
    ResourceView, Sampler,
};
use crate::pipeline::PipelineDesc;

/// High bits of the OpenGL default framebuffer name (`GL_FRAMEBUFFER_DEFAULT`).
const GL_DEFAULT_FRAMEBUFFER: u64 = 0x8218;

/// What the caller should do after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    /// The frame ended with a present.
    Present,
}

/// Counters of a replay session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayStats {
    pub events: u64,
    pub frames: u64,
    pub created: u64,
    pub destroyed: u64,
    /// Lookups of recorded handles that were never bound or already destroyed.
    pub unresolved: u64,
    /// Uploads dropped because they carried no data or targeted a null resource.
    pub skipped_uploads: u64,
    /// Events decoded for framing only (maps, queries, command list lifecycle).
    pub no_ops: u64,
}

/// Handle tables and counters of one replay session.
#[derive(Debug, Clone)]
pub struct ReplayContext {
    api: DeviceApi,
    tables: HandleTables,
    stats: ReplayStats,
}

impl ReplayContext {
    #[must_use]
    pub fn new(api: DeviceApi) -> Self {
        Self {
            api,
            tables: HandleTables::new(),
            stats: ReplayStats::default(),
        }
    }

    #[must_use]
    pub const fn api(&self) -> DeviceApi {
        self.api
    }

    #[must_use]
    pub const fn tables(&self) -> &HandleTables {
        &self.tables
    }

    #[must_use]
    pub const fn stats(&self) -> &ReplayStats {
        &self.stats
    }

    /// Replays one event.
    ///
    /// Only object creation failures are errors; everything else degrades to
    /// null objects or skipped work.
    #[allow(clippy::too_many_lines)]
    pub fn dispatch<D: Device>(&mut self, device: &mut D, event: &Event) -> ReplayResult<Step> {
        self.stats.events += 1;
        trace!(opcode = %event.opcode(), "replay event");

        match event {
            Event::InitSwapchain { back_buffers } => self.init_swapchain(device, back_buffers),
            Event::DestroySwapchain { back_buffers } => {
                for recorded in back_buffers {
                    self.tables.resources.unbind(*recorded);
                    if self.api.back_buffers_are_views() {
                        self.tables.views.unbind(*recorded);
                    }
                }
            }

            Event::InitSampler { desc, handle } => {
                release(&mut self.stats, &mut self.tables.samplers, *handle, |live| {
                    device.destroy_sampler(live);
                });
                let live = device
                    .create_sampler(desc)
                    .map_err(|source| ReplayError::creation(Sampler::KIND, *handle, source))?;
                install(&mut self.stats, &mut self.tables.samplers, *handle, live);
            }
            Event::DestroySampler { handle } => {
                release(&mut self.stats, &mut self.tables.samplers, *handle, |live| {
                    device.destroy_sampler(live);
                });
            }

            Event::InitResource {
                desc,
                initial_state,
                handle,
                initial_data,
            } => {
                if self.is_default_framebuffer(*handle) {
                    bind_identity(&mut self.tables.resources, *handle);
                    return Ok(Step::Continue);
                }
                let mut desc = *desc;
                if let ResourceShape::Texture(texture) = &mut desc.shape {
                    if self.api == DeviceApi::OpenGL && texture.levels == 0 {
                        texture.levels = 1;
                    }
                }
                release(&mut self.stats, &mut self.tables.resources, *handle, |live| {
                    device.destroy_resource(live);
                });
                let live = device
                    .create_resource(&desc, initial_data, *initial_state)
                    .map_err(|source| ReplayError::creation(Resource::KIND, *handle, source))?;
                install(&mut self.stats, &mut self.tables.resources, *handle, live);
            }
            Event::DestroyResource { handle } => {
                if !self.is_default_framebuffer(*handle) {
                    release(&mut self.stats, &mut self.tables.resources, *handle, |live| {
                        device.destroy_resource(live);
                    });
                }
            }

            Event::InitResourceView {
                resource,
                usage,
                desc,
                handle,
            } => {
                if self.is_default_framebuffer(*handle) {
                    bind_identity(&mut self.tables.views, *handle);
                    return Ok(Step::Continue);
                }
                let resource = self.resource(*resource);
                release(&mut self.stats, &mut self.tables.views, *handle, |live| {
                    device.destroy_resource_view(live);
                });
                let live = device
                    .create_resource_view(resource, *usage, desc)
                    .map_err(|source| ReplayError::creation(ResourceView::KIND, *handle, source))?;
                install(&mut self.stats, &mut self.tables.views, *handle, live);
            }
            Event::DestroyResourceView { handle } => {
                if self.is_default_framebuffer(*handle) {
                    self.tables.views.unbind(*handle);
                } else {
                    release(&mut self.stats, &mut self.tables.views, *handle, |live| {
                        device.destroy_resource_view(live);
                    });
                }
            }

            Event::InitPipeline {
                layout,
                subobjects,
                handle,
            } => {
                let layout = self.layout(*layout);
                let desc = PipelineDesc::from_subobjects(subobjects);
                release(&mut self.stats, &mut self.tables.pipelines, *handle, |live| {
                    device.destroy_pipeline(live);
                });
                let live = device
                    .create_pipeline(layout, &desc)
                    .map_err(|source| ReplayError::creation(Pipeline::KIND, *handle, source))?;
                install(&mut self.stats, &mut self.tables.pipelines, *handle, live);
            }
            Event::DestroyPipeline { handle } => {
                release(&mut self.stats, &mut self.tables.pipelines, *handle, |live| {
                    device.destroy_pipeline(live);
                });
            }

            Event::InitPipelineLayout { params, handle } => {
                release(&mut self.stats, &mut self.tables.layouts, *handle, |live| {
                    device.destroy_pipeline_layout(live);
                });
                let live = device
                    .create_pipeline_layout(params)
                    .map_err(|source| ReplayError::creation(PipelineLayout::KIND, *handle, source))?;
                install(&mut self.stats, &mut self.tables.layouts, *handle, live);
            }
            Event::DestroyPipelineLayout { handle } => {
                release(&mut self.stats, &mut self.tables.layouts, *handle, |live| {
                    device.destroy_pipeline_layout(live);
                });
            }

            // Descriptor tables are never created on the replay device, so
            // their handles resolve to null here.
            Event::CopyDescriptorTables { copies } => {
                let copies: Vec<LiveTableCopy> = copies
                    .iter()
                    .map(|copy| LiveTableCopy {
                        source_table: self.descriptor_table(copy.source_table),
                        source_binding: copy.source_binding,
                        source_array_offset: copy.source_array_offset,
                        dest_table: self.descriptor_table(copy.dest_table),
                        dest_binding: copy.dest_binding,
                        dest_array_offset: copy.dest_array_offset,
                        count: copy.count,
                    })
                    .collect();
                device.copy_descriptor_tables(&copies);
            }
            Event::UpdateDescriptorTables { updates } => {
                let updates: Vec<LiveTableUpdate> =
                    updates.iter().map(|update| self.table_update(update)).collect();
                device.update_descriptor_tables(&updates);
            }

            Event::InitQueryHeap { .. }
            | Event::DestroyQueryHeap { .. }
            | Event::GetQueryHeapResults { .. }
            | Event::BeginQuery { .. }
            | Event::EndQuery { .. }
            | Event::CopyQueryHeapResults { .. }
            | Event::MapBufferRegion { .. }
            | Event::MapTextureRegion { .. }
            | Event::ResetCommandList
            | Event::CloseCommandList
            | Event::ExecuteCommandList
            | Event::ExecuteSecondaryCommandList => self.stats.no_ops += 1,

            Event::UnmapBufferRegion {
                resource,
                offset,
                size,
                access,
                data,
            } => {
                if !access.is_writable() {
                    self.stats.no_ops += 1;
                    return Ok(Step::Continue);
                }
                let Some(live) = self.upload_target(*resource, data) else {
                    return Ok(Step::Continue);
                };
                let mapped = match device.map_buffer_region(live, *offset, *size, *access) {
                    Some(memory) => {
                        copy_into(memory, data);
                        true
                    }
                    None => false,
                };
                if mapped {
                    device.unmap_buffer_region(live);
                } else {
                    warn!(resource = resource.raw(), "buffer map failed during replay");
                }
            }
            Event::UnmapTextureRegion {
                resource,
                subresource,
                region,
                access,
                data,
            } => {
                if !access.is_writable() {
                    self.stats.no_ops += 1;
                    return Ok(Step::Continue);
                }
                let Some(live) = self.upload_target(*resource, data) else {
                    return Ok(Step::Continue);
                };
                let mapped = match device.map_texture_region(live, *subresource, region.as_ref(), *access) {
                    Some(memory) => {
                        copy_into(memory, data);
                        true
                    }
                    None => false,
                };
                if mapped {
                    device.unmap_texture_region(live, *subresource);
                } else {
                    warn!(resource = resource.raw(), subresource, "texture map failed during replay");
                }
            }
            Event::UpdateBufferRegion {
                resource,
                offset,
                data,
            } => {
                if let Some(live) = self.upload_target(*resource, data) {
                    device.update_buffer_region(data, live, *offset);
                }
            }
            Event::UpdateTextureRegion {
                resource,
                subresource,
                region,
                data,
            } => {
                if let Some(live) = self.upload_target(*resource, &data.data) {
                    device.update_texture_region(data, live, *subresource, region.as_ref());
                }
            }

            Event::Barrier { barriers } => {
                let barriers: Vec<LiveBarrier> = barriers
                    .iter()
                    .map(|barrier| LiveBarrier {
                        resource: self.resource(barrier.resource),
                        old_state: barrier.old_state,
                        new_state: barrier.new_state,
                    })
                    .collect();
                device.commands().barrier(&barriers);
            }
            Event::BeginRenderPass {
                render_targets,
                depth_stencil,
            } => {
                let render_targets: Vec<LiveRenderTarget> = render_targets
                    .iter()
                    .map(|target| LiveRenderTarget {
                        view: self.view(target.view),
                        load_op: target.load_op,
                        store_op: target.store_op,
                        clear_color: target.clear_color,
                    })
                    .collect();
                let depth_stencil = depth_stencil.map(|ds| LiveDepthStencil {
                    view: self.view(ds.view),
                    depth_load_op: ds.depth_load_op,
                    depth_store_op: ds.depth_store_op,
                    stencil_load_op: ds.stencil_load_op,
                    stencil_store_op: ds.stencil_store_op,
                    clear_depth: ds.clear_depth,
                    clear_stencil: ds.clear_stencil,
                });
                device
                    .commands()
                    .begin_render_pass(&render_targets, depth_stencil.as_ref());
            }
            Event::EndRenderPass => device.commands().end_render_pass(),
            Event::BindRenderTargetsAndDepthStencil {
                render_targets,
                depth_stencil,
            } => {
                let render_targets: Vec<ResourceView> =
                    render_targets.iter().map(|view| self.view(*view)).collect();
                let depth_stencil = self.view(*depth_stencil);
                device
                    .commands()
                    .bind_render_targets_and_depth_stencil(&render_targets, depth_stencil);
            }
            Event::BindPipeline { stages, pipeline } => {
                let pipeline = self.pipeline(*pipeline);
                device.commands().bind_pipeline(*stages, pipeline);
            }
            Event::BindPipelineStates { states } => device.commands().bind_pipeline_states(states),
            Event::BindViewports { first, viewports } => {
                device.commands().bind_viewports(*first, viewports);
            }
            Event::BindScissorRects { first, rects } => {
                device.commands().bind_scissor_rects(*first, rects);
            }
            Event::PushConstants {
                stages,
                layout,
                param_index,
                first,
                values,
            } => {
                let layout = self.layout(*layout);
                device
                    .commands()
                    .push_constants(*stages, layout, *param_index, *first, values);
            }
            Event::PushDescriptors {
                stages,
                layout,
                param_index,
                binding,
                array_offset,
                descriptors,
            } => {
                let layout = self.layout(*layout);
                let update = LiveTableUpdate {
                    table: DescriptorTable::NULL,
                    binding: *binding,
                    array_offset: *array_offset,
                    descriptors: self.descriptors(descriptors),
                };
                device
                    .commands()
                    .push_descriptors(*stages, layout, *param_index, &update);
            }
            Event::BindDescriptorTables {
                stages,
                layout,
                first,
                tables,
            } => {
                let layout = self.layout(*layout);
                let tables: Vec<DescriptorTable> =
                    tables.iter().map(|table| self.descriptor_table(*table)).collect();
                device
                    .commands()
                    .bind_descriptor_tables(*stages, layout, *first, &tables);
            }
            Event::BindIndexBuffer {
                buffer,
                offset,
                index_size,
            } => {
                let buffer = self.resource(*buffer);
                device.commands().bind_index_buffer(buffer, *offset, *index_size);
            }
            Event::BindVertexBuffers { first, buffers } => {
                let buffers: Vec<LiveVertexBuffer> = buffers
                    .iter()
                    .map(|binding| LiveVertexBuffer {
                        buffer: self.resource(binding.buffer),
                        offset: binding.offset,
                        stride: binding.stride,
                    })
                    .collect();
                device.commands().bind_vertex_buffers(*first, &buffers);
            }
            Event::BindStreamOutputBuffers { first, buffers } => {
                let buffers: Vec<LiveStreamOutput> = buffers
                    .iter()
                    .map(|binding| LiveStreamOutput {
                        buffer: self.resource(binding.buffer),
                        offset: binding.offset,
                        max_size: binding.max_size,
                        counter_buffer: self.resource(binding.counter_buffer),
                        counter_offset: binding.counter_offset,
                    })
                    .collect();
                device.commands().bind_stream_output_buffers(*first, &buffers);
            }

            Event::Draw {
                vertex_count,
                instance_count,
                first_vertex,
                first_instance,
            } => device
                .commands()
                .draw(*vertex_count, *instance_count, *first_vertex, *first_instance),
            Event::DrawIndexed {
                index_count,
                instance_count,
                first_index,
                vertex_offset,
                first_instance,
            } => device.commands().draw_indexed(
                *index_count,
                *instance_count,
                *first_index,
                *vertex_offset,
                *first_instance,
            ),
            Event::Dispatch {
                group_count_x,
                group_count_y,
                group_count_z,
            } => device
                .commands()
                .dispatch(*group_count_x, *group_count_y, *group_count_z),
            Event::DrawOrDispatchIndirect {
                command_type,
                buffer,
                offset,
                draw_count,
                stride,
            } => {
                let buffer = self.buffer_at(*buffer, *offset);
                device
                    .commands()
                    .draw_or_dispatch_indirect(*command_type, buffer, *draw_count, *stride);
            }

            Event::CopyResource { source, dest } => {
                let source = self.resource(*source);
                let dest = self.resource(*dest);
                device.commands().copy_resource(source, dest);
            }
            Event::CopyBufferRegion {
                source,
                source_offset,
                dest,
                dest_offset,
                size,
            } => {
                let source = self.buffer_at(*source, *source_offset);
                let dest = self.buffer_at(*dest, *dest_offset);
                device.commands().copy_buffer_region(source, dest, *size);
            }
            Event::CopyBufferToTexture {
                source,
                source_offset,
                row_length,
                slice_height,
                dest,
                dest_subresource,
                dest_region,
            } => {
                let source = self.buffer_at(*source, *source_offset);
                let dest = self.texture_at(*dest, *dest_subresource, *dest_region);
                device
                    .commands()
                    .copy_buffer_to_texture(source, *row_length, *slice_height, dest);
            }
            Event::CopyTextureRegion {
                source,
                source_subresource,
                source_region,
                dest,
                dest_subresource,
                dest_region,
                filter,
            } => {
                let source = self.texture_at(*source, *source_subresource, *source_region);
                let dest = self.texture_at(*dest, *dest_subresource, *dest_region);
                device.commands().copy_texture_region(source, dest, *filter);
            }
            Event::CopyTextureToBuffer {
                source,
                source_subresource,
                source_region,
                dest,
                dest_offset,
                row_length,
                slice_height,
            } => {
                let source = self.texture_at(*source, *source_subresource, *source_region);
                let dest = self.buffer_at(*dest, *dest_offset);
                device
                    .commands()
                    .copy_texture_to_buffer(source, dest, *row_length, *slice_height);
            }
            Event::ResolveTextureRegion {
                source,
                source_subresource,
                source_region,
                dest,
                dest_subresource,
                dest_x,
                dest_y,
                dest_z,
                format,
            } => {
                let source = self.texture_at(*source, *source_subresource, *source_region);
                let dest = self.resource(*dest);
                device.commands().resolve_texture_region(
                    source,
                    dest,
                    *dest_subresource,
                    [*dest_x, *dest_y, *dest_z],
                    *format,
                );
            }

            Event::ClearDepthStencilView {
                view,
                depth,
                stencil,
            } => {
                let view = self.view(*view);
                device.commands().clear_depth_stencil_view(view, *depth, *stencil);
            }
            Event::ClearRenderTargetView { view, color } => {
                let view = self.view(*view);
                device.commands().clear_render_target_view(view, *color);
            }
            Event::ClearUnorderedAccessViewUint { view, values } => {
                let view = self.view(*view);
                device.commands().clear_unordered_access_view_uint(view, *values);
            }
            Event::ClearUnorderedAccessViewFloat { view, values } => {
                let view = self.view(*view);
                device.commands().clear_unordered_access_view_float(view, *values);
            }
            Event::GenerateMipmaps { view } => {
                let view = self.view(*view);
                device.commands().generate_mipmaps(view);
            }

            Event::Present => {
                self.stats.frames += 1;
                debug!(frame = self.stats.frames, "present");
                return Ok(Step::Present);
            }
        }

        Ok(Step::Continue)
    }

    /// Binds recorded back buffers to the replay swapchain by position.
    ///
    /// Back buffers belong to the swapchain, so replaced bindings are not released.
    fn init_swapchain<D: Device>(&mut self, device: &D, back_buffers: &[Handle]) {
        let count = device.back_buffer_count();
        for (index, recorded) in (0u32..).zip(back_buffers) {
            let live = device.back_buffer(if index < count { index } else { 0 });
            self.tables.resources.bind(*recorded, live);
            if self.api.back_buffers_are_views() {
                self.tables
                    .views
                    .bind(*recorded, ResourceView::from_raw(live.raw()));
            }
        }
        debug!(recorded = back_buffers.len(), live = count, "swapchain bound");
    }

    fn is_default_framebuffer(&self, handle: Handle) -> bool {
        self.api == DeviceApi::OpenGL && handle.raw() >> 40 == GL_DEFAULT_FRAMEBUFFER
    }

    /// Resolves the target of an upload, or counts it as skipped.
    fn upload_target(&mut self, recorded: Handle, data: &[u8]) -> Option<Resource> {
        let live = self.resource(recorded);
        if data.is_empty() || live.is_null() {
            self.stats.skipped_uploads += 1;
            trace!(resource = recorded.raw(), bytes = data.len(), "upload skipped");
            return None;
        }
        Some(live)
    }

    fn resource(&mut self, recorded: Handle) -> Resource {
        lookup(&mut self.stats, &self.tables.resources, recorded)
    }

    fn view(&mut self, recorded: Handle) -> ResourceView {
        lookup(&mut self.stats, &self.tables.views, recorded)
    }

    fn sampler(&mut self, recorded: Handle) -> Sampler {
        lookup(&mut self.stats, &self.tables.samplers, recorded)
    }

    fn pipeline(&mut self, recorded: Handle) -> Pipeline {
        lookup(&mut self.stats, &self.tables.pipelines, recorded)
    }

    fn layout(&mut self, recorded: Handle) -> PipelineLayout {
        lookup(&mut self.stats, &self.tables.layouts, recorded)
    }

    fn descriptor_table(&mut self, recorded: Handle) -> DescriptorTable {
        lookup(&mut self.stats, &self.tables.descriptor_tables, recorded)
    }

    fn buffer_at(&mut self, recorded: Handle, offset: u64) -> BufferLocation {
        BufferLocation {
            resource: self.resource(recorded),
            offset,
        }
    }

    fn texture_at(
        &mut self,
        recorded: Handle,
        subresource: u32,
        region: Option<SubresourceBox>,
    ) -> TextureLocation {
        TextureLocation {
            resource: self.resource(recorded),
            subresource,
            region,
        }
    }

    fn table_update(&mut self, update: &DescriptorTableUpdate) -> LiveTableUpdate {
        LiveTableUpdate {
            table: self.descriptor_table(update.table),
            binding: update.binding,
            array_offset: update.array_offset,
            descriptors: self.descriptors(&update.descriptors),
        }
    }

    /// Resolves each slot through the table its kind lives in.
    fn descriptors(&mut self, descriptors: &Descriptors) -> LiveDescriptors {
        match descriptors {
            Descriptors::Samplers(items) => {
                LiveDescriptors::Samplers(items.iter().map(|h| self.sampler(*h)).collect())
            }
            Descriptors::SamplersWithViews(items) => LiveDescriptors::SamplersWithViews(
                items
                    .iter()
                    .map(|item| (self.sampler(item.sampler), self.view(item.view)))
                    .collect(),
            ),
            Descriptors::ShaderResourceViews(items) => {
                LiveDescriptors::ShaderResourceViews(items.iter().map(|h| self.view(*h)).collect())
            }
            Descriptors::UnorderedAccessViews(items) => {
                LiveDescriptors::UnorderedAccessViews(items.iter().map(|h| self.view(*h)).collect())
            }
            Descriptors::ShaderStorageBuffers(items) => {
                LiveDescriptors::ShaderStorageBuffers(items.iter().map(|h| self.view(*h)).collect())
            }
            Descriptors::ConstantBuffers(items) => LiveDescriptors::ConstantBuffers(
                items
                    .iter()
                    .map(|range| LiveBufferRange {
                        buffer: self.resource(range.buffer),
                        offset: range.offset,
                        size: range.size,
                    })
                    .collect(),
            ),
        }
    }
}

fn lookup<K: LiveHandle>(stats: &mut ReplayStats, table: &HandleTable<K>, recorded: Handle) -> K {
    let live = table.resolve(recorded);
    if live.is_null() && !recorded.is_null() && !table.contains(recorded) {
        stats.unresolved += 1;
        trace!(kind = K::KIND, recorded = recorded.raw(), "unresolved handle");
    }
    live
}

/// Unbinds `recorded` and destroys the live object it referred to.
fn release<K: LiveHandle>(
    stats: &mut ReplayStats,
    table: &mut HandleTable<K>,
    recorded: Handle,
    destroy: impl FnOnce(K),
) {
    if let Some(live) = table.unbind(recorded) {
        destroy(live);
        stats.destroyed += 1;
        debug!(kind = K::KIND, recorded = recorded.raw(), live = live.raw(), "destroyed");
    }
}

fn install<K: LiveHandle>(stats: &mut ReplayStats, table: &mut HandleTable<K>, recorded: Handle, live: K) {
    table.bind(recorded, live);
    stats.created += 1;
    debug!(kind = K::KIND, recorded = recorded.raw(), live = live.raw(), "created");
}

/// Binds a default framebuffer handle to itself.
///
/// The displaced object is either that same identity or a swapchain back
/// buffer. Neither is destroyed.
fn bind_identity<K: LiveHandle>(table: &mut HandleTable<K>, recorded: Handle) {
    let identity = K::from_raw(recorded.raw());
    if let Some(previous) = table.bind(recorded, identity) {
        if previous != identity {
            debug!(
                kind = K::KIND,
                recorded = recorded.raw(),
                previous = previous.raw(),
                "default framebuffer rebound"
            );
        }
    }
}

fn copy_into(memory: &mut [u8], data: &[u8]) {
    let len = memory.len().min(data.len());
    memory[..len].copy_from_slice(&data[..len]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessDevice;
    use wire::{Format, MapAccess, ResourceDesc, ResourceUsage, TextureDimension};

    fn device() -> HeadlessDevice {
        HeadlessDevice::new(DeviceApi::D3D12, 2, 8, 8)
    }

    #[test]
    fn present_ends_frame() {
        let mut context = ReplayContext::new(DeviceApi::D3D12);
        let mut device = device();
        assert_eq!(context.dispatch(&mut device, &Event::EndRenderPass).unwrap(), Step::Continue);
        assert_eq!(context.dispatch(&mut device, &Event::Present).unwrap(), Step::Present);
        assert_eq!(context.stats().events, 2);
        assert_eq!(context.stats().frames, 1);
    }

    #[test]
    fn null_handles_are_not_unresolved() {
        let mut context = ReplayContext::new(DeviceApi::D3D12);
        let mut device = device();
        let event = Event::CopyResource {
            source: Handle::NULL,
            dest: Handle::new(3),
        };
        context.dispatch(&mut device, &event).unwrap();
        assert_eq!(context.stats().unresolved, 1);
    }

    #[test]
    fn map_events_are_no_ops() {
        let mut context = ReplayContext::new(DeviceApi::D3D12);
        let mut device = device();
        let event = Event::MapBufferRegion {
            resource: Handle::new(1),
            offset: 0,
            size: 4,
            access: MapAccess::WriteOnly,
        };
        context.dispatch(&mut device, &event).unwrap();
        assert_eq!(context.stats().no_ops, 1);
        assert_eq!(device.counters().maps, 0);
    }

    #[test]
    fn pipeline_layout_reinit_releases_previous() {
        let mut context = ReplayContext::new(DeviceApi::Vulkan);
        let mut device = HeadlessDevice::new(DeviceApi::Vulkan, 2, 8, 8);
        let event = Event::InitPipelineLayout {
            params: Vec::new(),
            handle: Handle::new(2),
        };
        context.dispatch(&mut device, &event).unwrap();
        context.dispatch(&mut device, &event).unwrap();
        assert_eq!(context.tables().layouts.len(), 1);
        assert_eq!(context.stats().destroyed, 1);
        assert_eq!(device.live_objects(), 1);
    }

    #[test]
    fn empty_upload_is_skipped() {
        let mut context = ReplayContext::new(DeviceApi::D3D11);
        let mut device = HeadlessDevice::new(DeviceApi::D3D11, 2, 8, 8);
        let init = Event::InitResource {
            desc: ResourceDesc::buffer(4, 0),
            initial_state: ResourceUsage::default(),
            handle: Handle::new(1),
            initial_data: Vec::new(),
        };
        context.dispatch(&mut device, &init).unwrap();
        let update = Event::UpdateBufferRegion {
            resource: Handle::new(1),
            offset: 0,
            data: Vec::new(),
        };
        context.dispatch(&mut device, &update).unwrap();
        assert_eq!(context.stats().skipped_uploads, 1);
        assert_eq!(device.counters().uploads, 0);
    }

    #[test]
    fn default_framebuffer_rebind_destroys_nothing() {
        let mut context = ReplayContext::new(DeviceApi::OpenGL);
        let mut device = HeadlessDevice::new(DeviceApi::OpenGL, 1, 8, 8);
        let framebuffer = Handle::new((GL_DEFAULT_FRAMEBUFFER << 40) | 1);
        context
            .dispatch(
                &mut device,
                &Event::InitSwapchain {
                    back_buffers: vec![framebuffer],
                },
            )
            .unwrap();
        let back_buffer = device.back_buffer(0);
        assert_eq!(context.tables().resources.resolve(framebuffer), back_buffer);

        let init = Event::InitResource {
            desc: ResourceDesc::texture(
                TextureDimension::Framebuffer,
                8,
                8,
                1,
                1,
                Format::R8G8B8A8_UNORM,
                ResourceUsage::RENDER_TARGET,
            ),
            initial_state: ResourceUsage::default(),
            handle: framebuffer,
            initial_data: Vec::new(),
        };
        context.dispatch(&mut device, &init).unwrap();
        context.dispatch(&mut device, &init).unwrap();

        assert_eq!(
            context.tables().resources.resolve(framebuffer),
            Resource::from_raw(framebuffer.raw())
        );
        assert!(device.is_live(back_buffer));
        assert_eq!(context.stats().created, 0);
        assert_eq!(context.stats().destroyed, 0);
        assert_eq!(device.live_objects(), 0);
    }
}
