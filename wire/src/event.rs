//! The `Event` enum and its encoder/decoder.
//!
//! An event is an opcode word followed by an opcode-specific payload. There is
//! no length prefix; the decoder knows every layout from the opcode alone.

use bytestream::{ByteReader, ByteWriter};

use crate::codec::{
    count_u32, read_blob, read_count, read_exact, read_f32x4, read_list, read_n, read_option,
    read_u32x4, write_blob, write_f32x4, write_list, write_option, write_u32x4, Codec,
};
use crate::descriptors::{DescriptorTableCopy, DescriptorTableUpdate, Descriptors};
use crate::error::{DecodeError, EncodeError, WireResult};
use crate::format::Format;
use crate::limits::Limits;
use crate::opcode::Opcode;
use crate::pipeline::{PipelineLayoutParam, PipelineSubobject};
use crate::size::subresource_size;
use crate::types::{
    DepthStencilAttachment, DynamicStateValue, Handle, MapAccess, Rect, RenderTargetDesc,
    ResourceBarrier, ResourceDesc, ResourceShape, ResourceUsage, ResourceViewDesc, SamplerDesc,
    StreamOutputBinding, SubresourceBox, SubresourceData, VertexBufferBinding, Viewport,
};

/// One decoded trace event.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize),
    serde(tag = "event", rename_all = "snake_case")
)]
pub enum Event {
    InitSwapchain {
        back_buffers: Vec<Handle>,
    },
    DestroySwapchain {
        back_buffers: Vec<Handle>,
    },
    InitSampler {
        desc: SamplerDesc,
        handle: Handle,
    },
    DestroySampler {
        handle: Handle,
    },
    /// Resource creation with optional initial contents.
    ///
    /// Buffers carry zero or one entry holding exactly the buffer size.
    /// Textures carry entries for subresources `0..n` in index order.
    InitResource {
        desc: ResourceDesc,
        initial_state: ResourceUsage,
        handle: Handle,
        initial_data: Vec<SubresourceData>,
    },
    DestroyResource {
        handle: Handle,
    },
    InitResourceView {
        resource: Handle,
        usage: ResourceUsage,
        desc: ResourceViewDesc,
        handle: Handle,
    },
    DestroyResourceView {
        handle: Handle,
    },
    InitPipeline {
        layout: Handle,
        subobjects: Vec<PipelineSubobject>,
        handle: Handle,
    },
    DestroyPipeline {
        handle: Handle,
    },
    InitPipelineLayout {
        params: Vec<PipelineLayoutParam>,
        handle: Handle,
    },
    DestroyPipelineLayout {
        handle: Handle,
    },
    CopyDescriptorTables {
        copies: Vec<DescriptorTableCopy>,
    },
    UpdateDescriptorTables {
        updates: Vec<DescriptorTableUpdate>,
    },
    InitQueryHeap {
        query_type: u32,
        count: u32,
        handle: Handle,
    },
    DestroyQueryHeap {
        handle: Handle,
    },
    GetQueryHeapResults {
        heap: Handle,
        first: u32,
        count: u32,
        stride: u32,
    },
    MapBufferRegion {
        resource: Handle,
        offset: u64,
        size: u64,
        access: MapAccess,
    },
    /// Carries the mapped bytes when `access` is writable, nothing otherwise.
    UnmapBufferRegion {
        resource: Handle,
        offset: u64,
        size: u64,
        access: MapAccess,
        data: Vec<u8>,
    },
    MapTextureRegion {
        resource: Handle,
        subresource: u32,
        region: Option<SubresourceBox>,
        access: MapAccess,
    },
    /// Carries the mapped bytes when `access` is writable, nothing otherwise.
    UnmapTextureRegion {
        resource: Handle,
        subresource: u32,
        region: Option<SubresourceBox>,
        access: MapAccess,
        data: Vec<u8>,
    },
    UpdateBufferRegion {
        resource: Handle,
        offset: u64,
        data: Vec<u8>,
    },
    UpdateTextureRegion {
        resource: Handle,
        subresource: u32,
        region: Option<SubresourceBox>,
        data: SubresourceData,
    },
    Barrier {
        barriers: Vec<ResourceBarrier>,
    },
    BeginRenderPass {
        render_targets: Vec<RenderTargetDesc>,
        depth_stencil: Option<DepthStencilAttachment>,
    },
    EndRenderPass,
    BindRenderTargetsAndDepthStencil {
        render_targets: Vec<Handle>,
        depth_stencil: Handle,
    },
    BindPipeline {
        stages: u32,
        pipeline: Handle,
    },
    BindPipelineStates {
        states: Vec<DynamicStateValue>,
    },
    BindViewports {
        first: u32,
        viewports: Vec<Viewport>,
    },
    BindScissorRects {
        first: u32,
        rects: Vec<Rect>,
    },
    PushConstants {
        stages: u32,
        layout: Handle,
        param_index: u32,
        first: u32,
        values: Vec<u32>,
    },
    PushDescriptors {
        stages: u32,
        layout: Handle,
        param_index: u32,
        binding: u32,
        array_offset: u32,
        descriptors: Descriptors,
    },
    BindDescriptorTables {
        stages: u32,
        layout: Handle,
        first: u32,
        tables: Vec<Handle>,
    },
    BindIndexBuffer {
        buffer: Handle,
        offset: u64,
        index_size: u32,
    },
    BindVertexBuffers {
        first: u32,
        buffers: Vec<VertexBufferBinding>,
    },
    BindStreamOutputBuffers {
        first: u32,
        buffers: Vec<StreamOutputBinding>,
    },
    Draw {
        vertex_count: u32,
        instance_count: u32,
        first_vertex: u32,
        first_instance: u32,
    },
    DrawIndexed {
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        vertex_offset: i32,
        first_instance: u32,
    },
    Dispatch {
        group_count_x: u32,
        group_count_y: u32,
        group_count_z: u32,
    },
    DrawOrDispatchIndirect {
        command_type: u32,
        buffer: Handle,
        offset: u64,
        draw_count: u32,
        stride: u32,
    },
    CopyResource {
        source: Handle,
        dest: Handle,
    },
    CopyBufferRegion {
        source: Handle,
        source_offset: u64,
        dest: Handle,
        dest_offset: u64,
        size: u64,
    },
    CopyBufferToTexture {
        source: Handle,
        source_offset: u64,
        row_length: u32,
        slice_height: u32,
        dest: Handle,
        dest_subresource: u32,
        dest_region: Option<SubresourceBox>,
    },
    CopyTextureRegion {
        source: Handle,
        source_subresource: u32,
        source_region: Option<SubresourceBox>,
        dest: Handle,
        dest_subresource: u32,
        dest_region: Option<SubresourceBox>,
        filter: u32,
    },
    CopyTextureToBuffer {
        source: Handle,
        source_subresource: u32,
        source_region: Option<SubresourceBox>,
        dest: Handle,
        dest_offset: u64,
        row_length: u32,
        slice_height: u32,
    },
    ResolveTextureRegion {
        source: Handle,
        source_subresource: u32,
        source_region: Option<SubresourceBox>,
        dest: Handle,
        dest_subresource: u32,
        dest_x: i32,
        dest_y: i32,
        dest_z: i32,
        format: Format,
    },
    ClearDepthStencilView {
        view: Handle,
        depth: Option<f32>,
        stencil: Option<u8>,
    },
    ClearRenderTargetView {
        view: Handle,
        color: [f32; 4],
    },
    ClearUnorderedAccessViewUint {
        view: Handle,
        values: [u32; 4],
    },
    ClearUnorderedAccessViewFloat {
        view: Handle,
        values: [f32; 4],
    },
    GenerateMipmaps {
        view: Handle,
    },
    BeginQuery {
        heap: Handle,
        query_type: u32,
        index: u32,
    },
    EndQuery {
        heap: Handle,
        query_type: u32,
        index: u32,
    },
    CopyQueryHeapResults {
        heap: Handle,
        query_type: u32,
        first: u32,
        count: u32,
        dest: Handle,
        dest_offset: u64,
        stride: u32,
    },
    ResetCommandList,
    CloseCommandList,
    ExecuteCommandList,
    ExecuteSecondaryCommandList,
    Present,
}

impl Event {
    /// Opcode this event is framed with.
    #[must_use]
    pub const fn opcode(&self) -> Opcode {
        match self {
            Self::InitSwapchain { .. } => Opcode::InitSwapchain,
            Self::DestroySwapchain { .. } => Opcode::DestroySwapchain,
            Self::InitSampler { .. } => Opcode::InitSampler,
            Self::DestroySampler { .. } => Opcode::DestroySampler,
            Self::InitResource { .. } => Opcode::InitResource,
            Self::DestroyResource { .. } => Opcode::DestroyResource,
            Self::InitResourceView { .. } => Opcode::InitResourceView,
            Self::DestroyResourceView { .. } => Opcode::DestroyResourceView,
            Self::InitPipeline { .. } => Opcode::InitPipeline,
            Self::DestroyPipeline { .. } => Opcode::DestroyPipeline,
            Self::InitPipelineLayout { .. } => Opcode::InitPipelineLayout,
            Self::DestroyPipelineLayout { .. } => Opcode::DestroyPipelineLayout,
            Self::CopyDescriptorTables { .. } => Opcode::CopyDescriptorTables,
            Self::UpdateDescriptorTables { .. } => Opcode::UpdateDescriptorTables,
            Self::InitQueryHeap { .. } => Opcode::InitQueryHeap,
            Self::DestroyQueryHeap { .. } => Opcode::DestroyQueryHeap,
            Self::GetQueryHeapResults { .. } => Opcode::GetQueryHeapResults,
            Self::MapBufferRegion { .. } => Opcode::MapBufferRegion,
            Self::UnmapBufferRegion { .. } => Opcode::UnmapBufferRegion,
            Self::MapTextureRegion { .. } => Opcode::MapTextureRegion,
            Self::UnmapTextureRegion { .. } => Opcode::UnmapTextureRegion,
            Self::UpdateBufferRegion { .. } => Opcode::UpdateBufferRegion,
            Self::UpdateTextureRegion { .. } => Opcode::UpdateTextureRegion,
            Self::Barrier { .. } => Opcode::Barrier,
            Self::BeginRenderPass { .. } => Opcode::BeginRenderPass,
            Self::EndRenderPass => Opcode::EndRenderPass,
            Self::BindRenderTargetsAndDepthStencil { .. } => {
                Opcode::BindRenderTargetsAndDepthStencil
            }
            Self::BindPipeline { .. } => Opcode::BindPipeline,
            Self::BindPipelineStates { .. } => Opcode::BindPipelineStates,
            Self::BindViewports { .. } => Opcode::BindViewports,
            Self::BindScissorRects { .. } => Opcode::BindScissorRects,
            Self::PushConstants { .. } => Opcode::PushConstants,
            Self::PushDescriptors { .. } => Opcode::PushDescriptors,
            Self::BindDescriptorTables { .. } => Opcode::BindDescriptorTables,
            Self::BindIndexBuffer { .. } => Opcode::BindIndexBuffer,
            Self::BindVertexBuffers { .. } => Opcode::BindVertexBuffers,
            Self::BindStreamOutputBuffers { .. } => Opcode::BindStreamOutputBuffers,
            Self::Draw { .. } => Opcode::Draw,
            Self::DrawIndexed { .. } => Opcode::DrawIndexed,
            Self::Dispatch { .. } => Opcode::Dispatch,
            Self::DrawOrDispatchIndirect { .. } => Opcode::DrawOrDispatchIndirect,
            Self::CopyResource { .. } => Opcode::CopyResource,
            Self::CopyBufferRegion { .. } => Opcode::CopyBufferRegion,
            Self::CopyBufferToTexture { .. } => Opcode::CopyBufferToTexture,
            Self::CopyTextureRegion { .. } => Opcode::CopyTextureRegion,
            Self::CopyTextureToBuffer { .. } => Opcode::CopyTextureToBuffer,
            Self::ResolveTextureRegion { .. } => Opcode::ResolveTextureRegion,
            Self::ClearDepthStencilView { .. } => Opcode::ClearDepthStencilView,
            Self::ClearRenderTargetView { .. } => Opcode::ClearRenderTargetView,
            Self::ClearUnorderedAccessViewUint { .. } => Opcode::ClearUnorderedAccessViewUint,
            Self::ClearUnorderedAccessViewFloat { .. } => Opcode::ClearUnorderedAccessViewFloat,
            Self::GenerateMipmaps { .. } => Opcode::GenerateMipmaps,
            Self::BeginQuery { .. } => Opcode::BeginQuery,
            Self::EndQuery { .. } => Opcode::EndQuery,
            Self::CopyQueryHeapResults { .. } => Opcode::CopyQueryHeapResults,
            Self::ResetCommandList => Opcode::ResetCommandList,
            Self::CloseCommandList => Opcode::CloseCommandList,
            Self::ExecuteCommandList => Opcode::ExecuteCommandList,
            Self::ExecuteSecondaryCommandList => Opcode::ExecuteSecondaryCommandList,
            Self::Present => Opcode::Present,
        }
    }

    /// Returns `true` for the frame-terminating event.
    #[must_use]
    pub const fn is_present(&self) -> bool {
        matches!(self, Self::Present)
    }
}

fn write_handle(handle: Handle, out: &mut ByteWriter) {
    out.write_u64(handle.raw());
}

fn read_handle(input: &mut ByteReader<'_>) -> WireResult<Handle> {
    Ok(Handle::new(input.read_u64()?))
}

fn write_region(region: Option<&SubresourceBox>, out: &mut ByteWriter) -> Result<(), EncodeError> {
    write_option(region, out)
}

fn read_region(input: &mut ByteReader<'_>, limits: &Limits) -> WireResult<Option<SubresourceBox>> {
    read_option(input, limits)
}

fn write_mapped_data(access: MapAccess, data: &[u8], out: &mut ByteWriter) -> Result<(), EncodeError> {
    if access.is_writable() {
        write_blob(data, out);
    } else if !data.is_empty() {
        return Err(EncodeError::InvalidValue {
            field: "read-only unmap payload",
            value: data.len() as u64,
        });
    }
    Ok(())
}

fn read_mapped_data(
    access: MapAccess,
    input: &mut ByteReader<'_>,
    limits: &Limits,
) -> WireResult<Vec<u8>> {
    if access.is_writable() {
        read_blob(input, limits)
    } else {
        Ok(Vec::new())
    }
}

fn encode_initial_data(
    desc: &ResourceDesc,
    initial_data: &[SubresourceData],
    out: &mut ByteWriter,
) -> Result<(), EncodeError> {
    match &desc.shape {
        ResourceShape::Buffer { size, .. } => match initial_data {
            [] => out.write_u32(0),
            [data] => {
                let actual = data.data.len() as u64;
                if actual != *size {
                    return Err(EncodeError::SizeMismatch {
                        subresource: 0,
                        expected: *size,
                        actual,
                    });
                }
                out.write_u32(1);
                out.write_bytes(&data.data);
            }
            _ => {
                return Err(EncodeError::InvalidValue {
                    field: "buffer initial data count",
                    value: initial_data.len() as u64,
                })
            }
        },
        ResourceShape::Texture(texture) => {
            let count = count_u32(initial_data.len())?;
            if count > texture.subresource_count() {
                return Err(EncodeError::InvalidValue {
                    field: "initial data subresource count",
                    value: u64::from(count),
                });
            }
            out.write_u32(count);
            for (subresource, data) in (0..).zip(initial_data) {
                let expected =
                    subresource_size(texture, subresource, data.row_pitch, data.slice_pitch, None);
                let actual = data.data.len() as u64;
                if actual != expected {
                    return Err(EncodeError::SizeMismatch {
                        subresource,
                        expected,
                        actual,
                    });
                }
                out.write_u32(data.row_pitch);
                out.write_u32(data.slice_pitch);
                write_blob(&data.data, out);
            }
        }
    }
    Ok(())
}

fn decode_initial_data(
    desc: &ResourceDesc,
    input: &mut ByteReader<'_>,
    limits: &Limits,
) -> WireResult<Vec<SubresourceData>> {
    match &desc.shape {
        ResourceShape::Buffer { size, .. } => match input.read_u32()? {
            0 => Ok(Vec::new()),
            1 => Ok(vec![SubresourceData::buffer(read_exact(input, *size, limits)?)]),
            count => Err(DecodeError::InvalidValue {
                field: "buffer initial data count",
                value: u64::from(count),
            }),
        },
        ResourceShape::Texture(texture) => {
            let count = read_count(input, limits)?;
            if count as u64 > u64::from(texture.subresource_count()) {
                return Err(DecodeError::InvalidValue {
                    field: "initial data subresource count",
                    value: count as u64,
                });
            }
            let mut subresource = 0u32;
            read_n(input, count, |input| {
                let row_pitch = input.read_u32()?;
                let slice_pitch = input.read_u32()?;
                let actual = input.read_u64()?;
                let expected = subresource_size(texture, subresource, row_pitch, slice_pitch, None);
                if actual != expected {
                    return Err(DecodeError::SizeMismatch {
                        subresource,
                        expected,
                        actual,
                    });
                }
                let data = read_exact(input, actual, limits)?;
                subresource += 1;
                Ok(SubresourceData {
                    row_pitch,
                    slice_pitch,
                    data,
                })
            })
        }
    }
}

fn write_u32_values(values: &[u32], out: &mut ByteWriter) -> Result<(), EncodeError> {
    out.write_u32(count_u32(values.len())?);
    for value in values {
        out.write_u32(*value);
    }
    Ok(())
}

fn read_u32_values(input: &mut ByteReader<'_>, limits: &Limits) -> WireResult<Vec<u32>> {
    let count = read_count(input, limits)?;
    read_n(input, count, |input| Ok(input.read_u32()?))
}

/// Appends one event, opcode first.
///
/// On error the writer may hold a partial event; callers encode into scratch
/// space and only commit complete events.
pub fn encode_event(event: &Event, out: &mut ByteWriter) -> Result<(), EncodeError> {
    out.write_u32(event.opcode().raw());
    match event {
        Event::InitSwapchain { back_buffers } | Event::DestroySwapchain { back_buffers } => {
            write_list(back_buffers, out)?;
        }
        Event::InitSampler { desc, handle } => {
            desc.encode(out)?;
            write_handle(*handle, out);
        }
        Event::InitResource {
            desc,
            initial_state,
            handle,
            initial_data,
        } => {
            desc.encode(out)?;
            out.write_u32(initial_state.raw());
            write_handle(*handle, out);
            encode_initial_data(desc, initial_data, out)?;
        }
        Event::DestroySampler { handle }
        | Event::DestroyResource { handle }
        | Event::DestroyResourceView { handle }
        | Event::DestroyPipeline { handle }
        | Event::DestroyPipelineLayout { handle }
        | Event::DestroyQueryHeap { handle } => write_handle(*handle, out),
        Event::InitResourceView {
            resource,
            usage,
            desc,
            handle,
        } => {
            write_handle(*resource, out);
            out.write_u32(usage.raw());
            desc.encode(out)?;
            write_handle(*handle, out);
        }
        Event::InitPipeline {
            layout,
            subobjects,
            handle,
        } => {
            write_handle(*layout, out);
            write_list(subobjects, out)?;
            write_handle(*handle, out);
        }
        Event::InitPipelineLayout { params, handle } => {
            write_list(params, out)?;
            write_handle(*handle, out);
        }
        Event::CopyDescriptorTables { copies } => write_list(copies, out)?,
        Event::UpdateDescriptorTables { updates } => write_list(updates, out)?,
        Event::InitQueryHeap {
            query_type,
            count,
            handle,
        } => {
            out.write_u32(*query_type);
            out.write_u32(*count);
            write_handle(*handle, out);
        }
        Event::GetQueryHeapResults {
            heap,
            first,
            count,
            stride,
        } => {
            write_handle(*heap, out);
            out.write_u32(*first);
            out.write_u32(*count);
            out.write_u32(*stride);
        }
        Event::MapBufferRegion {
            resource,
            offset,
            size,
            access,
        } => {
            write_handle(*resource, out);
            out.write_u64(*offset);
            out.write_u64(*size);
            access.encode(out)?;
        }
        Event::UnmapBufferRegion {
            resource,
            offset,
            size,
            access,
            data,
        } => {
            write_handle(*resource, out);
            out.write_u64(*offset);
            out.write_u64(*size);
            access.encode(out)?;
            write_mapped_data(*access, data, out)?;
        }
        Event::MapTextureRegion {
            resource,
            subresource,
            region,
            access,
        } => {
            write_handle(*resource, out);
            out.write_u32(*subresource);
            write_region(region.as_ref(), out)?;
            access.encode(out)?;
        }
        Event::UnmapTextureRegion {
            resource,
            subresource,
            region,
            access,
            data,
        } => {
            write_handle(*resource, out);
            out.write_u32(*subresource);
            write_region(region.as_ref(), out)?;
            access.encode(out)?;
            write_mapped_data(*access, data, out)?;
        }
        Event::UpdateBufferRegion {
            resource,
            offset,
            data,
        } => {
            write_handle(*resource, out);
            out.write_u64(*offset);
            write_blob(data, out);
        }
        Event::UpdateTextureRegion {
            resource,
            subresource,
            region,
            data,
        } => {
            write_handle(*resource, out);
            out.write_u32(*subresource);
            write_region(region.as_ref(), out)?;
            out.write_u32(data.row_pitch);
            out.write_u32(data.slice_pitch);
            write_blob(&data.data, out);
        }
        Event::Barrier { barriers } => write_list(barriers, out)?,
        Event::BeginRenderPass {
            render_targets,
            depth_stencil,
        } => {
            write_list(render_targets, out)?;
            write_option(depth_stencil.as_ref(), out)?;
        }
        Event::BindRenderTargetsAndDepthStencil {
            render_targets,
            depth_stencil,
        } => {
            write_list(render_targets, out)?;
            write_handle(*depth_stencil, out);
        }
        Event::BindPipeline { stages, pipeline } => {
            out.write_u32(*stages);
            write_handle(*pipeline, out);
        }
        Event::BindPipelineStates { states } => write_list(states, out)?,
        Event::BindViewports { first, viewports } => {
            out.write_u32(*first);
            write_list(viewports, out)?;
        }
        Event::BindScissorRects { first, rects } => {
            out.write_u32(*first);
            write_list(rects, out)?;
        }
        Event::PushConstants {
            stages,
            layout,
            param_index,
            first,
            values,
        } => {
            out.write_u32(*stages);
            write_handle(*layout, out);
            out.write_u32(*param_index);
            out.write_u32(*first);
            write_u32_values(values, out)?;
        }
        Event::PushDescriptors {
            stages,
            layout,
            param_index,
            binding,
            array_offset,
            descriptors,
        } => {
            out.write_u32(*stages);
            write_handle(*layout, out);
            out.write_u32(*param_index);
            out.write_u32(*binding);
            out.write_u32(*array_offset);
            descriptors.encode_framed(out)?;
        }
        Event::BindDescriptorTables {
            stages,
            layout,
            first,
            tables,
        } => {
            out.write_u32(*stages);
            write_handle(*layout, out);
            out.write_u32(*first);
            write_list(tables, out)?;
        }
        Event::BindIndexBuffer {
            buffer,
            offset,
            index_size,
        } => {
            write_handle(*buffer, out);
            out.write_u64(*offset);
            out.write_u32(*index_size);
        }
        Event::BindVertexBuffers { first, buffers } => {
            out.write_u32(*first);
            write_list(buffers, out)?;
        }
        Event::BindStreamOutputBuffers { first, buffers } => {
            out.write_u32(*first);
            write_list(buffers, out)?;
        }
        Event::Draw {
            vertex_count,
            instance_count,
            first_vertex,
            first_instance,
        } => {
            out.write_u32(*vertex_count);
            out.write_u32(*instance_count);
            out.write_u32(*first_vertex);
            out.write_u32(*first_instance);
        }
        Event::DrawIndexed {
            index_count,
            instance_count,
            first_index,
            vertex_offset,
            first_instance,
        } => {
            out.write_u32(*index_count);
            out.write_u32(*instance_count);
            out.write_u32(*first_index);
            out.write_i32(*vertex_offset);
            out.write_u32(*first_instance);
        }
        Event::Dispatch {
            group_count_x,
            group_count_y,
            group_count_z,
        } => {
            out.write_u32(*group_count_x);
            out.write_u32(*group_count_y);
            out.write_u32(*group_count_z);
        }
        Event::DrawOrDispatchIndirect {
            command_type,
            buffer,
            offset,
            draw_count,
            stride,
        } => {
            out.write_u32(*command_type);
            write_handle(*buffer, out);
            out.write_u64(*offset);
            out.write_u32(*draw_count);
            out.write_u32(*stride);
        }
        Event::CopyResource { source, dest } => {
            write_handle(*source, out);
            write_handle(*dest, out);
        }
        Event::CopyBufferRegion {
            source,
            source_offset,
            dest,
            dest_offset,
            size,
        } => {
            write_handle(*source, out);
            out.write_u64(*source_offset);
            write_handle(*dest, out);
            out.write_u64(*dest_offset);
            out.write_u64(*size);
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
            write_handle(*source, out);
            out.write_u64(*source_offset);
            out.write_u32(*row_length);
            out.write_u32(*slice_height);
            write_handle(*dest, out);
            out.write_u32(*dest_subresource);
            write_region(dest_region.as_ref(), out)?;
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
            write_handle(*source, out);
            out.write_u32(*source_subresource);
            write_region(source_region.as_ref(), out)?;
            write_handle(*dest, out);
            out.write_u32(*dest_subresource);
            write_region(dest_region.as_ref(), out)?;
            out.write_u32(*filter);
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
            write_handle(*source, out);
            out.write_u32(*source_subresource);
            write_region(source_region.as_ref(), out)?;
            write_handle(*dest, out);
            out.write_u64(*dest_offset);
            out.write_u32(*row_length);
            out.write_u32(*slice_height);
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
            write_handle(*source, out);
            out.write_u32(*source_subresource);
            write_region(source_region.as_ref(), out)?;
            write_handle(*dest, out);
            out.write_u32(*dest_subresource);
            out.write_i32(*dest_x);
            out.write_i32(*dest_y);
            out.write_i32(*dest_z);
            out.write_u32(format.raw());
        }
        Event::ClearDepthStencilView {
            view,
            depth,
            stencil,
        } => {
            write_handle(*view, out);
            out.write_bool(depth.is_some());
            if let Some(depth) = depth {
                out.write_f32(*depth);
            }
            out.write_bool(stencil.is_some());
            if let Some(stencil) = stencil {
                out.write_u8(*stencil);
            }
        }
        Event::ClearRenderTargetView { view, color } => {
            write_handle(*view, out);
            write_f32x4(*color, out);
        }
        Event::ClearUnorderedAccessViewUint { view, values } => {
            write_handle(*view, out);
            write_u32x4(*values, out);
        }
        Event::ClearUnorderedAccessViewFloat { view, values } => {
            write_handle(*view, out);
            write_f32x4(*values, out);
        }
        Event::GenerateMipmaps { view } => write_handle(*view, out),
        Event::BeginQuery {
            heap,
            query_type,
            index,
        }
        | Event::EndQuery {
            heap,
            query_type,
            index,
        } => {
            write_handle(*heap, out);
            out.write_u32(*query_type);
            out.write_u32(*index);
        }
        Event::CopyQueryHeapResults {
            heap,
            query_type,
            first,
            count,
            dest,
            dest_offset,
            stride,
        } => {
            write_handle(*heap, out);
            out.write_u32(*query_type);
            out.write_u32(*first);
            out.write_u32(*count);
            write_handle(*dest, out);
            out.write_u64(*dest_offset);
            out.write_u32(*stride);
        }
        Event::EndRenderPass
        | Event::ResetCommandList
        | Event::CloseCommandList
        | Event::ExecuteCommandList
        | Event::ExecuteSecondaryCommandList
        | Event::Present => {}
    }
    Ok(())
}

/// Decodes one event, opcode first.
///
/// A truncated payload surfaces as an error for which
/// [`DecodeError::is_truncation`] is `true`.
pub fn decode_event(input: &mut ByteReader<'_>, limits: &Limits) -> WireResult<Event> {
    let opcode = Opcode::parse(input.read_u32()?)?;
    decode_payload(opcode, input, limits)
}

#[allow(clippy::too_many_lines)]
fn decode_payload(opcode: Opcode, input: &mut ByteReader<'_>, limits: &Limits) -> WireResult<Event> {
    let event = match opcode {
        Opcode::InitSwapchain => Event::InitSwapchain {
            back_buffers: read_list(input, limits)?,
        },
        Opcode::DestroySwapchain => Event::DestroySwapchain {
            back_buffers: read_list(input, limits)?,
        },
        Opcode::InitSampler => Event::InitSampler {
            desc: SamplerDesc::decode(input, limits)?,
            handle: read_handle(input)?,
        },
        Opcode::DestroySampler => Event::DestroySampler {
            handle: read_handle(input)?,
        },
        Opcode::InitResource => {
            let desc = ResourceDesc::decode(input, limits)?;
            let initial_state = ResourceUsage::from_raw(input.read_u32()?);
            let handle = read_handle(input)?;
            let initial_data = decode_initial_data(&desc, input, limits)?;
            Event::InitResource {
                desc,
                initial_state,
                handle,
                initial_data,
            }
        }
        Opcode::DestroyResource => Event::DestroyResource {
            handle: read_handle(input)?,
        },
        Opcode::InitResourceView => Event::InitResourceView {
            resource: read_handle(input)?,
            usage: ResourceUsage::from_raw(input.read_u32()?),
            desc: ResourceViewDesc::decode(input, limits)?,
            handle: read_handle(input)?,
        },
        Opcode::DestroyResourceView => Event::DestroyResourceView {
            handle: read_handle(input)?,
        },
        Opcode::InitPipeline => Event::InitPipeline {
            layout: read_handle(input)?,
            subobjects: read_list(input, limits)?,
            handle: read_handle(input)?,
        },
        Opcode::DestroyPipeline => Event::DestroyPipeline {
            handle: read_handle(input)?,
        },
        Opcode::InitPipelineLayout => Event::InitPipelineLayout {
            params: read_list(input, limits)?,
            handle: read_handle(input)?,
        },
        Opcode::DestroyPipelineLayout => Event::DestroyPipelineLayout {
            handle: read_handle(input)?,
        },
        Opcode::CopyDescriptorTables => Event::CopyDescriptorTables {
            copies: read_list(input, limits)?,
        },
        Opcode::UpdateDescriptorTables => Event::UpdateDescriptorTables {
            updates: read_list(input, limits)?,
        },
        Opcode::InitQueryHeap => Event::InitQueryHeap {
            query_type: input.read_u32()?,
            count: input.read_u32()?,
            handle: read_handle(input)?,
        },
        Opcode::DestroyQueryHeap => Event::DestroyQueryHeap {
            handle: read_handle(input)?,
        },
        Opcode::GetQueryHeapResults => Event::GetQueryHeapResults {
            heap: read_handle(input)?,
            first: input.read_u32()?,
            count: input.read_u32()?,
            stride: input.read_u32()?,
        },
        Opcode::MapBufferRegion => Event::MapBufferRegion {
            resource: read_handle(input)?,
            offset: input.read_u64()?,
            size: input.read_u64()?,
            access: MapAccess::decode(input, limits)?,
        },
        Opcode::UnmapBufferRegion => {
            let resource = read_handle(input)?;
            let offset = input.read_u64()?;
            let size = input.read_u64()?;
            let access = MapAccess::decode(input, limits)?;
            Event::UnmapBufferRegion {
                resource,
                offset,
                size,
                access,
                data: read_mapped_data(access, input, limits)?,
            }
        }
        Opcode::MapTextureRegion => Event::MapTextureRegion {
            resource: read_handle(input)?,
            subresource: input.read_u32()?,
            region: read_region(input, limits)?,
            access: MapAccess::decode(input, limits)?,
        },
        Opcode::UnmapTextureRegion => {
            let resource = read_handle(input)?;
            let subresource = input.read_u32()?;
            let region = read_region(input, limits)?;
            let access = MapAccess::decode(input, limits)?;
            Event::UnmapTextureRegion {
                resource,
                subresource,
                region,
                access,
                data: read_mapped_data(access, input, limits)?,
            }
        }
        Opcode::UpdateBufferRegion => Event::UpdateBufferRegion {
            resource: read_handle(input)?,
            offset: input.read_u64()?,
            data: read_blob(input, limits)?,
        },
        Opcode::UpdateTextureRegion => Event::UpdateTextureRegion {
            resource: read_handle(input)?,
            subresource: input.read_u32()?,
            region: read_region(input, limits)?,
            data: SubresourceData {
                row_pitch: input.read_u32()?,
                slice_pitch: input.read_u32()?,
                data: read_blob(input, limits)?,
            },
        },
        Opcode::Barrier => Event::Barrier {
            barriers: read_list(input, limits)?,
        },
        Opcode::BeginRenderPass => Event::BeginRenderPass {
            render_targets: read_list(input, limits)?,
            depth_stencil: read_option(input, limits)?,
        },
        Opcode::EndRenderPass => Event::EndRenderPass,
        Opcode::BindRenderTargetsAndDepthStencil => Event::BindRenderTargetsAndDepthStencil {
            render_targets: read_list(input, limits)?,
            depth_stencil: read_handle(input)?,
        },
        Opcode::BindPipeline => Event::BindPipeline {
            stages: input.read_u32()?,
            pipeline: read_handle(input)?,
        },
        Opcode::BindPipelineStates => Event::BindPipelineStates {
            states: read_list(input, limits)?,
        },
        Opcode::BindViewports => Event::BindViewports {
            first: input.read_u32()?,
            viewports: read_list(input, limits)?,
        },
        Opcode::BindScissorRects => Event::BindScissorRects {
            first: input.read_u32()?,
            rects: read_list(input, limits)?,
        },
        Opcode::PushConstants => Event::PushConstants {
            stages: input.read_u32()?,
            layout: read_handle(input)?,
            param_index: input.read_u32()?,
            first: input.read_u32()?,
            values: read_u32_values(input, limits)?,
        },
        Opcode::PushDescriptors => Event::PushDescriptors {
            stages: input.read_u32()?,
            layout: read_handle(input)?,
            param_index: input.read_u32()?,
            binding: input.read_u32()?,
            array_offset: input.read_u32()?,
            descriptors: Descriptors::decode_framed(input, limits)?,
        },
        Opcode::BindDescriptorTables => Event::BindDescriptorTables {
            stages: input.read_u32()?,
            layout: read_handle(input)?,
            first: input.read_u32()?,
            tables: read_list(input, limits)?,
        },
        Opcode::BindIndexBuffer => Event::BindIndexBuffer {
            buffer: read_handle(input)?,
            offset: input.read_u64()?,
            index_size: input.read_u32()?,
        },
        Opcode::BindVertexBuffers => Event::BindVertexBuffers {
            first: input.read_u32()?,
            buffers: read_list(input, limits)?,
        },
        Opcode::BindStreamOutputBuffers => Event::BindStreamOutputBuffers {
            first: input.read_u32()?,
            buffers: read_list(input, limits)?,
        },
        Opcode::Draw => Event::Draw {
            vertex_count: input.read_u32()?,
            instance_count: input.read_u32()?,
            first_vertex: input.read_u32()?,
            first_instance: input.read_u32()?,
        },
        Opcode::DrawIndexed => Event::DrawIndexed {
            index_count: input.read_u32()?,
            instance_count: input.read_u32()?,
            first_index: input.read_u32()?,
            vertex_offset: input.read_i32()?,
            first_instance: input.read_u32()?,
        },
        Opcode::Dispatch => Event::Dispatch {
            group_count_x: input.read_u32()?,
            group_count_y: input.read_u32()?,
            group_count_z: input.read_u32()?,
        },
        Opcode::DrawOrDispatchIndirect => Event::DrawOrDispatchIndirect {
            command_type: input.read_u32()?,
            buffer: read_handle(input)?,
            offset: input.read_u64()?,
            draw_count: input.read_u32()?,
            stride: input.read_u32()?,
        },
        Opcode::CopyResource => Event::CopyResource {
            source: read_handle(input)?,
            dest: read_handle(input)?,
        },
        Opcode::CopyBufferRegion => Event::CopyBufferRegion {
            source: read_handle(input)?,
            source_offset: input.read_u64()?,
            dest: read_handle(input)?,
            dest_offset: input.read_u64()?,
            size: input.read_u64()?,
        },
        Opcode::CopyBufferToTexture => Event::CopyBufferToTexture {
            source: read_handle(input)?,
            source_offset: input.read_u64()?,
            row_length: input.read_u32()?,
            slice_height: input.read_u32()?,
            dest: read_handle(input)?,
            dest_subresource: input.read_u32()?,
            dest_region: read_region(input, limits)?,
        },
        Opcode::CopyTextureRegion => Event::CopyTextureRegion {
            source: read_handle(input)?,
            source_subresource: input.read_u32()?,
            source_region: read_region(input, limits)?,
            dest: read_handle(input)?,
            dest_subresource: input.read_u32()?,
            dest_region: read_region(input, limits)?,
            filter: input.read_u32()?,
        },
        Opcode::CopyTextureToBuffer => Event::CopyTextureToBuffer {
            source: read_handle(input)?,
            source_subresource: input.read_u32()?,
            source_region: read_region(input, limits)?,
            dest: read_handle(input)?,
            dest_offset: input.read_u64()?,
            row_length: input.read_u32()?,
            slice_height: input.read_u32()?,
        },
        Opcode::ResolveTextureRegion => Event::ResolveTextureRegion {
            source: read_handle(input)?,
            source_subresource: input.read_u32()?,
            source_region: read_region(input, limits)?,
            dest: read_handle(input)?,
            dest_subresource: input.read_u32()?,
            dest_x: input.read_i32()?,
            dest_y: input.read_i32()?,
            dest_z: input.read_i32()?,
            format: Format::new(input.read_u32()?),
        },
        Opcode::ClearDepthStencilView => {
            let view = read_handle(input)?;
            let depth = if input.read_bool()? {
                Some(input.read_f32()?)
            } else {
                None
            };
            let stencil = if input.read_bool()? {
                Some(input.read_u8()?)
            } else {
                None
            };
            Event::ClearDepthStencilView {
                view,
                depth,
                stencil,
            }
        }
        Opcode::ClearRenderTargetView => Event::ClearRenderTargetView {
            view: read_handle(input)?,
            color: read_f32x4(input)?,
        },
        Opcode::ClearUnorderedAccessViewUint => Event::ClearUnorderedAccessViewUint {
            view: read_handle(input)?,
            values: read_u32x4(input)?,
        },
        Opcode::ClearUnorderedAccessViewFloat => Event::ClearUnorderedAccessViewFloat {
            view: read_handle(input)?,
            values: read_f32x4(input)?,
        },
        Opcode::GenerateMipmaps => Event::GenerateMipmaps {
            view: read_handle(input)?,
        },
        Opcode::BeginQuery => Event::BeginQuery {
            heap: read_handle(input)?,
            query_type: input.read_u32()?,
            index: input.read_u32()?,
        },
        Opcode::EndQuery => Event::EndQuery {
            heap: read_handle(input)?,
            query_type: input.read_u32()?,
            index: input.read_u32()?,
        },
        Opcode::CopyQueryHeapResults => Event::CopyQueryHeapResults {
            heap: read_handle(input)?,
            query_type: input.read_u32()?,
            first: input.read_u32()?,
            count: input.read_u32()?,
            dest: read_handle(input)?,
            dest_offset: input.read_u64()?,
            stride: input.read_u32()?,
        },
        Opcode::ResetCommandList => Event::ResetCommandList,
        Opcode::CloseCommandList => Event::CloseCommandList,
        Opcode::ExecuteCommandList => Event::ExecuteCommandList,
        Opcode::ExecuteSecondaryCommandList => Event::ExecuteSecondaryCommandList,
        Opcode::Present => Event::Present,
    };
    Ok(event)
}
