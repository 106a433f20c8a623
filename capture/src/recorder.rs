//! Per-device trace recorder.

use std::io::Write;

use bytestream::ByteWriter;
use parking_lot::Mutex;
use tracing::{debug, trace, warn};
use wire::{
    encode_event, encode_header, subresource_size, DeviceApi, Event, Handle, MapAccess,
    ResourceDesc, ResourceShape, ResourceUsage, SubresourceBox, SubresourceData, TextureDesc,
    TraceHeader,
};

use crate::error::{CaptureError, CaptureResult};
use crate::mapping::{MapTarget, MappedMemory, MappingTracker, Unmapped};

/// Host-provided contents of one subresource.
///
/// `data` may be longer than the payload; only the calculated size is recorded.
#[derive(Debug, Clone, Copy)]
pub struct HostSubresource<'a> {
    pub data: &'a [u8],
    pub row_pitch: u32,
    pub slice_pitch: u32,
}

impl<'a> HostSubresource<'a> {
    /// Buffer contents carry no pitches.
    #[must_use]
    pub const fn buffer(data: &'a [u8]) -> Self {
        Self {
            data,
            row_pitch: 0,
            slice_pitch: 0,
        }
    }
}

/// Counters of a recorder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecorderStats {
    pub events: u64,
    pub bytes: u64,
    pub frames: u64,
}

struct RecorderState<W> {
    sink: W,
    scratch: ByteWriter,
    mappings: MappingTracker,
    stats: RecorderStats,
}

impl<W: Write> RecorderState<W> {
    /// Encodes into scratch space first so a failed encode writes nothing.
    fn commit(&mut self, event: &Event) -> CaptureResult<()> {
        self.scratch.clear();
        encode_event(event, &mut self.scratch)?;
        self.sink.write_all(self.scratch.as_bytes())?;
        self.stats.events += 1;
        self.stats.bytes += self.scratch.len() as u64;
        if event.is_present() {
            self.stats.frames += 1;
        }
        trace!(opcode = %event.opcode(), bytes = self.scratch.len(), "recorded event");
        Ok(())
    }
}

/// Writes the trace of one device.
///
/// Every hook takes `&self` and serializes on one lock, so events from all
/// recording threads land in a single total order.
pub struct TraceRecorder<W: Write> {
    api: DeviceApi,
    state: Mutex<RecorderState<W>>,
}

impl<W: Write> std::fmt::Debug for TraceRecorder<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TraceRecorder")
            .field("api", &self.api)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

impl<W: Write> TraceRecorder<W> {
    /// Writes the header and returns a recorder appending to `sink`.
    pub fn new(mut sink: W, api: DeviceApi) -> CaptureResult<Self> {
        let mut scratch = ByteWriter::new();
        encode_header(&TraceHeader::new(api), &mut scratch);
        sink.write_all(scratch.as_bytes())?;
        debug!(api = api.name(), "trace recorder started");
        Ok(Self {
            api,
            state: Mutex::new(RecorderState {
                sink,
                scratch,
                mappings: MappingTracker::new(),
                stats: RecorderStats::default(),
            }),
        })
    }

    #[must_use]
    pub const fn api(&self) -> DeviceApi {
        self.api
    }

    #[must_use]
    pub fn stats(&self) -> RecorderStats {
        self.state.lock().stats
    }

    /// Number of mappings not yet unmapped.
    #[must_use]
    pub fn open_mappings(&self) -> usize {
        self.state.lock().mappings.len()
    }

    /// Records an event whose payload needs no host state.
    ///
    /// Map and unmap events and calculator-sized uploads are rejected; they
    /// must go through their `on_*` hooks.
    pub fn record(&self, event: &Event) -> CaptureResult<()> {
        let opcode = event.opcode();
        if opcode.is_host_hook() {
            return Err(CaptureError::HookRequired { opcode });
        }
        let mut state = self.state.lock();
        if let Event::DestroyResource { handle } = event {
            let dropped = state.mappings.forget(*handle);
            if dropped > 0 {
                warn!(resource = handle.raw(), dropped, "resource destroyed while mapped");
            }
        }
        state.commit(event)
    }

    /// Records resource creation, sizing initial data from the description.
    pub fn on_init_resource(
        &self,
        desc: &ResourceDesc,
        initial_data: Option<&[HostSubresource<'_>]>,
        initial_state: ResourceUsage,
        handle: Handle,
    ) -> CaptureResult<()> {
        let initial_data = match (initial_data, &desc.shape) {
            (None, _) => Vec::new(),
            (Some(data), ResourceShape::Buffer { size, .. }) => {
                let first = data
                    .first()
                    .ok_or_else(|| CaptureError::short(handle, *size, 0))?;
                vec![SubresourceData::buffer(take(handle, first.data, *size)?.to_vec())]
            }
            (Some(data), ResourceShape::Texture(texture)) => {
                texture_initial_data(handle, texture, data)?
            }
        };
        debug!(
            resource = handle.raw(),
            subresources = initial_data.len(),
            "init resource"
        );
        self.state.lock().commit(&Event::InitResource {
            desc: *desc,
            initial_state,
            handle,
            initial_data,
        })
    }

    /// Records a buffer map. A `size` of `u64::MAX` maps the whole buffer.
    pub fn on_map_buffer_region(
        &self,
        desc: &ResourceDesc,
        resource: Handle,
        offset: u64,
        size: u64,
        access: MapAccess,
        memory: &MappedMemory,
    ) -> CaptureResult<()> {
        let buffer_size = desc.buffer_size().ok_or(CaptureError::WrongResourceKind {
            resource: resource.raw(),
            expected: "buffer",
        })?;
        let size = if size == u64::MAX { buffer_size } else { size };

        let mut state = self.state.lock();
        state.commit(&Event::MapBufferRegion {
            resource,
            offset,
            size,
            access,
        })?;
        state
            .mappings
            .on_map(resource, MapTarget::Buffer { offset, size }, access, memory);
        Ok(())
    }

    /// Records a buffer unmap with the bytes written while mapped.
    ///
    /// The payload is taken before the tracker is touched, so a failed unmap
    /// leaves the mapping open.
    pub fn on_unmap_buffer_region(&self, resource: Handle) -> CaptureResult<()> {
        let mut state = self.state.lock();
        let record = state
            .mappings
            .peek(resource, None)
            .ok_or_else(|| CaptureError::unmatched(resource, None))?;
        let MapTarget::Buffer { offset, size } = record.target else {
            return Err(CaptureError::unmatched(resource, None));
        };
        let access = record.access;
        let data = if record.refs() == 1 && access.is_writable() {
            let memory = record.memory.lock();
            let bytes = take(resource, &memory, size)?.to_vec();
            bytes
        } else {
            Vec::new()
        };

        if let Unmapped::Nested { remaining, .. } = state.mappings.on_unmap(resource, None)? {
            warn!(resource = resource.raw(), remaining, "nested buffer unmap");
        }
        state.commit(&Event::UnmapBufferRegion {
            resource,
            offset,
            size,
            access,
            data,
        })
    }

    /// Records a texture map.
    #[allow(clippy::too_many_arguments)]
    pub fn on_map_texture_region(
        &self,
        resource: Handle,
        subresource: u32,
        region: Option<&SubresourceBox>,
        access: MapAccess,
        memory: &MappedMemory,
        row_pitch: u32,
        slice_pitch: u32,
    ) -> CaptureResult<()> {
        let region = region.copied();
        let mut state = self.state.lock();
        state.commit(&Event::MapTextureRegion {
            resource,
            subresource,
            region,
            access,
        })?;
        let target = MapTarget::Texture {
            subresource,
            region,
            row_pitch,
            slice_pitch,
        };
        let refs = state.mappings.on_map(resource, target, access, memory);
        if refs > 1 {
            debug!(resource = resource.raw(), subresource, refs, "nested texture map");
        }
        Ok(())
    }

    /// Records a texture unmap, sizing the payload with the calculator.
    pub fn on_unmap_texture_region(
        &self,
        desc: &ResourceDesc,
        resource: Handle,
        subresource: u32,
    ) -> CaptureResult<()> {
        let texture = desc.as_texture().ok_or(CaptureError::WrongResourceKind {
            resource: resource.raw(),
            expected: "texture",
        })?;

        let mut state = self.state.lock();
        let record = state
            .mappings
            .peek(resource, Some(subresource))
            .ok_or_else(|| CaptureError::unmatched(resource, Some(subresource)))?;
        let MapTarget::Texture {
            region,
            row_pitch,
            slice_pitch,
            ..
        } = record.target
        else {
            return Err(CaptureError::unmatched(resource, Some(subresource)));
        };
        let access = record.access;
        let data = if record.refs() == 1 && access.is_writable() {
            let size = subresource_size(texture, subresource, row_pitch, slice_pitch, region.as_ref());
            let memory = record.memory.lock();
            let bytes = take(resource, &memory, size)?.to_vec();
            bytes
        } else {
            Vec::new()
        };

        if let Unmapped::Nested { remaining, .. } = state.mappings.on_unmap(resource, Some(subresource))? {
            warn!(resource = resource.raw(), subresource, remaining, "nested texture unmap");
        }
        state.commit(&Event::UnmapTextureRegion {
            resource,
            subresource,
            region,
            access,
            data,
        })
    }

    /// Records a buffer upload. A `size` of `u64::MAX` covers the whole buffer.
    pub fn on_update_buffer_region(
        &self,
        desc: &ResourceDesc,
        resource: Handle,
        offset: u64,
        size: u64,
        data: &[u8],
    ) -> CaptureResult<()> {
        let buffer_size = desc.buffer_size().ok_or(CaptureError::WrongResourceKind {
            resource: resource.raw(),
            expected: "buffer",
        })?;
        let size = if size == u64::MAX { buffer_size } else { size };
        let data = take(resource, data, size)?.to_vec();
        self.state.lock().commit(&Event::UpdateBufferRegion {
            resource,
            offset,
            data,
        })
    }

    /// Records a texture upload, sizing the payload with the calculator.
    pub fn on_update_texture_region(
        &self,
        desc: &ResourceDesc,
        resource: Handle,
        subresource: u32,
        region: Option<&SubresourceBox>,
        data: HostSubresource<'_>,
    ) -> CaptureResult<()> {
        let texture = desc.as_texture().ok_or(CaptureError::WrongResourceKind {
            resource: resource.raw(),
            expected: "texture",
        })?;
        let size = subresource_size(texture, subresource, data.row_pitch, data.slice_pitch, region);
        let bytes = take(resource, data.data, size)?.to_vec();
        self.state.lock().commit(&Event::UpdateTextureRegion {
            resource,
            subresource,
            region: region.copied(),
            data: SubresourceData {
                row_pitch: data.row_pitch,
                slice_pitch: data.slice_pitch,
                data: bytes,
            },
        })
    }

    /// Flushes the sink.
    pub fn flush(&self) -> CaptureResult<()> {
        self.state.lock().sink.flush()?;
        Ok(())
    }

    /// Flushes and returns the sink.
    pub fn finish(self) -> CaptureResult<W> {
        let mut state = self.state.into_inner();
        if !state.mappings.is_empty() {
            warn!(open = state.mappings.len(), "trace finished with open mappings");
        }
        state.sink.flush()?;
        debug!(
            events = state.stats.events,
            bytes = state.stats.bytes,
            frames = state.stats.frames,
            "trace recorder finished"
        );
        Ok(state.sink)
    }
}

fn take(resource: Handle, data: &[u8], size: u64) -> CaptureResult<&[u8]> {
    usize::try_from(size)
        .ok()
        .and_then(|len| data.get(..len))
        .ok_or_else(|| CaptureError::short(resource, size, data.len()))
}

fn texture_initial_data(
    handle: Handle,
    texture: &TextureDesc,
    data: &[HostSubresource<'_>],
) -> CaptureResult<Vec<SubresourceData>> {
    let count = texture.subresource_count() as usize;
    if data.len() < count {
        return Err(CaptureError::short(handle, count as u64, data.len()));
    }
    (0u32..)
        .zip(&data[..count])
        .map(|(subresource, host)| {
            let size = subresource_size(texture, subresource, host.row_pitch, host.slice_pitch, None);
            Ok(SubresourceData {
                row_pitch: host.row_pitch,
                slice_pitch: host.slice_pitch,
                data: take(handle, host.data, size)?.to_vec(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::mapped_memory;
    use wire::{Format, Limits, ResourceViewDesc, TextureDimension, TraceReader};

    fn events(bytes: &[u8]) -> Vec<Event> {
        TraceReader::open(bytes, Limits::default())
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap()
    }

    fn texture_desc() -> ResourceDesc {
        ResourceDesc::texture(
            TextureDimension::D2,
            4,
            4,
            1,
            2,
            Format::R8G8B8A8_UNORM,
            ResourceUsage::SHADER_RESOURCE,
        )
    }

    #[test]
    fn header_written_on_creation() {
        let recorder = TraceRecorder::new(Vec::new(), DeviceApi::D3D11).unwrap();
        let bytes = recorder.finish().unwrap();
        assert_eq!(bytes.len(), wire::HEADER_SIZE);
        assert_eq!(&bytes[..8], b"APITRACE");
    }

    #[test]
    fn mapping_events_rejected_by_record() {
        let recorder = TraceRecorder::new(Vec::new(), DeviceApi::D3D12).unwrap();
        let err = recorder
            .record(&Event::MapBufferRegion {
                resource: Handle::new(1),
                offset: 0,
                size: 4,
                access: MapAccess::WriteOnly,
            })
            .unwrap_err();
        assert!(matches!(err, CaptureError::HookRequired { .. }));
        assert_eq!(recorder.stats().events, 0);
    }

    #[test]
    fn failed_encode_writes_nothing() {
        let recorder = TraceRecorder::new(Vec::new(), DeviceApi::D3D12).unwrap();
        let bad = Event::InitResourceView {
            resource: Handle::new(1),
            usage: ResourceUsage::from_raw(ResourceUsage::SHADER_RESOURCE),
            desc: ResourceViewDesc::Texture {
                view_type: ResourceViewDesc::BUFFER_VIEW_TYPE,
                format: Format::R8G8B8A8_UNORM,
                first_level: 0,
                level_count: 1,
                first_layer: 0,
                layer_count: 1,
            },
            handle: Handle::new(2),
        };
        assert!(matches!(recorder.record(&bad), Err(CaptureError::Encode(_))));
        recorder.record(&Event::Present).unwrap();
        assert_eq!(events(&recorder.finish().unwrap()), vec![Event::Present]);
    }

    #[test]
    fn short_mapped_memory_keeps_mapping_open() {
        let recorder = TraceRecorder::new(Vec::new(), DeviceApi::D3D11).unwrap();
        let desc = ResourceDesc::buffer(32, ResourceUsage::CONSTANT_BUFFER);
        let memory = mapped_memory(4);
        recorder
            .on_map_buffer_region(&desc, Handle::new(8), 0, 32, MapAccess::WriteOnly, &memory)
            .unwrap();

        let err = recorder.on_unmap_buffer_region(Handle::new(8)).unwrap_err();
        assert!(matches!(err, CaptureError::ShortData { expected: 32, actual: 4, .. }));
        assert_eq!(recorder.open_mappings(), 1);
        assert_eq!(recorder.stats().events, 1);

        memory.lock().resize(32, 1);
        recorder.on_unmap_buffer_region(Handle::new(8)).unwrap();
        assert_eq!(recorder.open_mappings(), 0);
        let decoded = events(&recorder.finish().unwrap());
        assert!(matches!(&decoded[1], Event::UnmapBufferRegion { data, .. } if data[4..] == [1; 28]));
    }

    #[test]
    fn short_texture_memory_keeps_mapping_open() {
        let recorder = TraceRecorder::new(Vec::new(), DeviceApi::D3D12).unwrap();
        let memory = mapped_memory(16);
        recorder
            .on_map_texture_region(Handle::new(3), 0, None, MapAccess::WriteOnly, &memory, 16, 64)
            .unwrap();
        let err = recorder
            .on_unmap_texture_region(&texture_desc(), Handle::new(3), 0)
            .unwrap_err();
        assert!(matches!(err, CaptureError::ShortData { expected: 64, actual: 16, .. }));
        assert_eq!(recorder.open_mappings(), 1);
    }

    #[test]
    fn init_texture_trims_host_padding() {
        let recorder = TraceRecorder::new(Vec::new(), DeviceApi::Vulkan).unwrap();
        let level0 = vec![1u8; 128];
        let level1 = vec![2u8; 64];
        let host = [
            HostSubresource {
                data: &level0,
                row_pitch: 16,
                slice_pitch: 64,
            },
            HostSubresource {
                data: &level1,
                row_pitch: 8,
                slice_pitch: 16,
            },
        ];
        recorder
            .on_init_resource(&texture_desc(), Some(&host), ResourceUsage::default(), Handle::new(5))
            .unwrap();

        let decoded = events(&recorder.finish().unwrap());
        let Event::InitResource { initial_data, .. } = &decoded[0] else {
            panic!("expected init_resource");
        };
        assert_eq!(initial_data[0].data.len(), 64);
        assert_eq!(initial_data[1].data, vec![2u8; 16]);
    }

    #[test]
    fn whole_buffer_map_uses_description_size() {
        let recorder = TraceRecorder::new(Vec::new(), DeviceApi::D3D11).unwrap();
        let desc = ResourceDesc::buffer(32, ResourceUsage::CONSTANT_BUFFER);
        let memory = mapped_memory(32);
        recorder
            .on_map_buffer_region(&desc, Handle::new(3), 0, u64::MAX, MapAccess::WriteDiscard, &memory)
            .unwrap();
        memory.lock()[..4].copy_from_slice(&[9, 8, 7, 6]);
        recorder.on_unmap_buffer_region(Handle::new(3)).unwrap();
        assert_eq!(recorder.open_mappings(), 0);

        let decoded = events(&recorder.finish().unwrap());
        assert_eq!(
            decoded[0],
            Event::MapBufferRegion {
                resource: Handle::new(3),
                offset: 0,
                size: 32,
                access: MapAccess::WriteDiscard
            }
        );
        let Event::UnmapBufferRegion { size, data, .. } = &decoded[1] else {
            panic!("expected unmap");
        };
        assert_eq!(*size, 32);
        assert_eq!(&data[..4], &[9, 8, 7, 6]);
    }

    #[test]
    fn read_only_unmap_carries_no_bytes() {
        let recorder = TraceRecorder::new(Vec::new(), DeviceApi::D3D11).unwrap();
        let desc = ResourceDesc::buffer(8, 0);
        let memory = mapped_memory(8);
        recorder
            .on_map_buffer_region(&desc, Handle::new(1), 0, 8, MapAccess::ReadOnly, &memory)
            .unwrap();
        recorder.on_unmap_buffer_region(Handle::new(1)).unwrap();
        let decoded = events(&recorder.finish().unwrap());
        assert!(matches!(&decoded[1], Event::UnmapBufferRegion { data, .. } if data.is_empty()));
    }

    #[test]
    fn wrong_resource_kind() {
        let recorder = TraceRecorder::new(Vec::new(), DeviceApi::D3D11).unwrap();
        let err = recorder
            .on_update_buffer_region(&texture_desc(), Handle::new(1), 0, 4, &[0; 4])
            .unwrap_err();
        assert!(matches!(err, CaptureError::WrongResourceKind { expected: "buffer", .. }));
    }

    #[test]
    fn short_upload_is_rejected() {
        let recorder = TraceRecorder::new(Vec::new(), DeviceApi::D3D11).unwrap();
        let err = recorder
            .on_update_texture_region(
                &texture_desc(),
                Handle::new(1),
                0,
                None,
                HostSubresource {
                    data: &[0; 10],
                    row_pitch: 16,
                    slice_pitch: 64,
                },
            )
            .unwrap_err();
        assert!(matches!(
            err,
            CaptureError::ShortData {
                expected: 64,
                actual: 10,
                ..
            }
        ));
    }

    #[test]
    fn destroy_while_mapped_drops_mapping() {
        let recorder = TraceRecorder::new(Vec::new(), DeviceApi::D3D11).unwrap();
        let memory = mapped_memory(64);
        recorder
            .on_map_texture_region(Handle::new(4), 0, None, MapAccess::WriteOnly, &memory, 16, 64)
            .unwrap();
        recorder
            .record(&Event::DestroyResource {
                handle: Handle::new(4),
            })
            .unwrap();
        assert_eq!(recorder.open_mappings(), 0);
    }
}
