use std::sync::Arc;
use std::thread;

use capture::{mapped_memory, CaptureError, HostSubresource, TraceRecorder};
use proptest::prelude::*;
use wire::{
    DeviceApi, Event, Format, Handle, Limits, MapAccess, Opcode, ResourceDesc, ResourceUsage,
    SubresourceBox, SubresourceData, TextureDimension, TraceReader,
};

fn decode(bytes: &[u8]) -> Vec<Event> {
    TraceReader::open(bytes, Limits::default())
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap()
}

fn draw(vertex_count: u32) -> Event {
    Event::Draw {
        vertex_count,
        instance_count: 1,
        first_vertex: 0,
        first_instance: 0,
    }
}

#[test]
fn concurrent_threads_produce_whole_events() {
    const THREADS: u32 = 4;
    const PER_THREAD: u32 = 250;

    let recorder = Arc::new(TraceRecorder::new(Vec::new(), DeviceApi::D3D12).unwrap());
    let workers: Vec<_> = (0..THREADS)
        .map(|worker| {
            let recorder = Arc::clone(&recorder);
            thread::spawn(move || {
                for i in 0..PER_THREAD {
                    recorder.record(&draw(worker * 1000 + i)).unwrap();
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    let recorder = Arc::try_unwrap(recorder).unwrap();
    assert_eq!(recorder.stats().events, u64::from(THREADS * PER_THREAD));
    let events = decode(&recorder.finish().unwrap());
    assert_eq!(events.len(), (THREADS * PER_THREAD) as usize);

    // each thread's own events keep their relative order
    for worker in 0..THREADS {
        let counts: Vec<u32> = events
            .iter()
            .filter_map(|event| match event {
                Event::Draw { vertex_count, .. } if vertex_count / 1000 == worker => {
                    Some(*vertex_count)
                }
                _ => None,
            })
            .collect();
        let expected: Vec<u32> = (0..PER_THREAD).map(|i| worker * 1000 + i).collect();
        assert_eq!(counts, expected);
    }
}

#[test]
fn writes_while_mapped_are_captured_at_unmap() {
    let recorder = TraceRecorder::new(Vec::new(), DeviceApi::Vulkan).unwrap();
    let desc = ResourceDesc::texture(
        TextureDimension::D2,
        8,
        8,
        1,
        1,
        Format::R8G8B8A8_UNORM,
        ResourceUsage::SHADER_RESOURCE,
    );
    let memory = mapped_memory(256);
    let region = SubresourceBox::new([0, 0, 0], [2, 2, 1]);

    recorder
        .on_map_texture_region(Handle::new(11), 0, Some(&region), MapAccess::WriteOnly, &memory, 8, 16)
        .unwrap();
    memory.lock()[..16].fill(0xEE);
    recorder.on_unmap_texture_region(&desc, Handle::new(11), 0).unwrap();

    let events = decode(&recorder.finish().unwrap());
    assert_eq!(events.len(), 2);
    assert_eq!(
        events[1],
        Event::UnmapTextureRegion {
            resource: Handle::new(11),
            subresource: 0,
            region: Some(region),
            access: MapAccess::WriteOnly,
            data: vec![0xEE; 16],
        }
    );
}

#[test]
fn nested_unmaps_emit_one_payload() {
    let recorder = TraceRecorder::new(Vec::new(), DeviceApi::D3D11).unwrap();
    let desc = ResourceDesc::buffer(4, ResourceUsage::VERTEX_BUFFER);
    let memory = mapped_memory(4);

    for _ in 0..3 {
        recorder
            .on_map_buffer_region(&desc, Handle::new(2), 0, 4, MapAccess::WriteOnly, &memory)
            .unwrap();
    }
    assert_eq!(recorder.open_mappings(), 1);
    memory.lock().copy_from_slice(&[1, 2, 3, 4]);
    for _ in 0..3 {
        recorder.on_unmap_buffer_region(Handle::new(2)).unwrap();
    }
    assert_eq!(recorder.open_mappings(), 0);
    assert!(recorder.on_unmap_buffer_region(Handle::new(2)).is_err());

    let payloads: Vec<Vec<u8>> = decode(&recorder.finish().unwrap())
        .into_iter()
        .filter_map(|event| match event {
            Event::UnmapBufferRegion { data, .. } => Some(data),
            _ => None,
        })
        .collect();
    assert_eq!(payloads, vec![vec![], vec![], vec![1, 2, 3, 4]]);
}

#[test]
fn init_and_update_round_trip_through_reader() {
    let recorder = TraceRecorder::new(Vec::new(), DeviceApi::D3D11).unwrap();
    let desc = ResourceDesc::buffer(8, ResourceUsage::CONSTANT_BUFFER);
    let bytes = [5u8; 12];

    recorder
        .on_init_resource(
            &desc,
            Some(&[HostSubresource::buffer(&bytes)]),
            ResourceUsage::default(),
            Handle::new(7),
        )
        .unwrap();
    recorder
        .on_update_buffer_region(&desc, Handle::new(7), 0, u64::MAX, &bytes)
        .unwrap();
    recorder.record(&Event::Present).unwrap();

    let opcodes: Vec<Opcode> = decode(&recorder.finish().unwrap())
        .iter()
        .map(Event::opcode)
        .collect();
    assert_eq!(
        opcodes,
        vec![Opcode::InitResource, Opcode::UpdateBufferRegion, Opcode::Present]
    );
}

#[test]
fn sized_uploads_must_use_their_hooks() {
    let recorder = TraceRecorder::new(Vec::new(), DeviceApi::D3D12).unwrap();
    let desc = ResourceDesc::texture(
        TextureDimension::D2,
        4,
        4,
        1,
        1,
        Format::R8G8B8A8_UNORM,
        ResourceUsage::SHADER_RESOURCE,
    );
    let texture = Handle::new(12);

    // a 3-byte payload for a 64-byte level
    let short_upload = Event::UpdateTextureRegion {
        resource: texture,
        subresource: 0,
        region: None,
        data: SubresourceData {
            row_pitch: 16,
            slice_pitch: 64,
            data: vec![1, 2, 3],
        },
    };
    let buffer_upload = Event::UpdateBufferRegion {
        resource: Handle::new(13),
        offset: 0,
        data: vec![0; 4],
    };
    let init = Event::InitResource {
        desc,
        initial_state: ResourceUsage::default(),
        handle: texture,
        initial_data: Vec::new(),
    };
    for event in [&short_upload, &buffer_upload, &init] {
        let err = recorder.record(event).unwrap_err();
        assert!(matches!(err, CaptureError::HookRequired { opcode } if opcode == event.opcode()));
    }
    assert_eq!(recorder.stats().events, 0);

    recorder
        .on_init_resource(&desc, None, ResourceUsage::default(), texture)
        .unwrap();
    let err = recorder
        .on_update_texture_region(
            &desc,
            texture,
            0,
            None,
            HostSubresource {
                data: &[1, 2, 3],
                row_pitch: 16,
                slice_pitch: 64,
            },
        )
        .unwrap_err();
    assert!(matches!(err, CaptureError::ShortData { expected: 64, actual: 3, .. }));

    let texels = [7u8; 80];
    recorder
        .on_update_texture_region(
            &desc,
            texture,
            0,
            None,
            HostSubresource {
                data: &texels,
                row_pitch: 16,
                slice_pitch: 64,
            },
        )
        .unwrap();
    let events = decode(&recorder.finish().unwrap());
    assert!(matches!(
        &events[1],
        Event::UpdateTextureRegion { data, .. } if data.data == vec![7u8; 64]
    ));
}

proptest! {
    #[test]
    fn prop_balanced_maps_finalize_once(depth in 1usize..16, fill in any::<u8>()) {
        let recorder = TraceRecorder::new(Vec::new(), DeviceApi::D3D11).unwrap();
        let desc = ResourceDesc::buffer(16, 0);
        let memory = mapped_memory(16);
        for _ in 0..depth {
            recorder
                .on_map_buffer_region(&desc, Handle::new(1), 0, 16, MapAccess::WriteDiscard, &memory)
                .unwrap();
        }
        memory.lock().fill(fill);
        for _ in 0..depth {
            recorder.on_unmap_buffer_region(Handle::new(1)).unwrap();
        }

        let with_data = decode(&recorder.finish().unwrap())
            .into_iter()
            .filter(|event| matches!(event, Event::UnmapBufferRegion { data, .. } if !data.is_empty()))
            .count();
        prop_assert_eq!(with_data, 1);
    }
}
