use wire::{
    encode_event, encode_trace, DecodeError, DeviceApi, Event, Format, Handle, InputElement,
    Limits, MapAccess, Opcode, PipelineLayoutParam, PipelineStateTag, PipelineSubobject,
    PushConstantRange, ResourceDesc, ResourceUsage, ResourceViewDesc, SamplerDesc, ShaderDesc,
    ShaderStage, SubresourceData, TextureDimension, TraceHeader, TraceReader, HEADER_SIZE,
};

fn frame() -> Vec<Event> {
    let texture = ResourceDesc::texture(
        TextureDimension::D2,
        4,
        4,
        1,
        3,
        Format::R8G8B8A8_UNORM,
        ResourceUsage::SHADER_RESOURCE,
    );
    let mip = |width: u32| SubresourceData {
        row_pitch: width * 4,
        slice_pitch: width * width * 4,
        data: vec![0x7F; (width * width * 4) as usize],
    };

    vec![
        Event::InitSwapchain {
            back_buffers: vec![Handle::new(0xB0), Handle::new(0xB1)],
        },
        Event::InitSampler {
            desc: SamplerDesc::default(),
            handle: Handle::new(0x51),
        },
        Event::InitResource {
            desc: ResourceDesc::buffer(16, ResourceUsage::CONSTANT_BUFFER),
            initial_state: ResourceUsage::from_raw(ResourceUsage::CONSTANT_BUFFER),
            handle: Handle::new(7),
            initial_data: vec![SubresourceData::buffer((0..16).collect())],
        },
        Event::InitResource {
            desc: texture,
            initial_state: ResourceUsage::from_raw(ResourceUsage::SHADER_RESOURCE),
            handle: Handle::new(8),
            initial_data: vec![mip(4), mip(2), mip(1)],
        },
        Event::InitResourceView {
            resource: Handle::new(8),
            usage: ResourceUsage::from_raw(ResourceUsage::SHADER_RESOURCE),
            desc: ResourceViewDesc::Texture {
                view_type: 3,
                format: Format::R8G8B8A8_UNORM,
                first_level: 0,
                level_count: 3,
                first_layer: 0,
                layer_count: 1,
            },
            handle: Handle::new(0x81),
        },
        Event::InitPipelineLayout {
            params: vec![PipelineLayoutParam::PushConstants(PushConstantRange {
                count: 4,
                ..PushConstantRange::default()
            })],
            handle: Handle::new(0x1A),
        },
        Event::InitPipeline {
            layout: Handle::new(0x1A),
            subobjects: vec![
                PipelineSubobject::Shader(
                    ShaderStage::Vertex,
                    ShaderDesc {
                        code: b"ABC".to_vec(),
                        entry_point: "main".into(),
                    },
                ),
                PipelineSubobject::InputLayout(vec![InputElement {
                    semantic: "POSITION".into(),
                    format: Format::R32G32B32_FLOAT,
                    stride: 12,
                    ..InputElement::default()
                }]),
                PipelineSubobject::State(PipelineStateTag::PrimitiveTopology),
            ],
            handle: Handle::new(0x99),
        },
        Event::MapBufferRegion {
            resource: Handle::new(7),
            offset: 0,
            size: 16,
            access: MapAccess::WriteDiscard,
        },
        Event::UnmapBufferRegion {
            resource: Handle::new(7),
            offset: 0,
            size: 16,
            access: MapAccess::WriteDiscard,
            data: vec![0xEE; 16],
        },
        Event::BindPipeline {
            stages: 0x1,
            pipeline: Handle::new(0x99),
        },
        Event::Draw {
            vertex_count: 3,
            instance_count: 1,
            first_vertex: 0,
            first_instance: 0,
        },
        Event::BeginQuery {
            heap: Handle::new(0x33),
            query_type: 0,
            index: 0,
        },
        Event::Present,
    ]
}

#[test]
fn multi_frame_trace_roundtrip() {
    let mut events = frame();
    events.extend(frame());
    let bytes = encode_trace(&TraceHeader::new(DeviceApi::D3D11), &events).unwrap();

    let mut reader = TraceReader::open(&bytes, Limits::default()).unwrap();
    let mut presents = 0;
    let mut decoded = Vec::new();
    while let Some(event) = reader.read_event().unwrap() {
        if event.is_present() {
            presents += 1;
        }
        decoded.push(event);
    }
    assert_eq!(presents, 2);
    assert_eq!(decoded, events);
}

#[test]
fn records_tile_the_trace() {
    let events = frame();
    let bytes = encode_trace(&TraceHeader::new(DeviceApi::Vulkan), &events).unwrap();
    let mut reader = TraceReader::open(&bytes, Limits::default()).unwrap();

    let mut expected_offset = HEADER_SIZE;
    while let Some(record) = reader.read_record().unwrap() {
        assert_eq!(record.offset, expected_offset);
        let opcode = u32::from_le_bytes(bytes[record.offset..record.offset + 4].try_into().unwrap());
        assert_eq!(opcode, record.event.opcode().raw());
        expected_offset += record.len;
    }
    assert_eq!(expected_offset, bytes.len());
}

#[test]
fn every_cut_point_ends_cleanly() {
    let events = frame();
    let bytes = encode_trace(&TraceHeader::new(DeviceApi::OpenGL), &events).unwrap();

    for cut in HEADER_SIZE..bytes.len() {
        let mut reader = TraceReader::open(&bytes[..cut], Limits::default()).unwrap();
        let mut count = 0;
        while let Some(event) = reader.read_event().unwrap() {
            assert_eq!(event, events[count]);
            count += 1;
        }
        assert!(count < events.len(), "cut at {cut} decoded everything");
    }
}

#[test]
fn limits_reject_oversized_blobs() {
    let event = Event::UpdateBufferRegion {
        resource: Handle::new(1),
        offset: 0,
        data: vec![0; 8192],
    };
    let bytes = encode_trace(&TraceHeader::new(DeviceApi::D3D12), [&event]).unwrap();
    let mut reader = TraceReader::open(&bytes, Limits::for_testing()).unwrap();
    assert!(matches!(
        reader.read_event(),
        Err(DecodeError::LimitsExceeded { .. })
    ));
    assert_eq!(reader.read_event().unwrap(), None);
}

#[test]
fn encoder_writes_opcode_word_first() {
    for event in frame() {
        let mut writer = bytestream::ByteWriter::new();
        encode_event(&event, &mut writer).unwrap();
        let bytes = writer.finish();
        let word = u32::from_le_bytes(bytes[..4].try_into().unwrap());
        assert_eq!(Opcode::parse(word).unwrap(), event.opcode());
    }
}
