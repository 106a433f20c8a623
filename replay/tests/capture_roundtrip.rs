use capture::{mapped_memory, HostSubresource, TraceRecorder};
use proptest::prelude::*;
use replay::{FrameOutcome, HeadlessDevice, LiveHandle, Player};
use wire::{
    DeviceApi, Event, Format, Handle, Limits, MapAccess, ResourceDesc, ResourceUsage,
    SubresourceBox, TextureDimension,
};

fn present(recorder: &TraceRecorder<Vec<u8>>) {
    recorder.record(&Event::Present).unwrap();
}

#[test]
fn captured_session_replays_headless() {
    let api = DeviceApi::D3D11;
    let recorder = TraceRecorder::new(Vec::new(), api).unwrap();

    let buffer = Handle::new(0x10);
    let buffer_desc = ResourceDesc::buffer(16, ResourceUsage::VERTEX_BUFFER);
    recorder
        .on_init_resource(
            &buffer_desc,
            Some(&[HostSubresource::buffer(&[1; 16])]),
            ResourceUsage::default(),
            buffer,
        )
        .unwrap();

    let texture = Handle::new(0x20);
    let texture_desc = ResourceDesc::texture(
        TextureDimension::D2,
        2,
        2,
        1,
        1,
        Format::R8G8B8A8_UNORM,
        ResourceUsage::SHADER_RESOURCE,
    );
    recorder
        .on_init_resource(&texture_desc, None, ResourceUsage::default(), texture)
        .unwrap();
    present(&recorder);

    // frame 2: map, write while mapped, unmap
    let memory = mapped_memory(16);
    recorder
        .on_map_buffer_region(&buffer_desc, buffer, 0, u64::MAX, MapAccess::WriteDiscard, &memory)
        .unwrap();
    memory.lock()[4..8].copy_from_slice(&[7, 7, 7, 7]);
    recorder.on_unmap_buffer_region(buffer).unwrap();

    let texels = mapped_memory(16);
    texels.lock().copy_from_slice(&[9; 16]);
    recorder
        .on_map_texture_region(texture, 0, None, MapAccess::WriteOnly, &texels, 8, 16)
        .unwrap();
    recorder.on_unmap_texture_region(&texture_desc, texture, 0).unwrap();
    present(&recorder);

    // frame 3: partial update, then the buffer goes away
    recorder
        .on_update_buffer_region(&buffer_desc, buffer, 14, 2, &[5, 5])
        .unwrap();
    present(&recorder);
    recorder.record(&Event::DestroyResource { handle: buffer }).unwrap();

    let bytes = recorder.finish().unwrap();

    let mut device = HeadlessDevice::new(api, 2, 64, 64);
    let mut player = Player::open(&bytes, Limits::default()).unwrap();

    assert_eq!(player.play_frame(&mut device).unwrap(), FrameOutcome::Presented);
    let live_buffer = player.context().tables().resources.resolve(buffer);
    let live_texture = player.context().tables().resources.resolve(texture);
    assert_eq!(device.buffer_data(live_buffer), Some(&[1; 16][..]));

    assert_eq!(player.play_frame(&mut device).unwrap(), FrameOutcome::Presented);
    // the whole mapped range is uploaded, including bytes never written
    let mut expected = [0; 16];
    expected[4..8].copy_from_slice(&[7; 4]);
    assert_eq!(device.buffer_data(live_buffer), Some(&expected[..]));
    assert_eq!(device.texture_data(live_texture, 0), Some(&[9; 16][..]));

    assert_eq!(player.play_frame(&mut device).unwrap(), FrameOutcome::Presented);
    assert_eq!(&device.buffer_data(live_buffer).unwrap()[14..], &[5, 5]);

    assert_eq!(player.play_frame(&mut device).unwrap(), FrameOutcome::EndOfTrace);
    assert!(!device.is_live(live_buffer));
    assert!(player.context().tables().resources.resolve(buffer).is_null());
    assert_eq!(player.stats().frames, 3);
}

#[test]
fn texture_region_unmap_lands_in_subresource() {
    let api = DeviceApi::D3D12;
    let recorder = TraceRecorder::new(Vec::new(), api).unwrap();
    let texture = Handle::new(1);
    let desc = ResourceDesc::texture(
        TextureDimension::D2,
        4,
        4,
        1,
        1,
        Format::R8G8B8A8_UNORM,
        ResourceUsage::SHADER_RESOURCE,
    );
    recorder
        .on_init_resource(&desc, None, ResourceUsage::default(), texture)
        .unwrap();

    let region = SubresourceBox::new([0, 0, 0], [2, 2, 1]);
    let memory = mapped_memory(16);
    memory.lock().copy_from_slice(&[3; 16]);
    recorder
        .on_map_texture_region(texture, 0, Some(&region), MapAccess::ReadWrite, &memory, 8, 16)
        .unwrap();
    recorder.on_unmap_texture_region(&desc, texture, 0).unwrap();
    present(&recorder);
    let bytes = recorder.finish().unwrap();

    let mut device = HeadlessDevice::new(api, 2, 8, 8);
    let mut player = Player::open(&bytes, Limits::default()).unwrap();
    player.play_frame(&mut device).unwrap();

    let live = player.context().tables().resources.resolve(texture);
    assert_eq!(device.texture_data(live, 0), Some(&[3; 16][..]));
}

proptest! {
    #[test]
    fn prop_buffer_updates_match_shadow_copy(
        updates in prop::collection::vec((0u64..32, prop::collection::vec(any::<u8>(), 1..16)), 0..24),
    ) {
        let api = DeviceApi::Vulkan;
        let recorder = TraceRecorder::new(Vec::new(), api).unwrap();
        let buffer = Handle::new(5);
        let desc = ResourceDesc::buffer(32, ResourceUsage::CONSTANT_BUFFER);
        recorder.on_init_resource(&desc, None, ResourceUsage::default(), buffer).unwrap();

        let mut shadow = vec![0u8; 32];
        for (offset, data) in &updates {
            let start = *offset as usize;
            let len = data.len().min(shadow.len() - start);
            recorder
                .on_update_buffer_region(&desc, buffer, *offset, len as u64, &data[..len])
                .unwrap();
            shadow[start..start + len].copy_from_slice(&data[..len]);
        }
        present(&recorder);
        let bytes = recorder.finish().unwrap();

        let mut device = HeadlessDevice::new(api, 2, 8, 8);
        let mut player = Player::open(&bytes, Limits::default()).unwrap();
        prop_assert_eq!(player.play_frame(&mut device).unwrap(), FrameOutcome::Presented);
        let live = player.context().tables().resources.resolve(buffer);
        prop_assert_eq!(device.buffer_data(live), Some(shadow.as_slice()));
    }
}
