#![no_main]

use libfuzzer_sys::fuzz_target;
use replay::{HeadlessDevice, Player};
use wire::Limits;

fuzz_target!(|data: &[u8]| {
    let Ok(mut player) = Player::open(data, Limits::for_testing()) else {
        return;
    };
    let mut device = HeadlessDevice::new(player.api(), 2, 16, 16).with_max_allocation(1 << 20);
    let _ = player.play_all(&mut device, Some(64));
});
