#![no_main]

use bytestream::ByteReader;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut reader = ByteReader::new(data);
    let mut idx = 0usize;

    // Input bytes pick the next read; the reader consumes the same input.
    while idx < data.len() && idx < 1024 {
        let op = data[idx] % 8;
        idx += 1;

        match op {
            0 => {
                let _ = reader.read_u8();
            }
            1 => {
                let _ = reader.read_u16();
            }
            2 => {
                let _ = reader.read_u32();
            }
            3 => {
                let _ = reader.read_u64();
            }
            4 => {
                let _ = reader.read_f32();
            }
            5 => {
                let _ = reader.read_bool();
            }
            6 => {
                let len = usize::from(data[idx.saturating_sub(1)]);
                let _ = reader.read_bytes(len);
            }
            _ => {
                let _ = reader.read_bytes_u64(u64::MAX);
            }
        }
    }
});
