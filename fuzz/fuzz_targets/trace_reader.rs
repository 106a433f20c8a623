#![no_main]

use libfuzzer_sys::fuzz_target;
use wire::{encode_event, Limits, TraceReader, HEADER_SIZE};

fuzz_target!(|data: &[u8]| {
    let Ok(reader) = TraceReader::open(data, Limits::for_testing()) else {
        return;
    };

    // Whatever decodes must encode back to the same bytes.
    let mut offset = HEADER_SIZE;
    let mut reader = reader;
    while let Ok(Some(record)) = reader.read_record() {
        assert_eq!(record.offset, offset);
        let mut out = bytestream::ByteWriter::new();
        encode_event(&record.event, &mut out).expect("decoded event re-encodes");
        assert_eq!(out.as_bytes(), &data[record.offset..record.offset + record.len]);
        offset += record.len;
    }
});
