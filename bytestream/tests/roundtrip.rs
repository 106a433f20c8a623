use bytestream::{ByteError, ByteReader, ByteWriter};

#[test]
fn record_shaped_roundtrip() {
    // opcode, handle, optional struct, sized blob
    let mut writer = ByteWriter::new();
    writer.write_u32(3);
    writer.write_u64(0xDEAD_BEEF_0000_0007);
    writer.write_bool(true);
    writer.write_i32(-16);
    writer.write_u64(4);
    writer.write_bytes(&[1, 2, 3, 4]);
    let bytes = writer.finish();
    assert_eq!(bytes.len(), 4 + 8 + 1 + 4 + 8 + 4);

    let mut reader = ByteReader::new(&bytes);
    assert_eq!(reader.read_u32().unwrap(), 3);
    assert_eq!(reader.read_u64().unwrap(), 0xDEAD_BEEF_0000_0007);
    assert!(reader.read_bool().unwrap());
    assert_eq!(reader.read_i32().unwrap(), -16);
    let len = reader.read_u64().unwrap();
    assert_eq!(reader.read_bytes_u64(len).unwrap(), &[1, 2, 3, 4]);
    assert!(reader.is_empty());
}

#[test]
fn every_truncation_point_is_eof() {
    let mut writer = ByteWriter::new();
    writer.write_u32(1);
    writer.write_u64(2);
    writer.write_u16(3);
    let bytes = writer.finish();

    for cut in 0..bytes.len() {
        let mut reader = ByteReader::new(&bytes[..cut]);
        let result = reader
            .read_u32()
            .and_then(|_| reader.read_u64())
            .and_then(|_| reader.read_u16());
        match result {
            Err(ByteError::UnexpectedEof { .. }) => {}
            other => panic!("cut at {cut} produced {other:?}"),
        }
    }
}

#[test]
fn writer_reuse_across_records() {
    let mut writer = ByteWriter::new();
    let mut stream = Vec::new();
    for value in [10u32, 20, 30] {
        writer.clear();
        writer.write_u32(value);
        stream.extend_from_slice(writer.as_bytes());
    }

    let mut reader = ByteReader::new(&stream);
    assert_eq!(reader.read_u32().unwrap(), 10);
    assert_eq!(reader.read_u32().unwrap(), 20);
    assert_eq!(reader.read_u32().unwrap(), 30);
}
