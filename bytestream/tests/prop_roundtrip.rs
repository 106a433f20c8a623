use bytestream::{ByteReader, ByteWriter};
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Op {
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    I32(i32),
    F32(u32),
    Bool(bool),
    Bytes(Vec<u8>),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        any::<u8>().prop_map(Op::U8),
        any::<u16>().prop_map(Op::U16),
        any::<u32>().prop_map(Op::U32),
        any::<u64>().prop_map(Op::U64),
        any::<i32>().prop_map(Op::I32),
        any::<u32>().prop_map(Op::F32),
        any::<bool>().prop_map(Op::Bool),
        prop::collection::vec(any::<u8>(), 0..32).prop_map(Op::Bytes),
    ]
}

proptest! {
    #[test]
    fn prop_roundtrip_ops(ops in prop::collection::vec(op_strategy(), 1..64)) {
        let mut writer = ByteWriter::new();

        for op in &ops {
            match op {
                Op::U8(v) => writer.write_u8(*v),
                Op::U16(v) => writer.write_u16(*v),
                Op::U32(v) => writer.write_u32(*v),
                Op::U64(v) => writer.write_u64(*v),
                Op::I32(v) => writer.write_i32(*v),
                Op::F32(bits) => writer.write_f32(f32::from_bits(*bits)),
                Op::Bool(v) => writer.write_bool(*v),
                Op::Bytes(v) => {
                    writer.write_u64(v.len() as u64);
                    writer.write_bytes(v);
                }
            }
        }

        let bytes = writer.finish();
        let mut reader = ByteReader::new(&bytes);

        for op in &ops {
            match op {
                Op::U8(v) => prop_assert_eq!(reader.read_u8().unwrap(), *v),
                Op::U16(v) => prop_assert_eq!(reader.read_u16().unwrap(), *v),
                Op::U32(v) => prop_assert_eq!(reader.read_u32().unwrap(), *v),
                Op::U64(v) => prop_assert_eq!(reader.read_u64().unwrap(), *v),
                Op::I32(v) => prop_assert_eq!(reader.read_i32().unwrap(), *v),
                Op::F32(bits) => prop_assert_eq!(reader.read_f32().unwrap().to_bits(), *bits),
                Op::Bool(v) => prop_assert_eq!(reader.read_bool().unwrap(), *v),
                Op::Bytes(v) => {
                    let len = reader.read_u64().unwrap();
                    prop_assert_eq!(reader.read_bytes_u64(len).unwrap(), v.as_slice());
                }
            }
        }
        prop_assert!(reader.is_empty());
    }

    #[test]
    fn prop_reader_never_panics(data in prop::collection::vec(any::<u8>(), 0..64)) {
        let mut reader = ByteReader::new(&data);
        loop {
            if reader.read_bool().is_err() && reader.read_u32().is_err() {
                break;
            }
        }
        prop_assert!(reader.remaining() < 4);
    }
}
