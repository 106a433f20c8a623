//! Descriptor table updates and copies.
//!
//! Each update carries a tagged list whose variant decides how many handles
//! every slot holds and which table replay resolves them through.

use bytestream::{ByteReader, ByteWriter};

use crate::codec::{count_u32, read_count, read_n, Codec};
use crate::error::{DecodeError, EncodeError, WireResult};
use crate::limits::Limits;
use crate::types::Handle;

/// Kind of descriptor held by a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[repr(u32)]
pub enum DescriptorType {
    Sampler = 0,
    SamplerWithResourceView = 1,
    ShaderResourceView = 2,
    UnorderedAccessView = 3,
    ConstantBuffer = 6,
    ShaderStorageBuffer = 7,
}

impl DescriptorType {
    /// Parses a descriptor type from its raw word.
    pub fn parse(value: u32) -> WireResult<Self> {
        match value {
            0 => Ok(Self::Sampler),
            1 => Ok(Self::SamplerWithResourceView),
            2 => Ok(Self::ShaderResourceView),
            3 => Ok(Self::UnorderedAccessView),
            6 => Ok(Self::ConstantBuffer),
            7 => Ok(Self::ShaderStorageBuffer),
            _ => Err(DecodeError::InvalidEnum {
                kind: "descriptor type",
                value,
            }),
        }
    }
}

/// A sampler paired with the view it samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SamplerWithView {
    pub sampler: Handle,
    pub view: Handle,
}

/// A buffer sub-range bound as constants. Offset and size are passed through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BufferRange {
    pub buffer: Handle,
    pub offset: u64,
    pub size: u64,
}

/// Descriptors of one kind written to consecutive slots.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Descriptors {
    Samplers(Vec<Handle>),
    SamplersWithViews(Vec<SamplerWithView>),
    ShaderResourceViews(Vec<Handle>),
    UnorderedAccessViews(Vec<Handle>),
    ConstantBuffers(Vec<BufferRange>),
    /// Storage buffers are recorded by their view handle.
    ShaderStorageBuffers(Vec<Handle>),
}

impl Descriptors {
    #[must_use]
    pub const fn descriptor_type(&self) -> DescriptorType {
        match self {
            Self::Samplers(_) => DescriptorType::Sampler,
            Self::SamplersWithViews(_) => DescriptorType::SamplerWithResourceView,
            Self::ShaderResourceViews(_) => DescriptorType::ShaderResourceView,
            Self::UnorderedAccessViews(_) => DescriptorType::UnorderedAccessView,
            Self::ConstantBuffers(_) => DescriptorType::ConstantBuffer,
            Self::ShaderStorageBuffers(_) => DescriptorType::ShaderStorageBuffer,
        }
    }

    /// Number of slots written.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Samplers(items)
            | Self::ShaderResourceViews(items)
            | Self::UnorderedAccessViews(items)
            | Self::ShaderStorageBuffers(items) => items.len(),
            Self::SamplersWithViews(items) => items.len(),
            Self::ConstantBuffers(items) => items.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Writes `count`, the type word and every slot.
    pub(crate) fn encode_framed(&self, out: &mut ByteWriter) -> Result<(), EncodeError> {
        out.write_u32(count_u32(self.len())?);
        out.write_u32(self.descriptor_type() as u32);
        match self {
            Self::Samplers(items)
            | Self::ShaderResourceViews(items)
            | Self::UnorderedAccessViews(items)
            | Self::ShaderStorageBuffers(items) => {
                for handle in items {
                    out.write_u64(handle.raw());
                }
            }
            Self::SamplersWithViews(items) => {
                for item in items {
                    out.write_u64(item.sampler.raw());
                    out.write_u64(item.view.raw());
                }
            }
            Self::ConstantBuffers(items) => {
                for item in items {
                    out.write_u64(item.buffer.raw());
                    out.write_u64(item.offset);
                    out.write_u64(item.size);
                }
            }
        }
        Ok(())
    }

    pub(crate) fn decode_framed(input: &mut ByteReader<'_>, limits: &Limits) -> WireResult<Self> {
        let count = read_count(input, limits)?;
        let handle = |input: &mut ByteReader<'_>| -> WireResult<Handle> {
            Ok(Handle::new(input.read_u64()?))
        };
        Ok(match DescriptorType::parse(input.read_u32()?)? {
            DescriptorType::Sampler => Self::Samplers(read_n(input, count, handle)?),
            DescriptorType::ShaderResourceView => {
                Self::ShaderResourceViews(read_n(input, count, handle)?)
            }
            DescriptorType::UnorderedAccessView => {
                Self::UnorderedAccessViews(read_n(input, count, handle)?)
            }
            DescriptorType::ShaderStorageBuffer => {
                Self::ShaderStorageBuffers(read_n(input, count, handle)?)
            }
            DescriptorType::SamplerWithResourceView => {
                Self::SamplersWithViews(read_n(input, count, |input| {
                    Ok(SamplerWithView {
                        sampler: Handle::new(input.read_u64()?),
                        view: Handle::new(input.read_u64()?),
                    })
                })?)
            }
            DescriptorType::ConstantBuffer => Self::ConstantBuffers(read_n(input, count, |input| {
                Ok(BufferRange {
                    buffer: Handle::new(input.read_u64()?),
                    offset: input.read_u64()?,
                    size: input.read_u64()?,
                })
            })?),
        })
    }
}

/// Write of consecutive slots in one descriptor table.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DescriptorTableUpdate {
    pub table: Handle,
    pub binding: u32,
    pub array_offset: u32,
    pub descriptors: Descriptors,
}

impl Codec for DescriptorTableUpdate {
    fn encode(&self, out: &mut ByteWriter) -> Result<(), EncodeError> {
        out.write_u64(self.table.raw());
        out.write_u32(self.binding);
        out.write_u32(self.array_offset);
        self.descriptors.encode_framed(out)
    }

    fn decode(input: &mut ByteReader<'_>, limits: &Limits) -> WireResult<Self> {
        Ok(Self {
            table: Handle::new(input.read_u64()?),
            binding: input.read_u32()?,
            array_offset: input.read_u32()?,
            descriptors: Descriptors::decode_framed(input, limits)?,
        })
    }
}

/// Copy of consecutive slots from one descriptor table to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DescriptorTableCopy {
    pub source_table: Handle,
    pub source_binding: u32,
    pub source_array_offset: u32,
    pub dest_table: Handle,
    pub dest_binding: u32,
    pub dest_array_offset: u32,
    pub count: u32,
}

impl Codec for DescriptorTableCopy {
    fn encode(&self, out: &mut ByteWriter) -> Result<(), EncodeError> {
        out.write_u64(self.source_table.raw());
        out.write_u32(self.source_binding);
        out.write_u32(self.source_array_offset);
        out.write_u64(self.dest_table.raw());
        out.write_u32(self.dest_binding);
        out.write_u32(self.dest_array_offset);
        out.write_u32(self.count);
        Ok(())
    }

    fn decode(input: &mut ByteReader<'_>, _limits: &Limits) -> WireResult<Self> {
        Ok(Self {
            source_table: Handle::new(input.read_u64()?),
            source_binding: input.read_u32()?,
            source_array_offset: input.read_u32()?,
            dest_table: Handle::new(input.read_u64()?),
            dest_binding: input.read_u32()?,
            dest_array_offset: input.read_u32()?,
            count: input.read_u32()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(update: &DescriptorTableUpdate) -> Vec<u8> {
        let mut writer = ByteWriter::new();
        update.encode(&mut writer).unwrap();
        writer.finish()
    }

    #[test]
    fn every_slot_is_written() {
        let update = DescriptorTableUpdate {
            table: Handle::new(0x10),
            binding: 2,
            array_offset: 0,
            descriptors: Descriptors::ShaderResourceViews(vec![
                Handle::new(1),
                Handle::new(2),
                Handle::new(3),
            ]),
        };
        let bytes = encode(&update);
        // table + binding + offset + count + type + 3 handles
        assert_eq!(bytes.len(), 8 + 4 + 4 + 4 + 4 + 3 * 8);

        let mut reader = ByteReader::new(&bytes);
        let decoded = DescriptorTableUpdate::decode(&mut reader, &Limits::default()).unwrap();
        assert_eq!(decoded, update);
        assert!(reader.is_empty());
    }

    #[test]
    fn slot_width_follows_type() {
        let pairs = DescriptorTableUpdate {
            table: Handle::new(1),
            binding: 0,
            array_offset: 0,
            descriptors: Descriptors::SamplersWithViews(vec![SamplerWithView::default(); 2]),
        };
        let constants = DescriptorTableUpdate {
            descriptors: Descriptors::ConstantBuffers(vec![BufferRange {
                buffer: Handle::new(9),
                offset: 256,
                size: 64,
            }]),
            ..pairs.clone()
        };
        let header = 8 + 4 + 4 + 4 + 4;
        assert_eq!(encode(&pairs).len(), header + 2 * 16);
        assert_eq!(encode(&constants).len(), header + 24);

        let bytes = encode(&constants);
        let decoded =
            DescriptorTableUpdate::decode(&mut ByteReader::new(&bytes), &Limits::default()).unwrap();
        assert_eq!(decoded.descriptors.descriptor_type(), DescriptorType::ConstantBuffer);
        assert_eq!(decoded, constants);
    }

    #[test]
    fn empty_update_roundtrips() {
        let update = DescriptorTableUpdate {
            table: Handle::NULL,
            binding: 0,
            array_offset: 0,
            descriptors: Descriptors::Samplers(vec![]),
        };
        let bytes = encode(&update);
        let decoded =
            DescriptorTableUpdate::decode(&mut ByteReader::new(&bytes), &Limits::default()).unwrap();
        assert!(decoded.descriptors.is_empty());
    }

    #[test]
    fn unsupported_type_is_rejected() {
        let mut writer = ByteWriter::new();
        writer.write_u32(1);
        writer.write_u32(4);
        let bytes = writer.finish();
        let err = Descriptors::decode_framed(&mut ByteReader::new(&bytes), &Limits::default())
            .unwrap_err();
        assert_eq!(
            err,
            DecodeError::InvalidEnum {
                kind: "descriptor type",
                value: 4
            }
        );
    }

    #[test]
    fn copy_roundtrip() {
        let copy = DescriptorTableCopy {
            source_table: Handle::new(1),
            dest_table: Handle::new(2),
            count: 4,
            ..DescriptorTableCopy::default()
        };
        let mut writer = ByteWriter::new();
        copy.encode(&mut writer).unwrap();
        let bytes = writer.finish();
        assert_eq!(bytes.len(), 36);
        let decoded =
            DescriptorTableCopy::decode(&mut ByteReader::new(&bytes), &Limits::default()).unwrap();
        assert_eq!(decoded, copy);
    }
}
