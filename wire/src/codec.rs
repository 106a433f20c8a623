//! Shared framing helpers for structures embedded in events.
//!
//! Every structure implements [`Codec`] next to its definition so that the
//! write and read side of a layout live in one place.

use bytestream::{ByteReader, ByteWriter};

use crate::error::{DecodeError, EncodeError, LimitKind, WireResult};
use crate::limits::Limits;

/// Symmetric wire layout for one structure.
pub(crate) trait Codec: Sized {
    fn encode(&self, out: &mut ByteWriter) -> Result<(), EncodeError>;
    fn decode(input: &mut ByteReader<'_>, limits: &Limits) -> WireResult<Self>;
}

pub(crate) fn count_u32(len: usize) -> Result<u32, EncodeError> {
    u32::try_from(len).map_err(|_| EncodeError::LengthOverflow { length: len })
}

pub(crate) fn write_list<T: Codec>(items: &[T], out: &mut ByteWriter) -> Result<(), EncodeError> {
    out.write_u32(count_u32(items.len())?);
    for item in items {
        item.encode(out)?;
    }
    Ok(())
}

pub(crate) fn read_count(input: &mut ByteReader<'_>, limits: &Limits) -> WireResult<usize> {
    let count = input.read_u32()? as usize;
    if count > limits.max_array_len {
        return Err(DecodeError::LimitsExceeded {
            kind: LimitKind::ArrayLength,
            limit: limits.max_array_len,
            actual: count,
        });
    }
    Ok(count)
}

/// Reads `count` elements with `read`, reserving no more than the input could hold.
pub(crate) fn read_n<T>(
    input: &mut ByteReader<'_>,
    count: usize,
    mut read: impl FnMut(&mut ByteReader<'_>) -> WireResult<T>,
) -> WireResult<Vec<T>> {
    let mut items = Vec::with_capacity(count.min(input.remaining()));
    for _ in 0..count {
        items.push(read(input)?);
    }
    Ok(items)
}

pub(crate) fn read_list<T: Codec>(input: &mut ByteReader<'_>, limits: &Limits) -> WireResult<Vec<T>> {
    let count = read_count(input, limits)?;
    read_n(input, count, |input| T::decode(input, limits))
}

pub(crate) fn write_option<T: Codec>(
    value: Option<&T>,
    out: &mut ByteWriter,
) -> Result<(), EncodeError> {
    out.write_bool(value.is_some());
    if let Some(value) = value {
        value.encode(out)?;
    }
    Ok(())
}

pub(crate) fn read_option<T: Codec>(
    input: &mut ByteReader<'_>,
    limits: &Limits,
) -> WireResult<Option<T>> {
    if input.read_bool()? {
        Ok(Some(T::decode(input, limits)?))
    } else {
        Ok(None)
    }
}

/// Writes a `u64` size followed by the bytes.
pub(crate) fn write_blob(bytes: &[u8], out: &mut ByteWriter) {
    out.write_u64(bytes.len() as u64);
    out.write_bytes(bytes);
}

pub(crate) fn check_blob(len: u64, limits: &Limits) -> WireResult<()> {
    let actual = usize::try_from(len).unwrap_or(usize::MAX);
    if actual > limits.max_blob_bytes {
        return Err(DecodeError::LimitsExceeded {
            kind: LimitKind::BlobBytes,
            limit: limits.max_blob_bytes,
            actual,
        });
    }
    Ok(())
}

/// Reads exactly `len` payload bytes after checking the blob limit.
pub(crate) fn read_exact(input: &mut ByteReader<'_>, len: u64, limits: &Limits) -> WireResult<Vec<u8>> {
    check_blob(len, limits)?;
    Ok(input.read_bytes_u64(len)?.to_vec())
}

pub(crate) fn read_blob(input: &mut ByteReader<'_>, limits: &Limits) -> WireResult<Vec<u8>> {
    let len = input.read_u64()?;
    read_exact(input, len, limits)
}

/// Writes a `u32` length followed by the UTF-8 bytes. Empty means absent.
pub(crate) fn write_string(value: &str, out: &mut ByteWriter) -> Result<(), EncodeError> {
    out.write_u32(count_u32(value.len())?);
    out.write_bytes(value.as_bytes());
    Ok(())
}

pub(crate) fn read_string(
    input: &mut ByteReader<'_>,
    limits: &Limits,
    field: &'static str,
) -> WireResult<String> {
    let len = input.read_u32()? as usize;
    if len > limits.max_string_len {
        return Err(DecodeError::LimitsExceeded {
            kind: LimitKind::StringLength,
            limit: limits.max_string_len,
            actual: len,
        });
    }
    let bytes = input.read_bytes(len)?;
    String::from_utf8(bytes.to_vec()).map_err(|_| DecodeError::InvalidUtf8 { field })
}

pub(crate) fn write_f32x4(values: [f32; 4], out: &mut ByteWriter) {
    for value in values {
        out.write_f32(value);
    }
}

pub(crate) fn read_f32x4(input: &mut ByteReader<'_>) -> WireResult<[f32; 4]> {
    Ok([
        input.read_f32()?,
        input.read_f32()?,
        input.read_f32()?,
        input.read_f32()?,
    ])
}

pub(crate) fn write_u32x4(values: [u32; 4], out: &mut ByteWriter) {
    for value in values {
        out.write_u32(value);
    }
}

pub(crate) fn read_u32x4(input: &mut ByteReader<'_>) -> WireResult<[u32; 4]> {
    Ok([
        input.read_u32()?,
        input.read_u32()?,
        input.read_u32()?,
        input.read_u32()?,
    ])
}
