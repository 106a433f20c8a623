//! Trace header types and constants.

use bytestream::{ByteReader, ByteWriter};

use crate::error::{DecodeError, WireResult};

/// Magic constant identifying trace files.
///
/// The ASCII bytes `APITRACE` read as a little-endian `u64`. This value is
/// fixed and must never change.
pub const MAGIC: u64 = u64::from_le_bytes(*b"APITRACE");

/// Header size in bytes (magic + backend word).
pub const HEADER_SIZE: usize = 8 + 4;

/// Graphics API family a trace was captured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[repr(u32)]
pub enum DeviceApi {
    D3D9 = 0x9000,
    D3D10 = 0xa000,
    D3D11 = 0xb000,
    D3D12 = 0xc000,
    OpenGL = 0x10000,
    Vulkan = 0x20000,
}

impl DeviceApi {
    /// Parses a backend identifier from its raw word.
    pub fn parse(value: u32) -> WireResult<Self> {
        match value {
            0x9000 => Ok(Self::D3D9),
            0xa000 => Ok(Self::D3D10),
            0xb000 => Ok(Self::D3D11),
            0xc000 => Ok(Self::D3D12),
            0x10000 => Ok(Self::OpenGL),
            0x20000 => Ok(Self::Vulkan),
            _ => Err(DecodeError::UnknownDeviceApi { value }),
        }
    }

    /// Returns the raw backend word.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self as u32
    }

    /// Returns `true` for the APIs whose back buffers double as render target views.
    #[must_use]
    pub const fn back_buffers_are_views(self) -> bool {
        matches!(self, Self::D3D9 | Self::OpenGL)
    }

    /// Short lowercase name used in reports.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::D3D9 => "d3d9",
            Self::D3D10 => "d3d10",
            Self::D3D11 => "d3d11",
            Self::D3D12 => "d3d12",
            Self::OpenGL => "opengl",
            Self::Vulkan => "vulkan",
        }
    }
}

/// Trace header.
///
/// The magic constant is validated during decoding and is not stored here.
/// See `TRACE_FORMAT.md` for the complete layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TraceHeader {
    /// Backend the recorded events target.
    pub api: DeviceApi,
}

impl TraceHeader {
    /// Creates a header for the given backend.
    #[must_use]
    pub const fn new(api: DeviceApi) -> Self {
        Self { api }
    }
}

/// Writes the trace header.
pub fn encode_header(header: &TraceHeader, out: &mut ByteWriter) {
    out.write_u64(MAGIC);
    out.write_u32(header.api.raw());
}

/// Reads and validates the trace header.
pub fn decode_header(reader: &mut ByteReader<'_>) -> WireResult<TraceHeader> {
    if reader.remaining() < HEADER_SIZE {
        return Err(DecodeError::TraceTooSmall {
            actual: reader.remaining(),
            required: HEADER_SIZE,
        });
    }

    let magic = reader.read_u64()?;
    if magic != MAGIC {
        return Err(DecodeError::InvalidMagic { found: magic });
    }

    let api = DeviceApi::parse(reader.read_u32()?)?;
    Ok(TraceHeader { api })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magic_is_ascii_apitrace() {
        assert_eq!(&MAGIC.to_le_bytes(), b"APITRACE");
    }

    #[test]
    fn header_layout() {
        let mut writer = ByteWriter::new();
        encode_header(&TraceHeader::new(DeviceApi::D3D11), &mut writer);
        let bytes = writer.finish();

        assert_eq!(bytes.len(), HEADER_SIZE);
        assert_eq!(&bytes[0..8], b"APITRACE");
        assert_eq!(&bytes[8..12], &0xb000u32.to_le_bytes());
    }

    #[test]
    fn header_roundtrip() {
        for api in [
            DeviceApi::D3D9,
            DeviceApi::D3D10,
            DeviceApi::D3D11,
            DeviceApi::D3D12,
            DeviceApi::OpenGL,
            DeviceApi::Vulkan,
        ] {
            let mut writer = ByteWriter::new();
            encode_header(&TraceHeader::new(api), &mut writer);
            let bytes = writer.finish();
            let mut reader = ByteReader::new(&bytes);
            assert_eq!(decode_header(&mut reader).unwrap().api, api);
            assert!(reader.is_empty());
        }
    }

    #[test]
    fn header_too_small() {
        let mut reader = ByteReader::new(b"APITRACE");
        let err = decode_header(&mut reader).unwrap_err();
        assert_eq!(
            err,
            DecodeError::TraceTooSmall {
                actual: 8,
                required: HEADER_SIZE
            }
        );
    }

    #[test]
    fn header_invalid_magic() {
        let mut bytes = b"NOTTRACE".to_vec();
        bytes.extend_from_slice(&0xb000u32.to_le_bytes());
        let mut reader = ByteReader::new(&bytes);
        assert!(matches!(
            decode_header(&mut reader),
            Err(DecodeError::InvalidMagic { .. })
        ));
    }

    #[test]
    fn header_unknown_api() {
        let mut bytes = b"APITRACE".to_vec();
        bytes.extend_from_slice(&0x1234u32.to_le_bytes());
        let mut reader = ByteReader::new(&bytes);
        assert_eq!(
            decode_header(&mut reader).unwrap_err(),
            DecodeError::UnknownDeviceApi { value: 0x1234 }
        );
    }

    #[test]
    fn views_alias_back_buffers_on_d3d9_and_opengl_only() {
        assert!(DeviceApi::D3D9.back_buffers_are_views());
        assert!(DeviceApi::OpenGL.back_buffers_are_views());
        assert!(!DeviceApi::D3D12.back_buffers_are_views());
        assert!(!DeviceApi::Vulkan.back_buffers_are_views());
    }
}
