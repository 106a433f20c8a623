//! Bounded little-endian byte primitives for the apitrace format.
//!
//! This crate provides [`ByteWriter`] and [`ByteReader`] for byte-level encoding and decoding.
//! It is designed for bounded, panic-free operation with explicit error handling.
//!
//! # Design Principles
//!
//! - **No unsafe code** - Safety is paramount.
//! - **Bounded operations** - All reads are bounds-checked.
//! - **No domain knowledge** - This crate knows nothing about events, handles, or devices.
//! - **Explicit errors** - All failures return structured errors, never panic.
//!
//! # Example
//!
//! ```
//! use bytestream::{ByteReader, ByteWriter};
//!
//! let mut writer = ByteWriter::new();
//! writer.write_bool(true);
//! writer.write_u32(42);
//!
//! let bytes = writer.finish();
//!
//! let mut reader = ByteReader::new(&bytes);
//! assert_eq!(reader.read_bool().unwrap(), true);
//! assert_eq!(reader.read_u32().unwrap(), 42);
//! ```

mod error;
mod reader;
mod writer;

pub use error::{ByteError, ByteResult};
pub use reader::ByteReader;
pub use writer::ByteWriter;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_roundtrip() {
        let writer = ByteWriter::new();
        let bytes = writer.finish();
        assert!(bytes.is_empty());

        let reader = ByteReader::new(&bytes);
        assert!(reader.is_empty());
    }

    #[test]
    fn mixed_roundtrip() {
        let mut writer = ByteWriter::new();
        writer.write_bool(true);
        writer.write_u16(0xBEEF);
        writer.write_u64(0x0123_4567_89AB_CDEF);
        writer.write_i32(-7);
        writer.write_f32(0.25);
        writer.write_bytes(b"main");
        let bytes = writer.finish();

        let mut reader = ByteReader::new(&bytes);
        assert!(reader.read_bool().unwrap());
        assert_eq!(reader.read_u16().unwrap(), 0xBEEF);
        assert_eq!(reader.read_u64().unwrap(), 0x0123_4567_89AB_CDEF);
        assert_eq!(reader.read_i32().unwrap(), -7);
        assert_eq!(reader.read_f32().unwrap(), 0.25);
        assert_eq!(reader.read_bytes(4).unwrap(), b"main");
        assert!(reader.is_empty());
    }

    #[test]
    fn truncated_input_reports_eof() {
        let mut writer = ByteWriter::new();
        writer.write_u64(1);
        let bytes = writer.finish();

        let mut reader = ByteReader::new(&bytes[..5]);
        assert!(reader.read_u64().unwrap_err().is_eof());
    }
}
