//! Whole-trace reading and writing.

use bytestream::{ByteReader, ByteWriter};

use crate::error::{EncodeError, WireResult};
use crate::event::{decode_event, encode_event, Event};
use crate::header::{decode_header, encode_header, TraceHeader, HEADER_SIZE};
use crate::limits::Limits;

/// A decoded event and where it sits in the trace.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    /// Byte offset of the opcode word from the start of the trace.
    pub offset: usize,
    /// Encoded length including the opcode word.
    pub len: usize,
    pub event: Event,
}

/// Sequential reader over a complete trace.
///
/// Events are decoded strictly forward. Running out of bytes, including in
/// the middle of an event, ends the stream without an error. Any other decode
/// failure is returned once and also ends the stream.
#[derive(Debug)]
pub struct TraceReader<'a> {
    input: ByteReader<'a>,
    header: TraceHeader,
    limits: Limits,
    finished: bool,
}

impl<'a> TraceReader<'a> {
    /// Validates the header and positions the reader at the first event.
    pub fn open(bytes: &'a [u8], limits: Limits) -> WireResult<Self> {
        let mut input = ByteReader::new(bytes);
        let header = decode_header(&mut input)?;
        Ok(Self {
            input,
            header,
            limits,
            finished: false,
        })
    }

    #[must_use]
    pub const fn header(&self) -> TraceHeader {
        self.header
    }

    /// Byte offset of the next event.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.input.position()
    }

    /// Returns `true` once the stream has ended.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Reads the next event, or `None` at end of stream.
    pub fn read_event(&mut self) -> WireResult<Option<Event>> {
        Ok(self.read_record()?.map(|record| record.event))
    }

    /// Reads the next event together with its location.
    pub fn read_record(&mut self) -> WireResult<Option<EventRecord>> {
        if self.finished {
            return Ok(None);
        }
        if self.input.is_empty() {
            self.finished = true;
            return Ok(None);
        }

        let offset = self.input.position();
        match decode_event(&mut self.input, &self.limits) {
            Ok(event) => Ok(Some(EventRecord {
                offset,
                len: self.input.position() - offset,
                event,
            })),
            Err(err) if err.is_truncation() => {
                self.finished = true;
                Ok(None)
            }
            Err(err) => {
                self.finished = true;
                Err(err)
            }
        }
    }
}

impl Iterator for TraceReader<'_> {
    type Item = WireResult<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_event().transpose()
    }
}

/// Encodes a header followed by `events` into a fresh buffer.
pub fn encode_trace<'e>(
    header: &TraceHeader,
    events: impl IntoIterator<Item = &'e Event>,
) -> Result<Vec<u8>, EncodeError> {
    let mut writer = ByteWriter::with_capacity(HEADER_SIZE);
    encode_header(header, &mut writer);
    for event in events {
        encode_event(event, &mut writer)?;
    }
    Ok(writer.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeError;
    use crate::header::DeviceApi;
    use crate::types::Handle;

    fn sample() -> Vec<u8> {
        encode_trace(
            &TraceHeader::new(DeviceApi::D3D12),
            &[
                Event::DestroyResource {
                    handle: Handle::new(1),
                },
                Event::Draw {
                    vertex_count: 3,
                    instance_count: 1,
                    first_vertex: 0,
                    first_instance: 0,
                },
                Event::Present,
            ],
        )
        .unwrap()
    }

    #[test]
    fn reads_events_in_order() {
        let bytes = sample();
        let mut reader = TraceReader::open(&bytes, Limits::default()).unwrap();
        assert_eq!(reader.header().api, DeviceApi::D3D12);
        assert_eq!(reader.position(), HEADER_SIZE);

        let first = reader.read_record().unwrap().unwrap();
        assert_eq!(first.offset, HEADER_SIZE);
        assert_eq!(first.len, 12);

        let second = reader.read_record().unwrap().unwrap();
        assert_eq!(second.offset, HEADER_SIZE + 12);
        assert_eq!(second.len, 20);

        assert_eq!(reader.read_event().unwrap(), Some(Event::Present));
        assert_eq!(reader.read_event().unwrap(), None);
        assert!(reader.is_finished());
    }

    #[test]
    fn truncation_ends_stream_quietly() {
        let bytes = sample();
        // cut inside the draw payload
        let cut = &bytes[..HEADER_SIZE + 12 + 6];
        let mut reader = TraceReader::open(cut, Limits::default()).unwrap();
        assert!(reader.read_event().unwrap().is_some());
        assert_eq!(reader.read_event().unwrap(), None);
        assert_eq!(reader.read_event().unwrap(), None);
    }

    #[test]
    fn malformed_event_is_reported_once() {
        let mut bytes = sample();
        bytes.extend_from_slice(&0xFFFF_u32.to_le_bytes());
        bytes.extend_from_slice(&60u32.to_le_bytes());

        let events: Vec<_> = TraceReader::open(&bytes, Limits::default())
            .unwrap()
            .collect();
        assert_eq!(events.len(), 4);
        assert_eq!(
            events[3],
            Err(DecodeError::UnknownOpcode { value: 0xFFFF })
        );
    }

    #[test]
    fn header_only_trace_is_empty() {
        let bytes = encode_trace(&TraceHeader::new(DeviceApi::Vulkan), []).unwrap();
        let mut reader = TraceReader::open(&bytes, Limits::default()).unwrap();
        assert_eq!(reader.read_event().unwrap(), None);
    }

    #[test]
    fn bad_header_fails_open() {
        assert!(TraceReader::open(b"APITRAC", Limits::default()).is_err());
    }
}
