//! Introspection and debugging tools for apitrace traces.
//!
//! - Summarize a trace: backend, digest, frames, heaviest opcodes
//! - Dump decoded events frame by frame
//! - Replay a trace against the headless backend
//!
//! # Design Principles
//!
//! - **First-class tooling** - These tools are part of the product, not afterthoughts.
//! - **Damaged traces are still readable** - Everything up to the first bad
//!   event is reported, followed by where and why decoding stopped.

use std::collections::HashMap;
use std::fmt::Write as _;

use anyhow::{Context, Result};
use replay::{HeadlessCounters, HeadlessDevice, Player, ReplayStats};
use serde::Serialize;
use wire::{Event, Limits, Opcode, TraceHeader, TraceReader};

/// Events and bytes of one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSummary {
    pub index: usize,
    pub events: usize,
    pub bytes: usize,
    /// `false` for trailing events not followed by a present.
    pub presented: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeSummary {
    pub opcode: Opcode,
    pub count: usize,
    pub bytes: usize,
}

/// Where decoding stopped early.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeStop {
    pub offset: usize,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectReport {
    pub header: TraceHeader,
    /// Hex blake3 digest of the whole file.
    pub digest: String,
    pub total_bytes: usize,
    pub events: usize,
    pub frames: Vec<FrameSummary>,
    /// Opcodes by total encoded size, largest first.
    pub opcodes: Vec<OpcodeSummary>,
    pub stop: Option<DecodeStop>,
}

impl InspectReport {
    /// Number of frames that ended with a present.
    #[must_use]
    pub fn presented_frames(&self) -> usize {
        self.frames.iter().filter(|frame| frame.presented).count()
    }
}

/// Walks every event of a trace without replaying it.
pub fn inspect_trace(bytes: &[u8], limits: &Limits) -> Result<InspectReport> {
    let mut reader = TraceReader::open(bytes, limits.clone()).context("read trace header")?;
    let mut report = InspectReport {
        header: reader.header(),
        digest: blake3::hash(bytes).to_hex().to_string(),
        total_bytes: bytes.len(),
        events: 0,
        frames: Vec::new(),
        opcodes: Vec::new(),
        stop: None,
    };
    let mut opcodes: HashMap<Opcode, OpcodeSummary> = HashMap::new();
    let mut frame = FrameSummary {
        index: 0,
        events: 0,
        bytes: 0,
        presented: false,
    };

    loop {
        let offset = reader.position();
        let record = match reader.read_record() {
            Ok(Some(record)) => record,
            Ok(None) => {
                if offset < bytes.len() {
                    report.stop = Some(DecodeStop {
                        offset,
                        reason: "truncated event".to_owned(),
                    });
                }
                break;
            }
            Err(err) => {
                report.stop = Some(DecodeStop {
                    offset,
                    reason: err.to_string(),
                });
                break;
            }
        };
        report.events += 1;
        frame.events += 1;
        frame.bytes += record.len;

        let opcode = record.event.opcode();
        let entry = opcodes.entry(opcode).or_insert(OpcodeSummary {
            opcode,
            count: 0,
            bytes: 0,
        });
        entry.count += 1;
        entry.bytes += record.len;

        if record.event.is_present() {
            frame.presented = true;
            let next = frame.index + 1;
            report.frames.push(frame);
            frame = FrameSummary {
                index: next,
                events: 0,
                bytes: 0,
                presented: false,
            };
        }
    }
    if frame.events > 0 {
        report.frames.push(frame);
    }

    report.opcodes = opcodes.into_values().collect();
    report
        .opcodes
        .sort_by(|a, b| b.bytes.cmp(&a.bytes).then_with(|| a.opcode.cmp(&b.opcode)));
    Ok(report)
}

/// Decoded events of one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameDump {
    pub index: usize,
    pub presented: bool,
    pub events: Vec<Event>,
}

/// Decodes up to `max_frames` frames; a bad event ends the dump.
pub fn dump_trace(bytes: &[u8], limits: &Limits, max_frames: Option<usize>) -> Result<Vec<FrameDump>> {
    let reader = TraceReader::open(bytes, limits.clone()).context("read trace header")?;
    let mut frames = Vec::new();
    let mut current = FrameDump {
        index: 0,
        presented: false,
        events: Vec::new(),
    };
    for event in reader {
        if max_frames.is_some_and(|max| frames.len() >= max) {
            return Ok(frames);
        }
        let event = match event {
            Ok(event) => event,
            Err(err) => {
                tracing::warn!(%err, "dump stopped at malformed event");
                break;
            }
        };
        let present = event.is_present();
        current.events.push(event);
        if present {
            current.presented = true;
            let next = current.index + 1;
            frames.push(std::mem::replace(
                &mut current,
                FrameDump {
                    index: next,
                    presented: false,
                    events: Vec::new(),
                },
            ));
        }
    }
    if !current.events.is_empty() && max_frames.map_or(true, |max| frames.len() < max) {
        frames.push(current);
    }
    Ok(frames)
}

/// One line per event, grouped by frame.
#[must_use]
pub fn format_dump_pretty(frames: &[FrameDump]) -> String {
    let mut out = String::new();
    for frame in frames {
        let suffix = if frame.presented { "" } else { " (no present)" };
        let _ = writeln!(out, "frame {} ({} events){suffix}", frame.index, frame.events.len());
        for event in &frame.events {
            let _ = writeln!(out, "  {:<32} {event:?}", event.opcode().name());
        }
    }
    out
}

/// Result of a headless replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplaySummary {
    pub frames: u64,
    pub stats: ReplayStats,
    pub counters: HeadlessCounters,
    pub live_objects: usize,
}

/// Replays a trace on a [`HeadlessDevice`] matching the trace's backend.
pub fn replay_headless(
    bytes: &[u8],
    limits: &Limits,
    max_frames: Option<u64>,
    back_buffers: u32,
) -> Result<ReplaySummary> {
    let mut player = Player::open(bytes, limits.clone()).context("read trace header")?;
    let mut device = HeadlessDevice::new(player.api(), back_buffers, 1920, 1080);
    let frames = player
        .play_all(&mut device, max_frames)
        .context("replay trace")?;
    Ok(ReplaySummary {
        frames,
        stats: *player.stats(),
        counters: *device.counters(),
        live_objects: device.live_objects(),
    })
}
