//! Frame-by-frame trace playback.

use tracing::{info, warn};
use wire::{DeviceApi, Limits, ResourceUsage, TraceHeader, TraceReader};

use crate::context::{ReplayContext, ReplayStats, Step};
use crate::device::{CommandList, Device, LiveBarrier};
use crate::error::{ReplayError, ReplayResult};
use crate::handles::LiveHandle;

/// How a call to [`Player::play_frame`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// A present was replayed; more frames may follow.
    Presented,
    /// The trace ran out, was truncated, or held a malformed event.
    EndOfTrace,
}

/// Replays a trace held in memory against a [`Device`].
#[derive(Debug)]
pub struct Player<'a> {
    reader: TraceReader<'a>,
    context: ReplayContext,
    finished: bool,
}

impl<'a> Player<'a> {
    /// Validates the trace header.
    pub fn open(bytes: &'a [u8], limits: Limits) -> ReplayResult<Self> {
        let reader = TraceReader::open(bytes, limits)?;
        let context = ReplayContext::new(reader.header().api);
        Ok(Self {
            reader,
            context,
            finished: false,
        })
    }

    #[must_use]
    pub const fn header(&self) -> TraceHeader {
        self.reader.header()
    }

    #[must_use]
    pub const fn api(&self) -> DeviceApi {
        self.context.api()
    }

    #[must_use]
    pub const fn context(&self) -> &ReplayContext {
        &self.context
    }

    #[must_use]
    pub const fn stats(&self) -> &ReplayStats {
        self.context.stats()
    }

    /// Returns `true` once the end of the trace was reached.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Replays events up to and including the next present.
    ///
    /// The current back buffer is moved into the render target state for the
    /// frame and back to the present state afterwards. A malformed event ends
    /// the trace; the events before it stay applied.
    pub fn play_frame<D: Device>(&mut self, device: &mut D) -> ReplayResult<FrameOutcome> {
        if device.api() != self.api() {
            return Err(ReplayError::ApiMismatch {
                trace: self.api(),
                device: device.api(),
            });
        }
        if self.finished {
            return Ok(FrameOutcome::EndOfTrace);
        }

        let back_buffer = device.current_back_buffer();
        if !back_buffer.is_null() {
            device.commands().barrier(&[LiveBarrier {
                resource: back_buffer,
                old_state: ResourceUsage::from_raw(ResourceUsage::PRESENT),
                new_state: ResourceUsage::from_raw(ResourceUsage::RENDER_TARGET),
            }]);
        }

        let outcome = self.replay_until_present(device)?;

        if !back_buffer.is_null() {
            device.commands().barrier(&[LiveBarrier {
                resource: back_buffer,
                old_state: ResourceUsage::from_raw(ResourceUsage::RENDER_TARGET),
                new_state: ResourceUsage::from_raw(ResourceUsage::PRESENT),
            }]);
        }
        if outcome == FrameOutcome::Presented {
            device.present();
        }
        Ok(outcome)
    }

    /// Replays frames until the trace ends or `max_frames` were presented.
    ///
    /// Returns the number of presented frames.
    pub fn play_all<D: Device>(&mut self, device: &mut D, max_frames: Option<u64>) -> ReplayResult<u64> {
        let mut presented = 0;
        while max_frames.map_or(true, |max| presented < max) {
            match self.play_frame(device)? {
                FrameOutcome::Presented => presented += 1,
                FrameOutcome::EndOfTrace => break,
            }
        }
        info!(
            frames = presented,
            events = self.stats().events,
            unresolved = self.stats().unresolved,
            "replay finished"
        );
        Ok(presented)
    }

    fn replay_until_present<D: Device>(&mut self, device: &mut D) -> ReplayResult<FrameOutcome> {
        loop {
            let event = match self.reader.read_event() {
                Ok(Some(event)) => event,
                Ok(None) => {
                    self.finished = true;
                    return Ok(FrameOutcome::EndOfTrace);
                }
                Err(err) => {
                    warn!(offset = self.reader.position(), %err, "malformed event, ending replay");
                    self.finished = true;
                    return Ok(FrameOutcome::EndOfTrace);
                }
            };
            if self.context.dispatch(device, &event)? == Step::Present {
                return Ok(FrameOutcome::Presented);
            }
        }
    }
}
