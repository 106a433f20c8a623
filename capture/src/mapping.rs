//! Tracking of open CPU mappings.
//!
//! Map and unmap calls arrive as separate notifications; the unmap event needs
//! the region, access mode and bytes of the matching map. Repeated maps of the
//! same region through the same host memory share one record and are
//! reference counted.

use std::sync::Arc;

use parking_lot::Mutex;
use wire::{Handle, MapAccess, SubresourceBox};

use crate::error::{CaptureError, CaptureResult};

/// Host-visible memory handed out by a map call.
///
/// Identity is the allocation: two maps returning clones of the same `Arc`
/// refer to the same pointer.
pub type MappedMemory = Arc<Mutex<Vec<u8>>>;

/// Creates zeroed mapped memory of `len` bytes.
#[must_use]
pub fn mapped_memory(len: usize) -> MappedMemory {
    Arc::new(Mutex::new(vec![0; len]))
}

/// What a mapping covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapTarget {
    Buffer {
        offset: u64,
        size: u64,
    },
    Texture {
        subresource: u32,
        region: Option<SubresourceBox>,
        row_pitch: u32,
        slice_pitch: u32,
    },
}

impl MapTarget {
    /// Subresource key used to match unmaps; `None` for buffers.
    #[must_use]
    pub const fn subresource(&self) -> Option<u32> {
        match self {
            Self::Buffer { .. } => None,
            Self::Texture { subresource, .. } => Some(*subresource),
        }
    }
}

/// One open mapping.
#[derive(Debug, Clone)]
pub struct MappingRecord {
    pub resource: Handle,
    pub target: MapTarget,
    pub access: MapAccess,
    pub memory: MappedMemory,
    refs: u32,
}

impl MappingRecord {
    /// Outstanding map calls sharing this record.
    #[must_use]
    pub const fn refs(&self) -> u32 {
        self.refs
    }
}

/// Result of an unmap.
#[derive(Debug, Clone)]
pub enum Unmapped {
    /// The last reference was released; the record carries the final payload.
    Finalized(MappingRecord),
    /// Other references remain open.
    Nested {
        target: MapTarget,
        access: MapAccess,
        remaining: u32,
    },
}

/// Open mappings of one device, oldest first.
#[derive(Debug, Default)]
pub struct MappingTracker {
    records: Vec<MappingRecord>,
}

impl MappingTracker {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Registers a map call. Returns the record's reference count afterwards.
    ///
    /// The first open record for the same resource and subresource is reused
    /// when it maps the same memory; otherwise a new record is opened.
    pub fn on_map(
        &mut self,
        resource: Handle,
        target: MapTarget,
        access: MapAccess,
        memory: &MappedMemory,
    ) -> u32 {
        let key = target.subresource();
        if let Some(record) = self
            .records
            .iter_mut()
            .find(|record| record.resource == resource && record.target.subresource() == key)
        {
            if Arc::ptr_eq(&record.memory, memory) {
                record.refs += 1;
                return record.refs;
            }
        }

        self.records.push(MappingRecord {
            resource,
            target,
            access,
            memory: Arc::clone(memory),
            refs: 1,
        });
        1
    }

    fn position(&self, resource: Handle, subresource: Option<u32>) -> Option<usize> {
        self.records
            .iter()
            .rposition(|record| record.resource == resource && record.target.subresource() == subresource)
    }

    /// The record the next matching unmap would release, left untouched.
    #[must_use]
    pub fn peek(&self, resource: Handle, subresource: Option<u32>) -> Option<&MappingRecord> {
        self.position(resource, subresource)
            .map(|index| &self.records[index])
    }

    /// Releases the most recent matching map call.
    pub fn on_unmap(&mut self, resource: Handle, subresource: Option<u32>) -> CaptureResult<Unmapped> {
        let index = self
            .position(resource, subresource)
            .ok_or_else(|| CaptureError::unmatched(resource, subresource))?;

        let record = &mut self.records[index];
        record.refs -= 1;
        if record.refs > 0 {
            return Ok(Unmapped::Nested {
                target: record.target,
                access: record.access,
                remaining: record.refs,
            });
        }
        Ok(Unmapped::Finalized(self.records.remove(index)))
    }

    /// Number of open records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drops every record of `resource`; returns how many were open.
    pub fn forget(&mut self, resource: Handle) -> usize {
        let before = self.records.len();
        self.records.retain(|record| record.resource != resource);
        before - self.records.len()
    }
}
