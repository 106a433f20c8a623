//! Live object handles and the tables mapping recorded handles to them.

use std::collections::HashMap;
use std::fmt;

use wire::Handle;

/// A handle to an object created on the replay device.
///
/// Zero is the null object of every kind.
pub trait LiveHandle: Copy + Eq + fmt::Debug {
    /// Name used in logs and errors.
    const KIND: &'static str;
    const NULL: Self;

    fn from_raw(raw: u64) -> Self;

    fn raw(self) -> u64;

    fn is_null(self) -> bool {
        self == Self::NULL
    }
}

macro_rules! live_handle {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub struct $name(u64);

        impl $name {
            #[must_use]
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }
        }

        impl LiveHandle for $name {
            const KIND: &'static str = $kind;
            const NULL: Self = Self(0);

            fn from_raw(raw: u64) -> Self {
                Self(raw)
            }

            fn raw(self) -> u64 {
                self.0
            }
        }

        impl From<$name> for u64 {
            fn from(handle: $name) -> Self {
                handle.0
            }
        }
    };
}

live_handle!(
    /// A live sampler.
    Sampler,
    "sampler"
);
live_handle!(
    /// A live buffer or texture.
    Resource,
    "resource"
);
live_handle!(
    /// A live resource view.
    ResourceView,
    "resource view"
);
live_handle!(
    /// A live pipeline state object.
    Pipeline,
    "pipeline"
);
live_handle!(
    /// A live pipeline layout.
    PipelineLayout,
    "pipeline layout"
);
live_handle!(
    /// A live descriptor table.
    DescriptorTable,
    "descriptor table"
);

/// Mapping from recorded handles of one kind to live objects.
///
/// Unknown handles resolve to the null object instead of failing.
#[derive(Debug, Clone)]
pub struct HandleTable<K> {
    entries: HashMap<Handle, K>,
}

impl<K> Default for HandleTable<K> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<K: LiveHandle> HandleTable<K> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs `live` under `recorded`, returning the object it replaces.
    ///
    /// The caller owns the returned object and releases it on the device.
    pub fn bind(&mut self, recorded: Handle, live: K) -> Option<K> {
        self.entries
            .insert(recorded, live)
            .filter(|previous| !previous.is_null())
    }

    /// Returns the live object bound to `recorded`, or null.
    #[must_use]
    pub fn resolve(&self, recorded: Handle) -> K {
        self.entries.get(&recorded).copied().unwrap_or(K::NULL)
    }

    /// Removes the binding for `recorded`, returning the live object if any.
    pub fn unbind(&mut self, recorded: Handle) -> Option<K> {
        self.entries
            .remove(&recorded)
            .filter(|previous| !previous.is_null())
    }

    #[must_use]
    pub fn contains(&self, recorded: Handle) -> bool {
        self.entries.contains_key(&recorded)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over all bindings in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (Handle, K)> + '_ {
        self.entries.iter().map(|(recorded, live)| (*recorded, *live))
    }

    /// Removes every binding, yielding the live objects.
    pub fn drain(&mut self) -> impl Iterator<Item = K> + '_ {
        self.entries
            .drain()
            .map(|(_, live)| live)
            .filter(|live| !live.is_null())
    }
}

/// One table per object kind.
#[derive(Debug, Clone, Default)]
pub struct HandleTables {
    pub samplers: HandleTable<Sampler>,
    pub resources: HandleTable<Resource>,
    pub views: HandleTable<ResourceView>,
    pub pipelines: HandleTable<Pipeline>,
    pub layouts: HandleTable<PipelineLayout>,
    pub descriptor_tables: HandleTable<DescriptorTable>,
}

impl HandleTables {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of bindings across all kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samplers.len()
            + self.resources.len()
            + self.views.len()
            + self.pipelines.len()
            + self.layouts.len()
            + self.descriptor_tables.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_handle_resolves_to_null() {
        let table = HandleTable::<Resource>::new();
        assert!(table.resolve(Handle::new(7)).is_null());
        assert_eq!(table.resolve(Handle::NULL), Resource::NULL);
    }

    #[test]
    fn bind_returns_replaced_object() {
        let mut table = HandleTable::new();
        assert_eq!(table.bind(Handle::new(7), Pipeline::new(1)), None);
        assert_eq!(table.bind(Handle::new(7), Pipeline::new(2)), Some(Pipeline::new(1)));
        assert_eq!(table.resolve(Handle::new(7)), Pipeline::new(2));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn unbind_then_resolve_is_null() {
        let mut table = HandleTable::new();
        table.bind(Handle::new(3), Sampler::new(30));
        assert_eq!(table.unbind(Handle::new(3)), Some(Sampler::new(30)));
        assert!(table.resolve(Handle::new(3)).is_null());
        assert_eq!(table.unbind(Handle::new(3)), None);
    }

    #[test]
    fn null_bindings_are_not_returned() {
        let mut table = HandleTable::new();
        table.bind(Handle::new(1), ResourceView::NULL);
        assert!(table.contains(Handle::new(1)));
        assert_eq!(table.bind(Handle::new(1), ResourceView::new(5)), None);
        assert_eq!(table.drain().collect::<Vec<_>>(), vec![ResourceView::new(5)]);
        assert!(table.is_empty());
    }

    #[test]
    fn kinds_are_independent() {
        let mut tables = HandleTables::new();
        tables.resources.bind(Handle::new(9), Resource::new(1));
        assert!(tables.views.resolve(Handle::new(9)).is_null());
        assert_eq!(tables.len(), 1);
        assert_eq!(Resource::KIND, "resource");
    }
}
