//! Named registry of adapter instances.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::adapter::Adapter;
use crate::driver::ConnectionSpec;

/// Adapters keyed by a handle string.
///
/// Pass the registry by reference to whatever needs adapter lookup; there is
/// deliberately no process-global instance.
#[derive(Default)]
pub struct AdapterRegistry {
    adapters: HashMap<String, Adapter>,
}

impl AdapterRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the adapter registered under `handle`, creating it from `spec`
    /// when absent. An existing handle wins and the spec is ignored.
    pub fn get_or_create(&mut self, handle: &str, spec: ConnectionSpec) -> &mut Adapter {
        self.adapters
            .entry(handle.to_string())
            .or_insert_with(|| Adapter::new(spec))
    }

    /// Register a pre-built adapter under `handle`, replacing any existing
    /// one.
    pub fn register(&mut self, handle: impl Into<String>, adapter: Adapter) -> &mut Adapter {
        match self.adapters.entry(handle.into()) {
            Entry::Occupied(mut entry) => {
                entry.insert(adapter);
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(adapter),
        }
    }

    pub fn get(&mut self, handle: &str) -> Option<&mut Adapter> {
        self.adapters.get_mut(handle)
    }

    #[must_use]
    pub fn contains(&self, handle: &str) -> bool {
        self.adapters.contains_key(handle)
    }

    pub fn remove(&mut self, handle: &str) -> Option<Adapter> {
        self.adapters.remove(handle)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}
