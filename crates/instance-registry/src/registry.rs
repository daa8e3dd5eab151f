//! Concurrent keyed instance registry
//!
//! [`InstanceRegistry`] stores at most one instance per (outer key, slot id)
//! pair and constructs instances lazily from the registry's [`TypeSpec`].
//! Storage is a two-level concurrent map: outer key to a per-key slot map,
//! slot id to the shared instance.

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::error::{RegistryError, RegistryResult};
use crate::typeinfo::{create_instance, TypeSpec};
use crate::value::Arg;

/// Check whether a slot id is valid. Slot ids are non-negative with no upper
/// bound.
pub fn is_valid_slot(slot: i32) -> bool {
    slot >= 0
}

/// Per-key slot map
type SlotMap<I> = DashMap<i32, Arc<I>>;

/// Concurrent registry of lazily constructed instances keyed by
/// (outer key, slot id).
///
/// One instance type is declared per registry via its [`TypeSpec`]. An
/// instance is constructed on the first `get_or_create` for its (key, slot)
/// and cached until explicitly unregistered; later calls return the cached
/// instance and ignore their argument list.
///
/// # Thread Safety
///
/// All operations take `&self` and are safe from any number of threads.
/// Construction for a given (key, slot) happens at most once: concurrent
/// requesters for the same pair block until the winning construction
/// completes, then observe its instance. Requests for different keys contend
/// only on the brief allocation of a fresh per-key slot map. Constructor
/// bodies must not call back into the same registry.
pub struct InstanceRegistry<K, I> {
    spec: Arc<TypeSpec<I>>,
    instances: DashMap<K, Arc<SlotMap<I>>>,
}

impl<K, I> InstanceRegistry<K, I>
where
    K: Eq + Hash,
{
    /// Create an empty registry for the described instance type.
    pub fn new(spec: TypeSpec<I>) -> Self {
        InstanceRegistry {
            spec: Arc::new(spec),
            instances: DashMap::new(),
        }
    }

    /// Descriptor of the instance type managed by this registry
    pub fn spec(&self) -> &TypeSpec<I> {
        &self.spec
    }

    /// Get the stored instance for (key, slot) without constructing.
    ///
    /// Safe probe: an invalid slot id yields `None` rather than an error.
    pub fn get_existing(&self, key: &K, slot: i32) -> Option<Arc<I>> {
        if !is_valid_slot(slot) {
            return None;
        }

        let slots = self.instances.get(key)?;
        slots.get(&slot).map(|entry| entry.clone())
    }

    /// Get the instance for (key, slot), constructing it on first request.
    ///
    /// On a cache miss the first declared constructor matching `args` is
    /// invoked and its result stored; on a cache hit the stored instance is
    /// returned unchanged and `args` is ignored. Nothing is stored when
    /// resolution or construction fails, so a later call may retry.
    pub fn get_or_create(&self, key: K, slot: i32, args: &[Arg]) -> RegistryResult<Arc<I>> {
        if !is_valid_slot(slot) {
            return Err(RegistryError::InvalidSlot(slot));
        }

        // Clone the slot map out of the entry guard so the outer shard lock
        // is released before any construction work.
        let slots: Arc<SlotMap<I>> = Arc::clone(&self.instances.entry(key).or_default());

        let result = match slots.entry(slot) {
            Entry::Occupied(entry) => Ok(Arc::clone(entry.get())),
            // The vacant entry keeps its shard locked while the constructor
            // runs: concurrent requesters for this slot wait here, then take
            // the occupied branch.
            Entry::Vacant(entry) => {
                let instance = Arc::new(create_instance(&self.spec, args)?);
                entry.insert(Arc::clone(&instance));
                Ok(instance)
            }
        };
        result
    }

    /// Remove the instance for (key, slot).
    ///
    /// Returns whether an instance was removed. The per-key slot map stays in
    /// place even when this removes its last entry.
    pub fn unregister(&self, key: &K, slot: i32) -> RegistryResult<bool> {
        if !is_valid_slot(slot) {
            return Err(RegistryError::InvalidSlot(slot));
        }

        let Some(slots) = self.instances.get(key) else {
            return Ok(false);
        };
        Ok(slots.remove(&slot).is_some())
    }

    /// Check whether an instance exists for (key, slot).
    ///
    /// Safe probe: an invalid slot id yields `false`.
    pub fn exists(&self, key: &K, slot: i32) -> bool {
        if !is_valid_slot(slot) {
            return false;
        }

        self.instances
            .get(key)
            .is_some_and(|slots| slots.contains_key(&slot))
    }
}

impl<K, I> fmt::Debug for InstanceRegistry<K, I>
where
    K: Eq + Hash,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceRegistry")
            .field("type", &self.spec.name())
            .field("keys", &self.instances.len())
            .finish()
    }
}
