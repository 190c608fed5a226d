//! Named element registry.
//!
//! Holds the latest snapshot of every named element so an instance that
//! unmounts can hand its geometry and render capability to the next instance
//! that mounts under the same name. Snapshots nobody claims are evicted after
//! a grace period.
//!
//! The registry is an ordinary value: create one per application session and
//! hand clones of it to every [`Motion`](crate::Motion) through a
//! [`MotionContext`](crate::MotionContext). Clones share the same storage.
//!
//! # Usage
//!
//! ```ignore
//! use rune_motion::ElementRegistry;
//!
//! let registry = ElementRegistry::new();
//! registry.store(snapshot);
//! registry.schedule_eviction("card-1", Duration::from_millis(50));
//!
//! // Within the grace period the next instance claims it.
//! let claimed = registry.claim("card-1");
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::AbortHandle;

use crate::collector::PhaseContribution;
use crate::geometry::BoundingBox;
use crate::style::RenderFn;

/// Geometry, render capability and phases of a named element at one point
/// in time.
#[derive(Clone)]
pub struct ElementSnapshot {
    pub name: String,
    pub bounding_box: BoundingBox,
    pub focal_bounding_box: Option<BoundingBox>,
    /// Paints the captured content; only ever read by the claiming instance.
    pub render: RenderFn,
    pub phases: Vec<PhaseContribution>,
}

impl fmt::Debug for ElementSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementSnapshot")
            .field("name", &self.name)
            .field("bounding_box", &self.bounding_box)
            .field("focal_bounding_box", &self.focal_bounding_box)
            .field("phases", &self.phases)
            .finish_non_exhaustive()
    }
}

struct Entry {
    snapshot: Arc<ElementSnapshot>,
    /// Bumped on every store so stale evictions can tell they lost a race.
    generation: u64,
    eviction: Option<AbortHandle>,
}

impl Entry {
    fn cancel_eviction(&mut self) {
        if let Some(handle) = self.eviction.take() {
            handle.abort();
        }
    }
}

#[derive(Default)]
struct RegistryInner {
    entries: HashMap<String, Entry>,
    next_generation: u64,
}

/// Cancels a pending eviction.
#[derive(Debug)]
pub struct EvictionHandle {
    abort: AbortHandle,
}

impl EvictionHandle {
    pub fn cancel(&self) {
        self.abort.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.abort.is_finished()
    }
}

/// Process-wide store of named element snapshots.
#[derive(Clone, Default)]
pub struct ElementRegistry {
    inner: Arc<Mutex<RegistryInner>>,
}

impl fmt::Debug for ElementRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("ElementRegistry")
            .field("names", &inner.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ElementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `snapshot` under its name, replacing whatever was there.
    ///
    /// Any pending eviction of the previous snapshot is cancelled. Returns the
    /// generation of the new entry. Callers that are tearing down must not
    /// store; the registry itself cannot tell.
    pub fn store(&self, snapshot: ElementSnapshot) -> u64 {
        let mut inner = self.inner.lock();
        inner.next_generation += 1;
        let generation = inner.next_generation;
        let name = snapshot.name.clone();

        if let Some(mut previous) = inner.entries.remove(&name) {
            previous.cancel_eviction();
            tracing::trace!(name = %name, replaced = previous.generation, "snapshot replaced");
        }

        inner.entries.insert(
            name.clone(),
            Entry {
                snapshot: Arc::new(snapshot),
                generation,
                eviction: None,
            },
        );
        tracing::debug!(name = %name, generation, "snapshot stored");
        generation
    }

    /// Read the snapshot for `name` without removing it.
    pub fn retrieve(&self, name: &str) -> Option<Arc<ElementSnapshot>> {
        self.inner
            .lock()
            .entries
            .get(name)
            .map(|entry| entry.snapshot.clone())
    }

    /// Take the snapshot for `name` out of the registry.
    ///
    /// This is how a mounting instance consumes its partner's snapshot: a
    /// claimed snapshot is never returned again.
    pub fn claim(&self, name: &str) -> Option<Arc<ElementSnapshot>> {
        let mut entry = self.inner.lock().entries.remove(name)?;
        entry.cancel_eviction();
        tracing::debug!(name = %name, generation = entry.generation, "snapshot claimed");
        Some(entry.snapshot)
    }

    /// Remove the snapshot for `name`. Returns whether one existed.
    pub fn remove(&self, name: &str) -> bool {
        match self.inner.lock().entries.remove(name) {
            Some(mut entry) => {
                entry.cancel_eviction();
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.lock().entries.contains_key(name)
    }

    /// Generation of the current entry for `name`.
    pub fn generation(&self, name: &str) -> Option<u64> {
        self.inner.lock().entries.get(name).map(|entry| entry.generation)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    /// Remove the snapshot for `name` once `delay` has passed, unless it is
    /// stored again, claimed or removed first.
    ///
    /// Returns `None` when there is nothing to evict. Outside a tokio runtime
    /// there is no timer to wait on and the snapshot is removed at once.
    pub fn schedule_eviction(&self, name: &str, delay: Duration) -> Option<EvictionHandle> {
        self.schedule(name, None, delay)
    }

    /// Like [`schedule_eviction`](Self::schedule_eviction), but only if the
    /// current entry is still the one stored as `generation`.
    pub fn schedule_eviction_of(&self, name: &str, generation: u64, delay: Duration) -> Option<EvictionHandle> {
        self.schedule(name, Some(generation), delay)
    }

    fn schedule(&self, name: &str, expected: Option<u64>, delay: Duration) -> Option<EvictionHandle> {
        let mut inner = self.inner.lock();
        let generation = inner.entries.get(name)?.generation;
        if expected.is_some_and(|expected| expected != generation) {
            tracing::trace!(name = %name, "eviction skipped; snapshot was replaced");
            return None;
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(name = %name, "no timer runtime; evicting snapshot immediately");
            inner.entries.remove(name);
            return None;
        };

        let weak: Weak<Mutex<RegistryInner>> = Arc::downgrade(&self.inner);
        let key = name.to_string();
        let task = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let mut inner = inner.lock();
            if inner
                .entries
                .get(&key)
                .is_some_and(|entry| entry.generation == generation)
            {
                inner.entries.remove(&key);
                tracing::debug!(name = %key, generation, "unclaimed snapshot evicted");
            }
        });

        let abort = task.abort_handle();
        if let Some(entry) = inner.entries.get_mut(name) {
            entry.cancel_eviction();
            entry.eviction = Some(abort.clone());
        }
        tracing::trace!(name = %name, delay_ms = delay.as_millis() as u64, "eviction scheduled");
        Some(EvictionHandle { abort })
    }
}
