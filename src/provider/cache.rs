//! Instance cache with at-most-once construction per key.

use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::{Condvar, Mutex};

use crate::error::DiResult;
use crate::internal::{Map, PathId};
use crate::introspect::AnyArc;
use crate::key::Key;

/// Container-wide mapping from key to the single instance built for it.
///
/// Each key owns a `OnceCell`, filled by the one resolution path that claimed
/// the key. The map lock is only held long enough to look up or claim a cell,
/// never while a value is being built, so resolutions of different types do
/// not serialize on each other.
///
/// A path that finds a key claimed by another path waits for it. Before it
/// does, it follows the chain of builders and the keys they wait on; if the
/// chain comes back to a key this path is building, waiting would never end,
/// and the wait-for chain is returned instead.
pub(crate) struct InstanceCache {
    state: Mutex<CacheState>,
    released: Condvar,
}

#[derive(Default)]
struct CacheState {
    cells: Map<Key, Arc<OnceCell<AnyArc>>>,
    builders: Map<Key, PathId>,
    waiting: Map<PathId, Key>,
}

impl CacheState {
    /// Keys awaited from `owner` onwards, if the chain ends at `path`.
    fn wait_chain(&self, mut owner: PathId, path: PathId) -> Option<Vec<Key>> {
        let mut chain = Vec::new();
        // the wait-for graph is acyclic, so each path appears at most once
        for _ in 0..=self.waiting.len() {
            if owner == path {
                return Some(chain);
            }
            let awaited = self.waiting.get(&owner)?;
            chain.push(*awaited);
            owner = *self.builders.get(awaited)?;
        }
        None
    }
}

/// Result of [`InstanceCache::acquire`].
pub(crate) enum Entry<'a> {
    Ready(AnyArc),
    /// The caller now builds this key, and must fill the slot or drop it.
    Vacant(Slot<'a>),
}

/// A claimed, still empty cache entry.
///
/// Dropping it releases the claim and wakes waiting paths, whether or not
/// it was filled.
pub(crate) struct Slot<'a> {
    cache: &'a InstanceCache,
    key: Key,
    cell: Arc<OnceCell<AnyArc>>,
}

impl Slot<'_> {
    /// Runs `build` and stores its value. A failure leaves the entry empty.
    pub(crate) fn fill<F>(&self, build: F) -> DiResult<AnyArc>
    where
        F: FnOnce() -> DiResult<AnyArc>,
    {
        self.cell.get_or_try_init(build).cloned()
    }
}

impl Drop for Slot<'_> {
    fn drop(&mut self) {
        self.cache.state.lock().builders.remove(&self.key);
        self.cache.released.notify_all();
    }
}

impl InstanceCache {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(CacheState::default()),
            released: Condvar::new(),
        }
    }

    #[inline]
    pub(crate) fn get(&self, key: &Key) -> Option<AnyArc> {
        self.state
            .lock()
            .cells
            .get(key)
            .and_then(|cell| cell.get().cloned())
    }

    /// Returns the cached value for `key`, or claims the key for `path`.
    ///
    /// Blocks while another path builds `key`. A builder that fails releases
    /// the key, and one of the waiters claims it next. `Err` carries the
    /// wait-for chain when blocking would deadlock.
    pub(crate) fn acquire(&self, key: &Key, path: PathId) -> Result<Entry<'_>, Vec<Key>> {
        let mut state = self.state.lock();
        loop {
            let cell = state
                .cells
                .entry(*key)
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .clone();
            if let Some(value) = cell.get() {
                return Ok(Entry::Ready(value.clone()));
            }

            let owner = match state.builders.get(key).copied() {
                Some(owner) => owner,
                None => {
                    state.builders.insert(*key, path);
                    return Ok(Entry::Vacant(Slot {
                        cache: self,
                        key: *key,
                        cell,
                    }));
                }
            };

            if let Some(chain) = state.wait_chain(owner, path) {
                return Err(chain);
            }

            tracing::trace!(type_name = key.display_name(), "waiting for another resolution");
            state.waiting.insert(path, *key);
            self.released.wait(&mut state);
            state.waiting.remove(&path);
        }
    }

    /// Number of populated entries.
    pub(crate) fn len(&self) -> usize {
        self.state
            .lock()
            .cells
            .values()
            .filter(|cell| cell.get().is_some())
            .count()
    }
}
