//! Loader instance: cache, local store, parent
//!
//! Resolution order:
//! 1. the loader's own cache, without re-validating against the store
//! 2. the two steps of its [`Chain`]: local materialization and delegation
//! 3. `NotFound`
//!
//! Only locally materialized handles enter the cache. Entries are never
//! evicted or replaced; a loader is discarded as a whole.

use crate::error::{LoadError, LoadResult};
use crate::handle::{LoaderId, ModuleHandle};
use crate::name::ModuleName;
use crate::parent::ParentResolver;
use crate::policy::{Chain, Step};
use crate::store::ModuleStore;
use once_cell::sync::OnceCell;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex};
use swapload_config::Ordering;
use tracing::{debug, error, info, trace};

/// Per-name cache slot; initialized at most once
type Slot = Arc<OnceCell<ModuleHandle>>;

/// Where a resolution was satisfied
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Origin {
    /// Already materialized by this loader
    Cache,
    /// Materialized by this call from the loader's store
    Local,
    /// Handed over by the parent resolver
    Parent,
}

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::Cache => "cache",
            Origin::Local => "local",
            Origin::Parent => "parent",
        }
    }
}

/// Result of [`Loader::resolve`]
#[derive(Clone, Debug, PartialEq)]
pub struct Resolved {
    pub handle: ModuleHandle,
    pub origin: Origin,
}

/// How a cached handle differs from its record today
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Staleness {
    /// The record was rewritten; carries the digest of the new content
    Changed { current_digest: u64 },
    /// The record is gone
    Removed,
}

/// A cached handle whose record no longer matches it
#[derive(Clone, Debug, PartialEq)]
pub struct StaleModule {
    pub handle: ModuleHandle,
    pub staleness: Staleness,
}

/// Why the local step produced nothing
enum LocalMiss {
    Absent,
    Failed(LoadError),
}

impl From<LoadError> for LocalMiss {
    fn from(e: LoadError) -> Self {
        LocalMiss::Failed(e)
    }
}

/// A stateful resolver with its own cache and delegation order
pub struct Loader {
    id: LoaderId,
    store: ModuleStore,
    parent: Arc<dyn ParentResolver>,
    chain: Chain,
    cache: Mutex<HashMap<ModuleName, Slot>>,
    materializations: AtomicUsize,
}

impl Loader {
    pub fn new(store: ModuleStore, parent: Arc<dyn ParentResolver>, ordering: Ordering) -> Self {
        let id = LoaderId::next();
        debug!(
            target: "swapload::loader",
            loader = %id,
            root = %store.root().display(),
            %ordering,
            "loader created"
        );
        Self {
            id,
            store,
            parent,
            chain: Chain::new(ordering),
            cache: Mutex::new(HashMap::new()),
            materializations: AtomicUsize::new(0),
        }
    }

    pub fn id(&self) -> LoaderId {
        self.id
    }

    pub fn ordering(&self) -> Ordering {
        self.chain.ordering()
    }

    pub fn store(&self) -> &ModuleStore {
        &self.store
    }

    pub fn parent(&self) -> &Arc<dyn ParentResolver> {
        &self.parent
    }

    /// Resolve `name` and report where it came from
    pub fn resolve(&self, name: &ModuleName) -> LoadResult<Resolved> {
        if let Some(handle) = self.cached(name)? {
            trace!(target: "swapload::loader", loader = %self.id, module = %name, "cache hit");
            return Ok(Resolved {
                handle,
                origin: Origin::Cache,
            });
        }

        for step in self.chain.steps() {
            let found = match step {
                Step::Local => self.materialize_local(name)?,
                Step::Parent => self.delegate(name)?,
            };
            if let Some(resolved) = found {
                return Ok(resolved);
            }
        }

        debug!(target: "swapload::loader", loader = %self.id, module = %name, "not found");
        Err(LoadError::not_found(name))
    }

    /// Resolve `name`, keeping only the handle
    pub fn load(&self, name: &ModuleName) -> LoadResult<ModuleHandle> {
        self.resolve(name).map(|resolved| resolved.handle)
    }

    /// The handle this loader materialized for `name`, without any I/O
    pub fn find_loaded(&self, name: &ModuleName) -> Option<ModuleHandle> {
        self.cached(name).ok().flatten()
    }

    /// Names materialized by this loader, sorted
    pub fn loaded_names(&self) -> Vec<ModuleName> {
        let mut names: Vec<ModuleName> = self
            .loaded_handles()
            .map(|handles| handles.into_iter().map(|h| h.name().clone()).collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    /// Number of materialized modules
    pub fn len(&self) -> usize {
        self.loaded_handles().map(|h| h.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of local materializations performed so far
    pub fn materializations(&self) -> usize {
        self.materializations.load(AtomicOrdering::SeqCst)
    }

    /// Whether this loader defined `handle`
    pub fn owns(&self, handle: &ModuleHandle) -> bool {
        handle.owner() == self.id && self.find_loaded(handle.name()).as_ref() == Some(handle)
    }

    /// Require `handle` to be one this loader defined
    pub fn check_owned(&self, handle: &ModuleHandle) -> LoadResult<()> {
        if self.owns(handle) {
            return Ok(());
        }
        error!(
            target: "swapload::loader",
            loader = %self.id,
            module = %handle.name(),
            owner = %handle.owner(),
            "foreign handle at loader boundary"
        );
        Err(LoadError::IdentityViolation {
            name: handle.name().clone(),
            expected: self.id,
            actual: handle.owner(),
        })
    }

    /// Compare every cached handle with its record, without touching the cache
    pub fn stale_modules(&self) -> LoadResult<Vec<StaleModule>> {
        let mut handles = self.loaded_handles()?;
        handles.sort_by(|a, b| a.name().cmp(b.name()));

        let mut stale = Vec::new();
        for handle in handles {
            let staleness = match self.store.lookup(handle.name())? {
                Some(bytes) if bytes == *handle.bytes() => continue,
                Some(bytes) => Staleness::Changed {
                    current_digest: bytes.digest(),
                },
                None => Staleness::Removed,
            };
            debug!(
                target: "swapload::loader",
                loader = %self.id,
                module = %handle.name(),
                ?staleness,
                "stale module"
            );
            stale.push(StaleModule { handle, staleness });
        }
        Ok(stale)
    }

    fn cached(&self, name: &ModuleName) -> LoadResult<Option<ModuleHandle>> {
        let cache = self.cache.lock().map_err(|_| LoadError::Poisoned)?;
        Ok(cache.get(name).and_then(|slot| slot.get().cloned()))
    }

    fn loaded_handles(&self) -> LoadResult<Vec<ModuleHandle>> {
        let cache = self.cache.lock().map_err(|_| LoadError::Poisoned)?;
        Ok(cache.values().filter_map(|slot| slot.get().cloned()).collect())
    }

    /// The slot for `name`, created on first use
    ///
    /// The map lock is released before the slot is initialized, so slow
    /// reads of one name do not block other names.
    fn slot(&self, name: &ModuleName) -> LoadResult<Slot> {
        let mut cache = self.cache.lock().map_err(|_| LoadError::Poisoned)?;
        Ok(cache.entry(name.clone()).or_default().clone())
    }

    fn materialize_local(&self, name: &ModuleName) -> LoadResult<Option<Resolved>> {
        let slot = self.slot(name)?;
        let mut fresh = false;

        // Concurrent callers for the same name block here until the first
        // one finishes; only that one reads the store.
        let result = slot.get_or_try_init(|| match self.store.lookup(name)? {
            Some(bytes) => {
                fresh = true;
                self.materializations.fetch_add(1, AtomicOrdering::SeqCst);
                info!(
                    target: "swapload::loader",
                    loader = %self.id,
                    module = %name,
                    bytes = bytes.len(),
                    "materialize"
                );
                Ok(ModuleHandle::materialize(name.clone(), bytes, self.id))
            }
            None => Err(LocalMiss::Absent),
        });

        match result {
            Ok(handle) => Ok(Some(Resolved {
                handle: handle.clone(),
                origin: if fresh { Origin::Local } else { Origin::Cache },
            })),
            Err(LocalMiss::Absent) => {
                self.release_empty_slot(name, &slot);
                Ok(None)
            }
            Err(LocalMiss::Failed(e)) => {
                self.release_empty_slot(name, &slot);
                Err(e)
            }
        }
    }

    /// Remove the slot of a miss unless another caller still holds it
    ///
    /// Slots are only cloned under the map lock, so with the lock held a
    /// count of two (the map and `slot`) means nobody else can be waiting
    /// on it. The last caller to finish a miss removes it.
    fn release_empty_slot(&self, name: &ModuleName, slot: &Slot) {
        let Ok(mut cache) = self.cache.lock() else {
            return;
        };
        let unshared = Arc::strong_count(slot) == 2
            && slot.get().is_none()
            && cache.get(name).is_some_and(|entry| Arc::ptr_eq(entry, slot));
        if unshared {
            cache.remove(name);
        }
    }

    fn delegate(&self, name: &ModuleName) -> LoadResult<Option<Resolved>> {
        match self.parent.resolve(name) {
            Ok(handle) => {
                debug!(
                    target: "swapload::loader",
                    loader = %self.id,
                    module = %name,
                    owner = %handle.owner(),
                    "delegated"
                );
                Ok(Some(Resolved {
                    handle,
                    origin: Origin::Parent,
                }))
            }
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// A loader can serve as the shared parent of other loaders
impl ParentResolver for Loader {
    fn resolve(&self, name: &ModuleName) -> LoadResult<ModuleHandle> {
        self.load(name)
    }
}

impl fmt::Debug for Loader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Loader")
            .field("id", &self.id)
            .field("store", &self.store)
            .field("ordering", &self.chain.ordering())
            .field("loaded", &self.loaded_names())
            .finish()
    }
}
