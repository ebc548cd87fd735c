//! Parent resolvers: where a loader delegates what it does not define

use crate::error::{LoadError, LoadResult};
use crate::handle::{LoaderId, ModuleHandle};
use crate::name::{ModuleBytes, ModuleName};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;

/// Fallback capability shared by the loaders of one platform scope
///
/// Opaque to its callers: a loader never assumes a parent shares its cache.
pub trait ParentResolver: Send + Sync {
    /// Resolve `name`, failing with `NotFound` when the parent lacks it
    fn resolve(&self, name: &ModuleName) -> LoadResult<ModuleHandle>;
}

/// A parent that defines nothing
#[derive(Clone, Copy, Debug, Default)]
pub struct NoParent;

impl ParentResolver for NoParent {
    fn resolve(&self, name: &ModuleName) -> LoadResult<ModuleHandle> {
        Err(LoadError::not_found(name))
    }
}

/// A fixed table of modules, materialized on first request
///
/// Materialization happens under one lock for the whole table, so each name
/// yields exactly one handle for the lifetime of the resolver.
#[derive(Debug)]
pub struct StaticParent {
    id: LoaderId,
    modules: HashMap<ModuleName, ModuleBytes>,
    handles: Mutex<HashMap<ModuleName, ModuleHandle>>,
}

impl StaticParent {
    pub fn new() -> Self {
        Self {
            id: LoaderId::next(),
            modules: HashMap::new(),
            handles: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_module(mut self, name: ModuleName, bytes: impl Into<ModuleBytes>) -> Self {
        self.modules.insert(name, bytes.into());
        self
    }

    /// Build from `(name, body)` pairs, validating every name
    pub fn from_modules<I, N, B>(modules: I) -> LoadResult<Self>
    where
        I: IntoIterator<Item = (N, B)>,
        N: AsRef<str>,
        B: Into<ModuleBytes>,
    {
        modules
            .into_iter()
            .try_fold(Self::new(), |parent, (name, bytes)| {
                Ok(parent.with_module(ModuleName::new(name)?, bytes))
            })
    }

    pub fn id(&self) -> LoaderId {
        self.id
    }
}

impl Default for StaticParent {
    fn default() -> Self {
        Self::new()
    }
}

impl ParentResolver for StaticParent {
    fn resolve(&self, name: &ModuleName) -> LoadResult<ModuleHandle> {
        let bytes = self
            .modules
            .get(name)
            .ok_or_else(|| LoadError::not_found(name))?;

        let mut handles = self.handles.lock().map_err(|_| LoadError::Poisoned)?;
        let handle = handles.entry(name.clone()).or_insert_with(|| {
            debug!(target: "swapload::parent", module = %name, owner = %self.id, "materialize");
            ModuleHandle::materialize(name.clone(), bytes.clone(), self.id)
        });
        Ok(handle.clone())
    }
}
