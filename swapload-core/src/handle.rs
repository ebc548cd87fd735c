//! Module handles and their identity
//!
//! A handle remembers the [`LoaderId`] of the loader that materialized it.
//! Equality is identity of the materialization, so handles from two loaders
//! differ even when name and bytes are the same.

use crate::error::{InvokeError, LoadError, LoadResult};
use crate::name::{ModuleBytes, ModuleName};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::error;

static NEXT_LOADER_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a loader
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoaderId(u64);

impl LoaderId {
    pub(crate) fn next() -> Self {
        LoaderId(NEXT_LOADER_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for LoaderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "loader#{}", self.0)
    }
}

struct HandleInner {
    name: ModuleName,
    bytes: ModuleBytes,
    owner: LoaderId,
}

/// A materialized module
///
/// Cheap to clone; clones are the same handle.
#[derive(Clone)]
pub struct ModuleHandle(Arc<HandleInner>);

impl ModuleHandle {
    /// Only loaders materialize; everyone else gets handles from them.
    pub(crate) fn materialize(name: ModuleName, bytes: ModuleBytes, owner: LoaderId) -> Self {
        Self(Arc::new(HandleInner { name, bytes, owner }))
    }

    pub fn name(&self) -> &ModuleName {
        &self.0.name
    }

    pub fn bytes(&self) -> &ModuleBytes {
        &self.0.bytes
    }

    /// The loader that defined this module
    pub fn owner(&self) -> LoaderId {
        self.0.owner
    }

    pub fn digest(&self) -> u64 {
        self.0.bytes.digest()
    }

    /// Derive a new instance of this module
    pub fn instantiate(&self) -> ModuleInstance {
        ModuleInstance {
            handle: self.clone(),
            calls: AtomicU64::new(0),
        }
    }

    /// Whether `instance` was derived from exactly this handle
    pub fn is_instance(&self, instance: &ModuleInstance) -> bool {
        instance.handle == *self
    }

    /// View `instance` as an instance of this module
    ///
    /// Fails with `IdentityViolation` when the instance comes from another
    /// materialization, including one of the same name and bytes by another
    /// loader.
    pub fn cast<'a>(&self, instance: &'a ModuleInstance) -> LoadResult<&'a ModuleInstance> {
        if self.is_instance(instance) {
            return Ok(instance);
        }
        error!(
            target: "swapload::loader",
            module = %self.name(),
            expected = %self.owner(),
            actual = %instance.handle.owner(),
            actual_module = %instance.handle.name(),
            "cast across module identities"
        );
        Err(LoadError::IdentityViolation {
            name: instance.handle.name().clone(),
            expected: self.owner(),
            actual: instance.handle.owner(),
        })
    }
}

impl PartialEq for ModuleHandle {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for ModuleHandle {}

impl Hash for ModuleHandle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(Arc::as_ptr(&self.0), state)
    }
}

impl fmt::Debug for ModuleHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleHandle")
            .field("name", &self.0.name)
            .field("owner", &self.0.owner)
            .field("bytes", &self.0.bytes)
            .finish()
    }
}

/// An object derived from a module handle
///
/// Keeps its defining handle alive; behavior always comes from that handle,
/// whatever happens to the store afterwards.
#[derive(Debug)]
pub struct ModuleInstance {
    handle: ModuleHandle,
    calls: AtomicU64,
}

impl ModuleInstance {
    pub fn handle(&self) -> &ModuleHandle {
        &self.handle
    }

    /// Whether both instances were derived from the same materialization
    pub fn same_type(&self, other: &ModuleInstance) -> bool {
        self.handle == other.handle
    }

    /// Run the module: its body, read as UTF-8 text without trailing whitespace
    pub fn invoke(&self) -> Result<String, InvokeError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        std::str::from_utf8(self.handle.bytes().as_slice())
            .map(|body| body.trim_end().to_string())
            .map_err(|_| InvokeError::Undecodable {
                name: self.handle.name().to_string(),
            })
    }

    /// Number of `invoke` calls so far
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }
}
