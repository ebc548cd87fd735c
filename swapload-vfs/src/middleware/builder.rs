//! VFS Builder for constructing middleware chains

use super::{LayeredVFS, Middleware};
use crate::VirtualFileSystem;
use std::sync::Arc;

/// Builder for constructing a VFS with middleware chain
///
/// # Example
/// ```rust
/// use swapload_vfs::{CountingLayer, LoggedLayer, MemoryFileSystem, VfsBuilder};
///
/// let counting = CountingLayer::new();
/// let reads = counting.counter();
/// let vfs = VfsBuilder::new(MemoryFileSystem::new())
///     .with(LoggedLayer::new())
///     .with(counting)
///     .build();
/// assert_eq!(reads.total(), 0);
/// ```
pub struct VfsBuilder {
    backend: Arc<dyn VirtualFileSystem>,
    middlewares: Vec<Box<dyn Middleware>>,
}

impl VfsBuilder {
    /// Create a new VFS builder with the given backend
    pub fn new(backend: impl VirtualFileSystem + 'static) -> Self {
        Self::from_shared(Arc::new(backend))
    }

    /// Create a builder over a backend that is also used elsewhere
    pub fn from_shared(backend: Arc<dyn VirtualFileSystem>) -> Self {
        Self {
            backend,
            middlewares: Vec::new(),
        }
    }

    /// Add a middleware to the chain
    ///
    /// Middlewares are sorted by stage when built; layers of the same stage
    /// keep their insertion order.
    pub fn with(mut self, middleware: impl Middleware + 'static) -> Self {
        self.middlewares.push(Box::new(middleware));
        self
    }

    /// Build the final VFS with middleware chain
    pub fn build(self) -> LayeredVFS {
        let mut middlewares = self.middlewares;
        middlewares.sort_by_key(|m| m.stage().priority());
        LayeredVFS::new(self.backend, middlewares)
    }
}
