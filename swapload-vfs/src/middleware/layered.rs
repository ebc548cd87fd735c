//! Layered VFS that executes middleware chain

use super::{Middleware, Next};
use crate::{VfsResult, VirtualFileSystem};
use std::path::Path;
use std::sync::Arc;

/// VFS implementation that executes a middleware chain
pub struct LayeredVFS {
    backend: Arc<dyn VirtualFileSystem>,
    middlewares: Vec<Box<dyn Middleware>>,
}

impl LayeredVFS {
    pub(crate) fn new(
        backend: Arc<dyn VirtualFileSystem>,
        middlewares: Vec<Box<dyn Middleware>>,
    ) -> Self {
        Self {
            backend,
            middlewares,
        }
    }

    fn chain(&self) -> Chain<'_> {
        Chain {
            backend: &*self.backend,
            middlewares: &self.middlewares,
        }
    }
}

/// Remaining part of the chain; empty `middlewares` means the backend is next
struct Chain<'a> {
    backend: &'a dyn VirtualFileSystem,
    middlewares: &'a [Box<dyn Middleware>],
}

impl<'a> Chain<'a> {
    fn split(&self) -> Option<(&'a dyn Middleware, Chain<'a>)> {
        let (first, rest) = self.middlewares.split_first()?;
        Some((
            first.as_ref(),
            Chain {
                backend: self.backend,
                middlewares: rest,
            },
        ))
    }
}

impl Next for Chain<'_> {
    fn read_file(&self, path: &Path) -> VfsResult<Vec<u8>> {
        match self.split() {
            Some((layer, rest)) => layer.read_file(path, &rest),
            None => self.backend.read_file(path),
        }
    }

    fn write_file(&self, path: &Path, content: &[u8]) -> VfsResult<()> {
        match self.split() {
            Some((layer, rest)) => layer.write_file(path, content, &rest),
            None => self.backend.write_file(path, content),
        }
    }

    fn remove_file(&self, path: &Path) -> VfsResult<()> {
        match self.split() {
            Some((layer, rest)) => layer.remove_file(path, &rest),
            None => self.backend.remove_file(path),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        match self.split() {
            Some((layer, rest)) => layer.exists(path, &rest),
            None => self.backend.exists(path),
        }
    }
}

impl VirtualFileSystem for LayeredVFS {
    fn read_file(&self, path: &Path) -> VfsResult<Vec<u8>> {
        self.chain().read_file(path)
    }

    fn write_file(&self, path: &Path, content: &[u8]) -> VfsResult<()> {
        self.chain().write_file(path, content)
    }

    fn remove_file(&self, path: &Path) -> VfsResult<()> {
        self.chain().remove_file(path)
    }

    fn exists(&self, path: &Path) -> bool {
        self.chain().exists(path)
    }
}
