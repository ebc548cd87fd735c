//! Middleware trait definition

use super::Stage;
use crate::VfsResult;
use std::path::Path;

/// Middleware trait for VFS operations
///
/// Every method defaults to forwarding to the next layer, so a layer only
/// overrides what it intercepts.
pub trait Middleware: Send + Sync {
    /// Get the execution stage for this middleware
    fn stage(&self) -> Stage;

    fn read_file(&self, path: &Path, next: &dyn Next) -> VfsResult<Vec<u8>> {
        next.read_file(path)
    }

    fn write_file(&self, path: &Path, content: &[u8], next: &dyn Next) -> VfsResult<()> {
        next.write_file(path, content)
    }

    fn remove_file(&self, path: &Path, next: &dyn Next) -> VfsResult<()> {
        next.remove_file(path)
    }

    fn exists(&self, path: &Path, next: &dyn Next) -> bool {
        next.exists(path)
    }
}

/// Handle to the next middleware in chain
pub trait Next {
    fn read_file(&self, path: &Path) -> VfsResult<Vec<u8>>;

    fn write_file(&self, path: &Path, content: &[u8]) -> VfsResult<()>;

    fn remove_file(&self, path: &Path) -> VfsResult<()>;

    fn exists(&self, path: &Path) -> bool;
}
