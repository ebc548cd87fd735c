//! Logging middleware for VFS operations

use super::{Middleware, Next, Stage};
use crate::VfsResult;
use std::path::Path;
use tracing::{debug, trace};

/// Middleware that logs VFS operations under the `swapload::vfs` target
#[derive(Debug, Default)]
pub struct LoggedLayer;

impl LoggedLayer {
    /// Create a new logging layer
    pub fn new() -> Self {
        Self
    }
}

impl Middleware for LoggedLayer {
    fn stage(&self) -> Stage {
        Stage::Outer
    }

    fn read_file(&self, path: &Path, next: &dyn Next) -> VfsResult<Vec<u8>> {
        let result = next.read_file(path);
        match &result {
            Ok(content) => {
                debug!(target: "swapload::vfs", path = %path.display(), bytes = content.len(), "read_file")
            }
            Err(e) => debug!(target: "swapload::vfs", path = %path.display(), error = %e, "read_file failed"),
        }
        result
    }

    fn write_file(&self, path: &Path, content: &[u8], next: &dyn Next) -> VfsResult<()> {
        debug!(target: "swapload::vfs", path = %path.display(), bytes = content.len(), "write_file");
        next.write_file(path, content)
    }

    fn remove_file(&self, path: &Path, next: &dyn Next) -> VfsResult<()> {
        debug!(target: "swapload::vfs", path = %path.display(), "remove_file");
        next.remove_file(path)
    }

    fn exists(&self, path: &Path, next: &dyn Next) -> bool {
        let result = next.exists(path);
        trace!(target: "swapload::vfs", path = %path.display(), result, "exists");
        result
    }
}
