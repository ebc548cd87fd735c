//! VirtualFileSystem trait definition

use crate::error::VfsResult;
use std::path::Path;

/// Virtual File System trait
///
/// Decouples module stores from the concrete storage they read.
///
/// # Implementations
/// - `MemoryFileSystem`: In-memory file system
/// - `NativeFileSystem`: Native OS file system
/// - `LayeredVFS`: Any backend wrapped in a middleware chain
pub trait VirtualFileSystem: Send + Sync {
    /// Read file contents
    ///
    /// A missing file is reported as `VfsError::NotFound`; every other
    /// failure keeps its own variant so callers can tell absence from
    /// breakage.
    fn read_file(&self, path: &Path) -> VfsResult<Vec<u8>>;

    /// Write file contents
    ///
    /// Creates the file if it doesn't exist and replaces it if it does. A
    /// concurrent reader sees either the old or the new content in full.
    fn write_file(&self, path: &Path, content: &[u8]) -> VfsResult<()>;

    /// Remove a file
    fn remove_file(&self, path: &Path) -> VfsResult<()>;

    /// Check if path exists
    fn exists(&self, path: &Path) -> bool;
}
