//! Native file system implementation

use crate::error::{VfsError, VfsResult};
use crate::VirtualFileSystem;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A native OS file system implementation.
///
/// Wraps `std::fs`. Relative paths are joined onto the base directory when
/// one is configured.
///
/// # Example
/// ```
/// use swapload_vfs::{NativeFileSystem, VirtualFileSystem};
/// use std::path::Path;
///
/// let fs = NativeFileSystem::with_base(std::env::temp_dir());
/// assert!(!fs.exists(Path::new("swapload-doc-missing.mod")));
/// ```
#[derive(Debug, Clone, Default)]
pub struct NativeFileSystem {
    base: Option<PathBuf>,
}

impl NativeFileSystem {
    /// Create a new native file system.
    pub fn new() -> Self {
        Self { base: None }
    }

    /// Create a new native file system rooted at `base`.
    pub fn with_base(base: impl Into<PathBuf>) -> Self {
        Self {
            base: Some(base.into()),
        }
    }

    fn full_path(&self, path: &Path) -> PathBuf {
        match &self.base {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl VirtualFileSystem for NativeFileSystem {
    fn read_file(&self, path: &Path) -> VfsResult<Vec<u8>> {
        let full = self.full_path(path);
        std::fs::read(&full).map_err(|e| VfsError::from_io(&full, e))
    }

    fn write_file(&self, path: &Path, content: &[u8]) -> VfsResult<()> {
        let full = self.full_path(path);
        let file_name = full.file_name().ok_or_else(|| VfsError::InvalidPath {
            path: full.to_string_lossy().to_string(),
            reason: "no file name".to_string(),
        })?;

        // Write a sibling and rename it over the target so readers never
        // observe a partially written record.
        let mut temp_name = file_name.to_os_string();
        temp_name.push(format!(
            ".{}.{}.tmp",
            std::process::id(),
            TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        let temp = full.with_file_name(temp_name);

        std::fs::write(&temp, content).map_err(|e| VfsError::from_io(&temp, e))?;
        std::fs::rename(&temp, &full).map_err(|e| {
            let _ = std::fs::remove_file(&temp);
            VfsError::from_io(&full, e)
        })
    }

    fn remove_file(&self, path: &Path) -> VfsResult<()> {
        let full = self.full_path(path);
        std::fs::remove_file(&full).map_err(|e| VfsError::from_io(&full, e))
    }

    fn exists(&self, path: &Path) -> bool {
        self.full_path(path).exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_read_write() {
        let dir = tempfile::tempdir().unwrap();
        let fs = NativeFileSystem::new();
        let path = dir.path().join("Foo.mod");

        fs.write_file(&path, b"hello native").unwrap();
        assert_eq!(fs.read_file(&path).unwrap(), b"hello native");
    }

    #[test]
    fn test_native_with_base_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let fs = NativeFileSystem::with_base(dir.path());

        fs.write_file(Path::new("Bar.mod"), b"bar").unwrap();
        assert!(dir.path().join("Bar.mod").exists());
        assert!(fs.exists(Path::new("Bar.mod")));
        assert_eq!(fs.read_file(Path::new("Bar.mod")).unwrap(), b"bar");
    }

    #[test]
    fn test_native_overwrite_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let fs = NativeFileSystem::with_base(dir.path());

        fs.write_file(Path::new("Foo.mod"), b"first").unwrap();
        fs.write_file(Path::new("Foo.mod"), b"second").unwrap();

        assert_eq!(fs.read_file(Path::new("Foo.mod")).unwrap(), b"second");
        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_native_read_nonexistent() {
        let dir = tempfile::tempdir().unwrap();
        let fs = NativeFileSystem::with_base(dir.path());

        let err = fs.read_file(Path::new("Missing.mod")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_native_read_directory_is_not_absence() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("Dir.mod")).unwrap();
        let fs = NativeFileSystem::with_base(dir.path());

        let err = fs.read_file(Path::new("Dir.mod")).unwrap_err();
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_native_remove_file() {
        let dir = tempfile::tempdir().unwrap();
        let fs = NativeFileSystem::with_base(dir.path());

        fs.write_file(Path::new("Gone.mod"), b"x").unwrap();
        fs.remove_file(Path::new("Gone.mod")).unwrap();
        assert!(!fs.exists(Path::new("Gone.mod")));
        assert!(fs.remove_file(Path::new("Gone.mod")).unwrap_err().is_not_found());
    }
}
