//! In-memory file system implementation

use crate::error::{VfsError, VfsResult};
use crate::VirtualFileSystem;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::{Arc, RwLock};

#[derive(Debug, Default)]
struct Files {
    contents: BTreeMap<String, Vec<u8>>,
    denied: BTreeSet<String>,
}

/// An in-memory file system implementation.
///
/// Clones share the same files, so one clone can back a module store while
/// another rewrites its records.
///
/// # Example
/// ```
/// use swapload_vfs::{MemoryFileSystem, VirtualFileSystem};
/// use std::path::Path;
///
/// let fs = MemoryFileSystem::with_files([("/store/Foo.mod", b"v1".to_vec())]);
/// let writer = fs.clone();
/// writer.write_file(Path::new("/store/Foo.mod"), b"v2").unwrap();
/// assert_eq!(fs.read_file(Path::new("/store/Foo.mod")).unwrap(), b"v2");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryFileSystem {
    files: Arc<RwLock<Files>>,
}

impl MemoryFileSystem {
    /// Create a new empty memory file system.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new memory file system pre-populated with files.
    pub fn with_files<I, S>(files: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<u8>)>,
        S: AsRef<str>,
    {
        let contents = files
            .into_iter()
            .map(|(path, content)| (normalize(Path::new(path.as_ref())), content))
            .collect();
        Self {
            files: Arc::new(RwLock::new(Files {
                contents,
                denied: BTreeSet::new(),
            })),
        }
    }

    /// Make every later read of `path` fail with `PermissionDenied`.
    pub fn deny_reads(&self, path: &Path) {
        if let Ok(mut files) = self.files.write() {
            files.denied.insert(normalize(path));
        }
    }

    /// Undo [`deny_reads`](Self::deny_reads).
    pub fn allow_reads(&self, path: &Path) {
        if let Ok(mut files) = self.files.write() {
            files.denied.remove(&normalize(path));
        }
    }
}

/// Forward slashes everywhere so Windows-style test paths hit the same key.
fn normalize(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn poisoned() -> VfsError {
    VfsError::Custom {
        message: String::from("Lock poisoned"),
    }
}

impl VirtualFileSystem for MemoryFileSystem {
    fn read_file(&self, path: &Path) -> VfsResult<Vec<u8>> {
        let normalized = normalize(path);
        let files = self.files.read().map_err(|_| poisoned())?;

        if files.denied.contains(&normalized) {
            return Err(VfsError::PermissionDenied { path: normalized });
        }
        files
            .contents
            .get(&normalized)
            .cloned()
            .ok_or(VfsError::NotFound { path: normalized })
    }

    fn write_file(&self, path: &Path, content: &[u8]) -> VfsResult<()> {
        let mut files = self.files.write().map_err(|_| poisoned())?;
        files.contents.insert(normalize(path), content.to_vec());
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> VfsResult<()> {
        let normalized = normalize(path);
        let mut files = self.files.write().map_err(|_| poisoned())?;
        match files.contents.remove(&normalized) {
            Some(_) => Ok(()),
            None => Err(VfsError::NotFound { path: normalized }),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        match self.files.read() {
            Ok(files) => files.contents.contains_key(&normalize(path)),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_write_and_read() {
        let fs = MemoryFileSystem::new();
        let path = Path::new("/store/Foo.mod");

        fs.write_file(path, b"hello world").unwrap();
        assert_eq!(fs.read_file(path).unwrap(), b"hello world");
    }

    #[test]
    fn test_read_nonexistent() {
        let fs = MemoryFileSystem::new();
        let result = fs.read_file(Path::new("/nonexistent.mod"));
        assert!(matches!(result, Err(VfsError::NotFound { .. })));
    }

    #[test]
    fn test_backslash_paths_normalized() {
        let fs = MemoryFileSystem::with_files([("/store/Foo.mod", b"x".to_vec())]);
        assert!(fs.exists(Path::new("\\store\\Foo.mod")));
    }

    #[test]
    fn test_deny_reads() {
        let fs = MemoryFileSystem::with_files([("/store/Foo.mod", b"x".to_vec())]);
        let path = Path::new("/store/Foo.mod");

        fs.deny_reads(path);
        assert!(matches!(
            fs.read_file(path),
            Err(VfsError::PermissionDenied { .. })
        ));
        // Denied files still exist
        assert!(fs.exists(path));

        fs.allow_reads(path);
        assert_eq!(fs.read_file(path).unwrap(), b"x");
    }

    #[test]
    fn test_remove_file() {
        let fs = MemoryFileSystem::with_files([("/a.mod", b"a".to_vec())]);
        fs.remove_file(Path::new("/a.mod")).unwrap();
        assert!(!fs.exists(Path::new("/a.mod")));
        assert!(fs.remove_file(Path::new("/a.mod")).is_err());
    }

    #[test]
    fn test_clone_shares_data() {
        let fs1 = MemoryFileSystem::new();
        let path = Path::new("/shared.mod");
        fs1.write_file(path, b"shared").unwrap();

        let fs2 = fs1.clone();
        fs2.write_file(path, b"modified").unwrap();
        assert_eq!(fs1.read_file(path).unwrap(), b"modified");
    }

    #[test]
    fn test_concurrent_rewrites_never_tear() {
        let fs = MemoryFileSystem::with_files([("/Foo.mod", b"aaaa".to_vec())]);
        let writer = {
            let fs = fs.clone();
            thread::spawn(move || {
                for i in 0..200 {
                    let content: &[u8] = if i % 2 == 0 { b"bbbb" } else { b"aaaa" };
                    fs.write_file(Path::new("/Foo.mod"), content).unwrap();
                }
            })
        };

        for _ in 0..200 {
            let content = fs.read_file(Path::new("/Foo.mod")).unwrap();
            assert!(content == b"aaaa" || content == b"bbbb");
        }
        writer.join().unwrap();
    }
}
