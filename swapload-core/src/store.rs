//! Module store: read-only view of an override directory

use crate::error::{LoadError, LoadResult};
use crate::name::{ModuleBytes, ModuleName};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use swapload_config::DEFAULT_EXTENSION;
use swapload_vfs::VirtualFileSystem;
use tracing::{debug, trace, warn};

/// Module records under one root, one record per name
///
/// The record of `name` is `<root>/<name>.<extension>`. Lookups never cache;
/// every call reads the record again.
#[derive(Clone)]
pub struct ModuleStore {
    vfs: Arc<dyn VirtualFileSystem>,
    root: PathBuf,
    extension: String,
}

impl ModuleStore {
    pub fn new(vfs: Arc<dyn VirtualFileSystem>, root: impl Into<PathBuf>) -> Self {
        Self {
            vfs,
            root: root.into(),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    /// Use `extension` (without the dot) instead of the default `mod`
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn vfs(&self) -> &Arc<dyn VirtualFileSystem> {
        &self.vfs
    }

    /// Location of the record for `name`
    pub fn path_for(&self, name: &ModuleName) -> PathBuf {
        if self.extension.is_empty() {
            self.root.join(name.as_str())
        } else {
            self.root.join(format!("{}.{}", name, self.extension))
        }
    }

    /// Read the record for `name`
    ///
    /// `Ok(None)` when there is no record; `IoFailure` when there is one but
    /// it cannot be read.
    pub fn lookup(&self, name: &ModuleName) -> LoadResult<Option<ModuleBytes>> {
        let path = self.path_for(name);
        trace!(target: "swapload::store", module = %name, path = %path.display(), "lookup");

        match self.vfs.read_file(&path) {
            Ok(content) => {
                debug!(target: "swapload::store", module = %name, bytes = content.len(), "record found");
                Ok(Some(ModuleBytes::from(content)))
            }
            Err(e) if e.is_not_found() => Ok(None),
            Err(cause) => {
                warn!(target: "swapload::store", module = %name, error = %cause, "record unreadable");
                Err(LoadError::IoFailure {
                    name: name.clone(),
                    cause,
                })
            }
        }
    }

    /// Digest of the current record, `None` when absent
    pub fn fingerprint(&self, name: &ModuleName) -> LoadResult<Option<u64>> {
        Ok(self.lookup(name)?.map(|bytes| bytes.digest()))
    }
}

impl fmt::Debug for ModuleStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleStore")
            .field("root", &self.root)
            .field("extension", &self.extension)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swapload_vfs::{MemoryFileSystem, VfsError};

    fn name(s: &str) -> ModuleName {
        ModuleName::new(s).unwrap()
    }

    #[test]
    fn test_path_for_appends_extension() {
        let store = ModuleStore::new(Arc::new(MemoryFileSystem::new()), "/replacement");
        assert_eq!(store.path_for(&name("Foo")), PathBuf::from("/replacement/Foo.mod"));

        let store = store.with_extension("class");
        assert_eq!(
            store.path_for(&name("com/example/Foo")),
            PathBuf::from("/replacement/com/example/Foo.class")
        );

        let store = store.with_extension("");
        assert_eq!(store.path_for(&name("Foo")), PathBuf::from("/replacement/Foo"));
    }

    #[test]
    fn test_lookup_present() {
        let fs = MemoryFileSystem::with_files([("/replacement/Foo.mod", b"hi".to_vec())]);
        let store = ModuleStore::new(Arc::new(fs), "/replacement");
        let bytes = store.lookup(&name("Foo")).unwrap().unwrap();
        assert_eq!(bytes.as_slice(), b"hi");
    }

    #[test]
    fn test_lookup_absent_is_not_an_error() {
        let store = ModuleStore::new(Arc::new(MemoryFileSystem::new()), "/replacement");
        assert_eq!(store.lookup(&name("Foo")).unwrap(), None);
        assert_eq!(store.fingerprint(&name("Foo")).unwrap(), None);
    }

    #[test]
    fn test_lookup_unreadable_is_io_failure() {
        let fs = MemoryFileSystem::with_files([("/replacement/Foo.mod", b"hi".to_vec())]);
        fs.deny_reads(Path::new("/replacement/Foo.mod"));
        let store = ModuleStore::new(Arc::new(fs), "/replacement");

        match store.lookup(&name("Foo")) {
            Err(LoadError::IoFailure { name, cause }) => {
                assert_eq!(name.as_str(), "Foo");
                assert!(matches!(cause, VfsError::PermissionDenied { .. }));
            }
            other => panic!("expected IoFailure, got {:?}", other),
        }
    }

    #[test]
    fn test_lookup_reads_every_time() {
        let fs = MemoryFileSystem::with_files([("/r/Foo.mod", b"v1".to_vec())]);
        let store = ModuleStore::new(Arc::new(fs.clone()), "/r");
        let before = store.fingerprint(&name("Foo")).unwrap();

        fs.write_file(Path::new("/r/Foo.mod"), b"v2").unwrap();
        let after = store.fingerprint(&name("Foo")).unwrap();
        assert_ne!(before, after);
        assert_eq!(store.lookup(&name("Foo")).unwrap().unwrap().as_slice(), b"v2");
    }
}
