//! Loader construction from configuration

use std::sync::Arc;
use swapload_config::{LoaderConfig, Ordering, SystemConfig};
use swapload_core::{Loader, ModuleStore, NoParent, ParentResolver};
use swapload_vfs::{CountingLayer, LoggedLayer, NativeFileSystem, VfsBuilder, VirtualFileSystem};

/// Builds a [`Loader`] from a [`LoaderConfig`]
///
/// Defaults to the native file system and no parent. Middleware layers are
/// only stacked when asked for.
pub struct LoaderBuilder {
    config: LoaderConfig,
    backend: Option<Arc<dyn VirtualFileSystem>>,
    parent: Arc<dyn ParentResolver>,
    logged: bool,
    counting: Option<CountingLayer>,
}

impl LoaderBuilder {
    pub fn new(config: LoaderConfig) -> Self {
        Self {
            config,
            backend: None,
            parent: Arc::new(NoParent),
            logged: false,
            counting: None,
        }
    }

    /// A builder for the platform-wide loader: local-first, no parent
    pub fn system(config: &SystemConfig) -> Self {
        Self::new(LoaderConfig {
            store_root: config.store_root.clone(),
            ordering: Ordering::LocalFirst,
            extension: config.extension.clone(),
        })
    }

    /// Read records through `backend` instead of the native file system
    pub fn vfs(mut self, backend: Arc<dyn VirtualFileSystem>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn parent(mut self, parent: Arc<dyn ParentResolver>) -> Self {
        self.parent = parent;
        self
    }

    pub fn ordering(mut self, ordering: Ordering) -> Self {
        self.config.ordering = ordering;
        self
    }

    /// Trace every store access under `swapload::vfs`
    pub fn logged(mut self, logged: bool) -> Self {
        self.logged = logged;
        self
    }

    /// Count store reads; keep `layer.counter()` before handing it over
    pub fn counted(mut self, layer: CountingLayer) -> Self {
        self.counting = Some(layer);
        self
    }

    pub fn build(self) -> Loader {
        let backend = self
            .backend
            .unwrap_or_else(|| Arc::new(NativeFileSystem::new()));

        let vfs: Arc<dyn VirtualFileSystem> = if !self.logged && self.counting.is_none() {
            backend
        } else {
            let mut builder = VfsBuilder::from_shared(backend);
            if self.logged {
                builder = builder.with(LoggedLayer::new());
            }
            if let Some(counting) = self.counting {
                builder = builder.with(counting);
            }
            Arc::new(builder.build())
        };

        let store = ModuleStore::new(vfs, self.config.store_root).with_extension(self.config.extension);
        Loader::new(store, self.parent, self.config.ordering)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};
    use swapload_core::{ModuleName, Origin, StaticParent};
    use swapload_vfs::MemoryFileSystem;

    fn memory_config(ordering: Ordering) -> LoaderConfig {
        LoaderConfig {
            store_root: PathBuf::from("/store"),
            ordering,
            extension: "mod".to_string(),
        }
    }

    #[test]
    fn test_build_over_memory_fs() {
        let fs = MemoryFileSystem::with_files([("/store/Foo.mod", b"foo".to_vec())]);
        let loader = LoaderBuilder::new(memory_config(Ordering::LocalFirst))
            .vfs(Arc::new(fs))
            .build();

        let name = ModuleName::new("Foo").unwrap();
        let resolved = loader.resolve(&name).unwrap();
        assert_eq!(resolved.origin, Origin::Local);
        assert_eq!(resolved.handle.bytes().as_slice(), b"foo");
        assert_eq!(loader.store().path_for(&name), Path::new("/store/Foo.mod"));
    }

    #[test]
    fn test_counted_layer_sees_store_reads() {
        let fs = MemoryFileSystem::with_files([("/store/Foo.mod", b"foo".to_vec())]);
        let counting = CountingLayer::new();
        let reads = counting.counter();
        let loader = LoaderBuilder::new(memory_config(Ordering::LocalFirst))
            .vfs(Arc::new(fs))
            .logged(true)
            .counted(counting)
            .build();

        let name = ModuleName::new("Foo").unwrap();
        loader.load(&name).unwrap();
        loader.load(&name).unwrap();
        assert_eq!(reads.total(), 1);
        assert_eq!(reads.reads_of(Path::new("/store/Foo.mod")), 1);
    }

    #[test]
    fn test_ordering_override_and_parent() {
        let fs = MemoryFileSystem::with_files([("/store/Foo.mod", b"local".to_vec())]);
        let parent = Arc::new(StaticParent::new().with_module(ModuleName::new("Foo").unwrap(), "parent"));
        let loader = LoaderBuilder::new(memory_config(Ordering::LocalFirst))
            .vfs(Arc::new(fs))
            .parent(parent)
            .ordering(Ordering::ParentFirst)
            .build();

        assert_eq!(loader.ordering(), Ordering::ParentFirst);
        let resolved = loader.resolve(&ModuleName::new("Foo").unwrap()).unwrap();
        assert_eq!(resolved.origin, Origin::Parent);
        assert_eq!(resolved.handle.bytes().as_slice(), b"parent");
    }

    #[test]
    fn test_system_builder_is_local_first() {
        let system = SystemConfig {
            store_root: PathBuf::from("/system"),
            extension: "lib".to_string(),
        };
        let loader = LoaderBuilder::system(&system)
            .vfs(Arc::new(MemoryFileSystem::new()))
            .build();
        assert_eq!(loader.ordering(), Ordering::LocalFirst);
        assert_eq!(loader.store().extension(), "lib");
    }
}
