//! 测试辅助工具
//!
//! In-memory loader chains shared by the integration tests.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use swapload::vfs::MemoryFileSystem;
use swapload::{Loader, LoaderBuilder, LoaderConfig, ModuleName, Ordering, ParentResolver};

/// A memory file system holding `(path, body)` records
pub fn memory_fs(records: &[(&str, &str)]) -> MemoryFileSystem {
    MemoryFileSystem::with_files(records.iter().map(|(path, body)| (*path, body.as_bytes().to_vec())))
}

/// A loader over `root` in `fs`
pub fn loader(
    fs: &MemoryFileSystem,
    root: &str,
    parent: Arc<dyn ParentResolver>,
    ordering: Ordering,
) -> Loader {
    LoaderBuilder::new(LoaderConfig {
        store_root: Path::new(root).to_path_buf(),
        ordering,
        ..LoaderConfig::default()
    })
    .vfs(Arc::new(fs.clone()))
    .parent(parent)
    .build()
}

pub fn name(s: &str) -> ModuleName {
    ModuleName::new(s).expect("valid module name")
}
