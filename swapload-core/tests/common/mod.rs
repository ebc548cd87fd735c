//! 测试辅助工具
//!
//! Builds loaders over temporary directories.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use swapload_core::{Loader, ModuleName, ModuleStore, Ordering, ParentResolver};
use swapload_vfs::NativeFileSystem;
use tempfile::TempDir;

/// A temporary store directory populated with `(name, body)` records
pub fn store_dir(records: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().expect("create temp dir");
    for (name, body) in records {
        write_record(dir.path(), name, body);
    }
    dir
}

/// Write `<root>/<name>.mod`, creating parent directories for nested names
pub fn write_record(root: &Path, name: &str, body: &str) {
    let path = root.join(format!("{}.mod", name));
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create record dir");
    }
    std::fs::write(path, body).expect("write record");
}

pub fn native_loader(root: &Path, parent: Arc<dyn ParentResolver>, ordering: Ordering) -> Loader {
    let store = ModuleStore::new(Arc::new(NativeFileSystem::new()), root);
    Loader::new(store, parent, ordering)
}

pub fn name(s: &str) -> ModuleName {
    ModuleName::new(s).expect("valid module name")
}
