//! Swapload - a delegating module loader with hot replacement
//!
//! Swapload resolves named modules through a chain of loaders. Every
//! loader has an override directory, a private cache and a shared parent.
//! Handles carry the identity of the loader that defined them, so two
//! loaders reading the same bytes still produce distinct modules.
//!
//! # Architecture
//!
//! ```text
//! swapload-config  - configuration data (no logic)
//! swapload-vfs     - file system backends and middleware
//! swapload-core    - store, parent, loader, handles
//! swapload-api     - builder, harness, watch sessions, errors
//! swapload-cli     - the `swapload` binary
//! ```
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use swapload::{LoaderBuilder, LoaderConfig, ModuleName, Ordering};
//!
//! let system = Arc::new(
//!     LoaderBuilder::new(LoaderConfig {
//!         store_root: "system".into(),
//!         ordering: Ordering::LocalFirst,
//!         ..LoaderConfig::default()
//!     })
//!     .build(),
//! );
//! let loader = LoaderBuilder::new(LoaderConfig {
//!     store_root: "replacement".into(),
//!     ordering: Ordering::LocalFirst,
//!     ..LoaderConfig::default()
//! })
//! .parent(system)
//! .build();
//!
//! let handle = loader.load(&ModuleName::new("Foo").unwrap()).unwrap();
//! println!("{} from {}", handle.name(), handle.owner());
//! ```

pub use swapload_api as api;
pub use swapload_config as config;
pub use swapload_core as core;
pub use swapload_vfs as vfs;

// 重导出常用类型
pub use swapload_api::{
    build_loader, loader_factory, system_parent, ErrorReport, Harness, HarnessError, LoaderBuilder,
    Observation, RunConfig, SwaploadError, WatchSession, WorkerId, WorkerReport,
};
pub use swapload_config::{HarnessConfig, HotReplaceMode, LoaderConfig, Ordering, ProjectConfig, SystemConfig};
pub use swapload_core::{
    InvokeError, LoadError, LoadResult, Loader, LoaderId, ModuleBytes, ModuleHandle, ModuleInstance,
    ModuleName, ModuleStore, NoParent, Origin, ParentResolver, Resolved, StaleModule, Staleness,
    StaticParent,
};
