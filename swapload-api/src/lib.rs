//! Swapload API - loader construction and hot-replace orchestration
//!
//! Provides:
//! - Configuration abstraction (RunConfig)
//! - Loader construction (LoaderBuilder)
//! - The hot-replace harness and watch sessions
//! - Unified error handling (SwaploadError)
//!
//! For CLI convenience, this crate provides a global config singleton.
//! For library use, pass a `RunConfig` explicitly.

use std::sync::Arc;
use swapload_core::{Loader, NoParent, ParentResolver};
use tracing::debug;

pub mod builder;
pub mod config;
pub mod error;
pub mod harness;
pub mod watch;

pub use builder::LoaderBuilder;
pub use config::{config as get_config, init as init_config, is_initialized, RunConfig, PROJECT_FILE};
pub use error::{ErrorReport, HarnessError, SwaploadError};
pub use harness::{Harness, Observation, WorkerId, WorkerReport, DEFAULT_OBSERVATION_CAPACITY};
pub use watch::{LoaderFactory, WatchSession};

// Re-export config and core types
pub use swapload_config::{
    Component, HarnessConfig, HotReplaceMode, LoaderConfig, Ordering, ProjectConfig, SystemConfig,
};
pub use swapload_core::{
    InvokeError, LoadError, LoaderId, ModuleHandle, ModuleInstance, ModuleName, Origin, Resolved,
    StaleModule, Staleness,
};

/// The shared parent of every override loader built from `config`
///
/// A configured system store becomes a local-first loader of its own;
/// otherwise nothing sits above the override loaders.
pub fn system_parent(config: &RunConfig) -> Arc<dyn ParentResolver> {
    match &config.system {
        Some(system) => {
            let loader = LoaderBuilder::system(system).logged(true).build();
            debug!(target: "swapload::parent", loader = %loader.id(), "system loader ready");
            Arc::new(loader)
        }
        None => Arc::new(NoParent),
    }
}

/// Build an override loader from `config` on top of `parent`
pub fn build_loader(config: &RunConfig, parent: Arc<dyn ParentResolver>) -> Loader {
    LoaderBuilder::new(config.loader.clone())
        .parent(parent)
        .logged(true)
        .build()
}

/// A factory producing fresh override loaders that all share `parent`
pub fn loader_factory(config: &RunConfig, parent: Arc<dyn ParentResolver>) -> LoaderFactory {
    let config = config.clone();
    Box::new(move || build_loader(&config, Arc::clone(&parent)))
}
