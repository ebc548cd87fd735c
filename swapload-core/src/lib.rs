//! Swapload Core - module resolution, caching, and identity
//!
//! A [`Loader`] resolves a [`ModuleName`] to a [`ModuleHandle`] through
//! its private cache, its [`ModuleStore`] and a shared [`ParentResolver`],
//! in the order picked by its [`Ordering`]. Each name is materialized at
//! most once per loader, and handles from different loaders never compare
//! equal.
//!
//! No terminal output: everything is reported through `tracing` under the
//! `swapload::*` targets.

pub mod error;
pub mod handle;
pub mod loader;
pub mod name;
pub mod parent;
pub mod policy;
pub mod store;

pub use error::{InvokeError, LoadError, LoadResult};
pub use handle::{LoaderId, ModuleHandle, ModuleInstance};
pub use loader::{Loader, Origin, Resolved, StaleModule, Staleness};
pub use name::{ModuleBytes, ModuleName};
pub use parent::{NoParent, ParentResolver, StaticParent};
pub use policy::{Chain, Step};
pub use store::ModuleStore;

// Re-export config types from swapload-config
pub use swapload_config::{LoaderConfig, Ordering};
