//! VFS Middleware System
//!
//! Wraps a backend in an ordered chain of layers. Used to log store reads
//! and to count them.

mod builder;
mod counting;
mod layered;
mod logged;
mod middleware;
mod stage;

pub use builder::VfsBuilder;
pub use counting::{CountingLayer, ReadCounter};
pub use layered::LayeredVFS;
pub use logged::LoggedLayer;
pub use middleware::{Middleware, Next};
pub use stage::Stage;
