//! Swapload Virtual File System
//!
//! Read/write access to the directories that back module stores, with
//! interchangeable backends and a composable middleware chain.
//!
//! # Usage
//! ```rust
//! use swapload_vfs::{MemoryFileSystem, VirtualFileSystem};
//! use std::path::Path;
//!
//! let fs = MemoryFileSystem::new();
//! fs.write_file(Path::new("/store/Foo.mod"), b"hello").unwrap();
//! let content = fs.read_file(Path::new("/store/Foo.mod")).unwrap();
//! assert_eq!(content, b"hello");
//! ```

mod error;
mod memory;
pub mod middleware;
mod native;
mod r#trait;

pub use error::{VfsError, VfsResult};
pub use memory::MemoryFileSystem;
pub use middleware::{CountingLayer, LoggedLayer, ReadCounter, VfsBuilder};
pub use native::NativeFileSystem;
pub use r#trait::VirtualFileSystem;
