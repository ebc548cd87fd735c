//! Read-counting middleware

use super::{Middleware, Next, Stage};
use crate::VfsResult;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Shared tally of `read_file` calls per path
///
/// Clones observe the same tally.
#[derive(Debug, Clone, Default)]
pub struct ReadCounter {
    reads: Arc<Mutex<HashMap<PathBuf, usize>>>,
}

impl ReadCounter {
    /// Number of reads of `path` that reached this layer
    pub fn reads_of(&self, path: &Path) -> usize {
        self.reads
            .lock()
            .map(|reads| reads.get(path).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    /// Number of reads over all paths
    pub fn total(&self) -> usize {
        self.reads
            .lock()
            .map(|reads| reads.values().sum())
            .unwrap_or(0)
    }

    fn record(&self, path: &Path) {
        if let Ok(mut reads) = self.reads.lock() {
            *reads.entry(path.to_path_buf()).or_insert(0) += 1;
        }
    }
}

/// Middleware that counts `read_file` calls, whether they succeed or not
#[derive(Debug, Default)]
pub struct CountingLayer {
    counter: ReadCounter,
}

impl CountingLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle on the tally that stays valid after the layer moves into a chain
    pub fn counter(&self) -> ReadCounter {
        self.counter.clone()
    }
}

impl Middleware for CountingLayer {
    fn stage(&self) -> Stage {
        Stage::Metering
    }

    fn read_file(&self, path: &Path, next: &dyn Next) -> VfsResult<Vec<u8>> {
        self.counter.record(path);
        next.read_file(path)
    }
}
