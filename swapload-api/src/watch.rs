//! Watch session: a harness plus stale-module detection
//!
//! Each loader generation runs `workers` workers on the watched module.
//! Polling compares the newest generation's cache with the store. In
//! `Manual` mode stale modules are only reported; in `Auto` mode a fresh
//! loader is built and a new generation of workers started on it, while
//! older workers keep running their original instances until shutdown.

use crate::error::SwaploadError;
use crate::harness::{Harness, WorkerId, WorkerReport};
use swapload_config::{HarnessConfig, HotReplaceMode};
use swapload_core::{Loader, ModuleName, StaleModule};
use tracing::{info, warn};

/// Produces a new, empty loader for every generation
pub type LoaderFactory = Box<dyn Fn() -> Loader>;

pub struct WatchSession {
    module: ModuleName,
    mode: HotReplaceMode,
    factory: LoaderFactory,
    current: Loader,
    generation: usize,
    harness: Harness,
}

impl WatchSession {
    /// Build the first loader and start its workers
    pub fn start(
        module: ModuleName,
        config: HarnessConfig,
        mode: HotReplaceMode,
        factory: LoaderFactory,
    ) -> Result<Self, SwaploadError> {
        let current = factory();
        let mut session = Self {
            module,
            mode,
            factory,
            current,
            generation: 1,
            harness: Harness::new(config),
        };
        session.spawn_generation(None)?;
        Ok(session)
    }

    pub fn module(&self) -> &ModuleName {
        &self.module
    }

    pub fn mode(&self) -> HotReplaceMode {
        self.mode
    }

    /// Loader of the newest generation
    pub fn loader(&self) -> &Loader {
        &self.current
    }

    /// 1 for the initial loader, incremented on every replacement
    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn harness(&self) -> &Harness {
        &self.harness
    }

    /// Check the newest generation for stale modules and react per mode
    pub fn poll(&mut self) -> Result<Vec<StaleModule>, SwaploadError> {
        if self.mode == HotReplaceMode::Never {
            return Ok(Vec::new());
        }

        let stale = self.current.stale_modules()?;
        for module in &stale {
            warn!(
                target: "swapload::harness",
                module = %module.handle.name(),
                loader = %module.handle.owner(),
                staleness = ?module.staleness,
                "module changed on disk"
            );
        }

        if !stale.is_empty() && self.mode == HotReplaceMode::Auto {
            let next = (self.factory)();
            match self.spawn_generation(Some(&next)) {
                Ok(workers) => {
                    info!(
                        target: "swapload::harness",
                        generation = self.generation + 1,
                        loader = %next.id(),
                        workers = workers.len(),
                        "hot replaced"
                    );
                    self.current = next;
                    self.generation += 1;
                }
                Err(e) => warn!(
                    target: "swapload::harness",
                    module = %self.module,
                    error = %e,
                    "replacement failed, keeping current workers"
                ),
            }
        }
        Ok(stale)
    }

    /// Stop every generation's workers
    pub fn finish(self) -> Result<Vec<WorkerReport>, SwaploadError> {
        self.harness.shutdown()
    }

    fn spawn_generation(&mut self, loader: Option<&Loader>) -> Result<Vec<WorkerId>, SwaploadError> {
        let loader = loader.unwrap_or(&self.current);
        let workers = self.harness.config().workers.max(1);
        (0..workers)
            .map(|_| self.harness.spawn(loader, &self.module))
            .collect()
    }
}
