//! Hot-replace harness
//!
//! Runs workers that each hold one module instance and invoke it on a fixed
//! interval. A worker resolves its module once, before its thread starts,
//! and never goes back to its loader: rewriting the record on disk changes
//! nothing for a running worker. Picking up new content means starting a
//! worker on a fresh loader.

use crate::error::{HarnessError, SwaploadError};
use std::collections::HashSet;
use std::fmt;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, SyncSender, TrySendError};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use swapload_config::HarnessConfig;
use swapload_core::{InvokeError, Loader, LoaderId, ModuleInstance, ModuleName};
use tracing::{debug, error, info, warn};

/// Observations kept for the reader before workers start dropping them
pub const DEFAULT_OBSERVATION_CAPACITY: usize = 1024;

/// Identifies a worker within its harness, in spawn order starting at 1
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkerId(usize);

impl WorkerId {
    pub fn new(id: usize) -> Self {
        Self(id)
    }

    pub fn get(&self) -> usize {
        self.0
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "worker-{}", self.0)
    }
}

/// One invocation, as published on the observation channel
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub worker: WorkerId,
    /// 1-based
    pub iteration: u64,
    pub module: ModuleName,
    /// Loader that defined the invoked instance
    pub loader: LoaderId,
    pub output: Result<String, InvokeError>,
}

/// Summary of a worker that stopped cleanly
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerReport {
    pub worker: WorkerId,
    pub module: ModuleName,
    pub loader: LoaderId,
    pub iterations: u64,
    /// Non-fatal failures among `iterations`
    pub failures: u64,
    /// Observations discarded because the queue was full
    pub dropped: u64,
}

struct Worker {
    id: WorkerId,
    stop: Sender<()>,
    thread: JoinHandle<Result<WorkerReport, HarnessError>>,
}

/// A set of cancellable, joinable workers
pub struct Harness {
    config: HarnessConfig,
    workers: Vec<Worker>,
    next_id: usize,
    observations_tx: SyncSender<Observation>,
    observations_rx: Receiver<Observation>,
    /// Non-fatal reasons already reported at `warn`
    seen_reasons: Arc<Mutex<HashSet<String>>>,
    /// Workers in the order they failed
    failure_order: Arc<Mutex<Vec<WorkerId>>>,
}

impl Harness {
    pub fn new(config: HarnessConfig) -> Self {
        Self::with_observation_capacity(config, DEFAULT_OBSERVATION_CAPACITY)
    }

    /// A harness whose observation queue holds at most `capacity` entries
    ///
    /// When the queue is full, workers drop new observations and count them
    /// in [`WorkerReport::dropped`].
    pub fn with_observation_capacity(config: HarnessConfig, capacity: usize) -> Self {
        let (observations_tx, observations_rx) = mpsc::sync_channel(capacity);
        Self {
            config,
            workers: Vec::new(),
            next_id: 0,
            observations_tx,
            observations_rx,
            seen_reasons: Arc::new(Mutex::new(HashSet::new())),
            failure_order: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Start a worker on `name` as resolved by `loader`, invoking the
    /// instance's own behavior
    pub fn spawn(&mut self, loader: &Loader, name: &ModuleName) -> Result<WorkerId, SwaploadError> {
        self.spawn_with(loader, name, ModuleInstance::invoke)
    }

    /// Start a worker on `name` as resolved by `loader`, invoking `behavior`
    ///
    /// Resolution happens on the calling thread; a failure leaves the
    /// harness unchanged.
    pub fn spawn_with<F>(
        &mut self,
        loader: &Loader,
        name: &ModuleName,
        behavior: F,
    ) -> Result<WorkerId, SwaploadError>
    where
        F: Fn(&ModuleInstance) -> Result<String, InvokeError> + Send + 'static,
    {
        let handle = loader.load(name)?;
        self.start(handle.instantiate(), behavior)
    }

    fn start<F>(&mut self, instance: ModuleInstance, behavior: F) -> Result<WorkerId, SwaploadError>
    where
        F: Fn(&ModuleInstance) -> Result<String, InvokeError> + Send + 'static,
    {
        let id = WorkerId(self.next_id + 1);
        let module = instance.handle().name().clone();
        let loader = instance.handle().owner();
        let (stop_tx, stop_rx) = mpsc::channel();

        let worker = WorkerLoop {
            id,
            instance,
            behavior,
            stop: stop_rx,
            observations: self.observations_tx.clone(),
            interval: Duration::from_millis(self.config.interval_ms),
            max_iterations: self.config.max_iterations,
            seen_reasons: Arc::clone(&self.seen_reasons),
            failure_order: Arc::clone(&self.failure_order),
        };

        let thread = thread::Builder::new()
            .name(format!("swapload-{}", id))
            .spawn(move || worker.run())
            .map_err(|e| HarnessError::Spawn {
                worker: id,
                message: e.to_string(),
            })?;

        self.next_id += 1;
        info!(
            target: "swapload::harness",
            worker = %id,
            %module,
            %loader,
            "worker started"
        );
        self.workers.push(Worker {
            id,
            stop: stop_tx,
            thread,
        });
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Workers whose thread has not returned yet
    pub fn running(&self) -> usize {
        self.workers.iter().filter(|w| !w.thread.is_finished()).count()
    }

    /// Drain the observations published so far
    pub fn observations(&self) -> Vec<Observation> {
        self.observations_rx.try_iter().collect()
    }

    /// Wait up to `timeout` for the next observation
    pub fn recv_observation(&self, timeout: Duration) -> Option<Observation> {
        self.observations_rx.recv_timeout(timeout).ok()
    }

    /// Stop every worker and wait for all of them
    ///
    /// Returns the reports of all workers, or the failure that happened
    /// first. Every worker is joined either way.
    pub fn shutdown(mut self) -> Result<Vec<WorkerReport>, SwaploadError> {
        let workers = std::mem::take(&mut self.workers);
        info!(target: "swapload::harness", workers = workers.len(), "shutting down");

        let mut reports = Vec::with_capacity(workers.len());
        let mut failures = Vec::new();
        for (id, result) in stop_and_join(workers) {
            match result {
                Ok(report) => reports.push(report),
                Err(e) => failures.push(e),
            }
            debug!(target: "swapload::harness", worker = %id, "joined");
        }

        // Failures missing from the log keep spawn order, after the logged ones
        let order = match self.failure_order.lock() {
            Ok(order) => order.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        failures.sort_by_key(|e| {
            order
                .iter()
                .position(|id| *id == e.worker())
                .unwrap_or(usize::MAX)
        });

        match failures.into_iter().next() {
            Some(e) => Err(e.into()),
            None => Ok(reports),
        }
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        let workers = std::mem::take(&mut self.workers);
        if !workers.is_empty() {
            stop_and_join(workers);
        }
    }
}

impl fmt::Debug for Harness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Harness")
            .field("config", &self.config)
            .field("workers", &self.workers.iter().map(|w| w.id).collect::<Vec<_>>())
            .finish()
    }
}

/// Close every stop channel, then join every thread in spawn order
fn stop_and_join(workers: Vec<Worker>) -> Vec<(WorkerId, Result<WorkerReport, HarnessError>)> {
    let threads: Vec<_> = workers
        .into_iter()
        .map(|worker| {
            drop(worker.stop);
            (worker.id, worker.thread)
        })
        .collect();

    threads
        .into_iter()
        .map(|(id, thread)| {
            let result = thread.join().unwrap_or_else(|_| {
                error!(target: "swapload::harness", worker = %id, "worker panicked");
                Err(HarnessError::Panicked { worker: id })
            });
            (id, result)
        })
        .collect()
}

/// State owned by one worker thread
struct WorkerLoop<F> {
    id: WorkerId,
    instance: ModuleInstance,
    behavior: F,
    stop: Receiver<()>,
    observations: SyncSender<Observation>,
    interval: Duration,
    max_iterations: Option<u64>,
    seen_reasons: Arc<Mutex<HashSet<String>>>,
    failure_order: Arc<Mutex<Vec<WorkerId>>>,
}

/// Appends its worker to the failure log if dropped during a panic
struct PanicRecorder<'a> {
    id: WorkerId,
    failure_order: &'a Mutex<Vec<WorkerId>>,
}

impl Drop for PanicRecorder<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            record_failure(self.failure_order, self.id);
        }
    }
}

fn record_failure(failure_order: &Mutex<Vec<WorkerId>>, id: WorkerId) {
    match failure_order.lock() {
        Ok(mut order) => order.push(id),
        Err(poisoned) => poisoned.into_inner().push(id),
    }
}

impl<F> WorkerLoop<F>
where
    F: Fn(&ModuleInstance) -> Result<String, InvokeError>,
{
    fn run(self) -> Result<WorkerReport, HarnessError> {
        let mut report = WorkerReport {
            worker: self.id,
            module: self.instance.handle().name().clone(),
            loader: self.instance.handle().owner(),
            iterations: 0,
            failures: 0,
            dropped: 0,
        };
        let _panic_recorder = PanicRecorder {
            id: self.id,
            failure_order: &self.failure_order,
        };

        loop {
            if self.max_iterations.is_some_and(|max| report.iterations >= max) {
                debug!(target: "swapload::harness", worker = %self.id, "iteration limit reached");
                break;
            }
            match self.stop.recv_timeout(self.interval) {
                Err(RecvTimeoutError::Timeout) => {}
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }

            report.iterations += 1;
            let output = (self.behavior)(&self.instance);
            let fatal = match &output {
                Ok(text) => {
                    info!(
                        target: "swapload::harness",
                        worker = %self.id,
                        iteration = report.iterations,
                        module = %report.module,
                        loader = %report.loader,
                        output = %text,
                        "invoke"
                    );
                    None
                }
                Err(e) if e.is_fatal() => {
                    error!(
                        target: "swapload::harness",
                        worker = %self.id,
                        module = %report.module,
                        error = %e,
                        "invoke failed, stopping worker"
                    );
                    Some(e.clone())
                }
                Err(e) => {
                    report.failures += 1;
                    self.note_rejection(e);
                    None
                }
            };

            let observation = Observation {
                worker: self.id,
                iteration: report.iterations,
                module: report.module.clone(),
                loader: report.loader,
                output,
            };
            match self.observations.try_send(observation) {
                Ok(()) | Err(TrySendError::Disconnected(_)) => {}
                Err(TrySendError::Full(_)) => {
                    if report.dropped == 0 {
                        warn!(target: "swapload::harness", worker = %self.id, "observation queue full, dropping");
                    }
                    report.dropped += 1;
                }
            }

            if let Some(source) = fatal {
                record_failure(&self.failure_order, self.id);
                return Err(HarnessError::WorkerFailed {
                    worker: self.id,
                    source,
                });
            }
        }

        info!(
            target: "swapload::harness",
            worker = %self.id,
            iterations = report.iterations,
            failures = report.failures,
            dropped = report.dropped,
            "worker stopped"
        );
        Ok(report)
    }

    /// Warn about a reason once per harness; repeats go to `debug`
    fn note_rejection(&self, e: &InvokeError) {
        let reason = e.to_string();
        let first = match self.seen_reasons.lock() {
            Ok(mut seen) => seen.insert(reason),
            Err(_) => true,
        };
        if first {
            warn!(target: "swapload::harness", worker = %self.id, error = %e, "invoke rejected");
        } else {
            debug!(target: "swapload::harness", worker = %self.id, error = %e, "invoke rejected again");
        }
    }
}
