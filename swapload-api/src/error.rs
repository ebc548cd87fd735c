//! API 错误类型
//!
//! Unified error type of the API layer and its structured report.

use serde::Serialize;
use swapload_core::{InvokeError, LoadError};
use thiserror::Error;

use crate::harness::WorkerId;

/// Failure of a harness worker
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HarnessError {
    /// The worker's instance can no longer be invoked
    #[error("{worker} stopped: {source}")]
    WorkerFailed {
        worker: WorkerId,
        #[source]
        source: InvokeError,
    },

    /// The worker thread panicked
    #[error("{worker} panicked")]
    Panicked { worker: WorkerId },

    /// The worker thread could not be started
    #[error("failed to start {worker}: {message}")]
    Spawn { worker: WorkerId, message: String },
}

impl HarnessError {
    pub fn worker(&self) -> WorkerId {
        match self {
            HarnessError::WorkerFailed { worker, .. }
            | HarnessError::Panicked { worker }
            | HarnessError::Spawn { worker, .. } => *worker,
        }
    }
}

/// Swapload 错误类型
#[derive(Error, Debug)]
pub enum SwaploadError {
    /// Module resolution
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Hot-replace harness
    #[error(transparent)]
    Harness(#[from] HarnessError),

    /// Project file or option
    #[error("Config error: {0}")]
    Config(String),

    /// File access outside a module store
    #[error("IO error: {0}")]
    Io(String),
}

impl SwaploadError {
    /// 获取错误阶段名称
    pub fn phase(&self) -> &'static str {
        match self {
            SwaploadError::Load(_) => "load",
            SwaploadError::Harness(_) => "harness",
            SwaploadError::Config(_) => "config",
            SwaploadError::Io(_) => "io",
        }
    }

    /// 转换为结构化错误报告
    ///
    /// The CLI prints it; tools can serialize it with [`ErrorReport::to_json`].
    pub fn to_report(&self) -> ErrorReport {
        let (error_kind, module) = match self {
            SwaploadError::Load(e) => (e.kind().to_string(), e.module().map(str::to_string)),
            SwaploadError::Harness(HarnessError::WorkerFailed { .. }) => {
                ("WorkerFailed".to_string(), None)
            }
            SwaploadError::Harness(HarnessError::Panicked { .. }) => {
                ("WorkerPanicked".to_string(), None)
            }
            SwaploadError::Harness(HarnessError::Spawn { .. }) => {
                ("WorkerSpawn".to_string(), None)
            }
            SwaploadError::Config(_) => ("ConfigError".to_string(), None),
            SwaploadError::Io(_) => ("IoError".to_string(), None),
        };
        ErrorReport {
            phase: self.phase(),
            error_kind,
            module,
            message: self.to_string(),
        }
    }
}

/// 结构化错误报告
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorReport {
    /// load, harness, config, io
    pub phase: &'static str,
    /// Variant name, stable for programmatic handling
    pub error_kind: String,
    /// Module concerned, if any
    pub module: Option<String>,
    /// Human-readable message
    pub message: String,
}

impl std::fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.module {
            Some(module) => write!(
                f,
                "[{}] {} ({}): {}",
                self.phase, self.error_kind, module, self.message
            ),
            None => write!(f, "[{}] {}: {}", self.phase, self.error_kind, self.message),
        }
    }
}

impl ErrorReport {
    /// 转换为 JSON 格式
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|e| format!(r#"{{"phase":"{}","error_kind":"Report","message":"{}"}}"#, self.phase, e))
    }

    /// 简洁格式（适合终端）
    pub fn to_short(&self) -> String {
        format!("{}: {}", self.phase, self.message)
    }
}
