//! API 层配置
//!
//! 包含执行配置 RunConfig 和全局单例（供 CLI 使用）

use crate::error::SwaploadError;
use once_cell::sync::OnceCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use swapload_config::{HarnessConfig, HotReplaceMode, LoaderConfig, ProjectConfig, SystemConfig};

/// Name of the project file looked up by the CLI
pub const PROJECT_FILE: &str = "swapload.json";

/// A project configuration with every path made absolute
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunConfig {
    /// Override loader
    pub loader: LoaderConfig,
    /// Shared parent loader (None = nothing above the override loader)
    pub system: Option<SystemConfig>,
    pub harness: HarnessConfig,
    pub hot_replace: HotReplaceMode,
    pub log_level: Option<String>,
    /// Component name to level
    pub log_levels: BTreeMap<String, String>,
}

impl RunConfig {
    /// Resolve the relative store roots of `project` against `base_dir`
    pub fn from_project(project: ProjectConfig, base_dir: &Path) -> Self {
        let mut loader = project.loader;
        loader.store_root = rebase(base_dir, &loader.store_root);
        let system = project.system.map(|mut system| {
            system.store_root = rebase(base_dir, &system.store_root);
            system
        });
        Self {
            loader,
            system,
            harness: project.harness,
            hot_replace: project.hot_replace,
            log_level: project.log_level,
            log_levels: project.log_levels,
        }
    }

    /// Read a `swapload.json` file; paths inside are relative to its directory
    pub fn load(path: &Path) -> Result<Self, SwaploadError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| SwaploadError::Io(format!("{}: {}", path.display(), e)))?;
        let project: ProjectConfig = serde_json::from_str(&text)
            .map_err(|e| SwaploadError::Config(format!("{}: {}", path.display(), e)))?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Ok(Self::from_project(project, base_dir))
    }
}

fn rebase(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

// Global config singleton for CLI convenience
static GLOBAL_CONFIG: OnceCell<RunConfig> = OnceCell::new();

/// Initialize global configuration; fails if it was already set
pub fn init(config: RunConfig) -> Result<(), SwaploadError> {
    GLOBAL_CONFIG
        .set(config)
        .map_err(|_| SwaploadError::Config("config already initialized".to_string()))
}

/// Get global config reference
pub fn config() -> Result<&'static RunConfig, SwaploadError> {
    GLOBAL_CONFIG
        .get()
        .ok_or_else(|| SwaploadError::Config("config not initialized".to_string()))
}

/// Check if config is initialized
pub fn is_initialized() -> bool {
    GLOBAL_CONFIG.get().is_some()
}
