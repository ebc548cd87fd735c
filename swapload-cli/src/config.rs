//! CLI 配置
//!
//! 日志配置：全局级别加上按组件覆盖

use std::collections::BTreeMap;
use swapload_config::Component;
use tracing::Level;

/// CLI 日志配置
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub global: Level,
    pub vfs: Option<Level>,
    pub store: Option<Level>,
    pub parent: Option<Level>,
    pub loader: Option<Level>,
    pub harness: Option<Level>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            global: Level::INFO,
            vfs: None,
            store: None,
            parent: None,
            loader: None,
            harness: None,
        }
    }
}

impl LogConfig {
    pub fn with_global(global: Level) -> Self {
        Self {
            global,
            ..Self::default()
        }
    }

    /// `global` plus the overrides of a project's `logLevels` map
    pub fn from_levels(global: Level, levels: &BTreeMap<String, String>) -> Result<Self, String> {
        let mut config = Self::with_global(global);
        for (component, level) in levels {
            let component = Component::parse(component)
                .ok_or_else(|| format!("unknown log component '{}'", component))?;
            let level = parse_log_level(level)
                .ok_or_else(|| format!("unknown log level '{}' for {}", level, component.as_str()))?;
            let slot = match component {
                Component::Vfs => &mut config.vfs,
                Component::Store => &mut config.store,
                Component::Parent => &mut config.parent,
                Component::Loader => &mut config.loader,
                Component::Harness => &mut config.harness,
            };
            *slot = Some(level);
        }
        Ok(config)
    }

    /// Get log level for a specific component
    pub fn level_for(&self, component: Component) -> Level {
        let specific = match component {
            Component::Vfs => self.vfs,
            Component::Store => self.store,
            Component::Parent => self.parent,
            Component::Loader => self.loader,
            Component::Harness => self.harness,
        };
        specific.unwrap_or(self.global)
    }
}

/// Parse log level string ("silent" keeps errors only)
pub fn parse_log_level(s: &str) -> Option<Level> {
    match s.to_lowercase().as_str() {
        "silent" | "error" => Some(Level::ERROR),
        "warn" => Some(Level::WARN),
        "info" => Some(Level::INFO),
        "debug" => Some(Level::DEBUG),
        "trace" => Some(Level::TRACE),
        _ => None,
    }
}
