//! Swapload Config - Pure configuration data structures
//!
//! This crate contains only data structures, no logic or global state.
//! It serves as the shared configuration vocabulary across all Swapload crates.
//!
//! Every type deserializes from the camelCase JSON used by `swapload.json`.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Default file extension of module records in a store directory
pub const DEFAULT_EXTENSION: &str = "mod";

/// Delegation order of a loader
///
/// The cache is always consulted first; the ordering only decides which of
/// the local store and the parent resolver is asked next.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Ordering {
    /// Override directory first, parent on absence
    LocalFirst,
    /// Parent first, override directory only for names the parent lacks
    ParentFirst,
}

impl Ordering {
    /// Get the string name of the ordering
    pub fn as_str(&self) -> &'static str {
        match self {
            Ordering::LocalFirst => "local-first",
            Ordering::ParentFirst => "parent-first",
        }
    }
}

impl Default for Ordering {
    fn default() -> Self {
        Ordering::ParentFirst
    }
}

impl std::fmt::Display for Ordering {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when an ordering name is not recognized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownOrdering(pub String);

impl std::fmt::Display for UnknownOrdering {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown ordering '{}', expected 'local-first' or 'parent-first'",
            self.0
        )
    }
}

impl std::error::Error for UnknownOrdering {}

impl std::str::FromStr for Ordering {
    type Err = UnknownOrdering;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local-first" => Ok(Ordering::LocalFirst),
            "parent-first" => Ok(Ordering::ParentFirst),
            other => Err(UnknownOrdering(other.to_string())),
        }
    }
}

/// Configuration of a single loader instance
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoaderConfig {
    /// Override directory holding module records
    pub store_root: PathBuf,
    /// Delegation order
    pub ordering: Ordering,
    /// Extension appended to a module name to find its record
    pub extension: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            store_root: PathBuf::from("."),
            ordering: Ordering::default(),
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }
}

/// Platform-wide parent loader, backed by its own directory
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemConfig {
    pub store_root: PathBuf,
    #[serde(default = "default_extension")]
    pub extension: String,
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}

/// Hot-replace harness settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HarnessConfig {
    /// Number of workers started by `watch`
    pub workers: usize,
    /// Pause between two invocations of a worker, in milliseconds
    pub interval_ms: u64,
    /// Stop a worker after this many invocations (None = until shutdown)
    pub max_iterations: Option<u64>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            workers: 2,
            interval_ms: 500,
            max_iterations: None,
        }
    }
}

/// How the `watch` command reacts to rewritten module records
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HotReplaceMode {
    /// Never look at the store again
    Never,
    /// Report stale modules, keep running workers untouched
    Manual,
    /// Report stale modules and start a worker on a fresh loader
    Auto,
}

impl Default for HotReplaceMode {
    fn default() -> Self {
        HotReplaceMode::Manual
    }
}

/// Contents of a `swapload.json` project file
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectConfig {
    pub loader: LoaderConfig,
    pub system: Option<SystemConfig>,
    pub harness: HarnessConfig,
    pub hot_replace: HotReplaceMode,
    /// "silent", "error", "warn", "info", "debug", "trace"
    pub log_level: Option<String>,
    /// Per-component overrides of `log_level`, keyed by [`Component::as_str`]
    pub log_levels: BTreeMap<String, String>,
}

/// Component enum for component-specific log configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Component {
    Vfs,
    Store,
    Parent,
    Loader,
    Harness,
}

impl Component {
    pub const ALL: [Component; 5] = [
        Component::Vfs,
        Component::Store,
        Component::Parent,
        Component::Loader,
        Component::Harness,
    ];

    /// Get the string name of the component
    pub fn as_str(&self) -> &'static str {
        match self {
            Component::Vfs => "vfs",
            Component::Store => "store",
            Component::Parent => "parent",
            Component::Loader => "loader",
            Component::Harness => "harness",
        }
    }

    /// Inverse of [`as_str`](Self::as_str)
    pub fn parse(s: &str) -> Option<Component> {
        Component::ALL.into_iter().find(|c| c.as_str() == s)
    }

    /// Get the log target name for this component
    pub fn target(&self) -> String {
        format!("swapload::{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_loader_config() {
        let cfg = LoaderConfig::default();
        assert_eq!(cfg.ordering, Ordering::ParentFirst);
        assert_eq!(cfg.extension, "mod");
    }

    #[test]
    fn test_default_harness_config() {
        let cfg = HarnessConfig::default();
        assert_eq!(cfg.workers, 2);
        assert_eq!(cfg.interval_ms, 500);
        assert!(cfg.max_iterations.is_none());
    }

    #[test]
    fn test_ordering_from_str() {
        assert_eq!("local-first".parse::<Ordering>(), Ok(Ordering::LocalFirst));
        assert_eq!("parent-first".parse::<Ordering>(), Ok(Ordering::ParentFirst));
        assert!("LocalFirst".parse::<Ordering>().is_err());
        assert_eq!(Ordering::LocalFirst.to_string(), "local-first");
    }

    #[test]
    fn test_component_target() {
        assert_eq!(Component::Store.as_str(), "store");
        assert_eq!(Component::Harness.target(), "swapload::harness");
        assert_eq!(Component::parse("loader"), Some(Component::Loader));
        assert_eq!(Component::parse("cli"), None);
    }

    #[test]
    fn test_project_config_from_json() {
        let json = r#"{
            "loader": { "storeRoot": "replacement", "ordering": "local-first" },
            "system": { "storeRoot": "system" },
            "harness": { "workers": 3, "intervalMs": 100 },
            "hotReplace": "auto",
            "logLevel": "debug",
            "logLevels": { "harness": "trace", "vfs": "warn" }
        }"#;
        let cfg: ProjectConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.loader.store_root, PathBuf::from("replacement"));
        assert_eq!(cfg.loader.ordering, Ordering::LocalFirst);
        assert_eq!(cfg.loader.extension, "mod");
        assert_eq!(cfg.system.unwrap().extension, "mod");
        assert_eq!(cfg.harness.workers, 3);
        assert_eq!(cfg.harness.interval_ms, 100);
        assert_eq!(cfg.hot_replace, HotReplaceMode::Auto);
        assert_eq!(cfg.log_level.as_deref(), Some("debug"));
        assert_eq!(cfg.log_levels.len(), 2);
        assert_eq!(cfg.log_levels["harness"], "trace");
    }

    #[test]
    fn test_project_config_empty_json_uses_defaults() {
        let cfg: ProjectConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, ProjectConfig::default());
        assert_eq!(cfg.hot_replace, HotReplaceMode::Manual);
    }
}
