//! Error types of module resolution and invocation

use crate::handle::LoaderId;
use crate::name::ModuleName;
use swapload_vfs::VfsError;
use thiserror::Error;

pub type LoadResult<T> = Result<T, LoadError>;

/// Module resolution error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    /// Neither the store nor the parent has the module
    #[error("module '{name}' not found")]
    NotFound { name: ModuleName },

    /// The store has a record for the module but reading it failed
    #[error("failed to read module '{name}': {cause}")]
    IoFailure {
        name: ModuleName,
        #[source]
        cause: VfsError,
    },

    /// A handle or instance crossed into a loader that did not define it
    #[error("module '{name}' defined by {actual} used where a module defined by {expected} is required")]
    IdentityViolation {
        name: ModuleName,
        expected: LoaderId,
        actual: LoaderId,
    },

    #[error("invalid module name '{name}': {reason}")]
    InvalidName { name: String, reason: &'static str },

    /// A thread panicked while holding loader state
    #[error("loader state poisoned by a panicked thread")]
    Poisoned,
}

impl LoadError {
    pub fn not_found(name: &ModuleName) -> Self {
        LoadError::NotFound { name: name.clone() }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, LoadError::NotFound { .. })
    }

    /// Stable machine-readable name of the variant
    pub fn kind(&self) -> &'static str {
        match self {
            LoadError::NotFound { .. } => "NotFound",
            LoadError::IoFailure { .. } => "IOFailure",
            LoadError::IdentityViolation { .. } => "IdentityViolation",
            LoadError::InvalidName { .. } => "InvalidName",
            LoadError::Poisoned => "Poisoned",
        }
    }

    /// The module the error is about, if any
    pub fn module(&self) -> Option<&str> {
        match self {
            LoadError::NotFound { name }
            | LoadError::IoFailure { name, .. }
            | LoadError::IdentityViolation { name, .. } => Some(name.as_str()),
            LoadError::InvalidName { name, .. } => Some(name),
            LoadError::Poisoned => None,
        }
    }
}

/// Failure of invoking behavior on a module instance
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvokeError {
    /// The module body cannot be interpreted at all
    #[error("module '{name}' body is not valid UTF-8")]
    Undecodable { name: String },

    /// This invocation failed; later ones may succeed
    #[error("invocation rejected: {reason}")]
    Rejected { reason: String },

    /// The instance can no longer be invoked
    #[error("module unavailable: {reason}")]
    Unavailable { reason: String },
}

impl InvokeError {
    /// Whether retrying on the same instance is pointless
    pub fn is_fatal(&self) -> bool {
        !matches!(self, InvokeError::Rejected { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let name = ModuleName::new("missing").unwrap();
        let err = LoadError::not_found(&name);
        assert!(err.is_not_found());
        assert_eq!(err.kind(), "NotFound");
        assert_eq!(err.module(), Some("missing"));
        assert_eq!(err.to_string(), "module 'missing' not found");
    }

    #[test]
    fn test_io_failure_keeps_cause() {
        let err = LoadError::IoFailure {
            name: ModuleName::new("Foo").unwrap(),
            cause: VfsError::PermissionDenied {
                path: "/store/Foo.mod".to_string(),
            },
        };
        assert!(!err.is_not_found());
        assert_eq!(err.kind(), "IOFailure");
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("Permission denied"));
    }

    #[test]
    fn test_invoke_error_fatality() {
        assert!(InvokeError::Undecodable { name: "Foo".into() }.is_fatal());
        assert!(InvokeError::Unavailable { reason: "gone".into() }.is_fatal());
        assert!(!InvokeError::Rejected { reason: "busy".into() }.is_fatal());
    }
}
