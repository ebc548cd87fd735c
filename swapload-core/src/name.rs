//! Module names and module bytes

use crate::error::{LoadError, LoadResult};
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Component, Path};
use std::sync::Arc;

/// Name of a module, unique within one resolution scope
///
/// Compared verbatim: `Foo` and `foo` are different modules, and so are
/// `a/b` and `a.b`. A name may contain `/` to address nested records, but
/// never leaves the store root.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleName(Arc<str>);

impl ModuleName {
    pub fn new(name: impl AsRef<str>) -> LoadResult<Self> {
        let name = name.as_ref();
        let invalid = |reason: &'static str| LoadError::InvalidName {
            name: name.to_string(),
            reason,
        };

        if name.is_empty() {
            return Err(invalid("name is empty"));
        }
        if name.contains('\0') {
            return Err(invalid("name contains a NUL character"));
        }
        let path = Path::new(name);
        if name.starts_with('/')
            || name.starts_with('\\')
            || has_drive_prefix(name)
            || path.has_root()
            || path.components().any(|c| matches!(c, Component::Prefix(_)))
        {
            return Err(invalid("name is an absolute path"));
        }
        if name.split(['/', '\\']).any(|segment| segment == "..") {
            return Err(invalid("name escapes the store root"));
        }
        Ok(Self(Arc::from(name)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// `C:` style prefixes, which replace the store root on Windows
fn has_drive_prefix(name: &str) -> bool {
    let bytes = name.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

impl TryFrom<&str> for ModuleName {
    type Error = LoadError;

    fn try_from(value: &str) -> LoadResult<Self> {
        Self::new(value)
    }
}

impl fmt::Display for ModuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for ModuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModuleName({:?})", &*self.0)
    }
}

/// Immutable content of a module record
///
/// Cloning shares the buffer. Two blobs are equal when their content is.
#[derive(Clone, PartialEq, Eq)]
pub struct ModuleBytes(Arc<[u8]>);

impl ModuleBytes {
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Content hash, stable within one process
    pub fn digest(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.0.hash(&mut hasher);
        hasher.finish()
    }
}

impl From<Vec<u8>> for ModuleBytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self(Arc::from(bytes))
    }
}

impl From<&[u8]> for ModuleBytes {
    fn from(bytes: &[u8]) -> Self {
        Self(Arc::from(bytes))
    }
}

impl From<&str> for ModuleBytes {
    fn from(text: &str) -> Self {
        Self::from(text.as_bytes())
    }
}

impl AsRef<[u8]> for ModuleBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for ModuleBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleBytes")
            .field("len", &self.len())
            .field("digest", &format_args!("{:016x}", self.digest()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_is_case_and_separator_sensitive() {
        let a = ModuleName::new("Foo").unwrap();
        let b = ModuleName::new("foo").unwrap();
        assert_ne!(a, b);
        assert_ne!(ModuleName::new("a/b").unwrap(), ModuleName::new("a.b").unwrap());
    }

    #[test]
    fn test_nested_name_allowed() {
        let name = ModuleName::new("com/example/Foo").unwrap();
        assert_eq!(name.as_str(), "com/example/Foo");
        assert_eq!(name.to_string(), "com/example/Foo");
    }

    #[test]
    fn test_invalid_names_rejected() {
        for bad in [
            "",
            "/etc/passwd",
            "\\share",
            "../Foo",
            "a/../../b",
            "nul\0",
            "C:/Windows/x",
            "c:foo",
            "D:\\store",
        ] {
            let err = ModuleName::new(bad).unwrap_err();
            assert!(
                matches!(err, LoadError::InvalidName { .. }),
                "expected InvalidName for {:?}, got {:?}",
                bad,
                err
            );
        }
    }

    #[test]
    fn test_bytes_equality_is_by_content() {
        let a = ModuleBytes::from("hello");
        let b = ModuleBytes::from(b"hello".to_vec());
        assert_eq!(a, b);
        assert_eq!(a.digest(), b.digest());
        assert_ne!(a.digest(), ModuleBytes::from("hullo").digest());
        assert_eq!(a.len(), 5);
        assert!(!a.is_empty());
    }
}
