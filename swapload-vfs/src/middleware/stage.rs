//! Middleware execution stage

/// Execution stage for middleware
///
/// Stages are ordered by priority. Lower numbers execute first, i.e. sit
/// further from the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    /// Outer layer: logging, tracing
    #[default]
    Outer = 100,
    /// Accounting of operations that reach the backend
    Metering = 200,
}

impl Stage {
    /// Get stage priority (lower = earlier)
    pub fn priority(&self) -> u32 {
        *self as u32
    }
}
