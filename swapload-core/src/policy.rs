//! Loader chain policy
//!
//! The cache is always checked first. After a cache miss a loader walks the
//! two remaining steps in the order given by its [`Ordering`].

use swapload_config::Ordering;

/// One non-cache step of a resolution
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// Read the loader's own store and materialize
    Local,
    /// Ask the parent resolver
    Parent,
}

/// Delegation order fixed at loader construction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Chain {
    ordering: Ordering,
}

impl Chain {
    pub fn new(ordering: Ordering) -> Self {
        Self { ordering }
    }

    pub fn ordering(&self) -> Ordering {
        self.ordering
    }

    pub fn steps(&self) -> [Step; 2] {
        match self.ordering {
            Ordering::LocalFirst => [Step::Local, Step::Parent],
            Ordering::ParentFirst => [Step::Parent, Step::Local],
        }
    }
}

impl From<Ordering> for Chain {
    fn from(ordering: Ordering) -> Self {
        Self::new(ordering)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_first_steps() {
        assert_eq!(
            Chain::new(Ordering::LocalFirst).steps(),
            [Step::Local, Step::Parent]
        );
    }

    #[test]
    fn test_parent_first_steps() {
        let chain = Chain::from(Ordering::ParentFirst);
        assert_eq!(chain.steps(), [Step::Parent, Step::Local]);
        assert_eq!(chain.ordering(), Ordering::ParentFirst);
    }
}
