//! Engine configuration.

use crate::birggit::error::{BirggitError, BirggitResult};

/// How the common ancestor of two branches is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AncestorStrategy {
    /// First ancestor of branch A, in A's depth-first log order, that is also
    /// an ancestor of branch B.
    #[default]
    FirstMatch,
    /// Common ancestor closest to both heads, measured in parent links.
    MergeBase,
}

/// Which commits count as orphans.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrphanRule {
    /// commits with no outgoing relationship (this includes branch heads)
    #[default]
    NoOutgoing,
    /// commits with no relationship at all
    Disconnected,
}

/// Engine configuration options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BirggitConfig {
    /// Number of commits returned by `log` when no limit is given.
    pub page_size: usize,
    /// Appended to the identifier of an amended commit.
    pub amend_suffix: String,
    pub ancestor_strategy: AncestorStrategy,
    pub orphan_rule: OrphanRule,
}

impl Default for BirggitConfig {
    fn default() -> Self {
        Self {
            page_size: 25,
            amend_suffix: "_amended".to_string(),
            ancestor_strategy: AncestorStrategy::default(),
            orphan_rule: OrphanRule::default(),
        }
    }
}

impl BirggitConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default log page size.
    pub fn page_size(mut self, value: usize) -> Self {
        self.page_size = value;
        self
    }

    /// Set the suffix of amended commit identifiers.
    pub fn amend_suffix(mut self, value: impl Into<String>) -> Self {
        self.amend_suffix = value.into();
        self
    }

    /// Set the common-ancestor strategy.
    pub fn ancestor_strategy(mut self, value: AncestorStrategy) -> Self {
        self.ancestor_strategy = value;
        self
    }

    /// Set the orphan rule used by `find_orphan_commits` and `gc`.
    pub fn orphan_rule(mut self, value: OrphanRule) -> Self {
        self.orphan_rule = value;
        self
    }

    /// Check the options are usable.
    pub fn validate(&self) -> BirggitResult<()> {
        if self.page_size == 0 {
            return Err(BirggitError::InvalidConfig(
                "page size must be at least 1".to_string(),
            ));
        }
        if self.amend_suffix.is_empty() {
            return Err(BirggitError::InvalidConfig(
                "amend suffix cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}
