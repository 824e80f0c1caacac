// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Construction-time tree configuration.

use crate::error::RTreeError;
use crate::split::SplitKind;

/// Fill factors and split strategy of a tree. Immutable once the tree is built.
///
/// Every non-root node holds between `min_fill` and `max_fill` items, and
/// `max_fill >= 2 * min_fill` so that any overflowing node can be split into
/// two valid halves.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct RTreeConfig {
    pub(crate) min_fill: usize,
    pub(crate) max_fill: usize,
    pub(crate) split: SplitKind,
}

impl RTreeConfig {
    /// Default minimum number of items per node.
    pub const DEFAULT_MIN_FILL: usize = 2;
    /// Default maximum number of items per node.
    pub const DEFAULT_MAX_FILL: usize = 8;
    /// Default split strategy.
    pub const DEFAULT_SPLIT: SplitKind = SplitKind::Axial;

    /// Validated configuration.
    pub fn new(min_fill: usize, max_fill: usize, split: SplitKind) -> Result<Self, RTreeError> {
        if min_fill == 0 || max_fill < 2 * min_fill {
            return Err(RTreeError::InvalidFill { min_fill, max_fill });
        }
        Ok(Self {
            min_fill,
            max_fill,
            split,
        })
    }

    /// Same fill factors with a different split strategy.
    #[must_use]
    pub const fn with_split(mut self, split: SplitKind) -> Self {
        self.split = split;
        self
    }

    /// Minimum number of items in a non-root node.
    pub const fn min_fill(&self) -> usize {
        self.min_fill
    }

    /// Maximum number of items in any node.
    pub const fn max_fill(&self) -> usize {
        self.max_fill
    }

    /// Split strategy used on overflow.
    pub const fn split(&self) -> SplitKind {
        self.split
    }
}

impl Default for RTreeConfig {
    fn default() -> Self {
        Self {
            min_fill: Self::DEFAULT_MIN_FILL,
            max_fill: Self::DEFAULT_MAX_FILL,
            split: Self::DEFAULT_SPLIT,
        }
    }
}
