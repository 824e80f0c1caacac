// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Structural statistics gathered by a full walk of the tree.

use crate::config::RTreeConfig;
use crate::split::SplitKind;

/// Per-depth counts of branches, leaves, and entries.
///
/// Produced by [`SpatialSearch::collect_stats`](crate::SpatialSearch::collect_stats).
/// Depth 0 is the root.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    split: SplitKind,
    min_fill: usize,
    max_fill: usize,
    max_depth: usize,
    branch_count: usize,
    leaf_count: usize,
    entry_count: usize,
    branches_at_depth: Vec<usize>,
    leaves_at_depth: Vec<usize>,
    entries_at_depth: Vec<usize>,
}

impl Stats {
    pub(crate) fn new(config: &RTreeConfig) -> Self {
        Self {
            split: config.split(),
            min_fill: config.min_fill(),
            max_fill: config.max_fill(),
            ..Self::default()
        }
    }

    /// Split strategy of the tree.
    pub fn split(&self) -> SplitKind {
        self.split
    }

    /// Minimum fill of the tree.
    pub fn min_fill(&self) -> usize {
        self.min_fill
    }

    /// Maximum fill of the tree.
    pub fn max_fill(&self) -> usize {
        self.max_fill
    }

    /// Deepest level holding a node.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Number of branches in the tree.
    pub fn branch_count(&self) -> usize {
        self.branch_count
    }

    /// Number of leaves in the tree.
    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    /// Number of entries in the tree.
    pub fn entry_count(&self) -> usize {
        self.entry_count
    }

    /// Branches at each depth, indexed from the root.
    pub fn branches_at_depth(&self) -> &[usize] {
        &self.branches_at_depth
    }

    /// Leaves at each depth, indexed from the root.
    pub fn leaves_at_depth(&self) -> &[usize] {
        &self.leaves_at_depth
    }

    /// Entries at each depth, indexed from the root.
    pub fn entries_at_depth(&self) -> &[usize] {
        &self.entries_at_depth
    }

    /// Mean number of entries per leaf, `0.0` when there are no leaves.
    pub fn entries_per_leaf(&self) -> f32 {
        if self.leaf_count == 0 {
            return 0.0;
        }
        self.entry_count as f32 / self.leaf_count as f32
    }

    /// Mean leaf occupancy as a percentage of `max_fill`.
    pub fn leaf_fill_percentage(&self) -> f32 {
        if self.max_fill == 0 {
            return 0.0;
        }
        self.entries_per_leaf() * 100.0 / self.max_fill as f32
    }

    pub(crate) fn count_branch_at_depth(&mut self, depth: usize) {
        self.branch_count += 1;
        bump(&mut self.branches_at_depth, depth, 1);
        self.reach(depth);
    }

    pub(crate) fn count_leaf_at_depth(&mut self, depth: usize) {
        self.leaf_count += 1;
        bump(&mut self.leaves_at_depth, depth, 1);
        self.reach(depth);
    }

    pub(crate) fn count_entries_at_depth(&mut self, entries: usize, depth: usize) {
        self.entry_count += entries;
        bump(&mut self.entries_at_depth, depth, entries);
    }

    fn reach(&mut self, depth: usize) {
        self.max_depth = self.max_depth.max(depth);
    }
}

fn bump(counts: &mut Vec<usize>, depth: usize, by: usize) {
    if counts.len() <= depth {
        counts.resize(depth + 1, 0);
    }
    counts[depth] += by;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_metrics() {
        let mut s = Stats::new(&RTreeConfig::default());
        s.count_branch_at_depth(0);
        s.count_leaf_at_depth(1);
        s.count_leaf_at_depth(1);
        s.count_entries_at_depth(3, 1);
        s.count_entries_at_depth(5, 1);
        assert_eq!(s.max_depth(), 1);
        assert_eq!(s.entries_at_depth(), &[0, 8]);
        assert_eq!(s.leaves_at_depth(), &[0, 2]);
        assert_eq!(s.branches_at_depth(), &[1]);
        assert_eq!(s.entries_per_leaf(), 4.0);
        assert_eq!(s.leaf_fill_percentage(), 50.0);
    }

    #[test]
    fn empty_stats_do_not_divide_by_zero() {
        let s = Stats::default();
        assert_eq!(s.entries_per_leaf(), 0.0);
        assert_eq!(s.leaf_fill_percentage(), 0.0);
    }
}
