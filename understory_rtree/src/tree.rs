// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The tree engine: owns the root and the configuration.

use core::fmt;
use core::mem;
use core::ops::ControlFlow;

use tracing::{debug, trace};

use crate::concurrent::ConcurrentRTree;
use crate::config::RTreeConfig;
use crate::error::RTreeError;
use crate::geometry::RectBuilder;
use crate::instrument::{Instrumented, Probe};
use crate::node::{Node, Removal};
use crate::stats::Stats;

/// A balanced R-tree over entries of type `T`, bounded through `B`.
///
/// The root starts out as an empty leaf. It is replaced by a new branch when
/// it splits and by its only child when removals leave it with one.
///
/// Queries come in three sink forms: a caller-provided slice (filled up to
/// its length), a visitor closure, and a growable `Vec`.
pub struct RTree<T, B: RectBuilder<T>> {
    builder: B,
    config: RTreeConfig,
    root: Node<T, B::Rect>,
    len: usize,
}

impl<T, B: RectBuilder<T>> fmt::Debug for RTree<T, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RTree")
            .field("config", &self.config)
            .field("len", &self.len)
            .field("height", &self.height())
            .finish_non_exhaustive()
    }
}

impl<T, B: RectBuilder<T> + Default> Default for RTree<T, B> {
    fn default() -> Self {
        Self::new(B::default())
    }
}

impl<T, B: RectBuilder<T>> RTree<T, B> {
    /// Empty tree with the default configuration.
    pub fn new(builder: B) -> Self {
        Self::with_config(builder, RTreeConfig::default())
    }

    /// Empty tree with an explicit configuration.
    pub fn with_config(builder: B, config: RTreeConfig) -> Self {
        Self {
            builder,
            config,
            root: Node::empty(),
            len: 0,
        }
    }

    /// The rectangle builder.
    pub fn builder(&self) -> &B {
        &self.builder
    }

    /// The configuration the tree was built with.
    pub fn config(&self) -> &RTreeConfig {
        &self.config
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Same as [`len`](Self::len).
    pub fn entry_count(&self) -> usize {
        self.len
    }

    /// Whether the tree holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of levels, `1` for a tree whose root is a leaf.
    pub fn height(&self) -> usize {
        self.root.height()
    }

    /// MBR of every stored entry, `None` when empty.
    pub fn bound(&self) -> Option<&B::Rect> {
        self.root.bound()
    }

    /// Insert `entry`.
    pub fn add(&mut self, entry: T) {
        let rect = self.builder.bbox(&entry);
        self.insert(rect, entry);
        self.len += 1;
    }

    fn insert(&mut self, rect: B::Rect, entry: T) {
        if let Some(sibling) = self.root.add(entry, rect, &self.config) {
            self.grow(sibling);
        }
    }

    fn grow(&mut self, sibling: Node<T, B::Rect>) {
        let left = mem::replace(&mut self.root, Node::empty());
        self.root = Node::grown(left, sibling);
        debug!(height = self.root.height(), "root split");
    }

    fn shrink(&mut self) {
        while !self.root.is_leaf() && self.root.len() <= 1 {
            let root = mem::replace(&mut self.root, Node::empty());
            self.root = root.collapse();
            debug!(height = self.root.height(), "root collapsed");
        }
    }

    /// Visit entries whose rect lies inside `rect`.
    pub fn search_with(&self, rect: &B::Rect, mut visit: impl FnMut(&T)) {
        let _ = self.root.search(rect, &mut each(&mut visit), &mut ());
    }

    /// Visit entries whose rect intersects `rect`.
    pub fn intersects_with(&self, rect: &B::Rect, mut visit: impl FnMut(&T)) {
        let _ = self.root.intersects(rect, &mut each(&mut visit), &mut ());
    }

    /// [`search_with`](Self::search_with), reporting each node entered to
    /// `probe`.
    pub fn search_probed(&self, rect: &B::Rect, probe: &mut impl Probe, mut visit: impl FnMut(&T)) {
        let _ = self.root.search(rect, &mut each(&mut visit), probe);
    }

    /// [`intersects_with`](Self::intersects_with), reporting each node
    /// entered to `probe`.
    pub fn intersects_probed(
        &self,
        rect: &B::Rect,
        probe: &mut impl Probe,
        mut visit: impl FnMut(&T),
    ) {
        let _ = self.root.intersects(rect, &mut each(&mut visit), probe);
    }

    /// Visit every entry.
    pub fn for_each(&self, mut visit: impl FnMut(&T)) {
        self.root.for_each(&mut visit);
    }

    /// Walk the whole tree and report its shape.
    pub fn collect_stats(&self) -> Stats {
        let mut stats = Stats::new(&self.config);
        self.root.collect_stats(&mut stats, 0);
        stats
    }

    /// Check fill factors, bound tightness, balance and the entry count.
    pub fn validate(&self) -> Result<(), RTreeError> {
        let mut leaf_depth = None;
        let mut entries = 0;
        self.root.validate(
            &self.config,
            &|e: &T| self.builder.bbox(e),
            0,
            &mut leaf_depth,
            &mut entries,
        )?;
        if entries != self.len {
            return Err(RTreeError::Invariant(format!(
                "tree reports {} entries but holds {entries}",
                self.len
            )));
        }
        Ok(())
    }

    /// Counting view for measuring query cost.
    pub fn instrument(&self) -> Instrumented<'_, T, B> {
        Instrumented::new(self)
    }

    /// Move the tree behind a read/write lock.
    pub fn into_concurrent(self) -> ConcurrentRTree<Self> {
        ConcurrentRTree::new(self)
    }

    pub(crate) fn root(&self) -> &Node<T, B::Rect> {
        &self.root
    }
}

impl<T: Clone, B: RectBuilder<T>> RTree<T, B> {
    /// Copy entries whose rect lies inside `rect` into `out`, stopping when
    /// it is full. Returns how many were written.
    pub fn search(&self, rect: &B::Rect, out: &mut [T]) -> usize {
        let mut n = 0;
        let _ = self.root.search(rect, &mut fill(out, &mut n), &mut ());
        n
    }

    /// Append entries whose rect lies inside `rect`. Returns how many were
    /// appended.
    pub fn search_into(&self, rect: &B::Rect, out: &mut Vec<T>) -> usize {
        let before = out.len();
        self.search_with(rect, |e| out.push(e.clone()));
        out.len() - before
    }

    /// Copy entries whose rect intersects `rect` into `out`, stopping when it
    /// is full. Returns how many were written.
    pub fn intersects(&self, rect: &B::Rect, out: &mut [T]) -> usize {
        let mut n = 0;
        let _ = self.root.intersects(rect, &mut fill(out, &mut n), &mut ());
        n
    }

    /// Append entries whose rect intersects `rect`. Returns how many were
    /// appended.
    pub fn intersects_into(&self, rect: &B::Rect, out: &mut Vec<T>) -> usize {
        let before = out.len();
        self.intersects_with(rect, |e| out.push(e.clone()));
        out.len() - before
    }
}

impl<T: PartialEq, B: RectBuilder<T>> RTree<T, B> {
    /// Remove one entry equal to `entry`. Returns whether one was found.
    ///
    /// Nodes left underfull are dissolved and their entries inserted again.
    pub fn remove(&mut self, entry: &T) -> bool {
        let rect = self.builder.bbox(entry);
        let mut orphans = Vec::new();
        let sibling = match self.root.remove(entry, &rect, &self.config, &mut orphans) {
            Removal::NotFound => return false,
            Removal::Removed { sibling } => sibling,
        };
        self.len -= 1;
        if let Some(sibling) = sibling {
            self.grow(sibling);
        }
        self.shrink();
        if !orphans.is_empty() {
            trace!(count = orphans.len(), "re-inserting at the root");
        }
        while let Some((rect, entry)) = orphans.pop() {
            self.insert(rect, entry);
        }
        true
    }

    /// Replace `old` with `new`: a [`remove`](Self::remove) followed by an
    /// [`add`](Self::add). `new` is inserted even when `old` is absent.
    /// Returns whether `old` was found.
    pub fn update(&mut self, old: &T, new: T) -> bool {
        let found = self.remove(old);
        self.add(new);
        found
    }

    /// Whether an entry equal to `entry` is stored.
    pub fn contains(&self, entry: &T) -> bool {
        let rect = self.builder.bbox(entry);
        self.root.contains(&rect, entry, &mut ())
    }
}

/// Adapts a plain visitor to the early-exit form used by traversals.
fn each<T>(visit: &mut impl FnMut(&T)) -> impl FnMut(&T) -> ControlFlow<()> {
    move |e| {
        visit(e);
        ControlFlow::Continue(())
    }
}

/// Visitor writing clones into `out`, counting in `n`, and stopping once
/// `out` is full.
pub(crate) fn fill<'o, T: Clone>(
    out: &'o mut [T],
    n: &'o mut usize,
) -> impl FnMut(&T) -> ControlFlow<()> + 'o {
    move |e| {
        let Some(slot) = out.get_mut(*n) else {
            return ControlFlow::Break(());
        };
        slot.clone_from(e);
        *n += 1;
        if *n < out.len() {
            ControlFlow::Continue(())
        } else {
            ControlFlow::Break(())
        }
    }
}
