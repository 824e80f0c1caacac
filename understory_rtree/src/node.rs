// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree nodes: leaves hold entries, branches hold child nodes.
//!
//! Both variants keep an index-aligned array of rectangles next to their items
//! and a cached bound equal to the MBR of those rectangles.
//!
//! Mutations that overflow a node replace it with the left half of a split
//! and hand the right half back to the caller, which adopts it as a sibling.
//! Splits therefore propagate one level at a time and all leaves stay at the
//! same depth.

use core::mem;
use core::ops::ControlFlow;

use tracing::{debug, trace};

use crate::config::RTreeConfig;
use crate::error::RTreeError;
use crate::geometry::{HyperRect, enlarge_cost, mbr_of, widen};
use crate::instrument::Probe;
use crate::split::partition;
use crate::stats::Stats;

pub(crate) enum Node<T, R> {
    Leaf(Leaf<T, R>),
    Branch(Branch<T, R>),
}

pub(crate) struct Leaf<T, R> {
    entries: Vec<T>,
    rects: Vec<R>,
    bound: Option<R>,
}

pub(crate) struct Branch<T, R> {
    children: Vec<Node<T, R>>,
    rects: Vec<R>,
    bound: Option<R>,
}

/// Outcome of a removal below some node.
pub(crate) enum Removal<T, R> {
    NotFound,
    /// The entry is gone. Re-inserting orphans may have split the node; the
    /// right half must be adopted by the caller.
    Removed { sibling: Option<Node<T, R>> },
}

/// Entry and rect pairs evicted from underfull nodes, awaiting re-insertion.
pub(crate) type Orphans<T, R> = Vec<(R, T)>;

impl<T, R> Default for Leaf<T, R> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            rects: Vec::new(),
            bound: None,
        }
    }
}

impl<T, R> Node<T, R> {
    pub(crate) fn empty() -> Self {
        Self::Leaf(Leaf::default())
    }

    pub(crate) fn bound(&self) -> Option<&R> {
        match self {
            Self::Leaf(l) => l.bound.as_ref(),
            Self::Branch(b) => b.bound.as_ref(),
        }
    }

    /// Number of entries (leaf) or children (branch).
    pub(crate) fn len(&self) -> usize {
        match self {
            Self::Leaf(l) => l.entries.len(),
            Self::Branch(b) => b.children.len(),
        }
    }

    pub(crate) fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }

    /// Levels from this node down to its leaves, counting both ends.
    pub(crate) fn height(&self) -> usize {
        let mut height = 1;
        let mut node = self;
        while let Self::Branch(b) = node {
            let Some(first) = b.children.first() else {
                break;
            };
            height += 1;
            node = first;
        }
        height
    }

    pub(crate) fn for_each(&self, visit: &mut impl FnMut(&T)) {
        match self {
            Self::Leaf(l) => l.entries.iter().for_each(visit),
            Self::Branch(b) => {
                for c in &b.children {
                    c.for_each(visit);
                }
            }
        }
    }

    pub(crate) fn collect_stats(&self, stats: &mut Stats, depth: usize) {
        match self {
            Self::Leaf(l) => {
                stats.count_leaf_at_depth(depth);
                stats.count_entries_at_depth(l.entries.len(), depth);
            }
            Self::Branch(b) => {
                stats.count_branch_at_depth(depth);
                for c in &b.children {
                    c.collect_stats(stats, depth + 1);
                }
            }
        }
    }

    /// Move every entry of this subtree into `orphans`.
    fn drain_into(self, orphans: &mut Orphans<T, R>) {
        match self {
            Self::Leaf(l) => orphans.extend(l.rects.into_iter().zip(l.entries)),
            Self::Branch(b) => {
                for c in b.children {
                    c.drain_into(orphans);
                }
            }
        }
    }

    /// Replacement for a root branch holding at most one child: the child
    /// itself, or an empty leaf. Any other node is returned unchanged.
    pub(crate) fn collapse(self) -> Self {
        match self {
            Self::Branch(mut b) if b.children.len() <= 1 => {
                b.children.pop().unwrap_or_else(Self::empty)
            }
            other => other,
        }
    }
}

impl<T, R: HyperRect> Node<T, R> {
    /// Root built over the two halves of a root split.
    pub(crate) fn grown(left: Self, right: Self) -> Self {
        let mut b = Branch {
            children: Vec::with_capacity(2),
            rects: Vec::with_capacity(2),
            bound: None,
        };
        b.push(left);
        b.push(right);
        Self::Branch(b)
    }

    /// Insert `entry`, bounded by `rect`, into this subtree.
    ///
    /// On overflow `self` becomes the left half of the split and the right
    /// half is returned.
    pub(crate) fn add(&mut self, entry: T, rect: R, config: &RTreeConfig) -> Option<Self> {
        match self {
            Self::Leaf(l) => l.add(entry, rect, config).map(Self::Leaf),
            Self::Branch(b) => b.add(entry, rect, config).map(Self::Branch),
        }
    }

    /// Visit entries whose rect is contained by `rect`.
    pub(crate) fn search<F, P>(&self, rect: &R, visit: &mut F, probe: &mut P) -> ControlFlow<()>
    where
        F: FnMut(&T) -> ControlFlow<()>,
        P: Probe,
    {
        probe.enter(self.len());
        match self {
            Self::Leaf(l) => {
                for (e, r) in l.entries.iter().zip(&l.rects) {
                    if rect.contains(r) {
                        visit(e)?;
                    }
                }
            }
            Self::Branch(b) => {
                // A child only partly inside the query can still hold contained entries.
                for (c, r) in b.children.iter().zip(&b.rects) {
                    if rect.intersects(r) {
                        c.search(rect, visit, probe)?;
                    }
                }
            }
        }
        ControlFlow::Continue(())
    }

    /// Visit entries whose rect intersects `rect`.
    pub(crate) fn intersects<F, P>(&self, rect: &R, visit: &mut F, probe: &mut P) -> ControlFlow<()>
    where
        F: FnMut(&T) -> ControlFlow<()>,
        P: Probe,
    {
        probe.enter(self.len());
        match self {
            Self::Leaf(l) => {
                for (e, r) in l.entries.iter().zip(&l.rects) {
                    if rect.intersects(r) {
                        visit(e)?;
                    }
                }
            }
            Self::Branch(b) => {
                for (c, r) in b.children.iter().zip(&b.rects) {
                    if rect.intersects(r) {
                        c.intersects(rect, visit, probe)?;
                    }
                }
            }
        }
        ControlFlow::Continue(())
    }

    /// Check every structural invariant below this node.
    ///
    /// `bbox` recomputes an entry's rect. Leaf depths are collected into
    /// `leaf_depth` so the caller can detect imbalance across subtrees.
    pub(crate) fn validate(
        &self,
        config: &RTreeConfig,
        bbox: &impl Fn(&T) -> R,
        depth: usize,
        leaf_depth: &mut Option<usize>,
        entries: &mut usize,
    ) -> Result<(), RTreeError> {
        let len = self.len();
        if depth > 0 && !(config.min_fill..=config.max_fill).contains(&len) {
            return Err(invariant(format!(
                "node at depth {depth} holds {len} items, outside {}..={}",
                config.min_fill, config.max_fill
            )));
        }
        if len > config.max_fill {
            return Err(invariant(format!("root holds {len} items")));
        }
        match self {
            Self::Leaf(l) => {
                if l.rects.len() != l.entries.len() {
                    return Err(invariant("leaf arrays out of step".into()));
                }
                if l.entries.iter().zip(&l.rects).any(|(e, r)| bbox(e) != *r) {
                    return Err(invariant(format!("stale entry rect at depth {depth}")));
                }
                if l.bound != mbr_of(&l.rects) {
                    return Err(invariant(format!("stale leaf bound at depth {depth}")));
                }
                match *leaf_depth {
                    Some(d) if d != depth => {
                        return Err(invariant(format!(
                            "leaves at depths {d} and {depth}"
                        )));
                    }
                    _ => *leaf_depth = Some(depth),
                }
                *entries += len;
            }
            Self::Branch(b) => {
                if depth == 0 && len < 2 {
                    return Err(invariant(format!("root branch holds {len} children")));
                }
                if b.rects.len() != b.children.len() {
                    return Err(invariant("branch arrays out of step".into()));
                }
                if b.children.iter().zip(&b.rects).any(|(c, r)| c.bound() != Some(r)) {
                    return Err(invariant(format!("stale child rect at depth {depth}")));
                }
                if b.bound != mbr_of(&b.rects) {
                    return Err(invariant(format!("stale branch bound at depth {depth}")));
                }
                for c in &b.children {
                    c.validate(config, bbox, depth + 1, leaf_depth, entries)?;
                }
            }
        }
        Ok(())
    }
}

fn invariant(msg: String) -> RTreeError {
    RTreeError::Invariant(msg)
}

impl<T: PartialEq, R: HyperRect> Node<T, R> {
    /// Whether `entry`, bounded by `rect`, is stored below this node.
    ///
    /// Only children whose rect covers `rect` are entered.
    pub(crate) fn contains(&self, rect: &R, entry: &T, probe: &mut impl Probe) -> bool {
        probe.enter(self.len());
        match self {
            Self::Leaf(l) => l.entries.iter().any(|e| e == entry),
            Self::Branch(b) => b
                .children
                .iter()
                .zip(&b.rects)
                .any(|(c, r)| r.contains(rect) && c.contains(rect, entry, probe)),
        }
    }

    /// Remove one occurrence of `entry`, bounded by `rect`.
    ///
    /// Entries of underfull children end up in `orphans`; the node re-inserts
    /// as many of them as it can hold and leaves the rest to its caller.
    pub(crate) fn remove(
        &mut self,
        entry: &T,
        rect: &R,
        config: &RTreeConfig,
        orphans: &mut Orphans<T, R>,
    ) -> Removal<T, R> {
        match self {
            Self::Leaf(l) => {
                if l.remove(entry) {
                    Removal::Removed { sibling: None }
                } else {
                    Removal::NotFound
                }
            }
            Self::Branch(b) => b.remove(entry, rect, config, orphans),
        }
    }
}

impl<T, R: HyperRect> Leaf<T, R> {
    fn from_items(items: Vec<(R, T)>) -> Self {
        let (rects, entries): (Vec<R>, Vec<T>) = items.into_iter().unzip();
        let bound = mbr_of(&rects);
        Self {
            entries,
            rects,
            bound,
        }
    }

    fn add(&mut self, entry: T, rect: R, config: &RTreeConfig) -> Option<Self> {
        if self.entries.len() < config.max_fill {
            self.bound = Some(widen(self.bound.take(), &rect));
            self.entries.push(entry);
            self.rects.push(rect);
            return None;
        }

        let items: Vec<(R, T)> = mem::take(&mut self.rects)
            .into_iter()
            .zip(mem::take(&mut self.entries))
            .collect();
        let (left, right) = partition(config.split, items, (rect, entry), config.min_fill);
        debug!(
            split = ?config.split,
            left = left.len(),
            right = right.len(),
            "split leaf"
        );
        *self = Self::from_items(left);
        Some(Self::from_items(right))
    }
}

impl<T: PartialEq, R: HyperRect> Leaf<T, R> {
    fn remove(&mut self, entry: &T) -> bool {
        let Some(i) = self.entries.iter().position(|e| e == entry) else {
            return false;
        };
        self.entries.remove(i);
        self.rects.remove(i);
        self.bound = mbr_of(&self.rects);
        true
    }
}

impl<T, R: HyperRect> Branch<T, R> {
    fn from_items(items: Vec<(R, Node<T, R>)>) -> Self {
        let (rects, children): (Vec<R>, Vec<Node<T, R>>) = items.into_iter().unzip();
        let bound = mbr_of(&rects);
        Self {
            children,
            rects,
            bound,
        }
    }

    /// Append a non-empty child.
    fn push(&mut self, child: Node<T, R>) {
        debug_assert!(child.bound().is_some(), "adopting an empty child");
        if let Some(r) = child.bound().cloned() {
            self.bound = Some(widen(self.bound.take(), &r));
            self.rects.push(r);
            self.children.push(child);
        }
    }

    /// Child whose rect grows least when covering `rect`. Ties go to the
    /// smaller resulting perimeter, then to the lower index.
    fn choose_child(&self, rect: &R) -> usize {
        let mut best = 0;
        let mut best_cost = None;
        for (i, r) in self.rects.iter().enumerate() {
            let cost = enlarge_cost(r, rect);
            let perimeter = r.mbr(rect).perimeter();
            let better = match &best_cost {
                None => true,
                Some((c, p)) => cost < *c || (cost == *c && perimeter < *p),
            };
            if better {
                best = i;
                best_cost = Some((cost, perimeter));
            }
        }
        best
    }

    fn refresh(&mut self, i: usize) {
        if let Some(r) = self.children[i].bound() {
            self.rects[i] = r.clone();
        }
    }

    fn add(&mut self, entry: T, rect: R, config: &RTreeConfig) -> Option<Self> {
        debug_assert!(!self.children.is_empty(), "insert into an empty branch");
        let i = self.choose_child(&rect);
        let sibling = self.children[i].add(entry, rect, config);
        self.refresh(i);
        self.bound = Some(widen(self.bound.take(), &self.rects[i]));
        match sibling {
            Some(s) => self.adopt(s, config),
            None => None,
        }
    }

    /// Take in the right half of a child's split, splitting `self` if full.
    fn adopt(&mut self, sibling: Node<T, R>, config: &RTreeConfig) -> Option<Self> {
        if self.children.len() < config.max_fill {
            self.push(sibling);
            return None;
        }

        let Some(rect) = sibling.bound().cloned() else {
            return None;
        };
        let items: Vec<(R, Node<T, R>)> = mem::take(&mut self.rects)
            .into_iter()
            .zip(mem::take(&mut self.children))
            .collect();
        let (left, right) = partition(config.split, items, (rect, sibling), config.min_fill);
        debug!(
            split = ?config.split,
            left = left.len(),
            right = right.len(),
            "split branch"
        );
        *self = Self::from_items(left);
        Some(Self::from_items(right))
    }

    /// Re-insert orphans until none are left or `self` splits.
    fn reinsert(&mut self, orphans: &mut Orphans<T, R>, config: &RTreeConfig) -> Option<Self> {
        if !orphans.is_empty() {
            trace!(count = orphans.len(), "re-inserting orphaned entries");
        }
        while !self.children.is_empty() {
            let (rect, entry) = orphans.pop()?;
            if let Some(s) = self.add(entry, rect, config) {
                return Some(s);
            }
        }
        None
    }
}

impl<T: PartialEq, R: HyperRect> Branch<T, R> {
    fn remove(
        &mut self,
        entry: &T,
        rect: &R,
        config: &RTreeConfig,
        orphans: &mut Orphans<T, R>,
    ) -> Removal<T, R> {
        for i in 0..self.children.len() {
            if !self.rects[i].contains(rect) {
                continue;
            }
            let sibling = match self.children[i].remove(entry, rect, config, orphans) {
                Removal::NotFound => continue,
                Removal::Removed { sibling } => sibling,
            };

            let mut spill = None;
            match sibling {
                Some(s) => {
                    self.refresh(i);
                    self.bound = mbr_of(&self.rects);
                    spill = self.adopt(s, config);
                }
                None if self.children[i].len() < config.min_fill => {
                    self.rects.remove(i);
                    let child = self.children.remove(i);
                    child.drain_into(orphans);
                    self.bound = mbr_of(&self.rects);
                }
                None => {
                    self.refresh(i);
                    self.bound = mbr_of(&self.rects);
                }
            }
            if spill.is_none() {
                spill = self.reinsert(orphans, config);
            }
            return Removal::Removed {
                sibling: spill.map(Node::Branch),
            };
        }
        Removal::NotFound
    }
}
