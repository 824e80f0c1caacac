// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Split strategies for overflowing nodes.
//!
//! A node that already holds `max_fill` items and receives one more is
//! partitioned into two groups, each holding at least `min_fill` items. The
//! same routine serves leaves (items are entries) and branches (items are
//! child nodes): it only sees `(rect, item)` pairs.
//!
//! - [`SplitKind::Axial`] sorts the existing items by centroid along the
//!   dimension of greatest extent and cuts the sorted run in half. `O(k log k)`.
//! - [`SplitKind::Quadratic`] seeds both groups with the pair that would waste
//!   the most area if kept together, then assigns the rest greedily. `O(k²)`,
//!   generally tighter groups.
//!
//! In both cases the incoming item is placed last.

use core::cmp::Ordering;

use crate::geometry::{Coord, HyperPoint, HyperRect, Metric, Scalar, enlarge_cost, widen};

/// Split strategy selector.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum SplitKind {
    /// Split along the dimension with the greatest range.
    #[default]
    Axial,
    /// Seed with the most wasteful pair, then assign greedily.
    Quadratic,
}

/// One side of a split under construction.
struct Group<R, X> {
    items: Vec<(R, X)>,
    bound: Option<R>,
}

impl<R: HyperRect, X> Group<R, X> {
    fn new(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            bound: None,
        }
    }

    fn from_items(items: Vec<(R, X)>) -> Self {
        let bound = crate::geometry::mbr_of(items.iter().map(|(r, _)| r));
        Self { items, bound }
    }

    fn push(&mut self, item: (R, X)) {
        self.bound = Some(widen(self.bound.take(), &item.0));
        self.items.push(item);
    }

    fn growth(&self, rect: &R) -> Metric<R> {
        match &self.bound {
            Some(b) => enlarge_cost(b, rect),
            None => rect.cost(),
        }
    }

    fn len(&self) -> usize {
        self.items.len()
    }
}

/// Partition `items` plus `incoming` into two groups of at least `min_fill`.
///
/// `items` holds the node's current contents (at least two of them);
/// `incoming` is the item that caused the overflow.
pub(crate) fn partition<R: HyperRect, X>(
    kind: SplitKind,
    items: Vec<(R, X)>,
    incoming: (R, X),
    min_fill: usize,
) -> (Vec<(R, X)>, Vec<(R, X)>) {
    debug_assert!(items.len() >= 2, "split needs at least two existing items");
    let total = items.len() + 1;
    let (mut g1, mut g2) = match kind {
        SplitKind::Axial => axial(items),
        SplitKind::Quadratic => quadratic(items, min_fill),
    };
    classify(&mut g1, &mut g2, incoming, 1, min_fill);
    debug_assert_eq!(g1.len() + g2.len(), total, "split lost items");
    debug_assert!(
        g1.len() >= min_fill && g2.len() >= min_fill,
        "split left a group under min_fill"
    );
    (g1.items, g2.items)
}

/// Dimension in which `bound` is widest. Ties go to the lowest dimension.
fn widest_axis<R: HyperRect>(bound: &R) -> usize {
    let mut axis = 0;
    let mut widest: Option<Coord<R>> = None;
    for d in 0..bound.ndim() {
        let Ok(range) = bound.range(d) else {
            continue;
        };
        if widest.is_none_or(|w| range > w) {
            axis = d;
            widest = Some(range);
        }
    }
    axis
}

fn axial<R: HyperRect, X>(items: Vec<(R, X)>) -> (Group<R, X>, Group<R, X>) {
    let Some(bound) = crate::geometry::mbr_of(items.iter().map(|(r, _)| r)) else {
        return (Group::new(0), Group::new(0));
    };
    let axis = widest_axis(&bound);

    let mut keyed: Vec<(Option<Coord<R>>, (R, X))> = items
        .into_iter()
        .map(|item| (item.0.centroid().coord(axis).ok(), item))
        .collect();
    // Stable: equal centroids keep their insertion order.
    keyed.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));

    let mut lower: Vec<(R, X)> = keyed.into_iter().map(|(_, item)| item).collect();
    let upper = lower.split_off(lower.len() / 2);
    (Group::from_items(lower), Group::from_items(upper))
}

fn quadratic<R: HyperRect, X>(items: Vec<(R, X)>, min_fill: usize) -> (Group<R, X>, Group<R, X>) {
    let n = items.len();
    let (mut s1, mut s2) = (0, n - 1);
    let mut worst = <Coord<R> as Scalar>::acc_from_usize(0);
    for i in 0..n {
        for j in (i + 1)..n {
            let (ri, rj) = (&items[i].0, &items[j].0);
            let waste = ri.mbr(rj).cost() - ri.cost() - rj.cost();
            if waste > worst {
                worst = waste;
                s1 = i;
                s2 = j;
            }
        }
    }

    let mut slots: Vec<Option<(R, X)>> = items.into_iter().map(Some).collect();
    let mut g1 = Group::new(n);
    let mut g2 = Group::new(n);
    if let Some(seed) = slots[s1].take() {
        g1.push(seed);
    }
    if let Some(seed) = slots[s2].take() {
        g2.push(seed);
    }

    // The incoming item is still to come, hence the `+ 1`.
    let mut pending = n - 2 + 1;
    for item in slots.into_iter().flatten() {
        classify(&mut g1, &mut g2, item, pending, min_fill);
        pending -= 1;
    }
    (g1, g2)
}

/// Place `item` in the group whose bound grows least; ties go to `g1`.
///
/// `pending` counts the items still to be placed, this one included. When a
/// group needs every one of them to reach `min_fill`, it gets them.
fn classify<R: HyperRect, X>(
    g1: &mut Group<R, X>,
    g2: &mut Group<R, X>,
    item: (R, X),
    pending: usize,
    min_fill: usize,
) {
    if g1.len() + pending <= min_fill {
        g1.push(item);
    } else if g2.len() + pending <= min_fill {
        g2.push(item);
    } else if g2.growth(&item.0) < g1.growth(&item.0) {
        g2.push(item);
    } else {
        g1.push(item);
    }
}
