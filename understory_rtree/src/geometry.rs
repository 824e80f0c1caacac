// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The geometry contract consumed by the tree.
//!
//! The tree never looks at coordinates directly. It only asks rectangles for
//! their cost, perimeter, per-dimension range and centroid, and combines them
//! with [`HyperRect::mbr`]. Any point/rectangle pair implementing these traits
//! can be indexed, in any number of dimensions.
//!
//! A ready-made const-generic implementation lives in [`crate::shapes`].

use core::cmp::Ordering;
use core::fmt::Debug;

use crate::error::RTreeError;

/// Numeric coordinate abstraction.
///
/// Cost and perimeter metrics are computed in a widened accumulator type
/// (`f32`→`f64`, `f64`→`f64`, `i64`→`i128`) so comparisons between candidate
/// splits stay robust.
pub trait Scalar: Copy + PartialOrd + Debug {
    /// Widened accumulator type suitable for area/cost computations.
    type Acc: Copy
        + PartialOrd
        + core::ops::Add<Output = Self::Acc>
        + core::ops::Sub<Output = Self::Acc>
        + core::ops::Mul<Output = Self::Acc>
        + Debug;

    /// Subtract two scalar values: a - b.
    fn sub(a: Self, b: Self) -> Self;

    /// Max of the scalar value and zero.
    fn max_zero(v: Self) -> Self;

    /// Midpoint between a and b (used for centroids).
    fn mid(a: Self, b: Self) -> Self;

    /// Convert a scalar to the accumulator type.
    fn widen(v: Self) -> Self::Acc;

    /// Convert a `usize` to the accumulator type.
    fn acc_from_usize(n: usize) -> Self::Acc;

    /// Lossy conversion used for Euclidean distances.
    fn to_f64(v: Self) -> f64;
}

impl Scalar for f32 {
    type Acc = f64;

    #[inline]
    fn sub(a: Self, b: Self) -> Self {
        a - b
    }

    #[inline]
    fn max_zero(v: Self) -> Self {
        v.max(0.0)
    }

    #[inline]
    fn mid(a: Self, b: Self) -> Self {
        0.5 * (a + b)
    }

    #[inline]
    fn widen(v: Self) -> Self::Acc {
        v as f64
    }

    #[inline]
    fn acc_from_usize(n: usize) -> Self::Acc {
        n as f64
    }

    #[inline]
    fn to_f64(v: Self) -> f64 {
        v as f64
    }
}

impl Scalar for f64 {
    type Acc = Self;

    #[inline]
    fn sub(a: Self, b: Self) -> Self {
        a - b
    }

    #[inline]
    fn max_zero(v: Self) -> Self {
        v.max(0.0)
    }

    #[inline]
    fn mid(a: Self, b: Self) -> Self {
        0.5 * (a + b)
    }

    #[inline]
    fn widen(v: Self) -> Self::Acc {
        v
    }

    #[inline]
    fn acc_from_usize(n: usize) -> Self::Acc {
        n as Self::Acc
    }

    #[inline]
    fn to_f64(v: Self) -> f64 {
        v
    }
}

impl Scalar for i64 {
    type Acc = i128;

    #[inline]
    fn sub(a: Self, b: Self) -> Self {
        a.saturating_sub(b)
    }

    #[inline]
    fn max_zero(v: Self) -> Self {
        v.max(0)
    }

    #[inline]
    fn mid(a: Self, b: Self) -> Self {
        // Average without overflow: (a & b) + ((a ^ b) >> 1)
        (a & b) + ((a ^ b) >> 1)
    }

    #[inline]
    fn widen(v: Self) -> Self::Acc {
        v as i128
    }

    #[inline]
    fn acc_from_usize(n: usize) -> Self::Acc {
        n as i128
    }

    #[inline]
    fn to_f64(v: Self) -> f64 {
        v as f64
    }
}

/// Helper alias for the widened accumulator type associated with a scalar `S`.
pub type ScalarAcc<S> = <S as Scalar>::Acc;

/// Coordinate type of a rectangle.
pub type Coord<R> = <<R as HyperRect>::Point as HyperPoint>::Scalar;

/// Metric (cost/perimeter) type of a rectangle.
pub type Metric<R> = ScalarAcc<Coord<R>>;

/// An immutable n-dimensional point.
pub trait HyperPoint: Clone + Debug {
    /// Coordinate type.
    type Scalar: Scalar;

    /// Number of dimensions represented by this point.
    fn ndim(&self) -> usize;

    /// Coordinate in dimension `d`.
    ///
    /// Fails with [`RTreeError::InvalidDimension`] when `d >= ndim()`.
    fn coord(&self, d: usize) -> Result<Self::Scalar, RTreeError>;

    /// Euclidean distance to `other` across all dimensions.
    fn distance(&self, other: &Self) -> f64;

    /// Absolute distance to `other` in dimension `d`.
    ///
    /// Fails with [`RTreeError::InvalidDimension`] when `d >= ndim()`.
    fn distance_in(&self, other: &Self, d: usize) -> Result<f64, RTreeError>;
}

/// An n-dimensional axis-aligned minimum bounding rectangle (MBR).
///
/// Rectangles are values: [`HyperRect::mbr`] returns a new rectangle and
/// never mutates either input.
pub trait HyperRect: Clone + PartialEq + Debug {
    /// Corner point type.
    type Point: HyperPoint;

    /// Number of dimensions.
    fn ndim(&self) -> usize;

    /// Minimum corner.
    fn min(&self) -> Self::Point;

    /// Maximum corner.
    fn max(&self) -> Self::Point;

    /// Center point in all dimensions.
    fn centroid(&self) -> Self::Point;

    /// Extent `max[d] - min[d]`.
    ///
    /// Fails with [`RTreeError::InvalidDimension`] when `d >= ndim()`.
    fn range(&self, d: usize) -> Result<Coord<Self>, RTreeError>;

    /// MBR of `self` and `other`.
    fn mbr(&self, other: &Self) -> Self;

    /// Whether `other` lies entirely inside `self` (boundaries inclusive).
    fn contains(&self, other: &Self) -> bool;

    /// Whether `self` and `other` overlap on every axis (boundaries inclusive).
    fn intersects(&self, other: &Self) -> bool;

    /// Volumetric cost: the product of all ranges.
    fn cost(&self) -> Metric<Self>;

    /// Sum of `2 * range` over all dimensions.
    fn perimeter(&self) -> Metric<Self>;
}

/// Maps stored entries to their bounding rectangles.
///
/// The tree never builds a rectangle for an entry except through this trait.
pub trait RectBuilder<T> {
    /// Rectangle type produced for entries.
    type Rect: HyperRect;

    /// Bounding rectangle of `entry`.
    fn bbox(&self, entry: &T) -> Self::Rect;

    /// Rectangle spanned by two corner points, in any order.
    fn mbr(
        &self,
        p1: &<Self::Rect as HyperRect>::Point,
        p2: &<Self::Rect as HyperRect>::Point,
    ) -> Self::Rect;
}

/// MBR of a sequence of rectangles, `None` when empty.
pub(crate) fn mbr_of<'a, R: HyperRect + 'a>(rects: impl IntoIterator<Item = &'a R>) -> Option<R> {
    let mut it = rects.into_iter();
    let first = it.next()?.clone();
    Some(it.fold(first, |acc, r| acc.mbr(r)))
}

/// `bound ∪ rect`, where an absent bound is the empty set.
pub(crate) fn widen<R: HyperRect>(bound: Option<R>, rect: &R) -> R {
    match bound {
        Some(b) => b.mbr(rect),
        None => rect.clone(),
    }
}

/// Cost increase of `bound` when it has to cover `rect` too.
pub(crate) fn enlarge_cost<R: HyperRect>(bound: &R, rect: &R) -> Metric<R> {
    bound.mbr(rect).cost() - bound.cost()
}

pub(crate) fn min_t<T: PartialOrd + Copy>(a: T, b: T) -> T {
    match a.partial_cmp(&b) {
        Some(Ordering::Greater) => b,
        _ => a,
    }
}

pub(crate) fn max_t<T: PartialOrd + Copy>(a: T, b: T) -> T {
    match a.partial_cmp(&b) {
        Some(Ordering::Less) => b,
        _ => a,
    }
}

pub(crate) fn le<T: PartialOrd>(a: T, b: T) -> bool {
    a.partial_cmp(&b)
        .map(|o| o != Ordering::Greater)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Rect, Rect2d};

    #[test]
    fn i64_midpoint_does_not_overflow() {
        assert_eq!(<i64 as Scalar>::mid(i64::MAX, i64::MAX - 2), i64::MAX - 1);
        assert_eq!(<i64 as Scalar>::mid(-4, 4), 0);
    }

    #[test]
    fn mbr_of_folds_all_rects() {
        let rects = [
            Rect2d::from_corners([0.0, 0.0], [1.0, 1.0]),
            Rect2d::from_corners([5.0, -2.0], [6.0, 0.0]),
            Rect2d::from_corners([2.0, 3.0], [2.5, 3.5]),
        ];
        let b = mbr_of(&rects).unwrap();
        assert_eq!(b, Rect2d::from_corners([0.0, -2.0], [6.0, 3.5]));
        assert!(mbr_of::<Rect2d>(&[]).is_none());
    }

    #[test]
    fn enlarge_cost_is_zero_for_covered_rects() {
        let outer = Rect::<i64, 2>::from_corners([0, 0], [10, 10]);
        let inner = Rect::<i64, 2>::from_corners([2, 2], [3, 3]);
        let far = Rect::<i64, 2>::from_corners([10, 0], [20, 10]);
        assert_eq!(enlarge_cost(&outer, &inner), 0);
        assert_eq!(enlarge_cost(&outer, &far), 100);
    }

    #[test]
    fn widen_treats_none_as_empty() {
        let r = Rect2d::from_corners([1.0, 1.0], [2.0, 2.0]);
        assert_eq!(widen(None, &r), r);
        let w = widen(Some(Rect2d::from_corners([0.0, 0.0], [1.0, 1.0])), &r);
        assert_eq!(w, Rect2d::from_corners([0.0, 0.0], [2.0, 2.0]));
    }

    /// Fixed-point coordinate defined outside the crate's own impls.
    #[derive(Copy, Clone, Debug, PartialEq, PartialOrd)]
    struct Millis(i32);

    impl Scalar for Millis {
        type Acc = i64;

        fn sub(a: Self, b: Self) -> Self {
            Self(a.0.saturating_sub(b.0))
        }

        fn max_zero(v: Self) -> Self {
            Self(v.0.max(0))
        }

        fn mid(a: Self, b: Self) -> Self {
            Self((a.0 + b.0) / 2)
        }

        fn widen(v: Self) -> i64 {
            i64::from(v.0)
        }

        fn acc_from_usize(n: usize) -> i64 {
            i64::try_from(n).unwrap_or(i64::MAX)
        }

        fn to_f64(v: Self) -> f64 {
            f64::from(v.0) / 1000.0
        }
    }

    #[test]
    fn custom_scalar_indexes_like_a_builtin() {
        use crate::config::RTreeConfig;
        use crate::shapes::{Point, PointBuilder};
        use crate::split::SplitKind;
        use crate::tree::RTree;

        let config = RTreeConfig::new(2, 4, SplitKind::Quadratic).unwrap();
        let mut tree = RTree::with_config(PointBuilder, config);
        for x in 0..10 {
            for y in 0..10 {
                tree.add(Point::new([Millis(x * 500), Millis(y * 500)]));
            }
        }
        tree.validate().unwrap();
        let window = Rect::from_corners([Millis(0), Millis(0)], [Millis(1000), Millis(1000)]);
        let mut hits = Vec::new();
        assert_eq!(tree.search_into(&window, &mut hits), 9);
        assert_eq!(window.cost(), 1_000_000);

        let a = Point::new([Millis(0), Millis(0)]);
        let b = Point::new([Millis(3000), Millis(4000)]);
        assert_eq!(a.distance(&b), 5.0);
    }
}
