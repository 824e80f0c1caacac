// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Const-generic points and rectangles implementing the geometry contract.
//!
//! `Point<S, N>` and `Rect<S, N>` work for any [`Scalar`] and any fixed
//! dimensionality. [`PointBuilder`] indexes points directly and
//! [`RectIdentity`] indexes rectangles as their own bounds.

use core::array;

use crate::error::RTreeError;
use crate::geometry::{
    HyperPoint, HyperRect, Metric, RectBuilder, Scalar, le, max_t, min_t,
};

/// A point with `N` coordinates.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Point<S, const N: usize> {
    coords: [S; N],
}

impl<S: Scalar, const N: usize> Point<S, N> {
    /// Create a point from its coordinates.
    pub const fn new(coords: [S; N]) -> Self {
        Self { coords }
    }

    /// All coordinates.
    pub const fn coords(&self) -> &[S; N] {
        &self.coords
    }
}

impl<S: Scalar, const N: usize> HyperPoint for Point<S, N> {
    type Scalar = S;

    fn ndim(&self) -> usize {
        N
    }

    fn coord(&self, d: usize) -> Result<S, RTreeError> {
        self.coords
            .get(d)
            .copied()
            .ok_or(RTreeError::InvalidDimension {
                dimension: d,
                ndim: N,
            })
    }

    fn distance(&self, other: &Self) -> f64 {
        self.coords
            .iter()
            .zip(&other.coords)
            .map(|(a, b)| {
                let d = S::to_f64(*b) - S::to_f64(*a);
                d * d
            })
            .sum::<f64>()
            .sqrt()
    }

    fn distance_in(&self, other: &Self, d: usize) -> Result<f64, RTreeError> {
        RTreeError::check_dimension(d, N)?;
        Ok((S::to_f64(other.coords[d]) - S::to_f64(self.coords[d])).abs())
    }
}

/// An axis-aligned rectangle in `N` dimensions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Rect<S, const N: usize> {
    min: Point<S, N>,
    max: Point<S, N>,
}

impl<S: Scalar, const N: usize> Rect<S, N> {
    /// Rectangle spanned by two corners given in any order.
    pub fn new(p1: Point<S, N>, p2: Point<S, N>) -> Self {
        Self {
            min: Point::new(array::from_fn(|d| min_t(p1.coords[d], p2.coords[d]))),
            max: Point::new(array::from_fn(|d| max_t(p1.coords[d], p2.coords[d]))),
        }
    }

    /// Rectangle spanned by two corner coordinate arrays given in any order.
    pub fn from_corners(a: [S; N], b: [S; N]) -> Self {
        Self::new(Point::new(a), Point::new(b))
    }

    /// Degenerate rectangle covering a single point.
    pub const fn from_point(p: Point<S, N>) -> Self {
        Self { min: p, max: p }
    }
}

impl<S: Scalar, const N: usize> HyperRect for Rect<S, N> {
    type Point = Point<S, N>;

    fn ndim(&self) -> usize {
        N
    }

    fn min(&self) -> Point<S, N> {
        self.min
    }

    fn max(&self) -> Point<S, N> {
        self.max
    }

    fn centroid(&self) -> Point<S, N> {
        Point::new(array::from_fn(|d| {
            S::mid(self.min.coords[d], self.max.coords[d])
        }))
    }

    fn range(&self, d: usize) -> Result<S, RTreeError> {
        RTreeError::check_dimension(d, N)?;
        Ok(S::max_zero(S::sub(self.max.coords[d], self.min.coords[d])))
    }

    fn mbr(&self, other: &Self) -> Self {
        Self {
            min: Point::new(array::from_fn(|d| {
                min_t(self.min.coords[d], other.min.coords[d])
            })),
            max: Point::new(array::from_fn(|d| {
                max_t(self.max.coords[d], other.max.coords[d])
            })),
        }
    }

    fn contains(&self, other: &Self) -> bool {
        (0..N).all(|d| {
            le(self.min.coords[d], other.min.coords[d])
                && le(other.max.coords[d], self.max.coords[d])
        })
    }

    fn intersects(&self, other: &Self) -> bool {
        (0..N).all(|d| {
            le(self.min.coords[d], other.max.coords[d])
                && le(other.min.coords[d], self.max.coords[d])
        })
    }

    fn cost(&self) -> Metric<Self> {
        (0..N).fold(S::acc_from_usize(1), |acc, d| {
            acc * S::widen(S::max_zero(S::sub(self.max.coords[d], self.min.coords[d])))
        })
    }

    fn perimeter(&self) -> Metric<Self> {
        let two = S::acc_from_usize(2);
        (0..N).fold(S::acc_from_usize(0), |acc, d| {
            acc + two * S::widen(S::max_zero(S::sub(self.max.coords[d], self.min.coords[d])))
        })
    }
}

/// 2D point with `f64` coordinates.
pub type Point2d = Point<f64, 2>;

/// 2D rectangle with `f64` coordinates.
pub type Rect2d = Rect<f64, 2>;

/// 3D point with `f64` coordinates.
pub type Point3d = Point<f64, 3>;

/// 3D rectangle with `f64` coordinates.
pub type Rect3d = Rect<f64, 3>;

/// Indexes points: each entry is bounded by a degenerate rectangle.
#[derive(Copy, Clone, Debug, Default)]
pub struct PointBuilder;

impl<S: Scalar, const N: usize> RectBuilder<Point<S, N>> for PointBuilder {
    type Rect = Rect<S, N>;

    fn bbox(&self, entry: &Point<S, N>) -> Rect<S, N> {
        Rect::from_point(*entry)
    }

    fn mbr(&self, p1: &Point<S, N>, p2: &Point<S, N>) -> Rect<S, N> {
        Rect::new(*p1, *p2)
    }
}

/// Indexes rectangles as their own bounds.
#[derive(Copy, Clone, Debug, Default)]
pub struct RectIdentity;

impl<S: Scalar, const N: usize> RectBuilder<Rect<S, N>> for RectIdentity {
    type Rect = Rect<S, N>;

    fn bbox(&self, entry: &Rect<S, N>) -> Rect<S, N> {
        *entry
    }

    fn mbr(&self, p1: &Point<S, N>, p2: &Point<S, N>) -> Rect<S, N> {
        Rect::new(*p1, *p2)
    }
}
