// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geometry contract for Kurbo's 2D types.
//!
//! With the `kurbo` feature enabled, [`kurbo::Point`] and [`kurbo::Rect`] can
//! be indexed directly through [`PointBuilder`] and [`RectIdentity`].
//! Rectangles are normalized on the way in, so a `Rect` with swapped corners
//! is stored as its [`abs`](kurbo::Rect::abs) form.

use kurbo::{Point, Rect};

use crate::error::RTreeError;
use crate::geometry::{HyperPoint, HyperRect, RectBuilder};
use crate::shapes::{PointBuilder, RectIdentity};

impl HyperPoint for Point {
    type Scalar = f64;

    fn ndim(&self) -> usize {
        2
    }

    fn coord(&self, d: usize) -> Result<f64, RTreeError> {
        match d {
            0 => Ok(self.x),
            1 => Ok(self.y),
            _ => Err(RTreeError::InvalidDimension {
                dimension: d,
                ndim: 2,
            }),
        }
    }

    fn distance(&self, other: &Self) -> f64 {
        Self::distance(*self, *other)
    }

    fn distance_in(&self, other: &Self, d: usize) -> Result<f64, RTreeError> {
        Ok((other.coord(d)? - self.coord(d)?).abs())
    }
}

impl HyperRect for Rect {
    type Point = Point;

    fn ndim(&self) -> usize {
        2
    }

    fn min(&self) -> Point {
        Point::new(self.min_x(), self.min_y())
    }

    fn max(&self) -> Point {
        Point::new(self.max_x(), self.max_y())
    }

    fn centroid(&self) -> Point {
        self.center()
    }

    fn range(&self, d: usize) -> Result<f64, RTreeError> {
        match d {
            0 => Ok(self.max_x() - self.min_x()),
            1 => Ok(self.max_y() - self.min_y()),
            _ => Err(RTreeError::InvalidDimension {
                dimension: d,
                ndim: 2,
            }),
        }
    }

    fn mbr(&self, other: &Self) -> Self {
        self.abs().union(other.abs())
    }

    fn contains(&self, other: &Self) -> bool {
        self.min_x() <= other.min_x()
            && other.max_x() <= self.max_x()
            && self.min_y() <= other.min_y()
            && other.max_y() <= self.max_y()
    }

    fn intersects(&self, other: &Self) -> bool {
        self.min_x() <= other.max_x()
            && other.min_x() <= self.max_x()
            && self.min_y() <= other.max_y()
            && other.min_y() <= self.max_y()
    }

    fn cost(&self) -> f64 {
        (self.max_x() - self.min_x()) * (self.max_y() - self.min_y())
    }

    fn perimeter(&self) -> f64 {
        2.0 * ((self.max_x() - self.min_x()) + (self.max_y() - self.min_y()))
    }
}

impl RectBuilder<Point> for PointBuilder {
    type Rect = Rect;

    fn bbox(&self, entry: &Point) -> Rect {
        Rect::from_points(*entry, *entry)
    }

    fn mbr(&self, p1: &Point, p2: &Point) -> Rect {
        Rect::from_points(*p1, *p2)
    }
}

impl RectBuilder<Rect> for RectIdentity {
    type Rect = Rect;

    fn bbox(&self, entry: &Rect) -> Rect {
        entry.abs()
    }

    fn mbr(&self, p1: &Point, p2: &Point) -> Rect {
        Rect::from_points(*p1, *p2)
    }
}
