// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error type shared by the geometry contract, configuration, and validation.

use thiserror::Error;

/// Errors surfaced by the R-tree and its geometry contract.
///
/// Structural events (node overflow, underflow, missing entries, lock
/// contention) are never reported through this type.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum RTreeError {
    /// A dimension-indexed geometry operation was given `dimension >= ndim`.
    #[error("invalid dimension {dimension} for {ndim}-dimensional geometry")]
    InvalidDimension {
        /// The requested dimension.
        dimension: usize,
        /// The dimensionality of the point or rectangle.
        ndim: usize,
    },

    /// Fill factors must satisfy `1 <= min_fill` and `2 * min_fill <= max_fill`.
    #[error("invalid fill factors: min_fill={min_fill}, max_fill={max_fill}")]
    InvalidFill {
        /// Requested minimum fill.
        min_fill: usize,
        /// Requested maximum fill.
        max_fill: usize,
    },

    /// A structural invariant does not hold. Only reported by
    /// [`RTree::validate`](crate::RTree::validate).
    #[error("tree invariant violated: {0}")]
    Invariant(String),
}

impl RTreeError {
    /// Check `dimension` against `ndim`, failing with [`RTreeError::InvalidDimension`].
    pub fn check_dimension(dimension: usize, ndim: usize) -> Result<(), Self> {
        if dimension < ndim {
            Ok(())
        } else {
            Err(Self::InvalidDimension { dimension, ndim })
        }
    }
}
