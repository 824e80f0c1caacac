// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A read/write-locked wrapper around any [`SpatialSearch`] index.
//!
//! Reads hold the shared lock and mutations hold the exclusive lock, each for
//! the whole call. Guards are released with `unlock_fair`, which hands the
//! lock to the longest waiter, so a stream of readers cannot starve a writer.
//!
//! The shared lock is reentrant: a thread already reading may read again,
//! even while a writer is queued.
//!
//! Every operation also has a `try_` form that gives up immediately instead
//! of waiting. When it cannot take the lock it does no work and returns
//! `None` (value-returning operations) or `false`.

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::search::SpatialSearch;
use crate::stats::Stats;

/// Thread-safe index. Share it with `Arc`; all methods take `&self`.
///
/// Reads nest: a visitor or a [`with_read`](Self::with_read) closure may query
/// the same wrapper again. Writes do not: calling a mutator from inside any
/// closure run by this wrapper deadlocks.
#[derive(Debug, Default)]
pub struct ConcurrentRTree<S> {
    inner: RwLock<S>,
}

impl<S> ConcurrentRTree<S> {
    /// Wrap `index`.
    pub fn new(index: S) -> Self {
        Self {
            inner: RwLock::new(index),
        }
    }

    /// Unwrap the index.
    pub fn into_inner(self) -> S {
        self.inner.into_inner()
    }

    /// Run `f` under the shared lock, which this thread may already hold.
    pub fn with_read<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        let guard = self.inner.read_recursive();
        let out = f(&*guard);
        RwLockReadGuard::unlock_fair(guard);
        out
    }

    /// Run `f` under the exclusive lock.
    pub fn with_write<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        let mut guard = self.inner.write();
        let out = f(&mut *guard);
        RwLockWriteGuard::unlock_fair(guard);
        out
    }

    /// Run `f` under the shared lock if it is free of writers right now.
    pub fn try_with_read<R>(&self, f: impl FnOnce(&S) -> R) -> Option<R> {
        let guard = self.inner.try_read_recursive()?;
        let out = f(&*guard);
        RwLockReadGuard::unlock_fair(guard);
        Some(out)
    }

    /// Run `f` under the exclusive lock if it is free right now.
    pub fn try_with_write<R>(&self, f: impl FnOnce(&mut S) -> R) -> Option<R> {
        let mut guard = self.inner.try_write()?;
        let out = f(&mut *guard);
        RwLockWriteGuard::unlock_fair(guard);
        Some(out)
    }
}

impl<S: SpatialSearch> ConcurrentRTree<S> {
    /// Insert `entry`.
    pub fn add(&self, entry: S::Entry) {
        self.with_write(|s| s.add(entry));
    }

    /// Remove one entry equal to `entry`. Returns whether one was found.
    pub fn remove(&self, entry: &S::Entry) -> bool {
        self.with_write(|s| s.remove(entry))
    }

    /// Remove `old`, then insert `new`, as one exclusive operation.
    pub fn update(&self, old: &S::Entry, new: S::Entry) -> bool {
        self.with_write(|s| s.update(old, new))
    }

    /// See [`SpatialSearch::search`].
    pub fn search(&self, rect: &S::Rect, out: &mut [S::Entry]) -> usize {
        self.with_read(|s| s.search(rect, out))
    }

    /// See [`SpatialSearch::search_with`].
    pub fn search_with(&self, rect: &S::Rect, mut visit: impl FnMut(&S::Entry)) {
        self.with_read(|s| s.search_with(rect, &mut visit));
    }

    /// See [`SpatialSearch::search_into`].
    pub fn search_into(&self, rect: &S::Rect, out: &mut Vec<S::Entry>) -> usize {
        self.with_read(|s| s.search_into(rect, out))
    }

    /// See [`SpatialSearch::intersects`].
    pub fn intersects(&self, rect: &S::Rect, out: &mut [S::Entry]) -> usize {
        self.with_read(|s| s.intersects(rect, out))
    }

    /// See [`SpatialSearch::intersects_with`].
    pub fn intersects_with(&self, rect: &S::Rect, mut visit: impl FnMut(&S::Entry)) {
        self.with_read(|s| s.intersects_with(rect, &mut visit));
    }

    /// See [`SpatialSearch::intersects_into`].
    pub fn intersects_into(&self, rect: &S::Rect, out: &mut Vec<S::Entry>) -> usize {
        self.with_read(|s| s.intersects_into(rect, out))
    }

    /// Whether an entry equal to `entry` is stored.
    pub fn contains(&self, entry: &S::Entry) -> bool {
        self.with_read(|s| s.contains(entry))
    }

    /// Number of stored entries.
    pub fn entry_count(&self) -> usize {
        self.with_read(|s| s.entry_count())
    }

    /// Visit every entry.
    pub fn for_each(&self, mut visit: impl FnMut(&S::Entry)) {
        self.with_read(|s| s.for_each(&mut visit));
    }

    /// Structural report.
    pub fn collect_stats(&self) -> Stats {
        self.with_read(|s| s.collect_stats())
    }

    /// Non-blocking [`add`](Self::add). Returns whether the entry was inserted.
    pub fn try_add(&self, entry: S::Entry) -> bool {
        self.try_with_write(|s| s.add(entry)).is_some()
    }

    /// Non-blocking [`remove`](Self::remove). `Some(found)` when the lock was
    /// taken.
    pub fn try_remove(&self, entry: &S::Entry) -> Option<bool> {
        self.try_with_write(|s| s.remove(entry))
    }

    /// Non-blocking [`update`](Self::update). `Some(found)` when the lock was
    /// taken.
    pub fn try_update(&self, old: &S::Entry, new: S::Entry) -> Option<bool> {
        self.try_with_write(|s| s.update(old, new))
    }

    /// Non-blocking [`search`](Self::search).
    pub fn try_search(&self, rect: &S::Rect, out: &mut [S::Entry]) -> Option<usize> {
        self.try_with_read(|s| s.search(rect, out))
    }

    /// Non-blocking [`search_with`](Self::search_with). Returns whether the
    /// query ran.
    pub fn try_search_with(&self, rect: &S::Rect, mut visit: impl FnMut(&S::Entry)) -> bool {
        self.try_with_read(|s| s.search_with(rect, &mut visit))
            .is_some()
    }

    /// Non-blocking [`search_into`](Self::search_into).
    pub fn try_search_into(&self, rect: &S::Rect, out: &mut Vec<S::Entry>) -> Option<usize> {
        self.try_with_read(|s| s.search_into(rect, out))
    }

    /// Non-blocking [`intersects`](Self::intersects).
    pub fn try_intersects(&self, rect: &S::Rect, out: &mut [S::Entry]) -> Option<usize> {
        self.try_with_read(|s| s.intersects(rect, out))
    }

    /// Non-blocking [`intersects_with`](Self::intersects_with). Returns
    /// whether the query ran.
    pub fn try_intersects_with(&self, rect: &S::Rect, mut visit: impl FnMut(&S::Entry)) -> bool {
        self.try_with_read(|s| s.intersects_with(rect, &mut visit))
            .is_some()
    }

    /// Non-blocking [`intersects_into`](Self::intersects_into).
    pub fn try_intersects_into(&self, rect: &S::Rect, out: &mut Vec<S::Entry>) -> Option<usize> {
        self.try_with_read(|s| s.intersects_into(rect, out))
    }

    /// Non-blocking [`contains`](Self::contains).
    pub fn try_contains(&self, entry: &S::Entry) -> Option<bool> {
        self.try_with_read(|s| s.contains(entry))
    }

    /// Non-blocking [`entry_count`](Self::entry_count).
    pub fn try_entry_count(&self) -> Option<usize> {
        self.try_with_read(|s| s.entry_count())
    }

    /// Non-blocking [`for_each`](Self::for_each). Returns whether the walk
    /// ran.
    pub fn try_for_each(&self, mut visit: impl FnMut(&S::Entry)) -> bool {
        self.try_with_read(|s| s.for_each(&mut visit)).is_some()
    }

    /// Non-blocking [`collect_stats`](Self::collect_stats).
    pub fn try_collect_stats(&self) -> Option<Stats> {
        self.try_with_read(|s| s.collect_stats())
    }
}

impl<S: SpatialSearch> SpatialSearch for ConcurrentRTree<S> {
    type Entry = S::Entry;
    type Rect = S::Rect;

    fn add(&mut self, entry: S::Entry) {
        Self::add(self, entry);
    }

    fn remove(&mut self, entry: &S::Entry) -> bool {
        Self::remove(self, entry)
    }

    fn update(&mut self, old: &S::Entry, new: S::Entry) -> bool {
        Self::update(self, old, new)
    }

    fn search(&self, rect: &S::Rect, out: &mut [S::Entry]) -> usize {
        Self::search(self, rect, out)
    }

    fn search_with(&self, rect: &S::Rect, visit: &mut dyn FnMut(&S::Entry)) {
        Self::search_with(self, rect, visit);
    }

    fn search_into(&self, rect: &S::Rect, out: &mut Vec<S::Entry>) -> usize {
        Self::search_into(self, rect, out)
    }

    fn intersects(&self, rect: &S::Rect, out: &mut [S::Entry]) -> usize {
        Self::intersects(self, rect, out)
    }

    fn intersects_with(&self, rect: &S::Rect, visit: &mut dyn FnMut(&S::Entry)) {
        Self::intersects_with(self, rect, visit);
    }

    fn intersects_into(&self, rect: &S::Rect, out: &mut Vec<S::Entry>) -> usize {
        Self::intersects_into(self, rect, out)
    }

    fn contains(&self, entry: &S::Entry) -> bool {
        Self::contains(self, entry)
    }

    fn entry_count(&self) -> usize {
        Self::entry_count(self)
    }

    fn for_each(&self, visit: &mut dyn FnMut(&S::Entry)) {
        Self::for_each(self, visit);
    }

    fn collect_stats(&self) -> Stats {
        Self::collect_stats(self)
    }
}
