//! Conversions, allocation and shared-write helpers used by every kernel
//
// Index arrays are i64 throughout (row pointers, column indices, permutations, forward maps).
// Work cursors are AtomicI64 slots consumed with fetch_add; the value returned is a ticket for
// exactly one output slot.

use csrx_core::{Error, Result};
use std::ops::Range;
use std::sync::atomic::{AtomicI64, Ordering};

/// Convert i64 to usize, asserting non-negativity.
#[inline]
#[must_use]
pub fn i64_to_usize(x: i64) -> usize {
    debug_assert!(x >= 0, "value must be non-negative");
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    {
        x as usize
    }
}

#[inline]
#[must_use]
pub fn usize_to_i64(x: usize) -> i64 {
    debug_assert!(i64::try_from(x).is_ok(), "value must fit in i64");
    #[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
    {
        x as i64
    }
}

/// Checked index lookup: `Some(j as usize)` when `0 <= j < bound`.
#[inline]
#[must_use]
pub fn checked_index(j: i64, bound: usize) -> Option<usize> {
    usize::try_from(j).ok().filter(|&jj| jj < bound)
}

/// Allocate `len` copies of `value`, reporting allocation failure instead of aborting.
pub fn try_filled<T: Clone>(len: usize, value: T) -> Result<Vec<T>> {
    let mut out = Vec::new();
    out.try_reserve_exact(len)
        .map_err(|_| Error::Allocation { len })?;
    out.resize(len, value);
    Ok(out)
}

/// Allocate an empty vector able to hold `len` elements without reallocating.
pub fn try_with_capacity<T>(len: usize) -> Result<Vec<T>> {
    let mut out = Vec::new();
    out.try_reserve_exact(len)
        .map_err(|_| Error::Allocation { len })?;
    Ok(out)
}

/// Zeroed atomic counters, one per destination.
pub fn atomic_counters(len: usize) -> Result<Vec<AtomicI64>> {
    let mut out = try_with_capacity(len)?;
    out.extend((0..len).map(|_| AtomicI64::new(0)));
    Ok(out)
}

/// Work cursors seeded with each destination's start offset.
pub fn cursors_from(offsets: &[i64]) -> Result<Vec<AtomicI64>> {
    let mut out = try_with_capacity(offsets.len())?;
    out.extend(offsets.iter().copied().map(AtomicI64::new));
    Ok(out)
}

/// Collapse counters after their phase has joined.
#[must_use]
pub fn into_counts(counters: Vec<AtomicI64>) -> Vec<i64> {
    counters.into_iter().map(AtomicI64::into_inner).collect()
}

#[inline]
pub fn ticket(cursor: &AtomicI64) -> usize {
    i64_to_usize(cursor.fetch_add(1, Ordering::Relaxed))
}

/// After a fill, every cursor must have advanced exactly to the next destination's offset.
/// Returns the first destination that did not.
#[must_use]
pub fn first_unreconciled(cursors: &[AtomicI64], offsets: &[i64]) -> Option<(usize, usize, usize)> {
    use rayon::prelude::*;
    cursors
        .par_iter()
        .zip(offsets.par_windows(2))
        .enumerate()
        .find_map_first(|(d, (c, w))| {
            let end = c.load(Ordering::Relaxed);
            (end != w[1]).then(|| (d, i64_to_usize(w[1] - w[0]), i64_to_usize(end - w[0])))
        })
}

/// Row range of team `t` when rows are split into teams of `team_rows`.
#[inline]
#[must_use]
pub fn team_range(t: usize, team_rows: usize, nrows: usize) -> Range<usize> {
    let start = (t * team_rows).min(nrows);
    start..(start + team_rows).min(nrows)
}

/// Split `out` into per-team windows following `offsets`, scaled by `width` slots per entry.
/// Each team owns `out[offsets[start]*width .. offsets[end]*width)`.
pub fn split_by_teams<'a, T>(
    mut out: &'a mut [T],
    offsets: &[i64],
    team_rows: usize,
    width: usize,
) -> Vec<&'a mut [T]> {
    let nrows = offsets.len().saturating_sub(1);
    let nteams = nrows.div_ceil(team_rows);
    let mut parts = Vec::with_capacity(nteams);
    for t in 0..nteams {
        let r = team_range(t, team_rows, nrows);
        let len = i64_to_usize(offsets[r.end] - offsets[r.start]) * width;
        let (head, tail) = std::mem::take(&mut out).split_at_mut(len);
        parts.push(head);
        out = tail;
    }
    parts
}

/// Write handle into an output buffer shared by rayon workers.
///
/// Sound only under the ticket discipline: each slot is written at most once, by the worker
/// that obtained its position from a cursor, and nothing reads the buffer until the launch
/// has joined.
pub struct ScatterPtr<T> {
    ptr: *mut T,
    cap: usize,
}

// Manual impls: the handle is copyable whatever `T` is.
impl<T> Clone for ScatterPtr<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ScatterPtr<T> {}

unsafe impl<T: Send> Send for ScatterPtr<T> {}
unsafe impl<T: Send> Sync for ScatterPtr<T> {}

impl<T> ScatterPtr<T> {
    /// Covers the whole capacity of `buf`, including slots past its current length.
    pub fn new(buf: &mut Vec<T>) -> Self {
        Self {
            ptr: buf.as_mut_ptr(),
            cap: buf.capacity(),
        }
    }

    /// # Safety
    /// `pos` must be below the buffer capacity and no other worker may write `pos`.
    #[inline]
    pub unsafe fn write(self, pos: usize, value: T) {
        debug_assert!(pos < self.cap, "scatter position {pos} past capacity {}", self.cap);
        std::ptr::write(self.ptr.add(pos), value);
    }
}
