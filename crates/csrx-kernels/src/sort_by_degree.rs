//! Degree-based row ordering
//
// Output is `new_index[row] = rank`, a permutation of [0, nv) usable directly as the ranking
// of the triangle extractor. Both implementations first order rows by (degree, row) ascending
// and then map the position k in that order to a rank, so they agree exactly:
//   Increasing  rank = k
//   Decreasing  rank = nv - 1 - k
//   ZigZag      walking from the largest degree down (d = nv - 1 - k), ranks alternate
//               between the top end and the bottom end: nv-1, 0, nv-2, 1, ...

use crate::config::TransformConfig;
use crate::utility::util::{i64_to_usize, try_filled, usize_to_i64, ScatterPtr};
use csrx_core::{check_indptr, Result};
use rayon::prelude::*;
use tracing::debug;

// list terminator
const END: usize = usize::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegreeOrder {
    /// Rank 0 is the row with the smallest degree.
    Increasing,
    /// Rank 0 is the row with the largest degree.
    Decreasing,
    /// Large and small rows interleaved from both ends of the rank range.
    ZigZag,
}

impl DegreeOrder {
    /// Rank of the row at position `k` of the ascending (degree, row) order.
    #[inline]
    #[must_use]
    pub const fn rank(self, k: usize, nv: usize) -> usize {
        match self {
            Self::Increasing => k,
            Self::Decreasing => nv - 1 - k,
            Self::ZigZag => {
                let d = nv - 1 - k;
                if d % 2 == 0 {
                    nv - 1 - d / 2
                } else {
                    d / 2
                }
            }
        }
    }
}

fn check(nv: usize, indptr: &[i64]) -> Result<()> {
    let nnz = indptr.last().map_or(0, |&l| i64_to_usize(l.max(0)));
    check_indptr(nv, indptr, nnz)
}

#[inline]
fn degree(indptr: &[i64], row: usize) -> usize {
    i64_to_usize(indptr[row + 1] - indptr[row])
}

/// Rank rows by degree, picking the parallel sort for large inputs.
pub fn sort_rows_by_degree(nv: usize, indptr: &[i64], order: DegreeOrder) -> Result<Vec<i64>> {
    sort_rows_by_degree_with(&TransformConfig::default(), nv, indptr, order)
}

pub fn sort_rows_by_degree_with(
    cfg: &TransformConfig,
    nv: usize,
    indptr: &[i64],
    order: DegreeOrder,
) -> Result<Vec<i64>> {
    if nv >= cfg.parallel_sort_min {
        sort_rows_by_degree_parallel(nv, indptr, order)
    } else {
        sort_rows_by_degree_sequential(nv, indptr, order)
    }
}

/// Bucket sort: rows are threaded onto per-degree linked lists, then the lists are walked from
/// the smallest degree up. Only degrees below `nv` get a bucket; rows at or above it follow in
/// one list sorted by `(degree, row)`.
pub fn sort_rows_by_degree_sequential(
    nv: usize,
    indptr: &[i64],
    order: DegreeOrder,
) -> Result<Vec<i64>> {
    check(nv, indptr)?;
    debug!(nv, ?order, "sort rows by degree (sequential)");
    let mut begins = try_filled(nv, END)?;
    let mut nexts = try_filled(nv, END)?;
    let mut overflow: Vec<(usize, usize)> = Vec::new();
    // Push in reverse so each list reads in ascending row order.
    for row in (0..nv).rev() {
        let d = degree(indptr, row);
        if d < nv {
            nexts[row] = begins[d];
            begins[d] = row;
        } else {
            overflow.push((d, row));
        }
    }
    overflow.sort_unstable();

    let mut new_index = try_filled(nv, 0i64)?;
    let mut k = 0usize;
    let mut assign = |row: usize| {
        new_index[row] = usize_to_i64(order.rank(k, nv));
        k += 1;
    };
    for &head in &begins {
        let mut row = head;
        while row != END {
            assign(row);
            row = nexts[row];
        }
    }
    for &(_, row) in &overflow {
        assign(row);
    }
    Ok(new_index)
}

/// Parallel sort of `(degree, row)` pairs, then a parallel scatter of ranks.
pub fn sort_rows_by_degree_parallel(
    nv: usize,
    indptr: &[i64],
    order: DegreeOrder,
) -> Result<Vec<i64>> {
    check(nv, indptr)?;
    debug!(nv, ?order, "sort rows by degree (parallel)");
    let mut items: Vec<(usize, usize)> = (0..nv)
        .into_par_iter()
        .map(|row| (degree(indptr, row), row))
        .collect();
    items.par_sort_unstable();
    let mut new_index = try_filled(nv, 0i64)?;
    let out = ScatterPtr::new(&mut new_index);
    items.par_iter().enumerate().for_each(|(k, &(_, row))| {
        // SAFETY: `items` holds every row exactly once.
        unsafe { out.write(row, usize_to_i64(order.rank(k, nv))) };
    });
    Ok(new_index)
}

/// Rows listed by rank: the inverse of a `new_index` permutation.
#[must_use]
pub fn rows_by_rank(new_index: &[i64]) -> Vec<usize> {
    let mut rows = vec![0usize; new_index.len()];
    for (row, &rank) in new_index.iter().enumerate() {
        rows[i64_to_usize(rank)] = row;
    }
    rows
}
