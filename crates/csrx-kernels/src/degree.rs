//! Degree statistics over a row-pointer array

use crate::utility::util::i64_to_usize;
use csrx_core::{check_indptr, Result};
use rayon::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DegreeStats {
    pub min: usize,
    pub max: usize,
}

#[inline]
fn degrees(indptr: &[i64]) -> impl IndexedParallelIterator<Item = usize> + '_ {
    indptr.par_windows(2).map(|w| i64_to_usize(w[1] - w[0]))
}

fn check(indptr: &[i64]) -> Result<()> {
    let nrows = indptr.len().saturating_sub(1);
    let nnz = indptr.last().map_or(0, |&l| i64_to_usize(l.max(0)));
    check_indptr(nrows, indptr, nnz)
}

/// Minimum and maximum row degree in one reduction. A graph without rows reports `0/0`.
pub fn min_max_degree(indptr: &[i64]) -> Result<DegreeStats> {
    check(indptr)?;
    if indptr.len() < 2 {
        return Ok(DegreeStats { min: 0, max: 0 });
    }
    let (min, max) = degrees(indptr)
        .fold(
            || (usize::MAX, 0usize),
            |(lo, hi), d| (lo.min(d), hi.max(d)),
        )
        .reduce(
            || (usize::MAX, 0usize),
            |(a, b), (c, d)| (a.min(c), b.max(d)),
        );
    Ok(DegreeStats { min, max })
}

pub fn max_degree(indptr: &[i64]) -> Result<usize> {
    check(indptr)?;
    Ok(degrees(indptr).max().unwrap_or(0))
}

/// Number of rows whose degree is strictly greater than `threshold`.
pub fn count_rows_above(indptr: &[i64], threshold: usize) -> Result<usize> {
    check(indptr)?;
    Ok(degrees(indptr).filter(|&d| d > threshold).count())
}
