//! Transpose of a CSR graph or matrix by count / offset / fill
//
// 1) count: every edge (row, col) bumps t_indptr[col] atomically
// 2) offset: exclusive prefix sum, snapshotted into per-column work cursors
// 3) fill: every edge takes a ticket from cursor[col] and writes `row` (and its value) there
// Each phase is one rayon launch over teams of rows; the launch returning is the barrier the
// next phase relies on. Rows of the result are contiguous but their order is unspecified.

#![allow(
    clippy::similar_names,
    reason = "t_indptr/t_indices mirror indptr/indices of the input"
)]

use crate::config::TransformConfig;
use crate::parts::CsrParts;
use crate::prefix_sum::exclusive_prefix_sum_with;
use crate::utility::util::{
    atomic_counters, checked_index, cursors_from, first_unreconciled, i64_to_usize, into_counts,
    team_range, ticket, try_with_capacity, usize_to_i64, ScatterPtr,
};
use csrx_core::{check_indptr, Csr, CsrGraph, Error, Result};
use rayon::prelude::*;
use std::sync::atomic::{AtomicI64, Ordering};
use tracing::{debug, warn};

struct TransposeFunctor<'a, T> {
    nrows: usize,
    ncols: usize,
    indptr: &'a [i64],
    indices: &'a [i64],
    data: Option<&'a [T]>,
    team_rows: usize,
}

impl<T: Clone + Send + Sync> TransposeFunctor<'_, T> {
    fn nteams(&self) -> usize {
        self.nrows.div_ceil(self.team_rows)
    }

    fn count(&self, t_counts: &[AtomicI64]) -> Result<()> {
        (0..self.nteams()).into_par_iter().try_for_each(|t| {
            for row in team_range(t, self.team_rows, self.nrows) {
                let s = i64_to_usize(self.indptr[row]);
                let e = i64_to_usize(self.indptr[row + 1]);
                for p in s..e {
                    let j = self.indices[p];
                    let Some(col) = checked_index(j, self.ncols) else {
                        return Err(Error::IndexOutOfBounds {
                            index: j,
                            bound: self.ncols,
                        });
                    };
                    t_counts[col].fetch_add(1, Ordering::Relaxed);
                }
            }
            Ok(())
        })
    }

    fn fill(
        &self,
        cursors: &[AtomicI64],
        t_indices: ScatterPtr<i64>,
        t_data: Option<ScatterPtr<T>>,
    ) {
        (0..self.nteams()).into_par_iter().for_each(|t| {
            for row in team_range(t, self.team_rows, self.nrows) {
                let r = usize_to_i64(row);
                let s = i64_to_usize(self.indptr[row]);
                let e = i64_to_usize(self.indptr[row + 1]);
                for p in s..e {
                    let col = i64_to_usize(self.indices[p]);
                    let pos = ticket(&cursors[col]);
                    // SAFETY: the count phase visited this same edge set, so cursor[col] hands
                    // out each slot of [t_indptr[col], t_indptr[col + 1]) exactly once.
                    unsafe {
                        t_indices.write(pos, r);
                        if let (Some(out), Some(vals)) = (t_data, self.data) {
                            out.write(pos, vals[p].clone());
                        }
                    }
                }
            }
        });
    }
}

/// Transpose the raw arrays of an `nrows x ncols` CSR structure, carrying `data` along when
/// given. The result has `ncols` rows.
pub fn transpose_parts<T: Clone + Send + Sync>(
    cfg: &TransformConfig,
    nrows: usize,
    ncols: usize,
    indptr: &[i64],
    indices: &[i64],
    data: Option<&[T]>,
) -> Result<CsrParts<T>> {
    check_indptr(nrows, indptr, indices.len())?;
    if let Some(d) = data {
        if d.len() != indices.len() {
            return Err(Error::DataLength {
                indices: indices.len(),
                data: d.len(),
            });
        }
    }
    let team_rows = cfg.team_rows_for(nrows);
    debug!(
        nrows,
        ncols,
        nnz = indices.len(),
        team_rows,
        values = data.is_some(),
        "transpose"
    );
    let functor = TransposeFunctor {
        nrows,
        ncols,
        indptr,
        indices,
        data,
        team_rows,
    };

    let counts = atomic_counters(ncols + 1)?;
    functor.count(&counts)?;
    let mut t_indptr = into_counts(counts);
    let total = i64_to_usize(exclusive_prefix_sum_with(cfg, &mut t_indptr));
    let cursors = cursors_from(&t_indptr[..ncols])?;

    let mut t_indices: Vec<i64> = try_with_capacity(total)?;
    let mut t_data: Option<Vec<T>> = match data {
        Some(_) => Some(try_with_capacity(total)?),
        None => None,
    };
    functor.fill(
        &cursors,
        ScatterPtr::new(&mut t_indices),
        t_data.as_mut().map(ScatterPtr::new),
    );
    if let Some((row, counted, written)) = first_unreconciled(&cursors, &t_indptr) {
        warn!(row, counted, written, "transpose fill drifted from its count");
        return Err(Error::CountMismatch {
            row,
            counted,
            written,
        });
    }
    // SAFETY: every cursor ended on its row's end offset, so all `total` slots were written.
    unsafe {
        t_indices.set_len(total);
        if let Some(d) = t_data.as_mut() {
            d.set_len(total);
        }
    }
    Ok(CsrParts {
        indptr: t_indptr,
        indices: t_indices,
        data: t_data,
    })
}

/// Transpose of a graph (structure only).
pub fn transpose_graph(a: &CsrGraph<i64>) -> Result<CsrGraph<i64>> {
    transpose_graph_with(&TransformConfig::default(), a)
}

pub fn transpose_graph_with(cfg: &TransformConfig, a: &CsrGraph<i64>) -> Result<CsrGraph<i64>> {
    let parts = transpose_parts::<()>(cfg, a.nrows, a.ncols, &a.indptr, &a.indices, None)?;
    Ok(parts.into_graph(a.ncols, a.nrows))
}

/// Transpose of a matrix; values travel with their entries.
pub fn transpose_matrix<T: Clone + Send + Sync>(a: &Csr<T, i64>) -> Result<Csr<T, i64>> {
    transpose_matrix_with(&TransformConfig::default(), a)
}

pub fn transpose_matrix_with<T: Clone + Send + Sync>(
    cfg: &TransformConfig,
    a: &Csr<T, i64>,
) -> Result<Csr<T, i64>> {
    let CsrParts {
        indptr,
        indices,
        data,
    } = transpose_parts(cfg, a.nrows, a.ncols, &a.indptr, &a.indices, Some(&a.data))?;
    Ok(Csr::from_parts_unchecked(
        a.ncols,
        a.nrows,
        indptr,
        indices,
        data.unwrap_or_default(),
    ))
}
