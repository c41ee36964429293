//! Lower / upper triangle extraction under an optional vertex ranking
//
// Edge (row, col) is kept when rank(row) > rank(col) (lower) or rank(row) < rank(col) (upper),
// where rank is the permutation entry or the vertex itself. Equal ranks, self-loops included,
// are never kept.
//
// count: each row's kept-edge count is a reduction over its own neighbours, written by the one
// team that owns the row, so no atomics are needed.
// fill: each team owns a disjoint window of the output and re-scans its rows in order, which
// makes the result a stable filter of the input.

use crate::config::TransformConfig;
use crate::parts::CsrParts;
use crate::prefix_sum::exclusive_prefix_sum_with;
use crate::utility::util::{
    checked_index, i64_to_usize, split_by_teams, team_range, try_filled, try_with_capacity, usize_to_i64,
};
use csrx_core::{check_indptr, Csr, CsrGraph, Error, Result};
use rayon::prelude::*;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Triangle {
    Lower,
    Upper,
}

impl Triangle {
    #[inline]
    #[must_use]
    pub const fn keeps(self, row_rank: i64, col_rank: i64) -> bool {
        match self {
            Self::Lower => row_rank > col_rank,
            Self::Upper => row_rank < col_rank,
        }
    }
}

pub(crate) struct TriangleFunctor<'a> {
    pub(crate) nrows: usize,
    pub(crate) indptr: &'a [i64],
    pub(crate) indices: &'a [i64],
    pub(crate) perm: Option<&'a [i64]>,
    pub(crate) keep: Triangle,
    pub(crate) team_rows: usize,
}

impl<'a> TriangleFunctor<'a> {
    pub(crate) fn new(
        cfg: &TransformConfig,
        nrows: usize,
        indptr: &'a [i64],
        indices: &'a [i64],
        perm: Option<&'a [i64]>,
        keep: Triangle,
    ) -> Result<Self> {
        check_indptr(nrows, indptr, indices.len())?;
        if let Some(p) = perm {
            if p.len() != nrows {
                return Err(Error::PermutationLength {
                    expected: nrows,
                    got: p.len(),
                });
            }
        }
        Ok(Self {
            nrows,
            indptr,
            indices,
            perm,
            keep,
            team_rows: cfg.team_rows_for(nrows),
        })
    }

    #[inline]
    pub(crate) fn row_rank(&self, row: usize) -> i64 {
        self.perm.map_or_else(|| usize_to_i64(row), |p| p[row])
    }

    #[inline]
    pub(crate) fn col_rank(&self, j: i64) -> Result<i64> {
        match self.perm {
            Some(p) => checked_index(j, p.len())
                .map(|c| p[c])
                .ok_or(Error::IndexOutOfBounds {
                    index: j,
                    bound: p.len(),
                }),
            None => Ok(j),
        }
    }

    #[inline]
    pub(crate) fn row_bounds(&self, row: usize) -> std::ops::Range<usize> {
        i64_to_usize(self.indptr[row])..i64_to_usize(self.indptr[row + 1])
    }

    fn row_count(&self, row: usize) -> Result<usize> {
        let rank = self.row_rank(row);
        let mut kept = 0usize;
        for p in self.row_bounds(row) {
            if self.keep.keeps(rank, self.col_rank(self.indices[p])?) {
                kept += 1;
            }
        }
        Ok(kept)
    }

    /// Per-row kept counts into `out[..nrows]`.
    pub(crate) fn count(&self, out: &mut [i64]) -> Result<()> {
        out[..self.nrows]
            .par_chunks_mut(self.team_rows)
            .enumerate()
            .try_for_each(|(t, chunk)| {
                let base = t * self.team_rows;
                for (k, c) in chunk.iter_mut().enumerate() {
                    *c = usize_to_i64(self.row_count(base + k)?);
                }
                Ok(())
            })
    }

    fn fill<T: Clone + Send + Sync>(
        &self,
        data: Option<&[T]>,
        out_indptr: &[i64],
        out_indices: &mut [i64],
        out_data: Option<&mut [T]>,
    ) -> Result<()> {
        let nteams = self.nrows.div_ceil(self.team_rows);
        let index_parts = split_by_teams(out_indices, out_indptr, self.team_rows, 1);
        let data_parts: Vec<Option<&mut [T]>> = match out_data {
            Some(d) => split_by_teams(d, out_indptr, self.team_rows, 1)
                .into_iter()
                .map(Some)
                .collect(),
            None => (0..nteams).map(|_| None).collect(),
        };
        index_parts
            .into_par_iter()
            .zip(data_parts)
            .enumerate()
            .try_for_each(|(t, (idx, mut vals))| {
                let rows = team_range(t, self.team_rows, self.nrows);
                let team_base = i64_to_usize(out_indptr[rows.start]);
                for row in rows {
                    let w0 = i64_to_usize(out_indptr[row]) - team_base;
                    let reserved = i64_to_usize(out_indptr[row + 1] - out_indptr[row]);
                    let rank = self.row_rank(row);
                    let mut w = 0usize;
                    for p in self.row_bounds(row) {
                        let j = self.indices[p];
                        if !self.keep.keeps(rank, self.col_rank(j)?) {
                            continue;
                        }
                        if w < reserved {
                            idx[w0 + w] = j;
                            if let (Some(dst), Some(src)) = (vals.as_deref_mut(), data) {
                                dst[w0 + w].clone_from(&src[p]);
                            }
                        }
                        w += 1;
                    }
                    if w != reserved {
                        warn!(row, reserved, written = w, "triangle fill drifted from its count");
                        return Err(Error::CountMismatch {
                            row,
                            counted: reserved,
                            written: w,
                        });
                    }
                }
                Ok(())
            })
    }
}

/// Count phase on its own: kept entries per row into `out_counts[..nv]`. Leaves any extra slot
/// (typically `out_counts[nv]`, scratch for the prefix sum) untouched.
pub fn triangle_count(
    cfg: &TransformConfig,
    nv: usize,
    indptr: &[i64],
    indices: &[i64],
    perm: Option<&[i64]>,
    keep: Triangle,
    out_counts: &mut [i64],
) -> Result<()> {
    if out_counts.len() < nv {
        return Err(Error::InvalidArgument {
            arg: "out_counts",
            reason: format!("length {} below vertex count {nv}", out_counts.len()),
        });
    }
    TriangleFunctor::new(cfg, nv, indptr, indices, perm, keep)?.count(out_counts)
}

/// Fill phase on its own, into buffers sized by `out_indptr` (the prefix-summed counts).
/// Fails with [`Error::CountMismatch`] when a row keeps a different number of entries than
/// `out_indptr` reserved for it.
#[allow(
    clippy::too_many_arguments,
    reason = "Mirrors the raw count/fill split: input arrays, ranking and output arrays"
)]
pub fn triangle_fill<T: Clone + Send + Sync>(
    cfg: &TransformConfig,
    nv: usize,
    indptr: &[i64],
    indices: &[i64],
    data: Option<&[T]>,
    perm: Option<&[i64]>,
    keep: Triangle,
    out_indptr: &[i64],
    out_indices: &mut [i64],
    out_data: Option<&mut [T]>,
) -> Result<()> {
    let functor = TriangleFunctor::new(cfg, nv, indptr, indices, perm, keep)?;
    check_indptr(nv, out_indptr, out_indices.len())?;
    if let Some(d) = data {
        if d.len() != indices.len() {
            return Err(Error::DataLength {
                indices: indices.len(),
                data: d.len(),
            });
        }
    }
    if let Some(d) = out_data.as_deref() {
        if d.len() != out_indices.len() {
            return Err(Error::DataLength {
                indices: out_indices.len(),
                data: d.len(),
            });
        }
    }
    let data = if out_data.is_some() { data } else { None };
    functor.fill(data, out_indptr, out_indices, out_data)
}

/// Count, prefix-sum and fill: the kept sub-structure of an `nv`-row CSR, with values when
/// `data` is given.
pub fn extract_triangle_parts<T: Clone + Send + Sync>(
    cfg: &TransformConfig,
    nv: usize,
    indptr: &[i64],
    indices: &[i64],
    data: Option<&[T]>,
    perm: Option<&[i64]>,
    keep: Triangle,
) -> Result<CsrParts<T>> {
    let functor = TriangleFunctor::new(cfg, nv, indptr, indices, perm, keep)?;
    if let Some(d) = data {
        if d.len() != indices.len() {
            return Err(Error::DataLength {
                indices: indices.len(),
                data: d.len(),
            });
        }
    }
    debug!(
        nv,
        nnz = indices.len(),
        ?keep,
        permuted = perm.is_some(),
        team_rows = functor.team_rows,
        "extract triangle"
    );
    let mut out_indptr = try_filled(nv + 1, 0i64)?;
    functor.count(&mut out_indptr)?;
    let total = i64_to_usize(exclusive_prefix_sum_with(cfg, &mut out_indptr));
    let mut out_indices = try_filled(total, 0i64)?;
    // Seeded with arbitrary input values; fill overwrites every slot.
    let mut out_data = match data {
        Some(d) => {
            let mut v = try_with_capacity(total)?;
            v.extend_from_slice(&d[..total]);
            Some(v)
        }
        None => None,
    };
    functor.fill(data, &out_indptr, &mut out_indices, out_data.as_deref_mut())?;
    Ok(CsrParts {
        indptr: out_indptr,
        indices: out_indices,
        data: out_data,
    })
}

/// Triangle of a matrix; kept entries carry their values.
pub fn extract_triangle<T: Clone + Send + Sync>(
    a: &Csr<T, i64>,
    perm: Option<&[i64]>,
    keep: Triangle,
) -> Result<Csr<T, i64>> {
    extract_triangle_with(&TransformConfig::default(), a, perm, keep)
}

pub fn extract_triangle_with<T: Clone + Send + Sync>(
    cfg: &TransformConfig,
    a: &Csr<T, i64>,
    perm: Option<&[i64]>,
    keep: Triangle,
) -> Result<Csr<T, i64>> {
    let CsrParts {
        indptr,
        indices,
        data,
    } = extract_triangle_parts(cfg, a.nrows, &a.indptr, &a.indices, Some(&a.data), perm, keep)?;
    Ok(Csr::from_parts_unchecked(
        a.nrows,
        a.ncols,
        indptr,
        indices,
        data.unwrap_or_default(),
    ))
}

/// Triangle of a graph (structure only).
pub fn extract_triangle_graph(
    g: &CsrGraph<i64>,
    perm: Option<&[i64]>,
    keep: Triangle,
) -> Result<CsrGraph<i64>> {
    let parts = extract_triangle_parts::<()>(
        &TransformConfig::default(),
        g.nrows,
        &g.indptr,
        &g.indices,
        None,
        perm,
        keep,
    )?;
    Ok(parts.into_graph(g.nrows, g.ncols))
}

pub fn lower_triangle(g: &CsrGraph<i64>, perm: Option<&[i64]>) -> Result<CsrGraph<i64>> {
    extract_triangle_graph(g, perm, Triangle::Lower)
}

pub fn upper_triangle(g: &CsrGraph<i64>, perm: Option<&[i64]>) -> Result<CsrGraph<i64>> {
    extract_triangle_graph(g, perm, Triangle::Upper)
}
