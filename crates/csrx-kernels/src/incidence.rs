//! Edge-indexed incidence structures derived from triangles

use crate::config::TransformConfig;
use crate::prefix_sum::exclusive_prefix_sum_with;
use crate::triangle::{Triangle, TriangleFunctor};
use crate::utility::util::{
    checked_index, cursors_from, first_unreconciled, i64_to_usize, split_by_teams, team_range,
    ticket, try_filled, usize_to_i64, ScatterPtr,
};
use csrx_core::{check_indptr, CsrGraph, Error, Result};
use rayon::prelude::*;
use tracing::{debug, warn};

/// CSR-shaped incidence: `entries[rowmap[x]..rowmap[x + 1])` belong to `x`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Incidence {
    pub rowmap: Vec<i64>,
    pub entries: Vec<i64>,
}

/// Endpoint list of a lower-triangular graph: edge `e` (row-major position) owns
/// `entries[2e] = row` and `entries[2e + 1] = col`, and `rowmap[e] = 2e`.
pub fn incidence_from_lower(lower: &CsrGraph<i64>) -> Result<Incidence> {
    incidence_from_lower_with(&TransformConfig::default(), lower)
}

pub fn incidence_from_lower_with(
    cfg: &TransformConfig,
    lower: &CsrGraph<i64>,
) -> Result<Incidence> {
    let nrows = lower.nrows;
    let ne = lower.nnz();
    check_indptr(nrows, &lower.indptr, ne)?;
    let team_rows = cfg.team_rows_for(nrows);
    debug!(nrows, ne, team_rows, "incidence from lower triangle");

    let mut rowmap = try_filled(ne + 1, 0i64)?;
    rowmap
        .par_iter_mut()
        .enumerate()
        .for_each(|(e, r)| *r = usize_to_i64(2 * e));

    let mut entries = try_filled(2 * ne, 0i64)?;
    split_by_teams(&mut entries, &lower.indptr, team_rows, 2)
        .into_par_iter()
        .enumerate()
        .for_each(|(t, part)| {
            let rows = team_range(t, team_rows, nrows);
            let team_base = i64_to_usize(lower.indptr[rows.start]);
            for row in rows {
                let s = i64_to_usize(lower.indptr[row]);
                let e = i64_to_usize(lower.indptr[row + 1]);
                for p in s..e {
                    let local = 2 * (p - team_base);
                    part[local] = usize_to_i64(row);
                    part[local + 1] = lower.indices[p];
                }
            }
        });
    Ok(Incidence { rowmap, entries })
}

/// Incidence of the original (symmetric) graph: every edge kept by `keep` gets an id from the
/// triangle's row offsets, and that id is written into the adjacency slot of both endpoints
/// through one ticket per endpoint. `rowmap` is the input's `indptr`.
///
/// Every slot must be claimed exactly once, which holds for a symmetric graph without
/// self-loops; anything else is reported as [`Error::CountMismatch`].
pub fn incidence_from_original(
    g: &CsrGraph<i64>,
    perm: Option<&[i64]>,
    keep: Triangle,
) -> Result<Incidence> {
    incidence_from_original_with(&TransformConfig::default(), g, perm, keep)
}

pub fn incidence_from_original_with(
    cfg: &TransformConfig,
    g: &CsrGraph<i64>,
    perm: Option<&[i64]>,
    keep: Triangle,
) -> Result<Incidence> {
    let nrows = g.nrows;
    let functor = TriangleFunctor::new(cfg, nrows, &g.indptr, &g.indices, perm, keep)?;
    debug!(nrows, ne = g.nnz(), ?keep, "incidence from original graph");

    let mut edge_base = try_filled(nrows + 1, 0i64)?;
    functor.count(&mut edge_base)?;
    exclusive_prefix_sum_with(cfg, &mut edge_base);

    let cursors = cursors_from(&g.indptr[..nrows])?;
    let mut entries = try_filled(g.nnz(), 0i64)?;
    let out = ScatterPtr::new(&mut entries);

    let claim = |v: usize| -> Result<usize> {
        let pos = ticket(&cursors[v]);
        let end = i64_to_usize(g.indptr[v + 1]);
        if pos >= end {
            let start = i64_to_usize(g.indptr[v]);
            return Err(Error::CountMismatch {
                row: v,
                counted: end - start,
                written: pos - start + 1,
            });
        }
        Ok(pos)
    };

    (0..nrows.div_ceil(functor.team_rows))
        .into_par_iter()
        .try_for_each(|t| {
            for row in team_range(t, functor.team_rows, nrows) {
                let rank = functor.row_rank(row);
                let mut id = edge_base[row];
                for p in functor.row_bounds(row) {
                    let j = g.indices[p];
                    if !keep.keeps(rank, functor.col_rank(j)?) {
                        continue;
                    }
                    let col = checked_index(j, nrows).ok_or(Error::IndexOutOfBounds {
                        index: j,
                        bound: nrows,
                    })?;
                    let row_pos = claim(row)?;
                    let col_pos = claim(col)?;
                    // SAFETY: both positions are fresh tickets inside their vertex's range.
                    unsafe {
                        out.write(row_pos, id);
                        out.write(col_pos, id);
                    }
                    id += 1;
                }
            }
            Ok(())
        })
        .inspect_err(|e| warn!(%e, "incidence fill overran a vertex"))?;

    if let Some((row, counted, written)) = first_unreconciled(&cursors, &g.indptr) {
        warn!(row, counted, written, "incidence left unclaimed slots");
        return Err(Error::CountMismatch {
            row,
            counted,
            written,
        });
    }
    Ok(Incidence {
        rowmap: g.indptr.clone(),
        entries,
    })
}
