//! Distance-1 coloring verification

use crate::config::TransformConfig;
use crate::utility::util::{checked_index, i64_to_usize, team_range};
use csrx_core::{check_indptr, CsrGraph, Error, Result};
use rayon::prelude::*;
use tracing::debug;

/// Number of ordered neighbour pairs `(v, u)` with `u != v` sharing a color. Zero means
/// `colors` is a valid distance-1 coloring; each conflicting undirected edge of a symmetric
/// graph is counted twice.
pub fn count_coloring_conflicts<C: PartialEq + Sync>(
    g: &CsrGraph<i64>,
    colors: &[C],
) -> Result<usize> {
    count_coloring_conflicts_with(&TransformConfig::default(), g, colors)
}

pub fn count_coloring_conflicts_with<C: PartialEq + Sync>(
    cfg: &TransformConfig,
    g: &CsrGraph<i64>,
    colors: &[C],
) -> Result<usize> {
    let nrows = g.nrows;
    check_indptr(nrows, &g.indptr, g.nnz())?;
    if colors.len() != nrows {
        return Err(Error::InvalidArgument {
            arg: "colors",
            reason: format!("length {} does not match vertex count {nrows}", colors.len()),
        });
    }
    let team_rows = cfg.team_rows_for(nrows);
    debug!(nrows, nnz = g.nnz(), team_rows, "coloring check");

    (0..nrows.div_ceil(team_rows))
        .into_par_iter()
        .map(|t| {
            let mut conflicts = 0usize;
            for v in team_range(t, team_rows, nrows) {
                let s = i64_to_usize(g.indptr[v]);
                let e = i64_to_usize(g.indptr[v + 1]);
                for &j in &g.indices[s..e] {
                    let u = checked_index(j, nrows).ok_or(Error::IndexOutOfBounds {
                        index: j,
                        bound: nrows,
                    })?;
                    if u != v && colors[u] == colors[v] {
                        conflicts += 1;
                    }
                }
            }
            Ok(conflicts)
        })
        .try_reduce(|| 0, |a, b| Ok(a + b))
}
