//! Block-CRS formatting of point CSR matrices.
//!
//! Both passes run sequentially over plain slices; they are preprocessing steps, not kernels.

use crate::utility::util::{checked_index, i64_to_usize, try_filled, try_with_capacity, usize_to_i64};
use csrx_core::{check_indptr, Csr, Error, Result};
use num_traits::{One, Zero};
use tracing::{debug, warn};

/// Block-compressed rows. `indices[indptr[i]..indptr[i + 1])` are the block columns of block
/// row `i`. Values are stored point-row by point-row: within block row `i` with `nb` blocks,
/// point row `r` of the block row occupies `nb * block_size` consecutive values, ordered by
/// block column then by column inside the block.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockCsr<T> {
    pub block_size: usize,
    /// Block rows.
    pub nrows: usize,
    /// Block columns.
    pub ncols: usize,
    pub indptr: Vec<i64>,
    pub indices: Vec<i64>,
    pub data: Vec<T>,
}

impl<T: Copy> BlockCsr<T> {
    #[must_use]
    pub fn nnz_blocks(&self) -> usize {
        self.indices.len()
    }

    /// Shape in points.
    #[must_use]
    pub const fn point_shape(&self) -> (usize, usize) {
        (self.nrows * self.block_size, self.ncols * self.block_size)
    }

    /// Value at point `(row, col)`, or `None` when its block is not stored or the block size
    /// is zero.
    #[must_use]
    pub fn point(&self, row: usize, col: usize) -> Option<T> {
        let bs = self.block_size;
        if bs == 0 {
            return None;
        }
        let bi = row / bs;
        if bi >= self.nrows {
            return None;
        }
        let s = i64_to_usize(self.indptr[bi]);
        let e = i64_to_usize(self.indptr[bi + 1]);
        let target = usize_to_i64(col / bs);
        let k = self.indices[s..e].iter().position(|&b| b == target)?;
        let nb = e - s;
        let at = s * bs * bs + (row % bs) * nb * bs + k * bs + col % bs;
        self.data.get(at).copied()
    }
}

fn check_block_size(block: usize) -> Result<()> {
    if block == 0 {
        return Err(Error::InvalidArgument {
            arg: "block",
            reason: "block size must be positive".to_string(),
        });
    }
    Ok(())
}

/// Pad `a` to multiples of `block` in both dimensions and store every touched block densely.
///
/// All point rows of one block row share the same sorted column list: the union of the blocks
/// any of them touches. Entries absent from `a` become explicit zeros, and each padding row gets
/// a one on its diagonal. When a row repeats a column, its last value wins.
pub fn block_format_point_csr<T: Copy + Zero + One>(
    block: usize,
    a: &Csr<T, i64>,
) -> Result<Csr<T, i64>> {
    check_block_size(block)?;
    check_indptr(a.nrows, &a.indptr, a.nnz())?;
    if a.data.len() != a.nnz() {
        return Err(Error::DataLength {
            indices: a.nnz(),
            data: a.data.len(),
        });
    }
    let out_rows = a.nrows.div_ceil(block) * block;
    let out_cols = a.ncols.div_ceil(block) * block;
    if out_rows > a.nrows && out_rows > out_cols {
        return Err(Error::InvalidArgument {
            arg: "a",
            reason: format!(
                "padding rows up to {out_rows} needs diagonal columns beyond {out_cols}"
            ),
        });
    }
    debug!(block, nrows = a.nrows, ncols = a.ncols, out_rows, out_cols, "block format");

    let mut indptr = try_filled(out_rows + 1, 0i64)?;
    let mut indices = Vec::new();
    let mut data = Vec::new();
    let mut seen = try_filled(out_cols, false)?;
    let mut acc = try_filled(out_cols, T::zero())?;
    let mut columns: Vec<usize> = try_with_capacity(out_cols)?;

    for first in (0..out_rows).step_by(block) {
        columns.clear();
        for row in first..first + block {
            let mut touch = |c: usize| {
                let start = c / block * block;
                for kk in start..start + block {
                    if !seen[kk] {
                        seen[kk] = true;
                        columns.push(kk);
                    }
                }
            };
            if row < a.nrows {
                for &j in a.row(row).0 {
                    let c = checked_index(j, a.ncols).ok_or(Error::IndexOutOfBounds {
                        index: j,
                        bound: a.ncols,
                    })?;
                    touch(c);
                }
            } else {
                touch(row);
            }
        }
        columns.sort_unstable();
        for &c in &columns {
            seen[c] = false;
        }

        for row in first..first + block {
            if row < a.nrows {
                let (cols, vals) = a.row(row);
                for (&j, &v) in cols.iter().zip(vals) {
                    acc[i64_to_usize(j)] = v;
                }
            } else {
                acc[row] = T::one();
            }
            for &c in &columns {
                indices.push(usize_to_i64(c));
                data.push(acc[c]);
                acc[c] = T::zero();
            }
            indptr[row + 1] = indptr[row] + usize_to_i64(columns.len());
        }
    }
    Ok(Csr::from_parts_unchecked(out_rows, out_cols, indptr, indices, data))
}

/// Compress a block-formatted point CSR (as produced by [`block_format_point_csr`]) into
/// [`BlockCsr`]. Block columns are read from the first point row of each block row; every
/// block row must hold exactly `row_len / block` block starts and start where the previous
/// one ended, otherwise [`Error::CountMismatch`] names the block row.
pub fn block_csr_from_formatted<T: Copy>(
    block: usize,
    formatted: &Csr<T, i64>,
) -> Result<BlockCsr<T>> {
    check_block_size(block)?;
    let (nrows, ncols) = formatted.shape();
    if nrows % block != 0 || ncols % block != 0 {
        return Err(Error::InvalidArgument {
            arg: "formatted",
            reason: format!("shape ({nrows}, {ncols}) is not a multiple of block size {block}"),
        });
    }
    check_indptr(nrows, &formatted.indptr, formatted.nnz())?;
    if formatted.data.len() != formatted.nnz() {
        return Err(Error::DataLength {
            indices: formatted.nnz(),
            data: formatted.data.len(),
        });
    }
    let bs2 = block * block;
    let out_rows = nrows / block;
    debug!(block, out_rows, nnz = formatted.nnz(), "block compress");

    let mut indptr = try_filled(out_rows + 1, 0i64)?;
    let mut indices: Vec<i64> = try_with_capacity(formatted.nnz() / bs2)?;
    for i in 0..out_rows {
        let ib = i64_to_usize(formatted.indptr[i * block]);
        let ie = i64_to_usize(formatted.indptr[i * block + 1]);
        let start = ib / bs2;
        if start != indices.len() {
            warn!(block_row = i, expected = start, found = indices.len(), "block row offset drift");
            return Err(Error::CountMismatch {
                row: i,
                counted: start,
                written: indices.len(),
            });
        }
        indptr[i] = usize_to_i64(start);
        let expected = (ie - ib) / block;
        let mut written = 0usize;
        for &e in &formatted.indices[ib..ie] {
            if e % usize_to_i64(block) == 0 {
                indices.push(e / usize_to_i64(block));
                written += 1;
            }
        }
        if written != expected {
            warn!(block_row = i, expected, written, "block row size mismatch");
            return Err(Error::CountMismatch {
                row: i,
                counted: expected,
                written,
            });
        }
    }
    let total = i64_to_usize(formatted.indptr[nrows]) / bs2;
    if total != indices.len() {
        warn!(expected = total, found = indices.len(), "block count drift at the last row");
        return Err(Error::CountMismatch {
            row: out_rows.saturating_sub(1),
            counted: total,
            written: indices.len(),
        });
    }
    indptr[out_rows] = usize_to_i64(total);

    let mut data = try_with_capacity(formatted.nnz())?;
    data.extend_from_slice(&formatted.data);
    Ok(BlockCsr {
        block_size: block,
        nrows: out_rows,
        ncols: ncols / block,
        indptr,
        indices,
        data,
    })
}
