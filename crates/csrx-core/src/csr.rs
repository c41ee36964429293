//! CSR format definitions and constructors

use crate::error::{Error, Result};

/// Sparse matrix in compressed-row form. Values are carried opaquely.
#[derive(Debug, Clone, PartialEq)]
pub struct Csr<T, I> {
    pub nrows: usize,
    pub ncols: usize,
    pub indptr: Vec<I>,
    pub indices: Vec<I>,
    pub data: Vec<T>,
}

/// Compressed-row structure without values (a graph, or the pattern of a matrix).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrGraph<I> {
    pub nrows: usize,
    pub ncols: usize,
    pub indptr: Vec<I>,
    pub indices: Vec<I>,
}

impl<T, I> Csr<T, I> {
    #[inline]
    #[must_use]
    pub const fn shape(&self) -> (usize, usize) {
        (self.nrows, self.ncols)
    }
    #[inline]
    #[must_use]
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }
}

impl<I> CsrGraph<I> {
    #[inline]
    #[must_use]
    pub const fn shape(&self) -> (usize, usize) {
        (self.nrows, self.ncols)
    }
    #[inline]
    #[must_use]
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }
}

#[inline]
fn offset(x: i64) -> usize {
    debug_assert!(x >= 0);
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    {
        x as usize
    }
}

fn check_endpoints(nrows: usize, indptr: &[i64], nnz: usize) -> Result<()> {
    if indptr.len() != nrows + 1 {
        return Err(Error::IndptrLength {
            expected: nrows + 1,
            got: indptr.len(),
        });
    }
    let first = indptr.first().copied().unwrap_or(0);
    if first != 0 {
        return Err(Error::IndptrStart { got: first });
    }
    let last = indptr.last().copied().unwrap_or(0);
    if usize::try_from(last).map_or(true, |l| l != nnz) {
        return Err(Error::NnzMismatch { last, nnz });
    }
    Ok(())
}

/// Checks that `indptr` is a valid row-pointer array for `nrows` rows over `nnz` entries:
/// right length, starts at 0, ends at `nnz`, never decreases.
pub fn check_indptr(nrows: usize, indptr: &[i64], nnz: usize) -> Result<()> {
    check_endpoints(nrows, indptr, nnz)?;
    if let Some(row) = indptr.windows(2).position(|w| w[0] > w[1]) {
        return Err(Error::IndptrNotMonotone { row });
    }
    Ok(())
}

/// Checks every index lies in `[0, bound)`.
pub fn check_indices(indices: &[i64], bound: usize) -> Result<()> {
    match indices
        .iter()
        .find(|&&j| usize::try_from(j).map_or(true, |jj| jj >= bound))
    {
        Some(&index) => Err(Error::IndexOutOfBounds { index, bound }),
        None => Ok(()),
    }
}

// Endpoint checks always run; the O(nrows + nnz) scans only with `check`.
fn validate(nrows: usize, ncols: usize, indptr: &[i64], indices: &[i64], check: bool) -> Result<()> {
    if check {
        check_indptr(nrows, indptr, indices.len())?;
        check_indices(indices, ncols)
    } else {
        check_endpoints(nrows, indptr, indices.len())
    }
}

impl CsrGraph<i64> {
    pub fn from_parts(
        nrows: usize,
        ncols: usize,
        indptr: Vec<i64>,
        indices: Vec<i64>,
        check: bool,
    ) -> Result<Self> {
        validate(nrows, ncols, &indptr, &indices, check)?;
        Ok(Self {
            nrows,
            ncols,
            indptr,
            indices,
        })
    }

    #[inline]
    #[must_use]
    pub const fn from_parts_unchecked(
        nrows: usize,
        ncols: usize,
        indptr: Vec<i64>,
        indices: Vec<i64>,
    ) -> Self {
        Self {
            nrows,
            ncols,
            indptr,
            indices,
        }
    }

    /// Build from per-row neighbour lists; `ncols` bounds every neighbour.
    pub fn from_rows<R: AsRef<[i64]>>(ncols: usize, rows: &[R]) -> Result<Self> {
        let mut indptr = Vec::with_capacity(rows.len() + 1);
        let mut indices = Vec::new();
        indptr.push(0i64);
        for r in rows {
            indices.extend_from_slice(r.as_ref());
            let end = i64::try_from(indices.len()).map_err(|_| Error::InvalidArgument {
                arg: "rows",
                reason: "too many entries for i64 offsets".into(),
            })?;
            indptr.push(end);
        }
        Self::from_parts(rows.len(), ncols, indptr, indices, true)
    }

    /// Neighbours of row `i`.
    #[inline]
    #[must_use]
    pub fn row(&self, i: usize) -> &[i64] {
        &self.indices[offset(self.indptr[i])..offset(self.indptr[i + 1])]
    }

    #[inline]
    #[must_use]
    pub fn degree(&self, i: usize) -> usize {
        offset(self.indptr[i + 1] - self.indptr[i])
    }
}

impl<T> Csr<T, i64> {
    pub fn from_parts(
        nrows: usize,
        ncols: usize,
        indptr: Vec<i64>,
        indices: Vec<i64>,
        data: Vec<T>,
        check: bool,
    ) -> Result<Self> {
        if indices.len() != data.len() {
            return Err(Error::DataLength {
                indices: indices.len(),
                data: data.len(),
            });
        }
        validate(nrows, ncols, &indptr, &indices, check)?;
        Ok(Self {
            nrows,
            ncols,
            indptr,
            indices,
            data,
        })
    }

    #[inline]
    #[must_use]
    pub const fn from_parts_unchecked(
        nrows: usize,
        ncols: usize,
        indptr: Vec<i64>,
        indices: Vec<i64>,
        data: Vec<T>,
    ) -> Self {
        Self {
            nrows,
            ncols,
            indptr,
            indices,
            data,
        }
    }

    /// Column indices and values of row `i`.
    #[inline]
    #[must_use]
    pub fn row(&self, i: usize) -> (&[i64], &[T]) {
        let s = offset(self.indptr[i]);
        let e = offset(self.indptr[i + 1]);
        (&self.indices[s..e], &self.data[s..e])
    }

    /// Drop the values, keeping the sparsity pattern.
    #[must_use]
    pub fn into_graph(self) -> CsrGraph<i64> {
        CsrGraph::from_parts_unchecked(self.nrows, self.ncols, self.indptr, self.indices)
    }
}
