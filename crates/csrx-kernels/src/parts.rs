//! Raw CSR output of a transform, before it is wrapped back into a container

use csrx_core::CsrGraph;

/// Row pointers, column indices and (when values were transported) values of a freshly
/// built CSR structure.
#[derive(Debug, Clone, PartialEq)]
pub struct CsrParts<T> {
    pub indptr: Vec<i64>,
    pub indices: Vec<i64>,
    pub data: Option<Vec<T>>,
}

impl<T> CsrParts<T> {
    #[must_use]
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    #[must_use]
    pub fn into_graph(self, nrows: usize, ncols: usize) -> CsrGraph<i64> {
        CsrGraph::from_parts_unchecked(nrows, ncols, self.indptr, self.indices)
    }
}
