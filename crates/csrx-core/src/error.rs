//! Error types for csrx

use thiserror::Error;

/// Result type alias using csrx's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by CSR constructors and transforms.
///
/// Every transform is a single deterministic pass: a returned error means the input broke a
/// precondition (or memory ran out), and no partial output is handed back.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Row pointer array has the wrong length
    #[error("indptr length must be nrows + 1 (expected {expected}, got {got})")]
    IndptrLength {
        /// nrows + 1
        expected: usize,
        /// Actual length
        got: usize,
    },

    /// First row pointer is not zero
    #[error("indptr first element must be 0 (got {got})")]
    IndptrStart {
        /// Actual first element
        got: i64,
    },

    /// Row pointers decrease (or go negative) at `row`
    #[error("indptr must be non-decreasing and non-negative (violated at row {row})")]
    IndptrNotMonotone {
        /// Offending row
        row: usize,
    },

    /// Last row pointer disagrees with the number of stored entries
    #[error("indptr last element must equal nnz (last {last}, nnz {nnz})")]
    NnzMismatch {
        /// indptr[nrows]
        last: i64,
        /// indices.len()
        nnz: usize,
    },

    /// Values array length differs from the indices array length
    #[error("indices and data must have equal length ({indices} vs {data})")]
    DataLength {
        /// indices.len()
        indices: usize,
        /// data.len()
        data: usize,
    },

    /// An index lies outside `[0, bound)`
    #[error("index {index} out of bounds for dimension of size {bound}")]
    IndexOutOfBounds {
        /// The invalid index
        index: i64,
        /// Size of the dimension
        bound: usize,
    },

    /// Permutation does not cover every vertex
    #[error("permutation length {got} does not match vertex count {expected}")]
    PermutationLength {
        /// Number of vertices
        expected: usize,
        /// Actual permutation length
        got: usize,
    },

    /// Fill phase wrote a different number of entries than the count phase reserved
    #[error("count mismatch at row {row}: reserved {counted}, written {written}")]
    CountMismatch {
        /// Destination row
        row: usize,
        /// Entries reserved by the count phase
        counted: usize,
        /// Entries produced by the fill phase
        written: usize,
    },

    /// Output buffer could not be allocated
    #[error("failed to allocate {len} elements")]
    Allocation {
        /// Requested element count
        len: usize,
    },

    /// Invalid argument provided to an operation
    #[error("invalid argument '{arg}': {reason}")]
    InvalidArgument {
        /// The argument name
        arg: &'static str,
        /// Why it was rejected
        reason: String,
    },
}
