//! Core data structures and errors for csrx (pure Rust)

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod csr;
pub mod error;

pub use csr::{check_indices, check_indptr, Csr, CsrGraph};
pub use error::{Error, Result};
