//! Parallel count-then-fill transforms over CSR graphs and matrices.
//!
//! Every transform counts destination sizes, turns the counts into offsets with an exclusive
//! prefix sum, allocates its output once and scatters entries through atomic cursors. Each
//! phase is one rayon launch; its join is the only barrier.

pub mod block;
pub mod coloring;
pub mod config;
pub mod degree;
pub mod incidence;
pub mod parts;
pub mod prefix_sum;
pub mod reverse_map;
pub mod sort_by_degree;
pub mod transpose;
pub mod triangle;
pub mod utility {
    pub mod util;
}

pub use block::{block_csr_from_formatted, block_format_point_csr, BlockCsr};
pub use coloring::{count_coloring_conflicts, count_coloring_conflicts_with};
pub use config::TransformConfig;
pub use degree::{count_rows_above, max_degree, min_max_degree, DegreeStats};
pub use incidence::{
    incidence_from_lower, incidence_from_lower_with, incidence_from_original,
    incidence_from_original_with, Incidence,
};
pub use parts::CsrParts;
pub use prefix_sum::{exclusive_prefix_sum, exclusive_prefix_sum_with};
pub use reverse_map::{
    build_reverse_map, build_reverse_map_using, build_reverse_map_with, ReverseMap,
    ReverseMapStrategy,
};
pub use sort_by_degree::{
    rows_by_rank, sort_rows_by_degree, sort_rows_by_degree_parallel,
    sort_rows_by_degree_sequential, sort_rows_by_degree_with, DegreeOrder,
};
pub use transpose::{
    transpose_graph, transpose_graph_with, transpose_matrix, transpose_matrix_with,
    transpose_parts,
};
pub use triangle::{
    extract_triangle, extract_triangle_graph, extract_triangle_parts, extract_triangle_with,
    lower_triangle, triangle_count, triangle_fill, upper_triangle, Triangle,
};
