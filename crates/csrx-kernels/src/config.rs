//! Tuning knobs shared by the transform kernels
//
// None of these change results: every kernel produces the same output (up to the documented
// within-row ordering freedom) for any configuration. They only trade contention, memory and
// scheduling overhead.

/// Below this many reverse buckets the reverse map switches to the scaled-bucket strategy.
pub const REVERSE_MAP_ATOMIC_THRESHOLD: usize = 128;
/// log2 of the synthetic slots per real bucket in the scaled-bucket strategy (1024 slots).
pub const REVERSE_MAP_SCALE_SHIFT: u32 = 10;
/// Prefix sums shorter than this run sequentially.
pub const PREFIX_SUM_PARALLEL_MIN: usize = 8192;
/// Degree sorts over fewer rows than this use the sequential bucket sort.
pub const PARALLEL_SORT_MIN: usize = 16 * 1024;
/// Teams per worker thread when the team size is derived automatically.
const TEAMS_PER_THREAD: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformConfig {
    pub reverse_map_atomic_threshold: usize,
    pub reverse_map_scale_shift: u32,
    /// Rows handled by one team; `None` derives it from the rayon pool size.
    pub team_rows: Option<usize>,
    pub prefix_sum_parallel_min: usize,
    pub parallel_sort_min: usize,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            reverse_map_atomic_threshold: REVERSE_MAP_ATOMIC_THRESHOLD,
            reverse_map_scale_shift: REVERSE_MAP_SCALE_SHIFT,
            team_rows: None,
            prefix_sum_parallel_min: PREFIX_SUM_PARALLEL_MIN,
            parallel_sort_min: PARALLEL_SORT_MIN,
        }
    }
}

impl TransformConfig {
    #[must_use]
    pub const fn with_reverse_map_atomic_threshold(mut self, threshold: usize) -> Self {
        self.reverse_map_atomic_threshold = threshold;
        self
    }

    #[must_use]
    pub const fn with_reverse_map_scale_shift(mut self, shift: u32) -> Self {
        self.reverse_map_scale_shift = shift;
        self
    }

    #[must_use]
    pub const fn with_team_rows(mut self, rows: usize) -> Self {
        self.team_rows = Some(rows);
        self
    }

    #[must_use]
    pub const fn with_prefix_sum_parallel_min(mut self, min: usize) -> Self {
        self.prefix_sum_parallel_min = min;
        self
    }

    #[must_use]
    pub const fn with_parallel_sort_min(mut self, min: usize) -> Self {
        self.parallel_sort_min = min;
        self
    }

    /// Rows per team for a launch over `nrows` rows. Defaults to splitting the rows into
    /// about four teams per rayon thread, the same tiling the transpose kernel has always used.
    #[must_use]
    pub fn team_rows_for(&self, nrows: usize) -> usize {
        if let Some(rows) = self.team_rows {
            return rows.max(1);
        }
        let threads = rayon::current_num_threads().max(1);
        let teams = (threads * TEAMS_PER_THREAD).min(nrows.max(1));
        nrows.div_ceil(teams).max(1)
    }
}
