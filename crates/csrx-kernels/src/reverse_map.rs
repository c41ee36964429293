//! Reverse (inverted) index of a forward map
//
// forward[i] = b maps every forward element i to a bucket b in [0, num_buckets). The reverse map
// lists, per bucket, every i mapped to it, in CSR form. It is the transpose of the forward map
// viewed as a one-entry-per-row graph, and it is built with the same count / offset / fill
// discipline.
//
// With few buckets, thousands of workers would hammer the same handful of cursors. The
// scaled-bucket strategy splits each real bucket into 2^shift synthetic buckets keyed by which
// chunk of the forward range an element comes from, so contending writers mostly hit
// different cursors. Real offsets are every 2^shift-th synthetic offset.

use crate::config::TransformConfig;
use crate::prefix_sum::exclusive_prefix_sum_with;
use crate::utility::util::{
    atomic_counters, checked_index, cursors_from, first_unreconciled, i64_to_usize, into_counts,
    ticket, try_filled, try_with_capacity, usize_to_i64, ScatterPtr,
};
use csrx_core::{Error, Result};
use rayon::prelude::*;
use std::sync::atomic::{AtomicI64, Ordering};
use tracing::{debug, warn};

/// How the fill phase spreads its atomic traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReverseMapStrategy {
    /// One cursor per bucket.
    Atomic,
    /// `1 << scale_shift` cursors per bucket.
    ScaledBucket { scale_shift: u32 },
}

impl ReverseMapStrategy {
    /// Scaled buckets below the configured threshold, plain atomics otherwise.
    #[must_use]
    pub const fn select(num_buckets: usize, cfg: &TransformConfig) -> Self {
        if num_buckets < cfg.reverse_map_atomic_threshold {
            Self::ScaledBucket {
                scale_shift: cfg.reverse_map_scale_shift,
            }
        } else {
            Self::Atomic
        }
    }
}

/// Bucket -> forward elements, CSR shaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReverseMap {
    /// `num_buckets + 1` offsets into `entries`
    pub offsets: Vec<i64>,
    /// Forward indices grouped by bucket; order inside a bucket is unspecified
    pub entries: Vec<i64>,
}

impl ReverseMap {
    #[must_use]
    pub fn num_buckets(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    #[must_use]
    pub fn bucket(&self, b: usize) -> &[i64] {
        &self.entries[i64_to_usize(self.offsets[b])..i64_to_usize(self.offsets[b + 1])]
    }

    /// Rebuild the forward map this reverse map was made from.
    #[must_use]
    pub fn to_forward(&self) -> Vec<i64> {
        let mut forward = vec![0i64; self.entries.len()];
        for b in 0..self.num_buckets() {
            for &i in self.bucket(b) {
                forward[i64_to_usize(i)] = usize_to_i64(b);
            }
        }
        forward
    }
}

/// Forward element -> (possibly synthetic) bucket id.
trait BucketKey: Sync {
    fn key(&self, i: usize, bucket: usize) -> usize;
}

struct Direct;

impl BucketKey for Direct {
    #[inline]
    fn key(&self, _i: usize, bucket: usize) -> usize {
        bucket
    }
}

struct Scaled {
    scale_shift: u32,
    chunk_shift: u32,
}

impl BucketKey for Scaled {
    #[inline]
    fn key(&self, i: usize, bucket: usize) -> usize {
        (bucket << self.scale_shift) + (i >> self.chunk_shift)
    }
}

impl Scaled {
    /// Smallest chunk shift that keeps every chunk id of `num_forward` elements below
    /// `1 << scale_shift`.
    fn new(num_forward: usize, scale_shift: u32) -> Self {
        let per_chunk = num_forward.div_ceil(1usize << scale_shift).max(1);
        Self {
            scale_shift,
            chunk_shift: per_chunk.next_power_of_two().trailing_zeros(),
        }
    }
}

fn count_phase<K: BucketKey>(
    forward: &[i64],
    num_buckets: usize,
    keys: &K,
    counts: &[AtomicI64],
) -> Result<()> {
    forward.par_iter().enumerate().try_for_each(|(i, &b)| {
        let Some(bucket) = checked_index(b, num_buckets) else {
            return Err(Error::IndexOutOfBounds {
                index: b,
                bound: num_buckets,
            });
        };
        counts[keys.key(i, bucket)].fetch_add(1, Ordering::Relaxed);
        Ok(())
    })
}

fn fill_phase<K: BucketKey>(
    forward: &[i64],
    keys: &K,
    cursors: &[AtomicI64],
    entries: ScatterPtr<i64>,
) {
    forward.par_iter().enumerate().for_each(|(i, &b)| {
        let pos = ticket(&cursors[keys.key(i, i64_to_usize(b))]);
        // SAFETY: counts were taken over the same keys, so each ticket is a distinct slot.
        unsafe { entries.write(pos, usize_to_i64(i)) };
    });
}

/// Shared fill + reconciliation over `num_keys` (possibly synthetic) keys whose offsets are
/// `key_offsets`. Returns the entries.
fn fill_entries<K: BucketKey>(
    forward: &[i64],
    keys: &K,
    key_offsets: &[i64],
) -> Result<Vec<i64>> {
    let num_keys = key_offsets.len() - 1;
    let cursors = cursors_from(&key_offsets[..num_keys])?;
    let mut entries: Vec<i64> = try_with_capacity(forward.len())?;
    fill_phase(forward, keys, &cursors, ScatterPtr::new(&mut entries));
    if let Some((row, counted, written)) = first_unreconciled(&cursors, key_offsets) {
        warn!(row, counted, written, "reverse map fill drifted from its count");
        return Err(Error::CountMismatch {
            row,
            counted,
            written,
        });
    }
    // SAFETY: all cursors reached their end offsets and the last offset is forward.len().
    unsafe { entries.set_len(forward.len()) };
    Ok(entries)
}

fn build_atomic(forward: &[i64], num_buckets: usize, cfg: &TransformConfig) -> Result<ReverseMap> {
    let counts = atomic_counters(num_buckets + 1)?;
    count_phase(forward, num_buckets, &Direct, &counts)?;
    let mut offsets = into_counts(counts);
    exclusive_prefix_sum_with(cfg, &mut offsets);
    let entries = fill_entries(forward, &Direct, &offsets)?;
    Ok(ReverseMap { offsets, entries })
}

fn build_scaled(
    forward: &[i64],
    num_buckets: usize,
    scale_shift: u32,
    cfg: &TransformConfig,
) -> Result<ReverseMap> {
    let scale = 1usize
        .checked_shl(scale_shift)
        .ok_or_else(|| Error::InvalidArgument {
            arg: "scale_shift",
            reason: format!("shift {scale_shift} too large"),
        })?;
    let tmp_size = num_buckets
        .checked_mul(scale)
        .ok_or_else(|| Error::InvalidArgument {
            arg: "num_buckets",
            reason: format!("{num_buckets} buckets x {scale} slots overflows"),
        })?;
    let keys = Scaled::new(forward.len(), scale_shift);
    debug!(tmp_size, chunk_shift = keys.chunk_shift, "reverse map synthetic buckets");

    let counts = atomic_counters(tmp_size + 1)?;
    count_phase(forward, num_buckets, &keys, &counts)?;
    let mut tmp_offsets = into_counts(counts);
    exclusive_prefix_sum_with(cfg, &mut tmp_offsets);

    // Strided gather: the real bucket b starts where its first synthetic bucket starts.
    let mut offsets = try_filled(num_buckets + 1, 0i64)?;
    offsets
        .par_iter_mut()
        .enumerate()
        .for_each(|(b, o)| *o = tmp_offsets[b * scale]);

    let entries = fill_entries(forward, &keys, &tmp_offsets)?;
    Ok(ReverseMap { offsets, entries })
}

/// Reverse map of `forward`, choosing the strategy from the default configuration.
pub fn build_reverse_map(
    num_forward: usize,
    num_buckets: usize,
    forward: &[i64],
) -> Result<ReverseMap> {
    build_reverse_map_with(&TransformConfig::default(), num_forward, num_buckets, forward)
}

pub fn build_reverse_map_with(
    cfg: &TransformConfig,
    num_forward: usize,
    num_buckets: usize,
    forward: &[i64],
) -> Result<ReverseMap> {
    let strategy = ReverseMapStrategy::select(num_buckets, cfg);
    build_reverse_map_using(cfg, strategy, num_forward, num_buckets, forward)
}

/// Reverse map with an explicit strategy. Both strategies give the same bucket contents.
pub fn build_reverse_map_using(
    cfg: &TransformConfig,
    strategy: ReverseMapStrategy,
    num_forward: usize,
    num_buckets: usize,
    forward: &[i64],
) -> Result<ReverseMap> {
    if forward.len() != num_forward {
        return Err(Error::InvalidArgument {
            arg: "forward",
            reason: format!("length {} but num_forward is {num_forward}", forward.len()),
        });
    }
    debug!(num_forward, num_buckets, ?strategy, "reverse map");
    match strategy {
        ReverseMapStrategy::Atomic => build_atomic(forward, num_buckets, cfg),
        ReverseMapStrategy::ScaledBucket { scale_shift } => {
            build_scaled(forward, num_buckets, scale_shift, cfg)
        }
    }
}
