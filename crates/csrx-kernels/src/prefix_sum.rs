//! In-place exclusive prefix sum turning per-row counts into CSR offsets
//
// Large inputs use a three-step chunked scan: per-chunk totals in parallel, a sequential scan of
// the (few) chunk totals, then an independent local scan per chunk seeded with its base.

use crate::config::TransformConfig;
use rayon::prelude::*;

fn scan_seq(v: &mut [i64], mut acc: i64) -> i64 {
    for x in v {
        let c = *x;
        *x = acc;
        acc += c;
    }
    acc
}

/// Exclusive prefix sum over `v`, where `v[..n]` are counts and `v[n]` is scratch.
///
/// Afterwards `v[k] = sum(counts[..k])` and `v[n]` holds the grand total, which is also
/// returned. An empty slice is left alone and yields 0.
pub fn exclusive_prefix_sum(v: &mut [i64]) -> i64 {
    exclusive_prefix_sum_with(&TransformConfig::default(), v)
}

pub fn exclusive_prefix_sum_with(cfg: &TransformConfig, v: &mut [i64]) -> i64 {
    let Some(last) = v.last_mut() else {
        return 0;
    };
    *last = 0;
    if v.len() < cfg.prefix_sum_parallel_min.max(2) {
        return scan_seq(v, 0);
    }
    let threads = rayon::current_num_threads().max(1);
    let chunk = v.len().div_ceil(threads * 4).max(1024);
    let mut bases: Vec<i64> = v.par_chunks(chunk).map(|c| c.iter().sum()).collect();
    scan_seq(&mut bases, 0);
    v.par_chunks_mut(chunk)
        .zip(bases.par_iter())
        .for_each(|(c, &base)| {
            scan_seq(c, base);
        });
    v[v.len() - 1]
}
