use csrx_core::CsrGraph;
use csrx_kernels::*;
use proptest::prelude::*;

/// Random graph: `(nrows, ncols, rows)` with columns in range, duplicates allowed.
fn arb_graph() -> impl Strategy<Value = CsrGraph<i64>> {
    (0usize..40, 1usize..40).prop_flat_map(|(nrows, ncols)| {
        let col = 0..i64::try_from(ncols).unwrap();
        prop::collection::vec(prop::collection::vec(col, 0..8), nrows)
            .prop_map(move |rows| CsrGraph::from_rows(ncols, &rows).unwrap())
    })
}

/// Random square symmetric graph without self-loops, plus a permutation of its vertices.
fn arb_symmetric() -> impl Strategy<Value = (CsrGraph<i64>, Vec<i64>)> {
    (1usize..30).prop_flat_map(|n| {
        let pairs = prop::collection::btree_set((0..n, 0..n), 0..60);
        let perm = Just((0..n).map(|v| i64::try_from(v).unwrap()).collect::<Vec<_>>()).prop_shuffle();
        (pairs, perm).prop_map(move |(pairs, perm)| {
            let mut rows = vec![Vec::new(); n];
            for (a, b) in pairs {
                if a < b {
                    rows[a].push(i64::try_from(b).unwrap());
                    rows[b].push(i64::try_from(a).unwrap());
                }
            }
            (CsrGraph::from_rows(n, &rows).unwrap(), perm)
        })
    })
}

fn sorted_edges(g: &CsrGraph<i64>) -> Vec<(i64, i64)> {
    let mut e: Vec<(i64, i64)> = (0..g.nrows)
        .flat_map(|i| g.row(i).iter().map(move |&j| (i64::try_from(i).unwrap(), j)))
        .collect();
    e.sort_unstable();
    e
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn transpose_conserves_edges(g in arb_graph(), team in 1usize..6) {
        let cfg = TransformConfig::default().with_team_rows(team);
        let t = transpose_graph_with(&cfg, &g).unwrap();
        prop_assert_eq!(t.shape(), (g.ncols, g.nrows));
        prop_assert_eq!(t.nnz(), g.nnz());
        let mut flipped: Vec<(i64, i64)> = sorted_edges(&t).into_iter().map(|(a, b)| (b, a)).collect();
        flipped.sort_unstable();
        prop_assert_eq!(flipped, sorted_edges(&g));
    }

    #[test]
    fn double_transpose_is_identity_up_to_row_order(g in arb_graph()) {
        let tt = transpose_graph(&transpose_graph(&g).unwrap()).unwrap();
        prop_assert_eq!(tt.shape(), g.shape());
        prop_assert_eq!(&tt.indptr, &g.indptr);
        prop_assert_eq!(sorted_edges(&tt), sorted_edges(&g));
    }

    #[test]
    fn reverse_map_reconstructs_forward(
        (buckets, forward) in (1usize..300).prop_flat_map(|b| {
            (Just(b), prop::collection::vec(0..i64::try_from(b).unwrap(), 0..2000))
        }),
        shift in 0u32..11,
    ) {
        let cfg = TransformConfig::default();
        let n = forward.len();
        let atomic = build_reverse_map_using(&cfg, ReverseMapStrategy::Atomic, n, buckets, &forward).unwrap();
        let scaled = build_reverse_map_using(
            &cfg,
            ReverseMapStrategy::ScaledBucket { scale_shift: shift },
            n,
            buckets,
            &forward,
        )
        .unwrap();
        prop_assert_eq!(atomic.to_forward(), forward.clone());
        prop_assert_eq!(scaled.to_forward(), forward);
        prop_assert_eq!(atomic.offsets, scaled.offsets);
    }

    #[test]
    fn triangles_cover_every_off_diagonal_edge((g, perm) in arb_symmetric(), use_perm in any::<bool>()) {
        let perm = use_perm.then_some(perm.as_slice());
        let lower = lower_triangle(&g, perm).unwrap();
        let upper = upper_triangle(&g, perm).unwrap();
        prop_assert_eq!(lower.nnz() + upper.nnz(), g.nnz());
        prop_assert_eq!(lower.nnz(), upper.nnz());
        let mut both = sorted_edges(&lower);
        both.extend(sorted_edges(&upper));
        both.sort_unstable();
        prop_assert_eq!(both, sorted_edges(&g));
    }

    #[test]
    fn incidence_matches_lower_edge_count((g, perm) in arb_symmetric()) {
        let inc = incidence_from_original(&g, Some(&perm), Triangle::Lower).unwrap();
        let lower = lower_triangle(&g, Some(&perm)).unwrap();
        let mut ids = inc.entries.clone();
        ids.sort_unstable();
        let expected: Vec<i64> = (0..i64::try_from(lower.nnz()).unwrap()).flat_map(|e| [e, e]).collect();
        prop_assert_eq!(ids, expected);
    }

    #[test]
    fn degree_sorts_are_permutations(g in arb_graph()) {
        for order in [DegreeOrder::Increasing, DegreeOrder::Decreasing, DegreeOrder::ZigZag] {
            let s = sort_rows_by_degree_sequential(g.nrows, &g.indptr, order).unwrap();
            let p = sort_rows_by_degree_parallel(g.nrows, &g.indptr, order).unwrap();
            let mut ranks = s.clone();
            ranks.sort_unstable();
            prop_assert_eq!(ranks, (0..i64::try_from(g.nrows).unwrap()).collect::<Vec<_>>());
            prop_assert_eq!(s, p);
        }
    }

    #[test]
    fn prefix_sum_paths_agree(counts in prop::collection::vec(0i64..50, 0..5000)) {
        let mut seq = counts.clone();
        seq.push(0);
        let mut par = seq.clone();
        let ts = exclusive_prefix_sum_with(&TransformConfig::default().with_prefix_sum_parallel_min(usize::MAX), &mut seq);
        let tp = exclusive_prefix_sum_with(&TransformConfig::default().with_prefix_sum_parallel_min(0), &mut par);
        prop_assert_eq!(ts, counts.iter().sum::<i64>());
        prop_assert_eq!(ts, tp);
        prop_assert_eq!(seq, par);
    }
}
