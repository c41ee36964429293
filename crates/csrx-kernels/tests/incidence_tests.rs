use csrx_core::{CsrGraph, Error};
use csrx_kernels::*;

fn triangle_graph() -> CsrGraph<i64> {
    CsrGraph::from_rows(3, &[vec![1i64, 2], vec![0, 2], vec![0, 1]]).unwrap()
}

fn sorted_slots(inc: &Incidence, v: usize) -> Vec<i64> {
    let s = usize::try_from(inc.rowmap[v]).unwrap();
    let e = usize::try_from(inc.rowmap[v + 1]).unwrap();
    let mut ids = inc.entries[s..e].to_vec();
    ids.sort_unstable();
    ids
}

#[test]
fn endpoints_from_lower_triangle() {
    let lower = lower_triangle(&triangle_graph(), None).unwrap();
    let inc = incidence_from_lower(&lower).unwrap();
    assert_eq!(inc.rowmap, vec![0i64, 2, 4, 6]);
    assert_eq!(inc.entries, vec![1i64, 0, 2, 0, 2, 1]);
}

#[test]
fn endpoints_with_single_row_teams() {
    let lower = CsrGraph::from_rows(4, &[vec![], vec![0i64], vec![], vec![0, 2]]).unwrap();
    let cfg = TransformConfig::default().with_team_rows(1);
    let inc = incidence_from_lower_with(&cfg, &lower).unwrap();
    assert_eq!(inc.entries, vec![1i64, 0, 3, 0, 3, 2]);
}

#[test]
fn edge_ids_land_at_both_endpoints() {
    let g = triangle_graph();
    let inc = incidence_from_original(&g, None, Triangle::Lower).unwrap();
    assert_eq!(inc.rowmap, g.indptr);
    // lower edges in row order: (1,0)=0, (2,0)=1, (2,1)=2
    assert_eq!(sorted_slots(&inc, 0), vec![0, 1]);
    assert_eq!(sorted_slots(&inc, 1), vec![0, 2]);
    assert_eq!(sorted_slots(&inc, 2), vec![1, 2]);
}

#[test]
fn every_edge_id_appears_twice() {
    let n = 30usize;
    let rows: Vec<Vec<i64>> = (0..n)
        .map(|i| {
            (0..n)
                .filter(|&j| i != j && (i + j) % 4 == 1)
                .map(|j| i64::try_from(j).unwrap())
                .collect()
        })
        .collect();
    let g = CsrGraph::from_rows(n, &rows).unwrap();
    let perm: Vec<i64> = (0..n).map(|v| i64::try_from((v * 7) % n).unwrap()).collect();
    for keep in [Triangle::Lower, Triangle::Upper] {
        let inc = incidence_from_original(&g, Some(&perm), keep).unwrap();
        let ne = g.nnz() / 2;
        let mut seen = vec![0usize; ne];
        for &id in &inc.entries {
            seen[usize::try_from(id).unwrap()] += 1;
        }
        assert!(seen.iter().all(|&c| c == 2));
    }
}

#[test]
fn asymmetric_graph_is_rejected() {
    let g = CsrGraph::from_rows(2, &[vec![1i64], vec![]]).unwrap();
    let err = incidence_from_original(&g, None, Triangle::Upper).unwrap_err();
    assert!(matches!(err, Error::CountMismatch { row: 1, .. }), "{err:?}");
    let err = incidence_from_original(&g, None, Triangle::Lower).unwrap_err();
    assert!(matches!(err, Error::CountMismatch { row: 0, .. }), "{err:?}");
}
