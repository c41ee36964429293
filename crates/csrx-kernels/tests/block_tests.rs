use csrx_core::{Csr, Error};
use csrx_kernels::*;

fn sample() -> Csr<f64, i64> {
    // 3x3: [[1,0,0],[0,0,2],[0,3,0]]
    Csr::from_parts(3, 3, vec![0i64, 1, 2, 3], vec![0i64, 2, 1], vec![1.0, 2.0, 3.0], true)
        .unwrap()
}

#[test]
fn formatting_pads_and_densifies_blocks() {
    let f = block_format_point_csr(2, &sample()).unwrap();
    assert_eq!(f.shape(), (4, 4));
    // block row 0 touches blocks 0 and 1; block row 1 touches block 0 and its padding diagonal
    assert_eq!(f.indptr, vec![0i64, 4, 8, 12, 16]);
    assert_eq!(f.row(0).0, &[0i64, 1, 2, 3][..]);
    assert_eq!(f.row(0).1, &[1.0, 0.0, 0.0, 0.0][..]);
    assert_eq!(f.row(1).1, &[0.0, 0.0, 2.0, 0.0][..]);
    assert_eq!(f.row(2).1, &[0.0, 3.0, 0.0, 0.0][..]);
    assert_eq!(f.row(3).1, &[0.0, 0.0, 0.0, 1.0][..]);
}

#[test]
fn block_compression_keeps_every_value() {
    let f = block_format_point_csr(2, &sample()).unwrap();
    let b = block_csr_from_formatted(2, &f).unwrap();
    assert_eq!((b.nrows, b.ncols), (2, 2));
    assert_eq!(b.point_shape(), (4, 4));
    assert_eq!(b.indptr, vec![0i64, 2, 4]);
    assert_eq!(b.indices, vec![0i64, 1, 0, 1]);
    assert_eq!(b.nnz_blocks(), 4);
    assert_eq!(b.data, f.data);
    assert_eq!(b.point(0, 0), Some(1.0));
    assert_eq!(b.point(1, 2), Some(2.0));
    assert_eq!(b.point(2, 1), Some(3.0));
    assert_eq!(b.point(3, 3), Some(1.0));
    assert_eq!(b.point(3, 0), Some(0.0));
}

#[test]
fn untouched_blocks_are_not_stored() {
    // 4x4 with a single entry in the top-left block
    let a = Csr::from_parts(4, 4, vec![0i64, 1, 1, 1, 1], vec![1i64], vec![5i32], true).unwrap();
    let f = block_format_point_csr(2, &a).unwrap();
    assert_eq!(f.indptr, vec![0i64, 2, 4, 4, 4]);
    let b = block_csr_from_formatted(2, &f).unwrap();
    assert_eq!(b.indptr, vec![0i64, 1, 1]);
    assert_eq!(b.point(0, 1), Some(5));
    assert_eq!(b.point(2, 2), None);
}

#[test]
fn block_size_one_is_identity_on_sorted_input() {
    let a = sample();
    let f = block_format_point_csr(1, &a).unwrap();
    assert_eq!(f, a);
}

#[test]
fn zero_block_size_is_rejected() {
    let err = block_format_point_csr(0, &sample()).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { arg: "block", .. }));
}

#[test]
fn compression_rejects_unformatted_input() {
    // row 0 spans three columns but starts two blocks
    let f = Csr::from_parts(
        2,
        4,
        vec![0i64, 3, 6],
        vec![0i64, 2, 3, 0, 1, 3],
        vec![1i32; 6],
        true,
    )
    .unwrap();
    let err = block_csr_from_formatted(2, &f).unwrap_err();
    assert!(matches!(err, Error::CountMismatch { row: 0, .. }), "{err:?}");
}

#[test]
fn point_lookup_on_zero_block_size_finds_nothing() {
    let b = BlockCsr {
        block_size: 0,
        nrows: 1,
        ncols: 1,
        indptr: vec![0i64, 1],
        indices: vec![0i64],
        data: vec![1.0f64],
    };
    assert_eq!(b.point(0, 0), None);
    assert_eq!(b.point(3, 2), None);
}
