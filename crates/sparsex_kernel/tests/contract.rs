mod utils;

use sparsex_core::{
    array::NDArray,
    device::Device,
    dtype::DType,
    error::{Error, ErrorKind, Result},
    op::{BinaryOp, ReduceOp, Target},
};
use sparsex_graph::{Adjacency, FormatSet, GraphQuery, SparseFormat, UnitGraph};
use sparsex_kernel::{sddmm, spmm, SpmmAux};
use utils::*;

fn u() -> Result<NDArray> {
    feature(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], DType::F32, &[3, 2])
}

fn sentinel_out() -> Result<NDArray> {
    filled(42.0, DType::F32, &[3, 2])
}

fn assert_untouched(out: &NDArray) -> Result<()> {
    assert_eq!(to_f32(out)?, vec![42.0; 6]);
    Ok(())
}

#[test]
fn non_contiguous_operand_is_rejected_before_writing() -> Result<()> {
    setup_logger();
    let graph = coo_graph(DType::I64)?;
    let transposed = feature(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], DType::F32, &[2, 3])?.transpose(0, 1);
    assert_eq!(transposed.shape(), &[3, 2]);
    assert!(!transposed.is_contiguous());

    let mut out = sentinel_out()?;
    let err = spmm(BinaryOp::CopyLhs, ReduceOp::Sum, &graph, Some(&transposed), None, &mut out, None).unwrap_err();
    match err {
        Error::NotContiguous { name } => assert_eq!(name, "U_data"),
        other => panic!("unexpected error {other}"),
    }
    assert_untouched(&out)?;

    let mut out = feature(vec![42.0; 10], DType::F32, &[2, 5])?.transpose(0, 1);
    let err = sddmm(BinaryOp::Add, &graph, Some(&u()?), Some(&u()?), &mut out, Target::Src, Target::Dst).unwrap_err();
    match err {
        Error::NotContiguous { name } => assert_eq!(name, "out"),
        other => panic!("unexpected error {other}"),
    }
    assert_eq!(out.to_vec::<f32>()?, vec![42.0; 10]);
    Ok(())
}

#[test]
fn context_mismatch_names_the_operand() -> Result<()> {
    let graph = coo_graph(DType::I32)?;
    let mut out = remote(&[3, 2], DType::F32)?;

    let err = spmm(BinaryOp::CopyLhs, ReduceOp::Sum, &graph, Some(&u()?), None, &mut out, None).unwrap_err();
    match err {
        Error::ContextMismatch { name, expected, got } => {
            assert_eq!(name, "out");
            assert_eq!(expected, Device::CPU);
            assert_eq!(got, Device::CUDA(0));
        },
        other => panic!("unexpected error {other}"),
    }
    Ok(())
}

#[test]
fn leading_dimension_follows_role() -> Result<()> {
    let graph = coo_graph(DType::I64)?;
    let e = feature(vec![1.0; 3], DType::F32, &[3, 1])?;
    let mut out = sentinel_out()?;

    let err = spmm(BinaryOp::Add, ReduceOp::Sum, &graph, Some(&u()?), Some(&e), &mut out, None).unwrap_err();
    match err {
        Error::ShapeMismatch { name, .. } => assert_eq!(name, "E_data"),
        other => panic!("unexpected error {other}"),
    }

    let flat = feature(vec![1.0; 3], DType::F32, &[3])?;
    let err = spmm(BinaryOp::CopyLhs, ReduceOp::Sum, &graph, Some(&flat), None, &mut out, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ShapeMismatch);
    assert_untouched(&out)?;
    Ok(())
}

#[test]
fn incompatible_broadcast_is_rejected() -> Result<()> {
    let graph = coo_graph(DType::I64)?;
    let a = feature(vec![1.0; 9], DType::F32, &[3, 3])?;
    let b = feature(vec![1.0; 25], DType::F32, &[5, 5])?;
    let mut out = sentinel_out()?;

    let err = spmm(BinaryOp::Add, ReduceOp::Sum, &graph, Some(&a), Some(&b), &mut out, None).unwrap_err();
    match err {
        Error::BroadcastIncompatible { lhs, rhs } => {
            assert_eq!(lhs, vec![3]);
            assert_eq!(rhs, vec![5]);
        },
        other => panic!("unexpected error {other}"),
    }
    assert_untouched(&out)?;
    Ok(())
}

#[test]
fn feature_dtypes_must_agree() -> Result<()> {
    let graph = coo_graph(DType::I64)?;
    let e = feature(vec![1.0; 5], DType::F64, &[5, 1])?;
    let mut out = sentinel_out()?;

    let err = spmm(BinaryOp::Mul, ReduceOp::Sum, &graph, Some(&u()?), Some(&e), &mut out, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DTypeMismatch);

    let mut ints = index(vec![0; 6], DType::I64, &[3, 2])?;
    let ints_u = index(vec![0; 6], DType::I64, &[3, 2])?;
    let err = spmm(BinaryOp::CopyLhs, ReduceOp::Sum, &graph, Some(&ints_u), None, &mut ints, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedDispatch);
    assert_untouched(&out)?;
    Ok(())
}

#[test]
fn auxiliary_buffers_follow_reduce_and_operator() -> Result<()> {
    let graph = coo_graph(DType::I64)?;
    let e = feature(vec![1.0; 5], DType::F32, &[5, 1])?;
    let mut out = sentinel_out()?;
    let mut arg_u = index(vec![0; 6], DType::I64, &[3, 2])?;
    let mut arg_e = index(vec![0; 6], DType::I64, &[3, 2])?;

    let err = spmm(BinaryOp::Add, ReduceOp::Max, &graph, Some(&u()?), Some(&e), &mut out, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let err = spmm(
        BinaryOp::Add,
        ReduceOp::Max,
        &graph,
        Some(&u()?),
        Some(&e),
        &mut out,
        Some(SpmmAux::new(Some(&mut arg_u), None)),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let err = spmm(
        BinaryOp::Add,
        ReduceOp::Sum,
        &graph,
        Some(&u()?),
        Some(&e),
        &mut out,
        Some(SpmmAux::new(Some(&mut arg_u), Some(&mut arg_e))),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let mut narrow = index(vec![0; 6], DType::I32, &[3, 2])?;
    let err = spmm(
        BinaryOp::CopyLhs,
        ReduceOp::Min,
        &graph,
        Some(&u()?),
        None,
        &mut out,
        Some(SpmmAux::new(Some(&mut narrow), None)),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DTypeMismatch);
    assert_untouched(&out)?;

    let err = spmm(BinaryOp::Add, ReduceOp::Sum, &graph, None, None, &mut out, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    Ok(())
}

/// Presents the wrapped graph as if it carried several edge relations.
struct Relations {
    inner: UnitGraph,
    count: usize,
}

impl GraphQuery for Relations {
    fn device(&self) -> Device {
        self.inner.device()
    }
    fn index_dtype(&self) -> DType {
        self.inner.index_dtype()
    }
    fn num_edge_types(&self) -> usize {
        self.count
    }
    fn num_src(&self) -> usize {
        self.inner.num_src()
    }
    fn num_dst(&self) -> usize {
        self.inner.num_dst()
    }
    fn num_edges(&self) -> usize {
        self.inner.num_edges()
    }
    fn created_formats(&self) -> FormatSet {
        self.inner.created_formats()
    }
    fn allowed_formats(&self) -> FormatSet {
        self.inner.allowed_formats()
    }
    fn adjacency(&self, format: SparseFormat) -> Result<Adjacency> {
        self.inner.adjacency(format)
    }
}

#[test]
fn single_edge_relation_is_required() -> Result<()> {
    let graph = Relations {
        inner: coo_graph(DType::I64)?,
        count: 2,
    };
    let mut out = sentinel_out()?;
    let err = spmm(BinaryOp::CopyLhs, ReduceOp::Sum, &graph, Some(&u()?), None, &mut out, None).unwrap_err();
    assert!(matches!(err, Error::MultipleEdgeTypes(2)));

    let mut edge_out = filled(0.0, DType::F32, &[5, 2])?;
    let err = sddmm(BinaryOp::CopyLhs, &graph, Some(&u()?), None, &mut edge_out, Target::Src, Target::Dst).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MultipleEdgeTypes);
    assert_untouched(&out)?;
    Ok(())
}
