use crate::{
    check::{check_contiguous, check_ctx, check_dtype, check_offsets, Operand},
    dispatch::KernelRegistry,
};
use log::debug;
use sparsex_core::{
    array::NDArray,
    error::{Error, Result},
    id_type_switch,
    layout::Layout,
    op::ReduceOp,
};

/// A validated segment reduce request. `len` is the element count of one row.
pub struct SegmentReduceCall<'a> {
    pub reduce: ReduceOp,
    pub feat: &'a NDArray,
    pub offsets: &'a NDArray,
    pub out: &'a mut NDArray,
    pub arg: Option<&'a mut NDArray>,
    pub len: usize,
}

/// A validated backward segment compare request.
pub struct BackwardSegmentCmpCall<'a> {
    pub feat: &'a NDArray,
    pub arg: &'a NDArray,
    pub out: &'a mut NDArray,
    pub len: usize,
}

pub fn segment_reduce(
    reduce: ReduceOp,
    feat: &NDArray,
    offsets: &NDArray,
    out: &mut NDArray,
    arg: Option<&mut NDArray>,
) -> Result<()> {
    KernelRegistry::global().segment_reduce(reduce, feat, offsets, out, arg)
}

pub fn backward_segment_cmp(feat: &NDArray, arg: &NDArray, out: &mut NDArray) -> Result<()> {
    KernelRegistry::global().backward_segment_cmp(feat, arg, out)
}

fn row_shape<'a>(name: &str, array: &'a NDArray) -> Result<&'a [usize]> {
    match array.shape() {
        [] => Err(Error::shape_mismatch(name, "expected at least one dimension")),
        [_, rest @ ..] => Ok(rest),
    }
}

fn check_same_rows(name: &str, array: &NDArray, reference: &[usize]) -> Result<()> {
    let rows = row_shape(name, array)?;
    if rows != reference {
        return Err(Error::shape_mismatch(
            name,
            format!("expected row shape {:?}, got {:?}", reference, rows),
        ));
    }
    Ok(())
}

impl KernelRegistry {
    /// Reduces rows `offsets[i]..offsets[i + 1]` of `feat` into `out[i]`.
    ///
    /// For max and min, `arg` is required and receives the winning row of `feat`
    /// per element; the first row wins on ties. Empty segments produce 0 and
    /// record -1.
    pub fn segment_reduce(
        &self,
        reduce: ReduceOp,
        feat: &NDArray,
        offsets: &NDArray,
        out: &mut NDArray,
        arg: Option<&mut NDArray>,
    ) -> Result<()> {
        match (reduce.is_cmp(), arg.is_some()) {
            (true, false) => {
                return Err(Error::InvalidArgument(format!(
                    "reduce {} records argmin/argmax and needs arg",
                    reduce
                )))
            },
            (false, true) => return Err(Error::InvalidArgument(format!("reduce {} takes no arg", reduce))),
            _ => {},
        }

        {
            let operands = [
                Operand::new("feat", Some(feat)),
                Operand::new("offsets", Some(offsets)),
                Operand::new("out", Some(&*out)),
                Operand::new("arg", arg.as_deref()),
            ];
            check_ctx(feat.device(), &operands)?;
            check_contiguous(&operands)?;
            check_dtype(feat.dtype(), &operands[2..3])?;
            check_dtype(offsets.dtype(), &operands[3..])?;
        }

        if offsets.ndim() != 1 {
            return Err(Error::shape_mismatch(
                "offsets",
                format!("expected a 1-D array, got {:?}", offsets.shape()),
            ));
        }
        let rows = row_shape("feat", feat)?;
        check_same_rows("out", out, rows)?;
        let num_segments = offsets.size().saturating_sub(1);
        if out.shape()[0] != num_segments {
            return Err(Error::shape_mismatch(
                "out",
                format!("expected {} segments on the first dimension, got {}", num_segments, out.shape()[0]),
            ));
        }
        if let Some(arg) = arg.as_deref() {
            if arg.shape() != out.shape() {
                return Err(Error::shape_mismatch(
                    "arg",
                    format!("expected the shape of out {:?}, got {:?}", out.shape(), arg.shape()),
                ));
            }
        }

        let table = self.resolve("SegmentReduce", feat.device(), offsets.dtype(), feat.dtype())?;
        if offsets.device().is_host() {
            let total = feat.shape()[0];
            id_type_switch!(offsets.dtype(), I => { check_offsets(offsets.as_slice::<I>()?, total) })?;
        }
        let len = Layout::compute_size(rows);
        debug!("SegmentReduce {} over {} segments ({}, {})", reduce, num_segments, offsets.dtype(), feat.dtype());

        (table.segment_reduce)(SegmentReduceCall {
            reduce,
            feat,
            offsets,
            out,
            arg,
            len,
        })
    }

    /// Routes each gradient `feat[i, k]` to `out[arg[i, k], k]` and zeroes every
    /// other element of `out`. `out` has the shape of the reduced input.
    pub fn backward_segment_cmp(&self, feat: &NDArray, arg: &NDArray, out: &mut NDArray) -> Result<()> {
        {
            let operands = [
                Operand::new("feat", Some(feat)),
                Operand::new("arg", Some(arg)),
                Operand::new("out", Some(&*out)),
            ];
            check_ctx(feat.device(), &operands)?;
            check_contiguous(&operands)?;
            check_dtype(feat.dtype(), &operands[2..])?;
        }
        if arg.shape() != feat.shape() {
            return Err(Error::shape_mismatch(
                "arg",
                format!("expected the shape of feat {:?}, got {:?}", feat.shape(), arg.shape()),
            ));
        }
        let rows = row_shape("feat", feat)?;
        check_same_rows("out", out, rows)?;

        let table = self.resolve("BackwardSegmentCmp", feat.device(), arg.dtype(), feat.dtype())?;
        let len = Layout::compute_size(rows);
        debug!("BackwardSegmentCmp into {:?} ({}, {})", out.shape(), arg.dtype(), feat.dtype());

        (table.backward_segment_cmp)(BackwardSegmentCmpCall { feat, arg, out, len })
    }
}
