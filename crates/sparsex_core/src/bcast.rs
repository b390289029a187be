//! Broadcast resolution over feature dimensions.
//!
//! Operand shapes carry a leading structural dimension (source count, edge count,
//! destination count, segment length) that never takes part in broadcasting. The
//! remaining feature dimensions are aligned from the right; a size of 1 stretches
//! to the other side's size. The resulting [`BcastOff`] is everything a kernel needs
//! to map a flat output feature index back to a flat index into each operand.

use crate::{
    error::{Error, Result},
    layout::Layout,
    op::BinaryOp,
};

/// How one output feature dimension relates to the two operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BcastDim {
    Matched,
    /// The left operand has size 1 here and is repeated.
    LhsBroadcast,
    /// The right operand has size 1 here and is repeated.
    RhsBroadcast,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BcastOff {
    /// `false` when both operands share one element layout and flat indices can be reused.
    pub use_bcast: bool,
    /// For each output feature element, the flat index into the lhs feature row
    /// (in units of `reduce_size`). Empty unless `use_bcast`.
    pub lhs_offset: Vec<usize>,
    pub rhs_offset: Vec<usize>,
    pub lhs_len: usize,
    pub rhs_len: usize,
    pub out_len: usize,
    /// Length of the trailing dimension folded by `dot`; 1 otherwise.
    pub reduce_size: usize,
    pub dims: Vec<BcastDim>,
    /// Output feature shape, without the leading structural dimension.
    pub out_shape: Vec<usize>,
}

impl BcastOff {
    /// Flat lhs index for output feature element `k`, scaled by `reduce_size`.
    #[inline(always)]
    pub fn lhs_index(&self, k: usize) -> usize {
        if self.use_bcast {
            self.lhs_offset[k] * self.reduce_size
        } else {
            k * self.reduce_size
        }
    }

    #[inline(always)]
    pub fn rhs_index(&self, k: usize) -> usize {
        if self.use_bcast {
            self.rhs_offset[k] * self.reduce_size
        } else {
            k * self.reduce_size
        }
    }

    /// Feature row length of the lhs operand in elements.
    pub fn lhs_row_len(&self) -> usize {
        self.lhs_len * self.reduce_size
    }

    pub fn rhs_row_len(&self) -> usize {
        self.rhs_len * self.reduce_size
    }

    fn copy(shape: &[usize]) -> Self {
        let len = Layout::compute_size(shape);
        Self {
            use_bcast: false,
            lhs_offset: vec![],
            rhs_offset: vec![],
            lhs_len: len,
            rhs_len: len,
            out_len: len,
            reduce_size: 1,
            dims: vec![BcastDim::Matched; shape.len()],
            out_shape: shape.to_vec(),
        }
    }
}

/// Computes the broadcast descriptor for `op` over two full operand shapes.
///
/// Copy operators only read one side; the other shape may be `None` and is ignored.
pub fn calc_bcast_off(op: BinaryOp, lhs: Option<&[usize]>, rhs: Option<&[usize]>) -> Result<BcastOff> {
    let feature = |shape: Option<&[usize]>, side: &str| -> Result<Vec<usize>> {
        match shape {
            Some(s) if !s.is_empty() => Ok(s[1..].to_vec()),
            Some(_) => Err(Error::shape_mismatch(side, "expected a leading structural dimension")),
            None => Err(Error::InvalidArgument(format!("operator {} requires the {} operand", op, side))),
        }
    };

    match op {
        BinaryOp::CopyLhs => {
            let mut off = BcastOff::copy(&feature(lhs, "lhs")?);
            off.rhs_len = 0;
            Ok(off)
        },
        BinaryOp::CopyRhs => {
            let mut off = BcastOff::copy(&feature(rhs, "rhs")?);
            off.lhs_len = 0;
            Ok(off)
        },
        _ => {
            let mut lf = feature(lhs, "lhs")?;
            let mut rf = feature(rhs, "rhs")?;
            let incompatible = || Error::BroadcastIncompatible {
                lhs: lhs.map(|s| s[1..].to_vec()).unwrap_or_default(),
                rhs: rhs.map(|s| s[1..].to_vec()).unwrap_or_default(),
            };

            let mut reduce_size = 1;
            if op == BinaryOp::Dot {
                match (lf.pop(), rf.pop()) {
                    (Some(l), Some(r)) if l == r => reduce_size = l,
                    _ => return Err(incompatible()),
                }
            }

            let ndim = lf.len().max(rf.len());
            let pad = |f: &[usize]| -> Vec<usize> {
                let mut padded = vec![1; ndim - f.len()];
                padded.extend_from_slice(f);
                padded
            };
            let pl = pad(&lf);
            let pr = pad(&rf);

            let mut out_shape = Vec::with_capacity(ndim);
            let mut dims = Vec::with_capacity(ndim);
            for (&l, &r) in pl.iter().zip(pr.iter()) {
                if l == r {
                    out_shape.push(l);
                    dims.push(BcastDim::Matched);
                } else if l == 1 {
                    out_shape.push(r);
                    dims.push(BcastDim::LhsBroadcast);
                } else if r == 1 {
                    out_shape.push(l);
                    dims.push(BcastDim::RhsBroadcast);
                } else {
                    return Err(incompatible());
                }
            }

            let use_bcast = pl != pr;
            let out_len = Layout::compute_size(&out_shape);
            let (lhs_offset, rhs_offset) = if use_bcast {
                let ls = Layout::compute_strides(&pl);
                let rs = Layout::compute_strides(&pr);
                let mut lhs_offset = Vec::with_capacity(out_len);
                let mut rhs_offset = Vec::with_capacity(out_len);
                for i in 0..out_len {
                    let mut rem = i;
                    let (mut lo, mut ro) = (0, 0);
                    for d in (0..ndim).rev() {
                        let coord = rem % out_shape[d];
                        rem /= out_shape[d];
                        if pl[d] != 1 {
                            lo += coord * ls[d];
                        }
                        if pr[d] != 1 {
                            ro += coord * rs[d];
                        }
                    }
                    lhs_offset.push(lo);
                    rhs_offset.push(ro);
                }
                (lhs_offset, rhs_offset)
            } else {
                (vec![], vec![])
            };

            if op == BinaryOp::Dot {
                out_shape.push(1);
                dims.push(BcastDim::Matched);
            }

            Ok(BcastOff {
                use_bcast,
                lhs_offset,
                rhs_offset,
                lhs_len: Layout::compute_size(&lf),
                rhs_len: Layout::compute_size(&rf),
                out_len,
                reduce_size,
                dims,
                out_shape,
            })
        },
    }
}
