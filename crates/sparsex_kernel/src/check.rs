//! Operand contract checks shared by every entry point.
//!
//! All checks skip absent operands and fail on the first violation.

use sparsex_core::{
    array::NDArray,
    device::Device,
    dtype::DType,
    error::{Error, Result},
    op::Target,
    scalar::IndexType,
};

/// A named, possibly absent, operand.
#[derive(Clone, Copy)]
pub struct Operand<'a> {
    pub name: &'a str,
    pub array: Option<&'a NDArray>,
}

impl<'a> Operand<'a> {
    pub fn new(name: &'a str, array: Option<&'a NDArray>) -> Self {
        Self { name, array }
    }

    fn present(operands: &'a [Operand<'a>]) -> impl Iterator<Item = (&'a str, &'a NDArray)> + 'a {
        operands.iter().filter_map(|o| o.array.map(|a| (o.name, a)))
    }
}

/// Structural entity counts of a single-relation graph, indexed by [`Target`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphDims {
    pub num_src: usize,
    pub num_edges: usize,
    pub num_dst: usize,
}

impl GraphDims {
    pub fn count(&self, role: Target) -> usize {
        match role {
            Target::Src => self.num_src,
            Target::Edge => self.num_edges,
            Target::Dst => self.num_dst,
        }
    }
}

pub fn check_ctx(ctx: Device, operands: &[Operand<'_>]) -> Result<()> {
    for (name, array) in Operand::present(operands) {
        if array.device() != ctx {
            return Err(Error::ContextMismatch {
                name: name.to_string(),
                expected: ctx,
                got: array.device(),
            });
        }
    }
    Ok(())
}

pub fn check_contiguous(operands: &[Operand<'_>]) -> Result<()> {
    for (name, array) in Operand::present(operands) {
        if !array.is_contiguous() {
            return Err(Error::NotContiguous { name: name.to_string() });
        }
    }
    Ok(())
}

/// Every operand needs at least two dimensions, and its leading dimension must
/// equal the count for its role. Scalar features carry a trailing dimension of 1.
pub fn check_shape(dims: &GraphDims, roles: &[Target], operands: &[Operand<'_>]) -> Result<()> {
    for (operand, role) in operands.iter().zip(roles) {
        let Some(array) = operand.array else { continue };
        if array.ndim() < 2 {
            return Err(Error::shape_mismatch(
                operand.name,
                format!(
                    "expected ndim >= 2, got {}; scalar features need an extra dimension of length one",
                    array.ndim()
                ),
            ));
        }
        let expected = dims.count(*role);
        if array.shape()[0] != expected {
            return Err(Error::shape_mismatch(
                operand.name,
                format!(
                    "expected size {} on the first dimension ({} count), got {}",
                    expected,
                    role,
                    array.shape()[0]
                ),
            ));
        }
    }
    Ok(())
}

pub fn check_dtype(expected: DType, operands: &[Operand<'_>]) -> Result<()> {
    for (name, array) in Operand::present(operands) {
        if array.dtype() != expected {
            return Err(Error::DTypeMismatch {
                name: name.to_string(),
                expected,
                got: array.dtype(),
            });
        }
    }
    Ok(())
}

/// Segment boundaries: starts at 0, never decreases, ends at `total`.
pub fn check_offsets<I: IndexType>(offsets: &[I], total: usize) -> Result<()> {
    let (Some(first), Some(last)) = (offsets.first(), offsets.last()) else {
        return Err(Error::InvalidOffsets("offsets must hold at least one entry".into()));
    };
    if first.to_i64() != 0 {
        return Err(Error::InvalidOffsets(format!("first offset must be 0, got {}", first.to_i64())));
    }
    if let Some(w) = offsets.windows(2).find(|w| w[1] < w[0]) {
        return Err(Error::InvalidOffsets(format!(
            "offsets decrease from {} to {}",
            w[0].to_i64(),
            w[1].to_i64()
        )));
    }
    if last.to_i64() != total as i64 {
        return Err(Error::InvalidOffsets(format!(
            "last offset must equal the feature length {}, got {}",
            total,
            last.to_i64()
        )));
    }
    Ok(())
}
