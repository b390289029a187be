//! Host kernel table: unpacks the call structs into typed slices and adjacency
//! views and runs the `sparsex_cpu` kernels.

use crate::{
    dispatch::KernelTable,
    sddmm::SddmmCall,
    segment::{BackwardSegmentCmpCall, SegmentReduceCall},
    spmm::SpmmCall,
};
use sparsex_core::{
    array::NDArray,
    error::{Error, Result},
    scalar::{FloatType, IndexType},
};
use sparsex_cpu::{
    ops::{
        sddmm::{self as cpu_sddmm, SddmmArgs},
        segment as cpu_segment,
        spmm::{self as cpu_spmm, SpmmArgs},
    },
    sparse::{CooView, CsrView},
};
use sparsex_graph::{Adjacency, CooMatrix, CsrMatrix};

pub(crate) fn table<I: IndexType, T: FloatType>() -> KernelTable {
    KernelTable {
        spmm_csc: spmm_csc::<I, T>,
        spmm_coo: spmm_coo::<I, T>,
        sddmm_csr: sddmm_csr::<I, T>,
        sddmm_coo: sddmm_coo::<I, T>,
        segment_reduce: segment_reduce::<I, T>,
        backward_segment_cmp: backward_segment_cmp::<I, T>,
    }
}

fn csr_view<I: IndexType>(m: &CsrMatrix) -> Result<CsrView<'_, I>> {
    Ok(CsrView {
        num_rows: m.num_rows,
        num_cols: m.num_cols,
        indptr: m.indptr.as_slice()?,
        indices: m.indices.as_slice()?,
        data: m.data.as_ref().map(NDArray::as_slice).transpose()?,
    })
}

fn coo_view<I: IndexType>(m: &CooMatrix) -> Result<CooView<'_, I>> {
    Ok(CooView {
        num_rows: m.num_rows,
        num_cols: m.num_cols,
        row: m.row.as_slice()?,
        col: m.col.as_slice()?,
        data: m.data.as_ref().map(NDArray::as_slice).transpose()?,
    })
}

fn optional<T: FloatType>(array: Option<&NDArray>) -> Result<Option<&[T]>> {
    array.map(NDArray::as_slice).transpose()
}

fn optional_mut<I: IndexType>(array: Option<&mut NDArray>) -> Result<Option<&mut [I]>> {
    array.map(NDArray::as_mut_slice).transpose()
}

fn wrong_format(op: &'static str, adjacency: &Adjacency, expected: &str) -> Error {
    Error::UnsupportedFormat {
        op,
        allowed: format!("{} (got {})", expected, adjacency.format()),
    }
}

fn spmm_args<'a, I: IndexType, T: FloatType>(call: SpmmCall<'a>) -> Result<SpmmArgs<'a, I, T>> {
    Ok(SpmmArgs {
        op: call.op,
        reduce: call.reduce,
        bcast: call.bcast,
        ufeat: optional(call.ufeat)?,
        efeat: optional(call.efeat)?,
        out: call.out.as_mut_slice()?,
        arg_u: optional_mut(call.arg_u)?,
        arg_e: optional_mut(call.arg_e)?,
    })
}

fn spmm_csc<I: IndexType, T: FloatType>(call: SpmmCall<'_>) -> Result<()> {
    let adjacency = call.adjacency;
    let Adjacency::Csc(csc) = adjacency else {
        return Err(wrong_format("SpMM", adjacency, "CSC"));
    };
    let view = csr_view::<I>(csc)?;
    cpu_spmm::spmm_csr(view, spmm_args::<I, T>(call)?);
    Ok(())
}

fn spmm_coo<I: IndexType, T: FloatType>(call: SpmmCall<'_>) -> Result<()> {
    let adjacency = call.adjacency;
    let Adjacency::Coo(coo) = adjacency else {
        return Err(wrong_format("SpMM", adjacency, "COO"));
    };
    let view = coo_view::<I>(coo)?;
    cpu_spmm::spmm_coo(view, spmm_args::<I, T>(call)?);
    Ok(())
}

fn sddmm_args<'a, T: FloatType>(call: SddmmCall<'a>) -> Result<SddmmArgs<'a, T>> {
    Ok(SddmmArgs {
        op: call.op,
        bcast: call.bcast,
        lhs: optional(call.lhs)?,
        rhs: optional(call.rhs)?,
        out: call.out.as_mut_slice()?,
        lhs_target: call.lhs_target,
        rhs_target: call.rhs_target,
    })
}

fn sddmm_csr<I: IndexType, T: FloatType>(call: SddmmCall<'_>) -> Result<()> {
    let adjacency = call.adjacency;
    let Adjacency::Csr(csr) = adjacency else {
        return Err(wrong_format("SDDMM", adjacency, "CSR"));
    };
    let view = csr_view::<I>(csr)?;
    cpu_sddmm::sddmm_csr(view, sddmm_args::<T>(call)?);
    Ok(())
}

fn sddmm_coo<I: IndexType, T: FloatType>(call: SddmmCall<'_>) -> Result<()> {
    let adjacency = call.adjacency;
    let Adjacency::Coo(coo) = adjacency else {
        return Err(wrong_format("SDDMM", adjacency, "COO"));
    };
    let view = coo_view::<I>(coo)?;
    cpu_sddmm::sddmm_coo(view, sddmm_args::<T>(call)?);
    Ok(())
}

fn segment_reduce<I: IndexType, T: FloatType>(call: SegmentReduceCall<'_>) -> Result<()> {
    let feat = call.feat.as_slice::<T>()?;
    let offsets = call.offsets.as_slice::<I>()?;
    let arg = optional_mut::<I>(call.arg)?;
    cpu_segment::segment_reduce(call.reduce, feat, offsets, call.len, call.out.as_mut_slice::<T>()?, arg);
    Ok(())
}

fn backward_segment_cmp<I: IndexType, T: FloatType>(call: BackwardSegmentCmpCall<'_>) -> Result<()> {
    let feat = call.feat.as_slice::<T>()?;
    let arg = call.arg.as_slice::<I>()?;
    cpu_segment::backward_segment_cmp(feat, arg, call.len, call.out.as_mut_slice::<T>()?)
}
