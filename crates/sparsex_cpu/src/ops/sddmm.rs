use crate::{
    sparse::{CooView, CsrView},
    utils::{combine, feature_row},
};
use rayon::prelude::*;
use sparsex_core::{
    bcast::BcastOff,
    op::{BinaryOp, Target},
    scalar::{FloatType, IndexType},
};

/// Operands of one SDDMM call on the host. `out` rows are indexed by edge id.
pub struct SddmmArgs<'a, T: FloatType> {
    pub op: BinaryOp,
    pub bcast: &'a BcastOff,
    pub lhs: Option<&'a [T]>,
    pub rhs: Option<&'a [T]>,
    pub out: &'a mut [T],
    pub lhs_target: Target,
    pub rhs_target: Target,
}

#[inline(always)]
fn select(target: Target, src: usize, eid: usize, dst: usize) -> usize {
    match target {
        Target::Src => src,
        Target::Edge => eid,
        Target::Dst => dst,
    }
}

/// Position of every edge id inside the adjacency arrays.
fn edge_positions<I: IndexType>(data: Option<&[I]>, nnz: usize) -> Option<Vec<usize>> {
    data.map(|data| {
        let mut pos = vec![0usize; nnz];
        for (p, eid) in data.iter().enumerate() {
            pos[eid.to_usize()] = p;
        }
        pos
    })
}

fn sddmm_rows<T: FloatType, F>(args: SddmmArgs<'_, T>, endpoints: F)
where
    F: Fn(usize) -> (usize, usize) + Sync,
{
    let SddmmArgs {
        op,
        bcast,
        lhs,
        rhs,
        out,
        lhs_target,
        rhs_target,
    } = args;
    let len = bcast.out_len;
    if len == 0 {
        return;
    }
    let lhs_len = bcast.lhs_row_len();
    let rhs_len = bcast.rhs_row_len();

    out.par_chunks_mut(len).enumerate().for_each(|(eid, out_row)| {
        let (src, dst) = endpoints(eid);
        let l = feature_row(lhs, select(lhs_target, src, eid, dst), lhs_len);
        let r = feature_row(rhs, select(rhs_target, src, eid, dst), rhs_len);
        for (k, o) in out_row.iter_mut().enumerate() {
            *o = combine(op, bcast, l, r, k);
        }
    });
}

/// SDDMM over an adjacency compressed by source: row `r` lists the outgoing edges
/// of source `r`, with destination ids in `indices`.
///
/// Output rows are produced in parallel per edge id.
pub fn sddmm_csr<I: IndexType, T: FloatType>(csr: CsrView<'_, I>, args: SddmmArgs<'_, T>) {
    let nnz = csr.nnz();
    let mut row_of = vec![0usize; nnz];
    for r in 0..csr.num_rows {
        let start = csr.indptr[r].to_usize();
        let end = csr.indptr[r + 1].to_usize();
        row_of[start..end].fill(r);
    }
    let positions = edge_positions(csr.data, nnz);

    sddmm_rows(args, |eid| {
        let pos = positions.as_ref().map_or(eid, |p| p[eid]);
        (row_of[pos], csr.indices[pos].to_usize())
    });
}

/// SDDMM over a coordinate list.
pub fn sddmm_coo<I: IndexType, T: FloatType>(coo: CooView<'_, I>, args: SddmmArgs<'_, T>) {
    let positions = edge_positions(coo.data, coo.nnz());

    sddmm_rows(args, |eid| {
        let pos = positions.as_ref().map_or(eid, |p| p[eid]);
        (coo.row[pos].to_usize(), coo.col[pos].to_usize())
    });
}
