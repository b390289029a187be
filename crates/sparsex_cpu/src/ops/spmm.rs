use crate::{
    sparse::{CooView, CsrView},
    utils::{combine, feature_row, wins},
};
use rayon::prelude::*;
use sparsex_core::{
    bcast::BcastOff,
    op::{BinaryOp, ReduceOp},
    scalar::{FloatType, IndexType},
};

/// Operands of one SpMM call on the host.
///
/// `ufeat` rows are indexed by source entity, `efeat` rows by edge id, `out` rows by
/// destination entity. Argument buffers have the same element count as `out`.
pub struct SpmmArgs<'a, I: IndexType, T: FloatType> {
    pub op: BinaryOp,
    pub reduce: ReduceOp,
    pub bcast: &'a BcastOff,
    pub ufeat: Option<&'a [T]>,
    pub efeat: Option<&'a [T]>,
    pub out: &'a mut [T],
    pub arg_u: Option<&'a mut [I]>,
    pub arg_e: Option<&'a mut [I]>,
}

type OutRow<'a, I, T> = (&'a mut [T], Option<&'a mut [I]>, Option<&'a mut [I]>);

fn split_rows<'a, I: IndexType, T: FloatType>(
    out: &'a mut [T],
    arg_u: Option<&'a mut [I]>,
    arg_e: Option<&'a mut [I]>,
    len: usize,
) -> Vec<OutRow<'a, I, T>> {
    let mut arg_u_rows = arg_u.map(|a| a.chunks_mut(len));
    let mut arg_e_rows = arg_e.map(|a| a.chunks_mut(len));
    out.chunks_mut(len)
        .map(|o| {
            (
                o,
                arg_u_rows.as_mut().and_then(Iterator::next),
                arg_e_rows.as_mut().and_then(Iterator::next),
            )
        })
        .collect()
}

/// SpMM over an adjacency compressed by destination: row `r` of `csr` lists the
/// incoming edges of destination `r`, with source ids in `indices`.
///
/// Destinations are processed in parallel. Max/min ties go to the smallest edge id.
/// Destinations without incoming edges produce 0 and record -1.
pub fn spmm_csr<I: IndexType, T: FloatType>(csr: CsrView<'_, I>, args: SpmmArgs<'_, I, T>) {
    let SpmmArgs {
        op,
        reduce,
        bcast,
        ufeat,
        efeat,
        out,
        arg_u,
        arg_e,
    } = args;
    let len = bcast.out_len;
    if len == 0 || csr.num_rows == 0 {
        return;
    }
    let lhs_len = bcast.lhs_row_len();
    let rhs_len = bcast.rhs_row_len();
    let rows = split_rows(out, arg_u, arg_e, len);

    rows.into_par_iter().enumerate().for_each(|(dst, (out_row, arg_u_row, arg_e_row))| {
        let start = csr.indptr[dst].to_usize();
        let end = csr.indptr[dst + 1].to_usize();

        if reduce.is_cmp() {
            let is_max = reduce == ReduceOp::Max;
            let mut best_eid: Vec<Option<usize>> = vec![None; len];
            let mut best_src = vec![0usize; len];
            for pos in start..end {
                let src = csr.indices[pos].to_usize();
                let eid = csr.edge_id(pos);
                let lhs = feature_row(ufeat, src, lhs_len);
                let rhs = feature_row(efeat, eid, rhs_len);
                for k in 0..len {
                    let val = combine(op, bcast, lhs, rhs, k);
                    if wins(is_max, val, out_row[k], eid, best_eid[k]) {
                        out_row[k] = val;
                        best_eid[k] = Some(eid);
                        best_src[k] = src;
                    }
                }
            }
            write_cmp_row(out_row, arg_u_row, arg_e_row, &best_eid, &best_src);
        } else {
            out_row.fill(T::ZERO);
            for pos in start..end {
                let src = csr.indices[pos].to_usize();
                let eid = csr.edge_id(pos);
                let lhs = feature_row(ufeat, src, lhs_len);
                let rhs = feature_row(efeat, eid, rhs_len);
                for (k, o) in out_row.iter_mut().enumerate() {
                    *o = *o + combine(op, bcast, lhs, rhs, k);
                }
            }
            if reduce == ReduceOp::Mean && end > start {
                let degree = T::from_f64((end - start) as f64);
                out_row.iter_mut().for_each(|o| *o = *o / degree);
            }
        }
    });
}

/// SpMM over a coordinate list; `row` holds sources and `col` destinations.
///
/// Edges are visited in list order and scattered into their destination rows, so
/// this path runs on one thread. Results match [`spmm_csr`] for every reduce.
pub fn spmm_coo<I: IndexType, T: FloatType>(coo: CooView<'_, I>, args: SpmmArgs<'_, I, T>) {
    let SpmmArgs {
        op,
        reduce,
        bcast,
        ufeat,
        efeat,
        out,
        arg_u,
        arg_e,
    } = args;
    let len = bcast.out_len;
    if len == 0 || coo.num_cols == 0 {
        return;
    }
    let lhs_len = bcast.lhs_row_len();
    let rhs_len = bcast.rhs_row_len();
    out.fill(T::ZERO);

    if reduce.is_cmp() {
        let is_max = reduce == ReduceOp::Max;
        let mut best_eid: Vec<Option<usize>> = vec![None; out.len()];
        let mut best_src = vec![0usize; out.len()];
        for pos in 0..coo.nnz() {
            let src = coo.row[pos].to_usize();
            let dst = coo.col[pos].to_usize();
            let eid = coo.edge_id(pos);
            let lhs = feature_row(ufeat, src, lhs_len);
            let rhs = feature_row(efeat, eid, rhs_len);
            for k in 0..len {
                let o = dst * len + k;
                let val = combine(op, bcast, lhs, rhs, k);
                if wins(is_max, val, out[o], eid, best_eid[o]) {
                    out[o] = val;
                    best_eid[o] = Some(eid);
                    best_src[o] = src;
                }
            }
        }
        write_cmp_row(out, arg_u, arg_e, &best_eid, &best_src);
    } else {
        let mut degree = vec![0usize; coo.num_cols];
        for pos in 0..coo.nnz() {
            let src = coo.row[pos].to_usize();
            let dst = coo.col[pos].to_usize();
            let eid = coo.edge_id(pos);
            let lhs = feature_row(ufeat, src, lhs_len);
            let rhs = feature_row(efeat, eid, rhs_len);
            let out_row = &mut out[dst * len..(dst + 1) * len];
            for (k, o) in out_row.iter_mut().enumerate() {
                *o = *o + combine(op, bcast, lhs, rhs, k);
            }
            degree[dst] += 1;
        }
        if reduce == ReduceOp::Mean {
            out.par_chunks_mut(len).zip(degree.par_iter()).for_each(|(out_row, &d)| {
                if d > 0 {
                    let d = T::from_f64(d as f64);
                    out_row.iter_mut().for_each(|o| *o = *o / d);
                }
            });
        }
    }
}

fn write_cmp_row<I: IndexType, T: FloatType>(
    out: &mut [T],
    arg_u: Option<&mut [I]>,
    arg_e: Option<&mut [I]>,
    best_eid: &[Option<usize>],
    best_src: &[usize],
) {
    for (k, eid) in best_eid.iter().enumerate() {
        if eid.is_none() {
            out[k] = T::ZERO;
        }
    }
    if let Some(arg_u) = arg_u {
        for (k, a) in arg_u.iter_mut().enumerate() {
            *a = best_eid[k].map_or(I::NONE, |_| I::from_usize(best_src[k]));
        }
    }
    if let Some(arg_e) = arg_e {
        for (k, a) in arg_e.iter_mut().enumerate() {
            *a = best_eid[k].map_or(I::NONE, I::from_usize);
        }
    }
}
