use crate::utils::wins;
use rayon::prelude::*;
use sparsex_core::{
    error::{Error, Result},
    op::ReduceOp,
    scalar::{FloatType, IndexType},
};

/// Reduces rows `offsets[i]..offsets[i + 1]` of `feat` into row `i` of `out`.
///
/// `feat` rows have `len` elements. For max/min, `arg` receives the winning row of
/// `feat` per output element (first occurrence on ties, -1 for empty segments).
pub fn segment_reduce<I: IndexType, T: FloatType>(
    reduce: ReduceOp,
    feat: &[T],
    offsets: &[I],
    len: usize,
    out: &mut [T],
    arg: Option<&mut [I]>,
) {
    if len == 0 || offsets.len() < 2 {
        return;
    }

    let mut arg_rows = arg.map(|a| a.chunks_mut(len));
    let rows: Vec<(&mut [T], Option<&mut [I]>)> = out
        .chunks_mut(len)
        .map(|o| (o, arg_rows.as_mut().and_then(Iterator::next)))
        .collect();

    rows.into_par_iter().enumerate().for_each(|(seg, (out_row, mut arg_row))| {
        let start = offsets[seg].to_usize();
        let end = offsets[seg + 1].to_usize();

        if reduce.is_cmp() {
            let is_max = reduce == ReduceOp::Max;
            for k in 0..len {
                let mut best = None;
                for i in start..end {
                    let val = feat[i * len + k];
                    if wins(is_max, val, out_row[k], i, best) {
                        out_row[k] = val;
                        best = Some(i);
                    }
                }
                if best.is_none() {
                    out_row[k] = T::ZERO;
                }
                if let Some(arg_row) = arg_row.as_mut() {
                    arg_row[k] = best.map_or(I::NONE, I::from_usize);
                }
            }
            return;
        }

        out_row.fill(T::ZERO);
        for i in start..end {
            let row = &feat[i * len..(i + 1) * len];
            for (o, &v) in out_row.iter_mut().zip(row) {
                *o = *o + v;
            }
        }
        if reduce == ReduceOp::Mean && end > start {
            let n = T::from_f64((end - start) as f64);
            out_row.iter_mut().for_each(|o| *o = *o / n);
        }
    });
}

/// Routes each gradient element `feat[i, k]` to `out[arg[i, k], k]`; every other
/// element of `out` becomes zero. Entries recorded as -1 are skipped.
///
/// All indices are checked against `out` before anything is written.
pub fn backward_segment_cmp<I: IndexType, T: FloatType>(feat: &[T], arg: &[I], len: usize, out: &mut [T]) -> Result<()> {
    if len == 0 {
        return Ok(());
    }
    let num_rows = out.len() / len;
    for &a in arg {
        if a != I::NONE && (a.to_i64() < 0 || a.to_usize() >= num_rows) {
            return Err(Error::IndexOutOfBounds {
                index: a.to_i64(),
                size: num_rows,
            });
        }
    }

    out.fill(T::ZERO);
    for (i, (g, a)) in feat.iter().zip(arg).enumerate() {
        if *a == I::NONE {
            continue;
        }
        let k = i % len;
        out[a.to_usize() * len + k] = *g;
    }
    Ok(())
}
