use sparsex_core::{bcast::BcastOff, op::BinaryOp, scalar::FloatType};

/// Combines feature element `k` of one lhs row and one rhs row.
#[inline(always)]
pub fn combine<T: FloatType>(op: BinaryOp, bcast: &BcastOff, lhs: &[T], rhs: &[T], k: usize) -> T {
    match op {
        BinaryOp::Add => lhs[bcast.lhs_index(k)] + rhs[bcast.rhs_index(k)],
        BinaryOp::Sub => lhs[bcast.lhs_index(k)] - rhs[bcast.rhs_index(k)],
        BinaryOp::Mul => lhs[bcast.lhs_index(k)] * rhs[bcast.rhs_index(k)],
        BinaryOp::Div => lhs[bcast.lhs_index(k)] / rhs[bcast.rhs_index(k)],
        BinaryOp::Dot => {
            let li = bcast.lhs_index(k);
            let ri = bcast.rhs_index(k);
            let mut acc = T::ZERO;
            for j in 0..bcast.reduce_size {
                acc = acc + lhs[li + j] * rhs[ri + j];
            }
            acc
        },
        BinaryOp::CopyLhs => lhs[k],
        BinaryOp::CopyRhs => rhs[k],
    }
}

/// Feature row `row` of a flat operand, or an empty slice when the operand is absent.
#[inline(always)]
pub fn feature_row<T>(feat: Option<&[T]>, row: usize, len: usize) -> &[T] {
    match feat {
        Some(f) => &f[row * len..(row + 1) * len],
        None => &[],
    }
}

/// Running max/min with the smallest-id tie-break.
#[inline(always)]
pub fn wins<T: FloatType>(is_max: bool, val: T, best: T, id: usize, best_id: Option<usize>) -> bool {
    match best_id {
        None => true,
        Some(best_id) => {
            let better = if is_max { val > best } else { val < best };
            better || (val == best && id < best_id)
        },
    }
}
