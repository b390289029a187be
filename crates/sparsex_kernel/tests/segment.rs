mod utils;

use sparsex_core::{
    dtype::DType,
    error::{ErrorKind, Result},
    op::ReduceOp,
};
use sparsex_kernel::{backward_segment_cmp, segment_reduce};
use utils::*;

mod test_functions {
    use super::*;

    // Four segments over six rows of two elements; segment 2 is empty.
    const FEAT: [f32; 12] = [1.0, 8.0, 4.0, 2.0, 4.0, 9.0, 7.0, 3.0, 0.0, 5.0, 6.0, 6.0];
    const OFFSETS: [i64; 5] = [0, 3, 4, 4, 6];

    pub fn sum_test(index_dtype: DType, dtype: DType) -> Result<()> {
        setup_logger();
        let feat = feature(FEAT.to_vec(), dtype, &[6, 2])?;
        let offsets = index(OFFSETS.to_vec(), index_dtype, &[5])?;
        let mut out = filled(-1.0, dtype, &[4, 2])?;

        segment_reduce(ReduceOp::Sum, &feat, &offsets, &mut out, None)?;
        assert_close(&to_f32(&out)?, &[9.0, 19.0, 7.0, 3.0, 0.0, 0.0, 6.0, 11.0], dtype);
        Ok(())
    }

    pub fn mean_test(index_dtype: DType, dtype: DType) -> Result<()> {
        let feat = feature(FEAT.to_vec(), dtype, &[6, 2])?;
        let offsets = index(OFFSETS.to_vec(), index_dtype, &[5])?;
        let mut out = filled(-1.0, dtype, &[4, 2])?;

        segment_reduce(ReduceOp::Mean, &feat, &offsets, &mut out, None)?;
        assert_close(&to_f32(&out)?, &[3.0, 19.0 / 3.0, 7.0, 3.0, 0.0, 0.0, 3.0, 5.5], dtype);
        Ok(())
    }

    pub fn max_backward_test(index_dtype: DType, dtype: DType) -> Result<()> {
        let feat = feature(FEAT.to_vec(), dtype, &[6, 2])?;
        let offsets = index(OFFSETS.to_vec(), index_dtype, &[5])?;
        let mut out = filled(0.0, dtype, &[4, 2])?;
        let mut arg = index(vec![9; 8], index_dtype, &[4, 2])?;

        segment_reduce(ReduceOp::Max, &feat, &offsets, &mut out, Some(&mut arg))?;
        assert_close(&to_f32(&out)?, &[4.0, 9.0, 7.0, 3.0, 0.0, 0.0, 6.0, 6.0], dtype);
        // Rows 1 and 2 tie on the first column of segment 0; the first row wins.
        assert_eq!(to_i64(&arg)?, vec![1, 2, 3, 3, -1, -1, 5, 5]);

        let grad = filled(1.0, dtype, &[4, 2])?;
        let mut grad_in = filled(-1.0, dtype, &[6, 2])?;
        backward_segment_cmp(&grad, &arg, &mut grad_in)?;
        let grad_in = to_f32(&grad_in)?;
        assert_eq!(grad_in, vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 1.0, 0.0, 0.0, 1.0, 1.0]);

        // One non-zero per non-empty segment and column, at the recorded position.
        for (seg, bounds) in OFFSETS.windows(2).enumerate() {
            for k in 0..2 {
                let hits: Vec<i64> = (bounds[0]..bounds[1]).filter(|&row| grad_in[row as usize * 2 + k] != 0.0).collect();
                if bounds[0] == bounds[1] {
                    assert!(hits.is_empty());
                } else {
                    assert_eq!(hits, vec![to_i64(&arg)?[seg * 2 + k]]);
                }
            }
        }
        Ok(())
    }

    pub fn min_test(index_dtype: DType, dtype: DType) -> Result<()> {
        let feat = feature(FEAT.to_vec(), dtype, &[6, 2])?;
        let offsets = index(OFFSETS.to_vec(), index_dtype, &[5])?;
        let mut out = filled(0.0, dtype, &[4, 2])?;
        let mut arg = index(vec![9; 8], index_dtype, &[4, 2])?;

        segment_reduce(ReduceOp::Min, &feat, &offsets, &mut out, Some(&mut arg))?;
        assert_close(&to_f32(&out)?, &[1.0, 2.0, 7.0, 3.0, 0.0, 0.0, 0.0, 5.0], dtype);
        assert_eq!(to_i64(&arg)?, vec![0, 1, 3, 3, -1, -1, 4, 4]);
        Ok(())
    }
}

test_kernels!([sum, mean, max_backward, min]);

#[test]
fn offsets_are_validated() -> Result<()> {
    let feat = feature(vec![1.0; 6], DType::F32, &[6])?;
    let mut out = filled(3.0, DType::F32, &[2])?;

    for bad in [vec![1, 3, 6], vec![0, 4, 3], vec![0, 3, 5]] {
        let offsets = index(bad, DType::I64, &[3])?;
        let err = segment_reduce(ReduceOp::Sum, &feat, &offsets, &mut out, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOffsets);
    }
    assert_eq!(to_f32(&out)?, vec![3.0, 3.0]);

    let offsets = index(vec![0, 3, 6], DType::I64, &[3])?;
    segment_reduce(ReduceOp::Sum, &feat, &offsets, &mut out, None)?;
    assert_eq!(to_f32(&out)?, vec![3.0, 3.0]);
    Ok(())
}

#[test]
fn arg_follows_reduce() -> Result<()> {
    let feat = feature(vec![1.0, 2.0], DType::F32, &[2, 1])?;
    let offsets = index(vec![0, 2], DType::I32, &[2])?;
    let mut out = filled(0.0, DType::F32, &[1, 1])?;
    let mut arg = index(vec![0], DType::I32, &[1, 1])?;

    let err = segment_reduce(ReduceOp::Max, &feat, &offsets, &mut out, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    let err = segment_reduce(ReduceOp::Sum, &feat, &offsets, &mut out, Some(&mut arg)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    let mut wide = index(vec![0], DType::I64, &[1, 1])?;
    let err = segment_reduce(ReduceOp::Max, &feat, &offsets, &mut out, Some(&mut wide)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DTypeMismatch);
    Ok(())
}

#[test]
fn backward_rejects_out_of_range_arg() -> Result<()> {
    let grad = feature(vec![1.0, 1.0], DType::F64, &[2, 1])?;
    let arg = index(vec![0, 4], DType::I64, &[2, 1])?;
    let mut out = filled(2.0, DType::F64, &[3, 1])?;

    let err = backward_segment_cmp(&grad, &arg, &mut out).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IndexOutOfBounds);
    assert_eq!(to_f32(&out)?, vec![2.0; 3]);
    Ok(())
}
