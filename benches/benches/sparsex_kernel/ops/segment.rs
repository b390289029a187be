use super::{create_features, SIZES};
use criterion::{black_box, Criterion};
use sparsex_core::{array::NDArray, dtype::DType, op::ReduceOp};
use sparsex_kernel::segment_reduce;

const FEATURES: usize = 16;

pub fn basic(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("segment/basic");
    group.warm_up_time(core::time::Duration::from_millis(500));
    group.measurement_time(core::time::Duration::from_secs(3));
    group.sample_size(30);

    for &(segments, length, size_name) in &SIZES {
        let rows = segments * length;
        let feat = create_features(rows, FEATURES).unwrap();
        let offsets: Vec<i64> = (0..=segments).map(|s| (s * length) as i64).collect();
        let offsets = NDArray::from_vec(offsets, &[segments + 1]).unwrap();

        for reduce in [ReduceOp::Sum, ReduceOp::Max] {
            let bench_name = format!("{}/cpu/{}/{}x{}", reduce, size_name, segments, length);
            group.bench_function(&bench_name, |b| {
                let mut out = NDArray::zeros(&[segments, FEATURES], DType::F32).unwrap();
                let mut arg = NDArray::zeros(&[segments, FEATURES], DType::I64).unwrap();
                b.iter(|| {
                    let arg = reduce.is_cmp().then_some(&mut arg);
                    black_box(segment_reduce(reduce, &feat, &offsets, &mut out, arg)).unwrap()
                })
            });
        }
    }

    group.finish();
}
