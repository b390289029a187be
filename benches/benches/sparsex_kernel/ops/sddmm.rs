use super::{create_features, create_graph, SIZES};
use criterion::{black_box, Criterion};
use sparsex_core::{
    array::NDArray,
    dtype::DType,
    op::{BinaryOp, Target},
};
use sparsex_graph::GraphQuery;
use sparsex_kernel::sddmm;

const FEATURES: usize = 32;

pub fn basic(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("sddmm/basic");
    group.warm_up_time(core::time::Duration::from_millis(500));
    group.measurement_time(core::time::Duration::from_secs(3));
    group.sample_size(30);

    for &(nodes, degree, size_name) in &SIZES {
        let graph = create_graph(nodes, degree).unwrap();
        let feat = create_features(nodes, FEATURES).unwrap();
        let num_edges = graph.num_edges();

        for (op_name, op, out_cols) in [("add", BinaryOp::Add, FEATURES), ("dot", BinaryOp::Dot, 1)] {
            let bench_name = format!("{}/cpu/{}/{}x{}", op_name, size_name, nodes, degree);
            group.bench_function(&bench_name, |b| {
                let mut out = NDArray::zeros(&[num_edges, out_cols], DType::F32).unwrap();
                b.iter(|| {
                    black_box(sddmm(op, &graph, Some(&feat), Some(&feat), &mut out, Target::Src, Target::Dst)).unwrap()
                })
            });
        }
    }

    group.finish();
}
