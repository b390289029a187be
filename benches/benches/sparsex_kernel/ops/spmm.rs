use super::{create_features, create_graph, SIZES};
use criterion::{black_box, Criterion};
use sparsex_core::{
    array::NDArray,
    dtype::DType,
    op::{BinaryOp, ReduceOp},
};
use sparsex_graph::GraphQuery;
use sparsex_kernel::{spmm, SpmmAux};

const FEATURES: usize = 32;

pub fn basic(criterion: &mut Criterion) {
    let _ = env_logger::try_init();
    let mut group = criterion.benchmark_group("spmm/basic");
    group.warm_up_time(core::time::Duration::from_millis(500));
    group.measurement_time(core::time::Duration::from_secs(3));
    group.sample_size(30);

    let operations = [
        ("copy_u_sum", BinaryOp::CopyLhs, ReduceOp::Sum),
        ("mul_sum", BinaryOp::Mul, ReduceOp::Sum),
        ("add_max", BinaryOp::Add, ReduceOp::Max),
        ("copy_u_mean", BinaryOp::CopyLhs, ReduceOp::Mean),
    ];

    for &(nodes, degree, size_name) in &SIZES {
        let graph = create_graph(nodes, degree).unwrap();
        // Build the compressed-by-destination adjacency outside the timed loop.
        graph.csc().unwrap();
        let ufeat = create_features(nodes, FEATURES).unwrap();
        let efeat = create_features(graph.num_edges(), 1).unwrap();

        for (op_name, op, reduce) in operations {
            let bench_name = format!("{}/cpu/{}/{}x{}", op_name, size_name, nodes, degree);
            group.bench_function(&bench_name, |b| {
                let mut out = NDArray::zeros(&[nodes, FEATURES], DType::F32).unwrap();
                let mut arg_u = NDArray::zeros(&[nodes, FEATURES], DType::I64).unwrap();
                let mut arg_e = NDArray::zeros(&[nodes, FEATURES], DType::I64).unwrap();
                b.iter(|| {
                    let aux = if reduce.is_cmp() {
                        Some(SpmmAux::new(Some(&mut arg_u), op.uses_rhs().then_some(&mut arg_e)))
                    } else {
                        None
                    };
                    black_box(spmm(op, reduce, &graph, Some(&ufeat), Some(&efeat), &mut out, aux)).unwrap()
                })
            });
        }
    }

    group.finish();
}
