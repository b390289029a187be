mod sddmm;
mod segment;
mod spmm;

use criterion::criterion_group;
use sparsex_core::{array::NDArray, error::Result};
use sparsex_graph::UnitGraph;

// (nodes, average degree, label)
const SIZES: [(usize, usize, &str); 3] = [(1_000, 8, "small"), (10_000, 16, "medium"), (50_000, 32, "large")];

// Deterministic scattered edges so every run measures the same graph.
fn create_graph(nodes: usize, degree: usize) -> Result<UnitGraph> {
    let num_edges = nodes * degree;
    let src: Vec<i64> = (0..num_edges).map(|i| ((i * 7_919) % nodes) as i64).collect();
    let dst: Vec<i64> = (0..num_edges).map(|i| ((i * 104_729 + 13) % nodes) as i64).collect();
    UnitGraph::from_edges(nodes, nodes, src, dst)
}

fn create_features(rows: usize, cols: usize) -> Result<NDArray> {
    let data: Vec<f32> = (0..rows * cols).map(|i| (i % 17) as f32 * 0.25).collect();
    NDArray::from_vec(data, &[rows, cols])
}

criterion_group!(benches, spmm::basic, sddmm::basic, segment::basic);
