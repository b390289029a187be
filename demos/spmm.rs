//! Mean and max message passing over a small citation-style graph.
//!
//! Run with `RUST_LOG=debug cargo run --example spmm` to see the dispatch log.

use sparsex::prelude::*;

fn main() -> Result<()> {
    env_logger::init();

    // paper -> cited paper
    let src = vec![0i64, 0, 1, 2, 3, 3, 4];
    let dst = vec![1i64, 2, 2, 3, 1, 4, 0];
    let graph = UnitGraph::from_edges(5, 5, src, dst)?;

    let feat: Vec<f32> = (0..5 * 4).map(|i| i as f32).collect();
    let feat = NDArray::from_vec(feat, &[5, 4])?;
    let weight = NDArray::from_vec(vec![1.0f32, 0.5, 0.5, 2.0, 1.0, 1.0, 0.25], &[7, 1])?;

    let mut mean = NDArray::zeros(&[5, 4], DType::F32)?;
    spmm(BinaryOp::Mul, ReduceOp::Mean, &graph, Some(&feat), Some(&weight), &mut mean, None)?;
    println!("weighted mean of citing papers:\n{:?}", mean.to_vec::<f32>()?);

    let mut max = NDArray::zeros(&[5, 4], DType::F32)?;
    let mut arg_u = NDArray::zeros(&[5, 4], DType::I64)?;
    spmm(
        BinaryOp::CopyLhs,
        ReduceOp::Max,
        &graph,
        Some(&feat),
        None,
        &mut max,
        Some(SpmmAux::new(Some(&mut arg_u), None)),
    )?;
    println!("max over citing papers:\n{:?}", max.to_vec::<f32>()?);
    println!("winning paper per element:\n{:?}", arg_u.to_vec::<i64>()?);

    let mut scores = NDArray::zeros(&[7, 1], DType::F32)?;
    sddmm(BinaryOp::Dot, &graph, Some(&feat), Some(&feat), &mut scores, Target::Src, Target::Dst)?;
    println!("edge scores:\n{:?}", scores.to_vec::<f32>()?);

    if let Some(mapping) = get_edge_mapping(&graph)? {
        println!("edge order used by SpMM: {:?}", mapping.to_vec::<i64>()?);
    }
    Ok(())
}
