use crate::{
    check::{check_contiguous, check_ctx, check_dtype, check_shape, GraphDims, Operand},
    dispatch::KernelRegistry,
    select::{select_format, SDDMM_FORMATS},
    spmm::{check_out_shape, effective_operands},
};
use log::debug;
use sparsex_core::{
    array::NDArray,
    bcast::{calc_bcast_off, BcastOff},
    error::{Error, Result},
    op::{BinaryOp, Target},
};
use sparsex_graph::{Adjacency, GraphQuery, SparseFormat};

/// A validated SDDMM request, as handed to a kernel.
pub struct SddmmCall<'a> {
    pub op: BinaryOp,
    pub bcast: &'a BcastOff,
    pub adjacency: &'a Adjacency,
    pub lhs: Option<&'a NDArray>,
    pub rhs: Option<&'a NDArray>,
    pub out: &'a mut NDArray,
    pub lhs_target: Target,
    pub rhs_target: Target,
}

/// Generalized SDDMM on the global registry. See [`KernelRegistry::sddmm`].
pub fn sddmm(
    op: BinaryOp,
    graph: &dyn GraphQuery,
    lhs: Option<&NDArray>,
    rhs: Option<&NDArray>,
    out: &mut NDArray,
    lhs_target: Target,
    rhs_target: Target,
) -> Result<()> {
    KernelRegistry::global().sddmm(op, graph, lhs, rhs, out, lhs_target, rhs_target)
}

impl KernelRegistry {
    /// Generalized SDDMM: for every edge `e = (s, d)`,
    /// `out[e] = op(lhs[pick(lhs_target)], rhs[pick(rhs_target)])` where `pick`
    /// chooses `s`, `e` or `d`.
    ///
    /// `out` rows are in edge-id order regardless of the adjacency format used.
    #[allow(clippy::too_many_arguments)]
    pub fn sddmm(
        &self,
        op: BinaryOp,
        graph: &dyn GraphQuery,
        lhs: Option<&NDArray>,
        rhs: Option<&NDArray>,
        out: &mut NDArray,
        lhs_target: Target,
        rhs_target: Target,
    ) -> Result<()> {
        if graph.num_edge_types() != 1 {
            return Err(Error::MultipleEdgeTypes(graph.num_edge_types()));
        }
        let (op, lhs, rhs) = effective_operands(op, lhs, rhs)?;

        let dims = GraphDims {
            num_src: graph.num_src(),
            num_edges: graph.num_edges(),
            num_dst: graph.num_dst(),
        };
        {
            let operands = [
                Operand::new("lhs", lhs),
                Operand::new("rhs", rhs),
                Operand::new("out", Some(&*out)),
            ];
            check_ctx(graph.device(), &operands)?;
            check_contiguous(&operands)?;
            check_shape(&dims, &[lhs_target, rhs_target, Target::Edge], &operands)?;
            check_dtype(out.dtype(), &operands[..2])?;
        }

        let bcast = calc_bcast_off(op, lhs.map(NDArray::shape), rhs.map(NDArray::shape))?;
        check_out_shape("out", out, &bcast)?;

        let table = self.resolve("SDDMM", graph.device(), graph.index_dtype(), out.dtype())?;
        let format = select_format("SDDMM", graph, 0, SparseFormat::Coo, SDDMM_FORMATS)?;
        let kernel = match format {
            SparseFormat::Csr => table.sddmm_csr,
            SparseFormat::Coo => table.sddmm_coo,
            SparseFormat::Csc => {
                return Err(Error::UnsupportedFormat {
                    op: "SDDMM",
                    allowed: SDDMM_FORMATS.to_string(),
                })
            },
        };
        let adjacency = graph.adjacency(format)?;
        debug!(
            "SDDMM {} ({} x {}) on {} (out {:?}, {}, {})",
            op,
            lhs_target,
            rhs_target,
            format,
            out.shape(),
            graph.index_dtype(),
            out.dtype()
        );

        kernel(SddmmCall {
            op,
            bcast: &bcast,
            adjacency: &adjacency,
            lhs,
            rhs,
            out,
            lhs_target,
            rhs_target,
        })
    }
}
