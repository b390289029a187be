use crate::{
    check::{check_contiguous, check_ctx, check_dtype, check_shape, GraphDims, Operand},
    dispatch::KernelRegistry,
    select::{select_format, SPMM_FORMATS},
};
use log::debug;
use sparsex_core::{
    array::NDArray,
    bcast::{calc_bcast_off, BcastOff},
    error::{Error, Result},
    op::{BinaryOp, ReduceOp, Target},
};
use sparsex_graph::{Adjacency, GraphQuery, SparseFormat};

/// Argmin/argmax outputs of a max/min SpMM, in the graph's index dtype and with
/// the shape of `out`.
///
/// `arg_u` receives the winning source id and is required when the operator reads
/// the source features; `arg_e` receives the winning edge id and is required when
/// it reads the edge features.
#[derive(Debug, Default)]
pub struct SpmmAux<'a> {
    pub arg_u: Option<&'a mut NDArray>,
    pub arg_e: Option<&'a mut NDArray>,
}

impl<'a> SpmmAux<'a> {
    pub fn new(arg_u: Option<&'a mut NDArray>, arg_e: Option<&'a mut NDArray>) -> Self {
        Self { arg_u, arg_e }
    }
}

/// A validated SpMM request, as handed to a kernel.
pub struct SpmmCall<'a> {
    pub op: BinaryOp,
    pub reduce: ReduceOp,
    pub bcast: &'a BcastOff,
    pub adjacency: &'a Adjacency,
    pub ufeat: Option<&'a NDArray>,
    pub efeat: Option<&'a NDArray>,
    pub out: &'a mut NDArray,
    pub arg_u: Option<&'a mut NDArray>,
    pub arg_e: Option<&'a mut NDArray>,
}

/// Rewrites `op` so that it only reads operands that are present. An operand the
/// resulting operator does not read is dropped.
pub(crate) fn effective_operands<'a>(
    op: BinaryOp,
    lhs: Option<&'a NDArray>,
    rhs: Option<&'a NDArray>,
) -> Result<(BinaryOp, Option<&'a NDArray>, Option<&'a NDArray>)> {
    let op = match (lhs.is_some(), rhs.is_some()) {
        (false, false) => {
            return Err(Error::InvalidArgument(format!(
                "operator {} needs at least one operand, both are null",
                op
            )))
        },
        (true, false) => BinaryOp::CopyLhs,
        (false, true) => BinaryOp::CopyRhs,
        (true, true) => op,
    };
    let lhs = if op.uses_lhs() { lhs } else { None };
    let rhs = if op.uses_rhs() { rhs } else { None };
    Ok((op, lhs, rhs))
}

/// Checks that `out` has the broadcast output feature shape.
pub(crate) fn check_out_shape(name: &str, out: &NDArray, bcast: &BcastOff) -> Result<()> {
    if out.shape()[1..] != bcast.out_shape[..] {
        return Err(Error::shape_mismatch(
            name,
            format!(
                "expected feature shape {:?} from broadcasting, got {:?}",
                bcast.out_shape,
                &out.shape()[1..]
            ),
        ));
    }
    Ok(())
}

/// Generalized SpMM on the global registry. See [`KernelRegistry::spmm`].
pub fn spmm(
    op: BinaryOp,
    reduce: ReduceOp,
    graph: &dyn GraphQuery,
    ufeat: Option<&NDArray>,
    efeat: Option<&NDArray>,
    out: &mut NDArray,
    aux: Option<SpmmAux<'_>>,
) -> Result<()> {
    KernelRegistry::global().spmm(op, reduce, graph, ufeat, efeat, out, aux)
}

impl KernelRegistry {
    /// Generalized SpMM: for every destination `d`,
    /// `out[d] = reduce over edges (s, e, d) of op(ufeat[s], efeat[e])`.
    ///
    /// A null `ufeat` or `efeat` turns `op` into a copy of the other operand.
    /// `aux` must be present exactly when `reduce` is max or min. Destinations with
    /// no incoming edge produce 0 and record -1. Among equal values the edge with
    /// the smallest id wins, whatever format the kernel runs on.
    #[allow(clippy::too_many_arguments)]
    pub fn spmm(
        &self,
        op: BinaryOp,
        reduce: ReduceOp,
        graph: &dyn GraphQuery,
        ufeat: Option<&NDArray>,
        efeat: Option<&NDArray>,
        out: &mut NDArray,
        aux: Option<SpmmAux<'_>>,
    ) -> Result<()> {
        if graph.num_edge_types() != 1 {
            return Err(Error::MultipleEdgeTypes(graph.num_edge_types()));
        }
        let (op, ufeat, efeat) = effective_operands(op, ufeat, efeat)?;

        let (arg_u, arg_e) = match (reduce.is_cmp(), aux) {
            (true, Some(SpmmAux { arg_u, arg_e })) => {
                if op.uses_lhs() != arg_u.is_some() {
                    return Err(Error::InvalidArgument(format!(
                        "{} with {} expects Arg_U {}",
                        reduce,
                        op,
                        if op.uses_lhs() { "to be present" } else { "to be null" }
                    )));
                }
                if op.uses_rhs() != arg_e.is_some() {
                    return Err(Error::InvalidArgument(format!(
                        "{} with {} expects Arg_E {}",
                        reduce,
                        op,
                        if op.uses_rhs() { "to be present" } else { "to be null" }
                    )));
                }
                (arg_u, arg_e)
            },
            (true, None) => {
                return Err(Error::InvalidArgument(format!(
                    "reduce {} records argmin/argmax and needs auxiliary buffers",
                    reduce
                )))
            },
            (false, Some(_)) => {
                return Err(Error::InvalidArgument(format!(
                    "reduce {} takes no auxiliary buffers",
                    reduce
                )))
            },
            (false, None) => (None, None),
        };

        let dims = GraphDims {
            num_src: graph.num_src(),
            num_edges: graph.num_edges(),
            num_dst: graph.num_dst(),
        };
        {
            let operands = [
                Operand::new("U_data", ufeat),
                Operand::new("E_data", efeat),
                Operand::new("out", Some(&*out)),
                Operand::new("Arg_U", arg_u.as_deref()),
                Operand::new("Arg_E", arg_e.as_deref()),
            ];
            check_ctx(graph.device(), &operands)?;
            check_contiguous(&operands)?;
            check_shape(
                &dims,
                &[Target::Src, Target::Edge, Target::Dst, Target::Dst, Target::Dst],
                &operands,
            )?;
            check_dtype(out.dtype(), &operands[..2])?;
            check_dtype(graph.index_dtype(), &operands[3..])?;
        }

        let bcast = calc_bcast_off(op, ufeat.map(NDArray::shape), efeat.map(NDArray::shape))?;
        check_out_shape("out", out, &bcast)?;
        for (name, arg) in [("Arg_U", arg_u.as_deref()), ("Arg_E", arg_e.as_deref())] {
            if let Some(arg) = arg {
                if arg.shape() != out.shape() {
                    return Err(Error::shape_mismatch(
                        name,
                        format!("expected the shape of out {:?}, got {:?}", out.shape(), arg.shape()),
                    ));
                }
            }
        }

        let table = self.resolve("SpMM", graph.device(), graph.index_dtype(), out.dtype())?;
        let format = select_format("SpMM", graph, 0, SparseFormat::Csc, SPMM_FORMATS)?;
        let kernel = match format {
            SparseFormat::Csc => table.spmm_csc,
            SparseFormat::Coo => table.spmm_coo,
            SparseFormat::Csr => {
                return Err(Error::UnsupportedFormat {
                    op: "SpMM",
                    allowed: SPMM_FORMATS.to_string(),
                })
            },
        };
        let adjacency = graph.adjacency(format)?;
        debug!(
            "SpMM {}/{} on {} (out {:?}, {}, {})",
            op,
            reduce,
            format,
            out.shape(),
            graph.index_dtype(),
            out.dtype()
        );

        kernel(SpmmCall {
            op,
            reduce,
            bcast: &bcast,
            adjacency: &adjacency,
            ufeat,
            efeat,
            out,
            arg_u,
            arg_e,
        })
    }
}
