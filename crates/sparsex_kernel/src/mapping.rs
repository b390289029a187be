use crate::select::{select_format, SPMM_FORMATS};
use sparsex_core::{array::NDArray, error::Result, id_type_switch, scalar::IndexType};
use sparsex_graph::{GraphQuery, SparseFormat};

/// The edge-id permutation of the adjacency SpMM would run on.
///
/// Returns a copy of the compressed-by-destination edge-id array when that is the
/// format SpMM selects and its physical edge order differs from edge-id order.
/// `None` means positions and edge ids coincide.
pub fn get_edge_mapping(graph: &dyn GraphQuery) -> Result<Option<NDArray>> {
    if select_format("GetEdgeMapping", graph, 0, SparseFormat::Csc, SPMM_FORMATS)? != SparseFormat::Csc {
        return Ok(None);
    }
    let csc = graph.csc()?;
    let Some(data) = &csc.data else {
        return Ok(None);
    };
    if data.device().is_host() {
        let identity = id_type_switch!(data.dtype(), I => {
            Ok(data.as_slice::<I>()?.iter().enumerate().all(|(pos, eid)| eid.to_usize() == pos))
        })?;
        if identity {
            return Ok(None);
        }
    }
    data.try_clone().map(Some)
}
