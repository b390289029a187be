//! Adjacency format selection.

use log::trace;
use sparsex_core::error::{Error, Result};
use sparsex_graph::{FormatSet, GraphQuery, SparseFormat};

/// Formats the SpMM engine can run on: compressed by destination, or coordinate list.
pub const SPMM_FORMATS: FormatSet = FormatSet::EMPTY.with(SparseFormat::Csc).with(SparseFormat::Coo);
/// Formats the SDDMM engine can run on: compressed by source, or coordinate list.
pub const SDDMM_FORMATS: FormatSet = FormatSet::EMPTY.with(SparseFormat::Csr).with(SparseFormat::Coo);

/// Picks the format `op` will run against on edge relation `etype`.
///
/// In order of preference: `preferred` if the graph already holds it, any held
/// format in `accepted` (COO first, it needs no grouping), `preferred` if the
/// graph may build it, then the first buildable format in `accepted`. Selection
/// does not build anything; the adjacency is built on first retrieval.
pub fn select_format(
    op: &'static str,
    graph: &dyn GraphQuery,
    etype: usize,
    preferred: SparseFormat,
    accepted: FormatSet,
) -> Result<SparseFormat> {
    if etype >= graph.num_edge_types() {
        return Err(Error::InvalidArgument(format!(
            "edge type {} out of range for a graph with {} edge types",
            etype,
            graph.num_edge_types()
        )));
    }

    let created = graph.created_formats().intersect(accepted);
    let buildable = graph.allowed_formats().intersect(accepted);
    let wants_preferred = accepted.contains(preferred);

    let format = if wants_preferred && created.contains(preferred) {
        Some(preferred)
    } else if let Some(f) = created.iter().next() {
        Some(f)
    } else if wants_preferred && buildable.contains(preferred) {
        Some(preferred)
    } else {
        buildable.iter().next()
    };

    match format {
        Some(f) => {
            trace!("{} selected {} (preferred {}, created {})", op, f, preferred, graph.created_formats());
            Ok(f)
        },
        None => Err(Error::UnsupportedFormat {
            op,
            allowed: accepted.to_string(),
        }),
    }
}
