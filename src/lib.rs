//! Generalized sparse-dense kernels for graph learning.
//!
//! `sparsex` aggregates per-node and per-edge features over a graph's adjacency
//! (SpMM), combines features along every edge (SDDMM), and reduces contiguous
//! segments of a flat array. Every call is validated up front and dispatched on
//! (backend, index width, float precision) through a [`KernelRegistry`](kernel::KernelRegistry).

pub mod prelude;

pub use sparsex_core as core;
pub use sparsex_cpu as cpu;
pub use sparsex_graph as graph;
pub use sparsex_kernel as kernel;
