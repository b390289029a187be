//! Dispatch and validation layer for generalized sparse kernels.
//!
//! Each entry point validates every operand (device context, contiguity, shape,
//! dtype), resolves the feature broadcast, resolves a kernel from the
//! [`KernelRegistry`] and picks an adjacency format, in that order. Nothing is
//! written to caller buffers until all of that has succeeded.

pub mod check;
pub mod dispatch;
mod host;
mod mapping;
mod sddmm;
mod segment;
pub mod select;
mod spmm;

pub use dispatch::{Backend, DispatchKey, IndexWidth, KernelRegistry, KernelTable, Precision};
pub use mapping::get_edge_mapping;
pub use sddmm::{sddmm, SddmmCall};
pub use segment::{backward_segment_cmp, segment_reduce, BackwardSegmentCmpCall, SegmentReduceCall};
pub use spmm::{spmm, SpmmAux, SpmmCall};
