//! Host kernels for generalized SpMM, SDDMM and segment reductions.
//!
//! Every kernel here trusts its caller: shapes, dtypes and broadcast descriptors
//! have been validated by the dispatch layer, so indexing out of range is a bug
//! upstream, not a recoverable condition.

pub mod ops;
pub mod sparse;
mod utils;
