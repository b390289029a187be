mod convert;
pub mod format;
pub mod graph;
pub mod matrix;

pub use format::{FormatSet, SparseFormat};
pub use graph::{Adjacency, GraphQuery, UnitGraph};
pub use matrix::{CooMatrix, CsrMatrix};
