pub use crate::core::{
    array::NDArray,
    device::{get_default_device, set_default_device, Device},
    dtype::DType,
    error::{Error, ErrorKind, Result},
    op::{BinaryOp, ReduceOp, Target},
    scalar::{FloatType, IndexType, Scalar},
};
pub use crate::core::{bf16, f16};
pub use crate::graph::{FormatSet, GraphQuery, SparseFormat, UnitGraph};
pub use crate::kernel::{
    backward_segment_cmp, get_edge_mapping, sddmm, segment_reduce, spmm, KernelRegistry, SpmmAux,
};
