use sparsex_core::{array::NDArray, device::Device, dtype::DType};

/// Coordinate-list adjacency. `row` holds source ids, `col` destination ids.
#[derive(Debug)]
pub struct CooMatrix {
    pub num_rows: usize,
    pub num_cols: usize,
    pub row: NDArray,
    pub col: NDArray,
    /// Edge id of each entry; `None` when entries are already in edge-id order.
    pub data: Option<NDArray>,
}

/// Compressed adjacency. Used both for CSR (rows are sources) and CSC (rows are
/// destinations, stored as the CSR of the reversed relation).
#[derive(Debug)]
pub struct CsrMatrix {
    pub num_rows: usize,
    pub num_cols: usize,
    pub indptr: NDArray,
    pub indices: NDArray,
    pub data: Option<NDArray>,
}

impl CooMatrix {
    pub fn nnz(&self) -> usize {
        self.row.size()
    }
    pub fn index_dtype(&self) -> DType {
        self.row.dtype()
    }
    pub fn device(&self) -> Device {
        self.row.device()
    }
}

impl CsrMatrix {
    pub fn nnz(&self) -> usize {
        self.indices.size()
    }
    pub fn index_dtype(&self) -> DType {
        self.indptr.dtype()
    }
    pub fn device(&self) -> Device {
        self.indptr.device()
    }
}
