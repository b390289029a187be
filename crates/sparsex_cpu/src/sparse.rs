use sparsex_core::scalar::IndexType;

/// Borrowed compressed-row adjacency. Row `r` owns positions `indptr[r]..indptr[r + 1]`
/// of `indices` and `data`.
#[derive(Debug, Clone, Copy)]
pub struct CsrView<'a, I: IndexType> {
    pub num_rows: usize,
    pub num_cols: usize,
    pub indptr: &'a [I],
    pub indices: &'a [I],
    /// Edge id per position; `None` means position == edge id.
    pub data: Option<&'a [I]>,
}

/// Borrowed coordinate-list adjacency.
#[derive(Debug, Clone, Copy)]
pub struct CooView<'a, I: IndexType> {
    pub num_rows: usize,
    pub num_cols: usize,
    pub row: &'a [I],
    pub col: &'a [I],
    pub data: Option<&'a [I]>,
}

impl<I: IndexType> CsrView<'_, I> {
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    #[inline(always)]
    pub fn edge_id(&self, pos: usize) -> usize {
        self.data.map_or(pos, |d| d[pos].to_usize())
    }
}

impl<I: IndexType> CooView<'_, I> {
    pub fn nnz(&self) -> usize {
        self.row.len()
    }

    #[inline(always)]
    pub fn edge_id(&self, pos: usize) -> usize {
        self.data.map_or(pos, |d| d[pos].to_usize())
    }
}
