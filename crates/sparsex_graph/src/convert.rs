//! Host conversions between adjacency formats.
//!
//! All conversions are stable: entries that share a row keep their relative order,
//! and edge ids travel along in `data`.

use crate::matrix::{CooMatrix, CsrMatrix};
use sparsex_core::{array::NDArray, error::Result, id_type_switch, scalar::IndexType};

/// Groups a coordinate list by its `row` array.
fn group_by_row<I: IndexType>(
    num_rows: usize,
    row: &[I],
    col: &[I],
    data: Option<&[I]>,
) -> (Vec<I>, Vec<I>, Vec<I>) {
    let nnz = row.len();
    let mut indptr = vec![0usize; num_rows + 1];
    for r in row {
        indptr[r.to_usize() + 1] += 1;
    }
    for i in 0..num_rows {
        indptr[i + 1] += indptr[i];
    }

    let mut next = indptr.clone();
    let mut indices = vec![I::default(); nnz];
    let mut eids = vec![I::default(); nnz];
    for pos in 0..nnz {
        let r = row[pos].to_usize();
        let slot = next[r];
        next[r] += 1;
        indices[slot] = col[pos];
        eids[slot] = data.map_or(I::from_usize(pos), |d| d[pos]);
    }

    (indptr.into_iter().map(I::from_usize).collect(), indices, eids)
}

/// Expands compressed rows back into one row id per entry.
fn expand_rows<I: IndexType>(indptr: &[I]) -> Vec<I> {
    let nnz = indptr.last().map_or(0, |v| v.to_usize());
    let mut rows = Vec::with_capacity(nnz);
    for r in 0..indptr.len().saturating_sub(1) {
        let count = indptr[r + 1].to_usize() - indptr[r].to_usize();
        rows.extend(std::iter::repeat(I::from_usize(r)).take(count));
    }
    rows
}

fn copy_data(data: Option<&NDArray>) -> Result<Option<NDArray>> {
    data.map(NDArray::try_clone).transpose()
}

pub(crate) fn coo_to_csr(coo: &CooMatrix) -> Result<CsrMatrix> {
    id_type_switch!(coo.index_dtype(), I => {
        let data = coo.data.as_ref().map(|d| d.as_slice::<I>()).transpose()?;
        let (indptr, indices, eids) =
            group_by_row(coo.num_rows, coo.row.as_slice::<I>()?, coo.col.as_slice::<I>()?, data);
        let nnz = indices.len();
        Ok(CsrMatrix {
            num_rows: coo.num_rows,
            num_cols: coo.num_cols,
            indptr: NDArray::from_vec(indptr, &[coo.num_rows + 1])?,
            indices: NDArray::from_vec(indices, &[nnz])?,
            data: Some(NDArray::from_vec(eids, &[nnz])?),
        })
    })
}

pub(crate) fn coo_to_csc(coo: &CooMatrix) -> Result<CsrMatrix> {
    id_type_switch!(coo.index_dtype(), I => {
        let data = coo.data.as_ref().map(|d| d.as_slice::<I>()).transpose()?;
        let (indptr, indices, eids) =
            group_by_row(coo.num_cols, coo.col.as_slice::<I>()?, coo.row.as_slice::<I>()?, data);
        let nnz = indices.len();
        Ok(CsrMatrix {
            num_rows: coo.num_cols,
            num_cols: coo.num_rows,
            indptr: NDArray::from_vec(indptr, &[coo.num_cols + 1])?,
            indices: NDArray::from_vec(indices, &[nnz])?,
            data: Some(NDArray::from_vec(eids, &[nnz])?),
        })
    })
}

pub(crate) fn csr_to_coo(csr: &CsrMatrix) -> Result<CooMatrix> {
    id_type_switch!(csr.index_dtype(), I => {
        let rows = expand_rows(csr.indptr.as_slice::<I>()?);
        let nnz = rows.len();
        Ok(CooMatrix {
            num_rows: csr.num_rows,
            num_cols: csr.num_cols,
            row: NDArray::from_vec(rows, &[nnz])?,
            col: csr.indices.try_clone()?,
            data: copy_data(csr.data.as_ref())?,
        })
    })
}

pub(crate) fn csc_to_coo(csc: &CsrMatrix) -> Result<CooMatrix> {
    id_type_switch!(csc.index_dtype(), I => {
        let cols = expand_rows(csc.indptr.as_slice::<I>()?);
        let nnz = cols.len();
        Ok(CooMatrix {
            num_rows: csc.num_cols,
            num_cols: csc.num_rows,
            row: csc.indices.try_clone()?,
            col: NDArray::from_vec(cols, &[nnz])?,
            data: copy_data(csc.data.as_ref())?,
        })
    })
}
