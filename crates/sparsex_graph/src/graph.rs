use crate::{
    convert::{coo_to_csc, coo_to_csr, csc_to_coo, csr_to_coo},
    format::{FormatSet, SparseFormat},
    matrix::{CooMatrix, CsrMatrix},
};
use dashmap::{mapref::entry::Entry, DashMap};
use log::trace;
use sparsex_core::{
    array::NDArray,
    device::Device,
    dtype::DType,
    error::{Error, Result},
    id_type_switch,
    scalar::IndexType,
};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

/// One materialised adjacency.
#[derive(Debug, Clone)]
pub enum Adjacency {
    Coo(Arc<CooMatrix>),
    Csr(Arc<CsrMatrix>),
    Csc(Arc<CsrMatrix>),
}

impl Adjacency {
    pub fn format(&self) -> SparseFormat {
        match self {
            Adjacency::Coo(_) => SparseFormat::Coo,
            Adjacency::Csr(_) => SparseFormat::Csr,
            Adjacency::Csc(_) => SparseFormat::Csc,
        }
    }
}

/// The narrow view of a graph the kernel layer works against.
pub trait GraphQuery: Send + Sync {
    fn device(&self) -> Device;
    /// Integer type of every index array in the graph.
    fn index_dtype(&self) -> DType;
    fn num_edge_types(&self) -> usize;
    fn num_src(&self) -> usize;
    fn num_dst(&self) -> usize;
    fn num_edges(&self) -> usize;
    /// Formats already materialised.
    fn created_formats(&self) -> FormatSet;
    /// Formats the graph is permitted to hold, materialised or not.
    fn allowed_formats(&self) -> FormatSet;
    /// Returns the adjacency in `format`, building and caching it on first use.
    fn adjacency(&self, format: SparseFormat) -> Result<Adjacency>;

    fn coo(&self) -> Result<Arc<CooMatrix>> {
        match self.adjacency(SparseFormat::Coo)? {
            Adjacency::Coo(m) => Ok(m),
            other => Err(Error::InvalidArgument(format!("graph returned {} for a COO request", other.format()))),
        }
    }

    fn csr(&self) -> Result<Arc<CsrMatrix>> {
        match self.adjacency(SparseFormat::Csr)? {
            Adjacency::Csr(m) => Ok(m),
            other => Err(Error::InvalidArgument(format!("graph returned {} for a CSR request", other.format()))),
        }
    }

    fn csc(&self) -> Result<Arc<CsrMatrix>> {
        match self.adjacency(SparseFormat::Csc)? {
            Adjacency::Csc(m) => Ok(m),
            other => Err(Error::InvalidArgument(format!("graph returned {} for a CSC request", other.format()))),
        }
    }
}

/// A graph with a single edge relation from `num_src` source entities to `num_dst`
/// destination entities.
///
/// Adjacency formats are built lazily from whichever format the graph was created
/// with and cached for the lifetime of the graph. The cache is shared by every
/// caller; a format is built at most once even under concurrent requests.
#[derive(Debug)]
pub struct UnitGraph {
    num_src: usize,
    num_dst: usize,
    num_edges: usize,
    index_dtype: DType,
    device: Device,
    allowed: FormatSet,
    cache: DashMap<SparseFormat, Adjacency>,
    builds: [AtomicUsize; 3],
}

impl UnitGraph {
    /// Creates a graph from edge endpoint lists. Edge `i` runs from `src[i]` to `dst[i]`.
    pub fn from_edges<I: IndexType>(num_src: usize, num_dst: usize, src: Vec<I>, dst: Vec<I>) -> Result<Self> {
        let (n, m) = (src.len(), dst.len());
        Self::from_coo(CooMatrix {
            num_rows: num_src,
            num_cols: num_dst,
            row: NDArray::from_vec(src, &[n])?,
            col: NDArray::from_vec(dst, &[m])?,
            data: None,
        })
    }

    pub fn from_coo(coo: CooMatrix) -> Result<Self> {
        if coo.row.size() != coo.col.size() {
            return Err(Error::shape_mismatch(
                "col",
                format!("expected {} entries, got {}", coo.row.size(), coo.col.size()),
            ));
        }
        check_index_array(&coo.row, "row", coo.index_dtype(), coo.num_rows)?;
        check_index_array(&coo.col, "col", coo.index_dtype(), coo.num_cols)?;
        if let Some(data) = &coo.data {
            check_edge_ids(data, coo.index_dtype(), coo.nnz())?;
        }
        let (num_src, num_dst, num_edges) = (coo.num_rows, coo.num_cols, coo.nnz());
        Ok(Self::with_initial(num_src, num_dst, num_edges, Adjacency::Coo(Arc::new(coo))))
    }

    /// Creates a graph from an adjacency compressed by source.
    pub fn from_csr(csr: CsrMatrix) -> Result<Self> {
        check_compressed(&csr)?;
        let (num_src, num_dst, num_edges) = (csr.num_rows, csr.num_cols, csr.nnz());
        Ok(Self::with_initial(num_src, num_dst, num_edges, Adjacency::Csr(Arc::new(csr))))
    }

    /// Creates a graph from an adjacency compressed by destination. `csc.num_rows`
    /// is the destination count.
    pub fn from_csc(csc: CsrMatrix) -> Result<Self> {
        check_compressed(&csc)?;
        let (num_src, num_dst, num_edges) = (csc.num_cols, csc.num_rows, csc.nnz());
        Ok(Self::with_initial(num_src, num_dst, num_edges, Adjacency::Csc(Arc::new(csc))))
    }

    fn with_initial(num_src: usize, num_dst: usize, num_edges: usize, initial: Adjacency) -> Self {
        let (index_dtype, device) = match &initial {
            Adjacency::Coo(m) => (m.index_dtype(), m.device()),
            Adjacency::Csr(m) | Adjacency::Csc(m) => (m.index_dtype(), m.device()),
        };
        let cache = DashMap::with_capacity(3);
        cache.insert(initial.format(), initial);
        Self {
            num_src,
            num_dst,
            num_edges,
            index_dtype,
            device,
            allowed: FormatSet::ALL,
            cache,
            builds: [AtomicUsize::new(0), AtomicUsize::new(0), AtomicUsize::new(0)],
        }
    }

    /// Restricts which formats may be materialised. Formats already held stay available.
    pub fn with_allowed_formats(mut self, allowed: FormatSet) -> Self {
        self.allowed = allowed.intersect(FormatSet::ALL);
        for entry in self.cache.iter() {
            self.allowed = self.allowed.with(*entry.key());
        }
        self
    }

    /// Number of times `format` has been built by conversion.
    pub fn build_count(&self, format: SparseFormat) -> usize {
        self.builds[format.slot()].load(Ordering::Acquire)
    }

    /// A materialised format to convert into `target` from.
    fn conversion_source(&self, target: SparseFormat) -> Result<Adjacency> {
        if target != SparseFormat::Coo {
            if let Some(coo) = self.cache.get(&SparseFormat::Coo) {
                return Ok(coo.value().clone());
            }
        }
        [SparseFormat::Coo, SparseFormat::Csr, SparseFormat::Csc]
            .into_iter()
            .filter(|f| *f != target)
            .find_map(|f| self.cache.get(&f).map(|a| a.value().clone()))
            .ok_or_else(|| Error::InvalidArgument("graph holds no adjacency to convert from".into()))
    }

    fn convert(source: &Adjacency, target: SparseFormat) -> Result<Adjacency> {
        let coo = match source {
            Adjacency::Coo(m) => m.clone(),
            Adjacency::Csr(m) => Arc::new(csr_to_coo(m)?),
            Adjacency::Csc(m) => Arc::new(csc_to_coo(m)?),
        };
        Ok(match target {
            SparseFormat::Coo => Adjacency::Coo(coo),
            SparseFormat::Csr => Adjacency::Csr(Arc::new(coo_to_csr(&coo)?)),
            SparseFormat::Csc => Adjacency::Csc(Arc::new(coo_to_csc(&coo)?)),
        })
    }
}

impl GraphQuery for UnitGraph {
    fn device(&self) -> Device {
        self.device
    }

    fn index_dtype(&self) -> DType {
        self.index_dtype
    }

    fn num_edge_types(&self) -> usize {
        1
    }

    fn num_src(&self) -> usize {
        self.num_src
    }

    fn num_dst(&self) -> usize {
        self.num_dst
    }

    fn num_edges(&self) -> usize {
        self.num_edges
    }

    fn created_formats(&self) -> FormatSet {
        self.cache.iter().fold(FormatSet::EMPTY, |set, e| set.with(*e.key()))
    }

    fn allowed_formats(&self) -> FormatSet {
        self.allowed
    }

    fn adjacency(&self, format: SparseFormat) -> Result<Adjacency> {
        if let Some(adj) = self.cache.get(&format) {
            return Ok(adj.value().clone());
        }
        if !self.allowed.contains(format) {
            return Err(Error::UnsupportedFormat {
                op: "graph",
                allowed: self.allowed.to_string(),
            });
        }
        if !self.device.is_host() {
            return Err(Error::InvalidDevice(format!(
                "cannot build {} on {}",
                format,
                self.device.name()
            )));
        }

        // The source is fetched before the entry lock is taken; conversion never
        // touches the map, so the shard lock is not re-entered.
        let source = self.conversion_source(format)?;
        match self.cache.entry(format) {
            Entry::Occupied(e) => Ok(e.get().clone()),
            Entry::Vacant(v) => {
                trace!("building {} adjacency from {}", format, source.format());
                let built = Self::convert(&source, format)?;
                self.builds[format.slot()].fetch_add(1, Ordering::AcqRel);
                v.insert(built.clone());
                Ok(built)
            },
        }
    }
}

fn check_index_array(array: &NDArray, name: &str, dtype: DType, bound: usize) -> Result<()> {
    if !dtype.is_index() {
        return Err(Error::InvalidArgument(format!("graph indices must be i32 or i64, got {}", dtype)));
    }
    if array.dtype() != dtype {
        return Err(Error::DTypeMismatch {
            name: name.to_string(),
            expected: dtype,
            got: array.dtype(),
        });
    }
    if array.ndim() != 1 {
        return Err(Error::shape_mismatch(name, format!("expected a 1-D index array, got {:?}", array.shape())));
    }
    if !array.device().is_host() {
        return Ok(());
    }
    id_type_switch!(dtype, I => {
        for &v in array.as_slice::<I>()? {
            if v.to_i64() < 0 || v.to_usize() >= bound {
                return Err(Error::IndexOutOfBounds { index: v.to_i64(), size: bound });
            }
        }
        Ok(())
    })
}

/// Edge ids must name every edge exactly once.
fn check_edge_ids(data: &NDArray, dtype: DType, nnz: usize) -> Result<()> {
    check_index_array(data, "data", dtype, nnz)?;
    if data.size() != nnz {
        return Err(Error::shape_mismatch("data", format!("expected {} edge ids, got {}", nnz, data.size())));
    }
    if !data.device().is_host() {
        return Ok(());
    }
    id_type_switch!(dtype, I => {
        let mut seen = vec![false; nnz];
        for &v in data.as_slice::<I>()? {
            let id = v.to_usize();
            if seen[id] {
                return Err(Error::InvalidArgument(format!("edge id {} appears more than once", id)));
            }
            seen[id] = true;
        }
        Ok(())
    })
}

fn check_compressed(m: &CsrMatrix) -> Result<()> {
    let dtype = m.index_dtype();
    if m.indptr.size() != m.num_rows + 1 {
        return Err(Error::shape_mismatch(
            "indptr",
            format!("expected {} entries, got {}", m.num_rows + 1, m.indptr.size()),
        ));
    }
    check_index_array(&m.indices, "indices", dtype, m.num_cols)?;
    if let Some(data) = &m.data {
        check_edge_ids(data, dtype, m.nnz())?;
    }
    if !m.device().is_host() {
        return Ok(());
    }
    id_type_switch!(dtype, I => {
        let indptr = m.indptr.as_slice::<I>()?;
        let monotone = indptr.windows(2).all(|w| w[0] <= w[1]);
        if indptr[0].to_i64() != 0 || !monotone || indptr[m.num_rows].to_usize() != m.nnz() {
            return Err(Error::InvalidArgument(
                "indptr must start at 0, be non-decreasing and end at nnz".into(),
            ));
        }
        Ok(())
    })
}
