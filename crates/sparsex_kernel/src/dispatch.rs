//! The kernel dispatch matrix.
//!
//! A request resolves to a [`DispatchKey`] (backend, index width, float precision)
//! and the key to one [`KernelTable`] in a [`KernelRegistry`]. Unknown dtypes and
//! keys without a registered table fail the same way, with `UnsupportedDispatch`.

use crate::{
    host,
    sddmm::SddmmCall,
    segment::{BackwardSegmentCmpCall, SegmentReduceCall},
    spmm::SpmmCall,
};
use half::{bf16, f16};
use sparsex_core::{
    device::Device,
    dtype::DType,
    error::{Error, Result},
};
use std::{collections::HashMap, fmt, sync::LazyLock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    Host,
    Accelerator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexWidth {
    I32,
    I64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Precision {
    F16,
    /// 16-bit with the exponent range of f32.
    BF16,
    F32,
    F64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DispatchKey {
    pub backend: Backend,
    pub index: IndexWidth,
    pub precision: Precision,
}

impl DispatchKey {
    pub const fn new(backend: Backend, index: IndexWidth, precision: Precision) -> Self {
        Self {
            backend,
            index,
            precision,
        }
    }

    /// Resolves the key for `op` from the primary device, the index dtype and the
    /// feature dtype.
    pub fn resolve(op: &'static str, device: Device, index: DType, precision: DType) -> Result<Self> {
        let unsupported = || Error::UnsupportedDispatch {
            op,
            device,
            index,
            precision,
        };
        let backend = match device {
            Device::CPU => Backend::Host,
            Device::CUDA(_) => Backend::Accelerator,
        };
        let index_width = match index {
            DType::I32 => IndexWidth::I32,
            DType::I64 => IndexWidth::I64,
            _ => return Err(unsupported()),
        };
        let float_precision = match precision {
            DType::F16 => Precision::F16,
            DType::BF16 => Precision::BF16,
            DType::F32 => Precision::F32,
            DType::F64 => Precision::F64,
            _ => return Err(unsupported()),
        };
        Ok(Self::new(backend, index_width, float_precision))
    }
}

impl fmt::Display for DispatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}/{:?}/{:?}", self.backend, self.index, self.precision)
    }
}

pub type SpmmKernel = fn(SpmmCall<'_>) -> Result<()>;
pub type SddmmKernel = fn(SddmmCall<'_>) -> Result<()>;
pub type SegmentReduceKernel = fn(SegmentReduceCall<'_>) -> Result<()>;
pub type BackwardSegmentCmpKernel = fn(BackwardSegmentCmpCall<'_>) -> Result<()>;

/// Kernels instantiated for one [`DispatchKey`].
#[derive(Clone, Copy)]
pub struct KernelTable {
    /// SpMM over an adjacency compressed by destination.
    pub spmm_csc: SpmmKernel,
    pub spmm_coo: SpmmKernel,
    /// SDDMM over an adjacency compressed by source.
    pub sddmm_csr: SddmmKernel,
    pub sddmm_coo: SddmmKernel,
    pub segment_reduce: SegmentReduceKernel,
    pub backward_segment_cmp: BackwardSegmentCmpKernel,
}

impl fmt::Debug for KernelTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KernelTable").finish_non_exhaustive()
    }
}

/// Registry of kernel tables keyed by [`DispatchKey`].
///
/// The process-wide registry returned by [`KernelRegistry::global`] is immutable
/// and holds the host kernels. Accelerator kernels live in other crates; build a
/// registry with [`KernelRegistry::with_host_kernels`], [`register`](Self::register)
/// them and call the entry points on it.
#[derive(Debug, Clone, Default)]
pub struct KernelRegistry {
    tables: HashMap<DispatchKey, KernelTable>,
}

macro_rules! register_host {
    ($registry:ident, $index:ident => $ity:ty, [$($prec:ident => $fty:ty),* $(,)?]) => {
        $(
            $registry.register(
                DispatchKey::new(Backend::Host, IndexWidth::$index, Precision::$prec),
                host::table::<$ity, $fty>(),
            );
        )*
    };
}

static GLOBAL: LazyLock<KernelRegistry> = LazyLock::new(KernelRegistry::with_host_kernels);

impl KernelRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// A registry holding host kernels for every index width and precision.
    pub fn with_host_kernels() -> Self {
        let mut registry = Self::empty();
        register_host!(registry, I32 => i32, [F16 => f16, BF16 => bf16, F32 => f32, F64 => f64]);
        register_host!(registry, I64 => i64, [F16 => f16, BF16 => bf16, F32 => f32, F64 => f64]);
        registry
    }

    pub fn global() -> &'static KernelRegistry {
        &GLOBAL
    }

    /// Adds or replaces the table for `key`, returning the previous one.
    pub fn register(&mut self, key: DispatchKey, table: KernelTable) -> Option<KernelTable> {
        self.tables.insert(key, table)
    }

    pub fn contains(&self, key: &DispatchKey) -> bool {
        self.tables.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &DispatchKey> {
        self.tables.keys()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Resolves and looks up in one step.
    pub fn resolve(&self, op: &'static str, device: Device, index: DType, precision: DType) -> Result<&KernelTable> {
        let key = DispatchKey::resolve(op, device, index, precision)?;
        self.tables.get(&key).ok_or(Error::UnsupportedDispatch {
            op,
            device,
            index,
            precision,
        })
    }
}
