#![allow(dead_code)]

use sparsex_core::{
    array::NDArray,
    bf16,
    buffer::Buffer,
    device::Device,
    dtype::DType,
    error::{Error, Result},
    f16,
};
use sparsex_graph::{CooMatrix, CsrMatrix, UnitGraph};
use std::{ffi::c_void, ptr};

pub fn setup_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn feature(data: Vec<f32>, dtype: DType, shape: &[usize]) -> Result<NDArray> {
    match dtype {
        DType::F32 => NDArray::from_vec(data, shape),
        DType::F64 => NDArray::from_vec(data.into_iter().map(f64::from).collect::<Vec<_>>(), shape),
        DType::F16 => NDArray::from_vec(data.into_iter().map(f16::from_f32).collect::<Vec<_>>(), shape),
        DType::BF16 => NDArray::from_vec(data.into_iter().map(bf16::from_f32).collect::<Vec<_>>(), shape),
        other => Err(Error::InvalidArgument(format!("{} is not a feature dtype", other))),
    }
}

pub fn filled(value: f32, dtype: DType, shape: &[usize]) -> Result<NDArray> {
    feature(vec![value; shape.iter().product()], dtype, shape)
}

pub fn to_f32(array: &NDArray) -> Result<Vec<f32>> {
    match array.dtype() {
        DType::F32 => array.to_vec::<f32>(),
        DType::F64 => Ok(array.to_vec::<f64>()?.into_iter().map(|v| v as f32).collect()),
        DType::F16 => Ok(array.to_vec::<f16>()?.into_iter().map(f16::to_f32).collect()),
        DType::BF16 => Ok(array.to_vec::<bf16>()?.into_iter().map(bf16::to_f32).collect()),
        other => Err(Error::InvalidArgument(format!("{} is not a feature dtype", other))),
    }
}

pub fn index(data: Vec<i64>, dtype: DType, shape: &[usize]) -> Result<NDArray> {
    match dtype {
        DType::I64 => NDArray::from_vec(data, shape),
        DType::I32 => NDArray::from_vec(data.into_iter().map(|v| v as i32).collect::<Vec<_>>(), shape),
        other => Err(Error::InvalidArgument(format!("{} is not an index dtype", other))),
    }
}

pub fn to_i64(array: &NDArray) -> Result<Vec<i64>> {
    match array.dtype() {
        DType::I64 => array.to_vec::<i64>(),
        DType::I32 => Ok(array.to_vec::<i32>()?.into_iter().map(i64::from).collect()),
        other => Err(Error::InvalidArgument(format!("{} is not an index dtype", other))),
    }
}

pub fn tolerance(dtype: DType) -> f32 {
    match dtype {
        DType::BF16 => 5e-2,
        DType::F16 => 1e-2,
        _ => 1e-5,
    }
}

pub fn assert_close(actual: &[f32], expected: &[f32], dtype: DType) {
    assert_eq!(actual.len(), expected.len(), "length mismatch: {:?} vs {:?}", actual, expected);
    let tol = tolerance(dtype);
    for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
        assert!(
            (a - e).abs() <= tol * e.abs().max(1.0),
            "element {} of {:?}: expected {} but got {} (tolerance: {})",
            i,
            dtype,
            e,
            a,
            tol
        );
    }
}

// Edges, in id order: 0->1, 1->0, 2->1, 0->1, 1->0. Destination 2 has no incoming edge.
pub const NUM_SRC: usize = 3;
pub const NUM_DST: usize = 3;
pub const NUM_EDGES: usize = 5;
pub const SRC: [i64; 5] = [0, 1, 2, 0, 1];
pub const DST: [i64; 5] = [1, 0, 1, 1, 0];

/// The fixture graph held as a coordinate list.
pub fn coo_graph(index_dtype: DType) -> Result<UnitGraph> {
    UnitGraph::from_coo(CooMatrix {
        num_rows: NUM_SRC,
        num_cols: NUM_DST,
        row: index(SRC.to_vec(), index_dtype, &[NUM_EDGES])?,
        col: index(DST.to_vec(), index_dtype, &[NUM_EDGES])?,
        data: None,
    })
}

/// The fixture graph held only as compressed-by-source.
pub fn csr_graph(index_dtype: DType) -> Result<UnitGraph> {
    UnitGraph::from_csr(CsrMatrix {
        num_rows: NUM_SRC,
        num_cols: NUM_DST,
        indptr: index(vec![0, 2, 4, 5], index_dtype, &[NUM_SRC + 1])?,
        indices: index(vec![1, 1, 0, 0, 1], index_dtype, &[NUM_EDGES])?,
        data: Some(index(vec![0, 3, 1, 4, 2], index_dtype, &[NUM_EDGES])?),
    })
}

/// The fixture graph held only as compressed-by-destination.
pub fn csc_graph(index_dtype: DType) -> Result<UnitGraph> {
    UnitGraph::from_csc(CsrMatrix {
        num_rows: NUM_DST,
        num_cols: NUM_SRC,
        indptr: index(vec![0, 2, 5, 5], index_dtype, &[NUM_DST + 1])?,
        indices: index(vec![1, 1, 0, 2, 0], index_dtype, &[NUM_EDGES])?,
        data: Some(index(vec![1, 4, 0, 2, 3], index_dtype, &[NUM_EDGES])?),
    })
}

/// Host bytes that report living on an accelerator. Lets tests build arrays and
/// graphs on a device the crate has no allocator or kernels for.
pub struct RemoteBuffer {
    data: Vec<u64>,
    len: usize,
    dtype: DType,
    device: Device,
}

impl RemoteBuffer {
    pub fn new(len: usize, dtype: DType, device: Device) -> Self {
        Self {
            data: vec![0; (len * dtype.size_in_bytes()).div_ceil(8)],
            len,
            dtype,
            device,
        }
    }
}

// SAFETY: `data` covers `len` elements of `dtype` in 8-byte words.
unsafe impl Buffer for RemoteBuffer {
    fn as_ptr(&self) -> *const c_void {
        self.data.as_ptr() as *const _
    }

    fn as_mut_ptr(&mut self) -> *mut c_void {
        self.data.as_mut_ptr() as *mut _
    }

    fn len(&self) -> usize {
        self.len
    }

    fn dtype(&self) -> DType {
        self.dtype
    }

    fn device(&self) -> Device {
        self.device
    }

    unsafe fn copy_from_host(&mut self, src: *const c_void, size_in_bytes: usize) -> Result<()> {
        ptr::copy_nonoverlapping(src as *const u8, self.data.as_mut_ptr() as *mut u8, size_in_bytes);
        Ok(())
    }

    unsafe fn copy_to_host(&self, dest: *mut c_void, size_in_bytes: usize) -> Result<()> {
        ptr::copy_nonoverlapping(self.data.as_ptr() as *const u8, dest as *mut u8, size_in_bytes);
        Ok(())
    }
}

pub fn remote(shape: &[usize], dtype: DType) -> Result<NDArray> {
    let len = shape.iter().product();
    NDArray::from_buffer(Box::new(RemoteBuffer::new(len, dtype, Device::CUDA(0))), shape)
}

/// The fixture graph with its coordinate list on the accelerator.
pub fn remote_graph(index_dtype: DType) -> Result<UnitGraph> {
    UnitGraph::from_coo(CooMatrix {
        num_rows: NUM_SRC,
        num_cols: NUM_DST,
        row: remote(&[NUM_EDGES], index_dtype)?,
        col: remote(&[NUM_EDGES], index_dtype)?,
        data: None,
    })
}

#[macro_export]
macro_rules! test_kernels {
    ([$($op:ident),* $(,)?]) => {
        $(
            mod $op {
                use super::*;
                use paste::paste;

                paste! {
                    #[test]
                    fn i32_bf16() -> Result<()> {
                        test_functions::[<$op _test>](DType::I32, DType::BF16)
                    }

                    #[test]
                    fn i32_f16() -> Result<()> {
                        test_functions::[<$op _test>](DType::I32, DType::F16)
                    }

                    #[test]
                    fn i32_f32() -> Result<()> {
                        test_functions::[<$op _test>](DType::I32, DType::F32)
                    }

                    #[test]
                    fn i32_f64() -> Result<()> {
                        test_functions::[<$op _test>](DType::I32, DType::F64)
                    }

                    #[test]
                    fn i64_bf16() -> Result<()> {
                        test_functions::[<$op _test>](DType::I64, DType::BF16)
                    }

                    #[test]
                    fn i64_f16() -> Result<()> {
                        test_functions::[<$op _test>](DType::I64, DType::F16)
                    }

                    #[test]
                    fn i64_f32() -> Result<()> {
                        test_functions::[<$op _test>](DType::I64, DType::F32)
                    }

                    #[test]
                    fn i64_f64() -> Result<()> {
                        test_functions::[<$op _test>](DType::I64, DType::F64)
                    }
                }
            }
        )*
    };
}
