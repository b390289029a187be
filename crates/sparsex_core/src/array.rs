use crate::{
    buffer::{Buffer, BufferManager},
    device::{get_default_device, Device},
    dtype::DType,
    error::{Error, Result},
    layout::Layout,
    scalar::Scalar,
};
use std::ffi::c_void;

/// Dense n-dimensional array: a device buffer viewed through a [`Layout`].
///
/// Absent arguments are expressed as `Option<&NDArray>` rather than a null array.
pub struct NDArray {
    buffer: Box<dyn Buffer>,
    layout: Layout,
}

impl NDArray {
    /// Wraps an existing buffer. The buffer must hold exactly `shape.iter().product()` elements.
    ///
    /// Host access through [`as_slice`](Self::as_slice) trusts the [`Buffer`] contract.
    pub fn from_buffer(buffer: Box<dyn Buffer>, shape: &[usize]) -> Result<Self> {
        let size = Layout::compute_size(shape);
        if buffer.len() != size {
            return Err(Error::InvalidArgument(format!(
                "buffer holds {} elements but shape {:?} needs {}",
                buffer.len(),
                shape,
                size
            )));
        }
        Ok(Self {
            buffer,
            layout: Layout::from_shape(shape),
        })
    }

    pub fn from_vec<T: Scalar>(data: Vec<T>, shape: &[usize]) -> Result<Self> {
        Self::from_slice(&data, shape)
    }

    pub fn from_slice<T: Scalar>(data: &[T], shape: &[usize]) -> Result<Self> {
        let size = Layout::compute_size(shape);
        if data.len() != size {
            return Err(Error::InvalidArgument(format!(
                "{} elements cannot fill shape {:?}",
                data.len(),
                shape
            )));
        }
        let mut buffer = BufferManager::create(size, Device::CPU, T::DTYPE)?;
        unsafe {
            buffer.copy_from_host(data.as_ptr() as *const c_void, std::mem::size_of_val(data))?;
        }
        Ok(Self {
            buffer,
            layout: Layout::from_shape(shape),
        })
    }

    pub fn zeros(shape: &[usize], dtype: DType) -> Result<Self> {
        Self::zeros_on(shape, dtype, get_default_device())
    }

    pub fn zeros_on(shape: &[usize], dtype: DType, device: Device) -> Result<Self> {
        let buffer = BufferManager::create(Layout::compute_size(shape), device, dtype)?;
        Ok(Self {
            buffer,
            layout: Layout::from_shape(shape),
        })
    }

    pub fn full<T: Scalar>(shape: &[usize], value: T) -> Result<Self> {
        Self::from_vec(vec![value; Layout::compute_size(shape)], shape)
    }

    /// Returns a view with `dim0` and `dim1` swapped. The data is not moved, so the
    /// result is generally not contiguous.
    pub fn transpose(mut self, dim0: usize, dim1: usize) -> Self {
        self.layout.transpose(dim0, dim1);
        self
    }

    pub fn device(&self) -> Device {
        self.buffer.device()
    }
    pub fn dtype(&self) -> DType {
        self.buffer.dtype()
    }
    pub fn layout(&self) -> &Layout {
        &self.layout
    }
    pub fn shape(&self) -> &[usize] {
        self.layout.shape()
    }
    pub fn strides(&self) -> &[usize] {
        self.layout.strides()
    }
    pub fn ndim(&self) -> usize {
        self.layout.ndim()
    }
    pub fn size(&self) -> usize {
        self.layout.size()
    }
    pub fn is_contiguous(&self) -> bool {
        self.layout.is_contiguous()
    }

    pub fn buffer(&self) -> &dyn Buffer {
        self.buffer.as_ref()
    }

    /// Typed view of host memory. Fails on dtype mismatch, non-host device or
    /// non-contiguous layout.
    pub fn as_slice<T: Scalar>(&self) -> Result<&[T]> {
        self.check_host_access::<T>()?;
        let len = self.size();
        if len == 0 {
            return Ok(&[]);
        }
        Ok(unsafe { std::slice::from_raw_parts(self.buffer.as_ptr() as *const T, len) })
    }

    pub fn as_mut_slice<T: Scalar>(&mut self) -> Result<&mut [T]> {
        self.check_host_access::<T>()?;
        let len = self.size();
        if len == 0 {
            return Ok(&mut []);
        }
        Ok(unsafe { std::slice::from_raw_parts_mut(self.buffer.as_mut_ptr() as *mut T, len) })
    }

    /// Copies the logical contents, honouring strides, into a row-major `Vec`.
    pub fn to_vec<T: Scalar>(&self) -> Result<Vec<T>> {
        if self.dtype() != T::DTYPE {
            return Err(Error::DTypeMismatch {
                name: "array".into(),
                expected: T::DTYPE,
                got: self.dtype(),
            });
        }
        let mut raw = vec![T::default(); self.buffer.len()];
        unsafe {
            self.buffer
                .copy_to_host(raw.as_mut_ptr() as *mut c_void, std::mem::size_of_val(raw.as_slice()))?;
        }
        if self.is_contiguous() {
            raw.truncate(self.size());
            return Ok(raw);
        }

        let shape = self.shape();
        let strides = self.strides();
        let out = (0..self.size())
            .map(|i| {
                let mut rem = i;
                let mut offset = 0;
                for d in (0..shape.len()).rev() {
                    offset += (rem % shape[d]) * strides[d];
                    rem /= shape[d];
                }
                raw[offset]
            })
            .collect();
        Ok(out)
    }

    pub fn try_clone(&self) -> Result<Self> {
        let mut buffer = BufferManager::create(self.buffer.len(), self.device(), self.dtype())?;
        let size_in_bytes = self.buffer.len() * self.dtype().size_in_bytes();
        let mut staging = vec![0u64; size_in_bytes.div_ceil(8)];
        unsafe {
            self.buffer.copy_to_host(staging.as_mut_ptr() as *mut c_void, size_in_bytes)?;
            buffer.copy_from_host(staging.as_ptr() as *const c_void, size_in_bytes)?;
        }
        Ok(Self {
            buffer,
            layout: self.layout.clone(),
        })
    }

    fn check_host_access<T: Scalar>(&self) -> Result<()> {
        if self.dtype() != T::DTYPE {
            return Err(Error::DTypeMismatch {
                name: "array".into(),
                expected: T::DTYPE,
                got: self.dtype(),
            });
        }
        if !self.device().is_host() {
            return Err(Error::InvalidDevice(format!(
                "host access to an array on {}",
                self.device().name()
            )));
        }
        if !self.is_contiguous() {
            return Err(Error::NotContiguous { name: "array".into() });
        }
        Ok(())
    }
}

impl std::fmt::Debug for NDArray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NDArray")
            .field("device", &self.device())
            .field("dtype", &self.dtype())
            .field("shape", &self.shape())
            .field("strides", &self.strides())
            .finish()
    }
}
