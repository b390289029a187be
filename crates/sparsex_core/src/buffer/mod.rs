pub mod cpu;

use crate::{
    device::Device,
    dtype::DType,
    error::{Error, Result},
};
use cpu::CpuBuffer;
use std::ffi::c_void;

pub struct BufferManager {}

impl BufferManager {
    pub fn create(size: usize, device: Device, dtype: DType) -> Result<Box<dyn Buffer>> {
        let buffer: Box<dyn Buffer> = match device {
            Device::CPU => Box::new(CpuBuffer::new(size, dtype)?),
            Device::CUDA(_) => {
                return Err(Error::InvalidDevice(format!(
                    "no allocator for {}; supply the buffer through NDArray::from_buffer",
                    device.name()
                )))
            },
        };

        Ok(buffer)
    }
}

/// Raw storage behind an [`NDArray`](crate::array::NDArray).
///
/// Implementations outside this crate may describe memory on other devices; the
/// kernel layer only dereferences buffers whose device it has kernels for.
///
/// # Safety
/// When `device()` reports a host device, `as_ptr` and `as_mut_ptr` must point to
/// an allocation of at least `len() * dtype().size_in_bytes()` initialised bytes,
/// aligned for `dtype()`, that stays valid and unaliased for as long as the buffer
/// is borrowed. `len`, `dtype` and `device` must not change over the buffer's life.
pub unsafe trait Buffer: Send + Sync {
    fn as_ptr(&self) -> *const c_void;
    fn as_mut_ptr(&mut self) -> *mut c_void;
    /// Number of elements, not bytes.
    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn dtype(&self) -> DType;
    fn device(&self) -> Device;

    /// # Safety
    /// Requires a valid source pointer of `size_in_bytes` readable bytes with no memory overlap
    unsafe fn copy_from_host(&mut self, src: *const c_void, size_in_bytes: usize) -> Result<()>;

    /// # Safety
    /// Requires a valid destination pointer of `size_in_bytes` writable bytes with no memory overlap
    unsafe fn copy_to_host(&self, dest: *mut c_void, size_in_bytes: usize) -> Result<()>;
}
