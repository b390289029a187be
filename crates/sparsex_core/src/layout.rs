/// Shape and element strides of a dense array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    shape: Vec<usize>,
    strides: Vec<usize>,
}

impl Layout {
    pub fn new(shape: &[usize], strides: &[usize]) -> Self {
        Self {
            shape: shape.to_vec(),
            strides: strides.to_vec(),
        }
    }

    pub fn from_shape(shape: &[usize]) -> Self {
        Self {
            shape: shape.to_vec(),
            strides: Self::compute_strides(shape),
        }
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }
    pub fn size(&self) -> usize {
        Self::compute_size(&self.shape)
    }
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// Swaps two axes without moving data. Out-of-range axes are ignored.
    pub fn transpose(&mut self, dim0: usize, dim1: usize) {
        if dim0 >= self.ndim() || dim1 >= self.ndim() {
            return;
        }
        self.shape.swap(dim0, dim1);
        self.strides.swap(dim0, dim1);
    }

    /// Row-major check; axes of extent 1 may carry any stride.
    pub fn is_contiguous(&self) -> bool {
        let mut acc = 1;
        for d in (0..self.ndim()).rev() {
            if self.shape[d] > 1 && self.strides[d] != acc {
                return false;
            }
            acc *= self.shape[d];
        }
        true
    }

    /// Row-major strides for `shape`.
    pub fn compute_strides(shape: &[usize]) -> Vec<usize> {
        let mut strides = vec![1; shape.len()];
        for i in (1..shape.len()).rev() {
            strides[i - 1] = strides[i] * shape[i];
        }
        strides
    }

    pub fn compute_size(shape: &[usize]) -> usize {
        shape.iter().product()
    }
}
