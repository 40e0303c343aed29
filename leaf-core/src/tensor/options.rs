use crate::device::StorageDevice;
use crate::types::DType;

/// Construction options for leaf tensors.
///
/// Defaults to `float32`, no gradient tracking, CPU.
///
/// ```
/// use leaf_core::{DType, TensorOptions};
///
/// let opts = TensorOptions::new().dtype(DType::F64).requires_grad(true);
/// assert!(opts.requires_grad);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TensorOptions {
    /// Element type the input is cast to.
    pub dtype: DType,
    /// Whether gradients must be tracked for the tensor.
    pub requires_grad: bool,
    /// Informational placement tag.
    pub device: StorageDevice,
}

impl TensorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dtype(mut self, dtype: DType) -> Self {
        self.dtype = dtype;
        self
    }

    pub fn requires_grad(mut self, requires_grad: bool) -> Self {
        self.requires_grad = requires_grad;
        self
    }

    pub fn device(mut self, device: StorageDevice) -> Self {
        self.device = device;
        self
    }
}
