use crate::autograd::OpContext;
use crate::buffer::Buffer;
use crate::device::StorageDevice;
use crate::types::DType;

/// Internal storage and metadata for one vertex of the computation graph.
///
/// Nodes live in the [`Graph`](crate::Graph) arena and are addressed by
/// [`TensorId`](crate::TensorId). Data, shape and linkage never change after
/// construction; only `grad` is written, and only by the backward pass or by an
/// explicit user call.
#[derive(Debug)]
pub struct TensorData {
    /// The values of the tensor. Its shape is the tensor's shape.
    pub(crate) data: Buffer,
    /// Informational placement tag.
    pub(crate) device: StorageDevice,
    /// Flag indicating if the tensor requires gradient computation.
    pub(crate) requires_grad: bool,
    /// The gradient, same shape and dtype as `data`, once populated.
    pub(crate) grad: Option<Buffer>,
    /// The producing context. Leaf tensors (created directly by the user) have `grad_fn = None`.
    /// The node owns its context exclusively.
    pub(crate) grad_fn: Option<OpContext>,
}

impl TensorData {
    /// A leaf node: no producing context.
    pub(crate) fn new_leaf(data: Buffer, requires_grad: bool, device: StorageDevice) -> Self {
        TensorData {
            data,
            device,
            requires_grad,
            grad: None,
            grad_fn: None,
        }
    }

    /// The output node of an operator application.
    pub(crate) fn from_op(data: Buffer, device: StorageDevice, ctx: OpContext) -> Self {
        TensorData {
            data,
            device,
            requires_grad: ctx.requires_grad(),
            grad: None,
            grad_fn: Some(ctx),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.grad_fn.is_none()
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    pub fn dtype(&self) -> DType {
        self.data.dtype()
    }

    pub fn numel(&self) -> usize {
        self.data.numel()
    }
}
