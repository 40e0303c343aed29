//! Broadcasting element-wise arithmetic.

use ndarray::{ArcArray, ArrayD, IxDyn, Zip};

use crate::buffer::{with_buffer, with_buffer_pair, Buffer};
use crate::error::{LeafError, Result};
use crate::ops::traits::LeafElement;
use crate::tensor::broadcast_utils::broadcast_shapes;

pub mod add;
pub mod mul;
pub mod sub;

pub use add::AddOp;
pub use mul::MulOp;
pub use sub::SubOp;

/// Applies `f` element by element after broadcasting `a` and `b` to a common shape.
pub(crate) fn broadcast_binary<T, F>(
    operation: &str,
    a: &ArcArray<T, IxDyn>,
    b: &ArcArray<T, IxDyn>,
    f: F,
) -> Result<ArrayD<T>>
where
    T: LeafElement,
    F: Fn(T, T) -> T,
{
    let shape = broadcast_shapes(operation, a.shape(), b.shape())?;
    let internal = || {
        LeafError::InternalError(format!(
            "{}: broadcast of {:?} and {:?} to {:?} failed",
            operation,
            a.shape(),
            b.shape(),
            shape
        ))
    };
    let a_view = a.broadcast(IxDyn(&shape)).ok_or_else(internal)?;
    let b_view = b.broadcast(IxDyn(&shape)).ok_or_else(internal)?;
    Ok(Zip::from(&a_view)
        .and(&b_view)
        .map_collect(|&x, &y| f(x, y)))
}

/// Shape and dtype check shared by the binary operators.
pub(crate) fn validate_binary(operation: &str, inputs: &[&Buffer]) -> Result<()> {
    crate::ops::expect_inputs(operation, inputs, 2)?;
    let (a, b) = (inputs[0], inputs[1]);
    if a.dtype() != b.dtype() {
        return Err(LeafError::DTypeMismatch {
            operation: operation.to_string(),
            expected: a.dtype(),
            actual: b.dtype(),
        });
    }
    broadcast_shapes(operation, a.shape(), b.shape()).map(|_| ())
}

pub(crate) fn add_buffers(operation: &str, a: &Buffer, b: &Buffer) -> Result<Buffer> {
    with_buffer_pair!(operation, a, b, (x, y) => {
        Buffer::from_array(broadcast_binary(operation, x, y, |p, q| p.elem_add(q))?)
    })
}

pub(crate) fn sub_buffers(operation: &str, a: &Buffer, b: &Buffer) -> Result<Buffer> {
    with_buffer_pair!(operation, a, b, (x, y) => {
        Buffer::from_array(broadcast_binary(operation, x, y, |p, q| p.elem_sub(q))?)
    })
}

pub(crate) fn mul_buffers(operation: &str, a: &Buffer, b: &Buffer) -> Result<Buffer> {
    with_buffer_pair!(operation, a, b, (x, y) => {
        Buffer::from_array(broadcast_binary(operation, x, y, |p, q| p.elem_mul(q))?)
    })
}

pub(crate) fn neg_buffer(a: &Buffer) -> Buffer {
    with_buffer!(a, x => Buffer::from_array(x.mapv(LeafElement::elem_neg)))
}
