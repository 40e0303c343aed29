use ndarray::{ArcArray, ArrayD, Axis, IxDyn};

use crate::buffer::{with_buffer, Buffer};
use crate::error::{LeafError, Result};
use crate::ops::traits::LeafElement;

/// Computes the broadcast shape of two shapes following NumPy rules.
///
/// Shapes are aligned on their trailing dimensions; a missing leading dimension
/// behaves like size 1, and a size-1 dimension stretches to match the other side.
pub fn broadcast_shapes(operation: &str, a: &[usize], b: &[usize]) -> Result<Vec<usize>> {
    let rank = a.len().max(b.len());
    let mut out = vec![0; rank];
    for i in 0..rank {
        let da = if i < rank - a.len() { 1 } else { a[i - (rank - a.len())] };
        let db = if i < rank - b.len() { 1 } else { b[i - (rank - b.len())] };
        out[i] = match (da, db) {
            (x, y) if x == y => x,
            (1, y) => y,
            (x, 1) => x,
            _ => {
                return Err(LeafError::BroadcastError {
                    operation: operation.to_string(),
                    shape1: a.to_vec(),
                    shape2: b.to_vec(),
                })
            }
        };
    }
    Ok(out)
}

/// Sums `grad` over every axis that broadcasting expanded, restoring `target`.
///
/// Leading axes absent from `target` are summed away; axes where `target` has
/// length 1 but `grad` does not are summed while keeping the axis.
pub(crate) fn reduce_array_to_shape<T: LeafElement>(
    grad: &ArcArray<T, IxDyn>,
    target: &[usize],
) -> Result<ArrayD<T>> {
    let mut out: ArrayD<T> = grad.to_owned();
    if out.shape() == target {
        return Ok(out);
    }
    if out.ndim() < target.len() {
        return Err(LeafError::InternalError(format!(
            "Cannot reduce shape {:?} to target {:?}: current rank < target rank",
            grad.shape(),
            target
        )));
    }
    while out.ndim() > target.len() {
        out = out.sum_axis(Axis(0));
    }
    for (axis, &dim) in target.iter().enumerate() {
        if dim == 1 && out.shape()[axis] != 1 {
            out = out.sum_axis(Axis(axis)).insert_axis(Axis(axis));
        }
    }
    if out.shape() != target {
        return Err(LeafError::InternalError(format!(
            "Cannot reduce shape {:?} to target {:?}: incompatible dimensions",
            grad.shape(),
            target
        )));
    }
    Ok(out)
}

/// Dtype-dispatching wrapper around [`reduce_array_to_shape`].
pub fn reduce_to_shape(grad: &Buffer, target: &[usize]) -> Result<Buffer> {
    if grad.shape() == target {
        return Ok(grad.clone());
    }
    with_buffer!(grad, g => reduce_array_to_shape(g, target).map(Buffer::from_array))
}
