//! Full reductions. Every reduction collapses its input to shape `[1]`.

use crate::buffer::Buffer;
use crate::error::{LeafError, Result};

pub mod mean;
pub mod sum;

pub use mean::MeanOp;
pub use sum::SumOp;

/// Spreads the single element of `grad` over `shape`, multiplied by `scale`.
///
/// Also covers a 0-d `shape`, which ndarray cannot broadcast `[1]` to.
pub(crate) fn expand_reduced_grad(
    operation: &str,
    grad: &Buffer,
    shape: &[usize],
    scale: f64,
) -> Result<Buffer> {
    let value = grad.item().ok_or_else(|| {
        LeafError::InternalError(format!(
            "{} backward expected a one-element gradient, got shape {:?}",
            operation,
            grad.shape()
        ))
    })?;
    Buffer::full(grad.dtype(), shape, value * scale)
}
