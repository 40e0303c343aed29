use ndarray::{ArcArray, ArrayD, IxDyn};

use crate::autograd::{OpContext, Operator, SavedValue};
use crate::buffer::{with_float_buffer, Buffer};
use crate::error::{LeafError, Result};
use crate::ops::math_elem::validate_float_unary;
use crate::ops::traits::LeafFloat;

use super::expand_reduced_grad;

/// Arithmetic mean of all elements, producing a tensor of shape `[1]`.
///
/// Float dtypes only. The mean of an empty tensor is NaN. Backward spreads
/// `grad / n` over the input shape.
#[derive(Debug, Default, Clone, Copy)]
pub struct MeanOp;

fn mean_array<T: LeafFloat>(x: &ArcArray<T, IxDyn>) -> Result<ArrayD<T>> {
    let n = T::from_usize(x.len()).ok_or_else(|| {
        LeafError::InternalError(format!("mean: element count {} not representable", x.len()))
    })?;
    Ok(ArrayD::from_elem(IxDyn(&[1]), x.sum() / n))
}

impl Operator for MeanOp {
    fn name(&self) -> &'static str {
        "mean"
    }

    fn arity(&self) -> usize {
        1
    }

    fn validate(&self, inputs: &[&Buffer]) -> Result<()> {
        validate_float_unary(self.name(), inputs)
    }

    fn forward(&self, ctx: &mut OpContext, inputs: &[&Buffer]) -> Result<Buffer> {
        validate_float_unary(self.name(), inputs)?;
        ctx.save_for_backward(SavedValue::Shape(inputs[0].shape().to_vec()));
        with_float_buffer!(self.name(), inputs[0], x => Buffer::from_array(mean_array(x)?))
    }

    fn backward(&self, ctx: &OpContext, grad_output: &Buffer) -> Result<Vec<Option<Buffer>>> {
        if !ctx.needs_input_grad(0) {
            return Ok(vec![None]);
        }
        let shape = ctx.saved_shape(0)?;
        let n: usize = shape.iter().product();
        let grad = expand_reduced_grad(self.name(), grad_output, shape, 1.0 / n as f64)?;
        Ok(vec![Some(grad)])
    }
}

#[cfg(test)]
#[path = "mean_test.rs"]
mod tests;
