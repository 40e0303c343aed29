use crate::autograd::{OpContext, Operator, SavedValue};
use crate::buffer::Buffer;
use crate::error::Result;
use crate::tensor::broadcast_utils::reduce_to_shape;

use super::{mul_buffers, validate_binary};

/// Element-wise `a * b` with broadcasting.
///
/// Saves both operands: `grad_a = reduce(g * b)`, `grad_b = reduce(g * a)`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MulOp;

impl Operator for MulOp {
    fn name(&self) -> &'static str {
        "mul"
    }

    fn arity(&self) -> usize {
        2
    }

    fn validate(&self, inputs: &[&Buffer]) -> Result<()> {
        validate_binary(self.name(), inputs)
    }

    fn forward(&self, ctx: &mut OpContext, inputs: &[&Buffer]) -> Result<Buffer> {
        validate_binary(self.name(), inputs)?;
        ctx.save_for_backward(SavedValue::Buffer(inputs[0].clone()));
        ctx.save_for_backward(SavedValue::Buffer(inputs[1].clone()));
        mul_buffers(self.name(), inputs[0], inputs[1])
    }

    fn backward(&self, ctx: &OpContext, grad_output: &Buffer) -> Result<Vec<Option<Buffer>>> {
        let a = ctx.saved_buffer(0)?;
        let b = ctx.saved_buffer(1)?;
        let grad_a = if ctx.needs_input_grad(0) {
            let unreduced = mul_buffers(self.name(), grad_output, b)?;
            Some(reduce_to_shape(&unreduced, a.shape())?)
        } else {
            None
        };
        let grad_b = if ctx.needs_input_grad(1) {
            let unreduced = mul_buffers(self.name(), grad_output, a)?;
            Some(reduce_to_shape(&unreduced, b.shape())?)
        } else {
            None
        };
        Ok(vec![grad_a, grad_b])
    }
}

#[cfg(test)]
#[path = "mul_test.rs"]
mod tests;
