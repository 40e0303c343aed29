use crate::autograd::{OpContext, Operator, SavedValue};
use crate::buffer::Buffer;
use crate::error::Result;
use crate::tensor::broadcast_utils::reduce_to_shape;

use super::{neg_buffer, sub_buffers, validate_binary};

/// Element-wise `a - b` with broadcasting.
#[derive(Debug, Default, Clone, Copy)]
pub struct SubOp;

impl Operator for SubOp {
    fn name(&self) -> &'static str {
        "sub"
    }

    fn arity(&self) -> usize {
        2
    }

    fn validate(&self, inputs: &[&Buffer]) -> Result<()> {
        validate_binary(self.name(), inputs)
    }

    fn forward(&self, ctx: &mut OpContext, inputs: &[&Buffer]) -> Result<Buffer> {
        validate_binary(self.name(), inputs)?;
        ctx.save_for_backward(SavedValue::Shape(inputs[0].shape().to_vec()));
        ctx.save_for_backward(SavedValue::Shape(inputs[1].shape().to_vec()));
        sub_buffers(self.name(), inputs[0], inputs[1])
    }

    fn backward(&self, ctx: &OpContext, grad_output: &Buffer) -> Result<Vec<Option<Buffer>>> {
        let grad_a = if ctx.needs_input_grad(0) {
            Some(reduce_to_shape(grad_output, ctx.saved_shape(0)?)?)
        } else {
            None
        };
        let grad_b = if ctx.needs_input_grad(1) {
            Some(reduce_to_shape(&neg_buffer(grad_output), ctx.saved_shape(1)?)?)
        } else {
            None
        };
        Ok(vec![grad_a, grad_b])
    }
}

#[cfg(test)]
#[path = "sub_test.rs"]
mod tests;
