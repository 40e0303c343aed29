use ndarray::{ArcArray, ArrayD, IxDyn};

use crate::autograd::{OpContext, Operator, SavedValue};
use crate::buffer::{with_buffer, with_buffer_pair, Buffer};
use crate::error::Result;
use crate::ops::arithmetic::broadcast_binary;
use crate::ops::expect_inputs;
use crate::ops::traits::LeafElement;

/// Rectified Linear Unit: `max(x, 0)`, element-wise.
///
/// Saves the input. The backward mask is `x >= 0`, so the gradient passes through
/// unchanged at exactly zero and is zeroed only where the input was negative.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReluOp;

fn relu_array<T: LeafElement>(x: &ArcArray<T, IxDyn>) -> ArrayD<T> {
    x.mapv(|v| if v < T::zero() { T::zero() } else { v })
}

fn relu_grad_array<T: LeafElement>(
    grad: &ArcArray<T, IxDyn>,
    input: &ArcArray<T, IxDyn>,
) -> Result<ArrayD<T>> {
    broadcast_binary("relu", grad, input, |g, x| if x >= T::zero() { g } else { T::zero() })
}

impl Operator for ReluOp {
    fn name(&self) -> &'static str {
        "relu"
    }

    fn arity(&self) -> usize {
        1
    }

    fn validate(&self, inputs: &[&Buffer]) -> Result<()> {
        expect_inputs(self.name(), inputs, 1)
    }

    fn forward(&self, ctx: &mut OpContext, inputs: &[&Buffer]) -> Result<Buffer> {
        expect_inputs(self.name(), inputs, 1)?;
        ctx.save_for_backward(SavedValue::Buffer(inputs[0].clone()));
        Ok(with_buffer!(inputs[0], x => Buffer::from_array(relu_array(x))))
    }

    fn backward(&self, ctx: &OpContext, grad_output: &Buffer) -> Result<Vec<Option<Buffer>>> {
        if !ctx.needs_input_grad(0) {
            return Ok(vec![None]);
        }
        let input = ctx.saved_buffer(0)?;
        let grad = with_buffer_pair!(self.name(), grad_output, input, (g, x) => {
            Buffer::from_array(relu_grad_array(g, x)?)
        })?;
        Ok(vec![Some(grad)])
    }
}

#[cfg(test)]
#[path = "relu_test.rs"]
mod tests;
