use ndarray::{ArrayD, IxDyn};

use crate::autograd::{OpContext, Operator, SavedValue};
use crate::buffer::{with_buffer, Buffer};
use crate::error::Result;
use crate::ops::expect_inputs;
use crate::ops::traits::elem_sum;

use super::expand_reduced_grad;

/// Sum of all elements, producing a tensor of shape `[1]`. Integer sums wrap on
/// overflow.
///
/// Saves the input shape; the backward pass broadcasts the scalar gradient back
/// over it.
#[derive(Debug, Default, Clone, Copy)]
pub struct SumOp;

impl Operator for SumOp {
    fn name(&self) -> &'static str {
        "sum"
    }

    fn arity(&self) -> usize {
        1
    }

    fn validate(&self, inputs: &[&Buffer]) -> Result<()> {
        expect_inputs(self.name(), inputs, 1)
    }

    fn forward(&self, ctx: &mut OpContext, inputs: &[&Buffer]) -> Result<Buffer> {
        expect_inputs(self.name(), inputs, 1)?;
        ctx.save_for_backward(SavedValue::Shape(inputs[0].shape().to_vec()));
        Ok(with_buffer!(inputs[0], x => {
            Buffer::from_array(ArrayD::from_elem(IxDyn(&[1]), elem_sum(x.iter().copied())))
        }))
    }

    fn backward(&self, ctx: &OpContext, grad_output: &Buffer) -> Result<Vec<Option<Buffer>>> {
        if !ctx.needs_input_grad(0) {
            return Ok(vec![None]);
        }
        let shape = ctx.saved_shape(0)?;
        Ok(vec![Some(expand_reduced_grad(self.name(), grad_output, shape, 1.0)?)])
    }
}

#[cfg(test)]
#[path = "sum_test.rs"]
mod tests;
