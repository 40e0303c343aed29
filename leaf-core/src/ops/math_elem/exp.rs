use crate::autograd::{OpContext, Operator, SavedValue};
use crate::buffer::{with_float_buffer, Buffer};
use crate::error::Result;
use crate::ops::arithmetic::mul_buffers;

use super::validate_float_unary;

/// Element-wise exponential \( e^{x} \).
///
/// The input is clipped to \([-50, 50]\) before exponentiation so large inputs
/// saturate instead of overflowing. The forward result is saved, since
/// \( \frac{d}{dx} e^{x} = e^{x} \):
/// \\[ \frac{dL}{dx} = \frac{dL}{dz} \cdot z \\]
/// Outside the clipping range the gradient is the saturated output, not zero.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExpOp;

impl Operator for ExpOp {
    fn name(&self) -> &'static str {
        "exp"
    }

    fn arity(&self) -> usize {
        1
    }

    fn validate(&self, inputs: &[&Buffer]) -> Result<()> {
        validate_float_unary(self.name(), inputs)
    }

    fn forward(&self, ctx: &mut OpContext, inputs: &[&Buffer]) -> Result<Buffer> {
        validate_float_unary(self.name(), inputs)?;
        // Clip bound: exp(50) is still finite in f32.
        let output = with_float_buffer!(self.name(), inputs[0], x => {
            Buffer::from_array(x.mapv(|v| v.clamp(-50.0, 50.0).exp()))
        })?;
        ctx.save_for_backward(SavedValue::Buffer(output.clone()));
        Ok(output)
    }

    fn backward(&self, ctx: &OpContext, grad_output: &Buffer) -> Result<Vec<Option<Buffer>>> {
        if !ctx.needs_input_grad(0) {
            return Ok(vec![None]);
        }
        let result = ctx.saved_buffer(0)?;
        Ok(vec![Some(mul_buffers(self.name(), grad_output, result)?)])
    }
}

#[cfg(test)]
#[path = "exp_test.rs"]
mod tests;
