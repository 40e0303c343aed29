use crate::autograd::{OpContext, Operator, SavedValue};
use crate::buffer::{with_float_buffer, with_float_pair, Buffer};
use crate::error::Result;
use crate::ops::arithmetic::broadcast_binary;

use super::validate_float_unary;

/// Element-wise natural logarithm \( \ln(x) \), registered as `"log"`.
///
/// Saves the input, since \( \frac{d}{dx} \ln(x) = \frac{1}{x} \):
/// \\[ \frac{dL}{dx} = \frac{dL}{dz} \cdot \frac{1}{x} \\]
///
/// # Domain Considerations
/// Non-positive inputs follow IEEE semantics: `ln(0) = -inf`, `ln(x < 0) = NaN`,
/// and the gradient at `0` is infinite.
#[derive(Debug, Default, Clone, Copy)]
pub struct LnOp;

impl Operator for LnOp {
    fn name(&self) -> &'static str {
        "log"
    }

    fn arity(&self) -> usize {
        1
    }

    fn validate(&self, inputs: &[&Buffer]) -> Result<()> {
        validate_float_unary(self.name(), inputs)
    }

    fn forward(&self, ctx: &mut OpContext, inputs: &[&Buffer]) -> Result<Buffer> {
        validate_float_unary(self.name(), inputs)?;
        ctx.save_for_backward(SavedValue::Buffer(inputs[0].clone()));
        with_float_buffer!(self.name(), inputs[0], x => Buffer::from_array(x.mapv(|v| v.ln())))
    }

    fn backward(&self, ctx: &OpContext, grad_output: &Buffer) -> Result<Vec<Option<Buffer>>> {
        if !ctx.needs_input_grad(0) {
            return Ok(vec![None]);
        }
        let input = ctx.saved_buffer(0)?;
        let grad = with_float_pair!(self.name(), grad_output, input, (g, x) => {
            Buffer::from_array(broadcast_binary(self.name(), g, x, |g, x| g * (1.0 / x))?)
        })?;
        Ok(vec![Some(grad)])
    }
}

#[cfg(test)]
#[path = "ln_test.rs"]
mod tests;
