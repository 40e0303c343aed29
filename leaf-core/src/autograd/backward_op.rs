use std::fmt::Debug;

use crate::autograd::OpContext;
use crate::buffer::Buffer;
use crate::error::{LeafError, Result};

/// Defines the interface of a differentiable tensor operation.
///
/// An operator pairs a forward rule with its backward (vector-Jacobian product)
/// rule. Implementations are stateless: everything a particular application needs
/// to remember between forward and backward goes into the [`OpContext`] via
/// [`OpContext::save_for_backward`].
///
/// Operators are registered by name in an
/// [`OpRegistry`](crate::ops::OpRegistry) and applied through
/// [`Graph::apply`](crate::Graph::apply); the engine itself never needs to know
/// which concrete operators exist.
pub trait Operator: Debug + Send + Sync {
    /// Registry key, also used in error messages.
    fn name(&self) -> &'static str;

    /// Number of inputs (tensor operands and scalar constants) the operator takes.
    fn arity(&self) -> usize;

    /// Checks that the inputs are compatible before any context is built.
    ///
    /// The default accepts everything.
    fn validate(&self, _inputs: &[&Buffer]) -> Result<()> {
        Ok(())
    }

    /// Computes the output array from the input arrays.
    ///
    /// Called exactly once per context. Values needed by `backward` must be saved
    /// on `ctx` here.
    fn forward(&self, _ctx: &mut OpContext, _inputs: &[&Buffer]) -> Result<Buffer> {
        Err(LeafError::NotImplemented {
            operator: self.name().to_string(),
            pass: "forward",
        })
    }

    /// Computes the gradient for each input given the gradient of the output.
    ///
    /// # Returns
    /// One entry per input, in input order. `None` means no gradient flows to that
    /// input, which must be the answer for inputs where
    /// [`OpContext::needs_input_grad`] is `false`. Each gradient must have the shape
    /// of the corresponding input.
    fn backward(&self, _ctx: &OpContext, _grad_output: &Buffer) -> Result<Vec<Option<Buffer>>> {
        Err(LeafError::NotImplemented {
            operator: self.name().to_string(),
            pass: "backward",
        })
    }
}
