//! Element-wise transcendental functions. Float dtypes only.

use crate::buffer::Buffer;
use crate::error::{LeafError, Result};
use crate::ops::expect_inputs;

pub mod exp;
pub mod ln;

pub use exp::ExpOp;
pub use ln::LnOp;

/// Arity and dtype check for a float-only unary operator.
pub(crate) fn validate_float_unary(operation: &str, inputs: &[&Buffer]) -> Result<()> {
    expect_inputs(operation, inputs, 1)?;
    let dtype = inputs[0].dtype();
    if !dtype.is_float() {
        return Err(LeafError::UnsupportedDType {
            operation: operation.to_string(),
            dtype,
        });
    }
    Ok(())
}
