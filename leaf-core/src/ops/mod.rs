//! # Tensor Operations Module (`ops`)
//!
//! The operator catalog. Every operation is a stateless struct implementing
//! [`Operator`](crate::autograd::Operator), grouped into submodules by what it
//! computes:
//!
//! - [`arithmetic`]: broadcasting element-wise `add`, `sub`, `mul`.
//! - [`linalg`]: 2-D matrix product.
//! - [`math_elem`]: element-wise `exp` and `log`.
//! - [`activation`]: `relu`.
//! - [`reduction`]: full reductions `sum` and `mean`.
//!
//! Operators are looked up by name in an [`OpRegistry`]. The engine only ever sees
//! the trait, so adding an operator means implementing it and registering it.

pub mod activation;
pub mod arithmetic;
pub mod linalg;
pub mod math_elem;
pub mod reduction;
pub mod registry;
pub mod traits;

pub use registry::OpRegistry;

use crate::buffer::Buffer;
use crate::error::{LeafError, Result};
use crate::tensor::TensorId;

/// An argument to [`Graph::apply`](crate::Graph::apply).
///
/// Scalars are not graph nodes: they become constants of the first tensor
/// operand's dtype and never appear among a context's parents.
/// Against an integer tensor the scalar must be a whole number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operand {
    Tensor(TensorId),
    Scalar(f64),
}

impl From<TensorId> for Operand {
    fn from(id: TensorId) -> Self {
        Operand::Tensor(id)
    }
}

impl From<f64> for Operand {
    fn from(value: f64) -> Self {
        Operand::Scalar(value)
    }
}

impl From<f32> for Operand {
    fn from(value: f32) -> Self {
        Operand::Scalar(value as f64)
    }
}

impl From<i32> for Operand {
    fn from(value: i32) -> Self {
        Operand::Scalar(value as f64)
    }
}

/// Checks the input count inside `forward`/`backward`, where the registry check
/// has already run but a direct caller may not have gone through it.
pub(crate) fn expect_inputs(name: &str, inputs: &[&Buffer], expected: usize) -> Result<()> {
    if inputs.len() != expected {
        return Err(LeafError::ArityMismatch {
            operator: name.to_string(),
            expected,
            actual: inputs.len(),
        });
    }
    Ok(())
}
