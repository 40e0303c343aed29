use ndarray::{ArcArray, ArrayD, ArrayView2, Ix2, IxDyn};

use crate::autograd::{OpContext, Operator, SavedValue};
use crate::buffer::{with_buffer_pair, Buffer};
use crate::error::{LeafError, Result};
use crate::ops::expect_inputs;
use crate::ops::traits::LeafElement;

/// Matrix product of two 2-D tensors: `(m, k) @ (k, n) -> (m, n)`.
///
/// Saves both operands. Backward: `grad_a = g @ b^T`, `grad_b = a^T @ g`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MatmulOp;

fn as_matrix<T: LeafElement>(array: &ArcArray<T, IxDyn>) -> Result<ArrayView2<'_, T>> {
    array.view().into_dimensionality::<Ix2>().map_err(|e| {
        LeafError::InternalError(format!(
            "matmul: shape {:?} is not 2-D: {}",
            array.shape(),
            e
        ))
    })
}

fn matmul_arrays<T: LeafElement>(a: ArrayView2<'_, T>, b: ArrayView2<'_, T>) -> ArrayD<T> {
    T::matmul(&a, &b).into_dyn()
}

impl Operator for MatmulOp {
    fn name(&self) -> &'static str {
        "matmul"
    }

    fn arity(&self) -> usize {
        2
    }

    fn validate(&self, inputs: &[&Buffer]) -> Result<()> {
        expect_inputs(self.name(), inputs, 2)?;
        let (a, b) = (inputs[0], inputs[1]);
        if a.dtype() != b.dtype() {
            return Err(LeafError::DTypeMismatch {
                operation: self.name().to_string(),
                expected: a.dtype(),
                actual: b.dtype(),
            });
        }
        let (sa, sb) = (a.shape(), b.shape());
        if sa.len() != 2 || sb.len() != 2 || sa[1] != sb[0] {
            return Err(LeafError::IncompatibleShapes {
                operation: self.name().to_string(),
                shape1: sa.to_vec(),
                shape2: sb.to_vec(),
            });
        }
        Ok(())
    }

    fn forward(&self, ctx: &mut OpContext, inputs: &[&Buffer]) -> Result<Buffer> {
        self.validate(inputs)?;
        ctx.save_for_backward(SavedValue::Buffer(inputs[0].clone()));
        ctx.save_for_backward(SavedValue::Buffer(inputs[1].clone()));
        with_buffer_pair!(self.name(), inputs[0], inputs[1], (a, b) => {
            Buffer::from_array(matmul_arrays(as_matrix(a)?, as_matrix(b)?))
        })
    }

    fn backward(&self, ctx: &OpContext, grad_output: &Buffer) -> Result<Vec<Option<Buffer>>> {
        let a = ctx.saved_buffer(0)?;
        let b = ctx.saved_buffer(1)?;
        let grad_a = if ctx.needs_input_grad(0) {
            Some(with_buffer_pair!(self.name(), grad_output, b, (g, b) => {
                Buffer::from_array(matmul_arrays(as_matrix(g)?, as_matrix(b)?.reversed_axes()))
            })?)
        } else {
            None
        };
        let grad_b = if ctx.needs_input_grad(1) {
            Some(with_buffer_pair!(self.name(), a, grad_output, (a, g) => {
                Buffer::from_array(matmul_arrays(as_matrix(a)?.reversed_axes(), as_matrix(g)?))
            })?)
        } else {
            None
        };
        Ok(vec![grad_a, grad_b])
    }
}

#[cfg(test)]
#[path = "matmul_test.rs"]
mod tests;
