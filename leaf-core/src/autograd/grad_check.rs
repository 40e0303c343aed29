use thiserror::Error;

use crate::buffer::Buffer;
use crate::error::LeafError;
use crate::graph::Graph;
use crate::tensor::{TensorId, TensorOptions};
use crate::types::DType;

/// Error type specifically for gradient checking failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GradCheckError {
    #[error("Gradient check failed for input {input_index}, element {element_index}: analytical {analytical_grad:?} != numerical {numerical_grad:?} (difference {difference:?})")]
    GradientMismatch {
        input_index: usize,
        element_index: usize,
        analytical_grad: f64,
        numerical_grad: f64,
        difference: f64,
    },
    #[error("Forward function failed during gradient check: {0}")]
    ForwardPassError(LeafError),
    #[error("Backward pass failed during gradient check: {0}")]
    BackwardPassError(LeafError),
    #[error("Input {input_index} has no gradient after the backward pass")]
    MissingAnalyticalGrad { input_index: usize },
    #[error("Numerical gradient is NaN or infinite for input {input_index}, element {element_index} (loss+ {loss_plus:?}, loss- {loss_minus:?})")]
    NumericalGradNaNOrInfinite {
        input_index: usize,
        element_index: usize,
        loss_plus: f64,
        loss_minus: f64,
    },
    #[error("Analytical gradient is NaN or infinite for input {input_index}, element {element_index}: {value:?}")]
    AnalyticalGradNaNOrInfinite {
        input_index: usize,
        element_index: usize,
        value: f64,
    },
    #[error("Output gradient shape {actual:?} does not match output shape {expected:?}")]
    OutputGradShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },
    #[error("Tensor error during gradient check: {0}")]
    TensorError(#[from] LeafError),
}

/// Compares the analytical gradients of `func` with central finite differences.
///
/// Every input is cast to `F64` and fed to `func` as a leaf with
/// `requires_grad = true` in a fresh [`Graph`]. The scalar being differentiated is
/// `L = sum(func(inputs) * output_grad)`, so the analytical side is one backward
/// pass seeded with `output_grad`, and the numerical side is
/// `(L(x + eps) - L(x - eps)) / (2 * eps)` per input element.
///
/// An element passes when `|analytical - numerical| <= abs_tol + rel_tol * |numerical|`.
///
/// # Errors
/// The first failing element as [`GradCheckError::GradientMismatch`], or any error
/// raised while building or differentiating the graph.
pub fn check_grad<F>(
    func: F,
    inputs: &[Buffer],
    output_grad: &Buffer,
    epsilon: f64,
    abs_tol: f64,
    rel_tol: f64,
) -> Result<(), GradCheckError>
where
    F: Fn(&mut Graph, &[TensorId]) -> Result<TensorId, LeafError>,
{
    let inputs: Vec<Buffer> = inputs
        .iter()
        .map(|input| input.cast(DType::F64))
        .collect::<Result<_, _>>()?;
    let output_grad = output_grad.cast(DType::F64)?;

    // --- Analytical gradients ---
    let mut graph = Graph::new();
    let ids = leaves(&mut graph, &inputs)?;
    let output = func(&mut graph, &ids).map_err(GradCheckError::ForwardPassError)?;
    let output_shape = graph.shape(output)?.to_vec();
    if output_shape != output_grad.shape() {
        return Err(GradCheckError::OutputGradShapeMismatch {
            expected: output_shape,
            actual: output_grad.shape().to_vec(),
        });
    }
    graph
        .backward(output, Some(output_grad.clone()))
        .map_err(GradCheckError::BackwardPassError)?;
    let analytical: Vec<Vec<f64>> = ids
        .iter()
        .enumerate()
        .map(|(input_index, &id)| match graph.grad(id)? {
            Some(grad) => Ok(grad.to_f64_vec()),
            None => Err(GradCheckError::MissingAnalyticalGrad { input_index }),
        })
        .collect::<Result<_, GradCheckError>>()?;

    // --- Numerical gradients ---
    let weights = output_grad.to_f64_vec();
    for (input_index, input) in inputs.iter().enumerate() {
        let original = input.to_f64_vec();
        for element_index in 0..original.len() {
            let loss_at = |delta: f64| -> Result<f64, GradCheckError> {
                let mut values = original.clone();
                values[element_index] += delta;
                let mut perturbed = inputs.clone();
                perturbed[input_index] = Buffer::from_f64_values(values, input.shape(), DType::F64)?;
                weighted_loss(&func, &perturbed, &weights)
            };
            let loss_plus = loss_at(epsilon)?;
            let loss_minus = loss_at(-epsilon)?;
            let numerical_grad = (loss_plus - loss_minus) / (2.0 * epsilon);
            let analytical_grad = analytical[input_index][element_index];

            if !numerical_grad.is_finite() {
                return Err(GradCheckError::NumericalGradNaNOrInfinite {
                    input_index,
                    element_index,
                    loss_plus,
                    loss_minus,
                });
            }
            if !analytical_grad.is_finite() {
                return Err(GradCheckError::AnalyticalGradNaNOrInfinite {
                    input_index,
                    element_index,
                    value: analytical_grad,
                });
            }
            let difference = (analytical_grad - numerical_grad).abs();
            if difference > abs_tol + rel_tol * numerical_grad.abs() {
                return Err(GradCheckError::GradientMismatch {
                    input_index,
                    element_index,
                    analytical_grad,
                    numerical_grad,
                    difference,
                });
            }
        }
    }
    Ok(())
}

fn leaves(graph: &mut Graph, inputs: &[Buffer]) -> Result<Vec<TensorId>, LeafError> {
    let options = TensorOptions::new().dtype(DType::F64).requires_grad(true);
    inputs
        .iter()
        .map(|input| graph.tensor(input.clone(), options))
        .collect()
}

/// `sum(func(inputs) * weights)` evaluated in a throwaway graph.
fn weighted_loss<F>(func: &F, inputs: &[Buffer], weights: &[f64]) -> Result<f64, GradCheckError>
where
    F: Fn(&mut Graph, &[TensorId]) -> Result<TensorId, LeafError>,
{
    let mut graph = Graph::new();
    let ids = leaves(&mut graph, inputs)?;
    let output = func(&mut graph, &ids).map_err(GradCheckError::ForwardPassError)?;
    let values = graph.data(output)?.to_f64_vec();
    Ok(values.iter().zip(weights).map(|(v, w)| v * w).sum())
}
