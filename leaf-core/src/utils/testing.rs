//! Helpers for unit and integration tests.
//!
//! These panic instead of returning errors, like assertions.

use crate::buffer::Buffer;
use crate::graph::Graph;
use crate::tensor::{TensorId, TensorOptions};

/// Checks that `actual` has `expected_shape` and elements within `tolerance` of
/// `expected_data` (absolute difference). Panics otherwise.
pub fn check_tensor_near(
    actual: &Buffer,
    expected_shape: &[usize],
    expected_data: &[f64],
    tolerance: f64,
) {
    assert_eq!(actual.shape(), expected_shape, "Shape mismatch");

    let actual_data = actual.to_f64_vec();
    assert_eq!(
        actual_data.len(),
        expected_data.len(),
        "Data length mismatch"
    );

    for (i, (a, e)) in actual_data.iter().zip(expected_data.iter()).enumerate() {
        let diff = (a - e).abs();
        if diff > tolerance || diff.is_nan() {
            panic!(
                "Data mismatch at index {}: actual={:?}, expected={:?}, diff={:?}, tolerance={:?}",
                i, a, e, diff, tolerance
            );
        }
    }
}

/// An `F32` leaf without gradient tracking.
pub fn leaf(graph: &mut Graph, data: Vec<f64>, shape: &[usize]) -> TensorId {
    let buffer = Buffer::from_f64_values(data, shape, crate::DType::F32)
        .expect("Failed to create test tensor");
    graph
        .tensor(buffer, TensorOptions::new())
        .expect("Failed to create test tensor")
}

/// An `F32` leaf with `requires_grad = true`.
pub fn leaf_with_grad(graph: &mut Graph, data: Vec<f64>, shape: &[usize]) -> TensorId {
    let buffer = Buffer::from_f64_values(data, shape, crate::DType::F32)
        .expect("Failed to create test tensor with grad");
    graph
        .tensor(buffer, TensorOptions::new().requires_grad(true))
        .expect("Failed to create test tensor with grad")
}
