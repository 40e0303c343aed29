use approx::assert_abs_diff_eq;
use leaf_core::{Buffer, DType, Graph, TensorId, TensorOptions};

// Each integration test binary compiles this module separately, so helpers
// unused by one of them would otherwise warn.
#[allow(dead_code)]
pub fn leaf(graph: &mut Graph, data: Vec<f64>, shape: &[usize], requires_grad: bool) -> TensorId {
    let buffer = Buffer::from_f64_values(data, shape, DType::F32).expect("Test buffer creation failed");
    graph
        .tensor(buffer, TensorOptions::new().requires_grad(requires_grad))
        .expect("Test tensor creation failed")
}

/// Asserts that `id` holds a gradient of the node's shape with the given values.
#[allow(dead_code)]
pub fn assert_grad(graph: &Graph, id: TensorId, expected: &[f64]) {
    let grad = graph
        .grad(id)
        .expect("Unknown tensor")
        .unwrap_or_else(|| panic!("{} has no gradient", id));
    assert_eq!(grad.shape(), graph.shape(id).unwrap(), "Gradient shape differs from data shape");
    let actual = grad.to_f64_vec();
    assert_eq!(actual.len(), expected.len());
    for (a, e) in actual.iter().zip(expected) {
        assert_abs_diff_eq!(*a, *e, epsilon = 1e-5);
    }
}
