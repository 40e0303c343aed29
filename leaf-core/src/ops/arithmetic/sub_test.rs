use crate::autograd::grad_check::check_grad;
use crate::buffer::Buffer;
use crate::error::LeafError;
use crate::graph::Graph;
use crate::types::DType;
use crate::utils::testing::{check_tensor_near, leaf, leaf_with_grad};

#[test]
fn test_sub_forward_broadcast() -> Result<(), LeafError> {
    let mut graph = Graph::new();
    let a = leaf(&mut graph, vec![10.0, 20.0, 30.0, 40.0], &[2, 2]);
    let b = leaf(&mut graph, vec![1.0, 2.0], &[2]);
    let out = graph.sub(a, b)?;
    check_tensor_near(graph.data(out)?, &[2, 2], &[9.0, 18.0, 29.0, 38.0], 1e-6);
    Ok(())
}

#[test]
fn test_sub_scalar_on_left() -> Result<(), LeafError> {
    let mut graph = Graph::new();
    let a = leaf_with_grad(&mut graph, vec![1.0, 4.0], &[2]);
    let out = graph.apply("sub", &[1.0.into(), a.into()])?;
    check_tensor_near(graph.data(out)?, &[2], &[0.0, -3.0], 1e-6);

    let loss = graph.sum(out)?;
    graph.backward(loss, None)?;
    check_tensor_near(graph.grad(a)?.unwrap(), &[2], &[-1.0, -1.0], 1e-6);
    Ok(())
}

#[test]
fn test_sub_backward_broadcast() -> Result<(), LeafError> {
    let mut graph = Graph::new();
    let a = leaf_with_grad(&mut graph, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]);
    let b = leaf_with_grad(&mut graph, vec![1.0, 1.0], &[2, 1]);
    let out = graph.sub(a, b)?;
    graph.backward(out, Some(Buffer::ones(DType::F32, &[2, 3])))?;

    check_tensor_near(graph.grad(a)?.unwrap(), &[2, 3], &[1.0; 6], 1e-6);
    check_tensor_near(graph.grad(b)?.unwrap(), &[2, 1], &[-3.0, -3.0], 1e-6);
    Ok(())
}

#[test]
fn test_sub_grad_check() {
    let a = Buffer::from_f64_values(vec![0.3, -1.2, 2.2, 0.9], &[2, 2], DType::F64).unwrap();
    let b = Buffer::from_f64_values(vec![-0.5, 1.5], &[1, 2], DType::F64).unwrap();
    let output_grad = Buffer::from_f64_values(vec![1.0, 2.0, -1.0, 0.5], &[2, 2], DType::F64).unwrap();
    let result = check_grad(
        |graph, x| graph.sub(x[0], x[1]),
        &[a, b],
        &output_grad,
        1e-6,
        1e-7,
        1e-5,
    );
    assert!(result.is_ok(), "Sub grad check failed: {:?}", result.err());
}
