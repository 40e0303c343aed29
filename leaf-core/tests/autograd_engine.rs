use leaf_core::{
    Buffer, DType, ErrorKind, Graph, IntermediateGradPolicy, LeafError, TensorId, TensorOptions,
};

mod common;
use common::{assert_grad, leaf};

#[test]
fn test_broadcast_add_reduces_gradient() -> Result<(), LeafError> {
    let mut graph = Graph::new();
    let a = leaf(&mut graph, vec![1.0; 12], &[3, 4], true);
    let b = leaf(&mut graph, vec![0.5, 1.5, 2.5, 3.5], &[4], true);
    let out = graph.add(a, b)?;
    assert_eq!(graph.shape(out)?, &[3, 4]);

    graph.backward(out, Some(Buffer::ones(DType::F32, &[3, 4])))?;
    assert_grad(&graph, a, &[1.0; 12]);
    // One contribution per broadcast row.
    assert_grad(&graph, b, &[3.0, 3.0, 3.0, 3.0]);
    Ok(())
}

#[test]
fn test_leaf_sums_contributions_from_two_paths() -> Result<(), LeafError> {
    let mut graph = Graph::new();
    let x = leaf(&mut graph, vec![2.0, -1.0], &[2], true);
    let left = graph.mul(x, 3.0)?;
    let right = graph.mul(x, x)?;
    let merged = graph.add(left, right)?;
    let loss = graph.sum(merged)?;

    graph.backward(loss, None)?;
    // d/dx (3x + x^2) = 3 + 2x
    assert_grad(&graph, x, &[7.0, 1.0]);
    Ok(())
}

#[test]
fn test_relu_boundary_passes_gradient_at_zero() -> Result<(), LeafError> {
    let mut graph = Graph::new();
    let x = leaf(&mut graph, vec![-1.0, 0.0, 2.0], &[3], true);
    let y = graph.relu(x)?;
    let loss = graph.sum(y)?;
    graph.backward(loss, None)?;
    assert_grad(&graph, x, &[0.0, 1.0, 1.0]);
    Ok(())
}

#[test]
fn test_non_scalar_backward_without_seed_fails() -> Result<(), LeafError> {
    let mut graph = Graph::new();
    let x = leaf(&mut graph, vec![1.0, 2.0], &[2], true);
    let y = graph.exp(x)?;
    let err = graph.backward(y, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Gradient);
    assert!(matches!(err, LeafError::BackwardNonScalar { ref shape } if shape == &[2]));
    assert!(graph.grad(x)?.is_none());
    Ok(())
}

#[test]
fn test_seed_shape_must_match() -> Result<(), LeafError> {
    let mut graph = Graph::new();
    let x = leaf(&mut graph, vec![1.0, 2.0], &[2], true);
    let y = graph.exp(x)?;
    let err = graph
        .backward(y, Some(Buffer::ones(DType::F32, &[3])))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Shape);
    Ok(())
}

#[test]
fn test_backward_without_requires_grad_fails() -> Result<(), LeafError> {
    let mut graph = Graph::new();
    let x = leaf(&mut graph, vec![1.0], &[1], false);
    let y = graph.exp(x)?;
    let err = graph.backward(y, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Gradient);
    Ok(())
}

fn diamond(graph: &mut Graph) -> Result<(TensorId, TensorId), LeafError> {
    // a -> b -> {c, d} -> e -> loss
    let a = leaf(graph, vec![0.5], &[1], true);
    let b = graph.exp(a)?;
    let c = graph.mul(b, 2.0)?;
    let d = graph.relu(b)?;
    let e = graph.add(c, d)?;
    let loss = graph.sum(e)?;
    Ok((a, loss))
}

#[test]
fn test_diamond_visits_each_node_once() -> Result<(), LeafError> {
    let mut graph = Graph::new();
    let (a, loss) = diamond(&mut graph)?;
    let order = graph.topological_order(loss)?;

    assert_eq!(order.len(), 6);
    let mut unique = order.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), order.len());
    assert_eq!(order.first(), Some(&a));
    assert_eq!(order.last(), Some(&loss));
    // Every parent precedes its child.
    for (position, &id) in order.iter().enumerate() {
        if let Some(ctx) = graph.context(id)? {
            for parent in ctx.parents() {
                let parent_position = order.iter().position(|p| p == parent).unwrap();
                assert!(parent_position < position);
            }
        }
    }
    Ok(())
}

#[test]
fn test_diamond_gradient_per_policy() -> Result<(), LeafError> {
    let expected = 3.0 * 0.5f64.exp();

    let mut graph = Graph::new();
    assert_eq!(graph.config().intermediate_grad, IntermediateGradPolicy::Accumulate);
    let (a, loss) = diamond(&mut graph)?;
    graph.backward(loss, None)?;
    assert_grad(&graph, a, &[expected]);

    // Overwrite keeps only the last contribution reaching the shared node.
    let mut graph = Graph::builder()
        .intermediate_grad(IntermediateGradPolicy::Overwrite)
        .build();
    let (a, loss) = diamond(&mut graph)?;
    graph.backward(loss, None)?;
    let overwritten = graph.grad(a)?.unwrap().item().unwrap();
    assert!(overwritten < expected - 0.1);
    Ok(())
}

#[test]
fn test_repeated_passes_accumulate_on_leaves_only() -> Result<(), LeafError> {
    let mut graph = Graph::new();
    let x = leaf(&mut graph, vec![1.0, 2.0], &[2], true);
    let y = graph.mul(x, 2.0)?;
    let loss = graph.sum(y)?;

    graph.backward(loss, None)?;
    graph.backward(loss, None)?;
    assert_grad(&graph, x, &[4.0, 4.0]);
    // The intermediate was cleared before the second replay.
    assert_grad(&graph, y, &[1.0, 1.0]);

    graph.zero_grads();
    assert!(graph.grad(x)?.is_none());
    graph.backward(loss, None)?;
    assert_grad(&graph, x, &[2.0, 2.0]);
    Ok(())
}

#[test]
fn test_constant_branch_gets_no_gradient() -> Result<(), LeafError> {
    let mut graph = Graph::new();
    let w = leaf(&mut graph, vec![1.0, 2.0], &[2], true);
    let c = leaf(&mut graph, vec![3.0, 4.0], &[2], false);
    let c2 = graph.exp(c)?;
    let y = graph.mul(w, c2)?;
    let loss = graph.sum(y)?;
    graph.backward(loss, None)?;

    assert!(graph.grad(c)?.is_none());
    assert!(graph.grad(c2)?.is_none());
    assert_grad(&graph, w, &[3.0f64.exp(), 4.0f64.exp()]);
    Ok(())
}

#[test]
fn test_detach_cuts_the_graph() -> Result<(), LeafError> {
    let mut graph = Graph::new();
    let x = leaf(&mut graph, vec![3.0], &[1], true);
    let y = graph.mul(x, x)?;
    let frozen = graph.detach(y)?;
    assert!(graph.is_leaf(frozen)?);
    assert!(!graph.requires_grad(frozen)?);
    assert!(graph.tensor_eq(y, frozen)?);

    let z = graph.mul(x, frozen)?;
    graph.backward(z, None)?;
    // Only the direct path counts: d/dx (x * 9) = 9
    assert_grad(&graph, x, &[9.0]);
    Ok(())
}

#[test]
fn test_leaf_start_keeps_seed() -> Result<(), LeafError> {
    let mut graph = Graph::new();
    let x = graph.tensor(vec![1.0, 2.0], TensorOptions::new().requires_grad(true))?;
    graph.backward(x, Some(Buffer::from_f64_values(vec![0.5, 0.25], &[2], DType::F32)?))?;
    assert_grad(&graph, x, &[0.5, 0.25]);
    Ok(())
}
