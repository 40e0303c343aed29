use leaf_core::{DType, ErrorKind, Graph, LeafError, StorageDevice, TensorInput, TensorOptions};
use rand::rngs::StdRng;
use rand::SeedableRng;

mod common;
use common::leaf;

#[test]
fn test_nested_input_and_dtype() -> Result<(), LeafError> {
    let mut graph = Graph::new();
    let t = graph.tensor(vec![vec![1, 2, 3], vec![4, 5, 6]], TensorOptions::new())?;
    assert_eq!(graph.shape(t)?, &[2, 3]);
    assert_eq!(graph.dtype(t)?, DType::F32);
    assert!(graph.is_leaf(t)?);
    assert!(!graph.requires_grad(t)?);
    assert!(graph.context(t)?.is_none());

    let s = graph.tensor(7.5, TensorOptions::new().dtype(DType::F64))?;
    assert_eq!(graph.shape(s)?, &[1]);
    assert_eq!(graph.data(s)?.item(), Some(7.5));
    Ok(())
}

#[test]
fn test_malformed_input_is_a_type_error() {
    let mut graph = Graph::new();
    let ragged = TensorInput::Seq(vec![TensorInput::from(vec![1.0, 2.0]), TensorInput::from(vec![3.0])]);
    let err = graph.tensor(ragged, TensorOptions::new()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Type);
    assert!(graph.is_empty());

    let empty_rows = TensorInput::Seq(vec![TensorInput::Seq(vec![]), TensorInput::Seq(vec![])]);
    let err = graph.tensor(empty_rows, TensorOptions::new()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Type);
    assert!(graph.is_empty());

    let err = graph
        .tensor(vec![1, 2], TensorOptions::new().dtype(DType::I32).requires_grad(true))
        .unwrap_err();
    assert!(matches!(err, LeafError::UnsupportedDType { .. }));
}

#[test]
fn test_device_tag_is_carried() -> Result<(), LeafError> {
    let mut graph = Graph::new();
    let device: StorageDevice = "cuda:1".parse()?;
    let a = graph.tensor(vec![1.0, 2.0], TensorOptions::new().device(device))?;
    let b = graph.tensor(vec![3.0, 4.0], TensorOptions::new())?;
    let c = graph.add(a, b)?;
    assert_eq!(graph.device(a)?, StorageDevice::GPU(1));
    assert_eq!(graph.device(b)?, StorageDevice::CPU);
    // Outputs take the tag of their first tensor operand.
    assert_eq!(graph.device(c)?, StorageDevice::GPU(1));
    Ok(())
}

#[test]
fn test_factories() -> Result<(), LeafError> {
    let mut graph = Graph::new();
    let opts = TensorOptions::new().requires_grad(true);

    let z = graph.zeros(&[2, 3], opts)?;
    assert_eq!(graph.data(z)?.to_f64_vec(), vec![0.0; 6]);
    assert!(graph.requires_grad(z)?);

    let o = graph.ones(&[4], TensorOptions::new().dtype(DType::I16))?;
    assert_eq!(graph.dtype(o)?, DType::I16);
    assert_eq!(graph.data(o)?.to_f64_vec(), vec![1.0; 4]);

    let i = graph.eye(3, TensorOptions::new())?;
    assert_eq!(
        graph.data(i)?.to_f64_vec(),
        vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]
    );

    let mut rng = StdRng::seed_from_u64(3);
    let u = graph.uniform_with_rng(&[100], opts, &mut rng)?;
    // 1 / sqrt(100), plus f32 rounding.
    let bound = 0.1 + 1e-6;
    assert!(graph.data(u)?.to_f64_vec().iter().all(|v| v.abs() <= bound));
    assert!(graph.requires_grad(u)?);

    let n = graph.normal_with_rng(&[5, 5], TensorOptions::new(), &mut rng)?;
    assert_eq!(graph.shape(n)?, &[5, 5]);

    let err = graph.normal(&[2], TensorOptions::new().dtype(DType::I32)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Type);
    Ok(())
}

#[test]
fn test_tensor_equality() -> Result<(), LeafError> {
    let mut graph = Graph::new();
    let a = leaf(&mut graph, vec![1.0, 2.0], &[2], false);
    let b = leaf(&mut graph, vec![1.0, 2.0], &[2], true);
    let c = leaf(&mut graph, vec![1.0, 2.0], &[1, 2], false);
    let d = leaf(&mut graph, vec![1.0, 2.5], &[2], false);
    assert!(graph.tensor_eq(a, b)?);
    assert!(!graph.tensor_eq(a, c)?);
    assert!(!graph.tensor_eq(a, d)?);
    Ok(())
}

#[test]
fn test_foreign_id_rejected() {
    let mut small = Graph::new();
    let mut big = Graph::new();
    leaf(&mut big, vec![1.0], &[1], false);
    let foreign = leaf(&mut big, vec![2.0], &[1], false);
    leaf(&mut small, vec![1.0], &[1], false);
    let err = small.shape(foreign).unwrap_err();
    assert_eq!(err, LeafError::UnknownTensor(1));
}
