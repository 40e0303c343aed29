use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::device::StorageDevice;
use crate::error::{ErrorKind, LeafError};
use crate::graph::Graph;
use crate::tensor::TensorOptions;
use crate::types::DType;

#[test]
fn test_zeros() -> Result<(), LeafError> {
    let mut graph = Graph::new();
    let t = graph.zeros(&[2, 3], TensorOptions::new())?;
    assert_eq!(graph.shape(t)?, &[2, 3]);
    assert_eq!(graph.numel(t)?, 6);
    assert_eq!(graph.device(t)?, StorageDevice::CPU);
    assert_eq!(graph.dtype(t)?, DType::F32);
    assert!(graph.is_leaf(t)?);
    assert!(graph.data(t)?.to_f64_vec().iter().all(|&x| x == 0.0));
    Ok(())
}

#[test]
fn test_ones_with_options() -> Result<(), LeafError> {
    let mut graph = Graph::new();
    let opts = TensorOptions::new()
        .dtype(DType::F64)
        .requires_grad(true)
        .device(StorageDevice::GPU(1));
    let t = graph.ones(&[1, 4], opts)?;
    assert_eq!(graph.dtype(t)?, DType::F64);
    assert!(graph.requires_grad(t)?);
    assert_eq!(graph.device(t)?, StorageDevice::GPU(1));
    assert_eq!(graph.data(t)?.to_f64_vec(), vec![1.0; 4]);
    Ok(())
}

#[test]
fn test_full_and_like() -> Result<(), LeafError> {
    let mut graph = Graph::new();
    let t = graph.full(&[2, 2], 42.0, TensorOptions::new().dtype(DType::I32))?;
    assert_eq!(graph.data(t)?.to_f64_vec(), vec![42.0; 4]);

    let z = graph.zeros_like(t)?;
    assert_eq!(graph.shape(z)?, &[2, 2]);
    assert_eq!(graph.dtype(z)?, DType::I32);
    let o = graph.ones_like(t)?;
    assert_eq!(graph.data(o)?.to_f64_vec(), vec![1.0; 4]);
    Ok(())
}

#[test]
fn test_eye() -> Result<(), LeafError> {
    let mut graph = Graph::new();
    let t = graph.eye(3, TensorOptions::new())?;
    assert_eq!(graph.shape(t)?, &[3, 3]);
    assert_eq!(
        graph.data(t)?.to_f64_vec(),
        vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]
    );
    Ok(())
}

#[test]
fn test_uniform_range_and_reproducibility() -> Result<(), LeafError> {
    let mut graph = Graph::new();
    let opts = TensorOptions::new().requires_grad(true);
    let a = graph.uniform_with_rng(&[4, 4], opts, &mut StdRng::seed_from_u64(3))?;
    let b = graph.uniform_with_rng(&[4, 4], opts, &mut StdRng::seed_from_u64(3))?;
    assert!(graph.tensor_eq(a, b)?);
    assert!(graph.requires_grad(a)?);

    // U(-1, 1) / sqrt(16)
    assert!(graph.data(a)?.to_f64_vec().iter().all(|v| v.abs() <= 0.25));
    Ok(())
}

#[test]
fn test_normal_statistics() -> Result<(), LeafError> {
    let mut graph = Graph::new();
    let t = graph.normal_with_rng(&[10_000], TensorOptions::new().dtype(DType::F64), &mut StdRng::seed_from_u64(11))?;
    let values = graph.data(t)?.to_f64_vec();
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    assert!(mean.abs() < 0.05, "mean {}", mean);
    assert!((var - 1.0).abs() < 0.1, "variance {}", var);
    Ok(())
}

#[test]
fn test_random_factories_reject_integers() {
    let mut graph = Graph::new();
    let opts = TensorOptions::new().dtype(DType::I16);
    assert_eq!(graph.uniform(&[2], opts).unwrap_err().kind(), ErrorKind::Type);
    assert_eq!(graph.normal(&[2], opts).unwrap_err().kind(), ErrorKind::Type);
}

#[test]
fn test_integer_requires_grad_rejected() {
    let mut graph = Graph::new();
    let opts = TensorOptions::new().dtype(DType::I32).requires_grad(true);
    assert!(matches!(
        graph.zeros(&[2], opts),
        Err(LeafError::UnsupportedDType { .. })
    ));
    assert!(graph.is_empty());
}
