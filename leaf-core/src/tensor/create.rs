//! Factory functions for leaf tensors.

use ndarray::Array2;
use rand::Rng;
use rand_distr::{Distribution, StandardNormal, Uniform};

use crate::buffer::Buffer;
use crate::error::{LeafError, Result};
use crate::graph::Graph;
use crate::tensor::{TensorId, TensorOptions};
use crate::types::DType;

fn require_float(operation: &str, dtype: DType) -> Result<()> {
    if dtype.is_float() {
        Ok(())
    } else {
        Err(LeafError::UnsupportedDType {
            operation: operation.to_string(),
            dtype,
        })
    }
}

impl Graph {
    /// A leaf of `shape` filled with zeros.
    pub fn zeros(&mut self, shape: &[usize], options: TensorOptions) -> Result<TensorId> {
        let buffer = Buffer::zeros(options.dtype, shape);
        self.push_leaf(buffer, options.requires_grad, options.device)
    }

    /// A leaf of `shape` filled with ones.
    pub fn ones(&mut self, shape: &[usize], options: TensorOptions) -> Result<TensorId> {
        let buffer = Buffer::ones(options.dtype, shape);
        self.push_leaf(buffer, options.requires_grad, options.device)
    }

    /// A leaf of `shape` filled with `value`, cast to `options.dtype`.
    pub fn full(&mut self, shape: &[usize], value: f64, options: TensorOptions) -> Result<TensorId> {
        let buffer = Buffer::full(options.dtype, shape, value)?;
        self.push_leaf(buffer, options.requires_grad, options.device)
    }

    /// The `n x n` identity matrix.
    pub fn eye(&mut self, n: usize, options: TensorOptions) -> Result<TensorId> {
        let buffer = match options.dtype {
            DType::F32 => Buffer::from_array(Array2::<f32>::eye(n).into_dyn()),
            DType::F64 => Buffer::from_array(Array2::<f64>::eye(n).into_dyn()),
            DType::I16 => Buffer::from_array(Array2::<i16>::eye(n).into_dyn()),
            DType::I32 => Buffer::from_array(Array2::<i32>::eye(n).into_dyn()),
        };
        self.push_leaf(buffer, options.requires_grad, options.device)
    }

    /// Zeros with the shape, dtype and device of `like`. Never tracks gradients.
    pub fn zeros_like(&mut self, like: TensorId) -> Result<TensorId> {
        let node = self.node(like)?;
        let (buffer, device) = (Buffer::zeros(node.dtype(), node.shape()), node.device);
        self.push_leaf(buffer, false, device)
    }

    /// Ones with the shape, dtype and device of `like`. Never tracks gradients.
    pub fn ones_like(&mut self, like: TensorId) -> Result<TensorId> {
        let node = self.node(like)?;
        let (buffer, device) = (Buffer::ones(node.dtype(), node.shape()), node.device);
        self.push_leaf(buffer, false, device)
    }

    /// Uniform samples from `U(-1, 1)` scaled by `1 / sqrt(numel)`, drawn from the
    /// thread-local generator. Float dtypes only.
    pub fn uniform(&mut self, shape: &[usize], options: TensorOptions) -> Result<TensorId> {
        self.uniform_with_rng(shape, options, &mut rand::thread_rng())
    }

    /// [`uniform`](Self::uniform) with an explicit generator, for reproducible draws.
    pub fn uniform_with_rng<R: Rng + ?Sized>(
        &mut self,
        shape: &[usize],
        options: TensorOptions,
        rng: &mut R,
    ) -> Result<TensorId> {
        require_float("uniform", options.dtype)?;
        let numel: usize = shape.iter().product();
        let scale = 1.0 / (numel.max(1) as f64).sqrt();
        let dist = Uniform::new(-1.0f64, 1.0);
        let values: Vec<f64> = (0..numel).map(|_| dist.sample(rng) * scale).collect();
        let buffer = Buffer::from_f64_values(values, shape, options.dtype)?;
        self.push_leaf(buffer, options.requires_grad, options.device)
    }

    /// Standard normal samples, drawn from the thread-local generator. Float
    /// dtypes only.
    pub fn normal(&mut self, shape: &[usize], options: TensorOptions) -> Result<TensorId> {
        self.normal_with_rng(shape, options, &mut rand::thread_rng())
    }

    /// [`normal`](Self::normal) with an explicit generator, for reproducible draws.
    pub fn normal_with_rng<R: Rng + ?Sized>(
        &mut self,
        shape: &[usize],
        options: TensorOptions,
        rng: &mut R,
    ) -> Result<TensorId> {
        require_float("normal", options.dtype)?;
        let numel: usize = shape.iter().product();
        let values: Vec<f64> = (0..numel).map(|_| StandardNormal.sample(rng)).collect();
        let buffer = Buffer::from_f64_values(values, shape, options.dtype)?;
        self.push_leaf(buffer, options.requires_grad, options.device)
    }
}

#[cfg(test)]
#[path = "create_test.rs"]
mod tests;
