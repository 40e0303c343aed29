//! # leaf-core
//!
//! A small reverse-mode automatic differentiation engine over dense n-dimensional
//! tensors.
//!
//! Tensors live in a [`Graph`] arena and are addressed by [`TensorId`] handles.
//! Every operator application records an [`OpContext`] on its output; calling
//! [`Graph::backward`] replays those contexts in reverse topological order and
//! deposits gradients on every node that requires them.
//!
//! ```
//! use leaf_core::{Graph, TensorOptions};
//!
//! # fn main() -> leaf_core::Result<()> {
//! let mut graph = Graph::new();
//! let w = graph.tensor(vec![vec![1.0, 2.0], vec![3.0, 4.0]], TensorOptions::new().requires_grad(true))?;
//! let x = graph.tensor(vec![vec![1.0], vec![0.5]], TensorOptions::new())?;
//! let y = graph.matmul(w, x)?;
//! let h = graph.relu(y)?;
//! let loss = graph.sum(h)?;
//! graph.backward(loss, None)?;
//! assert_eq!(graph.grad(w)?.unwrap().to_f64_vec(), vec![1.0, 0.5, 1.0, 0.5]);
//! # Ok(())
//! # }
//! ```

pub mod autograd;
pub mod buffer;
pub mod device;
pub mod error;
pub mod graph;
pub mod ops;
pub mod tensor;
pub mod tensor_data;
pub mod types;
pub mod utils;

pub use autograd::{OpContext, Operator, SavedValue};
pub use buffer::Buffer;
pub use device::StorageDevice;
pub use error::{ErrorKind, LeafError, Result};
pub use graph::{Graph, GraphBuilder, GraphConfig, IntermediateGradPolicy};
pub use ops::{OpRegistry, Operand};
pub use tensor::{TensorId, TensorInput, TensorOptions};
pub use types::DType;

// Re-exported so callers can build buffers and write generic operators without
// pinning their own versions.
pub use ndarray;
pub use num_traits;
