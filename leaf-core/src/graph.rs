//! The node arena and the entry point for every tensor operation.

use log::debug;

use crate::autograd::OpContext;
use crate::buffer::Buffer;
use crate::device::StorageDevice;
use crate::error::{LeafError, Result};
use crate::ops::{OpRegistry, Operand};
use crate::tensor::{TensorId, TensorInput, TensorOptions};
use crate::tensor_data::TensorData;
use crate::types::DType;

/// How the backward pass combines several contributions arriving at the same
/// non-leaf (intermediate) node.
///
/// Leaf nodes always sum their contributions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntermediateGradPolicy {
    /// Sum contributions. Intermediate gradients are cleared at the start of each
    /// pass, so they only ever hold the gradient of the current pass.
    #[default]
    Accumulate,
    /// Keep only the most recent contribution. Correct only when every
    /// intermediate node has a single consumer (tree-shaped graphs); a node used
    /// twice loses all but its last contribution.
    Overwrite,
}

/// Engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GraphConfig {
    pub intermediate_grad: IntermediateGradPolicy,
}

/// A dynamic computation graph.
///
/// Every tensor lives in the graph's arena and is referred to by a [`TensorId`].
/// Applying an operator evaluates it eagerly and appends its output node, linked
/// to the producing [`OpContext`]; [`Graph::backward`] then walks those links in
/// reverse.
///
/// ```
/// use leaf_core::{Graph, TensorOptions};
///
/// let mut graph = Graph::new();
/// let x = graph.tensor(vec![1.0, 2.0, 3.0], TensorOptions::new().requires_grad(true))?;
/// let y = graph.exp(x)?;
/// let loss = graph.sum(y)?;
/// graph.backward(loss, None)?;
/// assert_eq!(graph.grad(x)?.unwrap().shape(), &[3]);
/// # Ok::<(), leaf_core::LeafError>(())
/// ```
#[derive(Debug)]
pub struct Graph {
    pub(crate) nodes: Vec<TensorData>,
    registry: OpRegistry,
    config: GraphConfig,
}

/// Explicit construction of a [`Graph`] with a chosen registry and configuration.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    registry: Option<OpRegistry>,
    config: GraphConfig,
}

impl GraphBuilder {
    /// Uses `registry` instead of [`OpRegistry::standard`].
    pub fn registry(mut self, registry: OpRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn config(mut self, config: GraphConfig) -> Self {
        self.config = config;
        self
    }

    pub fn intermediate_grad(mut self, policy: IntermediateGradPolicy) -> Self {
        self.config.intermediate_grad = policy;
        self
    }

    pub fn build(self) -> Graph {
        Graph {
            nodes: Vec::new(),
            registry: self.registry.unwrap_or_else(OpRegistry::standard),
            config: self.config,
        }
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    /// A graph with the standard operator catalog and default configuration.
    pub fn new() -> Self {
        GraphBuilder::default().build()
    }

    pub fn builder() -> GraphBuilder {
        GraphBuilder::default()
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    pub fn registry(&self) -> &OpRegistry {
        &self.registry
    }

    /// Number of nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // --- Construction ---

    /// Creates a leaf tensor from raw data.
    ///
    /// # Errors
    /// - `InvalidData` if the data is ragged or cannot be cast to `options.dtype`.
    /// - `UnsupportedDType` if gradients are requested for an integer dtype.
    pub fn tensor(&mut self, data: impl Into<TensorInput>, options: TensorOptions) -> Result<TensorId> {
        let buffer = data.into().into_buffer(options.dtype)?;
        self.push_leaf(buffer, options.requires_grad, options.device)
    }

    pub(crate) fn push_leaf(
        &mut self,
        buffer: Buffer,
        requires_grad: bool,
        device: StorageDevice,
    ) -> Result<TensorId> {
        if requires_grad && !buffer.dtype().is_float() {
            return Err(LeafError::UnsupportedDType {
                operation: "requires_grad".to_string(),
                dtype: buffer.dtype(),
            });
        }
        Ok(self.push(TensorData::new_leaf(buffer, requires_grad, device)))
    }

    fn push(&mut self, node: TensorData) -> TensorId {
        let id = TensorId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    // --- Node access ---

    pub(crate) fn node(&self, id: TensorId) -> Result<&TensorData> {
        self.nodes.get(id.0).ok_or(LeafError::UnknownTensor(id.0))
    }

    pub(crate) fn node_mut(&mut self, id: TensorId) -> Result<&mut TensorData> {
        self.nodes.get_mut(id.0).ok_or(LeafError::UnknownTensor(id.0))
    }

    pub fn data(&self, id: TensorId) -> Result<&Buffer> {
        Ok(&self.node(id)?.data)
    }

    pub fn shape(&self, id: TensorId) -> Result<&[usize]> {
        Ok(self.node(id)?.shape())
    }

    pub fn dtype(&self, id: TensorId) -> Result<DType> {
        Ok(self.node(id)?.dtype())
    }

    pub fn device(&self, id: TensorId) -> Result<StorageDevice> {
        Ok(self.node(id)?.device)
    }

    pub fn numel(&self, id: TensorId) -> Result<usize> {
        Ok(self.node(id)?.numel())
    }

    pub fn is_leaf(&self, id: TensorId) -> Result<bool> {
        Ok(self.node(id)?.is_leaf())
    }

    pub fn requires_grad(&self, id: TensorId) -> Result<bool> {
        Ok(self.node(id)?.requires_grad)
    }

    /// The producing context, `None` for leaves.
    pub fn context(&self, id: TensorId) -> Result<Option<&OpContext>> {
        Ok(self.node(id)?.grad_fn.as_ref())
    }

    /// Value equality: same shape, dtype and elements.
    pub fn tensor_eq(&self, a: TensorId, b: TensorId) -> Result<bool> {
        Ok(self.node(a)?.data == self.node(b)?.data)
    }

    // --- Operator application ---

    /// Applies the registered operator `name` to `operands`.
    ///
    /// Validates the inputs, builds an [`OpContext`] from the tensor operands only,
    /// runs the forward rule on the underlying buffers and appends the result as a
    /// non-leaf node. Scalar operands become constants of the first tensor
    /// operand's dtype; a scalar with a fractional part cannot be applied to an
    /// integer tensor (`InvalidData`).
    pub fn apply(&mut self, name: &str, operands: &[Operand]) -> Result<TensorId> {
        let op = self.registry.get(name)?;
        if operands.len() != op.arity() {
            return Err(LeafError::ArityMismatch {
                operator: name.to_string(),
                expected: op.arity(),
                actual: operands.len(),
            });
        }

        let first = operands
            .iter()
            .find_map(|operand| match operand {
                Operand::Tensor(id) => Some(*id),
                Operand::Scalar(_) => None,
            })
            .ok_or_else(|| {
                LeafError::InvalidData(format!("{} needs at least one tensor operand", name))
            })?;
        let dtype = self.dtype(first)?;
        let device = self.device(first)?;

        let mut inputs: Vec<Buffer> = Vec::with_capacity(operands.len());
        let mut links: Vec<Option<(TensorId, bool)>> = Vec::with_capacity(operands.len());
        for operand in operands {
            match *operand {
                Operand::Tensor(id) => {
                    let node = self.node(id)?;
                    inputs.push(node.data.clone());
                    links.push(Some((id, node.requires_grad)));
                }
                Operand::Scalar(value) => {
                    if !dtype.is_float() && value.fract() != 0.0 {
                        return Err(LeafError::InvalidData(format!(
                            "{}: scalar {} is not representable as {}",
                            name, value, dtype
                        )));
                    }
                    inputs.push(Buffer::full(dtype, &[], value)?);
                    links.push(None);
                }
            }
        }
        let input_refs: Vec<&Buffer> = inputs.iter().collect();

        op.validate(&input_refs)?;
        let mut ctx = OpContext::new(op, &links);
        let output = ctx.forward(&input_refs)?;
        debug!(
            "apply {}: parents {:?} -> shape {:?} (requires_grad={})",
            name,
            ctx.parents(),
            output.shape(),
            ctx.requires_grad()
        );
        Ok(self.push(TensorData::from_op(output, device, ctx)))
    }

    pub fn add(&mut self, a: impl Into<Operand>, b: impl Into<Operand>) -> Result<TensorId> {
        self.apply("add", &[a.into(), b.into()])
    }

    pub fn sub(&mut self, a: impl Into<Operand>, b: impl Into<Operand>) -> Result<TensorId> {
        self.apply("sub", &[a.into(), b.into()])
    }

    pub fn mul(&mut self, a: impl Into<Operand>, b: impl Into<Operand>) -> Result<TensorId> {
        self.apply("mul", &[a.into(), b.into()])
    }

    pub fn matmul(&mut self, a: TensorId, b: TensorId) -> Result<TensorId> {
        self.apply("matmul", &[a.into(), b.into()])
    }

    pub fn exp(&mut self, a: TensorId) -> Result<TensorId> {
        self.apply("exp", &[a.into()])
    }

    pub fn log(&mut self, a: TensorId) -> Result<TensorId> {
        self.apply("log", &[a.into()])
    }

    pub fn relu(&mut self, a: TensorId) -> Result<TensorId> {
        self.apply("relu", &[a.into()])
    }

    pub fn sum(&mut self, a: TensorId) -> Result<TensorId> {
        self.apply("sum", &[a.into()])
    }

    pub fn mean(&mut self, a: TensorId) -> Result<TensorId> {
        self.apply("mean", &[a.into()])
    }
}
