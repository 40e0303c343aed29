use log::{debug, trace, warn};

use crate::autograd::graph::topological_sort;
use crate::buffer::Buffer;
use crate::error::{LeafError, Result};
use crate::graph::{Graph, IntermediateGradPolicy};
use crate::tensor::TensorId;
use crate::tensor_data::TensorData;

impl Graph {
    /// The gradient stored on `id`, if any.
    pub fn grad(&self, id: TensorId) -> Result<Option<&Buffer>> {
        Ok(self.node(id)?.grad.as_ref())
    }

    /// Stores a user-supplied gradient on `id`.
    ///
    /// This is the only way a node with `requires_grad = false` can hold a gradient.
    /// The buffer is copied, so later writes through `grad` cannot reach the node.
    ///
    /// # Errors
    /// `ShapeMismatch` or `DTypeMismatch` if `grad` does not match the node's data.
    pub fn set_grad(&mut self, id: TensorId, grad: Buffer) -> Result<()> {
        let node = self.node_mut(id)?;
        check_grad_matches(node, &grad, "set_grad")?;
        if !node.requires_grad {
            warn!("set_grad on {} which does not require grad", id);
        }
        node.grad = Some(grad.deep_copy());
        Ok(())
    }

    /// Resets the gradient of `id` to unset.
    pub fn zero_grad(&mut self, id: TensorId) -> Result<()> {
        self.node_mut(id)?.grad = None;
        Ok(())
    }

    /// Resets every gradient in the graph to unset.
    pub fn zero_grads(&mut self) {
        for node in &mut self.nodes {
            node.grad = None;
        }
    }

    /// Enables or disables gradient tracking on a leaf.
    ///
    /// # Errors
    /// - `NonLeafRequiresGrad` when changing the flag of a non-leaf; its flag is
    ///   derived from its context. Use [`detach`](Self::detach) instead.
    /// - `UnsupportedDType` when enabling it on an integer tensor.
    pub fn set_requires_grad(&mut self, id: TensorId, requires_grad: bool) -> Result<()> {
        let node = self.node_mut(id)?;
        if node.requires_grad == requires_grad {
            return Ok(());
        }
        if !node.is_leaf() {
            return Err(LeafError::NonLeafRequiresGrad { id: id.index() });
        }
        if requires_grad && !node.dtype().is_float() {
            return Err(LeafError::UnsupportedDType {
                operation: "requires_grad".to_string(),
                dtype: node.dtype(),
            });
        }
        node.requires_grad = requires_grad;
        Ok(())
    }

    /// Returns a new leaf holding the values of `id`, with no graph linkage and
    /// `requires_grad = false`.
    ///
    /// The values are shared, not copied; the storage is copy-on-write.
    pub fn detach(&mut self, id: TensorId) -> Result<TensorId> {
        let node = self.node(id)?;
        let (data, device) = (node.data.clone(), node.device);
        self.push_leaf(data, false, device)
    }

    /// Every node reachable from `id` through producing contexts, in post-order:
    /// each node comes after all of its inputs, and appears once.
    pub fn topological_order(&self, id: TensorId) -> Result<Vec<TensorId>> {
        self.node(id)?;
        Ok(topological_sort(&self.nodes, id))
    }

    /// Runs the backward pass from `start`.
    ///
    /// Without a `seed`, `start` must hold exactly one element and is seeded with
    /// ones. The seed overwrites the gradient of `start`; the graph is then replayed
    /// output-to-input and each operator's backward rule routes gradients to its
    /// parents. Leaf gradients always accumulate across contributions and across
    /// passes. Intermediate gradients follow the graph's
    /// [`IntermediateGradPolicy`].
    ///
    /// # Errors
    /// - `RequiresGradNotMet` if `start` does not require gradients.
    /// - `BackwardNonScalar` if `seed` is omitted and `start` is not a one-element tensor.
    /// - `ShapeMismatch` / `DTypeMismatch` if `seed` does not match `start`.
    /// - `MissingGradient` if a node that should have received a gradient has none.
    /// - Any error from an operator's backward rule.
    pub fn backward(&mut self, start: TensorId, seed: Option<Buffer>) -> Result<()> {
        let start_node = self.node(start)?;
        if !start_node.requires_grad {
            return Err(LeafError::RequiresGradNotMet { id: start.index() });
        }
        let seed = match seed {
            Some(seed) => {
                check_grad_matches(start_node, &seed, "backward")?;
                seed.deep_copy()
            }
            None => {
                if start_node.numel() != 1 {
                    return Err(LeafError::BackwardNonScalar {
                        shape: start_node.shape().to_vec(),
                    });
                }
                Buffer::ones(start_node.dtype(), start_node.shape())
            }
        };
        let start_is_leaf = start_node.is_leaf();

        let order = topological_sort(&self.nodes, start);
        let policy = self.config().intermediate_grad;
        debug!(
            "backward from {}: {} nodes, intermediate policy {:?}",
            start,
            order.len(),
            policy
        );

        if policy == IntermediateGradPolicy::Accumulate {
            for &id in &order {
                let node = &mut self.nodes[id.index()];
                if id != start && !node.is_leaf() {
                    node.grad = None;
                }
            }
        }
        self.nodes[start.index()].grad = Some(seed);

        if start_is_leaf {
            warn!("backward started on leaf {}; nothing to propagate", start);
            return Ok(());
        }

        for &id in order.iter().rev() {
            let node = &self.nodes[id.index()];
            let ctx = match node.grad_fn.as_ref() {
                Some(ctx) => ctx,
                None => continue,
            };
            if !ctx
                .parents()
                .iter()
                .any(|parent| self.nodes[parent.index()].requires_grad)
            {
                trace!("skip {} ({}): no parent requires grad", id, ctx.operator_name());
                continue;
            }
            let grad = node.grad.as_ref().ok_or_else(|| LeafError::MissingGradient {
                id: id.index(),
                operation: ctx.operator_name().to_string(),
            })?;

            trace!("replay {} ({})", id, ctx.operator_name());
            let parent_grads = ctx.backward(grad)?;
            let parents = ctx.parents().to_vec();
            let operator = ctx.operator_name();

            for (parent, parent_grad) in parents.into_iter().zip(parent_grads) {
                let parent_grad = match parent_grad {
                    Some(g) => g,
                    None => continue,
                };
                let parent_node = &self.nodes[parent.index()];
                if !parent_node.requires_grad {
                    continue;
                }
                if parent_grad.shape() != parent_node.shape()
                    || parent_grad.dtype() != parent_node.dtype()
                {
                    return Err(LeafError::InternalError(format!(
                        "{} backward produced a {} gradient of shape {:?} for {} ({} {:?})",
                        operator,
                        parent_grad.dtype(),
                        parent_grad.shape(),
                        parent,
                        parent_node.dtype(),
                        parent_node.shape()
                    )));
                }
                self.accumulate_grad(parent, parent_grad, policy)?;
            }
        }

        debug!("backward from {} done", start);
        Ok(())
    }

    /// Routes one gradient contribution into `id`.
    ///
    /// Unset: store a copy. Leaf: add. Intermediate: add or overwrite per `policy`.
    fn accumulate_grad(
        &mut self,
        id: TensorId,
        grad: Buffer,
        policy: IntermediateGradPolicy,
    ) -> Result<()> {
        let node = self.node_mut(id)?;
        let updated = match node.grad.as_ref() {
            None => {
                trace!("{}: first gradient", id);
                grad.deep_copy()
            }
            Some(existing) if node.is_leaf() || policy == IntermediateGradPolicy::Accumulate => {
                trace!("{}: accumulate", id);
                existing.accumulate(&grad)?
            }
            Some(_) => {
                trace!("{}: overwrite", id);
                grad.deep_copy()
            }
        };
        node.grad = Some(updated);
        Ok(())
    }
}

fn check_grad_matches(node: &TensorData, grad: &Buffer, operation: &str) -> Result<()> {
    if grad.shape() != node.shape() {
        return Err(LeafError::ShapeMismatch {
            expected: node.shape().to_vec(),
            actual: grad.shape().to_vec(),
            operation: operation.to_string(),
        });
    }
    if grad.dtype() != node.dtype() {
        return Err(LeafError::DTypeMismatch {
            operation: operation.to_string(),
            expected: node.dtype(),
            actual: grad.dtype(),
        });
    }
    Ok(())
}

#[cfg(test)]
#[path = "autograd_methods_test.rs"]
mod tests;
