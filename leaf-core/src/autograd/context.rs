use std::fmt;
use std::sync::Arc;

use crate::autograd::Operator;
use crate::buffer::Buffer;
use crate::error::{LeafError, Result};
use crate::tensor::TensorId;

/// A value retained by a forward rule for use by the matching backward rule.
#[derive(Debug, Clone, PartialEq)]
pub enum SavedValue {
    Buffer(Buffer),
    Shape(Vec<usize>),
}

/// The record of one operator application.
///
/// A context is created right before its forward rule runs and is then owned by the
/// single tensor it produced. It knows which graph nodes were its tensor inputs
/// (`parents`, as arena indices), which inputs were scalar constants, and what the
/// forward rule saved.
pub struct OpContext {
    op: Arc<dyn Operator>,
    parents: Vec<TensorId>,
    /// Per input: index into `parents`, or `None` for a scalar constant.
    input_slots: Vec<Option<usize>>,
    needs_input_grad: Vec<bool>,
    saved_values: Vec<SavedValue>,
    requires_grad: bool,
    forwarded: bool,
}

impl OpContext {
    /// Builds a context for `op`.
    ///
    /// `inputs` lists every input in call order: `Some((id, requires_grad))` for a
    /// tensor operand, `None` for a scalar constant.
    pub(crate) fn new(op: Arc<dyn Operator>, inputs: &[Option<(TensorId, bool)>]) -> Self {
        let mut parents = Vec::new();
        let mut input_slots = Vec::with_capacity(inputs.len());
        let mut needs_input_grad = Vec::with_capacity(inputs.len());
        for input in inputs {
            match input {
                Some((id, requires_grad)) => {
                    input_slots.push(Some(parents.len()));
                    parents.push(*id);
                    needs_input_grad.push(*requires_grad);
                }
                None => {
                    input_slots.push(None);
                    needs_input_grad.push(false);
                }
            }
        }
        let requires_grad = needs_input_grad.iter().any(|&r| r);
        OpContext {
            op,
            parents,
            input_slots,
            needs_input_grad,
            saved_values: Vec::new(),
            requires_grad,
            forwarded: false,
        }
    }

    pub fn operator_name(&self) -> &'static str {
        self.op.name()
    }

    /// Tensor inputs, in call order. Scalar constants are not parents.
    pub fn parents(&self) -> &[TensorId] {
        &self.parents
    }

    /// `true` iff any parent requires gradients. Fixed at construction.
    pub fn requires_grad(&self) -> bool {
        self.requires_grad
    }

    /// Whether input `index` (counting scalar constants) wants a gradient.
    pub fn needs_input_grad(&self, index: usize) -> bool {
        self.needs_input_grad.get(index).copied().unwrap_or(false)
    }

    pub fn saved_values(&self) -> &[SavedValue] {
        &self.saved_values
    }

    /// Retains a value for the backward rule. Only reachable from `forward`,
    /// which is the only place a `&mut OpContext` is handed out.
    pub fn save_for_backward(&mut self, value: SavedValue) {
        self.saved_values.push(value);
    }

    pub fn saved_buffer(&self, index: usize) -> Result<&Buffer> {
        match self.saved_values.get(index) {
            Some(SavedValue::Buffer(buffer)) => Ok(buffer),
            other => Err(self.saved_mismatch(index, "buffer", other)),
        }
    }

    pub fn saved_shape(&self, index: usize) -> Result<&[usize]> {
        match self.saved_values.get(index) {
            Some(SavedValue::Shape(shape)) => Ok(shape),
            other => Err(self.saved_mismatch(index, "shape", other)),
        }
    }

    fn saved_mismatch(&self, index: usize, wanted: &str, found: Option<&SavedValue>) -> LeafError {
        LeafError::InternalError(format!(
            "{}: saved value {} is not a {} (found {:?})",
            self.op.name(),
            index,
            wanted,
            found
        ))
    }

    /// Runs the operator's forward rule. Allowed once per context.
    pub(crate) fn forward(&mut self, inputs: &[&Buffer]) -> Result<Buffer> {
        if self.forwarded {
            return Err(LeafError::InternalError(format!(
                "{}: forward called twice on the same context",
                self.op.name()
            )));
        }
        self.forwarded = true;
        let op = Arc::clone(&self.op);
        op.forward(self, inputs)
    }

    /// Runs the operator's backward rule and returns one entry per parent.
    ///
    /// Entries for scalar constants are dropped; entries for parents that do not
    /// require gradients are forced to `None`.
    pub fn backward(&self, grad_output: &Buffer) -> Result<Vec<Option<Buffer>>> {
        let per_input = self.op.backward(self, grad_output)?;
        if per_input.len() != self.input_slots.len() {
            return Err(LeafError::InternalError(format!(
                "{} backward returned {} gradients, expected {}",
                self.op.name(),
                per_input.len(),
                self.input_slots.len()
            )));
        }
        let mut per_parent = vec![None; self.parents.len()];
        for (input_index, grad) in per_input.into_iter().enumerate() {
            if let Some(slot) = self.input_slots[input_index] {
                if self.needs_input_grad[input_index] {
                    per_parent[slot] = grad;
                }
            }
        }
        Ok(per_parent)
    }
}

impl fmt::Debug for OpContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpContext")
            .field("op", &self.op.name())
            .field("parents", &self.parents)
            .field("requires_grad", &self.requires_grad)
            .field("saved_values", &self.saved_values.len())
            .finish()
    }
}
