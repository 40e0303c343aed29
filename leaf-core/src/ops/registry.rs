use std::collections::BTreeMap;
use std::sync::Arc;

use crate::autograd::Operator;
use crate::error::{LeafError, Result};

use super::activation::relu::ReluOp;
use super::arithmetic::{add::AddOp, mul::MulOp, sub::SubOp};
use super::linalg::matmul::MatmulOp;
use super::math_elem::{exp::ExpOp, ln::LnOp};
use super::reduction::{mean::MeanOp, sum::SumOp};

/// Name-indexed table of operators.
///
/// Built explicitly, either empty with [`OpRegistry::new`] or pre-filled with the
/// catalog by [`OpRegistry::standard`], and handed to a graph through
/// [`GraphBuilder::registry`](crate::GraphBuilder::registry).
#[derive(Debug, Clone, Default)]
pub struct OpRegistry {
    ops: BTreeMap<&'static str, Arc<dyn Operator>>,
}

impl OpRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every operator of the built-in catalog.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(AddOp);
        registry.register(SubOp);
        registry.register(MulOp);
        registry.register(MatmulOp);
        registry.register(ExpOp);
        registry.register(LnOp);
        registry.register(ReluOp);
        registry.register(SumOp);
        registry.register(MeanOp);
        registry
    }

    /// Adds `op` under its own name, returning the operator it replaced, if any.
    pub fn register(&mut self, op: impl Operator + 'static) -> Option<Arc<dyn Operator>> {
        self.register_arc(Arc::new(op))
    }

    pub fn register_arc(&mut self, op: Arc<dyn Operator>) -> Option<Arc<dyn Operator>> {
        self.ops.insert(op.name(), op)
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, op: impl Operator + 'static) -> Self {
        self.register(op);
        self
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn Operator>> {
        self.ops
            .get(name)
            .cloned()
            .ok_or_else(|| LeafError::UnknownOperator(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.ops.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.ops.keys().copied()
    }
}
