//! # Automatic Differentiation (`autograd`)
//!
//! The pieces of the reverse-mode engine that do not depend on any particular
//! operator:
//!
//! - [`Operator`]: the forward/backward pair every differentiable operation implements.
//! - [`OpContext`]: the per-application record linking an output node to its parents
//!   and to whatever the forward rule saved.
//! - `graph`: topological ordering of the node arena.
//! - [`grad_check`]: finite-difference verification of backward rules.
//!
//! The backward pass itself is [`Graph::backward`](crate::Graph::backward).

pub mod backward_op;
pub mod context;
pub mod grad_check;
pub(crate) mod graph;

pub use backward_op::Operator;
pub use context::{OpContext, SavedValue};
