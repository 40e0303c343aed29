use std::fmt;

// Graph methods grouped by concern.
mod autograd_methods;
pub mod create;

pub mod broadcast_utils;
pub mod input;
pub mod options;

pub use input::TensorInput;
pub use options::TensorOptions;

/// Handle to a tensor node inside a [`Graph`](crate::Graph).
///
/// A `TensorId` is a stable index into the graph's node arena. It is `Copy`, owns
/// nothing, and is only meaningful for the graph that returned it. Operator
/// contexts refer to their parents through `TensorId`s, and a context is always
/// created after its parents, so a parent index is strictly smaller than the index
/// of the node it feeds: the graph cannot contain a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TensorId(pub(crate) usize);

impl TensorId {
    /// Position of the node in its graph's arena.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for TensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tensor#{}", self.0)
    }
}
