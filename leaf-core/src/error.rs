use crate::types::DType;
use thiserror::Error;

/// Broad category of a [`LeafError`].
///
/// Every variant of `LeafError` belongs to exactly one category, so callers that
/// only care about "was this a shape problem or a gradient problem" can match on
/// the kind instead of on individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Incompatible shapes for broadcasting, matrix product, or a seed gradient.
    Shape,
    /// Invalid backward pass: non-scalar start without seed, missing gradient.
    Gradient,
    /// Non-numeric or ill-typed data, dtype mismatches.
    Type,
    /// Unknown, mis-called or unimplemented operator.
    Operator,
    /// Broken internal invariant. Always a bug in this crate or in an operator.
    Internal,
}

/// Custom error type for the leaf autograd engine.
#[derive(Error, Debug, PartialEq, Clone)]
pub enum LeafError {
    #[error("Shape mismatch: expected {expected:?}, got {actual:?} during operation {operation}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
        operation: String,
    },

    #[error("Cannot broadcast shapes {shape1:?} and {shape2:?} in operation {operation}")]
    BroadcastError {
        operation: String,
        shape1: Vec<usize>,
        shape2: Vec<usize>,
    },

    #[error("Incompatible shapes for operation {operation}: {shape1:?} and {shape2:?}")]
    IncompatibleShapes {
        operation: String,
        shape1: Vec<usize>,
        shape2: Vec<usize>,
    },

    #[error("Backward initiated on non-scalar output of shape {shape:?} without an explicit seed gradient")]
    BackwardNonScalar { shape: Vec<usize> },

    #[error("Backward initiated on tensor {id} which does not require grad")]
    RequiresGradNotMet { id: usize },

    #[error("requires_grad can only be changed on leaf tensors (tensor {id}); use detach()")]
    NonLeafRequiresGrad { id: usize },

    #[error("Gradient missing for tensor {id} during backward replay (produced by {operation})")]
    MissingGradient { id: usize, operation: String },

    #[error("Invalid tensor data: {0}")]
    InvalidData(String),

    #[error("DType mismatch in {operation}: expected {expected:?}, got {actual:?}")]
    DTypeMismatch {
        operation: String,
        expected: DType,
        actual: DType,
    },

    #[error("Operation {operation} does not support dtype {dtype:?}")]
    UnsupportedDType { operation: String, dtype: DType },

    #[error("Unknown operator: {0}")]
    UnknownOperator(String),

    #[error("Operator {operator} expects {expected} inputs, got {actual}")]
    ArityMismatch {
        operator: String,
        expected: usize,
        actual: usize,
    },

    #[error("{pass} pass not implemented for operator {operator}")]
    NotImplemented { operator: String, pass: &'static str },

    #[error("Tensor {0} does not belong to this graph")]
    UnknownTensor(usize),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl LeafError {
    /// Returns the category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            LeafError::ShapeMismatch { .. }
            | LeafError::BroadcastError { .. }
            | LeafError::IncompatibleShapes { .. } => ErrorKind::Shape,
            LeafError::BackwardNonScalar { .. }
            | LeafError::RequiresGradNotMet { .. }
            | LeafError::NonLeafRequiresGrad { .. }
            | LeafError::MissingGradient { .. } => ErrorKind::Gradient,
            LeafError::InvalidData(_)
            | LeafError::DTypeMismatch { .. }
            | LeafError::UnsupportedDType { .. } => ErrorKind::Type,
            LeafError::UnknownOperator(_)
            | LeafError::ArityMismatch { .. }
            | LeafError::NotImplemented { .. } => ErrorKind::Operator,
            LeafError::UnknownTensor(_) | LeafError::InternalError(_) => ErrorKind::Internal,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, LeafError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        let err = LeafError::BroadcastError {
            operation: "add".to_string(),
            shape1: vec![2, 3],
            shape2: vec![4],
        };
        assert_eq!(err.kind(), ErrorKind::Shape);
        assert_eq!(LeafError::BackwardNonScalar { shape: vec![3] }.kind(), ErrorKind::Gradient);
        assert_eq!(LeafError::InvalidData("ragged".into()).kind(), ErrorKind::Type);
        assert_eq!(
            LeafError::NotImplemented { operator: "foo".into(), pass: "backward" }.kind(),
            ErrorKind::Operator
        );
    }

    #[test]
    fn test_display_names_operator_and_shapes() {
        let err = LeafError::IncompatibleShapes {
            operation: "matmul".to_string(),
            shape1: vec![2, 3],
            shape2: vec![4, 5],
        };
        let msg = err.to_string();
        assert!(msg.contains("matmul"));
        assert!(msg.contains("[2, 3]"));
        assert!(msg.contains("[4, 5]"));
    }
}
