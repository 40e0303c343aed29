//! Linear algebra operations.

pub mod matmul;

pub use matmul::MatmulOp;
