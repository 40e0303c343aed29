//! # Activation Functions
//!
//! Non-linear element-wise functions.
//!
//! ## Currently Implemented:
//! - [`ReluOp`]: Rectified Linear Unit.

pub mod relu;

pub use relu::ReluOp;
