pub mod numeric;

pub use numeric::{elem_sum, LeafElement, LeafFloat};
