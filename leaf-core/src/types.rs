use std::fmt;

/// Defines the possible data types for Tensor elements.
///
/// Floating-point types are the working precision of the engine. The integer
/// types exist for masks and indices; they can be created and combined with
/// the non-differentiable parts of the operator catalog but never require
/// gradients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DType {
    /// 32-bit floating-point type. The default.
    #[default]
    F32,
    /// 64-bit floating-point type.
    F64,
    /// 16-bit integer type.
    I16,
    /// 32-bit integer type.
    I32,
}

impl DType {
    /// Returns `true` for dtypes that can carry gradients.
    pub fn is_float(&self) -> bool {
        matches!(self, DType::F32 | DType::F64)
    }

    pub fn name(&self) -> &'static str {
        match self {
            DType::F32 => "float32",
            DType::F64 => "float64",
            DType::I16 => "int16",
            DType::I32 => "int32",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
