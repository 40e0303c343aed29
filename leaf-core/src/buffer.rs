use ndarray::{ArcArray, ArrayD, IxDyn, Zip};
use num_traits::{NumCast, ToPrimitive};

use crate::error::{LeafError, Result};
use crate::ops::traits::LeafElement;
use crate::types::DType;

/// Dense n-dimensional storage tagged with its element type.
///
/// This is the numeric backend seen by the rest of the crate. Each variant wraps an
/// `ndarray::ArcArray`, so cloning a `Buffer` is cheap and shares the underlying
/// storage; any mutation through ndarray is copy-on-write, which keeps two owners
/// from ever observing each other's writes.
#[derive(Debug, Clone, PartialEq)]
pub enum Buffer {
    F32(ArcArray<f32, IxDyn>),
    F64(ArcArray<f64, IxDyn>),
    I16(ArcArray<i16, IxDyn>),
    I32(ArcArray<i32, IxDyn>),
}

/// Runs `$body` with `$arr` bound to the typed array inside `$buf`, whatever its dtype.
macro_rules! with_buffer {
    ($buf:expr, $arr:ident => $body:expr) => {
        match $buf {
            $crate::buffer::Buffer::F32($arr) => $body,
            $crate::buffer::Buffer::F64($arr) => $body,
            $crate::buffer::Buffer::I16($arr) => $body,
            $crate::buffer::Buffer::I32($arr) => $body,
        }
    };
}

/// Like `with_buffer!` but only for float dtypes. Evaluates to `Result<_>`.
macro_rules! with_float_buffer {
    ($op:expr, $buf:expr, $arr:ident => $body:expr) => {
        match $buf {
            $crate::buffer::Buffer::F32($arr) => Ok($body),
            $crate::buffer::Buffer::F64($arr) => Ok($body),
            other => Err($crate::error::LeafError::UnsupportedDType {
                operation: $op.to_string(),
                dtype: other.dtype(),
            }),
        }
    };
}

/// Binds two buffers of the same dtype. Evaluates to `Result<_>`, failing with
/// `DTypeMismatch` when the dtypes differ.
macro_rules! with_buffer_pair {
    ($op:expr, $a:expr, $b:expr, ($x:ident, $y:ident) => $body:expr) => {
        match ($a, $b) {
            ($crate::buffer::Buffer::F32($x), $crate::buffer::Buffer::F32($y)) => Ok($body),
            ($crate::buffer::Buffer::F64($x), $crate::buffer::Buffer::F64($y)) => Ok($body),
            ($crate::buffer::Buffer::I16($x), $crate::buffer::Buffer::I16($y)) => Ok($body),
            ($crate::buffer::Buffer::I32($x), $crate::buffer::Buffer::I32($y)) => Ok($body),
            (a, b) => Err($crate::error::LeafError::DTypeMismatch {
                operation: $op.to_string(),
                expected: a.dtype(),
                actual: b.dtype(),
            }),
        }
    };
}

/// Float-only variant of `with_buffer_pair!`.
macro_rules! with_float_pair {
    ($op:expr, $a:expr, $b:expr, ($x:ident, $y:ident) => $body:expr) => {
        match ($a, $b) {
            ($crate::buffer::Buffer::F32($x), $crate::buffer::Buffer::F32($y)) => Ok($body),
            ($crate::buffer::Buffer::F64($x), $crate::buffer::Buffer::F64($y)) => Ok($body),
            (a, b) if a.dtype() != b.dtype() => Err($crate::error::LeafError::DTypeMismatch {
                operation: $op.to_string(),
                expected: a.dtype(),
                actual: b.dtype(),
            }),
            (a, _) => Err($crate::error::LeafError::UnsupportedDType {
                operation: $op.to_string(),
                dtype: a.dtype(),
            }),
        }
    };
}

pub(crate) use {with_buffer, with_buffer_pair, with_float_buffer, with_float_pair};

impl Buffer {
    /// Wraps an owned array of any supported element type.
    pub fn from_array<T: LeafElement>(array: ArrayD<T>) -> Self {
        T::wrap(array.into_shared())
    }

    /// Builds a buffer from row-major `f64` values, casting each element to `dtype`.
    ///
    /// Fails with `InvalidData` when the value count does not match `shape` or when a
    /// value cannot be represented in `dtype` (NaN or out of range for an integer type).
    pub fn from_f64_values(values: Vec<f64>, shape: &[usize], dtype: DType) -> Result<Self> {
        let numel: usize = shape.iter().product();
        if values.len() != numel {
            return Err(LeafError::InvalidData(format!(
                "data length {} does not match shape {:?}",
                values.len(),
                shape
            )));
        }
        match dtype {
            DType::F32 => cast_values::<f32>(&values, shape),
            DType::F64 => cast_values::<f64>(&values, shape),
            DType::I16 => cast_values::<i16>(&values, shape),
            DType::I32 => cast_values::<i32>(&values, shape),
        }
    }

    /// A buffer of `dtype` filled with `value`.
    pub fn full(dtype: DType, shape: &[usize], value: f64) -> Result<Self> {
        let numel: usize = shape.iter().product();
        Self::from_f64_values(vec![value; numel], shape, dtype)
    }

    pub fn zeros(dtype: DType, shape: &[usize]) -> Self {
        match dtype {
            DType::F32 => Buffer::F32(ArcArray::zeros(IxDyn(shape))),
            DType::F64 => Buffer::F64(ArcArray::zeros(IxDyn(shape))),
            DType::I16 => Buffer::I16(ArcArray::zeros(IxDyn(shape))),
            DType::I32 => Buffer::I32(ArcArray::zeros(IxDyn(shape))),
        }
    }

    pub fn ones(dtype: DType, shape: &[usize]) -> Self {
        match dtype {
            DType::F32 => Buffer::F32(ArcArray::ones(IxDyn(shape))),
            DType::F64 => Buffer::F64(ArcArray::ones(IxDyn(shape))),
            DType::I16 => Buffer::I16(ArcArray::ones(IxDyn(shape))),
            DType::I32 => Buffer::I32(ArcArray::ones(IxDyn(shape))),
        }
    }

    pub fn dtype(&self) -> DType {
        match self {
            Buffer::F32(_) => DType::F32,
            Buffer::F64(_) => DType::F64,
            Buffer::I16(_) => DType::I16,
            Buffer::I32(_) => DType::I32,
        }
    }

    pub fn shape(&self) -> &[usize] {
        with_buffer!(self, a => a.shape())
    }

    pub fn numel(&self) -> usize {
        with_buffer!(self, a => a.len())
    }

    /// Converts to another dtype. Float to integer conversion truncates and fails
    /// for values that have no integer representation.
    pub fn cast(&self, dtype: DType) -> Result<Self> {
        if self.dtype() == dtype {
            return Ok(self.clone());
        }
        with_buffer!(self, a => match dtype {
            DType::F32 => cast_array::<_, f32>(a),
            DType::F64 => cast_array::<_, f64>(a),
            DType::I16 => cast_array::<_, i16>(a),
            DType::I32 => cast_array::<_, i32>(a),
        })
    }

    /// Typed access to the underlying array.
    pub fn as_array<T: LeafElement>(&self) -> Option<&ArcArray<T, IxDyn>> {
        T::unwrap_ref(self)
    }

    /// Copies the elements, in row-major order, into a `Vec<f64>`.
    pub fn to_f64_vec(&self) -> Vec<f64> {
        with_buffer!(self, a => a.iter().map(|x| x.to_f64().unwrap_or(f64::NAN)).collect())
    }

    /// Returns the single element of a one-element buffer as `f64`.
    pub fn item(&self) -> Option<f64> {
        if self.numel() == 1 {
            self.to_f64_vec().first().copied()
        } else {
            None
        }
    }

    /// A copy that shares no storage with `self`.
    pub fn deep_copy(&self) -> Buffer {
        with_buffer!(self, a => Buffer::from_array(a.to_owned()))
    }

    /// Element-wise sum of two buffers with identical dtype and shape.
    ///
    /// Used for gradient accumulation; the result owns fresh storage.
    pub fn accumulate(&self, other: &Buffer) -> Result<Buffer> {
        if self.shape() != other.shape() {
            return Err(LeafError::ShapeMismatch {
                expected: self.shape().to_vec(),
                actual: other.shape().to_vec(),
                operation: "accumulate_grad".to_string(),
            });
        }
        with_buffer_pair!("accumulate_grad", self, other, (a, b) => {
            Buffer::from_array(Zip::from(a).and(b).map_collect(|&x, &y| x.elem_add(y)))
        })
    }
}

fn cast_values<T: LeafElement>(values: &[f64], shape: &[usize]) -> Result<Buffer> {
    let cast: Option<Vec<T>> = values.iter().map(|&v| <T as NumCast>::from(v)).collect();
    let cast = cast.ok_or_else(|| {
        LeafError::InvalidData(format!("value not representable as {}", T::DTYPE))
    })?;
    let array = ArrayD::from_shape_vec(IxDyn(shape), cast)
        .map_err(|e| LeafError::InternalError(format!("shape error while building buffer: {}", e)))?;
    Ok(Buffer::from_array(array))
}

fn cast_array<S: LeafElement, D: LeafElement>(array: &ArcArray<S, IxDyn>) -> Result<Buffer> {
    let cast: Option<Vec<D>> = array.iter().map(|&v| <D as NumCast>::from(v)).collect();
    let cast = cast.ok_or_else(|| {
        LeafError::InvalidData(format!("value not representable as {}", D::DTYPE))
    })?;
    let out = ArrayD::from_shape_vec(array.raw_dim(), cast)
        .map_err(|e| LeafError::InternalError(format!("shape error while casting: {}", e)))?;
    Ok(Buffer::from_array(out))
}

impl<T: LeafElement> From<ArrayD<T>> for Buffer {
    fn from(array: ArrayD<T>) -> Self {
        Buffer::from_array(array)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_values_and_cast() {
        let b = Buffer::from_f64_values(vec![1.5, -2.0, 3.0], &[3], DType::F32).unwrap();
        assert_eq!(b.dtype(), DType::F32);
        assert_eq!(b.shape(), &[3]);
        let i = b.cast(DType::I32).unwrap();
        assert_eq!(i.to_f64_vec(), vec![1.0, -2.0, 3.0]);
    }

    #[test]
    fn test_nan_to_int_rejected() {
        let err = Buffer::from_f64_values(vec![f64::NAN], &[1], DType::I16).unwrap_err();
        assert!(matches!(err, LeafError::InvalidData(_)));
    }

    #[test]
    fn test_length_mismatch_rejected() {
        assert!(Buffer::from_f64_values(vec![1.0, 2.0], &[3], DType::F64).is_err());
    }

    #[test]
    fn test_accumulate_owns_fresh_storage() {
        let a = Buffer::ones(DType::F32, &[2, 2]);
        let shared = a.clone();
        let sum = a.accumulate(&shared).unwrap();
        assert_eq!(sum.to_f64_vec(), vec![2.0; 4]);
        assert_eq!(a.to_f64_vec(), vec![1.0; 4]);
    }

    #[test]
    fn test_accumulate_dtype_mismatch() {
        let a = Buffer::ones(DType::F32, &[2]);
        let b = Buffer::ones(DType::F64, &[2]);
        assert!(matches!(a.accumulate(&b), Err(LeafError::DTypeMismatch { .. })));
    }
}
