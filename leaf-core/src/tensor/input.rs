use ndarray::ArrayD;
use num_traits::ToPrimitive;

use crate::buffer::Buffer;
use crate::error::{LeafError, Result};
use crate::ops::traits::LeafElement;
use crate::types::DType;

/// Raw data accepted by [`Graph::tensor`](crate::Graph::tensor).
///
/// Any input is normalised into a dense [`Buffer`] of the requested dtype. A bare
/// scalar becomes a tensor of shape `[1]`; nested sequences must be rectangular.
#[derive(Debug, Clone, PartialEq)]
pub enum TensorInput {
    Scalar(f64),
    Seq(Vec<TensorInput>),
    Array(Buffer),
}

impl TensorInput {
    /// Converts the input into a buffer of `dtype`.
    ///
    /// An empty top-level sequence gives shape `[0]`.
    ///
    /// # Errors
    /// `InvalidData` for ragged nesting, for an empty sequence nested below the top
    /// level, or for values that cannot be cast to `dtype`.
    pub fn into_buffer(self, dtype: DType) -> Result<Buffer> {
        match self {
            TensorInput::Scalar(value) => Buffer::from_f64_values(vec![value], &[1], dtype),
            TensorInput::Array(buffer) => buffer.cast(dtype),
            TensorInput::Seq(ref items) if items.iter().any(TensorInput::has_empty_seq) => {
                Err(LeafError::InvalidData(
                    "empty nested sequence below the top level".to_string(),
                ))
            }
            seq @ TensorInput::Seq(_) => {
                let shape = seq.inferred_shape();
                let mut values = Vec::with_capacity(shape.iter().product());
                seq.flatten_into(&shape, &mut values)?;
                Buffer::from_f64_values(values, &shape, dtype)
            }
        }
    }

    fn has_empty_seq(&self) -> bool {
        match self {
            TensorInput::Seq(items) => items.is_empty() || items.iter().any(TensorInput::has_empty_seq),
            _ => false,
        }
    }

    /// Shape implied by following the first element at every nesting level.
    fn inferred_shape(&self) -> Vec<usize> {
        match self {
            TensorInput::Scalar(_) => Vec::new(),
            TensorInput::Array(buffer) => buffer.shape().to_vec(),
            TensorInput::Seq(items) => {
                let mut shape = vec![items.len()];
                if let Some(first) = items.first() {
                    shape.extend(first.inferred_shape());
                }
                shape
            }
        }
    }

    fn flatten_into(&self, expected: &[usize], values: &mut Vec<f64>) -> Result<()> {
        match self {
            TensorInput::Scalar(value) if expected.is_empty() => {
                values.push(*value);
                Ok(())
            }
            TensorInput::Array(buffer) if buffer.shape() == expected => {
                values.extend(buffer.to_f64_vec());
                Ok(())
            }
            TensorInput::Seq(items) if expected.first() == Some(&items.len()) => {
                items
                    .iter()
                    .try_for_each(|item| item.flatten_into(&expected[1..], values))
            }
            _ => Err(LeafError::InvalidData(format!(
                "ragged nested sequence: element does not match expected shape {:?}",
                expected
            ))),
        }
    }
}

macro_rules! impl_scalar_input {
    ($($t:ty),*) => {
        $(
            impl From<$t> for TensorInput {
                fn from(value: $t) -> Self {
                    TensorInput::Scalar(value.to_f64().unwrap_or(f64::NAN))
                }
            }
        )*
    };
}

impl_scalar_input!(f32, f64, i16, i32, i64, u8, u32, usize);

impl<T: Into<TensorInput>> From<Vec<T>> for TensorInput {
    fn from(items: Vec<T>) -> Self {
        TensorInput::Seq(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<TensorInput>, const N: usize> From<[T; N]> for TensorInput {
    fn from(items: [T; N]) -> Self {
        TensorInput::Seq(items.into_iter().map(Into::into).collect())
    }
}

impl<T: LeafElement> From<ArrayD<T>> for TensorInput {
    fn from(array: ArrayD<T>) -> Self {
        TensorInput::Array(Buffer::from_array(array))
    }
}

impl From<Buffer> for TensorInput {
    fn from(buffer: Buffer) -> Self {
        TensorInput::Array(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_becomes_shape_one() {
        let b = TensorInput::from(2.0).into_buffer(DType::F32).unwrap();
        assert_eq!(b.shape(), &[1]);
        let b = TensorInput::from(100).into_buffer(DType::F32).unwrap();
        assert_eq!(b.shape(), &[1]);
        assert_eq!(b.to_f64_vec(), vec![100.0]);
    }

    #[test]
    fn test_nested_shapes() {
        let b = TensorInput::from(vec![3, 2, 4]).into_buffer(DType::F32).unwrap();
        assert_eq!(b.shape(), &[3]);

        let b = TensorInput::from([[-2.3, 0.0], [-4.9, 8.0]])
            .into_buffer(DType::F32)
            .unwrap();
        assert_eq!(b.shape(), &[2, 2]);

        let b = TensorInput::from(ArrayD::<f64>::zeros(ndarray::IxDyn(&[3, 4, 2])))
            .into_buffer(DType::F32)
            .unwrap();
        assert_eq!(b.shape(), &[3, 4, 2]);
    }

    #[test]
    fn test_dtype_cast() {
        let b = TensorInput::from(vec![3, 2, 4]).into_buffer(DType::I16).unwrap();
        assert_eq!(b.dtype(), DType::I16);
        let b = TensorInput::from(vec![3.0, 2.1, 8.6, -2.0])
            .into_buffer(DType::F32)
            .unwrap();
        assert_eq!(b.dtype(), DType::F32);
    }

    #[test]
    fn test_ragged_rejected() {
        let ragged = TensorInput::Seq(vec![
            TensorInput::from(vec![1.0, 2.0]),
            TensorInput::from(vec![3.0]),
        ]);
        let err = ragged.into_buffer(DType::F32).unwrap_err();
        assert!(matches!(err, LeafError::InvalidData(_)));

        let mixed = TensorInput::Seq(vec![TensorInput::from(1.0), TensorInput::from(vec![2.0])]);
        assert!(mixed.into_buffer(DType::F32).is_err());
    }

    #[test]
    fn test_empty_nested_level_rejected() {
        let nested_empty = TensorInput::Seq(vec![TensorInput::Seq(vec![]), TensorInput::Seq(vec![])]);
        let err = nested_empty.into_buffer(DType::F32).unwrap_err();
        assert!(matches!(err, LeafError::InvalidData(_)));
        assert_eq!(err.kind(), crate::ErrorKind::Type);

        let deep = TensorInput::from(vec![vec![vec![1.0]], vec![vec![]]]);
        assert!(deep.into_buffer(DType::F32).is_err());

        // Only the top level may be empty.
        let top = TensorInput::Seq(vec![]).into_buffer(DType::F32).unwrap();
        assert_eq!(top.shape(), &[0]);
    }

    #[test]
    fn test_nan_into_integer_rejected() {
        let err = TensorInput::from(f64::NAN).into_buffer(DType::I32).unwrap_err();
        assert!(matches!(err, LeafError::InvalidData(_)));
    }
}
