use std::fmt::Debug;

use ndarray::{Array2, ArcArray, ArrayView2, IxDyn, LinalgScalar};
use num_traits::{Float, FromPrimitive, NumCast};

use crate::buffer::Buffer;
use crate::types::DType;

/// A trait representing the element types a [`Buffer`] can hold.
///
/// It bounds the generic kernels of the operator catalog and ties each Rust
/// element type to its [`DType`] tag and `Buffer` variant.
///
/// Kernels do arithmetic through the `elem_*` methods and [`matmul`](Self::matmul)
/// rather than the operators: integer types wrap on overflow, two's-complement, as
/// NumPy does. Floats follow IEEE semantics.
pub trait LeafElement:
    LinalgScalar // Copy + Zero + One + Add + Sub + Mul + Div, required by `dot`
    + NumCast
    + PartialOrd
    + Debug
    + Send
    + Sync
    + 'static
{
    const DTYPE: DType;

    /// Wraps a shared array of this element type into its `Buffer` variant.
    fn wrap(array: ArcArray<Self, IxDyn>) -> Buffer;

    /// Borrows the array out of `buffer` if it holds this element type.
    fn unwrap_ref(buffer: &Buffer) -> Option<&ArcArray<Self, IxDyn>>;

    fn elem_add(self, other: Self) -> Self;
    fn elem_sub(self, other: Self) -> Self;
    fn elem_mul(self, other: Self) -> Self;
    fn elem_neg(self) -> Self;

    /// 2-D matrix product `a @ b`. Inner dimensions must already match.
    fn matmul(a: &ArrayView2<'_, Self>, b: &ArrayView2<'_, Self>) -> Array2<Self>;
}

/// Element types that can carry gradients and support transcendental ops.
pub trait LeafFloat: LeafElement + Float + FromPrimitive {}

macro_rules! impl_leaf_element {
    ($t:ty, $dtype:ident, { $($arith:tt)* }) => {
        impl LeafElement for $t {
            const DTYPE: DType = DType::$dtype;

            fn wrap(array: ArcArray<Self, IxDyn>) -> Buffer {
                Buffer::$dtype(array)
            }

            fn unwrap_ref(buffer: &Buffer) -> Option<&ArcArray<Self, IxDyn>> {
                match buffer {
                    Buffer::$dtype(array) => Some(array),
                    _ => None,
                }
            }

            $($arith)*
        }
    };
}

macro_rules! impl_float_element {
    ($t:ty, $dtype:ident) => {
        impl_leaf_element!($t, $dtype, {
            fn elem_add(self, other: Self) -> Self {
                self + other
            }

            fn elem_sub(self, other: Self) -> Self {
                self - other
            }

            fn elem_mul(self, other: Self) -> Self {
                self * other
            }

            fn elem_neg(self) -> Self {
                -self
            }

            fn matmul(a: &ArrayView2<'_, Self>, b: &ArrayView2<'_, Self>) -> Array2<Self> {
                a.dot(b)
            }
        });
    };
}

macro_rules! impl_int_element {
    ($t:ty, $dtype:ident) => {
        impl_leaf_element!($t, $dtype, {
            fn elem_add(self, other: Self) -> Self {
                self.wrapping_add(other)
            }

            fn elem_sub(self, other: Self) -> Self {
                self.wrapping_sub(other)
            }

            fn elem_mul(self, other: Self) -> Self {
                self.wrapping_mul(other)
            }

            fn elem_neg(self) -> Self {
                self.wrapping_neg()
            }

            // ndarray's generic `dot` uses the checked operators.
            fn matmul(a: &ArrayView2<'_, Self>, b: &ArrayView2<'_, Self>) -> Array2<Self> {
                let (m, k) = a.dim();
                let n = b.ncols();
                Array2::from_shape_fn((m, n), |(i, j)| {
                    (0..k).fold(0, |acc: $t, p| acc.wrapping_add(a[[i, p]].wrapping_mul(b[[p, j]])))
                })
            }
        });
    };
}

impl_float_element!(f32, F32);
impl_float_element!(f64, F64);
impl_int_element!(i16, I16);
impl_int_element!(i32, I32);

/// Wrapping (for integers) sum of every element.
pub fn elem_sum<T: LeafElement>(values: impl IntoIterator<Item = T>) -> T {
    values.into_iter().fold(T::zero(), T::elem_add)
}

impl LeafFloat for f32 {}
impl LeafFloat for f64 {}
