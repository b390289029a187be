use crate::dtype::DType;
use half::{bf16, f16};
use std::{
    fmt::Debug,
    ops::{Add, Div, Mul, Sub},
};

/// Host element type with a fixed [`DType`] tag.
pub trait Scalar: Copy + Send + Sync + Default + PartialEq + Debug + 'static {
    const DTYPE: DType;
}

/// Integer type used for graph indices, segment offsets and argmin/argmax records.
pub trait IndexType: Scalar + Ord {
    /// Recorded for outputs that received no contribution.
    const NONE: Self;

    fn to_usize(self) -> usize;
    fn from_usize(value: usize) -> Self;
    fn to_i64(self) -> i64;
}

/// Floating point feature type.
pub trait FloatType:
    Scalar + PartialOrd + Add<Output = Self> + Sub<Output = Self> + Mul<Output = Self> + Div<Output = Self>
{
    const ZERO: Self;
    const ONE: Self;
    const INFINITY: Self;
    const NEG_INFINITY: Self;

    fn from_f64(value: f64) -> Self;
    fn to_f64(self) -> f64;
}

macro_rules! impl_scalar {
    ($($ty:ty => $dtype:ident),* $(,)?) => {
        $(
            impl Scalar for $ty {
                const DTYPE: DType = DType::$dtype;
            }
        )*
    };
}

impl_scalar!(
    bf16 => BF16,
    f16 => F16,
    f32 => F32,
    f64 => F64,
    bool => BOOL,
    u8 => U8,
    u32 => U32,
    i32 => I32,
    i64 => I64,
);

macro_rules! impl_index_type {
    ($($ty:ty),*) => {
        $(
            impl IndexType for $ty {
                const NONE: Self = -1;

                #[inline(always)]
                fn to_usize(self) -> usize {
                    self as usize
                }
                #[inline(always)]
                fn from_usize(value: usize) -> Self {
                    value as $ty
                }
                #[inline(always)]
                fn to_i64(self) -> i64 {
                    self as i64
                }
            }
        )*
    };
}

impl_index_type!(i32, i64);

macro_rules! impl_float_type_primitive {
    ($($ty:ty),*) => {
        $(
            impl FloatType for $ty {
                const ZERO: Self = 0.0;
                const ONE: Self = 1.0;
                const INFINITY: Self = <$ty>::INFINITY;
                const NEG_INFINITY: Self = <$ty>::NEG_INFINITY;

                #[inline(always)]
                fn from_f64(value: f64) -> Self {
                    value as $ty
                }
                #[inline(always)]
                fn to_f64(self) -> f64 {
                    self as f64
                }
            }
        )*
    };
}

macro_rules! impl_float_type_half {
    ($($ty:ident),*) => {
        $(
            impl FloatType for $ty {
                const ZERO: Self = $ty::ZERO;
                const ONE: Self = $ty::ONE;
                const INFINITY: Self = $ty::INFINITY;
                const NEG_INFINITY: Self = $ty::NEG_INFINITY;

                #[inline(always)]
                fn from_f64(value: f64) -> Self {
                    $ty::from_f64(value)
                }
                #[inline(always)]
                fn to_f64(self) -> f64 {
                    $ty::to_f64(self)
                }
            }
        )*
    };
}

impl_float_type_primitive!(f32, f64);
impl_float_type_half!(f16, bf16);
