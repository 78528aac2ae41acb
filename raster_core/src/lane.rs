// Copyright 2025 the Raster Core Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A 16-byte value with typed views, sized and aligned like a 128-bit SIMD register.
//!
//! Compositing kernels write a [`Lane128`] through one view and read it back through
//! another. Every view is a plain bit reinterpretation, so no value is converted.

use core::fmt;
use core::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not};

use bytemuck::{Pod, Zeroable};
use static_assertions::{assert_eq_align, assert_eq_size, const_assert_eq};

/// Sixteen bytes, aligned to 16.
#[repr(C, align(16))]
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Zeroable, Pod)]
pub struct Lane128 {
    bytes: [u8; 16],
}

assert_eq_size!(Lane128, [u8; 16], u128);
const_assert_eq!(align_of::<Lane128>(), 16);
#[cfg(target_arch = "x86_64")]
assert_eq_align!(Lane128, core::arch::x86_64::__m128);

macro_rules! views {
    ($($from:ident, $to:ident, $splat:ident: $ty:ty, $n:literal;)*) => {
        $(
            #[doc = concat!("Creates a lane from ", stringify!($n), " `", stringify!($ty), "` values.")]
            #[inline]
            pub fn $from(values: [$ty; $n]) -> Self {
                bytemuck::cast(values)
            }

            #[doc = concat!("Reads the lane as ", stringify!($n), " `", stringify!($ty), "` values.")]
            #[inline]
            pub fn $to(self) -> [$ty; $n] {
                bytemuck::cast(self)
            }

            #[doc = concat!("Creates a lane with every `", stringify!($ty), "` element set to `value`.")]
            #[inline]
            pub fn $splat(value: $ty) -> Self {
                Self::$from([value; $n])
            }
        )*
    };
}

impl Lane128 {
    /// All bits clear.
    pub const fn zeroed() -> Self {
        Self { bytes: [0; 16] }
    }

    views! {
        from_u8x16, to_u8x16, splat_u8: u8, 16;
        from_i8x16, to_i8x16, splat_i8: i8, 16;
        from_u16x8, to_u16x8, splat_u16: u16, 8;
        from_i16x8, to_i16x8, splat_i16: i16, 8;
        from_u32x4, to_u32x4, splat_u32: u32, 4;
        from_i32x4, to_i32x4, splat_i32: i32, 4;
        from_f32x4, to_f32x4, splat_f32: f32, 4;
        from_u64x2, to_u64x2, splat_u64: u64, 2;
        from_i64x2, to_i64x2, splat_i64: i64, 2;
        from_f64x2, to_f64x2, splat_f64: f64, 2;
    }

    /// Reads the lane as a single native-endian integer.
    #[inline]
    pub fn to_u128(self) -> u128 {
        u128::from_ne_bytes(self.bytes)
    }

    /// Creates a lane from a single native-endian integer.
    #[inline]
    pub fn from_u128(value: u128) -> Self {
        Self {
            bytes: value.to_ne_bytes(),
        }
    }

    /// The raw bytes in memory order.
    #[inline]
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.bytes
    }

    /// Mutable access to the raw bytes.
    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut [u8; 16] {
        &mut self.bytes
    }
}

impl fmt::Debug for Lane128 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Lane128")
            .field(&format_args!("{:08x?}", self.to_u32x4()))
            .finish()
    }
}

impl From<[u8; 16]> for Lane128 {
    fn from(bytes: [u8; 16]) -> Self {
        Self { bytes }
    }
}

impl From<[f32; 4]> for Lane128 {
    fn from(values: [f32; 4]) -> Self {
        Self::from_f32x4(values)
    }
}

impl From<[f64; 2]> for Lane128 {
    fn from(values: [f64; 2]) -> Self {
        Self::from_f64x2(values)
    }
}

impl From<[u32; 4]> for Lane128 {
    fn from(values: [u32; 4]) -> Self {
        Self::from_u32x4(values)
    }
}

macro_rules! bit_op {
    ($trait:ident, $method:ident, $assign_trait:ident, $assign_method:ident, $op:tt) => {
        impl $trait for Lane128 {
            type Output = Self;

            #[inline]
            fn $method(self, rhs: Self) -> Self {
                Self::from_u128(self.to_u128() $op rhs.to_u128())
            }
        }

        impl $assign_trait for Lane128 {
            #[inline]
            fn $assign_method(&mut self, rhs: Self) {
                *self = *self $op rhs;
            }
        }
    };
}

bit_op!(BitAnd, bitand, BitAndAssign, bitand_assign, &);
bit_op!(BitOr, bitor, BitOrAssign, bitor_assign, |);
bit_op!(BitXor, bitxor, BitXorAssign, bitxor_assign, ^);

impl Not for Lane128 {
    type Output = Self;

    #[inline]
    fn not(self) -> Self {
        Self::from_u128(!self.to_u128())
    }
}

#[cfg(target_arch = "x86_64")]
mod x86_64 {
    use core::arch::x86_64::{__m128, __m128d, __m128i};

    use super::Lane128;

    macro_rules! register {
        ($($ty:ty),*) => {
            $(
                impl From<$ty> for Lane128 {
                    #[inline]
                    fn from(value: $ty) -> Self {
                        bytemuck::cast(value)
                    }
                }

                impl From<Lane128> for $ty {
                    #[inline]
                    fn from(lane: Lane128) -> Self {
                        bytemuck::cast(lane)
                    }
                }
            )*
        };
    }

    register!(__m128, __m128d, __m128i);
}
