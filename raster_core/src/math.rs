// Copyright 2025 the Raster Core Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scalar abstraction and small geometric helpers shared by the solver and the gradient model.

use core::fmt::Debug;

use peniko::kurbo;

/// Tolerance used by every "near zero" comparison in this crate.
///
/// Comparisons are always carried out in `f64`, whatever the precision of the caller.
pub const FUZZY_EPSILON: f64 = 1e-12;

/// Returns `true` if `x` is within [`FUZZY_EPSILON`] of zero.
#[inline]
pub fn is_fuzzy_zero(x: f64) -> bool {
    x.abs() <= FUZZY_EPSILON
}

/// Returns `true` if `a` and `b` are within [`FUZZY_EPSILON`] of each other.
#[inline]
pub fn is_fuzzy_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= FUZZY_EPSILON
}

/// A floating point type the solver and gradient model can be instantiated with.
///
/// Implemented for `f32` and `f64`. Widening to `f64` is lossless, narrowing back
/// uses the default `as` conversion.
pub trait Scalar: Copy + Default + PartialOrd + Debug + Send + Sync + 'static {
    /// Additive identity.
    const ZERO: Self;

    /// Widen to `f64`.
    fn to_f64(self) -> f64;

    /// Convert from `f64`, rounding to the nearest representable value.
    fn from_f64(value: f64) -> Self;

    /// Bitwise equality, distinguishing `0.0` from `-0.0` and equating identical NaNs.
    fn bit_eq(self, other: Self) -> bool;

    /// Convert between precisions.
    #[inline]
    fn cast<U: Scalar>(self) -> U {
        U::from_f64(self.to_f64())
    }
}

impl Scalar for f32 {
    const ZERO: Self = 0.0;

    #[inline]
    fn to_f64(self) -> f64 {
        f64::from(self)
    }

    #[inline]
    fn from_f64(value: f64) -> Self {
        value as f32
    }

    #[inline]
    fn bit_eq(self, other: Self) -> bool {
        self.to_bits() == other.to_bits()
    }
}

impl Scalar for f64 {
    const ZERO: Self = 0.0;

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }

    #[inline]
    fn from_f64(value: f64) -> Self {
        value
    }

    #[inline]
    fn bit_eq(self, other: Self) -> bool {
        self.to_bits() == other.to_bits()
    }
}

/// A closed range `[min, max]`.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Interval<T> {
    /// Lower bound, inclusive.
    pub min: T,
    /// Upper bound, inclusive.
    pub max: T,
}

impl<T: Scalar> Interval<T> {
    /// Creates a new interval.
    pub fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    /// The `[0, 1]` parameter range of a curve.
    pub fn unit() -> Self {
        Self::new(T::ZERO, T::from_f64(1.0))
    }

    /// Returns `true` if `value` lies within the interval, bounds included.
    #[inline]
    pub fn contains(&self, value: T) -> bool {
        value >= self.min && value <= self.max
    }
}

/// A 2D point in either precision.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Point<T> {
    /// Horizontal coordinate.
    pub x: T,
    /// Vertical coordinate.
    pub y: T,
}

impl<T: Scalar> Point<T> {
    /// Creates a new point.
    pub const fn new(x: T, y: T) -> Self {
        Self { x, y }
    }

    /// The origin.
    pub const fn zero() -> Self {
        Self::new(T::ZERO, T::ZERO)
    }

    /// Converts the point to another precision.
    pub fn cast<U: Scalar>(self) -> Point<U> {
        Point::new(self.x.cast(), self.y.cast())
    }

    /// Component-wise bit equality.
    pub fn bit_eq(&self, other: &Self) -> bool {
        self.x.bit_eq(other.x) && self.y.bit_eq(other.y)
    }

    /// Converts the point to a kurbo point.
    pub fn to_kurbo(self) -> kurbo::Point {
        kurbo::Point::new(self.x.to_f64(), self.y.to_f64())
    }

    /// Creates a point from a kurbo point, narrowing if necessary.
    pub fn from_kurbo(point: kurbo::Point) -> Self {
        Self::new(T::from_f64(point.x), T::from_f64(point.y))
    }
}

impl From<kurbo::Point> for Point<f64> {
    fn from(point: kurbo::Point) -> Self {
        Self::new(point.x, point.y)
    }
}

impl From<(f64, f64)> for Point<f64> {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl From<(f32, f32)> for Point<f32> {
    fn from((x, y): (f32, f32)) -> Self {
        Self::new(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fuzzy_zero_absorbs_rounding() {
        assert!(is_fuzzy_zero(0.1 + 0.2 - 0.3));
        assert!(is_fuzzy_zero(-1e-13));
        assert!(!is_fuzzy_zero(1e-9));
        assert!(is_fuzzy_eq(1.0, 1.0 + 1e-14));
    }

    #[test]
    fn bit_eq_distinguishes_signed_zero() {
        assert!(!0.0_f32.bit_eq(-0.0));
        assert!(1.5_f64.bit_eq(1.5));
        assert!(f64::NAN.bit_eq(f64::NAN));
    }

    #[test]
    fn interval_is_closed() {
        let interval = Interval::new(1.5_f64, 10.0);
        assert!(interval.contains(1.5));
        assert!(interval.contains(10.0));
        assert!(!interval.contains(1.0));
        assert!(Interval::<f32>::unit().contains(0.5));
    }

    #[test]
    fn point_cast_round_trips_through_f64() {
        let p = Point::new(0.1_f32, -3.75);
        assert!(p.cast::<f64>().cast::<f32>().bit_eq(&p));
    }

    #[test]
    fn kurbo_interop() {
        let p: Point<f64> = kurbo::Point::new(2.0, 3.0).into();
        assert_eq!(p, Point::new(2.0, 3.0));
        assert_eq!(Point::<f32>::from_kurbo(p.to_kurbo()), Point::new(2.0, 3.0));
    }
}
