// Copyright 2025 the Raster Core Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The gradient color source.
//!
//! A [`Gradient`] is a kind, a spread mode, three control points and a list of
//! [color stops](ColorStop). The meaning of the control points depends on the kind:
//!
//! | Kind          | `points[0]` | `points[1]` | `points[2]`        |
//! |---------------|-------------|-------------|--------------------|
//! | `Linear`      | start       | end         | unused             |
//! | `Radial`      | center      | focal point | radius (`x`, `y`)  |
//! | `Conical`     | center      | angle (`x`) | unused             |
//! | `Rectangular` | corner      | opposite corner | unused         |
//!
//! The model comes in two precisions, [`GradientF`] and [`GradientD`], which convert
//! into each other component-wise.

use core::ops::{Deref, DerefMut};

use peniko::color::{AlphaColor, Srgb};
use peniko::Extend;
use smallvec::SmallVec;

use crate::math::{is_fuzzy_zero, Point, Scalar};
use crate::ramp::apply_spread;
use crate::solve::{solve_quadratic, QUADRATIC_ROOTS};

/// The shape of a gradient.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum GradientKind {
    /// No gradient has been configured; evaluation yields nothing.
    #[default]
    Invalid = 0,
    /// Colors vary along the line from `start` to `end`.
    Linear = 1,
    /// Colors vary with the distance from the focal point towards an ellipse.
    Radial = 2,
    /// Colors sweep around the center, starting at a given angle.
    Conical = 3,
    /// Colors vary with the Chebyshev distance from the center of a rectangle.
    Rectangular = 4,
}

/// A color at a given offset along a gradient.
#[derive(Copy, Clone, Debug)]
pub struct ColorStop {
    /// Normalized offset of the stop, usually within `[0, 1]`.
    pub offset: f32,
    /// Color at the offset.
    pub color: AlphaColor<Srgb>,
}

impl ColorStop {
    /// Creates a new color stop.
    pub const fn new(offset: f32, color: AlphaColor<Srgb>) -> Self {
        Self { offset, color }
    }

    /// Bitwise equality of offset and color components.
    pub fn bit_eq(&self, other: &Self) -> bool {
        self.offset.bit_eq(other.offset)
            && self
                .color
                .components
                .iter()
                .zip(other.color.components.iter())
                .all(|(a, b)| a.bit_eq(*b))
    }
}

impl PartialEq for ColorStop {
    fn eq(&self, other: &Self) -> bool {
        self.bit_eq(other)
    }
}

impl From<(f32, AlphaColor<Srgb>)> for ColorStop {
    fn from((offset, color): (f32, AlphaColor<Srgb>)) -> Self {
        Self::new(offset, color)
    }
}

/// An ordered list of color stops.
///
/// Stops are kept in insertion order. Nothing here enforces ascending offsets;
/// see [`ColorStops::is_sorted`] and [`ColorStops::sort`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ColorStops(pub SmallVec<[ColorStop; 4]>);

impl ColorStops {
    /// Creates an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if offsets never decrease from one stop to the next.
    pub fn is_sorted(&self) -> bool {
        self.0.windows(2).all(|w| w[0].offset <= w[1].offset)
    }

    /// Sorts stops by offset. Stops with equal offsets keep their relative order,
    /// which is how hard color transitions are expressed.
    pub fn sort(&mut self) {
        self.0.sort_by(|a, b| a.offset.total_cmp(&b.offset));
    }
}

impl Deref for ColorStops {
    type Target = SmallVec<[ColorStop; 4]>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for ColorStops {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl FromIterator<ColorStop> for ColorStops {
    fn from_iter<I: IntoIterator<Item = ColorStop>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<&[ColorStop]> for ColorStops {
    fn from(stops: &[ColorStop]) -> Self {
        Self(stops.into())
    }
}

/// A gradient in single or double precision.
#[derive(Clone, Debug)]
pub struct Gradient<T> {
    kind: GradientKind,
    spread: Extend,
    points: [Point<T>; 3],
    stops: ColorStops,
}

/// Single-precision gradient.
pub type GradientF = Gradient<f32>;
/// Double-precision gradient.
pub type GradientD = Gradient<f64>;

impl<T: Scalar> Default for Gradient<T> {
    fn default() -> Self {
        Self::new(GradientKind::Invalid)
    }
}

impl<T: Scalar> Gradient<T> {
    /// Creates a gradient of the given kind with all points at the origin, the
    /// [`Pad`](Extend::Pad) spread mode and no stops.
    pub fn new(kind: GradientKind) -> Self {
        Self {
            kind,
            spread: Extend::Pad,
            points: [Point::zero(); 3],
            stops: ColorStops::new(),
        }
    }

    /// Creates a linear gradient from `start` to `end`.
    pub fn linear(start: Point<T>, end: Point<T>) -> Self {
        let mut gradient = Self::new(GradientKind::Linear);
        gradient.points[0] = start;
        gradient.points[1] = end;
        gradient
    }

    /// Creates a radial gradient.
    ///
    /// `radius` holds the horizontal and vertical radii of the ending ellipse.
    pub fn radial(center: Point<T>, focal: Point<T>, radius: Point<T>) -> Self {
        let mut gradient = Self::new(GradientKind::Radial);
        gradient.points = [center, focal, radius];
        gradient
    }

    /// Creates a conical (sweep) gradient starting at `angle` radians.
    pub fn conical(center: Point<T>, angle: T) -> Self {
        let mut gradient = Self::new(GradientKind::Conical);
        gradient.points[0] = center;
        gradient.points[1] = Point::new(angle, T::ZERO);
        gradient
    }

    /// Creates a rectangular gradient spanning the two corners.
    pub fn rectangular(p0: Point<T>, p1: Point<T>) -> Self {
        let mut gradient = Self::new(GradientKind::Rectangular);
        gradient.points[0] = p0;
        gradient.points[1] = p1;
        gradient
    }

    /// Builder method for setting the spread mode.
    #[must_use]
    pub fn with_extend(mut self, spread: Extend) -> Self {
        self.spread = spread;
        self
    }

    /// Builder method for setting the color stops from `(offset, color)` pairs.
    #[must_use]
    pub fn with_stops(mut self, stops: &[(f32, AlphaColor<Srgb>)]) -> Self {
        self.stops = stops.iter().copied().map(ColorStop::from).collect();
        self
    }

    /// The kind of gradient, which decides how the points are read.
    pub fn kind(&self) -> GradientKind {
        self.kind
    }

    /// Changes the kind without touching the points or stops.
    pub fn set_kind(&mut self, kind: GradientKind) {
        self.kind = kind;
    }

    /// How offsets outside `[0, 1]` are mapped back into range.
    pub fn spread(&self) -> Extend {
        self.spread
    }

    /// Sets the spread mode.
    pub fn set_spread(&mut self, spread: Extend) {
        self.spread = spread;
    }

    /// The raw control points.
    pub fn points(&self) -> &[Point<T>; 3] {
        &self.points
    }

    /// Mutable access to the raw control points.
    pub fn points_mut(&mut self) -> &mut [Point<T>; 3] {
        &mut self.points
    }

    /// The color stops, in the order they were added.
    pub fn stops(&self) -> &ColorStops {
        &self.stops
    }

    /// Mutable access to the color stops. Callers keep them sorted.
    pub fn stops_mut(&mut self) -> &mut ColorStops {
        &mut self.stops
    }

    /// Sorts the stops by offset, keeping the order of stops at equal offsets.
    pub fn sort_stops(&mut self) {
        self.stops.sort();
    }

    /// Appends a stop. Offsets are not reordered.
    pub fn add_stop(&mut self, offset: f32, color: AlphaColor<Srgb>) {
        self.stops.push(ColorStop::new(offset, color));
    }

    /// Start point of a linear gradient.
    pub fn start(&self) -> Point<T> {
        self.points[0]
    }

    /// End point of a linear gradient.
    pub fn end(&self) -> Point<T> {
        self.points[1]
    }

    /// Center of a radial or conical gradient.
    pub fn center(&self) -> Point<T> {
        self.points[0]
    }

    /// Focal point of a radial gradient.
    pub fn focal(&self) -> Point<T> {
        self.points[1]
    }

    /// Radii of a radial gradient.
    pub fn radius(&self) -> Point<T> {
        self.points[2]
    }

    /// Start angle of a conical gradient, in radians.
    pub fn angle(&self) -> T {
        self.points[1].x
    }

    /// Returns the gradient to its initial state: invalid kind, pad spread, points
    /// at the origin and no stops. Stop storage is kept for reuse.
    pub fn reset(&mut self) {
        self.kind = GradientKind::Invalid;
        self.spread = Extend::Pad;
        self.points = [Point::zero(); 3];
        self.stops.clear();
    }

    /// Converts to another precision.
    pub fn convert<U: Scalar>(&self) -> Gradient<U> {
        Gradient {
            kind: self.kind,
            spread: self.spread,
            points: self.points.map(|p| p.cast()),
            stops: self.stops.clone(),
        }
    }

    /// Overwrites `self` with `other`, converting its points to this precision.
    pub fn assign_from<U: Scalar>(&mut self, other: &Gradient<U>) {
        self.kind = other.kind;
        self.spread = other.spread;
        self.points = other.points.map(|p| p.cast());
        self.stops.clone_from(&other.stops);
    }

    /// Computes the unspread gradient parameter at `point`.
    ///
    /// Returns `None` for an invalid gradient, degenerate geometry, and points a
    /// radial gradient whose focal point lies outside its ellipse does not cover.
    pub fn offset_at(&self, point: Point<T>) -> Option<f64> {
        let [p0, p1, p2] = self.points.map(|p| (p.x.to_f64(), p.y.to_f64()));
        let (x, y) = (point.x.to_f64(), point.y.to_f64());
        match self.kind {
            GradientKind::Invalid => None,
            GradientKind::Linear => {
                let (dx, dy) = (p1.0 - p0.0, p1.1 - p0.1);
                let len2 = dx * dx + dy * dy;
                if is_fuzzy_zero(len2) {
                    return None;
                }
                Some(((x - p0.0) * dx + (y - p0.1) * dy) / len2)
            }
            GradientKind::Radial => radial_offset(p0, p1, p2, (x, y)),
            GradientKind::Conical => {
                let theta = (y - p0.1).atan2(x - p0.0);
                // `rem_euclid` rounds tiny negative turns up to exactly 1.0.
                let t = ((theta - p1.0) / core::f64::consts::TAU).rem_euclid(1.0);
                Some(t.min(1.0 - f64::EPSILON))
            }
            GradientKind::Rectangular => {
                let (hx, hy) = ((p1.0 - p0.0).abs() * 0.5, (p1.1 - p0.1).abs() * 0.5);
                if is_fuzzy_zero(hx) || is_fuzzy_zero(hy) {
                    return None;
                }
                let (cx, cy) = ((p0.0 + p1.0) * 0.5, (p0.1 + p1.1) * 0.5);
                Some(((x - cx).abs() / hx).max((y - cy).abs() / hy))
            }
        }
    }

    /// Evaluates the gradient color at `point`, applying the spread mode.
    ///
    /// Returns `None` wherever [`Gradient::offset_at`] does, or if there are no stops.
    pub fn color_at(&self, point: Point<T>) -> Option<AlphaColor<Srgb>> {
        let t = self.offset_at(point)?;
        self.stops.sample(apply_spread(t as f32, self.spread))
    }
}

/// Solves `|p - (f + t (c - f))| = t r` for the largest `t >= 0`, after scaling the
/// vertical axis so the ellipse becomes a circle of radius `rx`.
fn radial_offset(
    center: (f64, f64),
    focal: (f64, f64),
    radius: (f64, f64),
    point: (f64, f64),
) -> Option<f64> {
    let (rx, ry) = radius;
    if is_fuzzy_zero(rx) || is_fuzzy_zero(ry) {
        return None;
    }
    let scale = rx / ry;
    let (dx, dy) = (point.0 - focal.0, (point.1 - focal.1) * scale);
    let (ex, ey) = (center.0 - focal.0, (center.1 - focal.1) * scale);

    let func = [
        ex * ex + ey * ey - rx * rx,
        -2.0 * (dx * ex + dy * ey),
        dx * dx + dy * dy,
    ];
    let mut roots = [0.0; QUADRATIC_ROOTS];
    let n = solve_quadratic(&func, &mut roots);
    roots[..n].iter().copied().filter(|t| *t >= 0.0).reduce(f64::max)
}

impl<T: Scalar> PartialEq for Gradient<T> {
    /// Bitwise comparison of points and stops; kind and spread compare by value.
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.spread == other.spread
            && self
                .points
                .iter()
                .zip(other.points.iter())
                .all(|(a, b)| a.bit_eq(b))
            && self.stops == other.stops
    }
}

impl From<&GradientF> for GradientD {
    fn from(gradient: &GradientF) -> Self {
        gradient.convert()
    }
}

impl From<&GradientD> for GradientF {
    fn from(gradient: &GradientD) -> Self {
        gradient.convert()
    }
}
