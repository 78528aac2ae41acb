// Copyright 2025 the Raster Core Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Analytic real roots of quadratic, cubic and quartic polynomials.
//!
//! Coefficients are always given highest degree first, so `[a, b, c]` is
//! `a·x² + b·x + c = 0`. Roots are written ascending into a caller-supplied buffer
//! sized for the maximum root count of the degree, and the number of valid entries
//! is returned. A count of zero means there are no real roots; it is not an error.
//!
//! All arithmetic happens in `f64`, whatever the precision of the caller. A
//! vanishing leading coefficient reduces the degree instead of dividing by zero.
//!
//! The quadratic uses the cancellation-free form
//!
//! ```text
//! q  = -0.5 * (b + sign(b) * sqrt(b² - 4ac))
//! x0 = q / a
//! x1 = c / q
//! ```
//!
//! rather than `(-b ± sqrt(d)) / 2a`, which loses most of its precision in one of
//! the roots when `b² ≫ 4ac`. The cubic and quartic follow Schwarze's
//! `Roots3And4` from Graphics Gems, with one change: the depressed polynomial is
//! rescaled so its largest coefficient term is of unit size before any fuzzy
//! comparison. Without that, the absolute tolerance swallows the discriminant of
//! closely spaced or small roots, so `(x - 0.01)(x - 0.02)(x - 0.03)` would report
//! a single root. Roots that are closer together than about a millionth of their
//! spread are still reported as one.

use core::f64::consts::FRAC_PI_3;

use crate::math::{is_fuzzy_eq, is_fuzzy_zero, Interval, Scalar};

/// Maximum number of real roots of a quadratic.
pub const QUADRATIC_ROOTS: usize = 2;
/// Maximum number of real roots of a cubic.
pub const CUBIC_ROOTS: usize = 3;
/// Maximum number of real roots of a quartic.
pub const QUARTIC_ROOTS: usize = 4;
/// Maximum number of real roots of any supported polynomial.
pub const MAX_ROOTS: usize = QUARTIC_ROOTS;

const ONE_THIRD: f64 = 1.0 / 3.0;

/// The degree of polynomial to solve, for the slice-based [`solve`] entry points.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SolveKind {
    /// `a·x² + b·x + c`.
    Quadratic,
    /// `a·x³ + b·x² + c·x + d`.
    Cubic,
    /// `a·x⁴ + b·x³ + c·x² + d·x + e`.
    Quartic,
}

impl SolveKind {
    /// The degree of the polynomial.
    pub const fn degree(self) -> usize {
        match self {
            Self::Quadratic => 2,
            Self::Cubic => 3,
            Self::Quartic => 4,
        }
    }

    /// The number of coefficients the polynomial takes.
    pub const fn coefficient_count(self) -> usize {
        self.degree() + 1
    }

    /// The maximum number of real roots, and so the minimum destination length.
    pub const fn max_roots(self) -> usize {
        self.degree()
    }
}

/// Solves `kind` with coefficients from `func`, writing the roots to `dst`.
///
/// # Panics
///
/// If `func` does not hold exactly [`SolveKind::coefficient_count`] values or
/// `dst` is shorter than [`SolveKind::max_roots`].
pub fn solve<T: Scalar>(kind: SolveKind, func: &[T], dst: &mut [T]) -> usize {
    let mut roots = [0.0; MAX_ROOTS];
    let count = solve_f64(kind, func, &mut roots);
    check_dst(kind, dst.len());
    emit(&roots[..count], dst)
}

/// Like [`solve`], but only keeps the roots that lie within `interval`.
///
/// # Panics
///
/// Under the same conditions as [`solve`].
pub fn solve_in<T: Scalar>(
    kind: SolveKind,
    func: &[T],
    interval: &Interval<T>,
    dst: &mut [T],
) -> usize {
    let mut roots = [T::ZERO; MAX_ROOTS];
    let count = solve(kind, func, &mut roots);
    check_dst(kind, dst.len());
    filter_into(&roots[..count], interval, dst)
}

fn check_dst(kind: SolveKind, len: usize) {
    assert!(
        len >= kind.max_roots(),
        "destination holds {len} roots, but a {kind:?} can have {}",
        kind.max_roots()
    );
}

fn solve_f64<T: Scalar>(kind: SolveKind, func: &[T], roots: &mut [f64; MAX_ROOTS]) -> usize {
    assert_eq!(
        func.len(),
        kind.coefficient_count(),
        "a {kind:?} takes {} coefficients",
        kind.coefficient_count()
    );
    let mut f = [0.0; 5];
    for (dst, src) in f.iter_mut().zip(func) {
        *dst = src.to_f64();
    }
    match kind {
        SolveKind::Quadratic => quadratic(f[0], f[1], f[2]).write(roots),
        SolveKind::Cubic => cubic([f[0], f[1], f[2], f[3]], roots),
        SolveKind::Quartic => quartic(f, roots),
    }
}

/// Solves `a·x² + b·x + c = 0` with `func = [a, b, c]`.
///
/// Returns 0 roots when both `a` and `b` vanish, whether the equation is
/// identically zero or has no solution.
pub fn solve_quadratic<T: Scalar>(func: &[T; 3], dst: &mut [T; QUADRATIC_ROOTS]) -> usize {
    let [a, b, c] = func.map(Scalar::to_f64);
    let mut roots = [0.0; MAX_ROOTS];
    let count = quadratic(a, b, c).write(&mut roots);
    emit(&roots[..count], dst)
}

/// Solves a quadratic, keeping only the roots within `interval`.
pub fn solve_quadratic_in<T: Scalar>(
    func: &[T; 3],
    interval: &Interval<T>,
    dst: &mut [T; QUADRATIC_ROOTS],
) -> usize {
    let [a, b, c] = func.map(Scalar::to_f64);
    match quadratic(a, b, c) {
        QuadraticRoots::None => 0,
        QuadraticRoots::One(r0) => filter_into(&[T::from_f64(r0)], interval, dst),
        QuadraticRoots::Two(r0, r1) => {
            filter_into(&[T::from_f64(r0), T::from_f64(r1)], interval, dst)
        }
    }
}

/// Solves `a·x³ + b·x² + c·x + d = 0` with `func = [a, b, c, d]`.
pub fn solve_cubic<T: Scalar>(func: &[T; 4], dst: &mut [T; CUBIC_ROOTS]) -> usize {
    let mut roots = [0.0; MAX_ROOTS];
    let count = cubic(func.map(Scalar::to_f64), &mut roots);
    emit(&roots[..count], dst)
}

/// Solves a cubic, keeping only the roots within `interval`.
pub fn solve_cubic_in<T: Scalar>(
    func: &[T; 4],
    interval: &Interval<T>,
    dst: &mut [T; CUBIC_ROOTS],
) -> usize {
    let mut roots = [T::ZERO; CUBIC_ROOTS];
    let count = solve_cubic(func, &mut roots);
    filter_into(&roots[..count], interval, dst)
}

/// Solves `a·x⁴ + b·x³ + c·x² + d·x + e = 0` with `func = [a, b, c, d, e]`.
///
/// Roots closer together than the fuzzy tolerance are reported once.
pub fn solve_quartic<T: Scalar>(func: &[T; 5], dst: &mut [T; QUARTIC_ROOTS]) -> usize {
    let mut roots = [0.0; MAX_ROOTS];
    let count = quartic(func.map(Scalar::to_f64), &mut roots);
    emit(&roots[..count], dst)
}

/// Solves a quartic, keeping only the roots within `interval`.
pub fn solve_quartic_in<T: Scalar>(
    func: &[T; 5],
    interval: &Interval<T>,
    dst: &mut [T; QUARTIC_ROOTS],
) -> usize {
    let mut roots = [T::ZERO; QUARTIC_ROOTS];
    let count = solve_quartic(func, &mut roots);
    filter_into(&roots[..count], interval, dst)
}

/// Real roots of a quadratic, in ascending order.
#[derive(Copy, Clone, Debug, PartialEq)]
enum QuadraticRoots {
    None,
    One(f64),
    Two(f64, f64),
}

impl QuadraticRoots {
    fn write(self, dst: &mut [f64]) -> usize {
        match self {
            Self::None => 0,
            Self::One(r0) => {
                dst[0] = r0;
                1
            }
            Self::Two(r0, r1) => {
                dst[0] = r0;
                dst[1] = r1;
                2
            }
        }
    }
}

fn quadratic(a: f64, b: f64, c: f64) -> QuadraticRoots {
    if is_fuzzy_zero(a) {
        if is_fuzzy_zero(b) {
            return QuadraticRoots::None;
        }
        return QuadraticRoots::One(-c / b);
    }

    let d = b * b - 4.0 * a * c;
    if is_fuzzy_zero(d) {
        return QuadraticRoots::One(-b / (2.0 * a));
    }
    if d < 0.0 {
        return QuadraticRoots::None;
    }

    let s = d.sqrt();
    let q = -0.5 * (b + if b < 0.0 { -s } else { s });
    let (r0, r1) = (q / a, c / q);
    if r0 > r1 {
        QuadraticRoots::Two(r1, r0)
    } else {
        QuadraticRoots::Two(r0, r1)
    }
}

fn cubic(func: [f64; 4], dst: &mut [f64]) -> usize {
    if is_fuzzy_zero(func[0]) {
        return quadratic(func[1], func[2], func[3]).write(dst);
    }

    // Normal form x³ + ax² + bx + c = 0.
    let norm = func[0];
    let a = func[1] / norm;
    let b = func[2] / norm;
    let c = func[3] / norm;

    // Substituting x = y - a/3 eliminates the quadratic term: y³ + 3py + 2q = 0.
    let sa = a * a;
    let p = ONE_THIRD * (-ONE_THIRD * sa + b);
    let q = 0.5 * ((2.0 / 27.0) * sa * a - ONE_THIRD * a * b + c);
    let sub = -ONE_THIRD * a;

    if is_fuzzy_zero(p) && is_fuzzy_zero(q) {
        // Triple root.
        dst[0] = sub;
        return 1;
    }

    // y = s·w brings the largest of p and q to unit size, so the tolerance on the
    // discriminant is relative to the spread of the roots.
    let s = p.abs().sqrt().max(q.abs().cbrt());
    let p = p / (s * s);
    let q = q / (s * s * s);

    let p3 = p * p * p;
    let d = q * q + p3;

    if is_fuzzy_zero(d) {
        // One single and one double root.
        let u = s * (-q).cbrt();
        dst[0] = sub + 2.0 * u;
        dst[1] = sub - u;
        sort_roots(&mut dst[..2]);
        2
    } else if d < 0.0 {
        // Three real roots (casus irreducibilis).
        let phi = ONE_THIRD * (-q / (-p3).sqrt()).clamp(-1.0, 1.0).acos();
        let t = 2.0 * s * (-p).sqrt();
        dst[0] = sub + t * phi.cos();
        dst[1] = sub - t * (phi + FRAC_PI_3).cos();
        dst[2] = sub - t * (phi - FRAC_PI_3).cos();
        sort_roots(&mut dst[..3]);
        3
    } else {
        let sqrt_d = d.sqrt();
        let u = (sqrt_d - q).cbrt();
        let v = -(sqrt_d + q).cbrt();
        dst[0] = sub + s * (u + v);
        1
    }
}

fn quartic(func: [f64; 5], dst: &mut [f64]) -> usize {
    if is_fuzzy_zero(func[0]) {
        return cubic([func[1], func[2], func[3], func[4]], dst);
    }

    // Normal form x⁴ + ax³ + bx² + cx + d = 0.
    let norm = func[0];
    let a = func[1] / norm;
    let b = func[2] / norm;
    let c = func[3] / norm;
    let d = func[4] / norm;

    // Substituting x = y - a/4 eliminates the cubic term: y⁴ + py² + qy + r = 0.
    let sa = a * a;
    let p = -3.0 / 8.0 * sa + b;
    let q = 1.0 / 8.0 * sa * a - 0.5 * a * b + c;
    let r = -3.0 / 256.0 * sa * sa + 1.0 / 16.0 * sa * b - 0.25 * a * c + d;

    // As for the cubic, y = s·w normalizes the coefficients so that clustered or
    // small roots do not drown in the fuzzy tolerance.
    let s = p.abs().sqrt().max(q.abs().cbrt()).max(r.abs().sqrt().sqrt());
    let s = if s > 0.0 && s.is_finite() { s } else { 1.0 };
    let p = p / (s * s);
    let q = q / (s * s * s);
    let r = r / (s * s * s * s);

    let mut roots = [0.0; 8];
    let mut count;

    if is_fuzzy_zero(r) {
        // w(w³ + pw + q) = 0.
        roots[0] = 0.0;
        count = 1 + cubic([1.0, 0.0, p, q], &mut roots[1..]);
    } else {
        // Any real root z of the resolvent cubic splits the quartic into
        // (w² + z)² - (m·w - n)² with m² = 2z - p and n² = z² - r. The largest
        // root keeps 2z - p away from the negative side when rounding is involved.
        let mut resolvent = [0.0; 3];
        let resolvent_count = cubic(
            [1.0, -0.5 * p, -r, 0.5 * r * p - 0.125 * q * q],
            &mut resolvent,
        );
        let Some(&z) = resolvent[..resolvent_count].last() else {
            return 0;
        };

        let m2 = 2.0 * z - p;
        let (m, n) = if m2 > 0.0 && !is_fuzzy_zero(m2) {
            // 2mn = q, which keeps the sign of q without a second square root.
            let m = m2.sqrt();
            (m, q / (2.0 * m))
        } else {
            (0.0, (z * z - r).max(0.0).sqrt())
        };

        count = quadratic(1.0, -m, z + n).write(&mut roots);
        count += quadratic(1.0, m, z - n).write(&mut roots[count..]);
    }

    let sub = 0.25 * a;
    for root in &mut roots[..count] {
        *root = *root * s - sub;
    }
    sort_roots(&mut roots[..count]);
    let count = dedup_roots(&mut roots[..count]);
    dst[..count].copy_from_slice(&roots[..count]);
    count
}

/// Sorts a handful of roots ascending by pairwise exchange.
fn sort_roots(roots: &mut [f64]) {
    for i in 1..roots.len() {
        let mut j = i;
        while j > 0 && roots[j - 1] > roots[j] {
            roots.swap(j - 1, j);
            j -= 1;
        }
    }
}

/// Collapses runs of fuzzy-equal sorted roots, returning the new count.
fn dedup_roots(roots: &mut [f64]) -> usize {
    if roots.is_empty() {
        return 0;
    }
    let mut count = 1;
    for i in 1..roots.len() {
        if !is_fuzzy_eq(roots[i], roots[count - 1]) {
            roots[count] = roots[i];
            count += 1;
        }
    }
    count
}

fn emit<T: Scalar>(roots: &[f64], dst: &mut [T]) -> usize {
    for (dst, src) in dst.iter_mut().zip(roots) {
        *dst = T::from_f64(*src);
    }
    roots.len()
}

fn filter_into<T: Scalar>(roots: &[T], interval: &Interval<T>, dst: &mut [T]) -> usize {
    let mut count = 0;
    for &root in roots {
        if interval.contains(root) {
            dst[count] = root;
            count += 1;
        }
    }
    count
}
