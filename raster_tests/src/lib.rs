// Copyright 2025 the Raster Core Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared helpers for the `raster_core` integration tests.

// LINEBENDER LINT SET - lib.rs - v3
// See https://linebender.org/wiki/canonical-lints/
// These lints aren't included in Cargo.toml because they
// shouldn't apply to examples and tests
#![warn(unused_crate_dependencies)]
#![warn(clippy::print_stdout, clippy::print_stderr)]
// Targeting e.g. 32-bit means structs containing usize can give false positives for 64-bit.
#![cfg_attr(target_pointer_width = "64", warn(clippy::trivially_copy_pass_by_ref))]
// END LINEBENDER LINT SET
#![allow(missing_docs, clippy::missing_assert_message)]

use anyhow::{bail, ensure, Result};
use raster_core::solve::{solve_quadratic, QUADRATIC_ROOTS};
use raster_core::{Arena, GradientF, Lane128, Point, Span};

/// A deterministic linear congruential generator, so failures reproduce.
pub struct Lcg(usize);

impl Lcg {
    pub fn new(seed: usize) -> Self {
        Self(seed)
    }

    pub fn next_usize(&mut self) -> usize {
        const A: usize = 1103515245;
        const C: usize = 12345;
        const M: usize = 1 << 31;
        self.0 = A.wrapping_mul(self.0).wrapping_add(C) % M;
        self.0
    }

    /// A value in `[lo, hi)`.
    pub fn next_f64(&mut self, lo: f64, hi: f64) -> f64 {
        let unit = self.next_usize() as f64 / (1_u64 << 31) as f64;
        lo + unit * (hi - lo)
    }
}

/// Evaluates the polynomial with coefficients `func`, highest degree first.
pub fn eval(func: &[f64], x: f64) -> f64 {
    func.iter().fold(0.0, |acc, c| acc * x + c)
}

/// Monic coefficients of `(x - roots[0])(x - roots[1])…`, highest degree first.
pub fn from_roots(roots: &[f64]) -> Vec<f64> {
    let mut func = vec![0.0; roots.len() + 1];
    func[0] = 1.0;
    for (n, &root) in roots.iter().enumerate() {
        for i in (1..=n + 1).rev() {
            func[i] -= root * func[i - 1];
        }
    }
    func
}

/// Checks that `roots` are ascending and each one nearly satisfies `func`.
///
/// The residual is measured relative to the magnitude of the polynomial's terms at
/// the root, which keeps the check meaningful for large coefficients.
pub fn check_roots(func: &[f64], roots: &[f64], tolerance: f64) -> Result<()> {
    if let Some(w) = roots.windows(2).find(|w| w[0] > w[1]) {
        bail!("roots {roots:?} are not ascending at {w:?}");
    }
    for &x in roots {
        let scale = func
            .iter()
            .rev()
            .enumerate()
            .map(|(i, c)| (c * x.powi(i as i32)).abs())
            .sum::<f64>()
            .max(1.0);
        let residual = eval(func, x).abs() / scale;
        ensure!(
            residual <= tolerance,
            "root {x} of {func:?} has relative residual {residual}"
        );
    }
    Ok(())
}

/// Returns the horizontal extent of the disc of radius `r` centered at `center`
/// on the scanline `y`, if the scanline crosses it.
pub fn disc_crossings(center: Point<f64>, r: f64, y: f64) -> Option<(f64, f64)> {
    // (x - cx)² + (y - cy)² - r² = 0
    let dy = y - center.y;
    let func = [
        1.0,
        -2.0 * center.x,
        center.x * center.x + dy * dy - r * r,
    ];
    let mut roots = [0.0; QUADRATIC_ROOTS];
    match solve_quadratic(&func, &mut roots) {
        2 => Some((roots[0], roots[1])),
        1 => Some((roots[0], roots[0])),
        _ => None,
    }
}

/// Shades the pixels `x0..x1` of scanline `y` with `gradient`, sampling at pixel
/// centers, and stores the premultiplied colors in the arena.
///
/// Pixels the gradient does not cover are left transparent.
pub fn shade_row(
    arena: &mut Arena,
    gradient: &GradientF,
    y: u32,
    x0: u32,
    x1: u32,
) -> Result<Span> {
    ensure!(x0 <= x1, "empty row {x0}..{x1}");
    let span = arena.alloc_slice::<[f32; 4]>((x1 - x0) as usize)?;
    let Some(pixels) = arena.slice_mut::<[f32; 4]>(span) else {
        bail!("freshly allocated span {span:?} is not readable");
    };
    for (pixel, x) in pixels.iter_mut().zip(x0..x1) {
        let center = Point::new(x as f32 + 0.5, y as f32 + 0.5);
        let lane = gradient
            .color_at(center)
            .map(|c| Lane128::from_f32x4(c.premultiply().components))
            .unwrap_or_default();
        *pixel = lane.to_f32x4();
    }
    Ok(span)
}
