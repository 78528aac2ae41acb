// Copyright 2025 the Raster Core Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Color-stop evaluation: spread modes, sampling and baked lookup tables.
//!
//! The gradient model trusts callers to supply stops in ascending offset order.
//! [`ColorStops::sample`] relies on that without checking, while [`bake_ramp`] and
//! [`bake_ramp_in`], which produce the table a compositor actually reads from, reject
//! unsorted input.

use log::warn;
use peniko::color::{AlphaColor, HueDirection, Srgb};
use peniko::Extend;
use thiserror::Error;

use crate::arena::{Arena, Span};
use crate::gradient::{ColorStop, ColorStops};
use crate::lane::Lane128;

/// Default number of entries in a baked ramp.
pub const RAMP_SAMPLES: usize = 512;

/// Errors that can occur when baking a color ramp.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradientError {
    /// The stop list is empty.
    #[error("Gradient has no color stops")]
    EmptyStops,
    /// The stop at `index` has a smaller offset than its predecessor.
    #[error("Color stop {index} is out of order")]
    UnsortedStops {
        /// Index of the first out-of-order stop.
        index: usize,
    },
}

/// Maps an unbounded gradient parameter into `[0, 1]`.
pub fn apply_spread(t: f32, extend: Extend) -> f32 {
    match extend {
        Extend::Pad => t.clamp(0.0, 1.0),
        Extend::Repeat => t - t.floor(),
        Extend::Reflect => {
            let m = t.rem_euclid(2.0);
            if m <= 1.0 {
                m
            } else {
                2.0 - m
            }
        }
    }
}

impl ColorStops {
    /// Interpolates the color at offset `t`.
    ///
    /// Offsets before the first stop take its color, offsets after the last stop
    /// take the last color. Returns `None` if there are no stops.
    pub fn sample(&self, t: f32) -> Option<AlphaColor<Srgb>> {
        let first = self.first()?;
        let last = self.last()?;
        if t <= first.offset {
            return Some(first.color);
        }
        if t >= last.offset {
            return Some(last.color);
        }
        // Only reachable with at least two stops.
        let hi = self
            .partition_point(|s| s.offset <= t)
            .clamp(1, self.len() - 1);
        Some(interpolate(&self[hi - 1], &self[hi], t))
    }

    /// Samples the premultiplied color at `t` as an `f32x4` lane.
    pub fn sample_lane(&self, t: f32) -> Option<Lane128> {
        self.sample(t)
            .map(|c| Lane128::from_f32x4(c.premultiply().components))
    }
}

fn interpolate(lo: &ColorStop, hi: &ColorStop, t: f32) -> AlphaColor<Srgb> {
    let du = hi.offset - lo.offset;
    if du < 1e-9 {
        hi.color
    } else {
        lo.color
            .lerp(hi.color, (t - lo.offset) / du, HueDirection::default())
    }
}

/// Bakes `stops` into `samples` premultiplied RGBA8 colors spanning offsets `[0, 1]`.
///
/// Each entry is packed with [`to_u32`](peniko::color::PremulRgba8::to_u32).
pub fn bake_ramp(stops: &[ColorStop], samples: usize) -> Result<Vec<u32>, GradientError> {
    check_stops(stops)?;
    Ok(make_ramp(stops, samples).collect())
}

/// Like [`bake_ramp`], but writes the table into a fresh span of `arena`.
///
/// The span holds `samples` `u32` values and can be read back with
/// [`Arena::slice`].
///
/// # Panics
///
/// If `samples` `u32` values do not fit into one arena chunk.
pub fn bake_ramp_in(
    arena: &mut Arena,
    stops: &[ColorStop],
    samples: usize,
) -> crate::Result<Span> {
    check_stops(stops)?;
    let span = arena.alloc_slice::<u32>(samples)?;
    // A fresh span is always live and aligned for `u32`.
    if let Some(dst) = arena.slice_mut::<u32>(span) {
        for (dst, color) in dst.iter_mut().zip(make_ramp(stops, samples)) {
            *dst = color;
        }
    }
    Ok(span)
}

fn check_stops(stops: &[ColorStop]) -> Result<(), GradientError> {
    if stops.is_empty() {
        return Err(GradientError::EmptyStops);
    }
    if let Some(index) = stops.windows(2).position(|w| w[1].offset < w[0].offset) {
        warn!("rejecting gradient ramp with unsorted color stops");
        return Err(GradientError::UnsortedStops { index: index + 1 });
    }
    Ok(())
}

fn make_ramp(stops: &[ColorStop], samples: usize) -> impl Iterator<Item = u32> + '_ {
    let mut last_u = 0.0;
    let mut last_c = stops[0].color;
    let mut this_u = last_u;
    let mut this_c = last_c;
    let mut j = 0;
    let denom = samples.saturating_sub(1).max(1) as f32;
    (0..samples).map(move |i| {
        let u = i as f32 / denom;
        while u > this_u {
            last_u = this_u;
            last_c = this_c;
            if let Some(s) = stops.get(j + 1) {
                this_u = s.offset;
                this_c = s.color;
                j += 1;
            } else {
                break;
            }
        }
        let du = this_u - last_u;
        let c = if du < 1e-9 {
            this_c
        } else {
            last_c.lerp(this_c, (u - last_u) / du, HueDirection::default())
        };
        c.premultiply().to_rgba8().to_u32()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ArenaConfig, ArenaError};

    const RED: AlphaColor<Srgb> = AlphaColor::new([1.0, 0.0, 0.0, 1.0]);
    const BLUE: AlphaColor<Srgb> = AlphaColor::new([0.0, 0.0, 1.0, 1.0]);
    const CLEAR: AlphaColor<Srgb> = AlphaColor::new([1.0, 1.0, 1.0, 0.0]);

    fn stops(list: &[(f32, AlphaColor<Srgb>)]) -> ColorStops {
        list.iter().copied().map(ColorStop::from).collect()
    }

    #[test]
    fn spread_modes() {
        assert_eq!(apply_spread(-0.5, Extend::Pad), 0.0);
        assert_eq!(apply_spread(1.5, Extend::Pad), 1.0);
        assert_eq!(apply_spread(0.25, Extend::Pad), 0.25);

        assert_eq!(apply_spread(1.25, Extend::Repeat), 0.25);
        assert_eq!(apply_spread(-0.25, Extend::Repeat), 0.75);

        assert_eq!(apply_spread(1.25, Extend::Reflect), 0.75);
        assert_eq!(apply_spread(-0.25, Extend::Reflect), 0.25);
        assert_eq!(apply_spread(2.5, Extend::Reflect), 0.5);
        assert_eq!(apply_spread(1.0, Extend::Reflect), 1.0);
    }

    #[test]
    fn sample_clamps_and_interpolates() {
        let list = stops(&[(0.2, RED), (0.8, BLUE)]);
        assert_eq!(list.sample(0.0).unwrap().components, RED.components);
        assert_eq!(list.sample(1.0).unwrap().components, BLUE.components);
        let mid = list.sample(0.5).unwrap().components;
        assert!((mid[0] - 0.5).abs() < 1e-6);
        assert!((mid[2] - 0.5).abs() < 1e-6);
        assert!(ColorStops::new().sample(0.5).is_none());
    }

    #[test]
    fn hard_stop_takes_later_color() {
        let list = stops(&[(0.0, RED), (0.5, RED), (0.5, BLUE), (1.0, BLUE)]);
        assert_eq!(list.sample(0.49).unwrap().components, RED.components);
        assert_eq!(list.sample(0.5).unwrap().components, BLUE.components);
    }

    #[test]
    fn unsorted_sampling_does_not_panic() {
        let list = stops(&[(0.0, RED), (0.9, BLUE), (0.1, RED), (1.0, BLUE)]);
        for i in 0..=10 {
            assert!(list.sample(i as f32 / 10.0).is_some());
        }
    }

    #[test]
    fn sample_lane_is_premultiplied() {
        let list = stops(&[(0.0, CLEAR)]);
        let lane = list.sample_lane(0.3).unwrap();
        assert_eq!(lane.to_f32x4(), [0.0; 4]);
        let list = stops(&[(0.0, RED)]);
        assert_eq!(list.sample_lane(0.0).unwrap().to_f32x4(), [1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn bake_rejects_bad_stops() {
        assert_eq!(bake_ramp(&[], RAMP_SAMPLES), Err(GradientError::EmptyStops));
        let list = stops(&[(0.0, RED), (0.7, BLUE), (0.3, RED)]);
        assert_eq!(
            bake_ramp(&list, RAMP_SAMPLES),
            Err(GradientError::UnsortedStops { index: 2 })
        );
    }

    #[test]
    fn bake_endpoints() {
        let list = stops(&[(0.0, RED), (1.0, BLUE)]);
        let ramp = bake_ramp(&list, RAMP_SAMPLES).unwrap();
        assert_eq!(ramp.len(), RAMP_SAMPLES);
        let red = RED.premultiply().to_rgba8().to_u32();
        let blue = BLUE.premultiply().to_rgba8().to_u32();
        assert_eq!(ramp[0], red);
        assert_eq!(ramp[RAMP_SAMPLES - 1], blue);
        assert_ne!(ramp[RAMP_SAMPLES / 2], red);
    }

    #[test]
    fn bake_into_arena_matches_table() {
        let list = stops(&[(0.0, RED), (0.5, CLEAR), (1.0, BLUE)]);
        let mut arena = Arena::with_chunk_size(4096);
        let span = bake_ramp_in(&mut arena, &list, RAMP_SAMPLES).unwrap();
        assert_eq!(
            arena.slice::<u32>(span).unwrap(),
            bake_ramp(&list, RAMP_SAMPLES).unwrap().as_slice()
        );
    }

    #[test]
    fn bake_into_arena_reports_both_error_kinds() {
        let mut arena = Arena::with_chunk_size(4096);
        let list = stops(&[(0.5, RED), (0.2, BLUE)]);
        assert_eq!(
            bake_ramp_in(&mut arena, &list, RAMP_SAMPLES),
            Err(crate::Error::Gradient(GradientError::UnsortedStops { index: 1 }))
        );
        // Rejected stops allocate nothing.
        assert_eq!(arena.chunk_count(), 0);

        let mut arena = Arena::new(ArenaConfig::new(usize::MAX / 2));
        let list = stops(&[(0.0, RED)]);
        assert!(matches!(
            bake_ramp_in(&mut arena, &list, RAMP_SAMPLES),
            Err(crate::Error::Arena(ArenaError::OutOfMemory { .. }))
        ));
    }

    #[test]
    fn bake_single_stop_is_flat() {
        let list = stops(&[(0.4, BLUE)]);
        let ramp = bake_ramp(&list, 16).unwrap();
        let blue = BLUE.premultiply().to_rgba8().to_u32();
        assert!(ramp.iter().all(|&c| c == blue));
        assert_eq!(bake_ramp(&list, 1).unwrap(), [blue]);
    }
}
