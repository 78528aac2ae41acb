// Copyright 2025 the Raster Core Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Conversion and equality of gradients over generated values.

#![allow(clippy::missing_assert_message)]

use raster_core::color::{AlphaColor, Srgb};
use raster_core::peniko::Extend;
use raster_core::ramp::{bake_ramp, RAMP_SAMPLES};
use raster_core::{ColorStop, Error, GradientD, GradientError, GradientF, GradientKind, Point};
use raster_tests::Lcg;

const KINDS: [GradientKind; 5] = [
    GradientKind::Invalid,
    GradientKind::Linear,
    GradientKind::Radial,
    GradientKind::Conical,
    GradientKind::Rectangular,
];
const SPREADS: [Extend; 3] = [Extend::Pad, Extend::Repeat, Extend::Reflect];

fn random_gradient(rng: &mut Lcg) -> GradientF {
    let mut gradient = GradientF::new(KINDS[rng.next_usize() % KINDS.len()]);
    gradient.set_spread(SPREADS[rng.next_usize() % SPREADS.len()]);
    for point in gradient.points_mut() {
        *point = Point::new(
            rng.next_f64(-1e4, 1e4) as f32,
            rng.next_f64(-1e-3, 1e-3) as f32,
        );
    }
    for _ in 0..rng.next_usize() % 8 {
        let mut components = [0.0; 4];
        for c in &mut components {
            *c = rng.next_f64(0.0, 1.0) as f32;
        }
        gradient.add_stop(rng.next_f64(0.0, 1.0) as f32, AlphaColor::new(components));
    }
    gradient
}

#[test]
fn widen_then_narrow_is_lossless() {
    let mut rng = Lcg::new(2024);
    for _ in 0..1_000 {
        let original = random_gradient(&mut rng);
        let wide = GradientD::from(&original);
        let back = GradientF::from(&wide);
        assert_eq!(back, original);
        for (a, b) in back.points().iter().zip(original.points()) {
            assert_eq!(a.x.to_bits(), b.x.to_bits());
            assert_eq!(a.y.to_bits(), b.y.to_bits());
        }

        let mut assigned = GradientF::default();
        assigned.assign_from(&wide);
        assert_eq!(assigned, original);
    }
}

#[test]
fn narrowing_rounds_to_nearest() {
    let wide = GradientD::linear(Point::new(0.1, 1.0 / 3.0), Point::new(1e300, -0.0));
    let narrow = GradientF::from(&wide);
    assert_eq!(narrow.start(), Point::new(0.1_f32, 1.0 / 3.0));
    assert_eq!(narrow.end().x, f32::INFINITY);
    assert!(narrow.end().y.is_sign_negative());
}

#[test]
fn equality_properties() {
    let mut rng = Lcg::new(7);
    let gradients: Vec<GradientF> = (0..64).map(|_| random_gradient(&mut rng)).collect();
    for a in &gradients {
        assert_eq!(a, a);
        for b in &gradients {
            assert_eq!(a == b, b == a);
        }
    }

    let base = gradients
        .iter()
        .find(|g| !g.stops().is_empty())
        .unwrap()
        .clone();
    for i in 0..base.stops().len() {
        let mut other = base.clone();
        other.stops_mut()[i].offset += 0.001;
        assert_ne!(other, base);
    }
    for i in 0..3 {
        let mut other = base.clone();
        other.points_mut()[i].y = f32::from_bits(other.points()[i].y.to_bits() ^ 1);
        assert_ne!(other, base);
    }
}

#[test]
fn reset_matches_new() {
    let mut rng = Lcg::new(1);
    let mut gradient = random_gradient(&mut rng);
    gradient.add_stop(0.5, AlphaColor::new([1.0; 4]));
    gradient.reset();
    assert_eq!(gradient, GradientF::new(GradientKind::Invalid));
    assert_eq!(gradient.spread(), Extend::Pad);
}

#[test]
fn stop_order_is_validated_when_baked() {
    let red = AlphaColor::<Srgb>::new([1.0, 0.0, 0.0, 1.0]);
    let mut gradient = GradientD::linear(Point::zero(), Point::new(1.0, 0.0));
    gradient.add_stop(1.0, red);
    gradient.add_stop(0.0, red);

    // The model keeps stops as given.
    assert_eq!(gradient.stops()[0], ColorStop::new(1.0, red));
    assert!(!gradient.stops().is_sorted());

    let err: Error = bake_ramp(gradient.stops(), RAMP_SAMPLES).unwrap_err().into();
    assert_eq!(err, Error::Gradient(GradientError::UnsortedStops { index: 1 }));

    gradient.sort_stops();
    assert_eq!(bake_ramp(gradient.stops(), RAMP_SAMPLES).unwrap().len(), RAMP_SAMPLES);
}
