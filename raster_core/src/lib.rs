// Copyright 2025 the Raster Core Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The numerical and memory-management core behind 2D vector rasterization.
//!
//! # Contents
//!
//! - [`solve`]: analytic real roots of quadratic, cubic and quartic polynomials, used to
//!   flatten and intersect curves.
//! - [`arena`]: a bump allocator over fixed-size chunks with checkpoint and rewind, used
//!   for transient spans during scan conversion.
//! - [`gradient`] and [`ramp`]: the gradient color source and its color-stop evaluation,
//!   consumed by a compositor.
//! - [`lane`]: a 16-byte aligned value with typed views for moving between scalar and
//!   vectorized representations.
//!
//! Everything in this crate is single-threaded, synchronous and bounded in time.
//! None of the types carry internal synchronization; give each worker its own [`Arena`].
//!
//! [`Arena`]: arena::Arena

// LINEBENDER LINT SET - lib.rs - v3
// See https://linebender.org/wiki/canonical-lints/
// These lints shouldn't apply to examples or tests.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
// These lints shouldn't apply to examples.
#![warn(clippy::print_stdout, clippy::print_stderr)]
// Targeting e.g. 32-bit means structs containing usize can give false positives for 64-bit.
#![cfg_attr(target_pointer_width = "64", warn(clippy::trivially_copy_pass_by_ref))]
// END LINEBENDER LINT SET
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![forbid(unsafe_code)]

pub mod arena;
pub mod config;
pub mod gradient;
pub mod lane;
pub mod math;
pub mod ramp;
pub mod solve;

pub use peniko;
pub use peniko::color;
pub use peniko::kurbo;

pub use arena::{Arena, ArenaError, Record, Span};
pub use config::{ArenaConfig, ChunkSize};
pub use gradient::{ColorStop, ColorStops, Gradient, GradientD, GradientF, GradientKind};
pub use lane::Lane128;
pub use math::{Interval, Point, Scalar};
pub use ramp::GradientError;
pub use solve::SolveKind;

use thiserror::Error;

/// Errors that can occur in the rasterization core.
///
/// Absence of real roots and degenerate geometry are not errors; only resource
/// exhaustion and misuse that can be detected at runtime are reported here.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// An arena operation failed.
    #[error(transparent)]
    Arena(#[from] ArenaError),
    /// A gradient could not be evaluated.
    #[error(transparent)]
    Gradient(#[from] GradientError),
}

/// Result type with [`Error`] as the default error.
pub type Result<T, E = Error> = std::result::Result<T, E>;
