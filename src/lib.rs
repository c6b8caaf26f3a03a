#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Escape-time fractal engine
//!
//! Every pixel of an image is given a point `c` on the complex plane
//! and an orbit `z` that starts at zero.  An iteration rule, most
//! famously `z' = z^2 + c`, is applied over and over; the points
//! whose orbits run off past an escape radius are outside the set,
//! and how many steps that took decides their color.
//!
//! The engine here keeps each pixel's orbit between calls, so a view
//! can be deepened a few hundred iterations at a time without redoing
//! the work already done, and pixels that have escaped are never
//! touched again.  Sixteen rules are built in, all variations on the
//! Mandelbrot formula with the axes folded in different places.
//!
//! The usual sequence is: build a [`FractalGrid`], call
//! [`FractalGrid::iterate`] as often as you like, then hand the grid
//! to a [`ColorMapper`] to get one palette index per pixel, and a
//! [`Palette`] to turn those into colors.

pub mod color;
pub mod complex;
pub mod error;
pub mod functions;
pub mod grid;
pub mod palette;
pub mod planes;

pub use crate::color::{ColorFunction, ColorMapper, DisplaySettings};
pub use crate::error::EngineError;
pub use crate::functions::{resolve, FunctionId, IterationRule, PowerGrowth};
pub use crate::grid::{Cell, FractalGrid, GridParams};
pub use crate::palette::{colorize, Palette, Rgb};
pub use crate::planes::{Pixel, PlaneMapper};

/// The complex type used throughout the engine.
pub type Complex64 = num::Complex<f64>;
