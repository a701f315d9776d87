#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Quadbrot: a Mandelbrot renderer
//!
//! The Mandelbrot set is the set of points `c` on the complex plane
//! for which iterating `z = z^2 + c` from zero never escapes to
//! infinity.  Rendering it means iterating every pixel's point until
//! it escapes or an iteration limit runs out, and colouring the pixel
//! by how long that took.
//!
//! Most of a typical image is large areas that all escape at the same
//! iteration, so rather than iterate every pixel, the region renderers
//! sample the corners and the midpoint of a rectangle.  When they
//! agree (and a few extra samples along a glitch curve agree with
//! them) the whole rectangle is painted in one colour; otherwise the
//! rectangle is cut into quadrants and each is tried again, down to a
//! collapse threshold below which every pixel is evaluated.  The
//! concurrent renderer hands those rectangles out to a pool of worker
//! threads, and the result is identical whatever the pool size.
//!
//! Two numeric systems are provided: machine `f64`s, and fixed-point
//! big numbers for windows too deep for `f64` to tell neighbouring
//! pixels apart.

extern crate crossbeam;
extern crate failure;
extern crate image;
extern crate itertools;
extern crate num;
extern crate num_cpus;
extern crate rand;
extern crate tracing;

pub mod bigfixed;
pub mod bignum;
pub mod config;
pub mod draw;
pub mod errors;
pub mod glitch;
pub mod native;
pub mod numerics;
pub mod palette;
pub mod planes;
pub mod region;
pub mod regional;
pub mod render;
pub mod sequential;
pub mod tracker;
pub mod worker;

pub use config::{configure, RenderConfig, RenderMode, RenderRequest};
pub use errors::{ConfigError, RenderError};
pub use render::{render, render_into};
