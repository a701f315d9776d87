// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Arbitrary precision numerics, for windows so deep that neighbouring
//! pixels map to the same `f64`.  The iteration is the same as the
//! native one, operation for operation, on `BigFixed` parts.

use num::Complex;

use crate::bigfixed::{BigComplex, BigFixed};
use crate::glitch::GlitchCurve;
use crate::numerics::{Limits, Member, Numerics};
use crate::planes::{Pixel, PlaneWindow};

/// A window onto the complex plane in `BigFixed` precision.  Laid out
/// like `PlaneWindow`: real minimum and imaginary maximum at the
/// top-left, rows growing downward.
#[derive(Clone, Debug, PartialEq)]
pub struct BigPlaneWindow {
    /// Real minimum, imaginary maximum.
    pub top_left: BigComplex,
    /// Real maximum, imaginary minimum.
    pub bottom_right: BigComplex,
    real_delta: BigFixed,
    imag_delta: BigFixed,
}

impl BigPlaneWindow {
    /// Takes the size of the integral plane and the two corners of the
    /// complex plane.
    pub fn new(width: u32, height: u32, top_left: BigComplex, bottom_right: BigComplex) -> Self {
        let real_delta = (&bottom_right.re - &top_left.re).div_int(u64::from(width));
        let imag_delta = (&top_left.im - &bottom_right.im).div_int(u64::from(height));
        BigPlaneWindow {
            top_left,
            bottom_right,
            real_delta,
            imag_delta,
        }
    }

    /// The width and height of one pixel on the complex plane.
    pub fn deltas(&self) -> (&BigFixed, &BigFixed) {
        (&self.real_delta, &self.imag_delta)
    }

    /// Given a pixel on the integral plane, map it to the equivalent
    /// point on the complex plane.
    pub fn pixel_to_point(&self, pixel: Pixel) -> BigComplex {
        BigComplex::new(
            &self.top_left.re + &self.real_delta.mul_int(i64::from(pixel.0)),
            &self.top_left.im - &self.imag_delta.mul_int(i64::from(pixel.1)),
        )
    }

    /// The same window in native precision.
    pub fn to_native(&self, width: u32, height: u32) -> PlaneWindow {
        let native = |c: &BigComplex| Complex::new(c.re.to_f64(), c.im.to_f64());
        PlaneWindow::new(width, height, native(&self.top_left), native(&self.bottom_right))
    }
}

/// Escape-time iteration on `BigFixed` complex numbers.
#[derive(Clone, Debug)]
pub struct BigNumerics {
    window: BigPlaneWindow,
    limits: Limits,
    glitch: GlitchCurve,
    diverge: BigFixed,
}

impl BigNumerics {
    /// Constructor.  The diverge limit is converted once, at the
    /// window's precision.
    pub fn new(window: BigPlaneWindow, limits: Limits, glitch: GlitchCurve) -> Self {
        let diverge = BigFixed::from_f64(limits.diverge_limit, window.top_left.re.precision());
        BigNumerics {
            window,
            limits,
            glitch,
            diverge,
        }
    }

    fn escape_time(&self, c: &BigComplex) -> Option<u8> {
        let precision = c.re.precision();
        let (mut re, mut im) = (BigFixed::zero(precision), BigFixed::zero(precision));
        for i in 0..self.limits.iterate_limit {
            // (a + bi)^2 + c = (a^2 - b^2 + c.re) + (2ab + c.im)i
            let re2 = &re * &re;
            let im2 = &im * &im;
            let cross = &re * &im;
            re = &(&re2 - &im2) + &c.re;
            im = &cross.mul_int(2) + &c.im;
            let norm = &(&re * &re) + &(&im * &im);
            if norm > self.diverge {
                return Some(i);
            }
        }
        None
    }
}

impl Numerics for BigNumerics {
    type Point = BigComplex;

    fn limits(&self) -> &Limits {
        &self.limits
    }

    fn glitch_curve(&self) -> &GlitchCurve {
        &self.glitch
    }

    fn point_at(&self, pixel: Pixel) -> BigComplex {
        self.window.pixel_to_point(pixel)
    }

    fn evaluate(&self, point: &BigComplex) -> Member<BigComplex> {
        match self.escape_time(point) {
            Some(i) => Member::escaped(point.clone(), i),
            None => Member::bounded(point.clone(), self.limits.iterate_limit),
        }
    }
}
