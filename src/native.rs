// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Native numerics: `Complex<f64>` all the way down.

use num::Complex;

use crate::glitch::GlitchCurve;
use crate::numerics::{Limits, Member, Numerics};
use crate::planes::{Pixel, PlaneWindow};

/// The classic escape-time iteration in machine floats.
#[derive(Clone, Debug)]
pub struct NativeNumerics {
    window: PlaneWindow,
    limits: Limits,
    glitch: GlitchCurve,
}

impl NativeNumerics {
    /// Constructor.
    pub fn new(window: PlaneWindow, limits: Limits, glitch: GlitchCurve) -> Self {
        NativeNumerics {
            window,
            limits,
            glitch,
        }
    }
}

/// Iterate `z = z^2 + c` from zero, returning the iteration on which
/// `|z|^2` first exceeded `diverge`, or `None` if it never did within
/// `limit` iterations.
#[inline]
pub fn escape_time(c: Complex<f64>, limit: u8, diverge: f64) -> Option<u8> {
    let mut z = Complex::new(0.0, 0.0);
    for i in 0..limit {
        z = z * z + c;
        if z.norm_sqr() > diverge {
            return Some(i);
        }
    }
    None
}

impl Numerics for NativeNumerics {
    type Point = Complex<f64>;

    fn limits(&self) -> &Limits {
        &self.limits
    }

    fn glitch_curve(&self) -> &GlitchCurve {
        &self.glitch
    }

    fn point_at(&self, pixel: Pixel) -> Complex<f64> {
        self.window.pixel_to_point(pixel)
    }

    fn evaluate(&self, point: &Complex<f64>) -> Member<Complex<f64>> {
        let limit = self.limits.iterate_limit;
        match escape_time(*point, limit, self.limits.diverge_limit) {
            Some(i) => Member::escaped(*point, i),
            None => Member::bounded(*point, limit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_never_escapes() {
        assert_eq!(escape_time(Complex::new(0.0, 0.0), 255, 4.0), None);
        assert_eq!(escape_time(Complex::new(-1.0, 0.0), 255, 4.0), None);
    }

    #[test]
    fn far_points_escape_immediately() {
        assert_eq!(escape_time(Complex::new(3.0, 0.0), 255, 4.0), Some(0));
    }

    #[test]
    fn escape_iteration_is_counted_from_zero() {
        // 1 -> 2 -> 5 -> 26: |z|^2 first exceeds 4 on the third iteration.
        assert_eq!(escape_time(Complex::new(1.0, 0.0), 255, 4.0), Some(2));
        // With a larger radius it takes one more.
        assert_eq!(escape_time(Complex::new(1.0, 0.0), 255, 25.0), Some(3));
    }

    #[test]
    fn evaluate_classifies_members() {
        let window = PlaneWindow::new(4, 4, Complex::new(-2.0, 2.0), Complex::new(2.0, -2.0));
        let n = NativeNumerics::new(window, Limits::new(50, 4.0, 1), GlitchCurve::off());
        let inside = n.evaluate(&n.point_at(Pixel(2, 2)));
        assert!(inside.in_set);
        assert_eq!(inside.inverse_divergence, 50);
        let outside = n.evaluate(&n.point_at(Pixel(0, 0)));
        assert_eq!(outside, Member::escaped(Complex::new(-2.0, 2.0), 0));
    }
}
