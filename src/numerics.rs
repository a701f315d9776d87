// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The capability every numeric system offers the renderers.
//!
//! A numeric system knows how to map a pixel to a point on the
//! complex plane in its own precision, and how to iterate that point
//! under `z = z^2 + c` until it escapes or the iterate limit runs
//! out.  Everything the region renderers need on top of that
//! (sampling, uniformity, the glitch check, subdivision) is written
//! once here in terms of those two primitives.
//!
//! A render picks one implementation and is monomorphised over it, so
//! there is no dynamic dispatch per point.  Workers each own a clone
//! of the prototype; nothing inside a numeric system is shared.

use std::fmt::Debug;
use std::str::FromStr;

use crate::errors::ConfigError;
use crate::glitch::GlitchCurve;
use crate::planes::{Pixel, PixelRect};
use crate::region::Region;

/// Which numeric system a render uses.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NumericsMode {
    /// Pick native unless the window is too deep for `f64`.
    Auto,
    /// `Complex<f64>`.
    Native,
    /// `BigFixed` complex numbers.
    BigFloat,
}

impl FromStr for NumericsMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, ConfigError> {
        match s {
            "auto" => Ok(NumericsMode::Auto),
            "native" => Ok(NumericsMode::Native),
            "bigfloat" => Ok(NumericsMode::BigFloat),
            _ => Err(ConfigError::UnknownSelector("numerics mode", s.to_string())),
        }
    }
}

/// The shared, read-only parameters of a render.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Limits {
    /// Maximum iterations before a point is considered bounded.
    pub iterate_limit: u8,
    /// A point has escaped once `|z|^2` exceeds this.
    pub diverge_limit: f64,
    /// Regions this many pixels wide or high, or smaller, are rendered
    /// pixel by pixel.
    pub collapse: u32,
}

impl Limits {
    /// Constructor.
    pub fn new(iterate_limit: u8, diverge_limit: f64, collapse: u32) -> Self {
        Limits {
            iterate_limit,
            diverge_limit,
            collapse,
        }
    }
}

/// The result of iterating one point.
#[derive(Clone, Debug, PartialEq)]
pub struct Member<P> {
    /// The point on the complex plane.
    pub point: P,
    /// The iteration at which the point escaped, or the iterate limit
    /// for points that never did.  Palettes key colours on this.
    pub inverse_divergence: u8,
    /// True if the point never escaped.
    pub in_set: bool,
}

impl<P> Member<P> {
    /// A point that escaped on iteration `i`.
    pub fn escaped(point: P, i: u8) -> Self {
        Member {
            point,
            inverse_divergence: i,
            in_set: false,
        }
    }

    /// A point that stayed bounded for the whole iterate limit.
    pub fn bounded(point: P, limit: u8) -> Self {
        Member {
            point,
            inverse_divergence: limit,
            in_set: true,
        }
    }

    /// The part of a member that decides its colour.  Two members with
    /// the same class are indistinguishable once painted.
    pub fn class(&self) -> (u8, bool) {
        (self.inverse_divergence, self.in_set)
    }
}

/// A member tied to the pixel it was computed for.
#[derive(Clone, Debug, PartialEq)]
pub struct PixelMember<P> {
    /// Where to paint it.
    pub pixel: Pixel,
    /// What to paint.
    pub member: Member<P>,
}

/// The capability contract shared by the native and big number
/// systems.  Implementations only supply the first four methods.
pub trait Numerics: Clone + Send {
    /// A point on the complex plane in this system's precision.
    type Point: Clone + Debug + Send;

    /// The shared limits this system was built with.
    fn limits(&self) -> &Limits;

    /// The extra-sample pattern used by `glitch_check`.
    fn glitch_curve(&self) -> &GlitchCurve;

    /// Map a pixel onto the complex plane.
    fn point_at(&self, pixel: Pixel) -> Self::Point;

    /// Iterate a point.  Pure and total for every finite input.
    fn evaluate(&self, point: &Self::Point) -> Member<Self::Point>;

    /// Evaluate the point under a pixel.
    fn evaluate_pixel(&self, pixel: Pixel) -> PixelMember<Self::Point> {
        PixelMember {
            pixel,
            member: self.evaluate(&self.point_at(pixel)),
        }
    }

    /// Evaluate the four corners and the midpoint of a rectangle, in
    /// that order.
    fn sample(&self, rect: &PixelRect) -> [Member<Self::Point>; 5] {
        let [a, b, c, d, e] = rect.sample_pixels();
        [
            self.evaluate(&self.point_at(a)),
            self.evaluate(&self.point_at(b)),
            self.evaluate(&self.point_at(c)),
            self.evaluate(&self.point_at(d)),
            self.evaluate(&self.point_at(e)),
        ]
    }

    /// True if all five samples share a class.
    fn is_uniform(&self, samples: &[Member<Self::Point>; 5]) -> bool {
        let first = samples[0].class();
        samples[1..].iter().all(|m| m.class() == first)
    }

    /// True if any point on the glitch curve through the region
    /// disagrees with the region's first sample.  Expects a sampled
    /// region; an unsampled region always reports a glitch.
    fn glitch_check(&self, region: &Region<Self::Point>) -> bool {
        let consensus = match region.samples {
            Some(ref samples) => samples[0].class(),
            None => return true,
        };
        self.glitch_curve()
            .pixels(&region.rect)
            .into_iter()
            .any(|p| self.evaluate(&self.point_at(p)).class() != consensus)
    }

    /// Split a region into its four quadrants, each a fresh unresolved
    /// region.
    fn subdivide(&self, region: &Region<Self::Point>) -> [Region<Self::Point>; 4] {
        let [a, b, c, d] = region.rect.quadrants();
        [
            Region::new(self, a),
            Region::new(self, b),
            Region::new(self, c),
            Region::new(self, d),
        ]
    }
}

/// Build one independent numeric system per worker.  Each is a deep
/// copy of the prototype, so no two workers ever alias the same
/// instance.
pub fn numerics_pool<N: Numerics>(prototype: &N, jobs: usize) -> Vec<N> {
    (0..jobs).map(|_| prototype.clone()).collect()
}
