// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The glitch curve: extra sample points inside a region that must
//! agree with its corners and midpoint before the region may be
//! painted flat.  Five samples are easily fooled by a thin filament
//! of the set crossing a region between them, so the pattern the
//! extra samples follow is configurable.

use std::f64::consts::PI;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::errors::ConfigError;
use crate::planes::{Pixel, PixelRect};

/// The shape the extra samples are laid along.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GlitchPattern {
    /// No extra samples; the corner and midpoint consensus is trusted.
    Off,
    /// Evenly spaced along the top-left to bottom-right diagonal.
    Diagonal,
    /// One period of a sine wave across the region, centred vertically.
    Curve,
    /// Seeded pseudo-random points, reproducible per region.
    Scatter,
}

impl FromStr for GlitchPattern {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, ConfigError> {
        match s {
            "off" => Ok(GlitchPattern::Off),
            "diagonal" => Ok(GlitchPattern::Diagonal),
            "curve" => Ok(GlitchPattern::Curve),
            "scatter" => Ok(GlitchPattern::Scatter),
            _ => Err(ConfigError::UnknownSelector("glitch pattern", s.to_string())),
        }
    }
}

/// A pattern together with the number of samples to take.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GlitchCurve {
    /// Sample layout.
    pub pattern: GlitchPattern,
    /// Number of extra samples per region.
    pub samples: u32,
    /// Mixed into the per-region seed of the scatter pattern.
    pub seed: u64,
}

impl GlitchCurve {
    /// Constructor.
    pub fn new(pattern: GlitchPattern, samples: u32, seed: u64) -> Self {
        GlitchCurve {
            pattern,
            samples,
            seed,
        }
    }

    /// A curve that never asks for extra samples.
    pub fn off() -> Self {
        GlitchCurve::new(GlitchPattern::Off, 0, 0)
    }

    /// The extra pixels to sample inside `rect`.  Every pixel returned
    /// lies inside the rectangle; the same rectangle always yields the
    /// same pixels.
    pub fn pixels(&self, rect: &PixelRect) -> Vec<Pixel> {
        if rect.is_empty() {
            return vec![];
        }
        let n = self.samples;
        let (w, h) = (f64::from(rect.width), f64::from(rect.height));
        let at = |fx: f64, fy: f64| {
            let x = (fx * w).floor().max(0.0).min(w - 1.0) as u32;
            let y = (fy * h).floor().max(0.0).min(h - 1.0) as u32;
            Pixel(rect.left + x, rect.top + y)
        };
        let step = |k: u32| f64::from(k + 1) / f64::from(n + 1);

        match self.pattern {
            GlitchPattern::Off => vec![],
            GlitchPattern::Diagonal => (0..n).map(|k| at(step(k), step(k))).collect(),
            GlitchPattern::Curve => (0..n)
                .map(|k| {
                    let t = step(k);
                    at(t, 0.5 + 0.5 * (2.0 * PI * t).sin())
                })
                .collect(),
            GlitchPattern::Scatter => {
                let mut rng = StdRng::seed_from_u64(self.region_seed(rect));
                (0..n)
                    .map(|_| at(rng.gen_range(0.0..1.0), rng.gen_range(0.0..1.0)))
                    .collect()
            }
        }
    }

    fn region_seed(&self, rect: &PixelRect) -> u64 {
        [rect.left, rect.top, rect.width, rect.height]
            .iter()
            .fold(self.seed ^ 0x9e37_79b9_7f4a_7c15, |acc, v| {
                (acc ^ u64::from(*v)).wrapping_mul(0x0100_0000_01b3)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_inside(curve: &GlitchCurve, rect: &PixelRect) -> bool {
        curve.pixels(rect).iter().all(|p| rect.contains(*p))
    }

    #[test]
    fn off_samples_nothing() {
        let r = PixelRect::new(0, 0, 64, 64);
        assert!(GlitchCurve::new(GlitchPattern::Off, 16, 0).pixels(&r).is_empty());
        assert!(GlitchCurve::off().pixels(&r).is_empty());
    }

    #[test]
    fn diagonal_walks_from_corner_to_corner() {
        let r = PixelRect::new(10, 10, 9, 9);
        let p = GlitchCurve::new(GlitchPattern::Diagonal, 2, 0).pixels(&r);
        assert_eq!(p, vec![Pixel(13, 13), Pixel(16, 16)]);
    }

    #[test]
    fn every_pattern_stays_inside_the_region() {
        let rects = [
            PixelRect::new(0, 0, 1, 1),
            PixelRect::new(5, 7, 3, 11),
            PixelRect::new(100, 40, 64, 2),
        ];
        for pattern in &[GlitchPattern::Diagonal, GlitchPattern::Curve, GlitchPattern::Scatter] {
            let curve = GlitchCurve::new(*pattern, 12, 7);
            for r in &rects {
                assert!(all_inside(&curve, r), "{:?} escaped {:?}", pattern, r);
                assert_eq!(curve.pixels(r).len(), 12);
            }
        }
    }

    #[test]
    fn scatter_is_reproducible_per_region() {
        let curve = GlitchCurve::new(GlitchPattern::Scatter, 8, 42);
        let a = PixelRect::new(0, 0, 32, 32);
        let b = PixelRect::new(32, 0, 32, 32);
        assert_eq!(curve.pixels(&a), curve.pixels(&a));
        assert_ne!(curve.pixels(&a), curve.pixels(&b));
    }

    #[test]
    fn parses_pattern_names() {
        assert_eq!("curve".parse::<GlitchPattern>(), Ok(GlitchPattern::Curve));
        assert_eq!("scatter".parse::<GlitchPattern>(), Ok(GlitchPattern::Scatter));
        assert!("spiral".parse::<GlitchPattern>().is_err());
    }
}
