// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Render requests and their resolution into a render configuration.
//!
//! A `RenderRequest` is what a user asks for, with coordinates as
//! decimal strings and `auto` allowed for the render mode and the
//! numeric system.  `configure` checks every field, reads the corners
//! at the requested precision, corrects the aspect ratio and settles
//! every `auto`.  Nothing about a render can fail for configuration
//! reasons after that.

use std::str::FromStr;

use tracing::debug;

use crate::bigfixed::{BigComplex, BigFixed};
use crate::bignum::BigPlaneWindow;
use crate::errors::ConfigError;
use crate::glitch::{GlitchCurve, GlitchPattern};
use crate::numerics::{Limits, NumericsMode};
use crate::palette::PaletteKind;
use crate::planes::PlaneWindow;

/// How the image is computed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RenderMode {
    /// Pick from the image size and the job count.
    Auto,
    /// Every pixel, one after another.
    Sequence,
    /// Region subdivision on the calling thread.
    Region,
    /// Region subdivision over a worker pool.
    Concurrent,
}

impl FromStr for RenderMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, ConfigError> {
        match s {
            "auto" => Ok(RenderMode::Auto),
            "sequence" => Ok(RenderMode::Sequence),
            "region" => Ok(RenderMode::Region),
            "concurrent" => Ok(RenderMode::Concurrent),
            _ => Err(ConfigError::UnknownSelector("render mode", s.to_string())),
        }
    }
}

/// Everything a user can ask of a render.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderRequest {
    /// Iterations before a point counts as bounded, 1..=255.
    pub iterate_limit: u32,
    /// Escape threshold for `|z|^2`.
    pub diverge_limit: f64,
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Left edge of the plane window, as a decimal.
    pub real_min: String,
    /// Right edge.
    pub real_max: String,
    /// Bottom edge.
    pub imag_min: String,
    /// Top edge.
    pub imag_max: String,
    /// Strategy.
    pub render: RenderMode,
    /// Numeric system.
    pub numerics: NumericsMode,
    /// Colouring.
    pub palette: PaletteKind,
    /// Workers in the concurrent pool, 1..=65535.
    pub jobs: usize,
    /// Regions this narrow or shorter are evaluated pixel by pixel.
    pub collapse: u32,
    /// Extra-sample pattern guarding uniform regions.
    pub glitch: GlitchPattern,
    /// Number of extra samples.
    pub glitch_samples: u32,
    /// Seed for the scatter pattern.
    pub glitch_seed: u64,
    /// Fractional bits for big numbers, 8..=4096.
    pub precision: usize,
    /// Grow the plane window so its aspect matches the image's.
    pub fix_aspect: bool,
}

impl Default for RenderRequest {
    fn default() -> Self {
        RenderRequest {
            iterate_limit: 255,
            diverge_limit: 4.0,
            width: 800,
            height: 600,
            real_min: "-2.01".to_string(),
            real_max: "0.59".to_string(),
            imag_min: "-1.11".to_string(),
            imag_max: "1.11".to_string(),
            render: RenderMode::Auto,
            numerics: NumericsMode::Auto,
            palette: PaletteKind::Pretty,
            jobs: num_cpus::get(),
            collapse: 8,
            glitch: GlitchPattern::Curve,
            glitch_samples: 4,
            glitch_seed: 0,
            precision: 128,
            fix_aspect: true,
        }
    }
}

/// A validated render with every `auto` settled.
#[derive(Clone, Debug)]
pub struct RenderConfig {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Shared iteration limits.
    pub limits: Limits,
    /// The plane window at full precision.
    pub window: BigPlaneWindow,
    /// `Native` or `BigFloat`, never `Auto`.
    pub numerics: NumericsMode,
    /// Never `Auto`.
    pub render: RenderMode,
    /// Colouring.
    pub palette: PaletteKind,
    /// Pool size for concurrent renders.
    pub jobs: usize,
    /// Extra-sample pattern.
    pub glitch: GlitchCurve,
}

impl RenderConfig {
    /// The plane window rounded to `f64`.
    pub fn native_window(&self) -> PlaneWindow {
        self.window.to_native(self.width, self.height)
    }
}

fn coordinate(name: &'static str, value: &str, precision: usize) -> Result<BigFixed, ConfigError> {
    BigFixed::parse(value, precision).map_err(|e| ConfigError::Coordinate(name, e))
}

// Widen whichever axis of the plane is too short for the image,
// keeping its centre where it was.
fn fix_aspect(
    width: u32,
    height: u32,
    real: (BigFixed, BigFixed),
    imag: (BigFixed, BigFixed),
) -> ((BigFixed, BigFixed), (BigFixed, BigFixed)) {
    let span = |(lo, hi): &(BigFixed, BigFixed)| hi - lo;
    let recentre = |(lo, hi): (BigFixed, BigFixed), extent: BigFixed| {
        let centre = (&lo + &hi).half();
        let half = extent.half();
        (&centre - &half, &centre + &half)
    };
    let (rspan, ispan) = (span(&real), span(&imag));
    let (w, h) = (i64::from(width), i64::from(height));
    // Compare rspan / ispan against width / height without dividing.
    let (lhs, rhs) = (rspan.mul_int(h), ispan.mul_int(w));
    if lhs < rhs {
        let wanted = rhs.div_int(u64::from(height));
        (recentre(real, wanted), imag)
    } else if lhs > rhs {
        let wanted = lhs.div_int(u64::from(width));
        (real, recentre(imag, wanted))
    } else {
        (real, imag)
    }
}

// Deep enough that neighbouring pixels would blur together in f64.
fn needs_big_numbers(window: &BigPlaneWindow) -> bool {
    let (dr, di) = window.deltas();
    let magnitude = [
        &window.top_left.re,
        &window.top_left.im,
        &window.bottom_right.re,
        &window.bottom_right.im,
    ]
    .iter()
    .map(|c| c.to_f64().abs())
    .fold(0.0, f64::max);
    let floor = f64::EPSILON * 1024.0 * magnitude;
    !(dr.to_f64() > floor && di.to_f64() > floor)
}

/// Validate a request and settle every `auto`.
pub fn configure(request: &RenderRequest) -> Result<RenderConfig, ConfigError> {
    let (width, height) = (request.width, request.height);
    if width == 0 || height == 0 {
        return Err(ConfigError::Dimensions(width, height));
    }
    if request.iterate_limit == 0 || request.iterate_limit > u32::from(u8::MAX) {
        return Err(ConfigError::IterateLimit(request.iterate_limit));
    }
    if !(request.diverge_limit.is_finite() && request.diverge_limit > 0.0) {
        return Err(ConfigError::DivergeLimit(request.diverge_limit));
    }
    if request.jobs == 0 || request.jobs > usize::from(u16::MAX) {
        return Err(ConfigError::Jobs(request.jobs));
    }
    if request.precision < 8 || request.precision > 4096 {
        return Err(ConfigError::Precision(request.precision));
    }

    let precision = request.precision;
    let real = (
        coordinate("real minimum", &request.real_min, precision)?,
        coordinate("real maximum", &request.real_max, precision)?,
    );
    let imag = (
        coordinate("imaginary minimum", &request.imag_min, precision)?,
        coordinate("imaginary maximum", &request.imag_max, precision)?,
    );
    if real.0 >= real.1 {
        return Err(ConfigError::InvertedAxis("real"));
    }
    if imag.0 >= imag.1 {
        return Err(ConfigError::InvertedAxis("imaginary"));
    }

    let (real, imag) = if request.fix_aspect {
        fix_aspect(width, height, real, imag)
    } else {
        (real, imag)
    };
    let window = BigPlaneWindow::new(
        width,
        height,
        BigComplex::new(real.0, imag.1),
        BigComplex::new(real.1, imag.0),
    );

    let numerics = match request.numerics {
        NumericsMode::Auto if needs_big_numbers(&window) => NumericsMode::BigFloat,
        NumericsMode::Auto => NumericsMode::Native,
        chosen => chosen,
    };
    let render = match request.render {
        RenderMode::Auto if width <= request.collapse || height <= request.collapse => RenderMode::Sequence,
        RenderMode::Auto if request.jobs > 1 => RenderMode::Concurrent,
        RenderMode::Auto => RenderMode::Region,
        chosen => chosen,
    };
    debug!(?numerics, ?render, jobs = request.jobs, "configured");

    Ok(RenderConfig {
        width,
        height,
        limits: Limits::new(request.iterate_limit as u8, request.diverge_limit, request.collapse),
        window,
        numerics,
        render,
        palette: request.palette,
        jobs: request.jobs,
        glitch: GlitchCurve::new(request.glitch, request.glitch_samples, request.glitch_seed),
    })
}
