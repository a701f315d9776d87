// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error types.  Configuration errors are raised before any work
//! starts; render errors only ever signal a broken pipeline between
//! the scheduler, its workers and the draw loop.

use failure::Fail;

/// Raised while turning a `RenderRequest` into a `RenderConfig`.
#[derive(Debug, Fail, PartialEq)]
pub enum ConfigError {
    /// The iteration limit must fit in a u8 and be non-zero.
    #[fail(display = "iterate limit {} out of range, valid values are 1..=255", _0)]
    IterateLimit(u32),

    /// The diverge limit must be a positive, finite number.
    #[fail(display = "diverge limit {} out of range, must be positive and finite", _0)]
    DivergeLimit(f64),

    /// The number of workers must fit in a u16 and be non-zero.
    #[fail(display = "job count {} out of range, valid values are 1..=65535", _0)]
    Jobs(usize),

    /// Images must have at least one pixel in each direction.
    #[fail(display = "image dimensions {}x{} must both be non-zero", _0, _1)]
    Dimensions(u32, u32),

    /// Big number precision, in bits.
    #[fail(display = "precision {} out of range, valid values are 8..=4096 bits", _0)]
    Precision(usize),

    /// One of the plane coordinates could not be read.
    #[fail(display = "could not parse {} coordinate: {}", _0, _1)]
    Coordinate(&'static str, #[cause] ParseBigFixedError),

    /// The minimum of an axis was not below its maximum.
    #[fail(display = "{} minimum must be below its maximum", _0)]
    InvertedAxis(&'static str),

    /// A selector string named nothing we know about.
    #[fail(display = "unknown {}: {}", _0, _1)]
    UnknownSelector(&'static str, String),
}

/// Raised when a decimal string cannot become a `BigFixed`.
#[derive(Debug, Fail, PartialEq)]
#[fail(display = "invalid decimal number {:?}", _0)]
pub struct ParseBigFixedError(pub String);

/// Infrastructure failures during a render.  None of these are
/// recoverable; they indicate a defect, not a bad input.
#[derive(Debug, Fail)]
pub enum RenderError {
    /// A channel between the scheduler, a worker or the draw loop hung
    /// up while the render still needed it.
    #[fail(display = "render channel closed unexpectedly: {}", _0)]
    Disconnected(&'static str),

    /// A worker stopped while it still held an assignment.
    #[fail(display = "worker {} terminated mid-assignment", _0)]
    WorkerLost(usize),

    /// One of the scoped render threads panicked.
    #[fail(display = "a render thread panicked")]
    ThreadPanicked,
}
