// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Regions and the subdivision algorithm.
//!
//! A region is a rectangle of pixels together with the matching
//! rectangle of the complex plane.  Resolving a region decides its
//! fate: a *small* region is rendered pixel by pixel, a *uniform*
//! region is filled with the colour of its midpoint, and a *populated*
//! region is thrown away and replaced by its four quadrants.  Each
//! split halves both dimensions, so any region is resolved in at most
//! `ceil(log2(max(width, height)))` splits.

use crate::numerics::{Member, Numerics};
use crate::planes::{Pixel, PixelRect};

/// Where a region stands in the subdivision.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RegionState {
    /// Not yet classified.
    Unresolved,
    /// Every sample agrees; paint flat.
    Uniform,
    /// Too small to split; evaluate every pixel.
    Small,
    /// Samples disagree; replaced by its children.
    Populated,
}

/// A rectangle under evaluation.
#[derive(Clone, Debug)]
pub struct Region<P> {
    /// The pixels covered.
    pub rect: PixelRect,
    /// The complex point under the top-left pixel.
    pub top_left: P,
    /// The complex point just beyond the bottom-right pixel.
    pub bottom_right: P,
    /// Corner and midpoint members, in `PixelRect::sample_pixels` order.
    pub samples: Option<[Member<P>; 5]>,
    /// Classification.
    pub state: RegionState,
}

impl<P> Region<P> {
    /// An unresolved, unsampled region covering `rect`.
    pub fn new<N: Numerics<Point = P>>(numerics: &N, rect: PixelRect) -> Self {
        Region {
            rect,
            top_left: numerics.point_at(Pixel(rect.left, rect.top)),
            bottom_right: numerics.point_at(Pixel(rect.right(), rect.bottom())),
            samples: None,
            state: RegionState::Unresolved,
        }
    }

    /// This region with its samples taken, if they were not already.
    pub fn sampled<N: Numerics<Point = P>>(self, numerics: &N) -> Self {
        match self.samples {
            Some(_) => self,
            None => Region {
                samples: Some(numerics.sample(&self.rect)),
                ..self
            },
        }
    }

    /// The member whose colour a uniform region is painted with.
    pub fn representative(&self) -> Option<&Member<P>> {
        self.samples.as_ref().map(|s| &s[4])
    }

    fn with_state(self, state: RegionState) -> Self {
        Region { state, ..self }
    }
}

/// The outcome of resolving one region.
#[derive(Debug)]
pub enum Resolution<P> {
    /// Paint the region flat.
    Uniform(Region<P>),
    /// Evaluate the region pixel by pixel.
    Small(Region<P>),
    /// The region's four children, in top-left, top-right,
    /// bottom-left, bottom-right order.
    Populated([Region<P>; 4]),
}

/// Classify a region.  The collapse threshold is read as at least 1,
/// so a region under two pixels across is always small and the split
/// never produces an empty rectangle.
pub fn resolve<N: Numerics>(numerics: &N, region: Region<N::Point>) -> Resolution<N::Point> {
    let collapse = numerics.limits().collapse.max(1);
    if region.rect.width <= collapse || region.rect.height <= collapse {
        return Resolution::Small(region.with_state(RegionState::Small));
    }

    let region = region.sampled(numerics);
    let uniform = match region.samples {
        Some(ref samples) => numerics.is_uniform(samples),
        None => false,
    };
    if uniform && !numerics.glitch_check(&region) {
        Resolution::Uniform(region.with_state(RegionState::Uniform))
    } else {
        Resolution::Populated(numerics.subdivide(&region))
    }
}

/// Tallies kept by the region renderers.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Regions painted flat.
    pub uniform: usize,
    /// Regions evaluated pixel by pixel.
    pub small: usize,
    /// Regions split into children.
    pub populated: usize,
    /// Pixels evaluated individually inside small regions.
    pub pixels: u64,
}

impl RenderStats {
    /// Count one resolution.
    pub fn record<P>(&mut self, resolution: &Resolution<P>) {
        match resolution {
            Resolution::Uniform(_) => self.uniform += 1,
            Resolution::Small(r) => {
                self.small += 1;
                self.pixels += r.rect.area();
            }
            Resolution::Populated(_) => self.populated += 1,
        }
    }
}
