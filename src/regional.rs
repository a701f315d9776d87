// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Region subdivision on the calling thread.  The same algorithm the
//! concurrent tracker distributes over its pool, driven by a plain
//! first-in first-out worklist.

use std::collections::VecDeque;

use tracing::{debug, info};

use crate::draw::{paint, Paint, Surface};
use crate::numerics::Numerics;
use crate::palette::Palette;
use crate::planes::PixelRect;
use crate::region::{resolve, Region, RenderStats, Resolution};
use crate::sequential::capture;

/// Subdivide `root` until every piece is uniform or small, painting
/// each terminal piece as it is resolved.
pub fn render_regions<N, S, L>(numerics: &N, root: PixelRect, surface: &mut S, palette: &L) -> RenderStats
where
    N: Numerics,
    S: Surface + ?Sized,
    L: Palette + ?Sized,
{
    let mut stats = RenderStats::default();
    let mut worklist = VecDeque::new();
    if !root.is_empty() {
        worklist.push_back(Region::new(numerics, root));
    }

    while let Some(region) = worklist.pop_front() {
        let resolution = resolve(numerics, region);
        stats.record(&resolution);
        match resolution {
            Resolution::Populated(children) => worklist.extend(Vec::from(children)),
            Resolution::Uniform(region) => paint(surface, palette, &Paint::Uniform(region)),
            Resolution::Small(region) => {
                paint(surface, palette, &Paint::Members(capture(numerics, region.rect)))
            }
        }
        if !worklist.is_empty() && worklist.len() % 4096 == 0 {
            debug!(pending = worklist.len(), "region worklist");
        }
    }

    info!(
        uniform = stats.uniform,
        small = stats.small,
        populated = stats.populated,
        pixels = stats.pixels,
        "region render finished"
    );
    stats
}
