// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The render entry points.  The numeric system is chosen here, once,
//! and every strategy below is monomorphised over it.

use image::RgbaImage;
use tracing::info;

use crate::bignum::BigNumerics;
use crate::config::{RenderConfig, RenderMode};
use crate::draw::Surface;
use crate::errors::RenderError;
use crate::native::NativeNumerics;
use crate::numerics::{Numerics, NumericsMode};
use crate::palette::Palette;
use crate::planes::PixelRect;
use crate::region::RenderStats;
use crate::regional::render_regions;
use crate::sequential::render_sequential;
use crate::tracker::render_concurrent;

fn run<N, S>(numerics: &N, config: &RenderConfig, surface: &mut S, palette: &dyn Palette) -> Result<RenderStats, RenderError>
where
    N: Numerics,
    S: Surface + Send + ?Sized,
{
    let root = PixelRect::image(config.width, config.height);
    match config.render {
        RenderMode::Sequence => {
            let pixels = render_sequential(numerics, root, surface, palette);
            Ok(RenderStats {
                pixels,
                ..RenderStats::default()
            })
        }
        RenderMode::Concurrent => render_concurrent(numerics, config.jobs, root, surface, palette),
        // `configure` never leaves `Auto` behind.
        RenderMode::Region | RenderMode::Auto => Ok(render_regions(numerics, root, surface, palette)),
    }
}

/// Render onto any surface.  Returns the region tallies.
pub fn render_into<S>(config: &RenderConfig, surface: &mut S) -> Result<RenderStats, RenderError>
where
    S: Surface + Send + ?Sized,
{
    let palette = config.palette.build(config.limits.iterate_limit);
    info!(
        width = config.width,
        height = config.height,
        numerics = ?config.numerics,
        render = ?config.render,
        "render started"
    );
    let stats = match config.numerics {
        NumericsMode::BigFloat => {
            let numerics = BigNumerics::new(config.window.clone(), config.limits, config.glitch);
            run(&numerics, config, surface, palette.as_ref())?
        }
        NumericsMode::Native | NumericsMode::Auto => {
            let numerics = NativeNumerics::new(config.native_window(), config.limits, config.glitch);
            run(&numerics, config, surface, palette.as_ref())?
        }
    };
    info!(
        uniform = stats.uniform,
        small = stats.small,
        populated = stats.populated,
        pixels = stats.pixels,
        "render finished"
    );
    Ok(stats)
}

/// Render a configuration into a fresh image.
pub fn render(config: &RenderConfig) -> Result<RgbaImage, RenderError> {
    let mut image = RgbaImage::new(config.width, config.height);
    render_into(config, &mut image)?;
    Ok(image)
}
