// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Drawing surfaces and the draw loop.  Only the draw loop ever
//! touches the surface during a concurrent render.

use crossbeam::channel::Receiver;
use image::{Rgba, RgbaImage};

use crate::numerics::PixelMember;
use crate::palette::{color_for, Palette};
use crate::planes::{Pixel, PixelRect};
use crate::region::Region;

/// Something regions and pixels can be painted onto.
pub trait Surface {
    /// Fill a rectangle with one colour.
    fn paint_rect(&mut self, rect: PixelRect, color: Rgba<u8>);

    /// Colour a single pixel.
    fn paint_pixel(&mut self, pixel: Pixel, color: Rgba<u8>);
}

impl Surface for RgbaImage {
    fn paint_rect(&mut self, rect: PixelRect, color: Rgba<u8>) {
        for p in rect.clip(self.width(), self.height()).pixels() {
            self.put_pixel(p.0, p.1, color);
        }
    }

    fn paint_pixel(&mut self, pixel: Pixel, color: Rgba<u8>) {
        if pixel.0 < self.width() && pixel.1 < self.height() {
            self.put_pixel(pixel.0, pixel.1, color);
        }
    }
}

/// Terminal results on their way to the surface.
#[derive(Debug)]
pub enum Paint<P> {
    /// A uniform region, painted with its representative member.
    Uniform(Region<P>),
    /// Every pixel of a small region.
    Members(Vec<PixelMember<P>>),
}

/// Paint one result.
pub fn paint<P, S, L>(surface: &mut S, palette: &L, work: &Paint<P>)
where
    S: Surface + ?Sized,
    L: Palette + ?Sized,
{
    match work {
        Paint::Uniform(region) => {
            if let Some(member) = region.representative() {
                surface.paint_rect(region.rect, color_for(palette, member));
            }
        }
        Paint::Members(members) => {
            for pm in members {
                surface.paint_pixel(pm.pixel, color_for(palette, &pm.member));
            }
        }
    }
}

/// Paint everything that arrives until every sender has hung up.
/// Returns the number of results painted.
pub fn draw_loop<P, S, L>(results: Receiver<Paint<P>>, surface: &mut S, palette: &L) -> usize
where
    S: Surface + ?Sized,
    L: Palette + ?Sized,
{
    results.iter().fold(0, |n, work| {
        paint(surface, palette, &work);
        n + 1
    })
}

#[cfg(test)]
pub(crate) mod testing {
    //! A surface that remembers what was asked of it.
    use super::*;

    #[derive(Debug, Default)]
    pub struct Recorder {
        pub rects: Vec<(PixelRect, Rgba<u8>)>,
        pub pixels: Vec<(Pixel, Rgba<u8>)>,
    }

    impl Surface for Recorder {
        fn paint_rect(&mut self, rect: PixelRect, color: Rgba<u8>) {
            self.rects.push((rect, color));
        }

        fn paint_pixel(&mut self, pixel: Pixel, color: Rgba<u8>) {
            self.pixels.push((pixel, color));
        }
    }
}
