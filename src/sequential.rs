// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The sequential renderer.  Every pixel in a rectangle is mapped to
//! the complex plane and iterated, one after another, with no attempt
//! to skip uniform areas.  The region renderers fall back to this for
//! small regions, and it is the reference every other strategy must
//! reproduce.

use crate::draw::Surface;
use crate::numerics::{Numerics, PixelMember};
use crate::palette::{color_for, Palette};
use crate::planes::PixelRect;

/// Evaluate every pixel in `rect`, in row-major order.
pub fn capture<N: Numerics>(numerics: &N, rect: PixelRect) -> Vec<PixelMember<N::Point>> {
    rect.pixels().map(|p| numerics.evaluate_pixel(p)).collect()
}

/// Evaluate and paint every pixel in `rect`.  Returns the number of
/// pixels painted.
pub fn render_sequential<N, S, L>(numerics: &N, rect: PixelRect, surface: &mut S, palette: &L) -> u64
where
    N: Numerics,
    S: Surface + ?Sized,
    L: Palette + ?Sized,
{
    let mut painted = 0;
    for pixel in rect.pixels() {
        let pm = numerics.evaluate_pixel(pixel);
        surface.paint_pixel(pm.pixel, color_for(palette, &pm.member));
        painted += 1;
    }
    painted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::testing::Recorder;
    use crate::numerics::testing::Scripted;
    use crate::numerics::Limits;
    use crate::palette::Grayscale;
    use crate::planes::Pixel;
    use image::{Rgba, RgbaImage};

    #[test]
    fn capture_covers_the_rectangle_in_row_major_order() {
        let n = Scripted::new(Limits::new(10, 4.0, 1), |p| ((p.0 + 10 * p.1) as u8, false));
        let got = capture(&n, PixelRect::new(3, 5, 3, 2));
        let pixels: Vec<Pixel> = got.iter().map(|pm| pm.pixel).collect();
        assert_eq!(
            pixels,
            vec![Pixel(3, 5), Pixel(4, 5), Pixel(5, 5), Pixel(3, 6), Pixel(4, 6), Pixel(5, 6)]
        );
        assert_eq!(got[4].member.class(), (64, false));
    }

    #[test]
    fn paints_one_pixel_per_evaluation() {
        let n = Scripted::new(Limits::new(10, 4.0, 1), |p| if p.0 == 0 { (10, true) } else { (5, false) });
        let mut rec = Recorder::default();
        assert_eq!(render_sequential(&n, PixelRect::image(2, 3), &mut rec, &Grayscale(10)), 6);
        assert!(rec.rects.is_empty());
        assert_eq!(rec.pixels.len(), 6);
        assert_eq!(rec.pixels[0], (Pixel(0, 0), Rgba([0, 0, 0, 255])));
        assert_eq!(rec.pixels[1], (Pixel(1, 0), Rgba([127, 127, 127, 255])));
    }

    #[test]
    fn fills_an_image() {
        let n = Scripted::new(Limits::new(10, 4.0, 1), |_| (10, false));
        let mut img = RgbaImage::new(5, 4);
        render_sequential(&n, PixelRect::image(5, 4), &mut img, &Grayscale(10));
        assert!(img.pixels().all(|p| *p == Rgba([255, 255, 255, 255])));
    }
}
