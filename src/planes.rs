// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Describes the relationship between a rectangle on the integral
//! plane, with an origin at 0,0 in the upper-left corner and y
//! growing downward, and a window onto the complex plane defined by
//! its left-upper and right-lower corners.
use itertools::iproduct;
use num::Complex;

/// Describes the x, y of a pixel on the integral plane.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Pixel(pub u32, pub u32);

/// A rectangle on the integral plane: left, top, width, height.  The
/// right and bottom edges are exclusive.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PixelRect {
    /// Leftmost column.
    pub left: u32,
    /// Topmost row.
    pub top: u32,
    /// Number of columns.
    pub width: u32,
    /// Number of rows.
    pub height: u32,
}

impl PixelRect {
    /// Constructor.
    pub fn new(left: u32, top: u32, width: u32, height: u32) -> Self {
        PixelRect {
            left,
            top,
            width,
            height,
        }
    }

    /// The rectangle covering a whole image.
    pub fn image(width: u32, height: u32) -> Self {
        PixelRect::new(0, 0, width, height)
    }

    /// One past the last column.
    pub fn right(&self) -> u32 {
        self.left + self.width
    }

    /// One past the last row.
    pub fn bottom(&self) -> u32 {
        self.top + self.height
    }

    /// The number of pixels covered.
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Describes that the rectangle covers nothing.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// True when the pixel lies inside the rectangle.
    pub fn contains(&self, pixel: Pixel) -> bool {
        pixel.0 >= self.left && pixel.0 < self.right() && pixel.1 >= self.top && pixel.1 < self.bottom()
    }

    /// The four corner pixels followed by the midpoint pixel.  Corners
    /// are inclusive, so a one pixel wide rectangle samples the same
    /// column twice.
    pub fn sample_pixels(&self) -> [Pixel; 5] {
        let (r, b) = (self.right() - 1, self.bottom() - 1);
        [
            Pixel(self.left, self.top),
            Pixel(r, self.top),
            Pixel(self.left, b),
            Pixel(r, b),
            Pixel(self.left + self.width / 2, self.top + self.height / 2),
        ]
    }

    /// Split into top-left, top-right, bottom-left and bottom-right
    /// quadrants.  When a dimension is odd the extra pixel goes to the
    /// right or bottom quadrants.
    pub fn quadrants(&self) -> [PixelRect; 4] {
        let (hw, hh) = (self.width / 2, self.height / 2);
        let (rw, rh) = (self.width - hw, self.height - hh);
        [
            PixelRect::new(self.left, self.top, hw, hh),
            PixelRect::new(self.left + hw, self.top, rw, hh),
            PixelRect::new(self.left, self.top + hh, hw, rh),
            PixelRect::new(self.left + hw, self.top + hh, rw, rh),
        ]
    }

    /// Row-major iteration over every pixel in the rectangle.
    pub fn pixels(&self) -> impl Iterator<Item = Pixel> {
        let (left, right) = (self.left, self.right());
        iproduct!(self.top..self.bottom(), left..right).map(|(y, x)| Pixel(x, y))
    }

    /// The intersection with the rectangle of an image of the given
    /// size.
    pub fn clip(&self, width: u32, height: u32) -> PixelRect {
        let left = self.left.min(width);
        let top = self.top.min(height);
        PixelRect::new(
            left,
            top,
            self.right().min(width) - left,
            self.bottom().min(height) - top,
        )
    }
}

/// A window onto the complex plane in native precision.  The real
/// part of each value is the x-component and the imaginary part the
/// y-component; because pixel rows grow downward, imaginary values
/// fall as rows rise.
#[derive(Clone, Debug, PartialEq)]
pub struct PlaneWindow {
    /// Real minimum, imaginary maximum.
    pub top_left: Complex<f64>,
    /// Real maximum, imaginary minimum.
    pub bottom_right: Complex<f64>,
    // The size of one pixel along each axis of the complex plane.
    real_delta: f64,
    imag_delta: f64,
}

impl PlaneWindow {
    /// Takes the size of the integral plane and the two corners of the
    /// complex plane.  The corners have been validated by the caller.
    pub fn new(width: u32, height: u32, top_left: Complex<f64>, bottom_right: Complex<f64>) -> Self {
        PlaneWindow {
            top_left,
            bottom_right,
            real_delta: (bottom_right.re - top_left.re) / f64::from(width),
            imag_delta: (top_left.im - bottom_right.im) / f64::from(height),
        }
    }

    /// The width and height of one pixel on the complex plane.
    pub fn deltas(&self) -> (f64, f64) {
        (self.real_delta, self.imag_delta)
    }

    /// Given a pixel on the integral plane, map it to the equivalent
    /// point on the complex plane.
    pub fn pixel_to_point(&self, pixel: Pixel) -> Complex<f64> {
        Complex::new(
            self.top_left.re + f64::from(pixel.0) * self.real_delta,
            self.top_left.im - f64::from(pixel.1) * self.imag_delta,
        )
    }
}
