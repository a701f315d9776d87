// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Palettes map a member's inverse divergence to a colour.  Points in
//! the set are black in every palette.

use std::str::FromStr;

use image::Rgba;

use crate::errors::ConfigError;
use crate::numerics::Member;

const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// A pure mapping from a member's class to a colour.
pub trait Palette: Send + Sync {
    /// The colour for a class, as returned by `Member::class`.
    fn color(&self, inverse_divergence: u8, in_set: bool) -> Rgba<u8>;
}

/// The colour to paint a member.
pub fn color_for<L: Palette + ?Sized, P>(palette: &L, member: &Member<P>) -> Rgba<u8> {
    palette.color(member.inverse_divergence, member.in_set)
}

/// Named palettes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PaletteKind {
    /// Shades of gray.
    Grayscale,
    /// Shades of red.
    Redscale,
    /// A stored gradient.
    Pretty,
}

impl FromStr for PaletteKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, ConfigError> {
        match s {
            "grayscale" => Ok(PaletteKind::Grayscale),
            "redscale" => Ok(PaletteKind::Redscale),
            "pretty" => Ok(PaletteKind::Pretty),
            _ => Err(ConfigError::UnknownSelector("palette", s.to_string())),
        }
    }
}

impl PaletteKind {
    /// Build the palette for renders with the given iterate limit.
    pub fn build(self, iterate_limit: u8) -> Box<dyn Palette> {
        match self {
            PaletteKind::Grayscale => Box::new(Grayscale(iterate_limit)),
            PaletteKind::Redscale => Box::new(Redscale(iterate_limit)),
            PaletteKind::Pretty => Box::new(Pretty::new(iterate_limit)),
        }
    }
}

fn scale(inverse_divergence: u8, limit: u8) -> u8 {
    let limit = u32::from(limit.max(1));
    (u32::from(inverse_divergence.min(limit as u8)) * 255 / limit) as u8
}

/// Gray level proportional to the escape iteration.
#[derive(Copy, Clone, Debug)]
pub struct Grayscale(pub u8);

impl Palette for Grayscale {
    fn color(&self, inverse_divergence: u8, in_set: bool) -> Rgba<u8> {
        if in_set {
            return BLACK;
        }
        let v = scale(inverse_divergence, self.0);
        Rgba([v, v, v, 255])
    }
}

/// Red level proportional to the escape iteration.
#[derive(Copy, Clone, Debug)]
pub struct Redscale(pub u8);

impl Palette for Redscale {
    fn color(&self, inverse_divergence: u8, in_set: bool) -> Rgba<u8> {
        if in_set {
            return BLACK;
        }
        Rgba([scale(inverse_divergence, self.0), 0, 0, 255])
    }
}

// Gradient stops, from fast to slow divergence.
const STOPS: [[u8; 3]; 5] = [
    [0, 7, 100],
    [32, 107, 203],
    [237, 255, 255],
    [255, 170, 0],
    [0, 2, 0],
];

/// A lookup table interpolated between fixed gradient stops, one entry
/// per possible inverse divergence.
#[derive(Clone, Debug)]
pub struct Pretty {
    table: Vec<Rgba<u8>>,
}

impl Pretty {
    /// Precompute the table for an iterate limit.
    pub fn new(iterate_limit: u8) -> Self {
        let n = usize::from(iterate_limit) + 1;
        let spans = (STOPS.len() - 1) as f64;
        let table = (0..n)
            .map(|i| {
                let t = if n > 1 { i as f64 / (n - 1) as f64 } else { 0.0 };
                let at = (t * spans).min(spans - 1e-9);
                let k = at.floor() as usize;
                let f = at - k as f64;
                let mix = |c: usize| {
                    let (a, b) = (f64::from(STOPS[k][c]), f64::from(STOPS[k + 1][c]));
                    (a + (b - a) * f).round() as u8
                };
                Rgba([mix(0), mix(1), mix(2), 255])
            })
            .collect();
        Pretty { table }
    }
}

impl Palette for Pretty {
    fn color(&self, inverse_divergence: u8, in_set: bool) -> Rgba<u8> {
        if in_set {
            return BLACK;
        }
        let i = usize::from(inverse_divergence).min(self.table.len() - 1);
        self.table[i]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_members_are_black_everywhere() {
        for kind in &[PaletteKind::Grayscale, PaletteKind::Redscale, PaletteKind::Pretty] {
            assert_eq!(kind.build(100).color(100, true), BLACK);
        }
    }

    #[test]
    fn grayscale_scales_with_the_limit() {
        let p = Grayscale(255);
        assert_eq!(p.color(0, false), Rgba([0, 0, 0, 255]));
        assert_eq!(p.color(51, false), Rgba([51, 51, 51, 255]));
        assert_eq!(Grayscale(10).color(5, false), Rgba([127, 127, 127, 255]));
    }

    #[test]
    fn redscale_only_uses_red() {
        let c = Redscale(10).color(10, false);
        assert_eq!(c, Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn pretty_table_hits_its_end_stops() {
        let p = Pretty::new(255);
        assert_eq!(p.table.len(), 256);
        assert_eq!(p.color(0, false), Rgba([0, 7, 100, 255]));
        assert_eq!(p.color(255, false), Rgba([0, 2, 0, 255]));
        let tiny = Pretty::new(0);
        assert_eq!(tiny.color(0, false), Rgba([0, 7, 100, 255]));
    }

    #[test]
    fn color_for_reads_the_member() {
        let m = Member::escaped((), 51);
        assert_eq!(color_for(&Grayscale(255), &m), Rgba([51, 51, 51, 255]));
    }

    #[test]
    fn parses_palette_names() {
        assert_eq!("pretty".parse::<PaletteKind>(), Ok(PaletteKind::Pretty));
        assert!("rainbow".parse::<PaletteKind>().is_err());
    }
}
