// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Fixed-point arbitrary precision numbers.
//!
//! A `BigFixed` is a `BigInt` mantissa read as `mantissa / 2^precision`.
//! Every value taking part in one render is created with the same
//! precision; mixing precisions is a programming error and is caught
//! by a debug assertion.  Multiplication truncates toward negative
//! infinity, which is all the Mandelbrot iteration needs and keeps
//! results bit-for-bit deterministic.

use std::cmp::Ordering;
use std::convert::TryFrom;
use std::ops::{Add, Mul, Sub};

use num::bigint::{BigInt, Sign};
use num::traits::{Float, Signed, ToPrimitive, Zero};

use crate::errors::ParseBigFixedError;

/// Largest decimal exponent `parse` will expand.  Anything beyond it
/// is far outside any plane window worth rendering.
pub const MAX_DECIMAL_EXPONENT: i64 = 4096;

/// A signed fixed-point number with `precision` fractional bits.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BigFixed {
    mantissa: BigInt,
    precision: usize,
}

impl BigFixed {
    /// Zero at the given precision.
    pub fn zero(precision: usize) -> Self {
        BigFixed {
            mantissa: BigInt::zero(),
            precision,
        }
    }

    /// The number of fractional bits.
    pub fn precision(&self) -> usize {
        self.precision
    }

    /// Exact conversion from a finite `f64`.  Bits of the float below
    /// the precision are truncated.
    pub fn from_f64(value: f64, precision: usize) -> Self {
        let (mantissa, exponent, sign) = Float::integer_decode(value);
        let mut m = BigInt::from(mantissa);
        let shift = i64::from(exponent) + precision as i64;
        if shift >= 0 {
            m <<= shift as usize;
        } else {
            m >>= (-shift) as usize;
        }
        if sign < 0 {
            m = -m;
        }
        BigFixed {
            mantissa: m,
            precision,
        }
    }

    /// Closest `f64`, give or take the last bit.
    pub fn to_f64(&self) -> f64 {
        // Keep the top 64 bits of the mantissa so small values survive.
        let shift = self.mantissa.bits().saturating_sub(64) as usize;
        let m: BigInt = &self.mantissa >> shift;
        let e = shift as i32 - self.precision as i32;
        m.to_f64().unwrap_or(0.0) * 2f64.powi(e / 2) * 2f64.powi(e - e / 2)
    }

    /// Reads `[-+]digits[.digits][(e|E)[-+]digits]`.
    pub fn parse(s: &str, precision: usize) -> Result<Self, ParseBigFixedError> {
        let bad = || ParseBigFixedError(s.to_string());
        let t = s.trim();
        let (negative, t) = match t.as_bytes().first() {
            Some(b'-') => (true, &t[1..]),
            Some(b'+') => (false, &t[1..]),
            _ => (false, t),
        };
        let (number, exponent) = match t.find(|c: char| c == 'e' || c == 'E') {
            Some(i) => (&t[..i], t[i + 1..].parse::<i64>().map_err(|_| bad())?),
            None => (t, 0),
        };
        let (whole, fraction) = match number.find('.') {
            Some(i) => (&number[..i], &number[i + 1..]),
            None => (number, ""),
        };
        if whole.is_empty() && fraction.is_empty() {
            return Err(bad());
        }
        if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
            return Err(bad());
        }

        let digits: String = whole.chars().chain(fraction.chars()).collect();
        let value = BigInt::parse_bytes(digits.as_bytes(), 10).ok_or_else(bad)?;
        let decimal = i64::try_from(fraction.len())
            .ok()
            .and_then(|f| exponent.checked_sub(f))
            .ok_or_else(bad)?;
        if decimal > MAX_DECIMAL_EXPONENT {
            return Err(bad());
        }
        // value < 10^digits and 2^precision <= 10^(precision / 3 + 1), so
        // dividing by any larger power of ten leaves nothing.
        let vanishing = digits.len().saturating_add(precision / 3 + 1);
        let ten = BigInt::from(10u32);
        let mut m = if decimal >= 0 {
            (value * num::pow(ten, decimal as usize)) << precision
        } else {
            match decimal.checked_neg().and_then(|k| usize::try_from(k).ok()) {
                Some(k) if k <= vanishing => (value << precision) / num::pow(ten, k),
                _ => BigInt::zero(),
            }
        };
        if negative {
            m = -m;
        }
        Ok(BigFixed {
            mantissa: m,
            precision,
        })
    }

    /// Multiply by a machine integer.
    pub fn mul_int(&self, n: i64) -> Self {
        BigFixed {
            mantissa: &self.mantissa * n,
            precision: self.precision,
        }
    }

    /// Divide by a machine integer, truncating toward zero.
    pub fn div_int(&self, n: u64) -> Self {
        BigFixed {
            mantissa: &self.mantissa / n,
            precision: self.precision,
        }
    }

    /// Half of this value.
    pub fn half(&self) -> Self {
        BigFixed {
            mantissa: &self.mantissa >> 1usize,
            precision: self.precision,
        }
    }

    /// Absolute value.
    pub fn abs(&self) -> Self {
        BigFixed {
            mantissa: self.mantissa.abs(),
            precision: self.precision,
        }
    }

    /// True for values below zero.
    pub fn is_negative(&self) -> bool {
        self.mantissa.sign() == Sign::Minus
    }
}

impl<'a> Add for &'a BigFixed {
    type Output = BigFixed;

    fn add(self, other: &'a BigFixed) -> BigFixed {
        debug_assert_eq!(self.precision, other.precision);
        BigFixed {
            mantissa: &self.mantissa + &other.mantissa,
            precision: self.precision,
        }
    }
}

impl<'a> Sub for &'a BigFixed {
    type Output = BigFixed;

    fn sub(self, other: &'a BigFixed) -> BigFixed {
        debug_assert_eq!(self.precision, other.precision);
        BigFixed {
            mantissa: &self.mantissa - &other.mantissa,
            precision: self.precision,
        }
    }
}

impl<'a> Mul for &'a BigFixed {
    type Output = BigFixed;

    fn mul(self, other: &'a BigFixed) -> BigFixed {
        debug_assert_eq!(self.precision, other.precision);
        BigFixed {
            mantissa: (&self.mantissa * &other.mantissa) >> self.precision,
            precision: self.precision,
        }
    }
}

impl PartialOrd for BigFixed {
    fn partial_cmp(&self, other: &BigFixed) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BigFixed {
    fn cmp(&self, other: &BigFixed) -> Ordering {
        debug_assert_eq!(self.precision, other.precision);
        self.mantissa.cmp(&other.mantissa)
    }
}

/// A complex number with `BigFixed` parts.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BigComplex {
    /// Real part.
    pub re: BigFixed,
    /// Imaginary part.
    pub im: BigFixed,
}

impl BigComplex {
    /// Constructor.
    pub fn new(re: BigFixed, im: BigFixed) -> Self {
        BigComplex { re, im }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PREC: usize = 96;

    fn fixed(s: &str) -> BigFixed {
        BigFixed::parse(s, PREC).unwrap()
    }

    #[test]
    fn parses_exact_binary_fractions() {
        assert_eq!(fixed("0.5"), BigFixed::from_f64(0.5, PREC));
        assert_eq!(fixed("-2.25"), BigFixed::from_f64(-2.25, PREC));
        assert_eq!(fixed("+3"), BigFixed::from_f64(3.0, PREC));
        assert_eq!(fixed(".125"), BigFixed::from_f64(0.125, PREC));
        assert_eq!(fixed("1.5e2"), BigFixed::from_f64(150.0, PREC));
        assert_eq!(fixed("25E-2"), BigFixed::from_f64(0.25, PREC));
    }

    #[test]
    fn rejects_malformed_numbers() {
        for s in &["", "-", ".", "1.2.3", "abc", "1e", "1e+x", "0x10", "--1"] {
            assert!(BigFixed::parse(s, PREC).is_err(), "accepted {:?}", s);
        }
    }

    #[test]
    fn extreme_exponents_are_bounded() {
        assert_eq!(fixed("1e-9223372036854775808"), BigFixed::zero(PREC));
        assert_eq!(fixed("-7.25e-400"), BigFixed::zero(PREC));
        assert!(BigFixed::parse("1.5e-9223372036854775808", PREC).is_err());
        assert!(BigFixed::parse("1e300000000", PREC).is_err());
        assert!(BigFixed::parse("1e9223372036854775807", PREC).is_err());
        assert!(BigFixed::parse("1e99999999999999999999", PREC).is_err());
    }

    #[test]
    fn exponents_at_the_limits_still_parse() {
        let huge = format!("1e{}", MAX_DECIMAL_EXPONENT);
        assert!(BigFixed::parse(&huge, PREC).unwrap() > fixed("1e4000"));
        let past = format!("1e{}", MAX_DECIMAL_EXPONENT + 1);
        assert!(BigFixed::parse(&past, PREC).is_err());
        // 2^96 is about 7.9e28: 1e-28 keeps a few bits, 1e-40 none.
        assert!(fixed("1e-28") > BigFixed::zero(PREC));
        assert_eq!(fixed("1e-40"), BigFixed::zero(PREC));
        assert_eq!(fixed("0.5e-28"), fixed("5e-29"));
    }

    #[test]
    fn round_trips_through_f64() {
        for v in &[0.0, 1.0, -1.0, 0.1, -2.01, 1.11, 1e-12, 123456.789] {
            let back = BigFixed::from_f64(*v, PREC).to_f64();
            assert!((back - v).abs() <= v.abs() * 1e-15, "{} became {}", v, back);
        }
    }

    #[test]
    fn to_f64_handles_very_high_precision() {
        let v = BigFixed::parse("-0.75", 2048).unwrap();
        assert_eq!(v.to_f64(), -0.75);
    }

    #[test]
    fn arithmetic_matches_native_on_exact_values() {
        let a = fixed("1.5");
        let b = fixed("-0.25");
        assert_eq!((&a + &b).to_f64(), 1.25);
        assert_eq!((&a - &b).to_f64(), 1.75);
        assert_eq!((&a * &b).to_f64(), -0.375);
        assert_eq!(a.mul_int(3).to_f64(), 4.5);
        assert_eq!(a.div_int(3).to_f64(), 0.5);
        assert_eq!(b.half().to_f64(), -0.125);
        assert_eq!(b.abs(), fixed("0.25"));
        assert!(b.is_negative());
        assert!(b < a);
    }

    #[test]
    fn keeps_digits_beyond_native_precision() {
        let a = fixed("1.00000000000000000001");
        let b = fixed("1");
        assert_eq!(a.to_f64(), b.to_f64());
        assert!(a > b);
    }
}
