//! Fixed-point complex numbers.
//!
//! Values are `i64` scaled by `2^shift`. Products are formed in `i128` and
//! shifted back; anything that does not fit sets a sticky overflow flag,
//! which the bailout test treats as an escape.

use crate::{BigFloat, OrbitComplex};

/// Largest accepted bit shift. Leaves three integer bits of headroom.
pub const MAX_BIT_SHIFT: u32 = 60;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedComplex {
    pub re: i64,
    pub im: i64,
    shift: u32,
    overflow: bool,
}

impl FixedComplex {
    pub fn from_raw(re: i64, im: i64, shift: u32) -> Self {
        Self {
            re,
            im,
            shift: shift.min(MAX_BIT_SHIFT),
            overflow: false,
        }
    }

    pub fn shift(&self) -> u32 {
        self.shift
    }

    fn unit(&self) -> f64 {
        (self.shift as f64).exp2()
    }

    fn scale_component(value: f64, shift: u32) -> Option<i64> {
        let scaled = (value * (shift as f64).exp2()).round();
        if scaled.is_finite() && scaled.abs() < i64::MAX as f64 {
            Some(scaled as i64)
        } else {
            None
        }
    }

    fn narrow(value: Option<i128>, shift: u32) -> Option<i64> {
        value.and_then(|v| i64::try_from(v >> shift).ok())
    }

    fn build(&self, re: Option<i64>, im: Option<i64>, carried: bool) -> Self {
        match (re, im) {
            (Some(re), Some(im)) => Self {
                re,
                im,
                shift: self.shift,
                overflow: carried,
            },
            _ => Self {
                re: 0,
                im: 0,
                shift: self.shift,
                overflow: true,
            },
        }
    }
}

impl OrbitComplex for FixedComplex {
    type Scale = u32;

    fn from_f64_pair(re: f64, im: f64, shift: &u32) -> Self {
        let shift = (*shift).min(MAX_BIT_SHIFT);
        let template = Self::from_raw(0, 0, shift);
        template.build(
            Self::scale_component(re, shift),
            Self::scale_component(im, shift),
            false,
        )
    }

    fn from_bigfloat_pair(re: &BigFloat, im: &BigFloat, shift: &u32) -> Self {
        Self::from_f64_pair(re.to_f64(), im.to_f64(), shift)
    }

    fn zero(&self) -> Self {
        Self::from_raw(0, 0, self.shift)
    }

    fn to_f64_pair(&self) -> (f64, f64) {
        let unit = self.unit();
        (self.re as f64 / unit, self.im as f64 / unit)
    }

    fn add(&self, other: &Self) -> Self {
        self.build(
            self.re.checked_add(other.re),
            self.im.checked_add(other.im),
            self.overflow || other.overflow,
        )
    }

    fn sub(&self, other: &Self) -> Self {
        self.build(
            self.re.checked_sub(other.re),
            self.im.checked_sub(other.im),
            self.overflow || other.overflow,
        )
    }

    fn mul(&self, other: &Self) -> Self {
        let (a, b) = (self.re as i128, self.im as i128);
        let (c, d) = (other.re as i128, other.im as i128);
        let re = (a * c).checked_sub(b * d);
        let im = (a * d).checked_add(b * c);
        self.build(
            Self::narrow(re, self.shift),
            Self::narrow(im, self.shift),
            self.overflow || other.overflow,
        )
    }

    fn square(&self) -> Self {
        let (a, b) = (self.re as i128, self.im as i128);
        let re = (a * a).checked_sub(b * b);
        let im = (a * b).checked_mul(2);
        self.build(
            Self::narrow(re, self.shift),
            Self::narrow(im, self.shift),
            self.overflow,
        )
    }

    fn mul_int(&self, factor: i64) -> Self {
        self.build(
            self.re.checked_mul(factor),
            self.im.checked_mul(factor),
            self.overflow,
        )
    }

    fn norm_sq(&self) -> f64 {
        let (re, im) = self.to_f64_pair();
        re * re + im * im
    }

    fn overflowed(&self) -> bool {
        self.overflow
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_exact_binary_fractions() {
        let z = FixedComplex::from_f64_pair(-1.25, 0.5, &29);
        assert_eq!(z.to_f64_pair(), (-1.25, 0.5));
        assert!(!z.overflowed());
    }

    #[test]
    fn square_matches_float_result() {
        let z = FixedComplex::from_f64_pair(0.75, -0.5, &40);
        let (re, im) = z.square().to_f64_pair();
        assert_eq!(re, 0.75 * 0.75 - 0.25);
        assert_eq!(im, -0.75);
    }

    #[test]
    fn product_out_of_range_sets_overflow() {
        let big = FixedComplex::from_f64_pair(100_000.0, 0.0, &40);
        assert!(!big.overflowed());
        let product = big.mul(&big);
        assert!(product.overflowed());
    }

    #[test]
    fn overflow_is_sticky_through_further_arithmetic() {
        let big = FixedComplex::from_f64_pair(1.0e6, 0.0, &40).square();
        let small = FixedComplex::from_f64_pair(0.5, 0.5, &40);
        assert!(big.add(&small).overflowed());
        assert!(small.mul(&big).overflowed());
    }

    #[test]
    fn unrepresentable_input_is_flagged() {
        let z = FixedComplex::from_f64_pair(1.0e30, 0.0, &48);
        assert!(z.overflowed());
    }
}
