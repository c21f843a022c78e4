//! Complex number backends for orbit iteration.
//!
//! Provides a trait abstraction over native f64, fixed-point and BigFloat
//! complex numbers, so the escape-time loop is written once and
//! monomorphised per backend.

use crate::BigFloat;

/// Complex number type the escape-time engine iterates on.
///
/// Each backend carries its own construction scale: nothing for f64, the
/// bit shift for fixed point, the precision in bits for BigFloat.
pub trait OrbitComplex: Clone + std::fmt::Debug {
    type Scale: Clone + std::fmt::Debug;

    /// Construct from f64 real/imaginary components.
    fn from_f64_pair(re: f64, im: f64, scale: &Self::Scale) -> Self;

    /// Construct from BigFloat components, keeping as much precision as the backend holds.
    fn from_bigfloat_pair(re: &BigFloat, im: &BigFloat, scale: &Self::Scale) -> Self;

    /// Returns the additive identity with the same scale as self.
    fn zero(&self) -> Self;

    /// Extract as f64 pair for bailout tests and coloring.
    fn to_f64_pair(&self) -> (f64, f64);

    fn add(&self, other: &Self) -> Self;

    fn sub(&self, other: &Self) -> Self;

    fn mul(&self, other: &Self) -> Self;

    fn square(&self) -> Self;

    /// Multiply by a small integer (pixel index times step).
    fn mul_int(&self, factor: i64) -> Self;

    /// Magnitude squared as f64.
    fn norm_sq(&self) -> f64;

    /// True when both components differ by less than `tolerance`.
    fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        let (a_re, a_im) = self.to_f64_pair();
        let (b_re, b_im) = other.to_f64_pair();
        (a_re - b_re).abs() < tolerance && (a_im - b_im).abs() < tolerance
    }

    /// Sticky overflow marker. Only fixed point ever sets it.
    fn overflowed(&self) -> bool {
        false
    }
}

/// Native f64 complex number.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct F64Complex {
    pub re: f64,
    pub im: f64,
}

impl F64Complex {
    pub const fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }
}

impl OrbitComplex for F64Complex {
    type Scale = ();

    #[inline]
    fn from_f64_pair(re: f64, im: f64, _scale: &()) -> Self {
        Self { re, im }
    }

    #[inline]
    fn from_bigfloat_pair(re: &BigFloat, im: &BigFloat, _scale: &()) -> Self {
        Self {
            re: re.to_f64(),
            im: im.to_f64(),
        }
    }

    #[inline]
    fn zero(&self) -> Self {
        Self::default()
    }

    #[inline]
    fn to_f64_pair(&self) -> (f64, f64) {
        (self.re, self.im)
    }

    #[inline]
    fn add(&self, other: &Self) -> Self {
        Self {
            re: self.re + other.re,
            im: self.im + other.im,
        }
    }

    #[inline]
    fn sub(&self, other: &Self) -> Self {
        Self {
            re: self.re - other.re,
            im: self.im - other.im,
        }
    }

    #[inline]
    fn mul(&self, other: &Self) -> Self {
        Self {
            re: self.re * other.re - self.im * other.im,
            im: self.re * other.im + self.im * other.re,
        }
    }

    #[inline]
    fn square(&self) -> Self {
        Self {
            re: self.re * self.re - self.im * self.im,
            im: 2.0 * self.re * self.im,
        }
    }

    #[inline]
    fn mul_int(&self, factor: i64) -> Self {
        let f = factor as f64;
        Self {
            re: self.re * f,
            im: self.im * f,
        }
    }

    #[inline]
    fn norm_sq(&self) -> f64 {
        self.re * self.re + self.im * self.im
    }
}

/// BigFloat complex number for views beyond f64 resolution.
#[derive(Clone, Debug)]
pub struct BigFloatComplex {
    pub re: BigFloat,
    pub im: BigFloat,
}

impl BigFloatComplex {
    pub fn new(re: BigFloat, im: BigFloat) -> Self {
        Self { re, im }
    }
}

impl OrbitComplex for BigFloatComplex {
    type Scale = usize;

    fn from_f64_pair(re: f64, im: f64, precision_bits: &usize) -> Self {
        Self {
            re: BigFloat::with_precision(re, *precision_bits),
            im: BigFloat::with_precision(im, *precision_bits),
        }
    }

    fn from_bigfloat_pair(re: &BigFloat, im: &BigFloat, precision_bits: &usize) -> Self {
        Self {
            re: re.to_precision(*precision_bits),
            im: im.to_precision(*precision_bits),
        }
    }

    fn zero(&self) -> Self {
        let precision = self.re.precision_bits();
        Self {
            re: BigFloat::zero(precision),
            im: BigFloat::zero(precision),
        }
    }

    fn to_f64_pair(&self) -> (f64, f64) {
        (self.re.to_f64(), self.im.to_f64())
    }

    fn add(&self, other: &Self) -> Self {
        Self {
            re: self.re.add(&other.re),
            im: self.im.add(&other.im),
        }
    }

    fn sub(&self, other: &Self) -> Self {
        Self {
            re: self.re.sub(&other.re),
            im: self.im.sub(&other.im),
        }
    }

    fn mul(&self, other: &Self) -> Self {
        Self {
            re: self.re.mul(&other.re).sub(&self.im.mul(&other.im)),
            im: self.re.mul(&other.im).add(&self.im.mul(&other.re)),
        }
    }

    fn square(&self) -> Self {
        let cross = self.re.mul(&self.im);
        Self {
            re: self.re.mul(&self.re).sub(&self.im.mul(&self.im)),
            im: cross.add(&cross),
        }
    }

    fn mul_int(&self, factor: i64) -> Self {
        Self {
            re: self.re.mul_i64(factor),
            im: self.im.mul_i64(factor),
        }
    }

    fn norm_sq(&self) -> f64 {
        self.re.mul(&self.re).add(&self.im.mul(&self.im)).to_f64()
    }

    fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        let d_re = self.re.sub(&other.re).abs().to_f64();
        let d_im = self.im.sub(&other.im).abs().to_f64();
        d_re < tolerance && d_im < tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big(re: f64, im: f64) -> BigFloatComplex {
        BigFloatComplex::from_f64_pair(re, im, &128)
    }

    #[test]
    fn f64_complex_mul() {
        // (1 + 2i) * (3 + 4i) = -5 + 10i
        let a = F64Complex::new(1.0, 2.0);
        let b = F64Complex::new(3.0, 4.0);
        assert_eq!(a.mul(&b).to_f64_pair(), (-5.0, 10.0));
    }

    #[test]
    fn f64_complex_square() {
        // (3 + 4i)² = -7 + 24i
        assert_eq!(F64Complex::new(3.0, 4.0).square().to_f64_pair(), (-7.0, 24.0));
    }

    #[test]
    fn f64_complex_mul_int_scales_both_parts() {
        let a = F64Complex::new(0.25, -0.5);
        assert_eq!(a.mul_int(4).to_f64_pair(), (1.0, -2.0));
    }

    #[test]
    fn approx_eq_is_per_component() {
        let a = F64Complex::new(1.0, 1.0);
        assert!(a.approx_eq(&F64Complex::new(1.0 + 1e-9, 1.0 - 1e-9), 1e-8));
        assert!(!a.approx_eq(&F64Complex::new(1.0, 1.0 + 1e-6), 1e-8));
    }

    #[test]
    fn bigfloat_complex_zero_preserves_precision() {
        let z = BigFloatComplex::from_f64_pair(1.0, 2.0, &256).zero();
        assert_eq!(z.to_f64_pair(), (0.0, 0.0));
        assert_eq!(z.re.precision_bits(), 256);
    }

    #[test]
    fn bigfloat_complex_matches_f64_arithmetic() {
        let a = big(1.0, 2.0);
        let b = big(3.0, 4.0);
        let (re, im) = a.mul(&b).to_f64_pair();
        assert!((re + 5.0).abs() < 1e-10);
        assert!((im - 10.0).abs() < 1e-10);

        let (re, im) = big(3.0, 4.0).square().to_f64_pair();
        assert!((re + 7.0).abs() < 1e-10);
        assert!((im - 24.0).abs() < 1e-10);
        assert!((big(3.0, 4.0).norm_sq() - 25.0).abs() < 1e-10);
    }

    #[test]
    fn bigfloat_approx_eq_sees_differences_below_f64_resolution() {
        let one = BigFloat::one(512);
        let tiny = BigFloat::from_string("1e-40", 512).unwrap();
        let a = BigFloatComplex::new(one.clone(), one.clone());
        let b = BigFloatComplex::new(one.add(&tiny), one.clone());
        assert!(a.approx_eq(&b, 1e-30));
        assert!(!a.approx_eq(&b, 1e-50));
    }
}
