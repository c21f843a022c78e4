use dashu_base::{Abs, Approximation, EstimatedLog2};
use dashu_float::ops::SquareRoot;
use dashu_float::{DBig, FBig};
use serde::{Deserialize, Serialize};

/// Arbitrary precision floating point with explicit precision enforcement
///
/// Uses f64 internally when precision_bits <= 64, FBig otherwise.
/// Callers never see which representation is active.
#[derive(Clone, Debug)]
pub struct BigFloat {
    value: BigFloatValue,
    precision_bits: usize,
}

#[derive(Clone, Debug)]
pub enum BigFloatValue {
    F64(f64),
    Arbitrary(FBig),
}

fn fbig_from_f64(val: f64, precision_bits: usize) -> FBig {
    let base = if val == 0.0 || !val.is_finite() {
        FBig::ZERO
    } else {
        FBig::try_from(val).unwrap_or(FBig::ZERO)
    };
    base.with_precision(precision_bits).value()
}

impl BigFloat {
    /// Create BigFloat from f64 with explicit precision
    pub fn with_precision(val: f64, precision_bits: usize) -> Self {
        let value = if precision_bits <= 64 {
            BigFloatValue::F64(val)
        } else {
            BigFloatValue::Arbitrary(fbig_from_f64(val, precision_bits))
        };

        Self {
            value,
            precision_bits,
        }
    }

    pub fn zero(precision_bits: usize) -> Self {
        Self::with_precision(0.0, precision_bits)
    }

    pub fn one(precision_bits: usize) -> Self {
        Self::with_precision(1.0, precision_bits)
    }

    pub fn precision_bits(&self) -> usize {
        self.precision_bits
    }

    /// Same value carried at a different precision.
    pub fn to_precision(&self, precision_bits: usize) -> Self {
        match &self.value {
            BigFloatValue::F64(v) => Self::with_precision(*v, precision_bits),
            BigFloatValue::Arbitrary(v) if precision_bits > 64 => Self {
                value: BigFloatValue::Arbitrary(v.clone().with_precision(precision_bits).value()),
                precision_bits,
            },
            BigFloatValue::Arbitrary(_) => Self::with_precision(self.to_f64(), precision_bits),
        }
    }

    /// Convert to f64. Values needing more than 53 bits lose precision.
    pub fn to_f64(&self) -> f64 {
        match &self.value {
            BigFloatValue::F64(v) => *v,
            BigFloatValue::Arbitrary(v) => v.to_f64().value(),
        }
    }

    /// Create BigFloat from string with explicit precision
    ///
    /// Allows values beyond f64 range (e.g., "1e1000"). The decimal to binary
    /// conversion happens once, at the target precision.
    pub fn from_string(val: &str, precision_bits: usize) -> Result<Self, String> {
        if precision_bits <= 64 {
            val.parse::<f64>()
                .map(|f| Self::with_precision(f, precision_bits))
                .map_err(|e| format!("Failed to parse f64: {}", e))
        } else {
            val.parse::<DBig>()
                .map_err(|e| format!("Failed to parse DBig: {}", e))
                .map(|dbig| {
                    let fbig_halfaway = match dbig.with_base_and_precision::<2>(precision_bits) {
                        Approximation::Exact(v) => v,
                        Approximation::Inexact(v, _) => v,
                    };
                    let fbig_with_prec =
                        fbig_halfaway.with_rounding::<dashu_float::round::mode::Zero>();
                    Self {
                        value: BigFloatValue::Arbitrary(fbig_with_prec),
                        precision_bits,
                    }
                })
        }
    }

    fn binary_op(
        &self,
        other: &Self,
        fast: impl Fn(f64, f64) -> f64,
        slow: impl Fn(&FBig, &FBig) -> FBig,
    ) -> Self {
        let result_precision = self.precision_bits.max(other.precision_bits);

        let value = match (&self.value, &other.value) {
            (BigFloatValue::F64(a), BigFloatValue::F64(b)) if result_precision <= 64 => {
                BigFloatValue::F64(fast(*a, *b))
            }
            _ => BigFloatValue::Arbitrary(slow(
                &self.to_fbig(result_precision),
                &other.to_fbig(result_precision),
            )),
        };

        Self {
            value,
            precision_bits: result_precision,
        }
    }

    /// Add two BigFloats, preserving max precision
    pub fn add(&self, other: &Self) -> Self {
        self.binary_op(other, |a, b| a + b, |a, b| a + b)
    }

    /// Subtract two BigFloats, preserving max precision
    pub fn sub(&self, other: &Self) -> Self {
        self.binary_op(other, |a, b| a - b, |a, b| a - b)
    }

    /// Multiply two BigFloats, preserving max precision
    pub fn mul(&self, other: &Self) -> Self {
        self.binary_op(other, |a, b| a * b, |a, b| a * b)
    }

    /// Divide two BigFloats, preserving max precision
    pub fn div(&self, other: &Self) -> Self {
        self.binary_op(other, |a, b| a / b, |a, b| a / b)
    }

    pub fn mul_i64(&self, factor: i64) -> Self {
        self.mul(&Self::with_precision(factor as f64, self.precision_bits))
    }

    pub fn sqrt(&self) -> Self {
        let value = match &self.value {
            BigFloatValue::F64(v) if self.precision_bits <= 64 => BigFloatValue::F64(v.sqrt()),
            _ => BigFloatValue::Arbitrary(self.to_fbig(self.precision_bits).sqrt()),
        };

        Self {
            value,
            precision_bits: self.precision_bits,
        }
    }

    pub fn abs(&self) -> Self {
        let value = match &self.value {
            BigFloatValue::F64(v) => BigFloatValue::F64(v.abs()),
            BigFloatValue::Arbitrary(v) => BigFloatValue::Arbitrary(v.clone().abs()),
        };
        Self {
            value,
            precision_bits: self.precision_bits,
        }
    }

    pub fn neg(&self) -> Self {
        let value = match &self.value {
            BigFloatValue::F64(v) => BigFloatValue::F64(-v),
            BigFloatValue::Arbitrary(v) => BigFloatValue::Arbitrary(-v.clone()),
        };
        Self {
            value,
            precision_bits: self.precision_bits,
        }
    }

    pub fn is_zero(&self) -> bool {
        match &self.value {
            BigFloatValue::F64(v) => *v == 0.0,
            BigFloatValue::Arbitrary(v) => *v == FBig::<dashu_float::round::mode::Zero>::ZERO,
        }
    }

    pub fn is_negative(&self) -> bool {
        match &self.value {
            BigFloatValue::F64(v) => *v < 0.0,
            BigFloatValue::Arbitrary(v) => *v < FBig::<dashu_float::round::mode::Zero>::ZERO,
        }
    }

    /// Approximate log2 of the magnitude, valid far outside the f64 exponent range.
    ///
    /// Returns negative infinity for zero.
    pub fn log2_approx(&self) -> f64 {
        match &self.value {
            BigFloatValue::F64(v) => v.abs().log2(),
            BigFloatValue::Arbitrary(v) => {
                if *v == FBig::<dashu_float::round::mode::Zero>::ZERO {
                    f64::NEG_INFINITY
                } else {
                    v.log2_est() as f64
                }
            }
        }
    }

    fn to_fbig(&self, precision_bits: usize) -> FBig {
        match &self.value {
            BigFloatValue::F64(v) => fbig_from_f64(*v, precision_bits.max(64)),
            BigFloatValue::Arbitrary(v) => v.clone(),
        }
    }
}

impl PartialEq for BigFloat {
    fn eq(&self, other: &Self) -> bool {
        match (&self.value, &other.value) {
            (BigFloatValue::F64(a), BigFloatValue::F64(b)) => a == b,
            _ => {
                let precision = self.precision_bits.max(other.precision_bits);
                self.to_fbig(precision) == other.to_fbig(precision)
            }
        }
    }
}

impl PartialOrd for BigFloat {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        match (&self.value, &other.value) {
            (BigFloatValue::F64(a), BigFloatValue::F64(b)) => a.partial_cmp(b),
            _ => {
                let precision = self.precision_bits.max(other.precision_bits);
                self.to_fbig(precision)
                    .partial_cmp(&other.to_fbig(precision))
            }
        }
    }
}

impl std::fmt::Display for BigFloat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.value {
            BigFloatValue::F64(v) => write!(f, "{}", v),
            BigFloatValue::Arbitrary(v) => write!(f, "{}", v),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct BigFloatSerde {
    value: String,
    precision_bits: usize,
}

impl Serialize for BigFloat {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let value = match &self.value {
            BigFloatValue::F64(v) => v.to_string(),
            BigFloatValue::Arbitrary(v) => v.to_string(),
        };

        BigFloatSerde {
            value,
            precision_bits: self.precision_bits,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for BigFloat {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let serde = BigFloatSerde::deserialize(deserializer)?;

        let value = if serde.precision_bits <= 64 {
            let f = serde
                .value
                .parse::<f64>()
                .map_err(|e| serde::de::Error::custom(format!("Failed to parse f64: {}", e)))?;
            BigFloatValue::F64(f)
        } else {
            let fbig = serde
                .value
                .parse::<FBig>()
                .map_err(|e| serde::de::Error::custom(format!("Failed to parse FBig: {}", e)))?;
            BigFloatValue::Arbitrary(fbig)
        };

        Ok(BigFloat {
            value,
            precision_bits: serde.precision_bits,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abs_returns_positive_for_negative_value() {
        let neg = BigFloat::with_precision(-5.0, 64);
        assert_eq!(neg.abs().to_f64(), 5.0);
    }

    #[test]
    fn abs_works_with_arbitrary_precision() {
        let neg = BigFloat::from_string("-1e-500", 7000).unwrap();
        let pos = BigFloat::from_string("1e-500", 7000).unwrap();
        assert_eq!(neg.abs(), pos);
    }

    #[test]
    fn neg_flips_sign_in_both_representations() {
        assert_eq!(BigFloat::with_precision(2.5, 64).neg().to_f64(), -2.5);
        let big = BigFloat::with_precision(2.5, 256).neg();
        assert!(big.is_negative());
        assert_eq!(big.to_f64(), -2.5);
    }

    #[test]
    fn log2_approx_handles_values_below_f64_range() {
        let tiny = BigFloat::from_string("1e-500", 4096).unwrap();
        let estimate = tiny.log2_approx();
        // 1e-500 is about 2^-1661
        assert!((estimate + 1661.0).abs() < 4.0, "got {}", estimate);
    }

    #[test]
    fn log2_approx_of_zero_is_negative_infinity() {
        assert_eq!(BigFloat::zero(64).log2_approx(), f64::NEG_INFINITY);
        assert_eq!(BigFloat::zero(256).log2_approx(), f64::NEG_INFINITY);
    }

    #[test]
    fn mixed_precision_arithmetic_promotes() {
        let a = BigFloat::with_precision(1.5, 64);
        let b = BigFloat::with_precision(0.25, 256);
        let sum = a.add(&b);
        assert_eq!(sum.precision_bits(), 256);
        assert_eq!(sum.to_f64(), 1.75);
    }

    #[test]
    fn non_finite_input_becomes_zero_at_high_precision() {
        let v = BigFloat::with_precision(f64::NAN, 128);
        assert!(v.is_zero());
    }
}
