use orbitscan_core::BailoutKind;

/// True when the iterate `(re, im)` has left the region bounded by `limit`.
///
/// Non-finite components always count as escaped.
#[inline]
pub fn escaped(kind: BailoutKind, re: f64, im: f64, limit: f64) -> bool {
    if !re.is_finite() || !im.is_finite() {
        return true;
    }
    let re2 = re * re;
    let im2 = im * im;
    match kind {
        BailoutKind::Modulus => re2 + im2 >= limit,
        BailoutKind::Real => re2 >= limit,
        BailoutKind::Imag => im2 >= limit,
        BailoutKind::Or => re2 >= limit || im2 >= limit,
        BailoutKind::And => re2 >= limit && im2 >= limit,
        BailoutKind::Manhattan => {
            let sum = re.abs() + im.abs();
            sum * sum >= limit
        }
        BailoutKind::ManhattanReal => {
            let sum = re + im;
            sum * sum >= limit
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modulus_compares_squared_magnitude() {
        assert!(!escaped(BailoutKind::Modulus, 1.0, 1.0, 4.0));
        assert!(escaped(BailoutKind::Modulus, 2.0, 0.0, 4.0));
    }

    #[test]
    fn single_component_tests() {
        assert!(escaped(BailoutKind::Real, 3.0, 0.0, 4.0));
        assert!(!escaped(BailoutKind::Real, 0.0, 3.0, 4.0));
        assert!(escaped(BailoutKind::Imag, 0.0, 3.0, 4.0));
        assert!(escaped(BailoutKind::Or, 0.0, 3.0, 4.0));
        assert!(!escaped(BailoutKind::And, 0.0, 3.0, 4.0));
        assert!(escaped(BailoutKind::And, 3.0, 3.0, 4.0));
    }

    #[test]
    fn manhattan_variants_differ_on_sign() {
        assert!(escaped(BailoutKind::Manhattan, 1.5, -1.5, 4.0));
        assert!(!escaped(BailoutKind::ManhattanReal, 1.5, -1.5, 4.0));
    }

    #[test]
    fn nan_counts_as_escaped() {
        assert!(escaped(BailoutKind::Modulus, f64::NAN, 0.0, 4.0));
        assert!(escaped(BailoutKind::And, f64::INFINITY, 0.0, 4.0));
    }
}
