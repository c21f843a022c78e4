use super::{param, OrbitCalculator, OrbitState};
use orbitscan_core::{BailoutKind, F64Complex, OrbitComplex, SymmetryClass};

/// Past this imaginary part `sin z` grows too fast to be worth iterating.
const SINE_ESCAPE: f64 = 64.0;

/// `λ · sin z` with `λ` from parameters 0 and 1. Native math only.
#[derive(Clone, Copy, Debug, Default)]
pub struct LambdaSine {
    lambda: F64Complex,
}

impl OrbitCalculator<F64Complex> for LambdaSine {
    fn default_symmetry(&self) -> SymmetryClass {
        SymmetryClass::Pi
    }

    fn default_bailout(&self) -> BailoutKind {
        BailoutKind::Imag
    }

    fn per_image(&mut self, params: &[f64], _scale: &()) -> bool {
        self.lambda = F64Complex::new(param(params, 0), param(params, 1));
        self.lambda.re.is_finite() && self.lambda.im.is_finite()
    }

    fn per_pixel(&self, pixel: F64Complex) -> OrbitState<F64Complex> {
        OrbitState {
            old: pixel,
            new: pixel,
            constant: self.lambda,
        }
    }

    fn orbit_step(&self, state: &mut OrbitState<F64Complex>) -> bool {
        let F64Complex { re, im } = state.old;
        if im.abs() >= SINE_ESCAPE {
            return true;
        }
        let sine = F64Complex::new(re.sin() * im.cosh(), re.cos() * im.sinh());
        state.new = state.constant.mul(&sine);
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sine_of_real_axis_stays_real() {
        let mut calc = LambdaSine::default();
        assert!(calc.per_image(&[1.0, 0.0], &()));
        let mut state = calc.per_pixel(F64Complex::new(std::f64::consts::FRAC_PI_2, 0.0));
        assert!(!calc.orbit_step(&mut state));
        assert!((state.new.re - 1.0).abs() < 1e-12);
        assert_eq!(state.new.im, 0.0);
    }

    #[test]
    fn large_imaginary_part_escapes() {
        let mut calc = LambdaSine::default();
        assert!(calc.per_image(&[1.0, 0.4], &()));
        let mut state = calc.per_pixel(F64Complex::new(0.0, 100.0));
        assert!(calc.orbit_step(&mut state));
    }
}
