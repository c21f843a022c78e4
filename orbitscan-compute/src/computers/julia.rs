use super::{param, OrbitCalculator, OrbitState};
use orbitscan_core::{BailoutKind, OrbitComplex, SymmetryClass};

/// `z² + c` over the starting value, with `c` taken from parameters 0 and 1.
#[derive(Clone, Debug)]
pub struct Julia<C> {
    constant: Option<C>,
}

impl<C> Default for Julia<C> {
    fn default() -> Self {
        Self { constant: None }
    }
}

impl<C: OrbitComplex> OrbitCalculator<C> for Julia<C> {
    fn default_symmetry(&self) -> SymmetryClass {
        SymmetryClass::Origin
    }

    fn default_bailout(&self) -> BailoutKind {
        BailoutKind::Modulus
    }

    fn finds_attractors(&self) -> bool {
        true
    }

    fn per_image(&mut self, params: &[f64], scale: &C::Scale) -> bool {
        let (re, im) = (param(params, 0), param(params, 1));
        if !re.is_finite() || !im.is_finite() {
            return false;
        }
        self.constant = Some(C::from_f64_pair(re, im, scale));
        true
    }

    fn per_pixel(&self, pixel: C) -> OrbitState<C> {
        let constant = self.constant.clone().unwrap_or_else(|| pixel.zero());
        OrbitState {
            old: pixel.clone(),
            new: pixel,
            constant,
        }
    }

    #[inline]
    fn orbit_step(&self, state: &mut OrbitState<C>) -> bool {
        state.new = state.old.square().add(&state.constant);
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbitscan_core::{BigFloatComplex, F64Complex};

    #[test]
    fn pixel_seeds_the_orbit() {
        let mut calc = Julia::<F64Complex>::default();
        assert!(calc.per_image(&[-1.0, 0.0], &()));
        let mut state = calc.per_pixel(F64Complex::new(0.0, 0.0));
        calc.orbit_step(&mut state);
        assert_eq!(state.new.to_f64_pair(), (-1.0, 0.0));
    }

    #[test]
    fn bigfloat_step_matches_native() {
        let mut native = Julia::<F64Complex>::default();
        let mut big = Julia::<BigFloatComplex>::default();
        assert!(native.per_image(&[0.3, 0.6], &()));
        assert!(big.per_image(&[0.3, 0.6], &128));

        let mut a = native.per_pixel(F64Complex::new(0.5, -0.25));
        let mut b = big.per_pixel(BigFloatComplex::from_f64_pair(0.5, -0.25, &128));
        native.orbit_step(&mut a);
        big.orbit_step(&mut b);
        let (re, im) = b.new.to_f64_pair();
        assert!((re - a.new.re).abs() < 1e-15);
        assert!((im - a.new.im).abs() < 1e-15);
    }
}
