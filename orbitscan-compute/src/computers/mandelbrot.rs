use super::{param, OrbitCalculator, OrbitState};
use orbitscan_core::{BailoutKind, OrbitComplex, SymmetryClass};

/// `z² + c` over the pixel `c`.
///
/// Parameters 0 and 1 perturb the starting value. The orbit is seeded one
/// step in, at `c + perturbation`, so iteration counts start from the
/// first non-trivial iterate.
#[derive(Clone, Debug)]
pub struct Mandelbrot<C> {
    perturbation: Option<C>,
}

impl<C> Default for Mandelbrot<C> {
    fn default() -> Self {
        Self { perturbation: None }
    }
}

impl<C: OrbitComplex> OrbitCalculator<C> for Mandelbrot<C> {
    fn default_symmetry(&self) -> SymmetryClass {
        SymmetryClass::XAxisNoParam
    }

    fn default_bailout(&self) -> BailoutKind {
        BailoutKind::Modulus
    }

    fn mandelbrot_family(&self) -> bool {
        true
    }

    fn per_image(&mut self, params: &[f64], scale: &C::Scale) -> bool {
        let (re, im) = (param(params, 0), param(params, 1));
        if !re.is_finite() || !im.is_finite() {
            return false;
        }
        self.perturbation = (re != 0.0 || im != 0.0).then(|| C::from_f64_pair(re, im, scale));
        true
    }

    fn per_pixel(&self, pixel: C) -> OrbitState<C> {
        let old = match &self.perturbation {
            Some(p) => pixel.add(p),
            None => pixel.clone(),
        };
        OrbitState {
            new: old.clone(),
            old,
            constant: pixel,
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
    use orbitscan_core::{F64Complex, FixedComplex};

    #[test]
    fn first_step_squares_the_seed() {
        let mut calc = Mandelbrot::<F64Complex>::default();
        assert!(calc.per_image(&[0.0, 0.0], &()));
        let mut state = calc.per_pixel(F64Complex::new(-1.0, 0.0));
        assert_eq!(state.old.to_f64_pair(), (-1.0, 0.0));
        calc.orbit_step(&mut state);
        assert_eq!(state.new.to_f64_pair(), (0.0, 0.0));
    }

    #[test]
    fn perturbation_offsets_the_seed() {
        let mut calc = Mandelbrot::<FixedComplex>::default();
        assert!(calc.per_image(&[0.5, 0.25], &40));
        let pixel = FixedComplex::from_f64_pair(0.25, 0.0, &40);
        let state = calc.per_pixel(pixel);
        assert_eq!(state.old.to_f64_pair(), (0.75, 0.25));
        assert_eq!(state.constant.to_f64_pair(), (0.25, 0.0));
    }

    #[test]
    fn non_finite_parameters_are_rejected() {
        let mut calc = Mandelbrot::<F64Complex>::default();
        assert!(!calc.per_image(&[f64::NAN], &()));
    }
}
