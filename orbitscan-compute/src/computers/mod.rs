//! Orbit calculators and the registry that maps fractal types to them.

pub mod julia;
pub mod lambda_sine;
pub mod mandelbrot;

pub use julia::Julia;
pub use lambda_sine::LambdaSine;
pub use mandelbrot::Mandelbrot;

use orbitscan_core::{
    BailoutKind, BigFloatComplex, ContextScratch, F64Complex, FixedComplex, FractalType,
    NumericMode, OrbitComplex, SymmetryClass,
};

/// Orbit of the pixel being iterated.
///
/// A step reads `old` and writes `new`; the engine copies `new` back into
/// `old` once it has looked at the iterate.
#[derive(Clone, Debug)]
pub struct OrbitState<C> {
    pub old: C,
    pub new: C,
    /// Value added every step (the pixel for Mandelbrot, the parameter for Julia).
    pub constant: C,
}

/// One fractal formula in one numeric backend.
pub trait OrbitCalculator<C: OrbitComplex> {
    fn default_symmetry(&self) -> SymmetryClass;

    fn default_bailout(&self) -> BailoutKind;

    /// Formulas of the `z² + c` over `c` kind, whose derivative gains a
    /// constant term.
    fn mandelbrot_family(&self) -> bool {
        false
    }

    /// Julia-type formulas can look for a finite attractor of the critical orbit.
    fn finds_attractors(&self) -> bool {
        false
    }

    /// Prepare for an image. Returns false when the parameters are unusable.
    fn per_image(&mut self, params: &[f64], scale: &C::Scale) -> bool;

    /// Seed the orbit for the point `pixel`.
    fn per_pixel(&self, pixel: C) -> OrbitState<C>;

    /// Advance the orbit one step. Returns true when the formula's own
    /// escape test fired before the configured bailout had a say.
    fn orbit_step(&self, state: &mut OrbitState<C>) -> bool;
}

/// Parameter `index`, zero when absent.
pub(crate) fn param(params: &[f64], index: usize) -> f64 {
    params.get(index).copied().unwrap_or(0.0)
}

/// A numeric backend the engine can be instantiated with.
pub trait Backend: OrbitComplex + 'static {
    const MODE: NumericMode;

    fn scale(scratch: &ContextScratch) -> Self::Scale;

    /// Calculator for `fractal` in this backend, `None` when the formula
    /// has no implementation here.
    fn calculator(fractal: FractalType) -> Option<Box<dyn OrbitCalculator<Self>>>;
}

impl Backend for F64Complex {
    const MODE: NumericMode = NumericMode::Native;

    fn scale(_scratch: &ContextScratch) -> Self::Scale {}

    fn calculator(fractal: FractalType) -> Option<Box<dyn OrbitCalculator<Self>>> {
        Some(match fractal {
            FractalType::Mandelbrot => Box::new(Mandelbrot::<Self>::default()),
            FractalType::Julia => Box::new(Julia::<Self>::default()),
            FractalType::LambdaSine => Box::new(LambdaSine::default()),
        })
    }
}

impl Backend for FixedComplex {
    const MODE: NumericMode = NumericMode::FixedPoint;

    fn scale(scratch: &ContextScratch) -> Self::Scale {
        scratch.bit_shift
    }

    fn calculator(fractal: FractalType) -> Option<Box<dyn OrbitCalculator<Self>>> {
        match fractal {
            FractalType::Mandelbrot => Some(Box::new(Mandelbrot::<Self>::default())),
            FractalType::Julia => Some(Box::new(Julia::<Self>::default())),
            FractalType::LambdaSine => None,
        }
    }
}

impl Backend for BigFloatComplex {
    const MODE: NumericMode = NumericMode::Arbitrary;

    fn scale(scratch: &ContextScratch) -> Self::Scale {
        scratch.precision_bits
    }

    fn calculator(fractal: FractalType) -> Option<Box<dyn OrbitCalculator<Self>>> {
        match fractal {
            FractalType::Mandelbrot => Some(Box::new(Mandelbrot::<Self>::default())),
            FractalType::Julia => Some(Box::new(Julia::<Self>::default())),
            FractalType::LambdaSine => None,
        }
    }
}

/// Whether `fractal` has a calculator in the resolved backend `mode`.
pub fn supports(fractal: FractalType, mode: NumericMode) -> bool {
    match mode {
        NumericMode::Auto | NumericMode::Native => true,
        NumericMode::FixedPoint => FixedComplex::calculator(fractal).is_some(),
        NumericMode::Arbitrary => BigFloatComplex::calculator(fractal).is_some(),
    }
}
