//! Per-image calculation context.
//!
//! Everything the engine reads while scanning is derived here once, in the
//! active numeric backend, and stays read-only until the image is done.

use crate::computers::{Backend, OrbitCalculator, OrbitState};
use crate::engine::bailout;
use crate::engine::coloring::Coloring;
use crate::engine::distance::DistanceEstimator;
use crate::engine::periodicity::PeriodicitySchedule;
use orbitscan_core::{
    Attractor, BailoutKind, CalcConfig, ContextScratch, FiniteAttractor, FractalType,
    ImageRequest, InsideColoring, Inversion, OrbitComplex, OutsideColoring,
};

/// Star-trail pixels always stop after this many steps.
pub const STAR_TRAIL_ITERATIONS: u32 = 16;

/// The attractor search runs at least this many steps.
const ATTRACTOR_SEARCH_ITERATIONS: u32 = 500;

/// Longest attractor cycle the search looks for.
const ATTRACTOR_MAX_PERIOD: u32 = 10;

/// Pixel centres in the active backend.
///
/// One column adds `col_step`, one row adds `row_step`, both measured from
/// the top-left pixel.
#[derive(Clone, Debug)]
struct PixelGrid<C> {
    origin: C,
    col_step: C,
    row_step: C,
}

impl<C: OrbitComplex> PixelGrid<C> {
    fn point(&self, col: i32, row: i32) -> C {
        self.origin
            .add(&self.col_step.mul_int(col as i64))
            .add(&self.row_step.mul_int(row as i64))
    }
}

pub struct CalculationContext<C: OrbitComplex> {
    pub fractal: FractalType,
    pub x_dots: u32,
    pub y_dots: u32,
    pub scale: C::Scale,
    pub scratch: ContextScratch,
    pub max_iterations: u32,
    pub bailout: BailoutKind,
    /// Modulus limit after potential and distance estimator adjustments.
    pub magnitude_limit: f64,
    pub periodicity: PeriodicitySchedule,
    pub distance: Option<DistanceEstimator>,
    pub coloring: Coloring,
    pub attractors: Vec<Attractor>,
    pub attractor_radius: f64,
    pub attractor_phase: bool,
    pub inside: InsideColoring,
    pub proximity: f64,
    pub track_total_distance: bool,
    /// Palette mask, used to index the star-trail table.
    pub and_color: u32,
    inversion: Option<Inversion>,
    grid: PixelGrid<C>,
}

impl<C: Backend> CalculationContext<C> {
    /// Build the context for `request`. The calculator must already have
    /// run its per-image hook.
    pub fn new(
        request: &ImageRequest,
        scratch: ContextScratch,
        calculator: &dyn OrbitCalculator<C>,
    ) -> Self {
        let config = Self::effective_config(&request.config);
        let view = &request.view;
        let scale = C::scale(&scratch);
        let magnitude_limit = scratch.magnitude_limit;

        let steps = view.steps();
        let grid = PixelGrid {
            origin: C::from_bigfloat_pair(&view.x_min, &view.y_max, &scale),
            col_step: C::from_bigfloat_pair(&steps.del_x, &steps.del_y2.neg(), &scale),
            row_step: C::from_bigfloat_pair(&steps.del_x2, &steps.del_y.neg(), &scale),
        };

        let distance =
            DistanceEstimator::new(&config, view, magnitude_limit, calculator.mandelbrot_family());
        let mut context = Self {
            fractal: request.fractal,
            x_dots: view.x_dots,
            y_dots: view.y_dots,
            scale,
            scratch,
            max_iterations: config.max_iterations,
            bailout: config
                .bailout_kind
                .unwrap_or_else(|| calculator.default_bailout()),
            magnitude_limit,
            periodicity: PeriodicitySchedule::new(&config, view.min_pixel_delta()),
            distance,
            coloring: Coloring::new(&config, distance, magnitude_limit),
            attractors: config.attractors.clone(),
            attractor_radius: config.attractor_radius,
            attractor_phase: config.finite_attractor == FiniteAttractor::Phase,
            inside: config.inside,
            proximity: config.proximity.abs(),
            track_total_distance: config.outside == OutsideColoring::TotalDistance,
            and_color: config.colors.saturating_sub(1).max(1),
            inversion: config.inversion,
            grid,
        };

        if context.attractors.is_empty()
            && config.finite_attractor != FiniteAttractor::Off
            && calculator.finds_attractors()
        {
            if let Some(attractor) = context.locate_attractor(calculator) {
                log::debug!(
                    "finite attractor at ({}, {}) with period {}",
                    attractor.re,
                    attractor.im,
                    attractor.period
                );
                context.attractors.push(attractor);
                context.periodicity = context.periodicity.without_checking();
            }
        }
        context
    }

    /// Star-trail coloring only ever looks at the first sixteen steps.
    fn effective_config(config: &CalcConfig) -> CalcConfig {
        let mut config = config.clone();
        if config.inside == InsideColoring::StarTrail {
            config.max_iterations = STAR_TRAIL_ITERATIONS;
        }
        config
    }
}

impl<C: OrbitComplex> CalculationContext<C> {
    /// Complex-plane point of a pixel, after inversion.
    pub fn pixel(&self, col: i32, row: i32) -> C {
        let point = self.grid.point(col, row);
        match &self.inversion {
            Some(inversion) => {
                let (re, im) = point.to_f64_pair();
                let (re, im) = inversion.apply(re, im);
                C::from_f64_pair(re, im, &self.scale)
            }
            None => point,
        }
    }

    /// Configured bailout test, with fixed-point overflow counted as an escape.
    #[inline]
    pub fn bailed_out(&self, z: &C) -> bool {
        if z.overflowed() {
            return true;
        }
        let (re, im) = z.to_f64_pair();
        bailout::escaped(self.bailout, re, im, self.magnitude_limit)
    }

    /// One orbit step through the calculator and the bailout test.
    #[inline]
    pub fn step(&self, calculator: &dyn OrbitCalculator<C>, state: &mut OrbitState<C>) -> bool {
        calculator.orbit_step(state) || self.bailed_out(&state.new)
    }

    /// Follow the critical orbit and return the cycle it settles into.
    fn locate_attractor(&self, calculator: &dyn OrbitCalculator<C>) -> Option<Attractor> {
        let zero = C::from_f64_pair(0.0, 0.0, &self.scale);
        let mut state = calculator.per_pixel(zero);
        let budget = self.max_iterations.max(ATTRACTOR_SEARCH_ITERATIONS);
        for _ in 1..budget {
            if self.step(calculator, &mut state) {
                return None;
            }
            state.old = state.new.clone();
        }

        let settled = state.new.clone();
        let tolerance = self.periodicity.close_enough();
        for period in 1..=ATTRACTOR_MAX_PERIOD {
            if self.step(calculator, &mut state) {
                return None;
            }
            if settled.approx_eq(&state.new, tolerance) {
                let (re, im) = state.new.to_f64_pair();
                return Some(Attractor { re, im, period });
            }
            state.old = state.new.clone();
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbitscan_core::{F64Complex, FixedComplex, NumericMode, View};

    fn scratch(mode: NumericMode) -> ContextScratch {
        ContextScratch {
            numeric_mode: mode,
            bit_shift: 40,
            precision_bits: 128,
            magnitude_limit: 4.0,
        }
    }

    fn request(fractal: FractalType, config: CalcConfig) -> ImageRequest {
        let view = View::from_f64(-2.0, 2.0, -1.5, 1.5, (65, 49), 64);
        ImageRequest::new(fractal, view, config)
    }

    fn context<C: Backend>(request: &ImageRequest, mode: NumericMode) -> CalculationContext<C> {
        let mut calculator = C::calculator(request.fractal).unwrap();
        let scratch = scratch(mode);
        assert!(calculator.per_image(&request.params, &C::scale(&scratch)));
        CalculationContext::new(request, scratch, calculator.as_ref())
    }

    #[test]
    fn grid_maps_corners() {
        let request = request(FractalType::Mandelbrot, CalcConfig::default());
        let ctx = context::<F64Complex>(&request, NumericMode::Native);
        assert_eq!(ctx.pixel(0, 0).to_f64_pair(), (-2.0, 1.5));
        assert_eq!(ctx.pixel(64, 48).to_f64_pair(), (2.0, -1.5));
        assert_eq!(ctx.pixel(32, 24).to_f64_pair(), (0.0, 0.0));
    }

    #[test]
    fn fixed_point_grid_matches_native() {
        let request = request(FractalType::Mandelbrot, CalcConfig::default());
        let fixed = context::<FixedComplex>(&request, NumericMode::FixedPoint);
        let (re, im) = fixed.pixel(10, 7).to_f64_pair();
        assert!((re - (-2.0 + 10.0 / 16.0)).abs() < 1e-9);
        assert!((im - (1.5 - 7.0 / 16.0)).abs() < 1e-9);
    }

    #[test]
    fn bailout_defaults_to_calculator() {
        let ctx = context::<F64Complex>(
            &request(FractalType::LambdaSine, CalcConfig::default()),
            NumericMode::Native,
        );
        assert_eq!(ctx.bailout, BailoutKind::Imag);

        let config = CalcConfig {
            bailout_kind: Some(BailoutKind::Or),
            ..CalcConfig::default()
        };
        let ctx = context::<F64Complex>(&request(FractalType::LambdaSine, config), NumericMode::Native);
        assert_eq!(ctx.bailout, BailoutKind::Or);
    }

    #[test]
    fn star_trail_caps_iterations() {
        let config = CalcConfig {
            inside: InsideColoring::StarTrail,
            max_iterations: 1000,
            ..CalcConfig::default()
        };
        let ctx = context::<F64Complex>(&request(FractalType::Mandelbrot, config), NumericMode::Native);
        assert_eq!(ctx.max_iterations, STAR_TRAIL_ITERATIONS);
    }

    #[test]
    fn julia_attractor_is_found_for_basin() {
        // c = -0.1 has an attracting fixed point near -0.0916.
        let config = CalcConfig {
            finite_attractor: FiniteAttractor::On,
            ..CalcConfig::default()
        };
        let request = request(FractalType::Julia, config).with_params(&[-0.1, 0.0]);
        let ctx = context::<F64Complex>(&request, NumericMode::Native);
        assert_eq!(ctx.attractors.len(), 1);
        assert_eq!(ctx.attractors[0].period, 1);
        assert!((ctx.attractors[0].re + 0.0916).abs() < 1e-3);
        assert!(!ctx.periodicity.is_enabled());
    }

    #[test]
    fn no_attractor_search_when_off() {
        let request = request(FractalType::Julia, CalcConfig::default()).with_params(&[-0.1, 0.0]);
        let ctx = context::<F64Complex>(&request, NumericMode::Native);
        assert!(ctx.attractors.is_empty());
        assert!(ctx.periodicity.is_enabled());
    }
}
