//! Escape-time engine.
//!
//! Drives one pixel's orbit to completion and colors it. The loop is
//! written once over [`OrbitComplex`] and instantiated per backend.

pub mod bailout;
pub mod coloring;
pub mod distance;
pub mod periodicity;

use crate::cancellation::{CancellationChecker, Interrupted, PollCounter};
use crate::computers::OrbitCalculator;
use crate::context::{CalculationContext, STAR_TRAIL_ITERATIONS};
use orbitscan_core::{EpsilonHit, InsideColoring, OrbitComplex, OrbitResult, Outcome};

/// The engine asks the checker whether to stop every this many iterations.
pub const ITERATION_POLL_INTERVAL: u32 = 2048;

/// Star-trail iterates are clamped to this magnitude per component.
const STAR_TRAIL_MAX: f64 = f32::MAX as f64;

/// Starting value of the smallest-magnitude tracker.
const MIN_ORBIT_START: f64 = 100_000.0;

/// What the scan strategies see of the engine.
pub trait PixelEngine {
    /// Color of pixel `(col, row)`.
    ///
    /// `hint` is the periodicity hint carried along a raster row; `None`
    /// asks for a reset. It is updated for the next pixel.
    fn calculate(&mut self, col: i32, row: i32, hint: &mut Option<u32>) -> Result<u32, Interrupted>;

    /// Pixel-cadence cancellation poll, called before every pixel.
    fn should_stop(&mut self) -> bool;
}

pub struct Engine<'a, C: OrbitComplex, X: CancellationChecker> {
    context: &'a CalculationContext<C>,
    calculator: &'a dyn OrbitCalculator<C>,
    polls: PollCounter<X>,
}

impl<'a, C: OrbitComplex, X: CancellationChecker> Engine<'a, C, X> {
    pub fn new(
        context: &'a CalculationContext<C>,
        calculator: &'a dyn OrbitCalculator<C>,
        checker: X,
        poll_interval_pixels: u32,
    ) -> Self {
        Self {
            context,
            calculator,
            polls: PollCounter::new(checker, poll_interval_pixels),
        }
    }

    /// Run the orbit of pixel `(col, row)` to its end.
    pub fn iterate(&self, col: i32, row: i32, hint: Option<u32>) -> Result<OrbitResult, Interrupted> {
        let ctx = self.context;
        let max = ctx.max_iterations;
        let star_trail = ctx.inside == InsideColoring::StarTrail;
        let epsilon_cross = ctx.inside == InsideColoring::EpsilonCross;
        let min_orbit_tracked = matches!(
            ctx.inside,
            InsideColoring::BeautyOfFractals60 | InsideColoring::BeautyOfFractals61
        );

        let mut state = self.calculator.per_pixel(ctx.pixel(col, row));
        let mut periodicity = ctx.periodicity.start(hint, state.old.zero());
        let mut derivative = (1.0, 0.0);
        let mut last = state.old.to_f64_pair();
        let mut total_distance = 0.0;
        let mut min_orbit = MIN_ORBIT_START;
        let mut min_index = 0;
        let mut slopes = if star_trail {
            vec![0.0; STAR_TRAIL_ITERATIONS as usize]
        } else {
            Vec::new()
        };
        let mut epsilon_hit = EpsilonHit::None;
        let mut dem_boundary = false;
        let mut outcome = Outcome::MaxIterReached;
        let mut iter = 0;

        loop {
            iter += 1;
            if iter >= max {
                break;
            }
            if iter % ITERATION_POLL_INTERVAL == 0 && self.polls.checker().is_cancelled() {
                return Err(Interrupted);
            }

            if let Some(dem) = &ctx.distance {
                derivative = dem.step(state.old.to_f64_pair(), derivative);
                if dem.is_too_big(derivative) {
                    dem_boundary = true;
                    outcome = Outcome::Escaped;
                    break;
                }
                if ctx.step(self.calculator, &mut state) {
                    outcome = Outcome::Escaped;
                    break;
                }
            } else if (ctx.step(self.calculator, &mut state) && !star_trail) || state.new.overflowed() {
                outcome = Outcome::Escaped;
                break;
            }

            let z = state.new.to_f64_pair();
            if star_trail {
                if iter < STAR_TRAIL_ITERATIONS {
                    let clamped = (
                        z.0.clamp(-STAR_TRAIL_MAX, STAR_TRAIL_MAX),
                        z.1.clamp(-STAR_TRAIL_MAX, STAR_TRAIL_MAX),
                    );
                    if clamped != z {
                        state.new = C::from_f64_pair(clamped.0, clamped.1, &ctx.scale);
                    }
                    let slot = ((iter - 1) % ctx.and_color) as usize;
                    slopes[slot] = clamped.1 / (clamped.0 + 0.000001);
                }
            } else if epsilon_cross {
                if z.0.abs() < ctx.proximity {
                    epsilon_hit = EpsilonHit::NearImaginaryAxis;
                    break;
                }
                if z.1.abs() < ctx.proximity {
                    epsilon_hit = EpsilonHit::NearRealAxis;
                    break;
                }
            } else if min_orbit_tracked {
                let magnitude = z.0 * z.0 + z.1 * z.1;
                if magnitude < min_orbit {
                    min_orbit = magnitude;
                    min_index = iter + 1;
                }
            }

            if ctx.track_total_distance {
                total_distance += ((last.0 - z.0).powi(2) + (last.1 - z.1).powi(2)).sqrt();
                last = z;
            }

            if let Some(index) = self.attractor_hit(z) {
                if ctx.attractor_phase {
                    iter = iter % ctx.attractors[index].period.max(1) + 1;
                }
                outcome = Outcome::Attracted { index };
                break;
            }

            if let Some(cycle_len) = periodicity.observe(iter, &state.new) {
                outcome = Outcome::Periodic { cycle_len };
                iter = max;
                break;
            }

            state.old = state.new.clone();
        }

        let mut result = OrbitResult::new(outcome, iter, state.new.to_f64_pair());
        result.derivative = derivative;
        result.dem_boundary = dem_boundary;
        result.epsilon_hit = epsilon_hit;
        result.min_orbit = min_orbit;
        result.min_index = min_index;
        result.total_distance = total_distance;
        result.star_trail = slopes;
        result.overflowed = state.new.overflowed();
        Ok(result)
    }

    fn attractor_hit(&self, z: (f64, f64)) -> Option<usize> {
        let radius = self.context.attractor_radius;
        self.context.attractors.iter().position(|a| {
            let dx = (z.0 - a.re).powi(2);
            let dy = (z.1 - a.im).powi(2);
            dx < radius && dy < radius && dx + dy < radius
        })
    }
}

impl<C: OrbitComplex, X: CancellationChecker> PixelEngine for Engine<'_, C, X> {
    fn calculate(&mut self, col: i32, row: i32, hint: &mut Option<u32>) -> Result<u32, Interrupted> {
        let result = self.iterate(col, row, *hint)?;
        *hint = Some(self.context.periodicity.next_hint(result.iterations));
        Ok(self.context.coloring.color(&result))
    }

    fn should_stop(&mut self) -> bool {
        self.polls.should_stop()
    }
}
