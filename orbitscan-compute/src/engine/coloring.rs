//! Turns a finished orbit into a color index.
//!
//! Escaped pixels go through the distance estimator, fixed outside color,
//! decomposition, biomorph and outside stages in that order; the first
//! stage that applies picks the color. A fixed outside color therefore
//! wins over decomposition and biomorph unless the orbit was attracted. Inside pixels only see the inside stage.
//! Continuous potential, when enabled, overrides everything. The result
//! is finally folded into the palette.

use super::distance::DistanceEstimator;
use orbitscan_core::{
    CalcConfig, EpsilonHit, InsideColoring, OrbitResult, Outcome, OutsideColoring, PotentialParams,
};
use std::f64::consts::PI;

const SIN45: f64 = 0.707_106_781_186_547_5;
const COS45: f64 = SIN45;
const COS22_5: f64 = 0.923_879_532_511_286_7;
const SIN22_5: f64 = 0.382_683_432_365_089_8;
const COS11_25: f64 = 0.980_785_280_403_230_4;
const SIN11_25: f64 = 0.195_090_322_016_128_2;
const COS5_625: f64 = 0.995_184_726_672_196_9;
const SIN5_625: f64 = 0.098_017_140_329_560_6;
const TAN22_5: f64 = 0.414_213_562_373_095;
const TAN11_25: f64 = 0.198_912_367_379_658;
const TAN5_625: f64 = 0.098_491_403_357_164_25;
const TAN2_8125: f64 = 0.049_126_849_769_467_25;
const TAN1_4063: f64 = 0.024_548_622_108_925_44;

/// Epsilon-cross colors for orbits that passed near an axis.
const NEAR_IMAGINARY_AXIS_COLOR: i64 = 2;
const NEAR_REAL_AXIS_COLOR: i64 = 6;

/// Color of caught cycles when periodicity is negative.
const CYCLE_COLOR: i64 = 7;

/// Slope difference under which two star-trail iterates count as aligned.
const STAR_TRAIL_TOLERANCE: f64 = 0.05;

type Stage = fn(&Coloring, &OrbitResult) -> Option<i64>;

/// Escaped-pixel stages, in priority order.
const ESCAPED_STAGES: [Stage; 5] = [
    Coloring::distance_stage,
    Coloring::fixed_outside_stage,
    Coloring::decomposition_stage,
    Coloring::biomorph_stage,
    Coloring::outside_stage,
];

/// Per-image coloring settings.
#[derive(Clone, Debug, PartialEq)]
pub struct Coloring {
    max_iterations: u32,
    inside: InsideColoring,
    outside: OutsideColoring,
    decomposition: u32,
    biomorph: Option<u32>,
    colors: u32,
    atan_colors: u32,
    potential: Option<PotentialParams>,
    show_cycles: bool,
    distance: Option<DistanceEstimator>,
    /// Square root of the modulus limit, the biomorph threshold.
    limit_root: f64,
}

impl Coloring {
    pub fn new(config: &CalcConfig, distance: Option<DistanceEstimator>, magnitude_limit: f64) -> Self {
        Self {
            max_iterations: config.max_iterations,
            inside: config.inside,
            outside: config.outside,
            decomposition: config.decomposition,
            biomorph: config.biomorph,
            colors: config.colors,
            atan_colors: config.atan_colors,
            potential: config.potential,
            show_cycles: config.periodicity < 0,
            distance,
            limit_root: magnitude_limit.sqrt(),
        }
    }

    pub fn color(&self, result: &OrbitResult) -> u32 {
        let raw = self
            .potential_stage(result)
            .or_else(|| {
                if self.is_inside(result) {
                    Some(self.inside_color(result))
                } else {
                    ESCAPED_STAGES.iter().find_map(|stage| stage(self, result))
                }
            })
            .unwrap_or(result.iterations as i64);
        self.fold(raw)
    }

    /// Attracted pixels count as inside unless the inside mode is plain
    /// iteration count.
    fn is_inside(&self, result: &OrbitResult) -> bool {
        match result.outcome {
            Outcome::Attracted { .. } => self.inside != InsideColoring::MaxIter,
            outcome => outcome.is_inside(),
        }
    }

    fn is_attracted(result: &OrbitResult) -> bool {
        matches!(result.outcome, Outcome::Attracted { .. })
    }

    fn potential_stage(&self, result: &OrbitResult) -> Option<i64> {
        let params = self.potential?;
        if result.epsilon_hit != EpsilonHit::None {
            return None;
        }
        let value = if result.outcome == Outcome::Escaped || Self::is_attracted(result) {
            let magnitude = result.magnitude();
            let mut pot = if magnitude <= 1.0 {
                0.0
            } else {
                magnitude.ln() / (result.iterations as f64 + 2.0).exp2()
            };
            if pot < f64::from(f32::MIN_POSITIVE) {
                pot = 0.0;
            }
            let value = if pot > 0.0 {
                params.level - pot.sqrt() * params.slope - 1.0
            } else {
                params.level - 1.0
            };
            value.max(1.0)
        } else if let InsideColoring::Fixed(color) = self.inside {
            color as f64
        } else {
            params.level
        };
        Some((value as i64).min(self.colors as i64 - 1))
    }

    fn inside_color(&self, result: &OrbitResult) -> i64 {
        let max = self.max_iterations as i64;
        if self.show_cycles && matches!(result.outcome, Outcome::Periodic { .. }) {
            return CYCLE_COLOR;
        }
        let (re, im) = result.final_z;
        match self.inside {
            InsideColoring::MaxIter => max,
            InsideColoring::Fixed(color) => color as i64,
            InsideColoring::StarTrail => {
                let first = result.star_trail.first().copied().unwrap_or(0.0);
                result
                    .star_trail
                    .iter()
                    .enumerate()
                    .skip(1)
                    .find(|(_, slope)| (first - **slope).abs() < STAR_TRAIL_TOLERANCE)
                    .map_or(0, |(i, _)| i as i64)
            }
            InsideColoring::Period => match result.outcome {
                Outcome::Periodic { cycle_len } if cycle_len > 0 => cycle_len as i64,
                _ => max,
            },
            InsideColoring::EpsilonCross => match result.epsilon_hit {
                EpsilonHit::NearImaginaryAxis => NEAR_IMAGINARY_AXIS_COLOR,
                EpsilonHit::NearRealAxis => NEAR_REAL_AXIS_COLOR,
                EpsilonHit::None => max,
            },
            InsideColoring::Atan => (im.atan2(re) * self.atan_colors as f64 / PI).abs() as i64,
            InsideColoring::BeautyOfFractals60 => (result.min_orbit.sqrt() * 75.0) as i64,
            InsideColoring::BeautyOfFractals61 => result.min_index as i64,
            InsideColoring::ZMagnitude => {
                (result.magnitude() * (self.max_iterations / 2) as f64 + 1.0) as i64
            }
        }
    }

    fn distance_stage(&self, result: &OrbitResult) -> Option<i64> {
        let dem = self.distance?;
        let dist = DistanceEstimator::distance(result.final_z, result.derivative, result.overflowed);
        if dist < dem.delta {
            return Some(if dem.test > 0 {
                self.inside_color(result)
            } else {
                -(dem.test as i64)
            });
        }
        if self.colors == 2 {
            return Some(i64::from(self.inside == InsideColoring::Fixed(0)));
        }
        if dem.test > 1 {
            return Some((dist / dem.width + 1.0) as i64 & i64::MAX);
        }
        None
    }

    fn fixed_outside_stage(&self, result: &OrbitResult) -> Option<i64> {
        match self.outside {
            OutsideColoring::Fixed(color) if !Self::is_attracted(result) => Some(color as i64),
            _ => None,
        }
    }

    fn decomposition_stage(&self, result: &OrbitResult) -> Option<i64> {
        (self.decomposition > 0).then(|| self.decompose(result.final_z))
    }

    fn biomorph_stage(&self, result: &OrbitResult) -> Option<i64> {
        let color = self.biomorph?;
        let (re, im) = result.final_z;
        (re.abs() < self.limit_root || im.abs() < self.limit_root).then_some(color as i64)
    }

    fn outside_stage(&self, result: &OrbitResult) -> Option<i64> {
        let iter = result.iterations.max(1) as i64;
        let (re, im) = result.final_z;
        let color = match self.outside {
            OutsideColoring::Iteration => return Some(iter),
            // Only attracted orbits get this far with a fixed color.
            OutsideColoring::Fixed(_) => return Some(iter),
            OutsideColoring::Real => iter + re as i64 + 7,
            OutsideColoring::Imag => iter + im as i64 + 7,
            OutsideColoring::Mult if im != 0.0 => (iter as f64 * (re / im)) as i64,
            OutsideColoring::Mult => iter,
            OutsideColoring::Sum => iter + (re + im) as i64,
            OutsideColoring::Atan => (im.atan2(re) * self.atan_colors as f64 / PI).abs() as i64,
            OutsideColoring::TotalDistance => result.total_distance as i64,
        };
        Some(if color <= 0 || color > self.max_iterations as i64 {
            1
        } else {
            color
        })
    }

    /// Binary decomposition of the final iterate's angle.
    fn decompose(&self, z: (f64, f64)) -> i64 {
        let (mut x, mut y) = z;
        let mut temp: u32 = 0;
        if y < 0.0 {
            temp = 2;
            y = -y;
        }
        if x < 0.0 {
            temp += 1;
            x = -x;
        }
        if self.decomposition == 2 {
            // Upper or lower half plane.
            let color = i64::from(temp & 2 != 0);
            return color + i64::from(self.colors == 2) + i64::from(self.colors > 2);
        }

        if self.decomposition >= 8 {
            temp <<= 1;
            if x < y {
                temp += 1;
                std::mem::swap(&mut x, &mut y);
            }
            let rotations = [
                (16, TAN22_5, COS45, SIN45),
                (32, TAN11_25, COS22_5, SIN22_5),
                (64, TAN5_625, COS11_25, SIN11_25),
                (128, TAN2_8125, COS5_625, SIN5_625),
            ];
            for (bands, tan, cos, sin) in rotations {
                if self.decomposition < bands {
                    break;
                }
                temp <<= 1;
                if x * tan < y {
                    temp += 1;
                    let (ax, ay) = (x, y);
                    x = ax * cos + ay * sin;
                    y = ax * sin - ay * cos;
                }
            }
            if self.decomposition == 256 {
                temp <<= 1;
                if x * TAN1_4063 < y {
                    temp += 1;
                }
            }
        }

        let mut color: i64 = 0;
        let mut i = 1;
        while temp > 0 {
            if temp & 1 != 0 {
                color = (1 << i) - 1 - color;
            }
            temp >>= 1;
            i += 1;
        }
        if self.colors > self.decomposition {
            color += 1;
        }
        color
    }

    /// Fold a raw color into `0..colors`.
    fn fold(&self, raw: i64) -> u32 {
        let colors = self.colors as i64;
        let and_color = colors - 1;
        let color = raw.abs();
        let folded = if color >= colors {
            if colors < 16 {
                color & and_color
            } else {
                (color - 1) % and_color + 1
            }
        } else {
            color
        };
        folded as u32
    }
}
