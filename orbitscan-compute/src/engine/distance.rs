//! Distance estimator (DEM) support.
//!
//! The engine carries the derivative of the orbit alongside the orbit
//! itself. After the loop the estimated distance to the set boundary
//! decides whether the pixel is drawn as boundary, as a distance band, or
//! with its regular color.

use orbitscan_core::{CalcConfig, View};

/// Modulus limit the estimator needs to get a usable distance.
pub const DEM_BAILOUT: f64 = 535.5;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DistanceEstimator {
    /// Sign picks inside coloring (positive) or a fixed color (negative) for
    /// boundary pixels; values above 1 band the outside by distance.
    pub test: i32,
    /// Squared boundary thickness.
    pub delta: f64,
    /// Distance per color band.
    pub width: f64,
    /// Derivative component magnitude past which the orbit stops.
    pub too_big: f64,
    /// Mandelbrot-family formulas add one to the real derivative each step.
    pub mandelbrot_family: bool,
}

impl DistanceEstimator {
    /// Raise the modulus limit when the estimator replaces outside colors.
    pub fn adjusted_limit(config: &CalcConfig, limit: f64) -> f64 {
        if config.distance_test != 0 && (config.distance_test != 1 || config.colors == 2) {
            limit.max(DEM_BAILOUT)
        } else {
            limit
        }
    }

    /// `None` when distance estimation is off.
    pub fn new(config: &CalcConfig, view: &View, limit: f64, mandelbrot_family: bool) -> Option<Self> {
        if config.distance_test == 0 {
            return None;
        }
        let steps = view.steps();
        let del_x = steps.del_x.to_f64();
        let del_y = steps.del_y.to_f64();
        let del_x2 = steps.del_x2.to_f64();
        let del_y2 = steps.del_y2.to_f64();

        let thickness = match config.distance_width {
            0 => 1.0,
            w => w as f64,
        };
        let thickness_factor = if thickness > 0.0 {
            thickness * thickness / 10000.0
        } else {
            1.0 / (thickness * thickness * 10000.0)
        };
        let delta = (del_x * del_x + del_y2 * del_y2).max(del_y * del_y + del_x2 * del_x2)
            * thickness_factor;

        let x_min = view.x_min.to_f64();
        let y_min = view.y_min.to_f64();
        let skew_x = view.x_3rd.to_f64() - x_min;
        let skew_y = view.y_3rd.to_f64() - y_min;
        let width = view.width().to_f64();
        let height = view.height().to_f64();
        let aspect = view.y_dots as f64 / view.x_dots as f64;
        let band_width = ((width * width + skew_x * skew_x).sqrt() * aspect
            + (height * height + skew_y * skew_y).sqrt())
            / config.distance_test as f64;

        let f = limit.max(DEM_BAILOUT) + 3.0;
        let too_big = f.abs() * f.ln().abs() * 2.0 / delta.sqrt();

        Some(Self {
            test: config.distance_test,
            delta,
            width: band_width,
            too_big,
            mandelbrot_family,
        })
    }

    /// Derivative after one more step, using the iterate before the step.
    #[inline]
    pub fn step(&self, old: (f64, f64), derivative: (f64, f64)) -> (f64, f64) {
        let (zx, zy) = old;
        let (dx, dy) = derivative;
        let re = 2.0 * (zx * dx - zy * dy);
        let im = 2.0 * (zy * dx + zx * dy);
        if self.mandelbrot_family {
            (re + 1.0, im)
        } else {
            (re, im)
        }
    }

    #[inline]
    pub fn is_too_big(&self, derivative: (f64, f64)) -> bool {
        derivative.0.abs().max(derivative.1.abs()) > self.too_big
    }

    /// Estimated squared distance to the boundary, 0 when unknown.
    pub fn distance(z: (f64, f64), derivative: (f64, f64), overflowed: bool) -> f64 {
        let magnitude = z.0 * z.0 + z.1 * z.1;
        if magnitude == 0.0 || overflowed {
            return 0.0;
        }
        let log = magnitude.ln();
        let dist = magnitude * log * log / (derivative.0 * derivative.0 + derivative.1 * derivative.1);
        if dist.is_nan() {
            0.0
        } else {
            dist
        }
    }
}
