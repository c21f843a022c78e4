use crate::BigFloat;
use serde::{Deserialize, Serialize};

/// Region of the complex plane mapped onto a screen of `x_dots` by `y_dots`
///
/// Defined by three corners so the image may be rotated or skewed:
/// - `(x_min, y_max)`: top-left pixel
/// - `(x_max, y_min)`: bottom-right pixel
/// - `(x_3rd, y_3rd)`: bottom-left pixel, equal to `(x_min, y_min)` when unskewed
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct View {
    pub x_min: BigFloat,
    pub x_max: BigFloat,
    pub y_min: BigFloat,
    pub y_max: BigFloat,
    pub x_3rd: BigFloat,
    pub y_3rd: BigFloat,
    pub x_dots: u32,
    pub y_dots: u32,
}

/// Per-pixel step vectors across the view.
///
/// Moving one column adds `(del_x, -del_y2)`, moving one row adds
/// `(del_x2, -del_y)`.
#[derive(Clone, Debug)]
pub struct PixelSteps {
    pub del_x: BigFloat,
    pub del_y: BigFloat,
    pub del_x2: BigFloat,
    pub del_y2: BigFloat,
}

impl View {
    /// Unskewed view from BigFloat corners.
    pub fn with_bigfloat(
        x_min: BigFloat,
        x_max: BigFloat,
        y_min: BigFloat,
        y_max: BigFloat,
        x_dots: u32,
        y_dots: u32,
    ) -> Self {
        Self {
            x_3rd: x_min.clone(),
            y_3rd: y_min.clone(),
            x_min,
            x_max,
            y_min,
            y_max,
            x_dots,
            y_dots,
        }
    }

    pub fn from_f64(
        x_min: f64,
        x_max: f64,
        y_min: f64,
        y_max: f64,
        dots: (u32, u32),
        precision_bits: usize,
    ) -> Self {
        Self::with_bigfloat(
            BigFloat::with_precision(x_min, precision_bits),
            BigFloat::with_precision(x_max, precision_bits),
            BigFloat::with_precision(y_min, precision_bits),
            BigFloat::with_precision(y_max, precision_bits),
            dots.0,
            dots.1,
        )
    }

    /// Create a view from string corners (for coordinates beyond f64 precision).
    pub fn from_strings(
        x_min: &str,
        x_max: &str,
        y_min: &str,
        y_max: &str,
        dots: (u32, u32),
        precision_bits: usize,
    ) -> Result<Self, String> {
        Ok(Self::with_bigfloat(
            BigFloat::from_string(x_min, precision_bits)?,
            BigFloat::from_string(x_max, precision_bits)?,
            BigFloat::from_string(y_min, precision_bits)?,
            BigFloat::from_string(y_max, precision_bits)?,
            dots.0,
            dots.1,
        ))
    }

    /// Move the bottom-left corner, skewing the view.
    pub fn with_third_corner(mut self, x_3rd: BigFloat, y_3rd: BigFloat) -> Self {
        self.x_3rd = x_3rd;
        self.y_3rd = y_3rd;
        self
    }

    pub fn precision_bits(&self) -> usize {
        self.x_min.precision_bits()
    }

    pub fn is_skewed(&self) -> bool {
        self.x_3rd != self.x_min || self.y_3rd != self.y_min
    }

    pub fn width(&self) -> BigFloat {
        self.x_max.sub(&self.x_min)
    }

    pub fn height(&self) -> BigFloat {
        self.y_max.sub(&self.y_min)
    }

    pub fn steps(&self) -> PixelSteps {
        let precision = self.precision_bits();
        let cols = BigFloat::with_precision(self.x_dots.saturating_sub(1).max(1) as f64, precision);
        let rows = BigFloat::with_precision(self.y_dots.saturating_sub(1).max(1) as f64, precision);
        PixelSteps {
            del_x: self.x_max.sub(&self.x_3rd).div(&cols),
            del_y: self.y_max.sub(&self.y_3rd).div(&rows),
            del_x2: self.x_3rd.sub(&self.x_min).div(&rows),
            del_y2: self.y_3rd.sub(&self.y_min).div(&cols),
        }
    }

    /// Smallest per-pixel step, the yardstick for periodicity tolerance.
    pub fn min_pixel_delta(&self) -> f64 {
        let steps = self.steps();
        steps.del_x.abs().to_f64().min(steps.del_y.abs().to_f64())
    }

    /// Complex-plane coordinate of a pixel centre.
    pub fn point_at(&self, col: i32, row: i32) -> (BigFloat, BigFloat) {
        let steps = self.steps();
        let x = self
            .x_min
            .add(&steps.del_x.mul_i64(col as i64))
            .add(&steps.del_x2.mul_i64(row as i64));
        let y = self
            .y_max
            .sub(&steps.del_y.mul_i64(row as i64))
            .sub(&steps.del_y2.mul_i64(col as i64));
        (x, y)
    }
}
