//! Precision calculation for fractal rendering.
//!
//! Determines how many mantissa bits are needed to tell adjacent pixels of
//! a view apart, and picks a numeric backend from that.

use crate::{NumericMode, View};

/// Safety margin for rounding errors in arithmetic operations.
const SAFETY_BITS: u64 = 64;

/// Mantissa bits available to native f64 arithmetic, less one guard bit.
pub const NATIVE_MANTISSA_BITS: u64 = 52;

/// Bits needed to resolve the view's pixels and survive `max_iterations`
/// steps of error amplification, without safety margin.
pub fn significant_bits(view: &View, max_iterations: u32) -> u64 {
    let px = view.x_dots.max(2) as f64;
    let py = view.y_dots.max(2) as f64;

    // log2(min_delta) where delta = dimension / pixels
    let log2_delta_x = view.width().log2_approx() - px.log2();
    let log2_delta_y = view.height().log2_approx() - py.log2();
    let log2_min_delta = log2_delta_x.min(log2_delta_y);

    // Largest coordinate magnitude on screen
    let log2_m = [&view.x_min, &view.x_max, &view.y_min, &view.y_max]
        .iter()
        .map(|v| v.log2_approx())
        .fold(f64::NEG_INFINITY, f64::max)
        .max(0.0)
        + 1.0;

    let log2_ratio = log2_m - log2_min_delta;
    let bits_from_ratio = if log2_ratio.is_finite() {
        log2_ratio.ceil().max(0.0) as u64
    } else {
        0
    };

    let iter_bits = if max_iterations > 1 {
        (max_iterations as f64).log2().ceil() as u64
    } else {
        0
    };

    bits_from_ratio + iter_bits
}

/// Precision for arbitrary-precision arithmetic, rounded up to a power of
/// two with a minimum of 64 bits.
pub fn calculate_precision_bits(view: &View, max_iterations: u32) -> usize {
    let total_bits = significant_bits(view, max_iterations) + SAFETY_BITS;
    (total_bits as usize).next_power_of_two().max(64)
}

/// Replace `Auto` with the backend the view needs.
pub fn resolve_numeric_mode(mode: NumericMode, view: &View, max_iterations: u32) -> NumericMode {
    match mode {
        NumericMode::Auto => {
            if significant_bits(view, max_iterations) <= NATIVE_MANTISSA_BITS {
                NumericMode::Native
            } else {
                NumericMode::Arbitrary
            }
        }
        other => other,
    }
}
