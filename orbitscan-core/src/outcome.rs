use serde::{Deserialize, Serialize};

/// How an orbit ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Bailout test satisfied, fixed-point overflow, or derivative too big.
    Escaped,
    /// Ran out of iterations without escaping.
    MaxIterReached,
    /// Orbit returned within tolerance of a saved iterate.
    Periodic { cycle_len: u32 },
    /// Captured by the finite attractor at this index.
    Attracted { index: usize },
}

impl Outcome {
    /// Inside points get inside coloring.
    pub fn is_inside(&self) -> bool {
        matches!(self, Outcome::MaxIterReached | Outcome::Periodic { .. })
    }
}

/// Axis an epsilon-cross orbit came close to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EpsilonHit {
    #[default]
    None,
    NearImaginaryAxis,
    NearRealAxis,
}

/// Final state of one pixel's orbit, everything the coloring stages read.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrbitResult {
    pub outcome: Outcome,
    /// Iteration count after periodicity and attractor adjustments.
    pub iterations: u32,
    /// Last iterate, as f64
    pub final_z: (f64, f64),
    /// Distance estimator derivative.
    #[serde(default)]
    pub derivative: (f64, f64),
    /// Derivative exceeded the too-big threshold.
    #[serde(default)]
    pub dem_boundary: bool,
    #[serde(default)]
    pub epsilon_hit: EpsilonHit,
    /// Smallest |z|² seen along the orbit and the iteration it occurred at.
    #[serde(default)]
    pub min_orbit: f64,
    #[serde(default)]
    pub min_index: u32,
    /// Sum of the lengths of all orbit steps.
    #[serde(default)]
    pub total_distance: f64,
    /// Slopes im/re of the first fifteen iterates.
    #[serde(default)]
    pub star_trail: Vec<f64>,
    #[serde(default)]
    pub overflowed: bool,
}

impl OrbitResult {
    pub fn new(outcome: Outcome, iterations: u32, final_z: (f64, f64)) -> Self {
        Self {
            outcome,
            iterations,
            final_z: (Self::sanitize(final_z.0), Self::sanitize(final_z.1)),
            derivative: (0.0, 0.0),
            dem_boundary: false,
            epsilon_hit: EpsilonHit::None,
            min_orbit: 0.0,
            min_index: 0,
            total_distance: 0.0,
            star_trail: Vec::new(),
            overflowed: false,
        }
    }

    /// |z|² of the final iterate.
    pub fn magnitude(&self) -> f64 {
        self.final_z.0 * self.final_z.0 + self.final_z.1 * self.final_z.1
    }

    /// Replace NaN or infinity so the result survives JSON serialization.
    #[inline]
    fn sanitize(value: f64) -> f64 {
        if value.is_finite() {
            value
        } else if value.is_nan() {
            0.0
        } else {
            value.signum() * f64::MAX
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_max_iter_and_periodic_are_inside() {
        assert!(Outcome::MaxIterReached.is_inside());
        assert!(Outcome::Periodic { cycle_len: 3 }.is_inside());
        assert!(!Outcome::Escaped.is_inside());
        assert!(!Outcome::Attracted { index: 0 }.is_inside());
    }

    #[test]
    fn new_sanitizes_non_finite_values() {
        let result = OrbitResult::new(Outcome::Escaped, 5, (f64::NAN, f64::NEG_INFINITY));
        assert_eq!(result.final_z, (0.0, -f64::MAX));
        let json = serde_json::to_string(&result).unwrap();
        let restored: OrbitResult = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, result);
    }
}
