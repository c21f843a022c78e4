//! Periodicity checking.
//!
//! Every so often an iterate is saved; later iterates are compared against
//! it and an orbit that comes back within `close_enough` is declared
//! periodic. The save interval doubles as the orbit gets longer.

use orbitscan_core::{CalcConfig, InsideColoring, OrbitComplex, PeriodicityPolicy};

/// Checking starts this late after a periodicity reset.
pub const RESET_THRESHOLD: u32 = 255;

/// Save interval mask used when the inside coloring shows the period.
const PERIOD_DISPLAY_MASK: u32 = 16;

/// Per-image periodicity settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PeriodicitySchedule {
    enabled: bool,
    display_period: bool,
    max_iterations: u32,
    first_saved_and: u32,
    next_saved_incr: u32,
    close_enough: f64,
}

impl PeriodicitySchedule {
    pub fn new(config: &CalcConfig, min_pixel_delta: f64) -> Self {
        let (next_saved_incr, first_saved_and) = match config.periodicity_policy {
            PeriodicityPolicy::Legacy => (1, 1),
            PeriodicityPolicy::Adaptive => {
                let incr = ((config.max_iterations as f64).log10() as u32).max(4);
                (incr, incr * 2 + 1)
            }
        };
        Self {
            enabled: config.periodicity != 0 && !config.inside.forbids_periodicity(),
            display_period: config.inside == InsideColoring::Period,
            max_iterations: config.max_iterations,
            first_saved_and,
            next_saved_incr,
            close_enough: min_pixel_delta * (-(config.periodicity.unsigned_abs() as f64)).exp2(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Same schedule with checking switched off, for images where a finite
    /// attractor already catches bounded orbits.
    pub fn without_checking(self) -> Self {
        Self {
            enabled: false,
            ..self
        }
    }

    pub fn close_enough(&self) -> f64 {
        self.close_enough
    }

    /// Iteration after which the next pixel starts checking.
    ///
    /// `hint` is `None` right after a reset, otherwise the value left by
    /// the previous pixel.
    pub fn threshold(&self, hint: Option<u32>) -> u32 {
        if !self.enabled {
            return u32::MAX;
        }
        let threshold = if self.display_period {
            self.max_iterations / 5 * 4
        } else {
            hint.unwrap_or(RESET_THRESHOLD)
        };
        threshold.max(self.first_saved_and)
    }

    /// Hint handed to the next pixel once this one took `iterations`.
    pub fn next_hint(&self, iterations: u32) -> u32 {
        if iterations >= self.max_iterations {
            0
        } else {
            iterations + 10
        }
    }

    /// Fresh tracker for one pixel. `saved` is the orbit's starting value.
    pub fn start<C: OrbitComplex>(&self, hint: Option<u32>, saved: C) -> Periodicity<C> {
        if !self.enabled {
            return Periodicity::Disabled;
        }
        Periodicity::Tracking {
            threshold: self.threshold(hint),
            saved,
            saved_at: 0,
            mask: if self.display_period {
                PERIOD_DISPLAY_MASK
            } else {
                self.first_saved_and
            },
            countdown: 1,
            next_saved_incr: self.next_saved_incr,
            close_enough: self.close_enough,
        }
    }
}

/// Periodicity state of the orbit being iterated.
#[derive(Clone, Debug)]
pub enum Periodicity<C> {
    Disabled,
    Tracking {
        threshold: u32,
        saved: C,
        saved_at: u32,
        mask: u32,
        countdown: u32,
        next_saved_incr: u32,
        close_enough: f64,
    },
}

impl<C: OrbitComplex> Periodicity<C> {
    /// Look at iterate `z` produced by step `iter`.
    ///
    /// Returns the cycle length when the orbit has come back to the saved
    /// value.
    pub fn observe(&mut self, iter: u32, z: &C) -> Option<u32> {
        let Periodicity::Tracking {
            threshold,
            saved,
            saved_at,
            mask,
            countdown,
            next_saved_incr,
            close_enough,
        } = self
        else {
            return None;
        };
        if iter <= *threshold {
            return None;
        }
        if iter & *mask == 0 {
            *saved = z.clone();
            *saved_at = iter;
            *countdown -= 1;
            if *countdown == 0 {
                *mask = (*mask << 1) | 1;
                *countdown = *next_saved_incr;
            }
            None
        } else if saved.approx_eq(z, *close_enough) {
            Some(iter - *saved_at)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbitscan_core::F64Complex;

    fn schedule(config: CalcConfig) -> PeriodicitySchedule {
        PeriodicitySchedule::new(&config, 1.0 / 64.0)
    }

    #[test]
    fn adaptive_policy_scales_with_max_iterations() {
        let s = schedule(CalcConfig {
            max_iterations: 1_000_000,
            ..CalcConfig::default()
        });
        assert_eq!(s.next_saved_incr, 6);
        assert_eq!(s.first_saved_and, 13);

        let s = schedule(CalcConfig::default());
        assert_eq!(s.next_saved_incr, 4);
        assert_eq!(s.first_saved_and, 9);
    }

    #[test]
    fn legacy_policy_saves_every_other_iterate() {
        let s = schedule(CalcConfig {
            periodicity_policy: PeriodicityPolicy::Legacy,
            ..CalcConfig::default()
        });
        assert_eq!(s.first_saved_and, 1);
        assert_eq!(s.threshold(Some(0)), 1);
    }

    #[test]
    fn threshold_rules() {
        let s = schedule(CalcConfig::default());
        assert_eq!(s.threshold(None), RESET_THRESHOLD);
        assert_eq!(s.threshold(Some(40)), 40);
        assert_eq!(s.threshold(Some(2)), 9);

        let s = schedule(CalcConfig {
            inside: InsideColoring::Period,
            max_iterations: 1000,
            ..CalcConfig::default()
        });
        assert_eq!(s.threshold(None), 800);

        let s = schedule(CalcConfig {
            inside: InsideColoring::StarTrail,
            ..CalcConfig::default()
        });
        assert_eq!(s.threshold(Some(5)), u32::MAX);
    }

    #[test]
    fn tolerance_shrinks_with_periodicity_magnitude() {
        let s = schedule(CalcConfig {
            periodicity: -3,
            ..CalcConfig::default()
        });
        assert_eq!(s.close_enough(), 1.0 / 512.0);
    }

    #[test]
    fn next_hint_resets_after_inside_pixels() {
        let s = schedule(CalcConfig::default());
        assert_eq!(s.next_hint(150), 0);
        assert_eq!(s.next_hint(20), 30);
    }

    #[test]
    fn fixed_point_orbit_is_caught() {
        let s = schedule(CalcConfig {
            periodicity_policy: PeriodicityPolicy::Legacy,
            ..CalcConfig::default()
        });
        let z = F64Complex::new(0.0, 0.0);
        let mut tracker = s.start(Some(0), z);
        let found = (1..100).find_map(|iter| tracker.observe(iter, &z));
        assert_eq!(found, Some(1));
    }

    #[test]
    fn disabled_tracker_never_reports() {
        let s = schedule(CalcConfig {
            periodicity: 0,
            ..CalcConfig::default()
        });
        let z = F64Complex::new(0.5, 0.0);
        let mut tracker = s.start(Some(0), z);
        assert!((1..1000).all(|iter| tracker.observe(iter, &z).is_none()));
    }
}
