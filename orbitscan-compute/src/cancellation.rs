use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Returned by the engine and the scan strategies when a render was asked to stop.
///
/// Nothing is written for the pixel that observed the request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("calculation interrupted")]
pub struct Interrupted;

/// Trait for checking if computation should be cancelled
pub trait CancellationChecker: Clone {
    /// Returns true if computation should be cancelled
    fn is_cancelled(&self) -> bool;
}

/// Never cancels - for renders that always run to completion
#[derive(Clone, Copy, Debug, Default)]
pub struct NeverCancel;

impl CancellationChecker for NeverCancel {
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Checks an atomic boolean flag, so another thread can request a stop.
#[derive(Clone, Debug)]
pub struct AtomicBoolChecker {
    flag: Arc<AtomicBool>,
}

impl AtomicBoolChecker {
    pub fn new(flag: Arc<AtomicBool>) -> Self {
        Self { flag }
    }
}

impl CancellationChecker for AtomicBoolChecker {
    fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Reports cancellation from the `n`-th poll onwards.
///
/// The poll count is shared between clones, which makes interruption points
/// reproducible without a second thread.
#[derive(Clone, Debug)]
pub struct CancelAfter {
    remaining: Arc<AtomicUsize>,
}

impl CancelAfter {
    pub fn new(polls: usize) -> Self {
        Self {
            remaining: Arc::new(AtomicUsize::new(polls)),
        }
    }

    /// Polls left before cancellation is reported.
    pub fn remaining(&self) -> usize {
        self.remaining.load(Ordering::Relaxed)
    }
}

impl CancellationChecker for CancelAfter {
    fn is_cancelled(&self) -> bool {
        self.remaining
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1))
            .is_err()
    }
}

/// Pixel-cadence throttle around a checker.
///
/// Strategies call [`PollCounter::should_stop`] before every pixel; the
/// checker itself is consulted only every `interval` pixels.
#[derive(Clone, Debug)]
pub struct PollCounter<X: CancellationChecker> {
    checker: X,
    interval: u32,
    count: u32,
}

impl<X: CancellationChecker> PollCounter<X> {
    pub fn new(checker: X, interval: u32) -> Self {
        Self {
            checker,
            interval: interval.max(1),
            count: 0,
        }
    }

    pub fn should_stop(&mut self) -> bool {
        let due = self.count == 0;
        self.count = (self.count + 1) % self.interval;
        due && self.checker.is_cancelled()
    }

    pub fn checker(&self) -> &X {
        &self.checker
    }
}
