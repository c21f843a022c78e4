//! Scan strategies: the order in which pixels of a work item are visited.
//!
//! A strategy gets one work item with its symmetry-reduced stops, asks the
//! engine for colors and hands them to the plot adapter. It never touches
//! the work list; whatever must be queued comes back in [`ScanStatus`].

pub mod diffusion;
pub mod one_or_two_pass;

pub use diffusion::DiffusionScan;
pub use one_or_two_pass::OneOrTwoPass;

use crate::engine::PixelEngine;
use crate::plot::PlotSink;
use orbitscan_core::{CalcMode, WorkItem};

/// One work item ready to scan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScanJob {
    pub item: WorkItem,
    /// Last column and row to iterate; below the item's stops when the
    /// symmetry plan mirrors part of the window.
    pub x_stop: i32,
    pub y_stop: i32,
    /// Other items are still queued.
    pub pending_work: bool,
    /// Fill coarse blocks while the diffusion scan is young.
    pub preview: bool,
}

impl ScanJob {
    pub fn new(item: WorkItem, x_stop: i32, y_stop: i32) -> Self {
        Self {
            item,
            x_stop,
            y_stop,
            pending_work: false,
            preview: false,
        }
    }
}

/// How a scan ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanStatus {
    Completed,
    /// The item is finished for now; the returned item (its next pass)
    /// must be queued behind the rest of the list.
    Deferred(WorkItem),
    /// Cancellation was observed. `resume` picks up at the first pixel not
    /// yet computed; `deferred` is a later pass to queue alongside it.
    Interrupted {
        resume: WorkItem,
        deferred: Option<WorkItem>,
    },
}

pub trait ScanStrategy {
    /// Whether windows may be mirrored for this strategy. Strategies that
    /// refuse get the unmirrored plan whatever the fractal declares.
    fn accepts_symmetry(&self) -> bool;

    fn scan(&self, job: &ScanJob, engine: &mut dyn PixelEngine, plot: &mut dyn PlotSink) -> ScanStatus;
}

/// Strategy for the configured calculation mode.
pub fn strategy_for(mode: CalcMode) -> Box<dyn ScanStrategy> {
    match mode {
        CalcMode::OnePass => Box::new(OneOrTwoPass { two_pass: false }),
        CalcMode::TwoPass => Box::new(OneOrTwoPass { two_pass: true }),
        CalcMode::Diffusion => Box::new(DiffusionScan),
    }
}
