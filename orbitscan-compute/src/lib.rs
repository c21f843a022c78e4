pub mod cancellation;
pub mod computers;
pub mod context;
pub mod engine;
pub mod plot;
pub mod scan;
pub mod scheduler;
pub mod symmetry;
pub mod worklist;

pub use cancellation::{
    AtomicBoolChecker, CancelAfter, CancellationChecker, Interrupted, NeverCancel, PollCounter,
};
pub use computers::{Backend, OrbitCalculator, OrbitState};
pub use context::CalculationContext;
pub use engine::{Engine, PixelEngine};
pub use plot::{Framebuffer, PlotGeometry, PlotSink, SymmetricPlot, SymmetryPlan};
pub use scan::{strategy_for, DiffusionScan, OneOrTwoPass, ScanJob, ScanStatus, ScanStrategy};
pub use scheduler::{render, resume, RenderStatus};
pub use symmetry::SymmetryPlanner;
pub use worklist::{pan_snapshot, PannedSnapshot, WorkList, MAX_CALC_WORK};

// Re-export core types for convenience
pub use orbitscan_core::*;
