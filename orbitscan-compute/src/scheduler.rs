//! Work list driven image calculation.
//!
//! The scheduler owns the queue for one image: it pops a window, lets the
//! symmetry planner narrow it, hands it to the scan strategy and queues
//! whatever the strategy leaves behind. Cancellation anywhere ends the run
//! with a [`ResumeSnapshot`] of the pending windows.

use crate::cancellation::CancellationChecker;
use crate::computers::{supports, Backend, OrbitCalculator};
use crate::context::CalculationContext;
use crate::engine::distance::DistanceEstimator;
use crate::engine::Engine;
use crate::plot::{PlotGeometry, PlotSink, SymmetricPlot, SymmetryPlan};
use crate::scan::{strategy_for, ScanJob, ScanStatus, ScanStrategy};
use crate::symmetry::SymmetryPlanner;
use crate::worklist::WorkList;
use orbitscan_core::{
    calculate_precision_bits, resolve_numeric_mode, BigFloatComplex, CalcError, CalcMode,
    ContextScratch, F64Complex, FixedComplex, ImageRequest, NumericMode, ResumeSnapshot, WorkItem,
};

/// How a render call ended.
#[derive(Clone, Debug, PartialEq)]
pub enum RenderStatus {
    Completed,
    /// Stopped early; pass the snapshot to [`resume`] to finish the image.
    Interrupted(ResumeSnapshot),
}

/// Calculate `request` from scratch into `sink`.
pub fn render<X: CancellationChecker>(
    request: &ImageRequest,
    sink: &mut dyn PlotSink,
    cancel: X,
) -> Result<RenderStatus, CalcError> {
    validate(request)?;
    let scratch = resolve_scratch(request)?;
    let list = WorkList::from_items(vec![WorkItem::screen(request.view.x_dots, request.view.y_dots)])?;
    log::info!(
        "rendering {:?} at {}x{} with {:?} math",
        request.fractal,
        request.view.x_dots,
        request.view.y_dots,
        scratch.numeric_mode
    );
    run(request, scratch, list, sink, cancel)
}

/// Continue an interrupted render. The snapshot's numeric settings are
/// used as saved, even if the request would resolve differently now.
pub fn resume<X: CancellationChecker>(
    request: &ImageRequest,
    snapshot: &ResumeSnapshot,
    sink: &mut dyn PlotSink,
    cancel: X,
) -> Result<RenderStatus, CalcError> {
    validate(request)?;
    if let Err(err) = snapshot.check(request.view.x_dots, request.view.y_dots) {
        log::error!("cannot resume: {err}");
        return Err(err);
    }
    let mut scratch = snapshot.scratch;
    scratch.numeric_mode = fall_back(request, scratch.numeric_mode);
    let list = WorkList::from_items(snapshot.items.clone())?;
    log::info!(
        "resuming {:?} with {} pending windows ({} pixels)",
        request.fractal,
        list.len(),
        snapshot.pending_area()
    );
    run(request, scratch, list, sink, cancel)
}

fn validate(request: &ImageRequest) -> Result<(), CalcError> {
    request.validate().map_err(|err| {
        log::error!("rejected image request: {err}");
        CalcError::from(err)
    })
}

/// Pick the backend and the values that must stay fixed for the image.
fn resolve_scratch(request: &ImageRequest) -> Result<ContextScratch, CalcError> {
    let config = &request.config;
    let view = &request.view;
    let mode = resolve_numeric_mode(config.numeric_mode, view, config.max_iterations);
    let precision_bits = calculate_precision_bits(view, config.max_iterations);
    if mode == NumericMode::Arbitrary && precision_bits > config.max_precision_bits {
        let err = CalcError::PrecisionExhausted {
            required: precision_bits,
            limit: config.max_precision_bits,
        };
        log::error!("{err}");
        return Err(err);
    }
    Ok(ContextScratch {
        numeric_mode: fall_back(request, mode),
        bit_shift: config.bit_shift,
        precision_bits,
        magnitude_limit: DistanceEstimator::adjusted_limit(config, config.magnitude_limit()),
    })
}

/// Native math for fractal types without a calculator in `mode`.
fn fall_back(request: &ImageRequest, mode: NumericMode) -> NumericMode {
    if supports(request.fractal, mode) {
        return mode;
    }
    log::warn!(
        "{:?} has no {:?} calculator, using native math",
        request.fractal,
        mode
    );
    NumericMode::Native
}

fn run<X: CancellationChecker>(
    request: &ImageRequest,
    scratch: ContextScratch,
    list: WorkList,
    sink: &mut dyn PlotSink,
    cancel: X,
) -> Result<RenderStatus, CalcError> {
    match scratch.numeric_mode {
        NumericMode::FixedPoint => run_backend::<FixedComplex, X>(request, scratch, list, sink, cancel),
        NumericMode::Arbitrary => run_backend::<BigFloatComplex, X>(request, scratch, list, sink, cancel),
        NumericMode::Native | NumericMode::Auto => {
            run_backend::<F64Complex, X>(request, scratch, list, sink, cancel)
        }
    }
}

fn prepare<C: Backend>(
    request: &ImageRequest,
    calculator: &mut dyn OrbitCalculator<C>,
    scratch: &ContextScratch,
) -> Result<(), CalcError> {
    if calculator.per_image(&request.params, &C::scale(scratch)) {
        return Ok(());
    }
    let err = CalcError::CalculatorSetup {
        fractal: request.fractal,
    };
    log::error!("{err}");
    Err(err)
}

/// Symmetry plan for the next window, unmirrored when the strategy
/// refuses symmetry.
fn plan_item(
    planner: &SymmetryPlanner,
    strategy: &dyn ScanStrategy,
    item: &mut WorkItem,
    list: &mut WorkList,
    x_dots: u32,
    y_dots: u32,
) -> Result<(SymmetryPlan, PlotGeometry), CalcError> {
    if strategy.accepts_symmetry() {
        planner.plan(item, list)
    } else {
        Ok((SymmetryPlan::None, PlotGeometry::plain(item.rect(), x_dots, y_dots)))
    }
}

fn run_backend<C: Backend, X: CancellationChecker>(
    request: &ImageRequest,
    scratch: ContextScratch,
    mut list: WorkList,
    sink: &mut dyn PlotSink,
    cancel: X,
) -> Result<RenderStatus, CalcError> {
    let config = &request.config;
    let Some(mut calculator) = C::calculator(request.fractal) else {
        let err = CalcError::CalculatorSetup {
            fractal: request.fractal,
        };
        log::error!("{err}");
        return Err(err);
    };
    prepare(request, calculator.as_mut(), &scratch)?;
    let context = CalculationContext::new(request, scratch, calculator.as_ref());

    let calc_mode = if config.potential.is_some() && config.potential_16bit {
        CalcMode::OnePass
    } else {
        config.calc_mode
    };
    let strategy = strategy_for(calc_mode);
    let planner = SymmetryPlanner::new(request, calculator.default_symmetry(), context.bailout);
    let (x_dots, y_dots) = (request.view.x_dots, request.view.y_dots);

    while !list.is_empty() {
        if cancel.is_cancelled() {
            log::debug!("interrupted between windows, {} pending", list.len());
            return Ok(RenderStatus::Interrupted(ResumeSnapshot::new(
                x_dots,
                y_dots,
                list.into_items(),
                scratch,
            )));
        }
        let Some(mut item) = list.pop() else {
            break;
        };
        prepare(request, calculator.as_mut(), &scratch)?;

        let (plan, geometry) = plan_item(&planner, strategy.as_ref(), &mut item, &mut list, x_dots, y_dots)?;
        log::debug!(
            "window {:?} pass {} planned as {plan:?}",
            item.rect(),
            item.pass
        );
        let job = ScanJob {
            item,
            x_stop: geometry.x_stop,
            y_stop: geometry.y_stop,
            pending_work: !list.is_empty(),
            preview: config.diffusion_preview,
        };

        let status = {
            let mut engine = Engine::new(
                &context,
                calculator.as_ref(),
                cancel.clone(),
                config.poll_interval_pixels,
            );
            let mut plot = SymmetricPlot::new(plan, geometry, &mut *sink);
            strategy.scan(&job, &mut engine, &mut plot)
        };

        match status {
            ScanStatus::Completed => {}
            ScanStatus::Deferred(next) => {
                log::debug!("deferring pass {} of window {:?}", next.pass, next.rect());
                list.add(next)?;
            }
            ScanStatus::Interrupted { mut resume, deferred } => {
                match deferred {
                    Some(deferred) if list.has_room(2) => list.add(deferred)?,
                    Some(_) => {
                        log::warn!("no room to queue the second pass early");
                        resume.pass_two_queued = false;
                    }
                    None => {}
                }
                list.add(resume)?;
                log::debug!("interrupted at ({}, {}), {} pending", resume.x_begin, resume.y_begin, list.len());
                return Ok(RenderStatus::Interrupted(ResumeSnapshot::new(
                    x_dots,
                    y_dots,
                    list.into_items(),
                    scratch,
                )));
            }
        }
    }

    log::info!("image complete");
    Ok(RenderStatus::Completed)
}
