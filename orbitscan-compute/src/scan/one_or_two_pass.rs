//! Raster scan, optionally preceded by a coarse pass.
//!
//! The coarse pass computes every other pixel of every other row and paints
//! each result over its 2x2 block. The fine pass then computes only the
//! pixels the coarse pass skipped.

use super::{ScanJob, ScanStatus, ScanStrategy};
use crate::cancellation::Interrupted;
use crate::engine::PixelEngine;
use crate::plot::PlotSink;
use orbitscan_core::WorkItem;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OneOrTwoPass {
    pub two_pass: bool,
}

/// Next pixel to visit and the hint it starts with.
#[derive(Clone, Copy, Debug)]
struct RasterPosition {
    col: i32,
    row: i32,
    hint: Option<u32>,
}

impl OneOrTwoPass {
    /// Whether the pass that is running computes `(col, row)`. Parity is
    /// taken from the window's own origin.
    #[inline]
    fn computes(&self, pass: u32, item: &WorkItem, col: i32, row: i32) -> bool {
        pass == 1 || !self.two_pass || (row - item.y_start) & 1 != 0 || (col - item.x_start) & 1 != 0
    }

    fn run_pass(
        &self,
        pass: u32,
        job: &ScanJob,
        at: &mut RasterPosition,
        engine: &mut dyn PixelEngine,
        plot: &mut dyn PlotSink,
    ) -> Result<(), Interrupted> {
        let coarse = self.two_pass && pass == 1;
        let (x_origin, y_origin) = (job.item.x_start, job.item.y_start);
        while at.row <= job.y_stop {
            while at.col <= job.x_stop {
                let (col, row) = (at.col, at.row);
                if self.computes(pass, &job.item, col, row) {
                    if engine.should_stop() {
                        return Err(Interrupted);
                    }
                    let color = engine.calculate(col, row, &mut at.hint)?;
                    plot.write(col, row, color);
                    if coarse {
                        let right = (col - x_origin) & 1 == 0 && col < job.x_stop;
                        if (row - y_origin) & 1 == 0 && row < job.y_stop {
                            plot.write(col, row + 1, color);
                            if right {
                                plot.write(col + 1, row + 1, color);
                            }
                        }
                        if right {
                            at.col += 1;
                            plot.write(at.col, row, color);
                        }
                    }
                }
                at.col += 1;
            }
            at.col = job.item.x_start;
            at.hint = None;
            if coarse && (at.row - y_origin) & 1 == 0 {
                at.row += 1;
            }
            at.row += 1;
        }
        Ok(())
    }
}

impl ScanStrategy for OneOrTwoPass {
    fn accepts_symmetry(&self) -> bool {
        true
    }

    fn scan(&self, job: &ScanJob, engine: &mut dyn PixelEngine, plot: &mut dyn PlotSink) -> ScanStatus {
        let item = job.item;
        let mut at = RasterPosition {
            col: item.x_begin,
            row: item.y_begin,
            hint: item.periodicity_hint,
        };

        if self.two_pass && item.pass == 0 {
            if self.run_pass(1, job, &mut at, engine, plot).is_err() {
                let mut resume = item;
                resume.x_begin = at.col;
                resume.y_begin = at.row;
                resume.periodicity_hint = at.hint;
                let deferred = (!item.pass_two_queued).then(|| WorkItem::new(item.rect(), 1, item.sym));
                resume.pass_two_queued = true;
                return ScanStatus::Interrupted { resume, deferred };
            }
            if item.pass_two_queued {
                return ScanStatus::Completed;
            }
            if job.pending_work {
                return ScanStatus::Deferred(WorkItem::new(item.rect(), 1, item.sym));
            }
            at = RasterPosition {
                col: item.x_start,
                row: item.y_start,
                hint: None,
            };
        }

        let pass = if self.two_pass { 2 } else { 1 };
        match self.run_pass(pass, job, &mut at, engine, plot) {
            Ok(()) => ScanStatus::Completed,
            Err(Interrupted) => {
                // Drop the rows already done, keeping the window symmetric
                // about its mirror axis and the fine pass on the same parity.
                let y_start = at.row - (at.row - item.y_start) % 2;
                let mut y_stop = item.y_stop;
                if job.y_stop != item.y_stop {
                    y_stop -= y_start - item.y_start;
                }
                let mut resume = item;
                resume.x_begin = at.col;
                resume.y_start = y_start;
                resume.y_begin = at.row;
                resume.y_stop = y_stop;
                resume.pass = if self.two_pass { 1 } else { item.pass };
                resume.pass_two_queued = false;
                resume.periodicity_hint = at.hint;
                ScanStatus::Interrupted {
                    resume,
                    deferred: None,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::Framebuffer;
    use crate::scan::testing::CoordinateEngine;
    use orbitscan_core::PixelRect;

    fn job(x_stop: i32, y_stop: i32) -> ScanJob {
        let item = WorkItem::new(PixelRect::new(0, x_stop, 0, y_stop), 0, Default::default());
        ScanJob::new(item, x_stop, y_stop)
    }

    fn assert_exact(framebuffer: &Framebuffer) {
        for y in 0..framebuffer.height() as i32 {
            for x in 0..framebuffer.width() as i32 {
                assert_eq!(framebuffer.get(x, y), Some(CoordinateEngine::color(x, y)), "({x}, {y})");
            }
        }
    }

    #[test]
    fn one_pass_visits_every_pixel_once() {
        let mut engine = CoordinateEngine::default();
        let mut framebuffer = Framebuffer::new(7, 5);
        let status = OneOrTwoPass { two_pass: false }.scan(&job(6, 4), &mut engine, &mut framebuffer);
        assert_eq!(status, ScanStatus::Completed);
        assert_eq!(engine.calls.len(), 35);
        assert_exact(&framebuffer);
    }

    #[test]
    fn two_pass_computes_each_pixel_once_overall() {
        let mut engine = CoordinateEngine::default();
        let mut framebuffer = Framebuffer::new(5, 5);
        let status = OneOrTwoPass { two_pass: true }.scan(&job(4, 4), &mut engine, &mut framebuffer);
        assert_eq!(status, ScanStatus::Completed);
        // Nine coarse pixels, then the sixteen with an odd coordinate.
        assert_eq!(engine.calls.len(), 25);
        assert_eq!(&engine.calls[..3], &[(0, 0), (2, 0), (4, 0)]);
        let mut sorted = engine.calls.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), 25);
        assert_exact(&framebuffer);
    }

    #[test]
    fn coarse_pass_paints_blocks() {
        let mut engine = CoordinateEngine::default();
        let mut framebuffer = Framebuffer::new(4, 4);
        let mut job = job(3, 3);
        job.pending_work = true;
        let status = OneOrTwoPass { two_pass: true }.scan(&job, &mut engine, &mut framebuffer);
        assert_eq!(
            status,
            ScanStatus::Deferred(WorkItem::new(PixelRect::new(0, 3, 0, 3), 1, Default::default()))
        );
        assert_eq!(engine.calls, vec![(0, 0), (2, 0), (0, 2), (2, 2)]);
        let top_left = CoordinateEngine::color(0, 0);
        for (x, y) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            assert_eq!(framebuffer.get(x, y), Some(top_left));
        }
        assert_eq!(framebuffer.get(3, 3), Some(CoordinateEngine::color(2, 2)));
    }

    #[test]
    fn hint_resets_at_each_row() {
        let mut engine = CoordinateEngine::default();
        let mut framebuffer = Framebuffer::new(3, 2);
        OneOrTwoPass { two_pass: false }.scan(&job(2, 1), &mut engine, &mut framebuffer);
        assert_eq!(engine.hints, vec![None, Some(1), Some(2), None, Some(4), Some(5)]);
    }

    #[test]
    fn interrupted_coarse_pass_queues_both_passes() {
        let strategy = OneOrTwoPass { two_pass: true };
        let mut framebuffer = Framebuffer::new(6, 6);
        let mut engine = CoordinateEngine::stopping_after(4);
        let status = strategy.scan(&job(5, 5), &mut engine, &mut framebuffer);
        let ScanStatus::Interrupted {
            resume,
            deferred: Some(deferred),
        } = status
        else {
            panic!("expected an interrupt with a deferred pass, got {status:?}");
        };
        assert_eq!((resume.x_begin, resume.y_begin, resume.pass), (2, 2, 0));
        assert_eq!(resume.periodicity_hint, Some(4));
        assert!(resume.pass_two_queued);
        assert_eq!(deferred.pass, 1);
        assert!(deferred.is_fresh());

        // Finishing the resumed coarse pass leaves the fine pass to the
        // deferred item.
        let mut engine = CoordinateEngine::default();
        let mut resumed = job(5, 5);
        resumed.item = resume;
        resumed.pending_work = true;
        assert_eq!(strategy.scan(&resumed, &mut engine, &mut framebuffer), ScanStatus::Completed);
        assert_eq!(engine.hints[0], Some(4));

        let mut fine = job(5, 5);
        fine.item = deferred;
        assert_eq!(strategy.scan(&fine, &mut engine, &mut framebuffer), ScanStatus::Completed);
        assert_exact(&framebuffer);
    }

    #[test]
    fn interrupted_fine_pass_keeps_mirrored_window_symmetric() {
        let strategy = OneOrTwoPass { two_pass: false };
        let mut framebuffer = Framebuffer::new(4, 9);
        // Rows 5..=8 mirror rows 3..=0, so only 0..=4 are iterated.
        let item = WorkItem::new(PixelRect::new(0, 3, 0, 8), 0, Default::default());
        let job = ScanJob::new(item, 3, 4);
        let mut engine = CoordinateEngine::stopping_after(9);
        let ScanStatus::Interrupted { resume, deferred } = strategy.scan(&job, &mut engine, &mut framebuffer) else {
            panic!("expected an interrupt");
        };
        assert_eq!(deferred, None);
        assert_eq!((resume.x_begin, resume.y_begin), (1, 2));
        assert_eq!((resume.y_start, resume.y_stop), (2, 6));
        assert_eq!((resume.y_start + resume.y_stop) / 2, 4);
    }

    #[test]
    fn odd_origin_window_keeps_its_own_parity() {
        let strategy = OneOrTwoPass { two_pass: true };
        let mut framebuffer = Framebuffer::new(8, 8);
        let item = WorkItem::new(PixelRect::new(3, 7, 1, 5), 0, Default::default());
        let mut engine = CoordinateEngine::default();
        let status = strategy.scan(&ScanJob::new(item, 7, 5), &mut engine, &mut framebuffer);
        assert_eq!(status, ScanStatus::Completed);
        // The coarse pass starts on the window's corner.
        assert_eq!(&engine.calls[..3], &[(3, 1), (5, 1), (7, 1)]);
        assert_eq!(engine.calls.len(), 25);
        let mut sorted = engine.calls.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), 25);
        for y in 1..=5 {
            for x in 3..=7 {
                assert_eq!(framebuffer.get(x, y), Some(CoordinateEngine::color(x, y)), "({x}, {y})");
            }
        }
    }

    #[test]
    fn resumed_fine_pass_keeps_the_window_parity() {
        let strategy = OneOrTwoPass { two_pass: true };
        let mut framebuffer = Framebuffer::new(5, 6);
        let item = WorkItem::new(PixelRect::new(0, 4, 1, 5), 1, Default::default());
        // Row 1 is the origin row, so the fine pass skips its even columns
        // and stops before the second pixel of row 2.
        let mut engine = CoordinateEngine::stopping_after(3);
        let ScanStatus::Interrupted { resume, .. } = strategy.scan(&ScanJob::new(item, 4, 5), &mut engine, &mut framebuffer)
        else {
            panic!("expected an interrupt");
        };
        assert_eq!(engine.calls, vec![(1, 1), (3, 1), (0, 2)]);
        assert_eq!((resume.x_begin, resume.y_begin), (1, 2));
        assert_eq!(resume.y_start, 1);

        let mut engine = CoordinateEngine::default();
        let status = strategy.scan(&ScanJob::new(resume, 4, 5), &mut engine, &mut framebuffer);
        assert_eq!(status, ScanStatus::Completed);
        assert_eq!(engine.calls[0], (1, 2));
        // Row 3 is an even offset from the origin again.
        assert!(engine.calls.contains(&(1, 3)));
        assert!(!engine.calls.contains(&(0, 3)));
    }
}
