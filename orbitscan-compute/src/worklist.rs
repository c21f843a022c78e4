//! Bounded queue of pending work items.
//!
//! The queue is kept tidy on every insertion: windows that have not been
//! started and share an edge, pass and symmetry state are merged, and the
//! rest is ordered by pass, then row, then column.

use orbitscan_core::{CalcError, CalcMode, PixelRect, ResumeSnapshot, ScanCursor, WorkItem};

/// Capacity of the work list.
pub const MAX_CALC_WORK: usize = 12;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct WorkList {
    items: Vec<WorkItem>,
}

impl WorkList {
    pub fn new() -> Self {
        Self {
            items: Vec::with_capacity(MAX_CALC_WORK),
        }
    }

    /// Rebuild a list from persisted items, in their saved order.
    pub fn from_items(items: Vec<WorkItem>) -> Result<Self, CalcError> {
        if items.len() > MAX_CALC_WORK {
            return Err(CalcError::WorkListFull {
                capacity: MAX_CALC_WORK,
            });
        }
        Ok(Self { items })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether `count` more items fit.
    pub fn has_room(&self, count: usize) -> bool {
        self.items.len() + count <= MAX_CALC_WORK
    }

    pub fn items(&self) -> &[WorkItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<WorkItem> {
        self.items
    }

    pub fn add(&mut self, item: WorkItem) -> Result<(), CalcError> {
        if !self.has_room(1) {
            return Err(CalcError::WorkListFull {
                capacity: MAX_CALC_WORK,
            });
        }
        self.items.push(item);
        self.tidy();
        Ok(())
    }

    /// Take the front item.
    pub fn pop(&mut self) -> Option<WorkItem> {
        if self.items.is_empty() {
            None
        } else {
            Some(self.items.remove(0))
        }
    }

    pub fn lowest_pending_pass(&self) -> Option<u32> {
        self.items.iter().map(|item| item.pass).min()
    }

    fn tidy(&mut self) {
        while let Some(gone) = self.combine() {
            self.items.remove(gone);
        }
        self.items
            .sort_by_key(|item| (item.pass, item.y_start, item.x_start));
    }

    /// Merge the first mergeable pair, returning the index of the absorbed item.
    fn combine(&mut self) -> Option<usize> {
        for i in 0..self.items.len() {
            if !self.items[i].is_fresh() {
                continue;
            }
            for j in i + 1..self.items.len() {
                let (a, b) = (self.items[i], self.items[j]);
                if !b.is_fresh()
                    || a.sym != b.sym
                    || a.pass != b.pass
                    || a.pass_two_queued != b.pass_two_queued
                    || (a.keeps_parity() && !same_parity(&a, &b))
                {
                    continue;
                }
                let merged = if a.x_start == b.x_start && a.x_stop == b.x_stop {
                    if a.y_stop + 1 == b.y_start {
                        Some(PixelRect::new(a.x_start, a.x_stop, a.y_start, b.y_stop))
                    } else if b.y_stop + 1 == a.y_start {
                        Some(PixelRect::new(a.x_start, a.x_stop, b.y_start, a.y_stop))
                    } else {
                        None
                    }
                } else if a.y_start == b.y_start && a.y_stop == b.y_stop {
                    if a.x_stop + 1 == b.x_start {
                        Some(PixelRect::new(a.x_start, b.x_stop, a.y_start, a.y_stop))
                    } else if b.x_stop + 1 == a.x_start {
                        Some(PixelRect::new(b.x_start, a.x_stop, a.y_start, a.y_stop))
                    } else {
                        None
                    }
                } else {
                    None
                };
                if let Some(rect) = merged {
                    let mut item = WorkItem::new(rect, a.pass, a.sym);
                    item.pass_two_queued = a.pass_two_queued;
                    self.items[i] = item;
                    return Some(j);
                }
            }
        }
        None
    }

    /// Move every item by the given screen offset.
    pub fn offset_items(&mut self, rows: i32, cols: i32) {
        for item in &mut self.items {
            item.y_start -= rows;
            item.y_stop -= rows;
            item.y_begin -= rows;
            item.x_start -= cols;
            item.x_stop -= cols;
            item.x_begin -= cols;
        }
    }

    /// Bring items back onto a `x_dots` by `y_dots` screen.
    ///
    /// Items entirely off screen are dropped and partially visible ones are
    /// clipped. A mirrored window cut on its mirror axis, a diffusion
    /// window cut at all, or a two-pass window whose origin moves by an odd
    /// number of pixels loses its progress; the returned rectangles are
    /// the areas restarted from scratch, which the caller should clear.
    pub fn fix(&mut self, x_dots: u32, y_dots: u32) -> Vec<PixelRect> {
        let screen = PixelRect::screen(x_dots, y_dots);
        let mut restarted = Vec::new();
        let mut kept = Vec::with_capacity(self.items.len());
        for item in &self.items {
            let Some(clipped) = item.rect().intersect(&screen) else {
                continue;
            };
            if clipped == item.rect() {
                kept.push(*item);
                continue;
            }
            let rows_cut = clipped.y_start != item.y_start || clipped.y_stop != item.y_stop;
            let cols_cut = clipped.x_start != item.x_start || clipped.x_stop != item.x_stop;
            if (rows_cut && item.sym.x_axis_mirrored)
                || (cols_cut && item.sym.y_axis_mirrored)
                || item.cursor != ScanCursor::Raster
                || (item.keeps_parity() && !same_parity(item, &WorkItem::new(clipped, 0, item.sym)))
            {
                restarted.push(clipped);
                kept.push(WorkItem::new(clipped, 0, Default::default()));
                continue;
            }

            let mut fixed = *item;
            fixed.x_start = clipped.x_start;
            fixed.x_stop = clipped.x_stop;
            fixed.y_start = clipped.y_start;
            fixed.y_stop = clipped.y_stop;
            if fixed.y_begin < fixed.y_start {
                fixed.y_begin = fixed.y_start;
                fixed.x_begin = fixed.x_start;
                fixed.periodicity_hint = None;
            }
            fixed.y_begin = fixed.y_begin.min(fixed.y_stop);
            let x_begin = fixed.x_begin.clamp(fixed.x_start, fixed.x_stop);
            if x_begin != fixed.x_begin {
                fixed.x_begin = x_begin;
                fixed.periodicity_hint = None;
            }
            kept.push(fixed);
        }
        self.items = kept;
        self.tidy();
        restarted
    }
}

/// Whether two windows start an even number of pixels apart on both axes.
fn same_parity(a: &WorkItem, b: &WorkItem) -> bool {
    (a.x_start - b.x_start) & 1 == 0 && (a.y_start - b.y_start) & 1 == 0
}

/// A snapshot moved to follow a panned view.
#[derive(Clone, Debug, PartialEq)]
pub struct PannedSnapshot {
    pub snapshot: ResumeSnapshot,
    /// Areas whose earlier progress was discarded.
    pub restarted: Vec<PixelRect>,
}

/// Re-target a snapshot at a view panned so that old pixel `(cols, rows)`
/// becomes the new top-left pixel.
///
/// The caller moves the already computed pixels by the same offset; the
/// strips uncovered by the move are queued as fresh windows. Two-pass
/// snapshots only pan by even offsets, so that the coarse pass keeps its
/// pixel parity.
pub fn pan_snapshot(
    snapshot: &ResumeSnapshot,
    rows: i32,
    cols: i32,
    calc_mode: CalcMode,
) -> Result<PannedSnapshot, CalcError> {
    let alignment = match calc_mode {
        CalcMode::TwoPass => 2,
        CalcMode::OnePass | CalcMode::Diffusion => 1,
    };
    if rows % alignment != 0 || cols % alignment != 0 {
        return Err(CalcError::PanMisaligned { alignment });
    }

    let x_dots = snapshot.x_dots;
    let y_dots = snapshot.y_dots;
    let last_col = x_dots as i32 - 1;
    let last_row = y_dots as i32 - 1;

    let mut list = WorkList::from_items(snapshot.items.clone())?;
    list.offset_items(rows, cols);
    let restarted = list.fix(x_dots, y_dots);

    let mut top = 0;
    let mut bottom = last_row;
    if rows < 0 {
        list.add(fresh(0, last_col, 0, -rows - 1))?;
        top = -rows;
    }
    if rows > 0 {
        list.add(fresh(0, last_col, last_row + 1 - rows, last_row))?;
        bottom = last_row - rows;
    }
    if cols < 0 {
        list.add(fresh(0, -cols - 1, top, bottom))?;
    }
    if cols > 0 {
        list.add(fresh(last_col + 1 - cols, last_col, top, bottom))?;
    }

    log::debug!(
        "panned snapshot by ({cols}, {rows}): {} items, {} restarted",
        list.len(),
        restarted.len()
    );
    Ok(PannedSnapshot {
        snapshot: ResumeSnapshot::new(x_dots, y_dots, list.into_items(), snapshot.scratch),
        restarted,
    })
}

fn fresh(x_start: i32, x_stop: i32, y_start: i32, y_stop: i32) -> WorkItem {
    WorkItem::new(
        PixelRect::new(x_start, x_stop, y_start, y_stop),
        0,
        Default::default(),
    )
}
