use crate::PixelRect;
use serde::{Deserialize, Serialize};

/// Per-window record of symmetry decisions.
///
/// A window that was already split on an axis keeps the decision here, so
/// resuming it re-derives the same mirrored plan instead of splitting again.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SymmetryFlags {
    /// Mirroring across the x axis (top/bottom halves) was considered.
    pub x_axis_decided: bool,
    pub x_axis_mirrored: bool,
    /// Mirroring across the y axis (left/right halves) was considered.
    pub y_axis_decided: bool,
    pub y_axis_mirrored: bool,
}

impl SymmetryFlags {
    /// Both axes considered, neither mirrored.
    pub const DECIDED_NONE: SymmetryFlags = SymmetryFlags {
        x_axis_decided: true,
        x_axis_mirrored: false,
        y_axis_decided: true,
        y_axis_mirrored: false,
    };
}

/// Where a strategy picks up inside a window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScanCursor {
    /// Raster position given by the window's begin coordinates and pass.
    #[default]
    Raster,
    /// Diffusion counter, stored as two 16-bit halves, plus the next tile
    /// to visit for that counter value.
    Diffusion {
        counter_high: u16,
        counter_low: u16,
        tile: u32,
    },
}

impl ScanCursor {
    pub fn diffusion(counter: u32, tile: u32) -> Self {
        ScanCursor::Diffusion {
            counter_high: (counter >> 16) as u16,
            counter_low: (counter & 0xffff) as u16,
            tile,
        }
    }

    /// Diffusion counter and tile, `(0, 0)` for a raster cursor.
    pub fn diffusion_position(&self) -> (u32, u32) {
        match *self {
            ScanCursor::Raster => (0, 0),
            ScanCursor::Diffusion {
                counter_high,
                counter_low,
                tile,
            } => (((counter_high as u32) << 16) | counter_low as u32, tile),
        }
    }
}

/// Rectangular unit of pending work.
///
/// All coordinates are inclusive screen pixels. `x_begin`/`y_begin` mark
/// the next pixel to compute for raster strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkItem {
    pub x_start: i32,
    pub x_stop: i32,
    pub x_begin: i32,
    pub y_start: i32,
    pub y_stop: i32,
    pub y_begin: i32,
    pub pass: u32,
    pub sym: SymmetryFlags,
    pub cursor: ScanCursor,
    /// The deferred second pass of this window is already queued.
    #[serde(default)]
    pub pass_two_queued: bool,
    /// Periodicity threshold carried into the first pixel on resume.
    #[serde(default)]
    pub periodicity_hint: Option<u32>,
}

impl WorkItem {
    pub fn new(rect: PixelRect, pass: u32, sym: SymmetryFlags) -> Self {
        Self {
            x_start: rect.x_start,
            x_stop: rect.x_stop,
            x_begin: rect.x_start,
            y_start: rect.y_start,
            y_stop: rect.y_stop,
            y_begin: rect.y_start,
            pass,
            sym,
            cursor: ScanCursor::Raster,
            pass_two_queued: false,
            periodicity_hint: None,
        }
    }

    /// The whole screen, unstarted.
    pub fn screen(x_dots: u32, y_dots: u32) -> Self {
        Self::new(PixelRect::screen(x_dots, y_dots), 0, SymmetryFlags::default())
    }

    /// Whether a coarse pass has run, or may have run, over this window.
    /// The fine pass then depends on the parity of the window's origin.
    pub fn keeps_parity(&self) -> bool {
        self.pass != 0 || self.pass_two_queued
    }

    pub fn rect(&self) -> PixelRect {
        PixelRect::new(self.x_start, self.x_stop, self.y_start, self.y_stop)
    }

    /// Nothing in this window has been computed yet.
    pub fn is_fresh(&self) -> bool {
        self.x_begin == self.x_start
            && self.y_begin == self.y_start
            && self.cursor == ScanCursor::Raster
            && self.periodicity_hint.is_none()
    }

    /// Same window with progress discarded and symmetry undecided.
    pub fn restarted(&self) -> Self {
        Self::new(self.rect(), 0, SymmetryFlags::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screen_item_covers_everything() {
        let item = WorkItem::screen(320, 200);
        assert_eq!(item.rect(), PixelRect::new(0, 319, 0, 199));
        assert!(item.is_fresh());
    }

    #[test]
    fn diffusion_cursor_splits_counter_into_halves() {
        let cursor = ScanCursor::diffusion(0x00ab_cdef, 3);
        assert_eq!(
            cursor,
            ScanCursor::Diffusion {
                counter_high: 0x00ab,
                counter_low: 0xcdef,
                tile: 3
            }
        );
        assert_eq!(cursor.diffusion_position(), (0x00ab_cdef, 3));
    }

    #[test]
    fn restarted_clears_progress_and_symmetry() {
        let mut item = WorkItem::screen(10, 10);
        item.y_begin = 4;
        item.pass = 2;
        item.sym.x_axis_decided = true;
        item.periodicity_hint = Some(42);
        let fresh = item.restarted();
        assert!(fresh.is_fresh());
        assert_eq!(fresh.pass, 0);
        assert_eq!(fresh.sym, SymmetryFlags::default());
    }

    #[test]
    fn work_item_serialization_roundtrip() {
        let mut item = WorkItem::screen(64, 48);
        item.cursor = ScanCursor::diffusion(77, 1);
        let json = serde_json::to_string(&item).unwrap();
        let restored: WorkItem = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, item);
    }
}
