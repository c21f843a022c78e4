//! Resume state handed to the save/load collaborator.
//!
//! The snapshot only fixes the in-memory shape; callers choose the
//! serialization format.

use crate::{CalcError, NumericMode, PixelRect, WorkItem};
use serde::{Deserialize, Serialize};

pub const SNAPSHOT_VERSION: u32 = 1;

/// Diffusion counters never reach this, however large the window.
const MAX_DIFFUSION_COUNTER: u64 = 1 << 24;

/// Context values that must not change between an interrupted run and its
/// resumption.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContextScratch {
    /// Backend chosen for the image, never `Auto`.
    pub numeric_mode: NumericMode,
    pub bit_shift: u32,
    pub precision_bits: usize,
    /// Modulus limit after potential and distance estimator adjustments.
    pub magnitude_limit: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResumeSnapshot {
    pub version: u32,
    pub x_dots: u32,
    pub y_dots: u32,
    /// Pending windows in queue order.
    pub items: Vec<WorkItem>,
    pub scratch: ContextScratch,
}

impl ResumeSnapshot {
    pub fn new(x_dots: u32, y_dots: u32, items: Vec<WorkItem>, scratch: ContextScratch) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            x_dots,
            y_dots,
            items,
            scratch,
        }
    }

    /// Reject snapshots this build cannot resume on the given screen.
    pub fn check(&self, x_dots: u32, y_dots: u32) -> Result<(), CalcError> {
        if self.version != SNAPSHOT_VERSION {
            return Err(CalcError::UnsupportedSnapshot {
                version: self.version,
            });
        }
        let screen = PixelRect::screen(x_dots, y_dots);
        let fits = self.items.iter().all(|item| {
            let rect = item.rect();
            !rect.is_empty()
                && screen.contains(rect.x_start, rect.y_start)
                && screen.contains(rect.x_stop, rect.y_stop)
                && rect.contains(item.x_begin, item.y_begin)
                && cursor_fits(item)
        });
        if self.x_dots != x_dots || self.y_dots != y_dots || !fits {
            return Err(CalcError::SnapshotMismatch);
        }
        Ok(())
    }

    /// Number of pixels still to be visited, ignoring symmetry.
    pub fn pending_area(&self) -> u64 {
        self.items.iter().map(|item| item.rect().area()).sum()
    }
}

/// A diffusion cursor can only have stopped short of the last counter
/// value and tile slot of some tiling of the window.
fn cursor_fits(item: &WorkItem) -> bool {
    let (counter, tile) = item.cursor.diffusion_position();
    let rect = item.rect();
    let (w, h) = (rect.width() as u64, rect.height() as u64);
    u64::from(counter) < (w * h).min(MAX_DIFFUSION_COUNTER) && u64::from(tile) < (w + 1) * (h + 1)
}
