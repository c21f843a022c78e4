//! Diffusion scan.
//!
//! The window is cut into square tiles of side `2^(bits/2)`. A counter runs
//! over `0..2^bits`; each value is decoded, byte by byte, into an offset
//! inside a tile, and that offset is computed in every tile before the
//! counter moves on. The decoding reverses and interleaves the counter
//! bits, so early values land on a coarse grid that keeps getting finer.

use super::{ScanJob, ScanStatus, ScanStrategy};
use crate::engine::PixelEngine;
use crate::plot::PlotSink;
use orbitscan_core::{ScanCursor, WorkItem};

/// Counter width cap: three table bytes per axis-pair.
const MAX_BITS: u32 = 24;

/// Column nibble for each counter byte.
const DIFFUSION_LA: [u8; 256] = [
    0, 8, 0, 8, 4, 12, 4, 12, 0, 8, 0, 8, 4, 12, 4, 12,
    2, 10, 2, 10, 6, 14, 6, 14, 2, 10, 2, 10, 6, 14, 6, 14,
    0, 8, 0, 8, 4, 12, 4, 12, 0, 8, 0, 8, 4, 12, 4, 12,
    2, 10, 2, 10, 6, 14, 6, 14, 2, 10, 2, 10, 6, 14, 6, 14,
    1, 9, 1, 9, 5, 13, 5, 13, 1, 9, 1, 9, 5, 13, 5, 13,
    3, 11, 3, 11, 7, 15, 7, 15, 3, 11, 3, 11, 7, 15, 7, 15,
    1, 9, 1, 9, 5, 13, 5, 13, 1, 9, 1, 9, 5, 13, 5, 13,
    3, 11, 3, 11, 7, 15, 7, 15, 3, 11, 3, 11, 7, 15, 7, 15,
    0, 8, 0, 8, 4, 12, 4, 12, 0, 8, 0, 8, 4, 12, 4, 12,
    2, 10, 2, 10, 6, 14, 6, 14, 2, 10, 2, 10, 6, 14, 6, 14,
    0, 8, 0, 8, 4, 12, 4, 12, 0, 8, 0, 8, 4, 12, 4, 12,
    2, 10, 2, 10, 6, 14, 6, 14, 2, 10, 2, 10, 6, 14, 6, 14,
    1, 9, 1, 9, 5, 13, 5, 13, 1, 9, 1, 9, 5, 13, 5, 13,
    3, 11, 3, 11, 7, 15, 7, 15, 3, 11, 3, 11, 7, 15, 7, 15,
    1, 9, 1, 9, 5, 13, 5, 13, 1, 9, 1, 9, 5, 13, 5, 13,
    3, 11, 3, 11, 7, 15, 7, 15, 3, 11, 3, 11, 7, 15, 7, 15,
];

/// Row nibble for each counter byte.
const DIFFUSION_LB: [u8; 256] = [
    0, 8, 8, 0, 4, 12, 12, 4, 4, 12, 12, 4, 8, 0, 0, 8,
    2, 10, 10, 2, 6, 14, 14, 6, 6, 14, 14, 6, 10, 2, 2, 10,
    2, 10, 10, 2, 6, 14, 14, 6, 6, 14, 14, 6, 10, 2, 2, 10,
    4, 12, 12, 4, 8, 0, 0, 8, 8, 0, 0, 8, 12, 4, 4, 12,
    1, 9, 9, 1, 5, 13, 13, 5, 5, 13, 13, 5, 9, 1, 1, 9,
    3, 11, 11, 3, 7, 15, 15, 7, 7, 15, 15, 7, 11, 3, 3, 11,
    3, 11, 11, 3, 7, 15, 15, 7, 7, 15, 15, 7, 11, 3, 3, 11,
    5, 13, 13, 5, 9, 1, 1, 9, 9, 1, 1, 9, 13, 5, 5, 13,
    1, 9, 9, 1, 5, 13, 13, 5, 5, 13, 13, 5, 9, 1, 1, 9,
    3, 11, 11, 3, 7, 15, 15, 7, 7, 15, 15, 7, 11, 3, 3, 11,
    3, 11, 11, 3, 7, 15, 15, 7, 7, 15, 15, 7, 11, 3, 3, 11,
    5, 13, 13, 5, 9, 1, 1, 9, 9, 1, 1, 9, 13, 5, 5, 13,
    2, 10, 10, 2, 6, 14, 14, 6, 6, 14, 14, 6, 10, 2, 2, 10,
    4, 12, 12, 4, 8, 0, 0, 8, 8, 0, 0, 8, 12, 4, 4, 12,
    4, 12, 12, 4, 8, 0, 0, 8, 8, 0, 0, 8, 12, 4, 4, 12,
    6, 14, 14, 6, 10, 2, 2, 10, 10, 2, 2, 10, 14, 6, 6, 14,
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DiffusionScan;

/// Tiling of one window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Tiling {
    bits: u32,
    side: i32,
    /// Whole tiles across and down.
    nx: i32,
    ny: i32,
    /// Width of the right strip and height of the bottom strip.
    rem_x: i32,
    rem_y: i32,
    shift: u32,
}

impl Tiling {
    fn new(width: i32, height: i32) -> Self {
        let smaller = width.min(height).max(1) as u32;
        let bits = (smaller.ilog2() * 2).min(MAX_BITS);
        let side = 1 << (bits / 2);
        let nx = width / side;
        let ny = height / side;
        Self {
            bits,
            side,
            nx,
            ny,
            rem_x: width - nx * side,
            rem_y: height - ny * side,
            shift: 12 - bits / 2,
        }
    }

    fn limit(&self) -> u32 {
        1 << self.bits
    }

    /// Tile slots per counter value, strips included.
    fn slots(&self) -> u32 {
        ((self.nx + 1) * (self.ny + 1)) as u32
    }

    /// Offset inside a tile for counter value `counter`.
    fn offset(&self, mut counter: u32) -> (i32, i32) {
        let (mut x, mut y) = (0i32, 0i32);
        for _ in 0..3 {
            let byte = (counter & 0xff) as usize;
            x = (x << 4) + DIFFUSION_LA[byte] as i32;
            y = (y << 4) + DIFFUSION_LB[byte] as i32;
            counter >>= 8;
        }
        (x >> self.shift, y >> self.shift)
    }

    /// Top-left of tile slot `slot` shifted by `(colo, rowo)`, or `None`
    /// when the slot is in a strip too narrow for that offset.
    fn point(&self, slot: u32, colo: i32, rowo: i32) -> Option<(i32, i32)> {
        let i = slot as i32 / (self.ny + 1);
        let j = slot as i32 % (self.ny + 1);
        if (i == self.nx && colo >= self.rem_x) || (j == self.ny && rowo >= self.rem_y) {
            return None;
        }
        Some((colo + i * self.side, rowo + j * self.side))
    }

    /// Side of the preview square drawn for `counter`.
    fn block_size(&self, counter: u32) -> i32 {
        let level = (counter as f64 + 0.5).log2() as i32;
        1 << ((self.bits as i32 - level - 1) / 2).max(0)
    }
}

impl ScanStrategy for DiffusionScan {
    fn accepts_symmetry(&self) -> bool {
        true
    }

    fn scan(&self, job: &ScanJob, engine: &mut dyn PixelEngine, plot: &mut dyn PlotSink) -> ScanStatus {
        let item = job.item;
        let tiling = Tiling::new(job.x_stop - item.x_start + 1, job.y_stop - item.y_start + 1);
        let (mut counter, mut slot) = item.cursor.diffusion_position();
        let limit = tiling.limit();

        while counter < limit {
            let (colo, rowo) = tiling.offset(counter);
            let block = if job.preview && counter < limit / 2 {
                tiling.block_size(counter)
            } else {
                1
            };
            while slot < tiling.slots() {
                let Some((dx, dy)) = tiling.point(slot, colo, rowo) else {
                    slot += 1;
                    continue;
                };
                let (col, row) = (item.x_start + dx, item.y_start + dy);
                if engine.should_stop() {
                    return interrupted(item, counter, slot);
                }
                let Ok(color) = engine.calculate(col, row, &mut None) else {
                    return interrupted(item, counter, slot);
                };
                if block == 1 {
                    plot.write(col, row, color);
                } else {
                    let right = (col + block - 1).min(job.x_stop);
                    for y in row..=(row + block - 1).min(job.y_stop) {
                        plot.fill_run(col, right, y, color);
                    }
                }
                slot += 1;
            }
            slot = 0;
            counter += 1;
        }
        ScanStatus::Completed
    }
}

fn interrupted(item: WorkItem, counter: u32, slot: u32) -> ScanStatus {
    let mut resume = item;
    resume.cursor = ScanCursor::diffusion(counter, slot);
    ScanStatus::Interrupted {
        resume,
        deferred: None,
    }
}
