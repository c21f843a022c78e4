use serde::{Deserialize, Serialize};

/// Inclusive rectangle in screen pixel space
///
/// Both stop coordinates belong to the rectangle, so a single pixel has
/// `x_start == x_stop`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelRect {
    pub x_start: i32,
    pub x_stop: i32,
    pub y_start: i32,
    pub y_stop: i32,
}

impl PixelRect {
    pub fn new(x_start: i32, x_stop: i32, y_start: i32, y_stop: i32) -> Self {
        Self {
            x_start,
            x_stop,
            y_start,
            y_stop,
        }
    }

    /// Whole screen of the given size.
    pub fn screen(x_dots: u32, y_dots: u32) -> Self {
        Self::new(0, x_dots as i32 - 1, 0, y_dots as i32 - 1)
    }

    pub fn width(&self) -> i32 {
        (self.x_stop - self.x_start + 1).max(0)
    }

    pub fn height(&self) -> i32 {
        (self.y_stop - self.y_start + 1).max(0)
    }

    pub fn area(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x_start && x <= self.x_stop && y >= self.y_start && y <= self.y_stop
    }

    /// Overlap of two rectangles, if any.
    pub fn intersect(&self, other: &PixelRect) -> Option<PixelRect> {
        let rect = PixelRect::new(
            self.x_start.max(other.x_start),
            self.x_stop.min(other.x_stop),
            self.y_start.max(other.y_start),
            self.y_stop.min(other.y_stop),
        );
        (!rect.is_empty()).then_some(rect)
    }
}
