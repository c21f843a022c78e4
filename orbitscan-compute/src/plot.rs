//! Pixel sinks and the symmetry plot adapters that sit in front of them.

use orbitscan_core::PixelRect;

/// Destination for computed colors.
pub trait PlotSink {
    fn write(&mut self, x: i32, y: i32, color: u32);

    /// Fill `x_start..=x_stop` on row `y` with one color.
    fn fill_run(&mut self, x_start: i32, x_stop: i32, y: i32, color: u32) {
        for x in x_start..=x_stop {
            self.write(x, y, color);
        }
    }
}

/// In-memory image of palette indices, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn get(&self, x: i32, y: i32) -> Option<u32> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }
}

impl PlotSink for Framebuffer {
    fn write(&mut self, x: i32, y: i32, color: u32) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color;
        }
    }

    fn fill_run(&mut self, x_start: i32, x_stop: i32, y: i32, color: u32) {
        let x_start = x_start.max(0);
        let x_stop = x_stop.min(self.width as i32 - 1);
        if x_start > x_stop {
            return;
        }
        if let (Some(a), Some(b)) = (self.index(x_start, y), self.index(x_stop, y)) {
            self.pixels[a..=b].fill(color);
        }
    }
}

/// How writes are replicated for the window being scanned.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SymmetryPlan {
    /// Calculator draws nothing through the plot primitive.
    NoPlot,
    #[default]
    None,
    XAxis,
    YAxis,
    XYAxis,
    Origin,
    Pi,
    PiOrigin,
    PiXYAxis,
}

/// Window geometry the mirrored coordinates are derived from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlotGeometry {
    /// Bounds of the work item (after any split).
    pub window: PixelRect,
    /// Last column and row the strategy iterates over.
    pub x_stop: i32,
    pub y_stop: i32,
    pub x_dots: i32,
    pub y_dots: i32,
    /// Horizontal repeat period for the pi plans.
    pub pixel_pi: i32,
}

impl PlotGeometry {
    /// Geometry of a window plotted without mirroring.
    pub fn plain(window: PixelRect, x_dots: u32, y_dots: u32) -> Self {
        Self {
            window,
            x_stop: window.x_stop,
            y_stop: window.y_stop,
            x_dots: x_dots as i32,
            y_dots: y_dots as i32,
            pixel_pi: 0,
        }
    }

    /// Row mirrored across the x axis, if it lies past the iterated rows.
    #[inline]
    fn mirror_row(&self, y: i32) -> Option<i32> {
        let i = self.window.y_stop - (y - self.window.y_start);
        (i > self.y_stop && i < self.y_dots).then_some(i)
    }

    /// Column mirrored across the y axis, if it is on screen.
    #[inline]
    fn mirror_col(&self, x: i32) -> Option<i32> {
        let j = self.window.x_stop - (x - self.window.x_start);
        (j < self.x_dots).then_some(j)
    }

    /// Mirror of the run `left..=right`, clipped to the screen.
    fn mirror_run(&self, left: i32, right: i32) -> Option<(i32, i32)> {
        let last = self.x_dots - 1;
        let j = (self.window.x_stop - (right - self.window.x_start)).min(last);
        let k = (self.window.x_stop - (left - self.window.x_start)).min(last);
        (j <= k).then_some((j, k))
    }
}

/// Plot adapter: applies a [`SymmetryPlan`] to every write before it
/// reaches the sink.
pub struct SymmetricPlot<'a> {
    plan: SymmetryPlan,
    geometry: PlotGeometry,
    sink: &'a mut dyn PlotSink,
}

impl<'a> SymmetricPlot<'a> {
    pub fn new(plan: SymmetryPlan, geometry: PlotGeometry, sink: &'a mut dyn PlotSink) -> Self {
        Self {
            plan,
            geometry,
            sink,
        }
    }

    fn write_pi(&mut self, mut x: i32, y: i32, color: u32, origin: bool) {
        let g = self.geometry;
        let step = g.pixel_pi.max(1);
        while x <= g.window.x_stop {
            self.sink.write(x, y, color);
            if origin {
                if let (Some(i), Some(j)) = (g.mirror_row(y), g.mirror_col(x)) {
                    self.sink.write(j, i, color);
                }
            }
            x += step;
        }
    }

    fn write_pi_four_way(&mut self, mut x: i32, y: i32, color: u32) {
        let g = self.geometry;
        let step = g.pixel_pi.max(1);
        let half = (g.window.x_start + g.window.x_stop) / 2;
        while x <= half {
            self.write_four_way(x, y, color);
            x += step;
        }
    }

    fn write_four_way(&mut self, x: i32, y: i32, color: u32) {
        let g = self.geometry;
        let j = g.mirror_col(x);
        self.sink.write(x, y, color);
        if let Some(j) = j {
            self.sink.write(j, y, color);
        }
        if let Some(i) = g.mirror_row(y) {
            self.sink.write(x, i, color);
            if let Some(j) = j {
                self.sink.write(j, i, color);
            }
        }
    }
}

impl PlotSink for SymmetricPlot<'_> {
    fn write(&mut self, x: i32, y: i32, color: u32) {
        let g = self.geometry;
        match self.plan {
            SymmetryPlan::NoPlot => {}
            SymmetryPlan::None => self.sink.write(x, y, color),
            SymmetryPlan::XAxis => {
                self.sink.write(x, y, color);
                if let Some(i) = g.mirror_row(y) {
                    self.sink.write(x, i, color);
                }
            }
            SymmetryPlan::YAxis => {
                self.sink.write(x, y, color);
                if let Some(j) = g.mirror_col(x) {
                    self.sink.write(j, y, color);
                }
            }
            SymmetryPlan::Origin => {
                self.sink.write(x, y, color);
                if let (Some(i), Some(j)) = (g.mirror_row(y), g.mirror_col(x)) {
                    self.sink.write(j, i, color);
                }
            }
            SymmetryPlan::XYAxis => self.write_four_way(x, y, color),
            SymmetryPlan::Pi => self.write_pi(x, y, color, false),
            SymmetryPlan::PiOrigin => self.write_pi(x, y, color, true),
            SymmetryPlan::PiXYAxis => self.write_pi_four_way(x, y, color),
        }
    }

    fn fill_run(&mut self, left: i32, right: i32, y: i32, color: u32) {
        if left > right {
            return;
        }
        let g = self.geometry;
        match self.plan {
            SymmetryPlan::NoPlot => {}
            SymmetryPlan::None => self.sink.fill_run(left, right, y, color),
            SymmetryPlan::XAxis => {
                self.sink.fill_run(left, right, y, color);
                if let Some(i) = g.mirror_row(y) {
                    self.sink.fill_run(left, right, i, color);
                }
            }
            SymmetryPlan::YAxis => {
                self.sink.fill_run(left, right, y, color);
                if let Some((j, k)) = g.mirror_run(left, right) {
                    self.sink.fill_run(j, k, y, color);
                }
            }
            SymmetryPlan::Origin => {
                self.sink.fill_run(left, right, y, color);
                if let (Some(i), Some((j, k))) = (g.mirror_row(y), g.mirror_run(left, right)) {
                    self.sink.fill_run(j, k, i, color);
                }
            }
            SymmetryPlan::XYAxis => {
                let mirrored = g.mirror_run(left, right);
                self.sink.fill_run(left, right, y, color);
                if let Some((j, k)) = mirrored {
                    self.sink.fill_run(j, k, y, color);
                }
                if let Some(i) = g.mirror_row(y) {
                    self.sink.fill_run(left, right, i, color);
                    if let Some((j, k)) = mirrored {
                        self.sink.fill_run(j, k, i, color);
                    }
                }
            }
            SymmetryPlan::Pi | SymmetryPlan::PiOrigin | SymmetryPlan::PiXYAxis => {
                for x in left..=right {
                    self.write(x, y, color);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records every write that reaches it.
    #[derive(Default)]
    struct Recorder {
        writes: Vec<(i32, i32, u32)>,
    }

    impl PlotSink for Recorder {
        fn write(&mut self, x: i32, y: i32, color: u32) {
            self.writes.push((x, y, color));
        }
    }

    fn geometry(x_stop: i32, y_stop: i32) -> PlotGeometry {
        PlotGeometry {
            window: PixelRect::new(0, 9, 0, 9),
            x_stop,
            y_stop,
            x_dots: 10,
            y_dots: 10,
            pixel_pi: 0,
        }
    }

    fn writes(plan: SymmetryPlan, geometry: PlotGeometry, x: i32, y: i32) -> Vec<(i32, i32, u32)> {
        let mut recorder = Recorder::default();
        SymmetricPlot::new(plan, geometry, &mut recorder).write(x, y, 3);
        recorder.writes
    }

    #[test]
    fn none_plan_passes_writes_through() {
        assert_eq!(writes(SymmetryPlan::None, geometry(9, 9), 2, 3), vec![(2, 3, 3)]);
        assert!(writes(SymmetryPlan::NoPlot, geometry(9, 9), 2, 3).is_empty());
    }

    #[test]
    fn x_axis_mirrors_rows_past_the_stop() {
        let g = geometry(9, 4);
        assert_eq!(writes(SymmetryPlan::XAxis, g, 2, 1), vec![(2, 1, 3), (2, 8, 3)]);
        // The row on the axis is its own mirror and is written once.
        let g = PlotGeometry {
            window: PixelRect::new(0, 9, 0, 8),
            ..geometry(9, 4)
        };
        assert_eq!(writes(SymmetryPlan::XAxis, g, 5, 4), vec![(5, 4, 3)]);
    }

    #[test]
    fn y_axis_and_origin_mirror_columns() {
        let g = geometry(4, 9);
        assert_eq!(writes(SymmetryPlan::YAxis, g, 1, 6), vec![(1, 6, 3), (8, 6, 3)]);
        let g = geometry(9, 4);
        assert_eq!(writes(SymmetryPlan::Origin, g, 1, 2), vec![(1, 2, 3), (8, 7, 3)]);
    }

    #[test]
    fn xy_axis_writes_four_quadrants() {
        let got = writes(SymmetryPlan::XYAxis, geometry(4, 4), 1, 2);
        assert_eq!(got, vec![(1, 2, 3), (8, 2, 3), (1, 7, 3), (8, 7, 3)]);
    }

    #[test]
    fn pi_fans_out_across_the_row() {
        let g = PlotGeometry {
            pixel_pi: 4,
            ..geometry(3, 9)
        };
        assert_eq!(
            writes(SymmetryPlan::Pi, g, 1, 5),
            vec![(1, 5, 3), (5, 5, 3), (9, 5, 3)]
        );
    }

    #[test]
    fn pi_xy_stops_at_half_window() {
        let g = PlotGeometry {
            pixel_pi: 3,
            ..geometry(2, 4)
        };
        let got = writes(SymmetryPlan::PiXYAxis, g, 0, 0);
        // x = 0 and x = 3 are at or left of the midpoint column 4.
        assert_eq!(got.len(), 8);
        assert!(got.contains(&(6, 9, 3)));
        assert!(got.iter().all(|&(x, y, _)| (0..10).contains(&x) && (0..10).contains(&y)));
    }

    #[test]
    fn fill_run_mirrors_like_writes() {
        let mut framebuffer = Framebuffer::new(10, 10);
        {
            let mut plot = SymmetricPlot::new(SymmetryPlan::XYAxis, geometry(4, 4), &mut framebuffer);
            plot.fill_run(0, 1, 0, 5);
        }
        for (x, y) in [(0, 0), (1, 0), (8, 0), (9, 0), (0, 9), (1, 9), (8, 9), (9, 9)] {
            assert_eq!(framebuffer.get(x, y), Some(5), "({x}, {y})");
        }
        assert_eq!(framebuffer.get(2, 0), Some(0));
    }

    #[test]
    fn framebuffer_ignores_off_screen_writes() {
        let mut framebuffer = Framebuffer::new(4, 3);
        framebuffer.write(-1, 0, 9);
        framebuffer.write(4, 0, 9);
        framebuffer.fill_run(-3, 10, 2, 7);
        assert_eq!(framebuffer.get(0, 2), Some(7));
        assert_eq!(framebuffer.get(3, 2), Some(7));
        assert_eq!(framebuffer.pixels().iter().filter(|&&c| c == 9).count(), 0);
        assert_eq!(framebuffer.get(4, 2), None);
    }
}
