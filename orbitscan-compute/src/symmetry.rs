//! Symmetry planning.
//!
//! Decides, per work item, whether pixel writes can be mirrored and how far
//! the strategy has to iterate. A window whose mirror axis is off-centre is
//! split so that one piece is exactly symmetric; the other piece is queued.

use crate::plot::{PlotGeometry, SymmetryPlan};
use crate::worklist::WorkList;
use orbitscan_core::{
    BailoutKind, BigFloat, CalcError, ImageRequest, PixelRect, SymmetryClass, SymmetryFlags, WorkItem,
};
use std::f64::consts::PI;

/// Screen position of a mathematical axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Axis {
    /// Row or column, -1 when the axis is unusable.
    pos: i32,
    /// The axis falls between `pos` and `pos + 1`.
    between: bool,
}

impl Axis {
    const OFF_SCREEN: Axis = Axis {
        pos: -1,
        between: false,
    };

    /// Locate the zero of the range `lo..hi`, `hi` at pixel 0 when
    /// `from_hi` is set, over `dots` pixels.
    fn locate(lo: &BigFloat, hi: &BigFloat, dots: u32, from_hi: bool, splitting: bool) -> Axis {
        if signum(lo) == signum(hi) {
            return Axis::OFF_SCREEN;
        }
        let fraction = if from_hi {
            hi.div(&lo.sub(hi)).neg()
        } else {
            lo.div(&hi.sub(lo)).neg()
        };
        let t = fraction.to_f64() * (dots as f64 - 1.0) + 0.25;
        let pos = t as i32;
        let between = t - pos as f64 >= 0.5;
        // Without splitting only an axis dead in the centre is usable.
        if !splitting && (!between || (pos + 1) * 2 != dots as i32) {
            return Axis::OFF_SCREEN;
        }
        Axis { pos, between }
    }
}

fn signum(value: &BigFloat) -> i32 {
    if value.is_zero() {
        0
    } else if value.is_negative() {
        -1
    } else {
        1
    }
}

/// Window being planned and the iteration stops derived so far.
struct Window<'a> {
    item: &'a mut WorkItem,
    list: &'a mut WorkList,
    x_stop: i32,
    y_stop: i32,
}

/// Per-image symmetry decisions; [`SymmetryPlanner::plan`] applies them to
/// each window.
#[derive(Clone, Debug, PartialEq)]
pub struct SymmetryPlanner {
    /// `None` when a precondition vetoed symmetry for the whole image.
    class: Option<SymmetryClass>,
    x_axis: Axis,
    y_axis: Axis,
    params_zero: bool,
    params_no_real: bool,
    params_no_imag: bool,
    /// Inversion present and symmetry not forced.
    inverted: bool,
    pi_width_ok: bool,
    pixel_pi: i32,
    x_dots: u32,
    y_dots: u32,
}

impl SymmetryPlanner {
    pub fn new(request: &ImageRequest, declared: SymmetryClass, bailout: BailoutKind) -> Self {
        Self::with_splitting(request, declared, bailout, true)
    }

    /// As [`SymmetryPlanner::new`]; without `splitting` only windows whose
    /// axis sits exactly in the middle of the screen are mirrored.
    pub fn with_splitting(
        request: &ImageRequest,
        declared: SymmetryClass,
        bailout: BailoutKind,
        splitting: bool,
    ) -> Self {
        let view = &request.view;
        let config = &request.config;
        let width = view.width().abs().to_f64();
        let (p0, p1, p2, p3) = (
            request.param(0),
            request.param(1),
            request.param(2),
            request.param(3),
        );
        Self {
            class: Self::effective_class(request, declared, bailout),
            x_axis: Axis::locate(&view.y_min, &view.y_max, view.y_dots, true, splitting),
            y_axis: Axis::locate(&view.x_min, &view.x_max, view.x_dots, false, splitting),
            params_zero: p0 == 0.0 && p1 == 0.0 && p2 == 0.0 && p3 == 0.0,
            params_no_real: p0 == 0.0,
            params_no_imag: p1 == 0.0,
            inverted: config.inversion.is_some() && config.force_symmetry.is_none(),
            pi_width_ok: width >= PI / 4.0,
            pixel_pi: (PI / width * view.x_dots as f64) as i32,
            x_dots: view.x_dots,
            y_dots: view.y_dots,
        }
    }

    /// Declared class after forcing and the image-wide vetoes.
    fn effective_class(
        request: &ImageRequest,
        declared: SymmetryClass,
        bailout: BailoutKind,
    ) -> Option<SymmetryClass> {
        let config = &request.config;
        let forced = config.force_symmetry;
        if declared == SymmetryClass::NoPlot && forced.is_none() {
            return Some(SymmetryClass::NoPlot);
        }
        let off_centre = config.inversion.map_or((false, false), |inv| {
            (inv.center_re != 0.0, inv.center_im != 0.0)
        });
        if request.view.is_skewed()
            || (config.potential.is_some() && config.potential_16bit)
            || off_centre.1
            || config.decomposition != 0
        {
            return None;
        }
        let x_axis_class = matches!(declared, SymmetryClass::XAxis | SymmetryClass::XAxisNoParam);
        if off_centre.0 && !x_axis_class && forced.is_none() {
            return None;
        }
        match forced {
            Some(class) => Some(class),
            None if config.outside.breaks_symmetry() || bailout == BailoutKind::ManhattanReal => None,
            None => Some(declared),
        }
    }

    /// Plan `item`, splitting it through `list` when its axis is
    /// off-centre. The item is narrowed in place to the piece it keeps.
    pub fn plan(&self, item: &mut WorkItem, list: &mut WorkList) -> Result<(SymmetryPlan, PlotGeometry), CalcError> {
        let mut window = Window {
            x_stop: item.x_stop,
            y_stop: item.y_stop,
            item,
            list,
        };
        let plan = match self.class {
            None => SymmetryPlan::None,
            Some(class) => self.plan_class(class, &mut window)?,
        };
        let geometry = PlotGeometry {
            window: window.item.rect(),
            x_stop: window.x_stop,
            y_stop: window.y_stop,
            x_dots: self.x_dots as i32,
            y_dots: self.y_dots as i32,
            pixel_pi: if matches!(plan, SymmetryPlan::Pi | SymmetryPlan::PiOrigin | SymmetryPlan::PiXYAxis) {
                self.pixel_pi
            } else {
                0
            },
        };
        if plan != SymmetryPlan::None {
            log::trace!("window {:?} planned as {plan:?}", geometry.window);
        }
        Ok((plan, geometry))
    }

    fn plan_class(&self, class: SymmetryClass, w: &mut Window) -> Result<SymmetryPlan, CalcError> {
        use SymmetryClass as S;
        let plan = match class {
            S::NoPlot => SymmetryPlan::NoPlot,
            S::None => SymmetryPlan::None,
            S::XAxisNoReal if !self.params_no_real => SymmetryPlan::None,
            S::XAxisNoImag if !self.params_no_imag => SymmetryPlan::None,
            S::XAxisNoParam if !self.params_zero => SymmetryPlan::None,
            S::XAxis | S::XAxisNoReal | S::XAxisNoImag | S::XAxisNoParam => {
                if self.x_split(w)? {
                    SymmetryPlan::XAxis
                } else {
                    SymmetryPlan::None
                }
            }
            S::YAxisNoParam if !self.params_zero => SymmetryPlan::None,
            S::YAxis | S::YAxisNoParam => {
                if self.y_split(w)? {
                    SymmetryPlan::YAxis
                } else {
                    SymmetryPlan::None
                }
            }
            S::XYAxisNoParam if !self.params_zero => SymmetryPlan::None,
            S::XYAxis | S::XYAxisNoParam => {
                let x = self.x_split(w)?;
                let y = self.y_split(w)?;
                match (x, y) {
                    (true, true) => SymmetryPlan::XYAxis,
                    (true, false) => SymmetryPlan::XAxis,
                    (false, true) => SymmetryPlan::YAxis,
                    (false, false) => SymmetryPlan::None,
                }
            }
            S::OriginNoParam if !self.params_zero => SymmetryPlan::None,
            S::Origin | S::OriginNoParam => self.origin(w)?,
            S::PiNoParam if !self.params_zero => SymmetryPlan::None,
            S::Pi | S::PiNoParam => {
                if !self.pi_width_ok {
                    return Ok(SymmetryPlan::None);
                }
                if self.inverted {
                    return self.origin(w);
                }
                self.pi(w)?
            }
        };
        Ok(plan)
    }

    fn origin(&self, w: &mut Window) -> Result<SymmetryPlan, CalcError> {
        if self.x_split(w)? && self.y_split(w)? {
            w.x_stop = w.item.x_stop;
            Ok(SymmetryPlan::Origin)
        } else {
            w.y_stop = w.item.y_stop;
            w.item.sym = SymmetryFlags::DECIDED_NONE;
            Ok(SymmetryPlan::None)
        }
    }

    fn pi(&self, w: &mut Window) -> Result<SymmetryPlan, CalcError> {
        let mut plan = SymmetryPlan::Pi;
        if self.x_split(w)? && self.y_split(w)? {
            plan = if self.params_no_imag {
                SymmetryPlan::PiXYAxis
            } else {
                SymmetryPlan::PiOrigin
            };
        } else {
            w.y_stop = w.item.y_stop;
            w.item.sym = SymmetryFlags::DECIDED_NONE;
        }
        let item = &w.item;
        w.x_stop = (item.x_start + self.pixel_pi - 1).min(item.x_stop);
        if plan == SymmetryPlan::PiXYAxis {
            w.x_stop = w.x_stop.min((item.x_start + item.x_stop) / 2);
        }
        Ok(plan)
    }

    /// Mirror across the x axis. Returns whether the window is mirrored.
    fn x_split(&self, w: &mut Window) -> Result<bool, CalcError> {
        let item = &mut *w.item;
        if item.sym.x_axis_decided && !item.sym.x_axis_mirrored {
            return Ok(false);
        }
        if item.sym.x_axis_mirrored {
            w.y_stop = (item.y_start + item.y_stop) / 2;
            return Ok(true);
        }
        item.sym.x_axis_decided = true;
        let Axis { pos: row, between } = self.x_axis;
        if row <= item.y_start || row >= item.y_stop {
            return Ok(false);
        }
        let mirror = row + (row - item.y_start) + between as i32;
        if mirror > item.y_stop {
            // The bottom piece holds the symmetric part.
            if !w.list.has_room(2) {
                log::warn!("work list full, not splitting window {:?}", item.rect());
                return Ok(false);
            }
            let stop = row - (item.y_stop - row) - (!between) as i32;
            w.list.add(WorkItem::new(
                PixelRect::new(item.x_start, item.x_stop, stop + 1, item.y_stop),
                item.pass,
                SymmetryFlags::default(),
            ))?;
            item.y_stop = stop;
            w.y_stop = stop;
            log::debug!("split window at row {stop} for x-axis symmetry");
            return Ok(false);
        }
        if mirror < item.y_stop {
            if !w.list.has_room(2) {
                log::warn!("work list full, not splitting window {:?}", item.rect());
                return Ok(false);
            }
            w.list.add(WorkItem::new(
                PixelRect::new(item.x_start, item.x_stop, mirror + 1, item.y_stop),
                item.pass,
                SymmetryFlags::default(),
            ))?;
            item.y_stop = mirror;
            log::debug!("split window at row {mirror} for x-axis symmetry");
        }
        w.y_stop = row;
        item.sym.x_axis_mirrored = true;
        Ok(true)
    }

    /// Mirror across the y axis. Returns whether the window is mirrored.
    fn y_split(&self, w: &mut Window) -> Result<bool, CalcError> {
        let item = &mut *w.item;
        if item.sym.y_axis_decided && !item.sym.y_axis_mirrored {
            return Ok(false);
        }
        if item.sym.y_axis_mirrored {
            w.x_stop = (item.x_start + item.x_stop) / 2;
            return Ok(true);
        }
        item.sym.y_axis_decided = true;
        let Axis { pos: col, between } = self.y_axis;
        if col <= item.x_start || col >= item.x_stop {
            return Ok(false);
        }
        let mirror = col + (col - item.x_start) + between as i32;
        if mirror > item.x_stop {
            if !w.list.has_room(2) {
                log::warn!("work list full, not splitting window {:?}", item.rect());
                return Ok(false);
            }
            let stop = col - (item.x_stop - col) - (!between) as i32;
            w.list.add(WorkItem::new(
                PixelRect::new(stop + 1, item.x_stop, item.y_start, item.y_stop),
                item.pass,
                SymmetryFlags::default(),
            ))?;
            item.x_stop = stop;
            w.x_stop = stop;
            log::debug!("split window at column {stop} for y-axis symmetry");
            return Ok(false);
        }
        if mirror < item.x_stop {
            if !w.list.has_room(2) {
                log::warn!("work list full, not splitting window {:?}", item.rect());
                return Ok(false);
            }
            w.list.add(WorkItem::new(
                PixelRect::new(mirror + 1, item.x_stop, item.y_start, item.y_stop),
                item.pass,
                SymmetryFlags::default(),
            ))?;
            item.x_stop = mirror;
            log::debug!("split window at column {mirror} for y-axis symmetry");
        }
        w.x_stop = col;
        item.sym.y_axis_mirrored = true;
        Ok(true)
    }
}
