//! Canvas-style recorder handed to template draw routines.

use std::f64::consts::{PI, TAU};

use kurbo::{Affine, BezPath, PathEl, Point, Rect, Vec2};

use crate::foundation::core::{Canvas, Rgba8};
use crate::surface::cmd::{
    DrawCmd, GradientStop, LineCap, LineJoin, Paint, StrokeStyle, TextAlign,
};
use crate::surface::display_list::DisplayList;
use crate::surface::font;

/// Drawable geometry may reach this many canvas diagonals beyond the canvas.
pub const MAX_EXTENT_FACTOR: f64 = 64.0;

/// Most dashes a single stroke may expand into.
pub const MAX_DASHES: f64 = 100_000.0;

const ARC_TOLERANCE: f64 = 0.1;

#[derive(Clone, Debug)]
struct PaintState {
    fill: Paint,
    stroke: Paint,
    line_width: f64,
    dash: Vec<f64>,
    dash_offset: f64,
    cap: LineCap,
    join: LineJoin,
    alpha: f64,
    transform: Affine,
    font_size: f64,
    text_align: TextAlign,
}

impl Default for PaintState {
    fn default() -> Self {
        Self {
            fill: Paint::solid(Rgba8::BLACK),
            stroke: Paint::solid(Rgba8::BLACK),
            line_width: 1.0,
            dash: Vec::new(),
            dash_offset: 0.0,
            cap: LineCap::Butt,
            join: LineJoin::Miter,
            alpha: 1.0,
            transform: Affine::IDENTITY,
            font_size: 10.0,
            text_align: TextAlign::Left,
        }
    }
}

/// Records drawing operations into a [`DisplayList`].
///
/// Mirrors the 2D canvas model: a current path, a save/restore state stack, fill and stroke
/// paints, line width and dash, global alpha and a current transform. Path points are
/// transformed when they are added, so later transform changes do not move existing geometry.
///
/// Geometry is bounded in device space: points, radii, line widths and font sizes larger than
/// [`MAX_EXTENT_FACTOR`] canvas diagonals, or strokes expanding into more than [`MAX_DASHES`]
/// dashes, put the painter into a fault. A faulted painter records nothing more, and the
/// sandbox reports the fault as an execution failure.
#[derive(Debug)]
pub struct Painter {
    state: PaintState,
    stack: Vec<PaintState>,
    path: BezPath,
    current: Option<Point>,
    subpath_start: Option<Point>,
    list: DisplayList,
    extent: f64,
    work: u64,
    fault: Option<String>,
}

impl Painter {
    pub fn new(canvas: Canvas) -> Self {
        Self {
            state: PaintState::default(),
            stack: Vec::new(),
            path: BezPath::new(),
            current: None,
            subpath_start: None,
            list: DisplayList::new(canvas),
            extent: MAX_EXTENT_FACTOR * canvas.width_f64().hypot(canvas.height_f64()),
            work: 0,
            fault: None,
        }
    }

    pub fn canvas(&self) -> Canvas {
        self.list.canvas
    }

    pub fn width(&self) -> f64 {
        self.list.canvas.width_f64()
    }

    pub fn height(&self) -> f64 {
        self.list.canvas.height_f64()
    }

    /// Commands recorded so far.
    pub fn command_count(&self) -> usize {
        self.list.len()
    }

    pub fn finish(self) -> DisplayList {
        self.list
    }

    /// Largest device-space distance, radius or size accepted.
    pub fn max_extent(&self) -> f64 {
        self.extent
    }

    /// Path elements built, recorded and dashed so far.
    pub fn work(&self) -> u64 {
        self.work
    }

    /// Why the painter stopped recording, if it did.
    pub fn fault(&self) -> Option<&str> {
        self.fault.as_deref()
    }

    fn fail(&mut self, message: String) {
        if self.fault.is_none() {
            tracing::debug!(%message, "painter fault");
            self.fault = Some(message);
        }
    }

    fn within_extent(&mut self, what: &str, size: f64) -> bool {
        if size > self.extent {
            self.fail(format!(
                "{what} {size:e} exceeds the drawable extent of {:.0}",
                self.extent
            ));
            return false;
        }
        true
    }

    fn record(&mut self, cmd: DrawCmd) {
        if self.fault.is_some() {
            return;
        }
        self.work += match &cmd {
            DrawCmd::Clear { .. } => 1,
            DrawCmd::Fill { path, .. } | DrawCmd::Stroke { path, .. } => path.elements().len() as u64,
            DrawCmd::Text { text, .. } => text.chars().count() as u64,
        };
        self.list.cmds.push(cmd);
    }

    // State

    pub fn save(&mut self) {
        self.stack.push(self.state.clone());
    }

    /// Pop the last saved state; a restore without a matching save is ignored.
    pub fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    pub fn save_depth(&self) -> usize {
        self.stack.len()
    }

    pub fn set_fill(&mut self, paint: Paint) {
        self.state.fill = paint;
    }

    pub fn set_fill_color(&mut self, color: Rgba8) {
        self.state.fill = Paint::solid(color);
    }

    pub fn set_stroke(&mut self, paint: Paint) {
        self.state.stroke = paint;
    }

    pub fn set_stroke_color(&mut self, color: Rgba8) {
        self.state.stroke = Paint::solid(color);
    }

    /// Non-finite or negative widths are ignored, as on a 2D canvas.
    pub fn set_line_width(&mut self, width: f64) {
        if width.is_finite() && width >= 0.0 {
            self.state.line_width = width;
        }
    }

    pub fn line_width(&self) -> f64 {
        self.state.line_width
    }

    /// An odd-length pattern is repeated once to make it even; invalid entries reject the
    /// whole pattern.
    pub fn set_line_dash(&mut self, pattern: &[f64]) {
        if pattern.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return;
        }
        let mut dash = pattern.to_vec();
        if dash.len() % 2 == 1 {
            dash.extend_from_slice(pattern);
        }
        if dash.iter().all(|v| *v == 0.0) {
            dash.clear();
        }
        self.state.dash = dash;
    }

    pub fn line_dash(&self) -> &[f64] {
        &self.state.dash
    }

    pub fn set_line_dash_offset(&mut self, offset: f64) {
        if offset.is_finite() {
            self.state.dash_offset = offset;
        }
    }

    pub fn set_line_cap(&mut self, cap: LineCap) {
        self.state.cap = cap;
    }

    pub fn set_line_join(&mut self, join: LineJoin) {
        self.state.join = join;
    }

    /// Values outside `[0, 1]` or non-finite are ignored.
    pub fn set_global_alpha(&mut self, alpha: f64) {
        if alpha.is_finite() && (0.0..=1.0).contains(&alpha) {
            self.state.alpha = alpha;
        }
    }

    pub fn global_alpha(&self) -> f64 {
        self.state.alpha
    }

    pub fn set_font_size(&mut self, size: f64) {
        if size.is_finite() && size > 0.0 {
            self.state.font_size = size;
        }
    }

    pub fn set_text_align(&mut self, align: TextAlign) {
        self.state.text_align = align;
    }

    // Transform

    pub fn translate(&mut self, x: f64, y: f64) {
        self.state.transform *= Affine::translate(Vec2::new(x, y));
    }

    pub fn rotate(&mut self, radians: f64) {
        self.state.transform *= Affine::rotate(radians);
    }

    pub fn scale(&mut self, sx: f64, sy: f64) {
        self.state.transform *= Affine::scale_non_uniform(sx, sy);
    }

    pub fn reset_transform(&mut self) {
        self.state.transform = Affine::IDENTITY;
    }

    pub fn transform(&self) -> Affine {
        self.state.transform
    }

    fn linear_scale(&self) -> f64 {
        self.state.transform.determinant().abs().sqrt()
    }

    /// Largest factor the transform stretches a unit length by (its larger singular value).
    fn max_stretch(&self) -> f64 {
        let [a, b, c, d, _, _] = self.state.transform.as_coeffs();
        let frob2 = a * a + b * b + c * c + d * d;
        let det = a * d - b * c;
        let spread = (frob2 * frob2 - 4.0 * det * det).max(0.0).sqrt();
        ((frob2 + spread) / 2.0).sqrt()
    }

    // Gradients (in user space, captured with the current transform)

    pub fn linear_gradient(
        &self,
        x0: f64,
        y0: f64,
        x1: f64,
        y1: f64,
        stops: &[GradientStop],
    ) -> Paint {
        Paint::Linear {
            start: Point::new(x0, y0),
            end: Point::new(x1, y1),
            stops: sorted_stops(stops),
        }
        .transformed(self.state.transform)
    }

    pub fn radial_gradient(&self, cx: f64, cy: f64, radius: f64, stops: &[GradientStop]) -> Paint {
        Paint::Radial {
            center: Point::new(cx, cy),
            radius: radius.max(0.0),
            stops: sorted_stops(stops),
        }
        .transformed(self.state.transform)
    }

    // Path construction

    pub fn begin_path(&mut self) {
        self.path = BezPath::new();
        self.current = None;
        self.subpath_start = None;
    }

    /// Device position of a user point. Non-finite input is skipped; a point too far from the
    /// canvas faults.
    fn device(&mut self, x: f64, y: f64) -> Option<Point> {
        if self.fault.is_some() || !x.is_finite() || !y.is_finite() {
            return None;
        }
        let p = self.state.transform * Point::new(x, y);
        if !p.x.is_finite() || !p.y.is_finite() {
            self.fail("coordinate overflowed under the current transform".to_owned());
            return None;
        }
        let (w, h) = (self.width(), self.height());
        let overshoot = (-p.x).max(p.x - w).max(-p.y).max(p.y - h).max(0.0);
        self.within_extent("coordinate distance", overshoot).then_some(p)
    }

    pub fn move_to(&mut self, x: f64, y: f64) {
        if let Some(p) = self.device(x, y) {
            self.work += 1;
            self.path.move_to(p);
            self.current = Some(p);
            self.subpath_start = Some(p);
        }
    }

    /// Without a current point this behaves like `move_to`.
    pub fn line_to(&mut self, x: f64, y: f64) {
        let Some(p) = self.device(x, y) else {
            return;
        };
        self.work += 1;
        if self.current.is_none() {
            self.path.move_to(p);
            self.subpath_start = Some(p);
        } else {
            self.path.line_to(p);
        }
        self.current = Some(p);
    }

    pub fn quad_to(&mut self, cx: f64, cy: f64, x: f64, y: f64) {
        let (Some(c), Some(p)) = (self.device(cx, cy), self.device(x, y)) else {
            return;
        };
        if self.current.is_none() {
            self.move_to(cx, cy);
        }
        self.work += 1;
        self.path.quad_to(c, p);
        self.current = Some(p);
    }

    pub fn bezier_to(&mut self, c1x: f64, c1y: f64, c2x: f64, c2y: f64, x: f64, y: f64) {
        let (Some(c1), Some(c2), Some(p)) =
            (self.device(c1x, c1y), self.device(c2x, c2y), self.device(x, y))
        else {
            return;
        };
        if self.current.is_none() {
            self.move_to(c1x, c1y);
        }
        self.work += 1;
        self.path.curve_to(c1, c2, p);
        self.current = Some(p);
    }

    pub fn close_path(&mut self) {
        if self.current.is_some() {
            self.path.close_path();
            self.current = self.subpath_start;
        }
    }

    /// Circular arc around `(cx, cy)` from `start` to `end` radians, clockwise unless
    /// `counter_clockwise`. Connected to the current point by a straight line.
    pub fn arc(&mut self, cx: f64, cy: f64, radius: f64, start: f64, end: f64, counter_clockwise: bool) {
        self.ellipse(cx, cy, radius, radius, 0.0, start, end, counter_clockwise);
    }

    #[allow(clippy::too_many_arguments)]
    pub fn ellipse(
        &mut self,
        cx: f64,
        cy: f64,
        rx: f64,
        ry: f64,
        rotation: f64,
        start: f64,
        end: f64,
        counter_clockwise: bool,
    ) {
        if ![cx, cy, rx, ry, rotation, start, end].iter().all(|v| v.is_finite()) || rx < 0.0 || ry < 0.0 {
            return;
        }
        let stretch = self.max_stretch();
        let device_radius = rx.max(ry) * stretch;
        if self.device(cx, cy).is_none() || !self.within_extent("arc radius", device_radius) {
            return;
        }
        let sweep = arc_sweep(start, end, counter_clockwise);
        let arc = kurbo::Arc::new(Point::new(cx, cy), Vec2::new(rx, ry), start, sweep, rotation);
        let start_user = Point::new(cx, cy) + rotate_vec(Vec2::new(rx * start.cos(), ry * start.sin()), rotation);
        self.line_to(start_user.x, start_user.y);
        if device_radius <= 0.0 || self.fault.is_some() {
            return;
        }

        // Flatten against a device-space tolerance so the segment count follows the drawn size.
        let t = self.state.transform;
        for el in arc.append_iter(ARC_TOLERANCE / stretch) {
            let end = match t * el {
                PathEl::CurveTo(c1, c2, p) => {
                    self.path.curve_to(c1, c2, p);
                    p
                }
                PathEl::QuadTo(c, p) => {
                    self.path.quad_to(c, p);
                    p
                }
                PathEl::LineTo(p) => {
                    self.path.line_to(p);
                    p
                }
                PathEl::MoveTo(_) | PathEl::ClosePath => continue,
            };
            self.work += 1;
            self.current = Some(end);
        }
    }

    /// Closed rectangle subpath.
    pub fn rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.move_to(x, y);
        self.line_to(x + w, y);
        self.line_to(x + w, y + h);
        self.line_to(x, y + h);
        self.close_path();
    }

    /// Closed rectangle with circular corners; the radius is clamped to half the shorter side.
    pub fn rounded_rect(&mut self, x: f64, y: f64, w: f64, h: f64, radius: f64) {
        let (x, w) = if w < 0.0 { (x + w, -w) } else { (x, w) };
        let (y, h) = if h < 0.0 { (y + h, -h) } else { (y, h) };
        let r = if radius.is_finite() {
            radius.clamp(0.0, w.min(h) / 2.0)
        } else {
            0.0
        };
        if r == 0.0 {
            self.rect(x, y, w, h);
            return;
        }
        self.move_to(x + r, y);
        self.line_to(x + w - r, y);
        self.arc(x + w - r, y + r, r, -PI / 2.0, 0.0, false);
        self.line_to(x + w, y + h - r);
        self.arc(x + w - r, y + h - r, r, 0.0, PI / 2.0, false);
        self.line_to(x + r, y + h);
        self.arc(x + r, y + h - r, r, PI / 2.0, PI, false);
        self.line_to(x, y + r);
        self.arc(x + r, y + r, r, PI, PI * 1.5, false);
        self.close_path();
    }

    // Shapes

    /// Regular polygon with its first vertex at `rotation` radians.
    pub fn polygon(&mut self, cx: f64, cy: f64, radius: f64, sides: u32, rotation: f64) {
        let sides = sides.max(3);
        for i in 0..sides {
            let a = rotation + f64::from(i) * TAU / f64::from(sides);
            let (x, y) = (cx + radius * a.cos(), cy + radius * a.sin());
            if i == 0 {
                self.move_to(x, y);
            } else {
                self.line_to(x, y);
            }
        }
        self.close_path();
    }

    /// Star alternating between `outer` and `inner` radii, first tip pointing up.
    pub fn star(&mut self, cx: f64, cy: f64, outer: f64, inner: f64, points: u32) {
        let points = points.max(2);
        let step = PI / f64::from(points);
        for i in 0..points * 2 {
            let r = if i % 2 == 0 { outer } else { inner };
            let a = f64::from(i) * step - PI / 2.0;
            let (x, y) = (cx + r * a.cos(), cy + r * a.sin());
            if i == 0 {
                self.move_to(x, y);
            } else {
                self.line_to(x, y);
            }
        }
        self.close_path();
    }

    /// Heart of overall height about `size`, centered on `(cx, cy)`.
    pub fn heart(&mut self, cx: f64, cy: f64, size: f64) {
        let top = cy - size * 0.3;
        self.move_to(cx, top);
        self.bezier_to(cx, cy - size * 0.5, cx - size * 0.5, cy - size * 0.5, cx - size * 0.5, top);
        self.bezier_to(cx - size * 0.5, cy + size * 0.1, cx, cy + size * 0.35, cx, cy + size * 0.5);
        self.bezier_to(cx, cy + size * 0.35, cx + size * 0.5, cy + size * 0.1, cx + size * 0.5, top);
        self.bezier_to(cx + size * 0.5, cy - size * 0.5, cx, cy - size * 0.5, cx, top);
        self.close_path();
    }

    /// Archimedean spiral: radius grows by `spacing` per turn.
    pub fn spiral(&mut self, cx: f64, cy: f64, turns: f64, spacing: f64, steps: u32) {
        let steps = steps.max(2);
        for i in 0..=steps {
            let a = f64::from(i) / f64::from(steps) * turns * TAU;
            let r = spacing * a / TAU;
            let (x, y) = (cx + r * a.cos(), cy + r * a.sin());
            if i == 0 {
                self.move_to(x, y);
            } else {
                self.line_to(x, y);
            }
        }
    }

    // Painting

    pub fn fill(&mut self) {
        if self.path.elements().is_empty() {
            return;
        }
        self.record(DrawCmd::Fill {
            path: self.path.clone(),
            paint: self.state.fill.clone(),
            alpha: self.state.alpha,
        });
    }

    pub fn stroke(&mut self) {
        if self.path.elements().is_empty() || self.state.line_width <= 0.0 {
            return;
        }
        let path = self.path.clone();
        self.push_stroke(path);
    }

    fn push_stroke(&mut self, path: BezPath) {
        let k = self.linear_scale();
        let width = self.state.line_width * k;
        if !self.within_extent("line width", width) {
            return;
        }
        let mut dash: Vec<f64> = self.state.dash.iter().map(|d| d * k).collect();
        if dash.iter().sum::<f64>() > 0.0 {
            let dashes = dash_count(&path, &dash);
            if dashes > MAX_DASHES {
                self.fail(format!(
                    "dash pattern expands into {dashes:.0} dashes (limit {MAX_DASHES:.0})"
                ));
                return;
            }
            self.work += dashes as u64;
        } else {
            dash.clear();
        }
        self.record(DrawCmd::Stroke {
            path,
            paint: self.state.stroke.clone(),
            alpha: self.state.alpha,
            style: StrokeStyle {
                width,
                dash,
                dash_offset: self.state.dash_offset * k,
                cap: self.state.cap,
                join: self.state.join,
            },
        });
    }

    fn rect_path(&mut self, x: f64, y: f64, w: f64, h: f64) -> Option<BezPath> {
        let corners = [(x, y), (x + w, y), (x + w, y + h), (x, y + h)];
        let mut p = BezPath::new();
        for (i, (cx, cy)) in corners.into_iter().enumerate() {
            let pt = self.device(cx, cy)?;
            if i == 0 {
                p.move_to(pt);
            } else {
                p.line_to(pt);
            }
        }
        p.close_path();
        Some(p)
    }

    /// Fill a rectangle without touching the current path.
    pub fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        let Some(path) = self.rect_path(x, y, w, h) else {
            return;
        };
        self.record(DrawCmd::Fill {
            path,
            paint: self.state.fill.clone(),
            alpha: self.state.alpha,
        });
    }

    pub fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        if self.state.line_width <= 0.0 {
            return;
        }
        if let Some(path) = self.rect_path(x, y, w, h) {
            self.push_stroke(path);
        }
    }

    /// Reset a device-space rectangle to transparent.
    pub fn clear_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        let rect = Rect::new(x, y, x + w, y + h).abs();
        self.record(DrawCmd::Clear { rect });
    }

    pub fn clear(&mut self) {
        let rect = self.list.canvas.rect();
        self.record(DrawCmd::Clear { rect });
    }

    /// Draw `text` with its baseline at `y`, using the fill paint.
    pub fn fill_text(&mut self, text: &str, x: f64, y: f64) {
        let Some(origin) = self.device(x, y) else {
            return;
        };
        if text.is_empty() {
            return;
        }
        let size = self.state.font_size * self.linear_scale();
        if !self.within_extent("font size", size) {
            return;
        }
        self.record(DrawCmd::Text {
            text: text.to_owned(),
            origin,
            size,
            align: self.state.text_align,
            paint: self.state.fill.clone(),
            alpha: self.state.alpha,
        });
    }

    /// Advance width of `text` at the current font size, in user units.
    pub fn measure_text(&self, text: &str) -> f64 {
        font::measure(text, self.state.font_size)
    }
}

fn sorted_stops(stops: &[GradientStop]) -> Vec<GradientStop> {
    let mut out: Vec<GradientStop> = stops
        .iter()
        .filter(|s| s.offset.is_finite())
        .map(|s| GradientStop::new(s.offset.clamp(0.0, 1.0), s.color))
        .collect();
    out.sort_by(|a, b| a.offset.total_cmp(&b.offset));
    out
}

/// Dashes `dash` (device units) cuts `path` into, from the control polygon length, which
/// bounds the arc length from above.
pub(crate) fn dash_count(path: &BezPath, dash: &[f64]) -> f64 {
    let period: f64 = dash.iter().sum();
    if period <= 0.0 || !period.is_finite() {
        return 0.0;
    }
    let mut length = 0.0;
    let mut last = Point::ZERO;
    let mut start = Point::ZERO;
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => {
                start = p;
                last = p;
            }
            PathEl::LineTo(p) => {
                length += last.distance(p);
                last = p;
            }
            PathEl::QuadTo(c, p) => {
                length += last.distance(c) + c.distance(p);
                last = p;
            }
            PathEl::CurveTo(c1, c2, p) => {
                length += last.distance(c1) + c1.distance(c2) + c2.distance(p);
                last = p;
            }
            PathEl::ClosePath => {
                length += last.distance(start);
                last = start;
            }
        }
    }
    (length / period).ceil() * (dash.len() / 2).max(1) as f64
}

fn arc_sweep(start: f64, end: f64, counter_clockwise: bool) -> f64 {
    if counter_clockwise {
        if start - end >= TAU {
            -TAU
        } else {
            -(start - end).rem_euclid(TAU)
        }
    } else if end - start >= TAU {
        TAU
    } else {
        (end - start).rem_euclid(TAU)
    }
}

fn rotate_vec(v: Vec2, angle: f64) -> Vec2 {
    let (s, c) = angle.sin_cos();
    Vec2::new(v.x * c - v.y * s, v.x * s + v.y * c)
}

#[cfg(test)]
#[path = "../../tests/unit/surface/painter.rs"]
mod tests;
