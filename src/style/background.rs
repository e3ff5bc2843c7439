use crate::foundation::core::{Point, Rgba8};
use crate::params::map::ParamMap;
use crate::surface::cmd::GradientStop;
use crate::surface::painter::Painter;

/// How `backgroundType` paints the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackgroundKind {
    Transparent,
    Solid,
    Gradient,
}

impl BackgroundKind {
    /// Unknown names mean transparent.
    pub fn parse(s: &str) -> Self {
        match s {
            "solid" => Self::Solid,
            "gradient" => Self::Gradient,
            _ => Self::Transparent,
        }
    }
}

/// Endpoints of a linear gradient across a `width x height` box.
///
/// The axis passes through the center at `direction_deg`, spanning half the diagonal each way.
pub fn gradient_axis(width: f64, height: f64, direction_deg: f64) -> (Point, Point) {
    let theta = direction_deg.to_radians();
    let radius = (width * width + height * height).sqrt() / 2.0;
    let (cx, cy) = (width / 2.0, height / 2.0);
    let (dx, dy) = (theta.cos() * radius, theta.sin() * radius);
    (Point::new(cx - dx, cy - dy), Point::new(cx + dx, cy + dy))
}

/// Paint the background described by the universal `background*` parameters.
///
/// Draws in canvas space regardless of the current transform and leaves painter state as
/// it found it. Never fails; transparent and unknown types draw nothing.
pub fn apply_background(painter: &mut Painter, width: f64, height: f64, params: &ParamMap) {
    let kind = BackgroundKind::parse(&params.text("backgroundType", "transparent"));
    if kind == BackgroundKind::Transparent || !(width > 0.0 && height > 0.0) {
        return;
    }
    let opacity = params.number("backgroundOpacity", 1.0).clamp(0.0, 1.0);

    painter.save();
    painter.reset_transform();
    painter.set_global_alpha(opacity);
    match kind {
        BackgroundKind::Solid => {
            painter.set_fill_color(params.color("backgroundColor", Rgba8::WHITE));
        }
        BackgroundKind::Gradient => {
            let start = params.color(
                "backgroundGradientStart",
                params.color("backgroundColor", Rgba8::WHITE),
            );
            let end = params.color("backgroundGradientEnd", Rgba8::opaque(0xf0, 0xf0, 0xf0));
            let direction = params.number("backgroundGradientDirection", 0.0);
            let (p0, p1) = gradient_axis(width, height, direction);
            let paint = painter.linear_gradient(
                p0.x,
                p0.y,
                p1.x,
                p1.y,
                &[GradientStop::new(0.0, start), GradientStop::new(1.0, end)],
            );
            painter.set_fill(paint);
        }
        BackgroundKind::Transparent => {}
    }
    painter.fill_rect(0.0, 0.0, width, height);
    painter.restore();
}

#[cfg(test)]
#[path = "../../tests/unit/style/background.rs"]
mod tests;
