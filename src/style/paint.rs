use crate::foundation::core::{Rect, Rgba8};
use crate::params::map::ParamMap;
use crate::style::background::gradient_axis;
use crate::surface::cmd::{GradientStop, Paint};
use crate::surface::painter::Painter;

pub const DEFAULT_FILL: Rgba8 = Rgba8::opaque(0x3b, 0x82, 0xf6);
pub const DEFAULT_FILL_GRADIENT_END: Rgba8 = Rgba8::opaque(0x1e, 0x40, 0xaf);
pub const DEFAULT_STROKE: Rgba8 = Rgba8::opaque(0x1e, 0x40, 0xaf);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FillKind {
    None,
    Solid,
    Gradient,
}

/// Normalized fill from the universal `fill*` parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct FillSpec {
    pub kind: FillKind,
    pub color: Rgba8,
    pub gradient_start: Rgba8,
    pub gradient_end: Rgba8,
    /// Degrees.
    pub gradient_direction: f64,
    pub opacity: f64,
}

impl FillSpec {
    pub fn is_visible(&self) -> bool {
        self.kind != FillKind::None && self.opacity > 0.0
    }

    /// Paint for a shape occupying `bounds` (user space), with opacity folded into alpha.
    pub fn paint(&self, painter: &Painter, bounds: Rect) -> Option<Paint> {
        match self.kind {
            FillKind::None => None,
            FillKind::Solid => Some(Paint::solid(self.color.scale_alpha(self.opacity))),
            FillKind::Gradient => {
                let (p0, p1) = gradient_axis(bounds.width(), bounds.height(), self.gradient_direction);
                let origin = bounds.origin().to_vec2();
                let (p0, p1) = (p0 + origin, p1 + origin);
                Some(painter.linear_gradient(
                    p0.x,
                    p0.y,
                    p1.x,
                    p1.y,
                    &[
                        GradientStop::new(0.0, self.gradient_start.scale_alpha(self.opacity)),
                        GradientStop::new(1.0, self.gradient_end.scale_alpha(self.opacity)),
                    ],
                ))
            }
        }
    }

    /// Install the fill on `painter`; `false` when nothing should be filled.
    pub fn apply(&self, painter: &mut Painter, bounds: Rect) -> bool {
        if !self.is_visible() {
            return false;
        }
        match self.paint(painter, bounds) {
            Some(paint) => {
                painter.set_fill(paint);
                true
            }
            None => false,
        }
    }
}

pub fn resolve_fill(params: &ParamMap) -> FillSpec {
    let kind = match params.text("fillType", "solid").as_str() {
        "none" => FillKind::None,
        "gradient" => FillKind::Gradient,
        _ => FillKind::Solid,
    };
    FillSpec {
        kind,
        color: params.color("fillColor", DEFAULT_FILL),
        gradient_start: params.color("fillGradientStart", DEFAULT_FILL),
        gradient_end: params.color("fillGradientEnd", DEFAULT_FILL_GRADIENT_END),
        gradient_direction: params.number("fillGradientDirection", 0.0),
        opacity: params.number("fillOpacity", 1.0).clamp(0.0, 1.0),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrokeKind {
    None,
    Solid,
    Dashed,
    Dotted,
}

/// Normalized stroke from the universal `stroke*` parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct StrokeSpec {
    pub kind: StrokeKind,
    pub color: Rgba8,
    pub width: f64,
    pub opacity: f64,
    /// Empty for solid strokes.
    pub dash: Vec<f64>,
}

impl StrokeSpec {
    pub fn is_visible(&self) -> bool {
        self.kind != StrokeKind::None && self.width > 0.0 && self.opacity > 0.0
    }

    /// Install color, width and dash on `painter`; `false` when nothing should be stroked.
    pub fn apply(&self, painter: &mut Painter) -> bool {
        if !self.is_visible() {
            return false;
        }
        painter.set_stroke_color(self.color.scale_alpha(self.opacity));
        painter.set_line_width(self.width);
        painter.set_line_dash(&self.dash);
        true
    }
}

/// Zero dash or gap sizes fall back to the per-kind defaults.
pub fn resolve_stroke(params: &ParamMap) -> StrokeSpec {
    let kind = match params.text("strokeType", "none").as_str() {
        "solid" => StrokeKind::Solid,
        "dashed" => StrokeKind::Dashed,
        "dotted" => StrokeKind::Dotted,
        _ => StrokeKind::None,
    };
    let dash = match kind {
        StrokeKind::Dashed => vec![
            params.nonzero("strokeDashSize", 5.0).abs(),
            params.nonzero("strokeGapSize", 5.0).abs(),
        ],
        StrokeKind::Dotted => vec![
            params.nonzero("strokeDashSize", 2.0).abs(),
            params.nonzero("strokeGapSize", 3.0).abs(),
        ],
        StrokeKind::None | StrokeKind::Solid => Vec::new(),
    };
    StrokeSpec {
        kind,
        color: params.color("strokeColor", DEFAULT_STROKE),
        width: params.number("strokeWidth", 2.0).max(0.0),
        opacity: params.number("strokeOpacity", 1.0).clamp(0.0, 1.0),
        dash,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/style/paint.rs"]
mod tests;
