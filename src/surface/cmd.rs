use crate::foundation::core::{BezPath, Point, Rect, Rgba8};

/// One stop of a gradient ramp.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GradientStop {
    /// Position along the ramp, clamped to `[0, 1]` when sampled.
    pub offset: f64,
    pub color: Rgba8,
}

impl GradientStop {
    pub fn new(offset: f64, color: Rgba8) -> Self {
        Self { offset, color }
    }
}

/// Fill or stroke source, in device space.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Paint {
    Solid { color: Rgba8 },
    Linear {
        start: Point,
        end: Point,
        stops: Vec<GradientStop>,
    },
    Radial {
        center: Point,
        radius: f64,
        stops: Vec<GradientStop>,
    },
}

impl Paint {
    pub fn solid(color: Rgba8) -> Self {
        Self::Solid { color }
    }

    /// Straight-alpha color of this paint at `p`.
    pub fn color_at(&self, p: Point) -> Rgba8 {
        match self {
            Self::Solid { color } => *color,
            Self::Linear { start, end, stops } => {
                let d = *end - *start;
                let len2 = d.hypot2();
                let t = if len2 > 0.0 {
                    (p - *start).dot(d) / len2
                } else {
                    0.0
                };
                sample_stops(stops, t)
            }
            Self::Radial {
                center,
                radius,
                stops,
            } => {
                let t = if *radius > 0.0 {
                    (p - *center).hypot() / radius
                } else {
                    1.0
                };
                sample_stops(stops, t)
            }
        }
    }

    /// Apply `transform` to the paint geometry.
    pub fn transformed(&self, transform: kurbo::Affine) -> Self {
        match self {
            Self::Solid { .. } => self.clone(),
            Self::Linear { start, end, stops } => Self::Linear {
                start: transform * *start,
                end: transform * *end,
                stops: stops.clone(),
            },
            Self::Radial {
                center,
                radius,
                stops,
            } => Self::Radial {
                center: transform * *center,
                radius: radius * transform.determinant().abs().sqrt(),
                stops: stops.clone(),
            },
        }
    }
}

fn sample_stops(stops: &[GradientStop], t: f64) -> Rgba8 {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let Some(first) = stops.first() else {
        return Rgba8::TRANSPARENT;
    };
    if t <= first.offset {
        return first.color;
    }
    for pair in stops.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if t <= b.offset {
            let span = b.offset - a.offset;
            let u = if span > 0.0 { (t - a.offset) / span } else { 1.0 };
            return mix(a.color, b.color, u);
        }
    }
    stops.last().map_or(first.color, |s| s.color)
}

pub(crate) fn mix(a: Rgba8, b: Rgba8, t: f64) -> Rgba8 {
    fn ch(x: u8, y: u8, t: f64) -> u8 {
        (f64::from(x) + (f64::from(y) - f64::from(x)) * t)
            .round()
            .clamp(0.0, 255.0) as u8
    }
    Rgba8::new(
        ch(a.r, b.r, t),
        ch(a.g, b.g, t),
        ch(a.b, b.b, t),
        ch(a.a, b.a, t),
    )
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

/// Stroke geometry, in device pixels.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StrokeStyle {
    pub width: f64,
    /// Alternating dash and gap lengths; empty for a solid line.
    pub dash: Vec<f64>,
    pub dash_offset: f64,
    pub cap: LineCap,
    pub join: LineJoin,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            width: 1.0,
            dash: Vec::new(),
            dash_offset: 0.0,
            cap: LineCap::Butt,
            join: LineJoin::Miter,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// The closed set of drawing primitives a [`Surface`](crate::Surface) executes.
///
/// Geometry is already in device space; the recording [`Painter`](crate::Painter) resolves
/// transforms, dashes and state before emitting commands.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCmd {
    /// Reset the pixels inside `rect` to transparent.
    Clear { rect: Rect },
    Fill {
        path: BezPath,
        paint: Paint,
        alpha: f64,
    },
    Stroke {
        path: BezPath,
        paint: Paint,
        alpha: f64,
        style: StrokeStyle,
    },
    /// `origin` is the left end of the baseline before alignment.
    Text {
        text: String,
        origin: Point,
        size: f64,
        align: TextAlign,
        paint: Paint,
        alpha: f64,
    },
}

#[cfg(test)]
#[path = "../../tests/unit/surface/cmd.rs"]
mod tests;
