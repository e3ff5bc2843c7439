use crate::foundation::core::Point;
use crate::generate::wave::WavePoint;

/// Axis-aligned extent of a point set.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
    pub width: f64,
    pub height: f64,
    pub center_x: f64,
    pub center_y: f64,
}

impl Bounds {
    pub fn to_rect(self) -> kurbo::Rect {
        kurbo::Rect::new(self.min_x, self.min_y, self.max_x, self.max_y)
    }
}

/// Bounds over the finite points of `points`; all zeros when there are none.
pub fn bounds_from_points<I>(points: I) -> Bounds
where
    I: IntoIterator<Item = Point>,
{
    let mut acc: Option<(f64, f64, f64, f64)> = None;
    for p in points {
        if !(p.x.is_finite() && p.y.is_finite()) {
            continue;
        }
        acc = Some(match acc {
            None => (p.x, p.x, p.y, p.y),
            Some((x0, x1, y0, y1)) => (x0.min(p.x), x1.max(p.x), y0.min(p.y), y1.max(p.y)),
        });
    }
    let Some((min_x, max_x, min_y, max_y)) = acc else {
        return Bounds::default();
    };
    Bounds {
        min_x,
        max_x,
        min_y,
        max_y,
        width: max_x - min_x,
        height: max_y - min_y,
        center_x: (min_x + max_x) / 2.0,
        center_y: (min_y + max_y) / 2.0,
    }
}

pub fn bounds_from_wave(points: &[WavePoint]) -> Bounds {
    bounds_from_points(points.iter().map(|p| Point::new(p.x, p.y)))
}

#[cfg(test)]
#[path = "../../tests/unit/style/bounds.rs"]
mod tests;
