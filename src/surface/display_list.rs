use crate::foundation::core::Canvas;
use crate::foundation::error::BrandwaveResult;
use crate::foundation::math::Fnv1a64;
use crate::surface::Surface;
use crate::surface::cmd::{DrawCmd, Paint};

/// Recorded drawing commands for one frame.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct DisplayList {
    pub canvas: Canvas,
    pub cmds: Vec<DrawCmd>,
}

impl DisplayList {
    pub fn new(canvas: Canvas) -> Self {
        Self {
            canvas,
            cmds: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.cmds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }

    /// Execute every command, in order, against `target`.
    pub fn replay(&self, target: &mut dyn Surface) -> BrandwaveResult<()> {
        for cmd in &self.cmds {
            target.execute(cmd)?;
        }
        Ok(())
    }

    /// Stable hash of the command stream, for change detection.
    pub fn fingerprint(&self) -> u64 {
        let mut h = Fnv1a64::new_default();
        h.write_u32(self.canvas.width);
        h.write_u32(self.canvas.height);
        for cmd in &self.cmds {
            match cmd {
                DrawCmd::Clear { rect } => {
                    h.write_u8(0);
                    for v in [rect.x0, rect.y0, rect.x1, rect.y1] {
                        h.write_f64(v);
                    }
                }
                DrawCmd::Fill { path, paint, alpha } => {
                    h.write_u8(1);
                    hash_path(&mut h, path);
                    hash_paint(&mut h, paint);
                    h.write_f64(*alpha);
                }
                DrawCmd::Stroke {
                    path,
                    paint,
                    alpha,
                    style,
                } => {
                    h.write_u8(2);
                    hash_path(&mut h, path);
                    hash_paint(&mut h, paint);
                    h.write_f64(*alpha);
                    h.write_f64(style.width);
                    for d in &style.dash {
                        h.write_f64(*d);
                    }
                    h.write_u8(style.cap as u8);
                    h.write_u8(style.join as u8);
                }
                DrawCmd::Text {
                    text,
                    origin,
                    size,
                    align,
                    paint,
                    alpha,
                } => {
                    h.write_u8(3);
                    h.write_str(text);
                    h.write_f64(origin.x);
                    h.write_f64(origin.y);
                    h.write_f64(*size);
                    h.write_u8(*align as u8);
                    hash_paint(&mut h, paint);
                    h.write_f64(*alpha);
                }
            }
        }
        h.finish()
    }
}

fn hash_path(h: &mut Fnv1a64, path: &kurbo::BezPath) {
    use kurbo::PathEl;
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => {
                h.write_u8(0);
                h.write_f64(p.x);
                h.write_f64(p.y);
            }
            PathEl::LineTo(p) => {
                h.write_u8(1);
                h.write_f64(p.x);
                h.write_f64(p.y);
            }
            PathEl::QuadTo(p1, p2) => {
                h.write_u8(2);
                for p in [p1, p2] {
                    h.write_f64(p.x);
                    h.write_f64(p.y);
                }
            }
            PathEl::CurveTo(p1, p2, p3) => {
                h.write_u8(3);
                for p in [p1, p2, p3] {
                    h.write_f64(p.x);
                    h.write_f64(p.y);
                }
            }
            PathEl::ClosePath => h.write_u8(4),
        }
    }
}

fn hash_paint(h: &mut Fnv1a64, paint: &Paint) {
    let stops = match paint {
        Paint::Solid { color } => {
            h.write_u8(0);
            h.write_bytes(&[color.r, color.g, color.b, color.a]);
            return;
        }
        Paint::Linear { start, end, stops } => {
            h.write_u8(1);
            for v in [start.x, start.y, end.x, end.y] {
                h.write_f64(v);
            }
            stops
        }
        Paint::Radial {
            center,
            radius,
            stops,
        } => {
            h.write_u8(2);
            for v in [center.x, center.y, *radius] {
                h.write_f64(v);
            }
            stops
        }
    };
    for s in stops {
        h.write_f64(s.offset);
        h.write_bytes(&[s.color.r, s.color.g, s.color.b, s.color.a]);
    }
}

impl Surface for DisplayList {
    fn canvas(&self) -> Canvas {
        self.canvas
    }

    fn execute(&mut self, cmd: &DrawCmd) -> BrandwaveResult<()> {
        self.cmds.push(cmd.clone());
        Ok(())
    }
}
