use std::path::Path;

use kurbo::{BezPath, PathEl, Point, Shape};

use crate::foundation::core::{Canvas, Rgba8};
use crate::foundation::error::{BrandwaveError, BrandwaveResult};
use crate::foundation::math::mul_div255_u16;
use crate::surface::Surface;
use crate::surface::cmd::{DrawCmd, LineCap, LineJoin, Paint, StrokeStyle};
use crate::surface::font;
use crate::surface::painter::{MAX_DASHES, dash_count};

const STROKE_TOLERANCE: f64 = 0.1;

/// A rendered frame: row-major RGBA8, premultiplied unless `premultiplied` is false.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

impl FrameRGBA {
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        self.data.get(i..i + 4).map(|s| [s[0], s[1], s[2], s[3]])
    }

    /// Convert to straight alpha; a no-op for frames that already are.
    pub fn to_straight(&self) -> Self {
        if !self.premultiplied {
            return self.clone();
        }
        let mut data = self.data.clone();
        for px in data.chunks_exact_mut(4) {
            let c = unpremultiply([px[0], px[1], px[2], px[3]]);
            px.copy_from_slice(&[c.r, c.g, c.b, c.a]);
        }
        Self {
            data,
            premultiplied: false,
            ..*self
        }
    }

    /// Encode as PNG bytes (straight alpha).
    pub fn to_png(&self) -> BrandwaveResult<Vec<u8>> {
        use image::ImageEncoder;

        let straight = self.to_straight();
        let mut out = Vec::new();
        image::codecs::png::PngEncoder::new(&mut out)
            .write_image(
                &straight.data,
                self.width,
                self.height,
                image::ExtendedColorType::Rgba8,
            )
            .map_err(|e| BrandwaveError::Other(anyhow::anyhow!("png encode failed: {e}")))?;
        Ok(out)
    }

    pub fn save_png(&self, path: &Path) -> BrandwaveResult<()> {
        let straight = self.to_straight();
        image::save_buffer_with_format(
            path,
            &straight.data,
            self.width,
            self.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .map_err(|e| {
            BrandwaveError::Other(anyhow::anyhow!(
                "failed to write '{}': {e}",
                path.display()
            ))
        })
    }
}

/// CPU rasterizer backed by `vello_cpu`.
///
/// Each command's coverage is rasterized into a scratch mask sized to its bounds, then
/// composited source-over into a premultiplied frame buffer with the command's paint.
pub struct RasterSurface {
    canvas: Canvas,
    data: Vec<u8>,
}

impl RasterSurface {
    pub fn new(canvas: Canvas) -> BrandwaveResult<Self> {
        if canvas.width == 0 || canvas.height == 0 {
            return Err(BrandwaveError::validation(
                "raster surface width and height must be > 0",
            ));
        }
        u16::try_from(canvas.width)
            .map_err(|_| BrandwaveError::validation("surface width exceeds u16"))?;
        u16::try_from(canvas.height)
            .map_err(|_| BrandwaveError::validation("surface height exceeds u16"))?;
        let len = (canvas.width as usize) * (canvas.height as usize) * 4;
        Ok(Self {
            canvas,
            data: vec![0; len],
        })
    }

    /// Current pixels, premultiplied RGBA8.
    pub fn image_data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_frame(self) -> FrameRGBA {
        FrameRGBA {
            width: self.canvas.width,
            height: self.canvas.height,
            data: self.data,
            premultiplied: true,
        }
    }

    fn clear_rect(&mut self, rect: kurbo::Rect) {
        let Some((x0, y0, x1, y1)) = self.pixel_bounds(rect) else {
            return;
        };
        let w = self.canvas.width as usize;
        for y in y0..y1 {
            let row = (y as usize * w + x0 as usize) * 4;
            let end = (y as usize * w + x1 as usize) * 4;
            self.data[row..end].fill(0);
        }
    }

    /// Integer pixel box covering `rect`, clipped to the canvas.
    fn pixel_bounds(&self, rect: kurbo::Rect) -> Option<(u32, u32, u32, u32)> {
        if ![rect.x0, rect.y0, rect.x1, rect.y1]
            .iter()
            .all(|v| v.is_finite())
        {
            return None;
        }
        let x0 = rect.x0.floor().max(0.0);
        let y0 = rect.y0.floor().max(0.0);
        let x1 = rect.x1.ceil().min(self.canvas.width_f64());
        let y1 = rect.y1.ceil().min(self.canvas.height_f64());
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
    }

    fn fill_path(&mut self, path: &BezPath, paint: &Paint, alpha: f64) -> BrandwaveResult<()> {
        let alpha = if alpha.is_finite() {
            alpha.clamp(0.0, 1.0)
        } else {
            1.0
        };
        if alpha <= 0.0 || path.elements().is_empty() {
            return Ok(());
        }
        if !path_is_finite(path) {
            return Ok(());
        }
        let Some((x0, y0, x1, y1)) = self.pixel_bounds(path.bounding_box()) else {
            return Ok(());
        };
        let (mw, mh) = (x1 - x0, y1 - y0);
        let mask = coverage_mask(path, x0, y0, mw, mh)?;

        let op = (alpha * 255.0).round() as u16;
        let w = self.canvas.width as usize;
        for my in 0..mh {
            for mx in 0..mw {
                let coverage = u16::from(mask[((my * mw + mx) * 4 + 3) as usize]);
                if coverage == 0 {
                    continue;
                }
                let (px, py) = (x0 + mx, y0 + my);
                let color = paint.color_at(Point::new(f64::from(px) + 0.5, f64::from(py) + 0.5));
                let src = color.to_premul().to_array();
                let i = (py as usize * w + px as usize) * 4;
                let dst = [
                    self.data[i],
                    self.data[i + 1],
                    self.data[i + 2],
                    self.data[i + 3],
                ];
                let out = over(dst, src, mul_div255_u16(coverage, op));
                self.data[i..i + 4].copy_from_slice(&out);
            }
        }
        Ok(())
    }
}

impl Surface for RasterSurface {
    fn canvas(&self) -> Canvas {
        self.canvas
    }

    fn execute(&mut self, cmd: &DrawCmd) -> BrandwaveResult<()> {
        match cmd {
            DrawCmd::Clear { rect } => {
                self.clear_rect(*rect);
                Ok(())
            }
            DrawCmd::Fill { path, paint, alpha } => self.fill_path(path, paint, *alpha),
            DrawCmd::Stroke {
                path,
                paint,
                alpha,
                style,
            } => {
                if !(style.width.is_finite() && style.width > 0.0) || !path_is_finite(path) {
                    return Ok(());
                }
                let dashes = dash_count(path, &style.dash);
                if dashes > MAX_DASHES {
                    return Err(BrandwaveError::validation(format!(
                        "stroke expands into {dashes:.0} dashes (limit {MAX_DASHES:.0})"
                    )));
                }
                let outline = stroke_outline(path, style);
                self.fill_path(&outline, paint, *alpha)
            }
            DrawCmd::Text {
                text,
                origin,
                size,
                align,
                paint,
                alpha,
            } => {
                if !(size.is_finite() && *size > 0.0) {
                    return Ok(());
                }
                let glyphs = font::text_path(text, *origin, *size, *align);
                self.fill_path(&glyphs, paint, *alpha)
            }
        }
    }
}

/// Source-over of premultiplied `src` scaled by `opacity` (0..=255) onto `dst`.
fn over(dst: [u8; 4], src: [u8; 4], opacity: u16) -> [u8; 4] {
    if opacity == 0 || src[3] == 0 {
        return dst;
    }
    let sa = mul_div255_u16(u16::from(src[3]), opacity);
    if sa == 0 {
        return dst;
    }
    let inv = 255 - sa;
    let mut out = [0u8; 4];
    out[3] = (sa + mul_div255_u16(u16::from(dst[3]), inv)).min(255) as u8;
    for i in 0..3 {
        let sc = mul_div255_u16(u16::from(src[i]), opacity);
        let dc = mul_div255_u16(u16::from(dst[i]), inv);
        out[i] = (sc + dc).min(255) as u8;
    }
    out
}

fn coverage_mask(path: &BezPath, x0: u32, y0: u32, w: u32, h: u32) -> BrandwaveResult<Vec<u8>> {
    let w16: u16 = w
        .try_into()
        .map_err(|_| BrandwaveError::validation("mask width exceeds u16"))?;
    let h16: u16 = h
        .try_into()
        .map_err(|_| BrandwaveError::validation("mask height exceeds u16"))?;

    let mut ctx = vello_cpu::RenderContext::new(w16, h16);
    ctx.set_transform(vello_cpu::kurbo::Affine::translate((
        -f64::from(x0),
        -f64::from(y0),
    )));
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(255, 255, 255, 255));
    ctx.fill_path(&bezpath_to_cpu(path));
    ctx.flush();

    let mut pixmap = vello_cpu::Pixmap::new(w16, h16);
    ctx.render_to_pixmap(&mut pixmap);
    Ok(pixmap.data_as_u8_slice().to_vec())
}

fn stroke_outline(path: &BezPath, style: &StrokeStyle) -> BezPath {
    let cap = match style.cap {
        LineCap::Butt => kurbo::Cap::Butt,
        LineCap::Round => kurbo::Cap::Round,
        LineCap::Square => kurbo::Cap::Square,
    };
    let join = match style.join {
        LineJoin::Miter => kurbo::Join::Miter,
        LineJoin::Round => kurbo::Join::Round,
        LineJoin::Bevel => kurbo::Join::Bevel,
    };
    let mut stroke = kurbo::Stroke::new(style.width)
        .with_caps(cap)
        .with_join(join);
    if style.dash.iter().any(|d| *d > 0.0) {
        stroke = stroke.with_dashes(style.dash_offset, style.dash.iter().copied());
    }
    kurbo::stroke(
        path.iter(),
        &stroke,
        &kurbo::StrokeOpts::default(),
        STROKE_TOLERANCE,
    )
}

fn path_is_finite(path: &BezPath) -> bool {
    let ok = |p: &Point| p.x.is_finite() && p.y.is_finite();
    path.elements().iter().all(|el| match el {
        PathEl::MoveTo(p) | PathEl::LineTo(p) => ok(p),
        PathEl::QuadTo(a, b) => ok(a) && ok(b),
        PathEl::CurveTo(a, b, c) => ok(a) && ok(b) && ok(c),
        PathEl::ClosePath => true,
    })
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::LineTo(p) => out.line_to(vello_cpu::kurbo::Point::new(p.x, p.y)),
            PathEl::QuadTo(p1, p2) => out.quad_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
            ),
            PathEl::CurveTo(p1, p2, p3) => out.curve_to(
                vello_cpu::kurbo::Point::new(p1.x, p1.y),
                vello_cpu::kurbo::Point::new(p2.x, p2.y),
                vello_cpu::kurbo::Point::new(p3.x, p3.y),
            ),
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

/// Straight-alpha color of a premultiplied pixel.
pub(crate) fn unpremultiply(px: [u8; 4]) -> Rgba8 {
    let a = u32::from(px[3]);
    if a == 0 {
        return Rgba8::TRANSPARENT;
    }
    let c = |v: u8| ((u32::from(v) * 255 + a / 2) / a).min(255) as u8;
    Rgba8::new(c(px[0]), c(px[1]), c(px[2]), px[3])
}

#[cfg(test)]
#[path = "../../tests/unit/surface/raster.rs"]
mod tests;
