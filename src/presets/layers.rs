//! Stacked wave lines, flat or nested.

use std::sync::Arc;

use kurbo::Rect;

use crate::foundation::core::Rgba8;
use crate::foundation::error::BrandwaveResult;
use crate::generate::wave::{GenerationOptions, NestingRatios, WaveGenerator, WavePoint};
use crate::params::schema::{CATEGORY_CUSTOM, ParamSchema, ParamSpec};
use crate::presets::{preset_schema, require};
use crate::style::background::apply_background;
use crate::style::color::rotate_hue;
use crate::style::paint::resolve_fill;
use crate::surface::cmd::{LineCap, LineJoin};
use crate::surface::painter::Painter;
use crate::template::contract::{DrawArgs, Template, TemplateMeta};

const DEFAULT_LINE: Rgba8 = Rgba8::opaque(0x3b, 0x82, 0xf6);
/// Hue step between consecutive layers, in degrees.
const LAYER_HUE_STEP: f64 = 25.0;

pub(crate) fn wave_layers() -> BrandwaveResult<Template> {
    let own = ParamSchema::new()
        .with(
            "resolution",
            ParamSpec::slider(200.0, 20.0, 1000.0, 10.0, "Resolution").in_category(CATEGORY_CUSTOM),
        )
        .with(
            "lineColor",
            ParamSpec::color("#3b82f6", "Line Color").in_category(CATEGORY_CUSTOM),
        )
        .with(
            "lineWidth",
            ParamSpec::slider(2.0, 0.5, 10.0, 0.5, "Line Width")
                .in_category(CATEGORY_CUSTOM)
                .with_unit("px"),
        )
        .with(
            "fillArea",
            ParamSpec::toggle(false, "Fill Below Waves").in_category(CATEGORY_CUSTOM),
        )
        .with(
            "nested",
            ParamSpec::toggle(false, "Wave Within Wave").in_category(CATEGORY_CUSTOM),
        );
    let schema = preset_schema("wave-layers", &[("layers", 3.0), ("damping", 0.8)], own);
    let meta = TemplateMeta::new(
        "wave-layers",
        "Wave Layers",
        "Overlapping generated wave lines, optionally nested into a wave within a wave",
    )
    .in_category("Waves");
    Template::new(meta, schema, true, Arc::new(draw_wave_layers))
}

fn trace(painter: &mut Painter, points: &[WavePoint]) {
    for (i, p) in points.iter().enumerate() {
        if i == 0 {
            painter.move_to(p.x, p.y);
        } else {
            painter.line_to(p.x, p.y);
        }
    }
}

fn draw_wave_layers(
    painter: &mut Painter,
    args: &DrawArgs<'_>,
    generator: Option<&mut WaveGenerator>,
) -> BrandwaveResult<()> {
    let generator = require(generator, "wave-layers")?;
    let (w, h) = (args.width, args.height);
    let resolution = args.params.integer("resolution", 200).clamp(2, 10_000) as usize;
    let line = args.params.color("lineColor", DEFAULT_LINE);
    let line_width = args.params.number("lineWidth", 2.0).max(0.0);

    apply_background(painter, w, h, args.params);
    painter.set_line_cap(LineCap::Round);
    painter.set_line_join(LineJoin::Round);
    painter.set_line_width(line_width);

    let opts = GenerationOptions::new(w, h, resolution).with_time(args.time);

    if args.params.flag("nested", false) {
        let nested = generator.generate_nested(&opts, &NestingRatios::default());
        painter.save();
        painter.set_global_alpha(0.35);
        painter.set_stroke_color(line);
        painter.begin_path();
        trace(painter, &nested.container);
        painter.stroke();
        painter.restore();

        let detail: Vec<WavePoint> = nested.detail_points().copied().collect();
        painter.set_stroke_color(rotate_hue(line, LAYER_HUE_STEP));
        painter.begin_path();
        trace(painter, &detail);
        painter.stroke();
        return Ok(());
    }

    let layers = generator.generate(&opts);
    let fill = args.params.flag("fillArea", false).then(|| resolve_fill(args.params));
    let count = layers.len().max(1) as f64;

    for (i, layer) in layers.iter().enumerate() {
        if layer.is_empty() {
            continue;
        }
        let alpha = 1.0 - i as f64 / count * 0.6;
        painter.save();
        painter.set_global_alpha(alpha);

        if let Some(fill) = &fill {
            let top = layer.iter().map(|p| p.y).fold(h, f64::min);
            if fill.apply(painter, Rect::new(0.0, top, w, h)) {
                painter.save();
                painter.set_global_alpha(alpha * 0.3);
                painter.begin_path();
                trace(painter, layer);
                painter.line_to(w, h);
                painter.line_to(0.0, h);
                painter.close_path();
                painter.fill();
                painter.restore();
            }
        }

        painter.set_stroke_color(rotate_hue(line, i as f64 * LAYER_HUE_STEP));
        painter.begin_path();
        trace(painter, layer);
        painter.stroke();
        painter.restore();
    }
    Ok(())
}
