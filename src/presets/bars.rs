//! Bar visualizers sampled from a generated wave.

use std::f64::consts::TAU;
use std::sync::Arc;

use crate::foundation::core::Rgba8;
use crate::foundation::error::BrandwaveResult;
use crate::generate::wave::{GenerationOptions, WaveGenerator, WaveParameters};
use crate::params::schema::{CATEGORY_CUSTOM, ParamSchema, ParamSpec};
use crate::presets::{hsla, preset_schema, require};
use crate::style::background::apply_background;
use crate::surface::cmd::GradientStop;
use crate::surface::painter::Painter;
use crate::template::contract::{DrawArgs, Template, TemplateMeta};

const GUIDE_COLOR: Rgba8 = Rgba8::new(100, 100, 100, 38);

fn bar_params(count: (f64, f64, f64, f64), spacing: (f64, f64, f64)) -> ParamSchema {
    let (default, min, max, step) = count;
    ParamSchema::new()
        .with(
            "barCount",
            ParamSpec::slider(default, min, max, step, "Bar Count").in_category(CATEGORY_CUSTOM),
        )
        .with(
            "barSpacing",
            ParamSpec::slider(spacing.0, spacing.1, spacing.2, 1.0, "Bar Spacing")
                .in_category(CATEGORY_CUSTOM)
                .with_unit("px"),
        )
}

/// Layout of `count` bars across `width` with `spacing` between neighbours.
///
/// The bar width never drops below one pixel.
pub(crate) fn bar_width(width: f64, count: usize, spacing: f64) -> f64 {
    let n = count.max(1) as f64;
    ((width - spacing * (n - 1.0)) / n).max(1.0)
}

fn dot(painter: &mut Painter, x: f64, y: f64, r: f64) {
    painter.begin_path();
    painter.arc(x, y, r, 0.0, TAU, false);
    painter.fill();
}

pub(crate) fn wave_bars() -> BrandwaveResult<Template> {
    let schema = preset_schema(
        "wave-bars",
        &[
            ("frequency", 3.0),
            ("amplitude", 50.0),
            ("complexity", 0.3),
            ("chaos", 0.1),
            ("damping", 0.9),
            ("layers", 2.0),
        ],
        bar_params((40.0, 20.0, 100.0, 5.0), (2.0, 0.0, 10.0)),
    );
    let meta = TemplateMeta::new(
        "wave-bars",
        "Wave Bars",
        "Gradient bars riding a generated wave, with a dashed center guide",
    )
    .in_category("Audio");
    Template::new(meta, schema, true, Arc::new(draw_wave_bars))
}

fn draw_wave_bars(
    painter: &mut Painter,
    args: &DrawArgs<'_>,
    generator: Option<&mut WaveGenerator>,
) -> BrandwaveResult<()> {
    let generator = require(generator, "wave-bars")?;
    let (w, h) = (args.width, args.height);
    let count = args.params.integer("barCount", 40).clamp(1, 1000) as usize;
    let spacing = args.params.number("barSpacing", 2.0).max(0.0);
    let bw = bar_width(w, count, spacing);
    let cy = h / 2.0;

    apply_background(painter, w, h, args.params);

    let opts = GenerationOptions::new(w, h, count).with_time(args.time);
    let main = generator.generate_layer(&opts, 0, args.time);

    // A faster, flatter companion wave sets the bar heights.
    let base = *generator.params();
    let seed = generator.seed().map(|s| format!("{s}-bars"));
    let mut heights = WaveGenerator::new(
        WaveParameters {
            amplitude: 40.0,
            frequency: base.frequency * 3.0,
            ..base
        },
        seed.as_deref(),
    );
    let height_wave = heights.generate_layer(&opts, 0, args.time * 2.0);

    for (i, (p, hp)) in main.iter().zip(&height_wave).enumerate() {
        let x = i as f64 * (bw + spacing);
        let bh = (hp.y - cy).abs() + 20.0;
        let y = p.y - bh / 2.0;
        let hue = i as f64 / count as f64 * 360.0;

        let paint = painter.linear_gradient(
            x,
            y,
            x,
            y + bh,
            &[
                GradientStop::new(0.0, hsla(hue, 70.0, 60.0, 0.9)),
                GradientStop::new(0.5, hsla(hue, 80.0, 50.0, 1.0)),
                GradientStop::new(1.0, hsla(hue, 70.0, 60.0, 0.9)),
            ],
        );
        painter.set_fill(paint);
        painter.begin_path();
        painter.rounded_rect(x, y, bw, bh, bw / 3.0);
        painter.fill();

        // End caps reuse the bar gradient.
        if bh > 25.0 {
            dot(painter, x + bw / 2.0, p.y - bh / 2.0 - 4.0, bw / 2.5);
            dot(painter, x + bw / 2.0, p.y + bh / 2.0 + 4.0, bw / 2.5);
        }
    }

    painter.save();
    painter.set_stroke_color(GUIDE_COLOR);
    painter.set_line_width(1.0);
    painter.set_line_dash(&[5.0, 5.0]);
    painter.begin_path();
    painter.move_to(0.0, cy);
    painter.line_to(w, cy);
    painter.stroke();
    painter.restore();
    Ok(())
}

pub(crate) fn audio_bars() -> BrandwaveResult<Template> {
    let schema = preset_schema(
        "audio-bars",
        &[
            ("frequency", 4.0),
            ("amplitude", 60.0),
            ("complexity", 0.2),
            ("chaos", 0.15),
            ("damping", 0.85),
            ("layers", 1.0),
        ],
        bar_params((30.0, 10.0, 80.0, 1.0), (3.0, 1.0, 8.0)),
    );
    let meta = TemplateMeta::new(
        "audio-bars",
        "Audio Bars",
        "Equalizer bars mirrored around the horizontal center",
    )
    .in_category("Audio");
    Template::new(meta, schema, true, Arc::new(draw_audio_bars))
}

fn draw_audio_bars(
    painter: &mut Painter,
    args: &DrawArgs<'_>,
    generator: Option<&mut WaveGenerator>,
) -> BrandwaveResult<()> {
    let generator = require(generator, "audio-bars")?;
    let (w, h) = (args.width, args.height);
    let count = args.params.integer("barCount", 30).clamp(1, 1000) as usize;
    let spacing = args.params.number("barSpacing", 3.0).max(0.0);
    let bw = bar_width(w, count, spacing);
    let cy = h / 2.0;

    apply_background(painter, w, h, args.params);

    let opts = GenerationOptions::new(w, h, count).with_time(args.time);
    let wave = generator.generate_layer(&opts, 0, args.time);

    for (i, p) in wave.iter().enumerate() {
        let x = i as f64 * (bw + spacing);
        let bh = (p.y - cy).abs() * 2.0;
        let hue = i as f64 / count as f64 * 360.0;

        let paint = painter.linear_gradient(
            x,
            cy - bh / 2.0,
            x,
            cy + bh / 2.0,
            &[
                GradientStop::new(0.0, hsla(hue, 70.0, 60.0, 0.9)),
                GradientStop::new(0.5, hsla(hue, 80.0, 50.0, 1.0)),
                GradientStop::new(1.0, hsla(hue, 70.0, 60.0, 0.9)),
            ],
        );
        painter.set_fill(paint);
        painter.begin_path();
        painter.rounded_rect(x, cy - bh / 2.0, bw, bh, bw / 3.0);
        painter.fill();

        if bh > 20.0 {
            dot(painter, x + bw / 2.0, cy - bh / 2.0 - 5.0, bw / 2.5);
            dot(painter, x + bw / 2.0, cy + bh / 2.0 + 5.0, bw / 2.5);
        }
    }
    Ok(())
}
