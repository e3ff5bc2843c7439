//! Parametric shape presets: concentric rings, spinning polygons, lemniscates.
//!
//! None of these sample generated layers. The two that need randomness draw it from the
//! request's generator stream so a seed fixes their jitter.

use std::f64::consts::TAU;
use std::sync::Arc;

use crate::foundation::core::Rgba8;
use crate::foundation::error::BrandwaveResult;
use crate::generate::wave::WaveGenerator;
use crate::params::schema::{CATEGORY_CUSTOM, ParamSchema, ParamSpec};
use crate::presets::{hsl, hsla, preset_schema, require};
use crate::surface::cmd::{GradientStop, LineCap, LineJoin};
use crate::surface::painter::Painter;
use crate::template::contract::{DrawArgs, Template, TemplateMeta};

fn radial_backdrop(painter: &mut Painter, w: f64, h: f64, inner: Rgba8, outer: Rgba8) {
    let paint = painter.radial_gradient(
        w / 2.0,
        h / 2.0,
        w.max(h) / 2.0,
        &[GradientStop::new(0.0, inner), GradientStop::new(1.0, outer)],
    );
    painter.set_fill(paint);
    painter.fill_rect(0.0, 0.0, w, h);
}

fn disc(painter: &mut Painter, x: f64, y: f64, r: f64) {
    painter.begin_path();
    painter.arc(x, y, r, 0.0, TAU, false);
    painter.fill();
}

// pulse-rings

pub(crate) fn pulse_rings() -> BrandwaveResult<Template> {
    let own = ParamSchema::new()
        .with(
            "radius",
            ParamSpec::slider(80.0, 10.0, 200.0, 1.0, "Base Radius")
                .in_category(CATEGORY_CUSTOM)
                .with_unit("px"),
        )
        .with(
            "ringWidth",
            ParamSpec::slider(3.0, 1.0, 10.0, 1.0, "Ring Width")
                .in_category(CATEGORY_CUSTOM)
                .with_unit("px"),
        )
        .with(
            "colorVariation",
            ParamSpec::slider(0.5, 0.0, 1.0, 0.01, "Color Variation").in_category(CATEGORY_CUSTOM),
        );
    let schema = preset_schema(
        "pulse-rings",
        &[
            ("amplitude", 25.0),
            ("complexity", 0.6),
            ("damping", 0.8),
            ("layers", 4.0),
        ],
        own,
    );
    let meta = TemplateMeta::new(
        "pulse-rings",
        "Pulse Rings",
        "Pulsing concentric rings in a green palette with orbiting dots",
    )
    .in_category("Geometric");
    Template::new(meta, schema, false, Arc::new(draw_pulse_rings))
}

fn draw_pulse_rings(
    painter: &mut Painter,
    args: &DrawArgs<'_>,
    _generator: Option<&mut WaveGenerator>,
) -> BrandwaveResult<()> {
    let (w, h, time) = (args.width, args.height, args.time);
    let p = args.params;
    let (cx, cy) = (w / 2.0, h / 2.0);
    let base = p.number("radius", 80.0);
    let layers = p.integer("layers", 4).clamp(1, 64);
    let amplitude = p.number("amplitude", 25.0);
    let complexity = p.number("complexity", 0.6);
    let variation = p.number("colorVariation", 0.5);
    let ring_width = p.number("ringWidth", 3.0);

    radial_backdrop(
        painter,
        w,
        h,
        Rgba8::opaque(0xfa, 0xfa, 0xfa),
        Rgba8::opaque(0xf0, 0xf0, 0xf0),
    );

    let n = layers as f64;
    for layer in 0..layers {
        let l = layer as f64;
        let phase = l / n * TAU + time * 0.5;
        let radius = (base * (1.0 + l * 0.3) + amplitude * (phase + time).sin()).max(10.0);
        let hue = 140.0 + l / n * 20.0 + variation * 15.0 * (time + l).sin();
        let sat = 70.0 - l * 5.0;
        let light = 50.0 + l * 5.0;

        painter.set_stroke_color(hsl(hue, sat, light));
        painter.set_line_width(ring_width);
        painter.set_global_alpha((0.8 - l * 0.1).max(0.0));
        painter.begin_path();
        painter.arc(cx, cy, radius, 0.0, TAU, false);
        painter.stroke();

        if complexity > 0.3 {
            let orbits = (complexity * 8.0).floor() as u32;
            painter.set_fill_color(hsl(hue + 10.0, sat, light + 20.0));
            painter.set_global_alpha(0.6);
            for i in 0..orbits {
                let a = f64::from(i) / f64::from(orbits) * TAU + phase;
                disc(
                    painter,
                    cx + a.cos() * radius * 0.7,
                    cy + a.sin() * radius * 0.7,
                    5.0 + l * 2.0,
                );
            }
        }
    }
    painter.set_global_alpha(1.0);
    Ok(())
}

// spinning-polygons

pub(crate) fn spinning_polygons() -> BrandwaveResult<Template> {
    let own = ParamSchema::new()
        .with(
            "sides",
            ParamSpec::slider(3.0, 3.0, 12.0, 1.0, "Sides").in_category(CATEGORY_CUSTOM),
        )
        .with(
            "rotation",
            ParamSpec::slider(0.0, 0.0, 360.0, 15.0, "Rotation")
                .in_category(CATEGORY_CUSTOM)
                .with_unit("deg"),
        );
    let schema = preset_schema(
        "spinning-polygons",
        &[
            ("amplitude", 40.0),
            ("complexity", 0.4),
            ("chaos", 0.2),
            ("damping", 0.85),
            ("layers", 3.0),
        ],
        own,
    );
    let meta = TemplateMeta::new(
        "spinning-polygons",
        "Spinning Polygons",
        "Rotating translucent polygons with orbiting satellites on a dark ground",
    )
    .in_category("Geometric");
    Template::new(meta, schema, true, Arc::new(draw_spinning_polygons))
}

/// Vertices of a regular polygon, first vertex at `rotation` radians.
fn polygon_path(painter: &mut Painter, x: f64, y: f64, size: f64, sides: u32, rotation: f64) {
    painter.begin_path();
    painter.polygon(x, y, size, sides, rotation);
}

fn draw_spinning_polygons(
    painter: &mut Painter,
    args: &DrawArgs<'_>,
    generator: Option<&mut WaveGenerator>,
) -> BrandwaveResult<()> {
    let rng = require(generator, "spinning-polygons")?;
    let (w, h, time) = (args.width, args.height, args.time);
    let p = args.params;
    let (cx, cy) = (w / 2.0, h / 2.0);
    let layers = p.integer("layers", 3).clamp(1, 64);
    let freq = p.number("frequency", 3.0);
    let amp = p.number("amplitude", 40.0);
    let complexity = p.number("complexity", 0.4);
    let chaos = p.number("chaos", 0.2);
    let damping = p.number("damping", 0.85);
    let sides = p.integer("sides", 3).clamp(3, 64) as u32;
    let base_rotation = p.number("rotation", 0.0);

    painter.set_fill_color(Rgba8::opaque(0x0a, 0x0a, 0x0a));
    painter.fill_rect(0.0, 0.0, w, h);

    let n = layers as f64;
    let size_at = |l: f64| amp * w.min(h) / 400.0 * damping.powf(l);
    let phase_at = |l: f64| l / n * freq * TAU + time;
    let hue_at = |l: f64| l / n * 120.0 + time * 20.0 + 240.0;

    for layer in 0..layers {
        let l = layer as f64;
        let phase = phase_at(l);
        let size = size_at(l);
        let rotation = base_rotation + phase.to_degrees();

        let jitter_x = (rng.next_random() - 0.5) * size * chaos * 0.4;
        let jitter_y = (rng.next_random() - 0.5) * size * chaos * 0.4;
        let jitter_rot = (rng.next_random() - 0.5) * 90.0 * chaos;
        // The clamp bounds cross when the polygon is wider than the canvas.
        let x = (cx + jitter_x).min(w - size).max(size);
        let y = (cy + jitter_y).min(h - size).max(size);

        let hue = hue_at(l);
        let sat = 70.0 - l * 5.0;
        let light = 45.0 + phase.sin() * 15.0;

        painter.save();
        painter.set_global_alpha((0.8 - l * 0.1).max(0.0));
        painter.set_fill_color(hsla(hue, sat, light + 20.0, 0.3));
        polygon_path(painter, x, y, size, sides, (rotation + jitter_rot).to_radians());
        painter.fill();
        painter.set_stroke_color(hsl(hue, sat, light));
        painter.set_line_width((size / 30.0).max(1.0));
        painter.stroke();
        painter.restore();

        if complexity > 0.0 && l < n / 2.0 {
            let orbits = (complexity * 5.0).ceil() as u32;
            let orbit_size = size * 0.25;
            for i in 0..orbits {
                let orbit_phase = f64::from(i) / f64::from(orbits) * freq * TAU + time * 1.5;
                let ox = x + orbit_phase.cos() * size * 0.8;
                let oy = y + orbit_phase.sin() * size * 0.8;
                let inside = ox > orbit_size
                    && ox < w - orbit_size
                    && oy > orbit_size
                    && oy < h - orbit_size;
                if !inside {
                    continue;
                }
                painter.save();
                painter.set_global_alpha(0.6);
                painter.set_fill_color(hsla(hue + 60.0, sat, light + 10.0, 0.4));
                painter.set_stroke_color(hsl(hue + 60.0, sat, light));
                painter.set_line_width((orbit_size / 20.0).max(1.0));
                polygon_path(painter, ox, oy, orbit_size, 3, orbit_phase);
                painter.fill();
                painter.stroke();
                painter.restore();
            }
        }
    }

    // Glow outlines for the two largest layers, centered and without jitter.
    painter.save();
    painter.set_global_alpha(0.3);
    for layer in 0..layers.min(2) {
        let l = layer as f64;
        let phase = phase_at(l);
        let size = size_at(l);
        painter.set_stroke_color(hsl(hue_at(l), 70.0 - l * 5.0, 45.0 + phase.sin() * 15.0));
        painter.set_line_width((size / 15.0).max(2.0));
        polygon_path(painter, cx, cy, size, sides, (base_rotation + phase.to_degrees()).to_radians());
        painter.stroke();
    }
    painter.restore();
    Ok(())
}

// infinity-loops

const LOOP_SAMPLES: u32 = 120;
const GLOW_SAMPLES: u32 = 60;
const STAR_COUNT: u32 = 20;

pub(crate) fn infinity_loops() -> BrandwaveResult<Template> {
    let own = ParamSchema::new().with(
        "scale",
        ParamSpec::slider(1.0, 0.3, 3.0, 0.1, "Scale").in_category(CATEGORY_CUSTOM),
    );
    let schema = preset_schema(
        "infinity-loops",
        &[
            ("frequency", 2.0),
            ("amplitude", 60.0),
            ("complexity", 0.3),
            ("chaos", 0.1),
            ("damping", 0.9),
            ("layers", 2.0),
        ],
        own,
    );
    let meta = TemplateMeta::new(
        "infinity-loops",
        "Infinity Loops",
        "Layered lemniscates with flowing particles over a starfield",
    )
    .in_category("Geometric");
    Template::new(meta, schema, true, Arc::new(draw_infinity_loops))
}

/// Point of the Bernoulli lemniscate with half-width `a` at parameter `t`, centered on the origin.
pub(crate) fn lemniscate(a: f64, t: f64) -> (f64, f64) {
    let (s, c) = t.sin_cos();
    let d = 1.0 + s * s;
    (a * c / d, a * s * c / d)
}

fn draw_infinity_loops(
    painter: &mut Painter,
    args: &DrawArgs<'_>,
    generator: Option<&mut WaveGenerator>,
) -> BrandwaveResult<()> {
    let rng = require(generator, "infinity-loops")?;
    let (w, h, time) = (args.width, args.height, args.time);
    let p = args.params;
    let (cx, cy) = (w / 2.0, h / 2.0);
    let layers = p.integer("layers", 2).clamp(1, 64);
    let freq = p.number("frequency", 2.0);
    let amp = p.number("amplitude", 60.0);
    let complexity = p.number("complexity", 0.3);
    let chaos = p.number("chaos", 0.1);
    let damping = p.number("damping", 0.9);
    let scale = p.number("scale", 1.0) * w.min(h) / 400.0;

    radial_backdrop(
        painter,
        w,
        h,
        Rgba8::opaque(0x0f, 0x0f, 0x23),
        Rgba8::opaque(0x05, 0x05, 0x05),
    );

    let n = layers as f64;
    let amp_at = |l: f64| amp * scale * damping.powf(l);
    let phase_at = |l: f64| l / n * freq * TAU + time;
    let hue_at = |l: f64| l / n * 180.0 + time * 15.0 + 240.0;

    for layer in 0..layers {
        let l = layer as f64;
        let phase = phase_at(l);
        let a = amp_at(l);
        let hue = hue_at(l);
        let sat = 80.0 - l * 10.0;
        let light = 50.0 + phase.sin() * 20.0;

        painter.save();
        painter.set_global_alpha((0.8 - l * 0.15).max(0.0));
        painter.set_stroke_color(hsl(hue, sat, light));
        painter.set_line_width((a / 25.0).max(1.0));
        painter.set_line_cap(LineCap::Round);
        painter.set_line_join(LineJoin::Round);
        painter.begin_path();
        for i in 0..=LOOP_SAMPLES {
            let t = f64::from(i) / f64::from(LOOP_SAMPLES) * TAU + (time + l * 0.5) * freq;
            let (mut x, mut y) = lemniscate(a, t);
            if chaos > 0.0 {
                x += (rng.next_random() - 0.5) * a * chaos * 0.1;
                y += (rng.next_random() - 0.5) * a * chaos * 0.1;
            }
            painter.line_to(cx + x, cy + y);
        }
        painter.stroke();
        painter.restore();

        if complexity > 0.0 {
            let particles = (complexity * 8.0).ceil() as u32;
            let size = a * 0.05;
            for i in 0..particles {
                let particle_phase =
                    f64::from(i) / f64::from(particles) * freq * TAU + time * 2.0 + l;
                let t = (particle_phase / TAU).rem_euclid(1.0) * TAU;
                let (x, y) = lemniscate(a, t + time * freq);
                let px = cx + x + (rng.next_random() - 0.5) * a * 0.1;
                let py = cy + y + (rng.next_random() - 0.5) * a * 0.1;
                if px > size && px < w - size && py > size && py < h - size {
                    painter.save();
                    painter.set_global_alpha(0.6 + particle_phase.sin() * 0.3);
                    painter.set_fill_color(hsla(hue + 30.0, sat, light + 20.0, 0.7));
                    disc(painter, px, py, size);
                    painter.restore();
                }
            }
        }
    }

    painter.save();
    painter.set_global_alpha(0.3);
    painter.set_line_cap(LineCap::Round);
    for layer in 0..layers.min(2) {
        let l = layer as f64;
        let a = amp_at(l);
        painter.set_stroke_color(hsl(hue_at(l), 80.0 - l * 10.0, 50.0 + phase_at(l).sin() * 20.0));
        painter.set_line_width((a / 15.0).max(2.0));
        painter.begin_path();
        for i in 0..=GLOW_SAMPLES {
            let t = f64::from(i) / f64::from(GLOW_SAMPLES) * TAU + (time + l * 0.5) * freq;
            let (x, y) = lemniscate(a, t);
            painter.line_to(cx + x, cy + y);
        }
        painter.stroke();
    }
    painter.restore();

    painter.save();
    painter.set_fill_color(Rgba8::new(255, 255, 255, 77));
    for i in 0..STAR_COUNT {
        let i = f64::from(i);
        let x = ((time * 0.1 + i).sin() * 0.5 + 0.5) * w;
        let y = ((time * 0.15 + i * 2.0).cos() * 0.5 + 0.5) * h;
        let r = (time * 0.5 + i).sin() * 0.5 + 1.0;
        disc(painter, x, y, r);
    }
    painter.restore();
    Ok(())
}
