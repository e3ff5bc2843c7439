use super::*;
use crate::foundation::core::Canvas;
use crate::surface::cmd::{DrawCmd, Paint};
use serde_json::json;

fn painter() -> Painter {
    Painter::new(Canvas {
        width: 200,
        height: 100,
    })
}

#[test]
fn transparent_and_unknown_draw_nothing() {
    for ty in ["transparent", "plaid"] {
        let mut p = painter();
        let params = ParamMap::from_value(&json!({ "backgroundType": ty }));
        apply_background(&mut p, 200.0, 100.0, &params);
        assert_eq!(p.command_count(), 0, "{ty}");
    }
}

#[test]
fn solid_background_uses_opacity_and_restores_state() {
    let mut p = painter();
    p.translate(50.0, 50.0);
    let params = ParamMap::from_value(&json!({
        "backgroundType": "solid",
        "backgroundColor": "#102030",
        "backgroundOpacity": 0.5
    }));
    apply_background(&mut p, 200.0, 100.0, &params);
    assert_eq!(p.global_alpha(), 1.0);
    assert_eq!(p.transform(), kurbo::Affine::translate((50.0, 50.0)));
    let list = p.finish();
    let DrawCmd::Fill { path, paint, alpha } = &list.cmds[0] else {
        panic!("expected fill");
    };
    assert_eq!(*alpha, 0.5);
    assert_eq!(*paint, Paint::solid(Rgba8::opaque(0x10, 0x20, 0x30)));
    assert_eq!(kurbo::Shape::bounding_box(path), kurbo::Rect::new(0.0, 0.0, 200.0, 100.0));
}

#[test]
fn gradient_axis_spans_half_diagonal() {
    let (a, b) = gradient_axis(300.0, 400.0, 0.0);
    assert!((a.x - -100.0).abs() < 1e-9 && (a.y - 200.0).abs() < 1e-9);
    assert!((b.x - 400.0).abs() < 1e-9 && (b.y - 200.0).abs() < 1e-9);

    let (a, b) = gradient_axis(300.0, 400.0, 90.0);
    assert!((a.x - 150.0).abs() < 1e-9 && (a.y - -50.0).abs() < 1e-9);
    assert!((b.y - 450.0).abs() < 1e-9);
}

#[test]
fn gradient_background_emits_linear_paint() {
    let mut p = painter();
    let params = ParamMap::from_value(&json!({ "backgroundType": "gradient" }));
    apply_background(&mut p, 200.0, 100.0, &params);
    let list = p.finish();
    let DrawCmd::Fill { paint, .. } = &list.cmds[0] else {
        panic!("expected fill");
    };
    let Paint::Linear { stops, .. } = paint else {
        panic!("expected linear gradient");
    };
    assert_eq!(stops[0].color, Rgba8::WHITE);
    assert_eq!(stops[1].color, Rgba8::opaque(0xf0, 0xf0, 0xf0));
}

#[test]
fn gradient_start_falls_back_to_the_background_color() {
    let stops_for = |params: serde_json::Value| {
        let mut p = painter();
        apply_background(&mut p, 200.0, 100.0, &ParamMap::from_value(&params));
        match p.finish().cmds.remove(0) {
            DrawCmd::Fill {
                paint: Paint::Linear { stops, .. },
                ..
            } => stops,
            other => panic!("expected a linear fill, got {other:?}"),
        }
    };
    let stops = stops_for(json!({ "backgroundType": "gradient", "backgroundColor": "#ff0000" }));
    assert_eq!(stops[0].color, Rgba8::opaque(0xff, 0, 0));

    let stops = stops_for(json!({
        "backgroundType": "gradient",
        "backgroundColor": "#ff0000",
        "backgroundGradientStart": "#00ff00"
    }));
    assert_eq!(stops[0].color, Rgba8::opaque(0, 0xff, 0));
}
