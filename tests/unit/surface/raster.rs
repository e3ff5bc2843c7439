use super::*;

use crate::surface::painter::Painter;

fn surface(w: u32, h: u32) -> RasterSurface {
    RasterSurface::new(Canvas {
        width: w,
        height: h,
    })
    .unwrap()
}

fn render(p: Painter) -> FrameRGBA {
    let list = p.finish();
    let mut s = surface(list.canvas.width, list.canvas.height);
    list.replay(&mut s).unwrap();
    s.into_frame()
}

#[test]
fn oversized_surface_is_rejected() {
    let err = RasterSurface::new(Canvas {
        width: 70_000,
        height: 4,
    })
    .err()
    .unwrap();
    assert!(err.to_string().contains("exceeds u16"));
}

#[test]
fn opaque_fill_covers_interior() {
    let mut p = Painter::new(Canvas {
        width: 16,
        height: 16,
    });
    p.set_fill_color(Rgba8::opaque(255, 0, 0));
    p.fill_rect(0.0, 0.0, 16.0, 16.0);
    let frame = render(p);
    assert_eq!(frame.pixel(8, 8), Some([255, 0, 0, 255]));
    assert_eq!(frame.pixel(16, 0), None);
}

#[test]
fn global_alpha_scales_coverage() {
    let mut p = Painter::new(Canvas {
        width: 8,
        height: 8,
    });
    p.set_global_alpha(0.5);
    p.set_fill_color(Rgba8::opaque(255, 0, 0));
    p.fill_rect(0.0, 0.0, 8.0, 8.0);
    let frame = render(p);
    assert_eq!(frame.pixel(4, 4), Some([128, 0, 0, 128]));
}

#[test]
fn fill_outside_canvas_is_skipped() {
    let mut p = Painter::new(Canvas {
        width: 8,
        height: 8,
    });
    p.fill_rect(100.0, 100.0, 5.0, 5.0);
    let frame = render(p);
    assert!(frame.data.iter().all(|b| *b == 0));
}

#[test]
fn clear_resets_pixels() {
    let mut p = Painter::new(Canvas {
        width: 8,
        height: 8,
    });
    p.set_fill_color(Rgba8::WHITE);
    p.fill_rect(0.0, 0.0, 8.0, 8.0);
    p.clear_rect(0.0, 0.0, 4.0, 8.0);
    let frame = render(p);
    assert_eq!(frame.pixel(1, 1), Some([0, 0, 0, 0]));
    assert_eq!(frame.pixel(6, 1), Some([255, 255, 255, 255]));
}

#[test]
fn stroke_paints_along_line() {
    let mut p = Painter::new(Canvas {
        width: 20,
        height: 20,
    });
    p.set_stroke_color(Rgba8::opaque(0, 0, 255));
    p.set_line_width(4.0);
    p.begin_path();
    p.move_to(0.0, 10.0);
    p.line_to(20.0, 10.0);
    p.stroke();
    let frame = render(p);
    assert_eq!(frame.pixel(10, 10), Some([0, 0, 255, 255]));
    assert_eq!(frame.pixel(10, 2), Some([0, 0, 0, 0]));
}

#[test]
fn text_leaves_ink() {
    let mut p = Painter::new(Canvas {
        width: 64,
        height: 24,
    });
    p.set_fill_color(Rgba8::BLACK);
    p.set_font_size(16.0);
    p.fill_text("HI", 2.0, 20.0);
    let frame = render(p);
    assert!(frame.data.chunks_exact(4).any(|px| px[3] > 0));
}

#[test]
fn straight_conversion_recovers_color() {
    let frame = FrameRGBA {
        width: 1,
        height: 1,
        data: vec![64, 0, 0, 128],
        premultiplied: true,
    };
    let straight = frame.to_straight();
    assert!(!straight.premultiplied);
    assert_eq!(straight.data, vec![128, 0, 0, 128]);
}

#[test]
fn png_bytes_have_signature() {
    let frame = surface(4, 4).into_frame();
    let png = frame.to_png().unwrap();
    assert_eq!(&png[..8], &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]);
}

#[test]
fn strokes_expanding_into_too_many_dashes_are_rejected() {
    let mut path = BezPath::new();
    path.move_to((0.0, 10.0));
    path.line_to((60.0, 10.0));
    let cmd = DrawCmd::Stroke {
        path,
        paint: Paint::solid(Rgba8::BLACK),
        alpha: 1.0,
        style: StrokeStyle {
            width: 1.0,
            dash: vec![1e-6, 1e-6],
            ..StrokeStyle::default()
        },
    };
    let err = surface(64, 20).execute(&cmd).unwrap_err();
    assert!(err.to_string().contains("dashes"));
}
