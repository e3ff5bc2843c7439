use super::*;
use proptest::prelude::*;

#[test]
fn parses_supported_forms() {
    assert_eq!(parse_color("#f00"), Some(Rgba8::opaque(255, 0, 0)));
    assert_eq!(parse_color("#3B82F6"), Some(Rgba8::opaque(0x3b, 0x82, 0xf6)));
    assert_eq!(parse_color("#0000ff80"), Some(Rgba8::new(0, 0, 255, 128)));
    assert_eq!(parse_color("rgb(10, 20, 30)"), Some(Rgba8::opaque(10, 20, 30)));
    assert_eq!(
        parse_color("rgba(10, 20, 30, 0.5)"),
        Some(Rgba8::new(10, 20, 30, 128))
    );
    assert_eq!(parse_color("hsl(0, 100%, 50%)"), Some(Rgba8::opaque(255, 0, 0)));
    assert_eq!(parse_color("transparent"), Some(Rgba8::TRANSPARENT));
}

#[test]
fn rejects_malformed_colors() {
    for bad in ["", "#12", "#gggggg", "rgb(1,2)", "blue-ish", "#ffé"] {
        assert_eq!(parse_color(bad), None, "{bad}");
    }
}

#[test]
fn hsl_of_primaries() {
    let red = hex_to_hsl("#ff0000").unwrap();
    assert_eq!((red.h, red.s, red.l), (0.0, 100.0, 50.0));
    let blue = hex_to_hsl("0000ff").unwrap();
    assert_eq!(blue.h, 240.0);
    let grey = hex_to_hsl("#808080").unwrap();
    assert_eq!(grey.s, 0.0);
    assert_eq!(hsl_to_hex(120.0, 100.0, 50.0), "#00ff00");
}

#[test]
fn spectrum_endpoints_share_hue() {
    assert_eq!(spectrum(0.0), spectrum(1.0));
    assert_eq!(spectrum(-3.0), spectrum(0.0));
}

#[test]
fn brightness_and_hue_adjustments() {
    assert_eq!(adjust_brightness(Rgba8::opaque(255, 0, 0), 0.5), Rgba8::WHITE);
    assert_eq!(adjust_brightness(Rgba8::opaque(255, 0, 0), -1.0), Rgba8::BLACK);
    assert_eq!(rotate_hue(Rgba8::opaque(255, 0, 0), 120.0), Rgba8::opaque(0, 255, 0));
    assert_eq!(rotate_hue(Rgba8::opaque(255, 0, 0), -240.0), Rgba8::opaque(0, 255, 0));
    let grey = adjust_saturation(Rgba8::opaque(255, 0, 0), -1.0);
    assert_eq!(grey.r, grey.g);
}

#[test]
fn lighten_and_alpha_helpers() {
    assert_eq!(lighten_toward_white(Rgba8::BLACK, 0.5), Rgba8::opaque(128, 128, 128));
    assert_eq!(with_alpha(Rgba8::new(1, 2, 3, 10), 0.5).a, 128);
    assert_eq!(scale_brightness(Rgba8::opaque(0xf0, 0xf9, 0xff), 0.9), Rgba8::opaque(216, 224, 229));
    assert!(luma(Rgba8::WHITE) > 0.5);
    assert!(luma(Rgba8::opaque(0x0f, 0x0f, 0x23)) < 0.5);
}

#[test]
fn interpolate_clamps_t() {
    let a = Rgba8::BLACK;
    let b = Rgba8::WHITE;
    assert_eq!(interpolate_color(a, b, 2.0), b);
    assert_eq!(interpolate_color(a, b, 0.5), Rgba8::opaque(128, 128, 128));
}

proptest! {
    #[test]
    fn hex_hsl_round_trip_within_one(r in any::<u8>(), g in any::<u8>(), b in any::<u8>()) {
        let c = Rgba8::opaque(r, g, b);
        let hsl = hex_to_hsl(&c.to_hex()).unwrap();
        let back = parse_color(&hsl_to_hex(hsl.h, hsl.s, hsl.l)).unwrap();
        prop_assert!((i16::from(back.r) - i16::from(r)).abs() <= 1);
        prop_assert!((i16::from(back.g) - i16::from(g)).abs() <= 1);
        prop_assert!((i16::from(back.b) - i16::from(b)).abs() <= 1);
    }
}
