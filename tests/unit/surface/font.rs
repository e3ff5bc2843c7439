use super::*;

#[test]
fn measure_scales_with_size_and_length() {
    assert_eq!(measure("AB", 8.0), 12.0);
    assert_eq!(measure("AB", 16.0), 24.0);
    assert_eq!(measure("", 16.0), 0.0);
    assert_eq!(measure("A", -1.0), 0.0);
}

#[test]
fn lowercase_shares_uppercase_glyphs() {
    assert_eq!(glyph('a'), glyph('A'));
    assert_eq!(glyph('\u{2603}'), MISSING);
}

#[test]
fn text_path_sits_on_baseline() {
    use kurbo::Shape as _;
    let path = text_path("I", Point::new(10.0, 20.0), 8.0, TextAlign::Left);
    let bbox = path.bounding_box();
    assert_eq!(bbox.y1, 20.0);
    assert_eq!(bbox.y0, 13.0);
    assert_eq!(bbox.x0, 11.0);
    assert_eq!(bbox.x1, 14.0);
}

#[test]
fn alignment_shifts_left_edge() {
    use kurbo::Shape as _;
    let left = text_path("HI", Point::new(50.0, 50.0), 8.0, TextAlign::Left).bounding_box();
    let center = text_path("HI", Point::new(50.0, 50.0), 8.0, TextAlign::Center).bounding_box();
    let right = text_path("HI", Point::new(50.0, 50.0), 8.0, TextAlign::Right).bounding_box();
    assert_eq!(left.x0 - center.x0, 6.0);
    assert_eq!(left.x0 - right.x0, 12.0);
}

#[test]
fn spaces_draw_nothing() {
    assert!(text_path("   ", Point::ORIGIN, 8.0, TextAlign::Left).elements().is_empty());
}

#[test]
fn wrap_breaks_on_width() {
    let lines = wrap("ALPHA BETA GAMMA", 8.0, 60.0);
    assert_eq!(lines, vec!["ALPHA BETA", "GAMMA"]);
    assert!(wrap("", 8.0, 10.0).is_empty());
    assert_eq!(wrap("LONGWORDHERE", 8.0, 6.0), vec!["LONGWORDHERE"]);
}
