use super::*;

#[test]
fn empty_input_is_all_zero() {
    assert_eq!(bounds_from_points(std::iter::empty()), Bounds::default());
    let only_nan = bounds_from_points([Point::new(f64::NAN, 1.0)]);
    assert_eq!(only_nan, Bounds::default());
}

#[test]
fn extent_and_center() {
    let b = bounds_from_points([
        Point::new(10.0, 5.0),
        Point::new(-2.0, 9.0),
        Point::new(4.0, -1.0),
    ]);
    assert_eq!((b.min_x, b.max_x, b.min_y, b.max_y), (-2.0, 10.0, -1.0, 9.0));
    assert_eq!((b.width, b.height), (12.0, 10.0));
    assert_eq!((b.center_x, b.center_y), (4.0, 4.0));
}

#[test]
fn wave_points_use_xy() {
    let pts = [
        WavePoint {
            x: 0.0,
            y: 3.0,
            intensity: 0.0,
            phase: 0.0,
        },
        WavePoint {
            x: 6.0,
            y: 1.0,
            intensity: 0.0,
            phase: 0.0,
        },
    ];
    let b = bounds_from_wave(&pts);
    assert_eq!(b.to_rect(), kurbo::Rect::new(0.0, 1.0, 6.0, 3.0));
}
