use super::*;
use serde_json::json;

#[test]
fn theme_ids_are_unique() {
    let mut ids: Vec<&str> = themes().iter().map(|t| t.id).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), themes().len());
}

#[test]
fn every_theme_color_parses() {
    for t in themes() {
        for c in [t.primary, t.secondary, t.background] {
            assert!(parse_color(c).is_some(), "{} {c}", t.id);
        }
    }
}

#[test]
fn apply_overrides_only_colors() {
    let mut params = ParamMap::from_value(&json!({ "amplitude": 40, "fillColor": "#000000" }));
    let theme = find_theme("ocean-depth").unwrap();
    apply_theme(&mut params, theme);
    assert_eq!(params.text("fillColor", ""), "#0369a1");
    assert_eq!(params.text("strokeColor", ""), "#0e7490");
    assert_eq!(params.text("backgroundColor", ""), "#f0f9ff");
    assert_eq!(params.text("textColor", ""), "#000000");
    assert_eq!(params.text("fillGradientEnd", ""), "#06b6d4");
    assert_eq!(params.text("backgroundGradientEnd", ""), "#d8e0e5");
    assert_eq!(params.number("amplitude", 0.0), 40.0);
}

#[test]
fn dark_background_gets_white_text() {
    let mut params = ParamMap::new();
    apply_theme(&mut params, find_theme("midnight-electric").unwrap());
    assert_eq!(params.text("textColor", ""), "#ffffff");
    assert!(find_theme("does-not-exist").is_none());
}
