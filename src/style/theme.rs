use crate::foundation::core::Rgba8;
use crate::params::map::ParamMap;
use crate::style::color::{luma, parse_color, scale_brightness};

/// A named palette that overrides the universal color parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColorTheme {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub primary: &'static str,
    pub secondary: &'static str,
    pub background: &'static str,
    pub accent: Option<&'static str>,
}

const fn theme(
    id: &'static str,
    name: &'static str,
    description: &'static str,
    [primary, secondary, background, accent]: [&'static str; 4],
) -> ColorTheme {
    ColorTheme {
        id,
        name,
        description,
        primary,
        secondary,
        background,
        accent: Some(accent),
    }
}

static THEMES: [ColorTheme; 10] = [
    theme(
        "ocean-depth",
        "Ocean Depth",
        "Deep blues and teals",
        ["#0369a1", "#0e7490", "#f0f9ff", "#06b6d4"],
    ),
    theme(
        "midnight-electric",
        "Midnight Electric",
        "Dark mode with electric accents",
        ["#8b5cf6", "#ec4899", "#0f0f23", "#06b6d4"],
    ),
    theme(
        "sunset-warmth",
        "Sunset Warmth",
        "Warm oranges and reds",
        ["#ea580c", "#dc2626", "#fff7ed", "#f59e0b"],
    ),
    theme(
        "forest-fresh",
        "Forest Fresh",
        "Natural greens",
        ["#16a34a", "#15803d", "#f0fdf4", "#22c55e"],
    ),
    theme(
        "noir-elegance",
        "Noir Elegance",
        "Black and white with gold accents",
        ["#000000", "#404040", "#ffffff", "#d4af37"],
    ),
    theme(
        "rose-garden",
        "Rose Garden",
        "Soft pinks and purples",
        ["#ec4899", "#db2777", "#fdf2f8", "#f9a8d4"],
    ),
    theme(
        "cyber-neon",
        "Cyber Neon",
        "Bright neons on dark",
        ["#00ff88", "#ff0080", "#000000", "#00ddff"],
    ),
    theme(
        "earth-craft",
        "Earth & Craft",
        "Browns and warm neutrals",
        ["#92400e", "#78350f", "#fef3c7", "#d97706"],
    ),
    theme(
        "aurora-dream",
        "Aurora Dream",
        "Gradient-friendly purples and blues",
        ["#7c3aed", "#2563eb", "#faf5ff", "#a78bfa"],
    ),
    theme(
        "monochrome-pro",
        "Monochrome Pro",
        "Professional grayscale",
        ["#374151", "#111827", "#f9fafb", "#6b7280"],
    ),
];

pub fn themes() -> &'static [ColorTheme] {
    &THEMES
}

pub fn find_theme(id: &str) -> Option<&'static ColorTheme> {
    THEMES.iter().find(|t| t.id == id)
}

/// Overwrite the color parameters of `params` from `theme`. Other keys are untouched.
pub fn apply_theme(params: &mut ParamMap, theme: &ColorTheme) {
    let background = parse_color(theme.background).unwrap_or(Rgba8::WHITE);
    let text = if luma(background) > 0.5 {
        "#000000"
    } else {
        "#ffffff"
    };
    params.insert("fillColor", theme.primary);
    params.insert("strokeColor", theme.secondary);
    params.insert("backgroundColor", theme.background);
    params.insert("textColor", text);

    if let Some(accent) = theme.accent {
        params.insert("fillGradientStart", theme.primary);
        params.insert("fillGradientEnd", accent);
        params.insert("strokeGradientStart", theme.secondary);
        params.insert("strokeGradientEnd", accent);
        params.insert("backgroundGradientStart", theme.background);
        params.insert(
            "backgroundGradientEnd",
            scale_brightness(background, 0.9).to_hex(),
        );
    }
}

#[cfg(test)]
#[path = "../../tests/unit/style/theme.rs"]
mod tests;
