use crate::foundation::core::Rgba8;

/// Hue in degrees `[0, 360)`, saturation and lightness in percent `[0, 100]`.
///
/// Components are kept unrounded so hex -> HSL -> hex is exact.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Hsl {
    pub h: f64,
    pub s: f64,
    pub l: f64,
}

/// Parse a CSS-style color.
///
/// Accepts `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb()`, `rgba()`, `hsl()`, `hsla()` and the
/// keywords `transparent`, `black` and `white`.
pub fn parse_color(s: &str) -> Option<Rgba8> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex);
    }
    let lower = s.to_ascii_lowercase();
    match lower.as_str() {
        "transparent" => return Some(Rgba8::TRANSPARENT),
        "black" => return Some(Rgba8::BLACK),
        "white" => return Some(Rgba8::WHITE),
        _ => {}
    }
    let (name, args) = lower.split_once('(')?;
    let args = args.strip_suffix(')')?;
    let parts: Vec<&str> = args
        .split(|c| c == ',' || c == '/')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    match (name.trim(), parts.len()) {
        ("rgb" | "rgba", 3 | 4) => {
            let ch = |p: &str| -> Option<u8> {
                let v = match p.strip_suffix('%') {
                    Some(pct) => pct.parse::<f64>().ok()? * 2.55,
                    None => p.parse::<f64>().ok()?,
                };
                v.is_finite().then(|| v.round().clamp(0.0, 255.0) as u8)
            };
            let a = parts.get(3).map_or(Some(255), |p| parse_alpha(p))?;
            Some(Rgba8::new(ch(parts[0])?, ch(parts[1])?, ch(parts[2])?, a))
        }
        ("hsl" | "hsla", 3 | 4) => {
            let h = parts[0].trim_end_matches("deg").parse::<f64>().ok()?;
            let s = parts[1].trim_end_matches('%').parse::<f64>().ok()?;
            let l = parts[2].trim_end_matches('%').parse::<f64>().ok()?;
            if ![h, s, l].iter().all(|v| v.is_finite()) {
                return None;
            }
            let a = parts.get(3).map_or(Some(255), |p| parse_alpha(p))?;
            let c = hsl_to_rgb(Hsl { h, s, l });
            Some(Rgba8 { a, ..c })
        }
        _ => None,
    }
}

fn parse_alpha(p: &str) -> Option<u8> {
    let v = match p.strip_suffix('%') {
        Some(pct) => pct.parse::<f64>().ok()? / 100.0,
        None => p.parse::<f64>().ok()?,
    };
    v.is_finite()
        .then(|| (v.clamp(0.0, 1.0) * 255.0).round() as u8)
}

fn parse_hex(hex: &str) -> Option<Rgba8> {
    if !hex.is_ascii() {
        return None;
    }
    let byte = |pair: &str| u8::from_str_radix(pair, 16).ok();
    let nibble = |c: &str| byte(c).map(|v| v * 17);
    match hex.len() {
        3 => Some(Rgba8::opaque(
            nibble(&hex[0..1])?,
            nibble(&hex[1..2])?,
            nibble(&hex[2..3])?,
        )),
        6 => Some(Rgba8::opaque(
            byte(&hex[0..2])?,
            byte(&hex[2..4])?,
            byte(&hex[4..6])?,
        )),
        8 => Some(Rgba8::new(
            byte(&hex[0..2])?,
            byte(&hex[2..4])?,
            byte(&hex[4..6])?,
            byte(&hex[6..8])?,
        )),
        _ => None,
    }
}

pub fn rgb_to_hsl(c: Rgba8) -> Hsl {
    let r = f64::from(c.r) / 255.0;
    let g = f64::from(c.g) / 255.0;
    let b = f64::from(c.b) / 255.0;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;
    if max == min {
        return Hsl {
            h: 0.0,
            s: 0.0,
            l: l * 100.0,
        };
    }
    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };
    let sector = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };
    let h = sector / 6.0;
    Hsl {
        h: h * 360.0,
        s: s * 100.0,
        l: l * 100.0,
    }
}

/// Opaque color for `hsl`; hue wraps, saturation and lightness clamp.
pub fn hsl_to_rgb(hsl: Hsl) -> Rgba8 {
    let h = hsl.h.rem_euclid(360.0) / 360.0;
    let s = (hsl.s / 100.0).clamp(0.0, 1.0);
    let l = (hsl.l / 100.0).clamp(0.0, 1.0);

    fn hue_to_rgb(p: f64, q: f64, mut t: f64) -> f64 {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        if t < 1.0 / 6.0 {
            return p + (q - p) * 6.0 * t;
        }
        if t < 1.0 / 2.0 {
            return q;
        }
        if t < 2.0 / 3.0 {
            return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
        }
        p
    }

    let (r, g, b) = if s == 0.0 {
        (l, l, l)
    } else {
        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        (
            hue_to_rgb(p, q, h + 1.0 / 3.0),
            hue_to_rgb(p, q, h),
            hue_to_rgb(p, q, h - 1.0 / 3.0),
        )
    };
    let to_u8 = |x: f64| (x * 255.0).round().clamp(0.0, 255.0) as u8;
    Rgba8::opaque(to_u8(r), to_u8(g), to_u8(b))
}

/// `None` for strings that are not hex colors.
pub fn hex_to_hsl(hex: &str) -> Option<Hsl> {
    let hex = hex.trim();
    parse_hex(hex.strip_prefix('#').unwrap_or(hex)).map(rgb_to_hsl)
}

pub fn hsl_to_hex(h: f64, s: f64, l: f64) -> String {
    hsl_to_rgb(Hsl { h, s, l }).to_hex()
}

/// Channel-wise blend, `t` clamped to `[0, 1]`.
pub fn interpolate_color(a: Rgba8, b: Rgba8, t: f64) -> Rgba8 {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    crate::surface::cmd::mix(a, b, t)
}

/// Shift lightness by `amount` (a fraction, so `0.1` is ten points).
pub fn adjust_brightness(c: Rgba8, amount: f64) -> Rgba8 {
    let mut hsl = rgb_to_hsl(c);
    hsl.l = (hsl.l + amount * 100.0).clamp(0.0, 100.0);
    Rgba8 {
        a: c.a,
        ..hsl_to_rgb(hsl)
    }
}

pub fn adjust_saturation(c: Rgba8, amount: f64) -> Rgba8 {
    let mut hsl = rgb_to_hsl(c);
    hsl.s = (hsl.s + amount * 100.0).clamp(0.0, 100.0);
    Rgba8 {
        a: c.a,
        ..hsl_to_rgb(hsl)
    }
}

pub fn rotate_hue(c: Rgba8, degrees: f64) -> Rgba8 {
    let mut hsl = rgb_to_hsl(c);
    hsl.h = (hsl.h + degrees).rem_euclid(360.0);
    Rgba8 {
        a: c.a,
        ..hsl_to_rgb(hsl)
    }
}

/// Rainbow color for `t` in `[0, 1]` at 70% saturation, 50% lightness.
pub fn spectrum(t: f64) -> Rgba8 {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    hsl_to_rgb(Hsl {
        h: t * 360.0,
        s: 70.0,
        l: 50.0,
    })
}

/// Replace the alpha channel with `alpha` in `[0, 1]`.
pub fn with_alpha(c: Rgba8, alpha: f64) -> Rgba8 {
    Rgba8 {
        a: 255,
        ..c
    }
    .scale_alpha(alpha)
}

/// Move each channel toward white by `factor` in `[0, 1]`.
pub fn lighten_toward_white(c: Rgba8, factor: f64) -> Rgba8 {
    let f = if factor.is_finite() {
        factor.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let ch = |v: u8| (f64::from(v) + (255.0 - f64::from(v)) * f).round().min(255.0) as u8;
    Rgba8::new(ch(c.r), ch(c.g), ch(c.b), c.a)
}

/// Scale each channel by `factor`, flooring like integer pixel math.
pub fn scale_brightness(c: Rgba8, factor: f64) -> Rgba8 {
    let f = if factor.is_finite() { factor.max(0.0) } else { 1.0 };
    let ch = |v: u8| (f64::from(v) * f).floor().min(255.0) as u8;
    Rgba8::new(ch(c.r), ch(c.g), ch(c.b), c.a)
}

/// Perceived brightness in `[0, 1]`.
pub fn luma(c: Rgba8) -> f64 {
    (0.299 * f64::from(c.r) + 0.587 * f64::from(c.g) + 0.114 * f64::from(c.b)) / 255.0
}

#[cfg(test)]
#[path = "../../tests/unit/style/color.rs"]
mod tests;
