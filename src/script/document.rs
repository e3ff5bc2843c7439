use serde_json::Value;

use crate::foundation::error::BrandwaveResult;
use crate::params::schema::ParamSchema;
use crate::surface::cmd::TextAlign;
use crate::template::contract::TemplateMeta;

/// A numeric or boolean operand: a literal or an expression source.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum Operand {
    Number(f64),
    Bool(bool),
    Expr(String),
}

impl Operand {
    pub fn expr(src: &str) -> Self {
        Self::Expr(src.to_owned())
    }
}

impl From<f64> for Operand {
    fn from(v: f64) -> Self {
        Self::Number(v)
    }
}

impl From<&str> for Operand {
    fn from(src: &str) -> Self {
        Self::expr(src)
    }
}

fn zero() -> Operand {
    Operand::Number(0.0)
}

fn full_turn() -> Operand {
    Operand::expr("tau")
}

/// Color operand of `fill_color` / `stroke_color`.
///
/// `color` and `mix` are color literals (`#rrggbb`, `rgb(..)`, `hsl(..)`, ...) or names of
/// color parameters.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ColorArgs {
    pub color: String,
    /// Second color blended in by `t`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<Operand>,
    /// Hue rotation in degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hue: Option<Operand>,
    /// Multiplies the color's own alpha.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha: Option<Operand>,
}

impl ColorArgs {
    pub fn new(color: &str) -> Self {
        Self {
            color: color.to_owned(),
            mix: None,
            t: None,
            hue: None,
            alpha: None,
        }
    }
}

/// One drawing instruction. Instructions run in order against the template's painter.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Instr {
    /// Paint the background from the universal `background*` parameters.
    Background,
    /// Install the universal fill; later `fill`s are skipped when the fill type is `none`.
    UseFill,
    /// Install the universal stroke; later `stroke`s are skipped when the stroke type is `none`.
    UseStroke,
    FillColor(ColorArgs),
    StrokeColor(ColorArgs),
    LineWidth {
        width: Operand,
    },
    Alpha {
        value: Operand,
    },
    Save,
    Restore,
    Translate {
        x: Operand,
        y: Operand,
    },
    Rotate {
        angle: Operand,
    },
    Scale {
        x: Operand,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        y: Option<Operand>,
    },
    BeginPath,
    MoveTo {
        x: Operand,
        y: Operand,
    },
    LineTo {
        x: Operand,
        y: Operand,
    },
    Arc {
        x: Operand,
        y: Operand,
        r: Operand,
        #[serde(default = "zero")]
        start: Operand,
        #[serde(default = "full_turn")]
        end: Operand,
        #[serde(default)]
        ccw: bool,
    },
    Rect {
        x: Operand,
        y: Operand,
        w: Operand,
        h: Operand,
    },
    RoundedRect {
        x: Operand,
        y: Operand,
        w: Operand,
        h: Operand,
        r: Operand,
    },
    Polygon {
        x: Operand,
        y: Operand,
        r: Operand,
        sides: Operand,
        #[serde(default = "zero")]
        rotation: Operand,
    },
    ClosePath,
    Fill,
    Stroke,
    /// Draw `text` with the fill paint; `{name}` is replaced by the parameter's value.
    Text {
        text: String,
        x: Operand,
        y: Operand,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        size: Option<Operand>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        align: Option<TextAlign>,
    },
    /// Append a generated layer to the current path.
    WavePath {
        #[serde(default = "zero")]
        layer: Operand,
        /// Samples; defaults to one per 4 pixels of width.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        resolution: Option<Operand>,
        /// Trace the wave-within-a-wave detail instead of the plain layer.
        #[serde(default)]
        nested: bool,
    },
    /// Run `body` once per generated point, with `point_x`, `point_y`, `point_intensity`,
    /// `point_phase` and `point_index` bound.
    EachPoint {
        #[serde(default = "zero")]
        layer: Operand,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        resolution: Option<Operand>,
        body: Vec<Instr>,
    },
    Set {
        name: String,
        value: Operand,
    },
    Repeat {
        count: Operand,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        var: Option<String>,
        body: Vec<Instr>,
    },
    If {
        cond: Operand,
        then: Vec<Instr>,
        #[serde(default, rename = "else", skip_serializing_if = "Vec::is_empty")]
        otherwise: Vec<Instr>,
    },
    /// Run `body` while `param` equals `is` (or one of `is` when it is a list).
    When {
        param: String,
        is: Value,
        body: Vec<Instr>,
    },
}

/// Source form of a dynamic template.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemplateDocument {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Opt in to a wave generator built from the request.
    #[serde(default)]
    pub generator: bool,
    #[serde(default)]
    pub parameters: ParamSchema,
    pub draw: Vec<Instr>,
}

impl TemplateDocument {
    pub fn from_json(text: &str) -> BrandwaveResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json_pretty(&self) -> BrandwaveResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn meta(&self) -> TemplateMeta {
        TemplateMeta {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/script/document.rs"]
mod tests;
