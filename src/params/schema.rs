use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::params::map::ParamMap;
use crate::style::color::parse_color;

pub const CATEGORY_BACKGROUND: &str = "Background";
pub const CATEGORY_FILL: &str = "Fill";
pub const CATEGORY_STROKE: &str = "Stroke";
pub const CATEGORY_WAVE: &str = "Wave";
pub const CATEGORY_CUSTOM: &str = "Custom";

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SelectOption {
    pub value: Value,
    #[serde(default)]
    pub label: String,
}

/// Control kind and its constraints.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ParamKind {
    Slider {
        min: f64,
        max: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        step: Option<f64>,
    },
    Number {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
    },
    Color,
    Select {
        options: Vec<SelectOption>,
    },
    Toggle,
    Text,
}

/// One declared parameter.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ParamSpec {
    #[serde(flatten)]
    pub kind: ParamKind,
    pub default: Value,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Visible only while every named parameter matches the value (or one of the list).
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub when: Map<String, Value>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub hidden: bool,
}

impl ParamSpec {
    fn with_kind(kind: ParamKind, default: Value, label: &str) -> Self {
        Self {
            kind,
            default,
            label: label.to_owned(),
            category: None,
            unit: None,
            description: None,
            when: Map::new(),
            hidden: false,
        }
    }

    pub fn slider(default: f64, min: f64, max: f64, step: f64, label: &str) -> Self {
        Self::with_kind(
            ParamKind::Slider {
                min,
                max,
                step: Some(step),
            },
            Value::from(default),
            label,
        )
    }

    pub fn color(default: &str, label: &str) -> Self {
        Self::with_kind(ParamKind::Color, Value::from(default), label)
    }

    pub fn select(default: &str, options: &[(&str, &str)], label: &str) -> Self {
        let options = options
            .iter()
            .map(|(value, label)| SelectOption {
                value: Value::from(*value),
                label: (*label).to_owned(),
            })
            .collect();
        Self::with_kind(ParamKind::Select { options }, Value::from(default), label)
    }

    pub fn toggle(default: bool, label: &str) -> Self {
        Self::with_kind(ParamKind::Toggle, Value::from(default), label)
    }

    pub fn text(default: &str, label: &str) -> Self {
        Self::with_kind(ParamKind::Text, Value::from(default), label)
    }

    pub fn in_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_owned());
        self
    }

    pub fn with_unit(mut self, unit: &str) -> Self {
        self.unit = Some(unit.to_owned());
        self
    }

    /// Show only while `param` equals one of `values`.
    pub fn when_in(mut self, param: &str, values: &[&str]) -> Self {
        let v = if values.len() == 1 {
            Value::from(values[0])
        } else {
            Value::Array(values.iter().map(|s| Value::from(*s)).collect())
        };
        self.when.insert(param.to_owned(), v);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn is_visible(&self, values: &ParamMap) -> bool {
        if self.hidden {
            return false;
        }
        self.when.iter().all(|(key, expected)| {
            let current = values.get(key).unwrap_or(&Value::Null);
            match expected {
                Value::Array(options) => options.contains(current),
                other => other == current,
            }
        })
    }

    /// Coerce `value` into this parameter's domain, or `None` when it cannot be.
    pub fn normalize_value(&self, value: &Value) -> Option<Value> {
        match &self.kind {
            ParamKind::Slider { min, max, .. } => {
                let v = as_number(value)?;
                let (lo, hi) = if min <= max { (*min, *max) } else { (*max, *min) };
                Some(Value::from(v.clamp(lo, hi)))
            }
            ParamKind::Number { min, max } => {
                let mut v = as_number(value)?;
                if let Some(lo) = min {
                    v = v.max(*lo);
                }
                if let Some(hi) = max {
                    v = v.min(*hi);
                }
                Some(Value::from(v))
            }
            ParamKind::Color => match value {
                Value::String(s) if parse_color(s).is_some() => Some(value.clone()),
                _ => None,
            },
            ParamKind::Select { options } => options
                .iter()
                .any(|o| &o.value == value)
                .then(|| value.clone()),
            ParamKind::Toggle => match value {
                Value::Bool(_) => Some(value.clone()),
                Value::Number(n) => n.as_f64().map(|v| Value::Bool(v != 0.0)),
                Value::String(s) => match s.as_str() {
                    "true" => Some(Value::Bool(true)),
                    "false" => Some(Value::Bool(false)),
                    _ => None,
                },
                _ => None,
            },
            ParamKind::Text => match value {
                Value::String(_) => Some(value.clone()),
                Value::Number(n) => Some(Value::String(n.to_string())),
                _ => None,
            },
        }
    }
}

fn as_number(value: &Value) -> Option<f64> {
    let v = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    v.is_finite().then_some(v)
}

/// Named parameter declarations of a template, in declaration order.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(
    from = "BTreeMap<String, ParamSpec>",
    into = "BTreeMap<String, ParamSpec>"
)]
pub struct ParamSchema {
    entries: Vec<(String, ParamSpec)>,
}

impl ParamSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, name: &str, spec: ParamSpec) -> Self {
        self.insert(name, spec);
        self
    }

    /// Add or replace `name`; a replacement keeps the original position.
    pub fn insert(&mut self, name: &str, spec: ParamSpec) {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = spec,
            None => self.entries.push((name.to_owned(), spec)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ParamSpec> {
        self.entries
            .iter()
            .find_map(|(n, s)| (n == name).then_some(s))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamSpec)> + '_ {
        self.entries.iter().map(|(n, s)| (n.as_str(), s))
    }

    /// Append the universal style parameters this schema does not already declare.
    pub fn with_universal(mut self) -> Self {
        for (name, spec) in universal_parameters().entries {
            if !self.contains(&name) {
                self.entries.push((name, spec));
            }
        }
        self
    }

    pub fn defaults(&self) -> ParamMap {
        self.entries
            .iter()
            .map(|(n, s)| (n.clone(), s.default.clone()))
            .collect()
    }

    /// Defaults overlaid with the declared keys of `values`, each coerced into its domain.
    ///
    /// Undeclared keys are dropped; values that cannot be coerced keep the default.
    pub fn normalize(&self, values: &ParamMap) -> ParamMap {
        self.entries
            .iter()
            .map(|(name, spec)| {
                let v = values
                    .get(name)
                    .and_then(|v| spec.normalize_value(v))
                    .unwrap_or_else(|| spec.default.clone());
                (name.clone(), v)
            })
            .collect()
    }

    /// `values` with every declared key normalized; undeclared keys pass through.
    pub fn resolve(&self, values: &ParamMap) -> ParamMap {
        let mut out = values.clone();
        out.merge(&self.normalize(values));
        out
    }

    /// Names of the parameters visible for `values`.
    pub fn visible(&self, values: &ParamMap) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, s)| s.is_visible(values))
            .map(|(n, _)| n.as_str())
            .collect()
    }
}

impl From<BTreeMap<String, ParamSpec>> for ParamSchema {
    fn from(map: BTreeMap<String, ParamSpec>) -> Self {
        Self {
            entries: map.into_iter().collect(),
        }
    }
}

impl From<ParamSchema> for BTreeMap<String, ParamSpec> {
    fn from(schema: ParamSchema) -> Self {
        schema.entries.into_iter().collect()
    }
}

/// Background, fill and stroke controls shared by every template.
pub fn universal_parameters() -> ParamSchema {
    const PAINTED_BG: &[&str] = &["solid", "gradient"];
    const PAINTED_FILL: &[&str] = &["solid", "gradient"];
    const STROKED: &[&str] = &["solid", "dashed", "dotted"];
    const DASHED: &[&str] = &["dashed", "dotted"];

    ParamSchema::new()
        .with(
            "backgroundType",
            ParamSpec::select(
                "transparent",
                &[
                    ("transparent", "Transparent"),
                    ("solid", "Solid Color"),
                    ("gradient", "Gradient"),
                ],
                "Background Type",
            )
            .in_category(CATEGORY_BACKGROUND),
        )
        .with(
            "backgroundColor",
            ParamSpec::color("#ffffff", "Background Color")
                .in_category(CATEGORY_BACKGROUND)
                .when_in("backgroundType", PAINTED_BG),
        )
        .with(
            "backgroundOpacity",
            ParamSpec::slider(1.0, 0.0, 1.0, 0.05, "Background Opacity")
                .in_category(CATEGORY_BACKGROUND)
                .when_in("backgroundType", PAINTED_BG),
        )
        .with(
            "backgroundGradientStart",
            ParamSpec::color("#ffffff", "Gradient Start")
                .in_category(CATEGORY_BACKGROUND)
                .when_in("backgroundType", &["gradient"]),
        )
        .with(
            "backgroundGradientEnd",
            ParamSpec::color("#f0f0f0", "Gradient End")
                .in_category(CATEGORY_BACKGROUND)
                .when_in("backgroundType", &["gradient"]),
        )
        .with(
            "backgroundGradientDirection",
            ParamSpec::slider(0.0, 0.0, 360.0, 15.0, "Gradient Direction")
                .in_category(CATEGORY_BACKGROUND)
                .with_unit("°")
                .when_in("backgroundType", &["gradient"]),
        )
        .with(
            "fillType",
            ParamSpec::select(
                "solid",
                &[
                    ("none", "None"),
                    ("solid", "Solid Color"),
                    ("gradient", "Gradient"),
                ],
                "Fill Type",
            )
            .in_category(CATEGORY_FILL),
        )
        .with(
            "fillColor",
            ParamSpec::color("#3b82f6", "Fill Color")
                .in_category(CATEGORY_FILL)
                .when_in("fillType", PAINTED_FILL),
        )
        .with(
            "fillOpacity",
            ParamSpec::slider(1.0, 0.0, 1.0, 0.05, "Fill Opacity")
                .in_category(CATEGORY_FILL)
                .when_in("fillType", PAINTED_FILL),
        )
        .with(
            "fillGradientStart",
            ParamSpec::color("#3b82f6", "Fill Gradient Start")
                .in_category(CATEGORY_FILL)
                .when_in("fillType", &["gradient"]),
        )
        .with(
            "fillGradientEnd",
            ParamSpec::color("#1e40af", "Fill Gradient End")
                .in_category(CATEGORY_FILL)
                .when_in("fillType", &["gradient"]),
        )
        .with(
            "fillGradientDirection",
            ParamSpec::slider(0.0, 0.0, 360.0, 15.0, "Fill Gradient Direction")
                .in_category(CATEGORY_FILL)
                .with_unit("°")
                .when_in("fillType", &["gradient"]),
        )
        .with(
            "strokeType",
            ParamSpec::select(
                "none",
                &[
                    ("none", "None"),
                    ("solid", "Solid"),
                    ("dashed", "Dashed"),
                    ("dotted", "Dotted"),
                ],
                "Stroke Type",
            )
            .in_category(CATEGORY_STROKE),
        )
        .with(
            "strokeColor",
            ParamSpec::color("#1e40af", "Stroke Color")
                .in_category(CATEGORY_STROKE)
                .when_in("strokeType", STROKED),
        )
        .with(
            "strokeWidth",
            ParamSpec::slider(2.0, 0.0, 20.0, 0.5, "Stroke Width")
                .in_category(CATEGORY_STROKE)
                .with_unit("px")
                .when_in("strokeType", STROKED),
        )
        .with(
            "strokeOpacity",
            ParamSpec::slider(1.0, 0.0, 1.0, 0.05, "Stroke Opacity")
                .in_category(CATEGORY_STROKE)
                .when_in("strokeType", STROKED),
        )
        .with(
            "strokeDashSize",
            ParamSpec::slider(5.0, 1.0, 20.0, 1.0, "Dash Size")
                .in_category(CATEGORY_STROKE)
                .with_unit("px")
                .when_in("strokeType", DASHED),
        )
        .with(
            "strokeGapSize",
            ParamSpec::slider(5.0, 1.0, 20.0, 1.0, "Gap Size")
                .in_category(CATEGORY_STROKE)
                .with_unit("px")
                .when_in("strokeType", DASHED),
        )
}

/// Wave-generator controls for templates that draw from generated layers.
pub fn wave_parameters() -> ParamSchema {
    ParamSchema::new()
        .with(
            "amplitude",
            ParamSpec::slider(50.0, 1.0, 200.0, 1.0, "Amplitude").in_category(CATEGORY_WAVE),
        )
        .with(
            "frequency",
            ParamSpec::slider(3.0, 0.1, 20.0, 0.1, "Frequency").in_category(CATEGORY_WAVE),
        )
        .with(
            "phase",
            ParamSpec::slider(0.0, 0.0, std::f64::consts::TAU, 0.1, "Phase")
                .in_category(CATEGORY_WAVE),
        )
        .with(
            "complexity",
            ParamSpec::slider(0.3, 0.0, 1.0, 0.05, "Complexity").in_category(CATEGORY_WAVE),
        )
        .with(
            "chaos",
            ParamSpec::slider(0.1, 0.0, 1.0, 0.05, "Chaos").in_category(CATEGORY_WAVE),
        )
        .with(
            "damping",
            ParamSpec::slider(0.9, 0.05, 1.0, 0.05, "Damping").in_category(CATEGORY_WAVE),
        )
        .with(
            "layers",
            ParamSpec::slider(2.0, 1.0, 8.0, 1.0, "Layers").in_category(CATEGORY_WAVE),
        )
}

#[cfg(test)]
#[path = "../../tests/unit/params/schema.rs"]
mod tests;
