use serde_json::{Map, Value};

use crate::foundation::core::Rgba8;
use crate::style::color::parse_color;

/// Nested groups folded into the flat parameter map, in merge order.
pub const PARAMETER_GROUPS: [&str; 5] = ["core", "style", "custom", "content", "customParameters"];

/// Flat `name -> value` parameter mapping handed to templates.
///
/// Getters never fail: absent or mistyped values yield the caller's default.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ParamMap(Map<String, Value>);

impl ParamMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from any JSON value, flattening parameter groups. Non-objects give an empty map.
    pub fn from_value(value: &Value) -> Self {
        flatten_parameters(value)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.0.remove(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> + '_ {
        self.0.iter()
    }

    /// Overlay `other` onto `self`; keys in `other` win.
    pub fn merge(&mut self, other: &ParamMap) {
        for (k, v) in &other.0 {
            self.0.insert(k.clone(), v.clone());
        }
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }

    /// Finite number, or a string that parses as one.
    pub fn number_opt(&self, name: &str) -> Option<f64> {
        let v = match self.0.get(name)? {
            Value::Number(n) => n.as_f64()?,
            Value::String(s) => s.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        v.is_finite().then_some(v)
    }

    pub fn number(&self, name: &str, default: f64) -> f64 {
        self.number_opt(name).unwrap_or(default)
    }

    /// Like [`number`](Self::number), but zero also falls back to `default`.
    pub fn nonzero(&self, name: &str, default: f64) -> f64 {
        match self.number_opt(name) {
            Some(v) if v != 0.0 => v,
            _ => default,
        }
    }

    /// Number truncated toward zero.
    pub fn integer(&self, name: &str, default: i64) -> i64 {
        self.number_opt(name).map_or(default, |v| v.trunc() as i64)
    }

    pub fn text_opt(&self, name: &str) -> Option<String> {
        match self.0.get(name)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn text(&self, name: &str, default: &str) -> String {
        self.text_opt(name).unwrap_or_else(|| default.to_owned())
    }

    /// Parsed color; empty or unparsable strings give `default`.
    pub fn color(&self, name: &str, default: Rgba8) -> Rgba8 {
        match self.0.get(name) {
            Some(Value::String(s)) => parse_color(s).unwrap_or(default),
            _ => default,
        }
    }

    pub fn flag(&self, name: &str, default: bool) -> bool {
        match self.0.get(name) {
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_f64().map_or(default, |v| v != 0.0),
            Some(Value::String(s)) => match s.trim() {
                "true" | "1" | "yes" | "on" => true,
                "false" | "0" | "no" | "off" => false,
                _ => default,
            },
            _ => default,
        }
    }
}

impl FromIterator<(String, Value)> for ParamMap {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<Map<String, Value>> for ParamMap {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Merge the nested parameter groups of `value` into one flat map.
///
/// Group keys are applied in [`PARAMETER_GROUPS`] order; keys at the root always win over
/// keys from a group. The group objects themselves are not kept.
pub fn flatten_parameters(value: &Value) -> ParamMap {
    let Value::Object(root) = value else {
        return ParamMap::new();
    };
    let mut out = Map::new();
    for group in PARAMETER_GROUPS {
        if let Some(Value::Object(g)) = root.get(group) {
            for (k, v) in g {
                out.insert(k.clone(), v.clone());
            }
        }
    }
    for (k, v) in root {
        if PARAMETER_GROUPS.contains(&k.as_str()) && v.is_object() {
            continue;
        }
        out.insert(k.clone(), v.clone());
    }
    ParamMap(out)
}

#[cfg(test)]
#[path = "../../tests/unit/params/map.rs"]
mod tests;
