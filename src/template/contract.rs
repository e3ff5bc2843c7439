use std::fmt;
use std::sync::Arc;

use crate::foundation::error::{BrandwaveError, BrandwaveResult};
use crate::generate::wave::WaveGenerator;
use crate::params::map::ParamMap;
use crate::params::schema::{ParamKind, ParamSchema, ParamSpec};
use crate::surface::painter::Painter;

/// Descriptive fields of a template.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TemplateMeta {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl TemplateMeta {
    pub fn new(id: &str, name: &str, description: &str) -> Self {
        Self {
            id: id.to_owned(),
            name: name.to_owned(),
            description: description.to_owned(),
            category: None,
        }
    }

    pub fn in_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_owned());
        self
    }

    /// Metadata for an id that is known but not loaded yet.
    pub fn placeholder(id: &str) -> Self {
        Self::new(id, &humanize_id(id), "")
    }
}

/// `true` when `id` is non-empty and only uses `[a-zA-Z0-9-]`.
pub fn is_valid_template_id(id: &str) -> bool {
    !id.is_empty() && id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
}

/// A template id that passed validation, safe to use as a resource name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TemplateId(String);

impl TemplateId {
    pub fn parse(id: &str) -> BrandwaveResult<Self> {
        if is_valid_template_id(id) {
            Ok(Self(id.to_owned()))
        } else {
            Err(BrandwaveError::invalid_id(id))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `"wave-bars"` becomes `"Wave Bars"`.
pub fn humanize_id(id: &str) -> String {
    id.split('-')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Inputs of one draw call.
#[derive(Clone, Copy, Debug)]
pub struct DrawArgs<'a> {
    pub width: f64,
    pub height: f64,
    pub params: &'a ParamMap,
    pub time: f64,
}

/// Drawing logic of a template.
///
/// A routine only issues operations against `painter`. Returning an error (or panicking)
/// marks the draw as failed; the sandbox then discards everything it drew.
pub trait DrawRoutine: Send + Sync {
    fn draw(
        &self,
        painter: &mut Painter,
        args: &DrawArgs<'_>,
        generator: Option<&mut WaveGenerator>,
    ) -> BrandwaveResult<()>;
}

impl<F> DrawRoutine for F
where
    F: Fn(&mut Painter, &DrawArgs<'_>, Option<&mut WaveGenerator>) -> BrandwaveResult<()>
        + Send
        + Sync,
{
    fn draw(
        &self,
        painter: &mut Painter,
        args: &DrawArgs<'_>,
        generator: Option<&mut WaveGenerator>,
    ) -> BrandwaveResult<()> {
        self(painter, args, generator)
    }
}

/// A validated template: metadata, parameter schema and draw routine, all mandatory.
#[derive(Clone)]
pub struct Template {
    meta: TemplateMeta,
    schema: ParamSchema,
    uses_generator: bool,
    routine: Arc<dyn DrawRoutine>,
}

impl Template {
    /// Validate and assemble a template.
    ///
    /// Rejects invalid ids, empty names, and schema entries whose default falls outside
    /// their own domain.
    pub fn new(
        meta: TemplateMeta,
        schema: ParamSchema,
        uses_generator: bool,
        routine: Arc<dyn DrawRoutine>,
    ) -> BrandwaveResult<Self> {
        if !is_valid_template_id(&meta.id) {
            return Err(BrandwaveError::invalid_id(meta.id));
        }
        if meta.name.trim().is_empty() {
            return Err(BrandwaveError::validation(format!(
                "template '{}' has an empty name",
                meta.id
            )));
        }
        for (name, spec) in schema.iter() {
            if let ParamKind::Slider { min, max, .. } = spec.kind
                && !(min.is_finite() && max.is_finite() && min <= max)
            {
                return Err(BrandwaveError::validation(format!(
                    "template '{}': parameter '{name}' has an invalid range",
                    meta.id
                )));
            }
            if !default_in_domain(spec) {
                return Err(BrandwaveError::validation(format!(
                    "template '{}': default of '{name}' is outside its declared domain",
                    meta.id
                )));
            }
        }
        Ok(Self {
            meta,
            schema,
            uses_generator,
            routine,
        })
    }

    pub fn id(&self) -> &str {
        &self.meta.id
    }

    pub fn meta(&self) -> &TemplateMeta {
        &self.meta
    }

    pub fn schema(&self) -> &ParamSchema {
        &self.schema
    }

    /// Whether the sandbox builds a wave generator for this template.
    pub fn uses_generator(&self) -> bool {
        self.uses_generator
    }

    pub fn draw(
        &self,
        painter: &mut Painter,
        args: &DrawArgs<'_>,
        generator: Option<&mut WaveGenerator>,
    ) -> BrandwaveResult<()> {
        self.routine.draw(painter, args, generator)
    }
}

/// Numbers compare by value, so an integer default inside a float range still counts.
fn default_in_domain(spec: &ParamSpec) -> bool {
    match spec.normalize_value(&spec.default) {
        Some(v) if v == spec.default => true,
        Some(v) => matches!(
            (v.as_f64(), spec.default.as_f64()),
            (Some(a), Some(b)) if a == b
        ),
        None => false,
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template")
            .field("meta", &self.meta)
            .field("params", &self.schema.len())
            .field("uses_generator", &self.uses_generator)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/template/contract.rs"]
mod tests;
