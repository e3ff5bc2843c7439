//! Statically linked templates, invoked by id without a load or compile step.

pub(crate) mod bars;
pub(crate) mod geometry;
pub(crate) mod layers;

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use serde_json::Value;

use crate::exec::engine::RenderRequest;
use crate::exec::sandbox::{ExecutionResult, Sandbox};
use crate::foundation::core::{Canvas, Rgba8};
use crate::foundation::error::{BrandwaveError, BrandwaveResult};
use crate::generate::wave::WaveGenerator;
use crate::params::schema::{ParamSchema, ParamSpec, wave_parameters};
use crate::style::color::{Hsl, hsl_to_rgb, with_alpha};
use crate::template::contract::Template;

/// The closed set of preset templates, keyed by id.
pub struct PresetMap {
    entries: BTreeMap<String, Arc<Template>>,
}

impl PresetMap {
    /// The built-in presets, built once per process.
    pub fn builtin() -> &'static PresetMap {
        static BUILTIN: OnceLock<PresetMap> = OnceLock::new();
        BUILTIN.get_or_init(|| {
            let builders: [fn() -> BrandwaveResult<Template>; 6] = [
                bars::wave_bars,
                bars::audio_bars,
                layers::wave_layers,
                geometry::pulse_rings,
                geometry::spinning_polygons,
                geometry::infinity_loops,
            ];
            Self::from_templates(builders.into_iter().filter_map(|build| match build() {
                Ok(t) => Some(t),
                Err(e) => {
                    tracing::error!(error = %e, "preset failed validation");
                    None
                }
            }))
        })
    }

    pub fn from_templates(templates: impl IntoIterator<Item = Template>) -> Self {
        let entries = templates
            .into_iter()
            .map(|t| (t.id().to_owned(), Arc::new(t)))
            .collect();
        Self { entries }
    }

    pub fn get(&self, id: &str) -> Option<Arc<Template>> {
        self.entries.get(id).cloned()
    }

    pub fn is_registered(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Registered ids, sorted.
    pub fn ids(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub fn templates(&self) -> impl Iterator<Item = &Arc<Template>> + '_ {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Run the preset named by `req.template_id` in `sandbox`, with canvas sides clamped to
    /// `[1, max_side]` as [`Engine`](crate::Engine) does with `EngineOpts::max_side`.
    ///
    /// `None` means the id is not a preset; it is not an error.
    pub fn execute(
        &self,
        sandbox: &Sandbox,
        req: &RenderRequest,
        max_side: u32,
    ) -> Option<ExecutionResult> {
        let template = self.entries.get(&req.template_id)?;
        let canvas = Canvas::clamped(req.width, req.height, max_side);
        let params = template.schema().resolve(&req.params);
        let seed = req.effective_seed(&params);
        Some(sandbox.execute(template, canvas, &params, req.time, seed.as_deref()))
    }
}

/// Schema of a preset: wave parameters with the preset's defaults, the preset's own
/// parameters, a `seed` defaulting to the preset id, then the universal parameters.
fn preset_schema(id: &str, wave_defaults: &[(&str, f64)], own: ParamSchema) -> ParamSchema {
    let mut schema = ParamSchema::new();
    for (name, spec) in wave_parameters().iter() {
        let mut spec = spec.clone();
        if let Some((_, v)) = wave_defaults.iter().find(|(n, _)| *n == name) {
            spec.default = Value::from(*v);
        }
        schema.insert(name, spec);
    }
    for (name, spec) in own.iter() {
        schema.insert(name, spec.clone());
    }
    schema.insert("seed", ParamSpec::text(id, "Seed"));
    schema.with_universal()
}

fn require<'g>(
    generator: Option<&'g mut WaveGenerator>,
    id: &str,
) -> BrandwaveResult<&'g mut WaveGenerator> {
    generator.ok_or_else(|| BrandwaveError::execution(id, "preset needs a wave generator"))
}

fn hsla(h: f64, s: f64, l: f64, a: f64) -> Rgba8 {
    with_alpha(hsl_to_rgb(Hsl { h, s, l }), a)
}

fn hsl(h: f64, s: f64, l: f64) -> Rgba8 {
    hsl_to_rgb(Hsl { h, s, l })
}

#[cfg(test)]
#[path = "../../tests/unit/presets/mod.rs"]
mod tests;
