use std::sync::Arc;

use rayon::prelude::*;

use crate::exec::opts::EngineOpts;
use crate::exec::sandbox::{FALLBACK_BACKGROUND, RenderError, Sandbox};
use crate::foundation::core::Canvas;
use crate::foundation::error::{BrandwaveError, BrandwaveResult};
use crate::params::map::ParamMap;
use crate::script::DocumentCompiler;
use crate::surface::display_list::DisplayList;
use crate::surface::raster::{FrameRGBA, RasterSurface};
use crate::template::registry::TemplateRegistry;
use crate::template::source::DirSource;

/// One logo to draw.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    pub template_id: String,
    /// Flat parameter map: universal style parameters plus template parameters.
    #[serde(default)]
    pub params: ParamMap,
    #[serde(default)]
    pub time: f64,
    pub width: u32,
    pub height: u32,
    /// Seed of the request's wave generator; falls back to the `seed` parameter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<String>,
}

impl RenderRequest {
    pub fn new(template_id: &str, width: u32, height: u32) -> Self {
        Self {
            template_id: template_id.to_owned(),
            params: ParamMap::new(),
            time: 0.0,
            width,
            height,
            seed: None,
        }
    }

    pub fn with_params(mut self, params: ParamMap) -> Self {
        self.params = params;
        self
    }

    pub fn with_time(mut self, time: f64) -> Self {
        self.time = time;
        self
    }

    pub fn with_seed(mut self, seed: &str) -> Self {
        self.seed = Some(seed.to_owned());
        self
    }

    /// The explicit seed, else the `seed` entry of `params` (which should already carry the
    /// template's defaults).
    pub fn effective_seed(&self, params: &ParamMap) -> Option<String> {
        self.seed.clone().or_else(|| params.text_opt("seed"))
    }
}

#[derive(Debug)]
pub enum RenderStatus {
    Rendered,
    /// The fallback frame was drawn instead; carries the reason.
    Fallback(BrandwaveError),
}

/// Pixels for one request, always present, plus how they came about.
#[derive(Debug)]
pub struct RenderOutcome {
    pub template_id: String,
    pub frame: FrameRGBA,
    pub status: RenderStatus,
}

impl RenderOutcome {
    pub fn is_rendered(&self) -> bool {
        matches!(self.status, RenderStatus::Rendered)
    }

    pub fn error(&self) -> Option<&BrandwaveError> {
        match &self.status {
            RenderStatus::Rendered => None,
            RenderStatus::Fallback(e) => Some(e),
        }
    }
}

/// Registry, sandbox and CPU rasterizer behind a request-in, pixels-out interface.
pub struct Engine {
    registry: TemplateRegistry,
    sandbox: Sandbox,
    opts: EngineOpts,
    pool: Option<rayon::ThreadPool>,
}

impl Engine {
    /// Presets plus, when `opts.template_dir` is set, documents from that directory.
    pub fn new(opts: EngineOpts) -> BrandwaveResult<Self> {
        let compiler = DocumentCompiler::new(opts.op_budget, opts.max_repeat);
        let mut registry = TemplateRegistry::with_compiler(Arc::new(compiler));
        registry.register_presets();
        if let Some(dir) = &opts.template_dir {
            registry.set_source(Arc::new(DirSource::new(dir.clone())));
        }
        Self::with_registry(registry, opts)
    }

    pub fn with_registry(mut registry: TemplateRegistry, opts: EngineOpts) -> BrandwaveResult<Self> {
        registry.set_failure_cooldown(opts.load_cooldown);
        let pool = if opts.threading.parallel {
            Some(build_thread_pool(opts.threading.threads)?)
        } else {
            None
        };
        Ok(Self {
            registry,
            sandbox: Sandbox::new(),
            opts,
            pool,
        })
    }

    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut TemplateRegistry {
        &mut self.registry
    }

    pub fn opts(&self) -> &EngineOpts {
        &self.opts
    }

    pub fn canvas_for(&self, req: &RenderRequest) -> Canvas {
        Canvas::clamped(req.width, req.height, self.opts.max_side)
    }

    /// Resolve and run the request's template without rasterizing.
    pub fn record(&self, req: &RenderRequest) -> Result<DisplayList, RenderError> {
        let canvas = self.canvas_for(req);
        let template = self
            .registry
            .resolve(&req.template_id)
            .map_err(|e| RenderError::new(&req.template_id, canvas, e))?;
        let params = template.schema().resolve(&req.params);
        let seed = req.effective_seed(&params);
        self.sandbox
            .execute(&template, canvas, &params, req.time, seed.as_deref())
    }

    /// Render one request. Every failure (bad id, missing or broken template, failing draw)
    /// yields the fallback frame and a `Fallback` status.
    #[tracing::instrument(level = "debug", skip(self, req), fields(id = %req.template_id))]
    pub fn render(&self, req: &RenderRequest) -> RenderOutcome {
        let canvas = self.canvas_for(req);
        let (frame, status) = match self.record(req).and_then(|list| {
            rasterize(&list).map_err(|e| RenderError::new(&req.template_id, canvas, e))
        }) {
            Ok(frame) => (frame, RenderStatus::Rendered),
            Err(err) => {
                if !matches!(err.error, BrandwaveError::Execution { .. }) {
                    tracing::warn!(id = %req.template_id, error = %err.error, "render failed; using fallback");
                }
                let frame = rasterize(&err.fallback()).unwrap_or_else(|_| blank_frame(canvas));
                (frame, RenderStatus::Fallback(err.error))
            }
        };
        RenderOutcome {
            template_id: req.template_id.clone(),
            frame,
            status,
        }
    }

    /// Render every request, logo by logo. Output order equals input order.
    #[tracing::instrument(level = "debug", skip_all, fields(count = reqs.len()))]
    pub fn render_batch(&self, reqs: &[RenderRequest]) -> Vec<RenderOutcome> {
        match &self.pool {
            Some(pool) => pool.install(|| reqs.par_iter().map(|r| self.render(r)).collect()),
            None => reqs.iter().map(|r| self.render(r)).collect(),
        }
    }
}

pub fn rasterize(list: &DisplayList) -> BrandwaveResult<FrameRGBA> {
    let mut surface = RasterSurface::new(list.canvas)?;
    list.replay(&mut surface)?;
    Ok(surface.into_frame())
}

/// Last resort when even the fallback cannot be rasterized.
fn blank_frame(canvas: Canvas) -> FrameRGBA {
    let px = FALLBACK_BACKGROUND.to_premul().to_array();
    let n = (canvas.width as usize) * (canvas.height as usize);
    FrameRGBA {
        width: canvas.width,
        height: canvas.height,
        data: px.repeat(n),
        premultiplied: true,
    }
}

fn build_thread_pool(threads: Option<usize>) -> BrandwaveResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(BrandwaveError::validation(
            "batch threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| BrandwaveError::validation(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/exec/engine.rs"]
mod tests;
