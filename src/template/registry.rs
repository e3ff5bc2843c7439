use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};
use std::time::{Duration, Instant};

use crate::foundation::error::{BrandwaveError, BrandwaveResult};
use crate::params::map::ParamMap;
use crate::template::contract::{Template, TemplateId, TemplateMeta};
use crate::template::source::{SourceError, TemplateSource};

/// How long a failed dynamic load is served from cache before it is retried.
pub const DEFAULT_FAILURE_COOLDOWN: Duration = Duration::from_secs(30);

/// Turns fetched template text into a [`Template`].
pub trait TemplateCompiler: Send + Sync {
    fn compile(&self, id: &TemplateId, text: &str) -> BrandwaveResult<Template>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FailureKind {
    NotFound,
    Load,
}

/// Cached outcome of a failed load.
#[derive(Clone, Debug)]
struct LoadFailure {
    kind: FailureKind,
    message: String,
    at: Instant,
}

impl LoadFailure {
    fn to_error(&self, id: &TemplateId) -> BrandwaveError {
        match self.kind {
            FailureKind::NotFound => BrandwaveError::not_found(id.as_str()),
            FailureKind::Load => BrandwaveError::load(id.as_str(), self.message.clone()),
        }
    }

    fn expired(&self, cooldown: Duration) -> bool {
        self.at.elapsed() >= cooldown
    }
}

/// One id's dynamic load. The cell is initialized by exactly one caller; concurrent
/// resolvers of the same id block on it instead of loading again.
#[derive(Default)]
struct LoadSlot {
    cell: OnceLock<Result<Arc<Template>, LoadFailure>>,
}

/// Counters for observing registry behavior.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegistryStats {
    /// Calls made to the template source.
    pub fetches: u64,
    /// Fetched documents that failed to compile.
    pub compile_failures: u64,
}

/// Resolves template ids to templates.
///
/// Statically registered templates are a plain map lookup. Other ids are fetched from the
/// configured [`TemplateSource`] and compiled on first use; successes are cached until
/// invalidated, failures for the failure cooldown.
pub struct TemplateRegistry {
    statics: HashMap<String, Arc<Template>>,
    source: Option<Arc<dyn TemplateSource>>,
    compiler: Arc<dyn TemplateCompiler>,
    dynamic: Mutex<HashMap<String, Arc<LoadSlot>>>,
    cooldown: Duration,
    fetches: AtomicU64,
    compile_failures: AtomicU64,
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRegistry {
    /// Empty registry without a source, compiling documents with the default budget.
    pub fn new() -> Self {
        Self::with_compiler(Arc::new(crate::script::DocumentCompiler::default()))
    }

    pub fn with_compiler(compiler: Arc<dyn TemplateCompiler>) -> Self {
        Self {
            statics: HashMap::new(),
            source: None,
            compiler,
            dynamic: Mutex::new(HashMap::new()),
            cooldown: DEFAULT_FAILURE_COOLDOWN,
            fetches: AtomicU64::new(0),
            compile_failures: AtomicU64::new(0),
        }
    }

    /// Registry with every built-in preset registered statically.
    pub fn with_presets() -> Self {
        let mut registry = Self::new();
        registry.register_presets();
        registry
    }

    pub fn register_presets(&mut self) {
        for template in crate::presets::PresetMap::builtin().templates() {
            self.register(template.as_ref().clone());
        }
    }

    pub fn set_source(&mut self, source: Arc<dyn TemplateSource>) {
        self.source = Some(source);
        self.clear_cache();
    }

    pub fn set_failure_cooldown(&mut self, cooldown: Duration) {
        self.cooldown = cooldown;
    }

    pub fn failure_cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Register a template statically. Last write wins; the replaced template is returned.
    pub fn register(&mut self, template: Template) -> Option<Arc<Template>> {
        let id = template.id().to_owned();
        tracing::debug!(id = %id, "register template");
        self.statics.insert(id, Arc::new(template))
    }

    pub fn unregister(&mut self, id: &str) -> Option<Arc<Template>> {
        self.statics.remove(id)
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<String, Arc<LoadSlot>>> {
        // A panic while holding the map lock cannot leave the map half-updated.
        self.dynamic
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Resolve `id`, loading it from the source if it is not registered.
    ///
    /// The id is validated before anything else, so malformed ids never reach the source.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn resolve(&self, id: &str) -> BrandwaveResult<Arc<Template>> {
        let id = TemplateId::parse(id)?;
        if let Some(t) = self.statics.get(id.as_str()) {
            return Ok(t.clone());
        }
        let Some(source) = self.source.as_deref() else {
            return Err(BrandwaveError::not_found(id.as_str()));
        };

        loop {
            let slot = self
                .slots()
                .entry(id.as_str().to_owned())
                .or_default()
                .clone();

            let mut loaded_here = false;
            let outcome = slot.cell.get_or_init(|| {
                loaded_here = true;
                self.load(source, &id)
            });
            match outcome {
                Ok(t) => {
                    if !loaded_here {
                        tracing::trace!(id = %id, "template cache hit");
                    }
                    return Ok(t.clone());
                }
                Err(failure) if !loaded_here && failure.expired(self.cooldown) => {
                    let mut slots = self.slots();
                    if slots
                        .get(id.as_str())
                        .is_some_and(|current| Arc::ptr_eq(current, &slot))
                    {
                        tracing::debug!(id = %id, "retrying template after cooldown");
                        slots.remove(id.as_str());
                    }
                }
                Err(failure) => return Err(failure.to_error(&id)),
            }
        }
    }

    fn load(
        &self,
        source: &dyn TemplateSource,
        id: &TemplateId,
    ) -> Result<Arc<Template>, LoadFailure> {
        let fail = |kind, message: String| LoadFailure {
            kind,
            message,
            at: Instant::now(),
        };

        self.fetches.fetch_add(1, Ordering::Relaxed);
        let text = source.fetch(id).map_err(|e| match e {
            SourceError::NotFound(_) => {
                tracing::debug!(id = %id, "template source not found");
                fail(FailureKind::NotFound, e.to_string())
            }
            SourceError::Io { .. } => {
                tracing::warn!(id = %id, error = %e, "template fetch failed");
                fail(FailureKind::Load, e.to_string())
            }
        })?;

        let template = self.compiler.compile(id, &text).map_err(|e| {
            self.compile_failures.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(id = %id, error = %e, "template compile failed");
            let message = match e {
                BrandwaveError::Load { message, .. } => message,
                other => other.to_string(),
            };
            fail(FailureKind::Load, message)
        })?;

        if template.id() != id.as_str() {
            self.compile_failures.fetch_add(1, Ordering::Relaxed);
            return Err(fail(
                FailureKind::Load,
                format!("document declares id '{}'", template.id()),
            ));
        }
        tracing::info!(id = %id, "template loaded");
        Ok(Arc::new(template))
    }

    /// Whether `id` resolves without touching the source.
    pub fn contains(&self, id: &str) -> bool {
        self.statics.contains_key(id) || self.cached(id).is_some()
    }

    fn cached(&self, id: &str) -> Option<Arc<Template>> {
        let slot = self.slots().get(id).cloned()?;
        match slot.cell.get() {
            Some(Ok(t)) => Some(t.clone()),
            _ => None,
        }
    }

    /// Drop the cached load (success or failure) of `id`.
    pub fn invalidate(&self, id: &str) -> bool {
        self.slots().remove(id).is_some()
    }

    /// Drop every cached dynamic load. Static registrations stay.
    pub fn clear_cache(&self) {
        self.slots().clear();
    }

    /// Known templates, sorted by id.
    ///
    /// Source ids that have not been loaded yet appear with placeholder metadata.
    pub fn list_all(&self) -> Vec<TemplateMeta> {
        let mut out: BTreeMap<String, TemplateMeta> = BTreeMap::new();
        if let Some(source) = &self.source {
            for id in source.list_ids() {
                let meta = TemplateMeta::placeholder(&id);
                out.insert(id, meta);
            }
        }
        let loaded: Vec<Arc<Template>> = self
            .slots()
            .values()
            .filter_map(|slot| match slot.cell.get() {
                Some(Ok(t)) => Some(t.clone()),
                _ => None,
            })
            .collect();
        for t in loaded.iter().chain(self.statics.values()) {
            out.insert(t.id().to_owned(), t.meta().clone());
        }
        out.into_values().collect()
    }

    pub fn ids(&self) -> Vec<String> {
        self.list_all().into_iter().map(|m| m.id).collect()
    }

    /// Metadata without triggering a load.
    pub fn metadata(&self, id: &str) -> Option<TemplateMeta> {
        if let Some(t) = self.statics.get(id) {
            return Some(t.meta().clone());
        }
        self.cached(id).map(|t| t.meta().clone())
    }

    /// Default parameter values of `id`, universal parameters included.
    pub fn defaults(&self, id: &str) -> BrandwaveResult<ParamMap> {
        Ok(self.resolve(id)?.schema().defaults())
    }

    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            fetches: self.fetches.load(Ordering::Relaxed),
            compile_failures: self.compile_failures.load(Ordering::Relaxed),
        }
    }
}

impl std::fmt::Debug for TemplateRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateRegistry")
            .field("statics", &self.statics.len())
            .field("has_source", &self.source.is_some())
            .field("cooldown", &self.cooldown)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/template/registry.rs"]
mod tests;
