use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::foundation::error::{BrandwaveError, BrandwaveResult};
use crate::script::compile::{DEFAULT_MAX_REPEAT, DEFAULT_OP_BUDGET};
use crate::template::registry::DEFAULT_FAILURE_COOLDOWN;

/// Largest canvas side a request may ask for.
pub const DEFAULT_MAX_SIDE: u32 = 4096;

pub const ENV_TEMPLATE_DIR: &str = "BRANDWAVE_TEMPLATE_DIR";
pub const ENV_LOAD_COOLDOWN_MS: &str = "BRANDWAVE_LOAD_COOLDOWN_MS";
pub const ENV_OP_BUDGET: &str = "BRANDWAVE_OP_BUDGET";
pub const ENV_THREADS: &str = "BRANDWAVE_THREADS";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchThreading {
    /// Render batch entries on a dedicated rayon pool.
    pub parallel: bool,
    /// Override the number of rayon worker threads. `None` uses rayon defaults.
    pub threads: Option<usize>,
}

/// Options controlling an [`Engine`](crate::Engine).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineOpts {
    /// Directory of `<id>.json` template documents. `None` serves presets only.
    pub template_dir: Option<PathBuf>,
    /// How long a failed dynamic load is cached before the next resolve retries it.
    pub load_cooldown: Duration,
    /// Instruction budget of one document draw.
    pub op_budget: u64,
    pub max_repeat: u32,
    /// Canvas sides are clamped to `[1, max_side]`.
    pub max_side: u32,
    pub threading: BatchThreading,
}

impl Default for EngineOpts {
    fn default() -> Self {
        Self {
            template_dir: None,
            load_cooldown: DEFAULT_FAILURE_COOLDOWN,
            op_budget: DEFAULT_OP_BUDGET,
            max_repeat: DEFAULT_MAX_REPEAT,
            max_side: DEFAULT_MAX_SIDE,
            threading: BatchThreading::default(),
        }
    }
}

impl EngineOpts {
    /// Defaults overlaid with the `BRANDWAVE_*` environment variables.
    pub fn from_env() -> BrandwaveResult<Self> {
        Self::default().overlay_env(|name| std::env::var(name).ok())
    }

    /// Overlay variables looked up through `lookup`. Unset or blank variables keep the
    /// current value.
    pub fn overlay_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> BrandwaveResult<Self> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(dir) = var(ENV_TEMPLATE_DIR) {
            self.template_dir = Some(PathBuf::from(dir.trim()));
        }
        if let Some(raw) = var(ENV_LOAD_COOLDOWN_MS) {
            self.load_cooldown = Duration::from_millis(parse_var(ENV_LOAD_COOLDOWN_MS, &raw)?);
        }
        if let Some(raw) = var(ENV_OP_BUDGET) {
            let budget: u64 = parse_var(ENV_OP_BUDGET, &raw)?;
            if budget == 0 {
                return Err(BrandwaveError::validation(format!(
                    "{ENV_OP_BUDGET} must be >= 1"
                )));
            }
            self.op_budget = budget;
        }
        if let Some(raw) = var(ENV_THREADS) {
            let threads: usize = parse_var(ENV_THREADS, &raw)?;
            if threads == 0 {
                return Err(BrandwaveError::validation(format!(
                    "{ENV_THREADS} must be >= 1"
                )));
            }
            self.threading = BatchThreading {
                parallel: true,
                threads: Some(threads),
            };
        }
        Ok(self)
    }
}

fn parse_var<T>(name: &str, raw: &str) -> BrandwaveResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim()
        .parse()
        .map_err(|e| BrandwaveError::validation(format!("{name}={raw:?}: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/exec/opts.rs"]
mod tests;
