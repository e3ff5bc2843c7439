//! Brandwave generates brand logos procedurally.
//!
//! A logo is a template drawn onto a canvas. Templates come from two places: built-in presets
//! compiled into the crate, and JSON template documents loaded on demand from a
//! [`TemplateSource`]. Either way the draw runs in a [`Sandbox`] that turns failures (panics
//! included) into an error frame instead of a crash.
//!
//! - Synthesize layered waves with a seeded [`WaveGenerator`]
//! - Resolve a template through a [`TemplateRegistry`]
//! - Render requests, singly or in batches, with an [`Engine`]
#![forbid(unsafe_code)]

mod foundation;

pub(crate) mod exec;
pub(crate) mod generate;
pub(crate) mod params;
pub(crate) mod presets;
pub(crate) mod script;
pub(crate) mod style;
pub(crate) mod surface;
pub(crate) mod template;

pub use crate::foundation::core::{Affine, BezPath, Canvas, Point, Rect, Rgba8, Rgba8Premul, Vec2};
pub use crate::foundation::error::{BrandwaveError, BrandwaveResult};
pub use crate::foundation::math::{distance, lerp, map_range, smoothstep};

pub use crate::generate::rng::{RandomSource, SeededRng, hash_seed};
pub use crate::generate::wave::{
    GenerationOptions, Layer, MAX_LAYERS, MAX_RESOLUTION, NestedWave, NestingRatios,
    WaveGenerator, WaveParameters, WavePoint, WaveUpdate,
};

pub use crate::params::map::{PARAMETER_GROUPS, ParamMap, flatten_parameters};
pub use crate::params::schema::{
    ParamKind, ParamSchema, ParamSpec, SelectOption, universal_parameters, wave_parameters,
};

pub use crate::style::background::{BackgroundKind, apply_background, gradient_axis};
pub use crate::style::bounds::{Bounds, bounds_from_points, bounds_from_wave};
pub use crate::style::color::{
    Hsl, adjust_brightness, adjust_saturation, hex_to_hsl, hsl_to_hex, hsl_to_rgb,
    interpolate_color, lighten_toward_white, luma, parse_color, rgb_to_hsl, rotate_hue,
    scale_brightness, spectrum, with_alpha,
};
pub use crate::style::paint::{FillKind, FillSpec, StrokeKind, StrokeSpec, resolve_fill, resolve_stroke};
pub use crate::style::theme::{ColorTheme, apply_theme, find_theme, themes};

pub use crate::surface::Surface;
pub use crate::surface::cmd::{DrawCmd, GradientStop, LineCap, LineJoin, Paint, StrokeStyle, TextAlign};
pub use crate::surface::display_list::DisplayList;
pub use crate::surface::painter::Painter;
pub use crate::surface::raster::{FrameRGBA, RasterSurface};

pub use crate::template::contract::{
    DrawArgs, DrawRoutine, Template, TemplateId, TemplateMeta, humanize_id, is_valid_template_id,
};
pub use crate::template::registry::{
    DEFAULT_FAILURE_COOLDOWN, RegistryStats, TemplateCompiler, TemplateRegistry,
};
pub use crate::template::source::{DirSource, MemorySource, SourceError, TemplateSource};

pub use crate::script::compile::{DEFAULT_MAX_REPEAT, DEFAULT_OP_BUDGET, DocumentCompiler};
pub use crate::script::document::{ColorArgs, Instr, Operand, TemplateDocument};

pub use crate::exec::engine::{Engine, RenderOutcome, RenderRequest, RenderStatus, rasterize};
pub use crate::exec::opts::{BatchThreading, DEFAULT_MAX_SIDE, EngineOpts};
pub use crate::exec::sandbox::{
    ExecutionResult, FALLBACK_BACKGROUND, RenderError, Sandbox, fallback_display_list,
    wave_parameters_from,
};

pub use crate::presets::PresetMap;
