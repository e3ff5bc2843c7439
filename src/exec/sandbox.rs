use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::foundation::core::{Canvas, Rgba8};
use crate::foundation::error::BrandwaveError;
use crate::generate::wave::{WaveGenerator, WaveParameters};
use crate::params::map::ParamMap;
use crate::surface::cmd::TextAlign;
use crate::surface::display_list::DisplayList;
use crate::surface::font;
use crate::surface::painter::Painter;
use crate::template::contract::{DrawArgs, Template};

pub const FALLBACK_BACKGROUND: Rgba8 = Rgba8::opaque(0xfe, 0xe2, 0xe2);
pub const FALLBACK_TITLE: Rgba8 = Rgba8::opaque(0xdc, 0x26, 0x26);
pub const FALLBACK_TEXT: Rgba8 = Rgba8::opaque(0x99, 0x1b, 0x1b);
pub const FALLBACK_HEADLINE: &str = "Template Error";

const TITLE_SIZE: f64 = 14.0;
const MESSAGE_SIZE: f64 = 12.0;
const MAX_MESSAGE_LINES: usize = 4;

/// A failed execution: which template, on what canvas, and why.
///
/// Failures never reach the caller's surface directly; [`RenderError::fallback`] turns one
/// into the error frame drawn in place of the template.
#[derive(thiserror::Error, Debug)]
#[error("{error}")]
pub struct RenderError {
    pub template_id: String,
    pub canvas: Canvas,
    #[source]
    pub error: BrandwaveError,
}

impl RenderError {
    pub fn new(template_id: &str, canvas: Canvas, error: BrandwaveError) -> Self {
        Self {
            template_id: template_id.to_owned(),
            canvas,
            error,
        }
    }

    /// Flat error-colored frame carrying the failure message.
    pub fn fallback(&self) -> DisplayList {
        fallback_display_list(self.canvas, &self.error.to_string())
    }

    pub fn into_fallback(self) -> DisplayList {
        self.fallback()
    }
}

/// Outcome of one sandboxed draw: the template's complete output, or the failure.
pub type ExecutionResult = Result<DisplayList, RenderError>;

/// Runs template draws so that no failure, not even a panic, escapes to the caller.
///
/// Each draw records into a fresh painter; on failure that recording is dropped whole, so
/// partial output is never observable.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sandbox;

impl Sandbox {
    pub fn new() -> Self {
        Self
    }

    #[tracing::instrument(level = "debug", skip(self, template, params), fields(id = %template.id()))]
    pub fn execute(
        &self,
        template: &Template,
        canvas: Canvas,
        params: &ParamMap,
        time: f64,
        seed: Option<&str>,
    ) -> ExecutionResult {
        let mut generator = template
            .uses_generator()
            .then(|| WaveGenerator::new(wave_parameters_from(params), seed));
        let mut painter = Painter::new(canvas);
        let args = DrawArgs {
            width: canvas.width_f64(),
            height: canvas.height_f64(),
            params,
            time: if time.is_finite() { time } else { 0.0 },
        };

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            template.draw(&mut painter, &args, generator.as_mut())
        }));
        let error = match outcome {
            Ok(Ok(())) => match painter.fault() {
                None => return Ok(painter.finish()),
                Some(fault) => BrandwaveError::execution(template.id(), fault),
            },
            Ok(Err(e @ BrandwaveError::Execution { .. })) => e,
            Ok(Err(e)) => BrandwaveError::execution(template.id(), e.to_string()),
            Err(payload) => BrandwaveError::execution(template.id(), panic_message(&*payload)),
        };
        tracing::warn!(id = %template.id(), error = %error, "template draw failed; using fallback");
        Err(RenderError::new(template.id(), canvas, error))
    }
}

/// Core wave parameters of a request; absent or non-numeric entries keep the defaults.
pub fn wave_parameters_from(params: &ParamMap) -> WaveParameters {
    let d = WaveParameters::default();
    WaveParameters {
        amplitude: params.number("amplitude", d.amplitude),
        frequency: params.number("frequency", d.frequency),
        phase: params.number("phase", d.phase),
        complexity: params.number("complexity", d.complexity),
        chaos: params.number("chaos", d.chaos),
        damping: params.number("damping", d.damping),
        layers: params
            .integer("layers", i64::from(d.layers))
            .clamp(1, i64::from(u32::MAX)) as u32,
    }
    .clamped()
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("draw panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("draw panicked: {s}")
    } else {
        "draw panicked".to_owned()
    }
}

/// The frame shown instead of a failed template: a cleared canvas, a flat background, a
/// headline and the wrapped message.
pub fn fallback_display_list(canvas: Canvas, message: &str) -> DisplayList {
    let (w, h) = (canvas.width_f64(), canvas.height_f64());
    let mut p = Painter::new(canvas);
    p.clear();
    p.set_fill_color(FALLBACK_BACKGROUND);
    p.fill_rect(0.0, 0.0, w, h);

    p.set_text_align(TextAlign::Center);
    p.set_font_size(TITLE_SIZE);
    p.set_fill_color(FALLBACK_TITLE);
    p.fill_text(FALLBACK_HEADLINE, w / 2.0, h / 2.0);

    p.set_font_size(MESSAGE_SIZE);
    p.set_fill_color(FALLBACK_TEXT);
    let lines = font::wrap(message, MESSAGE_SIZE, w * 0.9);
    for (i, line) in lines.iter().take(MAX_MESSAGE_LINES).enumerate() {
        let y = h / 2.0 + 20.0 + i as f64 * (MESSAGE_SIZE + 4.0);
        p.fill_text(line, w / 2.0, y);
    }
    p.finish()
}

#[cfg(test)]
#[path = "../../tests/unit/exec/sandbox.rs"]
mod tests;
