//! Layered sine synthesis.
//!
//! Layer `i` detunes the base frequency by `1 + 0.3 i`, decays the amplitude by `damping^i` and
//! offsets the phase by `i * pi / 4`. Each sample sums a fundamental and harmonics
//! `2..=ceil(complexity * 5)` at `1/h` amplitude, adds chaos jitter, then scales and centers.

use std::f64::consts::PI;

use crate::foundation::math::finite_or;
use crate::generate::rng::RandomSource;

/// Smallest value accepted where a parameter must be strictly positive.
pub const MIN_POSITIVE: f64 = 1e-9;
/// Upper bound on layers per generator call.
pub const MAX_LAYERS: u32 = 64;
/// Upper bound on samples per layer.
pub const MAX_RESOLUTION: usize = 100_000;

/// Core generation parameters.
///
/// Out-of-range values are never rejected; [`WaveParameters::clamped`] maps them onto the
/// nearest valid value and replaces non-finite numbers with the defaults.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WaveParameters {
    pub amplitude: f64,
    pub frequency: f64,
    pub phase: f64,
    pub complexity: f64,
    pub chaos: f64,
    pub damping: f64,
    pub layers: u32,
}

impl Default for WaveParameters {
    fn default() -> Self {
        Self {
            amplitude: 50.0,
            frequency: 3.0,
            phase: 0.0,
            complexity: 0.3,
            chaos: 0.1,
            damping: 0.9,
            layers: 2,
        }
    }
}

impl WaveParameters {
    pub fn clamped(self) -> Self {
        let d = Self::default();
        Self {
            amplitude: finite_or(self.amplitude, d.amplitude).max(MIN_POSITIVE),
            frequency: finite_or(self.frequency, d.frequency).max(MIN_POSITIVE),
            phase: finite_or(self.phase, d.phase),
            complexity: finite_or(self.complexity, d.complexity).clamp(0.0, 1.0),
            chaos: finite_or(self.chaos, d.chaos).clamp(0.0, 1.0),
            damping: finite_or(self.damping, d.damping).clamp(MIN_POSITIVE, 1.0),
            layers: self.layers.clamp(1, MAX_LAYERS),
        }
    }

    /// Highest harmonic index summed per sample (`< 2` means fundamental only).
    pub fn max_harmonic(&self) -> u32 {
        (self.complexity * 5.0).ceil() as u32
    }
}

/// Partial update merged into [`WaveParameters`]; `None` keeps the prior value.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WaveUpdate {
    pub amplitude: Option<f64>,
    pub frequency: Option<f64>,
    pub phase: Option<f64>,
    pub complexity: Option<f64>,
    pub chaos: Option<f64>,
    pub damping: Option<f64>,
    pub layers: Option<u32>,
}

/// Per-call sampling extent.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GenerationOptions {
    pub width: f64,
    pub height: f64,
    /// Samples per layer.
    pub resolution: usize,
    #[serde(default)]
    pub time: f64,
}

impl GenerationOptions {
    pub fn new(width: f64, height: f64, resolution: usize) -> Self {
        Self {
            width,
            height,
            resolution,
            time: 0.0,
        }
    }

    pub fn with_time(self, time: f64) -> Self {
        Self { time, ..self }
    }

    fn sanitized(self) -> Self {
        fn extent(v: f64) -> f64 {
            if v.is_finite() && v > 0.0 { v } else { 1.0 }
        }
        Self {
            width: extent(self.width),
            height: extent(self.height),
            resolution: self.resolution.min(MAX_RESOLUTION),
            time: finite_or(self.time, 0.0),
        }
    }
}

/// One generated sample.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WavePoint {
    pub x: f64,
    pub y: f64,
    /// Deviation from the centerline relative to half the height, in `[0, 1]`.
    pub intensity: f64,
    /// Angle (radians) at this sample, without the time offset.
    pub phase: f64,
}

/// Samples of one layer, in sample order.
pub type Layer = Vec<WavePoint>;

/// Ratios used by [`WaveGenerator::generate_nested`].
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NestingRatios {
    /// Container resolution is the requested resolution divided by this.
    pub container_divisor: usize,
    pub amplitude_scale: f64,
    pub frequency_scale: f64,
    /// Samples per segment wave.
    pub segment_resolution: usize,
    /// Vertical squash applied when mapping a segment wave onto its container segment.
    pub vertical_scale: f64,
}

impl Default for NestingRatios {
    fn default() -> Self {
        Self {
            container_divisor: 4,
            amplitude_scale: 0.3,
            frequency_scale: 4.0,
            segment_resolution: 20,
            vertical_scale: 0.3,
        }
    }
}

/// Output of nested generation: one coarse container and one small wave per container segment.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct NestedWave {
    pub container: Layer,
    pub segments: Vec<Layer>,
}

impl NestedWave {
    /// All segment points in drawing order.
    pub fn detail_points(&self) -> impl Iterator<Item = &WavePoint> + '_ {
        self.segments.iter().flatten()
    }
}

/// Multi-layer wave generator with its own random stream.
///
/// The stream advances across calls, so with `chaos > 0` two calls on the same instance differ;
/// two fresh instances with the same seed and inputs are bit-identical.
#[derive(Clone, Debug)]
pub struct WaveGenerator {
    params: WaveParameters,
    seed: Option<String>,
    rng: RandomSource,
}

impl WaveGenerator {
    pub fn new(params: WaveParameters, seed: Option<&str>) -> Self {
        Self {
            params: params.clamped(),
            seed: seed.map(str::to_owned),
            rng: RandomSource::create(seed),
        }
    }

    pub fn params(&self) -> &WaveParameters {
        &self.params
    }

    pub fn seed(&self) -> Option<&str> {
        self.seed.as_deref()
    }

    /// Shallow merge; the random stream and seed are kept.
    pub fn update_params(&mut self, update: &WaveUpdate) {
        let p = &mut self.params;
        if let Some(v) = update.amplitude {
            p.amplitude = v;
        }
        if let Some(v) = update.frequency {
            p.frequency = v;
        }
        if let Some(v) = update.phase {
            p.phase = v;
        }
        if let Some(v) = update.complexity {
            p.complexity = v;
        }
        if let Some(v) = update.chaos {
            p.chaos = v;
        }
        if let Some(v) = update.damping {
            p.damping = v;
        }
        if let Some(v) = update.layers {
            p.layers = v;
        }
        self.params = self.params.clamped();
    }

    pub fn layer_frequency(&self, layer_index: u32) -> f64 {
        self.params.frequency * (1.0 + f64::from(layer_index) * 0.3)
    }

    pub fn layer_amplitude(&self, layer_index: u32) -> f64 {
        self.params.amplitude * self.params.damping.powi(layer_index as i32)
    }

    pub fn layer_phase(&self, layer_index: u32) -> f64 {
        self.params.phase + f64::from(layer_index) * PI / 4.0
    }

    /// Draw one value from this generator's stream.
    pub fn next_random(&mut self) -> f64 {
        self.rng.next_f64()
    }

    #[tracing::instrument(level = "trace", skip(self))]
    pub fn generate_layer(
        &mut self,
        options: &GenerationOptions,
        layer_index: u32,
        time: f64,
    ) -> Layer {
        let opts = options.sanitized();
        let time = finite_or(time, 0.0);
        let freq = self.layer_frequency(layer_index);
        let amp = self.layer_amplitude(layer_index);
        let phase = self.layer_phase(layer_index);
        let max_h = self.params.max_harmonic();
        let chaos = self.params.chaos;
        let half_h = opts.height / 2.0;

        let mut points = Vec::with_capacity(opts.resolution);
        for i in 0..opts.resolution {
            let t = i as f64 / opts.resolution as f64;
            let x = t * opts.width;
            let angle = t * freq * PI * 2.0 + phase;

            let mut v = (angle + time).sin();
            for h in 2..=max_h {
                let h = f64::from(h);
                v += (1.0 / h) * (t * freq * h * PI * 2.0 + phase + time).sin();
            }
            if chaos > 0.0 {
                v += (self.rng.next_f64() - 0.5) * chaos;
            }

            let y = half_h + v * amp;
            let intensity = ((y - half_h).abs() / half_h).min(1.0);
            points.push(WavePoint {
                x,
                y,
                intensity,
                phase: angle,
            });
        }
        points
    }

    /// One layer per layer index, in index order.
    pub fn generate(&mut self, options: &GenerationOptions) -> Vec<Layer> {
        let time = options.time;
        (0..self.params.layers)
            .map(|i| self.generate_layer(options, i, time))
            .collect()
    }

    /// Wave within a wave: a coarse container layer with a small independent wave laid along
    /// each of its segments.
    ///
    /// Segment generators are separate instances. When this generator is seeded each segment
    /// derives its own seed from the parent seed and the segment index, so nested output is as
    /// reproducible as the container; an unseeded parent gives unseeded segments.
    pub fn generate_nested(
        &mut self,
        options: &GenerationOptions,
        ratios: &NestingRatios,
    ) -> NestedWave {
        let divisor = ratios.container_divisor.max(1);
        let container_opts = GenerationOptions {
            resolution: options.resolution / divisor,
            ..*options
        };
        let container = self.generate_layer(&container_opts, 0, options.time);

        let segment_params = WaveParameters {
            amplitude: self.params.amplitude * ratios.amplitude_scale,
            frequency: self.params.frequency * ratios.frequency_scale,
            ..self.params
        };
        let half_h = options.sanitized().height / 2.0;

        let segments = container
            .windows(2)
            .enumerate()
            .map(|(i, pair)| {
                let (start, end) = (pair[0], pair[1]);
                let seed = self.seed.as_ref().map(|s| format!("{s}#segment-{i}"));
                let mut mini = WaveGenerator::new(segment_params, seed.as_deref());
                let seg_opts =
                    GenerationOptions::new(end.x - start.x, options.height, ratios.segment_resolution);
                mini.generate_layer(&seg_opts, 0, 0.0)
                    .into_iter()
                    .map(|p| WavePoint {
                        x: start.x + p.x,
                        y: start.y + (p.y - half_h) * ratios.vertical_scale,
                        ..p
                    })
                    .collect()
            })
            .collect();

        NestedWave {
            container,
            segments,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/generate/wave.rs"]
mod tests;
