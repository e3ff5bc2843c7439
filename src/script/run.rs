//! Execution of compiled template documents.

use serde_json::Value;

use crate::foundation::core::{Rect, Rgba8};
use crate::foundation::error::{BrandwaveError, BrandwaveResult};
use crate::generate::rng::RandomSource;
use crate::generate::wave::{
    GenerationOptions, MAX_LAYERS, MAX_RESOLUTION, NestingRatios, WaveGenerator, WavePoint,
};
use crate::params::map::ParamMap;
use crate::script::bytecode::{BytecodeProgram, Slot};
use crate::script::vm::{BUDGET_EXHAUSTED, ValueSlot, VmError, eval_program_with_stack};
use crate::style::background::apply_background;
use crate::style::color::{interpolate_color, rotate_hue};
use crate::style::paint::{resolve_fill, resolve_stroke};
use crate::surface::cmd::TextAlign;
use crate::surface::painter::Painter;
use crate::template::contract::{DrawArgs, DrawRoutine};

pub(crate) type Code = BytecodeProgram;

pub(crate) const SLOT_WIDTH: Slot = Slot(0);
pub(crate) const SLOT_HEIGHT: Slot = Slot(1);
pub(crate) const SLOT_TIME: Slot = Slot(2);
pub(crate) const FIRST_FREE_SLOT: u32 = 3;

const MAX_POLYGON_SIDES: f64 = 1024.0;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ColorRef {
    Literal(Rgba8),
    Param { name: String, default: Rgba8 },
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ColorCode {
    pub(crate) base: ColorRef,
    pub(crate) mix: Option<(ColorRef, Code)>,
    pub(crate) hue: Option<Code>,
    pub(crate) alpha: Option<Code>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TextPart {
    Lit(String),
    Param { name: String, default: String },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PointSlots {
    pub(crate) x: Slot,
    pub(crate) y: Slot,
    pub(crate) intensity: Slot,
    pub(crate) phase: Slot,
    pub(crate) index: Slot,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct WaveSource {
    pub(crate) layer: Code,
    pub(crate) resolution: Option<Code>,
    pub(crate) nested: bool,
}

/// Compiled instruction.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Node {
    Background,
    UseFill,
    UseStroke,
    FillColor(ColorCode),
    StrokeColor(ColorCode),
    LineWidth(Code),
    Alpha(Code),
    Save,
    Restore,
    Translate(Code, Code),
    Rotate(Code),
    Scale(Code, Code),
    BeginPath,
    MoveTo(Code, Code),
    LineTo(Code, Code),
    Arc {
        x: Code,
        y: Code,
        r: Code,
        start: Code,
        end: Code,
        ccw: bool,
    },
    Rect([Code; 4]),
    RoundedRect([Code; 5]),
    Polygon {
        x: Code,
        y: Code,
        r: Code,
        sides: Code,
        rotation: Code,
    },
    ClosePath,
    Fill,
    Stroke,
    Text {
        parts: Vec<TextPart>,
        x: Code,
        y: Code,
        size: Option<Code>,
        align: Option<TextAlign>,
    },
    WavePath(WaveSource),
    EachPoint {
        source: WaveSource,
        slots: PointSlots,
        body: Vec<Node>,
    },
    Set(Slot, Code),
    Repeat {
        count: Code,
        var: Option<Slot>,
        body: Vec<Node>,
    },
    If {
        cond: Code,
        then: Vec<Node>,
        otherwise: Vec<Node>,
    },
    When {
        param: String,
        expected: Value,
        default: Value,
        body: Vec<Node>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum ParamInit {
    Number(f64),
    Flag(bool),
}

/// A parameter copied into the environment before the draw starts.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ParamSlot {
    pub(crate) slot: Slot,
    pub(crate) name: String,
    pub(crate) init: ParamInit,
}

/// Draw routine of a compiled document.
#[derive(Debug, Clone)]
pub(crate) struct Script {
    pub(crate) id: String,
    pub(crate) nodes: Vec<Node>,
    pub(crate) params: Vec<ParamSlot>,
    pub(crate) slot_count: u32,
    pub(crate) op_budget: u64,
    pub(crate) max_repeat: u32,
}

impl DrawRoutine for Script {
    fn draw(
        &self,
        painter: &mut Painter,
        args: &DrawArgs<'_>,
        generator: Option<&mut WaveGenerator>,
    ) -> BrandwaveResult<()> {
        let mut machine = Machine::new(self, painter, args, generator);
        machine
            .run_block(&self.nodes)
            .map_err(|message| BrandwaveError::execution(&self.id, message))
    }
}

/// Where `rand()` and wave data come from.
enum Stream<'a> {
    Generator(&'a mut WaveGenerator),
    Local(RandomSource),
}

impl Stream<'_> {
    fn next_f64(&mut self) -> f64 {
        match self {
            Self::Generator(g) => g.next_random(),
            Self::Local(rng) => rng.next_f64(),
        }
    }
}

struct Machine<'a> {
    script: &'a Script,
    painter: &'a mut Painter,
    width: f64,
    height: f64,
    time: f64,
    params: &'a ParamMap,
    stream: Stream<'a>,
    env: Vec<ValueSlot>,
    stack: Vec<ValueSlot>,
    fuel: u64,
    painted: u64,
    fill_on: bool,
    stroke_on: bool,
}

type Step = Result<(), String>;

impl<'a> Machine<'a> {
    fn new(
        script: &'a Script,
        painter: &'a mut Painter,
        args: &'a DrawArgs<'a>,
        generator: Option<&'a mut WaveGenerator>,
    ) -> Self {
        let mut env = vec![ValueSlot::F64(0.0); script.slot_count as usize];
        let mut put = |slot: Slot, v: ValueSlot| {
            if let Some(cell) = env.get_mut(slot.0 as usize) {
                *cell = v;
            }
        };
        put(SLOT_WIDTH, ValueSlot::F64(args.width));
        put(SLOT_HEIGHT, ValueSlot::F64(args.height));
        put(SLOT_TIME, ValueSlot::F64(args.time));
        for p in &script.params {
            let v = match p.init {
                ParamInit::Number(default) => ValueSlot::F64(args.params.number(&p.name, default)),
                ParamInit::Flag(default) => ValueSlot::Bool(args.params.flag(&p.name, default)),
            };
            put(p.slot, v);
        }

        let stream = match generator {
            Some(g) => Stream::Generator(g),
            None => Stream::Local(RandomSource::create(Some(&script.id))),
        };
        let painted = painter.work();

        Self {
            script,
            painter,
            width: args.width,
            height: args.height,
            time: args.time,
            params: args.params,
            stream,
            env,
            stack: Vec::with_capacity(16),
            fuel: script.op_budget,
            painted,
            fill_on: true,
            stroke_on: true,
        }
    }

    fn charge(&mut self, units: u64) -> Step {
        if self.fuel < units {
            self.fuel = 0;
            return Err(BUDGET_EXHAUSTED.to_owned());
        }
        self.fuel -= units;
        Ok(())
    }

    fn value(&mut self, code: &Code) -> Result<ValueSlot, String> {
        let env = &self.env;
        let stream = &mut self.stream;
        eval_program_with_stack(
            code,
            &mut self.stack,
            &mut self.fuel,
            |slot| {
                env.get(slot.0 as usize)
                    .copied()
                    .ok_or_else(|| VmError::new("slot out of range"))
            },
            || stream.next_f64(),
        )
        .map_err(|e| e.message)
    }

    fn num(&mut self, code: &Code) -> Result<f64, String> {
        let v = self.value(code)?.as_f64().map_err(|e| e.message)?;
        if v.is_finite() {
            Ok(v)
        } else {
            Err(format!("expression produced a non-finite value ({v})"))
        }
    }

    fn truth(&mut self, code: &Code) -> Result<bool, String> {
        Ok(self.value(code)?.truthy())
    }

    fn set(&mut self, slot: Slot, v: ValueSlot) -> Step {
        let cell = self
            .env
            .get_mut(slot.0 as usize)
            .ok_or_else(|| "slot out of range".to_owned())?;
        *cell = v;
        Ok(())
    }

    fn run_block(&mut self, nodes: &[Node]) -> Step {
        for node in nodes {
            self.charge(1)?;
            self.exec(node)?;
            self.settle_painter()?;
        }
        Ok(())
    }

    /// Stop on a painter fault and charge the geometry the last instruction produced.
    fn settle_painter(&mut self) -> Step {
        if let Some(fault) = self.painter.fault() {
            return Err(fault.to_owned());
        }
        let work = self.painter.work();
        let spent = work.saturating_sub(self.painted);
        self.painted = work;
        self.charge(spent)
    }

    fn exec(&mut self, node: &Node) -> Step {
        match node {
            Node::Background => {
                apply_background(self.painter, self.width, self.height, self.params);
            }
            Node::UseFill => {
                let bounds = Rect::new(0.0, 0.0, self.width, self.height);
                self.fill_on = resolve_fill(self.params).apply(self.painter, bounds);
            }
            Node::UseStroke => {
                self.stroke_on = resolve_stroke(self.params).apply(self.painter);
            }
            Node::FillColor(c) => {
                let color = self.color(c)?;
                self.painter.set_fill_color(color);
                self.fill_on = true;
            }
            Node::StrokeColor(c) => {
                let color = self.color(c)?;
                self.painter.set_stroke_color(color);
                self.stroke_on = true;
            }
            Node::LineWidth(w) => {
                let w = self.num(w)?;
                self.painter.set_line_width(w.max(0.0));
            }
            Node::Alpha(a) => {
                let a = self.num(a)?;
                self.painter.set_global_alpha(a.clamp(0.0, 1.0));
            }
            Node::Save => self.painter.save(),
            Node::Restore => self.painter.restore(),
            Node::Translate(x, y) => {
                let (x, y) = (self.num(x)?, self.num(y)?);
                self.painter.translate(x, y);
            }
            Node::Rotate(a) => {
                let a = self.num(a)?;
                self.painter.rotate(a);
            }
            Node::Scale(x, y) => {
                let (x, y) = (self.num(x)?, self.num(y)?);
                self.painter.scale(x, y);
            }
            Node::BeginPath => self.painter.begin_path(),
            Node::MoveTo(x, y) => {
                let (x, y) = (self.num(x)?, self.num(y)?);
                self.painter.move_to(x, y);
            }
            Node::LineTo(x, y) => {
                let (x, y) = (self.num(x)?, self.num(y)?);
                self.painter.line_to(x, y);
            }
            Node::Arc {
                x,
                y,
                r,
                start,
                end,
                ccw,
            } => {
                let (x, y, r) = (self.num(x)?, self.num(y)?, self.num(r)?);
                let (start, end) = (self.num(start)?, self.num(end)?);
                self.painter.arc(x, y, r.abs(), start, end, *ccw);
            }
            Node::Rect([x, y, w, h]) => {
                let (x, y, w, h) = (self.num(x)?, self.num(y)?, self.num(w)?, self.num(h)?);
                self.painter.rect(x, y, w, h);
            }
            Node::RoundedRect([x, y, w, h, r]) => {
                let (x, y, w, h) = (self.num(x)?, self.num(y)?, self.num(w)?, self.num(h)?);
                let r = self.num(r)?;
                self.painter.rounded_rect(x, y, w, h, r.max(0.0));
            }
            Node::Polygon {
                x,
                y,
                r,
                sides,
                rotation,
            } => {
                let (x, y, r) = (self.num(x)?, self.num(y)?, self.num(r)?);
                let sides = self.num(sides)?.floor().clamp(3.0, MAX_POLYGON_SIDES) as u32;
                let rotation = self.num(rotation)?;
                self.painter.polygon(x, y, r.abs(), sides, rotation);
            }
            Node::ClosePath => self.painter.close_path(),
            Node::Fill => {
                if self.fill_on {
                    self.painter.fill();
                }
            }
            Node::Stroke => {
                if self.stroke_on {
                    self.painter.stroke();
                }
            }
            Node::Text {
                parts,
                x,
                y,
                size,
                align,
            } => {
                let (x, y) = (self.num(x)?, self.num(y)?);
                if let Some(size) = size {
                    let size = self.num(size)?;
                    self.painter.set_font_size(size);
                }
                if let Some(align) = align {
                    self.painter.set_text_align(*align);
                }
                let text = self.text(parts);
                self.painter.fill_text(&text, x, y);
            }
            Node::WavePath(source) => {
                let points = self.wave(source)?;
                for (i, p) in points.iter().enumerate() {
                    if i == 0 {
                        self.painter.move_to(p.x, p.y);
                    } else {
                        self.painter.line_to(p.x, p.y);
                    }
                }
            }
            Node::EachPoint {
                source,
                slots,
                body,
            } => {
                let points = self.wave(source)?;
                for (i, p) in points.iter().enumerate() {
                    self.set(slots.x, ValueSlot::F64(p.x))?;
                    self.set(slots.y, ValueSlot::F64(p.y))?;
                    self.set(slots.intensity, ValueSlot::F64(p.intensity))?;
                    self.set(slots.phase, ValueSlot::F64(p.phase))?;
                    self.set(slots.index, ValueSlot::F64(i as f64))?;
                    self.run_block(body)?;
                }
            }
            Node::Set(slot, code) => {
                let v = match self.value(code)? {
                    ValueSlot::F64(v) if !v.is_finite() => {
                        return Err(format!("expression produced a non-finite value ({v})"));
                    }
                    v => v,
                };
                self.set(*slot, v)?;
            }
            Node::Repeat { count, var, body } => {
                let n = self.num(count)?.floor();
                if n > f64::from(self.script.max_repeat) {
                    return Err(format!(
                        "repeat count {n} exceeds the cap of {}",
                        self.script.max_repeat
                    ));
                }
                for i in 0..n.max(0.0) as u32 {
                    if let Some(slot) = var {
                        self.set(*slot, ValueSlot::F64(f64::from(i)))?;
                    }
                    self.run_block(body)?;
                }
            }
            Node::If {
                cond,
                then,
                otherwise,
            } => {
                if self.truth(cond)? {
                    self.run_block(then)?;
                } else {
                    self.run_block(otherwise)?;
                }
            }
            Node::When {
                param,
                expected,
                default,
                body,
            } => {
                let current = self.params.get(param).unwrap_or(default);
                let hit = match expected {
                    Value::Array(options) => options.contains(current),
                    other => other == current,
                };
                if hit {
                    self.run_block(body)?;
                }
            }
        }
        Ok(())
    }

    fn color_ref(&self, r: &ColorRef) -> Rgba8 {
        match r {
            ColorRef::Literal(c) => *c,
            ColorRef::Param { name, default } => self.params.color(name, *default),
        }
    }

    fn color(&mut self, c: &ColorCode) -> Result<Rgba8, String> {
        let mut color = self.color_ref(&c.base);
        if let Some((other, t)) = &c.mix {
            let other = self.color_ref(other);
            let t = self.num(t)?;
            color = interpolate_color(color, other, t);
        }
        if let Some(hue) = &c.hue {
            let deg = self.num(hue)?;
            color = rotate_hue(color, deg);
        }
        if let Some(alpha) = &c.alpha {
            let a = self.num(alpha)?;
            color = color.scale_alpha(a);
        }
        Ok(color)
    }

    fn text(&self, parts: &[TextPart]) -> String {
        parts
            .iter()
            .map(|part| match part {
                TextPart::Lit(s) => s.clone(),
                TextPart::Param { name, default } => self.params.text(name, default),
            })
            .collect()
    }

    fn wave(&mut self, source: &WaveSource) -> Result<Vec<WavePoint>, String> {
        let layer = self.num(&source.layer)?.floor().clamp(0.0, f64::from(MAX_LAYERS)) as u32;
        let resolution = match &source.resolution {
            Some(code) => self.num(code)?,
            None => self.width / 4.0,
        }
        .floor()
        .clamp(0.0, MAX_RESOLUTION as f64) as usize;
        self.charge(resolution as u64)?;

        let Stream::Generator(generator) = &mut self.stream else {
            return Err("wave data needs a generator".to_owned());
        };
        let opts = GenerationOptions::new(self.width, self.height, resolution).with_time(self.time);
        Ok(if source.nested {
            generator
                .generate_nested(&opts, &NestingRatios::default())
                .detail_points()
                .copied()
                .collect()
        } else {
            generator.generate_layer(&opts, layer, self.time)
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/script/run.rs"]
mod tests;
