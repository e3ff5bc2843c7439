use std::collections::HashMap;
use std::f64::consts::{PI, TAU};
use std::sync::Arc;

use serde_json::Value;

use crate::foundation::core::Rgba8;
use crate::foundation::error::{BrandwaveError, BrandwaveResult};
use crate::params::schema::{ParamKind, ParamSchema, wave_parameters};
use crate::script::bind::{BindCtx, Binding, bind_expr};
use crate::script::bytecode::{BytecodeProgram, ConstVal, Op, Slot};
use crate::script::document::{ColorArgs, Instr, Operand, TemplateDocument};
use crate::script::lower::lower_to_bytecode;
use crate::script::parser::parse_expr;
use crate::script::run::{
    ColorCode, ColorRef, Code, FIRST_FREE_SLOT, Node, ParamInit, ParamSlot, PointSlots,
    SLOT_HEIGHT, SLOT_TIME, SLOT_WIDTH, Script, TextPart, WaveSource,
};
use crate::style::color::parse_color;
use crate::template::contract::{Template, TemplateId};
use crate::template::registry::TemplateCompiler;

/// Instructions plus VM ops one draw may execute.
pub const DEFAULT_OP_BUDGET: u64 = 2_000_000;
/// Largest iteration count a single `repeat` accepts.
pub const DEFAULT_MAX_REPEAT: u32 = 10_000;

const RESERVED: [&str; 6] = ["width", "height", "time", "pi", "tau", "params"];
const POINT_VARS: [&str; 5] = [
    "point_x",
    "point_y",
    "point_intensity",
    "point_phase",
    "point_index",
];

/// Compiles JSON [`TemplateDocument`]s into templates.
///
/// Everything is checked up front: expressions, identifiers, color references and generator
/// use. Failures are [`BrandwaveError::Load`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DocumentCompiler {
    op_budget: u64,
    max_repeat: u32,
}

impl Default for DocumentCompiler {
    fn default() -> Self {
        Self {
            op_budget: DEFAULT_OP_BUDGET,
            max_repeat: DEFAULT_MAX_REPEAT,
        }
    }
}

impl DocumentCompiler {
    pub fn new(op_budget: u64, max_repeat: u32) -> Self {
        Self {
            op_budget,
            max_repeat,
        }
    }

    pub fn op_budget(&self) -> u64 {
        self.op_budget
    }

    pub fn max_repeat(&self) -> u32 {
        self.max_repeat
    }

    pub fn compile_document(&self, doc: &TemplateDocument) -> BrandwaveResult<Template> {
        let id = doc.id.as_str();
        let schema = document_schema(doc);

        let mut scope = Scope::new(&schema, doc.generator);
        let nodes = scope
            .block(&doc.draw, "draw")
            .map_err(|msg| BrandwaveError::load(id, msg))?;

        let script = Script {
            id: id.to_owned(),
            nodes,
            params: scope.param_slots,
            slot_count: scope.next_slot,
            op_budget: self.op_budget,
            max_repeat: self.max_repeat,
        };
        let uses_generator = doc.generator || scope.uses_rand;
        Template::new(doc.meta(), schema, uses_generator, Arc::new(script)).map_err(|e| match e {
            BrandwaveError::Load { .. } => e,
            other => BrandwaveError::load(id, other.to_string()),
        })
    }
}

impl TemplateCompiler for DocumentCompiler {
    fn compile(&self, id: &TemplateId, text: &str) -> BrandwaveResult<Template> {
        let doc = TemplateDocument::from_json(text)
            .map_err(|e| BrandwaveError::load(id.as_str(), e.to_string()))?;
        self.compile_document(&doc)
    }
}

/// Declared parameters, then wave parameters for generator templates, then universal ones.
fn document_schema(doc: &TemplateDocument) -> ParamSchema {
    let mut schema = doc.parameters.clone();
    if doc.generator {
        for (name, spec) in wave_parameters().iter() {
            if !schema.contains(name) {
                schema.insert(name, spec.clone());
            }
        }
    }
    schema.with_universal()
}

fn is_identifier(name: &str) -> bool {
    let mut bytes = name.bytes();
    bytes
        .next()
        .is_some_and(|b| b.is_ascii_alphabetic() || b == b'_')
        && bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_')
        && !matches!(name, "true" | "false")
}

/// Compile-time name environment.
struct Scope<'s> {
    schema: &'s ParamSchema,
    generator: bool,
    ctx: BindCtx,
    vars: HashMap<String, Slot>,
    param_slots: Vec<ParamSlot>,
    next_slot: u32,
    uses_rand: bool,
}

impl<'s> Scope<'s> {
    fn new(schema: &'s ParamSchema, generator: bool) -> Self {
        let mut ctx = BindCtx::default();
        ctx.names.insert("width".to_owned(), Binding::Slot(SLOT_WIDTH));
        ctx.names.insert("height".to_owned(), Binding::Slot(SLOT_HEIGHT));
        ctx.names.insert("time".to_owned(), Binding::Slot(SLOT_TIME));
        ctx.names.insert("pi".to_owned(), Binding::Const(PI));
        ctx.names.insert("tau".to_owned(), Binding::Const(TAU));

        let mut scope = Self {
            schema,
            generator,
            ctx,
            vars: HashMap::new(),
            param_slots: Vec::new(),
            next_slot: FIRST_FREE_SLOT,
            uses_rand: false,
        };

        for (name, spec) in schema.iter() {
            let init = match spec.kind {
                ParamKind::Slider { .. } | ParamKind::Number { .. } => {
                    ParamInit::Number(spec.default.as_f64().unwrap_or(0.0))
                }
                ParamKind::Toggle => ParamInit::Flag(spec.default.as_bool().unwrap_or(false)),
                ParamKind::Color | ParamKind::Select { .. } | ParamKind::Text => continue,
            };
            let slot = scope.alloc();
            scope.ctx.params.insert(name.to_owned(), slot);
            if !RESERVED.contains(&name) {
                scope.ctx.names.insert(name.to_owned(), Binding::Slot(slot));
            }
            scope.param_slots.push(ParamSlot {
                slot,
                name: name.to_owned(),
                init,
            });
        }
        scope
    }

    fn alloc(&mut self) -> Slot {
        let slot = Slot(self.next_slot);
        self.next_slot += 1;
        slot
    }

    fn declare(&mut self, name: &str, at: &str) -> Result<Slot, String> {
        if let Some(slot) = self.vars.get(name) {
            return Ok(*slot);
        }
        if !is_identifier(name) {
            return Err(format!("{at}: \"{name}\" is not a valid variable name"));
        }
        if RESERVED.contains(&name) || self.ctx.names.contains_key(name) {
            return Err(format!("{at}: \"{name}\" is already defined"));
        }
        let slot = self.alloc();
        self.vars.insert(name.to_owned(), slot);
        self.ctx.names.insert(name.to_owned(), Binding::Slot(slot));
        Ok(slot)
    }

    fn code(&mut self, operand: &Operand, at: &str) -> Result<Code, String> {
        let mut program = BytecodeProgram::new();
        let c = match operand {
            Operand::Number(v) => ConstVal::F64(*v),
            Operand::Bool(b) => ConstVal::Bool(*b),
            Operand::Expr(src) => {
                let program = parse_expr(src)
                    .and_then(|ast| bind_expr(ast, &self.ctx))
                    .and_then(|bound| lower_to_bytecode(&bound))
                    .map_err(|e| format!("{at}: {e}"))?;
                if program.uses_rand() {
                    self.uses_rand = true;
                }
                return Ok(program);
            }
        };
        let idx = program.push_const(c);
        program.ops.push(Op::PushConst(idx));
        Ok(program)
    }

    fn opt_code(&mut self, operand: Option<&Operand>, at: &str) -> Result<Option<Code>, String> {
        operand.map(|o| self.code(o, at)).transpose()
    }

    fn color_ref(&self, s: &str, at: &str) -> Result<ColorRef, String> {
        if let Some(c) = parse_color(s) {
            return Ok(ColorRef::Literal(c));
        }
        match self.schema.get(s) {
            Some(spec) if spec.kind == ParamKind::Color => Ok(ColorRef::Param {
                name: s.to_owned(),
                default: spec
                    .default
                    .as_str()
                    .and_then(parse_color)
                    .unwrap_or(Rgba8::BLACK),
            }),
            _ => Err(format!(
                "{at}: \"{s}\" is neither a color nor a color parameter"
            )),
        }
    }

    fn color(&mut self, c: &ColorArgs, at: &str) -> Result<ColorCode, String> {
        let base = self.color_ref(&c.color, &format!("{at}.color"))?;
        let mix = match &c.mix {
            Some(other) => {
                let other = self.color_ref(other, &format!("{at}.mix"))?;
                let t = match &c.t {
                    Some(t) => self.code(t, &format!("{at}.t"))?,
                    None => self.code(&Operand::Number(0.5), at)?,
                };
                Some((other, t))
            }
            None => None,
        };
        Ok(ColorCode {
            base,
            mix,
            hue: self.opt_code(c.hue.as_ref(), &format!("{at}.hue"))?,
            alpha: self.opt_code(c.alpha.as_ref(), &format!("{at}.alpha"))?,
        })
    }

    fn text(&self, text: &str, at: &str) -> Result<Vec<TextPart>, String> {
        let mut parts = Vec::new();
        let mut rest = text;
        while let Some(open) = rest.find('{') {
            let Some(len) = rest[open + 1..].find('}') else {
                break;
            };
            let name = &rest[open + 1..open + 1 + len];
            let Some(spec) = self.schema.get(name) else {
                return Err(format!("{at}: unknown parameter \"{name}\" in text"));
            };
            if open > 0 {
                parts.push(TextPart::Lit(rest[..open].to_owned()));
            }
            let default = match &spec.default {
                Value::String(s) => s.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            };
            parts.push(TextPart::Param {
                name: name.to_owned(),
                default,
            });
            rest = &rest[open + len + 2..];
        }
        if !rest.is_empty() {
            parts.push(TextPart::Lit(rest.to_owned()));
        }
        Ok(parts)
    }

    fn wave_source(
        &mut self,
        layer: &Operand,
        resolution: Option<&Operand>,
        nested: bool,
        at: &str,
    ) -> Result<WaveSource, String> {
        if !self.generator {
            return Err(format!(
                "{at}: wave data needs \"generator\": true in the document"
            ));
        }
        Ok(WaveSource {
            layer: self.code(layer, &format!("{at}.layer"))?,
            resolution: self.opt_code(resolution, &format!("{at}.resolution"))?,
            nested,
        })
    }

    fn block(&mut self, instrs: &[Instr], at: &str) -> Result<Vec<Node>, String> {
        instrs
            .iter()
            .enumerate()
            .map(|(i, instr)| self.node(instr, &format!("{at}[{i}]")))
            .collect()
    }

    fn node(&mut self, instr: &Instr, at: &str) -> Result<Node, String> {
        let field = |name: &str| format!("{at}.{name}");
        Ok(match instr {
            Instr::Background => Node::Background,
            Instr::UseFill => Node::UseFill,
            Instr::UseStroke => Node::UseStroke,
            Instr::FillColor(c) => Node::FillColor(self.color(c, at)?),
            Instr::StrokeColor(c) => Node::StrokeColor(self.color(c, at)?),
            Instr::LineWidth { width } => Node::LineWidth(self.code(width, &field("width"))?),
            Instr::Alpha { value } => Node::Alpha(self.code(value, &field("value"))?),
            Instr::Save => Node::Save,
            Instr::Restore => Node::Restore,
            Instr::Translate { x, y } => {
                Node::Translate(self.code(x, &field("x"))?, self.code(y, &field("y"))?)
            }
            Instr::Rotate { angle } => Node::Rotate(self.code(angle, &field("angle"))?),
            Instr::Scale { x, y } => {
                let sx = self.code(x, &field("x"))?;
                let sy = match y {
                    Some(y) => self.code(y, &field("y"))?,
                    None => sx.clone(),
                };
                Node::Scale(sx, sy)
            }
            Instr::BeginPath => Node::BeginPath,
            Instr::MoveTo { x, y } => {
                Node::MoveTo(self.code(x, &field("x"))?, self.code(y, &field("y"))?)
            }
            Instr::LineTo { x, y } => {
                Node::LineTo(self.code(x, &field("x"))?, self.code(y, &field("y"))?)
            }
            Instr::Arc {
                x,
                y,
                r,
                start,
                end,
                ccw,
            } => Node::Arc {
                x: self.code(x, &field("x"))?,
                y: self.code(y, &field("y"))?,
                r: self.code(r, &field("r"))?,
                start: self.code(start, &field("start"))?,
                end: self.code(end, &field("end"))?,
                ccw: *ccw,
            },
            Instr::Rect { x, y, w, h } => Node::Rect([
                self.code(x, &field("x"))?,
                self.code(y, &field("y"))?,
                self.code(w, &field("w"))?,
                self.code(h, &field("h"))?,
            ]),
            Instr::RoundedRect { x, y, w, h, r } => Node::RoundedRect([
                self.code(x, &field("x"))?,
                self.code(y, &field("y"))?,
                self.code(w, &field("w"))?,
                self.code(h, &field("h"))?,
                self.code(r, &field("r"))?,
            ]),
            Instr::Polygon {
                x,
                y,
                r,
                sides,
                rotation,
            } => Node::Polygon {
                x: self.code(x, &field("x"))?,
                y: self.code(y, &field("y"))?,
                r: self.code(r, &field("r"))?,
                sides: self.code(sides, &field("sides"))?,
                rotation: self.code(rotation, &field("rotation"))?,
            },
            Instr::ClosePath => Node::ClosePath,
            Instr::Fill => Node::Fill,
            Instr::Stroke => Node::Stroke,
            Instr::Text {
                text,
                x,
                y,
                size,
                align,
            } => Node::Text {
                parts: self.text(text, &field("text"))?,
                x: self.code(x, &field("x"))?,
                y: self.code(y, &field("y"))?,
                size: self.opt_code(size.as_ref(), &field("size"))?,
                align: *align,
            },
            Instr::WavePath {
                layer,
                resolution,
                nested,
            } => Node::WavePath(self.wave_source(layer, resolution.as_ref(), *nested, at)?),
            Instr::EachPoint {
                layer,
                resolution,
                body,
            } => {
                let source = self.wave_source(layer, resolution.as_ref(), false, at)?;
                let [x, y, intensity, phase, index] = POINT_VARS;
                let slots = PointSlots {
                    x: self.declare(x, at)?,
                    y: self.declare(y, at)?,
                    intensity: self.declare(intensity, at)?,
                    phase: self.declare(phase, at)?,
                    index: self.declare(index, at)?,
                };
                Node::EachPoint {
                    source,
                    slots,
                    body: self.block(body, &field("body"))?,
                }
            }
            Instr::Set { name, value } => {
                let code = self.code(value, &field("value"))?;
                Node::Set(self.declare(name, at)?, code)
            }
            Instr::Repeat { count, var, body } => {
                let count = self.code(count, &field("count"))?;
                let var = var.as_deref().map(|v| self.declare(v, at)).transpose()?;
                Node::Repeat {
                    count,
                    var,
                    body: self.block(body, &field("body"))?,
                }
            }
            Instr::If {
                cond,
                then,
                otherwise,
            } => Node::If {
                cond: self.code(cond, &field("cond"))?,
                then: self.block(then, &field("then"))?,
                otherwise: self.block(otherwise, &field("else"))?,
            },
            Instr::When { param, is, body } => {
                let Some(spec) = self.schema.get(param) else {
                    return Err(format!("{at}: unknown parameter \"{param}\""));
                };
                Node::When {
                    param: param.clone(),
                    expected: is.clone(),
                    default: spec.default.clone(),
                    body: self.block(body, &field("body"))?,
                }
            }
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/script/compile.rs"]
mod tests;
