use crate::script::bytecode::{BuiltinId, BytecodeProgram, ConstVal, Op, Slot};

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum ValueSlot {
    F64(f64),
    Bool(bool),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct VmError {
    pub(crate) message: String,
}

impl VmError {
    pub(crate) fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
        }
    }
}

impl std::fmt::Display for VmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for VmError {}

pub(crate) const BUDGET_EXHAUSTED: &str = "instruction budget exhausted";

/// Evaluate `p`, charging one unit of `fuel` per executed op.
///
/// `load` reads environment slots; `rand` supplies `rand()` values.
pub(crate) fn eval_program_with_stack(
    p: &BytecodeProgram,
    stack: &mut Vec<ValueSlot>,
    fuel: &mut u64,
    mut load: impl FnMut(Slot) -> Result<ValueSlot, VmError>,
    mut rand: impl FnMut() -> f64,
) -> Result<ValueSlot, VmError> {
    stack.clear();

    let mut pc = 0usize;
    while let Some(&op) = p.ops.get(pc) {
        if *fuel == 0 {
            return Err(VmError::new(BUDGET_EXHAUSTED));
        }
        *fuel -= 1;
        pc += 1;

        match op {
            Op::PushConst(idx) => {
                let c = p
                    .consts
                    .get(idx.0 as usize)
                    .ok_or_else(|| VmError::new("const idx out of range"))?;
                stack.push(match *c {
                    ConstVal::F64(v) => ValueSlot::F64(v),
                    ConstVal::Bool(v) => ValueSlot::Bool(v),
                });
            }
            Op::Load(slot) => stack.push(load(slot)?),

            Op::Neg => {
                let v = pop_f64(stack)?;
                stack.push(ValueSlot::F64(-v));
            }
            Op::Not => {
                let v = pop_bool(stack)?;
                stack.push(ValueSlot::Bool(!v));
            }
            Op::Add => bin_f64(stack, |a, b| a + b)?,
            Op::Sub => bin_f64(stack, |a, b| a - b)?,
            Op::Mul => bin_f64(stack, |a, b| a * b)?,
            Op::Div => bin_f64(stack, |a, b| a / b)?,
            Op::Mod => bin_f64(stack, |a, b| a % b)?,

            Op::Eq => bin_eq(stack, true)?,
            Op::Ne => bin_eq(stack, false)?,
            Op::Lt => bin_cmp(stack, |a, b| a < b)?,
            Op::Le => bin_cmp(stack, |a, b| a <= b)?,
            Op::Gt => bin_cmp(stack, |a, b| a > b)?,
            Op::Ge => bin_cmp(stack, |a, b| a >= b)?,

            Op::And => {
                let b = pop_bool(stack)?;
                let a = pop_bool(stack)?;
                stack.push(ValueSlot::Bool(a && b));
            }
            Op::Or => {
                let b = pop_bool(stack)?;
                let a = pop_bool(stack)?;
                stack.push(ValueSlot::Bool(a || b));
            }

            Op::JumpIfFalse(target) => {
                if !pop_bool(stack)? {
                    pc = target as usize;
                }
            }
            Op::Jump(target) => pc = target as usize,

            Op::CallBuiltin(id) => call_builtin(stack, id, &mut rand)?,
        }
    }

    match (stack.pop(), stack.is_empty()) {
        (Some(v), true) => Ok(v),
        _ => Err(VmError::new("malformed program: stack not balanced")),
    }
}

impl ValueSlot {
    /// Numbers count as true when non-zero.
    pub(crate) fn truthy(self) -> bool {
        match self {
            Self::Bool(v) => v,
            Self::F64(v) => v != 0.0 && !v.is_nan(),
        }
    }

    pub(crate) fn as_f64(self) -> Result<f64, VmError> {
        match self {
            Self::F64(v) => Ok(v),
            Self::Bool(_) => Err(VmError::new("expected a number, got a bool")),
        }
    }
}

fn pop(stack: &mut Vec<ValueSlot>) -> Result<ValueSlot, VmError> {
    stack.pop().ok_or_else(|| VmError::new("stack underflow"))
}

fn pop_f64(stack: &mut Vec<ValueSlot>) -> Result<f64, VmError> {
    pop(stack)?.as_f64()
}

fn pop_bool(stack: &mut Vec<ValueSlot>) -> Result<bool, VmError> {
    Ok(pop(stack)?.truthy())
}

fn bin_f64(stack: &mut Vec<ValueSlot>, f: impl FnOnce(f64, f64) -> f64) -> Result<(), VmError> {
    let b = pop_f64(stack)?;
    let a = pop_f64(stack)?;
    stack.push(ValueSlot::F64(f(a, b)));
    Ok(())
}

fn bin_cmp(stack: &mut Vec<ValueSlot>, f: impl FnOnce(f64, f64) -> bool) -> Result<(), VmError> {
    let b = pop_f64(stack)?;
    let a = pop_f64(stack)?;
    stack.push(ValueSlot::Bool(f(a, b)));
    Ok(())
}

fn bin_eq(stack: &mut Vec<ValueSlot>, is_eq: bool) -> Result<(), VmError> {
    let b = pop(stack)?;
    let a = pop(stack)?;
    let res = match (a, b) {
        (ValueSlot::Bool(a), ValueSlot::Bool(b)) => a == b,
        (a, b) => a.as_f64()? == b.as_f64()?,
    };
    stack.push(ValueSlot::Bool(if is_eq { res } else { !res }));
    Ok(())
}

fn call_builtin(
    stack: &mut Vec<ValueSlot>,
    id: BuiltinId,
    rand: &mut impl FnMut() -> f64,
) -> Result<(), VmError> {
    if stack.len() < id.arity() {
        return Err(VmError::new("stack underflow in builtin call"));
    }

    let v = match id {
        BuiltinId::Rand => rand(),
        BuiltinId::Sin => pop_f64(stack)?.sin(),
        BuiltinId::Cos => pop_f64(stack)?.cos(),
        BuiltinId::Tan => pop_f64(stack)?.tan(),
        BuiltinId::Abs => pop_f64(stack)?.abs(),
        BuiltinId::Floor => pop_f64(stack)?.floor(),
        BuiltinId::Ceil => pop_f64(stack)?.ceil(),
        BuiltinId::Round => round_half_up(pop_f64(stack)?),
        BuiltinId::Sqrt => pop_f64(stack)?.sqrt(),
        BuiltinId::Atan2 => {
            let x = pop_f64(stack)?;
            let y = pop_f64(stack)?;
            y.atan2(x)
        }
        BuiltinId::Min => {
            let b = pop_f64(stack)?;
            let a = pop_f64(stack)?;
            a.min(b)
        }
        BuiltinId::Max => {
            let b = pop_f64(stack)?;
            let a = pop_f64(stack)?;
            a.max(b)
        }
        BuiltinId::Pow => {
            let e = pop_f64(stack)?;
            let b = pop_f64(stack)?;
            b.powf(e)
        }
        BuiltinId::Clamp => {
            let hi = pop_f64(stack)?;
            let lo = pop_f64(stack)?;
            let x = pop_f64(stack)?;
            // `f64::clamp` panics on lo > hi or NaN bounds.
            x.max(lo).min(hi)
        }
        BuiltinId::Lerp => {
            let t = pop_f64(stack)?;
            let b = pop_f64(stack)?;
            let a = pop_f64(stack)?;
            a + (b - a) * t
        }
    };
    stack.push(ValueSlot::F64(v));
    Ok(())
}

/// Half-way cases round toward positive infinity (`round(-2.5) == -2`).
fn round_half_up(v: f64) -> f64 {
    (v + 0.5).floor()
}

#[cfg(test)]
#[path = "../../tests/unit/script/vm.rs"]
mod tests;
