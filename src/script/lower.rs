use crate::script::ast::{BinaryOp, Expr, Lit, UnaryOp};
use crate::script::bytecode::{BytecodeProgram, ConstVal, Op};
use crate::script::error::ExprError;

pub(crate) fn lower_to_bytecode(expr: &Expr) -> Result<BytecodeProgram, ExprError> {
    let mut p = BytecodeProgram::new();
    lower_expr(expr, &mut p)?;
    Ok(p)
}

fn lower_expr(e: &Expr, out: &mut BytecodeProgram) -> Result<(), ExprError> {
    match e {
        Expr::Lit(Lit::F64(v)) => {
            let idx = out.push_const(ConstVal::F64(*v));
            out.ops.push(Op::PushConst(idx));
        }
        Expr::Lit(Lit::Bool(v)) => {
            let idx = out.push_const(ConstVal::Bool(*v));
            out.ops.push(Op::PushConst(idx));
        }
        Expr::Load(slot) => out.ops.push(Op::Load(*slot)),
        Expr::Unary { op, expr } => {
            lower_expr(expr, out)?;
            out.ops.push(match op {
                UnaryOp::Neg => Op::Neg,
                UnaryOp::Not => Op::Not,
            });
        }
        Expr::Binary { op, left, right } => {
            lower_expr(left, out)?;
            lower_expr(right, out)?;
            out.ops.push(match op {
                BinaryOp::Add => Op::Add,
                BinaryOp::Sub => Op::Sub,
                BinaryOp::Mul => Op::Mul,
                BinaryOp::Div => Op::Div,
                BinaryOp::Mod => Op::Mod,
                BinaryOp::Eq => Op::Eq,
                BinaryOp::Ne => Op::Ne,
                BinaryOp::Lt => Op::Lt,
                BinaryOp::Le => Op::Le,
                BinaryOp::Gt => Op::Gt,
                BinaryOp::Ge => Op::Ge,
                BinaryOp::And => Op::And,
                BinaryOp::Or => Op::Or,
            });
        }
        Expr::Cond {
            cond,
            then,
            otherwise,
        } => {
            lower_expr(cond, out)?;
            let to_else = out.ops.len();
            out.ops.push(Op::JumpIfFalse(0));
            lower_expr(then, out)?;
            let to_end = out.ops.len();
            out.ops.push(Op::Jump(0));
            out.ops[to_else] = Op::JumpIfFalse(label(out)?);
            lower_expr(otherwise, out)?;
            out.ops[to_end] = Op::Jump(label(out)?);
        }
        Expr::Builtin { id, args } => {
            for a in args {
                lower_expr(a, out)?;
            }
            out.ops.push(Op::CallBuiltin(*id));
        }
        Expr::Call { func, .. } => {
            return Err(ExprError::new(
                0,
                format!("unresolved call to \"{func}\"; bind before lowering"),
            ));
        }
        Expr::Path(p) => {
            return Err(ExprError::new(
                0,
                format!("unresolved path \"{}\"; bind before lowering", p.join(".")),
            ));
        }
    }
    Ok(())
}

fn label(out: &BytecodeProgram) -> Result<u32, ExprError> {
    u32::try_from(out.ops.len()).map_err(|_| ExprError::new(0, "expression too large"))
}

#[cfg(test)]
#[path = "../../tests/unit/script/lower.rs"]
mod tests;
