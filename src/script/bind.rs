use std::collections::HashMap;

use crate::script::ast::{Expr, Lit};
use crate::script::bytecode::{BuiltinId, Slot};
use crate::script::error::ExprError;

/// What a bare name stands for while binding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Binding {
    Const(f64),
    Slot(Slot),
}

/// Names visible to expressions, split so `params.x` only ever sees parameters.
#[derive(Debug, Default)]
pub(crate) struct BindCtx {
    pub(crate) names: HashMap<String, Binding>,
    pub(crate) params: HashMap<String, Slot>,
}

pub(crate) fn bind_expr(e: Expr, ctx: &BindCtx) -> Result<Expr, ExprError> {
    match e {
        Expr::Lit(_) | Expr::Load(_) => Ok(e),
        Expr::Unary { op, expr } => Ok(Expr::Unary {
            op,
            expr: Box::new(bind_expr(*expr, ctx)?),
        }),
        Expr::Binary { op, left, right } => Ok(Expr::Binary {
            op,
            left: Box::new(bind_expr(*left, ctx)?),
            right: Box::new(bind_expr(*right, ctx)?),
        }),
        Expr::Cond {
            cond,
            then,
            otherwise,
        } => Ok(Expr::Cond {
            cond: Box::new(bind_expr(*cond, ctx)?),
            then: Box::new(bind_expr(*then, ctx)?),
            otherwise: Box::new(bind_expr(*otherwise, ctx)?),
        }),
        Expr::Call { func, args } => {
            let id = BuiltinId::from_name(&func)
                .ok_or_else(|| ExprError::new(0, format!("unknown function \"{func}\"")))?;
            if args.len() != id.arity() {
                return Err(ExprError::new(
                    0,
                    format!(
                        "{func} expects {} argument(s), got {}",
                        id.arity(),
                        args.len()
                    ),
                ));
            }
            let args = args
                .into_iter()
                .map(|a| bind_expr(a, ctx))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Expr::Builtin { id, args })
        }
        Expr::Builtin { id, args } => Ok(Expr::Builtin {
            id,
            args: args
                .into_iter()
                .map(|a| bind_expr(a, ctx))
                .collect::<Result<Vec<_>, _>>()?,
        }),
        Expr::Path(p) => bind_path(&p, ctx),
    }
}

fn bind_path(p: &[String], ctx: &BindCtx) -> Result<Expr, ExprError> {
    match p {
        [name] => match ctx.names.get(name) {
            Some(Binding::Const(v)) => Ok(Expr::Lit(Lit::F64(*v))),
            Some(Binding::Slot(slot)) => Ok(Expr::Load(*slot)),
            None => Err(ExprError::new(0, format!("unknown identifier \"{name}\""))),
        },
        [ns, name] if ns == "params" => ctx
            .params
            .get(name)
            .map(|slot| Expr::Load(*slot))
            .ok_or_else(|| ExprError::new(0, format!("unknown numeric parameter \"{name}\""))),
        [] => Err(ExprError::new(0, "empty path")),
        _ => Err(ExprError::new(
            0,
            format!("unknown path \"{}\"", p.join(".")),
        )),
    }
}
