//! Expression encoding.

use stencil_ir::norm::{Expr, PathRef, VariableKind};
use stencil_stack::ensure_sufficient_stack;

use super::{hash, params};
use crate::program::Expression;
use crate::SexpOpcode;

pub(super) fn expr(node: &Expr) -> Expression {
    match node {
        Expr::Literal(literal) => Expression::Literal(literal.value.clone()),
        Expr::Path(path) => path_ref(path),
        Expr::Call(call) => ensure_sufficient_stack(|| Expression::Call {
            callee: Box::new(expr(&call.callee)),
            params: params(&call.args.positional),
            hash: hash(&call.args.named),
        }),
        Expr::Interpolate(concat) => {
            Expression::Concat(concat.parts.iter().map(expr).collect())
        }
        Expr::HasBlock(block) => Expression::HasBlock(Box::new(Expression::symbol(block.slot))),
        Expr::HasBlockParams(block) => {
            Expression::HasBlockParams(Box::new(Expression::symbol(block.slot)))
        }
        Expr::Curry(curry) => ensure_sufficient_stack(|| Expression::Curry {
            definition: Box::new(expr(&curry.definition)),
            curried: curry.curried,
            params: params(&curry.args.positional),
            hash: hash(&curry.args.named),
        }),
        Expr::Not(value) => Expression::Not(Box::new(ensure_sufficient_stack(|| expr(value)))),
        Expr::IfInline(inline) => ensure_sufficient_stack(|| Expression::IfInline {
            condition: Box::new(expr(&inline.condition)),
            truthy: Box::new(expr(&inline.truthy)),
            falsy: inline.falsy.as_deref().map(|falsy| Box::new(expr(falsy))),
        }),
        Expr::GetDynamicVar(name) => Expression::GetDynamicVar(Box::new(expr(name))),
        Expr::Log(args) => Expression::Log(params(&args.positional)),
    }
}

fn path_ref(path: &PathRef) -> Expression {
    let tail = path.tail.clone();
    match path.var.kind {
        VariableKind::This => Expression::GetSymbol { slot: 0, tail },
        VariableKind::Local(slot) | VariableKind::Arg(slot) => {
            Expression::GetSymbol { slot, tail }
        }
        VariableKind::Free { upvar, resolution } => Expression::GetFree {
            op: SexpOpcode::for_resolution(resolution),
            upvar,
            tail,
        },
    }
}
