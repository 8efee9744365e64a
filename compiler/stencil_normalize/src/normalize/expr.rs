//! Expression normalization: paths, literals, sub-expressions and
//! argument lists.

use stencil_diagnostic::CompileResult;
use stencil_ir::ast::{self, Expression, Hash};
use stencil_ir::norm::{Args, CallExpr, Expr, Interpolate, LiteralExpr, NamedArg};
use stencil_ir::Span;
use stencil_stack::ensure_sufficient_stack;

use super::{args_span, Normalizer};
use crate::keywords::ExprKeyword;
use crate::resolution::SyntaxContext;

impl Normalizer<'_> {
    /// Normalize `expr` appearing in `context`.
    pub(crate) fn expr(
        &mut self,
        expr: &Expression,
        context: SyntaxContext,
    ) -> CompileResult<Expr> {
        match expr {
            Expression::Literal(literal) => Ok(Expr::Literal(LiteralExpr {
                value: literal.value.clone(),
                span: literal.span,
            })),
            Expression::Path(path) => self.path(path, context).map(Expr::Path),
            Expression::SubExpression(sexpr) => {
                ensure_sufficient_stack(|| self.sub_expression(sexpr))
            }
        }
    }

    /// A positional or named argument value.
    pub(crate) fn argument(&mut self, expr: &Expression) -> CompileResult<Expr> {
        self.expr(expr, SyntaxContext::Argument)
    }

    pub(crate) fn args(
        &mut self,
        params: &[Expression],
        hash: &Hash,
        fallback: Span,
    ) -> CompileResult<Args> {
        let positional = params
            .iter()
            .map(|param| self.argument(param))
            .collect::<CompileResult<Vec<_>>>()?;
        let named = self.named_args(hash)?;
        Ok(Args {
            positional,
            named,
            span: args_span(params, hash, fallback),
        })
    }

    pub(crate) fn named_args(&mut self, hash: &Hash) -> CompileResult<Vec<NamedArg>> {
        hash.pairs
            .iter()
            .map(|pair| {
                Ok(NamedArg {
                    name: pair.key.clone(),
                    value: self.argument(&pair.value)?,
                    span: pair.span,
                })
            })
            .collect()
    }

    /// `(callee ...)`
    fn sub_expression(&mut self, sexpr: &ast::SubExpression) -> CompileResult<Expr> {
        let keyword = self.keyword_name(&sexpr.path).and_then(ExprKeyword::from_name);
        if let Some(keyword) = keyword {
            let label = format!("({})", keyword.name());
            return self.expr_keyword(keyword, &label, &sexpr.params, &sexpr.hash, sexpr.span);
        }
        self.call(
            &sexpr.path,
            &sexpr.params,
            &sexpr.hash,
            SyntaxContext::Sexp,
            sexpr.span,
        )
    }

    /// Invocation of `callee` with arguments.
    pub(crate) fn call(
        &mut self,
        callee: &Expression,
        params: &[Expression],
        hash: &Hash,
        context: SyntaxContext,
        span: Span,
    ) -> CompileResult<Expr> {
        let callee = self.expr(callee, context)?;
        let args = self.args(params, hash, span)?;
        Ok(Expr::Call(CallExpr {
            callee: Box::new(callee),
            args,
            span,
        }))
    }

    // ─── Attribute values ───

    pub(crate) fn attr_value(&mut self, value: &ast::AttrValue) -> CompileResult<Expr> {
        match value {
            ast::AttrValue::Text(text) => Ok(text_literal(text)),
            ast::AttrValue::Mustache(mustache) => self.attr_mustache(mustache),
            ast::AttrValue::Concat(concat) => {
                let parts = concat
                    .parts
                    .iter()
                    .map(|part| match part {
                        ast::ConcatPart::Text(text) => Ok(text_literal(text)),
                        ast::ConcatPart::Mustache(mustache) => self.attr_mustache(mustache),
                    })
                    .collect::<CompileResult<Vec<_>>>()?;
                Ok(Expr::Interpolate(Interpolate {
                    parts,
                    span: concat.span,
                }))
            }
        }
    }

    /// `attr={{...}}`, `@arg={{...}}` or one part of a quoted value.
    fn attr_mustache(&mut self, mustache: &ast::MustacheStatement) -> CompileResult<Expr> {
        let keyword = self
            .keyword_name(&mustache.path)
            .and_then(ExprKeyword::from_name);
        if let Some(keyword) = keyword {
            let label = format!("{{{{{}}}}}", keyword.name());
            return self.expr_keyword(
                keyword,
                &label,
                &mustache.params,
                &mustache.hash,
                mustache.span,
            );
        }
        if mustache.params.is_empty() && mustache.hash.is_empty() {
            return self.expr(&mustache.path, SyntaxContext::AttrValue { invoke: false });
        }
        self.call(
            &mustache.path,
            &mustache.params,
            &mustache.hash,
            SyntaxContext::AttrValue { invoke: true },
            mustache.span,
        )
    }
}

fn text_literal(text: &ast::TextNode) -> Expr {
    Expr::Literal(LiteralExpr {
        value: ast::LiteralValue::String(text.chars.clone()),
        span: text.span,
    })
}
