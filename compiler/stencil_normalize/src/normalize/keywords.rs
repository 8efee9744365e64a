//! Keyword desugaring.
//!
//! Each keyword has a fixed argument shape; anything else is an E2011
//! error naming the keyword as written (`(if)`, `{{yield}}`, `{{#each}}`).

use stencil_diagnostic::{CompileResult, ErrorCode};
use stencil_ir::ast::{self, Expression, Hash, LiteralValue};
use stencil_ir::norm::{
    AppendContent, Args, Block, BlockRef, Content, CurriedType, CurryExpr, EachContent,
    EvalContent, Expr, IfContent, IfInline, InElement, InvokeBlock, LetContent, PartialContent,
    WithContent, WithDynamicVars, YieldContent,
};
use stencil_ir::{Span, Spanned};
use tracing::trace;

use super::Normalizer;
use crate::keywords::{AppendKeyword, BlockKeyword, ExprKeyword};

impl Normalizer<'_> {
    // ─── Expression keywords ───

    /// `(keyword ...)`. Also reached from `{{keyword ...}}` and
    /// `attr={{keyword ...}}`; `label` names the form as written.
    pub(crate) fn expr_keyword(
        &mut self,
        keyword: ExprKeyword,
        label: &str,
        params: &[Expression],
        hash: &Hash,
        span: Span,
    ) -> CompileResult<Expr> {
        trace!(keyword = keyword.name(), "desugaring expression keyword");
        match keyword {
            ExprKeyword::If | ExprKeyword::Unless => {
                self.check_positional(label, params, 2, Some(3), span)?;
                self.check_named(label, hash, &[])?;
                let mut condition = self.argument(&params[0])?;
                if keyword == ExprKeyword::Unless {
                    condition = Expr::Not(Box::new(condition));
                }
                let truthy = self.argument(&params[1])?;
                let falsy = params.get(2).map(|falsy| self.argument(falsy)).transpose()?;
                Ok(Expr::IfInline(IfInline {
                    condition: Box::new(condition),
                    truthy: Box::new(truthy),
                    falsy: falsy.map(Box::new),
                    span,
                }))
            }
            ExprKeyword::HasBlock | ExprKeyword::HasBlockParams => {
                self.check_positional(label, params, 0, Some(1), span)?;
                self.check_named(label, hash, &[])?;
                let name = match params.first() {
                    None => "default",
                    Some(Expression::Literal(ast::Literal {
                        value: LiteralValue::String(name),
                        ..
                    })) => name.as_str(),
                    Some(other) => {
                        return Err(self.structure_error(
                            ErrorCode::E2011,
                            format!(
                                "`{label}` can only receive a string literal as its first argument"
                            ),
                            other.span(),
                        ));
                    }
                };
                let block = BlockRef {
                    slot: self.symbols.allocate_block(name),
                    span,
                };
                Ok(if keyword == ExprKeyword::HasBlock {
                    Expr::HasBlock(block)
                } else {
                    Expr::HasBlockParams(block)
                })
            }
            ExprKeyword::Component | ExprKeyword::Helper | ExprKeyword::Modifier => {
                let curried = match keyword {
                    ExprKeyword::Component => CurriedType::Component,
                    ExprKeyword::Helper => CurriedType::Helper,
                    _ => CurriedType::Modifier,
                };
                let (definition, args) = self.definition_and_args(label, params, hash, span)?;
                Ok(Expr::Curry(CurryExpr {
                    definition: Box::new(definition),
                    curried,
                    args,
                    span,
                }))
            }
            ExprKeyword::Log => {
                self.check_named(label, hash, &[])?;
                Ok(Expr::Log(self.args(params, hash, span)?))
            }
            ExprKeyword::GetDynamicVar => {
                self.check_positional(label, params, 1, Some(1), span)?;
                self.check_named(label, hash, &[])?;
                Ok(Expr::GetDynamicVar(Box::new(self.argument(&params[0])?)))
            }
        }
    }

    // ─── Append keywords ───

    /// `{{keyword ...}}` in content.
    pub(crate) fn append_keyword(
        &mut self,
        keyword: AppendKeyword,
        mustache: &ast::MustacheStatement,
    ) -> CompileResult<Content> {
        let params = &mustache.params;
        let hash = &mustache.hash;
        let span = mustache.span;
        match keyword {
            AppendKeyword::Yield => {
                let label = "{{yield}}";
                self.check_named(label, hash, &["to"])?;
                let to = match hash.get("to") {
                    None => "default",
                    Some(ast::HashPair {
                        value:
                            Expression::Literal(ast::Literal {
                                value: LiteralValue::String(to),
                                ..
                            }),
                        ..
                    }) => to.as_str(),
                    Some(pair) => {
                        return Err(self.structure_error(
                            ErrorCode::E2011,
                            "you can only yield to a literal string value",
                            pair.span,
                        ));
                    }
                };
                let target = self.symbols.allocate_block(to);
                trace!(to, target, "yield target");
                let positional = params
                    .iter()
                    .map(|param| self.argument(param))
                    .collect::<CompileResult<Vec<_>>>()?;
                Ok(Content::Yield(YieldContent {
                    target,
                    positional,
                    span,
                }))
            }
            AppendKeyword::Partial => {
                let label = "{{partial}}";
                if self.strict {
                    return Err(self.resolution_error(
                        ErrorCode::E3004,
                        format!("`{label}` is not allowed in strict mode templates"),
                        span,
                    ));
                }
                self.check_positional(label, params, 1, Some(1), span)?;
                self.check_named(label, hash, &[])?;
                let target = self.argument(&params[0])?;
                self.symbols.set_has_eval();
                Ok(Content::Partial(PartialContent {
                    target,
                    eval: self.symbols.eval_info(),
                    span,
                }))
            }
            AppendKeyword::Debugger => {
                let label = "{{debugger}}";
                self.check_positional(label, params, 0, Some(0), span)?;
                self.check_named(label, hash, &[])?;
                self.symbols.set_has_eval();
                Ok(Content::Debugger(EvalContent {
                    eval: self.symbols.eval_info(),
                    span,
                }))
            }
            AppendKeyword::Component => {
                let (callee, args) =
                    self.definition_and_args("{{component}}", params, hash, span)?;
                Ok(Content::InvokeDynamicComponent(InvokeBlock {
                    callee,
                    args,
                    blocks: Vec::new(),
                    span,
                }))
            }
            AppendKeyword::Expr(keyword) => {
                let label = format!("{{{{{}}}}}", keyword.name());
                let value = self.expr_keyword(keyword, &label, params, hash, span)?;
                Ok(Content::Append(AppendContent {
                    value,
                    trusting: mustache.trusting,
                    span,
                }))
            }
        }
    }

    // ─── Block keywords ───

    /// `{{#keyword ...}}...{{/keyword}}`.
    pub(crate) fn block_keyword(
        &mut self,
        keyword: BlockKeyword,
        block: &ast::BlockStatement,
    ) -> CompileResult<Content> {
        let label = &format!("{{{{#{}}}}}", keyword.name());
        let params = &block.params;
        let hash = &block.hash;
        let span = block.span;
        trace!(keyword = keyword.name(), "desugaring block keyword");
        match keyword {
            BlockKeyword::If | BlockKeyword::Unless => {
                self.check_positional(label, params, 1, Some(1), span)?;
                self.check_named(label, hash, &[])?;
                let mut condition = self.argument(&params[0])?;
                if keyword == BlockKeyword::Unless {
                    condition = Expr::Not(Box::new(condition));
                }
                let (program, inverse) = self.program_and_inverse(block)?;
                Ok(Content::If(IfContent {
                    condition,
                    block: program,
                    inverse,
                    span,
                }))
            }
            BlockKeyword::Each => {
                self.check_positional(label, params, 1, Some(1), span)?;
                self.check_named(label, hash, &["key"])?;
                let value = self.argument(&params[0])?;
                let key = hash
                    .get("key")
                    .map(|pair| self.argument(&pair.value))
                    .transpose()?;
                let (program, inverse) = self.program_and_inverse(block)?;
                Ok(Content::Each(EachContent {
                    value,
                    key,
                    block: program,
                    inverse,
                    span,
                }))
            }
            BlockKeyword::With => {
                self.check_positional(label, params, 1, Some(1), span)?;
                self.check_named(label, hash, &[])?;
                let value = self.argument(&params[0])?;
                let (program, inverse) = self.program_and_inverse(block)?;
                Ok(Content::With(WithContent {
                    value,
                    block: program,
                    inverse,
                    span,
                }))
            }
            BlockKeyword::Let => {
                self.check_positional(label, params, 1, None, span)?;
                self.check_named(label, hash, &[])?;
                self.check_no_inverse(label, block)?;
                let positional = params
                    .iter()
                    .map(|param| self.argument(param))
                    .collect::<CompileResult<Vec<_>>>()?;
                Ok(Content::Let(LetContent {
                    positional,
                    block: self.block(&block.program)?,
                    span,
                }))
            }
            BlockKeyword::InElement => {
                if let Some(pair) = hash.get("guid") {
                    return Err(self.structure_error(
                        ErrorCode::E2011,
                        format!("Cannot pass `guid` to `{label}`"),
                        pair.span,
                    ));
                }
                self.check_positional(label, params, 1, Some(1), span)?;
                self.check_named(label, hash, &["insertBefore"])?;
                self.check_no_inverse(label, block)?;
                let guid = self.next_cursor();
                let destination = self.argument(&params[0])?;
                let insert_before = hash
                    .get("insertBefore")
                    .map(|pair| self.argument(&pair.value))
                    .transpose()?;
                Ok(Content::InElement(InElement {
                    guid,
                    destination,
                    insert_before,
                    block: self.block(&block.program)?,
                    span,
                }))
            }
            BlockKeyword::Component => {
                let (callee, args) = self.definition_and_args(label, params, hash, span)?;
                let blocks = self.block_statement_blocks(block)?;
                Ok(Content::InvokeDynamicComponent(InvokeBlock {
                    callee,
                    args,
                    blocks,
                    span,
                }))
            }
            BlockKeyword::WithDynamicVars => {
                self.check_positional(label, params, 0, Some(0), span)?;
                if hash.is_empty() {
                    return Err(self.structure_error(
                        ErrorCode::E2011,
                        format!("`{label}` requires at least one named argument"),
                        span,
                    ));
                }
                self.check_no_inverse(label, block)?;
                let named = self.named_args(hash)?;
                Ok(Content::WithDynamicVars(WithDynamicVars {
                    named,
                    block: self.block(&block.program)?,
                    span,
                }))
            }
        }
    }

    // ─── Shapes ───

    fn program_and_inverse(
        &mut self,
        block: &ast::BlockStatement,
    ) -> CompileResult<(Block, Option<Block>)> {
        let program = self.block(&block.program)?;
        let inverse = block
            .inverse
            .as_ref()
            .map(|inverse| self.block(inverse))
            .transpose()?;
        Ok((program, inverse))
    }

    /// First positional argument as a component/helper/modifier
    /// definition; the rest, with the hash, curried onto it.
    fn definition_and_args(
        &mut self,
        label: &str,
        params: &[Expression],
        hash: &Hash,
        span: Span,
    ) -> CompileResult<(Expr, Args)> {
        self.check_positional(label, params, 1, None, span)?;
        if self.strict && matches!(params[0], Expression::Literal(_)) {
            return Err(self.resolution_error(
                ErrorCode::E3004,
                format!(
                    "`{label}` cannot resolve a definition by name in strict mode templates; pass the definition itself"
                ),
                params[0].span(),
            ));
        }
        let definition = self.argument(&params[0])?;
        let args = self.args(&params[1..], hash, span)?;
        Ok((definition, args))
    }

    fn check_positional(
        &self,
        label: &str,
        params: &[Expression],
        min: usize,
        max: Option<usize>,
        span: Span,
    ) -> CompileResult<()> {
        let count = params.len();
        if count >= min && max.map_or(true, |max| count <= max) {
            return Ok(());
        }
        let expected = match max {
            Some(max) if max == min => format!("exactly {min}"),
            Some(max) => format!("between {min} and {max}"),
            None => format!("at least {min}"),
        };
        let noun = if min == 1 && max.map_or(true, |max| max == 1) {
            "argument"
        } else {
            "arguments"
        };
        Err(self.structure_error(
            ErrorCode::E2011,
            format!("`{label}` requires {expected} positional {noun}, but received {count}"),
            span,
        ))
    }

    fn check_named(&self, label: &str, hash: &Hash, allowed: &[&str]) -> CompileResult<()> {
        let Some(pair) = hash
            .pairs
            .iter()
            .find(|pair| !allowed.contains(&pair.key.as_str()))
        else {
            return Ok(());
        };
        let message = if allowed.is_empty() {
            format!(
                "`{label}` does not take any named arguments, but received `{}`",
                pair.key
            )
        } else {
            format!(
                "`{label}` does not take a named argument `{}`; it only accepts `{}`",
                pair.key,
                allowed.join("`, `")
            )
        };
        Err(self.structure_error(ErrorCode::E2011, message, pair.span))
    }

    fn check_no_inverse(&self, label: &str, block: &ast::BlockStatement) -> CompileResult<()> {
        match &block.inverse {
            None => Ok(()),
            Some(inverse) => Err(self.structure_error(
                ErrorCode::E2011,
                format!("`{label}` cannot receive an {{{{else}}}} block"),
                inverse.span,
            )),
        }
    }
}
