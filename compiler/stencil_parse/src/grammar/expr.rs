//! Expressions: paths, sub-expressions, literals, params and hashes.

use stencil_diagnostic::CompileResult;
use stencil_ir::ast::{
    Expression, Hash, HashPair, Literal, LiteralValue, PathExpression, SubExpression,
};
use stencil_ir::{Span, Spanned};
use stencil_stack::ensure_sufficient_stack;

use super::path::{id, prepare_path, Segment};
use super::{Parser, EXPR_START};
use crate::lexer::TokenKind;

impl Parser<'_> {
    /// `expr param* hash?`, the inside of every mustache form.
    pub(super) fn call(&mut self) -> CompileResult<(Expression, Vec<Expression>, Hash)> {
        let path = self.expr()?;
        let params = self.params()?;
        let hash = self.hash()?;
        Ok((path, params, hash))
    }

    fn starts_expr(&self) -> bool {
        let kind = self.cursor.current_kind();
        if matches!(kind, TokenKind::Id(_)) && matches!(self.cursor.peek(1).kind, TokenKind::Equals)
        {
            return false;
        }
        EXPR_START.contains(&kind.name())
    }

    fn params(&mut self) -> CompileResult<Vec<Expression>> {
        let mut params = Vec::new();
        while self.starts_expr() {
            params.push(self.expr()?);
        }
        Ok(params)
    }

    /// `key=value` pairs. An empty hash gets a point span where it would
    /// have started.
    fn hash(&mut self) -> CompileResult<Hash> {
        let mut pairs = Vec::new();
        while let TokenKind::Id(raw) = self.cursor.current_kind() {
            if !matches!(self.cursor.peek(1).kind, TokenKind::Equals) {
                break;
            }
            let start = self.cursor.current_span().start;
            self.cursor.advance();
            self.cursor.advance();
            let value = self.expr()?;
            let span = Span::new(start, value.span().end);
            pairs.push(HashPair {
                key: id(raw).to_owned(),
                value,
                span,
            });
        }
        let span = match (pairs.first(), pairs.last()) {
            (Some(first), Some(last)) => first.span.merge(last.span),
            _ => Span::point(self.cursor.previous_span().end),
        };
        Ok(Hash { pairs, span })
    }

    pub(super) fn expr(&mut self) -> CompileResult<Expression> {
        let token = self.cursor.current();
        let value = match &token.kind {
            TokenKind::OpenSexpr => {
                return ensure_sufficient_stack(|| self.sexpr()).map(Expression::SubExpression)
            }
            TokenKind::Data => {
                self.cursor.advance();
                return self.path(true, token.span.start).map(Expression::Path);
            }
            TokenKind::Id(_) => return self.path(false, token.span.start).map(Expression::Path),
            TokenKind::String(s) => LiteralValue::String(s.clone()),
            TokenKind::Number(n) => LiteralValue::Number(*n),
            TokenKind::Boolean(b) => LiteralValue::Boolean(*b),
            TokenKind::Undefined => LiteralValue::Undefined,
            TokenKind::Null => LiteralValue::Null,
            _ => return Err(self.unexpected(EXPR_START)),
        };
        self.cursor.advance();
        Ok(Expression::Literal(Literal {
            value,
            span: token.span,
        }))
    }

    /// `ID (SEP ID)*`, after the `@` for data paths.
    fn path(&mut self, data: bool, start: u32) -> CompileResult<PathExpression> {
        let mut segments = Vec::new();
        let mut separator = None;
        loop {
            let TokenKind::Id(raw) = self.cursor.current_kind() else {
                return Err(self.unexpected(&["ID"]));
            };
            segments.push(Segment {
                separator,
                raw: raw.as_str(),
            });
            self.cursor.advance();
            match self.cursor.current_kind() {
                TokenKind::Sep(sep) => {
                    separator = Some(*sep);
                    self.cursor.advance();
                }
                _ => break,
            }
        }
        let span = Span::new(start, self.cursor.previous_span().end);
        prepare_path(data, &segments, span, self.index)
    }

    /// `( expr param* hash? )`
    fn sexpr(&mut self) -> CompileResult<SubExpression> {
        let start = self.cursor.advance().span.start;
        let (path, params, hash) = self.call()?;
        if !matches!(self.cursor.current_kind(), TokenKind::CloseSexpr) {
            return Err(self.unexpected_after_params(&["CLOSE_SEXPR"]));
        }
        let end = self.cursor.advance().span.end;
        self.check_callee(&path)?;
        Ok(SubExpression {
            path: Box::new(path),
            params,
            hash,
            span: Span::new(start, end),
        })
    }
}
