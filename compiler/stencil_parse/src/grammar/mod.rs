//! Recursive descent parser for the mustache grammar.
//!
//! ```text
//! program     := statement*
//! statement   := CONTENT | COMMENT | mustache | block | partial
//! mustache    := OPEN call CLOSE | OPEN_UNESCAPED call CLOSE_UNESCAPED
//! block       := OPEN_BLOCK call blockParams? CLOSE program inverseChain? closeBlock
//! inverseChain:= INVERSE program
//!              | OPEN_INVERSE_CHAIN call blockParams? CLOSE program inverseChain?
//! closeBlock  := OPEN_ENDBLOCK expr CLOSE
//! partial     := OPEN_PARTIAL call CLOSE
//! call        := expr param* hash?
//! ```
//!
//! Expressions live in [`expr`]. Every error is fatal; there is no
//! recovery because a template with a broken mustache cannot be compiled.

mod expr;
mod path;

pub(crate) use path::id;

use stencil_diagnostic::{CompileError, CompileErrorKind, CompileResult, ErrorCode};
use stencil_ir::ast::{Expression, LiteralValue, MustacheStatement, PartialStatement, StripFlags};
use stencil_ir::{SourceIndex, Span, Spanned};
use stencil_stack::ensure_sufficient_stack;

use crate::cursor::Cursor;
use crate::hbs::{Block, Comment, Content, Program, Statement};
use crate::lexer::{Token, TokenKind};

/// Tokens that can start an expression.
const EXPR_START: &[&str] = &[
    "OPEN_SEXPR",
    "ID",
    "DATA",
    "STRING",
    "NUMBER",
    "BOOLEAN",
    "UNDEFINED",
    "NULL",
];

/// Parse a whole template into a mustache-level program.
pub(crate) fn parse_program(tokens: &[Token], index: &SourceIndex) -> CompileResult<Program> {
    let mut parser = Parser {
        cursor: Cursor::new(tokens),
        index,
    };
    let mut program = parser.program()?;
    if !parser.cursor.is_at_end() {
        return Err(parser.unexpected(&["EOF"]));
    }
    program.span = Span::new(0, parser.cursor.current_span().end);
    Ok(program)
}

pub(crate) struct Parser<'a> {
    cursor: Cursor<'a>,
    index: &'a SourceIndex,
}

impl Parser<'_> {
    // ─── Errors ───

    /// "Expecting ..., got ..." for the current token.
    #[cold]
    fn unexpected(&self, expected: &[&str]) -> CompileError {
        let token = self.cursor.current();
        let found = token.kind.name();
        let code = if token.kind == TokenKind::Eof {
            ErrorCode::E1002
        } else {
            ErrorCode::E1001
        };
        let listed: Vec<String> = expected.iter().map(|e| format!("'{e}'")).collect();
        let message = format!("Expecting {}, got '{found}'", listed.join(", "));
        CompileError::new(
            code,
            CompileErrorKind::Parse {
                expected: expected.iter().map(|e| (*e).to_owned()).collect(),
                found: found.to_owned(),
            },
            message,
            token.span,
            self.index,
        )
    }

    #[cold]
    fn unsupported(&self, message: &str) -> CompileError {
        CompileError::structure(
            ErrorCode::E1005,
            message,
            self.cursor.current_span(),
            self.index,
        )
    }

    /// `expected` followed by every expression start token.
    fn unexpected_after_params(&self, expected: &[&str]) -> CompileError {
        let mut all = expected.to_vec();
        all.extend_from_slice(EXPR_START);
        self.unexpected(&all)
    }

    // ─── Statements ───

    fn program(&mut self) -> CompileResult<Program> {
        let start = self.cursor.current_span().start;
        let mut body = Vec::new();
        while let Some(statement) = self.statement()? {
            body.push(statement);
        }
        let end = self.cursor.current_span().start;
        Ok(Program {
            body,
            block_params: Vec::new(),
            chained: false,
            span: Span::new(start, end.max(start)),
        })
    }

    /// Next statement, or `None` at a token that ends a program.
    fn statement(&mut self) -> CompileResult<Option<Statement>> {
        let token = self.cursor.current();
        let statement = match &token.kind {
            TokenKind::Content(value) => {
                self.cursor.advance();
                Statement::Content(Content::new(value.clone(), token.span))
            }
            TokenKind::Comment { value, strip } => {
                self.cursor.advance();
                Statement::Comment(Comment {
                    value: value.clone(),
                    strip: *strip,
                    span: token.span,
                })
            }
            TokenKind::Open { strip, ampersand } => self.mustache(*strip, *ampersand, false)?,
            TokenKind::OpenUnescaped(strip) => self.mustache(*strip, true, true)?,
            TokenKind::OpenBlock(strip) => {
                let strip = *strip;
                let block = ensure_sufficient_stack(|| self.block(strip))?;
                Statement::Block(Box::new(block))
            }
            TokenKind::OpenPartial(strip) => self.partial(*strip)?,
            TokenKind::OpenInverse(_) => {
                return Err(self.unsupported(
                    "Inverted sections (`{{^foo}}`) are not supported; use `{{#unless foo}}`",
                ))
            }
            TokenKind::OpenPartialBlock => {
                return Err(self.unsupported("Handlebars partial blocks are not supported"))
            }
            TokenKind::OpenDecorator => {
                return Err(self.unsupported("Handlebars decorators are not supported"))
            }
            TokenKind::OpenDecoratorBlock => {
                return Err(self.unsupported("Handlebars decorator blocks are not supported"))
            }
            TokenKind::OpenRawBlock => {
                return Err(self.unsupported("Handlebars raw blocks are not supported"))
            }
            _ => return Ok(None),
        };
        Ok(Some(statement))
    }

    fn mustache(
        &mut self,
        open_strip: bool,
        trusting: bool,
        unescaped: bool,
    ) -> CompileResult<Statement> {
        let start = self.cursor.advance().span.start;
        let (path, params, hash) = self.call()?;

        let close_strip = match self.cursor.current_kind() {
            TokenKind::Close(strip) if !unescaped => *strip,
            TokenKind::CloseUnescaped(strip) if unescaped => *strip,
            _ => {
                let close = if unescaped { "CLOSE_UNESCAPED" } else { "CLOSE" };
                return Err(self.unexpected_after_params(&[close]));
            }
        };
        let end = self.cursor.advance().span.end;

        if !params.is_empty() || !hash.is_empty() {
            self.check_callee(&path)?;
        }

        Ok(Statement::Mustache(MustacheStatement {
            path,
            params,
            hash,
            trusting,
            strip: StripFlags {
                open: open_strip,
                close: close_strip,
            },
            span: Span::new(start, end),
        }))
    }

    fn partial(&mut self, open_strip: bool) -> CompileResult<Statement> {
        let start = self.cursor.advance().span.start;
        let (name, params, hash) = self.call()?;
        let TokenKind::Close(close_strip) = *self.cursor.current_kind() else {
            return Err(self.unexpected_after_params(&["CLOSE"]));
        };
        let end = self.cursor.advance().span.end;
        Ok(Statement::Partial(PartialStatement {
            name,
            params,
            hash,
            strip: StripFlags {
                open: open_strip,
                close: close_strip,
            },
            span: Span::new(start, end),
        }))
    }

    // ─── Blocks ───

    fn block(&mut self, open_strip: bool) -> CompileResult<Block> {
        let start = self.cursor.advance().span.start;
        let (path, params, hash) = self.call()?;
        let block_params = self.block_params()?;
        let TokenKind::Close(open_close_strip) = *self.cursor.current_kind() else {
            return Err(self.unexpected_after_params(&["CLOSE", "OPEN_BLOCK_PARAMS"]));
        };
        self.cursor.advance();
        self.check_callee(&path)?;

        let mut program = self.program()?;
        program.block_params = block_params;
        let (mut inverse, inverse_strip) = self.inverse_chain()?;

        // closeBlock
        let TokenKind::OpenEndBlock(end_open_strip) = *self.cursor.current_kind() else {
            let expected: &[&str] = if inverse.is_some() {
                &["OPEN_ENDBLOCK"]
            } else {
                &["OPEN_ENDBLOCK", "INVERSE", "OPEN_INVERSE_CHAIN"]
            };
            return Err(self.unexpected(expected));
        };
        self.cursor.advance();
        let close_path = self.expr()?;
        let TokenKind::Close(end_close_strip) = *self.cursor.current_kind() else {
            return Err(self.unexpected(&["CLOSE"]));
        };
        let end = self.cursor.advance().span.end;

        let open_name = expression_original(&path);
        let close_name = expression_original(&close_path);
        if open_name != close_name {
            return Err(CompileError::structure(
                ErrorCode::E1004,
                format!("{open_name} doesn't match {close_name}"),
                path.span(),
                self.index,
            ));
        }

        let close_strip = StripFlags {
            open: end_open_strip,
            close: end_close_strip,
        };
        set_chain_close_strip(&mut inverse, close_strip);

        Ok(Block {
            path,
            params,
            hash,
            program,
            inverse,
            open_strip: StripFlags {
                open: open_strip,
                close: open_close_strip,
            },
            inverse_strip,
            close_strip,
            span: Span::new(start, end),
        })
    }

    /// `{{else}} program` or a chain of `{{else if ...}}` blocks.
    ///
    /// A chain link becomes a block statement wrapped in a `chained`
    /// program, so `{{#if a}}{{else if b}}{{/if}}` has the same shape as
    /// `{{#if a}}{{else}}{{#if b}}{{/if}}{{/if}}`.
    fn inverse_chain(&mut self) -> CompileResult<(Option<Program>, StripFlags)> {
        let token = self.cursor.current();
        match token.kind {
            TokenKind::Inverse(strip) => {
                self.cursor.advance();
                let program = self.program()?;
                Ok((Some(program), strip))
            }
            TokenKind::OpenInverseChain(open_strip) => {
                let start = token.span.start;
                self.cursor.advance();
                let (path, params, hash) = self.call()?;
                let block_params = self.block_params()?;
                let TokenKind::Close(close_strip) = *self.cursor.current_kind() else {
                    return Err(self.unexpected_after_params(&["CLOSE", "OPEN_BLOCK_PARAMS"]));
                };
                self.cursor.advance();
                self.check_callee(&path)?;

                let mut program = self.program()?;
                program.block_params = block_params;
                let (mut inverse, inverse_strip) =
                    ensure_sufficient_stack(|| self.inverse_chain())?;
                let chain_close = if inverse.is_some() {
                    inverse_strip
                } else {
                    StripFlags::default()
                };
                set_chain_close_strip(&mut inverse, chain_close);

                let strip = StripFlags {
                    open: open_strip,
                    close: close_strip,
                };
                let span = Span::new(start, self.cursor.current_span().start);
                let block = Block {
                    path,
                    params,
                    hash,
                    program,
                    inverse,
                    open_strip: strip,
                    inverse_strip: chain_close,
                    close_strip: chain_close,
                    span,
                };
                let wrapper = Program {
                    body: vec![Statement::Block(Box::new(block))],
                    block_params: Vec::new(),
                    chained: true,
                    span,
                };
                Ok((Some(wrapper), strip))
            }
            _ => Ok((None, StripFlags::default())),
        }
    }

    /// `as |a b|`
    fn block_params(&mut self) -> CompileResult<Vec<String>> {
        if !matches!(self.cursor.current_kind(), TokenKind::OpenBlockParams) {
            return Ok(Vec::new());
        }
        self.cursor.advance();
        let mut names = Vec::new();
        while let TokenKind::Id(name) = self.cursor.current_kind() {
            names.push(id(name).to_owned());
            self.cursor.advance();
        }
        if names.is_empty() {
            return Err(self.unexpected(&["ID"]));
        }
        if !matches!(self.cursor.current_kind(), TokenKind::CloseBlockParams) {
            return Err(self.unexpected(&["CLOSE_BLOCK_PARAMS", "ID"]));
        }
        self.cursor.advance();
        Ok(names)
    }

    /// Reject a literal in callee position.
    fn check_callee(&self, path: &Expression) -> CompileResult<()> {
        let Expression::Literal(literal) = path else {
            return Ok(());
        };
        let (kind, value) = literal_description(&literal.value);
        let shown = match &literal.value {
            LiteralValue::String(s) => s.clone(),
            _ => value.clone(),
        };
        Err(CompileError::new(
            ErrorCode::E1001,
            CompileErrorKind::Parse {
                expected: vec!["path".to_owned(), "sub-expression".to_owned()],
                found: kind.to_owned(),
            },
            format!(
                "{kind} \"{shown}\" cannot be called as a sub-expression, replace ({value}) with {value}"
            ),
            literal.span,
            self.index,
        ))
    }
}

/// After `{{/x}}` closes a block, the first link of its `{{else if}}`
/// chain takes the close tag's strip flags.
fn set_chain_close_strip(inverse: &mut Option<Program>, strip: StripFlags) {
    let Some(program) = inverse else { return };
    if !program.chained {
        return;
    }
    if let Some(Statement::Block(block)) = program.body.first_mut() {
        block.close_strip = strip;
    }
}

/// Source spelling used to match `{{#x}}` against `{{/x}}`.
fn expression_original(expr: &Expression) -> String {
    match expr {
        Expression::Path(path) => path.original.clone(),
        Expression::Literal(literal) => match &literal.value {
            LiteralValue::String(s) => s.clone(),
            other => other.to_string(),
        },
        Expression::SubExpression(_) => String::new(),
    }
}

/// Node type name and printed value of a literal.
fn literal_description(value: &LiteralValue) -> (&'static str, String) {
    match value {
        LiteralValue::String(s) => ("StringLiteral", format!("\"{s}\"")),
        LiteralValue::Number(n) => ("NumberLiteral", n.to_string()),
        LiteralValue::Boolean(b) => ("BooleanLiteral", b.to_string()),
        LiteralValue::Null => ("NullLiteral", "null".to_owned()),
        LiteralValue::Undefined => ("UndefinedLiteral", "undefined".to_owned()),
    }
}
