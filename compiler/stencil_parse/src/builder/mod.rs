//! Template tree builder.
//!
//! Walks the mustache-level program and feeds every content run through the
//! HTML tokenizer, whose [`TreeSink`] delegate builds elements, text and
//! comments. Between content runs the tokenizer's state says where the next
//! mustache belongs: in a tag it is a modifier, in an attribute value it is
//! a value part, in an HTML comment it is plain comment text, and between
//! tags it is a child statement.

mod sink;

use stencil_diagnostic::{CompileError, CompileResult, Diagnostic, ErrorCode};
use stencil_ir::ast::{
    Block, BlockStatement, Expression, MustacheCommentStatement, MustacheStatement, Statement,
    Template,
};
use stencil_ir::{SourceIndex, Span};
use stencil_stack::ensure_sufficient_stack;
use stencil_tokenizer::{EventedTokenizer, TokenizerDelegate, TokenizerState};
use tracing::debug;

use self::sink::{Frame, TreeSink};
use crate::hbs;
use crate::ParseMode;

/// Build the template tree from a (whitespace-controlled) program.
pub(crate) fn build(
    program: hbs::Program,
    index: &SourceIndex,
    mode: ParseMode,
) -> CompileResult<(Template, Vec<Diagnostic>)> {
    let mut builder = Builder {
        tokenizer: EventedTokenizer::new(TreeSink::new(index), mode),
        index,
    };
    let span = program.span;
    let block = builder.program(program)?;
    let warnings = std::mem::take(&mut builder.sink().warnings);
    debug!(
        statements = block.body.len(),
        warnings = warnings.len(),
        "built template tree"
    );
    Ok((
        Template {
            body: block.body,
            span,
        },
        warnings,
    ))
}

struct Builder<'a> {
    tokenizer: EventedTokenizer<TreeSink<'a>>,
    index: &'a SourceIndex,
}

impl<'a> Builder<'a> {
    fn sink(&mut self) -> &mut TreeSink<'a> {
        self.tokenizer.delegate_mut()
    }

    fn error(&self, code: ErrorCode, message: impl Into<String>, span: Span) -> CompileError {
        CompileError::structure(code, message, span, self.index)
    }

    fn program(&mut self, program: hbs::Program) -> CompileResult<Block> {
        self.sink().frames.push(Frame::Block(Vec::new()));
        for statement in program.body {
            self.statement(statement)?;
        }
        self.check_closed(program.span)?;

        match self.sink().frames.pop() {
            Some(Frame::Block(body)) => Ok(Block {
                body,
                block_params: program.block_params,
                chained: program.chained,
                span: program.span,
            }),
            Some(Frame::Element(element)) => Err(self.error(
                ErrorCode::E2006,
                format!("Unclosed element `{}`", element.tag),
                element.span,
            )),
            None => Err(self.error(
                ErrorCode::E2006,
                "Unbalanced element stack",
                program.span,
            )),
        }
    }

    /// A program may not end in the middle of a tag or an HTML comment.
    fn check_closed(&mut self, span: Span) -> CompileResult<()> {
        let state = self.tokenizer.state();
        if state.is_data() {
            return Ok(());
        }
        let message = if let Some(tag) = &self.tokenizer.delegate().tag {
            format!("Unclosed element `{}`", tag.name())
        } else if self.tokenizer.delegate().has_pending_comment() {
            "Unclosed comment".to_owned()
        } else {
            format!("Unexpected end of template in the `{state}` state")
        };
        Err(self.error(ErrorCode::E2006, message, Span::point(span.end)))
    }

    fn statement(&mut self, statement: hbs::Statement) -> CompileResult<()> {
        match statement {
            hbs::Statement::Content(content) => self.content(&content),
            hbs::Statement::Comment(comment) => self.mustache_comment(comment),
            hbs::Statement::Mustache(mustache) => self.mustache(mustache),
            hbs::Statement::Block(block) => ensure_sufficient_stack(|| self.block(*block)),
            hbs::Statement::Partial(partial) => {
                let state = self.tokenizer.state();
                if is_comment_state(state) {
                    self.append_source_to_comment(partial.span);
                    return Ok(());
                }
                if !state.is_data() {
                    return Err(self.error(
                        ErrorCode::E2002,
                        "A partial may only be used inside an HTML element or another block.",
                        partial.span,
                    ));
                }
                self.sink().append_child(Statement::Partial(partial));
                Ok(())
            }
        }
    }

    fn content(&mut self, content: &hbs::Content) -> CompileResult<()> {
        self.tokenizer.set_source_offset(content.value_start as usize);
        self.tokenizer.tokenize_part(&content.value);
        self.tokenizer.flush_data();
        self.sink().take_error()
    }

    fn mustache(&mut self, mustache: MustacheStatement) -> CompileResult<()> {
        let state = self.tokenizer.state();
        if is_comment_state(state) {
            self.append_source_to_comment(mustache.span);
            return Ok(());
        }
        if let Expression::Path(path) = &mustache.path {
            if path.original == "...attributes" {
                return Err(self.error(
                    ErrorCode::E2012,
                    "Illegal use of ...attributes",
                    mustache.span,
                ));
            }
        }

        let start = mustache.span.start;
        match state {
            TokenizerState::TagOpen
            | TokenizerState::TagName
            | TokenizerState::EndTagOpen
            | TokenizerState::EndTagName => {
                return Err(self.error(
                    ErrorCode::E2001,
                    "Cannot use mustaches in an elements tagname",
                    mustache.span,
                ));
            }
            TokenizerState::BeforeAttributeName => {
                self.sink().add_modifier(mustache)?;
            }
            TokenizerState::AttributeName | TokenizerState::AfterAttributeName => {
                let sink = self.sink();
                sink.begin_attribute_value(false, start);
                sink.finish_attribute_value(start);
                sink.take_error()?;
                sink.add_modifier(mustache)?;
                self.tokenizer
                    .transition_to(TokenizerState::BeforeAttributeName);
            }
            TokenizerState::AfterAttributeValueQuoted => {
                self.sink().add_modifier(mustache)?;
                self.tokenizer
                    .transition_to(TokenizerState::BeforeAttributeName);
            }
            TokenizerState::BeforeAttributeValue => {
                let sink = self.sink();
                sink.begin_attribute_value(false, start);
                sink.append_dynamic_attribute_part(mustache);
                self.tokenizer
                    .transition_to(TokenizerState::AttributeValueUnquoted);
            }
            state if state.is_attribute_value() => {
                self.sink().append_dynamic_attribute_part(mustache);
            }
            _ => self.sink().append_child(Statement::Mustache(mustache)),
        }
        Ok(())
    }

    fn mustache_comment(&mut self, comment: hbs::Comment) -> CompileResult<()> {
        let state = self.tokenizer.state();
        if is_comment_state(state) {
            self.append_source_to_comment(comment.span);
            return Ok(());
        }
        let node = MustacheCommentStatement {
            value: comment.value,
            span: comment.span,
        };
        match state {
            TokenizerState::BeforeAttributeName | TokenizerState::AfterAttributeName => {
                if let Some(tag) = self.sink().start_tag_mut() {
                    tag.comments.push(node);
                }
                Ok(())
            }
            state if state.is_data() => {
                self.sink().append_child(Statement::MustacheComment(node));
                Ok(())
            }
            state => Err(self.error(
                ErrorCode::E2002,
                format!("Using a Handlebars comment when in the `{state}` state is not supported"),
                comment.span,
            )),
        }
    }

    fn block(&mut self, block: hbs::Block) -> CompileResult<()> {
        let state = self.tokenizer.state();
        if is_comment_state(state) {
            self.append_source_to_comment(block.span);
            return Ok(());
        }
        if !state.is_data() {
            return Err(self.error(
                ErrorCode::E2002,
                "A block may only be used inside an HTML element or another block.",
                block.span,
            ));
        }

        let program = self.program(block.program)?;
        let inverse = match block.inverse {
            Some(inverse) => Some(self.program(inverse)?),
            None => None,
        };
        self.sink().append_child(Statement::Block(BlockStatement {
            path: block.path,
            params: block.params,
            hash: block.hash,
            program,
            inverse,
            open_strip: block.open_strip,
            inverse_strip: block.inverse_strip,
            close_strip: block.close_strip,
            span: block.span,
        }));
        Ok(())
    }

    /// Mustache syntax inside `<!-- -->` is kept as comment text.
    fn append_source_to_comment(&mut self, span: Span) {
        // The tokenizer may be holding back dashes that turned out not to
        // end the comment.
        let held = match self.tokenizer.state() {
            TokenizerState::CommentStartDash | TokenizerState::CommentEndDash => "-",
            TokenizerState::CommentEnd => "--",
            _ => "",
        };
        let text = self.index.slice(span);
        let sink = self.tokenizer.delegate_mut();
        sink.append_to_comment(held);
        sink.append_to_comment(text);
        self.tokenizer.transition_to(TokenizerState::Comment);
    }
}

fn is_comment_state(state: TokenizerState) -> bool {
    matches!(
        state,
        TokenizerState::CommentStart
            | TokenizerState::CommentStartDash
            | TokenizerState::Comment
            | TokenizerState::CommentEndDash
            | TokenizerState::CommentEnd
    )
}
