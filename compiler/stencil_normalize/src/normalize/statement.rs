//! Content normalization: text, comments, mustaches and block statements.

use stencil_diagnostic::{CompileResult, ErrorCode};
use stencil_ir::ast::{self, Statement};
use stencil_ir::norm::{AppendContent, Content, HtmlComment, HtmlText, InvokeBlock};
use stencil_stack::ensure_sufficient_stack;

use super::Normalizer;
use crate::keywords::{AppendKeyword, BlockKeyword};
use crate::resolution::SyntaxContext;

impl Normalizer<'_> {
    pub(crate) fn statements(&mut self, body: &[Statement]) -> CompileResult<Vec<Content>> {
        body.iter().map(|statement| self.statement(statement)).collect()
    }

    fn statement(&mut self, statement: &Statement) -> CompileResult<Content> {
        match statement {
            Statement::Text(text) => Ok(Content::Text(HtmlText {
                chars: text.chars.clone(),
                span: text.span,
            })),
            Statement::Comment(comment) => Ok(Content::HtmlComment(HtmlComment {
                text: comment.value.clone(),
                span: comment.span,
            })),
            Statement::MustacheComment(comment) => Ok(Content::GlimmerComment(HtmlComment {
                text: comment.value.clone(),
                span: comment.span,
            })),
            Statement::Partial(partial) => Err(self.structure_error(
                ErrorCode::E2013,
                "Handlebars partials are not supported",
                partial.span,
            )),
            Statement::Mustache(mustache) => self.append(mustache),
            Statement::Block(block) => ensure_sufficient_stack(|| self.block_statement(block)),
            Statement::Element(element) => ensure_sufficient_stack(|| self.element(element)),
        }
    }

    /// `{{...}}` or `{{{...}}}` in content.
    fn append(&mut self, mustache: &ast::MustacheStatement) -> CompileResult<Content> {
        let keyword = self
            .keyword_name(&mustache.path)
            .and_then(AppendKeyword::from_name);
        if let Some(keyword) = keyword {
            return self.append_keyword(keyword, mustache);
        }

        let invoke = !mustache.params.is_empty() || !mustache.hash.is_empty();
        let context = SyntaxContext::Append {
            trusting: mustache.trusting,
            invoke,
        };
        let value = if invoke {
            self.call(
                &mustache.path,
                &mustache.params,
                &mustache.hash,
                context,
                mustache.span,
            )?
        } else {
            self.expr(&mustache.path, context)?
        };
        Ok(Content::Append(AppendContent {
            value,
            trusting: mustache.trusting,
            span: mustache.span,
        }))
    }

    /// `{{#callee ...}}...{{/callee}}`
    fn block_statement(&mut self, block: &ast::BlockStatement) -> CompileResult<Content> {
        let keyword = self
            .keyword_name(&block.path)
            .and_then(BlockKeyword::from_name);
        if let Some(keyword) = keyword {
            return self.block_keyword(keyword, block);
        }

        let callee = self.expr(&block.path, SyntaxContext::Block)?;
        let args = self.args(&block.params, &block.hash, block.span)?;
        let blocks = self.block_statement_blocks(block)?;
        Ok(Content::InvokeBlock(InvokeBlock {
            callee,
            args,
            blocks,
            span: block.span,
        }))
    }
}
