//! Mustache-level syntax tree.
//!
//! What the grammar produces before HTML is considered: content runs are
//! still raw text and blocks still hold raw programs. Whitespace control
//! runs on this tree; the tree builder then turns it into the template
//! tree by feeding content through the HTML tokenizer.

use stencil_ir::ast::{Expression, Hash, MustacheStatement, PartialStatement, StripFlags};
use stencil_ir::Span;

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Program {
    pub body: Vec<Statement>,
    pub block_params: Vec<String>,
    /// Inverse that wraps an `{{else if}}` block.
    pub chained: bool,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Statement {
    Content(Content),
    Comment(Comment),
    Mustache(MustacheStatement),
    Block(Box<Block>),
    Partial(PartialStatement),
}

/// A run of template text between mustaches.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Content {
    /// Text after whitespace control.
    pub value: String,
    /// Text as lexed.
    pub original: String,
    /// Offset of `value`'s first byte.
    pub value_start: u32,
    pub span: Span,
    pub left_stripped: bool,
    pub right_stripped: bool,
}

impl Content {
    pub fn new(value: String, span: Span) -> Self {
        Content {
            original: value.clone(),
            value,
            value_start: span.start,
            span,
            left_stripped: false,
            right_stripped: false,
        }
    }
}

/// `{{! ... }}`
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Comment {
    pub value: String,
    pub strip: StripFlags,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Block {
    pub path: Expression,
    pub params: Vec<Expression>,
    pub hash: Hash,
    pub program: Program,
    pub inverse: Option<Program>,
    pub open_strip: StripFlags,
    pub inverse_strip: StripFlags,
    pub close_strip: StripFlags,
    pub span: Span,
}
