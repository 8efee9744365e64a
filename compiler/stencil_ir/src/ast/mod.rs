//! Template syntax tree (v1).
//!
//! The tree produced by the parser: HTML structure with mustache statements
//! interleaved. Nothing here is scope-resolved yet; block params are plain
//! names and every path keeps its original spelling.
//!
//! Parents own their children by value. There is no sharing and no arena,
//! so plugins can rewrite the tree in place (see [`crate::traverse`]).

use std::fmt;

use crate::{Span, Spanned};

/// Root of a parsed template.
#[derive(Clone, Debug, PartialEq)]
pub struct Template {
    pub body: Vec<Statement>,
    pub span: Span,
}

/// The body of a block statement (`{{#x}}...{{/x}}`) or its inverse.
#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    pub body: Vec<Statement>,
    /// Names from `as |a b|`.
    pub block_params: Vec<String>,
    /// `true` for the inverse of `{{else if ...}}` chains.
    pub chained: bool,
    pub span: Span,
}

impl Block {
    pub fn new(body: Vec<Statement>, block_params: Vec<String>, span: Span) -> Self {
        Block {
            body,
            block_params,
            chained: false,
            span,
        }
    }
}

// ─── Statements ───

#[derive(Clone, Debug, PartialEq)]
pub enum Statement {
    Mustache(MustacheStatement),
    Block(BlockStatement),
    Partial(PartialStatement),
    Comment(CommentStatement),
    MustacheComment(MustacheCommentStatement),
    Text(TextNode),
    Element(ElementNode),
}

impl Statement {
    /// Node type name, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Statement::Mustache(_) => "MustacheStatement",
            Statement::Block(_) => "BlockStatement",
            Statement::Partial(_) => "PartialStatement",
            Statement::Comment(_) => "CommentStatement",
            Statement::MustacheComment(_) => "MustacheCommentStatement",
            Statement::Text(_) => "TextNode",
            Statement::Element(_) => "ElementNode",
        }
    }
}

impl Spanned for Statement {
    fn span(&self) -> Span {
        match self {
            Statement::Mustache(n) => n.span,
            Statement::Block(n) => n.span,
            Statement::Partial(n) => n.span,
            Statement::Comment(n) => n.span,
            Statement::MustacheComment(n) => n.span,
            Statement::Text(n) => n.span,
            Statement::Element(n) => n.span,
        }
    }
}

/// `~` markers on either side of a mustache.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct StripFlags {
    pub open: bool,
    pub close: bool,
}

/// `{{path params hash}}` or `{{{path params hash}}}`.
#[derive(Clone, Debug, PartialEq)]
pub struct MustacheStatement {
    pub path: Expression,
    pub params: Vec<Expression>,
    pub hash: Hash,
    /// Triple curlies: the value is emitted without escaping.
    pub trusting: bool,
    pub strip: StripFlags,
    pub span: Span,
}

/// `{{#path params hash as |x|}}program{{else}}inverse{{/path}}`.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockStatement {
    pub path: Expression,
    pub params: Vec<Expression>,
    pub hash: Hash,
    pub program: Block,
    pub inverse: Option<Block>,
    pub open_strip: StripFlags,
    pub inverse_strip: StripFlags,
    pub close_strip: StripFlags,
    pub span: Span,
}

/// `{{> name}}`. Parsed so it can be reported precisely, never compiled.
#[derive(Clone, Debug, PartialEq)]
pub struct PartialStatement {
    pub name: Expression,
    pub params: Vec<Expression>,
    pub hash: Hash,
    pub strip: StripFlags,
    pub span: Span,
}

/// `<!-- value -->`.
#[derive(Clone, Debug, PartialEq)]
pub struct CommentStatement {
    pub value: String,
    pub span: Span,
}

/// `{{! value}}` or `{{!-- value --}}`.
#[derive(Clone, Debug, PartialEq)]
pub struct MustacheCommentStatement {
    pub value: String,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextNode {
    pub chars: String,
    pub span: Span,
}

impl TextNode {
    pub fn new(chars: impl Into<String>, span: Span) -> Self {
        TextNode {
            chars: chars.into(),
            span,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ElementNode {
    pub tag: String,
    pub self_closing: bool,
    pub attributes: Vec<AttrNode>,
    pub block_params: Vec<String>,
    pub modifiers: Vec<ElementModifierStatement>,
    /// Mustache comments written inside the start tag.
    pub comments: Vec<MustacheCommentStatement>,
    pub children: Vec<Statement>,
    pub span: Span,
}

impl ElementNode {
    pub fn new(tag: impl Into<String>, span: Span) -> Self {
        ElementNode {
            tag: tag.into(),
            self_closing: false,
            attributes: Vec::new(),
            block_params: Vec::new(),
            modifiers: Vec::new(),
            comments: Vec::new(),
            children: Vec::new(),
            span,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AttrNode {
    pub name: String,
    pub value: AttrValue,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum AttrValue {
    Text(TextNode),
    Mustache(MustacheStatement),
    Concat(ConcatStatement),
}

impl Spanned for AttrValue {
    fn span(&self) -> Span {
        match self {
            AttrValue::Text(n) => n.span,
            AttrValue::Mustache(n) => n.span,
            AttrValue::Concat(n) => n.span,
        }
    }
}

/// Quoted attribute value mixing text and mustaches: `class="a {{b}}"`.
#[derive(Clone, Debug, PartialEq)]
pub struct ConcatStatement {
    pub parts: Vec<ConcatPart>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ConcatPart {
    Text(TextNode),
    Mustache(MustacheStatement),
}

/// `<div {{on "click" this.go}}>`.
#[derive(Clone, Debug, PartialEq)]
pub struct ElementModifierStatement {
    pub path: Expression,
    pub params: Vec<Expression>,
    pub hash: Hash,
    pub span: Span,
}

// ─── Expressions ───

#[derive(Clone, Debug, PartialEq)]
pub enum Expression {
    Path(PathExpression),
    SubExpression(SubExpression),
    Literal(Literal),
}

impl Expression {
    pub fn as_path(&self) -> Option<&PathExpression> {
        match self {
            Expression::Path(path) => Some(path),
            _ => None,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Expression::Literal(_))
    }
}

impl Spanned for Expression {
    fn span(&self) -> Span {
        match self {
            Expression::Path(n) => n.span,
            Expression::SubExpression(n) => n.span,
            Expression::Literal(n) => n.span,
        }
    }
}

/// Head of a path expression.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PathHead {
    /// `this`
    This,
    /// `@name`, stored without the `@`.
    At(String),
    /// A bare identifier.
    Var(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct PathExpression {
    pub head: PathHead,
    pub tail: Vec<String>,
    /// The path as written, e.g. `this.foo` or `@bar.baz`.
    pub original: String,
    pub span: Span,
}

impl PathExpression {
    /// Bare identifier with no tail: `foo`, not `foo.bar`, `this` or `@foo`.
    pub fn simple_name(&self) -> Option<&str> {
        match &self.head {
            PathHead::Var(name) if self.tail.is_empty() => Some(name),
            _ => None,
        }
    }

    pub fn head_name(&self) -> &str {
        match &self.head {
            PathHead::This => "this",
            PathHead::At(name) | PathHead::Var(name) => name,
        }
    }
}

/// `(path params hash)`.
#[derive(Clone, Debug, PartialEq)]
pub struct SubExpression {
    pub path: Box<Expression>,
    pub params: Vec<Expression>,
    pub hash: Hash,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Literal {
    pub value: LiteralValue,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum LiteralValue {
    String(String),
    Number(f64),
    Boolean(bool),
    Null,
    Undefined,
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::String(s) => write!(f, "{s:?}"),
            LiteralValue::Number(n) => write!(f, "{n}"),
            LiteralValue::Boolean(b) => write!(f, "{b}"),
            LiteralValue::Null => f.write_str("null"),
            LiteralValue::Undefined => f.write_str("undefined"),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Hash {
    pub pairs: Vec<HashPair>,
    pub span: Span,
}

impl Hash {
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&HashPair> {
        self.pairs.iter().find(|pair| pair.key == key)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct HashPair {
    pub key: String,
    pub value: Expression,
    pub span: Span,
}

#[cfg(test)]
mod tests;
