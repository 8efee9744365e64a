//! Normalized template tree (v2).
//!
//! Every variable reference has been resolved to a [`VariableKind`],
//! every element has been classified, and built-in keywords have been
//! desugared into dedicated variants. The wire encoder consumes this tree
//! together with the program [`SymbolTable`].
//!
//! # Slots
//!
//! Slot `0` is always `this`. Slots `1..` index the program symbol list
//! (`symbols[slot - 1]`), which holds named arguments (`@foo`), named
//! blocks (`&default`) and block parameters.

mod symbols;

use bitflags::bitflags;

pub use crate::ast::LiteralValue;
use crate::{Span, Spanned};
pub use symbols::{FrameId, SymbolTable};

bitflags! {
    /// Runtime namespaces a free variable may resolve against.
    #[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
    pub struct FreeVarNamespaces: u8 {
        const HELPER = 1 << 0;
        const COMPONENT = 1 << 1;
        const MODIFIER = 1 << 2;
    }
}

/// How the runtime must look up a free variable.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Resolution {
    /// Strict-mode: the name was supplied by the embedding scope.
    Strict,
    /// Loose-mode lookup in `namespaces`, optionally falling back to a
    /// property of `this`.
    Loose {
        namespaces: FreeVarNamespaces,
        allows_fallback: bool,
    },
}

impl Resolution {
    /// Only a `this` fallback, no namespace lookup.
    pub const FALLBACK: Resolution = Resolution::Loose {
        namespaces: FreeVarNamespaces::empty(),
        allows_fallback: true,
    };

    pub const fn loose(namespaces: FreeVarNamespaces, allows_fallback: bool) -> Self {
        Resolution::Loose {
            namespaces,
            allows_fallback,
        }
    }

    pub fn is_strict(self) -> bool {
        matches!(self, Resolution::Strict)
    }
}

/// What a resolved variable reference points at.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum VariableKind {
    This,
    /// Block parameter or other lexical binding.
    Local(u32),
    /// Named argument `@foo`.
    Arg(u32),
    /// Free variable: index into the program upvar list.
    Free { upvar: u32, resolution: Resolution },
}

#[derive(Clone, Debug, PartialEq)]
pub struct VarRef {
    /// Name as written (`this`, `@foo`, `foo`).
    pub name: String,
    pub kind: VariableKind,
    pub span: Span,
}

// ─── Expressions ───

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Literal(LiteralExpr),
    Path(PathRef),
    Call(CallExpr),
    /// Quoted attribute value with dynamic parts.
    Interpolate(Interpolate),
    HasBlock(BlockRef),
    HasBlockParams(BlockRef),
    Curry(CurryExpr),
    Not(Box<Expr>),
    IfInline(IfInline),
    GetDynamicVar(Box<Expr>),
    Log(Args),
}

impl Expr {
    pub fn as_literal(&self) -> Option<&LiteralValue> {
        match self {
            Expr::Literal(literal) => Some(&literal.value),
            _ => None,
        }
    }
}

impl Spanned for Expr {
    fn span(&self) -> Span {
        match self {
            Expr::Literal(n) => n.span,
            Expr::Path(n) => n.span,
            Expr::Call(n) => n.span,
            Expr::Interpolate(n) => n.span,
            Expr::HasBlock(n) | Expr::HasBlockParams(n) => n.span,
            Expr::Curry(n) => n.span,
            Expr::IfInline(n) => n.span,
            Expr::Log(n) => n.span,
            Expr::Not(inner) | Expr::GetDynamicVar(inner) => inner.span(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LiteralExpr {
    pub value: LiteralValue,
    pub span: Span,
}

/// A variable reference with an optional property tail.
#[derive(Clone, Debug, PartialEq)]
pub struct PathRef {
    pub var: VarRef,
    pub tail: Vec<String>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CallExpr {
    pub callee: Box<Expr>,
    pub args: Args,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Interpolate {
    pub parts: Vec<Expr>,
    pub span: Span,
}

/// Slot of a named block (`&default`, `&else`, ...) queried by
/// `has-block`/`has-block-params`.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockRef {
    pub slot: u32,
    pub span: Span,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CurriedType {
    Component = 0,
    Helper = 1,
    Modifier = 2,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CurryExpr {
    pub definition: Box<Expr>,
    pub curried: CurriedType,
    pub args: Args,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct IfInline {
    pub condition: Box<Expr>,
    pub truthy: Box<Expr>,
    pub falsy: Option<Box<Expr>>,
    pub span: Span,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Args {
    pub positional: Vec<Expr>,
    pub named: Vec<NamedArg>,
    pub span: Span,
}

impl Args {
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NamedArg {
    pub name: String,
    pub value: Expr,
    pub span: Span,
}

// ─── Content ───

#[derive(Clone, Debug, PartialEq)]
pub struct Template {
    pub body: Vec<Content>,
    pub span: Span,
}

/// A block body with the slots of its parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    pub params: Vec<u32>,
    pub body: Vec<Content>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NamedBlock {
    /// Name without the leading `:` (`default`, `else`, `header`, ...).
    pub name: String,
    pub block: Block,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Content {
    Text(HtmlText),
    HtmlComment(HtmlComment),
    /// Mustache comment, kept for plugins and tooling; never encoded.
    GlimmerComment(HtmlComment),
    Append(AppendContent),
    InvokeBlock(InvokeBlock),
    InvokeComponent(InvokeComponent),
    SimpleElement(SimpleElement),
    If(IfContent),
    Each(EachContent),
    With(WithContent),
    Let(LetContent),
    InElement(InElement),
    WithDynamicVars(WithDynamicVars),
    /// `{{component}}` / `{{#component}}`.
    InvokeDynamicComponent(InvokeBlock),
    Yield(YieldContent),
    Debugger(EvalContent),
    Partial(PartialContent),
}

impl Spanned for Content {
    fn span(&self) -> Span {
        match self {
            Content::Text(n) => n.span,
            Content::HtmlComment(n) | Content::GlimmerComment(n) => n.span,
            Content::Append(n) => n.span,
            Content::InvokeBlock(n) | Content::InvokeDynamicComponent(n) => n.span,
            Content::InvokeComponent(n) => n.span,
            Content::SimpleElement(n) => n.span,
            Content::If(n) => n.span,
            Content::Each(n) => n.span,
            Content::With(n) => n.span,
            Content::Let(n) => n.span,
            Content::InElement(n) => n.span,
            Content::WithDynamicVars(n) => n.span,
            Content::Yield(n) => n.span,
            Content::Debugger(n) => n.span,
            Content::Partial(n) => n.span,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct HtmlText {
    pub chars: String,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HtmlComment {
    pub text: String,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AppendContent {
    pub value: Expr,
    pub trusting: bool,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct InvokeBlock {
    pub callee: Expr,
    pub args: Args,
    pub blocks: Vec<NamedBlock>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct InvokeComponent {
    pub callee: Expr,
    pub params: ElementParams,
    /// `@name=...` arguments, names keep the `@`.
    pub args: Vec<NamedArg>,
    pub blocks: Vec<NamedBlock>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SimpleElement {
    pub tag: String,
    pub params: ElementParams,
    pub body: Vec<Content>,
    pub span: Span,
}

/// Attributes, splattributes and modifiers of an element, in source order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ElementParams {
    pub attrs: Vec<ElementAttr>,
    pub modifiers: Vec<ElementModifier>,
}

impl ElementParams {
    pub fn has_splattributes(&self) -> bool {
        self.attrs
            .iter()
            .any(|attr| matches!(attr, ElementAttr::Splat { .. }))
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty() && self.modifiers.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ElementAttr {
    Attr(HtmlAttr),
    /// `...attributes`, carrying the `&attrs` slot.
    Splat { slot: u32, span: Span },
}

#[derive(Clone, Debug, PartialEq)]
pub struct HtmlAttr {
    pub name: String,
    pub value: Expr,
    pub trusting: bool,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ElementModifier {
    pub callee: Expr,
    pub args: Args,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct IfContent {
    pub condition: Expr,
    pub block: Block,
    pub inverse: Option<Block>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EachContent {
    pub value: Expr,
    pub key: Option<Expr>,
    pub block: Block,
    pub inverse: Option<Block>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WithContent {
    pub value: Expr,
    pub block: Block,
    pub inverse: Option<Block>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LetContent {
    pub positional: Vec<Expr>,
    pub block: Block,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct InElement {
    /// `%cursor:N%`, numbered per program.
    pub guid: String,
    pub destination: Expr,
    pub insert_before: Option<Expr>,
    pub block: Block,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WithDynamicVars {
    pub named: Vec<NamedArg>,
    pub block: Block,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct YieldContent {
    /// Slot of the target block (`&default` unless `to=` was given).
    pub target: u32,
    pub positional: Vec<Expr>,
    pub span: Span,
}

/// `{{debugger}}`: slots visible at that point.
#[derive(Clone, Debug, PartialEq)]
pub struct EvalContent {
    pub eval: Vec<u32>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PartialContent {
    pub target: Expr,
    pub eval: Vec<u32>,
    pub span: Span,
}
