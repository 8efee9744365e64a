//! Free-variable resolution by syntactic position.

use stencil_ir::norm::{FreeVarNamespaces, Resolution};

/// Where a path appears. Decides how a free head is looked up at runtime.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SyntaxContext {
    /// `{{x}}` or `{{{x}}}` in content. `invoke` is set when the mustache
    /// has arguments.
    Append { trusting: bool, invoke: bool },
    /// `{{#x}}`
    Block,
    /// `attr={{x}}`, a part of `attr="a {{x}}"`, or `@arg={{x}}`.
    AttrValue { invoke: bool },
    /// `(x ...)`
    Sexp,
    /// `<div {{x}}>`
    Modifier,
    /// `<X>`
    Component,
    /// Positional and named argument values.
    Argument,
}

impl SyntaxContext {
    /// Loose-mode resolution of a free head.
    ///
    /// `simple` is true for a bare identifier without a tail. `None` means
    /// a free head cannot be used in this position at all.
    pub fn loose_resolution(self, simple: bool) -> Option<Resolution> {
        match self {
            SyntaxContext::Append { trusting, invoke } if simple => {
                let namespaces = if trusting {
                    FreeVarNamespaces::HELPER
                } else {
                    FreeVarNamespaces::COMPONENT | FreeVarNamespaces::HELPER
                };
                Some(Resolution::loose(namespaces, !invoke))
            }
            SyntaxContext::Block if simple => {
                Some(Resolution::loose(FreeVarNamespaces::COMPONENT, false))
            }
            SyntaxContext::AttrValue { invoke } if simple => {
                Some(Resolution::loose(FreeVarNamespaces::HELPER, !invoke))
            }
            SyntaxContext::Sexp if simple => {
                Some(Resolution::loose(FreeVarNamespaces::HELPER, false))
            }
            SyntaxContext::Modifier if simple => {
                Some(Resolution::loose(FreeVarNamespaces::MODIFIER, false))
            }
            SyntaxContext::Component if simple => {
                Some(Resolution::loose(FreeVarNamespaces::COMPONENT, false))
            }
            SyntaxContext::AttrValue { invoke: true }
            | SyntaxContext::Sexp
            | SyntaxContext::Modifier
            | SyntaxContext::Component => None,
            SyntaxContext::Append { .. }
            | SyntaxContext::Block
            | SyntaxContext::AttrValue { .. }
            | SyntaxContext::Argument => Some(Resolution::FALLBACK),
        }
    }
}
