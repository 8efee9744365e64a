//! Built-in keyword names, by the position they are valid in.
//!
//! A keyword is only recognized on a bare free head: `{{#each}}` is the
//! keyword, `{{#this.each}}` and an `each` block param are not.

/// `{{#keyword}}...{{/keyword}}`
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum BlockKeyword {
    If,
    Unless,
    Each,
    With,
    Let,
    InElement,
    Component,
    WithDynamicVars,
}

impl BlockKeyword {
    pub(crate) fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "if" => BlockKeyword::If,
            "unless" => BlockKeyword::Unless,
            "each" => BlockKeyword::Each,
            "with" => BlockKeyword::With,
            "let" => BlockKeyword::Let,
            "in-element" => BlockKeyword::InElement,
            "component" => BlockKeyword::Component,
            "-with-dynamic-vars" => BlockKeyword::WithDynamicVars,
            _ => return None,
        })
    }

    pub(crate) fn name(self) -> &'static str {
        match self {
            BlockKeyword::If => "if",
            BlockKeyword::Unless => "unless",
            BlockKeyword::Each => "each",
            BlockKeyword::With => "with",
            BlockKeyword::Let => "let",
            BlockKeyword::InElement => "in-element",
            BlockKeyword::Component => "component",
            BlockKeyword::WithDynamicVars => "-with-dynamic-vars",
        }
    }
}

/// `(keyword ...)`, also valid as `{{keyword ...}}` and `attr={{keyword ...}}`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum ExprKeyword {
    If,
    Unless,
    HasBlock,
    HasBlockParams,
    Component,
    Helper,
    Modifier,
    Log,
    GetDynamicVar,
}

impl ExprKeyword {
    pub(crate) fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "if" => ExprKeyword::If,
            "unless" => ExprKeyword::Unless,
            "has-block" => ExprKeyword::HasBlock,
            "has-block-params" => ExprKeyword::HasBlockParams,
            "component" => ExprKeyword::Component,
            "helper" => ExprKeyword::Helper,
            "modifier" => ExprKeyword::Modifier,
            "log" => ExprKeyword::Log,
            "-get-dynamic-var" => ExprKeyword::GetDynamicVar,
            _ => return None,
        })
    }

    pub(crate) fn name(self) -> &'static str {
        match self {
            ExprKeyword::If => "if",
            ExprKeyword::Unless => "unless",
            ExprKeyword::HasBlock => "has-block",
            ExprKeyword::HasBlockParams => "has-block-params",
            ExprKeyword::Component => "component",
            ExprKeyword::Helper => "helper",
            ExprKeyword::Modifier => "modifier",
            ExprKeyword::Log => "log",
            ExprKeyword::GetDynamicVar => "-get-dynamic-var",
        }
    }
}

/// `{{keyword ...}}` in content.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum AppendKeyword {
    Yield,
    Partial,
    Debugger,
    /// `{{component}}` invokes rather than curries.
    Component,
    Expr(ExprKeyword),
}

impl AppendKeyword {
    pub(crate) fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "yield" => AppendKeyword::Yield,
            "partial" => AppendKeyword::Partial,
            "debugger" => AppendKeyword::Debugger,
            "component" => AppendKeyword::Component,
            _ => AppendKeyword::Expr(ExprKeyword::from_name(name)?),
        })
    }
}
