//! Scope normalization for Stencil templates.
//!
//! Lowers the parsed template tree (`stencil_ir::ast`, v1) into the
//! normalized tree (`stencil_ir::norm`, v2).
//!
//! # Pipeline Position
//!
//! ```text
//! Source → Parse (v1) → **Normalize** (v2 + SymbolTable) → Wire encode
//! ```
//!
//! # What Happens During Normalization
//!
//! 1. **Scoping**: block params (`as |x|`) open a child frame in the
//!    [`SymbolTable`]; names resolve innermost-first and otherwise become
//!    free variables (upvars).
//! 2. **Resolution**: every free variable is tagged with the runtime
//!    namespaces it may resolve in, chosen by its syntactic position
//!    (see [`SyntaxContext`]). In strict mode every free variable must be
//!    one of the embedding scope's `locals`.
//! 3. **Element classification**: `<div>` stays a simple element, `<Foo>`,
//!    `<@foo>`, `<this.foo>` and in-scope tags invoke components, `<:name>`
//!    is a named block of the enclosing component.
//! 4. **Keywords**: `if`, `each`, `yield`, `in-element`, `has-block` and
//!    friends are recognized by name (unless shadowed) and desugared into
//!    dedicated v2 variants with fixed argument shapes.

mod keywords;
mod normalize;
mod resolution;

use std::fmt;
use std::sync::Arc;

pub use normalize::normalize;
pub use resolution::SyntaxContext;
pub use stencil_ir::norm;
pub use stencil_ir::SymbolTable;

/// Rewrites free component tag names (e.g. `<FooBar>` to `foo-bar`).
pub type ComponentNameFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Settings for one normalization run.
#[derive(Clone, Default)]
pub struct NormalizeOptions {
    pub strict_mode: bool,
    /// Names the embedding scope provides. Only consulted in strict mode.
    pub locals: Vec<String>,
    pub customize_component_name: Option<ComponentNameFn>,
}

impl fmt::Debug for NormalizeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NormalizeOptions")
            .field("strict_mode", &self.strict_mode)
            .field("locals", &self.locals)
            .field(
                "customize_component_name",
                &self.customize_component_name.as_ref().map(|_| ".."),
            )
            .finish()
    }
}

/// A normalized template and the symbol table its slots index into.
#[derive(Clone, Debug)]
pub struct NormalizedTemplate {
    pub template: norm::Template,
    pub symbols: SymbolTable,
}

#[cfg(test)]
mod tests;
