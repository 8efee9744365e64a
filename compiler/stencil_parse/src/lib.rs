//! Template parser for Stencil.
//!
//! Parsing runs in four steps:
//!
//! 1. [`lexer`] splits the source into content runs and mustache tokens.
//! 2. [`grammar`] parses the tokens into a mustache-level program (blocks,
//!    mustaches, comments, partials; HTML is still raw content).
//! 3. [`whitespace`] applies `~` and standalone-line stripping
//!    (precompile mode only).
//! 4. [`builder`] feeds content through the HTML tokenizer and assembles
//!    the [`Template`](stencil_ir::ast::Template) tree.
//!
//! Every error is fatal and returned as a [`CompileError`]. Recoverable
//! HTML syntax errors come back as warnings on [`ParseOutput`].

mod builder;
mod cursor;
mod grammar;
mod hbs;
mod lexer;
mod whitespace;

use stencil_diagnostic::{CompileError, CompileResult, Diagnostic};
use stencil_ir::ast::Template;
use stencil_ir::SourceIndex;
use tracing::debug;

/// How templates are parsed.
///
/// `Precompile` applies whitespace control and decodes character
/// references. `Codemod` keeps the source text as written so a printer can
/// reproduce it.
pub use stencil_tokenizer::TokenizerMode as ParseMode;

/// A parsed template and its recoverable syntax warnings.
#[derive(Clone, Debug)]
pub struct ParseOutput {
    pub template: Template,
    pub warnings: Vec<Diagnostic>,
}

/// Parse the template held by `index`.
pub fn parse(index: &SourceIndex, mode: ParseMode) -> CompileResult<ParseOutput> {
    let tokens = lexer::lex(index.source());
    debug!(
        module = index.module_name(),
        tokens = tokens.len(),
        "lexed template"
    );

    let mut program = grammar::parse_program(&tokens, index)?;
    if mode == ParseMode::Precompile {
        whitespace::strip_template(&mut program);
    }

    let (template, warnings) = builder::build(program, index, mode)?;
    Ok(ParseOutput { template, warnings })
}

/// Parse `source` on its own, for tests and tools.
pub fn parse_source(source: &str, mode: ParseMode) -> Result<Template, CompileError> {
    let index = SourceIndex::new(source, "an unknown module");
    parse(&index, mode).map(|output| output.template)
}

#[cfg(test)]
mod tests;
