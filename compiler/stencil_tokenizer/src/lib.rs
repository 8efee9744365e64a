//! HTML tokenizer for Stencil templates.
//!
//! Standalone crate: no `stencil_*` dependencies. Two front ends share one
//! state machine:
//!
//! - [`EventedTokenizer`] calls a [`TokenizerDelegate`] for every event and
//!   exposes its [`TokenizerState`] between chunks. The template compiler
//!   uses this to splice mustaches into the HTML stream.
//! - [`Tokenizer`] collects the same events into [`Token`]s.

mod delegate;
mod entities;
mod evented;
mod state;
mod tokenizer;

pub use delegate::TokenizerDelegate;
pub use entities::{CharRefResolver, HtmlEntities, NoEntities};
pub use evented::EventedTokenizer;
pub use state::TokenizerState;
pub use tokenizer::{Attribute, Token, TokenCollector, TokenizeOutput, Tokenizer, TokenizerError};

/// Selects the output flavor.
///
/// `Precompile` decodes character references and drops the newline right
/// after `<pre>`/`<textarea>`, as a browser would. `Codemod` keeps the
/// source text verbatim so it can be printed back.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum TokenizerMode {
    #[default]
    Precompile,
    Codemod,
}
