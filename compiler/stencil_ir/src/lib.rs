//! Stencil IR - shared data structures for the template compiler.
//!
//! - [`Span`] for byte-offset source locations
//! - [`SourceIndex`] for line/column lookup and diagnostic snippets
//! - [`ast`]: the parsed template tree (v1)
//! - [`norm`]: the scope-resolved tree (v2) and its [`SymbolTable`]
//! - [`traverse`]: mutable tree walk used by AST plugins
//!
//! # Design Philosophy
//!
//! - **Tagged unions**: every node family is one enum, matched exhaustively.
//! - **Owned trees**: parents own children by value; plugins mutate in place.
//! - **No cached positions**: nodes store spans, the index computes lines.

pub mod ast;
pub mod norm;
mod source_index;
mod span;
pub mod traverse;

pub use norm::SymbolTable;
pub use source_index::{SourceIndex, SourcePosition};
pub use span::{Span, Spanned};
