//! Wire-format encoding for Stencil templates.
//!
//! The last compiler stage. [`encode`] turns a normalized template and its
//! symbol table into a [`WireProgram`], which serializes (via `serde`) to
//! the positional JSON arrays the runtime decodes:
//!
//! ```text
//! [statements, symbols, hasEval, upvars]
//! ```
//!
//! Every statement and expression is an array tagged with a
//! [`SexpOpcode`]. Empty argument lists are `null`; hashes and named
//! blocks are pairs of parallel arrays.

mod encode;
mod opcode;
mod program;

pub use encode::{attribute_namespace, encode};
pub use opcode::SexpOpcode;
pub use program::{
    DynamicAttr, Expression, NamedBlocks, Params, StaticAttr, Statement, WireBlock, WireHash,
    WireProgram,
};
