//! Normalized tree (v2) → wire program.
//!
//! Encoding is a pure walk: every v2 node maps to one opcode array, except
//! simple elements, which flatten into an open/attributes/flush/body/close
//! run, and mustache comments, which emit nothing. The symbol table is
//! copied as-is, so slot and upvar numbers in the output are exactly the
//! ones the normalizer assigned.

mod content;
mod element;
mod expr;

use stencil_ir::norm::{self, NamedArg};
use stencil_ir::SymbolTable;
use tracing::debug;

use crate::program::{NamedBlocks, Params, WireBlock, WireHash, WireProgram};

pub use element::attribute_namespace;

/// Encode a normalized template and its symbol table.
pub fn encode(template: &norm::Template, symbols: &SymbolTable) -> WireProgram {
    let statements = content::content_list(&template.body);
    debug!(
        statements = statements.len(),
        symbols = symbols.symbols().len(),
        upvars = symbols.upvars().len(),
        "encoded template"
    );
    WireProgram {
        statements,
        symbols: symbols.symbols().to_vec(),
        has_eval: symbols.has_eval(),
        upvars: symbols.upvars().to_vec(),
    }
}

// ─── Shared shapes ───

fn block(block: &norm::Block) -> WireBlock {
    WireBlock {
        statements: content::content_list(&block.body),
        params: block.params.clone(),
    }
}

fn optional_block(inverse: Option<&norm::Block>) -> Option<WireBlock> {
    inverse.map(block)
}

fn named_blocks(blocks: &[norm::NamedBlock]) -> NamedBlocks {
    let mut named = NamedBlocks::default();
    for named_block in blocks {
        named.push(named_block.name.as_str(), block(&named_block.block));
    }
    named
}

/// Positional arguments; `None` when there are none.
fn params(positional: &[norm::Expr]) -> Params {
    if positional.is_empty() {
        None
    } else {
        Some(positional.iter().map(expr::expr).collect())
    }
}

/// Named arguments; `None` when there are none.
fn hash(named: &[NamedArg]) -> Option<WireHash> {
    if named.is_empty() {
        return None;
    }
    let (keys, values) = named
        .iter()
        .map(|arg| (arg.name.clone(), expr::expr(&arg.value)))
        .unzip();
    Some(WireHash { keys, values })
}

#[cfg(test)]
mod tests;
