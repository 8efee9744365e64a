//! Parser tests.
//!
//! Tests are organized into modules by category:
//! - `parser`: mustache grammar, paths, literals, hashes, blocks and
//!   `{{else if}}` chains, plus the errors the grammar reports
//! - `builder`: HTML tree building, attributes, modifiers, element block
//!   params, comments and structural errors

mod parser;
