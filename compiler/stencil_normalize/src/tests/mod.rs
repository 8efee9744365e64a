//! Normalizer tests, driven through the real parser.
//!
//! - `scopes`: slots, upvars, shadowing and loose-mode resolution
//! - `keywords`: keyword desugaring and argument shapes
//! - `elements`: element classification, components and named blocks
//! - `strict`: strict-mode resolution

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod keywords;

use stencil_diagnostic::{CompileError, CompileResult};
use stencil_ir::norm::{Content, Expr, VarRef};
use stencil_ir::SourceIndex;
use stencil_parse::{parse, ParseMode};

use crate::{normalize, NormalizeOptions, NormalizedTemplate};

fn run(source: &str, options: &NormalizeOptions) -> CompileResult<NormalizedTemplate> {
    let index = SourceIndex::new(source, "an unknown module");
    let parsed = parse(&index, ParseMode::Precompile).expect("template should parse");
    normalize(&parsed.template, &index, options)
}

fn loose(source: &str) -> NormalizedTemplate {
    run(source, &NormalizeOptions::default()).expect("template should normalize")
}

fn loose_err(source: &str) -> CompileError {
    match run(source, &NormalizeOptions::default()) {
        Ok(output) => panic!("expected an error, got {:?}", output.template),
        Err(err) => err,
    }
}

fn strict_options(locals: &[&str]) -> NormalizeOptions {
    NormalizeOptions {
        strict_mode: true,
        locals: locals.iter().map(|&local| local.to_owned()).collect(),
        ..NormalizeOptions::default()
    }
}

/// The single top-level content node.
fn only(output: &NormalizedTemplate) -> &Content {
    assert_eq!(output.template.body.len(), 1, "{:?}", output.template.body);
    &output.template.body[0]
}

fn appended(content: &Content) -> &Expr {
    match content {
        Content::Append(append) => &append.value,
        other => panic!("expected an append, found {other:?}"),
    }
}

/// Variable at the head of a path, or of a call's callee.
fn head(expr: &Expr) -> &VarRef {
    match expr {
        Expr::Path(path) => &path.var,
        Expr::Call(call) => head(&call.callee),
        other => panic!("expected a path, found {other:?}"),
    }
}

fn names(list: &[String]) -> Vec<&str> {
    list.iter().map(String::as_str).collect()
}
