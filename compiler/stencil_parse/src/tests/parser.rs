//! Mustache grammar tests.
//!
//! Tests for expressions, statements, blocks and the errors raised while
//! parsing the mustache layer of a template.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use crate::{parse_source, ParseMode};
use pretty_assertions::assert_eq;
use stencil_diagnostic::{CompileError, CompileErrorKind, ErrorCode};
use stencil_ir::ast::{
    BlockStatement, Expression, LiteralValue, MustacheStatement, PathHead, Statement, Template,
};
use stencil_ir::Span;

fn parse(source: &str) -> Template {
    parse_source(source, ParseMode::Precompile).expect("template should parse")
}

fn parse_err(source: &str) -> CompileError {
    match parse_source(source, ParseMode::Precompile) {
        Ok(template) => panic!("expected an error, got {template:?}"),
        Err(error) => error,
    }
}

fn only_mustache(template: &Template) -> &MustacheStatement {
    match template.body.as_slice() {
        [Statement::Mustache(mustache)] => mustache,
        other => panic!("expected a single mustache, got {other:?}"),
    }
}

fn only_block(template: &Template) -> &BlockStatement {
    match template.body.as_slice() {
        [Statement::Block(block)] => block,
        other => panic!("expected a single block, got {other:?}"),
    }
}

// ─── Mustaches ───

#[test]
fn test_parse_simple_mustache() {
    let template = parse("{{foo}}");
    let mustache = only_mustache(&template);

    let path = mustache.path.as_path().expect("path");
    assert_eq!(path.head, PathHead::Var("foo".to_owned()));
    assert!(path.tail.is_empty());
    assert_eq!(path.original, "foo");
    assert!(!mustache.trusting);
    assert_eq!(mustache.span, Span::new(0, 7));
}

#[test]
fn test_parse_params_and_hash() {
    let template = parse(r#"{{helper a.b "str" 1 key=value other=true}}"#);
    let mustache = only_mustache(&template);

    assert_eq!(mustache.params.len(), 3);
    let first = mustache.params[0].as_path().expect("path param");
    assert_eq!(first.head, PathHead::Var("a".to_owned()));
    assert_eq!(first.tail, vec!["b".to_owned()]);
    assert!(matches!(
        &mustache.params[1],
        Expression::Literal(lit) if lit.value == LiteralValue::String("str".to_owned())
    ));
    assert!(matches!(
        &mustache.params[2],
        Expression::Literal(lit) if lit.value == LiteralValue::Number(1.0)
    ));

    let keys: Vec<_> = mustache.hash.pairs.iter().map(|p| p.key.as_str()).collect();
    assert_eq!(keys, vec!["key", "other"]);
    assert!(matches!(
        &mustache.hash.get("other").expect("other").value,
        Expression::Literal(lit) if lit.value == LiteralValue::Boolean(true)
    ));
}

#[test]
fn test_parse_hash_span() {
    let template = parse("{{f a=1 b=2}}");
    let mustache = only_mustache(&template);
    assert_eq!(mustache.hash.span, Span::new(4, 11));
}

#[test]
fn test_parse_this_and_data_heads() {
    let template = parse("{{this.name}}{{@arg.x}}{{this}}");
    let heads: Vec<_> = template
        .body
        .iter()
        .map(|stmt| match stmt {
            Statement::Mustache(m) => m.path.as_path().expect("path").head.clone(),
            other => panic!("unexpected {other:?}"),
        })
        .collect();
    assert_eq!(
        heads,
        vec![
            PathHead::This,
            PathHead::At("arg".to_owned()),
            PathHead::This
        ]
    );
}

#[test]
fn test_parse_trusting_forms() {
    let template = parse("{{{a}}}{{&b}}{{c}}");
    let trusting: Vec<_> = template
        .body
        .iter()
        .map(|stmt| match stmt {
            Statement::Mustache(m) => m.trusting,
            other => panic!("unexpected {other:?}"),
        })
        .collect();
    assert_eq!(trusting, vec![true, true, false]);
}

#[test]
fn test_parse_literal_segment() {
    let template = parse("{{foo.[bar baz]}}");
    let path = only_mustache(&template).path.as_path().expect("path");
    assert_eq!(path.tail, vec!["bar baz".to_owned()]);
}

#[test]
fn test_parse_slash_path_is_one_part() {
    let template = parse("{{foo/bar}}");
    let path = only_mustache(&template).path.as_path().expect("path");
    assert_eq!(path.head, PathHead::Var("foo/bar".to_owned()));
    assert_eq!(path.original, "foo/bar");
}

#[test]
fn test_parse_sub_expressions() {
    let template = parse("{{f (g 1) k=(h)}}");
    let mustache = only_mustache(&template);

    let Expression::SubExpression(sexpr) = &mustache.params[0] else {
        panic!("expected a sub-expression param");
    };
    assert_eq!(sexpr.path.as_path().expect("path").original, "g");
    assert_eq!(sexpr.params.len(), 1);
    assert_eq!(sexpr.span, Span::new(4, 9));
    assert!(matches!(
        &mustache.hash.get("k").expect("k").value,
        Expression::SubExpression(_)
    ));
}

#[test]
fn test_parse_literal_mustache() {
    let template = parse(r#"{{"hello"}}{{null}}"#);
    assert!(template.body.iter().all(|stmt| matches!(
        stmt,
        Statement::Mustache(m) if m.path.is_literal()
    )));
}

#[test]
fn test_parse_strip_flags() {
    let template = parse("{{~foo~}}");
    let mustache = only_mustache(&template);
    assert!(mustache.strip.open);
    assert!(mustache.strip.close);
}

// ─── Blocks ───

#[test]
fn test_parse_block_with_block_params() {
    let template = parse("{{#each list key=\"id\" as |item i|}}{{item}}{{/each}}");
    let block = only_block(&template);

    assert_eq!(block.path.as_path().expect("path").original, "each");
    assert_eq!(block.params.len(), 1);
    assert!(block.hash.get("key").is_some());
    assert_eq!(
        block.program.block_params,
        vec!["item".to_owned(), "i".to_owned()]
    );
    assert_eq!(block.program.body.len(), 1);
    assert!(block.inverse.is_none());
}

#[test]
fn test_parse_block_with_else() {
    let template = parse("{{#if cond}}A{{else}}B{{/if}}");
    let block = only_block(&template);

    let inverse = block.inverse.as_ref().expect("inverse");
    assert!(!inverse.chained);
    assert!(matches!(
        inverse.body.as_slice(),
        [Statement::Text(text)] if text.chars == "B"
    ));
    assert_eq!(block.span, Span::new(0, 29));
}

#[test]
fn test_parse_else_if_chain() {
    let template = parse("{{#if a}}A{{else if b}}B{{else}}C{{/if}}");
    let block = only_block(&template);

    let inverse = block.inverse.as_ref().expect("inverse");
    assert!(inverse.chained);
    let [Statement::Block(nested)] = inverse.body.as_slice() else {
        panic!("expected the chained block, got {:?}", inverse.body);
    };
    assert_eq!(nested.path.as_path().expect("path").original, "if");
    assert_eq!(nested.params[0].as_path().expect("path").original, "b");
    let nested_inverse = nested.inverse.as_ref().expect("nested inverse");
    assert!(matches!(
        nested_inverse.body.as_slice(),
        [Statement::Text(text)] if text.chars == "C"
    ));
}

#[test]
fn test_parse_else_keyword_variant() {
    let template = parse("{{#let x as |y|}}{{y}}{{else let z as |w|}}{{w}}{{/let}}");
    let block = only_block(&template);
    let inverse = block.inverse.as_ref().expect("inverse");
    let [Statement::Block(nested)] = inverse.body.as_slice() else {
        panic!("expected the chained block");
    };
    assert_eq!(nested.program.block_params, vec!["w".to_owned()]);
}

#[test]
fn test_parse_nested_blocks() {
    let template = parse("{{#if a}}{{#if b}}x{{/if}}{{/if}}");
    let outer = only_block(&template);
    assert!(matches!(outer.program.body.as_slice(), [Statement::Block(_)]));
}

#[test]
fn test_parse_partial_statement() {
    let template = parse("{{> sidebar}}");
    assert!(matches!(template.body.as_slice(), [Statement::Partial(_)]));
}

// ─── Errors ───

#[test]
fn test_error_unclosed_mustache() {
    let error = parse_err("{{foo");
    assert_eq!(error.code, ErrorCode::E1002);
    assert!(error.message.ends_with("got 'EOF'"), "{}", error.message);
}

#[test]
fn test_error_unexpected_token() {
    let error = parse_err("{{foo}");
    assert_eq!(error.code, ErrorCode::E1001);
    let CompileErrorKind::Parse { expected, found } = &error.kind else {
        panic!("expected a parse error kind");
    };
    assert_eq!(found, "INVALID");
    assert_eq!(expected.first().map(String::as_str), Some("CLOSE"));
}

#[test]
fn test_error_missing_hash_value() {
    let error = parse_err("{{f key=}}");
    assert_eq!(error.code, ErrorCode::E1001);
    assert!(error.message.starts_with("Expecting 'OPEN_SEXPR'"));
}

#[test]
fn test_error_block_mismatch() {
    let error = parse_err("{{#if a}}x{{/unless}}");
    assert_eq!(error.code, ErrorCode::E1004);
    assert_eq!(error.message, "if doesn't match unless");
    assert_eq!(error.span, Span::new(3, 5));
}

#[test]
fn test_error_unclosed_block() {
    let error = parse_err("{{#if a}}x");
    assert_eq!(error.code, ErrorCode::E1002);
}

#[test]
fn test_error_stray_else() {
    let error = parse_err("a{{else}}b");
    assert_eq!(error.code, ErrorCode::E1001);
}

#[test]
fn test_error_literal_callee() {
    let error = parse_err(r#"{{"foo" bar}}"#);
    assert_eq!(error.code, ErrorCode::E1001);
    assert_eq!(
        error.message,
        r#"StringLiteral "foo" cannot be called as a sub-expression, replace ("foo") with "foo""#
    );
}

#[test]
fn test_error_literal_block_callee() {
    let error = parse_err("{{#true}}{{/true}}");
    assert_eq!(error.code, ErrorCode::E1001);
    assert!(error.message.starts_with("BooleanLiteral"));
}

#[test]
fn test_error_empty_block_params() {
    let error = parse_err("{{#each xs as ||}}{{/each}}");
    assert_eq!(error.code, ErrorCode::E1001);
}

#[test]
fn test_error_paths() {
    let cases = [
        ("{{../foo}}", r#"Changing context using "../" is not supported in Glimmer"#),
        ("{{./foo}}", r#"Using "./" is not supported in Glimmer and unnecessary"#),
        ("{{foo.this}}", "Invalid path: foo.this"),
        (
            "{{foo.bar/baz}}",
            "Mixing '.' and '/' in paths is not supported in Glimmer; use only '.' to separate property paths",
        ),
    ];
    for (source, message) in cases {
        let error = parse_err(source);
        assert_eq!(error.code, ErrorCode::E1003, "{source}");
        assert_eq!(error.message, message, "{source}");
    }
}

#[test]
fn test_error_unsupported_handlebars() {
    for source in [
        "{{^foo}}x{{/foo}}",
        "{{#> layout}}x{{/layout}}",
        "{{* deco}}",
        "{{#* inline}}x{{/inline}}",
        "{{{{raw}}}}x{{{{/raw}}}}",
    ] {
        let error = parse_err(source);
        assert_eq!(error.code, ErrorCode::E1005, "{source}");
    }
}

#[test]
fn test_error_raw_block_stops_at_opener() {
    let error = parse_err("{{{{raw}}}}x{{{{/raw}}}}");
    assert_eq!(error.message, "Handlebars raw blocks are not supported");
    assert_eq!(error.span, Span::new(0, 4));
}

#[test]
fn test_error_unclosed_mustache_location() {
    let error = parse_err("a\n{{foo");
    assert_eq!(error.code, ErrorCode::E1002);
    assert_eq!((error.line(), error.column()), (2, 5));
}

#[test]
fn test_error_location() {
    let error = parse_err("<div>\n  {{#if a}}\n  {{/each}}\n</div>");
    assert_eq!(error.code, ErrorCode::E1004);
    assert_eq!(error.line(), 2);
    assert_eq!(error.column(), 5);
    assert_eq!(error.module_name, "an unknown module");
}
