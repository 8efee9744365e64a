//! Encoder tests, driven through the real parser and normalizer.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::{json, Value};
use stencil_ir::SourceIndex;
use stencil_normalize::{normalize, NormalizeOptions};
use stencil_parse::{parse, ParseMode};

use super::encode;
use crate::{attribute_namespace, WireProgram};

fn compile_with(source: &str, options: &NormalizeOptions) -> WireProgram {
    let index = SourceIndex::new(source, "an unknown module");
    let parsed = parse(&index, ParseMode::Precompile).expect("template should parse");
    let normalized =
        normalize(&parsed.template, &index, options).expect("template should normalize");
    encode(&normalized.template, &normalized.symbols)
}

fn compile(source: &str) -> WireProgram {
    compile_with(source, &NormalizeOptions::default())
}

/// The program as a JSON value.
fn program(source: &str) -> Value {
    serde_json::to_value(compile(source)).unwrap()
}

/// Only the statement list.
fn statements(source: &str) -> Value {
    let mut program = program(source);
    program[0].take()
}

// ─── Content ───

#[test]
fn test_simple_element_flattens() {
    assert_eq!(
        statements("<div>hi</div>"),
        json!([[10, "div"], [12], [1, "hi"], [13]])
    );
}

#[test]
fn test_nested_elements_and_comments() {
    assert_eq!(
        statements("<ul><li>a</li></ul><!-- b -->{{! dropped }}"),
        json!([[10, "ul"], [12], [10, "li"], [12], [1, "a"], [13], [13], [3, " b "]])
    );
}

#[test]
fn test_appends() {
    assert_eq!(
        statements("{{foo}}{{{bar}}}{{this.baz}}{{@qux.a}}"),
        json!([
            [1, [34, 0]],
            [2, [36, 1]],
            [1, [30, 0, ["baz"]]],
            [1, [30, 1, ["a"]]]
        ])
    );
}

#[test]
fn test_helper_call_literals() {
    assert_eq!(
        statements(r#"{{format 1 2.5 "s" true null undefined key=value}}"#),
        json!([[
            1,
            [28, [35, 0], [1, 2.5, "s", true, null, [27]], [["key"], [[34, 1]]]]
        ]])
    );
}

#[test]
fn test_if_with_inverse() {
    assert_eq!(
        statements("{{#if cond}}A{{else}}B{{/if}}"),
        json!([[41, [34, 0], [[[1, "A"]], []], [[[1, "B"]], []]]])
    );
}

#[test]
fn test_each_with_key() {
    let program = program(r#"{{#each items key="id" as |item|}}{{item.name}}{{/each}}"#);
    assert_eq!(
        program,
        json!([
            [[42, [34, 0], "id", [[[1, [30, 1, ["name"]]]], [1]], null]],
            ["item"],
            false,
            ["items"]
        ])
    );
}

#[test]
fn test_block_invocation_names_blocks() {
    assert_eq!(
        statements("{{#my-list items as |x|}}{{x}}{{else}}empty{{/my-list}}"),
        json!([[
            6,
            [39, 0],
            [[34, 1]],
            null,
            [["default", "else"], [[[[1, [30, 1]]], [1]], [[[1, "empty"]], []]]]
        ]])
    );
}

#[test]
fn test_with_let_and_dynamic_vars() {
    assert_eq!(
        statements(concat!(
            "{{#with a as |x|}}{{x}}{{/with}}",
            "{{#let b 1 as |y z|}}{{z}}{{/let}}",
            "{{#-with-dynamic-vars outletState=c}}{{-get-dynamic-var \"outletState\"}}{{/-with-dynamic-vars}}",
        )),
        json!([
            [43, [34, 0], [[[1, [30, 1]]], [1]], null],
            [44, [[34, 1], 1], [[[1, [30, 3]]], [2, 3]]],
            [45, [["outletState"], [[34, 2]]], [[[1, [53, "outletState"]]], []]]
        ])
    );
}

#[test]
fn test_in_element() {
    assert_eq!(
        statements(
            "{{#in-element dest}}a{{/in-element}}{{#in-element dest insertBefore=null}}b{{/in-element}}"
        ),
        json!([
            [40, [[[1, "a"]], []], "%cursor:0%", [34, 0]],
            [40, [[[1, "b"]], []], "%cursor:1%", [34, 0], null]
        ])
    );
}

#[test]
fn test_yield_and_block_queries() {
    let program = program(
        r#"{{yield a to="header"}}{{yield}}{{has-block}}{{has-block-params "header"}}"#,
    );
    assert_eq!(
        program,
        json!([
            [
                [18, 1, [[34, 0]]],
                [18, 2, null],
                [1, [48, [30, 2]]],
                [1, [49, [30, 1]]]
            ],
            ["&header", "&default"],
            false,
            ["a"]
        ])
    );
}

#[test]
fn test_debugger_sets_has_eval() {
    let program = program("{{@name}}{{debugger}}");
    assert_eq!(
        program,
        json!([[[1, [30, 1]], [26, [1]]], ["@name"], true, []])
    );
}

#[test]
fn test_inline_keywords() {
    assert_eq!(
        statements(concat!(
            r#"{{if a "y"}}"#,
            r#"{{unless a "y" "n"}}"#,
            r#"{{log a}}"#,
        )),
        json!([
            [1, [52, [34, 0], "y", null]],
            [1, [52, [51, [34, 0]], "y", "n"]],
            [1, [54, [[34, 0]]]]
        ])
    );
}

#[test]
fn test_curry_and_dynamic_component() {
    assert_eq!(
        statements(concat!(
            r#"{{foo (component "x-bar" a=1)}}"#,
            r#"{{component "x-baz"}}"#,
            r#"{{#component "x-qux"}}hi{{/component}}"#,
        )),
        json!([
            [1, [28, [35, 0], [[50, "x-bar", 0, null, [["a"], [1]]]], null]],
            [46, "x-baz", null, null, null],
            [46, "x-qux", null, null, [["default"], [[[[1, "hi"]], []]]]]
        ])
    );
}

#[test]
fn test_partial_keyword() {
    assert_eq!(
        statements(r#"{{partial "card"}}"#),
        json!([[19, "card", []]])
    );
}

// ─── Elements ───

#[test]
fn test_component_invocation() {
    let program = program("<Foo @bar={{baz}} />");
    assert_eq!(
        program,
        json!([
            [[8, [39, 0], null, [["@bar"], [[36, 1]]], [[], []]]],
            [],
            false,
            ["Foo", "baz"]
        ])
    );
}

#[test]
fn test_component_attributes_and_blocks() {
    assert_eq!(
        statements(r#"<Foo class="a" title={{x}} ...attributes as |y|>{{y}}</Foo>"#),
        json!([[
            8,
            [39, 0],
            [[24, "class", "a"], [16, "title", [36, 1]], [17, 1]],
            null,
            [["default"], [[[[1, [30, 2]]], [2]]]]
        ]])
    );
}

#[test]
fn test_named_blocks() {
    assert_eq!(
        statements("<Foo><:header>h</:header><:body as |b|>{{b}}</:body></Foo>"),
        json!([[
            8,
            [39, 0],
            null,
            null,
            [["header", "body"], [[[[1, "h"]], []], [[[1, [30, 1]]], [1]]]]
        ]])
    );
}

#[test]
fn test_attribute_kinds() {
    assert_eq!(
        statements(r#"<div class="a {{b}}" title={{c}} data-raw={{{d}}} hidden></div>"#),
        json!([
            [10, "div"],
            [15, "class", [29, ["a ", [36, 0]]]],
            [15, "title", [36, 1]],
            [22, "data-raw", [36, 2]],
            [14, "hidden", ""],
            [12],
            [13]
        ])
    );
}

#[test]
fn test_boolean_literal_attributes() {
    assert_eq!(
        statements("<input disabled={{true}} checked={{false}}>"),
        json!([[10, "input"], [14, "disabled", ""], [12], [13]])
    );
}

#[test]
fn test_type_attribute_moves_last() {
    assert_eq!(
        statements(r#"<input type="text" class="a" {{on "input" go}}>"#),
        json!([
            [10, "input"],
            [14, "class", "a"],
            [14, "type", "text"],
            [4, [38, 0], ["input", [34, 1]], null],
            [12],
            [13]
        ])
    );
}

#[test]
fn test_type_attribute_keeps_place_with_splat() {
    assert_eq!(
        statements(r#"<input type="text" ...attributes class="a">"#),
        json!([
            [11, "input"],
            [14, "type", "text"],
            [17, 1],
            [14, "class", "a"],
            [12],
            [13]
        ])
    );
}

#[test]
fn test_namespaced_attributes() {
    assert_eq!(
        statements(
            r##"<svg xmlns="http://www.w3.org/2000/svg"><use xlink:href={{ref}}></use></svg>"##
        ),
        json!([
            [10, "svg"],
            [14, "xmlns", "http://www.w3.org/2000/svg", "http://www.w3.org/2000/xmlns/"],
            [12],
            [10, "use"],
            [15, "xlink:href", [36, 0], "http://www.w3.org/1999/xlink"],
            [12],
            [13],
            [13]
        ])
    );
}

#[test]
fn test_attribute_namespace_table() {
    assert_eq!(attribute_namespace("xml:lang"), Some("http://www.w3.org/XML/1998/namespace"));
    assert_eq!(attribute_namespace("xmlns:xlink"), Some("http://www.w3.org/2000/xmlns/"));
    assert_eq!(attribute_namespace("xlink:arcrole"), Some("http://www.w3.org/1999/xlink"));
    assert_eq!(attribute_namespace("xlink:unknown"), None);
    assert_eq!(attribute_namespace("class"), None);
}

#[test]
fn test_modifier_with_hash() {
    assert_eq!(
        statements(r#"<button {{on "click" this.go passive=true}}></button>"#),
        json!([
            [10, "button"],
            [4, [38, 0], ["click", [30, 0, ["go"]]], [["passive"], [true]]],
            [12],
            [13]
        ])
    );
}

// ─── Strict mode ───

#[test]
fn test_strict_free_variables() {
    let options = NormalizeOptions {
        strict_mode: true,
        locals: vec!["x".to_owned(), "Button".to_owned()],
        ..NormalizeOptions::default()
    };
    let program = serde_json::to_value(compile_with("{{x.y}}<Button />", &options)).unwrap();
    assert_eq!(
        program,
        json!([
            [[1, [31, 0, ["y"]]], [8, [31, 1], null, null, [[], []]]],
            [],
            false,
            ["x", "Button"]
        ])
    );
}

#[test]
fn test_encoding_is_repeatable() {
    let source = "{{#each xs as |x|}}<Foo @a={{x}} {{m y}} />{{z}}{{/each}}";
    let index = SourceIndex::new(source, "an unknown module");
    let parsed = parse(&index, ParseMode::Precompile).unwrap();
    let normalized = normalize(&parsed.template, &index, &NormalizeOptions::default()).unwrap();
    let first = encode(&normalized.template, &normalized.symbols);
    let second = encode(&normalized.template, &normalized.symbols);
    assert_eq!(first, second);
    assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
}

// ─── Laws ───

fn attr_value() -> impl Strategy<Value = (&'static str, Option<&'static str>)> {
    // (source text, expected static value; None when omitted)
    prop_oneof![
        Just(("{{true}}", Some(""))),
        Just(("{{false}}", None)),
        Just((r#""x""#, Some("x"))),
    ]
}

proptest! {
    #[test]
    fn false_attributes_are_omitted(values in prop::collection::vec(attr_value(), 1..8)) {
        let attrs: String = values
            .iter()
            .enumerate()
            .map(|(i, (text, _))| format!(" a{i}={text}"))
            .collect();
        let emitted = statements(&format!("<div{attrs}></div>"));
        let expected: Vec<Value> = values
            .iter()
            .enumerate()
            .filter_map(|(i, (_, value))| value.map(|value| json!([14, format!("a{i}"), value])))
            .collect();
        let emitted = emitted.as_array().unwrap();
        prop_assert_eq!(&emitted[1..emitted.len() - 2], &expected[..]);
    }

    #[test]
    fn upvars_follow_first_use(picks in prop::collection::vec(0usize..5, 1..16)) {
        let pool = ["a", "b", "c", "d", "e"];
        let source: String = picks.iter().map(|&i| format!("<p>{{{{{}}}}}</p>", pool[i])).collect();
        let first = compile(&source);
        let second = compile(&source);
        prop_assert_eq!(&first, &second);

        let mut expected: Vec<&str> = Vec::new();
        for &i in &picks {
            if !expected.contains(&pool[i]) {
                expected.push(pool[i]);
            }
        }
        prop_assert_eq!(first.upvars, expected);
    }
}
