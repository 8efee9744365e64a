//! Keyword desugaring.

use pretty_assertions::assert_eq;
use stencil_diagnostic::ErrorCode;
use stencil_ir::norm::{Content, CurriedType, Expr, LiteralValue, Resolution, VariableKind};

use super::{appended, head, loose, loose_err, names, only, run, strict_options};

#[test]
fn test_if_block_with_inverse() {
    let output = loose("{{#if cond}}A{{else}}B{{/if}}");
    let Content::If(content) = only(&output) else {
        panic!("expected if");
    };
    assert_eq!(head(&content.condition).kind, VariableKind::Free {
        upvar: 0,
        resolution: Resolution::FALLBACK,
    });
    assert!(matches!(&content.block.body[..], [Content::Text(t)] if t.chars == "A"));
    let inverse = content.inverse.as_ref().expect("inverse block");
    assert!(matches!(&inverse.body[..], [Content::Text(t)] if t.chars == "B"));
}

#[test]
fn test_unless_negates_condition() {
    let output = loose("{{#unless cond}}A{{/unless}}");
    let Content::If(content) = only(&output) else {
        panic!("expected if");
    };
    assert!(matches!(&content.condition, Expr::Not(_)));
    assert!(content.inverse.is_none());
}

#[test]
fn test_else_if_chain_nests() {
    let output = loose("{{#if a}}1{{else if b}}2{{else}}3{{/if}}");
    let Content::If(outer) = only(&output) else {
        panic!("expected if");
    };
    let inverse = outer.inverse.as_ref().expect("inverse");
    let [Content::If(inner)] = &inverse.body[..] else {
        panic!("expected a chained if, found {:?}", inverse.body);
    };
    assert_eq!(head(&inner.condition).name, "b");
    assert!(inner.inverse.is_some());
}

#[test]
fn test_if_arity() {
    let err = loose_err("{{#if}}{{/if}}");
    assert_eq!(err.code, ErrorCode::E2011);
    assert_eq!(
        err.message,
        "`{{#if}}` requires exactly 1 positional argument, but received 0"
    );

    let err = loose_err("{{#if a b}}{{/if}}");
    assert_eq!(err.code, ErrorCode::E2011);

    let err = loose_err("{{#if a key=b}}{{/if}}");
    assert_eq!(
        err.message,
        "`{{#if}}` does not take any named arguments, but received `key`"
    );
}

#[test]
fn test_each_with_key() {
    let output = loose(r#"{{#each items key="id" as |item|}}{{item.name}}{{/each}}"#);
    let Content::Each(each) = only(&output) else {
        panic!("expected each");
    };
    assert_eq!(
        each.key.as_ref().and_then(Expr::as_literal),
        Some(&LiteralValue::String("id".to_owned()))
    );
    assert_eq!(each.block.params, [1]);
    assert_eq!(names(output.symbols.symbols()), ["item"]);
    assert!(each.inverse.is_none());
}

#[test]
fn test_each_rejects_other_named_arguments() {
    let err = loose_err(r#"{{#each items foo="id"}}{{/each}}"#);
    assert_eq!(err.code, ErrorCode::E2011);
    assert_eq!(
        err.message,
        "`{{#each}}` does not take a named argument `foo`; it only accepts `key`"
    );
}

#[test]
fn test_with_and_let() {
    let output = loose(
        "{{#with a as |x|}}{{x}}{{else}}none{{/with}}{{#let b c as |y z|}}{{z}}{{/let}}",
    );
    let [Content::With(with), Content::Let(let_)] = &output.template.body[..] else {
        panic!("unexpected body {:?}", output.template.body);
    };
    assert_eq!(with.block.params, [1]);
    assert!(with.inverse.is_some());
    assert_eq!(let_.positional.len(), 2);
    assert_eq!(let_.block.params, [2, 3]);
    assert_eq!(head(appended(&let_.block.body[0])).kind, VariableKind::Local(3));
}

#[test]
fn test_let_rejects_inverse() {
    let err = loose_err("{{#let a as |x|}}{{x}}{{else}}no{{/let}}");
    assert_eq!(err.code, ErrorCode::E2011);
    assert_eq!(err.message, "`{{#let}}` cannot receive an {{else}} block");
}

#[test]
fn test_in_element_guids_count_up() {
    let output = loose(
        "{{#in-element dest}}a{{/in-element}}{{#in-element dest insertBefore=null}}b{{/in-element}}",
    );
    let [Content::InElement(first), Content::InElement(second)] = &output.template.body[..] else {
        panic!("unexpected body {:?}", output.template.body);
    };
    assert_eq!(first.guid, "%cursor:0%");
    assert!(first.insert_before.is_none());
    assert_eq!(second.guid, "%cursor:1%");
    assert_eq!(
        second.insert_before.as_ref().and_then(Expr::as_literal),
        Some(&LiteralValue::Null)
    );
}

#[test]
fn test_in_element_rejects_guid() {
    let err = loose_err(r#"{{#in-element dest guid="x"}}{{/in-element}}"#);
    assert_eq!(err.code, ErrorCode::E2011);
    assert_eq!(err.message, "Cannot pass `guid` to `{{#in-element}}`");
}

#[test]
fn test_yield_targets() {
    let output = loose(r#"{{yield a}}{{yield to="inverse"}}{{yield to="header"}}"#);
    let targets: Vec<u32> = output
        .template
        .body
        .iter()
        .map(|content| match content {
            Content::Yield(y) => y.target,
            other => panic!("expected yield, found {other:?}"),
        })
        .collect();
    assert_eq!(targets, [1, 2, 3]);
    assert_eq!(
        names(output.symbols.symbols()),
        ["&default", "&else", "&header"]
    );
}

#[test]
fn test_yield_to_must_be_a_string() {
    let err = loose_err("{{yield to=foo}}");
    assert_eq!(err.code, ErrorCode::E2011);
    assert_eq!(err.message, "you can only yield to a literal string value");

    let err = loose_err(r#"{{yield from="x"}}"#);
    assert_eq!(err.code, ErrorCode::E2011);
}

#[test]
fn test_has_block_forms() {
    let output = loose(r#"{{has-block}}{{if (has-block-params "header") "y"}}"#);
    let body = &output.template.body;
    assert!(matches!(appended(&body[0]), Expr::HasBlock(block) if block.slot == 1));
    let Expr::IfInline(inline) = appended(&body[1]) else {
        panic!("expected an inline if");
    };
    assert!(matches!(&*inline.condition, Expr::HasBlockParams(block) if block.slot == 2));
    assert!(inline.falsy.is_none());
    assert_eq!(names(output.symbols.symbols()), ["&default", "&header"]);
}

#[test]
fn test_has_block_requires_literal_name() {
    let err = loose_err("{{has-block foo}}");
    assert_eq!(err.code, ErrorCode::E2011);
    assert_eq!(
        err.message,
        "`{{has-block}}` can only receive a string literal as its first argument"
    );
}

#[test]
fn test_inline_unless_in_attribute() {
    let output = loose(r#"<div class={{unless a "x" "y"}}></div>"#);
    let Content::SimpleElement(element) = only(&output) else {
        panic!("expected an element");
    };
    let stencil_ir::norm::ElementAttr::Attr(attr) = &element.params.attrs[0] else {
        panic!("expected an attribute");
    };
    let Expr::IfInline(inline) = &attr.value else {
        panic!("expected an inline if");
    };
    assert!(matches!(&*inline.condition, Expr::Not(_)));
    assert!(inline.falsy.is_some());
}

#[test]
fn test_inline_if_arity() {
    let err = loose_err("{{foo (if a)}}");
    assert_eq!(err.code, ErrorCode::E2011);
    assert_eq!(
        err.message,
        "`(if)` requires between 2 and 3 positional arguments, but received 1"
    );
}

#[test]
fn test_debugger_captures_visible_slots() {
    let output = loose("{{@foo}}{{#each xs as |x|}}{{debugger}}{{/each}}{{debugger}}");
    assert!(output.symbols.has_eval());
    let body = &output.template.body;
    let Content::Each(each) = &body[1] else {
        panic!("expected each");
    };
    let Content::Debugger(inner) = &each.block.body[0] else {
        panic!("expected debugger");
    };
    assert_eq!(inner.eval, [1, 2]);
    let Content::Debugger(outer) = &body[2] else {
        panic!("expected debugger");
    };
    assert_eq!(outer.eval, [1]);
}

#[test]
fn test_partial_keyword() {
    let output = loose(r#"{{partial "card"}}"#);
    let Content::Partial(partial) = only(&output) else {
        panic!("expected partial");
    };
    assert!(partial.eval.is_empty());
    assert!(output.symbols.has_eval());

    let err = run(r#"{{partial "card"}}"#, &strict_options(&[])).unwrap_err();
    assert_eq!(err.code, ErrorCode::E3004);
}

#[test]
fn test_component_keyword_invokes_and_curries() {
    let output = loose(concat!(
        r#"{{component "x-foo" a=1}}"#,
        r#"{{#component "x-bar"}}hi{{/component}}"#,
        r#"{{baz (component "x-baz" b)}}"#,
    ));
    let body = &output.template.body;
    let Content::InvokeDynamicComponent(append) = &body[0] else {
        panic!("expected a dynamic component");
    };
    assert!(append.blocks.is_empty());
    assert_eq!(append.args.named[0].name, "a");
    let Content::InvokeDynamicComponent(block) = &body[1] else {
        panic!("expected a dynamic component block");
    };
    assert_eq!(block.blocks.len(), 1);
    let Expr::Call(call) = appended(&body[2]) else {
        panic!("expected a call");
    };
    let Expr::Curry(curry) = &call.args.positional[0] else {
        panic!("expected a curried component");
    };
    assert_eq!(curry.curried, CurriedType::Component);
    assert_eq!(curry.args.positional.len(), 1);
}

#[test]
fn test_curry_requires_definition() {
    let err = loose_err("{{foo (helper)}}");
    assert_eq!(err.code, ErrorCode::E2011);
    assert_eq!(
        err.message,
        "`(helper)` requires at least 1 positional argument, but received 0"
    );
}

#[test]
fn test_curry_by_name_is_loose_only() {
    let err = run(r#"{{foo (modifier "on")}}"#, &strict_options(&["foo"])).unwrap_err();
    assert_eq!(err.code, ErrorCode::E3004);
}

#[test]
fn test_log_and_dynamic_vars() {
    let output = loose(concat!(
        r#"{{log a "b"}}"#,
        r#"{{#-with-dynamic-vars outletState=x}}"#,
        r#"{{-get-dynamic-var "outletState"}}"#,
        r#"{{/-with-dynamic-vars}}"#,
    ));
    let body = &output.template.body;
    assert!(matches!(appended(&body[0]), Expr::Log(args) if args.positional.len() == 2));
    let Content::WithDynamicVars(vars) = &body[1] else {
        panic!("expected dynamic vars");
    };
    assert_eq!(vars.named[0].name, "outletState");
    assert!(matches!(appended(&vars.block.body[0]), Expr::GetDynamicVar(_)));
}

#[test]
fn test_with_dynamic_vars_needs_named_arguments() {
    let err = loose_err("{{#-with-dynamic-vars}}{{/-with-dynamic-vars}}");
    assert_eq!(err.code, ErrorCode::E2011);
}

#[test]
fn test_log_rejects_named_arguments() {
    let err = loose_err("{{log a=1}}");
    assert_eq!(err.code, ErrorCode::E2011);
}

#[test]
fn test_keyword_only_on_bare_free_head() {
    let output = loose("{{this.yield}}");
    let var = head(appended(only(&output)));
    assert_eq!(var.kind, VariableKind::This);
    assert!(output.symbols.symbols().is_empty());
}
