//! End-to-end compiles through the public entry points.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::{json, Value};
use stencil_diagnostic::{CompileErrorKind, ErrorCode};
use stencil_ir::ast::{MustacheStatement, Statement, TextNode};
use stencil_ir::traverse::{HookResult, Transform, Visitor};
use stencil_parse::ParseMode;

use crate::{
    compile, compile_batch, compile_with_diagnostics, AstPlugin, CompileOptions, PluginEnv,
};

fn program(source: &str, options: &CompileOptions) -> Value {
    serde_json::to_value(compile(source, options).expect("template should compile")).unwrap()
}

fn loose(source: &str) -> Value {
    program(source, &CompileOptions::default())
}

// ─── Scenarios ───

#[test]
fn test_simple_element() {
    assert_eq!(
        loose("<div>hi</div>"),
        json!([[[10, "div"], [12], [1, "hi"], [13]], [], false, []])
    );
}

#[test]
fn test_if_else() {
    assert_eq!(
        loose("{{#if cond}}A{{else}}B{{/if}}"),
        json!([
            [[41, [34, 0], [[[1, "A"]], []], [[[1, "B"]], []]]],
            [],
            false,
            ["cond"]
        ])
    );
}

#[test]
fn test_self_closing_component() {
    assert_eq!(
        loose("<Foo @bar={{baz}} />"),
        json!([
            [[8, [39, 0], null, [["@bar"], [[36, 1]]], [[], []]]],
            [],
            false,
            ["Foo", "baz"]
        ])
    );
}

#[test]
fn test_each_with_key() {
    assert_eq!(
        loose(r#"{{#each items key="id" as |item|}}{{item.name}}{{/each}}"#),
        json!([
            [[42, [34, 0], "id", [[[1, [30, 1, ["name"]]]], [1]], null]],
            ["item"],
            false,
            ["items"]
        ])
    );
}

#[test]
fn test_strict_mode_rejects_unknown_names() {
    let options = CompileOptions::new().strict_mode(true);
    let err = compile("{{x}}", &options).unwrap_err();
    assert_eq!(err.code, ErrorCode::E3001);
    assert_eq!(err.kind, CompileErrorKind::Resolution);
    assert_eq!((err.line(), err.column()), (1, 2));
    assert!(err
        .to_string()
        .contains("(error occurred in 'an unknown module' @ line 1 : column 2)"));
}

// ─── Options ───

#[test]
fn test_strict_mode_reports_used_locals() {
    let options = CompileOptions::new()
        .strict_mode(true)
        .locals(["y", "x", "unused"]);
    let output = compile_with_diagnostics("{{x}}{{y}}{{x}}", &options).unwrap();
    assert_eq!(output.used_locals, ["x", "y"]);
    assert_eq!(output.program.upvars, ["x", "y"]);
}

#[test]
fn test_locals_ignored_outside_strict_mode() {
    let options = CompileOptions::new().locals(["x"]);
    let output = compile_with_diagnostics("{{x}}", &options).unwrap();
    assert!(output.used_locals.is_empty());
    assert_eq!(
        serde_json::to_value(&output.program).unwrap()[0],
        json!([[1, [34, 0]]])
    );
}

#[test]
fn test_module_name_in_errors() {
    let options = CompileOptions::new().module_name("app/templates/index.hbs");
    let err = compile("{{#if}}{{/if}}", &options).unwrap_err();
    assert_eq!(err.module_name, "app/templates/index.hbs");
    assert_eq!(err.code, ErrorCode::E2011);
}

#[test]
fn test_customized_component_names() {
    let options = CompileOptions::new().customize_component_name(|tag| tag.to_lowercase());
    let program = program("<FooBar />", &options);
    assert_eq!(program[3], json!(["foobar"]));
}

#[test]
fn test_tokenizer_warnings_are_returned() {
    let output = compile_with_diagnostics("<div =foo></div>", &CompileOptions::default()).unwrap();
    let codes: Vec<_> = output.warnings.iter().map(|w| w.code).collect();
    assert_eq!(codes, [ErrorCode::E0001]);
    assert!(!output.program.statements.is_empty());
}

#[test]
fn test_codemod_keeps_entities() {
    let source = "<p>&amp;</p>";
    assert_eq!(loose(source)[0][2], json!([1, "&"]));
    let codemod = CompileOptions::new().mode(ParseMode::Codemod);
    assert_eq!(program(source, &codemod)[0][2], json!([1, "&amp;"]));
}

#[test]
fn test_batch_keeps_order() {
    let sources = vec![
        ("a.hbs".to_owned(), "<p>{{a}}</p>".to_owned()),
        ("b.hbs".to_owned(), "{{#if}}{{/if}}".to_owned()),
        ("c.hbs".to_owned(), "{{c}}".to_owned()),
    ];
    let results = compile_batch(&sources, &CompileOptions::default());
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap().program.upvars, ["a"]);
    assert_eq!(results[1].as_ref().unwrap_err().module_name, "b.hbs");
    assert_eq!(results[2].as_ref().unwrap().program.upvars, ["c"]);
}

// ─── Plugins ───

/// Replaces `{{name}}` with literal text.
struct Inline {
    name: &'static str,
    text: &'static str,
}

impl Visitor for Inline {
    fn mustache(&mut self, node: &mut MustacheStatement) -> HookResult<Statement> {
        let matches = node
            .path
            .as_path()
            .and_then(|path| path.simple_name())
            .is_some_and(|name| name == self.name);
        if matches {
            return Ok(Transform::replace(Statement::Text(TextNode::new(
                self.text,
                node.span,
            ))));
        }
        Ok(Transform::Keep)
    }
}

struct InlinePlugin {
    name: &'static str,
    text: &'static str,
}

impl AstPlugin for InlinePlugin {
    fn name(&self) -> &str {
        "inline"
    }

    fn visitor(&self, _env: &PluginEnv<'_>) -> Box<dyn Visitor> {
        Box::new(Inline {
            name: self.name,
            text: self.text,
        })
    }
}

#[test]
fn test_plugin_replaces_nodes() {
    let options = CompileOptions::new().plugin(InlinePlugin {
        name: "greeting",
        text: "hello",
    });
    assert_eq!(
        program("<p>{{greeting}}</p>", &options),
        json!([[[10, "p"], [12], [1, "hello"], [13]], [], false, []])
    );
}

/// Rewrites every text node `from` into `to`.
struct Retext {
    from: &'static str,
    to: &'static str,
}

impl Visitor for Retext {
    fn text(&mut self, node: &mut TextNode) -> HookResult<Statement> {
        if node.chars == self.from {
            node.chars = self.to.to_owned();
        }
        Ok(Transform::Keep)
    }
}

impl AstPlugin for Retext {
    fn name(&self) -> &str {
        "retext"
    }

    fn visitor(&self, _env: &PluginEnv<'_>) -> Box<dyn Visitor> {
        Box::new(Retext {
            from: self.from,
            to: self.to,
        })
    }
}

#[test]
fn test_plugins_run_in_order() {
    let options = CompileOptions::new()
        .plugin(Retext { from: "x", to: "y" })
        .plugin(Retext { from: "y", to: "z" });
    assert_eq!(program("x", &options)[0], json!([[1, "z"]]));
}

struct Failing;

impl Visitor for Failing {
    fn text(&mut self, _node: &mut TextNode) -> HookResult<Statement> {
        Err("boom".into())
    }
}

impl AstPlugin for Failing {
    fn name(&self) -> &str {
        "failing"
    }

    fn visitor(&self, _env: &PluginEnv<'_>) -> Box<dyn Visitor> {
        Box::new(Failing)
    }
}

#[test]
fn test_plugin_errors_propagate() {
    let options = CompileOptions::new().plugin(Failing);
    let err = compile("text", &options).unwrap_err();
    assert_eq!(err.code, ErrorCode::E4001);
    assert_eq!(err.kind, CompileErrorKind::Plugin);
    assert_eq!(err.message, "Plugin `failing` failed: boom");
    let source = std::error::Error::source(&err).expect("hook error kept as source");
    assert_eq!(source.to_string(), "boom");
}

/// Removes every path, which is only legal inside lists.
struct RemovePaths;

impl Visitor for RemovePaths {
    fn path(
        &mut self,
        _node: &mut stencil_ir::ast::PathExpression,
    ) -> HookResult<stencil_ir::ast::Expression> {
        Ok(Transform::remove())
    }
}

impl AstPlugin for RemovePaths {
    fn name(&self) -> &str {
        "remove-paths"
    }

    fn visitor(&self, _env: &PluginEnv<'_>) -> Box<dyn Visitor> {
        Box::new(RemovePaths)
    }
}

#[test]
fn test_plugin_cannot_empty_single_slot() {
    let options = CompileOptions::new().plugin(RemovePaths);
    let source = "{{foo}}";
    let err = compile(source, &options).unwrap_err();
    assert_eq!(err.code, ErrorCode::E4002);
    assert_eq!(err.kind, CompileErrorKind::Plugin);
    assert!(err
        .message
        .starts_with("Cannot remove a node unless it is part of an array"));
    assert_eq!(err.snippet, "foo");
}

/// Records the environment it was created with.
struct EnvProbe {
    seen: Arc<std::sync::Mutex<Vec<(String, bool)>>>,
}

impl AstPlugin for EnvProbe {
    fn name(&self) -> &str {
        "env-probe"
    }

    fn visitor(&self, env: &PluginEnv<'_>) -> Box<dyn Visitor> {
        self.seen
            .lock()
            .unwrap()
            .push((env.module_name.to_owned(), env.strict_mode));
        Box::new(Retext { from: "", to: "" })
    }
}

#[test]
fn test_plugins_see_the_environment() {
    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
    let options = CompileOptions::new()
        .module_name("probe.hbs")
        .strict_mode(true)
        .plugin(EnvProbe {
            seen: Arc::clone(&seen),
        });
    compile("<p></p>", &options).unwrap();
    compile("<p></p>", &options).unwrap();
    assert_eq!(
        *seen.lock().unwrap(),
        [
            ("probe.hbs".to_owned(), true),
            ("probe.hbs".to_owned(), true)
        ]
    );
}

proptest! {
    #[test]
    fn plain_text_is_one_append(text in "[a-zA-Z0-9 .,]{1,40}") {
        let program = loose(&text);
        prop_assert_eq!(&program[0], &json!([[1, text]]));
    }

    #[test]
    fn compiles_are_repeatable(names in prop::collection::vec("[a-z]{1,6}", 1..6)) {
        let source: String = names
            .iter()
            .map(|name| format!("<div class={{{{{name}}}}}>{{{{{name}.x}}}}</div>"))
            .collect();
        prop_assume!(names.iter().all(|name| !matches!(
            name.as_str(),
            "as" | "else" | "if" | "each" | "let" | "with" | "log" | "true" | "false" | "null"
                | "undefined" | "yield" | "this" | "unless" | "partial" | "debugger"
                | "component" | "helper" | "modifier"
        )));
        let first = compile(&source, &CompileOptions::default()).unwrap();
        let second = compile(&source, &CompileOptions::default()).unwrap();
        prop_assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
    }
}
