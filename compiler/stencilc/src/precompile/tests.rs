#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use super::*;

#[test]
fn test_loose_wrapper() {
    let options = CompileOptions::new().module_name("app/hello.hbs");
    let wrapped = precompile("<p>{{name}}</p>", &options).unwrap();
    assert_eq!(wrapped.module_name, "app/hello.hbs");
    assert_eq!(wrapped.scope, None);
    assert!(!wrapped.is_strict_mode);
    assert_eq!(wrapped.id, template_id(&wrapped.block));

    let block: Value = serde_json::from_str(&wrapped.block).unwrap();
    assert_eq!(
        block,
        json!([[[10, "p"], [12], [1, [34, 0]], [13]], [], false, ["name"]])
    );
}

#[test]
fn test_json_keys() {
    let wrapped = precompile("hi", &CompileOptions::default()).unwrap();
    let value: Value = serde_json::from_str(&wrapped.to_json().unwrap()).unwrap();
    assert_eq!(
        value,
        json!({
            "id": wrapped.id,
            "block": r#"[[[1,"hi"]],[],false,[]]"#,
            "moduleName": "an unknown module",
            "scope": null,
            "isStrictMode": false,
        })
    );
}

#[test]
fn test_strict_scope_lists_used_locals() {
    let options = CompileOptions::new()
        .strict_mode(true)
        .locals(["Button", "t", "unused"]);
    let wrapped = precompile(r#"<Button>{{t "hello"}}</Button>"#, &options).unwrap();
    assert!(wrapped.is_strict_mode);
    assert_eq!(
        wrapped.scope,
        Some(vec!["Button".to_owned(), "t".to_owned()])
    );
}

#[test]
fn test_ids_are_stable() {
    let options = CompileOptions::default();
    let first = precompile("{{a}}", &options).unwrap();
    let again = precompile("{{a}}", &options).unwrap();
    let other = precompile("{{b}}", &options).unwrap();
    assert_eq!(first.id, again.id);
    assert_ne!(first.id, other.id);
    assert_eq!(first.id.len(), 16);
}

#[test]
fn test_compile_errors_pass_through() {
    let err = precompile("{{#if}}{{/if}}", &CompileOptions::default()).unwrap_err();
    let DriverError::Compile(err) = err else {
        panic!("expected a compile error, got {err:?}");
    };
    assert_eq!(err.code, stencil_diagnostic::ErrorCode::E2011);
}
