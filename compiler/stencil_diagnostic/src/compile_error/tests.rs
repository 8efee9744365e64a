use pretty_assertions::assert_eq;

use super::*;

fn index() -> SourceIndex {
    SourceIndex::new("<div>\n  {{#if}}\n</div>", "app/templates/x.hbs")
}

#[test]
fn test_located_fields() {
    let err = CompileError::structure(ErrorCode::E2011, "bad if", Span::new(8, 15), &index());
    assert_eq!(err.module_name, "app/templates/x.hbs");
    assert_eq!(err.line(), 2);
    assert_eq!(err.column(), 2);
    assert_eq!(err.snippet, "{{#if}}");
}

#[test]
fn test_display_format() {
    let err = CompileError::structure(ErrorCode::E2011, "bad if", Span::new(8, 15), &index());
    assert_eq!(
        err.to_string(),
        "bad if: \n\n|\n|  {{#if}}\n|\n\n(error occurred in 'app/templates/x.hbs' @ line 2 : column 2)"
    );
}

#[test]
fn test_multiline_snippet_is_quoted() {
    let err = CompileError::structure(ErrorCode::E2006, "Unclosed", Span::new(0, 15), &index());
    assert!(err.to_string().contains("|  <div>\n|    {{#if}}"));
}

#[test]
fn test_source_is_exposed() {
    let inner: Box<dyn StdError + Send + Sync> = "hook failed".into();
    let err = CompileError::new(
        ErrorCode::E4001,
        CompileErrorKind::Plugin,
        "plugin error",
        Span::DUMMY,
        &index(),
    )
    .with_source(inner);
    assert_eq!(
        StdError::source(&err).map(ToString::to_string),
        Some("hook failed".to_string())
    );
}

#[test]
fn test_parse_error_diagnostic_label() {
    let err = CompileError::new(
        ErrorCode::E1001,
        CompileErrorKind::Parse {
            expected: vec!["'ID'".into(), "'CLOSE'".into()],
            found: "'EQUALS'".into(),
        },
        "Parse error",
        Span::new(8, 9),
        &index(),
    );
    let diag = err.to_diagnostic();
    assert_eq!(diag.labels[0].message, "expected 'ID', 'CLOSE', found 'EQUALS'");
    assert!(diag.is_error());
}

#[test]
fn test_related_locations_become_secondary_labels() {
    let err = CompileError::structure(ErrorCode::E2005, "mismatch", Span::new(16, 22), &index())
        .with_related(Span::new(0, 5), "<div> opened here");
    let diag = err.to_diagnostic();
    assert_eq!(diag.labels.len(), 2);
    assert!(diag.labels[0].is_primary);
    assert_eq!(diag.labels[1], Label::secondary(Span::new(0, 5), "<div> opened here"));
    assert_eq!(diag.primary_span(), Some(Span::new(16, 22)));
}
