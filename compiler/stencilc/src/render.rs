//! Terminal rendering of diagnostics with `ariadne`.

use ariadne::{Color, Config, IndexType, Label, Report, ReportKind, Source};
use stencil_diagnostic::{CompileError, Diagnostic, Severity};

/// Render a fatal error against the source it came from.
pub fn render_error(error: &CompileError, source: &str, color: bool) -> String {
    render_diagnostic(&error.to_diagnostic(), &error.module_name, source, color)
}

/// Render any diagnostic. Falls back to the one-line form if the report
/// cannot be written.
pub fn render_diagnostic(
    diagnostic: &Diagnostic,
    module_name: &str,
    source: &str,
    color: bool,
) -> String {
    let kind = match diagnostic.severity {
        Severity::Error => ReportKind::Error,
        Severity::Warning => ReportKind::Warning,
    };
    let offset = diagnostic
        .primary_span()
        .map_or(0, |span| span.start as usize);
    let config = Config::default()
        .with_color(color)
        .with_index_type(IndexType::Byte);

    let mut report = Report::build(kind, module_name, offset)
        .with_config(config)
        .with_code(diagnostic.code)
        .with_message(&diagnostic.message);
    for label in &diagnostic.labels {
        let mut range = label.span.to_range();
        range.end = range.end.min(source.len());
        let mut ariadne_label = Label::new((module_name, range)).with_color(if label.is_primary {
            Color::Red
        } else {
            Color::Blue
        });
        if !label.message.is_empty() {
            ariadne_label = ariadne_label.with_message(&label.message);
        }
        report = report.with_label(ariadne_label);
    }
    for note in &diagnostic.notes {
        report = report.with_note(note);
    }

    let mut out = Vec::new();
    match report
        .finish()
        .write((module_name, Source::from(source.to_owned())), &mut out)
    {
        Ok(()) => String::from_utf8_lossy(&out).into_owned(),
        Err(_) => diagnostic.to_string(),
    }
}
