//! Fatal compile errors.
//!
//! Any stage that cannot continue returns a [`CompileError`]. It is
//! located against the [`SourceIndex`] when it is created, so it always
//! carries the module name, line, column and the offending source text.

use std::error::Error as StdError;

use stencil_ir::{SourceIndex, SourcePosition, Span};
use thiserror::Error;

use crate::{Diagnostic, ErrorCode, Label};

/// Result alias used by every fallible compiler stage.
pub type CompileResult<T> = Result<T, CompileError>;

/// Which kind of failure stopped the compile.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CompileErrorKind {
    /// The mustache grammar rejected a token.
    Parse {
        /// Token kinds that would have been accepted.
        expected: Vec<String>,
        /// Token kind actually found.
        found: String,
    },
    /// Invalid template structure or keyword usage.
    Structure,
    /// A name could not be resolved.
    Resolution,
    /// An AST plugin failed.
    Plugin,
}

#[derive(Debug, Error)]
#[error(
    "{message}: \n\n|\n|  {}\n|\n\n(error occurred in '{module_name}' @ line {} : column {})",
    quote_snippet(.snippet),
    .position.line,
    .position.column
)]
pub struct CompileError {
    pub code: ErrorCode,
    pub kind: CompileErrorKind,
    pub message: String,
    pub module_name: String,
    pub span: Span,
    pub position: SourcePosition,
    pub snippet: String,
    /// Other locations worth pointing at, such as where a mismatched tag
    /// was opened.
    pub related: Vec<Label>,
    #[source]
    pub source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl CompileError {
    /// Create an error located in `index`.
    #[cold]
    pub fn new(
        code: ErrorCode,
        kind: CompileErrorKind,
        message: impl Into<String>,
        span: Span,
        index: &SourceIndex,
    ) -> Self {
        CompileError {
            code,
            kind,
            message: message.into(),
            module_name: index.module_name().to_owned(),
            span,
            position: index.position(span.start),
            snippet: index.snippet(span).to_owned(),
            related: Vec::new(),
            source: None,
        }
    }

    #[cold]
    pub fn structure(
        code: ErrorCode,
        message: impl Into<String>,
        span: Span,
        index: &SourceIndex,
    ) -> Self {
        Self::new(code, CompileErrorKind::Structure, message, span, index)
    }

    #[cold]
    pub fn resolution(
        code: ErrorCode,
        message: impl Into<String>,
        span: Span,
        index: &SourceIndex,
    ) -> Self {
        Self::new(code, CompileErrorKind::Resolution, message, span, index)
    }

    /// Attach the underlying failure (plugin errors).
    #[must_use]
    pub fn with_source(mut self, source: Box<dyn StdError + Send + Sync + 'static>) -> Self {
        self.source = Some(source);
        self
    }

    /// Point at a second location.
    #[must_use]
    pub fn with_related(mut self, span: Span, message: impl Into<String>) -> Self {
        self.related.push(Label::secondary(span, message));
        self
    }

    pub fn line(&self) -> u32 {
        self.position.line
    }

    pub fn column(&self) -> u32 {
        self.position.column
    }

    /// Diagnostic form, for renderers.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let label = match &self.kind {
            CompileErrorKind::Parse { expected, found } if !expected.is_empty() => {
                format!("expected {}, found {found}", expected.join(", "))
            }
            CompileErrorKind::Parse { found, .. } => format!("unexpected {found}"),
            CompileErrorKind::Structure | CompileErrorKind::Resolution => String::new(),
            CompileErrorKind::Plugin => "while running a plugin".to_owned(),
        };
        let mut diag = Diagnostic::error(self.code)
            .with_message(&self.message)
            .with_label(self.span, label);
        for related in &self.related {
            diag = diag.with_secondary_label(related.span, &related.message);
        }
        if let Some(source) = &self.source {
            diag = diag.with_note(source.to_string());
        }
        diag
    }
}

/// Prefix continuation lines so multi-line snippets stay inside the gutter.
fn quote_snippet(snippet: &str) -> String {
    snippet.split('\n').collect::<Vec<_>>().join("\n|  ")
}

#[cfg(test)]
mod tests;
