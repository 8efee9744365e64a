//! Path expression assembly and validation.

use stencil_diagnostic::{CompileError, CompileResult, ErrorCode};
use stencil_ir::ast::{PathExpression, PathHead};
use stencil_ir::{SourceIndex, Span};

/// One `ID` of a path with the separator that preceded it.
pub(crate) struct Segment<'a> {
    pub separator: Option<char>,
    pub raw: &'a str,
}

/// Strip the brackets of a `[literal]` segment.
pub(crate) fn id(raw: &str) -> &str {
    if raw.len() >= 2 && raw.starts_with('[') && raw.ends_with(']') {
        &raw[1..raw.len() - 1]
    } else {
        raw
    }
}

/// Build a path from its segments.
///
/// `this`, `.` and `..` are only allowed as the first segment. Template
/// paths are property paths, so `/` separators, `./`, `../` and a bare `.`
/// are all rejected.
pub(crate) fn prepare_path(
    data: bool,
    segments: &[Segment<'_>],
    span: Span,
    index: &SourceIndex,
) -> CompileResult<PathExpression> {
    let invalid = |message: String| CompileError::structure(ErrorCode::E1003, message, span, index);

    let mut original = String::from(if data { "@" } else { "" });
    let mut parts: Vec<String> = Vec::with_capacity(segments.len());
    for segment in segments {
        let part = id(segment.raw);
        let is_literal = part != segment.raw;
        if let Some(separator) = segment.separator {
            original.push(separator);
        }
        original.push_str(part);

        if !is_literal && matches!(part, ".." | "." | "this") {
            if !parts.is_empty() {
                return Err(invalid(format!("Invalid path: {original}")));
            }
        } else {
            parts.push(part.to_owned());
        }
    }

    if original.contains('/') {
        if original.starts_with("./") {
            return Err(invalid(
                r#"Using "./" is not supported in Glimmer and unnecessary"#.to_owned(),
            ));
        }
        if original.starts_with("../") {
            return Err(invalid(
                r#"Changing context using "../" is not supported in Glimmer"#.to_owned(),
            ));
        }
        if original.contains('.') {
            return Err(invalid(
                "Mixing '.' and '/' in paths is not supported in Glimmer; use only '.' to separate property paths"
                    .to_owned(),
            ));
        }
        parts = vec![parts.join("/")];
    } else if original == "." {
        return Err(invalid(
            "'.' is not a supported path in Glimmer; check for a path with a trailing '.'".to_owned(),
        ));
    }

    let this_head = original == "this" || (original.starts_with("this.") && original.len() > 5);
    let mut parts = parts.into_iter();
    let head = if this_head {
        PathHead::This
    } else if data {
        match parts.next() {
            Some(name) if !name.is_empty() => PathHead::At(name),
            _ => {
                return Err(invalid(
                    "Attempted to parse a path expression, but it was not valid. Paths beginning with @ must start with a-z."
                        .to_owned(),
                ))
            }
        }
    } else {
        match parts.next() {
            Some(name) if !name.is_empty() => PathHead::Var(name),
            _ => {
                return Err(invalid(
                    "Attempted to parse a path expression, but it was not valid. Paths must start with a-z or A-Z."
                        .to_owned(),
                ))
            }
        }
    };

    Ok(PathExpression {
        head,
        tail: parts.collect(),
        original,
        span,
    })
}
