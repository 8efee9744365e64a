//! Whitespace control.
//!
//! Two rules rewrite content runs around mustaches:
//!
//! - `~` on a mustache strips all whitespace on that side.
//! - A block, `{{else}}`, comment or partial that sits alone on its line is
//!   *standalone*: the indentation before it and the newline after it are
//!   removed, so control flow does not leave blank lines behind.
//!
//! Only content `value`s change. `original` is kept for the standalone
//! tests, and `value_start` follows the first byte that survives.

use crate::hbs::{Block, Program, Statement};

/// What a statement asks of its neighbours.
#[derive(Copy, Clone, Debug, Default)]
struct StripInfo {
    /// `{{~`: strip the previous content.
    open: bool,
    /// `~}}`: strip the next content.
    close: bool,
    open_standalone: bool,
    close_standalone: bool,
    inline_standalone: bool,
}

/// Apply whitespace control to a whole template.
pub(crate) fn strip_template(program: &mut Program) {
    process_program(program, true);
}

fn process_program(program: &mut Program, is_root: bool) {
    let body = &mut program.body;
    for i in 0..body.len() {
        let Some(strip) = accept(&mut body[i]) else {
            continue;
        };

        let prev_whitespace = is_prev_whitespace(body, Some(i), is_root);
        let next_whitespace = is_next_whitespace(body, Some(i), is_root);
        let open_standalone = strip.open_standalone && prev_whitespace;
        let close_standalone = strip.close_standalone && next_whitespace;
        let inline_standalone = strip.inline_standalone && prev_whitespace && next_whitespace;

        if strip.close {
            omit_right(body, Some(i), true);
        }
        if strip.open {
            omit_left(body, Some(i), true);
        }

        if inline_standalone {
            omit_right(body, Some(i), false);
            omit_left(body, Some(i), false);
        }

        if open_standalone {
            if let Statement::Block(block) = &mut body[i] {
                omit_right(&mut block.program.body, None, false);
            }
            omit_left(body, Some(i), false);
        }

        if close_standalone {
            omit_right(body, Some(i), false);
            if let Statement::Block(block) = &mut body[i] {
                let block = &mut **block;
                let last = block.inverse.as_mut().unwrap_or(&mut block.program);
                omit_left(&mut last.body, None, false);
            }
        }
    }
}

fn accept(statement: &mut Statement) -> Option<StripInfo> {
    match statement {
        Statement::Content(_) => None,
        Statement::Mustache(mustache) => Some(StripInfo {
            open: mustache.strip.open,
            close: mustache.strip.close,
            ..StripInfo::default()
        }),
        Statement::Comment(comment) => Some(StripInfo {
            open: comment.strip.open,
            close: comment.strip.close,
            inline_standalone: true,
            ..StripInfo::default()
        }),
        Statement::Partial(partial) => Some(StripInfo {
            open: partial.strip.open,
            close: partial.strip.close,
            inline_standalone: true,
            ..StripInfo::default()
        }),
        Statement::Block(block) => Some(block_statement(block)),
    }
}

fn block_statement(block: &mut Block) -> StripInfo {
    process_program(&mut block.program, false);
    if let Some(inverse) = &mut block.inverse {
        process_program(inverse, false);
    }

    let first_inverse = block.inverse.as_ref().map(inverse_target);
    let strip = StripInfo {
        open: block.open_strip.open,
        close: block.close_strip.close,
        open_standalone: is_next_whitespace(&block.program.body, None, false),
        close_standalone: is_prev_whitespace(
            &first_inverse.unwrap_or(&block.program).body,
            None,
            false,
        ),
        inline_standalone: false,
    };

    if block.open_strip.close {
        omit_right(&mut block.program.body, None, true);
    }

    if let Some(inverse) = &mut block.inverse {
        let program = &mut block.program;
        let (inverse_strip, close_strip) = (block.inverse_strip, block.close_strip);
        with_inverse_target(inverse, |first_inverse| {
            if inverse_strip.open {
                omit_left(&mut program.body, None, true);
            }
            if inverse_strip.close {
                omit_right(&mut first_inverse.body, None, true);
            }
            if close_strip.open {
                omit_left(&mut first_inverse.body, None, true);
            }

            // Standalone {{else}}
            if is_prev_whitespace(&program.body, None, false)
                && is_next_whitespace(&first_inverse.body, None, false)
            {
                omit_left(&mut program.body, None, false);
                omit_right(&mut first_inverse.body, None, false);
            }
        });
    } else if block.close_strip.open {
        omit_left(&mut block.program.body, None, true);
    }

    strip
}

/// The program that `{{else}}` stripping applies to: the inverse itself,
/// or the body of the first `{{else if}}` link.
fn inverse_target(inverse: &Program) -> &Program {
    match inverse.body.first() {
        Some(Statement::Block(block)) if inverse.chained => &block.program,
        _ => inverse,
    }
}

fn with_inverse_target<R>(inverse: &mut Program, f: impl FnOnce(&mut Program) -> R) -> R {
    if inverse.chained {
        if let Some(Statement::Block(block)) = inverse.body.first_mut() {
            return f(&mut block.program);
        }
    }
    f(inverse)
}

// ─── Standalone tests ───

/// Does the content before `i` end a line? `None` means the end of `body`.
fn is_prev_whitespace(body: &[Statement], i: Option<usize>, is_root: bool) -> bool {
    let i = i.unwrap_or(body.len());
    let prev = i.checked_sub(1).and_then(|p| body.get(p));
    let sibling = i.checked_sub(2).and_then(|p| body.get(p));
    match prev {
        None => is_root,
        Some(Statement::Content(content)) => {
            let text = content.original.as_str();
            let trailing = &text[text.trim_end().len()..];
            has_newline(trailing) || (sibling.is_none() && is_root && trailing.len() == text.len())
        }
        Some(_) => false,
    }
}

/// Does the content after `i` start a new line? `None` means before the
/// first statement.
fn is_next_whitespace(body: &[Statement], i: Option<usize>, is_root: bool) -> bool {
    let next_index = i.map_or(0, |i| i + 1);
    let next = body.get(next_index);
    let sibling = body.get(next_index + 1);
    match next {
        None => is_root,
        Some(Statement::Content(content)) => {
            let text = content.original.as_str();
            let leading = &text[..text.len() - text.trim_start().len()];
            has_newline(leading) || (sibling.is_none() && is_root && leading.len() == text.len())
        }
        Some(_) => false,
    }
}

fn has_newline(whitespace: &str) -> bool {
    whitespace.contains('\n')
}

// ─── Stripping ───

/// Strip the start of the content after `i` (`None`: the first statement).
///
/// `multiple` removes all whitespace; otherwise only spaces and tabs up to
/// and including one line break, and only once per content run.
fn omit_right(body: &mut [Statement], i: Option<usize>, multiple: bool) {
    let index = i.map_or(0, |i| i + 1);
    let Some(Statement::Content(content)) = body.get_mut(index) else {
        return;
    };
    if !multiple && content.right_stripped {
        return;
    }
    let removed = if multiple {
        content.value.len() - content.value.trim_start().len()
    } else {
        line_start_len(&content.value)
    };
    content.value.drain(..removed);
    content.value_start += u32::try_from(removed).unwrap_or(0);
    content.right_stripped = removed > 0;
}

/// Strip the end of the content before `i` (`None`: the last statement).
/// Returns whether anything was removed.
fn omit_left(body: &mut [Statement], i: Option<usize>, multiple: bool) -> bool {
    let index = match i {
        Some(i) => i.checked_sub(1),
        None => body.len().checked_sub(1),
    };
    let Some(Statement::Content(content)) = index.and_then(|index| body.get_mut(index)) else {
        return false;
    };
    if !multiple && content.left_stripped {
        return false;
    }
    let kept = if multiple {
        content.value.trim_end().len()
    } else {
        content.value.trim_end_matches([' ', '\t']).len()
    };
    let removed = content.value.len() - kept;
    content.value.truncate(kept);
    content.left_stripped = removed > 0;
    content.left_stripped
}

/// Length of `[ \t]*\r?\n?` at the start of `text`.
fn line_start_len(text: &str) -> usize {
    let bytes = text.as_bytes();
    let mut len = bytes.iter().take_while(|b| matches!(b, b' ' | b'\t')).count();
    if bytes.get(len) == Some(&b'\r') {
        len += 1;
    }
    if bytes.get(len) == Some(&b'\n') {
        len += 1;
    }
    len
}
