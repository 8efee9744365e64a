//! Template tree v1 → v2 normalization.
//!
//! One [`Normalizer`] walks the parsed tree in source order. Order matters:
//! upvars and program slots are numbered by first use, so the callee of an
//! invocation is always resolved before its arguments and its arguments
//! before its blocks.

mod element;
mod expr;
mod keywords;
mod statement;

use rustc_hash::FxHashMap;
use stencil_diagnostic::{CompileError, CompileResult, ErrorCode};
use stencil_ir::ast::{self, Expression, Hash, PathExpression, PathHead};
use stencil_ir::norm::{self, PathRef, Resolution, VarRef, VariableKind};
use stencil_ir::{SourceIndex, Span, Spanned, SymbolTable};
use tracing::{debug, trace};

use crate::resolution::SyntaxContext;
use crate::{ComponentNameFn, NormalizeOptions, NormalizedTemplate};

/// Normalize a parsed template.
///
/// `index` must hold the source `template` was parsed from; it locates
/// errors. The first error stops normalization.
pub fn normalize(
    template: &ast::Template,
    index: &SourceIndex,
    options: &NormalizeOptions,
) -> CompileResult<NormalizedTemplate> {
    let locals = if options.strict_mode {
        options.locals.clone()
    } else {
        Vec::new()
    };
    let mut normalizer = Normalizer {
        index,
        strict: options.strict_mode,
        symbols: SymbolTable::new(locals),
        customize_component_name: options.customize_component_name.clone(),
        component_names: FxHashMap::default(),
        cursor_count: 0,
    };
    debug!(
        module = index.module_name(),
        strict = options.strict_mode,
        "normalizing template"
    );

    let body = normalizer.statements(&template.body)?;
    debug!(
        symbols = normalizer.symbols.symbols().len(),
        upvars = normalizer.symbols.upvars().len(),
        has_eval = normalizer.symbols.has_eval(),
        "normalized template"
    );

    Ok(NormalizedTemplate {
        template: norm::Template {
            body,
            span: template.span,
        },
        symbols: normalizer.symbols,
    })
}

// ─── Normalizer ───

/// State for one v1 → v2 pass.
pub(crate) struct Normalizer<'a> {
    /// Source of the template, for error locations.
    pub(crate) index: &'a SourceIndex,
    pub(crate) strict: bool,
    /// Frames, slots and upvars being allocated.
    pub(crate) symbols: SymbolTable,
    pub(crate) customize_component_name: Option<ComponentNameFn>,
    /// Customized names, one call per distinct tag.
    pub(crate) component_names: FxHashMap<String, String>,
    /// `in-element` guids handed out so far.
    pub(crate) cursor_count: u32,
}

impl Normalizer<'_> {
    // ─── Errors ───

    #[cold]
    pub(crate) fn structure_error(
        &self,
        code: ErrorCode,
        message: impl Into<String>,
        span: Span,
    ) -> CompileError {
        CompileError::structure(code, message, span, self.index)
    }

    #[cold]
    pub(crate) fn resolution_error(
        &self,
        code: ErrorCode,
        message: impl Into<String>,
        span: Span,
    ) -> CompileError {
        CompileError::resolution(code, message, span, self.index)
    }

    // ─── Scopes ───

    /// Run `f` inside a child frame binding `params`. `f` receives the
    /// slots of the params.
    pub(crate) fn in_block<T>(
        &mut self,
        params: &[String],
        f: impl FnOnce(&mut Self, Vec<u32>) -> CompileResult<T>,
    ) -> CompileResult<T> {
        let slots = self.symbols.push_block(params);
        trace!(?params, ?slots, "entered block scope");
        let result = f(self, slots);
        self.symbols.pop();
        result
    }

    /// Normalize a block body in its own frame.
    pub(crate) fn block(&mut self, block: &ast::Block) -> CompileResult<norm::Block> {
        self.in_block(&block.block_params, |this, params| {
            Ok(norm::Block {
                params,
                body: this.statements(&block.body)?,
                span: block.span,
            })
        })
    }

    /// The `default` and `else` blocks of a block statement.
    pub(crate) fn block_statement_blocks(
        &mut self,
        statement: &ast::BlockStatement,
    ) -> CompileResult<Vec<norm::NamedBlock>> {
        let mut blocks = vec![norm::NamedBlock {
            name: "default".to_owned(),
            block: self.block(&statement.program)?,
            span: statement.program.span,
        }];
        if let Some(inverse) = &statement.inverse {
            blocks.push(norm::NamedBlock {
                name: "else".to_owned(),
                block: self.block(inverse)?,
                span: inverse.span,
            });
        }
        Ok(blocks)
    }

    // ─── Variables ───

    /// The name of `path` if it can be a keyword here: a bare identifier
    /// that no local binding shadows.
    pub(crate) fn keyword_name<'e>(&self, path: &'e Expression) -> Option<&'e str> {
        let name = path.as_path()?.simple_name()?;
        let shadowed = self.symbols.lookup_local(name).is_some()
            || (self.strict && self.symbols.is_template_local(name));
        (!shadowed).then_some(name)
    }

    /// Resolve a path in `context`.
    pub(crate) fn path(
        &mut self,
        path: &PathExpression,
        context: SyntaxContext,
    ) -> CompileResult<PathRef> {
        let var = match &path.head {
            PathHead::This => VarRef {
                name: "this".to_owned(),
                kind: VariableKind::This,
                span: path.span,
            },
            PathHead::At(name) => {
                let name = format!("@{name}");
                let slot = self.symbols.allocate_named(&name);
                VarRef {
                    name,
                    kind: VariableKind::Arg(slot),
                    span: path.span,
                }
            }
            PathHead::Var(name) => self.variable(
                name,
                path.tail.is_empty(),
                context,
                &path.original,
                path.span,
            )?,
        };
        Ok(PathRef {
            var,
            tail: path.tail.clone(),
            span: path.span,
        })
    }

    /// Resolve the head identifier `name`: a local binding, a strict-mode
    /// template local, or a loose free variable.
    ///
    /// `simple` is false when the path has a tail; `original` is the path
    /// as written, for messages.
    pub(crate) fn variable(
        &mut self,
        name: &str,
        simple: bool,
        context: SyntaxContext,
        original: &str,
        span: Span,
    ) -> CompileResult<VarRef> {
        if let Some(slot) = self.symbols.lookup_local(name) {
            trace!(name, slot, "resolved local");
            return Ok(VarRef {
                name: name.to_owned(),
                kind: VariableKind::Local(slot),
                span,
            });
        }

        if self.strict {
            if !self.symbols.is_template_local(name) {
                return Err(self.resolution_error(
                    ErrorCode::E3001,
                    format!(
                        "Attempted to resolve a value in a strict mode template, but that value was not in scope: {name}"
                    ),
                    span,
                ));
            }
            let upvar = self.symbols.use_template_local(name);
            trace!(name, upvar, "resolved strict template local");
            return Ok(VarRef {
                name: name.to_owned(),
                kind: VariableKind::Free {
                    upvar,
                    resolution: Resolution::Strict,
                },
                span,
            });
        }

        let Some(resolution) = context.loose_resolution(simple) else {
            return Err(self.resolution_error(
                ErrorCode::E3002,
                format!(
                    "You attempted to invoke a path (`{original}`) but `{name}` was not in scope"
                ),
                span,
            ));
        };
        let upvar = self.symbols.allocate_free(name);
        trace!(name, upvar, ?resolution, "resolved free variable");
        Ok(VarRef {
            name: name.to_owned(),
            kind: VariableKind::Free { upvar, resolution },
            span,
        })
    }

    // ─── Naming ───

    /// Upvar name for a free component tag, after customization.
    pub(crate) fn component_name(&mut self, tag: &str) -> String {
        let Some(customize) = &self.customize_component_name else {
            return tag.to_owned();
        };
        if let Some(name) = self.component_names.get(tag) {
            return name.clone();
        }
        let name = customize(tag);
        trace!(tag, %name, "customized component name");
        self.component_names.insert(tag.to_owned(), name.clone());
        name
    }

    /// Next `in-element` guid.
    pub(crate) fn next_cursor(&mut self) -> String {
        let guid = format!("%cursor:{}%", self.cursor_count);
        self.cursor_count += 1;
        guid
    }
}

/// Span covering every argument in `params` and `hash`, or `fallback` when
/// there are none.
pub(crate) fn args_span(params: &[Expression], hash: &Hash, fallback: Span) -> Span {
    let mut spans = params
        .iter()
        .map(Spanned::span)
        .chain((!hash.is_empty()).then_some(hash.span));
    match spans.next() {
        Some(first) => spans.fold(first, Span::merge),
        None => fallback,
    }
}

