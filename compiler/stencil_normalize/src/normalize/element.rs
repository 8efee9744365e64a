//! Element classification.
//!
//! A tag is a component invocation when its head is in scope (`@foo`,
//! `this`, a block param, a strict-mode local) or, in loose mode, when it
//! starts with an uppercase letter. Everything else is a plain HTML
//! element. `<:name>` tags are named blocks and only valid as direct
//! children of a component.

use stencil_diagnostic::{CompileResult, ErrorCode};
use stencil_ir::ast::{self, AttrNode, AttrValue, ElementNode, Statement};
use stencil_ir::norm::{
    Block, Content, ElementAttr, ElementModifier, ElementParams, Expr, FreeVarNamespaces, HtmlAttr,
    InvokeComponent, NamedArg, NamedBlock, PathRef, Resolution, SimpleElement, VarRef,
    VariableKind,
};
use stencil_ir::{Span, Spanned};
use tracing::trace;

use super::Normalizer;
use crate::resolution::SyntaxContext;

impl Normalizer<'_> {
    pub(crate) fn element(&mut self, element: &ElementNode) -> CompileResult<Content> {
        if element.tag.starts_with(':') {
            return Err(self.structure_error(
                ErrorCode::E2010,
                format!(
                    "Unexpected named block <{}>: named blocks can only be passed directly to a component invocation",
                    element.tag
                ),
                tag_span(element),
            ));
        }

        let mut segments = element.tag.split('.');
        let head = segments.next().unwrap_or_default();
        let tail: Vec<String> = segments.map(str::to_owned).collect();
        if self.is_component(element, head, !tail.is_empty())? {
            trace!(tag = %element.tag, "component invocation");
            self.component(element, head, tail)
        } else {
            self.simple_element(element)
        }
    }

    fn is_component(
        &self,
        element: &ElementNode,
        head: &str,
        has_tail: bool,
    ) -> CompileResult<bool> {
        let in_scope = head.starts_with('@')
            || head == "this"
            || self.symbols.lookup_local(head).is_some()
            || (self.strict && self.symbols.is_template_local(head));
        if in_scope {
            return Ok(true);
        }
        if has_tail {
            return Err(self.resolution_error(
                ErrorCode::E3003,
                format!(
                    "You used {} as a tag name, but {head} is not in scope",
                    element.tag
                ),
                tag_span(element),
            ));
        }
        let uppercase = head.starts_with(char::is_uppercase);
        if uppercase && self.strict {
            return Err(self.resolution_error(
                ErrorCode::E3001,
                format!(
                    "Attempted to invoke a component that was not in scope in a strict mode template, `<{tag}>`. If you wanted to create an element with that name, convert it to lowercase - `<{lower}>`",
                    tag = element.tag,
                    lower = element.tag.to_lowercase()
                ),
                tag_span(element),
            ));
        }
        Ok(uppercase)
    }

    // ─── Components ───

    fn component(
        &mut self,
        element: &ElementNode,
        head: &str,
        tail: Vec<String>,
    ) -> CompileResult<Content> {
        let callee = self.component_callee(element, head, tail)?;

        let mut params = ElementParams::default();
        let mut args = Vec::new();
        for attr in &element.attributes {
            if attr.name.starts_with('@') {
                args.push(NamedArg {
                    name: attr.name.clone(),
                    value: self.attr_value(&attr.value)?,
                    span: attr.span,
                });
            } else {
                params.attrs.push(self.element_attr(attr)?);
            }
        }
        params.modifiers = self.modifiers(&element.modifiers)?;
        let blocks = self.component_blocks(element)?;

        Ok(Content::InvokeComponent(InvokeComponent {
            callee,
            params,
            args,
            blocks,
            span: element.span,
        }))
    }

    fn component_callee(
        &mut self,
        element: &ElementNode,
        head: &str,
        tail: Vec<String>,
    ) -> CompileResult<Expr> {
        let span = tag_span(element);
        let var = if head.starts_with('@') {
            VarRef {
                name: head.to_owned(),
                kind: VariableKind::Arg(self.symbols.allocate_named(head)),
                span,
            }
        } else if head == "this" {
            VarRef {
                name: head.to_owned(),
                kind: VariableKind::This,
                span,
            }
        } else if self.strict || self.symbols.lookup_local(head).is_some() {
            self.variable(
                head,
                tail.is_empty(),
                SyntaxContext::Component,
                &element.tag,
                span,
            )?
        } else {
            let name = self.component_name(head);
            let upvar = self.symbols.allocate_free(&name);
            trace!(tag = head, %name, upvar, "free component");
            VarRef {
                name,
                kind: VariableKind::Free {
                    upvar,
                    resolution: Resolution::loose(FreeVarNamespaces::COMPONENT, false),
                },
                span,
            }
        };
        Ok(Expr::Path(PathRef { var, tail, span }))
    }

    /// Blocks passed to a component: the named blocks among its children,
    /// or its children as the `default` block.
    fn component_blocks(&mut self, element: &ElementNode) -> CompileResult<Vec<NamedBlock>> {
        if !element.children.iter().any(is_named_block) {
            if element.self_closing {
                return Ok(Vec::new());
            }
            let block = self.in_block(&element.block_params, |this, params| {
                Ok(Block {
                    params,
                    body: this.statements(&element.children)?,
                    span: element.span,
                })
            })?;
            return Ok(vec![NamedBlock {
                name: "default".to_owned(),
                block,
                span: element.span,
            }]);
        }

        if !element.block_params.is_empty() {
            return Err(self.structure_error(
                ErrorCode::E2010,
                format!(
                    "Unexpected block params list on <{}> component invocation: when passing named blocks, the invocation tag cannot take block params",
                    element.tag
                ),
                tag_span(element),
            ));
        }

        let mut blocks: Vec<NamedBlock> = Vec::new();
        for child in &element.children {
            match child {
                Statement::Element(named) if named.tag.starts_with(':') => {
                    let block = self.named_block(named, &blocks)?;
                    blocks.push(block);
                }
                Statement::Text(text) if text.chars.trim().is_empty() => {}
                Statement::Comment(_) | Statement::MustacheComment(_) => {}
                other => {
                    return Err(self.structure_error(
                        ErrorCode::E2010,
                        format!(
                            "Unexpected content inside <{}> component invocation: when using named blocks, the tag cannot contain other content",
                            element.tag
                        ),
                        other.span(),
                    ));
                }
            }
        }
        Ok(blocks)
    }

    fn named_block(
        &mut self,
        named: &ElementNode,
        seen: &[NamedBlock],
    ) -> CompileResult<NamedBlock> {
        let raw = named.tag.strip_prefix(':').unwrap_or_default();
        if !raw.starts_with(|c: char| c.is_ascii_lowercase()) {
            return Err(self.structure_error(
                ErrorCode::E2010,
                format!(
                    "<:{raw}> is not a valid named block, and named blocks must begin with a lowercase letter"
                ),
                tag_span(named),
            ));
        }
        if !named.attributes.is_empty() || !named.modifiers.is_empty() {
            return Err(self.structure_error(
                ErrorCode::E2010,
                format!("named block <:{raw}> cannot have attributes, arguments, or modifiers"),
                tag_span(named),
            ));
        }
        let name = if raw == "inverse" { "else" } else { raw };
        if seen.iter().any(|block| block.name == name) {
            return Err(self.structure_error(
                ErrorCode::E2010,
                format!(
                    "Component had two named blocks with the same name, `<:{raw}>`. Only one block with a given name may be passed"
                ),
                tag_span(named),
            ));
        }

        let block = self.in_block(&named.block_params, |this, params| {
            Ok(Block {
                params,
                body: this.statements(&named.children)?,
                span: named.span,
            })
        })?;
        Ok(NamedBlock {
            name: name.to_owned(),
            block,
            span: named.span,
        })
    }

    // ─── HTML elements ───

    fn simple_element(&mut self, element: &ElementNode) -> CompileResult<Content> {
        if let Some(attr) = element.attributes.iter().find(|attr| attr.name.starts_with('@')) {
            return Err(self.structure_error(
                ErrorCode::E2012,
                format!(
                    "{} is not a valid attribute name. @arguments are only allowed on components, but the tag for this element (`{}`) is a regular, non-component HTML element.",
                    attr.name, element.tag
                ),
                attr.span,
            ));
        }
        if !element.block_params.is_empty() {
            return Err(self.structure_error(
                ErrorCode::E2007,
                format!(
                    "Unexpected block params in <{}>: simple elements cannot have block params",
                    element.tag
                ),
                tag_span(element),
            ));
        }

        let attrs = element
            .attributes
            .iter()
            .map(|attr| self.element_attr(attr))
            .collect::<CompileResult<Vec<_>>>()?;
        let modifiers = self.modifiers(&element.modifiers)?;
        let body = self.statements(&element.children)?;
        Ok(Content::SimpleElement(SimpleElement {
            tag: element.tag.clone(),
            params: ElementParams { attrs, modifiers },
            body,
            span: element.span,
        }))
    }

    // ─── Attributes and modifiers ───

    fn element_attr(&mut self, attr: &AttrNode) -> CompileResult<ElementAttr> {
        if attr.name == "...attributes" {
            return Ok(ElementAttr::Splat {
                slot: self.symbols.allocate_block("attrs"),
                span: attr.span,
            });
        }
        let trusting = matches!(&attr.value, AttrValue::Mustache(mustache) if mustache.trusting);
        Ok(ElementAttr::Attr(HtmlAttr {
            name: attr.name.clone(),
            value: self.attr_value(&attr.value)?,
            trusting,
            span: attr.span,
        }))
    }

    fn modifiers(
        &mut self,
        modifiers: &[ast::ElementModifierStatement],
    ) -> CompileResult<Vec<ElementModifier>> {
        modifiers
            .iter()
            .map(|modifier| {
                Ok(ElementModifier {
                    callee: self.expr(&modifier.path, SyntaxContext::Modifier)?,
                    args: self.args(&modifier.params, &modifier.hash, modifier.span)?,
                    span: modifier.span,
                })
            })
            .collect()
    }
}

fn is_named_block(statement: &Statement) -> bool {
    matches!(statement, Statement::Element(element) if element.tag.starts_with(':'))
}

/// `<tag` of an element's start tag.
fn tag_span(element: &ElementNode) -> Span {
    let len = u32::try_from(element.tag.len()).unwrap_or(u32::MAX);
    Span::new(
        element.span.start,
        element.span.start.saturating_add(len).saturating_add(1),
    )
}
