//! Statement encoding.

use stencil_ir::norm::{Content, SimpleElement};
use stencil_stack::ensure_sufficient_stack;
use tracing::trace;

use super::element::element_params;
use super::expr::expr;
use super::{block, hash, named_blocks, optional_block, params};
use crate::program::{Expression, Statement};

pub(super) fn content_list(body: &[Content]) -> Vec<Statement> {
    let mut out = Vec::with_capacity(body.len());
    for node in body {
        content(node, &mut out);
    }
    out
}

fn content(node: &Content, out: &mut Vec<Statement>) {
    let statement = match node {
        Content::Text(text) => Statement::Append(Expression::string(text.chars.as_str())),
        Content::HtmlComment(comment) => Statement::Comment(comment.text.clone()),
        Content::GlimmerComment(_) => return,
        Content::Append(append) => {
            let value = expr(&append.value);
            if append.trusting {
                Statement::TrustingAppend(value)
            } else {
                Statement::Append(value)
            }
        }
        Content::InvokeBlock(invoke) => ensure_sufficient_stack(|| Statement::Block {
            callee: expr(&invoke.callee),
            params: params(&invoke.args.positional),
            hash: hash(&invoke.args.named),
            blocks: named_blocks(&invoke.blocks),
        }),
        Content::InvokeComponent(component) => ensure_sufficient_stack(|| {
            let attrs = element_params(&component.params, true);
            Statement::Component {
                tag: expr(&component.callee),
                params: (!attrs.is_empty()).then_some(attrs),
                hash: hash(&component.args),
                blocks: named_blocks(&component.blocks),
            }
        }),
        Content::SimpleElement(element) => {
            ensure_sufficient_stack(|| simple_element(element, out));
            return;
        }
        Content::If(if_) => ensure_sufficient_stack(|| Statement::If {
            condition: expr(&if_.condition),
            block: block(&if_.block),
            inverse: optional_block(if_.inverse.as_ref()),
        }),
        Content::Each(each) => ensure_sufficient_stack(|| Statement::Each {
            value: expr(&each.value),
            key: each.key.as_ref().map(expr),
            block: block(&each.block),
            inverse: optional_block(each.inverse.as_ref()),
        }),
        Content::With(with) => ensure_sufficient_stack(|| Statement::With {
            value: expr(&with.value),
            block: block(&with.block),
            inverse: optional_block(with.inverse.as_ref()),
        }),
        Content::Let(let_) => ensure_sufficient_stack(|| Statement::Let {
            positional: let_.positional.iter().map(expr).collect(),
            block: block(&let_.block),
        }),
        Content::InElement(in_element) => ensure_sufficient_stack(|| Statement::InElement {
            block: block(&in_element.block),
            guid: in_element.guid.clone(),
            destination: expr(&in_element.destination),
            insert_before: in_element.insert_before.as_ref().map(expr),
        }),
        Content::WithDynamicVars(vars) => ensure_sufficient_stack(|| Statement::WithDynamicVars {
            hash: hash(&vars.named),
            block: block(&vars.block),
        }),
        Content::InvokeDynamicComponent(invoke) => {
            ensure_sufficient_stack(|| Statement::InvokeComponent {
                definition: expr(&invoke.callee),
                params: params(&invoke.args.positional),
                hash: hash(&invoke.args.named),
                blocks: (!invoke.blocks.is_empty()).then(|| named_blocks(&invoke.blocks)),
            })
        }
        Content::Yield(yield_) => Statement::Yield {
            target: yield_.target,
            params: params(&yield_.positional),
        },
        Content::Debugger(debugger) => Statement::Debugger(debugger.eval.clone()),
        Content::Partial(partial) => Statement::Partial {
            target: expr(&partial.target),
            eval: partial.eval.clone(),
        },
    };
    out.push(statement);
}

/// Flattens into open, attributes and modifiers, flush, body, close.
fn simple_element(element: &SimpleElement, out: &mut Vec<Statement>) {
    let splat = element.params.has_splattributes();
    trace!(tag = %element.tag, splat, "encoding element");
    out.push(Statement::OpenElement {
        tag: element.tag.clone(),
        splat,
    });
    out.extend(element_params(&element.params, false));
    out.push(Statement::FlushElement);
    for child in &element.body {
        content(child, out);
    }
    out.push(Statement::CloseElement);
}
