//! Element attributes and modifiers.

use stencil_ir::norm::{ElementAttr, ElementParams, HtmlAttr, LiteralValue};

use super::expr::expr;
use super::{hash, params};
use crate::program::{DynamicAttr, StaticAttr, Statement};

const XLINK: &str = "http://www.w3.org/1999/xlink";
const XML: &str = "http://www.w3.org/XML/1998/namespace";
const XMLNS: &str = "http://www.w3.org/2000/xmlns/";

/// Namespace URI for attributes the DOM must set with `setAttributeNS`.
pub fn attribute_namespace(name: &str) -> Option<&'static str> {
    match name {
        "xlink:actuate" | "xlink:arcrole" | "xlink:href" | "xlink:role" | "xlink:show"
        | "xlink:title" | "xlink:type" => Some(XLINK),
        "xml:base" | "xml:lang" | "xml:space" => Some(XML),
        "xmlns" | "xmlns:xlink" => Some(XMLNS),
        _ => None,
    }
}

/// Attributes in source order, then modifiers.
///
/// Without splattributes a `type` attribute moves after every other
/// attribute; with them the runtime orders attributes itself.
pub(super) fn element_params(element: &ElementParams, component: bool) -> Vec<Statement> {
    let splat = element.has_splattributes();
    let mut out = Vec::with_capacity(element.attrs.len() + element.modifiers.len());
    let mut type_attr = None;
    for attr in &element.attrs {
        match attr {
            ElementAttr::Splat { slot, .. } => out.push(Statement::AttrSplat(*slot)),
            ElementAttr::Attr(attr) => {
                let Some(statement) = attribute(attr, component) else {
                    continue;
                };
                if !splat && attr.name == "type" {
                    type_attr = Some(statement);
                } else {
                    out.push(statement);
                }
            }
        }
    }
    out.extend(type_attr);
    out.extend(element.modifiers.iter().map(|modifier| Statement::Modifier {
        callee: expr(&modifier.callee),
        params: params(&modifier.args.positional),
        hash: hash(&modifier.args.named),
    }));
    out
}

/// `None` for a `false` literal: the attribute is left off entirely.
fn attribute(attr: &HtmlAttr, component: bool) -> Option<Statement> {
    let namespace = attribute_namespace(&attr.name);
    let value = match attr.value.as_literal() {
        Some(LiteralValue::Boolean(false)) => return None,
        Some(LiteralValue::Boolean(true)) => String::new(),
        Some(LiteralValue::String(value)) => value.clone(),
        _ => {
            return Some(Statement::DynamicAttr(DynamicAttr {
                name: attr.name.clone(),
                value: expr(&attr.value),
                namespace,
                trusting: attr.trusting,
                component,
            }));
        }
    };
    Some(Statement::StaticAttr(StaticAttr {
        name: attr.name.clone(),
        value,
        namespace,
        component,
    }))
}
