//! Mutable tree walk for AST plugins.
//!
//! A plugin supplies a [`Visitor`] with one hook per node type. Each hook
//! is called once per node, before the node's children are walked, and
//! answers with a [`Transform`]:
//!
//! - `Keep` leaves the (possibly mutated) node in place and walks into it.
//! - `Replace(nodes)` splices `nodes` in its place; their children are
//!   walked but the hook is not re-run on them.
//!
//! Replacing with zero or several nodes is only allowed where the node
//! sits in a list (statement bodies, params, attributes, ...). Single
//! slots such as a mustache's path reject it with a [`TraverseError`].

use std::error::Error;
use std::fmt;

use crate::ast::{
    AttrNode, AttrValue, BlockStatement, CommentStatement, ConcatPart, ElementModifierStatement,
    ElementNode, Expression, Hash, HashPair, Literal, MustacheCommentStatement,
    MustacheStatement, PartialStatement, PathExpression, Statement, SubExpression, Template,
    TextNode,
};
use crate::{Span, Spanned};

/// Error type plugin hooks may return.
pub type HookError = Box<dyn Error + Send + Sync>;

/// Result of a visitor hook.
pub type HookResult<T> = Result<Transform<T>, HookError>;

#[derive(Clone, Debug, PartialEq)]
pub enum Transform<T> {
    Keep,
    Replace(Vec<T>),
}

impl<T> Transform<T> {
    pub fn remove() -> Self {
        Transform::Replace(Vec::new())
    }

    pub fn replace(node: T) -> Self {
        Transform::Replace(vec![node])
    }
}

/// Per-node-type hooks. Every hook defaults to `Keep`.
#[allow(unused_variables)]
pub trait Visitor {
    fn element(&mut self, node: &mut ElementNode) -> HookResult<Statement> {
        Ok(Transform::Keep)
    }

    fn mustache(&mut self, node: &mut MustacheStatement) -> HookResult<Statement> {
        Ok(Transform::Keep)
    }

    fn block(&mut self, node: &mut BlockStatement) -> HookResult<Statement> {
        Ok(Transform::Keep)
    }

    fn partial(&mut self, node: &mut PartialStatement) -> HookResult<Statement> {
        Ok(Transform::Keep)
    }

    fn text(&mut self, node: &mut TextNode) -> HookResult<Statement> {
        Ok(Transform::Keep)
    }

    fn comment(&mut self, node: &mut CommentStatement) -> HookResult<Statement> {
        Ok(Transform::Keep)
    }

    fn mustache_comment(&mut self, node: &mut MustacheCommentStatement) -> HookResult<Statement> {
        Ok(Transform::Keep)
    }

    fn attribute(&mut self, node: &mut AttrNode) -> HookResult<AttrNode> {
        Ok(Transform::Keep)
    }

    fn modifier(
        &mut self,
        node: &mut ElementModifierStatement,
    ) -> HookResult<ElementModifierStatement> {
        Ok(Transform::Keep)
    }

    fn path(&mut self, node: &mut PathExpression) -> HookResult<Expression> {
        Ok(Transform::Keep)
    }

    fn sub_expression(&mut self, node: &mut SubExpression) -> HookResult<Expression> {
        Ok(Transform::Keep)
    }

    fn literal(&mut self, node: &mut Literal) -> HookResult<Expression> {
        Ok(Transform::Keep)
    }

    fn hash_pair(&mut self, node: &mut HashPair) -> HookResult<HashPair> {
        Ok(Transform::Keep)
    }
}

/// Failure while walking the tree.
#[derive(Debug)]
pub enum TraverseError {
    /// A hook returned an error.
    Hook(HookError),
    /// A hook removed a node from a single-node slot.
    Removed { node: &'static str, span: Span },
    /// A hook put several nodes into a single-node slot.
    Multiple { node: &'static str, span: Span },
    /// A hook returned a node of a type the slot cannot hold.
    WrongType {
        expected: &'static str,
        found: &'static str,
        span: Span,
    },
}

impl TraverseError {
    pub fn span(&self) -> Span {
        match self {
            TraverseError::Hook(_) => Span::DUMMY,
            TraverseError::Removed { span, .. }
            | TraverseError::Multiple { span, .. }
            | TraverseError::WrongType { span, .. } => *span,
        }
    }
}

impl fmt::Display for TraverseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraverseError::Hook(err) => write!(f, "{err}"),
            TraverseError::Removed { node, .. } => write!(
                f,
                "Cannot remove a node unless it is part of an array (while visiting {node})"
            ),
            TraverseError::Multiple { node, .. } => write!(
                f,
                "Cannot replace a single node with multiple nodes unless it is part of an array (while visiting {node})"
            ),
            TraverseError::WrongType {
                expected, found, ..
            } => write!(f, "Cannot replace a {expected} with a {found} here"),
        }
    }
}

impl Error for TraverseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            TraverseError::Hook(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

/// Run `visitor` over the whole template.
pub fn traverse(template: &mut Template, visitor: &mut dyn Visitor) -> Result<(), TraverseError> {
    walk_statements(&mut template.body, visitor)
}

// ─── Statements ───

fn walk_statements(
    list: &mut Vec<Statement>,
    visitor: &mut dyn Visitor,
) -> Result<(), TraverseError> {
    let old = std::mem::take(list);
    for mut stmt in old {
        match visit_statement(&mut stmt, visitor)? {
            Transform::Keep => {
                walk_statement(&mut stmt, visitor)?;
                list.push(stmt);
            }
            Transform::Replace(nodes) => {
                for mut node in nodes {
                    walk_statement(&mut node, visitor)?;
                    list.push(node);
                }
            }
        }
    }
    Ok(())
}

fn visit_statement(
    stmt: &mut Statement,
    visitor: &mut dyn Visitor,
) -> Result<Transform<Statement>, TraverseError> {
    let result = match stmt {
        Statement::Mustache(node) => visitor.mustache(node),
        Statement::Block(node) => visitor.block(node),
        Statement::Partial(node) => visitor.partial(node),
        Statement::Comment(node) => visitor.comment(node),
        Statement::MustacheComment(node) => visitor.mustache_comment(node),
        Statement::Text(node) => visitor.text(node),
        Statement::Element(node) => visitor.element(node),
    };
    result.map_err(TraverseError::Hook)
}

fn walk_statement(stmt: &mut Statement, visitor: &mut dyn Visitor) -> Result<(), TraverseError> {
    match stmt {
        Statement::Mustache(node) => {
            walk_call(&mut node.path, &mut node.params, &mut node.hash, visitor)
        }
        Statement::Block(node) => {
            walk_call(&mut node.path, &mut node.params, &mut node.hash, visitor)?;
            walk_statements(&mut node.program.body, visitor)?;
            if let Some(inverse) = &mut node.inverse {
                walk_statements(&mut inverse.body, visitor)?;
            }
            Ok(())
        }
        Statement::Partial(node) => {
            walk_call(&mut node.name, &mut node.params, &mut node.hash, visitor)
        }
        Statement::Element(node) => walk_element(node, visitor),
        Statement::Comment(_) | Statement::MustacheComment(_) | Statement::Text(_) => Ok(()),
    }
}

fn walk_element(node: &mut ElementNode, visitor: &mut dyn Visitor) -> Result<(), TraverseError> {
    let attributes = std::mem::take(&mut node.attributes);
    for mut attr in attributes {
        let replacement = visitor.attribute(&mut attr).map_err(TraverseError::Hook)?;
        for mut attr in kept_or_replaced(attr, replacement) {
            walk_attr_value(&mut attr.value, visitor)?;
            node.attributes.push(attr);
        }
    }

    let modifiers = std::mem::take(&mut node.modifiers);
    for mut modifier in modifiers {
        let replacement = visitor.modifier(&mut modifier).map_err(TraverseError::Hook)?;
        for mut modifier in kept_or_replaced(modifier, replacement) {
            walk_call(&mut modifier.path, &mut modifier.params, &mut modifier.hash, visitor)?;
            node.modifiers.push(modifier);
        }
    }

    walk_statements(&mut node.children, visitor)
}

fn walk_attr_value(value: &mut AttrValue, visitor: &mut dyn Visitor) -> Result<(), TraverseError> {
    match value {
        AttrValue::Text(text) => {
            let result = visitor.text(text).map_err(TraverseError::Hook)?;
            if let Some(stmt) = single(result, "TextNode", text.span)? {
                *value = attr_value_from(stmt)?;
            }
        }
        AttrValue::Mustache(mustache) => {
            let result = visitor.mustache(mustache).map_err(TraverseError::Hook)?;
            if let Some(stmt) = single(result, "MustacheStatement", mustache.span)? {
                *value = attr_value_from(stmt)?;
            }
        }
        AttrValue::Concat(concat) => {
            let parts = std::mem::take(&mut concat.parts);
            for part in parts {
                let (result, original) = match part {
                    ConcatPart::Text(mut text) => {
                        let result = visitor.text(&mut text).map_err(TraverseError::Hook)?;
                        (result, Statement::Text(text))
                    }
                    ConcatPart::Mustache(mut mustache) => {
                        let result = visitor.mustache(&mut mustache).map_err(TraverseError::Hook)?;
                        (result, Statement::Mustache(mustache))
                    }
                };
                for stmt in kept_or_replaced(original, result) {
                    concat.parts.push(concat_part_from(stmt)?);
                }
            }
        }
    }

    match value {
        AttrValue::Mustache(mustache) => walk_call(
            &mut mustache.path,
            &mut mustache.params,
            &mut mustache.hash,
            visitor,
        ),
        AttrValue::Concat(concat) => {
            for part in &mut concat.parts {
                if let ConcatPart::Mustache(mustache) = part {
                    walk_call(
                        &mut mustache.path,
                        &mut mustache.params,
                        &mut mustache.hash,
                        visitor,
                    )?;
                }
            }
            Ok(())
        }
        AttrValue::Text(_) => Ok(()),
    }
}

fn attr_value_from(stmt: Statement) -> Result<AttrValue, TraverseError> {
    match stmt {
        Statement::Text(text) => Ok(AttrValue::Text(text)),
        Statement::Mustache(mustache) => Ok(AttrValue::Mustache(mustache)),
        other => Err(TraverseError::WrongType {
            expected: "attribute value",
            found: other.kind_name(),
            span: other.span(),
        }),
    }
}

fn concat_part_from(stmt: Statement) -> Result<ConcatPart, TraverseError> {
    match stmt {
        Statement::Text(text) => Ok(ConcatPart::Text(text)),
        Statement::Mustache(mustache) => Ok(ConcatPart::Mustache(mustache)),
        other => Err(TraverseError::WrongType {
            expected: "concat part",
            found: other.kind_name(),
            span: other.span(),
        }),
    }
}

// ─── Expressions ───

fn walk_call(
    path: &mut Expression,
    params: &mut Vec<Expression>,
    hash: &mut Hash,
    visitor: &mut dyn Visitor,
) -> Result<(), TraverseError> {
    walk_expression_slot(path, visitor)?;
    walk_expressions(params, visitor)?;
    walk_hash(hash, visitor)
}

fn walk_hash(hash: &mut Hash, visitor: &mut dyn Visitor) -> Result<(), TraverseError> {
    let pairs = std::mem::take(&mut hash.pairs);
    for mut pair in pairs {
        let replacement = visitor.hash_pair(&mut pair).map_err(TraverseError::Hook)?;
        for mut pair in kept_or_replaced(pair, replacement) {
            walk_expression_slot(&mut pair.value, visitor)?;
            hash.pairs.push(pair);
        }
    }
    Ok(())
}

fn walk_expressions(
    list: &mut Vec<Expression>,
    visitor: &mut dyn Visitor,
) -> Result<(), TraverseError> {
    let old = std::mem::take(list);
    for mut expr in old {
        let replacement = visit_expression(&mut expr, visitor)?;
        for mut expr in kept_or_replaced(expr, replacement) {
            walk_expression(&mut expr, visitor)?;
            list.push(expr);
        }
    }
    Ok(())
}

fn walk_expression_slot(
    expr: &mut Expression,
    visitor: &mut dyn Visitor,
) -> Result<(), TraverseError> {
    let result = visit_expression(expr, visitor)?;
    let kind = expression_kind(expr);
    if let Some(replacement) = single(result, kind, expr.span())? {
        *expr = replacement;
    }
    walk_expression(expr, visitor)
}

fn visit_expression(
    expr: &mut Expression,
    visitor: &mut dyn Visitor,
) -> Result<Transform<Expression>, TraverseError> {
    let result = match expr {
        Expression::Path(node) => visitor.path(node),
        Expression::SubExpression(node) => visitor.sub_expression(node),
        Expression::Literal(node) => visitor.literal(node),
    };
    result.map_err(TraverseError::Hook)
}

fn walk_expression(expr: &mut Expression, visitor: &mut dyn Visitor) -> Result<(), TraverseError> {
    match expr {
        Expression::SubExpression(node) => {
            walk_call(&mut node.path, &mut node.params, &mut node.hash, visitor)
        }
        Expression::Path(_) | Expression::Literal(_) => Ok(()),
    }
}

fn expression_kind(expr: &Expression) -> &'static str {
    match expr {
        Expression::Path(_) => "PathExpression",
        Expression::SubExpression(_) => "SubExpression",
        Expression::Literal(_) => "Literal",
    }
}

// ─── Helpers ───

fn kept_or_replaced<T>(node: T, transform: Transform<T>) -> Vec<T> {
    match transform {
        Transform::Keep => vec![node],
        Transform::Replace(nodes) => nodes,
    }
}

/// Unpack a transform aimed at a single-node slot.
fn single<T>(
    transform: Transform<T>,
    node: &'static str,
    span: Span,
) -> Result<Option<T>, TraverseError> {
    match transform {
        Transform::Keep => Ok(None),
        Transform::Replace(mut nodes) => match nodes.len() {
            0 => Err(TraverseError::Removed { node, span }),
            1 => Ok(nodes.pop()),
            _ => Err(TraverseError::Multiple { node, span }),
        },
    }
}
