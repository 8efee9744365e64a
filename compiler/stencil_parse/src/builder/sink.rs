//! Tokenizer delegate that assembles HTML into the template tree.

use stencil_diagnostic::{CompileError, CompileResult, Diagnostic, ErrorCode};
use stencil_ir::ast::{
    AttrNode, AttrValue, CommentStatement, ConcatPart, ConcatStatement, ElementModifierStatement,
    ElementNode, MustacheCommentStatement, MustacheStatement, Statement, TextNode,
};
use stencil_ir::{SourceIndex, Span};
use stencil_tokenizer::TokenizerDelegate;
use tracing::{trace, warn};

use crate::lexer::is_reserved_char;

/// Elements that never have children or an end tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "command", "embed", "hr", "img", "input", "keygen", "link",
    "meta", "param", "source", "track", "wbr",
];

pub(super) fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

/// An open container on the element stack.
pub(super) enum Frame {
    /// The template root or a block program.
    Block(Vec<Statement>),
    Element(ElementNode),
}

pub(super) struct StartTag {
    pub name: String,
    pub attributes: Vec<AttrNode>,
    pub modifiers: Vec<ElementModifierStatement>,
    pub comments: Vec<MustacheCommentStatement>,
    pub self_closing: bool,
    pub start: u32,
}

pub(super) enum PendingTag {
    Start(StartTag),
    End { name: String, start: u32 },
}

impl PendingTag {
    pub fn name(&self) -> &str {
        match self {
            PendingTag::Start(tag) => &tag.name,
            PendingTag::End { name, .. } => name,
        }
    }
}

struct PendingAttribute {
    name: String,
    parts: Vec<ConcatPart>,
    current_text: Option<TextNode>,
    quoted: bool,
    dynamic: bool,
    start: u32,
    value_start: u32,
}

impl PendingAttribute {
    /// Close the running text part at `end`.
    fn finalize_text(&mut self, end: u32) {
        if let Some(mut text) = self.current_text.take() {
            text.span.end = end.max(text.span.start);
            self.parts.push(ConcatPart::Text(text));
        }
    }
}

pub(super) struct TreeSink<'a> {
    index: &'a SourceIndex,
    pub frames: Vec<Frame>,
    text: Option<TextNode>,
    comment: Option<CommentStatement>,
    pub tag: Option<PendingTag>,
    attribute: Option<PendingAttribute>,
    pub warnings: Vec<Diagnostic>,
    /// First fatal error. Later events are ignored once this is set.
    error: Option<CompileError>,
}

impl<'a> TreeSink<'a> {
    pub fn new(index: &'a SourceIndex) -> Self {
        TreeSink {
            index,
            frames: Vec::new(),
            text: None,
            comment: None,
            tag: None,
            attribute: None,
            warnings: Vec::new(),
            error: None,
        }
    }

    pub fn take_error(&mut self) -> CompileResult<()> {
        match self.error.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn fail(&mut self, error: CompileError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    fn failed(&self) -> bool {
        self.error.is_some()
    }

    pub fn has_pending_comment(&self) -> bool {
        self.comment.is_some()
    }

    pub fn append_child(&mut self, statement: Statement) {
        match self.frames.last_mut() {
            Some(Frame::Block(body)) => body.push(statement),
            Some(Frame::Element(element)) => element.children.push(statement),
            None => {}
        }
    }

    /// Text written verbatim into the open `<!-- -->` comment.
    pub fn append_to_comment(&mut self, text: &str) {
        if let Some(comment) = &mut self.comment {
            comment.value.push_str(text);
        }
    }

    pub fn start_tag_mut(&mut self) -> Option<&mut StartTag> {
        match &mut self.tag {
            Some(PendingTag::Start(tag)) => Some(tag),
            _ => None,
        }
    }

    /// Attach `mustache` to the open start tag as a modifier.
    pub fn add_modifier(&mut self, mustache: MustacheStatement) -> CompileResult<()> {
        let index = self.index;
        let Some(tag) = self.start_tag_mut() else {
            return Ok(());
        };
        if let stencil_ir::ast::Expression::Literal(literal) = &mustache.path {
            let modifier = format!("{{{{{}}}}}", literal.value);
            let message = format!(
                "In <{} ... {modifier} ..., {modifier} is not a valid modifier",
                tag.name
            );
            return Err(CompileError::structure(
                ErrorCode::E2008,
                message,
                mustache.span,
                index,
            ));
        }
        tag.modifiers.push(ElementModifierStatement {
            path: mustache.path,
            params: mustache.params,
            hash: mustache.hash,
            span: mustache.span,
        });
        Ok(())
    }

    /// A mustache inside an attribute value.
    pub fn append_dynamic_attribute_part(&mut self, mustache: MustacheStatement) {
        if let Some(attribute) = &mut self.attribute {
            attribute.finalize_text(mustache.span.start);
            attribute.dynamic = true;
            attribute.parts.push(ConcatPart::Mustache(mustache));
        }
    }

    // ─── Tags ───

    fn finish_start_tag(&mut self, tag: StartTag, end: u32) -> CompileResult<()> {
        let span = Span::new(tag.start, end);
        if tag.name == ":" {
            return Err(CompileError::structure(
                ErrorCode::E2010,
                "Invalid named block named detected, you may have created a named block without a name, or you may have began your name with a number. Named blocks must have names that are at least one character long, and begin with a lower case letter",
                span,
                self.index,
            ));
        }

        let mut element = ElementNode::new(tag.name, span);
        element.attributes = tag.attributes;
        element.modifiers = tag.modifiers;
        element.comments = tag.comments;
        element.self_closing = tag.self_closing;
        parse_element_block_params(&mut element, self.index)?;
        trace!(tag = %element.tag, void = is_void(&element.tag), "start tag");

        if is_void(&element.tag) || element.self_closing {
            self.append_child(Statement::Element(element));
        } else {
            self.frames.push(Frame::Element(element));
        }
        Ok(())
    }

    fn finish_end_tag(&mut self, name: &str, span: Span) -> CompileResult<()> {
        if is_void(name) {
            return Err(CompileError::structure(
                ErrorCode::E2003,
                format!("<{name}> elements do not need end tags. You should remove it"),
                span,
                self.index,
            ));
        }
        match self.frames.pop() {
            Some(Frame::Element(mut element)) if element.tag == name => {
                element.span.end = span.end;
                self.append_child(Statement::Element(element));
                Ok(())
            }
            Some(Frame::Element(element)) => {
                let line = self.index.position(element.span.start).line;
                Err(CompileError::structure(
                    ErrorCode::E2005,
                    format!(
                        "Closing tag </{name}> did not match last open tag <{}> (on line {line})",
                        element.tag
                    ),
                    span,
                    self.index,
                )
                .with_related(element.span, format!("<{}> opened here", element.tag)))
            }
            frame => {
                self.frames.extend(frame);
                Err(CompileError::structure(
                    ErrorCode::E2004,
                    format!("Closing tag </{name}> without an open tag"),
                    span,
                    self.index,
                ))
            }
        }
    }

    // ─── Attributes ───

    fn finish_attribute(&mut self, end: u32) -> CompileResult<()> {
        let Some(mut attribute) = self.attribute.take() else {
            return Ok(());
        };
        let text_end = if attribute.quoted {
            end.saturating_sub(1)
        } else {
            end
        };
        attribute.finalize_text(text_end);

        let tag = match &mut self.tag {
            Some(PendingTag::Start(tag)) => tag,
            Some(PendingTag::End { start, .. }) => {
                return Err(CompileError::structure(
                    ErrorCode::E2012,
                    "Invalid end tag: closing tag must not have attributes",
                    Span::new(*start, end),
                    self.index,
                ));
            }
            None => return Ok(()),
        };

        let bare = attribute.parts.is_empty() && !attribute.quoted && !attribute.dynamic;
        if bare && attribute.name.starts_with('|') && !tag.attributes.iter().any(|a| a.name == "as")
        {
            let name_end = attribute.start + u32::try_from(attribute.name.len()).unwrap_or(0);
            return Err(CompileError::structure(
                ErrorCode::E2007,
                "Invalid block parameters syntax: block parameters must be preceded by the `as` keyword",
                Span::new(attribute.start, name_end),
                self.index,
            ));
        }

        let span = Span::new(attribute.start, end);
        let value_span = Span::new(attribute.value_start, end);
        let value = assemble_attribute_value(
            attribute.parts,
            attribute.quoted,
            attribute.dynamic,
            value_span,
            self.index,
        )?;
        tag.attributes.push(AttrNode {
            name: attribute.name,
            value,
            span,
        });
        Ok(())
    }
}

impl TokenizerDelegate for TreeSink<'_> {
    fn reset(&mut self) {
        self.text = None;
        self.comment = None;
        self.tag = None;
        self.attribute = None;
    }

    fn tag_open(&mut self, _pos: u32) {}

    fn begin_data(&mut self, pos: u32) {
        self.text = Some(TextNode::new("", Span::point(pos)));
    }

    fn append_to_data(&mut self, ch: char) {
        if let Some(text) = &mut self.text {
            text.chars.push(ch);
        }
    }

    fn finish_data(&mut self, pos: u32) {
        if let Some(mut text) = self.text.take() {
            text.span.end = pos;
            self.append_child(Statement::Text(text));
        }
    }

    fn begin_comment(&mut self, pos: u32) {
        self.comment = Some(CommentStatement {
            value: String::new(),
            span: Span::point(pos),
        });
    }

    fn append_to_comment_data(&mut self, ch: char) {
        if let Some(comment) = &mut self.comment {
            comment.value.push(ch);
        }
    }

    fn finish_comment(&mut self, pos: u32) {
        if let Some(mut comment) = self.comment.take() {
            comment.span.end = pos;
            self.append_child(Statement::Comment(comment));
        }
    }

    fn begin_start_tag(&mut self, pos: u32) {
        self.tag = Some(PendingTag::Start(StartTag {
            name: String::new(),
            attributes: Vec::new(),
            modifiers: Vec::new(),
            comments: Vec::new(),
            self_closing: false,
            start: pos,
        }));
    }

    fn begin_end_tag(&mut self, pos: u32) {
        self.tag = Some(PendingTag::End {
            name: String::new(),
            start: pos,
        });
    }

    fn append_to_tag_name(&mut self, ch: char) {
        match &mut self.tag {
            Some(PendingTag::Start(tag)) => tag.name.push(ch),
            Some(PendingTag::End { name, .. }) => name.push(ch),
            None => {}
        }
    }

    fn mark_tag_as_self_closing(&mut self) {
        if let Some(tag) = self.start_tag_mut() {
            tag.self_closing = true;
        }
    }

    fn finish_tag(&mut self, pos: u32) {
        if self.failed() {
            return;
        }
        let result = match self.tag.take() {
            Some(PendingTag::Start(tag)) => self.finish_start_tag(tag, pos),
            Some(PendingTag::End { name, start }) => {
                self.finish_end_tag(&name, Span::new(start, pos))
            }
            None => Ok(()),
        };
        if let Err(error) = result {
            self.fail(error);
        }
    }

    fn begin_attribute(&mut self, pos: u32) {
        self.attribute = Some(PendingAttribute {
            name: String::new(),
            parts: Vec::new(),
            current_text: None,
            quoted: false,
            dynamic: false,
            start: pos,
            value_start: pos,
        });
    }

    fn append_to_attribute_name(&mut self, ch: char) {
        if let Some(attribute) = &mut self.attribute {
            attribute.name.push(ch);
        }
    }

    fn begin_attribute_value(&mut self, quoted: bool, pos: u32) {
        if let Some(attribute) = &mut self.attribute {
            attribute.quoted = quoted;
            attribute.current_text = None;
            attribute.value_start = pos;
        }
    }

    fn append_to_attribute_value(&mut self, ch: char, pos: u32) {
        if let Some(attribute) = &mut self.attribute {
            match &mut attribute.current_text {
                Some(text) => text.chars.push(ch),
                None => attribute.current_text = Some(TextNode::new(ch, Span::point(pos))),
            }
        }
    }

    fn finish_attribute_value(&mut self, pos: u32) {
        if self.failed() {
            return;
        }
        if let Err(error) = self.finish_attribute(pos) {
            self.fail(error);
        }
    }

    fn report_syntax_error(&mut self, message: &str, pos: u32) {
        let code = if message.contains("equals sign") {
            ErrorCode::E0001
        } else {
            ErrorCode::E0002
        };
        let position = self.index.position(pos);
        warn!(%code, line = position.line, column = position.column, "{message}");
        self.warnings.push(
            Diagnostic::warning(code)
                .with_message(message)
                .with_label(Span::point(pos), "here"),
        );
    }
}

/// Turn collected value parts into an attribute value.
///
/// A quoted value with mustaches is a concatenation. An unquoted value may
/// hold exactly one mustache and nothing else.
fn assemble_attribute_value(
    parts: Vec<ConcatPart>,
    quoted: bool,
    dynamic: bool,
    span: Span,
    index: &SourceIndex,
) -> CompileResult<AttrValue> {
    if dynamic {
        if quoted {
            return Ok(AttrValue::Concat(ConcatStatement { parts, span }));
        }
        let mut parts = parts.into_iter();
        let head = parts.next();
        let rest = parts.next();
        let trailing_slash = matches!(&rest, Some(ConcatPart::Text(text)) if text.chars == "/");
        return match head {
            Some(ConcatPart::Mustache(mustache)) if rest.is_none() || trailing_slash => {
                Ok(AttrValue::Mustache(mustache))
            }
            _ => Err(CompileError::structure(
                ErrorCode::E2009,
                "An unquoted attribute value must be a string or a mustache, preceded by whitespace or a '=' character, and followed by whitespace, a '>' character, or '/>'",
                span,
                index,
            )),
        };
    }
    match parts.into_iter().next() {
        Some(ConcatPart::Text(mut text)) => {
            text.span = span;
            Ok(AttrValue::Text(text))
        }
        Some(ConcatPart::Mustache(mustache)) => Ok(AttrValue::Mustache(mustache)),
        None => Ok(AttrValue::Text(TextNode::new("", span))),
    }
}

/// Move `as |a b|` pseudo-attributes into `element.block_params`.
fn parse_element_block_params(element: &mut ElementNode, index: &SourceIndex) -> CompileResult<()> {
    let span = element.span;
    let invalid = |message: String| CompileError::structure(ErrorCode::E2007, message, span, index);

    let names: Vec<&str> = element.attributes.iter().map(|a| a.name.as_str()).collect();
    let Some(as_index) = names.iter().position(|name| *name == "as") else {
        if names.last().is_some_and(|name| name.starts_with('|')) {
            return Err(invalid(
                "Block parameters must be preceded by the `as` keyword, detected block parameters without `as`".to_owned(),
            ));
        }
        return Ok(());
    };
    if !names.get(as_index + 1).is_some_and(|name| name.starts_with('|')) {
        return Ok(());
    }

    let params_string = names[as_index..].join(" ");
    if !params_string.ends_with('|') || params_string.matches('|').count() != 2 {
        return Err(invalid(format!(
            "Invalid block parameters syntax, '{params_string}'"
        )));
    }

    let mut params = Vec::new();
    for name in &names[as_index + 1..] {
        let param = name.replace('|', "");
        if param.is_empty() {
            continue;
        }
        if param.chars().any(is_reserved_char) {
            return Err(invalid(format!(
                "Invalid identifier for block parameters, '{param}'"
            )));
        }
        params.push(param);
    }
    if params.is_empty() {
        return Err(invalid("Cannot use zero block parameters".to_owned()));
    }

    element.attributes.truncate(as_index);
    element.block_params = params;
    Ok(())
}
