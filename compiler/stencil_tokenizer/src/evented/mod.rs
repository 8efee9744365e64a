//! Character-driven HTML state machine.
//!
//! Input arrives in chunks (`tokenize_part`); the machine keeps its state
//! between chunks so a caller can interleave its own syntax (mustaches)
//! and inspect [`EventedTokenizer::state`] at every seam. Events go to a
//! [`TokenizerDelegate`].
//!
//! # Line endings
//!
//! `\r\n` and a lone `\r` are read as a single `\n`. Offsets still advance
//! by the real byte width, so spans stay valid against the raw source.
//!
//! # Raw text
//!
//! After `<title>`, `<style>` or `<script>`, a `<` only opens a tag when it
//! begins the matching end tag. Character references are never decoded in
//! `<script>`/`<style>` text.

use crate::entities::{CharRefResolver, HtmlEntities, NoEntities};
use crate::{TokenizerDelegate, TokenizerMode, TokenizerState};

pub struct EventedTokenizer<D> {
    delegate: D,
    state: TokenizerState,
    mode: TokenizerMode,
    resolver: Box<dyn CharRefResolver>,
    /// Every chunk seen since the last reset.
    input: String,
    index: usize,
    /// `input` index where the current chunk starts.
    part_start: usize,
    /// Caller offset of `input[part_start]`.
    part_offset: usize,
    /// Name of the most recent tag, for raw-text and `<pre>` handling.
    tag_name_buffer: String,
    /// Offset of the `<` that opened the current tag or comment.
    tag_open_pos: u32,
}

impl<D: TokenizerDelegate> EventedTokenizer<D> {
    pub fn new(delegate: D, mode: TokenizerMode) -> Self {
        let resolver: Box<dyn CharRefResolver> = match mode {
            TokenizerMode::Precompile => Box::new(HtmlEntities),
            TokenizerMode::Codemod => Box::new(NoEntities),
        };
        EventedTokenizer {
            delegate,
            state: TokenizerState::BeforeData,
            mode,
            resolver,
            input: String::new(),
            index: 0,
            part_start: 0,
            part_offset: 0,
            tag_name_buffer: String::new(),
            tag_open_pos: 0,
        }
    }

    /// Replace the character reference decoder.
    #[must_use]
    pub fn with_resolver(mut self, resolver: Box<dyn CharRefResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    #[inline]
    pub fn state(&self) -> TokenizerState {
        self.state
    }

    /// Force a state. The tree builder uses this after it has consumed a
    /// mustache on the machine's behalf (e.g. a modifier ends an attribute).
    #[inline]
    pub fn transition_to(&mut self, state: TokenizerState) {
        self.state = state;
    }

    pub fn delegate(&self) -> &D {
        &self.delegate
    }

    pub fn delegate_mut(&mut self) -> &mut D {
        &mut self.delegate
    }

    pub fn into_delegate(self) -> D {
        self.delegate
    }

    pub fn mode(&self) -> TokenizerMode {
        self.mode
    }

    /// Declare that the next chunk starts at `offset` in the caller's source.
    pub fn set_source_offset(&mut self, offset: usize) {
        self.part_start = self.input.len();
        self.part_offset = offset;
    }

    /// Return to the initial state, forgetting all input.
    pub fn reset(&mut self) {
        self.state = TokenizerState::BeforeData;
        self.input.clear();
        self.index = 0;
        self.part_start = 0;
        self.part_offset = 0;
        self.tag_name_buffer.clear();
        self.tag_open_pos = 0;
        self.delegate.reset();
    }

    pub fn tokenize_part(&mut self, input: &str) {
        self.input.push_str(input);
        while self.index < self.input.len() {
            self.step();
        }
    }

    pub fn tokenize_eof(&mut self) {
        self.flush_data();
    }

    /// Close an open text run, if any.
    pub fn flush_data(&mut self) {
        if self.state == TokenizerState::Data {
            let pos = self.pos();
            self.delegate.finish_data(pos);
            self.state = TokenizerState::BeforeData;
        }
    }

    /// Current offset in the caller's source.
    pub fn pos(&self) -> u32 {
        let offset = self.part_offset + (self.index - self.part_start);
        u32::try_from(offset).unwrap_or(u32::MAX)
    }

    // ─── Input ───

    fn peek(&self) -> Option<char> {
        let mut chars = self.input[self.index..].chars();
        match chars.next()? {
            '\r' => Some('\n'),
            ch => Some(ch),
        }
    }

    fn consume(&mut self) -> Option<char> {
        let rest = &self.input[self.index..];
        let mut chars = rest.chars();
        let ch = chars.next()?;
        if ch == '\r' {
            self.index += if chars.next() == Some('\n') { 2 } else { 1 };
            return Some('\n');
        }
        self.index += ch.len_utf8();
        Some(ch)
    }

    /// Decode the reference after an already-consumed `&`.
    fn consume_char_ref(&mut self) -> Option<String> {
        let rest = &self.input[self.index..];
        let end = memchr::memchr(b';', rest.as_bytes())?;
        let decoded = self.resolver.resolve(&rest[..end])?;
        self.index += end + 1;
        Some(decoded)
    }

    fn is_ignored_end_tag(&self) -> bool {
        let closing = match self.tag_name_buffer.as_str() {
            "title" => "</title>",
            "style" => "</style>",
            "script" => "</script>",
            _ => return false,
        };
        !self.input[self.index..].starts_with(closing)
    }

    fn mark_tag_start(&mut self) {
        self.tag_open_pos = self.pos();
        self.delegate.tag_open(self.tag_open_pos);
    }

    fn append_to_tag_name(&mut self, ch: char) {
        self.tag_name_buffer.push(ch);
        self.delegate.append_to_tag_name(ch);
    }

    fn append_data_str(&mut self, text: &str) {
        for ch in text.chars() {
            self.delegate.append_to_data(ch);
        }
    }

    fn append_attribute_value_str(&mut self, text: &str, pos: u32) {
        for ch in text.chars() {
            self.delegate.append_to_attribute_value(ch, pos);
        }
    }

    fn append_comment_str(&mut self, text: &str) {
        for ch in text.chars() {
            self.delegate.append_to_comment_data(ch);
        }
    }

    fn is_tag_name_start(ch: char) -> bool {
        ch == '@' || ch == ':' || ch.is_ascii_alphabetic()
    }

    // ─── States ───

    fn step(&mut self) {
        match self.state {
            TokenizerState::BeforeData => self.before_data(),
            TokenizerState::Data => self.data(),
            TokenizerState::TagOpen => self.tag_open(),
            TokenizerState::MarkupDeclarationOpen => self.markup_declaration_open(),
            TokenizerState::CommentStart => self.comment_start(),
            TokenizerState::CommentStartDash => self.comment_start_dash(),
            TokenizerState::Comment => self.comment(),
            TokenizerState::CommentEndDash => self.comment_end_dash(),
            TokenizerState::CommentEnd => self.comment_end(),
            TokenizerState::TagName => self.tag_name(),
            TokenizerState::EndTagName => self.end_tag_name(),
            TokenizerState::BeforeAttributeName => self.before_attribute_name(),
            TokenizerState::AttributeName => self.attribute_name(),
            TokenizerState::AfterAttributeName => self.after_attribute_name(),
            TokenizerState::BeforeAttributeValue => self.before_attribute_value(),
            TokenizerState::AttributeValueDoubleQuoted => self.attribute_value_quoted('"'),
            TokenizerState::AttributeValueSingleQuoted => self.attribute_value_quoted('\''),
            TokenizerState::AttributeValueUnquoted => self.attribute_value_unquoted(),
            TokenizerState::AfterAttributeValueQuoted => self.after_attribute_value_quoted(),
            TokenizerState::SelfClosingStartTag => self.self_closing_start_tag(),
            TokenizerState::EndTagOpen => self.end_tag_open(),
        }
    }

    fn before_data(&mut self) {
        let Some(ch) = self.peek() else { return };
        if ch == '<' && !self.is_ignored_end_tag() {
            self.state = TokenizerState::TagOpen;
            self.mark_tag_start();
            self.consume();
            return;
        }
        if self.mode == TokenizerMode::Precompile && ch == '\n' {
            let tag = self.tag_name_buffer.to_ascii_lowercase();
            if tag == "pre" || tag == "textarea" {
                self.consume();
            }
        }
        self.state = TokenizerState::Data;
        let pos = self.pos();
        self.delegate.begin_data(pos);
    }

    fn data(&mut self) {
        let Some(ch) = self.peek() else { return };
        let raw_text = matches!(self.tag_name_buffer.as_str(), "script" | "style");
        if ch == '<' && !self.is_ignored_end_tag() {
            let pos = self.pos();
            self.delegate.finish_data(pos);
            self.state = TokenizerState::TagOpen;
            self.mark_tag_start();
            self.consume();
        } else if ch == '&' && !raw_text {
            self.consume();
            match self.consume_char_ref() {
                Some(decoded) => self.append_data_str(&decoded),
                None => self.delegate.append_to_data('&'),
            }
        } else {
            self.consume();
            self.delegate.append_to_data(ch);
        }
    }

    fn tag_open(&mut self) {
        let Some(ch) = self.consume() else { return };
        if ch == '!' {
            self.state = TokenizerState::MarkupDeclarationOpen;
        } else if ch == '/' {
            self.state = TokenizerState::EndTagOpen;
        } else if Self::is_tag_name_start(ch) {
            self.state = TokenizerState::TagName;
            self.tag_name_buffer.clear();
            self.delegate.begin_start_tag(self.tag_open_pos);
            self.append_to_tag_name(ch);
        }
    }

    fn markup_declaration_open(&mut self) {
        let Some(ch) = self.consume() else { return };
        if ch == '-' && self.peek() == Some('-') {
            self.consume();
            self.state = TokenizerState::CommentStart;
            self.delegate.begin_comment(self.tag_open_pos);
        }
    }

    fn comment_start(&mut self) {
        let Some(ch) = self.consume() else { return };
        match ch {
            '-' => self.state = TokenizerState::CommentStartDash,
            '>' => {
                let pos = self.pos();
                self.delegate.finish_comment(pos);
                self.state = TokenizerState::BeforeData;
            }
            _ => {
                self.delegate.append_to_comment_data(ch);
                self.state = TokenizerState::Comment;
            }
        }
    }

    fn comment_start_dash(&mut self) {
        let Some(ch) = self.consume() else { return };
        match ch {
            '-' => self.state = TokenizerState::CommentEnd,
            '>' => {
                let pos = self.pos();
                self.delegate.finish_comment(pos);
                self.state = TokenizerState::BeforeData;
            }
            _ => {
                self.delegate.append_to_comment_data('-');
                self.state = TokenizerState::Comment;
            }
        }
    }

    fn comment(&mut self) {
        let Some(ch) = self.consume() else { return };
        if ch == '-' {
            self.state = TokenizerState::CommentEndDash;
        } else {
            self.delegate.append_to_comment_data(ch);
        }
    }

    fn comment_end_dash(&mut self) {
        let Some(ch) = self.consume() else { return };
        if ch == '-' {
            self.state = TokenizerState::CommentEnd;
        } else {
            self.delegate.append_to_comment_data('-');
            self.delegate.append_to_comment_data(ch);
            self.state = TokenizerState::Comment;
        }
    }

    fn comment_end(&mut self) {
        let Some(ch) = self.consume() else { return };
        if ch == '>' {
            let pos = self.pos();
            self.delegate.finish_comment(pos);
            self.state = TokenizerState::BeforeData;
        } else {
            self.append_comment_str("--");
            self.delegate.append_to_comment_data(ch);
            self.state = TokenizerState::Comment;
        }
    }

    fn tag_name(&mut self) {
        let Some(ch) = self.consume() else { return };
        if is_space(ch) {
            self.state = TokenizerState::BeforeAttributeName;
        } else if ch == '/' {
            self.state = TokenizerState::SelfClosingStartTag;
        } else if ch == '>' {
            let pos = self.pos();
            self.delegate.finish_tag(pos);
            self.state = TokenizerState::BeforeData;
        } else {
            self.append_to_tag_name(ch);
        }
    }

    fn end_tag_name(&mut self) {
        let Some(ch) = self.consume() else { return };
        if is_space(ch) {
            self.state = TokenizerState::BeforeAttributeName;
            self.tag_name_buffer.clear();
        } else if ch == '/' {
            self.state = TokenizerState::SelfClosingStartTag;
            self.tag_name_buffer.clear();
        } else if ch == '>' {
            let pos = self.pos();
            self.delegate.finish_tag(pos);
            self.state = TokenizerState::BeforeData;
            self.tag_name_buffer.clear();
        } else {
            self.append_to_tag_name(ch);
        }
    }

    fn before_attribute_name(&mut self) {
        let Some(ch) = self.peek() else { return };
        let pos = self.pos();
        if is_space(ch) {
            self.consume();
        } else if ch == '/' {
            self.state = TokenizerState::SelfClosingStartTag;
            self.consume();
        } else if ch == '>' {
            self.consume();
            let end = self.pos();
            self.delegate.finish_tag(end);
            self.state = TokenizerState::BeforeData;
        } else if ch == '=' {
            self.delegate
                .report_syntax_error("attribute name cannot start with equals sign", pos);
            self.state = TokenizerState::AttributeName;
            self.delegate.begin_attribute(pos);
            self.consume();
            self.delegate.append_to_attribute_name(ch);
        } else {
            self.state = TokenizerState::AttributeName;
            self.delegate.begin_attribute(pos);
        }
    }

    fn attribute_name(&mut self) {
        let Some(ch) = self.peek() else { return };
        let pos = self.pos();
        if is_space(ch) {
            self.state = TokenizerState::AfterAttributeName;
            self.consume();
        } else if ch == '/' {
            self.delegate.begin_attribute_value(false, pos);
            self.delegate.finish_attribute_value(pos);
            self.consume();
            self.state = TokenizerState::SelfClosingStartTag;
        } else if ch == '=' {
            self.state = TokenizerState::BeforeAttributeValue;
            self.consume();
        } else if ch == '>' {
            self.delegate.begin_attribute_value(false, pos);
            self.delegate.finish_attribute_value(pos);
            self.consume();
            let end = self.pos();
            self.delegate.finish_tag(end);
            self.state = TokenizerState::BeforeData;
        } else if ch == '"' || ch == '\'' || ch == '<' {
            let message = format!("{ch} is not a valid character within attribute names");
            self.delegate.report_syntax_error(&message, pos);
            self.consume();
            self.delegate.append_to_attribute_name(ch);
        } else {
            self.consume();
            self.delegate.append_to_attribute_name(ch);
        }
    }

    fn after_attribute_name(&mut self) {
        let Some(ch) = self.peek() else { return };
        let pos = self.pos();
        if is_space(ch) {
            self.consume();
        } else if ch == '/' {
            self.delegate.begin_attribute_value(false, pos);
            self.delegate.finish_attribute_value(pos);
            self.consume();
            self.state = TokenizerState::SelfClosingStartTag;
        } else if ch == '=' {
            self.consume();
            self.state = TokenizerState::BeforeAttributeValue;
        } else if ch == '>' {
            self.delegate.begin_attribute_value(false, pos);
            self.delegate.finish_attribute_value(pos);
            self.consume();
            let end = self.pos();
            self.delegate.finish_tag(end);
            self.state = TokenizerState::BeforeData;
        } else {
            self.delegate.begin_attribute_value(false, pos);
            self.delegate.finish_attribute_value(pos);
            self.state = TokenizerState::AttributeName;
            self.delegate.begin_attribute(pos);
            self.consume();
            self.delegate.append_to_attribute_name(ch);
        }
    }

    fn before_attribute_value(&mut self) {
        let Some(ch) = self.peek() else { return };
        let pos = self.pos();
        if is_space(ch) {
            self.consume();
        } else if ch == '"' {
            self.state = TokenizerState::AttributeValueDoubleQuoted;
            self.delegate.begin_attribute_value(true, pos);
            self.consume();
        } else if ch == '\'' {
            self.state = TokenizerState::AttributeValueSingleQuoted;
            self.delegate.begin_attribute_value(true, pos);
            self.consume();
        } else if ch == '>' {
            self.delegate.begin_attribute_value(false, pos);
            self.delegate.finish_attribute_value(pos);
            self.consume();
            let end = self.pos();
            self.delegate.finish_tag(end);
            self.state = TokenizerState::BeforeData;
        } else {
            self.state = TokenizerState::AttributeValueUnquoted;
            self.delegate.begin_attribute_value(false, pos);
            self.consume();
            self.delegate.append_to_attribute_value(ch, pos);
        }
    }

    fn attribute_value_quoted(&mut self, quote: char) {
        let pos = self.pos();
        let Some(ch) = self.consume() else { return };
        if ch == quote {
            let end = self.pos();
            self.delegate.finish_attribute_value(end);
            self.state = TokenizerState::AfterAttributeValueQuoted;
        } else if ch == '&' {
            match self.consume_char_ref() {
                Some(decoded) => self.append_attribute_value_str(&decoded, pos),
                None => self.delegate.append_to_attribute_value('&', pos),
            }
        } else {
            self.delegate.append_to_attribute_value(ch, pos);
        }
    }

    fn attribute_value_unquoted(&mut self) {
        let Some(ch) = self.peek() else { return };
        let pos = self.pos();
        if is_space(ch) {
            self.delegate.finish_attribute_value(pos);
            self.consume();
            self.state = TokenizerState::BeforeAttributeName;
        } else if ch == '/' {
            self.delegate.finish_attribute_value(pos);
            self.consume();
            self.state = TokenizerState::SelfClosingStartTag;
        } else if ch == '&' {
            self.consume();
            match self.consume_char_ref() {
                Some(decoded) => self.append_attribute_value_str(&decoded, pos),
                None => self.delegate.append_to_attribute_value('&', pos),
            }
        } else if ch == '>' {
            self.delegate.finish_attribute_value(pos);
            self.consume();
            let end = self.pos();
            self.delegate.finish_tag(end);
            self.state = TokenizerState::BeforeData;
        } else {
            self.consume();
            self.delegate.append_to_attribute_value(ch, pos);
        }
    }

    fn after_attribute_value_quoted(&mut self) {
        let Some(ch) = self.peek() else { return };
        if is_space(ch) {
            self.consume();
            self.state = TokenizerState::BeforeAttributeName;
        } else if ch == '/' {
            self.consume();
            self.state = TokenizerState::SelfClosingStartTag;
        } else if ch == '>' {
            self.consume();
            let end = self.pos();
            self.delegate.finish_tag(end);
            self.state = TokenizerState::BeforeData;
        } else {
            self.state = TokenizerState::BeforeAttributeName;
        }
    }

    fn self_closing_start_tag(&mut self) {
        let Some(ch) = self.peek() else { return };
        if ch == '>' {
            self.consume();
            self.delegate.mark_tag_as_self_closing();
            let end = self.pos();
            self.delegate.finish_tag(end);
            self.state = TokenizerState::BeforeData;
        } else {
            self.state = TokenizerState::BeforeAttributeName;
        }
    }

    fn end_tag_open(&mut self) {
        let Some(ch) = self.consume() else { return };
        if Self::is_tag_name_start(ch) {
            self.state = TokenizerState::EndTagName;
            self.tag_name_buffer.clear();
            self.delegate.begin_end_tag(self.tag_open_pos);
            self.append_to_tag_name(ch);
        }
    }
}

/// HTML whitespace. `\r` never reaches here; it is folded into `\n`.
fn is_space(ch: char) -> bool {
    matches!(ch, '\t' | '\n' | '\x0C' | ' ')
}

#[cfg(test)]
mod tests;
