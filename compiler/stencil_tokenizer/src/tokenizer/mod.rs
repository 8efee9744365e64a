//! Token-producing front end over the evented state machine.
//!
//! [`Tokenizer`] collects events into [`Token`]s. It is used directly by
//! tooling that only needs HTML structure; the template compiler drives
//! [`EventedTokenizer`] with its own delegate instead.

use crate::{EventedTokenizer, TokenizerDelegate, TokenizerMode};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
    pub quoted: bool,
    pub start: u32,
    pub end: u32,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Token {
    StartTag {
        name: String,
        attributes: Vec<Attribute>,
        self_closing: bool,
        start: u32,
        end: u32,
    },
    EndTag {
        name: String,
        start: u32,
        end: u32,
    },
    Chars {
        chars: String,
        start: u32,
        end: u32,
    },
    Comment {
        chars: String,
        start: u32,
        end: u32,
    },
}

impl Token {
    /// Byte range `(start, end)` of the token.
    pub fn range(&self) -> (u32, u32) {
        match self {
            Token::StartTag { start, end, .. }
            | Token::EndTag { start, end, .. }
            | Token::Chars { start, end, .. }
            | Token::Comment { start, end, .. } => (*start, *end),
        }
    }

    fn set_end(&mut self, pos: u32) {
        match self {
            Token::StartTag { end, .. }
            | Token::EndTag { end, .. }
            | Token::Chars { end, .. }
            | Token::Comment { end, .. } => *end = pos,
        }
    }
}

/// Recoverable syntax error.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TokenizerError {
    pub message: String,
    pub pos: u32,
}

/// Output of a whole-input [`Tokenizer::tokenize`].
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TokenizeOutput {
    pub tokens: Vec<Token>,
    pub errors: Vec<TokenizerError>,
}

/// Delegate that builds [`Token`]s.
#[derive(Debug, Default)]
pub struct TokenCollector {
    tokens: Vec<Token>,
    current: Option<Token>,
    attribute: Option<Attribute>,
    errors: Vec<TokenizerError>,
}

impl TokenCollector {
    fn push_char(&mut self, ch: char) {
        match &mut self.current {
            Some(Token::Chars { chars, .. } | Token::Comment { chars, .. }) => chars.push(ch),
            Some(Token::StartTag { name, .. } | Token::EndTag { name, .. }) => name.push(ch),
            None => {}
        }
    }

    fn finish_current(&mut self, pos: u32) {
        if let Some(mut token) = self.current.take() {
            token.set_end(pos);
            self.tokens.push(token);
        }
    }
}

impl TokenizerDelegate for TokenCollector {
    fn reset(&mut self) {
        self.tokens.clear();
        self.current = None;
        self.attribute = None;
        self.errors.clear();
    }

    fn tag_open(&mut self, _pos: u32) {}

    fn begin_data(&mut self, pos: u32) {
        self.current = Some(Token::Chars {
            chars: String::new(),
            start: pos,
            end: pos,
        });
    }

    fn append_to_data(&mut self, ch: char) {
        self.push_char(ch);
    }

    fn finish_data(&mut self, pos: u32) {
        self.finish_current(pos);
    }

    fn begin_comment(&mut self, pos: u32) {
        self.current = Some(Token::Comment {
            chars: String::new(),
            start: pos,
            end: pos,
        });
    }

    fn append_to_comment_data(&mut self, ch: char) {
        self.push_char(ch);
    }

    fn finish_comment(&mut self, pos: u32) {
        self.finish_current(pos);
    }

    fn begin_start_tag(&mut self, pos: u32) {
        self.current = Some(Token::StartTag {
            name: String::new(),
            attributes: Vec::new(),
            self_closing: false,
            start: pos,
            end: pos,
        });
    }

    fn begin_end_tag(&mut self, pos: u32) {
        self.current = Some(Token::EndTag {
            name: String::new(),
            start: pos,
            end: pos,
        });
    }

    fn append_to_tag_name(&mut self, ch: char) {
        self.push_char(ch);
    }

    fn mark_tag_as_self_closing(&mut self) {
        if let Some(Token::StartTag { self_closing, .. }) = &mut self.current {
            *self_closing = true;
        }
    }

    fn finish_tag(&mut self, pos: u32) {
        self.finish_current(pos);
    }

    fn begin_attribute(&mut self, pos: u32) {
        self.attribute = Some(Attribute {
            name: String::new(),
            value: String::new(),
            quoted: false,
            start: pos,
            end: pos,
        });
    }

    fn append_to_attribute_name(&mut self, ch: char) {
        if let Some(attr) = &mut self.attribute {
            attr.name.push(ch);
        }
    }

    fn begin_attribute_value(&mut self, quoted: bool, _pos: u32) {
        if let Some(attr) = &mut self.attribute {
            attr.quoted = quoted;
        }
    }

    fn append_to_attribute_value(&mut self, ch: char, _pos: u32) {
        if let Some(attr) = &mut self.attribute {
            attr.value.push(ch);
        }
    }

    fn finish_attribute_value(&mut self, pos: u32) {
        let Some(mut attr) = self.attribute.take() else {
            return;
        };
        attr.end = pos;
        if let Some(Token::StartTag { attributes, .. }) = &mut self.current {
            attributes.push(attr);
        }
    }

    fn report_syntax_error(&mut self, message: &str, pos: u32) {
        self.errors.push(TokenizerError {
            message: message.to_owned(),
            pos,
        });
    }
}

/// Incremental HTML tokenizer producing [`Token`]s.
pub struct Tokenizer {
    inner: EventedTokenizer<TokenCollector>,
}

impl Tokenizer {
    pub fn new(mode: TokenizerMode) -> Self {
        Tokenizer {
            inner: EventedTokenizer::new(TokenCollector::default(), mode),
        }
    }

    /// Tokenize a complete input from a fresh state.
    pub fn tokenize(&mut self, input: &str) -> TokenizeOutput {
        self.reset();
        let mut tokens = self.tokenize_part(input);
        tokens.extend(self.tokenize_eof());
        TokenizeOutput {
            tokens,
            errors: self.take_errors(),
        }
    }

    /// Feed one chunk; returns the tokens it completed.
    pub fn tokenize_part(&mut self, input: &str) -> Vec<Token> {
        self.inner.tokenize_part(input);
        std::mem::take(&mut self.inner.delegate_mut().tokens)
    }

    /// Signal end of input; returns any token that was still open.
    pub fn tokenize_eof(&mut self) -> Vec<Token> {
        self.inner.tokenize_eof();
        std::mem::take(&mut self.inner.delegate_mut().tokens)
    }

    /// Syntax errors reported since the last call.
    pub fn take_errors(&mut self) -> Vec<TokenizerError> {
        std::mem::take(&mut self.inner.delegate_mut().errors)
    }

    pub fn reset(&mut self) {
        self.inner.reset();
    }
}
