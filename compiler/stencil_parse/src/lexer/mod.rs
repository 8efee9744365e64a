//! Mustache lexer.
//!
//! Splits a template into content runs and mustache tokens. HTML is not
//! looked at here; content runs go to the HTML tokenizer later.
//!
//! # Modes
//!
//! - **Content**: everything up to the next `{{`. A single backslash before
//!   `{{` escapes the mustache (the backslash is dropped and the mustache is
//!   read as text); a double backslash keeps one backslash and the mustache.
//! - **Escaped**: text after `\{{`, up to the next `{{`, `\{{` or `\\{{`.
//! - **Mustache**: expression tokens until `}}`/`}}}`.
//!
//! Tokens are matched first-rule-wins, so the order of checks in
//! [`Lexer::mustache`] is significant.

use memchr::memmem;
use stencil_ir::ast::StripFlags;
use stencil_ir::Span;

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// Token kinds. `bool` payloads on open/close tokens are the `~` strip
/// marker on that side.
#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    Content(String),
    Comment { value: String, strip: StripFlags },
    /// `{{` or `{{&`.
    Open { strip: bool, ampersand: bool },
    /// `{{{`
    OpenUnescaped(bool),
    /// `{{#`
    OpenBlock(bool),
    /// `{{/`
    OpenEndBlock(bool),
    /// `{{^`
    OpenInverse(bool),
    /// `{{else` followed by more tokens.
    OpenInverseChain(bool),
    /// `{{else}}` or `{{^}}`.
    Inverse(StripFlags),
    /// `{{>`
    OpenPartial(bool),
    /// `{{#>`
    OpenPartialBlock,
    /// `{{*`
    OpenDecorator,
    /// `{{#*`
    OpenDecoratorBlock,
    /// `{{{{`
    OpenRawBlock,
    /// `}}`
    Close(bool),
    /// `}}}`
    CloseUnescaped(bool),
    OpenSexpr,
    CloseSexpr,
    Equals,
    /// `@`
    Data,
    /// `.` or `/` between path segments.
    Sep(char),
    /// Identifier. `[...]` literal segments keep their brackets.
    Id(String),
    String(String),
    Number(f64),
    Boolean(bool),
    Undefined,
    Null,
    /// `as |`
    OpenBlockParams,
    /// `|`
    CloseBlockParams,
    Invalid(char),
    Eof,
}

impl TokenKind {
    /// Grammar name, used in "Expecting ..." messages.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::Content(_) => "CONTENT",
            TokenKind::Comment { .. } => "COMMENT",
            TokenKind::Open { .. } => "OPEN",
            TokenKind::OpenUnescaped(_) => "OPEN_UNESCAPED",
            TokenKind::OpenBlock(_) => "OPEN_BLOCK",
            TokenKind::OpenEndBlock(_) => "OPEN_ENDBLOCK",
            TokenKind::OpenInverse(_) => "OPEN_INVERSE",
            TokenKind::OpenInverseChain(_) => "OPEN_INVERSE_CHAIN",
            TokenKind::Inverse(_) => "INVERSE",
            TokenKind::OpenPartial(_) => "OPEN_PARTIAL",
            TokenKind::OpenPartialBlock => "OPEN_PARTIAL_BLOCK",
            TokenKind::OpenDecorator => "OPEN_DECORATOR",
            TokenKind::OpenDecoratorBlock => "OPEN_DECORATOR_BLOCK",
            TokenKind::OpenRawBlock => "OPEN_RAW_BLOCK",
            TokenKind::Close(_) => "CLOSE",
            TokenKind::CloseUnescaped(_) => "CLOSE_UNESCAPED",
            TokenKind::OpenSexpr => "OPEN_SEXPR",
            TokenKind::CloseSexpr => "CLOSE_SEXPR",
            TokenKind::Equals => "EQUALS",
            TokenKind::Data => "DATA",
            TokenKind::Sep(_) => "SEP",
            TokenKind::Id(_) => "ID",
            TokenKind::String(_) => "STRING",
            TokenKind::Number(_) => "NUMBER",
            TokenKind::Boolean(_) => "BOOLEAN",
            TokenKind::Undefined => "UNDEFINED",
            TokenKind::Null => "NULL",
            TokenKind::OpenBlockParams => "OPEN_BLOCK_PARAMS",
            TokenKind::CloseBlockParams => "CLOSE_BLOCK_PARAMS",
            TokenKind::Invalid(_) => "INVALID",
            TokenKind::Eof => "EOF",
        }
    }
}

/// Lex a whole template. The result always ends with [`TokenKind::Eof`].
pub fn lex(source: &str) -> Vec<Token> {
    let mut lexer = Lexer {
        src: source,
        pos: 0,
        mode: Mode::Content,
        tokens: Vec::new(),
    };
    lexer.run();
    tracing::trace!(tokens = lexer.tokens.len(), "lexed mustache tokens");
    lexer.tokens
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Mode {
    Content,
    Escaped,
    Mustache,
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    mode: Mode,
    tokens: Vec<Token>,
}

impl Lexer<'_> {
    fn run(&mut self) {
        loop {
            let more = match self.mode {
                Mode::Content => self.content(),
                Mode::Escaped => {
                    self.escaped();
                    true
                }
                Mode::Mustache => self.mustache(),
            };
            if !more {
                break;
            }
        }
        self.push(TokenKind::Eof, self.src.len(), self.src.len());
    }

    fn push(&mut self, kind: TokenKind, start: usize, end: usize) {
        self.tokens.push(Token {
            kind,
            span: Span::from_offsets(start, end),
        });
    }

    /// Emit a `len`-byte token at the cursor.
    fn emit(&mut self, kind: TokenKind, len: usize) -> bool {
        let start = self.pos;
        self.pos += len;
        self.push(kind, start, self.pos);
        true
    }

    // ─── Content ───

    fn content(&mut self) -> bool {
        let start = self.pos;
        let rest = &self.src[start..];
        let Some(at) = memmem::find(rest.as_bytes(), b"{{") else {
            if !rest.is_empty() {
                self.push(TokenKind::Content(rest.to_owned()), start, self.src.len());
            }
            self.pos = self.src.len();
            return false;
        };

        let text = &rest[..at];
        let (value, mode) = if text.ends_with("\\\\") {
            (&text[..at - 1], Mode::Mustache)
        } else if text.ends_with('\\') {
            (&text[..at - 1], Mode::Escaped)
        } else {
            (text, Mode::Mustache)
        };
        if !value.is_empty() {
            self.push(TokenKind::Content(value.to_owned()), start, start + at);
        }
        self.pos = start + at;
        self.mode = mode;
        true
    }

    /// Text after `\{{`. At least the `{{` itself is consumed.
    fn escaped(&mut self) {
        let start = self.pos;
        let bytes = self.src.as_bytes();
        let from = (start + 2).min(bytes.len());
        let end = match memmem::find(&bytes[from..], b"{{") {
            Some(at) => {
                let mut end = from + at;
                for _ in 0..2 {
                    if end > from && bytes[end - 1] == b'\\' {
                        end -= 1;
                    }
                }
                end
            }
            None => bytes.len(),
        };
        self.push(
            TokenKind::Content(self.src[start..end].to_owned()),
            start,
            end,
        );
        self.pos = end;
        self.mode = Mode::Content;
    }

    // ─── Mustache ───

    fn mustache(&mut self) -> bool {
        let rest = &self.src[self.pos..];
        let trimmed = rest.trim_start();
        self.pos += rest.len() - trimmed.len();
        let rest = trimmed;
        let Some(ch) = rest.chars().next() else {
            return false;
        };

        if rest.starts_with("{{") {
            return self.open(rest);
        }

        match ch {
            '(' => return self.emit(TokenKind::OpenSexpr, 1),
            ')' => return self.emit(TokenKind::CloseSexpr, 1),
            '=' => return self.emit(TokenKind::Equals, 1),
            _ => {}
        }

        if rest.starts_with("..") {
            return self.emit(TokenKind::Id("..".to_owned()), 2);
        }
        if ch == '.' && rest[1..].chars().next().is_some_and(is_lookahead) {
            return self.emit(TokenKind::Id(".".to_owned()), 1);
        }
        if ch == '.' || ch == '/' {
            return self.emit(TokenKind::Sep(ch), 1);
        }

        if let Some(after) = rest.strip_prefix('}') {
            let strip = after.starts_with('~');
            let after = if strip { &after[1..] } else { after };
            if after.starts_with("}}") {
                self.mode = Mode::Content;
                let len = if strip { 4 } else { 3 };
                return self.emit(TokenKind::CloseUnescaped(strip), len);
            }
        }
        if rest.starts_with("~}}") {
            self.mode = Mode::Content;
            return self.emit(TokenKind::Close(true), 3);
        }
        if rest.starts_with("}}") {
            self.mode = Mode::Content;
            return self.emit(TokenKind::Close(false), 2);
        }

        if ch == '"' || ch == '\'' {
            return self.string(rest, ch);
        }
        if ch == '@' {
            return self.emit(TokenKind::Data, 1);
        }

        for (word, kind) in [
            ("true", TokenKind::Boolean(true)),
            ("false", TokenKind::Boolean(false)),
            ("undefined", TokenKind::Undefined),
            ("null", TokenKind::Null),
        ] {
            let after = rest.strip_prefix(word);
            if after.is_some_and(|after| after.chars().next().is_some_and(is_literal_lookahead)) {
                return self.emit(kind, word.len());
            }
        }
        if let Some(len) = number_len(rest) {
            if let Ok(value) = rest[..len].parse::<f64>() {
                return self.emit(TokenKind::Number(value), len);
            }
        }

        if let Some(after_as) = rest.strip_prefix("as") {
            let params = after_as.trim_start();
            if params.len() < after_as.len() && params.starts_with('|') {
                let len = rest.len() - params.len() + 1;
                return self.emit(TokenKind::OpenBlockParams, len);
            }
        }
        if ch == '|' {
            return self.emit(TokenKind::CloseBlockParams, 1);
        }

        let id_len = rest.find(|c: char| !is_id_char(c)).unwrap_or(rest.len());
        if id_len > 0 && ends_id(&rest[id_len..]) {
            return self.emit(TokenKind::Id(rest[..id_len].to_owned()), id_len);
        }
        if ch == '[' {
            if let Some(len) = literal_segment_len(rest) {
                let segment = unescape_segment(&rest[..len]);
                return self.emit(TokenKind::Id(segment), len);
            }
        }

        self.emit(TokenKind::Invalid(ch), ch.len_utf8())
    }

    /// Tokens starting with `{{`.
    fn open(&mut self, rest: &str) -> bool {
        if rest.starts_with("{{{{") {
            return self.emit(TokenKind::OpenRawBlock, 4);
        }
        let strip = rest[2..].starts_with('~');
        let at = if strip { 3 } else { 2 };
        let tail = &rest[at..];

        if tail.starts_with('>') {
            return self.emit(TokenKind::OpenPartial(strip), at + 1);
        }
        if tail.starts_with("#>") {
            return self.emit(TokenKind::OpenPartialBlock, at + 2);
        }
        if tail.starts_with("#*") {
            return self.emit(TokenKind::OpenDecoratorBlock, at + 2);
        }
        if tail.starts_with('#') {
            return self.emit(TokenKind::OpenBlock(strip), at + 1);
        }
        if tail.starts_with('/') {
            return self.emit(TokenKind::OpenEndBlock(strip), at + 1);
        }
        if let Some(after) = tail.strip_prefix('^') {
            if let Some((len, close)) = inverse_close(after) {
                self.mode = Mode::Content;
                let flags = StripFlags { open: strip, close };
                return self.emit(TokenKind::Inverse(flags), at + 1 + len);
            }
        }
        let else_len = else_keyword(tail);
        if let Some(else_len) = else_len {
            if let Some((len, close)) = inverse_close(&tail[else_len..]) {
                self.mode = Mode::Content;
                let flags = StripFlags { open: strip, close };
                return self.emit(TokenKind::Inverse(flags), at + else_len + len);
            }
        }
        if tail.starts_with('^') {
            return self.emit(TokenKind::OpenInverse(strip), at + 1);
        }
        if let Some(else_len) = else_len {
            return self.emit(TokenKind::OpenInverseChain(strip), at + else_len);
        }
        if tail.starts_with('{') {
            return self.emit(TokenKind::OpenUnescaped(strip), at + 1);
        }
        if tail.starts_with('&') {
            let kind = TokenKind::Open {
                strip,
                ampersand: true,
            };
            return self.emit(kind, at + 1);
        }
        if tail.starts_with('!') {
            return self.comment(rest, tail.starts_with("!--"));
        }
        if tail.starts_with('*') {
            return self.emit(TokenKind::OpenDecorator, at + 1);
        }
        let kind = TokenKind::Open {
            strip,
            ampersand: false,
        };
        self.emit(kind, at)
    }

    /// `{{! ... }}` or `{{!-- ... --}}`, starting at `{{`.
    fn comment(&mut self, rest: &str, long: bool) -> bool {
        let end = if long {
            find_long_comment_end(rest)
        } else {
            memmem::find(rest.as_bytes(), b"}}").map(|at| at + 2)
        };
        let Some(len) = end else {
            return self.emit(TokenKind::Invalid('{'), 1);
        };
        let raw = &rest[..len];
        let strip = StripFlags {
            open: raw.as_bytes().get(2) == Some(&b'~'),
            close: len >= 3 && raw.as_bytes()[len - 3] == b'~',
        };
        let value = strip_comment(raw).to_owned();
        self.mode = Mode::Content;
        self.emit(TokenKind::Comment { value, strip }, len)
    }

    fn string(&mut self, rest: &str, quote: char) -> bool {
        let mut chars = rest.char_indices().skip(1);
        while let Some((i, c)) = chars.next() {
            if c == '\\' && rest[i + 1..].starts_with(quote) {
                chars.next();
            } else if c == quote {
                let escaped = format!("\\{quote}");
                let value = rest[1..i].replace(&escaped, &quote.to_string());
                return self.emit(TokenKind::String(value), i + 1);
            }
        }
        self.emit(TokenKind::Invalid(quote), 1)
    }
}

// ─── Character classes ───

/// Characters that may follow an identifier.
fn is_lookahead(c: char) -> bool {
    matches!(c, '=' | '~' | '}' | '/' | '.' | ')' | '|') || c.is_whitespace()
}

/// Whether an identifier may end right before `after`. End of input
/// counts, so an unclosed `{{foo` reports the missing `}}`.
fn ends_id(after: &str) -> bool {
    after.chars().next().is_none_or(is_lookahead)
}

/// Characters that may follow a literal keyword or number.
fn is_literal_lookahead(c: char) -> bool {
    matches!(c, '~' | '}' | ')') || c.is_whitespace()
}

pub(crate) fn is_id_char(c: char) -> bool {
    !c.is_whitespace() && !is_reserved_char(c)
}

/// Punctuation that can never appear in an identifier or block param.
pub(crate) fn is_reserved_char(c: char) -> bool {
    matches!(
        c,
        '!' | '"'
            | '#'
            | '%'
            | '&'
            | '\''
            | '('
            | ')'
            | '*'
            | '+'
            | ','
            | '.'
            | '/'
            | ';'
            | '<'
            | '='
            | '>'
            | '@'
            | '['
            | '\\'
            | ']'
            | '^'
            | '`'
            | '{'
            | '|'
            | '}'
            | '~'
    )
}

/// `-?[0-9]+(\.[0-9]+)?` followed by a literal boundary.
fn number_len(rest: &str) -> Option<usize> {
    let bytes = rest.as_bytes();
    let mut i = usize::from(bytes.first() == Some(&b'-'));
    let digits = |from: usize| bytes[from..].iter().take_while(|b| b.is_ascii_digit()).count();
    let int = digits(i);
    if int == 0 {
        return None;
    }
    i += int;
    if bytes.get(i) == Some(&b'.') {
        let frac = digits(i + 1);
        if frac > 0 {
            i += 1 + frac;
        }
    }
    rest[i..]
        .chars()
        .next()
        .is_some_and(is_literal_lookahead)
        .then_some(i)
}

/// `\s* ~? }}` after `{{^` or `{{else`. Returns the length and right strip.
fn inverse_close(rest: &str) -> Option<(usize, bool)> {
    let trimmed = rest.trim_start();
    let skipped = rest.len() - trimmed.len();
    if trimmed.starts_with("~}}") {
        Some((skipped + 3, true))
    } else if trimmed.starts_with("}}") {
        Some((skipped + 2, false))
    } else {
        None
    }
}

/// `\s* else` not followed by an identifier character. Returns the length.
fn else_keyword(tail: &str) -> Option<usize> {
    let trimmed = tail.trim_start();
    let after = trimmed.strip_prefix("else")?;
    if after.chars().next().is_some_and(is_id_char) {
        return None;
    }
    Some(tail.len() - after.len())
}

/// End of `{{!-- ... --}}`: the first `--` followed by `~?}}`.
fn find_long_comment_end(rest: &str) -> Option<usize> {
    let bytes = rest.as_bytes();
    let mut from = 0;
    while let Some(at) = memmem::find(&bytes[from..], b"--") {
        let dash = from + at;
        let after = &rest[dash + 2..];
        if after.starts_with("}}") {
            return Some(dash + 4);
        }
        if after.starts_with("~}}") {
            return Some(dash + 5);
        }
        from = dash + 1;
    }
    None
}

/// Drop the comment delimiters: `{{~!--` and `--~}}`.
fn strip_comment(raw: &str) -> &str {
    let mut inner = raw.strip_prefix("{{").unwrap_or(raw);
    inner = inner.strip_prefix('~').unwrap_or(inner);
    inner = inner.strip_prefix('!').unwrap_or(inner);
    for _ in 0..2 {
        inner = inner.strip_prefix('-').unwrap_or(inner);
    }
    inner = inner.strip_suffix("}}").unwrap_or(inner);
    inner = inner.strip_suffix('~').unwrap_or(inner);
    for _ in 0..2 {
        inner = inner.strip_suffix('-').unwrap_or(inner);
    }
    inner
}

/// `[ ... ]` with `\]` escapes.
fn literal_segment_len(rest: &str) -> Option<usize> {
    let mut chars = rest.char_indices().skip(1);
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' if rest[i + 1..].starts_with(']') => {
                chars.next();
            }
            ']' => return Some(i + 1),
            _ => {}
        }
    }
    None
}

/// Undo `\\` and `\]` escapes; brackets are kept.
fn unescape_segment(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next @ ('\\' | ']')) = chars.peek() {
                out.push(next);
                chars.next();
                continue;
            }
        }
        out.push(c);
    }
    out
}
