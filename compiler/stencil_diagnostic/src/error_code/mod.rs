//! Error codes for all compiler diagnostics.
//!
//! Each error code is a unique identifier (e.g., `E1001`) with the first digit
//! indicating the compiler phase.

use std::fmt;

/// Error codes for all compiler diagnostics.
///
/// Format: E#### where first digit indicates phase:
/// - E0xxx: HTML tokenizer errors (recoverable)
/// - E1xxx: Mustache expression parse errors
/// - E2xxx: Template structure errors
/// - E3xxx: Scope resolution errors
/// - E4xxx: Plugin errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Tokenizer Errors (E0xxx)
    /// Attribute name starts with `=`
    E0001,
    /// Invalid character in attribute name
    E0002,

    // Parse Errors (E1xxx)
    /// Unexpected token
    E1001,
    /// Unexpected end of template inside a mustache
    E1002,
    /// Invalid path expression
    E1003,
    /// Block close does not match block open
    E1004,
    /// Handlebars syntax not supported in templates
    E1005,

    // Structure Errors (E2xxx)
    /// Mustache inside an element's tag name
    E2001,
    /// Mustache or block in a position that cannot hold it
    E2002,
    /// End tag for a void element
    E2003,
    /// Closing tag without an open tag
    E2004,
    /// Closing tag does not match the open tag
    E2005,
    /// Element left open
    E2006,
    /// Malformed block params
    E2007,
    /// Invalid element modifier
    E2008,
    /// Invalid attribute value
    E2009,
    /// Named block used illegally
    E2010,
    /// Keyword called with the wrong arguments
    E2011,
    /// Invalid element attribute or parameter
    E2012,
    /// Handlebars partial
    E2013,

    // Resolution Errors (E3xxx)
    /// Strict-mode reference not in scope
    E3001,
    /// Invocation of a path whose head is not in scope
    E3002,
    /// Dotted tag name whose head is not in scope
    E3003,
    /// Loose-mode-only feature used in strict mode
    E3004,

    // Plugin Errors (E4xxx)
    /// AST plugin hook failed
    E4001,
    /// AST plugin produced an invalid replacement
    E4002,
}

impl ErrorCode {
    /// All error codes, in declaration order.
    pub const ALL: &[ErrorCode] = &[
        ErrorCode::E0001,
        ErrorCode::E0002,
        ErrorCode::E1001,
        ErrorCode::E1002,
        ErrorCode::E1003,
        ErrorCode::E1004,
        ErrorCode::E1005,
        ErrorCode::E2001,
        ErrorCode::E2002,
        ErrorCode::E2003,
        ErrorCode::E2004,
        ErrorCode::E2005,
        ErrorCode::E2006,
        ErrorCode::E2007,
        ErrorCode::E2008,
        ErrorCode::E2009,
        ErrorCode::E2010,
        ErrorCode::E2011,
        ErrorCode::E2012,
        ErrorCode::E2013,
        ErrorCode::E3001,
        ErrorCode::E3002,
        ErrorCode::E3003,
        ErrorCode::E3004,
        ErrorCode::E4001,
        ErrorCode::E4002,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E0001 => "E0001",
            ErrorCode::E0002 => "E0002",
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E1005 => "E1005",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2005 => "E2005",
            ErrorCode::E2006 => "E2006",
            ErrorCode::E2007 => "E2007",
            ErrorCode::E2008 => "E2008",
            ErrorCode::E2009 => "E2009",
            ErrorCode::E2010 => "E2010",
            ErrorCode::E2011 => "E2011",
            ErrorCode::E2012 => "E2012",
            ErrorCode::E2013 => "E2013",
            ErrorCode::E3001 => "E3001",
            ErrorCode::E3002 => "E3002",
            ErrorCode::E3003 => "E3003",
            ErrorCode::E3004 => "E3004",
            ErrorCode::E4001 => "E4001",
            ErrorCode::E4002 => "E4002",
        }
    }

    /// Tokenizer errors never abort a compile.
    pub fn is_tokenizer_error(&self) -> bool {
        matches!(self, ErrorCode::E0001 | ErrorCode::E0002)
    }

    pub fn is_parse_error(&self) -> bool {
        self.as_str().starts_with("E1")
    }

    pub fn is_structure_error(&self) -> bool {
        self.as_str().starts_with("E2")
    }

    pub fn is_resolution_error(&self) -> bool {
        self.as_str().starts_with("E3")
    }

    pub fn is_plugin_error(&self) -> bool {
        self.as_str().starts_with("E4")
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parse an error code string like `"E2001"`. Case-insensitive.
impl std::str::FromStr for ErrorCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_uppercase();
        Self::ALL
            .iter()
            .find(|code| code.as_str() == upper)
            .copied()
            .ok_or(())
    }
}
