//! Tokenizer states.

use std::fmt;

/// State of the HTML state machine.
///
/// The tree builder reads this between content chunks to decide where a
/// mustache belongs (tag name, attribute, text, comment), so the set is
/// part of the public contract.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum TokenizerState {
    BeforeData,
    Data,
    TagOpen,
    MarkupDeclarationOpen,
    CommentStart,
    CommentStartDash,
    Comment,
    CommentEndDash,
    CommentEnd,
    TagName,
    EndTagName,
    BeforeAttributeName,
    AttributeName,
    AfterAttributeName,
    BeforeAttributeValue,
    AttributeValueDoubleQuoted,
    AttributeValueSingleQuoted,
    AttributeValueUnquoted,
    AfterAttributeValueQuoted,
    SelfClosingStartTag,
    EndTagOpen,
}

impl TokenizerState {
    /// Between tags, where text and blocks may appear.
    pub fn is_data(self) -> bool {
        matches!(self, TokenizerState::BeforeData | TokenizerState::Data)
    }

    /// Inside any attribute value.
    pub fn is_attribute_value(self) -> bool {
        matches!(
            self,
            TokenizerState::AttributeValueDoubleQuoted
                | TokenizerState::AttributeValueSingleQuoted
                | TokenizerState::AttributeValueUnquoted
        )
    }

    /// Name in the camelCase spelling used by error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            TokenizerState::BeforeData => "beforeData",
            TokenizerState::Data => "data",
            TokenizerState::TagOpen => "tagOpen",
            TokenizerState::MarkupDeclarationOpen => "markupDeclarationOpen",
            TokenizerState::CommentStart => "commentStart",
            TokenizerState::CommentStartDash => "commentStartDash",
            TokenizerState::Comment => "comment",
            TokenizerState::CommentEndDash => "commentEndDash",
            TokenizerState::CommentEnd => "commentEnd",
            TokenizerState::TagName => "tagName",
            TokenizerState::EndTagName => "endTagName",
            TokenizerState::BeforeAttributeName => "beforeAttributeName",
            TokenizerState::AttributeName => "attributeName",
            TokenizerState::AfterAttributeName => "afterAttributeName",
            TokenizerState::BeforeAttributeValue => "beforeAttributeValue",
            TokenizerState::AttributeValueDoubleQuoted => "attributeValueDoubleQuoted",
            TokenizerState::AttributeValueSingleQuoted => "attributeValueSingleQuoted",
            TokenizerState::AttributeValueUnquoted => "attributeValueUnquoted",
            TokenizerState::AfterAttributeValueQuoted => "afterAttributeValueQuoted",
            TokenizerState::SelfClosingStartTag => "selfClosingStartTag",
            TokenizerState::EndTagOpen => "endTagOpen",
        }
    }
}

impl fmt::Display for TokenizerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
