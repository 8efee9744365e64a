//! Event sink for the state machine.

/// Receives tokenizer events.
///
/// `pos` arguments are byte offsets in the caller's source (see
/// [`EventedTokenizer::set_source_offset`](crate::EventedTokenizer::set_source_offset)).
/// `begin_start_tag`, `begin_end_tag` and `begin_comment` receive the offset
/// of the opening `<`. For `finish_*` events `pos` is just past the token's
/// last byte.
pub trait TokenizerDelegate {
    /// Called from [`EventedTokenizer::reset`](crate::EventedTokenizer::reset).
    fn reset(&mut self) {}

    /// A `<` was seen; `pos` is its offset. Followed by a tag or comment.
    fn tag_open(&mut self, pos: u32);

    fn begin_data(&mut self, pos: u32);
    fn append_to_data(&mut self, ch: char);
    fn finish_data(&mut self, pos: u32);

    fn begin_comment(&mut self, pos: u32);
    fn append_to_comment_data(&mut self, ch: char);
    fn finish_comment(&mut self, pos: u32);

    fn begin_start_tag(&mut self, pos: u32);
    fn begin_end_tag(&mut self, pos: u32);
    fn append_to_tag_name(&mut self, ch: char);
    fn mark_tag_as_self_closing(&mut self);
    fn finish_tag(&mut self, pos: u32);

    fn begin_attribute(&mut self, pos: u32);
    fn append_to_attribute_name(&mut self, ch: char);
    fn begin_attribute_value(&mut self, quoted: bool, pos: u32);
    /// `pos` is the offset of `ch` itself.
    fn append_to_attribute_value(&mut self, ch: char, pos: u32);
    fn finish_attribute_value(&mut self, pos: u32);

    /// Recoverable syntax error; tokenization continues.
    fn report_syntax_error(&mut self, message: &str, pos: u32);
}
