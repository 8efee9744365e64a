use super::*;
use pretty_assertions::assert_eq;

/// Records events as compact strings.
#[derive(Default)]
struct Recorder {
    events: Vec<String>,
    text: String,
}

impl Recorder {
    fn flush_text(&mut self) {
        if !self.text.is_empty() {
            let text = std::mem::take(&mut self.text);
            self.events.push(format!("text {text:?}"));
        }
    }

    fn push(&mut self, event: String) {
        self.flush_text();
        self.events.push(event);
    }
}

impl TokenizerDelegate for Recorder {
    fn tag_open(&mut self, _pos: u32) {}

    fn begin_data(&mut self, pos: u32) {
        self.push(format!("begin_data {pos}"));
    }

    fn append_to_data(&mut self, ch: char) {
        self.text.push(ch);
    }

    fn finish_data(&mut self, pos: u32) {
        self.push(format!("finish_data {pos}"));
    }

    fn begin_comment(&mut self, pos: u32) {
        self.push(format!("begin_comment {pos}"));
    }

    fn append_to_comment_data(&mut self, ch: char) {
        self.text.push(ch);
    }

    fn finish_comment(&mut self, pos: u32) {
        self.push(format!("finish_comment {pos}"));
    }

    fn begin_start_tag(&mut self, pos: u32) {
        self.push(format!("start_tag {pos}"));
    }

    fn begin_end_tag(&mut self, pos: u32) {
        self.push(format!("end_tag {pos}"));
    }

    fn append_to_tag_name(&mut self, ch: char) {
        self.text.push(ch);
    }

    fn mark_tag_as_self_closing(&mut self) {
        self.push("self_closing".to_owned());
    }

    fn finish_tag(&mut self, pos: u32) {
        self.push(format!("finish_tag {pos}"));
    }

    fn begin_attribute(&mut self, pos: u32) {
        self.push(format!("attr {pos}"));
    }

    fn append_to_attribute_name(&mut self, ch: char) {
        self.text.push(ch);
    }

    fn begin_attribute_value(&mut self, quoted: bool, _pos: u32) {
        self.push(format!("value quoted={quoted}"));
    }

    fn append_to_attribute_value(&mut self, ch: char, _pos: u32) {
        self.text.push(ch);
    }

    fn finish_attribute_value(&mut self, pos: u32) {
        self.push(format!("finish_value {pos}"));
    }

    fn report_syntax_error(&mut self, message: &str, pos: u32) {
        self.push(format!("error {pos}: {message}"));
    }
}

fn run(input: &str) -> Vec<String> {
    run_mode(input, TokenizerMode::Precompile)
}

fn run_mode(input: &str, mode: TokenizerMode) -> Vec<String> {
    let mut tokenizer = EventedTokenizer::new(Recorder::default(), mode);
    tokenizer.tokenize_part(input);
    tokenizer.tokenize_eof();
    let mut recorder = tokenizer.into_delegate();
    recorder.flush_text();
    recorder.events
}

fn strs(events: &[&str]) -> Vec<String> {
    events.iter().map(|e| (*e).to_owned()).collect()
}

#[test]
fn test_text_only() {
    assert_eq!(
        run("hello"),
        strs(&["begin_data 0", "text \"hello\"", "finish_data 5"])
    );
}

#[test]
fn test_element_with_text() {
    assert_eq!(
        run("<div>hi</div>"),
        strs(&[
            "start_tag 0",
            "text \"div\"",
            "finish_tag 5",
            "begin_data 5",
            "text \"hi\"",
            "finish_data 7",
            "end_tag 7",
            "text \"div\"",
            "finish_tag 13",
        ])
    );
}

#[test]
fn test_attributes() {
    assert_eq!(
        run(r#"<a href="x" id=y checked>"#),
        strs(&[
            "start_tag 0",
            "text \"a\"",
            "attr 3",
            "text \"href\"",
            "value quoted=true",
            "text \"x\"",
            "finish_value 11",
            "attr 12",
            "text \"id\"",
            "value quoted=false",
            "text \"y\"",
            "finish_value 16",
            "attr 17",
            "text \"checked\"",
            "value quoted=false",
            "finish_value 24",
            "finish_tag 25",
        ])
    );
}

#[test]
fn test_self_closing() {
    assert_eq!(
        run("<br/>"),
        strs(&[
            "start_tag 0",
            "text \"br\"",
            "self_closing",
            "finish_tag 5"
        ])
    );
}

#[test]
fn test_comment() {
    assert_eq!(
        run("<!-- a-b -->"),
        strs(&["begin_comment 0", "text \" a-b \"", "finish_comment 12"])
    );
}

#[test]
fn test_empty_comment() {
    assert_eq!(
        run("<!---->"),
        strs(&["begin_comment 0", "finish_comment 7"])
    );
}

#[test]
fn test_crlf_folds_but_offsets_advance() {
    assert_eq!(
        run("a\r\nb"),
        strs(&["begin_data 0", "text \"a\\nb\"", "finish_data 4"])
    );
    assert_eq!(
        run("a\rb"),
        strs(&["begin_data 0", "text \"a\\nb\"", "finish_data 3"])
    );
}

#[test]
fn test_entities_decoded_in_precompile() {
    assert_eq!(
        run("a &amp; b &bogus; c"),
        strs(&["begin_data 0", "text \"a & b &bogus; c\"", "finish_data 19"])
    );
}

#[test]
fn test_entities_kept_in_codemod() {
    assert_eq!(
        run_mode("&amp;", TokenizerMode::Codemod),
        strs(&["begin_data 0", "text \"&amp;\"", "finish_data 5"])
    );
}

#[test]
fn test_entity_in_attribute_value() {
    let events = run(r#"<a title="&lt;x&gt;">"#);
    assert!(events.contains(&"text \"<x>\"".to_owned()), "{events:?}");
}

#[test]
fn test_script_is_raw_text() {
    let events = run("<script>if (a < b && c) {}</script>");
    assert!(
        events.contains(&"text \"if (a < b && c) {}\"".to_owned()),
        "{events:?}"
    );
    assert_eq!(events.last().map(String::as_str), Some("finish_tag 35"));
}

#[test]
fn test_pre_drops_leading_newline() {
    let events = run("<pre>\nx</pre>");
    assert!(events.contains(&"text \"x\"".to_owned()), "{events:?}");

    let events = run_mode("<pre>\nx</pre>", TokenizerMode::Codemod);
    assert!(events.contains(&"text \"\\nx\"".to_owned()), "{events:?}");
}

#[test]
fn test_attribute_name_starting_with_equals() {
    let events = run("<a =b>");
    assert!(
        events.contains(&"error 3: attribute name cannot start with equals sign".to_owned()),
        "{events:?}"
    );
}

#[test]
fn test_invalid_attribute_name_char() {
    let events = run("<a b\"c>");
    assert!(
        events.contains(&"error 4: \" is not a valid character within attribute names".to_owned()),
        "{events:?}"
    );
}

#[test]
fn test_chunked_input_matches_whole() {
    let whole = run("<div class=\"a\">hi</div>");
    let mut tokenizer = EventedTokenizer::new(Recorder::default(), TokenizerMode::Precompile);
    for chunk in ["<di", "v cla", "ss=\"a\">h", "i</div>"] {
        tokenizer.tokenize_part(chunk);
    }
    tokenizer.tokenize_eof();
    let mut recorder = tokenizer.into_delegate();
    recorder.flush_text();
    assert_eq!(recorder.events, whole);
}

#[test]
fn test_state_between_chunks() {
    let mut tokenizer = EventedTokenizer::new(Recorder::default(), TokenizerMode::Precompile);
    tokenizer.tokenize_part("<div ");
    assert_eq!(tokenizer.state(), TokenizerState::BeforeAttributeName);
    tokenizer.tokenize_part("class=");
    assert_eq!(tokenizer.state(), TokenizerState::BeforeAttributeValue);
    tokenizer.tokenize_part("\"a ");
    assert_eq!(tokenizer.state(), TokenizerState::AttributeValueDoubleQuoted);
    tokenizer.tokenize_part("\">text");
    assert_eq!(tokenizer.state(), TokenizerState::Data);
    tokenizer.flush_data();
    assert_eq!(tokenizer.state(), TokenizerState::BeforeData);
}

#[test]
fn test_source_offset_shifts_positions() {
    let mut tokenizer = EventedTokenizer::new(Recorder::default(), TokenizerMode::Precompile);
    tokenizer.set_source_offset(10);
    tokenizer.tokenize_part("ab");
    tokenizer.flush_data();
    tokenizer.set_source_offset(20);
    tokenizer.tokenize_part("cd");
    tokenizer.flush_data();
    let mut recorder = tokenizer.into_delegate();
    recorder.flush_text();
    assert_eq!(
        recorder.events,
        strs(&[
            "begin_data 10",
            "text \"ab\"",
            "finish_data 12",
            "begin_data 20",
            "text \"cd\"",
            "finish_data 22",
        ])
    );
}

#[test]
fn test_reset_clears_state() {
    let mut tokenizer = EventedTokenizer::new(Recorder::default(), TokenizerMode::Precompile);
    tokenizer.tokenize_part("<div class=");
    tokenizer.reset();
    assert_eq!(tokenizer.state(), TokenizerState::BeforeData);
    assert_eq!(tokenizer.pos(), 0);
}

#[test]
fn test_end_tag_trailing_space() {
    assert_eq!(
        run("</p >"),
        strs(&["end_tag 0", "text \"p\"", "finish_tag 5"])
    );
}
