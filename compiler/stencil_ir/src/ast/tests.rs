use super::*;

fn path(head: PathHead, tail: &[&str]) -> PathExpression {
    PathExpression {
        head,
        tail: tail.iter().map(ToString::to_string).collect(),
        original: String::new(),
        span: Span::DUMMY,
    }
}

#[test]
fn test_simple_name_only_for_bare_vars() {
    assert_eq!(
        path(PathHead::Var("foo".into()), &[]).simple_name(),
        Some("foo")
    );
    assert_eq!(path(PathHead::Var("foo".into()), &["bar"]).simple_name(), None);
    assert_eq!(path(PathHead::This, &[]).simple_name(), None);
    assert_eq!(path(PathHead::At("foo".into()), &[]).simple_name(), None);
}

#[test]
fn test_head_name() {
    assert_eq!(path(PathHead::This, &["x"]).head_name(), "this");
    assert_eq!(path(PathHead::At("arg".into()), &[]).head_name(), "arg");
}

#[test]
fn test_hash_lookup() {
    let hash = Hash {
        pairs: vec![HashPair {
            key: "key".into(),
            value: Expression::Literal(Literal {
                value: LiteralValue::String("id".into()),
                span: Span::DUMMY,
            }),
            span: Span::DUMMY,
        }],
        span: Span::DUMMY,
    };
    assert!(hash.get("key").is_some());
    assert!(hash.get("missing").is_none());
}

#[test]
fn test_statement_span_and_kind() {
    let stmt = Statement::Text(TextNode::new("hi", Span::new(3, 5)));
    assert_eq!(stmt.span(), Span::new(3, 5));
    assert_eq!(stmt.kind_name(), "TextNode");
}

#[test]
fn test_literal_display() {
    assert_eq!(LiteralValue::String("a".into()).to_string(), "\"a\"");
    assert_eq!(LiteralValue::Number(1.5).to_string(), "1.5");
    assert_eq!(LiteralValue::Undefined.to_string(), "undefined");
}
