use jsone_expr::tokenizer::{TOKEN_KINDS, TOKEN_PATTERNS, WHITESPACE};
use jsone_expr::{create_tokenizer, parse_expression, ExprError, Node, ParseOptions, Parser, Tokenizer};
use serde_json::json;

#[test]
fn default_vocabulary_tokenizes_every_kind() {
    let source = "** + - * / [ ] . ( ) { } : , >= <= < > == != ! && || true false in null 1.5 name 'str'";
    let tokens = create_tokenizer().tokenize(source).unwrap();
    let kinds: Vec<&str> = tokens.iter().map(|t| t.kind.as_str()).collect();
    assert_eq!(kinds, TOKEN_KINDS.to_vec());
}

#[test]
fn tokens_are_produced_in_offset_order() {
    let tokens = create_tokenizer()
        .tokenize("a[1:2] + {b: \"c\"}.b")
        .unwrap();
    for pair in tokens.windows(2) {
        assert!(pair[0].start <= pair[0].end);
        assert!(pair[0].end <= pair[1].start);
    }
}

#[test]
fn string_tokens_do_not_support_escapes() {
    let tokens = create_tokenizer().tokenize(r#""a\"b""#);
    assert!(matches!(tokens, Err(ExprError::UnexpectedInput { .. })));

    let tokens = create_tokenizer().tokenize(r#"'say "hi"'"#).unwrap();
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].value, "'say \"hi\"'");
}

#[test]
fn kinds_follow_configured_order() {
    let tokenizer = Tokenizer::new(WHITESPACE, TOKEN_KINDS, TOKEN_PATTERNS).unwrap();
    assert_eq!(tokenizer.kinds().len(), TOKEN_KINDS.len());
    assert_eq!(tokenizer.kinds()[0], "**");

    // `*` listed first shadows `**`
    let tokenizer = Tokenizer::new(r"\s+", &["*", "**", "number"], &[("number", "[0-9]+")]).unwrap();
    let kinds: Vec<String> = tokenizer
        .tokenize("2**3")
        .unwrap()
        .into_iter()
        .map(|t| t.kind)
        .collect();
    assert_eq!(kinds, vec!["number", "*", "*", "number"]);
}

#[test]
fn parser_runs_on_a_custom_vocabulary() {
    let tokenizer = Tokenizer::new(
        r"[ \t]+",
        &["+", "*", "(", ")", "number", "identifier"],
        &[("number", "[0-9]+"), ("identifier", "[a-z]+")],
    )
    .unwrap();

    let mut parser = Parser::new("2 * (x + 1)", &tokenizer);
    let root = parser.parse().unwrap().unwrap();
    assert_eq!(root.to_string(), "(2 * (x + 1))");
    assert!(parser.at_end());

    let mut parser = Parser::with_options("2 - 1", &tokenizer, ParseOptions::strict());
    let err = parser.parse().unwrap_err();
    assert!(err.to_string().contains("unexpected input at 2"));
}

#[test]
fn invalid_pattern_is_a_regex_error() {
    let err = Tokenizer::new(r"\s+", &["number"], &[("number", "[0-9")]).unwrap_err();
    assert!(matches!(err, ExprError::Regex(_)));

    let err = Tokenizer::new(r"\s+", &[], &[]).unwrap_err();
    assert!(err.to_string().contains("token vocabulary must not be empty"));
}

#[test]
fn tree_serializes_to_tagged_json() {
    let root = parse_expression("x[1:] + f(2)").unwrap();
    let value: serde_json::Value = serde_json::from_str(&root.to_json_string(false).unwrap()).unwrap();

    assert_eq!(value["type"], json!("bin_op"));
    assert_eq!(value["token"], json!({"kind": "+", "value": "+", "start": 6, "end": 7}));
    assert_eq!(value["left"]["type"], json!("array_access"));
    assert_eq!(value["left"]["is_interval"], json!(true));
    assert_eq!(value["left"]["right"], json!(null));
    assert_eq!(value["right"]["type"], json!("builtin"));
    assert_eq!(value["right"]["is_call"], json!(true));
    assert_eq!(value["right"]["args"][0]["token"]["value"], json!("2"));
}

#[test]
fn tree_deserializes_back() {
    let root = parse_expression("{a: [1, 'two'], b: !c}.a").unwrap();
    let text = root.to_json_string(true).unwrap();
    let back: Node = serde_json::from_str(&text).unwrap();
    assert_eq!(back, root);
    assert_eq!(back.kind_name(), "bin_op");
}
