//! Tests for the mode-aware lexer

use lalrgen::error::LexerErrorKind;
use lalrgen::lexer::{ConflictMode, Lexer, LexerBuilder, Pattern, Token, TokenRule, TokenValue};

fn names(tokens: &[Token]) -> Vec<&str> {
    tokens.iter().map(|t| t.name.as_str()).collect()
}

fn texts(tokens: &[Token]) -> Vec<&str> {
    tokens.iter().map(|t| t.text.as_str()).collect()
}

fn keyword_lexer(mode: ConflictMode) -> Lexer {
    LexerBuilder::new()
        .token("IF", Pattern::literal("if"))
        .token("ID", Pattern::regex("[a-z]+"))
        .rule(TokenRule::new("WS", Pattern::regex(r"\s+")).skip())
        .conflict_mode(mode)
        .build()
        .expect("Failed to build lexer")
}

fn comment_lexer() -> Lexer {
    LexerBuilder::new()
        .rule(
            TokenRule::new("COMMENT_START", Pattern::literal("/*"))
                .skip()
                .push_mode("COMMENT"),
        )
        .rule(
            TokenRule::new("COMMENT_END", Pattern::literal("*/"))
                .skip()
                .in_mode("COMMENT")
                .pop_mode(),
        )
        .rule(
            TokenRule::new("COMMENT_TEXT", Pattern::regex(r"(?:[^*]|\*+[^*/])+"))
                .skip()
                .in_mode("COMMENT"),
        )
        .token("ID", Pattern::regex("[a-z]+"))
        .token("+", Pattern::literal("+"))
        .token("NUMBER", Pattern::regex("[0-9]+"))
        .build()
        .expect("Failed to build lexer")
}

#[test]
fn test_longest_match_prefers_identifier() {
    let lexer = keyword_lexer(ConflictMode::Longest);
    let tokens = lexer.tokenize("iffy if").expect("Failed to tokenize");

    assert_eq!(names(&tokens), vec!["ID", "IF", "EOF"]);
    assert_eq!(texts(&tokens), vec!["iffy", "if", ""]);
}

#[test]
fn test_first_match_prefers_keyword() {
    let lexer = keyword_lexer(ConflictMode::First);
    let tokens = lexer.tokenize("iffy if").expect("Failed to tokenize");

    assert_eq!(names(&tokens), vec!["IF", "ID", "IF", "EOF"]);
    assert_eq!(texts(&tokens), vec!["if", "fy", "if", ""]);
}

#[test]
fn test_conflict_mode_can_change_after_build() {
    let mut lexer = keyword_lexer(ConflictMode::Longest);
    lexer.set_conflict_mode(ConflictMode::First);

    assert_eq!(lexer.conflict_mode(), ConflictMode::First);
    let tokens = lexer.tokenize("iffy").expect("Failed to tokenize");
    assert_eq!(names(&tokens), vec!["IF", "ID", "EOF"]);
}

#[test]
fn test_comment_mode_is_skipped() {
    let lexer = comment_lexer();
    let tokens = lexer.tokenize("/* x+1 */y").expect("Failed to tokenize");

    assert_eq!(names(&tokens), vec!["ID", "EOF"]);
    assert_eq!(tokens[0].text, "y");
    assert_eq!(tokens[0].range.start().to_usize(), 9);
    assert_eq!(tokens[1].position().to_usize(), 10);
}

#[test]
fn test_comment_with_inner_star() {
    let lexer = comment_lexer();
    let tokens = lexer.tokenize("a/* 2*3 */+1").expect("Failed to tokenize");

    assert_eq!(names(&tokens), vec!["ID", "+", "NUMBER", "EOF"]);
}

#[test]
fn test_error_inside_mode_names_the_mode() {
    let lexer = comment_lexer();
    let err = lexer
        .tokenize("/* unterminated *")
        .expect_err("tokenize should fail");

    assert_eq!(err.span.start().to_usize(), 16);
    let LexerErrorKind::NoMatch { preview, mode } = err.kind();
    assert_eq!(preview, "*");
    assert_eq!(mode.as_deref(), Some("COMMENT"));
    assert!(err.to_string().ends_with("in mode `COMMENT'"));
}

#[test]
fn test_error_in_default_mode_has_no_mode() {
    let lexer = keyword_lexer(ConflictMode::Longest);
    let err = lexer.tokenize("if\n  $x").expect_err("tokenize should fail");

    assert_eq!(err.line_col.to_string(), "2:3");
    let LexerErrorKind::NoMatch { preview, mode } = err.kind();
    assert_eq!(preview, "$x");
    assert!(mode.is_none());
}

#[test]
fn test_string_literal_with_more() {
    let lexer = LexerBuilder::new()
        .rule(TokenRule::new("QUOTE", Pattern::literal("'")).more().push_mode("STR"))
        .rule(TokenRule::new("BODY", Pattern::regex("[^']+")).more().in_mode("STR"))
        .rule(
            TokenRule::new("STRING", Pattern::literal("'"))
                .in_mode("STR")
                .pop_mode()
                .transform(|text| TokenValue::String(text.trim_matches('\'').into())),
        )
        .rule(TokenRule::new("WS", Pattern::literal(" ")).skip())
        .token("ID", Pattern::regex("[a-z]+"))
        .build()
        .expect("Failed to build lexer");
    let tokens = lexer.tokenize("say 'hi there'").expect("Failed to tokenize");

    assert_eq!(names(&tokens), vec!["ID", "STRING", "EOF"]);
    assert_eq!(tokens[1].text, "'hi there'");
    assert_eq!(tokens[1].value.as_str(), Some("hi there"));
    assert_eq!(tokens[1].range.start().to_usize(), 4);
    assert_eq!(tokens[1].range.end().to_usize(), 14);
}

#[test]
fn test_case_insensitive_keyword() {
    let lexer = LexerBuilder::new()
        .rule(TokenRule::new("SELECT", Pattern::literal("select")).insensitive())
        .token("ID", Pattern::regex("[A-Za-z]+"))
        .rule(TokenRule::new("WS", Pattern::literal(" ")).skip())
        .build()
        .expect("Failed to build lexer");
    let tokens = lexer.tokenize("SeLeCt name").expect("Failed to tokenize");

    assert_eq!(names(&tokens), vec!["SELECT", "ID", "EOF"]);
    assert_eq!(tokens[0].text, "SeLeCt");
}

#[test]
fn test_alternative_patterns() {
    let lexer = LexerBuilder::new()
        .rule(TokenRule::new("BOOL", Pattern::literal("true")).or(Pattern::literal("false")))
        .rule(TokenRule::new("WS", Pattern::literal(" ")).skip())
        .build()
        .expect("Failed to build lexer");
    let tokens = lexer.tokenize("true false").expect("Failed to tokenize");

    assert_eq!(names(&tokens), vec!["BOOL", "BOOL", "EOF"]);
}

#[test]
fn test_stream_is_lazy() {
    let lexer = keyword_lexer(ConflictMode::Longest);
    let mut stream = lexer.tokens("a b ?");

    assert_eq!(stream.next().expect("token").expect("ok").text, "a");
    assert_eq!(stream.position().to_usize(), 1);
    assert_eq!(stream.next().expect("token").expect("ok").text, "b");
    assert!(stream.next().expect("error").is_err());
    assert!(stream.next().is_none());
}

#[test]
fn test_trace_shows_modes() {
    let lexer = comment_lexer();
    let (tokens, trace) = lexer
        .tokenize_with_trace("/*c*/x")
        .expect("Failed to tokenize");

    assert_eq!(names(&tokens), vec!["ID", "EOF"]);
    let steps: Vec<(&str, &str)> = trace
        .iter()
        .map(|e| (e.rule.as_str(), e.mode.as_str()))
        .collect();
    assert_eq!(
        steps,
        vec![
            ("COMMENT_START", "default"),
            ("COMMENT_TEXT", "COMMENT"),
            ("COMMENT_END", "COMMENT"),
            ("ID", "default"),
        ]
    );
}

#[test]
fn test_remove_rule() {
    let mut lexer = keyword_lexer(ConflictMode::First);
    assert!(lexer.remove_rule("IF"));
    assert!(!lexer.remove_rule("IF"));

    let tokens = lexer.tokenize("iffy").expect("Failed to tokenize");
    assert_eq!(names(&tokens), vec!["ID", "EOF"]);
}

#[test]
fn test_empty_input_yields_eof() {
    let lexer = keyword_lexer(ConflictMode::Longest);
    let tokens = lexer.tokenize("").expect("Failed to tokenize");

    assert_eq!(tokens.len(), 1);
    assert!(tokens[0].is_eof());
}
