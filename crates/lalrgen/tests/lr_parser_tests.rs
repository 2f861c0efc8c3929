//! Tests for the LALR(1) parser

use lalrgen::error::{Error, ParseError};
use lalrgen::grammar::{Expr, Grammar, GrammarBuilder};
use lalrgen::lexer::{LexerBuilder, Pattern, TokenRule};
use lalrgen::lr::{ErrorMode, LrConfig, LrParser};
use lalrgen::tree::ParseTree;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn parentheses_parser() -> LrParser {
    init();
    GrammarBuilder::new()
        .rule(
            "S",
            Expr::choice([
                Expr::seq([Expr::lit("("), Expr::rule("S"), Expr::lit(")")]),
                Expr::seq([Expr::lit("("), Expr::lit(")")]),
            ]),
        )
        .start("S")
        .build()
        .expect("Failed to build grammar")
        .parser(LrConfig::default())
        .expect("Failed to create parser")
}

fn arithmetic_parser(config: LrConfig) -> LrParser {
    init();
    GrammarBuilder::new()
        .token("NUMBER", Pattern::regex("[0-9]+"))
        .token_rule(TokenRule::new("WS", Pattern::regex(r"[ \t\n]+")).skip())
        .rule(
            "sum",
            Expr::choice([
                Expr::seq([Expr::rule("sum"), Expr::lit("+"), Expr::rule("term")]),
                Expr::rule("term"),
            ]),
        )
        .rule(
            "term",
            Expr::choice([
                Expr::seq([Expr::rule("term"), Expr::lit("*"), Expr::rule("factor")]),
                Expr::rule("factor"),
            ]),
        )
        .rule(
            "factor",
            Expr::choice([
                Expr::token("NUMBER"),
                Expr::seq([Expr::lit("("), Expr::rule("sum"), Expr::lit(")")]),
            ]),
        )
        .start("sum")
        .build()
        .expect("Failed to build grammar")
        .parser(config)
        .expect("Failed to create parser")
}

fn production_of(tree: &ParseTree) -> String {
    tree.production().map(ToString::to_string).unwrap_or_default()
}

#[test]
fn test_nested_parentheses() {
    let parser = parentheses_parser();
    let tree = parser.parse_tree("(())").expect("parse failed");

    assert_eq!(production_of(&tree), "S -> ( S )");
    assert_eq!(tree.depth(), 2);
    assert_eq!(tree.degree(), 3);
    let inner = &tree.children()[1];
    assert_eq!(production_of(inner), "S -> ( )");
    assert_eq!(inner.degree(), 2);
    assert_eq!(tree.find_all("S").len(), 2);
    assert_eq!(tree.text(), "(())");
}

#[test]
fn test_multiplication_binds_tighter() {
    let parser = arithmetic_parser(LrConfig::default());
    let tree = parser.parse_tree("2+3*4").expect("parse failed");

    assert_eq!(production_of(&tree), "sum -> sum + term");
    let left = &tree.children()[0];
    assert_eq!(left.text(), "2");
    let right = &tree.children()[2];
    assert_eq!(production_of(right), "term -> term * factor");
    assert_eq!(right.text(), "3*4");
}

#[test]
fn test_addition_is_left_associative() {
    let parser = arithmetic_parser(LrConfig::default());
    let tree = parser.parse_tree("1 + 2 + 3").expect("parse failed");

    assert_eq!(production_of(&tree), "sum -> sum + term");
    assert_eq!(tree.children()[0].text(), "1+2");
    assert_eq!(tree.children()[2].text(), "3");
}

#[test]
fn test_missing_close_paren_reports_expected() {
    let parser = arithmetic_parser(LrConfig::default());
    let err = parser.parse_tree("(2+3").expect_err("parse should fail");

    let Error::Parse(ParseError::UnexpectedEof {
        span,
        line_col,
        expected,
    }) = &err
    else {
        panic!("expected an end-of-input error, got {err:?}");
    };
    assert!(expected.iter().any(|e| e == ")"), "expected list: {expected:?}");
    assert_eq!(span.start().to_usize(), 4);
    assert_eq!(line_col.to_string(), "1:5");
    assert!(err.to_string().contains("`)'"));
}

#[test]
fn test_unexpected_token_position() {
    let parser = arithmetic_parser(LrConfig::default());
    let err = parser.parse_tree("1 +\n* 2").expect_err("parse should fail");

    let Error::Parse(ParseError::UnexpectedToken {
        found, line_col, ..
    }) = &err
    else {
        panic!("expected an unexpected-token error, got {err:?}");
    };
    assert_eq!(found, "*");
    assert_eq!(line_col.to_string(), "2:1");
}

#[test]
fn test_epsilon_production() {
    let parser = GrammarBuilder::new()
        .rule("opt", Expr::choice([Expr::lit("a"), Expr::empty()]))
        .start("opt")
        .build()
        .expect("Failed to build grammar")
        .parser(LrConfig::default())
        .expect("Failed to create parser");

    let tree = parser.parse_tree("").expect("parse failed");
    assert_eq!(production_of(&tree), "opt -> ε");
    assert_eq!(tree.degree(), 0);
    assert_eq!(tree.size(), 1);

    let tree = parser.parse_tree("a").expect("parse failed");
    assert_eq!(production_of(&tree), "opt -> a");
}

#[test]
fn test_grammar_built_directly() {
    let mut grammar = Grammar::new();
    grammar.register_terminal("ID").unwrap();
    grammar.add_production("list", ["list", ",", "ID"]).unwrap();
    grammar.add_production("list", ["ID"]).unwrap();
    grammar.set_start("list").unwrap();

    let lexer = LexerBuilder::new()
        .token("ID", Pattern::regex("[a-z]+"))
        .token(",", Pattern::literal(","))
        .build()
        .unwrap();
    let parser = LrParser::new(grammar, lexer, LrConfig::default()).unwrap();

    let tree = parser.parse_tree("a,b,c").unwrap();
    let ids: Vec<&str> = tree
        .leaves()
        .into_iter()
        .filter(|t| t.name == "ID")
        .map(|t| t.text.as_str())
        .collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
}

#[test]
fn test_terminals_without_lexer_rules_match_their_names() {
    let mut grammar = Grammar::new();
    grammar.add_production("S", ["(", "S", ")"]).unwrap();
    grammar.add_production("S", ["(", ")"]).unwrap();
    grammar.set_start("S").unwrap();

    let lexer = LexerBuilder::new().build().unwrap();
    let parser = LrParser::new(grammar, lexer, LrConfig::default()).unwrap();
    let names: Vec<&str> = parser.lexer().rules().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["(", ")"]);

    let tree = parser.parse_tree("(())").unwrap();
    assert_eq!(tree.depth(), 2);
    assert_eq!(tree.text(), "(())");
}

#[test]
fn test_registered_terminals_follow_declared_rules() {
    let mut grammar = Grammar::new();
    grammar.add_production("list", ["list", ",", "ID"]).unwrap();
    grammar.add_production("list", ["ID"]).unwrap();
    grammar.set_start("list").unwrap();

    // `ID` keeps its regex; only `,` is added
    let lexer = LexerBuilder::new()
        .token("ID", Pattern::regex("[a-z]+"))
        .rule(TokenRule::new("WS", Pattern::literal(" ")).skip())
        .build()
        .unwrap();
    let parser = LrParser::new(grammar, lexer, LrConfig::default()).unwrap();
    let names: Vec<&str> = parser.lexer().rules().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["ID", "WS", ","]);

    let tree = parser.parse_tree("ab, c").unwrap();
    assert_eq!(tree.text(), "ab,c");
}

#[test]
fn test_deep_nesting() {
    let parser = parentheses_parser();
    let depth = 10_000;
    let input = format!("{}{}", "(".repeat(depth), ")".repeat(depth));

    let tree = parser.parse_tree(&input).expect("parse failed");
    assert_eq!(tree.depth(), depth);
    assert_eq!(tree.find_all("S").len(), depth);
    assert_eq!(tree.text(), input);
}

#[test]
fn test_long_repetition_is_spliced_flat() {
    let count = 10_000;
    let input = "x".repeat(count);
    let builder = GrammarBuilder::new()
        .rule("items", Expr::star(Expr::lit("x")))
        .start("items");

    let parser = builder
        .clone()
        .build()
        .unwrap()
        .parser(LrConfig::default())
        .unwrap();
    let tree = parser.parse_tree(&input).unwrap();
    assert_eq!(tree.degree(), count);
    assert_eq!(tree.depth(), 1);

    let raw = builder
        .build()
        .unwrap()
        .parser(LrConfig::default().with_simplify(false))
        .unwrap();
    let tree = raw.parse_tree(&input).unwrap();
    assert_eq!(tree.degree(), 1);
    assert_eq!(tree.leaves().len(), count);
    assert!(tree.depth() > count);
}

#[test]
fn test_generated_nodes_are_spliced() {
    let builder = GrammarBuilder::new()
        .token("ID", Pattern::regex("[a-z]+"))
        .rule(
            "args",
            Expr::delimited(
                Expr::lit("("),
                Expr::opt(Expr::separated(Expr::token("ID"), Expr::lit(","))),
                Expr::lit(")"),
            ),
        )
        .start("args");

    let parser = builder
        .clone()
        .build()
        .unwrap()
        .parser(LrConfig::default())
        .unwrap();
    let tree = parser.parse_tree("(a,b)").unwrap();
    let names: Vec<&str> = tree.children().iter().map(ParseTree::name).collect();
    assert_eq!(names, vec!["(", "ID", ",", "ID", ")"]);

    let raw = builder
        .build()
        .unwrap()
        .parser(LrConfig::default().with_simplify(false))
        .unwrap();
    let tree = raw.parse_tree("(a,b)").unwrap();
    assert_eq!(tree.degree(), 3);
    assert_eq!(tree.children()[1].name(), "args_optional");
    assert_eq!(tree.text(), "(a,b)");
}

#[test]
fn test_partial_result() {
    let parser = arithmetic_parser(LrConfig::default().with_error_mode(ErrorMode::Partial));
    let result = parser.parse("(1 + 2").expect("partial mode never raises");

    assert!(result.root.is_none());
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.warnings.len(), 1);
    let partial: Vec<String> = result.partial.iter().map(ParseTree::text).collect();
    assert_eq!(partial, vec!["(", "1+2"]);
}

#[test]
fn test_parser_is_reusable() {
    let parser = arithmetic_parser(LrConfig::default());
    for input in ["1", "(1)", "1*2+3", "((4))*5"] {
        let result = parser.parse(input).expect("parse failed");
        assert!(result.is_success(), "{input}");
        assert!(result.metrics.tokens_consumed > 0);
    }
}

#[test]
fn test_parser_is_shared_across_threads() {
    let parser = arithmetic_parser(LrConfig::default());
    std::thread::scope(|scope| {
        let handles: Vec<_> = (1..=4)
            .map(|n| {
                let parser = &parser;
                scope.spawn(move || parser.parse_tree(&format!("{n}*{n}+{n}")).map(|t| t.text()))
            })
            .collect();
        for (n, handle) in (1..=4).zip(handles) {
            let text = handle.join().expect("thread panicked").expect("parse failed");
            assert_eq!(text, format!("{n}*{n}+{n}"));
        }
    });
}
