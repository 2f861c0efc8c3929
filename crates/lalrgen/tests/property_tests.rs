//! Property-based tests for the LALR(1) parser
//!
//! These tests use proptest to generate random inputs and check that parse
//! trees cover their input exactly and that both table modes agree.

use lalrgen::grammar::{Expr, GrammarBuilder};
use lalrgen::lexer::{Pattern, TokenRule};
use lalrgen::lr::{ErrorMode, LrConfig, LrParser};
use proptest::prelude::*;

fn arithmetic_parser(config: LrConfig) -> LrParser {
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

fn parentheses_parser() -> LrParser {
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

/// Well-formed arithmetic expressions without whitespace
fn expression() -> impl Strategy<Value = String> {
    let leaf = (0u32..1000).prop_map(|n| n.to_string());
    leaf.prop_recursive(4, 32, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("{a}+{b}")),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| format!("{a}*{b}")),
            inner.prop_map(|e| format!("({e})")),
        ]
    })
}

proptest! {
    #[test]
    fn test_tree_text_matches_input(input in expression()) {
        let parser = arithmetic_parser(LrConfig::default());
        let tree = parser.parse_tree(&input).expect("valid expression failed to parse");
        prop_assert_eq!(tree.text(), input);
    }

    #[test]
    fn test_lalr_and_canonical_trees_agree(input in expression()) {
        let lalr = arithmetic_parser(LrConfig::default());
        let canonical = arithmetic_parser(LrConfig::default().with_lalr(false));
        let a = lalr.parse_tree(&input).expect("LALR parse failed");
        let b = canonical.parse_tree(&input).expect("canonical parse failed");
        prop_assert_eq!(a, b);
    }

    #[test]
    fn test_sums_nest_to_the_left(numbers in proptest::collection::vec(1u32..1000, 1..20)) {
        let parser = arithmetic_parser(LrConfig::default());
        let spaced: Vec<String> = numbers.iter().map(ToString::to_string).collect();
        let tree = parser.parse_tree(&spaced.join(" + ")).expect("sum failed to parse");

        prop_assert_eq!(tree.text(), spaced.join("+"));
        prop_assert_eq!(tree.find_all("sum").len(), numbers.len());

        // the leftmost spine holds every prefix of the sum
        let mut node = &tree;
        for count in (1..=numbers.len()).rev() {
            prop_assert_eq!(node.text(), spaced[..count].join("+"));
            node = &node.children()[0];
        }
    }

    #[test]
    fn test_balanced_parentheses(depth in 1usize..40) {
        let parser = parentheses_parser();
        let input = format!("{}{}", "(".repeat(depth), ")".repeat(depth));
        let tree = parser.parse_tree(&input).expect("balanced input failed to parse");

        prop_assert_eq!(tree.find_all("S").len(), depth);
        prop_assert_eq!(tree.depth(), depth);
        prop_assert!(parser.parse_tree(&input[1..]).is_err());
    }

    #[test]
    fn test_arbitrary_input_never_panics(input in "[0-9+*() ]{0,30}") {
        let parser = arithmetic_parser(LrConfig::default().with_error_mode(ErrorMode::Partial));
        let result = parser.parse(&input).expect("partial mode never raises");
        prop_assert_eq!(result.root.is_some(), result.errors.is_empty());
    }
}
