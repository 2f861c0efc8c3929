#![no_main]
use lalrgen::grammar::{Expr, GrammarBuilder};
use lalrgen::lexer::{Pattern, TokenRule};
use lalrgen::lr::{ErrorMode, LrConfig};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    // expr -> expr + term | term; term -> NUMBER | ( expr? ); comments are skipped
    let Ok(language) = GrammarBuilder::new()
        .token("NUMBER", Pattern::regex("[0-9]+"))
        .token_rule(TokenRule::new("WS", Pattern::regex(r"\s+")).skip())
        .token_rule(
            TokenRule::new("COMMENT_START", Pattern::literal("/*"))
                .skip()
                .push_mode("COMMENT"),
        )
        .token_rule(
            TokenRule::new("COMMENT_END", Pattern::literal("*/"))
                .skip()
                .in_mode("COMMENT")
                .pop_mode(),
        )
        .token_rule(
            TokenRule::new("COMMENT_TEXT", Pattern::regex(r"(?:[^*]|\*+[^*/])+"))
                .skip()
                .in_mode("COMMENT"),
        )
        .rule(
            "expr",
            Expr::choice([
                Expr::seq([Expr::rule("expr"), Expr::lit("+"), Expr::rule("term")]),
                Expr::rule("term"),
            ]),
        )
        .rule(
            "term",
            Expr::choice([
                Expr::token("NUMBER"),
                Expr::delimited(Expr::lit("("), Expr::opt(Expr::rule("expr")), Expr::lit(")")),
            ]),
        )
        .start("expr")
        .build()
    else {
        return;
    };

    for use_lalr in [true, false] {
        let config = LrConfig::default()
            .with_lalr(use_lalr)
            .with_error_mode(ErrorMode::Partial);
        let Ok(parser) = language.clone().parser(config) else {
            return;
        };
        if let Ok(result) = parser.parse(text)
            && let Some(root) = result.root
        {
            // the tree covers every non-skipped token
            let leaves = root.leaves().len();
            let tokens = parser.lexer().tokenize(text).map_or(0, |t| t.len() - 1);
            assert_eq!(leaves, tokens);
        }
    }
});
