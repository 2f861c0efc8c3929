//! # lalrgen
//!
//! An LALR(1) parser generator that works on grammars built at runtime.
//!
//! ## Overview
//!
//! - **Grammar model**: interned symbols and flat productions, filled directly
//!   or lowered from combinator expressions by a [`GrammarBuilder`]
//! - **Analysis**: nullable and FIRST sets computed to a fixpoint
//! - **Automaton**: canonical LR(1) collection merged by core into LALR(1)
//! - **Table**: ACTION/GOTO grid with a fixed conflict policy and recorded
//!   conflicts
//! - **Lexer**: mode-aware tokenizer with longest or first match and
//!   `skip`/`more` rules
//! - **Parser**: shift-reduce driver producing a [`ParseTree`]
//!
//! ## Quick Start
//!
//! ```rust
//! use lalrgen::{Expr, GrammarBuilder, LrConfig, Pattern, TokenRule};
//!
//! let parser = GrammarBuilder::new()
//!     .token("NUMBER", Pattern::regex("[0-9]+"))
//!     .token_rule(TokenRule::new("WS", Pattern::regex(r"\s+")).skip())
//!     .rule(
//!         "sum",
//!         Expr::choice([
//!             Expr::seq([Expr::rule("sum"), Expr::lit("+"), Expr::rule("term")]),
//!             Expr::rule("term"),
//!         ]),
//!     )
//!     .rule(
//!         "term",
//!         Expr::choice([
//!             Expr::seq([Expr::rule("term"), Expr::lit("*"), Expr::token("NUMBER")]),
//!             Expr::token("NUMBER"),
//!         ]),
//!     )
//!     .start("sum")
//!     .build()?
//!     .parser(LrConfig::default())?;
//!
//! let tree = parser.parse_tree("2 + 3 * 4")?;
//! assert_eq!(tree.production().map(|p| p.to_string()).as_deref(), Some("sum -> sum + term"));
//! assert_eq!(tree.children()[2].text(), "3*4");
//! # Ok::<(), lalrgen::error::Error>(())
//! ```
//!
//! ## Logging
//!
//! The crate logs through the [`log`] facade: construction summaries at
//! `debug`, table conflicts and discarded input at `warn`, and every lexer
//! match and parser step at `trace`. No logger is installed.
//!
//! ## Feature Flags
//!
//! - `diagnostics`: `miette` integration for the error types
//! - `serialize`: serde support for text positions

pub mod error;
pub mod grammar;
pub mod lexer;
pub mod lr;
pub mod syntax;
pub mod tree;

pub use error::{Error, GrammarError, LexerError, ParseError, ParseResult};
pub use grammar::{Expr, Grammar, GrammarBuilder, Language, Production, Symbol};
pub use lexer::{ConflictMode, Lexer, LexerBuilder, Pattern, Token, TokenRule};
pub use lr::{ErrorMode, LrConfig, LrParser};
pub use tree::ParseTree;
