//! # LR(1) Machinery
//!
//! Builds and runs the LALR(1) parser for a [`Grammar`](crate::grammar::Grammar):
//!
//! 1. [`item`]: LR(1) items, closure and goto
//! 2. [`automaton`]: canonical LR(1) collection and the merge by core
//! 3. [`table`]: ACTION/GOTO table with an explicit conflict policy
//! 4. [`parser`]: the shift-reduce driver
//!
//! ```rust
//! use lalrgen::grammar::Grammar;
//! use lalrgen::lexer::LexerBuilder;
//! use lalrgen::lr::{LrConfig, LrParser};
//!
//! let mut grammar = Grammar::new();
//! grammar.add_production("S", ["(", "S", ")"])?;
//! grammar.add_production("S", ["(", ")"])?;
//! grammar.set_start("S")?;
//!
//! // `(` and `)` have no lexer rule, so each matches its own name
//! let lexer = LexerBuilder::new().build()?;
//!
//! let parser = LrParser::new(grammar, lexer, LrConfig::default())?;
//! let tree = parser.parse_tree("(())")?;
//! assert_eq!(tree.depth(), 2);
//! # Ok::<(), lalrgen::error::Error>(())
//! ```

pub mod automaton;
pub mod config;
pub mod item;
pub mod parser;
pub mod table;

pub use automaton::Automaton;
pub use config::{ErrorMode, LrConfig};
pub use item::{Item, ItemSet};
pub use parser::LrParser;
pub use table::{Action, Conflict, ConflictKind, ParseTable};
